use std::fs;
use std::io::Write;

use comicshelf_application::{
    Answer, ArchiveDirection, Phase, Prompt, SLIDE_STEPS, WheelDirection,
};
use comicshelf_core::{PagePosition, ReadingStatus, SortKey, path_key};
use comicshelf_storage::Storage;

use super::*;

fn two_books(library: &Library) -> (PathBuf, PathBuf) {
    let a = write_book(&library.books(), "a.cbz", 3);
    let b = write_book(&library.books(), "b.zip", 1);
    (a, b)
}

#[test]
fn builds_numbered_books() {
    let library = Library::new();
    let path = write_book(&library.books(), "x.cbz", 2);
    let session = comicshelf_engine::ReadingSession::open(path).unwrap();
    assert_eq!(session.page_names(), &["001.png", "002.png"]);
}

#[test]
fn finishing_a_book_offers_the_next_one() {
    let library = Library::new();
    let (a, b) = two_books(&library);
    let mut nav = library.navigator();
    assert_eq!(nav.catalog().len(), 2);
    assert_eq!(nav.phase(), Phase::Idle);

    nav.select_archive(&a);
    assert_eq!(nav.phase(), Phase::PageLoaded);
    assert_eq!(nav.renderer().last_page(), Some(0));

    nav.request_next_page();
    assert!(nav.prompt().is_none());
    nav.request_next_page();
    assert_eq!(nav.session().unwrap().current_index(), Some(2));
    assert_eq!(
        nav.prompt(),
        Some(&Prompt::NextArchive {
            path: b.clone(),
            title: "b".to_string(),
        })
    );

    nav.answer(Answer::Yes);
    assert!(nav.prompt().is_none());
    let session = nav.session().unwrap();
    assert_eq!(session.archive_path(), b.as_path());
    assert_eq!(session.current_index(), Some(0));
    assert_eq!(
        nav.renderer().last_position(),
        Some(Some(PagePosition {
            current: 1,
            total: 1
        }))
    );
}

#[test]
fn staying_after_the_last_page_keeps_the_book_open() {
    let library = Library::new();
    let (a, _b) = two_books(&library);
    let mut nav = library.navigator();
    nav.select_archive(&a);
    nav.request_next_page();
    nav.request_next_page();
    nav.answer(Answer::No);

    assert!(nav.prompt().is_none());
    assert_eq!(nav.session().unwrap().archive_path(), a.as_path());
    nav.request_next_page();
    assert_eq!(nav.session().unwrap().current_index(), Some(2));
    assert!(nav.prompt().is_none());
}

#[test]
fn no_next_book_prompt_at_end_of_catalog() {
    let library = Library::new();
    let (_a, b) = two_books(&library);
    let c = write_book(&library.books(), "c.cbz", 2);
    let mut nav = library.navigator();
    nav.select_archive(&c);
    nav.request_next_page();
    assert!(nav.session().unwrap().is_on_last_page());
    assert!(nav.prompt().is_none());

    // A single-page book is already on its last page, but no forward move happened.
    nav.select_archive(&b);
    assert!(nav.prompt().is_none());
}

#[test]
fn backward_move_onto_last_page_does_not_prompt() {
    let library = Library::new();
    let (a, _b) = two_books(&library);
    {
        let mut storage = Storage::open(library.state_path());
        storage.record_progress(&path_key(&a), 2).unwrap();
    }
    let mut nav = library.navigator();
    nav.select_archive(&a);
    nav.answer(Answer::Yes);
    assert_eq!(nav.session().unwrap().current_index(), Some(2));
    assert!(nav.prompt().is_none());
    nav.request_previous_page();
    assert_eq!(nav.session().unwrap().current_index(), Some(1));
    assert!(nav.prompt().is_none());
}

#[test]
fn reopening_with_progress_asks_to_resume_and_restart_overwrites() {
    let library = Library::new();
    let (a, _b) = two_books(&library);
    {
        let mut nav = library.navigator();
        nav.select_archive(&a);
        nav.request_next_page();
        nav.request_next_page();
        nav.answer(Answer::No);
    }
    assert_eq!(
        Storage::open(library.state_path()).progress(&path_key(&a)),
        Some(2)
    );

    let mut nav = library.navigator();
    nav.select_archive(&a);
    assert_eq!(
        nav.prompt(),
        Some(&Prompt::Resume {
            path: a.clone(),
            title: "a".to_string(),
            page: 2,
        })
    );
    assert!(nav.session().is_none());

    nav.answer(Answer::No);
    assert_eq!(nav.session().unwrap().current_index(), Some(0));
    assert_eq!(
        Storage::open(library.state_path()).progress(&path_key(&a)),
        Some(0)
    );
}

#[test]
fn resume_opens_at_recorded_page() {
    let library = Library::new();
    let (a, _b) = two_books(&library);
    {
        let mut storage = Storage::open(library.state_path());
        storage.record_progress(&path_key(&a), 1).unwrap();
    }
    let mut nav = library.navigator();
    nav.select_archive(&a);
    nav.answer(Answer::Yes);
    assert_eq!(nav.session().unwrap().current_index(), Some(1));
    assert_eq!(nav.renderer().last_page(), Some(1));
}

#[test]
fn cancelling_resume_changes_nothing() {
    let library = Library::new();
    let (a, b) = two_books(&library);
    {
        let mut storage = Storage::open(library.state_path());
        storage.record_progress(&path_key(&a), 1).unwrap();
    }
    let mut nav = library.navigator();
    nav.select_archive(&b);
    nav.select_archive(&a);
    nav.answer(Answer::Cancel);
    assert!(nav.prompt().is_none());
    assert_eq!(nav.session().unwrap().archive_path(), b.as_path());
    assert_eq!(
        Storage::open(library.state_path()).progress(&path_key(&a)),
        Some(1)
    );
}

#[test]
fn recorded_page_past_the_end_is_clamped() {
    let library = Library::new();
    let (a, _b) = two_books(&library);
    {
        let mut storage = Storage::open(library.state_path());
        storage.record_progress(&path_key(&a), 40).unwrap();
    }
    let mut nav = library.navigator();
    nav.select_archive(&a);
    nav.answer(Answer::Yes);
    assert_eq!(nav.session().unwrap().current_index(), Some(2));
}

#[test]
fn navigation_is_ignored_while_a_prompt_is_pending() {
    let library = Library::new();
    let (a, b) = two_books(&library);
    let mut nav = library.navigator();
    nav.select_archive(&a);
    nav.request_next_page();
    nav.request_next_page();
    assert!(nav.prompt().is_some());

    nav.request_previous_page();
    nav.select_archive(&b);
    assert_eq!(nav.session().unwrap().archive_path(), a.as_path());
    assert_eq!(nav.session().unwrap().current_index(), Some(2));
}

#[test]
fn progress_follows_every_page_change() {
    let library = Library::new();
    let (a, _b) = two_books(&library);
    let mut nav = library.navigator();
    nav.select_archive(&a);
    nav.request_next_page();
    assert_eq!(nav.storage().progress(&path_key(&a)), Some(1));
    nav.request_previous_page();
    assert_eq!(nav.storage().progress(&path_key(&a)), Some(0));
    nav.request_previous_page();
    assert_eq!(nav.session().unwrap().current_index(), Some(0));
}

#[test]
fn adjacent_archive_respects_its_progress() {
    let library = Library::new();
    let (a, _b) = two_books(&library);
    let c = write_book(&library.books(), "c.cbz", 4);
    {
        let mut storage = Storage::open(library.state_path());
        storage.record_progress(&path_key(&c), 3).unwrap();
    }
    let mut nav = library.navigator();
    nav.select_archive(&a);
    nav.request_adjacent_archive(ArchiveDirection::Previous);
    assert_eq!(nav.session().unwrap().archive_path(), a.as_path());

    nav.request_adjacent_archive(ArchiveDirection::Next);
    nav.request_adjacent_archive(ArchiveDirection::Next);
    let session = nav.session().unwrap();
    assert_eq!(session.archive_path(), c.as_path());
    assert_eq!(session.current_index(), Some(3));
    assert!(nav.prompt().is_none());

    nav.request_adjacent_archive(ArchiveDirection::Next);
    assert_eq!(nav.session().unwrap().archive_path(), c.as_path());
}

#[test]
fn adjacent_archive_is_noop_when_current_left_the_catalog() {
    let library = Library::new();
    let (a, b) = two_books(&library);
    let mut nav = library.navigator();
    nav.select_archive(&a);
    fs::remove_file(&a).unwrap();
    nav.rescan();
    assert_eq!(nav.catalog().len(), 1);

    nav.request_adjacent_archive(ArchiveDirection::Next);
    assert_eq!(nav.session().unwrap().archive_path(), a.as_path());
    assert_ne!(nav.session().unwrap().archive_path(), b.as_path());
}

#[test]
fn animation_defers_the_page_change_until_the_last_step() {
    let library = Library::new();
    let (a, b) = two_books(&library);
    let mut nav = library.navigator();
    nav.toggle_animation();
    assert!(nav.preferences().animation_enabled);

    nav.select_archive(&a);
    assert_eq!(nav.phase(), Phase::PageLoaded);

    nav.request_next_page();
    assert_eq!(nav.phase(), Phase::Animating);
    assert_eq!(nav.session().unwrap().current_index(), Some(0));

    // Rejected while the slide runs.
    nav.request_next_page();
    nav.select_archive(&b);
    nav.request_adjacent_archive(ArchiveDirection::Next);

    for _ in 0..SLIDE_STEPS {
        nav.tick();
    }
    assert_eq!(nav.phase(), Phase::PageLoaded);
    assert_eq!(nav.session().unwrap().archive_path(), a.as_path());
    assert_eq!(nav.session().unwrap().current_index(), Some(1));
    assert_eq!(nav.storage().progress(&path_key(&a)), Some(1));
    assert_eq!(nav.renderer().slide_count(), usize::from(SLIDE_STEPS));

    nav.request_next_page();
    assert!(nav.prompt().is_none());
    for _ in 0..SLIDE_STEPS {
        nav.tick();
    }
    assert!(matches!(nav.prompt(), Some(Prompt::NextArchive { .. })));
}

#[test]
fn failed_page_load_reports_and_keeps_cursor() {
    let library = Library::new();
    let path = library.books().join("broken.cbz");
    {
        let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
        writer
            .start_file("1.png", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(&png_bytes(2, 2)).unwrap();
        writer
            .start_file("2.png", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"not an image").unwrap();
        writer.finish().unwrap();
    }
    let mut nav = library.navigator();
    nav.select_archive(&path);
    nav.request_next_page();

    assert_eq!(nav.session().unwrap().current_index(), Some(0));
    assert_eq!(nav.phase(), Phase::PageLoaded);
    assert!(nav.renderer().last_message().unwrap().contains("page 2"));
    assert_eq!(nav.renderer().last_position(), Some(None));
    assert_eq!(nav.storage().progress(&path_key(&path)), Some(0));
}

#[test]
fn invalid_and_empty_archives_surface_messages() {
    let library = Library::new();
    let bad = library.books().join("bad.cbz");
    fs::write(&bad, b"nope").unwrap();
    let empty = write_archive(&library.books(), "empty.zip", &["readme.txt"]);
    let (a, _b) = two_books(&library);

    let mut nav = library.navigator();
    nav.select_archive(&a);
    nav.select_archive(&bad);
    assert!(nav.renderer().last_message().unwrap().contains("not a valid"));
    nav.select_archive(&empty);
    assert!(nav.renderer().last_message().unwrap().contains("no images"));

    assert_eq!(nav.session().unwrap().archive_path(), a.as_path());
    assert_eq!(nav.storage().progress(&path_key(&bad)), None);
}

#[test]
fn missing_folder_and_empty_folder_are_told_apart() {
    let library = Library::new();
    let mut nav = library.navigator();
    let empty_message = nav.renderer().last_message().unwrap().to_string();
    assert!(empty_message.contains("No zip/cbz"));

    nav.open_folder(&library.dir.path().join("nowhere"));
    let missing_message = nav.renderer().last_message().unwrap();
    assert!(missing_message.contains("does not exist"));
    assert_ne!(missing_message, empty_message);
    assert_eq!(nav.folder(), Some(library.books().as_path()));
}

#[test]
fn opening_folders_updates_history() {
    let library = Library::new();
    let other = library.dir.path().join("other");
    fs::create_dir(&other).unwrap();
    let mut nav = library.navigator();
    nav.open_folder(&other);
    nav.open_folder(&library.books());
    assert_eq!(
        nav.history(),
        &[path_key(&library.books()), path_key(&other)]
    );
}

#[test]
fn sort_changes_persist_and_rescan() {
    let library = Library::new();
    write_book(&library.books(), "small.cbz", 1);
    write_book(&library.books(), "big.cbz", 6);
    let mut nav = library.navigator();
    let names = |nav: &Navigator<RecordingRenderer>| {
        nav.catalog()
            .iter()
            .map(|e| e.display_name.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(names(&nav), vec!["big.cbz", "small.cbz"]);

    nav.toggle_sort_order();
    assert_eq!(names(&nav), vec!["small.cbz", "big.cbz"]);

    nav.set_sort_key(SortKey::Size);
    assert!(!nav.preferences().sort_descending);
    assert_eq!(names(&nav), vec!["small.cbz", "big.cbz"]);

    let reloaded = Storage::open(library.state_path());
    assert_eq!(reloaded.settings().sort_key, SortKey::Size);
}

#[test]
fn clicks_turn_pages_and_drags_do_not() {
    let library = Library::new();
    let (a, _b) = two_books(&library);
    let mut nav = library.navigator();
    nav.select_archive(&a);

    // Default layout: left half goes forward.
    nav.pointer_pressed(10, 10);
    nav.pointer_released(10, 200);
    assert_eq!(nav.session().unwrap().current_index(), Some(1));

    nav.pointer_pressed(10, 10);
    nav.pointer_moved(40, 10);
    nav.pointer_released(40, 200);
    assert_eq!(nav.session().unwrap().current_index(), Some(1));

    nav.pointer_pressed(150, 10);
    nav.pointer_released(150, 200);
    assert_eq!(nav.session().unwrap().current_index(), Some(0));

    nav.toggle_turn_direction();
    nav.pointer_pressed(150, 10);
    nav.pointer_released(150, 200);
    assert_eq!(nav.session().unwrap().current_index(), Some(1));
}

#[test]
fn wheel_turns_pages_only_with_a_book_open() {
    let library = Library::new();
    let (a, _b) = two_books(&library);
    let mut nav = library.navigator();
    nav.wheel(WheelDirection::Down);
    assert!(nav.session().is_none());

    nav.select_archive(&a);
    nav.wheel(WheelDirection::Down);
    assert_eq!(nav.session().unwrap().current_index(), Some(1));
    nav.wheel(WheelDirection::Up);
    assert_eq!(nav.session().unwrap().current_index(), Some(0));
}

#[test]
fn reading_status_tracks_progress() {
    let library = Library::new();
    let (a, b) = two_books(&library);
    let mut nav = library.navigator();
    let status = |nav: &Navigator<RecordingRenderer>, path: &Path| {
        let entry = nav.catalog().iter().find(|e| e.path == path).unwrap();
        nav.status_of(entry)
    };
    assert_eq!(status(&nav, &a), ReadingStatus::Unread);
    nav.select_archive(&a);
    nav.request_next_page();
    assert_eq!(status(&nav, &a), ReadingStatus::Reading);
    nav.request_next_page();
    assert_eq!(status(&nav, &a), ReadingStatus::Finished);
    assert_eq!(status(&nav, &b), ReadingStatus::Unread);
}

#[test]
fn unwritable_state_does_not_stop_reading() {
    let library = Library::new();
    let (a, _b) = two_books(&library);
    let storage = Storage::open(library.dir.path().join("missing").join("settings.json"));
    let mut nav = Navigator::new(storage, RecordingRenderer::default());
    nav.open_folder(&library.books());
    nav.select_archive(&a);
    nav.request_next_page();
    assert_eq!(nav.session().unwrap().current_index(), Some(1));
    assert_eq!(nav.storage().progress(&path_key(&a)), Some(1));
    assert_eq!(nav.renderer().last_message(), None);
}

#[test]
fn next_book_answer_opens_the_offered_archive_after_reordering() {
    let library = Library::new();
    let (a, b) = two_books(&library);
    write_book(&library.books(), "c.cbz", 2);
    let mut nav = library.navigator();
    nav.select_archive(&a);
    nav.request_next_page();
    nav.request_next_page();
    assert!(matches!(nav.prompt(), Some(Prompt::NextArchive { path, .. }) if *path == b));

    nav.toggle_sort_order();
    assert_eq!(nav.catalog()[0].display_name, "c.cbz");
    nav.answer(Answer::Yes);

    let session = nav.session().unwrap();
    assert_eq!(session.archive_path(), b.as_path());
    assert_eq!(session.current_index(), Some(0));
}

#[test]
fn next_book_answer_resumes_the_offered_archive() {
    let library = Library::new();
    let (a, _b) = two_books(&library);
    let c = write_book(&library.books(), "c.cbz", 3);
    fs::remove_file(library.books().join("b.zip")).unwrap();
    {
        let mut storage = Storage::open(library.state_path());
        storage.record_progress(&path_key(&c), 1).unwrap();
    }
    let mut nav = library.navigator();
    nav.select_archive(&a);
    nav.request_next_page();
    nav.request_next_page();
    nav.answer(Answer::Yes);

    let session = nav.session().unwrap();
    assert_eq!(session.archive_path(), c.as_path());
    assert_eq!(session.current_index(), Some(1));
    assert!(nav.prompt().is_none());
}
