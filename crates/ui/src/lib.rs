//! Terminal front end for Comicshelf.
//!
//! [`Ui`] turns crossterm events into [`Navigator`] calls and draws the
//! library list, the current page and any pending prompt. Page output arrives
//! through [`TerminalView`], the [`Renderer`] the navigator writes to.

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use comicshelf_application::{
    Answer, ArchiveDirection, Navigator, Prompt, Renderer, SLIDE_TICK, SlideFrame,
    WheelDirection,
};
use comicshelf_core::{PagePosition, PageStep, ReadingStatus, TurnDirection};
use comicshelf_engine::PageImage;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{event, terminal};
use log::{debug, info, warn};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Clear, HighlightSpacing, List, ListItem, ListState, Paragraph, Wrap,
};
use ratatui_image::picker::Picker;
use ratatui_image::protocol::Protocol as ImageProtocol;
use ratatui_image::{Image as ImageWidget, Resize};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

mod terminal_image;

const IDLE_POLL: Duration = Duration::from_millis(250);

/// Renderer backed by the terminal: keeps the latest page, slide frame,
/// message and position until the next draw.
pub struct TerminalView {
    picker: Picker,
    page: Option<PageImage>,
    generation: u64,
    slide: Option<SlideView>,
    message: Option<String>,
    position: Option<PagePosition>,
    cached: Option<CachedProtocol>,
}

#[derive(Debug, Clone)]
struct SlideView {
    index: usize,
    name: String,
    step: PageStep,
    progress: f32,
}

struct CachedProtocol {
    generation: u64,
    area: Rect,
    protocol: ImageProtocol,
}

impl TerminalView {
    pub fn new() -> Self {
        Self {
            picker: Picker::halfblocks(),
            page: None,
            generation: 0,
            slide: None,
            message: None,
            position: None,
            cached: None,
        }
    }

    fn set_picker(&mut self, picker: Picker) {
        self.picker = picker;
        self.cached = None;
    }

    fn font_size(&self) -> (u16, u16) {
        let (w, h) = self.picker.font_size();
        (w.max(1), h.max(1))
    }

    fn draw(&mut self, frame: &mut ratatui::Frame, area: Rect) -> Rect {
        let title = match self.position {
            Some(position) => format!(" {position} "),
            None => " - / - ".to_string(),
        };
        let protocol = terminal_image::protocol_label(self.picker.protocol_type());
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_bottom(Line::from(format!(" {protocol} ")).alignment(Alignment::Right));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if let Some(slide) = &self.slide {
            let rect = slide_rect(inner, slide.step, slide.progress);
            let label = Paragraph::new(Text::from(vec![
                Line::raw(""),
                Line::styled(
                    format!("page {}", slide.index + 1),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Line::raw(slide.name.clone()),
            ]))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(label, rect);
            return inner;
        }

        if let Some(message) = &self.message {
            let text = Paragraph::new(message.as_str())
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(text, inner);
            return inner;
        }

        if self.page.is_none() {
            let hint = Paragraph::new("Select an archive and press Enter.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(hint, inner);
            return inner;
        }

        self.ensure_protocol(inner);
        if let Some(cached) = &self.cached {
            let proto_area = cached.protocol.area();
            let draw_width = proto_area.width.min(inner.width);
            let draw_height = proto_area.height.min(inner.height);
            let draw_area = Rect::new(
                inner.x + inner.width.saturating_sub(draw_width) / 2,
                inner.y + inner.height.saturating_sub(draw_height) / 2,
                draw_width,
                draw_height,
            );
            frame.render_widget(ImageWidget::new(&cached.protocol), draw_area);
        }
        inner
    }

    fn ensure_protocol(&mut self, area: Rect) {
        if self
            .cached
            .as_ref()
            .is_some_and(|c| c.generation == self.generation && c.area == area)
        {
            return;
        }
        let Some(page) = &self.page else {
            return;
        };
        let (font_w, font_h) = self.font_size();
        let viewport = (
            u32::from(area.width) * u32::from(font_w),
            u32::from(area.height) * u32::from(font_h),
        );
        let (fit_w, fit_h) = fit_within((page.image.width(), page.image.height()), viewport);
        let name = page.name.clone();
        let cols = to_cells(fit_w, font_w).min(area.width);
        let rows = to_cells(fit_h, font_h).min(area.height);

        match self.picker.new_protocol(
            page.image.clone(),
            Rect::new(0, 0, cols, rows),
            Resize::Fit(Some(image::imageops::FilterType::Triangle)),
        ) {
            Ok(protocol) => {
                self.cached = Some(CachedProtocol {
                    generation: self.generation,
                    area,
                    protocol,
                });
            }
            Err(err) => {
                warn!("cannot encode page {name} for the terminal: {err:?}");
                self.cached = None;
                self.page = None;
                self.message = Some(format!("cannot display {name}"));
            }
        }
    }
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for TerminalView {
    fn show_page(&mut self, page: &PageImage) {
        self.page = Some(page.clone());
        self.generation = self.generation.wrapping_add(1);
        self.slide = None;
        self.message = None;
        self.cached = None;
    }

    fn show_slide(&mut self, frame: SlideFrame<'_>) {
        self.slide = Some(SlideView {
            index: frame.incoming.index,
            name: frame.incoming.name.clone(),
            step: frame.step,
            progress: frame.progress,
        });
    }

    fn show_message(&mut self, message: &str) {
        self.message = Some(message.to_string());
        self.page = None;
        self.slide = None;
        self.cached = None;
    }

    fn show_position(&mut self, position: Option<PagePosition>) {
        self.position = position;
    }
}

#[derive(Debug, Default)]
struct FolderPanel {
    input: String,
    history_cursor: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct Ui {
    navigator: Navigator<TerminalView>,
    list_state: ListState,
    folder_panel: Option<FolderPanel>,
    list_area: Rect,
    page_area: Rect,
    synced_archive: Option<PathBuf>,
}

impl Ui {
    pub fn new(navigator: Navigator<TerminalView>) -> Self {
        let mut list_state = ListState::default();
        if !navigator.catalog().is_empty() {
            list_state.select(Some(0));
        }
        Self {
            navigator,
            list_state,
            folder_panel: None,
            list_area: Rect::default(),
            page_area: Rect::default(),
            synced_archive: None,
        }
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        let mut terminal = setup_terminal()?;
        self.navigator
            .renderer_mut()
            .set_picker(terminal_image::detect_picker());
        terminal.clear().ok();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.event_loop(&mut terminal)
        }));
        let restore_result = restore_terminal(&mut terminal);

        match (result, restore_result) {
            (Ok(Ok(())), Ok(())) => Ok(()),
            (Ok(Err(err)), _) => Err(err),
            (Ok(Ok(())), Err(err)) => Err(err),
            (Err(panic), Ok(())) => Err(anyhow::anyhow!(panic_to_string(panic))),
            (Err(panic), Err(err)) => Err(anyhow::anyhow!(
                "{}\n(additionally failed to restore terminal: {err})",
                panic_to_string(panic)
            )),
        }
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> anyhow::Result<()> {
        let mut needs_redraw = true;
        let mut last_tick = Instant::now();

        loop {
            if needs_redraw {
                terminal.draw(|frame| self.draw(frame))?;
                needs_redraw = false;
            }

            let animating = self.navigator.is_animating();
            if !animating {
                last_tick = Instant::now();
            }
            let timeout = if animating {
                SLIDE_TICK.saturating_sub(last_tick.elapsed())
            } else {
                IDLE_POLL
            };

            if event::poll(timeout)? {
                let flow = match event::read()? {
                    Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
                    Event::Mouse(mouse) => {
                        self.handle_mouse(mouse);
                        Flow::Continue
                    }
                    _ => Flow::Continue,
                };
                if flow == Flow::Quit {
                    info!("quit");
                    return Ok(());
                }
                self.sync_selection();
                needs_redraw = true;
            }

            if self.navigator.is_animating() && last_tick.elapsed() >= SLIDE_TICK {
                self.navigator.tick();
                last_tick = Instant::now();
                self.sync_selection();
                needs_redraw = true;
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }
        if self.navigator.prompt().is_some() {
            self.handle_prompt_key(key);
            return Flow::Continue;
        }
        if self.folder_panel.is_some() {
            self.handle_folder_panel_key(key);
            return Flow::Continue;
        }
        self.handle_main_key(key)
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        let answer = match key.code {
            KeyCode::Char('y' | 'Y') | KeyCode::Enter => Answer::Yes,
            KeyCode::Char('n' | 'N') => Answer::No,
            KeyCode::Esc | KeyCode::Char('c' | 'C') => Answer::Cancel,
            _ => return,
        };
        self.navigator.answer(answer);
    }

    fn handle_folder_panel_key(&mut self, key: KeyEvent) {
        let Some(panel) = self.folder_panel.as_mut() else {
            return;
        };
        let history = self.navigator.history();
        match key.code {
            KeyCode::Esc => self.folder_panel = None,
            KeyCode::Enter => {
                let input = panel.input.trim().to_string();
                self.folder_panel = None;
                if !input.is_empty() {
                    self.navigator.open_folder(&PathBuf::from(input));
                    self.list_state
                        .select((!self.navigator.catalog().is_empty()).then_some(0));
                    self.synced_archive = None;
                }
            }
            KeyCode::Backspace => {
                panel.input.pop();
                panel.history_cursor = None;
            }
            KeyCode::Up | KeyCode::Down if !history.is_empty() => {
                let last = history.len() - 1;
                let cursor = match (panel.history_cursor, key.code) {
                    (None, _) => 0,
                    (Some(i), KeyCode::Up) => i.saturating_sub(1),
                    (Some(i), _) => (i + 1).min(last),
                };
                panel.history_cursor = Some(cursor);
                panel.input = history[cursor].clone();
            }
            KeyCode::Char(c) => {
                panel.input.push(c);
                panel.history_cursor = None;
            }
            _ => {}
        }
    }

    fn handle_main_key(&mut self, key: KeyEvent) -> Flow {
        let direction = self.navigator.preferences().page_turn_direction;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Home => self.move_selection(isize::MIN),
            KeyCode::End => self.move_selection(isize::MAX),
            KeyCode::Enter => {
                if let Some(entry) = self
                    .list_state
                    .selected()
                    .and_then(|i| self.navigator.catalog().get(i))
                {
                    let path = entry.path.clone();
                    self.navigator.select_archive(&path);
                }
            }
            KeyCode::Left => self.turn(arrow_step(direction, true)),
            KeyCode::Right => self.turn(arrow_step(direction, false)),
            KeyCode::Char(' ') | KeyCode::PageDown => self.navigator.request_next_page(),
            KeyCode::Backspace | KeyCode::PageUp => self.navigator.request_previous_page(),
            KeyCode::Char(']') => self
                .navigator
                .request_adjacent_archive(ArchiveDirection::Next),
            KeyCode::Char('[') => self
                .navigator
                .request_adjacent_archive(ArchiveDirection::Previous),
            KeyCode::Char('o') => {
                let input = self
                    .navigator
                    .folder()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                self.folder_panel = Some(FolderPanel {
                    input,
                    history_cursor: None,
                });
            }
            KeyCode::Char('s') => {
                self.navigator.cycle_sort_key();
                self.synced_archive = None;
            }
            KeyCode::Char('r') => {
                self.navigator.toggle_sort_order();
                self.synced_archive = None;
            }
            KeyCode::Char('a') => self.navigator.toggle_animation(),
            KeyCode::Char('t') => self.navigator.toggle_turn_direction(),
            other => debug!("unbound key {other:?}"),
        }
        Flow::Continue
    }

    fn turn(&mut self, step: PageStep) {
        match step {
            PageStep::Forward => self.navigator.request_next_page(),
            PageStep::Backward => self.navigator.request_previous_page(),
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.navigator.prompt().is_some() || self.folder_panel.is_some() {
            return;
        }
        let at = Position::new(mouse.column, mouse.row);
        let (x, y) = self.page_pixels(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if self.page_area.contains(at) => {
                self.navigator.pointer_pressed(x, y);
            }
            MouseEventKind::Down(MouseButton::Left) if self.list_area.contains(at) => {
                let row = usize::from(mouse.row.saturating_sub(self.list_area.y + 1));
                let index = self.list_state.offset() + row;
                if index < self.navigator.catalog().len() {
                    self.list_state.select(Some(index));
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => self.navigator.pointer_moved(x, y),
            MouseEventKind::Up(MouseButton::Left) if !self.page_area.contains(at) => {
                self.navigator.pointer_cancelled();
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let (font_w, _) = self.navigator.renderer().font_size();
                let width = i32::from(self.page_area.width) * i32::from(font_w);
                self.navigator.pointer_released(x, width);
            }
            MouseEventKind::ScrollUp if self.list_area.contains(at) => self.move_selection(-1),
            MouseEventKind::ScrollDown if self.list_area.contains(at) => self.move_selection(1),
            MouseEventKind::ScrollUp => self.navigator.wheel(WheelDirection::Up),
            MouseEventKind::ScrollDown => self.navigator.wheel(WheelDirection::Down),
            _ => {}
        }
    }

    /// Cell coordinates to pixels relative to the page area, at cell centers.
    fn page_pixels(&self, column: u16, row: u16) -> (i32, i32) {
        let (font_w, font_h) = self.navigator.renderer().font_size();
        let cell_x = i32::from(column) - i32::from(self.page_area.x);
        let cell_y = i32::from(row) - i32::from(self.page_area.y);
        (
            cell_x * i32::from(font_w) + i32::from(font_w) / 2,
            cell_y * i32::from(font_h) + i32::from(font_h) / 2,
        )
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.navigator.catalog().len();
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(len - 1);
        self.list_state.select(Some(next));
    }

    /// Moves the cursor onto the open archive whenever the open archive changes.
    fn sync_selection(&mut self) {
        let len = self.navigator.catalog().len();
        if self.list_state.selected().is_some_and(|i| i >= len) {
            self.list_state.select(len.checked_sub(1));
        }
        let Some(session) = self.navigator.session() else {
            return;
        };
        let path = session.archive_path();
        if self.synced_archive.as_deref() == Some(path) {
            return;
        }
        if let Some(index) = self
            .navigator
            .catalog()
            .iter()
            .position(|entry| entry.path == path)
        {
            self.list_state.select(Some(index));
        }
        self.synced_archive = Some(path.to_path_buf());
    }

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        frame.render_widget(Clear, area);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(area);

        let header = Paragraph::new(self.header_line())
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(header, layout[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(layout[1]);
        self.list_area = body[0];
        self.draw_library(frame, body[0]);
        self.page_area = self.navigator.renderer_mut().draw(frame, body[1]);

        let footer = Paragraph::new(Text::from(self.footer_lines()))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP));
        frame.render_widget(footer, layout[2]);

        if let Some(prompt) = self.navigator.prompt() {
            draw_prompt(frame, area, prompt);
        } else if let Some(panel) = &self.folder_panel {
            draw_folder_panel(frame, area, panel, self.navigator.history());
        }
    }

    fn header_line(&self) -> Line<'static> {
        let prefs = self.navigator.preferences();
        let folder = self
            .navigator
            .folder()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(no folder)".to_string());
        let order = if prefs.sort_descending { "↓" } else { "↑" };
        let animation = if prefs.animation_enabled {
            "slide"
        } else {
            "instant"
        };
        Line::from(vec![
            Span::styled(folder, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(
                " · sort {} {order} · {animation} · {}",
                prefs.sort_key, prefs.page_turn_direction
            )),
        ])
    }

    fn footer_lines(&self) -> Vec<Line<'static>> {
        let details = self
            .list_state
            .selected()
            .and_then(|i| self.navigator.catalog().get(i))
            .map(|entry| {
                format!(
                    "{} · {} · {}",
                    entry.display_name,
                    entry.size_label(),
                    entry.modified_label()
                )
            })
            .unwrap_or_default();
        vec![
            Line::raw(
                "enter open · ←/→ page · [/] book · o folder · s sort · r reverse · a anim · t layout · q quit",
            ),
            Line::styled(details, Style::default().fg(Color::Gray)),
        ]
    }

    fn draw_library(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        let catalog = self.navigator.catalog();
        let row_width = usize::from(area.width.saturating_sub(4));
        let items: Vec<ListItem> = if catalog.is_empty() {
            vec![ListItem::new(Line::raw("(empty)"))]
        } else {
            catalog
                .iter()
                .map(|entry| {
                    let status = self.navigator.status_of(entry);
                    let size = entry.size_label();
                    let title_width = row_width.saturating_sub(size.width() + 3);
                    let title = pad_to_width(&truncate_to_width(&entry.title(), title_width), title_width);
                    ListItem::new(Line::from(vec![
                        Span::styled(status_marker(status), status_style(status)),
                        Span::raw(" "),
                        Span::raw(title),
                        Span::raw(" "),
                        Span::styled(size, Style::default().fg(Color::Gray)),
                    ]))
                })
                .collect()
        };

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Library ({}) ", catalog.len())),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ")
            .highlight_spacing(HighlightSpacing::Always);
        frame.render_stateful_widget(list, area, &mut self.list_state);
    }
}

fn draw_prompt(frame: &mut ratatui::Frame, area: Rect, prompt: &Prompt) {
    let popup_area = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup_area);
    let (yes, no) = match prompt {
        Prompt::Resume { .. } => ("continue", "start over"),
        Prompt::NextArchive { .. } => ("next book", "stay"),
    };
    let mut lines = prompt
        .message()
        .lines()
        .map(|line| Line::raw(line.to_string()))
        .collect::<Vec<_>>();
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        format!("[y] {yes}   [n] {no}   [esc] cancel"),
        Style::default().fg(Color::Yellow),
    ));
    let paragraph = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Confirm "));
    frame.render_widget(paragraph, popup_area);
}

fn draw_folder_panel(frame: &mut ratatui::Frame, area: Rect, panel: &FolderPanel, history: &[String]) {
    let popup_area = centered_rect(70, 60, area);
    frame.render_widget(Clear, popup_area);
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(popup_area);

    let input = Paragraph::new(format!("{}_", panel.input)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Open folder (enter: open, esc: close) "),
    );
    frame.render_widget(input, layout[0]);

    let items = history
        .iter()
        .map(|folder| ListItem::new(Line::raw(folder.clone())))
        .collect::<Vec<_>>();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Recent (↑/↓) "),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_spacing(HighlightSpacing::Always);
    let mut state = ListState::default();
    state.select(panel.history_cursor);
    frame.render_stateful_widget(list, layout[1], &mut state);
}

/// Page step for an arrow key under the given layout.
fn arrow_step(direction: TurnDirection, left_arrow: bool) -> PageStep {
    let forward = match direction {
        TurnDirection::ForwardOnLeft => left_arrow,
        TurnDirection::ForwardOnRight => !left_arrow,
    };
    if forward {
        PageStep::Forward
    } else {
        PageStep::Backward
    }
}

/// Largest aspect-preserving size of `source` inside `viewport`, never above 100%.
fn fit_within(source: (u32, u32), viewport: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (view_w, view_h) = viewport;
    if src_w == 0 || src_h == 0 || view_w == 0 || view_h == 0 {
        return (0, 0);
    }
    let scale = (f64::from(view_w) / f64::from(src_w))
        .min(f64::from(view_h) / f64::from(src_h))
        .min(1.0);
    let fit_w = ((f64::from(src_w) * scale).round() as u32).clamp(1, src_w);
    let fit_h = ((f64::from(src_h) * scale).round() as u32).clamp(1, src_h);
    (fit_w, fit_h)
}

fn to_cells(pixels: u32, cell: u16) -> u16 {
    let cells = pixels.div_ceil(u32::from(cell.max(1)));
    u16::try_from(cells).unwrap_or(u16::MAX).max(1)
}

/// Part of `inner` covered by the incoming page. Forward slides in from the right.
fn slide_rect(inner: Rect, step: PageStep, progress: f32) -> Rect {
    let hidden = ((1.0 - progress.clamp(0.0, 1.0)) * f32::from(inner.width)).round() as u16;
    let hidden = hidden.min(inner.width);
    let width = inner.width - hidden;
    match step {
        PageStep::Forward => Rect::new(inner.x + hidden, inner.y, width, inner.height),
        PageStep::Backward => Rect::new(inner.x, inner.y, width, inner.height),
    }
}

fn status_marker(status: ReadingStatus) -> &'static str {
    match status {
        ReadingStatus::Unread => "·",
        ReadingStatus::Reading => "▸",
        ReadingStatus::Finished => "✓",
    }
}

fn status_style(status: ReadingStatus) -> Style {
    match status {
        ReadingStatus::Unread => Style::default().fg(Color::Gray),
        ReadingStatus::Reading => Style::default().fg(Color::Cyan),
        ReadingStatus::Finished => Style::default().fg(Color::Green),
    }
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn pad_to_width(text: &str, width: usize) -> String {
    let used = text.width();
    format!("{text}{}", " ".repeat(width.saturating_sub(used)))
}

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    terminal::enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("enter alt screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("create terminal")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    terminal::disable_raw_mode().context("disable raw mode")?;
    crossterm::execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)
        .context("leave alt screen")?;
    terminal.show_cursor().context("show cursor")?;
    Ok(())
}

fn panic_to_string(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic: (unknown payload)".to_string()
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
