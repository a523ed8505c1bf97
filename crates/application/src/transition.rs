use std::time::Duration;

use comicshelf_core::PageStep;
use comicshelf_engine::PageImage;

pub const SLIDE_STEPS: u8 = 20;
pub const SLIDE_TICK: Duration = Duration::from_millis(10);

/// An in-flight page slide. It always runs to completion.
#[derive(Debug, Clone)]
pub struct Transition {
    incoming: PageImage,
    step: PageStep,
    done: u8,
}

/// What the renderer needs to draw one slide increment.
#[derive(Debug, Clone, Copy)]
pub struct SlideFrame<'a> {
    pub incoming: &'a PageImage,
    pub step: PageStep,
    /// Fraction of the slide completed, in `(0, 1]`.
    pub progress: f32,
}

impl Transition {
    pub fn new(incoming: PageImage, step: PageStep) -> Self {
        Self {
            incoming,
            step,
            done: 0,
        }
    }

    /// Performs one increment. Returns `true` once the last one has run.
    pub fn advance(&mut self) -> bool {
        self.done = self.done.saturating_add(1).min(SLIDE_STEPS);
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.done >= SLIDE_STEPS
    }

    pub fn frame(&self) -> SlideFrame<'_> {
        SlideFrame {
            incoming: &self.incoming,
            step: self.step,
            progress: f32::from(self.done.max(1)) / f32::from(SLIDE_STEPS),
        }
    }

    pub fn step(&self) -> PageStep {
        self.step
    }

    pub fn into_page(self) -> PageImage {
        self.incoming
    }
}
