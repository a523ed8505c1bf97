use comicshelf_core::{PageStep, TurnDirection};

/// Moves beyond this many pixels on either axis turn a click into a drag.
pub const DRAG_THRESHOLD_PX: i32 = 5;

/// Tells a click on the page apart from a drag.
#[derive(Debug, Default, Clone, Copy)]
pub struct PointerGesture {
    origin: Option<(i32, i32)>,
    dragged: bool,
}

impl PointerGesture {
    pub fn press(&mut self, x: i32, y: i32) {
        self.origin = Some((x, y));
        self.dragged = false;
    }

    pub fn moved(&mut self, x: i32, y: i32) {
        let Some((ox, oy)) = self.origin else {
            return;
        };
        if (x - ox).abs() > DRAG_THRESHOLD_PX || (y - oy).abs() > DRAG_THRESHOLD_PX {
            self.dragged = true;
        }
    }

    /// Ends the gesture. Returns the page step for a click, `None` for a drag.
    pub fn release(&mut self, x: i32, width: i32, direction: TurnDirection) -> Option<PageStep> {
        let origin = self.origin.take();
        let dragged = std::mem::take(&mut self.dragged);
        if origin.is_none() || dragged {
            return None;
        }
        Some(click_step(x, width, direction))
    }

    pub fn cancel(&mut self) {
        self.origin = None;
        self.dragged = false;
    }
}

/// Which way a click at `x` turns the page for the given layout.
pub fn click_step(x: i32, width: i32, direction: TurnDirection) -> PageStep {
    let doubled = x.saturating_mul(2);
    let forward = match direction {
        TurnDirection::ForwardOnLeft => doubled < width,
        TurnDirection::ForwardOnRight => doubled > width,
    };
    if forward {
        PageStep::Forward
    } else {
        PageStep::Backward
    }
}
