use crate::constants::SHEET_DISMISS_THRESHOLD_PX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetPhase {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SheetEvent {
    Show,
    /// the open animation finished
    Shown,
    Dismiss,
    /// the close animation finished
    Hidden,
    /// touch start, `sheet_top` is where the sheet currently begins
    DragStart { y: f32, sheet_top: f32 },
    DragMove { y: f32 },
    DragEnd,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    start_y: f32,
    offset: f32,
}

/// Bottom sheet driven by explicit events instead of timers:
/// `Closed -> Opening -> Open -> Closing -> Closed`.
///
/// Dragging only works while open, only downwards, and a release more than
/// 100px below the start dismisses the sheet; anything less snaps back.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    phase: SheetPhase,
    drag: Option<Drag>,
    handle_zone: Option<f32>,
}

impl Sheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drags must start within `px` of the sheet's top edge.
    pub fn with_handle_zone(px: f32) -> Self {
        Sheet {
            handle_zone: Some(px),
            ..Self::default()
        }
    }

    pub fn phase(&self) -> SheetPhase {
        self.phase
    }

    pub fn is_visible(&self) -> bool {
        self.phase != SheetPhase::Closed
    }

    pub fn is_open(&self) -> bool {
        self.phase == SheetPhase::Open
    }

    /// how far the sheet is pulled down right now
    pub fn drag_offset(&self) -> f32 {
        self.drag.map_or(0.0, |d| d.offset)
    }

    pub fn handle(&mut self, event: SheetEvent) -> SheetPhase {
        use SheetPhase::*;

        self.phase = match (self.phase, event) {
            (Closed | Closing, SheetEvent::Show) => Opening,
            (Opening, SheetEvent::Shown) => Open,
            (Opening | Open, SheetEvent::Dismiss) => {
                self.drag = None;
                Closing
            }
            (Closing, SheetEvent::Hidden) => Closed,
            (Open, SheetEvent::DragStart { y, sheet_top }) => {
                let in_zone = self.handle_zone.map_or(true, |zone| y - sheet_top <= zone);
                if in_zone {
                    self.drag = Some(Drag {
                        start_y: y,
                        offset: 0.0,
                    });
                }
                Open
            }
            (Open, SheetEvent::DragMove { y }) => {
                if let Some(drag) = self.drag.as_mut() {
                    let diff = y - drag.start_y;
                    if diff > 0.0 {
                        drag.offset = diff;
                    }
                }
                Open
            }
            (Open, SheetEvent::DragEnd) => match self.drag.take() {
                Some(drag) if drag.offset > SHEET_DISMISS_THRESHOLD_PX => Closing,
                _ => Open,
            },
            (phase, _) => phase,
        };

        self.phase
    }

    /// Show + Shown, for surfaces without an open animation.
    pub fn open_now(&mut self) {
        self.handle(SheetEvent::Show);
        self.handle(SheetEvent::Shown);
    }

    /// Dismiss + Hidden, for surfaces without a close animation.
    pub fn close_now(&mut self) {
        self.handle(SheetEvent::Dismiss);
        self.handle(SheetEvent::Hidden);
    }
}
