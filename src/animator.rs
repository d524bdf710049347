//! Frame-based slide transitions between two grid snapshots.
//!
//! The animator never owns the surface it draws to: snapshots are captured
//! through a caller-supplied reader and frames are emitted through a
//! caller-supplied writer, so the same instance works against the real grid,
//! a fake-slot overlay, or a test board.
//!
//! # Frame model
//!
//! A transition over a grid of fixed width 9 takes one frame per column
//! (horizontal slides) or one frame per row (vertical slides). On frame `f`
//! exactly `f + 1` target columns/rows have entered the surface; the rest
//! still show shifted source content. Frame 0 is rendered immediately when
//! the transition starts and the final frame reproduces the target snapshot
//! exactly, so the slide never duplicates or skips a column.
//!
//! Cell indices run row-major. A non-null mask restricts writes to cells
//! whose source *and* destination absolute index (grid index plus the
//! configured slot offset) are both listed, which keeps decoration cells
//! outside the pageable area untouched mid-slide.

use crate::types::{GRID_WIDTH, Item};

// =============================================================================
// Direction
// =============================================================================

/// Direction the new content slides in from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    Up,
    Down,
    Left,
    Right,
}

impl SlideDirection {
    #[inline]
    fn is_horizontal(&self) -> bool {
        matches!(self, SlideDirection::Left | SlideDirection::Right)
    }
}

// =============================================================================
// Animator
// =============================================================================

/// Computes and emits the intermediate frames of a directional slide between
/// a saved "from" snapshot and a captured "to" snapshot.
#[derive(Default)]
pub struct FrameAnimator {
    from: Vec<Option<Item>>,
    to: Vec<Option<Item>>,
    active: Option<SlideDirection>,
    mask: Option<Vec<usize>>,
    frames: usize,
    rows: usize,
    frame: usize,
    slot_offset: usize,
}

impl FrameAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude the first `offset` absolute cells from animation entirely.
    /// Used when the leading portion of the surface is not row-shaped (a
    /// narrow grid) and only the virtually-extended area should slide.
    pub fn set_slot_offset(&mut self, offset: usize) {
        self.slot_offset = offset;
    }

    /// Whether a transition is currently in flight.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Capture the currently rendered content of every animated cell into
    /// the "from" buffer. Must run before the surface is redrawn for the
    /// target state.
    pub fn save_snapshot(&mut self, size: usize, mut read: impl FnMut(usize) -> Option<Item>) {
        let size = size.saturating_sub(self.slot_offset);
        self.from.clear();
        self.from.extend((0..size).map(|i| read(i + self.slot_offset)));
    }

    /// Capture the target content and begin a transition. Returns whether
    /// the transition was accepted; sizes that do not divide into full rows
    /// reject it (the caller has already drawn the target state, so the
    /// surface simply does not slide).
    ///
    /// Frame 0 must be rendered immediately afterwards via
    /// [`FrameAnimator::render_current`] - capture and rendering are split
    /// so the caller can read and write the same surface.
    pub fn start(
        &mut self,
        direction: SlideDirection,
        mask: Option<Vec<usize>>,
        size: usize,
        mut read: impl FnMut(usize) -> Option<Item>,
    ) -> bool {
        let size = size.saturating_sub(self.slot_offset);

        if size % GRID_WIDTH != 0 {
            return false;
        }

        self.to.clear();
        self.to.extend((0..size).map(|i| read(i + self.slot_offset)));

        self.rows = size / GRID_WIDTH;
        self.frames = if direction.is_horizontal() {
            GRID_WIDTH
        } else {
            self.rows
        };
        self.frame = 0;
        self.mask = mask;
        self.active = Some(direction);

        true
    }

    /// Render the current frame. Used right after [`FrameAnimator::start`]
    /// for frame 0; `tick` and `fast_forward` render on their own.
    pub fn render_current(&self, write: impl FnMut(usize, Option<&Item>)) {
        self.draw_frame(write);
    }

    /// Advance one frame and re-render. No-op while idle; reaching the end
    /// clears the transition without drawing again.
    pub fn tick(&mut self, write: impl FnMut(usize, Option<&Item>)) {
        if self.active.is_none() {
            return;
        }

        self.frame += 1;

        if self.frame < self.frames {
            self.draw_frame(write);
            return;
        }

        self.active = None;
    }

    /// Jump to the final frame, render it, and clear the transition. Called
    /// whenever an interaction arrives mid-slide so input always sees the
    /// settled target state. Idempotent: a second call is a no-op.
    pub fn fast_forward(&mut self, write: impl FnMut(usize, Option<&Item>)) {
        if self.active.is_none() {
            return;
        }

        if self.frames > 0 {
            self.frame = self.frames - 1;
            self.draw_frame(write);
        }

        self.active = None;
    }

    fn draw_frame(&self, mut write: impl FnMut(usize, Option<&Item>)) {
        let Some(direction) = self.active else {
            return;
        };

        let f = self.frame;

        match direction {
            // Drawing columns: every row shifts identically.
            SlideDirection::Left | SlideDirection::Right => {
                for draw_col in 0..GRID_WIDTH {
                    let (origin, read_col) = if direction == SlideDirection::Left {
                        if draw_col < self.frames - f - 1 {
                            (&self.from, draw_col + f + 1)
                        } else {
                            (&self.to, draw_col - (GRID_WIDTH - 1 - f))
                        }
                    } else if draw_col > f {
                        (&self.from, draw_col - f - 1)
                    } else {
                        (&self.to, GRID_WIDTH - 1 - f + draw_col)
                    };

                    for row_start in (0..self.rows * GRID_WIDTH).step_by(GRID_WIDTH) {
                        let destination = draw_col + row_start;
                        let source = read_col + row_start;
                        self.write_masked(&mut write, origin, destination, source);
                    }
                }
            }

            // Drawing rows: columns are preserved.
            SlideDirection::Down | SlideDirection::Up => {
                for draw_row in 0..self.rows {
                    let (origin, read_row) = if direction == SlideDirection::Down {
                        if draw_row > f {
                            (&self.from, draw_row - (f + 1))
                        } else {
                            (&self.to, draw_row + (self.rows - f - 1))
                        }
                    } else if draw_row < self.frames - f - 1 {
                        (&self.from, draw_row + f + 1)
                    } else {
                        (&self.to, draw_row - (self.rows - f - 1))
                    };

                    for col in 0..GRID_WIDTH {
                        let destination = draw_row * GRID_WIDTH + col;
                        let source = read_row * GRID_WIDTH + col;
                        self.write_masked(&mut write, origin, destination, source);
                    }
                }
            }
        }
    }

    fn write_masked(
        &self,
        write: &mut impl FnMut(usize, Option<&Item>),
        origin: &[Option<Item>],
        destination: usize,
        source: usize,
    ) {
        if let Some(mask) = &self.mask {
            let allowed = mask.contains(&(destination + self.slot_offset))
                && mask.contains(&(source + self.slot_offset));
            if !allowed {
                return;
            }
        }

        // Reading past either snapshot yields empty: the old and new layouts
        // may have different stated sizes.
        let item = origin.get(source).and_then(|cell| cell.as_ref());
        write(destination + self.slot_offset, item);
    }
}
