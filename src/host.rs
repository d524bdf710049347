//! Host collaborator ports.
//!
//! The engine performs no I/O of its own: every observable effect goes
//! through one of these traits, and every notion of time comes from an
//! injected clock. Concrete adapters (a game server's window protocol, a
//! test recorder) live outside the crate.
//!
//! # Architecture
//!
//! ```text
//! engine layers                         host process
//! ─────────────                         ────────────
//! BaseGridUi ── writes ──────► GridPort (open/write/read/close)
//! FakeSlotUi ── deceptions ──► OverlayPort (push/block/unblock/cursor)
//! SearchUi   ── debounce ────► Clock (now_ms)
//! ```

use std::sync::Arc;

use bitflags::bitflags;

use crate::types::{GridHandle, Item, Override, ViewerId};

// =============================================================================
// Grid port
// =============================================================================

/// Read/write access to the real backing grid.
///
/// Adapters are expected to be cheap handles (the engine clones them into
/// layers that need their own access), and writes must clamp or reject
/// indices beyond the opened size on the host side.
pub trait GridPort {
    /// Open a grid of `size` cells for `viewer` and present it. Returns the
    /// handle all further calls address.
    fn open_grid(&self, viewer: ViewerId, size: usize, title: &str) -> GridHandle;

    /// Write a cell, `None` meaning empty.
    fn write_cell(&self, grid: GridHandle, index: usize, item: Option<&Item>);

    /// Read a cell's real content, `None` meaning empty.
    fn read_cell(&self, grid: GridHandle, index: usize) -> Option<Item>;

    /// Close the grid for its viewer.
    fn close_grid(&self, grid: GridHandle);

    /// Whether `grid` is currently the topmost surface the viewer sees.
    fn is_topmost(&self, viewer: ViewerId, grid: GridHandle) -> bool;
}

// =============================================================================
// Overlay port
// =============================================================================

bitflags! {
    /// Host regions whose default content sync must be suppressed while an
    /// overlay deceives cells inside them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RegionSet: u8 {
        /// The session's own top grid.
        const TOP = 1 << 0;
        /// The viewer's own inventory grid.
        const OWN = 1 << 1;
    }
}

/// Shared view into the overlay's cache, handed to the host so its own
/// refresh path can substitute live overrides for blocked regions without
/// borrowing the session.
pub type OverrideLookup = Arc<dyn Fn(usize) -> Option<Override> + Send + Sync>;

/// The click classification the host protocol reports for the most recent
/// raw click, used to recover semantics the host obscures for overridden
/// cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickClassification {
    /// A shift-style quick move between surfaces.
    QuickMove,
    /// A pickup of everything under the cursor.
    PickupAll,
}

/// Client-only rendering control: pushes deceptive cell content and
/// suppresses the host's own refresh for blocked regions.
pub trait OverlayPort {
    /// Push a client-only override for one cell.
    fn push_override(&self, viewer: ViewerId, index: usize, value: &Override);

    /// Suppress default content sync for `regions`; while blocked, the host
    /// resolves cell content through `lookup` instead of its own state.
    fn block_regions(&self, viewer: ViewerId, regions: RegionSet, lookup: OverrideLookup);

    /// Lift a previous [`OverlayPort::block_regions`].
    fn unblock_regions(&self, viewer: ViewerId);

    /// Re-send the viewer's held cursor item to itself, forcing a client
    /// cursor redraw.
    fn refresh_cursor(&self, viewer: ViewerId);

    /// Re-send the viewer's own inventory from the host's source of truth,
    /// relinquishing any deception that extended into it.
    fn restore_own_inventory(&self, viewer: ViewerId);

    /// Classification of the viewer's last raw click, if the protocol
    /// captured one.
    fn last_click_classification(&self, viewer: ViewerId) -> Option<ClickClassification>;
}

// =============================================================================
// Clock
// =============================================================================

/// Injected wall-clock. All debounce and click-window comparisons are pure
/// functions of values read from here, so tests never sleep.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Default clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}
