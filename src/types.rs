//! Core types for slotgrid.
//!
//! These types define the foundation that everything builds on.
//! They flow between the engine layers and define what the host
//! adapter understands.

// =============================================================================
// Grid geometry
// =============================================================================

/// Fixed width of a rectangular grid row. Every chest-like host surface is
/// addressed in rows of this many cells.
pub const GRID_WIDTH: usize = 9;

/// Number of cells in the viewer's own inventory that a session may extend
/// into virtually (four rows, hotbar included).
pub const OWN_GRID_CELLS: usize = GRID_WIDTH * 4;

/// The shape of the backing host surface.
///
/// `Rows` is a rectangular grid of `rows * GRID_WIDTH` cells that accepts
/// arbitrary writes. `Narrow` is a constrained surface of `n` cells (e.g. a
/// three-cell text-input surface) that cannot durably hold arbitrary items -
/// every write to it must be deceived client-side instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKind {
    Rows(u8),
    Narrow(u8),
}

impl GridKind {
    /// Total number of real cells on the surface.
    #[inline]
    pub fn cell_count(&self) -> usize {
        match *self {
            GridKind::Rows(rows) => rows as usize * GRID_WIDTH,
            GridKind::Narrow(cells) => cells as usize,
        }
    }

    /// Whether the surface refuses durable arbitrary writes.
    #[inline]
    pub fn is_constrained(&self) -> bool {
        matches!(self, GridKind::Narrow(_))
    }
}

// =============================================================================
// Opaque identifiers
// =============================================================================

/// Identity of the single viewer a session renders for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewerId(pub u64);

/// Handle of an open host grid, as returned by the grid port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridHandle(pub u64);

/// Opaque id of a registered session. Allocated by the session registry;
/// never reused within a registry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

// =============================================================================
// Item
// =============================================================================

/// A renderable item as the host understands it.
///
/// The engine never builds items itself - an external templating collaborator
/// produces them - so this stays a plain value: a host-defined kind id, a
/// stack count and a display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub kind: u32,
    pub count: u16,
    pub name: String,
}

impl Item {
    pub fn new(kind: u32, count: u16, name: impl Into<String>) -> Self {
        Self {
            kind,
            count,
            name: name.into(),
        }
    }

    /// Stack similarity: same kind and name, count ignored. This is the
    /// "visually equal" notion the fake-slot consolidation pass uses; it is
    /// deliberately not full equality.
    #[inline]
    pub fn is_similar(&self, other: &Item) -> bool {
        self.kind == other.kind && self.name == other.name
    }
}

// =============================================================================
// Override
// =============================================================================

/// A client-only deception cached for one cell.
///
/// `Empty` deceives a visually empty cell, which is distinct from not caching
/// anything at all: an absent cache entry means "let the host render whatever
/// is really there".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Override {
    Empty,
    Item(Item),
}

impl Override {
    /// The item to push to the client, `None` meaning empty.
    #[inline]
    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Override::Empty => None,
            Override::Item(item) => Some(item),
        }
    }

    /// Build an override from an optional item, mapping `None` to `Empty`.
    #[inline]
    pub fn from_item(item: Option<Item>) -> Self {
        match item {
            None => Override::Empty,
            Some(item) => Override::Item(item),
        }
    }
}

// =============================================================================
// Live render scope
// =============================================================================

/// Live pagination figures exposed for decoration.
///
/// `current_page_display` is 1-based; everything else is a plain count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageStats {
    pub current_page_display: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub total_items: usize,
}

/// One search filter mode and whether it is the active one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub name: &'static str,
    pub active: bool,
}

/// The evaluation context handed to slot suppliers at draw time.
///
/// Layers keep this current (the pageable layer updates `page` after every
/// navigation, the search layer updates `query` and `filters`), so suppliers
/// always observe live values without owning any session state.
#[derive(Debug, Clone, Default)]
pub struct RenderScope {
    pub viewer_name: String,
    pub grid_size: usize,
    pub page: PageStats,
    pub query: String,
    pub filters: Vec<FilterState>,
}
