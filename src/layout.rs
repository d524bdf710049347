//! Declarative layout resolution.
//!
//! A layout provider is an external collaborator (typically backed by a
//! config/templating subsystem) that tells a session what its surface looks
//! like: the title, which cell indices each named group covers, the always
//! present decorative items, and how transitions animate. The engine
//! resolves all of it once at session construction into a plain [`UiLayout`]
//! and treats the result as immutable for the session's lifetime.
//!
//! Live decorations (page labels, filter indicators, the search result cell)
//! are not resolved up front - providers build those on demand from the
//! current stats, and the engine re-invokes them on every draw.

use std::collections::{BTreeSet, HashMap};

use crate::types::{FilterState, GridKind, Item, PageStats};

// =============================================================================
// Group names
// =============================================================================

/// Named slot groups with engine-assigned behavior. Layouts may define any
/// other group name for purely decorative content.
pub const GROUP_PREVIOUS_PAGE: &str = "previous_page";
pub const GROUP_CURRENT_PAGE: &str = "current_page";
pub const GROUP_NEXT_PAGE: &str = "next_page";
pub const GROUP_PAGE_CELLS: &str = "page_cells";
pub const GROUP_FILTER: &str = "filter";
pub const GROUP_SEARCH_INPUT: &str = "search_input";
pub const GROUP_RESULT: &str = "result";
pub const GROUP_BACK: &str = "back";
pub const GROUP_SEARCH_LAUNCHER: &str = "search";

// =============================================================================
// Animation configuration
// =============================================================================

/// Whether and how fast page transitions slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationConfig {
    pub enabled: bool,
    /// Frame period in ticks. Clamped to at least 1 on construction.
    pub period: u64,
}

impl AnimationConfig {
    pub fn new(enabled: bool, period: u64) -> Self {
        Self {
            enabled,
            period: period.max(1),
        }
    }

    /// Animation off; the period stays valid for ticking arithmetic.
    pub const DISABLED: Self = Self {
        enabled: false,
        period: 1,
    };
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self::DISABLED
    }
}

// =============================================================================
// Resolved layout
// =============================================================================

/// A session's layout, resolved once at construction.
#[derive(Debug, Clone, Default)]
pub struct UiLayout {
    pub title: String,
    /// Symbolic name to the set of cell indices it covers.
    pub slot_groups: HashMap<String, BTreeSet<usize>>,
    /// Always-present decorative items, keyed by the group they fill.
    pub custom_items: HashMap<String, Item>,
    pub animation: AnimationConfig,
}

impl UiLayout {
    /// Resolve a provider against a viewer name and grid size.
    pub fn resolve(provider: &dyn LayoutProvider, viewer_name: &str) -> Self {
        let grid_size = provider.grid_kind().cell_count();
        Self {
            title: provider.title(viewer_name),
            slot_groups: provider.slot_groups(grid_size),
            custom_items: provider.custom_items(grid_size),
            animation: provider.animation(),
        }
    }

    /// Indices of a named group, or `None` when the layout omits it.
    #[inline]
    pub fn group(&self, name: &str) -> Option<&BTreeSet<usize>> {
        self.slot_groups.get(name)
    }
}

// =============================================================================
// Provider traits
// =============================================================================

/// Base layout collaborator: everything any grid session needs.
pub trait LayoutProvider {
    fn grid_kind(&self) -> GridKind;

    fn title(&self, viewer_name: &str) -> String;

    /// Name to cell-index-set mapping, evaluated against the grid size.
    fn slot_groups(&self, grid_size: usize) -> HashMap<String, BTreeSet<usize>>;

    /// Pre-built decorative items keyed by group name. Groups the layout
    /// does not declare are skipped silently.
    fn custom_items(&self, _grid_size: usize) -> HashMap<String, Item> {
        HashMap::new()
    }

    fn animation(&self) -> AnimationConfig {
        AnimationConfig::DISABLED
    }
}

/// Layout collaborator for pageable surfaces: the ordered cell list reserved
/// for page content plus live navigation decorations.
pub trait PageLayoutProvider: LayoutProvider {
    /// Ordered absolute cell indices holding page content. The list's length
    /// is the page size.
    fn pagination_cells(&self, grid_size: usize) -> Vec<usize>;

    fn previous_page_item(&self, stats: &PageStats) -> Option<Item>;

    fn current_page_item(&self, stats: &PageStats) -> Option<Item>;

    fn next_page_item(&self, stats: &PageStats) -> Option<Item>;
}

/// Layout collaborator for the debounced search surface.
pub trait SearchLayoutProvider: PageLayoutProvider {
    /// Idle interval between the last query mutation and re-filtering.
    fn debounce_ms(&self) -> u64;

    fn filter_item(&self, filters: &[FilterState]) -> Option<Item>;

    fn search_input_item(&self, filters: &[FilterState]) -> Option<Item>;

    fn result_item(&self, query: &str) -> Option<Item>;

    fn back_item(&self) -> Option<Item> {
        None
    }
}

/// Layout collaborator for single-choice surfaces that can launch a search.
pub trait ChoiceLayoutProvider: PageLayoutProvider {
    fn search_launcher_item(&self) -> Option<Item> {
        None
    }
}
