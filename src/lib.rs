//! slotgrid - stateful, paginated, animated grid UIs over a host surface
//! that only understands "set cell N to item X" and "user clicked cell N".
//!
//! The engine emulates a richer UI model - virtual slots beyond grid
//! capacity, smooth page-transition slides, client-only "fake" items and
//! debounced fuzzy search - entirely through discrete cell writes, while
//! keeping host-side and client-side state consistent under racing input.
//!
//! # Architecture
//!
//! ```text
//! host adapter (external)              engine (this crate)
//! ───────────────────────              ───────────────────
//! clicks / drags / close ──► SessionRegistry ──► layer chain per session
//! fixed-period tick      ──►     │                  SearchUi / SingleChoiceUi
//!                                │                      PageableUi ── FrameAnimator
//! GridPort    ◄── real writes ───┤                      FakeSlotUi ── override cache
//! OverlayPort ◄── deceptions ────┘                      BaseGridUi ── slot registry
//! ```
//!
//! Interactions are routed down a session's layer chain; the base layer
//! dispatches to the clicked cell's descriptor and control-cell roles bubble
//! back up to the layer that owns the matching state. The periodic tick
//! advances slide animations and the search debounce. Everything is
//! synchronous and bounded; the per-session mutex in the registry is the
//! only lock.
//!
//! Concrete host adapters, templating and configuration live outside this
//! crate - see the [`host`] and [`layout`] collaborator traits.

pub mod animator;
pub mod error;
pub mod host;
pub mod interaction;
pub mod layout;
pub mod search;
pub mod session;
pub mod types;

pub use animator::{FrameAnimator, SlideDirection};
pub use error::{HandlerError, HandlerResult, UiError, UiResult};
pub use host::{
    Clock, ClickClassification, GridPort, OverlayPort, OverrideLookup, RegionSet, SystemClock,
};
pub use interaction::{CancelHandle, ClickKind, ClickPermit, Interaction, RawAction, SlotRole};
pub use layout::{
    AnimationConfig, ChoiceLayoutProvider, LayoutProvider, PageLayoutProvider,
    SearchLayoutProvider, UiLayout,
};
pub use search::{QueryState, SearchFilter, apply_filter, query_words, score_match};
pub use session::base::BaseGridUi;
pub use session::choice::SingleChoiceUi;
pub use session::fake::{FakeSlotOverlay, FakeSlotUi};
pub use session::pageable::{PageableUi, Paginator};
pub use session::registry::{CapabilityTags, ClickReport, SessionRegistry};
pub use session::search_ui::SearchUi;
pub use session::slot::{DataBoundSlot, SlotHandler, UiSlot};
pub use session::{GridUi, Pageable};
pub use types::{
    FilterState, GRID_WIDTH, GridHandle, GridKind, Item, OWN_GRID_CELLS, Override, PageStats,
    RenderScope, SessionId, ViewerId,
};
