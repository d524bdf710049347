//! Session composition layers.
//!
//! One open UI is a chain of decorating layers over a base session, each
//! adding one capability and delegating the rest:
//!
//! ```text
//! SingleChoiceUi / SearchUi        selection, debounced filtering
//!         │
//!     PageableUi                   paginator + slide animator
//!         │
//!     FakeSlotUi                   client-only deception overlay
//!         │
//!     BaseGridUi ── GridPort ────► host surface
//! ```
//!
//! Interactions flow down the chain (each layer pre-processes, the base
//! dispatches) and control-cell roles bubble back up as the return value, so
//! the layer owning the matching state acts without any layer holding a
//! reference to its outer one.

pub mod base;
pub mod choice;
pub mod fake;
pub mod pageable;
pub mod registry;
pub mod search_ui;
pub mod slot;

use std::rc::Rc;

use crate::error::UiResult;
use crate::interaction::{Interaction, SlotRole};
use crate::types::{GridKind, Item, PageStats, RenderScope, ViewerId};

use slot::{DataBoundSlot, UiSlot};

/// The public surface of one session layer chain.
///
/// Everything a host, registry or embedding application calls goes through
/// this trait; layers implement it by delegation with targeted overrides.
/// `handle_tick` and `handle_text_input` default to no-ops - layers without
/// the matching capability simply never see them routed.
pub trait GridUi {
    /// Open the surface for its viewer, decorate it and draw every mapped
    /// cell.
    fn show(&mut self);

    /// Ask the host to close the surface. Teardown itself runs when the
    /// close notification arrives at [`GridUi::handle_close`].
    fn close(&mut self);

    fn is_open(&self) -> bool;

    fn is_registered(&self) -> bool;

    fn viewer(&self) -> ViewerId;

    fn grid_kind(&self) -> GridKind;

    /// Replace or clear one cell's descriptor.
    fn set_slot_by_index(&mut self, index: usize, slot: Option<Rc<UiSlot>>);

    /// Apply one shared descriptor to every cell of a named group. Missing
    /// groups are silent no-ops: layouts may legitimately omit optional
    /// regions.
    fn set_slot_by_name(&mut self, name: &str, slot: Rc<UiSlot>);

    /// Evaluate and render one cell; unmapped cells render empty.
    fn draw_index(&mut self, index: usize);

    fn draw_name(&mut self, name: &str);

    /// Render every mapped cell. Used once after initial decoration.
    fn draw_all(&mut self);

    /// Write a cell through the session's write path (overlay deception
    /// included). Writing to an unregistered session is a programming error.
    fn set_item(&mut self, index: usize, item: Option<Item>) -> UiResult<()>;

    /// Read a cell as the viewer currently sees it.
    fn get_item(&self, index: usize) -> Option<Item>;

    /// Dispatch one interaction. A control-cell role the chain did not
    /// consume bubbles out to the caller.
    fn handle_interaction(&mut self, interaction: &Interaction) -> Option<SlotRole>;

    /// Tear down after the host reports the surface closed. Idempotent.
    fn handle_close(&mut self);

    fn handle_tick(&mut self, _time: u64) {}

    fn handle_text_input(&mut self, _text: &str) {}

    /// The live evaluation context slot suppliers observe.
    fn scope(&self) -> &RenderScope;

    fn scope_mut(&mut self) -> &mut RenderScope;
}

/// Capability of surfaces that page a data-bound item list.
pub trait Pageable<T> {
    /// Replace the full pageable dataset, resetting to page 0 without
    /// animation.
    fn set_items(&mut self, items: Vec<DataBoundSlot<T>>);

    fn page_stats(&self) -> PageStats;

    /// The data bound to an absolute cell on the current page, if that cell
    /// shows pageable content.
    fn data_at_cell(&self, cell: usize) -> Option<&T>;
}
