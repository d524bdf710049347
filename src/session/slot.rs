//! Slot descriptors.
//!
//! A descriptor pairs a lazily evaluated item supplier with an optional
//! interaction behavior. Descriptors are shared: assigning one to several
//! cells (a border decoration, a whole named group) shares the instance, not
//! a copy.

use std::rc::Rc;

use crate::error::HandlerResult;
use crate::interaction::{Interaction, SlotRole};
use crate::types::{Item, RenderScope};

/// Lazily evaluates a cell's item against the live render scope.
pub type SlotSupplier = Box<dyn Fn(&RenderScope) -> Option<Item>>;

/// Self-contained interaction behavior for one cell.
pub type SlotFunc = Box<dyn Fn(&Interaction) -> HandlerResult>;

/// What happens when the cell is clicked.
pub enum SlotHandler {
    /// Cancel the host's default handling and bubble the role to the layer
    /// that owns the matching state.
    Role(SlotRole),
    /// Run in place; the returned permit decides what the host may still do.
    Func(SlotFunc),
}

/// One cell descriptor: item supplier plus optional click behavior.
pub struct UiSlot {
    supplier: SlotSupplier,
    handler: Option<SlotHandler>,
}

impl UiSlot {
    /// A display-only cell: supplies content, never handles clicks.
    pub fn supplied(supplier: impl Fn(&RenderScope) -> Option<Item> + 'static) -> Self {
        Self {
            supplier: Box::new(supplier),
            handler: None,
        }
    }

    /// A control cell dispatched by role.
    pub fn with_role(
        supplier: impl Fn(&RenderScope) -> Option<Item> + 'static,
        role: SlotRole,
    ) -> Self {
        Self {
            supplier: Box::new(supplier),
            handler: Some(SlotHandler::Role(role)),
        }
    }

    /// A cell with a self-contained click handler.
    pub fn with_handler(
        supplier: impl Fn(&RenderScope) -> Option<Item> + 'static,
        handler: impl Fn(&Interaction) -> HandlerResult + 'static,
    ) -> Self {
        Self {
            supplier: Box::new(supplier),
            handler: Some(SlotHandler::Func(Box::new(handler))),
        }
    }

    /// A fixed decorative item.
    pub fn fixed(item: Item) -> Self {
        Self::supplied(move |_| Some(item.clone()))
    }

    /// Evaluate the supplier against the live scope.
    #[inline]
    pub fn item(&self, scope: &RenderScope) -> Option<Item> {
        (self.supplier)(scope)
    }

    #[inline]
    pub fn handler(&self) -> Option<&SlotHandler> {
        self.handler.as_ref()
    }
}

impl std::fmt::Debug for UiSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handler = match &self.handler {
            None => "none",
            Some(SlotHandler::Role(_)) => "role",
            Some(SlotHandler::Func(_)) => "func",
        };
        f.debug_struct("UiSlot").field("handler", &handler).finish()
    }
}

/// A pageable descriptor bound to the data value it renders, so selection
/// and search can reach back from a cell to the underlying datum.
pub struct DataBoundSlot<T> {
    pub data: T,
    pub slot: Rc<UiSlot>,
}

impl<T> DataBoundSlot<T> {
    pub fn new(data: T, slot: UiSlot) -> Self {
        Self {
            data,
            slot: Rc::new(slot),
        }
    }
}

impl<T: Clone> Clone for DataBoundSlot<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            slot: Rc::clone(&self.slot),
        }
    }
}
