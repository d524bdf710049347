//! Session-local interaction records.
//!
//! The host event adapter reports raw clicks and drags; the registry
//! translates each into one `Interaction` that is consumed synchronously by
//! the session's layer chain. Cancelling is a side effect on the underlying
//! host event and is safe to repeat - several layers may veto the same
//! interaction.

use std::cell::Cell;
use std::rc::Rc;

use bitflags::bitflags;

// =============================================================================
// Click and action classification
// =============================================================================

/// How the viewer clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    Left,
    ShiftLeft,
    Right,
    ShiftRight,
    /// Two left clicks in quick succession, as classified by the host.
    Double,
    /// A drop keypress or drag deposit.
    Drop,
    Other,
}

impl ClickKind {
    /// Left-button family, the trigger for collect-to-cursor consolidation.
    #[inline]
    pub fn is_left(&self) -> bool {
        matches!(self, ClickKind::Left | ClickKind::ShiftLeft | ClickKind::Double)
    }

    /// The alternate click that makes navigation jump to a boundary page.
    #[inline]
    pub fn is_alternate(&self) -> bool {
        matches!(self, ClickKind::Right | ClickKind::ShiftRight)
    }
}

/// What the host believes the click would do to the backing grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawAction {
    /// Pick up from the clicked cell onto the cursor.
    Take,
    /// Place the cursor item into the clicked cell.
    Place,
    /// Move the clicked stack to the other surface.
    MoveToOther,
    /// Gather all similar items onto the cursor.
    CollectToCursor,
    /// Drop the clicked stack out of the window.
    Drop,
    Other,
}

bitflags! {
    /// A handler's verdict on which default host behaviors may proceed.
    ///
    /// An empty set cancels everything - the usual verdict for decoration
    /// and control cells, which never let the host touch real content.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClickPermit: u8 {
        /// Permit take-like actions (take, collect, drop).
        const TAKE = 1 << 0;
        /// Permit placing the cursor item.
        const PLACE = 1 << 1;
        /// Permit cross-surface moves.
        const MOVE = 1 << 2;
    }
}

impl ClickPermit {
    /// Whether this verdict lets `action` fall through to the host's
    /// default handling.
    pub fn permits(&self, action: RawAction) -> bool {
        match action {
            RawAction::Take | RawAction::CollectToCursor | RawAction::Drop => {
                self.contains(ClickPermit::TAKE)
            }
            RawAction::Place => self.contains(ClickPermit::PLACE),
            RawAction::MoveToOther => self.contains(ClickPermit::MOVE),
            RawAction::Other => false,
        }
    }
}

// =============================================================================
// Slot roles
// =============================================================================

/// Tagged dispatch for control cells.
///
/// A role is not executed where the slot map lives: the base layer cancels
/// the host's default handling and bubbles the role up through the layer
/// chain, and the layer that owns the matching state acts on it (the
/// pageable layer on `PageBack`/`PageForward`, the search layer on
/// `CycleFilter`, the embedding application on anything that reaches it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRole {
    PageBack,
    PageForward,
    CycleFilter,
    /// A pageable content cell was chosen.
    Select,
    /// Leave this surface for the previous one.
    Back,
    /// Open the search surface attached to this one.
    OpenSearch,
}

// =============================================================================
// Interaction
// =============================================================================

/// Idempotent veto over one raw host event.
///
/// Invoking it any number of times is equivalent to invoking it once; the
/// cancelled flag lets drag fan-out stop early without another host round
/// trip.
#[derive(Clone)]
pub struct CancelHandle {
    cancel: Rc<dyn Fn()>,
    cancelled: Rc<Cell<bool>>,
}

impl CancelHandle {
    pub fn new(cancel: impl Fn() + 'static) -> Self {
        Self {
            cancel: Rc::new(cancel),
            cancelled: Rc::new(Cell::new(false)),
        }
    }

    /// Veto the underlying host event.
    pub fn invoke(&self) {
        self.cancelled.set(true);
        let cancel: &dyn Fn() = self.cancel.as_ref();
        cancel();
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

impl std::fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelHandle")
            .field("cancelled", &self.cancelled.get())
            .finish()
    }
}

/// One user interaction, translated from a raw host event and consumed
/// synchronously by the session it targets.
#[derive(Debug, Clone)]
pub struct Interaction {
    /// Absolute cell index the click landed on.
    pub cell: usize,
    /// Whether the click landed on the session's own top grid rather than
    /// the viewer's own inventory surface.
    pub in_top_grid: bool,
    pub action: RawAction,
    pub click: ClickKind,
    pub cancel: CancelHandle,
}

impl Interaction {
    pub fn new(
        cell: usize,
        in_top_grid: bool,
        action: RawAction,
        click: ClickKind,
        cancel: CancelHandle,
    ) -> Self {
        Self {
            cell,
            in_top_grid,
            action,
            click,
            cancel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_kind_families() {
        assert!(ClickKind::Left.is_left());
        assert!(ClickKind::Double.is_left());
        assert!(!ClickKind::Right.is_left());
        assert!(ClickKind::Right.is_alternate());
        assert!(ClickKind::ShiftRight.is_alternate());
        assert!(!ClickKind::Left.is_alternate());
    }

    #[test]
    fn test_click_permit_mapping() {
        let take = ClickPermit::TAKE;
        assert!(take.permits(RawAction::Take));
        assert!(take.permits(RawAction::CollectToCursor));
        assert!(take.permits(RawAction::Drop));
        assert!(!take.permits(RawAction::Place));
        assert!(!take.permits(RawAction::MoveToOther));
        assert!(!ClickPermit::all().permits(RawAction::Other));
        assert!(!ClickPermit::empty().permits(RawAction::Take));
    }

    #[test]
    fn test_cancel_handle_idempotent() {
        let count = Rc::new(Cell::new(0u32));
        let seen = count.clone();
        let handle = CancelHandle::new(move || seen.set(seen.get() + 1));

        assert!(!handle.is_cancelled());
        handle.invoke();
        handle.invoke();
        assert!(handle.is_cancelled());
        // The callback itself must tolerate repeats; the handle forwards each.
        assert_eq!(count.get(), 2);
    }
}
