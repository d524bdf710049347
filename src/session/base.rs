//! Base session layer: slot registry, rendering and interaction dispatch.
//!
//! Owns the per-session cell-index → descriptor map and the only write path
//! to the real grid. Everything above it (overlays, pagination, search)
//! decorates this layer.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, error};

use crate::error::{UiError, UiResult};
use crate::host::GridPort;
use crate::interaction::{Interaction, RawAction, SlotRole};
use crate::layout::{LayoutProvider, UiLayout};
use crate::session::GridUi;
use crate::session::slot::{SlotHandler, UiSlot};
use crate::types::{GridHandle, GridKind, Item, RenderScope, ViewerId};

/// Intercepts cell writes before they reach the real grid. Returns true
/// when the write was consumed (e.g. turned into a client-only deception);
/// the flag tells the hook whether the surface is currently on screen.
pub type WriteHook = Box<dyn Fn(usize, Option<Item>, bool) -> bool>;

/// The innermost session layer over one host grid.
pub struct BaseGridUi<H: GridPort> {
    host: H,
    viewer: ViewerId,
    kind: GridKind,
    layout: UiLayout,
    grid: Option<GridHandle>,
    registered: bool,
    slots: HashMap<usize, Rc<UiSlot>>,
    scope: RenderScope,
    write_hook: Option<WriteHook>,
}

impl<H: GridPort> BaseGridUi<H> {
    /// Resolve the layout and build an unopened session. Nothing is written
    /// to the host until [`GridUi::show`].
    pub fn new(host: H, viewer: ViewerId, viewer_name: &str, provider: &dyn LayoutProvider) -> Self {
        let kind = provider.grid_kind();
        let layout = UiLayout::resolve(provider, viewer_name);
        let scope = RenderScope {
            viewer_name: viewer_name.to_string(),
            grid_size: kind.cell_count(),
            ..RenderScope::default()
        };

        Self {
            host,
            viewer,
            kind,
            layout,
            grid: None,
            registered: false,
            slots: HashMap::new(),
            scope,
            write_hook: None,
        }
    }

    /// Install a write interceptor. An overlay layer wires itself in here so
    /// every draw - including the base's own decoration pass - routes
    /// through its deception decision.
    pub fn set_write_hook(&mut self, hook: WriteHook) {
        self.write_hook = Some(hook);
    }

    /// The session's animation configuration, as the layout resolved it.
    #[inline]
    pub fn animation(&self) -> crate::layout::AnimationConfig {
        self.layout.animation
    }

    /// Indices of a named group, owned, so callers can draw while mutating.
    pub fn group_indices(&self, name: &str) -> Option<Vec<usize>> {
        self.layout.group(name).map(|set| set.iter().copied().collect())
    }

    /// Whether an interaction on a cell with no managed content may fall
    /// through to the host's default handling: only on the viewer's own
    /// surface, and never for cross-surface moves.
    fn allows_unmanaged(&self, interaction: &Interaction) -> bool {
        !interaction.in_top_grid && interaction.action != RawAction::MoveToOther
    }

    /// Set the always-present decorative items the layout declares.
    fn decorate(&mut self) {
        let decorations: Vec<(String, Item)> = self
            .layout
            .custom_items
            .iter()
            .map(|(name, item)| (name.clone(), item.clone()))
            .collect();

        for (name, item) in decorations {
            let Some(indices) = self.group_indices(&name) else {
                continue;
            };

            let slot = Rc::new(UiSlot::fixed(item));
            for index in indices {
                self.slots.insert(index, Rc::clone(&slot));
                self.draw_index(index);
            }
        }
    }
}

impl<H: GridPort> GridUi for BaseGridUi<H> {
    fn show(&mut self) {
        self.registered = true;
        let grid = self
            .host
            .open_grid(self.viewer, self.kind.cell_count(), &self.layout.title);
        self.grid = Some(grid);
        self.decorate();
        self.draw_all();
    }

    fn close(&mut self) {
        if let Some(grid) = self.grid {
            self.host.close_grid(grid);
        }
    }

    fn is_open(&self) -> bool {
        self.grid
            .map(|grid| self.host.is_topmost(self.viewer, grid))
            .unwrap_or(false)
    }

    fn is_registered(&self) -> bool {
        self.registered
    }

    fn viewer(&self) -> ViewerId {
        self.viewer
    }

    fn grid_kind(&self) -> GridKind {
        self.kind
    }

    fn set_slot_by_index(&mut self, index: usize, slot: Option<Rc<UiSlot>>) {
        match slot {
            Some(slot) => {
                self.slots.insert(index, slot);
            }
            None => {
                self.slots.remove(&index);
            }
        }
    }

    fn set_slot_by_name(&mut self, name: &str, slot: Rc<UiSlot>) {
        let Some(indices) = self.group_indices(name) else {
            return;
        };
        for index in indices {
            self.slots.insert(index, Rc::clone(&slot));
        }
    }

    fn draw_index(&mut self, index: usize) {
        let item = match self.slots.get(&index) {
            Some(slot) => slot.item(&self.scope),
            // Unmapped cells render empty, clearing any stale content.
            None => None,
        };
        let _ = self.set_item(index, item);
    }

    fn draw_name(&mut self, name: &str) {
        let Some(indices) = self.group_indices(name) else {
            return;
        };
        for index in indices {
            self.draw_index(index);
        }
    }

    fn draw_all(&mut self) {
        let mut indices: Vec<usize> = self.slots.keys().copied().collect();
        indices.sort_unstable();
        for index in indices {
            self.draw_index(index);
        }
    }

    fn set_item(&mut self, index: usize, item: Option<Item>) -> UiResult<()> {
        if !self.registered {
            error!(cell = index, "write to an unregistered session");
            return Err(UiError::UnregisteredWrite { cell: index });
        }

        let Some(grid) = self.grid else {
            error!(cell = index, "write before the session's surface was opened");
            return Err(UiError::UnregisteredWrite { cell: index });
        };

        if let Some(hook) = &self.write_hook {
            let open = self.host.is_topmost(self.viewer, grid);
            if hook(index, item.clone(), open) {
                return Ok(());
            }
        }

        // Writes beyond the real surface are dropped here; an installed
        // overlay hook consumes them before this point.
        if index >= self.kind.cell_count() {
            return Ok(());
        }

        self.host.write_cell(grid, index, item.as_ref());
        Ok(())
    }

    fn get_item(&self, index: usize) -> Option<Item> {
        let grid = self.grid?;
        if index >= self.kind.cell_count() {
            return None;
        }
        self.host.read_cell(grid, index)
    }

    fn handle_interaction(&mut self, interaction: &Interaction) -> Option<SlotRole> {
        let slot = self.slots.get(&interaction.cell).cloned();

        let Some(slot) = slot else {
            if !self.allows_unmanaged(interaction) {
                interaction.cancel.invoke();
            }
            return None;
        };

        match slot.handler() {
            None => {
                if !self.allows_unmanaged(interaction) {
                    interaction.cancel.invoke();
                }
                None
            }
            Some(SlotHandler::Role(role)) => {
                // Control cells never let the host touch content; the layer
                // owning the role's state reacts to it on the way out.
                interaction.cancel.invoke();
                Some(*role)
            }
            Some(SlotHandler::Func(handler)) => {
                match handler(interaction) {
                    Ok(permit) => {
                        if !permit.permits(interaction.action) {
                            interaction.cancel.invoke();
                        }
                    }
                    Err(err) => {
                        // Better safe than sorry: a faulting handler must
                        // never leave the host's default handling in effect.
                        error!(cell = interaction.cell, error = %err, "interaction handler failed, cancelling");
                        interaction.cancel.invoke();
                    }
                }
                None
            }
        }
    }

    fn handle_close(&mut self) {
        if !self.registered {
            debug!(viewer = self.viewer.0, "session close handled twice");
            return;
        }
        self.registered = false;
    }

    fn scope(&self) -> &RenderScope {
        &self.scope
    }

    fn scope_mut(&mut self) -> &mut RenderScope {
        &mut self.scope
    }
}
