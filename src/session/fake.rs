//! Client-only deception overlay.
//!
//! Some cells must never touch the real backing grid: indices beyond the
//! surface's capacity (the session extends virtually into the viewer's own
//! inventory) and every cell of a constrained narrow surface. This layer
//! caches such cells client-side, pushes them as overrides, and defends the
//! deception against the client's own bookkeeping - re-asserting overrides
//! on every interaction that hits one, undoing the client's automatic
//! "collect similar stacks to cursor" merge, and forcing a cursor redraw so
//! no phantom item stays stuck to it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::UiResult;
use crate::host::{Clock, GridPort, OverlayPort, OverrideLookup, RegionSet};
use crate::interaction::{ClickKind, Interaction, SlotRole};
use crate::session::GridUi;
use crate::session::base::BaseGridUi;
use crate::session::slot::UiSlot;
use crate::types::{GridKind, Item, Override, RenderScope, ViewerId};

/// Two left clicks on overridden cells within this window are treated as the
/// client's collect-to-cursor gesture. Empirically tuned against client
/// behavior; not domain logic.
pub const COLLECT_WINDOW_MS: u64 = 400;

// =============================================================================
// Overlay cache
// =============================================================================

type SharedCache = Arc<Mutex<HashMap<usize, Override>>>;

fn lock_cache(cache: &SharedCache) -> std::sync::MutexGuard<'_, HashMap<usize, Override>> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-cell deception cache plus the decision of which writes it owns.
pub struct FakeSlotOverlay {
    cache: SharedCache,
    grid_size: usize,
    constrained: bool,
    collect_window_ms: u64,
    last_left_click_ms: u64,
}

impl FakeSlotOverlay {
    pub fn new(kind: GridKind, collect_window_ms: u64) -> Self {
        Self {
            cache: Arc::new(Mutex::new(HashMap::new())),
            grid_size: kind.cell_count(),
            constrained: kind.is_constrained(),
            collect_window_ms,
            last_left_click_ms: 0,
        }
    }

    /// Whether writes to `index` must be deceived instead of hitting the
    /// real grid.
    #[inline]
    pub fn covers(&self, index: usize) -> bool {
        self.constrained || index >= self.grid_size
    }

    /// Intercept a write. Returns the cached override to push when the
    /// overlay owns this cell, `None` when the real grid should be written.
    pub fn write(&mut self, index: usize, item: Option<Item>) -> Option<Override> {
        if !self.covers(index) {
            return None;
        }
        let value = Override::from_item(item);
        lock_cache(&self.cache).insert(index, value.clone());
        Some(value)
    }

    /// The cached override for a cell, absent meaning "not deceived".
    pub fn cached(&self, index: usize) -> Option<Override> {
        lock_cache(&self.cache).get(&index).cloned()
    }

    /// Shared read access for the host's blocked-region refresh path.
    pub fn lookup(&self) -> OverrideLookup {
        let cache = Arc::clone(&self.cache);
        Arc::new(move |index| lock_cache(&cache).get(&index).cloned())
    }

    pub fn is_empty(&self) -> bool {
        lock_cache(&self.cache).is_empty()
    }

    pub fn clear(&mut self) {
        lock_cache(&self.cache).clear();
    }

    /// Decide the overlay's response to an interaction. `None` when the cell
    /// is not deceived; otherwise the interaction must be vetoed and every
    /// listed override re-pushed.
    ///
    /// A second left click within the collect window re-pushes every cached
    /// cell holding an item similar to the clicked one, suppressing the
    /// client's collect-to-cursor merge of fake stacks. Otherwise only the
    /// clicked cell is re-asserted.
    pub fn intercept(
        &mut self,
        cell: usize,
        click: ClickKind,
        now_ms: u64,
    ) -> Option<Vec<(usize, Override)>> {
        let cached = self.cached(cell)?;

        let mut pushes = Vec::new();
        let mut consolidated = false;

        if click.is_left() {
            let delta = now_ms.saturating_sub(self.last_left_click_ms);

            if delta <= self.collect_window_ms {
                if let Override::Item(clicked) = &cached {
                    for (index, value) in lock_cache(&self.cache).iter() {
                        let Override::Item(item) = value else {
                            continue;
                        };
                        if clicked.is_similar(item) {
                            pushes.push((*index, value.clone()));
                        }
                    }
                    consolidated = true;
                }
            }

            self.last_left_click_ms = now_ms;
        }

        if !consolidated {
            pushes.push((cell, cached));
        }

        Some(pushes)
    }
}

// =============================================================================
// Layer
// =============================================================================

/// Session layer deceiving beyond-capacity and constrained-surface cells.
///
/// Wraps the base directly: at construction it installs a write hook into
/// the base's write path, so every draw - the base's own decoration pass
/// included - routes through the overlay's deception decision.
pub struct FakeSlotUi<G: GridPort, H: OverlayPort + Clone + 'static> {
    inner: BaseGridUi<G>,
    host: H,
    clock: Arc<dyn Clock>,
    overlay: Rc<RefCell<FakeSlotOverlay>>,
    uses_own_inventory: bool,
}

impl<G: GridPort, H: OverlayPort + Clone + 'static> FakeSlotUi<G, H> {
    pub fn new(
        mut inner: BaseGridUi<G>,
        host: H,
        uses_own_inventory: bool,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let overlay = Rc::new(RefCell::new(FakeSlotOverlay::new(
            inner.grid_kind(),
            COLLECT_WINDOW_MS,
        )));

        let hook_overlay = Rc::clone(&overlay);
        let hook_host = host.clone();
        let viewer = inner.viewer();
        inner.set_write_hook(Box::new(move |index, item, open| {
            match hook_overlay.borrow_mut().write(index, item) {
                Some(value) => {
                    // Deceptions are only worth sending while the surface is
                    // what the viewer actually sees; the cache re-asserts
                    // them later.
                    if open {
                        hook_host.push_override(viewer, index, &value);
                    }
                    true
                }
                None => false,
            }
        }));

        Self {
            inner,
            host,
            clock,
            overlay,
            uses_own_inventory,
        }
    }

    fn blocked_regions(&self) -> RegionSet {
        let mut regions = RegionSet::empty();
        if self.inner.grid_kind().is_constrained() {
            regions |= RegionSet::TOP;
        }
        if self.uses_own_inventory {
            regions |= RegionSet::OWN;
        }
        regions
    }
}

impl<G: GridPort, H: OverlayPort + Clone + 'static> GridUi for FakeSlotUi<G, H> {
    fn show(&mut self) {
        let lookup = self.overlay.borrow().lookup();
        self.host
            .block_regions(self.inner.viewer(), self.blocked_regions(), lookup);
        self.inner.show();
    }

    fn close(&mut self) {
        self.inner.close();
    }

    fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    fn is_registered(&self) -> bool {
        self.inner.is_registered()
    }

    fn viewer(&self) -> ViewerId {
        self.inner.viewer()
    }

    fn grid_kind(&self) -> GridKind {
        self.inner.grid_kind()
    }

    fn set_slot_by_index(&mut self, index: usize, slot: Option<Rc<UiSlot>>) {
        self.inner.set_slot_by_index(index, slot);
    }

    fn set_slot_by_name(&mut self, name: &str, slot: Rc<UiSlot>) {
        self.inner.set_slot_by_name(name, slot);
    }

    fn draw_index(&mut self, index: usize) {
        self.inner.draw_index(index);
    }

    fn draw_name(&mut self, name: &str) {
        self.inner.draw_name(name);
    }

    fn draw_all(&mut self) {
        self.inner.draw_all();
    }

    fn set_item(&mut self, index: usize, item: Option<Item>) -> UiResult<()> {
        // The write hook installed at construction intercepts deceived cells
        // inside the base's write path.
        self.inner.set_item(index, item)
    }

    fn get_item(&self, index: usize) -> Option<Item> {
        let overlay = self.overlay.borrow();
        if overlay.covers(index) {
            return match overlay.cached(index) {
                Some(Override::Item(item)) => Some(item),
                _ => None,
            };
        }
        self.inner.get_item(index)
    }

    fn handle_interaction(&mut self, interaction: &Interaction) -> Option<SlotRole> {
        // The viewer's own surface is part of the deception while the
        // session extends into it: nothing there may really move.
        if !interaction.in_top_grid && self.uses_own_inventory {
            interaction.cancel.invoke();
        }

        let now = self.clock.now_ms();
        let intercepted =
            self.overlay
                .borrow_mut()
                .intercept(interaction.cell, interaction.click, now);
        if let Some(pushes) = intercepted {
            interaction.cancel.invoke();

            let viewer = self.inner.viewer();
            for (index, value) in &pushes {
                self.host.push_override(viewer, *index, value);
            }

            // The host does not know a fake item was under the click, so it
            // may leave the cursor claiming one; re-setting it forces a
            // client cursor redraw.
            self.host.refresh_cursor(viewer);
        }

        self.inner.handle_interaction(interaction)
    }

    fn handle_close(&mut self) {
        if !self.inner.is_registered() {
            return;
        }

        self.host.unblock_regions(self.inner.viewer());
        self.inner.handle_close();

        // Cells that borrowed the viewer's real inventory for the deception
        // go back to the source of truth.
        let mut overlay = self.overlay.borrow_mut();
        if !overlay.is_empty() {
            self.host.restore_own_inventory(self.inner.viewer());
        }
        overlay.clear();
    }

    fn handle_tick(&mut self, time: u64) {
        self.inner.handle_tick(time);
    }

    fn handle_text_input(&mut self, text: &str) {
        self.inner.handle_text_input(text);
    }

    fn scope(&self) -> &RenderScope {
        self.inner.scope()
    }

    fn scope_mut(&mut self) -> &mut RenderScope {
        self.inner.scope_mut()
    }
}
