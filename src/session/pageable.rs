//! Pagination layer.
//!
//! Splits an ordered list of data-bound descriptors into fixed-size pages
//! over the cell indices the layout reserves for page content, wires the
//! previous/current/next navigation groups, and slides page transitions
//! through the frame animator. The page snapshot deliberately covers the
//! grid plus the virtually-extended own-inventory cells, so fake slots
//! animate together with real ones.

use std::rc::Rc;
use std::sync::Arc;

use crate::animator::{FrameAnimator, SlideDirection};
use crate::error::UiResult;
use crate::interaction::{ClickKind, Interaction, SlotRole};
use crate::layout::{
    AnimationConfig, GROUP_CURRENT_PAGE, GROUP_NEXT_PAGE, GROUP_PREVIOUS_PAGE, PageLayoutProvider,
};
use crate::session::slot::{DataBoundSlot, UiSlot};
use crate::session::{GridUi, Pageable};
use crate::types::{GRID_WIDTH, GridKind, Item, OWN_GRID_CELLS, PageStats, RenderScope, ViewerId};

// =============================================================================
// Paginator
// =============================================================================

/// Pure page arithmetic over the reserved cell-index list.
pub struct Paginator<T> {
    cells: Vec<usize>,
    items: Vec<DataBoundSlot<T>>,
    current_page: usize,
    page_count: usize,
}

impl<T> Paginator<T> {
    pub fn new(cells: Vec<usize>) -> Self {
        Self {
            cells,
            items: Vec::new(),
            current_page: 0,
            page_count: 0,
        }
    }

    /// Number of cells reserved for page content.
    #[inline]
    pub fn page_size(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    #[inline]
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// The reserved cell indices, in page-relative order.
    #[inline]
    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    /// Replace the dataset: page count is recomputed and the current page
    /// resets to 0.
    pub fn set_items(&mut self, items: Vec<DataBoundSlot<T>>) {
        self.items = items;
        self.page_count = if self.page_size() == 0 {
            0
        } else {
            self.items.len().div_ceil(self.page_size())
        };
        self.current_page = 0;
    }

    /// Clamp a requested page into the valid range - out-of-range targets
    /// land on the nearest boundary, never wrap.
    pub fn go_to(&mut self, target: usize) {
        self.current_page = if self.page_count == 0 {
            0
        } else {
            target.min(self.page_count - 1)
        };
    }

    /// The item shown at a page-relative position on the current page.
    pub fn item_at(&self, page_relative: usize) -> Option<&DataBoundSlot<T>> {
        self.items.get(self.current_page * self.page_size() + page_relative)
    }

    /// The data bound to an absolute cell on the current page.
    pub fn data_at_cell(&self, cell: usize) -> Option<&T> {
        let page_relative = self.cells.iter().position(|&c| c == cell)?;
        self.item_at(page_relative).map(|bound| &bound.data)
    }

    pub fn stats(&self) -> PageStats {
        PageStats {
            current_page_display: self.current_page + 1,
            page_size: self.page_size(),
            page_count: self.page_count,
            total_items: self.items.len(),
        }
    }
}

// =============================================================================
// Layer
// =============================================================================

/// Session layer adding pagination and slide transitions.
pub struct PageableUi<U: GridUi, T, P: PageLayoutProvider> {
    inner: U,
    provider: Arc<P>,
    paginator: Paginator<T>,
    animator: FrameAnimator,
    animation: AnimationConfig,
    first_render: bool,
}

impl<U: GridUi, T, P: PageLayoutProvider + 'static> PageableUi<U, T, P> {
    pub fn new(inner: U, provider: Arc<P>) -> Self {
        let grid_size = inner.grid_kind().cell_count();
        let paginator = Paginator::new(provider.pagination_cells(grid_size));

        let mut animator = FrameAnimator::new();
        // A surface whose leading cells are not row-shaped only animates its
        // virtually-extended area.
        if grid_size % GRID_WIDTH != 0 {
            animator.set_slot_offset(grid_size);
        }

        Self {
            inner,
            animation: provider.animation(),
            provider,
            paginator,
            animator,
            first_render: true,
        }
    }

    /// The inner layer, for callers composing further.
    pub fn inner(&self) -> &U {
        &self.inner
    }

    /// Register the navigation decorations declared by the layout and draw
    /// the initial page.
    fn decorate_pagination(&mut self) {
        let previous = {
            let provider = Arc::clone(&self.provider);
            UiSlot::with_role(
                move |scope: &RenderScope| provider.previous_page_item(&scope.page),
                SlotRole::PageBack,
            )
        };
        self.inner.set_slot_by_name(GROUP_PREVIOUS_PAGE, Rc::new(previous));

        let current = {
            let provider = Arc::clone(&self.provider);
            UiSlot::supplied(move |scope: &RenderScope| provider.current_page_item(&scope.page))
        };
        self.inner.set_slot_by_name(GROUP_CURRENT_PAGE, Rc::new(current));

        let next = {
            let provider = Arc::clone(&self.provider);
            UiSlot::with_role(
                move |scope: &RenderScope| provider.next_page_item(&scope.page),
                SlotRole::PageForward,
            )
        };
        self.inner.set_slot_by_name(GROUP_NEXT_PAGE, Rc::new(next));

        self.draw_pagination(None);
    }

    /// Map the current page onto its cells and draw them.
    fn draw_current_page(&mut self) {
        for page_relative in 0..self.paginator.page_size() {
            let cell = self.paginator.cells()[page_relative];
            let slot = self
                .paginator
                .item_at(page_relative)
                .map(|bound| Rc::clone(&bound.slot));
            self.inner.set_slot_by_index(cell, slot);
            self.inner.draw_index(cell);
        }
    }

    /// Redraw page content and navigation, sliding when a direction is
    /// given. The first render after construction never animates.
    fn draw_pagination(&mut self, direction: Option<SlideDirection>) {
        // The snapshot and animation cover the whole virtually-extended
        // surface; page cells past the real grid live in the overlay below.
        let extended_size = self.inner.grid_kind().cell_count() + OWN_GRID_CELLS;

        let stats = self.paginator.stats();
        self.inner.scope_mut().page = stats;

        if self.animation.enabled {
            self.animator
                .save_snapshot(extended_size, |index| self.inner.get_item(index));
        }

        self.draw_current_page();
        self.inner.draw_name(GROUP_PREVIOUS_PAGE);
        self.inner.draw_name(GROUP_CURRENT_PAGE);
        self.inner.draw_name(GROUP_NEXT_PAGE);

        if self.animation.enabled && !self.first_render {
            if let Some(direction) = direction {
                let mask = self.paginator.cells().to_vec();
                let accepted = self.animator.start(direction, Some(mask), extended_size, |index| {
                    self.inner.get_item(index)
                });
                if accepted {
                    self.animator.render_current(|index, item| {
                        let _ = self.inner.set_item(index, item.cloned());
                    });
                }
            }
        }

        self.first_render = false;
    }

    fn set_current_page(&mut self, target: usize, direction: Option<SlideDirection>) {
        self.paginator.go_to(target);
        if self.inner.is_registered() {
            self.draw_pagination(direction);
        }
    }

    /// One page back; the alternate click jumps to the first page. No-op on
    /// the first page.
    fn page_back(&mut self, click: ClickKind) {
        if self.paginator.current_page() == 0 {
            return;
        }

        let target = if click.is_alternate() {
            0
        } else {
            self.paginator.current_page() - 1
        };
        self.set_current_page(target, Some(SlideDirection::Right));
    }

    /// One page forward; the alternate click jumps to the last page. No-op
    /// on the last page.
    fn page_forward(&mut self, click: ClickKind) {
        let page_count = self.paginator.page_count();
        if page_count == 0 || self.paginator.current_page() >= page_count - 1 {
            return;
        }

        let target = if click.is_alternate() {
            page_count - 1
        } else {
            self.paginator.current_page() + 1
        };
        self.set_current_page(target, Some(SlideDirection::Left));
    }
}

impl<U: GridUi, T, P: PageLayoutProvider + 'static> Pageable<T> for PageableUi<U, T, P> {
    fn set_items(&mut self, items: Vec<DataBoundSlot<T>>) {
        self.paginator.set_items(items);
        // First assignment after a dataset change is not animated; only
        // explicit navigation is.
        self.set_current_page(0, None);
    }

    fn page_stats(&self) -> PageStats {
        self.paginator.stats()
    }

    fn data_at_cell(&self, cell: usize) -> Option<&T> {
        self.paginator.data_at_cell(cell)
    }
}

impl<U: GridUi, T, P: PageLayoutProvider + 'static> GridUi for PageableUi<U, T, P> {
    fn show(&mut self) {
        self.inner.show();
        self.decorate_pagination();
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
        self.inner.set_item(index, item)
    }

    fn get_item(&self, index: usize) -> Option<Item> {
        self.inner.get_item(index)
    }

    fn handle_interaction(&mut self, interaction: &Interaction) -> Option<SlotRole> {
        // Input always sees the settled target state.
        self.animator.fast_forward(|index, item| {
            let _ = self.inner.set_item(index, item.cloned());
        });

        match self.inner.handle_interaction(interaction) {
            Some(SlotRole::PageBack) => {
                self.page_back(interaction.click);
                None
            }
            Some(SlotRole::PageForward) => {
                self.page_forward(interaction.click);
                None
            }
            other => other,
        }
    }

    fn handle_close(&mut self) {
        self.inner.handle_close();
    }

    fn handle_tick(&mut self, time: u64) {
        self.inner.handle_tick(time);

        if time % self.animation.period == 0 {
            self.animator.tick(|index, item| {
                let _ = self.inner.set_item(index, item.cloned());
            });
        }
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
