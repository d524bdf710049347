//! Debounced search layer.
//!
//! Wraps a pageable chain and filters its dataset by the viewer's typed
//! query. Text input arrives through the host's rename/text channel, updates
//! the result decoration immediately, and re-arms the debounce; the actual
//! re-filter runs from the tick path once the idle window has elapsed.
//! Cycling the filter mode re-arms the same debounce rather than filtering
//! in place, so rapid clicks coalesce exactly like rapid keystrokes.

use std::rc::Rc;
use std::sync::Arc;

use crate::error::UiResult;
use crate::host::Clock;
use crate::interaction::{Interaction, SlotRole};
use crate::layout::{
    GROUP_BACK, GROUP_FILTER, GROUP_RESULT, GROUP_SEARCH_INPUT, SearchLayoutProvider,
};
use crate::search::{QueryState, SearchFilter, apply_filter};
use crate::session::slot::{DataBoundSlot, UiSlot};
use crate::session::{GridUi, Pageable};
use crate::types::{FilterState, GridKind, Item, PageStats, RenderScope, ViewerId};

/// Session layer adding debounced fuzzy filtering over a pageable chain.
pub struct SearchUi<U, T, P, F>
where
    U: GridUi + Pageable<T>,
    T: Clone + Ord,
    P: SearchLayoutProvider,
    F: SearchFilter<T>,
{
    inner: U,
    provider: Arc<P>,
    clock: Arc<dyn Clock>,
    filter: F,
    query: QueryState,
    all_items: Vec<DataBoundSlot<T>>,
    on_back: Option<Box<dyn Fn()>>,
}

impl<U, T, P, F> SearchUi<U, T, P, F>
where
    U: GridUi + Pageable<T>,
    T: Clone + Ord,
    P: SearchLayoutProvider + 'static,
    F: SearchFilter<T> + 'static,
{
    pub fn new(inner: U, provider: Arc<P>, filter: F, clock: Arc<dyn Clock>) -> Self {
        let query = QueryState::new(provider.debounce_ms());
        Self {
            inner,
            provider,
            clock,
            filter,
            query,
            all_items: Vec::new(),
            on_back: None,
        }
    }

    /// Invoke `on_back` when the layout's back cell is clicked.
    pub fn with_back(mut self, on_back: impl Fn() + 'static) -> Self {
        self.on_back = Some(Box::new(on_back));
        self
    }

    /// The current (trimmed) query text.
    pub fn query(&self) -> &str {
        self.query.text()
    }

    fn filter_states(&self) -> Vec<FilterState> {
        F::all()
            .iter()
            .map(|mode| FilterState {
                name: mode.name(),
                active: *mode == self.filter,
            })
            .collect()
    }

    /// Run the filter over the full dataset and hand the result to the
    /// pageable layer below.
    fn refilter(&mut self) {
        let filtered = apply_filter(self.filter, self.query.text(), &self.all_items);
        self.inner.set_items(filtered);
    }

    fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
        self.inner.scope_mut().filters = self.filter_states();
        self.inner.draw_name(GROUP_FILTER);

        // Mode changes coalesce with keystrokes on the same idle window.
        self.query.touch(self.clock.now_ms());
    }

    fn decorate_search(&mut self) {
        self.inner.scope_mut().filters = self.filter_states();

        let filter = {
            let provider = Arc::clone(&self.provider);
            UiSlot::with_role(
                move |scope: &RenderScope| provider.filter_item(&scope.filters),
                SlotRole::CycleFilter,
            )
        };
        self.inner.set_slot_by_name(GROUP_FILTER, Rc::new(filter));
        self.inner.draw_name(GROUP_FILTER);

        let search_input = {
            let provider = Arc::clone(&self.provider);
            UiSlot::with_role(
                move |scope: &RenderScope| provider.search_input_item(&scope.filters),
                SlotRole::CycleFilter,
            )
        };
        self.inner.set_slot_by_name(GROUP_SEARCH_INPUT, Rc::new(search_input));
        self.inner.draw_name(GROUP_SEARCH_INPUT);

        let result = {
            let provider = Arc::clone(&self.provider);
            UiSlot::with_role(
                move |scope: &RenderScope| provider.result_item(&scope.query),
                SlotRole::CycleFilter,
            )
        };
        self.inner.set_slot_by_name(GROUP_RESULT, Rc::new(result));
        self.inner.draw_name(GROUP_RESULT);

        if self.on_back.is_some() {
            let back = {
                let provider = Arc::clone(&self.provider);
                UiSlot::with_role(move |_: &RenderScope| provider.back_item(), SlotRole::Back)
            };
            self.inner.set_slot_by_name(GROUP_BACK, Rc::new(back));
            self.inner.draw_name(GROUP_BACK);
        }

        self.refilter();
    }
}

impl<U, T, P, F> Pageable<T> for SearchUi<U, T, P, F>
where
    U: GridUi + Pageable<T>,
    T: Clone + Ord,
    P: SearchLayoutProvider + 'static,
    F: SearchFilter<T> + 'static,
{
    fn set_items(&mut self, items: Vec<DataBoundSlot<T>>) {
        self.all_items = items;
        if self.inner.is_registered() {
            self.refilter();
        }
    }

    fn page_stats(&self) -> PageStats {
        self.inner.page_stats()
    }

    fn data_at_cell(&self, cell: usize) -> Option<&T> {
        self.inner.data_at_cell(cell)
    }
}

impl<U, T, P, F> GridUi for SearchUi<U, T, P, F>
where
    U: GridUi + Pageable<T>,
    T: Clone + Ord,
    P: SearchLayoutProvider + 'static,
    F: SearchFilter<T> + 'static,
{
    fn show(&mut self) {
        self.inner.show();
        self.decorate_search();
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
        match self.inner.handle_interaction(interaction) {
            Some(SlotRole::CycleFilter) => {
                self.cycle_filter();
                None
            }
            Some(SlotRole::Back) => match &self.on_back {
                Some(on_back) => {
                    on_back();
                    None
                }
                None => Some(SlotRole::Back),
            },
            other => other,
        }
    }

    fn handle_close(&mut self) {
        self.inner.handle_close();
    }

    fn handle_tick(&mut self, time: u64) {
        self.inner.handle_tick(time);

        if self.query.take_due(self.clock.now_ms()) {
            self.refilter();
        }
    }

    fn handle_text_input(&mut self, text: &str) {
        self.query.set(text, self.clock.now_ms());
        // The result decoration tracks the raw query immediately; the
        // dataset follows once the debounce settles.
        self.inner.scope_mut().query = self.query.text().to_string();
        self.inner.draw_name(GROUP_RESULT);
    }

    fn scope(&self) -> &RenderScope {
        self.inner.scope()
    }

    fn scope_mut(&mut self) -> &mut RenderScope {
        self.inner.scope_mut()
    }
}
