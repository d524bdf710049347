//! Single-choice layer.
//!
//! A pageable surface whose page cells each select one data-bound value.
//! Page cells carry [`SlotRole::Select`]; this layer resolves the clicked
//! cell back to its datum and hands it to the caller. An optional
//! search-launcher cell bubbles [`SlotRole::OpenSearch`] through a caller
//! closure, since spawning and registering the search session belongs to the
//! embedding application.

use std::rc::Rc;
use std::sync::Arc;

use crate::error::UiResult;
use crate::interaction::{Interaction, SlotRole};
use crate::layout::{ChoiceLayoutProvider, GROUP_SEARCH_LAUNCHER};
use crate::session::slot::{DataBoundSlot, UiSlot};
use crate::session::{GridUi, Pageable};
use crate::types::{GridKind, Item, PageStats, RenderScope, ViewerId};

/// Session layer resolving page-cell clicks to selections.
pub struct SingleChoiceUi<U, T, P>
where
    U: GridUi + Pageable<T>,
    P: ChoiceLayoutProvider,
{
    inner: U,
    provider: Arc<P>,
    on_select: Box<dyn Fn(&T, &Interaction)>,
    on_open_search: Option<Box<dyn Fn()>>,
    /// Notifies an attached live search surface that the dataset changed.
    search_sync: Option<Box<dyn Fn()>>,
}

impl<U, T, P> SingleChoiceUi<U, T, P>
where
    U: GridUi + Pageable<T>,
    P: ChoiceLayoutProvider + 'static,
{
    pub fn new(inner: U, provider: Arc<P>, on_select: impl Fn(&T, &Interaction) + 'static) -> Self {
        Self {
            inner,
            provider,
            on_select: Box::new(on_select),
            on_open_search: None,
            search_sync: None,
        }
    }

    /// Handle the layout's search-launcher cell by opening a search surface.
    pub fn with_search_opener(mut self, on_open_search: impl Fn() + 'static) -> Self {
        self.on_open_search = Some(Box::new(on_open_search));
        self
    }

    /// Propagate dataset updates into an attached live search surface.
    pub fn with_search_sync(mut self, search_sync: impl Fn() + 'static) -> Self {
        self.search_sync = Some(Box::new(search_sync));
        self
    }

    fn decorate_choice(&mut self) {
        let Some(item) = self.provider.search_launcher_item() else {
            return;
        };
        let slot = UiSlot::with_role(move |_| Some(item.clone()), SlotRole::OpenSearch);
        self.inner.set_slot_by_name(GROUP_SEARCH_LAUNCHER, Rc::new(slot));
        self.inner.draw_name(GROUP_SEARCH_LAUNCHER);
    }
}

impl<U, T, P> Pageable<T> for SingleChoiceUi<U, T, P>
where
    U: GridUi + Pageable<T>,
    P: ChoiceLayoutProvider + 'static,
{
    fn set_items(&mut self, items: Vec<DataBoundSlot<T>>) {
        self.inner.set_items(items);
        if let Some(search_sync) = &self.search_sync {
            search_sync();
        }
    }

    fn page_stats(&self) -> PageStats {
        self.inner.page_stats()
    }

    fn data_at_cell(&self, cell: usize) -> Option<&T> {
        self.inner.data_at_cell(cell)
    }
}

impl<U, T, P> GridUi for SingleChoiceUi<U, T, P>
where
    U: GridUi + Pageable<T>,
    P: ChoiceLayoutProvider + 'static,
{
    fn show(&mut self) {
        self.inner.show();
        self.decorate_choice();
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
            Some(SlotRole::Select) => {
                if let Some(data) = self.inner.data_at_cell(interaction.cell) {
                    (self.on_select)(data, interaction);
                }
                None
            }
            Some(SlotRole::OpenSearch) => match &self.on_open_search {
                Some(on_open_search) => {
                    on_open_search();
                    None
                }
                None => Some(SlotRole::OpenSearch),
            },
            other => other,
        }
    }

    fn handle_close(&mut self) {
        self.inner.handle_close();
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
