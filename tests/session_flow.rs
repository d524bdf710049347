//! End-to-end session flows over a recording fake host.
//!
//! Simulates the exact wiring a real host adapter provides - grid writes,
//! overlay pushes, region blocking, click routing and the periodic tick -
//! with no real windows and no real time. Run with: cargo test --test
//! session_flow

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use slotgrid::{
    AnimationConfig, BaseGridUi, CancelHandle, CapabilityTags, ChoiceLayoutProvider,
    ClickClassification, ClickKind, ClickReport, Clock, DataBoundSlot, FakeSlotUi, FilterState,
    GridHandle, GridKind, GridPort, GridUi, Item, LayoutProvider, Override, OverlayPort,
    OverrideLookup, PageLayoutProvider, PageStats, Pageable, PageableUi, RawAction, RegionSet,
    SearchFilter, SearchLayoutProvider, SearchUi, SessionId, SessionRegistry, SingleChoiceUi,
    SlotRole, UiSlot, ViewerId,
};

// =============================================================================
// Recording host
// =============================================================================

#[derive(Default)]
struct HostState {
    cells: HashMap<usize, Option<Item>>,
    pushes: Vec<(usize, Override)>,
    blocked: Option<RegionSet>,
    lookup: Option<OverrideLookup>,
    unblocks: u32,
    cursor_refreshes: u32,
    own_restores: u32,
    open: bool,
    closed: bool,
    classification: Option<ClickClassification>,
}

#[derive(Clone, Default)]
struct RecordingHost(Rc<RefCell<HostState>>);

impl RecordingHost {
    fn cell(&self, index: usize) -> Option<Item> {
        self.0.borrow().cells.get(&index).cloned().flatten()
    }

    fn last_push_for(&self, index: usize) -> Option<Override> {
        self.0
            .borrow()
            .pushes
            .iter()
            .rev()
            .find(|(cell, _)| *cell == index)
            .map(|(_, value)| value.clone())
    }
}

impl GridPort for RecordingHost {
    fn open_grid(&self, _viewer: ViewerId, _size: usize, _title: &str) -> GridHandle {
        self.0.borrow_mut().open = true;
        GridHandle(1)
    }

    fn write_cell(&self, _grid: GridHandle, index: usize, item: Option<&Item>) {
        self.0.borrow_mut().cells.insert(index, item.cloned());
    }

    fn read_cell(&self, _grid: GridHandle, index: usize) -> Option<Item> {
        self.cell(index)
    }

    fn close_grid(&self, _grid: GridHandle) {
        self.0.borrow_mut().closed = true;
    }

    fn is_topmost(&self, _viewer: ViewerId, _grid: GridHandle) -> bool {
        let state = self.0.borrow();
        state.open && !state.closed
    }
}

impl OverlayPort for RecordingHost {
    fn push_override(&self, _viewer: ViewerId, index: usize, value: &Override) {
        self.0.borrow_mut().pushes.push((index, value.clone()));
    }

    fn block_regions(&self, _viewer: ViewerId, regions: RegionSet, lookup: OverrideLookup) {
        let mut state = self.0.borrow_mut();
        state.blocked = Some(regions);
        state.lookup = Some(lookup);
    }

    fn unblock_regions(&self, _viewer: ViewerId) {
        self.0.borrow_mut().unblocks += 1;
    }

    fn refresh_cursor(&self, _viewer: ViewerId) {
        self.0.borrow_mut().cursor_refreshes += 1;
    }

    fn restore_own_inventory(&self, _viewer: ViewerId) {
        self.0.borrow_mut().own_restores += 1;
    }

    fn last_click_classification(&self, _viewer: ViewerId) -> Option<ClickClassification> {
        self.0.borrow().classification
    }
}

struct FakeClock {
    now: Cell<u64>,
}

impl FakeClock {
    fn new() -> Arc<Self> {
        Arc::new(Self { now: Cell::new(0) })
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

// =============================================================================
// Layouts
// =============================================================================

/// Six-row menu: page content on row 1, navigation on the bottom row.
struct MenuLayout {
    animation: AnimationConfig,
}

impl LayoutProvider for MenuLayout {
    fn grid_kind(&self) -> GridKind {
        GridKind::Rows(6)
    }

    fn title(&self, viewer_name: &str) -> String {
        format!("{viewer_name}'s storage")
    }

    fn slot_groups(&self, _grid_size: usize) -> HashMap<String, BTreeSet<usize>> {
        let mut groups = HashMap::new();
        groups.insert("previous_page".to_string(), BTreeSet::from([45]));
        groups.insert("current_page".to_string(), BTreeSet::from([49]));
        groups.insert("next_page".to_string(), BTreeSet::from([53]));
        groups.insert("search".to_string(), BTreeSet::from([8]));
        groups
    }

    fn animation(&self) -> AnimationConfig {
        self.animation
    }
}

impl PageLayoutProvider for MenuLayout {
    fn pagination_cells(&self, _grid_size: usize) -> Vec<usize> {
        (9..18).collect()
    }

    fn previous_page_item(&self, _stats: &PageStats) -> Option<Item> {
        Some(Item::new(100, 1, "previous"))
    }

    fn current_page_item(&self, stats: &PageStats) -> Option<Item> {
        Some(Item::new(
            101,
            1,
            format!("page {}/{}", stats.current_page_display, stats.page_count),
        ))
    }

    fn next_page_item(&self, _stats: &PageStats) -> Option<Item> {
        Some(Item::new(102, 1, "next"))
    }
}

impl ChoiceLayoutProvider for MenuLayout {
    fn search_launcher_item(&self) -> Option<Item> {
        Some(Item::new(103, 1, "search"))
    }
}

/// Narrow three-cell search surface paging into the own-inventory extension.
struct SearchLayout;

impl LayoutProvider for SearchLayout {
    fn grid_kind(&self) -> GridKind {
        GridKind::Narrow(3)
    }

    fn title(&self, _viewer_name: &str) -> String {
        "search".to_string()
    }

    fn slot_groups(&self, _grid_size: usize) -> HashMap<String, BTreeSet<usize>> {
        let mut groups = HashMap::new();
        groups.insert("filter".to_string(), BTreeSet::from([0]));
        groups.insert("search_input".to_string(), BTreeSet::from([1]));
        groups.insert("result".to_string(), BTreeSet::from([2]));
        groups
    }
}

impl PageLayoutProvider for SearchLayout {
    fn pagination_cells(&self, _grid_size: usize) -> Vec<usize> {
        (3..12).collect()
    }

    fn previous_page_item(&self, _stats: &PageStats) -> Option<Item> {
        None
    }

    fn current_page_item(&self, _stats: &PageStats) -> Option<Item> {
        None
    }

    fn next_page_item(&self, _stats: &PageStats) -> Option<Item> {
        None
    }
}

impl SearchLayoutProvider for SearchLayout {
    fn debounce_ms(&self) -> u64 {
        1_000
    }

    fn filter_item(&self, filters: &[FilterState]) -> Option<Item> {
        let active = filters
            .iter()
            .find(|state| state.active)
            .map(|state| state.name)
            .unwrap_or("?");
        Some(Item::new(110, 1, format!("filter: {active}")))
    }

    fn search_input_item(&self, _filters: &[FilterState]) -> Option<Item> {
        Some(Item::new(111, 1, "type to search"))
    }

    fn result_item(&self, query: &str) -> Option<Item> {
        Some(Item::new(112, 1, format!("results for '{query}'")))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Name,
    Nothing,
}

impl SearchFilter<String> for Mode {
    fn all() -> &'static [Self] {
        &[Mode::Name, Mode::Nothing]
    }

    fn name(&self) -> &'static str {
        match self {
            Mode::Name => "name",
            Mode::Nothing => "nothing",
        }
    }

    fn words(&self, data: &String) -> Vec<String> {
        match self {
            Mode::Name => data.split_whitespace().map(|w| w.to_lowercase()).collect(),
            Mode::Nothing => Vec::new(),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn numbered_items(count: u32) -> Vec<DataBoundSlot<u32>> {
    (0..count)
        .map(|value| {
            DataBoundSlot::new(
                value,
                UiSlot::supplied(move |_| Some(Item::new(value, 1, format!("item {value}")))),
            )
        })
        .collect()
}

fn named_items(names: &[&str]) -> Vec<DataBoundSlot<String>> {
    names
        .iter()
        .map(|name| {
            let item_name = name.to_string();
            DataBoundSlot::new(
                name.to_string(),
                UiSlot::supplied(move |_| Some(Item::new(1, 1, item_name.clone()))),
            )
        })
        .collect()
}

fn left_click(cell: usize) -> ClickReport {
    ClickReport {
        cell,
        in_top_grid: true,
        click: ClickKind::Left,
        action: RawAction::Take,
        cancel: CancelHandle::new(|| {}),
    }
}

fn right_click(cell: usize) -> ClickReport {
    ClickReport {
        click: ClickKind::Right,
        ..left_click(cell)
    }
}

type MenuChain = PageableUi<BaseGridUi<RecordingHost>, u32, MenuLayout>;

fn menu_session(
    animation: AnimationConfig,
) -> (Arc<Mutex<MenuChain>>, SessionId, SessionRegistry<RecordingHost>, RecordingHost) {
    let host = RecordingHost::default();
    let provider = Arc::new(MenuLayout { animation });
    let base = BaseGridUi::new(host.clone(), ViewerId(1), "ada", provider.as_ref());
    let chain: MenuChain = PageableUi::new(base, provider);

    let session = Arc::new(Mutex::new(chain));
    let mut registry = SessionRegistry::new(host.clone());
    let id = registry.register(Arc::clone(&session), CapabilityTags::TICKABLE);
    registry.open(id).unwrap();

    (session, id, registry, host)
}

// =============================================================================
// Pagination
// =============================================================================

#[test]
fn paginates_25_items_into_3_pages_and_navigates() {
    let (session, id, registry, host) = menu_session(AnimationConfig::DISABLED);

    session.lock().unwrap().set_items(numbered_items(25));
    assert_eq!(session.lock().unwrap().page_stats().page_count, 3);

    // Page 0 fills the reserved row.
    assert_eq!(host.cell(9).map(|i| i.name), Some("item 0".to_string()));
    assert_eq!(host.cell(17).map(|i| i.name), Some("item 8".to_string()));
    assert_eq!(host.cell(49).map(|i| i.name), Some("page 1/3".to_string()));

    // Next: one page forward.
    registry.route_click(id, left_click(53));
    assert_eq!(host.cell(9).map(|i| i.name), Some("item 9".to_string()));
    assert_eq!(host.cell(49).map(|i| i.name), Some("page 2/3".to_string()));

    // Back on page 0, the alternate next-click jumps to the last page.
    registry.route_click(id, left_click(45));
    registry.route_click(id, right_click(53));
    assert_eq!(host.cell(9).map(|i| i.name), Some("item 18".to_string()));
    // The last page holds 7 items; trailing cells clear.
    assert_eq!(host.cell(15).map(|i| i.name), Some("item 24".to_string()));
    assert_eq!(host.cell(16), None);
    assert_eq!(host.cell(49).map(|i| i.name), Some("page 3/3".to_string()));

    // The alternate previous-click jumps home.
    registry.route_click(id, right_click(45));
    assert_eq!(host.cell(9).map(|i| i.name), Some("item 0".to_string()));

    // Previous on the first page is a no-op.
    registry.route_click(id, left_click(45));
    assert_eq!(host.cell(49).map(|i| i.name), Some("page 1/3".to_string()));
}

#[test]
fn navigation_clicks_are_vetoed_control_cells() {
    let (session, id, registry, _host) = menu_session(AnimationConfig::DISABLED);
    session.lock().unwrap().set_items(numbered_items(25));

    let cancelled = Rc::new(Cell::new(false));
    let seen = Rc::clone(&cancelled);
    registry.route_click(
        id,
        ClickReport {
            cancel: CancelHandle::new(move || seen.set(true)),
            ..left_click(53)
        },
    );
    assert!(cancelled.get());
}

#[test]
fn quick_move_classification_recovers_to_cross_surface_action() {
    let (session, id, registry, host) = menu_session(AnimationConfig::DISABLED);
    session.lock().unwrap().set_items(numbered_items(5));

    // An unmanaged own-surface click normally falls through...
    let cancelled = Rc::new(Cell::new(false));
    let seen = Rc::clone(&cancelled);
    registry.route_click(
        id,
        ClickReport {
            in_top_grid: false,
            cancel: CancelHandle::new(move || seen.set(true)),
            ..left_click(60)
        },
    );
    assert!(!cancelled.get());

    // ...but a recovered quick-move is a cross-surface action and cancels.
    host.0.borrow_mut().classification = Some(ClickClassification::QuickMove);
    let cancelled = Rc::new(Cell::new(false));
    let seen = Rc::clone(&cancelled);
    registry.route_click(
        id,
        ClickReport {
            in_top_grid: false,
            cancel: CancelHandle::new(move || seen.set(true)),
            ..left_click(60)
        },
    );
    assert!(cancelled.get());
}

// =============================================================================
// Animation
// =============================================================================

#[test]
fn page_transition_slides_and_settles() {
    let (session, id, registry, host) = menu_session(AnimationConfig::new(true, 1));
    session.lock().unwrap().set_items(numbered_items(27));

    registry.route_click(id, left_click(53));

    // Frame 0 of the slide-left: the old page shifted one column, the first
    // new column entering on the right.
    assert_eq!(host.cell(9).map(|i| i.name), Some("item 1".to_string()));
    assert_eq!(host.cell(17).map(|i| i.name), Some("item 9".to_string()));

    // Cells outside the page mask never animate.
    assert_eq!(host.cell(49).map(|i| i.name), Some("page 2/3".to_string()));

    // Eight more frames finish the slide.
    for time in 1..=8 {
        registry.tick(time);
    }
    assert_eq!(host.cell(9).map(|i| i.name), Some("item 9".to_string()));
    assert_eq!(host.cell(17).map(|i| i.name), Some("item 17".to_string()));
}

#[test]
fn interaction_fast_forwards_transition_in_flight() {
    let (session, id, registry, host) = menu_session(AnimationConfig::new(true, 1));
    session.lock().unwrap().set_items(numbered_items(27));

    registry.route_click(id, left_click(53));
    assert_eq!(host.cell(9).map(|i| i.name), Some("item 1".to_string()));

    // Any interaction mid-slide settles the target state before dispatch.
    registry.route_click(id, left_click(30));
    assert_eq!(host.cell(9).map(|i| i.name), Some("item 9".to_string()));
    assert_eq!(host.cell(17).map(|i| i.name), Some("item 17".to_string()));
}

// =============================================================================
// Search surface
// =============================================================================

type SearchChain = SearchUi<
    PageableUi<FakeSlotUi<RecordingHost, RecordingHost>, String, SearchLayout>,
    String,
    SearchLayout,
    Mode,
>;

fn search_session(
    clock: Arc<FakeClock>,
) -> (Arc<Mutex<SearchChain>>, SessionId, SessionRegistry<RecordingHost>, RecordingHost) {
    let host = RecordingHost::default();
    let provider = Arc::new(SearchLayout);
    let base = BaseGridUi::new(host.clone(), ViewerId(1), "ada", provider.as_ref());
    let fake = FakeSlotUi::new(base, host.clone(), true, clock.clone() as Arc<dyn Clock>);
    let pageable: PageableUi<_, String, _> = PageableUi::new(fake, Arc::clone(&provider));
    let chain: SearchChain = SearchUi::new(pageable, provider, Mode::Name, clock as Arc<dyn Clock>);

    let session = Arc::new(Mutex::new(chain));
    let mut registry = SessionRegistry::new(host.clone());
    let id = registry.register(
        Arc::clone(&session),
        CapabilityTags::TICKABLE | CapabilityTags::TEXT_INPUT,
    );
    registry.open(id).unwrap();

    (session, id, registry, host)
}

#[test]
fn search_surface_is_fully_deceived() {
    let clock = FakeClock::new();
    let (session, _id, _registry, host) = search_session(clock);
    session
        .lock()
        .unwrap()
        .set_items(named_items(&["apple", "banana"]));

    // The narrow surface never takes real writes; everything is an override.
    assert!(host.0.borrow().cells.is_empty());
    assert_eq!(
        host.last_push_for(0).and_then(|o| o.as_item().cloned()).map(|i| i.name),
        Some("filter: name".to_string())
    );
    assert_eq!(
        host.last_push_for(3).and_then(|o| o.as_item().cloned()).map(|i| i.name),
        Some("apple".to_string())
    );

    // Both the top grid and the own-inventory extension are blocked, and the
    // host's lookup sees the live cache, cached-empty included.
    assert_eq!(host.0.borrow().blocked, Some(RegionSet::TOP | RegionSet::OWN));
    let lookup = host.0.borrow().lookup.clone().unwrap();
    let read = lookup.as_ref();
    assert_eq!(
        read(4).and_then(|o| o.as_item().cloned()).map(|i| i.name),
        Some("banana".to_string())
    );
    assert_eq!(read(5), Some(Override::Empty));
    assert_eq!(read(40), None);
}

#[test]
fn query_refilters_only_after_debounce_tick() {
    let clock = FakeClock::new();
    let (session, id, registry, host) = search_session(Arc::clone(&clock));
    session
        .lock()
        .unwrap()
        .set_items(named_items(&["apple pie", "apple", "banana"]));

    clock.now.set(10_000);
    registry.route_text_input(id, "apple");

    // The result decoration reacts immediately; the dataset does not.
    assert_eq!(
        host.last_push_for(2).and_then(|o| o.as_item().cloned()).map(|i| i.name),
        Some("results for 'apple'".to_string())
    );
    assert_eq!(
        host.last_push_for(5).and_then(|o| o.as_item().cloned()).map(|i| i.name),
        Some("banana".to_string())
    );

    // Ticks inside the idle window do nothing.
    clock.now.set(10_500);
    registry.tick(1);
    assert_eq!(
        host.last_push_for(5).and_then(|o| o.as_item().cloned()).map(|i| i.name),
        Some("banana".to_string())
    );

    // Once the window elapses the filter runs: "apple" outranks "apple pie",
    // "banana" is rejected and its cell deceives empty.
    clock.now.set(11_000);
    registry.tick(2);
    assert_eq!(
        host.last_push_for(3).and_then(|o| o.as_item().cloned()).map(|i| i.name),
        Some("apple".to_string())
    );
    assert_eq!(
        host.last_push_for(4).and_then(|o| o.as_item().cloned()).map(|i| i.name),
        Some("apple pie".to_string())
    );
    assert_eq!(host.last_push_for(5), Some(Override::Empty));

    // Consumed: the next tick does not filter again.
    clock.now.set(20_000);
    registry.tick(3);
}

#[test]
fn filter_cycle_rearms_debounce_and_refilters() {
    let clock = FakeClock::new();
    let (session, id, registry, host) = search_session(Arc::clone(&clock));
    session
        .lock()
        .unwrap()
        .set_items(named_items(&["apple", "banana"]));

    clock.now.set(5_000);
    registry.route_text_input(id, "apple");
    clock.now.set(6_000);
    registry.tick(1);
    assert_eq!(host.last_push_for(4), Some(Override::Empty));

    // Cycling the filter mode is itself a deceived-cell click: vetoed,
    // re-pushed, and the mode advances.
    clock.now.set(7_000);
    let cancelled = Rc::new(Cell::new(false));
    let seen = Rc::clone(&cancelled);
    registry.route_click(
        id,
        ClickReport {
            cancel: CancelHandle::new(move || seen.set(true)),
            ..left_click(0)
        },
    );
    assert!(cancelled.get());
    assert_eq!(
        host.last_push_for(0).and_then(|o| o.as_item().cloned()).map(|i| i.name),
        Some("filter: nothing".to_string())
    );

    // The "nothing" mode rejects every candidate once the debounce settles.
    clock.now.set(8_000);
    registry.tick(2);
    assert_eq!(host.last_push_for(3), Some(Override::Empty));
}

#[test]
fn consolidation_repushes_similar_overrides_within_window() {
    let clock = FakeClock::new();
    let (session, id, registry, host) = search_session(Arc::clone(&clock));
    session
        .lock()
        .unwrap()
        .set_items(named_items(&["gem", "gem", "coal"]));

    clock.now.set(10_000);
    registry.route_click(id, left_click(3));
    host.0.borrow_mut().pushes.clear();

    // Second left click within the window: both similar cells re-pushed.
    clock.now.set(10_300);
    registry.route_click(id, left_click(4));
    let pushed: Vec<usize> = host
        .0
        .borrow()
        .pushes
        .iter()
        .map(|(cell, _)| *cell)
        .filter(|cell| *cell == 3 || *cell == 4)
        .collect();
    assert!(pushed.contains(&3));
    assert!(pushed.contains(&4));
    assert_eq!(host.0.borrow().cursor_refreshes, 2);

    // Outside the window only the clicked cell re-asserts.
    host.0.borrow_mut().pushes.clear();
    clock.now.set(11_000);
    registry.route_click(id, left_click(3));
    let pushed: Vec<usize> = host
        .0
        .borrow()
        .pushes
        .iter()
        .map(|(cell, _)| *cell)
        .filter(|cell| *cell == 3 || *cell == 4)
        .collect();
    assert_eq!(pushed, vec![3]);
}

#[test]
fn teardown_unblocks_and_restores_own_inventory() {
    let clock = FakeClock::new();
    let (session, id, mut registry, host) = search_session(clock);
    session.lock().unwrap().set_items(named_items(&["apple"]));

    registry.route_close(id);
    assert_eq!(host.0.borrow().unblocks, 1);
    assert_eq!(host.0.borrow().own_restores, 1);
    assert!(!registry.is_registered(id));

    // Idempotent: an explicit handle_close after teardown does nothing more.
    session.lock().unwrap().handle_close();
    assert_eq!(host.0.borrow().own_restores, 1);
}

// =============================================================================
// Single choice
// =============================================================================

#[test]
fn choice_cells_select_their_datum() {
    let host = RecordingHost::default();
    let provider = Arc::new(MenuLayout {
        animation: AnimationConfig::DISABLED,
    });
    let base = BaseGridUi::new(host.clone(), ViewerId(1), "ada", provider.as_ref());
    let pageable: PageableUi<_, u32, _> = PageableUi::new(base, Arc::clone(&provider));

    let selected = Rc::new(RefCell::new(Vec::new()));
    let opened = Rc::new(Cell::new(false));
    let seen = Rc::clone(&selected);
    let seen_open = Rc::clone(&opened);
    let choice = SingleChoiceUi::new(pageable, provider, move |data: &u32, _| {
        seen.borrow_mut().push(*data);
    })
    .with_search_opener(move || seen_open.set(true));

    let session = Arc::new(Mutex::new(choice));
    let mut registry = SessionRegistry::new(host.clone());
    let id = registry.register(Arc::clone(&session), CapabilityTags::empty());
    registry.open(id).unwrap();

    let items: Vec<DataBoundSlot<u32>> = (0..12)
        .map(|value| {
            DataBoundSlot::new(
                value,
                UiSlot::with_role(
                    move |_| Some(Item::new(value, 1, format!("choice {value}"))),
                    SlotRole::Select,
                ),
            )
        })
        .collect();
    session.lock().unwrap().set_items(items);

    // Third page cell selects the third datum.
    registry.route_click(id, left_click(11));
    assert_eq!(*selected.borrow(), vec![2]);

    // The launcher cell hands session spawning to the embedding caller.
    registry.route_click(id, left_click(8));
    assert!(opened.get());
}
