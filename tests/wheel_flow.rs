use quickwheel::{
    DisplayItem, EventKind, ItemAdapter, JsonFileLayoutStore, LayoutStore, Point, ReentryPolicy,
    Wheel, WheelConfig, WheelEvent, WheelState, WheelView,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
struct Item {
    name: &'static str,
    count: u32,
}

fn item(name: &'static str, count: u32) -> Item {
    Item { name, count }
}

fn adapter() -> Rc<dyn ItemAdapter<Item>> {
    Rc::new(|i: &Item| Some(DisplayItem::new(i.name)))
}

fn loaded(config: WheelConfig) -> Rc<Wheel<Item>> {
    let wheel = Rc::new(Wheel::new(config, adapter()).unwrap());
    for (index, name) in ["bandage", "pistol", "rifle", "knife", "torch", "map"]
        .into_iter()
        .enumerate()
    {
        wheel.set_slot(index, item(name, 1));
    }
    wheel
}

fn events(wheel: &Wheel<Item>) -> Rc<RefCell<Vec<WheelEvent<Item>>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    wheel.subscribe(move |e| sink.borrow_mut().push(e.clone()));
    log
}

#[test]
fn commit_and_cancel_round_trip() {
    let wheel = loaded(WheelConfig::default());
    let used = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&used);
    wheel.on_item_selected(move |index, item| sink.borrow_mut().push((index, item.cloned())));

    wheel.show();
    wheel.manual_set_hover(Some(3));
    assert_eq!(wheel.hide(true, false), Some(3));
    assert_eq!(wheel.selected_index(), Some(3));
    assert_eq!(used.borrow().as_slice(), [(3, Some(item("knife", 1)))]);

    let log = events(&wheel);
    wheel.show();
    wheel.manual_set_hover(Some(3));
    assert_eq!(wheel.hide(false, false), None);

    assert_eq!(used.borrow().len(), 1);
    assert!(log.borrow().contains(&WheelEvent::Hidden(None)));
    assert_eq!(wheel.selected_index(), Some(3));
}

#[test]
fn swap_twice_restores_contents() {
    let wheel = loaded(WheelConfig::default());
    let before = wheel.snapshot();
    let log = events(&wheel);

    assert!(wheel.swap_slots(2, 5));
    assert_eq!(wheel.get_slot(2), Some(item("map", 1)));
    assert!(wheel.swap_slots(2, 5));

    assert_eq!(wheel.snapshot(), before);
    assert_eq!(wheel.slot_order(), (0..9).collect::<Vec<_>>());
    assert_eq!(
        log.borrow().as_slice(),
        [
            WheelEvent::SlotsSwapped { a: 2, b: 5 },
            WheelEvent::SlotsSwapped { a: 2, b: 5 },
        ]
    );
}

#[test]
fn nested_set_slot_is_not_redispatched() {
    let wheel = loaded(WheelConfig::default());
    let dispatched = Rc::new(Cell::new(0));
    let weak = Rc::downgrade(&wheel);
    let count = Rc::clone(&dispatched);
    wheel.subscribe_kind(EventKind::SlotChanged, move |event| {
        count.set(count.get() + 1);
        if let (WheelEvent::SlotChanged { index, item: Some(i) }, Some(wheel)) =
            (event, weak.upgrade())
        {
            // restack the same slot from inside the handler
            wheel.set_slot(*index, item(i.name, i.count + 1));
        }
    });

    assert!(wheel.set_slot(0, item("bandage", 5)));
    assert_eq!(dispatched.get(), 1);
    assert_eq!(wheel.get_slot(0), Some(item("bandage", 6)));
}

#[test]
fn nested_events_queue_when_configured() {
    let wheel = loaded(WheelConfig {
        reentry: ReentryPolicy::Queue,
        ..WheelConfig::default()
    });
    let weak = Rc::downgrade(&wheel);
    let log = events(&wheel);
    wheel.subscribe_kind(EventKind::Shown, move |_| {
        if let Some(wheel) = weak.upgrade() {
            wheel.set_selected_index(Some(1));
        }
    });

    wheel.show();
    let log = log.borrow();
    let shown = log.iter().position(|e| *e == WheelEvent::Shown).unwrap();
    let selected = log
        .iter()
        .position(|e| *e == WheelEvent::SelectionChanged(Some(1)))
        .unwrap();
    assert!(selected > shown);
    assert_eq!(wheel.state(), WheelState::Active);
}

#[test]
fn hover_handler_can_confirm() {
    let wheel = loaded(WheelConfig::default());
    let weak = Rc::downgrade(&wheel);
    wheel.subscribe_kind(EventKind::Hovered, move |event| {
        if let (WheelEvent::Hovered(Some(_)), Some(wheel)) = (event, weak.upgrade()) {
            wheel.manual_confirm();
        }
    });

    wheel.show();
    wheel.manual_set_hover(Some(4));

    assert_eq!(wheel.state(), WheelState::Hidden);
    assert_eq!(wheel.selected_index(), Some(4));
}

#[test]
fn dispose_twice_fires_no_teardown_events() {
    struct CountingView(Rc<Cell<u32>>);

    impl WheelView<Item> for CountingView {
        fn attach(&mut self, _: Rc<dyn ItemAdapter<Item>>, _: usize) {}
        fn detach(&mut self) {
            self.0.set(self.0.get() + 1);
        }
        fn on_wheel_shown(&mut self) {}
        fn on_wheel_hidden(&mut self, _: Option<usize>) {}
        fn on_slot_data_changed(&mut self, _: usize, _: Option<&Item>) {}
        fn on_slots_swapped(&mut self, _: usize, _: usize) {}
        fn on_selection_changed(&mut self, _: Option<usize>) {}
        fn on_hover_changed(&mut self, _: Option<usize>) {}
        fn wheel_center(&self) -> Point {
            Point::default()
        }
    }

    let detached = Rc::new(Cell::new(0));
    let wheel = loaded(WheelConfig::default());
    wheel.set_view(Box::new(CountingView(Rc::clone(&detached))));
    let log = events(&wheel);

    wheel.dispose();
    wheel.dispose();
    drop(wheel);

    assert_eq!(detached.get(), 1);
    assert!(log.borrow().is_empty());
}

#[test]
fn layout_survives_restart_on_disk() {
    let dir = std::env::temp_dir().join(format!("quickwheel-flow-{}", std::process::id()));
    let _ = fs_err::remove_dir_all(&dir);
    let store: Rc<dyn LayoutStore> = Rc::new(JsonFileLayoutStore::new(&dir).unwrap());
    let config = WheelConfig {
        enable_persistence: true,
        persistence_key: "survival/hotbar".into(),
        ..WheelConfig::default()
    };

    let first = loaded(config.clone());
    first.set_persistence(Rc::clone(&store));
    first.show();
    let session = first.begin_drag(0).unwrap();
    assert!(first.finish_drag(session, 4));
    first.manual_set_hover(Some(4));
    first.hide(true, false);
    // selection alone is not persisted until the next swap
    assert!(first.swap_slots(1, 2));
    first.dispose();

    let second = Wheel::new(config, adapter()).unwrap();
    second.set_persistence(Rc::clone(&store));
    assert_eq!(second.selected_index(), Some(4));

    let layout = second.layout();
    let original: Vec<_> = ["bandage", "pistol", "rifle", "knife", "torch", "map"]
        .into_iter()
        .map(|n| Some(item(n, 1)))
        .chain(std::iter::repeat_n(None, 3))
        .collect();
    let arranged = layout.arrange(&original).unwrap();
    assert!(second.set_slots(arranged));
    assert_eq!(second.get_slot(4), Some(item("bandage", 1)));
    assert_eq!(second.get_slot(0), Some(item("torch", 1)));
    assert_eq!(second.get_slot(1), Some(item("rifle", 1)));

    let _ = fs_err::remove_dir_all(&dir);
}
