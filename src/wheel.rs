use crate::bus::{Delivery, EventBus, SubscriptionId};
use crate::config::WheelConfig;
use crate::error::{UsageError, WheelError, reject};
use crate::events::{EventKind, WheelEvent};
use crate::geometry::Point;
use crate::input::{InputEvent, InputSource};
use crate::persistence::{LayoutData, LayoutStore};
use crate::provider::{DataProvider, ProviderEvent};
use crate::selection::{SelectionContext, SelectionStrategy, strategy_for};
use crate::slots::SlotStore;
use crate::state::{SelectionState, StateMachine, Transition, WheelState};
use crate::view::{ItemAdapter, WheelView};
use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

pub type ItemSelectedHandler<T> = Rc<dyn Fn(usize, Option<&T>)>;

type ViewCell<T> = Rc<RefCell<Option<Box<dyn WheelView<T>>>>>;

/// Handle for an in-flight drag. Consumed by [`Wheel::finish_drag`] or
/// [`Wheel::cancel_drag`].
#[derive(Debug, PartialEq, Eq)]
pub struct DragSession {
    source: usize,
    ticket: u64,
}

impl DragSession {
    pub fn source(&self) -> usize {
        self.source
    }
}

/// The quick-select wheel.
///
/// Every method takes `&self` so subscribers holding a `Weak<Wheel<T>>` can
/// call back in. Runtime misuse is logged and reported as `false` / `None`;
/// only construction can fail.
pub struct Wheel<T: Clone + 'static> {
    config: WheelConfig,
    adapter: Rc<dyn ItemAdapter<T>>,
    slots: RefCell<SlotStore<T>>,
    machine: RefCell<StateMachine>,
    selection: RefCell<SelectionState>,
    bus: EventBus<T>,
    view: ViewCell<T>,
    input: RefCell<Option<Box<dyn InputSource>>>,
    provider: RefCell<Option<Box<dyn DataProvider<T>>>>,
    store: RefCell<Option<Rc<dyn LayoutStore>>>,
    strategy: RefCell<Box<dyn SelectionStrategy>>,
    item_selected: RefCell<Vec<ItemSelectedHandler<T>>>,
    drag: Cell<Option<(u64, usize)>>,
    next_ticket: Cell<u64>,
    disposed: Cell<bool>,
}

impl<T: Clone + 'static> Wheel<T> {
    pub fn new(config: WheelConfig, adapter: Rc<dyn ItemAdapter<T>>) -> Result<Self, WheelError> {
        config.validate()?;
        let slot_count = config.slot_count;
        let wheel = Self {
            adapter,
            slots: RefCell::new(SlotStore::new(slot_count)),
            machine: RefCell::new(StateMachine::new()),
            selection: RefCell::new(SelectionState::new(slot_count)),
            bus: EventBus::new(config.reentry),
            view: Rc::new(RefCell::new(None)),
            input: RefCell::new(None),
            provider: RefCell::new(None),
            store: RefCell::new(None),
            strategy: RefCell::new(strategy_for(config.selection)),
            item_selected: RefCell::new(Vec::new()),
            drag: Cell::new(None),
            next_ticket: Cell::new(0),
            disposed: Cell::new(false),
            config,
        };
        log::debug!(
            "[Wheel] created: {} slots, {} selection",
            slot_count,
            wheel.config.selection
        );
        Ok(wheel)
    }

    fn ensure_live(&self) -> Result<(), UsageError> {
        if self.disposed.get() {
            Err(UsageError::Disposed)
        } else {
            Ok(())
        }
    }

    /// Hands `event` to the view, then to the bus. The view is not behind
    /// the bus lock, so it sees every change even when a nested publish is
    /// dropped or queued.
    fn publish(&self, event: WheelEvent<T>) -> Delivery {
        match self.view.try_borrow_mut() {
            Ok(mut slot) => {
                if let Some(view) = slot.as_mut() {
                    forward_to_view(view, &event);
                }
            }
            Err(_) => log::debug!("[Wheel] view busy, skipped {}", event.kind()),
        }
        self.bus.publish(event)
    }

    fn advance(&self, from: WheelState, action: &'static str) -> Result<Transition, UsageError> {
        let transition = self.machine.borrow_mut().advance_from(from, action)?;
        self.publish(WheelEvent::StateChanged {
            from: transition.from,
            to: transition.to,
        });
        Ok(transition)
    }

    fn ensure_active(&self, action: &'static str) -> Result<(), UsageError> {
        self.ensure_live()?;
        let state = self.state();
        if state == WheelState::Active {
            Ok(())
        } else {
            Err(UsageError::InvalidTransition { action, state })
        }
    }

    fn mutate<R>(
        &self,
        f: impl FnOnce(&mut SlotStore<T>) -> Result<R, UsageError>,
    ) -> Result<R, UsageError> {
        self.ensure_live()?;
        self.machine.borrow().ensure_mutable()?;
        f(&mut self.slots.borrow_mut())
    }

    fn check_index(&self, index: usize) -> Result<(), UsageError> {
        if index < self.config.slot_count {
            Ok(())
        } else {
            Err(UsageError::IndexOutOfRange {
                index,
                slot_count: self.config.slot_count,
            })
        }
    }

    pub fn show(&self) -> bool {
        let result = self.ensure_live().and_then(|()| {
            self.advance(WheelState::Hidden, "show")?;
            self.selection.borrow_mut().set_hovered(None)?;
            self.publish(WheelEvent::Shown);
            self.advance(WheelState::Showing, "show")
        });
        match result {
            Ok(_) => true,
            Err(e) => reject("show", e),
        }
    }

    /// Closes the wheel and reports the committed index.
    ///
    /// With `sync_hover_to_selected` the hovered slot becomes the selection
    /// and `SelectionChanged` follows `Hidden`. Otherwise, with
    /// `execute_selection`, the hovered slot is committed and handed to the
    /// item-selected handlers once the wheel is back at rest.
    pub fn hide(&self, execute_selection: bool, sync_hover_to_selected: bool) -> Option<usize> {
        if let Err(e) = self.ensure_active("hide") {
            reject("hide", e);
            return None;
        }

        let hovered = self.selection.borrow().hovered();
        let final_index = hovered.filter(|_| sync_hover_to_selected || execute_selection);
        if let Some(index) = final_index {
            log::debug!("[Wheel] committing slot {}", index);
            if let Err(e) = self.selection.borrow_mut().set_selected(Some(index)) {
                reject("hide", e);
            }
        }
        if self.drag.take().is_some() {
            log::debug!("[Wheel] drag abandoned by hide");
        }

        let result = self
            .advance(WheelState::Active, "hide")
            .and_then(|_| self.advance(WheelState::Hiding, "hide"));
        if let Err(e) = result {
            reject("hide", e);
            return None;
        }
        if let Err(e) = self.selection.borrow_mut().set_hovered(None) {
            reject("hide", e);
        }

        self.publish(WheelEvent::Hidden(final_index));

        if let Some(index) = final_index {
            if sync_hover_to_selected {
                self.publish(WheelEvent::SelectionChanged(Some(index)));
            } else {
                self.notify_item_selected(index);
            }
        }
        final_index
    }

    pub fn manual_confirm(&self) -> Option<usize> {
        self.hide(false, true)
    }

    pub fn manual_cancel(&self) {
        self.hide(false, false);
    }

    fn notify_item_selected(&self, index: usize) {
        let item = self.get_slot(index);
        let handlers = self.item_selected.borrow().clone();
        for handler in handlers {
            if catch_unwind(AssertUnwindSafe(|| handler(index, item.as_ref()))).is_err() {
                log::error!("[Wheel] item-selected handler panicked for slot {}", index);
            }
        }
    }

    fn put(&self, op: &'static str, index: usize, item: Option<T>) -> bool {
        match self.mutate(|slots| slots.set(index, item.clone())) {
            Ok(()) => {
                self.publish(WheelEvent::SlotChanged { index, item });
                true
            }
            Err(e) => reject(op, e),
        }
    }

    pub fn set_slot(&self, index: usize, item: T) -> bool {
        self.put("set_slot", index, Some(item))
    }

    pub fn remove_slot(&self, index: usize) -> bool {
        self.put("remove_slot", index, None)
    }

    /// `None` for empty or out-of-range slots.
    pub fn get_slot(&self, index: usize) -> Option<T> {
        self.slots.borrow().get(index)
    }

    /// Returns `false` without publishing when `a == b`.
    pub fn swap_slots(&self, a: usize, b: usize) -> bool {
        match self.mutate(|slots| slots.swap(a, b)) {
            Ok(true) => {
                self.publish(WheelEvent::SlotsSwapped { a, b });
                self.save_layout();
                true
            }
            Ok(false) => {
                log::debug!("[Wheel] swap of slot {} with itself ignored", a);
                false
            }
            Err(e) => reject("swap_slots", e),
        }
    }

    pub fn clear_all_slots(&self) -> bool {
        match self.mutate(|slots| {
            slots.clear();
            Ok(())
        }) {
            Ok(()) => {
                for index in 0..self.config.slot_count {
                    self.publish(WheelEvent::SlotChanged { index, item: None });
                }
                true
            }
            Err(e) => reject("clear_all_slots", e),
        }
    }

    /// Replaces every slot or none of them.
    pub fn set_slots(&self, items: Vec<Option<T>>) -> bool {
        match self.mutate(|slots| slots.set_all(items.clone())) {
            Ok(()) => {
                for (index, item) in items.into_iter().enumerate() {
                    self.publish(WheelEvent::SlotChanged { index, item });
                }
                true
            }
            Err(e) => reject("set_slots", e),
        }
    }

    pub fn snapshot(&self) -> Vec<Option<T>> {
        self.slots.borrow().snapshot()
    }

    pub fn slot_order(&self) -> Vec<usize> {
        self.slots.borrow().order().to_vec()
    }

    pub fn layout(&self) -> LayoutData {
        LayoutData::new(
            self.config.slot_count,
            self.selected_index(),
            self.slot_order(),
        )
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selection.borrow().selected()
    }

    pub fn hovered_index(&self) -> Option<usize> {
        self.selection.borrow().hovered()
    }

    pub fn set_selected_index(&self, index: Option<usize>) -> bool {
        let result = self
            .ensure_live()
            .and_then(|()| self.selection.borrow_mut().set_selected(index));
        match result {
            Ok(()) => {
                self.publish(WheelEvent::SelectionChanged(index));
                true
            }
            Err(e) => reject("set_selected_index", e),
        }
    }

    /// Sets the hover directly, in any state, and always publishes it.
    pub fn manual_set_hover(&self, index: Option<usize>) -> bool {
        let result = self
            .ensure_live()
            .and_then(|()| self.selection.borrow_mut().set_hovered(index));
        match result {
            Ok(_) => {
                self.publish(WheelEvent::Hovered(index));
                true
            }
            Err(e) => reject("manual_set_hover", e),
        }
    }

    /// Steps the selection to the next filled slot, forwards for positive
    /// `direction` and backwards for negative.
    pub fn cycle_selection(&self, direction: i32) -> bool {
        if let Err(e) = self.ensure_active("cycle selection") {
            return reject("cycle_selection", e);
        }
        if direction == 0 {
            return false;
        }

        let count = self.config.slot_count;
        let step = if direction > 0 { 1 } else { count - 1 };
        let start = self.selected_index().unwrap_or(0);
        let next = {
            let slots = self.slots.borrow();
            (1..=count)
                .map(|n| (start + n * step) % count)
                .find(|&i| slots.is_filled(i))
        };

        let Some(next) = next else {
            log::debug!("[Wheel] cycle found no filled slot");
            return false;
        };
        log::debug!("[Wheel] cycle selection {} -> {}", start, next);
        if let Err(e) = self.selection.borrow_mut().set_selected(Some(next)) {
            return reject("cycle_selection", e);
        }
        self.publish(WheelEvent::SelectionChanged(Some(next)));
        true
    }

    /// Selects `index` without using it and closes the wheel.
    pub fn click_slot(&self, index: usize) -> bool {
        let result = self.ensure_active("click").and_then(|()| {
            if !self.config.enable_click_select {
                return Err(UsageError::InteractionDisabled("click select"));
            }
            self.check_index(index)
        });
        if let Err(e) = result {
            return reject("click_slot", e);
        }

        self.publish(WheelEvent::SlotClicked(index));
        if let Err(e) = self.selection.borrow_mut().set_hovered(Some(index)) {
            return reject("click_slot", e);
        }
        self.hide(false, true).is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.get().is_some()
    }

    /// Picks up a filled slot. Pointer moves are ignored until the session
    /// ends.
    pub fn begin_drag(&self, index: usize) -> Option<DragSession> {
        let result = self.ensure_active("drag").and_then(|()| {
            if !self.config.enable_drag_swap {
                return Err(UsageError::InteractionDisabled("drag swap"));
            }
            self.check_index(index)?;
            if let Some((_, source)) = self.drag.get() {
                return Err(UsageError::DragInProgress(source));
            }
            if !self.slots.borrow().is_filled(index) {
                return Err(UsageError::EmptySlot(index));
            }
            Ok(())
        });
        if let Err(e) = result {
            reject("begin_drag", e);
            return None;
        }

        let ticket = self.next_ticket.get();
        self.next_ticket.set(ticket + 1);
        self.drag.set(Some((ticket, index)));
        log::debug!("[Wheel] drag started from slot {}", index);
        Some(DragSession {
            source: index,
            ticket,
        })
    }

    /// Drops the dragged item on `target`, swapping the two slots.
    pub fn finish_drag(&self, session: DragSession, target: usize) -> bool {
        if self.drag.get() != Some((session.ticket, session.source)) {
            return reject("finish_drag", UsageError::StaleDrag);
        }
        self.drag.set(None);

        let from = session.source;
        match self.mutate(|slots| slots.swap(from, target)) {
            Ok(true) => {
                self.publish(WheelEvent::SlotsSwapped { a: from, b: target });
                self.publish(WheelEvent::SlotsDragSwapped { from, to: target });
                self.save_layout();
                true
            }
            Ok(false) => {
                log::debug!("[Wheel] drag dropped back on slot {}", from);
                false
            }
            Err(e) => reject("finish_drag", e),
        }
    }

    pub fn cancel_drag(&self, session: DragSession) {
        if self.drag.get() == Some((session.ticket, session.source)) {
            self.drag.set(None);
            log::debug!("[Wheel] drag from slot {} cancelled", session.source);
        }
    }

    /// Attaches `view`, detaching any previous one, and replays the current
    /// slots, selection and hover into it.
    pub fn set_view(&self, mut view: Box<dyn WheelView<T>>) -> bool {
        if let Err(e) = self.ensure_live() {
            return reject("set_view", e);
        }
        let Ok(mut current) = self.view.try_borrow_mut() else {
            return reject("set_view", UsageError::ViewBusy);
        };
        if let Some(mut old) = current.take() {
            old.detach();
        }

        view.attach(Rc::clone(&self.adapter), self.config.slot_count);
        let slots = self.snapshot();
        for (index, item) in slots.iter().enumerate() {
            view.on_slot_data_changed(index, item.as_ref());
        }
        let (selected, hovered) = {
            let selection = self.selection.borrow();
            (selection.selected(), selection.hovered())
        };
        view.on_selection_changed(selected);
        view.on_hover_changed(hovered);

        *current = Some(view);
        true
    }

    /// Detaches and returns the current view.
    pub fn take_view(&self) -> Option<Box<dyn WheelView<T>>> {
        let mut view = self.view.try_borrow_mut().ok()?.take()?;
        view.detach();
        Some(view)
    }

    pub fn has_view(&self) -> bool {
        self.view.try_borrow().is_ok_and(|v| v.is_some())
    }

    fn wheel_center(&self) -> Option<Point> {
        let view = self.view.try_borrow().ok()?;
        view.as_ref().map(|v| v.wheel_center())
    }

    pub fn set_input(&self, input: Box<dyn InputSource>) {
        if self.disposed.get() {
            reject("set_input", UsageError::Disposed);
            return;
        }
        *self.input.borrow_mut() = Some(input);
    }

    pub fn set_provider(&self, provider: Box<dyn DataProvider<T>>) {
        if self.disposed.get() {
            reject("set_provider", UsageError::Disposed);
            return;
        }
        *self.provider.borrow_mut() = Some(provider);
    }

    pub fn set_strategy(&self, strategy: Box<dyn SelectionStrategy>) {
        *self.strategy.borrow_mut() = strategy;
    }

    /// Installs the layout store and, when persistence is enabled, restores
    /// the saved layout. Slots filled before this call are moved into the
    /// saved arrangement; contents supplied later through `set_slots` must
    /// already be arranged, see [`LayoutData::arrange`].
    pub fn set_persistence(&self, store: Rc<dyn LayoutStore>) {
        if self.disposed.get() {
            reject("set_persistence", UsageError::Disposed);
            return;
        }
        *self.store.borrow_mut() = Some(store);
        self.load_layout();
    }

    fn load_layout(&self) {
        let Some(key) = self.config.persistence_key() else {
            return;
        };
        let Some(store) = self.store.borrow().clone() else {
            return;
        };
        if !store.has(key) {
            log::debug!("[Wheel] no saved layout for {}", key);
            return;
        }

        let data = match store.load(key) {
            Ok(Some(data)) => data,
            Ok(None) => return,
            Err(e) => {
                log::error!("[Wheel] failed to load layout {}: {}", key, e);
                return;
            }
        };
        if let Err(e) = data.validate(self.config.slot_count) {
            log::error!("[Wheel] ignoring saved layout {}: {}", key, e);
            return;
        }

        let moved = {
            let mut slots = self.slots.borrow_mut();
            let filled = !slots.all_vacant();
            slots.restore_order(&data.slot_order) && filled
        };
        if moved {
            for (index, item) in self.snapshot().into_iter().enumerate() {
                self.publish(WheelEvent::SlotChanged { index, item });
            }
        }
        let restored = data.selected();
        let changed = restored != self.selected_index();
        if let Err(e) = self.selection.borrow_mut().set_selected(restored) {
            reject("load_layout", e);
            return;
        }
        log::info!("[Wheel] restored layout {}", key);
        if changed {
            self.publish(WheelEvent::SelectionChanged(restored));
        }
    }

    fn save_layout(&self) {
        let Some(key) = self.config.persistence_key() else {
            return;
        };
        let Some(store) = self.store.borrow().clone() else {
            return;
        };
        if let Err(e) = store.save(key, &self.layout()) {
            log::error!("[Wheel] failed to save layout {}: {}", key, e);
        }
    }

    /// Drains the data provider and the input source.
    pub fn update(&self) {
        if self.disposed.get() {
            return;
        }
        self.drain_provider();
        loop {
            let next = match self.input.try_borrow_mut() {
                Ok(mut input) => input.as_mut().and_then(|i| i.poll()),
                Err(_) => None,
            };
            match next {
                Some(event) => self.handle_input(event),
                None => break,
            }
        }
    }

    fn drain_provider(&self) {
        loop {
            let next = match self.provider.try_borrow_mut() {
                Ok(mut provider) => provider.as_mut().and_then(|p| p.poll_change()),
                Err(_) => None,
            };
            match next {
                Some(ProviderEvent::Added(_)) => log::debug!("[Wheel] provider item added"),
                Some(ProviderEvent::Removed(_)) => log::debug!("[Wheel] provider item removed"),
                Some(ProviderEvent::Changed { .. }) => log::debug!("[Wheel] provider item changed"),
                None => break,
            }
        }
    }

    pub fn handle_input(&self, event: InputEvent) {
        match event {
            InputEvent::Position(point) => {
                self.track_pointer(point);
            }
            InputEvent::Confirm => {
                self.manual_confirm();
            }
            InputEvent::Cancel => self.manual_cancel(),
        }
    }

    /// Hit-tests `point` and publishes `Hovered` when the slot changes.
    fn track_pointer(&self, point: Point) -> bool {
        if self.disposed.get() || self.state() != WheelState::Active {
            return false;
        }
        if self.is_dragging() {
            return false;
        }
        let Some(center) = self.wheel_center() else {
            log::debug!("[Wheel] pointer ignored, no view to supply the center");
            return false;
        };

        let ctx = SelectionContext::new(&self.config, center, point);
        let index = self.strategy.borrow().select(&ctx);
        let moved = self.selection.borrow_mut().set_hovered(index);
        match moved {
            Ok(true) => {
                self.publish(WheelEvent::Hovered(index));
                true
            }
            Ok(false) => false,
            Err(e) => reject("hover", e),
        }
    }

    pub fn subscribe(&self, handler: impl Fn(&WheelEvent<T>) + 'static) -> SubscriptionId {
        self.bus.subscribe(handler)
    }

    pub fn subscribe_kind(
        &self,
        kind: EventKind,
        handler: impl Fn(&WheelEvent<T>) + 'static,
    ) -> SubscriptionId {
        self.bus.subscribe_kind(kind, handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn on_item_selected(&self, handler: impl Fn(usize, Option<&T>) + 'static) {
        self.item_selected.borrow_mut().push(Rc::new(handler));
    }

    pub fn state(&self) -> WheelState {
        self.machine.borrow().current()
    }

    pub fn is_visible(&self) -> bool {
        self.state() != WheelState::Hidden
    }

    pub fn can_modify_data(&self) -> bool {
        self.machine.borrow().can_modify_data()
    }

    pub fn slot_count(&self) -> usize {
        self.config.slot_count
    }

    pub fn config(&self) -> &WheelConfig {
        &self.config
    }

    pub fn adapter(&self) -> Rc<dyn ItemAdapter<T>> {
        Rc::clone(&self.adapter)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Detaches every subscriber and collaborator. Safe to call repeatedly.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.bus.clear();
        self.item_selected.borrow_mut().clear();
        self.drag.set(None);
        if let Ok(mut input) = self.input.try_borrow_mut() {
            input.take();
        }
        if let Ok(mut provider) = self.provider.try_borrow_mut() {
            provider.take();
        }
        self.store.borrow_mut().take();
        if let Ok(mut view) = self.view.try_borrow_mut()
            && let Some(mut view) = view.take()
        {
            view.detach();
        }
        log::debug!("[Wheel] disposed");
    }

    /// Test hook for holding the wheel in a transient state.
    #[cfg(test)]
    pub(crate) fn force_state(&self, state: WheelState) {
        self.machine.borrow_mut().force(state);
    }
}

impl<T: Clone + 'static> Drop for Wheel<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<T: Clone + Debug + 'static> Debug for Wheel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wheel")
            .field("state", &self.state())
            .field("slots", &self.snapshot())
            .field("selected", &self.selected_index())
            .field("hovered", &self.hovered_index())
            .field("disposed", &self.disposed.get())
            .finish_non_exhaustive()
    }
}

fn forward_to_view<T>(view: &mut Box<dyn WheelView<T>>, event: &WheelEvent<T>) {
    match event {
        WheelEvent::SlotChanged { index, item } => view.on_slot_data_changed(*index, item.as_ref()),
        WheelEvent::SlotsSwapped { a, b } => view.on_slots_swapped(*a, *b),
        WheelEvent::SelectionChanged(index) => view.on_selection_changed(*index),
        WheelEvent::Hovered(index) => view.on_hover_changed(*index),
        WheelEvent::Shown => view.on_wheel_shown(),
        WheelEvent::Hidden(index) => view.on_wheel_hidden(*index),
        WheelEvent::StateChanged { .. }
        | WheelEvent::SlotClicked(_)
        | WheelEvent::SlotsDragSwapped { .. } => {}
    }
}
