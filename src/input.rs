use crate::geometry::Point;
use async_channel::{Receiver, Sender, TryRecvError};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Position(Point),
    Confirm,
    Cancel,
}

/// Source of pointer events. The wheel drains it on every `update()`; the
/// source is expected to have polled its hardware already.
pub trait InputSource {
    fn poll(&mut self) -> Option<InputEvent>;
}

/// Input fed from anywhere through a bounded channel.
pub struct ChannelInput {
    rx: Receiver<InputEvent>,
}

impl ChannelInput {
    pub fn new(rx: Receiver<InputEvent>) -> Self {
        Self { rx }
    }

    pub fn bounded(cap: usize) -> (Sender<InputEvent>, Self) {
        let (tx, rx) = async_channel::bounded(cap);
        (tx, Self::new(rx))
    }
}

impl InputSource for ChannelInput {
    fn poll(&mut self) -> Option<InputEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => {
                log::trace!("[ChannelInput] sender closed");
                None
            }
        }
    }
}

/// Host-facing signals from [`HoldTrigger`] that are not wheel input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSignal {
    /// The key has been held past the threshold; show the wheel.
    LongPress,
    /// The key was released before the threshold.
    ShortPress,
}

/// Press-and-hold policy for a trigger key.
///
/// Holding past the threshold raises [`TriggerSignal::LongPress`] and starts
/// streaming pointer positions; releasing afterwards confirms. A quick tap is
/// reported as [`TriggerSignal::ShortPress`] and produces no wheel input.
#[derive(Debug)]
pub struct HoldTrigger {
    threshold: Duration,
    held_for: Option<Duration>,
    long_pressed: bool,
    queue: VecDeque<InputEvent>,
}

impl Default for HoldTrigger {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}

impl HoldTrigger {
    pub const DEFAULT_THRESHOLD: Duration = Duration::from_millis(250);

    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            held_for: None,
            long_pressed: false,
            queue: VecDeque::new(),
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.held_for.is_some()
    }

    pub fn is_long_pressed(&self) -> bool {
        self.long_pressed
    }

    pub fn press(&mut self) {
        if self.held_for.is_none() {
            self.held_for = Some(Duration::ZERO);
            self.long_pressed = false;
        }
    }

    /// Advances the hold timer and samples the pointer.
    pub fn tick(&mut self, elapsed: Duration, pointer: Point) -> Option<TriggerSignal> {
        let held = self.held_for.as_mut()?;
        *held += elapsed;

        let mut signal = None;
        if !self.long_pressed && *held >= self.threshold {
            self.long_pressed = true;
            signal = Some(TriggerSignal::LongPress);
        }
        if self.long_pressed {
            self.queue.push_back(InputEvent::Position(pointer));
        }
        signal
    }

    pub fn release(&mut self) -> Option<TriggerSignal> {
        self.held_for.take()?;
        if std::mem::take(&mut self.long_pressed) {
            self.queue.push_back(InputEvent::Confirm);
            None
        } else {
            Some(TriggerSignal::ShortPress)
        }
    }

    /// Escape while held cancels.
    pub fn escape(&mut self) {
        if self.held_for.take().is_some() {
            self.long_pressed = false;
            self.queue.push_back(InputEvent::Cancel);
        }
    }

    pub fn reset(&mut self) {
        self.held_for = None;
        self.long_pressed = false;
        self.queue.clear();
    }
}

impl InputSource for HoldTrigger {
    fn poll(&mut self) -> Option<InputEvent> {
        self.queue.pop_front()
    }
}

/// Lets the host keep driving a source after handing it to a wheel.
impl<S: InputSource> InputSource for Rc<RefCell<S>> {
    fn poll(&mut self) -> Option<InputEvent> {
        self.try_borrow_mut().ok()?.poll()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(source: &mut impl InputSource) -> Vec<InputEvent> {
        std::iter::from_fn(|| source.poll()).collect()
    }

    #[test]
    fn test_channel_input_drains_in_order() {
        let (tx, mut input) = ChannelInput::bounded(8);
        tx.try_send(InputEvent::Position(Point::new(1.0, 2.0))).unwrap();
        tx.try_send(InputEvent::Confirm).unwrap();

        assert_eq!(
            drain(&mut input),
            [InputEvent::Position(Point::new(1.0, 2.0)), InputEvent::Confirm]
        );
        drop(tx);
        assert_eq!(input.poll(), None);
    }

    #[test]
    fn test_long_press_streams_and_confirms() {
        let mut trigger = HoldTrigger::default();
        let step = Duration::from_millis(100);
        trigger.press();

        assert_eq!(trigger.tick(step, Point::new(0.0, 0.0)), None);
        assert_eq!(trigger.tick(step, Point::new(1.0, 0.0)), None);
        assert!(drain(&mut trigger).is_empty());

        assert_eq!(
            trigger.tick(step, Point::new(2.0, 0.0)),
            Some(TriggerSignal::LongPress)
        );
        assert_eq!(trigger.tick(step, Point::new(3.0, 0.0)), None);
        assert_eq!(trigger.release(), None);

        assert_eq!(
            drain(&mut trigger),
            [
                InputEvent::Position(Point::new(2.0, 0.0)),
                InputEvent::Position(Point::new(3.0, 0.0)),
                InputEvent::Confirm,
            ]
        );
        assert!(!trigger.is_pressed());
        assert!(!trigger.is_long_pressed());
    }

    #[test]
    fn test_short_press() {
        let mut trigger = HoldTrigger::new(Duration::from_millis(500));
        trigger.press();
        trigger.tick(Duration::from_millis(100), Point::default());
        assert_eq!(trigger.release(), Some(TriggerSignal::ShortPress));
        assert!(drain(&mut trigger).is_empty());
        assert_eq!(trigger.release(), None);
    }

    #[test]
    fn test_escape_cancels_only_when_held() {
        let mut trigger = HoldTrigger::default();
        trigger.escape();
        assert!(drain(&mut trigger).is_empty());

        trigger.press();
        trigger.tick(Duration::from_secs(1), Point::default());
        trigger.escape();
        assert_eq!(
            drain(&mut trigger),
            [InputEvent::Position(Point::default()), InputEvent::Cancel]
        );
        assert_eq!(trigger.tick(Duration::from_secs(1), Point::default()), None);
    }
}
