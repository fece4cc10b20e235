use crate::state::WheelState;
use strum::{Display as StrumDisplay, EnumDiscriminants, EnumIter};

/// Notifications published by a wheel. Indices use `None` for "no slot".
#[derive(Debug, Clone, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(EventKind), derive(Hash, EnumIter, StrumDisplay))]
pub enum WheelEvent<T> {
    StateChanged { from: WheelState, to: WheelState },
    SlotChanged { index: usize, item: Option<T> },
    SlotsSwapped { a: usize, b: usize },
    SelectionChanged(Option<usize>),
    Hovered(Option<usize>),
    Shown,
    Hidden(Option<usize>),
    SlotClicked(usize),
    SlotsDragSwapped { from: usize, to: usize },
}

impl<T> WheelEvent<T> {
    pub fn kind(&self) -> EventKind {
        EventKind::from(self)
    }

    /// Hover fires on every pointer move and bypasses the re-entrancy lock.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::Hovered(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_only_hover_is_unlocked() {
        assert!(!WheelEvent::<()>::Hovered(Some(1)).is_structural());
        assert!(WheelEvent::<()>::Shown.is_structural());
        assert!(WheelEvent::<()>::Hidden(None).is_structural());
        assert!(
            WheelEvent::<()>::SlotChanged {
                index: 0,
                item: None
            }
            .is_structural()
        );
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            WheelEvent::<u8>::SlotsSwapped { a: 1, b: 2 }.kind(),
            EventKind::SlotsSwapped
        );
        assert_eq!(EventKind::iter().count(), 9);
        assert_eq!(EventKind::SlotClicked.to_string(), "SlotClicked");
    }
}
