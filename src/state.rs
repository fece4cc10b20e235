use crate::error::UsageError;
use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumIter};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter, StrumDisplay,
)]
pub enum WheelState {
    #[default]
    Hidden,
    /// Transient, entered and left inside `show()` unless a view gates it.
    Showing,
    Active,
    /// Transient, entered and left inside `hide()`.
    Hiding,
}

impl WheelState {
    /// Slot data may only change while the wheel is at rest.
    pub fn can_modify_data(self) -> bool {
        matches!(self, Self::Hidden | Self::Active)
    }

    fn successor(self) -> Self {
        match self {
            Self::Hidden => Self::Showing,
            Self::Showing => Self::Active,
            Self::Active => Self::Hiding,
            Self::Hiding => Self::Hidden,
        }
    }
}

/// A state change, reported so the caller can publish it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: WheelState,
    pub to: WheelState,
}

/// Hidden -> Showing -> Active -> Hiding -> Hidden, nothing else.
#[derive(Debug, Default)]
pub struct StateMachine {
    current: WheelState,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> WheelState {
        self.current
    }

    pub fn can_modify_data(&self) -> bool {
        self.current.can_modify_data()
    }

    pub fn ensure_mutable(&self) -> Result<(), UsageError> {
        if self.can_modify_data() {
            Ok(())
        } else {
            Err(UsageError::Locked(self.current))
        }
    }

    /// Moves to the only legal next state, provided the machine is in `from`.
    pub fn advance_from(
        &mut self,
        from: WheelState,
        action: &'static str,
    ) -> Result<Transition, UsageError> {
        if self.current != from {
            return Err(UsageError::InvalidTransition {
                action,
                state: self.current,
            });
        }
        let to = self.current.successor();
        log::debug!("[WheelState] {} -> {}", self.current, to);
        self.current = to;
        Ok(Transition { from, to })
    }

    /// Test hook for holding the machine in a transient state.
    #[cfg(test)]
    pub(crate) fn force(&mut self, state: WheelState) {
        self.current = state;
    }
}

/// Live hover and committed selection. Both are `None` or a valid slot index.
#[derive(Debug, Clone)]
pub struct SelectionState {
    slot_count: usize,
    selected: Option<usize>,
    hovered: Option<usize>,
}

impl SelectionState {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slot_count,
            selected: None,
            hovered: None,
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    fn check(&self, index: Option<usize>) -> Result<(), UsageError> {
        match index {
            Some(i) if i >= self.slot_count => Err(UsageError::IndexOutOfRange {
                index: i,
                slot_count: self.slot_count,
            }),
            _ => Ok(()),
        }
    }

    pub fn set_selected(&mut self, index: Option<usize>) -> Result<(), UsageError> {
        self.check(index)?;
        self.selected = index;
        Ok(())
    }

    /// Returns whether the hover actually moved.
    pub fn set_hovered(&mut self, index: Option<usize>) -> Result<bool, UsageError> {
        self.check(index)?;
        let changed = self.hovered != index;
        self.hovered = index;
        Ok(changed)
    }
}
