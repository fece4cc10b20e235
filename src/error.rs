use crate::config::ConfigError;
use crate::state::WheelState;
use thiserror::Error;

/// Construction failures. These are programmer errors and are returned
/// before any wheel exists.
#[derive(Error, Debug)]
pub enum WheelError {
    #[error("Invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("Adapter is required, call with_adapter() before build()")]
    MissingAdapter,
}

/// Runtime misuse. Never surfaces from the public API; it is logged and the
/// operation becomes a no-op.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UsageError {
    #[error("slot index {index} out of range (slot count {slot_count})")]
    IndexOutOfRange { index: usize, slot_count: usize },
    #[error("slot data is locked while the wheel is {0}")]
    Locked(WheelState),
    #[error("cannot {action} while the wheel is {state}")]
    InvalidTransition {
        action: &'static str,
        state: WheelState,
    },
    #[error("expected {expected} items, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("{0} is disabled in config")]
    InteractionDisabled(&'static str),
    #[error("a drag is already in progress from slot {0}")]
    DragInProgress(usize),
    #[error("drag session is no longer active")]
    StaleDrag,
    #[error("slot {0} is empty")]
    EmptySlot(usize),
    #[error("view is busy handling a callback")]
    ViewBusy,
    #[error("wheel has been disposed")]
    Disposed,
}

/// Logs a rejected operation and yields the failure indicator.
pub(crate) fn reject(op: &str, err: UsageError) -> bool {
    log::warn!("[Wheel] {} rejected: {}", op, err);
    false
}
