//! Selection and state core for a press-and-hold quick-select wheel.
//!
//! A [`Wheel`] owns a fixed row of slots, walks the
//! Hidden/Showing/Active/Hiding state machine, maps pointer direction to a
//! slot through a [`SelectionStrategy`] and reports everything on an event
//! bus. Rendering, input polling and storage are supplied by the host
//! through [`WheelView`], [`InputSource`] and [`LayoutStore`].

#[macro_use]
mod macros;

pub mod builder;
pub mod bus;
pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod input;
pub mod persistence;
pub mod provider;
pub mod selection;
pub mod slots;
pub mod state;
pub mod view;
pub mod wheel;

pub use builder::WheelBuilder;
pub use bus::{Delivery, EventBus, SubscriptionId};
pub use config::{ConfigError, PersistenceKey, ReentryPolicy, SelectionKind, WheelConfig};
pub use error::{UsageError, WheelError};
pub use events::{EventKind, WheelEvent};
pub use geometry::Point;
pub use input::{ChannelInput, HoldTrigger, InputEvent, InputSource, TriggerSignal};
pub use persistence::{
    JsonFileLayoutStore, LayoutData, LayoutStore, MemoryLayoutStore, PersistenceError,
};
pub use provider::{DataProvider, ProviderEvent, VecProvider};
pub use selection::{
    AngleSelection, Compass, GridSelection, SelectionContext, SelectionStrategy, strategy_for,
};
pub use state::WheelState;
pub use view::{DisplayItem, ItemAdapter, ItemDecor, WheelView};
pub use wheel::{DragSession, Wheel};
