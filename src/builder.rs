use crate::config::WheelConfig;
use crate::error::WheelError;
use crate::events::{EventKind, WheelEvent};
use crate::input::InputSource;
use crate::persistence::LayoutStore;
use crate::provider::DataProvider;
use crate::selection::SelectionStrategy;
use crate::view::{ItemAdapter, WheelView};
use crate::wheel::Wheel;
use std::rc::Rc;

type Handler<T> = Box<dyn Fn(&WheelEvent<T>)>;

/// Fluent construction of a [`Wheel`]. Only the adapter is required.
pub struct WheelBuilder<T: Clone + 'static> {
    config: WheelConfig,
    adapter: Option<Rc<dyn ItemAdapter<T>>>,
    provider: Option<Box<dyn DataProvider<T>>>,
    store: Option<Rc<dyn LayoutStore>>,
    input: Option<Box<dyn InputSource>>,
    strategy: Option<Box<dyn SelectionStrategy>>,
    view: Option<Box<dyn WheelView<T>>>,
    item_selected: Vec<Box<dyn Fn(usize, Option<&T>)>>,
    handlers: Vec<(EventKind, Handler<T>)>,
}

impl<T: Clone + 'static> Default for WheelBuilder<T> {
    fn default() -> Self {
        Self {
            config: WheelConfig::default(),
            adapter: None,
            provider: None,
            store: None,
            input: None,
            strategy: None,
            view: None,
            item_selected: Vec::new(),
            handlers: Vec::new(),
        }
    }
}

impl<T: Clone + 'static> WheelBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: WheelConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_adapter(mut self, adapter: impl ItemAdapter<T> + 'static) -> Self {
        self.adapter = Some(Rc::new(adapter));
        self
    }

    pub fn with_provider(mut self, provider: impl DataProvider<T> + 'static) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    pub fn with_persistence(mut self, store: Rc<dyn LayoutStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_input(mut self, input: impl InputSource + 'static) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    pub fn with_strategy(mut self, strategy: impl SelectionStrategy + 'static) -> Self {
        self.strategy = Some(Box::new(strategy));
        self
    }

    pub fn with_view(mut self, view: impl WheelView<T> + 'static) -> Self {
        self.view = Some(Box::new(view));
        self
    }

    pub fn on_item_selected(mut self, handler: impl Fn(usize, Option<&T>) + 'static) -> Self {
        self.item_selected.push(Box::new(handler));
        self
    }

    pub fn on_shown(mut self, handler: impl Fn() + 'static) -> Self {
        self.handlers
            .push((EventKind::Shown, Box::new(move |_: &WheelEvent<T>| handler())));
        self
    }

    pub fn on_hidden(mut self, handler: impl Fn(Option<usize>) + 'static) -> Self {
        self.handlers.push((
            EventKind::Hidden,
            Box::new(move |event: &WheelEvent<T>| {
                if let WheelEvent::Hidden(index) = event {
                    handler(*index);
                }
            }),
        ));
        self
    }

    /// Persistence is attached before the view so the view's replay already
    /// reflects the restored layout.
    pub fn build(self) -> Result<Wheel<T>, WheelError> {
        let adapter = self.adapter.ok_or(WheelError::MissingAdapter)?;
        let wheel = Wheel::new(self.config, adapter)?;

        if let Some(strategy) = self.strategy {
            wheel.set_strategy(strategy);
        }
        if let Some(store) = self.store {
            wheel.set_persistence(store);
        }
        if let Some(provider) = self.provider {
            wheel.set_provider(provider);
        }
        if let Some(input) = self.input {
            wheel.set_input(input);
        }
        for (kind, handler) in self.handlers {
            wheel.subscribe_kind(kind, handler);
        }
        for handler in self.item_selected {
            wheel.on_item_selected(handler);
        }
        if let Some(view) = self.view {
            wheel.set_view(view);
        }
        Ok(wheel)
    }
}
