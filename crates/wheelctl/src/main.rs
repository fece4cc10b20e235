mod command;
mod runtime;
mod view;

use async_channel::Sender;
use clap::{Parser, Subcommand};
use command::Command;
use quickwheel::config::{self, PersistenceKey, WheelConfig};
use quickwheel::{
    ChannelInput, HoldTrigger, InputEvent, InputSource, JsonFileLayoutStore, LayoutStore, Point,
    TriggerSignal, VecProvider, Wheel, WheelBuilder,
};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use view::ConsoleView;

#[derive(Parser, Debug)]
#[command(name = "wheelctl", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file to load instead of the user config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding saved layouts (defaults to the user data dir)
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Enable layout persistence under this key
    #[arg(short, long)]
    key: Option<String>,

    /// Long-press threshold in milliseconds
    #[arg(long, default_value_t = 250)]
    hold_ms: u64,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Drive a wheel with commands read from stdin (default)
    Run,
    /// Write the default config file and print its path
    InitConfig,
    /// Print a saved layout
    Layout {
        /// Persistence key the layout was saved under
        key: String,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command.clone().unwrap_or(Commands::Run) {
        Commands::Run => run(&cli),
        Commands::InitConfig => {
            let path = config::write_default_config()?;
            println!("{}", path.display());
            Ok(())
        }
        Commands::Layout { key } => print_layout(&cli, &key),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<WheelConfig> {
    let mut config = match &cli.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_or_default(),
    };
    if let Some(key) = &cli.key {
        config.enable_persistence = true;
        config.persistence_key = PersistenceKey::new(key.as_str());
    }
    Ok(config)
}

fn open_store(cli: &Cli) -> anyhow::Result<JsonFileLayoutStore> {
    let store = match &cli.store {
        Some(dir) => JsonFileLayoutStore::new(dir)?,
        None => JsonFileLayoutStore::in_data_dir()?,
    };
    Ok(store)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let persist = config.persistence_key().is_some();
    let (input_tx, input) = ChannelInput::bounded(64);
    let provider = Rc::new(RefCell::new(VecProvider::<String>::default()));

    let mut builder = WheelBuilder::<String>::new()
        .with_config(config)
        .with_adapter(view::item_adapter)
        .with_input(input)
        .with_provider(Rc::clone(&provider))
        .with_view(ConsoleView::new(Point::default()))
        .on_item_selected(|index, item: Option<&String>| {
            println!("used slot {}: {}", index, item.map_or("(empty)", String::as_str));
        });
    if persist {
        builder = builder.with_persistence(Rc::new(open_store(cli)?));
    }
    let wheel = builder.build()?;
    let mut trigger = HoldTrigger::new(Duration::from_millis(cli.hold_ms));

    let (tx, rx) = async_channel::bounded(32);
    runtime::start_stdin_reader(tx);
    println!("{}", command::HELP);

    while let Ok(command) = rx.recv_blocking() {
        if !apply(&wheel, &mut trigger, &provider, &input_tx, command) {
            break;
        }
        wheel.update();
    }

    wheel.dispose();
    Ok(())
}

fn apply(
    wheel: &Wheel<String>,
    trigger: &mut HoldTrigger,
    provider: &RefCell<VecProvider<String>>,
    input: &Sender<InputEvent>,
    command: Command,
) -> bool {
    match command {
        Command::Show => report("show", wheel.show()),
        Command::Hide { execute, sync } => {
            wheel.hide(execute, sync);
        }
        Command::Move(at) => send(input, InputEvent::Position(at)),
        Command::Confirm => send(input, InputEvent::Confirm),
        Command::Cancel => send(input, InputEvent::Cancel),
        Command::Click(index) => report("click", wheel.click_slot(index)),
        Command::Swap(a, b) => report("swap", wheel.swap_slots(a, b)),
        Command::Drag(from, to) => {
            let swapped = wheel
                .begin_drag(from)
                .is_some_and(|session| wheel.finish_drag(session, to));
            report("drag", swapped);
        }
        Command::Set(index, item) => report("set", wheel.set_slot(index, item)),
        Command::Remove(index) => report("remove", wheel.remove_slot(index)),
        Command::Clear => report("clear", wheel.clear_all_slots()),
        Command::Cycle(direction) => report("cycle", wheel.cycle_selection(direction)),
        Command::Select(index) => report("select", wheel.set_selected_index(index)),
        Command::Hover(index) => report("hover", wheel.manual_set_hover(index)),
        Command::Press => trigger.press(),
        Command::Hold { millis, at } => {
            if trigger.tick(Duration::from_millis(millis), at) == Some(TriggerSignal::LongPress) {
                wheel.show();
            }
            forward(trigger, input);
        }
        Command::Release => {
            if trigger.release() == Some(TriggerSignal::ShortPress) {
                println!("tap, wheel stays closed");
            }
            forward(trigger, input);
        }
        Command::Escape => {
            trigger.escape();
            forward(trigger, input);
        }
        Command::Offer(item) => provider.borrow_mut().add(item),
        Command::Status => print_status(wheel),
        Command::Help => println!("{}", command::HELP),
        Command::Quit => return false,
    }
    true
}

fn report(op: &str, applied: bool) {
    if !applied {
        println!("{}: nothing changed (RUST_LOG=warn shows why)", op);
    }
}

fn send(input: &Sender<InputEvent>, event: InputEvent) {
    if let Err(e) = input.try_send(event) {
        log::warn!("Input queue rejected event: {}", e);
    }
}

fn forward(trigger: &mut HoldTrigger, input: &Sender<InputEvent>) {
    while let Some(event) = trigger.poll() {
        send(input, event);
    }
}

fn print_status(wheel: &Wheel<String>) {
    println!(
        "state {}, selected {:?}, hovered {:?}",
        wheel.state(),
        wheel.selected_index(),
        wheel.hovered_index()
    );
    for (index, item) in wheel.snapshot().iter().enumerate() {
        println!("  [{}] {}", index, item.as_deref().unwrap_or("-"));
    }
    println!("  order {:?}", wheel.slot_order());
}

fn print_layout(cli: &Cli, key: &str) -> anyhow::Result<()> {
    let store = open_store(cli)?;
    match store.load(&PersistenceKey::new(key))? {
        Some(layout) => println!("{}", serde_json::to_string_pretty(&layout)?),
        None => anyhow::bail!("No saved layout for '{}'", key),
    }
    Ok(())
}
