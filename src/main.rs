mod common;
mod device;
mod i18n;
mod menu;
mod menu_utils;
mod settings;
mod status;
mod ui;

use clap::{Parser, Subcommand};

use device::{DeviceBackend, SystemDevice};
use settings::store::SettingsStore;
use ui::prelude::*;

/// devconf main parser
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Activate debug mode
    #[arg(short, long, global = true)]
    debug: bool,

    /// Emit machine-readable JSON events instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the current device configuration and exit
    Status,
}

fn main() {
    let cli = Cli::parse();

    ui::set_debug_mode(cli.debug);
    ui::init(
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        },
        !cli.json,
    );

    if let Err(err) = run(&cli) {
        emit(Level::Error, "devconf.fatal", &format!("{err:#}"), None);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    i18n::init()?;

    let device = SystemDevice::new();
    let store = load_store(&device);

    match &cli.command {
        Some(Commands::Status) => status::print_status(&store),
        None => menu::MenuController::new(store, &device).run(),
    }
}

/// Populate the store from the device, falling back to the documented
/// defaults with a warning when the configuration cannot be read.
fn load_store(device: &dyn DeviceBackend) -> SettingsStore {
    match device.snapshot() {
        Ok(snapshot) => SettingsStore::from_snapshot(&snapshot),
        Err(err) => {
            emit(
                Level::Warn,
                "settings.load.failed",
                &format!("{} ({err})", i18n::tr("load.warning")),
                None,
            );
            SettingsStore::from_defaults()
        }
    }
}
