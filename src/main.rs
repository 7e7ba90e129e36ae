use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::generate;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use pt710bt::config;
use pt710bt::printer::Printer;
use pt710bt::raster::PngRasterSource;
use pt710bt::status::AdvancedMode;
use pt710bt::{Error, Result};

#[derive(Parser)]
#[command(name = "pt710bt")]
#[command(about = "Label maker CLI for the Brother PT-P710BT")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one label per PNG image
    Print(PrintArgs),
    /// Fetch status information from the printer
    Info(DeviceArgs),
    /// Store a Bluetooth address as the default for future runs
    SetDefault(SetDefaultArgs),
    /// Generate shell completion scripts
    Completion(CompletionArgs),
}

#[derive(Args)]
struct PrintArgs {
    /// Path(s) to the image(s) to print
    #[arg(required = true)]
    images: Vec<PathBuf>,

    #[command(flatten)]
    device: DeviceArgs,

    /// Chain mode: skip cutting between labels to minimise tape waste
    #[arg(long = "chain")]
    chain: bool,

    /// Hi-res mode: greatly increases resolution lengthwise
    #[arg(long = "hi-res")]
    hi_res: bool,
}

#[derive(Args)]
struct DeviceArgs {
    /// Bluetooth address of the printer (e.g. "EC:79:49:63:2A:80")
    #[arg(long = "bt-address")]
    bt_address: Option<String>,

    /// Bluetooth RFCOMM channel
    #[arg(long = "bt-channel", default_value_t = 1)]
    bt_channel: u8,
}

#[derive(Args)]
struct SetDefaultArgs {
    /// Bluetooth address to remember
    address: String,
}

#[derive(Args)]
struct CompletionArgs {
    /// Shell type
    #[arg(value_enum)]
    shell: clap_complete::Shell,
}

/// Pick the address from the command line or the stored default.
fn resolve_address(device: &DeviceArgs) -> Result<String> {
    if let Some(address) = &device.bt_address {
        return Ok(address.clone());
    }
    match config::default_address()? {
        Some(address) => {
            println!("Connecting to printer with BT Address of {address}");
            Ok(address)
        }
        None => Err(Error::Config(
            "bluetooth address required; pass --bt-address or store one with set-default"
                .to_string(),
        )),
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Print(args) => {
            let address = resolve_address(&args.device)?;

            let mut advanced = AdvancedMode::default();
            if !args.chain {
                advanced |= AdvancedMode::NO_CHAIN_PRINT;
            }
            if args.hi_res {
                advanced |= AdvancedMode::HIGH_RESOLUTION;
            }

            let mut printer = Printer::connect(&address, args.device.bt_channel)?;
            let outcome = printer.print_labels(&args.images, advanced, &PngRasterSource)?;
            Ok(outcome.exit_code())
        }
        Commands::Info(device) => {
            let address = resolve_address(&device)?;
            let mut printer = Printer::connect(&address, device.bt_channel)?;
            let outcome = printer.get_printer_info()?;
            Ok(outcome.map_or(0, |o| o.exit_code()))
        }
        Commands::SetDefault(args) => {
            config::set_default_address(&args.address)?;
            println!("{} set as default BT address", args.address);
            Ok(0)
        }
        Commands::Completion(args) => {
            generate(args.shell, &mut Cli::command(), "pt710bt", &mut io::stdout());
            Ok(0)
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Cli::parse()) {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("Error: {e}");
            if matches!(e, Error::Connect { .. }) {
                eprintln!("Please check the printer is on and properly paired in your system.");
            }
            ExitCode::from(3)
        }
    }
}
