//! nestctl - command-line manager for a Nest thermostat.
//!
//! Thin glue over the library: each subcommand maps to one client
//! operation and prints the resulting device state.

use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nestctl::utils::format::{format_duration, format_temperature};
use nestctl::{Config, DeviceState, Mode, NestClient, TemperatureUnit};

#[derive(Parser)]
#[command(name = "nestctl", about = "Nest thermostat manager", version)]
struct Cli {
    /// Config file location (default: ~/.config/nestctl/config.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (can be given multiple times)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show current thermostat status
    Status {
        /// Show more detailed information
        #[arg(short, long)]
        details: bool,
    },
    /// Set a new target temperature
    Temp {
        /// The temperature to set
        value: f64,
        /// Input unit: f or c (default: from config)
        #[arg(short, long)]
        unit: Option<String>,
    },
    /// Set a new target temperature range
    Range {
        /// The low temperature to maintain
        low: f64,
        /// The high temperature to allow
        high: f64,
        /// Input unit: f or c (default: from config)
        #[arg(short, long)]
        unit: Option<String>,
    },
    /// Change the operating mode
    Mode {
        /// One of the modes the device accepts, e.g. cool, heat, range, off
        mode: String,
    },
    /// Turn the fan on or off
    Fan {
        state: FanState,
        /// Seconds for the fan to run (ignored when turning it off)
        #[arg(short, long, default_value_t = 1800)]
        duration: u64,
    },
    /// Print the config file contents
    Config,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FanState {
    On,
    Off,
}

/// Initialize the tracing subscriber for logging
fn init_tracing(verbose: u8) {
    // RUST_LOG takes precedence; -v flags set the fallback level
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if matches!(cli.command, Command::Config) {
        return show_config(cli.config.as_deref());
    }

    let config = Config::load(cli.config.as_deref())?;
    let display_unit = config.temp_unit()?;
    let client = NestClient::new(config)?;
    let serial = client.config().serial()?.to_string();

    let state = match cli.command {
        Command::Status { details } => {
            let state = client.get_status(&serial).await?;
            print_status(&state, display_unit, details);
            return Ok(());
        }
        Command::Temp { value, unit } => {
            let unit = input_unit(unit.as_deref(), display_unit)?;
            client.set_target_temperature(&serial, value, unit).await?
        }
        Command::Range { low, high, unit } => {
            let unit = input_unit(unit.as_deref(), display_unit)?;
            client.set_temperature_range(&serial, low, high, unit).await?
        }
        Command::Mode { mode } => client.set_mode(&serial, &Mode::from_wire(&mode)).await?,
        Command::Fan { state: FanState::On, duration } => client.start_fan(&serial, duration).await?,
        Command::Fan { state: FanState::Off, .. } => client.stop_fan(&serial).await?,
        Command::Config => unreachable!(),
    };
    print_status(&state, display_unit, false);
    Ok(())
}

fn input_unit(arg: Option<&str>, config_unit: TemperatureUnit) -> Result<TemperatureUnit> {
    match arg {
        Some(value) => value
            .parse()
            .map_err(|_| anyhow!("Invalid unit {:?} - must be 'c' or 'f'", value)),
        None => Ok(config_unit),
    }
}

fn show_config(path: Option<&std::path::Path>) -> Result<()> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => Config::default_path()?,
    };
    eprintln!(
        "WARNING: the [oauth] section contains credentials that should be kept secret - do not share this output\n"
    );
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    print!("{}", contents);
    Ok(())
}

fn print_status(state: &DeviceState, unit: TemperatureUnit, details: bool) {
    println!("{} ({})", state.name, state.serial);
    println!("  Mode:        {}", state.mode);
    println!("  HVAC:        {}", state.hvac);
    println!(
        "  Temperature: {}{}",
        format_temperature(state.current_temperature_in(unit)),
        unit.symbol()
    );
    match (&state.mode, state.target_range) {
        (Mode::Range, Some((low, high))) => {
            println!(
                "  Target:      {}{} - {}{}",
                format_temperature(unit.from_celsius(low)),
                unit.symbol(),
                format_temperature(unit.from_celsius(high)),
                unit.symbol()
            );
        }
        _ => {
            println!(
                "  Target:      {}{}",
                format_temperature(state.target_temperature_in(unit)),
                unit.symbol()
            );
        }
    }
    if let Some(humidity) = state.humidity {
        println!("  Humidity:    {:.0}%", humidity);
    }
    if details {
        println!("  Can heat:    {}", state.can_heat);
        println!("  Can cool:    {}", state.can_cool);
        if let Some(timeout) = state.fan_timer_timeout {
            let remaining = (timeout - Utc::now().timestamp()).max(0) as u64;
            println!("  Fan timer:   {} remaining", format_duration(remaining));
        }
    }
}
