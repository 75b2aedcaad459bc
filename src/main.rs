//! Synheart Wearables CLI
//!
//! Query wearable devices for live or synthetic data.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use std::path::PathBuf;
use synheart_wearables::{
    config::Config,
    core::params::{SEED, SYNTHETIC_END, SYNTHETIC_START, TIMEZONE},
    vendor::WORKERS_OPTION,
    Credentials, DataSeries, DeviceData, DeviceRegistry, RequestParams, VERSION,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "synheart-wearables")]
#[command(author = "Synheart")]
#[command(version = VERSION)]
#[command(about = "Live or synthetic data from wearable devices", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered devices and their data types
    Devices,

    /// Fetch one data type from a device
    Get {
        /// Device key, e.g. fitbit/charge_6
        device: String,

        /// Data type, e.g. intraday_steps
        data_type: String,

        /// First day of the request window (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Day after the last requested day (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Synthetic generator seed (defaults to the configured seed)
        #[arg(long)]
        seed: Option<u64>,

        /// First day of the synthetic range
        #[arg(long)]
        synthetic_start: Option<NaiveDate>,

        /// Day after the last day of the synthetic range
        #[arg(long)]
        synthetic_end: Option<NaiveDate>,

        /// IANA timezone for local days
        #[arg(long)]
        timezone: Option<String>,

        /// Vendor access token; fetches live data when given
        #[arg(long)]
        token: Option<String>,

        /// Output format (json or jsonl)
        #[arg(long, default_value = "json")]
        format: String,

        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show configuration
    Config,
}

/// Options of the `get` command.
struct GetArgs {
    device: String,
    data_type: String,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    seed: Option<u64>,
    synthetic_start: Option<NaiveDate>,
    synthetic_end: Option<NaiveDate>,
    timezone: Option<String>,
    token: Option<String>,
    format: String,
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: could not load config ({e}), using defaults");
        Config::default()
    });
    init_tracing(&config);

    match cli.command {
        Commands::Devices => {
            cmd_devices();
        }
        Commands::Get {
            device,
            data_type,
            start,
            end,
            seed,
            synthetic_start,
            synthetic_end,
            timezone,
            token,
            format,
            output,
        } => {
            let args = GetArgs {
                device,
                data_type,
                start,
                end,
                seed,
                synthetic_start,
                synthetic_end,
                timezone,
                token,
                format,
                output,
            };
            if let Err(e) = cmd_get(&config, args) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Config => {
            cmd_config(&config);
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` or the configured filter.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_devices() {
    let registry = DeviceRegistry::builtin();

    println!("Registered devices");
    println!("==================");
    for descriptor in registry.descriptors() {
        let capabilities: Vec<&str> = descriptor
            .capabilities()
            .iter()
            .map(|dt| dt.as_str())
            .collect();
        println!();
        println!("{}", descriptor.key());
        println!("  Data types:     {}", capabilities.join(", "));
        println!(
            "  Authentication: {}",
            if descriptor.supports_authentication() { "yes" } else { "no" }
        );
        let live: Vec<&str> = descriptor
            .capabilities()
            .iter()
            .filter(|dt| descriptor.supports_real_fetch(**dt))
            .map(|dt| dt.as_str())
            .collect();
        println!(
            "  Live fetch:     {}",
            if live.is_empty() { "none".to_string() } else { live.join(", ") }
        );
    }
}

fn cmd_get(config: &Config, args: GetArgs) -> Result<(), Box<dyn std::error::Error>> {
    let registry = DeviceRegistry::builtin();

    let mut overrides = Map::new();
    overrides.insert(SEED.to_string(), Value::from(args.seed.unwrap_or(config.default_seed)));
    if let Some(day) = args.synthetic_start {
        overrides.insert(SYNTHETIC_START.to_string(), Value::from(day.to_string()));
    }
    if let Some(day) = args.synthetic_end {
        overrides.insert(SYNTHETIC_END.to_string(), Value::from(day.to_string()));
    }
    if let Some(tz) = args.timezone {
        overrides.insert(TIMEZONE.to_string(), Value::from(tz));
    }

    let mut device = registry.construct(&args.device, &overrides)?;

    if let Some(token) = args.token {
        device.authenticate(&Credentials::access_token(token))?;
    }

    let defaults = device.default_params();
    let start = args.start.unwrap_or(defaults.start.date_naive());
    let end = args.end.unwrap_or(defaults.end.date_naive());
    let params = RequestParams::days(start, end)
        .with_option(WORKERS_OPTION, Value::from(config.fetch_workers));

    let data = device.get_data(&args.data_type, Some(&params))?;

    let rendered = if args.format == "jsonl" {
        to_json_lines(&data)?
    } else {
        serde_json::to_string_pretty(&data)?
    };

    match args.output {
        Some(name) => {
            let path = config.export_file(&name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, rendered)?;
            println!("Exported to {path:?}");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

/// One JSON document per sample, day record or vendor array element.
fn to_json_lines(data: &DeviceData) -> Result<String, serde_json::Error> {
    let lines: Vec<String> = match data {
        DeviceData::Synthetic(DataSeries::Timed(samples)) => samples
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<_, _>>()?,
        DeviceData::Synthetic(DataSeries::Daily(days)) => days
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<_, _>>()?,
        DeviceData::Vendor(Value::Array(items)) => items
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<_, _>>()?,
        DeviceData::Vendor(value) => vec![serde_json::to_string(value)?],
    };
    Ok(lines.join("\n"))
}

fn cmd_config(config: &Config) {
    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(config).unwrap_or_else(|_| "Error".to_string())
    );
}
