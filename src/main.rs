//! Hivecast - per-tick reporter for a monitored hive entrance.
//!
//! Run from cron with the counts observed since the previous run:
//! ```sh
//! hivecast <num entered> <num left>
//! ```
//!
//! # Environment Variables
//! - `SDP_SERVER_BASE_URL`, `SDP_DEVICE_SERIAL` - history store resource (required)
//! - `SDP_DEVICE_Lat`, `SDP_DEVICE_Lang` - device coordinates (required)
//! - `SDP_PREDICTION_WINDOW` - stored observations used for training (default: 24)
//! - `SDP_RAW_LOG_PATH` - local raw count log (default: sdp-beehive.raw-data.log)
//! - `RUST_LOG` - log filter (default: info)

use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use hivecast::application::ReportingCycle;
use hivecast::config::Config;
use hivecast::domain::errors::ArgumentError;
use hivecast::domain::observation::RawActivity;
use hivecast::infrastructure::ServiceFactory;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of bees that entered since the last run
    #[arg(allow_negative_numbers = true)]
    entries: u32,

    /// Number of bees that left since the last run
    #[arg(allow_negative_numbers = true)]
    exits: u32,
}

impl Args {
    fn parse_from_iter<I, T>(argv: I) -> Result<Self, ArgumentError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(argv).map_err(|e| match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            ErrorKind::ValueValidation | ErrorKind::InvalidValue => ArgumentError::NotAnInteger {
                reason: e.to_string().trim().to_string(),
            },
            _ => ArgumentError::Arity {
                program: env!("CARGO_PKG_NAME").to_string(),
            },
        })
    }

    fn activity(&self) -> RawActivity {
        RawActivity::new(self.entries, self.exits)
    }
}

async fn run() -> Result<()> {
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: store={}, serial={}, location=({}, {}), window={}",
        config.device.server_base_url,
        config.device.serial,
        config.device.latitude,
        config.device.longitude,
        config.forecast.prediction_window
    );

    let args = Args::parse_from_iter(std::env::args_os())?;

    let services = ServiceFactory::create_services(&config)?;
    let cycle = ReportingCycle::new(&config, services);
    cycle.run(args.activity()).await?;

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            if e.downcast_ref::<ArgumentError>().is_some() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
