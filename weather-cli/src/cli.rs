use std::time::Duration;

use anyhow::{Context, anyhow};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Password, Select};
use weather_core::{Config, Coordinate, Location, Presenter, TemperatureScale, alert_text};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather for a place or a position")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key and the preferred temperature scale.
    Configure,

    /// Show current weather for an address or a position.
    Show {
        /// Address or place name. Defaults to the last one used.
        address: Option<String>,

        /// Position fix as LAT,LON. May be repeated; the last fix is used.
        #[arg(
            long = "at",
            value_name = "LAT,LON",
            allow_hyphen_values = true,
            conflicts_with = "address"
        )]
        at: Vec<Coordinate>,

        /// Temperature scale for this run: celsius, fahrenheit or kelvin.
        #[arg(long)]
        scale: Option<TemperatureScale>,

        /// Keep refreshing every SECS seconds until interrupted.
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                address,
                at,
                scale,
                watch,
            } => show(address, at, scale, watch).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let entered = Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .with_help_message(if config.api_key().is_ok() {
            "Leave empty to keep the current key"
        } else {
            "Get one at https://openweathermap.org/api"
        })
        .prompt()?;

    let entered = entered.trim();
    if !entered.is_empty() {
        config.set_api_key(entered.to_string());
    }
    config.api_key()?;

    let current = config.temperature_scale(system_locale().as_deref());
    let options = TemperatureScale::all().to_vec();
    let cursor = options.iter().position(|s| *s == current).unwrap_or(0);
    let scale = Select::new("Temperature scale:", options)
        .with_starting_cursor(cursor)
        .prompt()?;
    config.set_temperature_scale(scale);

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(
    address: Option<String>,
    at: Vec<Coordinate>,
    scale: Option<TemperatureScale>,
    watch: Option<u64>,
) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    let scale = scale.unwrap_or_else(|| config.temperature_scale(system_locale().as_deref()));
    let mut presenter = Presenter::new(
        config.weather_client()?,
        Box::new(config.geocoder()?),
        scale,
    );

    let location = match presenter.location_for_fixes(&at) {
        Some(location) => location,
        None => {
            let text = address
                .or_else(|| config.last_address().map(str::to_owned))
                .ok_or_else(|| {
                    anyhow!(
                        "No address given and none saved yet.\n\
                         Hint: run `weather show <ADDRESS>` or `weather show --at LAT,LON`."
                    )
                })?;

            let location = presenter.location_for_address(&text).await;
            if config.last_address() != Some(text.as_str()) {
                config.set_last_address(text);
                config.save().context("Failed to remember the address")?;
            }
            location
        }
    };

    match watch {
        None => {
            let text = presenter.refresh(location).await.map_err(|e| {
                tracing::debug!(kind = e.kind(), error = %e, "Fetch failed");
                anyhow!(e.user_message())
            })?;
            println!("{text}");
        }
        Some(secs) => {
            let period = Duration::from_secs(secs.max(1));
            let interrupted = async {
                let _ = tokio::signal::ctrl_c().await;
            };
            watch_loop(&mut presenter, location, period, interrupted).await;
        }
    }

    Ok(())
}

/// Refreshes every `period` until `stop` completes, including mid-request.
async fn watch_loop(
    presenter: &mut Presenter,
    location: Location,
    period: Duration,
    stop: impl Future<Output = ()>,
) {
    let mut ticker = tokio::time::interval(period);
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut stop => break,
        }

        let result = tokio::select! {
            result = presenter.refresh(location.clone()) => result,
            _ = &mut stop => break,
        };

        match result {
            Ok(text) => println!("[{}] {text}", Local::now().format("%H:%M:%S")),
            Err(e) => {
                tracing::debug!(kind = e.kind(), error = %e, "Fetch failed");
                eprintln!("{}", alert_text(&e));
            }
        }
    }
}

fn system_locale() -> Option<String> {
    locale_from(|name| std::env::var(name).ok())
}

/// First non-empty of `LC_ALL`, `LC_MEASUREMENT`, `LANG`, as POSIX lookup does.
fn locale_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    ["LC_ALL", "LC_MEASUREMENT", "LANG"]
        .into_iter()
        .filter_map(lookup)
        .find(|v| !v.is_empty())
}
