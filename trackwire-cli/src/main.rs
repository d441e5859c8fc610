//! trackwire operator CLI
//!
//! Drives a plugin's reporting client against its settings database and
//! the analytics endpoint, for inspecting state and exercising lifecycle
//! events outside the host.
//!
//! Usage:
//!   trackwire --config trackwire.toml status
//!   trackwire --config trackwire.toml track feed_created -p count=3

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use trackwire::Client;
use trackwire_cli::{parse_property, Settings};
use trackwire_store::PluginState;
use trackwire_types::{Clock, Properties};

#[derive(Parser, Debug)]
#[command(name = "trackwire")]
#[command(about = "Plugin lifecycle and usage event reporting")]
struct Args {
    /// Path to the settings file
    #[arg(short, long, default_value = "trackwire.toml")]
    config: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show consent, activation and schedule state
    Status,
    /// Grant tracking consent
    OptIn,
    /// Revoke tracking consent (the periodic report stays scheduled)
    OptOut,
    /// Broadcast activation of the configured plugin
    Activate,
    /// Broadcast deactivation of the configured plugin
    Deactivate,
    /// Send a custom event (requires consent)
    Track {
        /// Event name
        event: String,
        /// Event property as key=value; repeatable
        #[arg(short, long = "property", value_parser = parse_property)]
        properties: Vec<(String, trackwire_types::PropertyValue)>,
    },
    /// Record the last core action
    LastAction {
        action: String,
    },
    /// Schedule the periodic system info report
    Schedule,
    /// Remove the periodic system info report from the schedule
    Unschedule,
    /// Run scheduled jobs that are due now
    RunCron,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .compact()
        .init();

    let settings = Settings::load(&args.config)?;
    let env = settings.environment()?;
    let client = Client::new(
        &settings.api_key,
        &settings.api_secret,
        &settings.plugin_name,
        &settings.plugin_file,
        &env,
    )
    .context("invalid client configuration")?;

    match args.command {
        Command::Status => {
            let state = PluginState::new(&*env.store, client.slug());
            println!("plugin:           {} ({})", settings.plugin_name, client.plugin_identity());
            println!("slug:             {}", client.slug());
            println!("version:          {}", client.plugin_version());
            println!("allow_tracking:   {}", state.opt_in()?);
            match state.activated_time()? {
                Some(t) => println!("activated_time:   {t}"),
                None => println!("activated_time:   -"),
            }
            println!("last_core_action: {}", state.last_core_action()?);
            match client.next_system_info_report()? {
                Some(t) => println!("next report:      {t} ({})", client.report_interval()),
                None => println!("next report:      not scheduled"),
            }
        }
        Command::OptIn => client.set_tracking_allowed(true)?,
        Command::OptOut => client.set_tracking_allowed(false)?,
        Command::Activate => {
            env.hooks.plugin_activated(client.plugin_identity(), false);
        }
        Command::Deactivate => {
            env.hooks.plugin_deactivated(client.plugin_identity(), false);
        }
        Command::Track { event, properties } => {
            let properties: Properties = properties.into_iter().collect();
            if !client.track(&event, properties) {
                bail!("event '{event}' was not delivered (no consent or delivery failure)");
            }
            info!(event = %event, "Event delivered");
        }
        Command::LastAction { action } => client.update_last_core_action(&action),
        Command::Schedule => {
            if !client.schedule_system_info_report()? {
                info!("System info report already scheduled");
            }
        }
        Command::Unschedule => {
            if !client.unschedule_system_info_report()? {
                info!("System info report was not scheduled");
            }
        }
        Command::RunCron => {
            let ran = env.scheduler.run_due(env.clock.unix_now())?;
            info!(ran, "Scheduled jobs run");
        }
    }

    Ok(())
}
