//! Command-line front end for the TLP profile switcher.
//!
//! This is the presentation layer: it lists profiles, shows the active one and requests
//! switches through `TlpProfileManager`, refreshing its output from change notifications.

use crate::app_logic::TlpProfileManager;
use crate::core::{
    ConfigManagerOperations, CoreConfigManager, PkexecRunner, SwitchOutcome, TlpError,
};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

/// tlp-profile - switch between TLP power profiles
#[derive(Parser)]
#[command(name = "tlp-profile")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file to use instead of the default location
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Increase terminal log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the settings file, user profile directory and profile files if missing
    Init,
    /// List the available profiles
    List {
        /// Print the profiles as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the active profile
    Status,
    /// Install the given profile
    Switch {
        /// Profile id: performance, balanced or power-saver
        profile: String,
    },
    /// Switch balanced to power-saver, anything else to performance
    Toggle,
}

pub fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config_manager = match cli.config {
        Some(path) => CoreConfigManager::with_settings_path(path),
        None => CoreConfigManager::new(),
    };
    let settings = config_manager.load_settings()?;
    let paths = settings.resolve_paths()?;
    let runner = Arc::new(PkexecRunner::new(settings.helper_program.clone()));
    let manager = Arc::new(TlpProfileManager::new(paths, runner));

    match manager.load_profile_config() {
        Ok(()) => {}
        Err(e @ TlpError::NotInstalled(_)) => eprintln!("Warning: {e}"),
        Err(e) => return Err(e.into()),
    }

    match cli.command {
        Commands::Init => {
            let settings_path = config_manager.settings_location()?;
            if config_manager.save_settings_if_missing(&settings)? {
                println!("Wrote default settings: {}", settings_path.display());
            } else {
                println!("Settings: {}", settings_path.display());
            }
            let enabled = manager.enabled_profiles();
            println!(
                "Profile directory: {}",
                manager.paths().user_profile_dir.display()
            );
            for profile in &enabled {
                println!("  {}", profile.user_config_path.display());
            }
            Ok(())
        }
        Commands::List { json } => {
            let profiles = manager.list_profiles();
            if json {
                println!("{}", serde_json::to_string_pretty(&profiles)?);
                return Ok(());
            }
            let active = manager.active_profile();
            for profile in profiles.iter().filter(|p| p.enabled) {
                let mark = if active.as_deref() == Some(profile.id.as_str()) {
                    '*'
                } else {
                    ' '
                };
                println!(
                    "{mark} {:<12} {:<12} {}",
                    profile.id,
                    profile.display_name,
                    profile.user_config_path.display()
                );
            }
            Ok(())
        }
        Commands::Status => {
            match manager.active_profile() {
                Some(id) => println!("Active profile: {id}"),
                None => println!("Active profile: unknown"),
            }
            match manager.installed_profile_in_sync() {
                Ok(Some(false)) => println!(
                    "The profile file was edited since it was installed; switch again to apply."
                ),
                Ok(_) => {}
                Err(e) => log::warn!("Cli: Could not compare installed profile: {e}"),
            }
            Ok(())
        }
        Commands::Switch { profile } => switch_and_report(&manager, profile),
        Commands::Toggle => {
            let target = manager.quick_toggle_target().to_string();
            switch_and_report(&manager, target)
        }
    }
}

fn switch_and_report(
    manager: &Arc<TlpProfileManager>,
    profile_id: String,
) -> Result<(), Box<dyn Error>> {
    let subscription = manager.subscribe(|id| println!("Active profile: {id}"));
    let joined = manager.switch_in_background(profile_id.clone()).join();
    manager.unsubscribe(subscription);
    let outcome = joined.map_err(|_| format!("Switch to '{profile_id}' panicked"))??;
    if outcome == SwitchOutcome::AlreadyActive {
        println!("Profile '{profile_id}' is already active");
    }
    Ok(())
}
