/*
 * This module consolidates the platform-agnostic logic of the tool: the fixed profile
 * catalog, the per-user profile store, detection of the installed profile, the
 * privileged switch, and publication of active-profile changes. It also holds the
 * settings layer and path resolution shared by all of them.
 */
pub mod catalog;
pub mod checksum_utils;
pub mod config;
pub mod detector;
pub mod elevated;
pub mod error;
pub mod models;
pub mod notifier;
pub mod path_utils;
pub mod profile_store;
pub mod switcher;

pub use catalog::{
    PROFILE_ID_BALANCED, PROFILE_ID_PERFORMANCE, PROFILE_ID_POWER_SAVER, ProfileCatalog,
};
pub use config::{ConfigManagerOperations, CoreConfigManager};
pub use detector::ActiveProfileDetector;
pub use elevated::{ElevatedCommandRunner, PkexecRunner};
#[cfg(test)]
pub use elevated::HelperOutput;
pub use error::TlpError;
pub use models::{Profile, SwitchOutcome};
pub use notifier::{ChangeNotifier, SubscriptionId};
pub use path_utils::TlpPaths;
pub use profile_store::ProfileStore;
pub use switcher::ProfileSwitcher;
