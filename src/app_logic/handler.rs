use crate::core::{
    ActiveProfileDetector, ChangeNotifier, ElevatedCommandRunner, PROFILE_ID_BALANCED,
    PROFILE_ID_PERFORMANCE, PROFILE_ID_POWER_SAVER, Profile, ProfileCatalog, ProfileStore,
    ProfileSwitcher, SubscriptionId, SwitchOutcome, TlpPaths, checksum_utils, error::Result,
};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

/*
 * The interface a presentation layer talks to. It owns the catalog, the active-profile
 * state and the elevated runner, and sequences the core components: the profile store
 * and detector on startup, the switcher on every request.
 *
 * Switches are serialized by an internal mutex, so a switch that starts after another
 * has finished always sees the post-switch state. The manager is `Send + Sync` and is
 * typically shared behind an `Arc` so switches can run on a worker thread.
 */
pub struct TlpProfileManager {
    paths: TlpPaths,
    catalog: RwLock<ProfileCatalog>,
    notifier: ChangeNotifier,
    runner: Arc<dyn ElevatedCommandRunner>,
    switch_lock: Mutex<()>,
}

impl TlpProfileManager {
    pub fn new(paths: TlpPaths, runner: Arc<dyn ElevatedCommandRunner>) -> Self {
        let catalog = ProfileCatalog::new(&paths.user_profile_dir);
        Self::with_catalog(paths, catalog, runner)
    }

    pub fn with_catalog(
        paths: TlpPaths,
        catalog: ProfileCatalog,
        runner: Arc<dyn ElevatedCommandRunner>,
    ) -> Self {
        TlpProfileManager {
            paths,
            catalog: RwLock::new(catalog),
            notifier: ChangeNotifier::new(),
            runner,
            switch_lock: Mutex::new(()),
        }
    }

    pub fn paths(&self) -> &TlpPaths {
        &self.paths
    }

    /*
     * Startup sequence: make sure the user profile files exist, then find out which
     * profile is installed and seed the active state with it. When TLP is not installed
     * the catalog ends up fully disabled and `NotInstalled` is returned; the manager
     * stays usable for listing.
     */
    pub fn load_profile_config(&self) -> Result<()> {
        let detected = {
            let _switch_guard = self
                .switch_lock
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let mut catalog = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
            ProfileStore::new(&self.paths).prepare(&mut catalog)?;
            let detected = ActiveProfileDetector::new(&self.paths).detect(&catalog);
            if let Some(id) = &detected {
                self.notifier.set_current(id);
            }
            detected
        };
        if let Some(id) = detected {
            self.notifier.notify(&id);
        }
        Ok(())
    }

    pub fn list_profiles(&self) -> Vec<Profile> {
        self.read_catalog().list_profiles().to_vec()
    }

    /// Profiles a presentation layer may offer for selection.
    pub fn enabled_profiles(&self) -> Vec<Profile> {
        self.read_catalog().enabled_profiles().cloned().collect()
    }

    pub fn get_profile(&self, profile_id: &str) -> Option<Profile> {
        self.read_catalog().find_profile(profile_id).cloned()
    }

    pub fn active_profile(&self) -> Option<String> {
        self.notifier.current()
    }

    /// Subscribers are notified after the switch lock is released, so a handler may
    /// request another switch.
    pub fn set_active_profile(&self, profile_id: &str) -> Result<SwitchOutcome> {
        let outcome = {
            let _switch_guard = self
                .switch_lock
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let catalog = self.read_catalog();
            ProfileSwitcher::new(&self.paths, self.runner.as_ref()).switch_to(
                &catalog,
                &self.notifier,
                profile_id,
            )?
        };
        if outcome == SwitchOutcome::Switched {
            self.notifier.notify(profile_id);
        }
        Ok(outcome)
    }

    /// Runs `set_active_profile` on a worker thread so the caller is not blocked by the
    /// elevation prompt.
    pub fn switch_in_background(
        self: &Arc<Self>,
        profile_id: String,
    ) -> JoinHandle<Result<SwitchOutcome>> {
        let manager = Arc::clone(self);
        thread::spawn(move || {
            let result = manager.set_active_profile(&profile_id);
            if let Err(e) = &result {
                log::error!("AppLogic: Failed to switch profile to '{profile_id}': {e}");
            }
            result
        })
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.notifier.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// The profile a single "toggle" action switches to: balanced goes to power-saver,
    /// anything else goes to performance.
    pub fn quick_toggle_target(&self) -> &'static str {
        match self.active_profile().as_deref() {
            Some(PROFILE_ID_BALANCED) => PROFILE_ID_POWER_SAVER,
            _ => PROFILE_ID_PERFORMANCE,
        }
    }

    /*
     * Compares the installed marker body with the active profile's user file.
     * `Ok(None)` when no profile is active, `Ok(Some(false))` when the user edited the
     * profile since it was installed.
     */
    pub fn installed_profile_in_sync(&self) -> std::io::Result<Option<bool>> {
        let Some(active) = self.active_profile() else {
            return Ok(None);
        };
        let Some(profile) = self.get_profile(&active) else {
            return Ok(None);
        };
        let installed = checksum_utils::calculate_body_checksum(
            &self.paths.marker_path(),
            checksum_utils::GENERATED_HEADER_LINES,
        )?;
        let source = checksum_utils::calculate_sha256_checksum(&profile.user_config_path)?;
        log::debug!("AppLogic: Installed body {installed}, profile file {source}");
        Ok(Some(installed == source))
    }

    fn read_catalog(&self) -> std::sync::RwLockReadGuard<'_, ProfileCatalog> {
        self.catalog.read().unwrap_or_else(PoisonError::into_inner)
    }
}
