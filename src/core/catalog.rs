/*
 * The fixed set of power profiles this tool can install. Each entry is declared once,
 * in a stable order, and the order matters: it is the order profiles are presented in
 * and the tie-break used when matching the installed marker header against profile ids.
 *
 * The catalog never changes identity after construction. The only mutable part of an
 * entry is its `enabled` flag, which the profile store sets during initialization.
 */
use super::models::Profile;
use std::path::Path;

pub const PROFILE_ID_PERFORMANCE: &str = "performance";
pub const PROFILE_ID_BALANCED: &str = "balanced";
pub const PROFILE_ID_POWER_SAVER: &str = "power-saver";

pub const PROFILE_FILE_EXTENSION: &str = "conf";

#[derive(Debug, Clone, Copy)]
pub struct ProfileDefinition {
    pub id: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub indicator_icon: &'static str,
}

pub const DEFAULT_PROFILES: [ProfileDefinition; 3] = [
    ProfileDefinition {
        id: PROFILE_ID_PERFORMANCE,
        display_name: "Performance",
        description: "this profile is for performance mode",
        indicator_icon: "power-profile-performance-symbolic",
    },
    ProfileDefinition {
        id: PROFILE_ID_BALANCED,
        display_name: "Balanced",
        description: "this profile is for balanced mode",
        indicator_icon: "power-profile-balanced-symbolic",
    },
    ProfileDefinition {
        id: PROFILE_ID_POWER_SAVER,
        display_name: "Power-saver",
        description: "this profile is for power-saver mode",
        indicator_icon: "power-profile-power-saver-symbolic",
    },
];

#[derive(Debug, Clone)]
pub struct ProfileCatalog {
    profiles: Vec<Profile>,
}

impl ProfileCatalog {
    /// Builds the default three-profile catalog rooted at `user_profile_dir`.
    pub fn new(user_profile_dir: &Path) -> Self {
        Self::from_definitions(&DEFAULT_PROFILES, user_profile_dir)
    }

    pub fn from_definitions(definitions: &[ProfileDefinition], user_profile_dir: &Path) -> Self {
        let profiles = definitions
            .iter()
            .map(|def| {
                let file_name = format!("{}.{PROFILE_FILE_EXTENSION}", def.id);
                Profile {
                    id: def.id.to_string(),
                    user_config_path: user_profile_dir.join(&file_name),
                    file_name,
                    description: def.description.to_string(),
                    display_name: def.display_name.to_string(),
                    indicator_icon: def.indicator_icon.to_string(),
                    enabled: true,
                }
            })
            .collect();
        ProfileCatalog { profiles }
    }

    pub fn list_profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn find_profile(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn enabled_profiles(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.iter().filter(|p| p.enabled)
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) {
        if let Some(profile) = self.profiles.iter_mut().find(|p| p.id == id) {
            profile.enabled = enabled;
        }
    }

    pub fn disable_all(&mut self) {
        for profile in &mut self.profiles {
            profile.enabled = false;
        }
    }

    /*
     * Returns the id of the first profile, in declaration order, whose id occurs anywhere
     * in `header_line`. The header is prose such as "# performance", so this is a substring
     * test rather than equality. An id that is a substring of a later id (or of unrelated
     * header text) would shadow it; declaration order is the only tie-break.
     */
    pub fn match_header_line(&self, header_line: &str) -> Option<&str> {
        self.profiles
            .iter()
            .find(|p| header_line.contains(p.id.as_str()))
            .map(|p| p.id.as_str())
    }
}
