//! Startup seeding configuration.

use serde::{Deserialize, Serialize};

/// The super-admin account created when the hub starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Username of the seeded super-admin.
    #[serde(default = "default_username")]
    pub super_admin_username: String,
    /// Display name of the seeded super-admin.
    #[serde(default = "default_display_name")]
    pub super_admin_display_name: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            super_admin_username: default_username(),
            super_admin_display_name: default_display_name(),
        }
    }
}

fn default_username() -> String {
    "superadmin".to_string()
}

fn default_display_name() -> String {
    "Super Admin".to_string()
}
