//! Environment loading for the CLI.
//!
//! Priority order (highest to lowest): current directory `.env`,
//! `~/.tenantctl/.env`, environment variables already set. dotenvy never
//! overwrites existing variables, so earlier sources win.

use std::path::PathBuf;

/// Load `.env` files from the known locations.
pub fn load_dotenv() {
    // Current directory first so local overrides win.
    let _ = dotenvy::dotenv();

    if let Some(env_file) = config_dir().map(|dir| dir.join(".env")) {
        if env_file.exists() {
            let _ = dotenvy::from_path(&env_file);
        }
    }
}

/// The tenantctl config directory (`~/.tenantctl`).
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".tenantctl"))
}
