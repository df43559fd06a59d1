//! Path resolution for xata-provider
//!
//! # Environment Variables
//!
//! - `XATA_PROVIDER_CONFIG_DIR` - Override config directory (holds `workspaces.toml`)
//! - `XATA_PROVIDER_STATE_DIR` - Override state directory (holds `state.toml`)
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `XATA_PROVIDER_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/xata-provider` (if set)
//! 3. Platform default:
//!    - Windows: `%APPDATA%\xata-provider`
//!    - macOS/Linux: `~/.config/xata-provider`
//!
//! For state_dir():
//! 1. `XATA_PROVIDER_STATE_DIR` environment variable
//! 2. `XDG_STATE_HOME/xata-provider` (if set)
//! 3. Platform default:
//!    - Windows: `%LOCALAPPDATA%\xata-provider`
//!    - macOS/Linux: `~/.local/state/xata-provider`

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_DIR: &str = "xata-provider";

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "XATA_PROVIDER_CONFIG_DIR";

/// Environment variable for state directory override
pub const ENV_STATE_DIR: &str = "XATA_PROVIDER_STATE_DIR";

/// Name of the declaration file inside the config directory
pub const DECLARATION_FILE: &str = "workspaces.toml";

/// Name of the state file inside the state directory
pub const STATE_FILE: &str = "state.toml";

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join(APP_DIR);
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        if let Some(app_data) = dirs::config_dir() {
            let path = app_data.join(APP_DIR);
            log::debug!("Using Windows config dir: {}", path.display());
            return Ok(path);
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join(APP_DIR);
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Get the state directory path
pub fn state_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_STATE_DIR) {
        let path = expand(&dir);
        log::debug!("Using state dir from {}: {}", ENV_STATE_DIR, path.display());
        return Ok(path);
    }

    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        let path = PathBuf::from(xdg_state).join(APP_DIR);
        log::debug!("Using XDG_STATE_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        if let Some(local_app_data) = dirs::data_local_dir() {
            let path = local_app_data.join(APP_DIR);
            log::debug!("Using Windows state dir: {}", path.display());
            return Ok(path);
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".local").join("state").join(APP_DIR);
    log::debug!("Using default state dir: {}", path.display());
    Ok(path)
}

/// Default location of the declaration file
pub fn declaration_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(DECLARATION_FILE))
}

/// Default location of the state file
pub fn state_file() -> Result<PathBuf> {
    Ok(state_dir()?.join(STATE_FILE))
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    /// Run `f` with `key` set, restoring the previous value afterwards
    ///
    /// # Safety
    /// Uses env::set_var/remove_var; only call from tests that do not read
    /// the same variable concurrently.
    fn with_env_var<F, R>(key: &str, value: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: each test touches its own variable
        unsafe { env::set_var(key, value) };
        let result = f();
        match original {
            // SAFETY: see above
            Some(v) => unsafe { env::set_var(key, v) },
            None => unsafe { env::remove_var(key) },
        }
        result
    }

    fn without_env_var<F, R>(key: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: each test touches its own variable
        unsafe { env::remove_var(key) };
        let result = f();
        if let Some(v) = original {
            // SAFETY: see above
            unsafe { env::set_var(key, v) };
        }
        result
    }

    #[test]
    fn test_config_dir_env_override() {
        with_env_var(ENV_CONFIG_DIR, "/custom/config/path", || {
            assert_eq!(config_dir().unwrap(), PathBuf::from("/custom/config/path"));
            assert_eq!(
                declaration_file().unwrap(),
                PathBuf::from("/custom/config/path/workspaces.toml")
            );
        });

        let home = dirs::home_dir().unwrap();
        with_env_var(ENV_CONFIG_DIR, "~/xata-config-tilde-test", || {
            assert_eq!(config_dir().unwrap(), home.join("xata-config-tilde-test"));
        });
    }

    #[test]
    fn test_xdg_state_home() {
        without_env_var(ENV_STATE_DIR, || {
            with_env_var("XDG_STATE_HOME", "/tmp/xdg-state-test", || {
                let result = state_dir().unwrap();
                assert_eq!(result, PathBuf::from("/tmp/xdg-state-test/xata-provider"));
                assert_eq!(
                    state_file().unwrap(),
                    PathBuf::from("/tmp/xdg-state-test/xata-provider/state.toml")
                );
            });
        });
    }

    #[test]
    fn test_expand_absolute() {
        assert_eq!(expand("/absolute/path"), PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_expand_unknown_env_var_unchanged() {
        let result = expand("/path/$NONEXISTENT_XATA_VAR_12345/file");
        assert_eq!(
            result,
            PathBuf::from("/path/$NONEXISTENT_XATA_VAR_12345/file")
        );
    }
}
