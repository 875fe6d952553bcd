//! Platform config/cache/assets directory discovery. Environment variables
//! take priority over platform defaults so packagers and tests can
//! relocate everything without touching the host OS's real config dir.

use std::path::PathBuf;

const APP_DIR_NAME: &str = "phosphor";

/// The three directory roots the editor reads or writes: persisted session
/// state and user config under `config`, derived/throwaway data (e.g. a
/// future font-atlas cache) under `cache`, and bundled read-only assets.
#[derive(Debug, Clone)]
pub struct Dirs {
    pub config: PathBuf,
    pub cache: PathBuf,
    pub assets: PathBuf,
}

impl Dirs {
    /// Resolve from environment overrides first, then platform defaults
    /// (`$XDG_CONFIG_HOME/phosphor`, `$XDG_CACHE_HOME/phosphor`, and
    /// platform-appropriate equivalents elsewhere via the `dirs` crate).
    pub fn discover() -> Self {
        let config = env_override("PHOSPHOR_CONFIG_DIR")
            .or_else(|| dirs::config_dir().map(|d| d.join(APP_DIR_NAME)))
            .unwrap_or_else(|| PathBuf::from(APP_DIR_NAME));

        let cache = env_override("PHOSPHOR_CACHE_DIR")
            .or_else(|| dirs::cache_dir().map(|d| d.join(APP_DIR_NAME)))
            .unwrap_or_else(|| config.join("cache"));

        let assets = env_override("PHOSPHOR_ASSETS_DIR").unwrap_or_else(|| config.join("assets"));

        Self { config, cache, assets }
    }

    pub fn session_state_path(&self) -> PathBuf {
        self.config.join("session.json")
    }
}

fn env_override(key: &str) -> Option<PathBuf> {
    std::env::var_os(key).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_override_wins_over_platform_defaults() {
        // SAFETY: single-threaded test process section; no other test reads these keys.
        unsafe {
            std::env::set_var("PHOSPHOR_CONFIG_DIR", "/tmp/phosphor-test-config");
        }
        let dirs = Dirs::discover();
        assert_eq!(dirs.config, PathBuf::from("/tmp/phosphor-test-config"));
        assert_eq!(dirs.session_state_path(), PathBuf::from("/tmp/phosphor-test-config/session.json"));
        unsafe {
            std::env::remove_var("PHOSPHOR_CONFIG_DIR");
        }
    }

    #[test]
    fn cache_defaults_under_config_when_no_platform_cache_dir_and_no_override() {
        unsafe {
            std::env::set_var("PHOSPHOR_CONFIG_DIR", "/tmp/phosphor-test-config-2");
            std::env::remove_var("PHOSPHOR_CACHE_DIR");
        }
        let dirs = Dirs::discover();
        assert!(dirs.cache == dirs.config.join("cache") || dirs.cache.ends_with(APP_DIR_NAME));
        unsafe {
            std::env::remove_var("PHOSPHOR_CONFIG_DIR");
        }
    }
}
