//! Platform directory discovery and persisted session state.

mod dirs;
mod error;
mod state;

pub use dirs::Dirs;
pub use error::SessionError;
pub use state::{SessionState, StoredParamType, StoredParamValue, ToolParamValues};

/// Load session state from `dirs.session_state_path()`. A missing file is
/// not an error — it yields a fresh default state, matching a first run.
pub fn load(dirs: &Dirs) -> Result<SessionState, SessionError> {
    let path = dirs.session_state_path();
    match std::fs::read_to_string(&path) {
        Ok(text) => Ok(serde_json::from_str(&text)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(target: "session", path = %path.display(), "no session file yet, using defaults");
            Ok(SessionState::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Persist session state as JSON at `dirs.session_state_path()`, creating
/// the config directory if needed.
pub fn save(state: &SessionState, dirs: &Dirs) -> Result<(), SessionError> {
    std::fs::create_dir_all(&dirs.config)?;
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(dirs.session_state_path(), json)?;
    Ok(())
}
