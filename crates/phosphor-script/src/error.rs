use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("compile error: {0}")]
    Compile(String),

    #[error("runtime error: {0}")]
    Runtime(String),

    #[error("invalid layer index {0}")]
    InvalidLayer(usize),

    #[error("no compiled script to run")]
    NotCompiled,
}

impl From<mlua::Error> for ScriptError {
    fn from(err: mlua::Error) -> Self {
        ScriptError::Runtime(err.to_string())
    }
}
