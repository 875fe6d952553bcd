//! Persisted session state: an arbitrary key→value record (window
//! placements, last selected theme, tool parameter values, preference
//! flags). The core only ever reads `theme_id` and `tool_param_values`;
//! everything else round-trips opaquely so the host UI can stash whatever
//! it likes without the core needing to know its shape.

use std::collections::HashMap;

use phosphor_script::ParamType;
use serde::{Deserialize, Serialize};

/// One persisted parameter value, tagged by type so a reload can tell a
/// `0` int apart from an unset float without guessing from JSON's number
/// representation alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredParamValue {
    #[serde(rename = "type")]
    pub ty: StoredParamType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bool_val: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub int_val: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub float_val: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_val: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoredParamType {
    Bool,
    Int,
    Float,
    Enum,
    Button,
}

impl From<ParamType> for StoredParamType {
    fn from(ty: ParamType) -> Self {
        match ty {
            ParamType::Bool => StoredParamType::Bool,
            ParamType::Int => StoredParamType::Int,
            ParamType::Float => StoredParamType::Float,
            ParamType::Enum => StoredParamType::Enum,
            ParamType::Button => StoredParamType::Button,
        }
    }
}

/// `tool_param_values[tool_id][key]`.
pub type ToolParamValues = HashMap<String, HashMap<String, StoredParamValue>>;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_id: Option<String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tool_param_values: ToolParamValues,

    /// Everything the core doesn't interpret: window placements,
    /// preference flags, and whatever else the host UI persists here.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SessionState {
    pub fn get_param(&self, tool_id: &str, key: &str) -> Option<&StoredParamValue> {
        self.tool_param_values.get(tool_id)?.get(key)
    }

    pub fn set_param(&mut self, tool_id: &str, key: &str, value: StoredParamValue) {
        self.tool_param_values.entry(tool_id.to_string()).or_default().insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json_preserving_unknown_fields() {
        let mut state = SessionState::default();
        state.theme_id = Some("midnight".into());
        state.set_param(
            "pencil",
            "radius",
            StoredParamValue { ty: StoredParamType::Int, bool_val: None, int_val: Some(3), float_val: None, string_val: None },
        );
        state.extra.insert("window_maximized".into(), serde_json::Value::Bool(true));

        let json = serde_json::to_string(&state).unwrap();
        let back: SessionState = serde_json::from_str(&json).unwrap();

        assert_eq!(back.theme_id.as_deref(), Some("midnight"));
        assert_eq!(back.get_param("pencil", "radius").unwrap().int_val, Some(3));
        assert_eq!(back.extra.get("window_maximized"), Some(&serde_json::Value::Bool(true)));
    }

    #[test]
    fn missing_optional_fields_default_to_empty() {
        let state: SessionState = serde_json::from_str("{}").unwrap();
        assert!(state.theme_id.is_none());
        assert!(state.tool_param_values.is_empty());
    }
}
