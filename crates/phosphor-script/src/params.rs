//! Host-managed parameter specs and values exposed to scripts as
//! `ctx.params.<key>` and to the host UI for building a parameter panel.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Bool,
    Int,
    Float,
    Enum,
    Button,
}

/// Layout hints the host parameter panel may use; the core attaches no
/// behavior to them beyond carrying them through.
#[derive(Debug, Clone, Default)]
pub struct LayoutHints {
    pub primary: bool,
    pub section: Option<String>,
    pub inline_with_prev: bool,
    pub width: Option<f32>,
    pub ui: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub key: String,
    pub label: String,
    pub ty: ParamType,
    pub tooltip: Option<String>,
    pub layout: LayoutHints,
    pub int_range: Option<(i64, i64, i64)>,
    pub float_range: Option<(f64, f64, f64)>,
    pub enum_items: Vec<String>,
    pub enabled_if: Option<String>,
}

impl ParamSpec {
    pub fn new(key: impl Into<String>, label: impl Into<String>, ty: ParamType) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            ty,
            tooltip: None,
            layout: LayoutHints::default(),
            int_range: None,
            float_range: None,
            enum_items: Vec::new(),
            enabled_if: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Enum(String),
    Button(bool),
}

impl ParamValue {
    fn default_for(ty: ParamType, enum_items: &[String]) -> Self {
        match ty {
            ParamType::Bool => ParamValue::Bool(false),
            ParamType::Int => ParamValue::Int(0),
            ParamType::Float => ParamValue::Float(0.0),
            ParamType::Enum => ParamValue::Enum(enum_items.first().cloned().unwrap_or_default()),
            ParamType::Button => ParamValue::Button(false),
        }
    }
}

/// Holds the live value for every parameter a compiled script declares.
/// Button values are edge-triggered: a script sees `true` for exactly one
/// tick after [`ParamStore::fire_button`], and the store clears it
/// immediately after that tick via [`ParamStore::end_tick`].
#[derive(Debug, Default)]
pub struct ParamStore {
    specs: Vec<ParamSpec>,
    values: HashMap<String, ParamValue>,
    fired_buttons: Vec<String>,
}

impl ParamStore {
    pub fn from_specs(specs: Vec<ParamSpec>) -> Self {
        let mut values = HashMap::with_capacity(specs.len());
        for spec in &specs {
            values.insert(spec.key.clone(), ParamValue::default_for(spec.ty, &spec.enum_items));
        }
        Self { specs, values, fired_buttons: Vec::new() }
    }

    pub fn specs(&self) -> &[ParamSpec] {
        &self.specs
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn set_bool(&mut self, key: &str, v: bool) -> bool {
        self.set_if_matches(key, ParamValue::Bool(v))
    }

    pub fn set_int(&mut self, key: &str, v: i64) -> bool {
        self.set_if_matches(key, ParamValue::Int(v))
    }

    pub fn set_float(&mut self, key: &str, v: f64) -> bool {
        self.set_if_matches(key, ParamValue::Float(v))
    }

    pub fn set_enum(&mut self, key: &str, v: impl Into<String>) -> bool {
        self.set_if_matches(key, ParamValue::Enum(v.into()))
    }

    fn set_if_matches(&mut self, key: &str, value: ParamValue) -> bool {
        match self.values.get_mut(key) {
            Some(slot) if std::mem::discriminant(slot) == std::mem::discriminant(&value) => {
                *slot = value;
                true
            }
            _ => false,
        }
    }

    /// Mark a button pressed for the next tick only.
    pub fn fire_button(&mut self, key: &str) -> bool {
        if !matches!(self.values.get(key), Some(ParamValue::Button(_))) {
            return false;
        }
        self.values.insert(key.to_string(), ParamValue::Button(true));
        self.fired_buttons.push(key.to_string());
        true
    }

    /// Clear edge-triggered buttons after the tick that observed them.
    pub fn end_tick(&mut self) {
        for key in self.fired_buttons.drain(..) {
            self.values.insert(key, ParamValue::Button(false));
        }
    }

    pub fn reset_to_defaults(&mut self) {
        for spec in &self.specs {
            self.values.insert(spec.key.clone(), ParamValue::default_for(spec.ty, &spec.enum_items));
        }
        self.fired_buttons.clear();
    }
}
