//! Reads the script-global `settings` table after compile.

use crate::params::{LayoutHints, ParamSpec, ParamType};
use phosphor_palette::{quantize, ColorIndex, PaletteId, PaletteRegistry, QuantizePolicy};

#[derive(Debug, Clone, Default)]
pub struct ScriptSettings {
    pub fps: Option<u32>,
    pub once: bool,
    pub fg: Option<ColorIndex>,
    pub bg: Option<ColorIndex>,
    pub params: Vec<ParamSpec>,
}

/// Resolve a settings color field: either a bare xterm-256 index or a
/// `"#RRGGBB"`/`"RRGGBB"` string, quantized against the active palette.
fn resolve_color(value: &mlua::Value, registry: &PaletteRegistry) -> Option<ColorIndex> {
    match value {
        mlua::Value::Integer(i) => Some(ColorIndex::new((*i).clamp(0, 255) as u16)),
        mlua::Value::String(s) => {
            let text = s.to_str().ok()?;
            let hex = text.strip_prefix('#').unwrap_or(text.as_ref());
            if hex.len() != 6 {
                return None;
            }
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            let idx = quantize::nearest_index(registry, PaletteId::XTERM256, r, g, b, QuantizePolicy::default());
            Some(ColorIndex::new(idx as u16))
        }
        _ => None,
    }
}

fn read_param_spec(table: &mlua::Table) -> Option<ParamSpec> {
    let key: String = table.get("key").ok()?;
    let label: String = table.get("label").unwrap_or_else(|_| key.clone());
    let ty_name: String = table.get("type").ok()?;
    let ty = match ty_name.as_str() {
        "bool" => ParamType::Bool,
        "int" => ParamType::Int,
        "float" => ParamType::Float,
        "enum" => ParamType::Enum,
        "button" => ParamType::Button,
        _ => return None,
    };
    let mut spec = ParamSpec::new(key, label, ty);
    spec.tooltip = table.get("tooltip").ok();
    spec.enabled_if = table.get("enabled_if").ok();

    let mut layout = LayoutHints::default();
    layout.primary = table.get("primary").unwrap_or(false);
    layout.section = table.get("section").ok();
    layout.inline_with_prev = table.get("inline_with_prev").unwrap_or(false);
    layout.width = table.get("width").ok();
    layout.ui = table.get("ui").ok();
    spec.layout = layout;

    if let (Ok(min), Ok(max)) = (table.get::<i64>("min"), table.get::<i64>("max")) {
        let step: i64 = table.get("step").unwrap_or(1);
        spec.int_range = Some((min, max, step));
    }
    if let (Ok(min), Ok(max)) = (table.get::<f64>("min"), table.get::<f64>("max")) {
        let step: f64 = table.get("step").unwrap_or(0.1);
        spec.float_range = Some((min, max, step));
    }
    if let Ok(items) = table.get::<mlua::Table>("items") {
        spec.enum_items = items.sequence_values::<String>().filter_map(Result::ok).collect();
    }
    Some(spec)
}

pub fn read_settings(lua: &mlua::Lua, registry: &PaletteRegistry) -> Result<ScriptSettings, mlua::Error> {
    let mut settings = ScriptSettings::default();
    let table: Option<mlua::Table> = lua.globals().get("settings")?;
    let Some(table) = table else {
        return Ok(settings);
    };

    if let Ok(fps) = table.get::<i64>("fps") {
        settings.fps = Some((fps.max(1) as u32).min(240));
    }
    settings.once = table.get("once").unwrap_or(false);

    if let Ok(fg) = table.get::<mlua::Value>("fg") {
        settings.fg = resolve_color(&fg, registry);
    }
    if let Ok(bg) = table.get::<mlua::Value>("bg") {
        settings.bg = resolve_color(&bg, registry);
    }

    if let Ok(params) = table.get::<mlua::Table>("params") {
        settings.params = params
            .sequence_values::<mlua::Table>()
            .filter_map(Result::ok)
            .filter_map(|t| read_param_spec(&t))
            .collect();
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_quantizes_against_the_active_palette() {
        let registry = PaletteRegistry::new();
        let idx = resolve_color(&mlua::Value::String(mlua::Lua::new().create_string("#ff0000").unwrap()), &registry);
        assert!(idx.is_some());
    }

    #[test]
    fn bare_integer_color_passes_through_as_an_index() {
        let registry = PaletteRegistry::new();
        let idx = resolve_color(&mlua::Value::Integer(42), &registry);
        assert_eq!(idx, Some(ColorIndex::new(42)));
    }
}
