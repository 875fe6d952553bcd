//! `palette.rgb`, `palette.hex`, and an `ansi16` name map over the active
//! palette, all routed through the same quantizer the importer and canvas
//! use so a script's idea of "nearest green" matches the rest of the host.

use std::rc::Rc;

use phosphor_palette::{quantize, PaletteId, PaletteRegistry, QuantizePolicy};

const ANSI16_NAMES: [(&str, u8); 16] = [
    ("black", 0),
    ("red", 1),
    ("green", 2),
    ("yellow", 3),
    ("blue", 4),
    ("magenta", 5),
    ("cyan", 6),
    ("white", 7),
    ("bright_black", 8),
    ("bright_red", 9),
    ("bright_green", 10),
    ("bright_yellow", 11),
    ("bright_blue", 12),
    ("bright_magenta", 13),
    ("bright_cyan", 14),
    ("bright_white", 15),
];

pub fn install(lua: &mlua::Lua, module: &mlua::Table, registry: Rc<PaletteRegistry>) -> mlua::Result<()> {
    let palette = lua.create_table()?;

    let registry_for_rgb = registry.clone();
    palette.set(
        "rgb",
        lua.create_function(move |_, (r, g, b): (u8, u8, u8)| {
            let idx = quantize::nearest_index(&registry_for_rgb, PaletteId::XTERM256, r, g, b, QuantizePolicy::default());
            Ok(idx as i64)
        })?,
    )?;

    let registry_for_hex = registry.clone();
    palette.set(
        "hex",
        lua.create_function(move |_, text: String| {
            let hex = text.strip_prefix('#').unwrap_or(&text).to_string();
            if hex.len() != 6 {
                return Err(mlua::Error::RuntimeError(format!("bad hex color: {text}")));
            }
            let r = u8::from_str_radix(&hex[0..2], 16).map_err(|e| mlua::Error::RuntimeError(e.to_string()))?;
            let g = u8::from_str_radix(&hex[2..4], 16).map_err(|e| mlua::Error::RuntimeError(e.to_string()))?;
            let b = u8::from_str_radix(&hex[4..6], 16).map_err(|e| mlua::Error::RuntimeError(e.to_string()))?;
            let idx = quantize::nearest_index(&registry_for_hex, PaletteId::XTERM256, r, g, b, QuantizePolicy::default());
            Ok(idx as i64)
        })?,
    )?;

    let ansi16 = lua.create_table()?;
    for (name, idx) in ANSI16_NAMES {
        ansi16.set(name, idx as i64)?;
    }
    palette.set("ansi16", ansi16)?;

    module.set("palette", palette)?;
    Ok(())
}
