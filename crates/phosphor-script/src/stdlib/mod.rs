//! The host module table scripts see besides `ctx`/`layer`: math, sdf,
//! noise, palette, sort, and text helpers.

mod mathx;
mod noise;
mod palette;
mod sdf;
mod sort;
mod text;

use std::rc::Rc;

use phosphor_palette::PaletteRegistry;

use crate::glyph_ink::GlyphInk;

/// Build the module table and publish it as both `ansl` (classic name, for
/// scripts ported from the original runner) and the host-global it's
/// looked up under.
pub fn install(lua: &mlua::Lua, registry: Rc<PaletteRegistry>, ink: Rc<dyn GlyphInk>) -> mlua::Result<()> {
    let module = lua.create_table()?;
    mathx::install(lua, &module)?;
    sdf::install(lua, &module)?;
    noise::install(lua, &module)?;
    palette::install(lua, &module, registry)?;
    sort::install(lua, &module, ink)?;
    text::install(lua, &module)?;
    lua.globals().set("ansl", module)?;
    Ok(())
}
