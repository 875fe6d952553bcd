//! `sort.by_brightness(utf8, ascending?)` — rank a string's distinct
//! glyphs by ink coverage, for gradient/ramp-style ASCII-art tools.

use std::rc::Rc;

use crate::glyph_ink::GlyphInk;

pub fn install(lua: &mlua::Lua, module: &mlua::Table, ink: Rc<dyn GlyphInk>) -> mlua::Result<()> {
    let sort = lua.create_table()?;

    sort.set(
        "by_brightness",
        lua.create_function(move |_, (text, ascending): (String, Option<bool>)| {
            let ascending = ascending.unwrap_or(true);
            let mut chars: Vec<char> = text.chars().collect();
            chars.sort_by(|a, b| {
                let ca = ink.coverage(*a);
                let cb = ink.coverage(*b);
                ca.partial_cmp(&cb).unwrap_or(std::cmp::Ordering::Equal)
            });
            if !ascending {
                chars.reverse();
            }
            Ok(chars.into_iter().collect::<String>())
        })?,
    )?;

    module.set("sort", sort)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph_ink::BuiltinGlyphInk;

    #[test]
    fn ramp_sorts_from_space_to_full_block() {
        let lua = mlua::Lua::new();
        let module = lua.create_table().unwrap();
        install(&lua, &module, Rc::new(BuiltinGlyphInk)).unwrap();
        lua.globals().set("sort", module.get::<mlua::Table>("sort").unwrap()).unwrap();
        let result: String = lua
            .load(r#"return sort.by_brightness("@ .")"#)
            .eval()
            .unwrap();
        assert_eq!(result.chars().next(), Some(' '));
        assert_eq!(result.chars().last(), Some('@'));
    }
}
