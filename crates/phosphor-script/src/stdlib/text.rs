//! UTF-8/text helpers: decode to codepoints, measure, word-wrap.

pub fn install(lua: &mlua::Lua, module: &mlua::Table) -> mlua::Result<()> {
    let text = lua.create_table()?;

    text.set(
        "codepoints",
        lua.create_function(|lua, s: String| {
            let table = lua.create_table()?;
            for (i, ch) in s.chars().enumerate() {
                table.set(i + 1, ch as u32)?;
            }
            Ok(table)
        })?,
    )?;

    text.set(
        "measure",
        lua.create_function(|_, s: String| Ok(s.chars().count() as i64))?,
    )?;

    text.set(
        "word_wrap",
        lua.create_function(|lua, (s, width): (String, i64)| {
            let width = width.max(1) as usize;
            let wrapped = word_wrap(&s, width);
            let table = lua.create_table()?;
            for (i, line) in wrapped.into_iter().enumerate() {
                table.set(i + 1, line)?;
            }
            Ok(table)
        })?,
    )?;

    module.set("text", text)?;
    Ok(())
}

fn word_wrap(s: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in s.split_whitespace() {
        let candidate_len = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if candidate_len > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
        while current.chars().count() > width {
            let split_at = current
                .char_indices()
                .nth(width)
                .map(|(i, _)| i)
                .unwrap_or(current.len());
            let rest = current.split_off(split_at);
            lines.push(std::mem::replace(&mut current, rest));
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_words_pack_onto_one_line() {
        assert_eq!(word_wrap("a bb ccc", 20), vec!["a bb ccc"]);
    }

    #[test]
    fn wraps_at_the_requested_width() {
        let lines = word_wrap("one two three four", 8);
        assert!(lines.iter().all(|l| l.chars().count() <= 8));
        assert!(lines.len() > 1);
    }

    #[test]
    fn a_single_word_longer_than_width_is_hard_split() {
        let lines = word_wrap("supercalifragilistic", 6);
        assert!(lines.iter().all(|l| l.chars().count() <= 6));
    }
}
