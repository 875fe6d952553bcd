//! Host-bound commands a tool script appends to `ctx.out[]` during
//! `render`. The host clears `ctx.out` each tick and applies the parsed
//! commands after `render` returns.

#[derive(Debug, Clone, PartialEq)]
pub enum ToolCommand {
    PaletteSet { fg: Option<u8>, bg: Option<u8> },
    BrushSet { cp: u32 },
    ToolActivate { id: String },
    ToolActivatePrev,
    CanvasCropToSelection,
}

impl ToolCommand {
    /// Parse one `{type = "...", ...}` Lua table entry. Unknown or
    /// malformed entries are dropped rather than failing the whole tick —
    /// a script bug in one command should not roll back the others.
    pub fn from_table(table: &mlua::Table) -> Option<ToolCommand> {
        let ty: String = table.get("type").ok()?;
        match ty.as_str() {
            "palette.set" => Some(ToolCommand::PaletteSet {
                fg: table.get::<Option<i64>>("fg").ok().flatten().map(|v| v as u8),
                bg: table.get::<Option<i64>>("bg").ok().flatten().map(|v| v as u8),
            }),
            "brush.set" => {
                let cp: i64 = table.get("cp").ok()?;
                Some(ToolCommand::BrushSet { cp: cp as u32 })
            }
            "tool.activate" => {
                let id: String = table.get("id").ok()?;
                Some(ToolCommand::ToolActivate { id })
            }
            "tool.activate_prev" => Some(ToolCommand::ToolActivatePrev),
            "canvas.crop_to_selection" => Some(ToolCommand::CanvasCropToSelection),
            other => {
                tracing::debug!(target: "script.commands", kind = other, "unrecognized tool command, dropped");
                None
            }
        }
    }
}

/// Read every entry of the `out` array table, dropping anything that
/// doesn't parse as a recognized command.
pub fn parse_out_table(out: &mlua::Table) -> Vec<ToolCommand> {
    let mut commands = Vec::new();
    for pair in out.clone().sequence_values::<mlua::Table>() {
        if let Ok(entry) = pair
            && let Some(cmd) = ToolCommand::from_table(&entry)
        {
            commands.push(cmd);
        }
    }
    commands
}
