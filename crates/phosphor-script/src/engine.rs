//! Compiles and runs one script against the sandbox: owns the `mlua::Lua`
//! state, the cached compile identity, the parameter store, and the
//! scheduler.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use phosphor_canvas::Canvas;
use phosphor_palette::{PaletteId, PaletteRegistry};

use crate::commands::{parse_out_table, ToolCommand};
use crate::context::{FrameContext, TickPhase};
use crate::error::ScriptError;
use crate::glyph_ink::{BuiltinGlyphInk, GlyphInk};
use crate::layer_buffer::{LayerBuffer, LayerHandle};
use crate::params::ParamStore;
use crate::scheduler::Scheduler;
use crate::settings::{read_settings, ScriptSettings};
use crate::stdlib;

const MAIN_SHIM_SOURCE: &str = r#"
function render(ctx, layer)
    if pre ~= nil then pre(ctx, ctx.cursor, layer) end
    for y = 0, ctx.rows - 1 do
        for x = 0, ctx.cols - 1 do
            local coord = { x = x, y = y }
            local result = main(coord, ctx, ctx.cursor, layer)
            if result ~= nil then
                if type(result) == "table" then
                    layer:set(x, y, result.char, result.fg, result.bg)
                else
                    layer:set(x, y, result)
                end
            end
        end
    end
    if post ~= nil then post(ctx, ctx.cursor, layer) end
end
"#;

fn source_hash(source: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    hasher.finish()
}

struct CompiledScript {
    lua: mlua::Lua,
    source_hash: u64,
    palette_id: PaletteId,
}

pub struct ScriptEngine {
    compiled: Option<CompiledScript>,
    registry: Rc<PaletteRegistry>,
    ink: Rc<dyn GlyphInk>,
    settings: ScriptSettings,
    params: ParamStore,
    scheduler: Scheduler,
    frame: u64,
    last_error: Option<String>,
}

impl ScriptEngine {
    pub fn new(registry: PaletteRegistry) -> Self {
        Self {
            compiled: None,
            registry: Rc::new(registry),
            ink: Rc::new(BuiltinGlyphInk),
            settings: ScriptSettings::default(),
            params: ParamStore::from_specs(Vec::new()),
            scheduler: Scheduler::new(30, false),
            frame: 0,
            last_error: None,
        }
    }

    pub fn set_glyph_ink(&mut self, ink: Rc<dyn GlyphInk>) {
        self.ink = ink;
    }

    pub fn has_render_function(&self) -> bool {
        self.compiled.is_some()
    }

    pub fn settings(&self) -> &ScriptSettings {
        &self.settings
    }

    pub fn params(&self) -> &ParamStore {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ParamStore {
        &mut self.params
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// True when the cached compile is stale: the source text changed, or
    /// the canvas's palette identity changed underneath it.
    pub fn needs_recompile(&self, source: &str, palette_id: PaletteId) -> bool {
        match &self.compiled {
            Some(c) => c.source_hash != source_hash(source) || c.palette_id != palette_id,
            None => true,
        }
    }

    /// Compile (or recompile) the script. On failure the engine holds no
    /// compiled chunk at all until the next successful compile — a failed
    /// compile does not fall back to the previous one.
    pub fn compile(&mut self, source: &str, palette_id: PaletteId) -> Result<(), ScriptError> {
        self.compiled = None;
        self.last_error = None;

        let lua = mlua::Lua::new();
        stdlib::install(&lua, self.registry.clone(), self.ink.clone()).map_err(|e| ScriptError::Compile(e.to_string()))?;

        lua.load(source)
            .set_name("script")
            .exec()
            .map_err(|e| ScriptError::Compile(e.to_string()))?;

        let has_render: bool = lua.globals().contains_key("render").unwrap_or(false);
        let has_main: bool = lua.globals().contains_key("main").unwrap_or(false);
        if !has_render && !has_main {
            return Err(ScriptError::Compile("script defines neither render nor main".into()));
        }
        if !has_render {
            lua.load(MAIN_SHIM_SOURCE)
                .set_name("main_shim")
                .exec()
                .map_err(|e| ScriptError::Compile(e.to_string()))?;
        }

        let settings = read_settings(&lua, &self.registry).map_err(|e| ScriptError::Compile(e.to_string()))?;
        self.params = ParamStore::from_specs(settings.params.clone());
        self.settings = settings;
        self.scheduler = Scheduler::new(self.settings.fps.unwrap_or(30), self.settings.once);
        self.frame = 0;

        self.compiled = Some(CompiledScript {
            lua,
            source_hash: source_hash(source),
            palette_id,
        });
        tracing::debug!(target: "script.engine", "compiled script ({} params)", self.params.specs().len());
        Ok(())
    }

    /// Advance the scheduler by `dt` and, if it reports a tick should run,
    /// execute `render(ctx, layer)` against `layer_index` of `canvas`.
    /// Returns the parsed tool commands from `ctx.out[]`, or `None` if no
    /// tick ran this call.
    pub fn tick(
        &mut self,
        canvas: &mut Canvas,
        layer_index: usize,
        dt: std::time::Duration,
        mut ctx: FrameContext,
        clear_layer_first: bool,
    ) -> Result<Option<Vec<ToolCommand>>, ScriptError> {
        if !self.scheduler.advance(dt) {
            return Ok(None);
        }
        ctx.frame = self.frame;
        let commands = self.run_frame(canvas, layer_index, &ctx, clear_layer_first)?;
        self.frame += 1;
        Ok(Some(commands))
    }

    fn run_frame(
        &mut self,
        canvas: &mut Canvas,
        layer_index: usize,
        ctx: &FrameContext,
        clear_layer_first: bool,
    ) -> Result<Vec<ToolCommand>, ScriptError> {
        let Some(compiled) = &self.compiled else {
            return Err(ScriptError::NotCompiled);
        };
        let lua = &compiled.lua;

        let mut buffer = LayerBuffer::from_canvas_layer(canvas, layer_index).ok_or(ScriptError::InvalidLayer(layer_index))?;
        if clear_layer_first {
            buffer.clear(phosphor_canvas::BLANK_CODEPOINT);
        }
        let buffer = Rc::new(std::cell::RefCell::new(buffer));

        let result = self.run_render(lua, ctx, buffer.clone());
        match result {
            Ok(commands) => {
                buffer.borrow().write_back(canvas, layer_index);
                self.params.end_tick();
                Ok(commands)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                self.compiled = None;
                Err(e)
            }
        }
    }

    fn run_render(
        &self,
        lua: &mlua::Lua,
        ctx: &FrameContext,
        buffer: Rc<std::cell::RefCell<LayerBuffer>>,
    ) -> Result<Vec<ToolCommand>, ScriptError> {
        let ctx_table = build_ctx_table(lua, ctx, &self.params)?;
        let layer_ud = lua.create_userdata(LayerHandle(buffer))?;
        let render: mlua::Function = lua.globals().get("render")?;
        render.call::<()>((ctx_table.clone(), layer_ud))?;
        let out: mlua::Table = ctx_table.get("out")?;
        Ok(parse_out_table(&out))
    }
}

fn build_ctx_table(lua: &mlua::Lua, ctx: &FrameContext, params: &ParamStore) -> mlua::Result<mlua::Table> {
    let table = lua.create_table()?;
    table.set("cols", ctx.cols)?;
    table.set("rows", ctx.rows)?;
    table.set("frame", ctx.frame)?;
    table.set("time_ms", ctx.time_ms)?;

    let metrics = lua.create_table()?;
    metrics.set("aspect", ctx.aspect)?;
    table.set("metrics", metrics)?;

    let cursor = lua.create_table()?;
    cursor.set("x", ctx.cursor.x)?;
    cursor.set("y", ctx.cursor.y)?;
    cursor.set("half_y", ctx.cursor.half_y)?;
    cursor.set("px", ctx.cursor.px)?;
    cursor.set("py", ctx.cursor.py)?;
    cursor.set("phalf_y", ctx.cursor.phalf_y)?;
    cursor.set("left_down", ctx.cursor.left_down)?;
    cursor.set("right_down", ctx.cursor.right_down)?;
    cursor.set("prev_left_down", ctx.cursor.prev_left_down)?;
    cursor.set("prev_right_down", ctx.cursor.prev_right_down)?;
    table.set("cursor", cursor)?;

    table.set("fg", ctx.fg.map(|v| v as i64))?;
    table.set("bg", ctx.bg.map(|v| v as i64))?;
    table.set("phase", if ctx.phase == TickPhase::Keyboard { 0 } else { 1 })?;

    let params_table = lua.create_table()?;
    for spec in params.specs() {
        let value = params.get(&spec.key);
        let lua_value: mlua::Value = match value {
            Some(crate::params::ParamValue::Bool(b)) => mlua::Value::Boolean(*b),
            Some(crate::params::ParamValue::Int(i)) => mlua::Value::Integer(*i),
            Some(crate::params::ParamValue::Float(f)) => mlua::Value::Number(*f),
            Some(crate::params::ParamValue::Enum(s)) => mlua::Value::String(lua.create_string(s)?),
            Some(crate::params::ParamValue::Button(b)) => mlua::Value::Boolean(*b),
            None => mlua::Value::Nil,
        };
        params_table.set(spec.key.as_str(), lua_value)?;
    }
    table.set("params", params_table)?;

    let out = lua.create_table()?;
    table.set("out", out)?;

    Ok(table)
}
