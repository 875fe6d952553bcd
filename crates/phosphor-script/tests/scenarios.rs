use std::time::Duration;

use phosphor_canvas::Canvas;
use phosphor_palette::{PaletteId, PaletteRegistry};
use phosphor_script::{FrameContext, ScriptEngine};

fn engine() -> ScriptEngine {
    ScriptEngine::new(PaletteRegistry::new())
}

#[test]
fn script_writes_frame_counter_into_the_top_left_cell() {
    let mut canvas = Canvas::new(8);
    let mut eng = engine();
    let source = r#"
        settings = { fps = 30 }
        function render(ctx, layer)
            layer:set(0, 0, tostring(ctx.frame % 10))
        end
    "#;
    eng.compile(source, PaletteId::XTERM256).unwrap();

    let dt = Duration::from_secs_f64(1.0 / 60.0);
    let mut ticks = 0u32;
    for _ in 0..60 {
        if eng
            .tick(&mut canvas, 0, dt, FrameContext { cols: canvas.columns(), rows: canvas.rows(), ..Default::default() }, false)
            .unwrap()
            .is_some()
        {
            ticks += 1;
        }
    }
    assert!((29..=31).contains(&ticks), "ticks = {ticks}");
}

#[test]
fn once_mode_stops_playback_after_a_single_tick() {
    let mut canvas = Canvas::new(8);
    let mut eng = engine();
    let source = r#"
        settings = { once = true }
        function render(ctx, layer)
            layer:set(0, 0, "X")
        end
    "#;
    eng.compile(source, PaletteId::XTERM256).unwrap();
    assert!(eng.settings().once);

    let dt = Duration::from_millis(16);
    let mut ran = 0u32;
    for _ in 0..200 {
        if eng
            .tick(&mut canvas, 0, dt, FrameContext { cols: canvas.columns(), rows: canvas.rows(), ..Default::default() }, false)
            .unwrap()
            .is_some()
        {
            ran += 1;
        }
    }
    assert_eq!(ran, 1);
    assert_eq!(canvas.layer(0).unwrap().cells[0], 'X' as u32);
}

#[test]
fn a_failing_compile_leaves_no_runnable_script() {
    let mut eng = engine();
    assert!(eng.compile("this is not lua {{{", PaletteId::XTERM256).is_err());
    assert!(!eng.has_render_function());
}

#[test]
fn classic_main_shim_paints_every_cell() {
    let mut canvas = Canvas::new(3);
    canvas.ensure_rows(1);
    let mut eng = engine();
    let source = r#"
        function main(coord, context, cursor, buffer)
            return "#"
        end
    "#;
    eng.compile(source, PaletteId::XTERM256).unwrap();
    eng.tick(
        &mut canvas,
        0,
        Duration::from_secs(1),
        FrameContext { cols: canvas.columns(), rows: canvas.rows(), ..Default::default() },
        false,
    )
    .unwrap();
    for cp in &canvas.layer(0).unwrap().cells {
        assert_eq!(*cp, '#' as u32);
    }
}

#[test]
fn tool_command_bus_collects_palette_set_from_ctx_out() {
    let mut canvas = Canvas::new(4);
    let mut eng = engine();
    let source = r#"
        function render(ctx, layer)
            ctx.out[#ctx.out + 1] = { type = "palette.set", fg = 5 }
        end
    "#;
    eng.compile(source, PaletteId::XTERM256).unwrap();
    let commands = eng
        .tick(&mut canvas, 0, Duration::from_secs(1), FrameContext { cols: canvas.columns(), rows: canvas.rows(), ..Default::default() }, false)
        .unwrap()
        .unwrap();
    assert_eq!(commands.len(), 1);
    match &commands[0] {
        phosphor_script::ToolCommand::PaletteSet { fg, bg } => {
            assert_eq!(*fg, Some(5));
            assert_eq!(*bg, None);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn compile_cache_invalidates_on_source_or_palette_change() {
    let mut eng = engine();
    let source = "function render(ctx, layer) end";
    eng.compile(source, PaletteId::XTERM256).unwrap();

    assert!(!eng.needs_recompile(source, PaletteId::XTERM256));
    assert!(eng.needs_recompile("function render(ctx, layer) end -- changed", PaletteId::XTERM256));
    assert!(eng.needs_recompile(source, PaletteId::ANSI16));
}
