//! A small 2D signed-distance catalog and the hg_sdf combinators, ported
//! from the original runner's native math helpers into callable Lua
//! functions that take/return plain numbers (no userdata needed for a
//! single scalar distance).

pub fn install(lua: &mlua::Lua, module: &mlua::Table) -> mlua::Result<()> {
    let sdf = lua.create_table()?;

    sdf.set(
        "circle",
        lua.create_function(|_, (px, py, radius): (f64, f64, f64)| {
            Ok((px * px + py * py).sqrt() - radius)
        })?,
    )?;

    sdf.set(
        "box",
        lua.create_function(|_, (px, py, bx, by): (f64, f64, f64, f64)| {
            let dx = px.abs() - bx;
            let dy = py.abs() - by;
            let outside = (dx.max(0.0).powi(2) + dy.max(0.0).powi(2)).sqrt();
            let inside = dx.max(dy).min(0.0);
            Ok(outside + inside)
        })?,
    )?;

    sdf.set(
        "segment",
        lua.create_function(|_, (px, py, ax, ay, bx, by, thickness): (f64, f64, f64, f64, f64, f64, f64)| {
            let (pax, pay) = (px - ax, py - ay);
            let (bax, bay) = (bx - ax, by - ay);
            let denom = (bax * bax + bay * bay).max(f64::EPSILON);
            let h = ((pax * bax + pay * bay) / denom).clamp(0.0, 1.0);
            let dx = pax - bax * h;
            let dy = pay - bay * h;
            Ok((dx * dx + dy * dy).sqrt() - thickness)
        })?,
    )?;

    sdf.set(
        "union",
        lua.create_function(|_, (a, b): (f64, f64)| Ok(a.min(b)))?,
    )?;
    sdf.set(
        "intersection",
        lua.create_function(|_, (a, b): (f64, f64)| Ok(a.max(b)))?,
    )?;
    sdf.set(
        "subtraction",
        lua.create_function(|_, (a, b): (f64, f64)| Ok(a.max(-b)))?,
    )?;
    sdf.set(
        "smooth_union",
        lua.create_function(|_, (a, b, k): (f64, f64, f64)| Ok(smooth_union(a, b, k)))?,
    )?;

    module.set("sdf", sdf)?;
    Ok(())
}

fn smooth_union(a: f64, b: f64, k: f64) -> f64 {
    let k = k.max(f64::EPSILON);
    let h = (k - (a - b).abs()).max(0.0) / k;
    a.min(b) - h * h * k * 0.25
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smooth_union_never_exceeds_the_plain_union_at_k_zero() {
        assert_eq!(smooth_union(1.0, 2.0, 0.0), 1.0f64.min(2.0));
    }

    #[test]
    fn smooth_union_rounds_the_corner_between_close_surfaces() {
        let plain = 1.0f64.min(1.2);
        let smooth = smooth_union(1.0, 1.2, 0.5);
        assert!(smooth <= plain);
    }
}
