//! `vec2`/`vec3` table and scalar `math` helpers exposed to scripts, ported
//! from the hg_sdf-style vector helpers scripts historically relied on.

pub fn install(lua: &mlua::Lua, module: &mlua::Table) -> mlua::Result<()> {
    let vec2 = lua.create_table()?;
    vec2.set(
        "new",
        lua.create_function(|_, (x, y): (f64, f64)| Ok((x, y)))?,
    )?;
    vec2.set(
        "add",
        lua.create_function(|_, (ax, ay, bx, by): (f64, f64, f64, f64)| Ok((ax + bx, ay + by)))?,
    )?;
    vec2.set(
        "sub",
        lua.create_function(|_, (ax, ay, bx, by): (f64, f64, f64, f64)| Ok((ax - bx, ay - by)))?,
    )?;
    vec2.set(
        "dot",
        lua.create_function(|_, (ax, ay, bx, by): (f64, f64, f64, f64)| Ok(ax * bx + ay * by))?,
    )?;
    vec2.set(
        "length",
        lua.create_function(|_, (x, y): (f64, f64)| Ok((x * x + y * y).sqrt()))?,
    )?;
    vec2.set(
        "normalize",
        lua.create_function(|_, (x, y): (f64, f64)| {
            let len = (x * x + y * y).sqrt();
            if len <= f64::EPSILON {
                Ok((0.0, 0.0))
            } else {
                Ok((x / len, y / len))
            }
        })?,
    )?;
    module.set("vec2", vec2)?;

    let vec3 = lua.create_table()?;
    vec3.set(
        "add",
        lua.create_function(|lua, (a, b): (mlua::Table, mlua::Table)| {
            let (x, y, z) = add_vec3(&a, &b)?;
            xyz_table(lua, x, y, z)
        })?,
    )?;
    vec3.set(
        "sub",
        lua.create_function(|lua, (a, b): (mlua::Table, mlua::Table)| {
            let (x, y, z) = sub_vec3(&a, &b)?;
            xyz_table(lua, x, y, z)
        })?,
    )?;
    vec3.set(
        "dot",
        lua.create_function(|_, (a, b): (mlua::Table, mlua::Table)| dot_vec3(&a, &b))?,
    )?;
    vec3.set(
        "length",
        lua.create_function(|_, a: mlua::Table| length_vec3(&a))?,
    )?;
    module.set("vec3", vec3)?;

    let math_table = lua.create_table()?;
    math_table.set(
        "clamp",
        lua.create_function(|_, (v, lo, hi): (f64, f64, f64)| Ok(v.clamp(lo, hi)))?,
    )?;
    math_table.set(
        "lerp",
        lua.create_function(|_, (a, b, t): (f64, f64, f64)| Ok(a + (b - a) * t))?,
    )?;
    math_table.set(
        "smoothstep",
        lua.create_function(|_, (edge0, edge1, x): (f64, f64, f64)| {
            let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
            Ok(t * t * (3.0 - 2.0 * t))
        })?,
    )?;
    module.set("math", math_table)?;

    Ok(())
}

fn xyz_table(lua: &mlua::Lua, x: f64, y: f64, z: f64) -> mlua::Result<mlua::Table> {
    let t = lua.create_table()?;
    t.set("x", x)?;
    t.set("y", y)?;
    t.set("z", z)?;
    Ok(t)
}

fn vec3_xyz(t: &mlua::Table) -> mlua::Result<(f64, f64, f64)> {
    Ok((t.get("x")?, t.get("y")?, t.get("z")?))
}

fn add_vec3(a: &mlua::Table, b: &mlua::Table) -> mlua::Result<(f64, f64, f64)> {
    let (ax, ay, az) = vec3_xyz(a)?;
    let (bx, by, bz) = vec3_xyz(b)?;
    Ok((ax + bx, ay + by, az + bz))
}

fn sub_vec3(a: &mlua::Table, b: &mlua::Table) -> mlua::Result<(f64, f64, f64)> {
    let (ax, ay, az) = vec3_xyz(a)?;
    let (bx, by, bz) = vec3_xyz(b)?;
    Ok((ax - bx, ay - by, az - bz))
}

fn dot_vec3(a: &mlua::Table, b: &mlua::Table) -> mlua::Result<f64> {
    let (ax, ay, az) = vec3_xyz(a)?;
    let (bx, by, bz) = vec3_xyz(b)?;
    Ok(ax * bx + ay * by + az * bz)
}

fn length_vec3(a: &mlua::Table) -> mlua::Result<f64> {
    let (x, y, z) = vec3_xyz(a)?;
    Ok((x * x + y * y + z * z).sqrt())
}
