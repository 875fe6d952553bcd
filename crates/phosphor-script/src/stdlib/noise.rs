//! Coherent noise: Perlin plus the Billow/Ridged fractal variants built on
//! top of it, and a cell-based Voronoi field. Option validation follows the
//! source's constructor clamps rather than trusting caller input, since a
//! bad `persistence`/`lacunarity` can blow up a libnoise-style recursive
//! fractal sum.

#[derive(Debug, Clone, Copy)]
pub struct NoiseOptions {
    pub seed: u32,
    pub frequency: f64,
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
}

impl NoiseOptions {
    pub fn validated(seed: i64, frequency: f64, octaves: i64, persistence: f64, lacunarity: f64) -> Self {
        Self {
            seed: seed as u32,
            frequency: if frequency > 0.0 { frequency } else { 1.0 },
            octaves: (octaves.clamp(1, 16)) as u32,
            persistence: persistence.clamp(0.0001, 1.0),
            lacunarity: if lacunarity > 1.0 { lacunarity } else { 2.0 },
        }
    }
}

fn hash2(seed: u32, ix: i64, iy: i64) -> u32 {
    let mut h = seed
        .wrapping_mul(374_761_393)
        .wrapping_add((ix as i32 as u32).wrapping_mul(668_265_263))
        .wrapping_add((iy as i32 as u32).wrapping_mul(2_147_483_647));
    h ^= h >> 13;
    h = h.wrapping_mul(1_274_126_177);
    h ^ (h >> 16)
}

fn grad(seed: u32, ix: i64, iy: i64, x: f64, y: f64) -> f64 {
    let h = hash2(seed, ix, iy);
    let angle = (h as f64 / u32::MAX as f64) * std::f64::consts::TAU;
    angle.cos() * x + angle.sin() * y
}

fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Single-octave Perlin noise in `-1.0..=1.0`.
pub fn perlin2(seed: u32, x: f64, y: f64) -> f64 {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let (x1, y1) = (x0 + 1, y0 + 1);
    let (fx, fy) = (x - x0 as f64, y - y0 as f64);

    let n00 = grad(seed, x0, y0, fx, fy);
    let n10 = grad(seed, x1, y0, fx - 1.0, fy);
    let n01 = grad(seed, x0, y1, fx, fy - 1.0);
    let n11 = grad(seed, x1, y1, fx - 1.0, fy - 1.0);

    let u = fade(fx);
    let v = fade(fy);
    let nx0 = n00 + u * (n10 - n00);
    let nx1 = n01 + u * (n11 - n01);
    (nx0 + v * (nx1 - nx0)).clamp(-1.0, 1.0)
}

fn fractal(opt: &NoiseOptions, x: f64, y: f64, shape: fn(f64) -> f64) -> f64 {
    let mut sum = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = opt.frequency;
    let mut max_amplitude = 0.0;
    for octave in 0..opt.octaves {
        let sample = perlin2(opt.seed.wrapping_add(octave), x * frequency, y * frequency);
        sum += shape(sample) * amplitude;
        max_amplitude += amplitude;
        amplitude *= opt.persistence;
        frequency *= opt.lacunarity;
    }
    if max_amplitude > 0.0 {
        sum / max_amplitude
    } else {
        0.0
    }
}

pub fn billow(opt: &NoiseOptions, x: f64, y: f64) -> f64 {
    fractal(opt, x, y, |n| 2.0 * n.abs() - 1.0)
}

pub fn ridged(opt: &NoiseOptions, x: f64, y: f64) -> f64 {
    fractal(opt, x, y, |n| 1.0 - n.abs())
}

/// Cell-based Voronoi: returns the distance to the nearest feature point's
/// jittered cell center, in roughly `0.0..=1.0` for adjacent-cell jitter.
pub fn voronoi(seed: u32, x: f64, y: f64) -> f64 {
    let ix = x.floor() as i64;
    let iy = y.floor() as i64;
    let mut best = f64::MAX;
    for oy in -1..=1 {
        for ox in -1..=1 {
            let cx = ix + ox;
            let cy = iy + oy;
            let h = hash2(seed, cx, cy);
            let jx = (h & 0xFFFF) as f64 / 65535.0;
            let jy = ((h >> 16) & 0xFFFF) as f64 / 65535.0;
            let px = cx as f64 + jx;
            let py = cy as f64 + jy;
            let d = ((x - px).powi(2) + (y - py).powi(2)).sqrt();
            best = best.min(d);
        }
    }
    best
}

pub fn install(lua: &mlua::Lua, module: &mlua::Table) -> mlua::Result<()> {
    let noise = lua.create_table()?;

    noise.set(
        "perlin",
        lua.create_function(
            |_, (x, y, seed, frequency, octaves, persistence, lacunarity): (f64, f64, i64, f64, i64, f64, f64)| {
                let opt = NoiseOptions::validated(seed, frequency, octaves, persistence, lacunarity);
                Ok(fractal(&opt, x, y, |n| n))
            },
        )?,
    )?;

    noise.set(
        "billow",
        lua.create_function(
            |_, (x, y, seed, frequency, octaves, persistence, lacunarity): (f64, f64, i64, f64, i64, f64, f64)| {
                let opt = NoiseOptions::validated(seed, frequency, octaves, persistence, lacunarity);
                Ok(billow(&opt, x, y))
            },
        )?,
    )?;

    noise.set(
        "ridged",
        lua.create_function(
            |_, (x, y, seed, frequency, octaves, persistence, lacunarity): (f64, f64, i64, f64, i64, f64, f64)| {
                let opt = NoiseOptions::validated(seed, frequency, octaves, persistence, lacunarity);
                Ok(ridged(&opt, x, y))
            },
        )?,
    )?;

    noise.set(
        "voronoi",
        lua.create_function(|_, (x, y, seed): (f64, f64, i64)| Ok(voronoi(seed as u32, x, y)))?,
    )?;

    module.set("noise", noise)?;
    Ok(())
}
