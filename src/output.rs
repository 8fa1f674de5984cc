use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};

use crate::Float;
use crate::config::Params;
use crate::lattice::{D2Q9, Lattice};
use crate::obstacles::ObstacleMap;

/// Text emitters for the final per-cell field and the average-velocity log.
pub struct StateWriter {
    params: Params,
}

impl StateWriter {
    pub fn new(params: &Params) -> Self {
        Self {
            params: params.clone(),
        }
    }

    /// One line per cell in row-major order:
    /// `x y u_x u_y |u| pressure obstacle_flag`. Solid cells report zero
    /// velocity and the reference pressure.
    pub fn write_final_state(
        &self,
        path: &str,
        lattice: &Lattice,
        obstacles: &ObstacleMap,
    ) -> Result<()> {
        let file = File::create(path).with_context(|| format!("failed to create {path}"))?;
        let mut out = BufWriter::new(file);

        let nx = self.params.nx;
        let cells = self.params.cells();
        let f = &lattice.f;

        for y in 0..self.params.ny {
            for x in 0..nx {
                let i = y * nx + x;
                let (u_x, u_y, speed, pressure) = if obstacles.is_solid(y, x) {
                    (0.0, 0.0, 0.0, self.params.density * D2Q9::CS2)
                } else {
                    let s = |k: usize| f[k * cells + i];
                    let local_density =
                        s(0) + s(1) + s(2) + s(3) + s(4) + s(5) + s(6) + s(7) + s(8);
                    let u_x = (s(1) + s(5) + s(8) - (s(3) + s(6) + s(7))) / local_density;
                    let u_y = (s(2) + s(5) + s(6) - (s(4) + s(7) + s(8))) / local_density;
                    let speed = (u_x * u_x + u_y * u_y).sqrt();
                    (u_x, u_y, speed, local_density * D2Q9::CS2)
                };

                writeln!(
                    out,
                    "{} {} {} {} {} {} {}",
                    x,
                    y,
                    format_e12(u_x),
                    format_e12(u_y),
                    format_e12(speed),
                    format_e12(pressure),
                    obstacles.is_solid(y, x) as u8
                )?;
            }
        }

        out.flush().with_context(|| format!("failed to write {path}"))
    }

    /// One `t:\t<avg>` line per timestep.
    pub fn write_av_vels(&self, path: &str, av_vels: &[Float]) -> Result<()> {
        let file = File::create(path).with_context(|| format!("failed to create {path}"))?;
        let mut out = BufWriter::new(file);

        for (t, &av) in av_vels.iter().enumerate() {
            writeln!(out, "{t}:\t{}", format_e12(av))?;
        }

        out.flush().with_context(|| format!("failed to write {path}"))
    }
}

/// Render a float the way C's `%.12E` does: twelve mantissa digits and a
/// signed, zero-padded two-digit exponent.
pub fn format_e12(value: Float) -> String {
    let formatted = format!("{value:.12E}");
    match formatted.split_once('E') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}E{sign}{digits:0>2}")
        }
        // non-finite values have no exponent to rewrite
        None => formatted,
    }
}
