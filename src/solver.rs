use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rayon::prelude::*;

use crate::Float;
use crate::config::Params;
use crate::lattice::{D2Q9, Lattice};
use crate::obstacles::ObstacleMap;

/// Raw single-precision reciprocal square root estimate. No Newton
/// refinement; the average-velocity log is defined in terms of this exact
/// bit-level approximation.
#[inline]
fn rsqrt(x: Float) -> Float {
    Float::from_bits(0x5f37_59df - (x.to_bits() >> 1))
}

/// Channel-flow solver owning the lattice state and the per-timestep
/// average-velocity log.
pub struct Solver {
    params: Params,
    obstacles: ObstacleMap,
    lattice: Lattice,
    // per-timestep moment caches, valid for fluid cells between the
    // streaming and collision stages
    rho: Vec<Float>,
    ux: Vec<Float>,
    uy: Vec<Float>,
    av_vels: Vec<Float>,
}

impl Solver {
    pub fn new(params: Params, obstacles: ObstacleMap) -> Self {
        let lattice = Lattice::new(&params);
        let cells = params.cells();
        let av_vels = Vec::with_capacity(params.max_iters);

        Self {
            params,
            obstacles,
            lattice,
            rho: vec![0.0; cells],
            ux: vec![0.0; cells],
            uy: vec![0.0; cells],
            av_vels,
        }
    }

    /// Run the fixed-count driver loop.
    pub fn run(&mut self) {
        info!(
            "running {} timesteps on a {}x{} lattice ({} fluid cells)",
            self.params.max_iters,
            self.params.nx,
            self.params.ny,
            self.obstacles.fluid_count()
        );

        let pb = ProgressBar::new(self.params.max_iters as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:55.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap()
                .progress_chars("=> "),
        );

        for _ in 0..self.params.max_iters {
            self.step();
            pb.inc(1);
        }
        pb.finish_and_clear();

        info!("final average velocity: {:e}", self.av_vels.last().copied().unwrap_or(0.0));
    }

    /// One full timestep: accelerate, stream with moments, collide with
    /// bounce-back, then log the average velocity. After this returns the
    /// authoritative state lives in `lattice.f` again.
    pub fn step(&mut self) {
        self.accelerate();
        self.stream_and_moments();
        self.collide();
        let av = self.average_velocity();
        self.av_vels.push(av);
    }

    /// Inject momentum along the row just below the top wall, in place on
    /// `f`. Columns are skipped when blocked or when any decremented speed
    /// would not stay strictly positive.
    fn accelerate(&mut self) {
        let nx = self.params.nx;
        let cells = self.params.cells();
        let d1 = self.params.density * self.params.accel / 9.0;
        let d2 = self.params.density * self.params.accel / 36.0;

        let row = (self.params.ny - 2) * nx;
        let mask = self.obstacles.mask();
        let f = &mut self.lattice.f;

        for x in 0..nx {
            let i = row + x;
            if mask[i] {
                continue;
            }
            if f[3 * cells + i] - d1 > 0.0
                && f[6 * cells + i] - d2 > 0.0
                && f[7 * cells + i] - d2 > 0.0
            {
                f[cells + i] += d1;
                f[5 * cells + i] += d2;
                f[8 * cells + i] += d2;
                f[3 * cells + i] -= d1;
                f[6 * cells + i] -= d2;
                f[7 * cells + i] -= d2;
            }
        }
    }

    /// Pull-scheme propagation into `f_new` for every cell, one speed plane
    /// at a time, then the macroscopic moments for fluid cells.
    fn stream_and_moments(&mut self) {
        let nx = self.params.nx;
        let ny = self.params.ny;
        let cells = self.params.cells();

        let f = &self.lattice.f;
        let f_new = &mut self.lattice.f_new;

        for k in 0..D2Q9::Q {
            let [ex, ey] = D2Q9::VELOCITIES[k];
            // pulling from the cell the velocity points away from
            let x_off = (nx as i32 - ex) as usize;
            let y_off = (ny as i32 - ey) as usize;

            let src = &f[k * cells..(k + 1) * cells];
            let dst = &mut f_new[k * cells..(k + 1) * cells];

            dst.par_chunks_mut(nx).enumerate().for_each(|(y, row)| {
                let src_row = ((y + y_off) % ny) * nx;
                for (x, out) in row.iter_mut().enumerate() {
                    *out = src[src_row + (x + x_off) % nx];
                }
            });
        }

        let f_new = &self.lattice.f_new;
        let mask = self.obstacles.mask();

        self.rho
            .par_chunks_mut(nx)
            .zip(self.ux.par_chunks_mut(nx))
            .zip(self.uy.par_chunks_mut(nx))
            .enumerate()
            .for_each(|(y, ((rho_row, ux_row), uy_row))| {
                let base = y * nx;
                for x in 0..nx {
                    let i = base + x;
                    if mask[i] {
                        continue;
                    }
                    let s = |k: usize| f_new[k * cells + i];
                    let local_density =
                        s(0) + s(1) + s(2) + s(3) + s(4) + s(5) + s(6) + s(7) + s(8);
                    rho_row[x] = local_density;
                    ux_row[x] = (s(1) + s(5) + s(8) - (s(3) + s(6) + s(7))) / local_density;
                    uy_row[x] = (s(2) + s(5) + s(6) - (s(4) + s(7) + s(8))) / local_density;
                }
            });
    }

    /// Write `f` back from `f_new`: solids take the bounce-back swapped
    /// values (the rest speed is left alone), fluids relax toward the D2Q9
    /// equilibrium computed from the cached moments.
    fn collide(&mut self) {
        let nx = self.params.nx;
        let cells = self.params.cells();
        let omega = self.params.omega;

        let cs2x2 = 2.0 * D2Q9::CS2;
        let cs4x2 = 2.0 * D2Q9::CS2 * D2Q9::CS2;

        let f = &mut self.lattice.f;
        let f_new = &self.lattice.f_new;
        let mask = self.obstacles.mask();
        let rho = self.rho.as_slice();
        let ux = self.ux.as_slice();
        let uy = self.uy.as_slice();

        for k in 0..D2Q9::Q {
            let [ex, ey] = D2Q9::VELOCITIES[k];
            let (exf, eyf) = (ex as Float, ey as Float);
            let w = D2Q9::WEIGHTS[k];

            let cur = &f_new[k * cells..(k + 1) * cells];
            let opp = &f_new[D2Q9::OPPOSITE[k] * cells..(D2Q9::OPPOSITE[k] + 1) * cells];
            let dst = &mut f[k * cells..(k + 1) * cells];

            dst.par_chunks_mut(nx).enumerate().for_each(|(y, row)| {
                let base = y * nx;
                for (x, out) in row.iter_mut().enumerate() {
                    let i = base + x;
                    if mask[i] {
                        // rest speed at solids is never read again
                        if k != 0 {
                            *out = opp[i];
                        }
                    } else {
                        let u_k = exf * ux[i] + eyf * uy[i];
                        let u_sq = ux[i] * ux[i] + uy[i] * uy[i];
                        let f_eq = w
                            * rho[i]
                            * (1.0 + u_k / D2Q9::CS2 + (u_k * u_k) / cs4x2 - u_sq / cs2x2);
                        *out = cur[i] + omega * (f_eq - cur[i]);
                    }
                }
            });
        }
    }

    /// Mean |u| over fluid cells, recomputed from the fresh `f`. Row partial
    /// sums run in parallel but are folded in row order, so the reduction is
    /// deterministic under any thread scheduling.
    pub fn average_velocity(&self) -> Float {
        let nx = self.params.nx;
        let cells = self.params.cells();
        let f = &self.lattice.f;
        let mask = self.obstacles.mask();

        let partials: Vec<Float> = (0..self.params.ny)
            .into_par_iter()
            .map(|y| {
                let base = y * nx;
                let mut tot = 0.0;
                for x in 0..nx {
                    let i = base + x;
                    if mask[i] {
                        continue;
                    }
                    let s = |k: usize| f[k * cells + i];
                    let local_density =
                        s(0) + s(1) + s(2) + s(3) + s(4) + s(5) + s(6) + s(7) + s(8);
                    let u_x = (s(1) + s(5) + s(8) - (s(3) + s(6) + s(7))) / local_density;
                    let u_y = (s(2) + s(5) + s(6) - (s(4) + s(7) + s(8))) / local_density;
                    let u_sq = u_x * u_x + u_y * u_y;
                    tot += u_sq * rsqrt(u_sq);
                }
                tot
            })
            .collect();

        partials.iter().sum::<Float>() / self.obstacles.fluid_count() as Float
    }

    /// Reynolds number of the post-run state.
    pub fn reynolds(&self) -> Float {
        self.average_velocity() * self.params.reynolds_dim as Float / self.params.viscosity()
    }

    pub fn total_density(&self) -> f64 {
        self.lattice.total_density()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn obstacles(&self) -> &ObstacleMap {
        &self.obstacles
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn av_vels(&self) -> &[Float] {
        &self.av_vels
    }
}
