use std::str::SplitWhitespace;

use anyhow::{Context, Result, bail};

use crate::Float;

/// Simulation parameters, immutable after load.
#[derive(Debug, Clone)]
pub struct Params {
    pub nx: usize,
    pub ny: usize,
    pub max_iters: usize,
    pub reynolds_dim: usize,
    pub density: Float,
    pub accel: Float,
    pub omega: Float,
}

impl Params {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read parameter file: {path}"))?;
        Self::parse(&content).with_context(|| format!("malformed parameter file: {path}"))
    }

    /// Parse the seven whitespace-separated parameter tokens:
    /// `nx ny max_iters reynolds_dim density accel omega`.
    pub fn parse(content: &str) -> Result<Self> {
        let mut tokens = content.split_whitespace();

        let nx = int_token(&mut tokens, "nx")?;
        let ny = int_token(&mut tokens, "ny")?;
        let max_iters = int_token(&mut tokens, "max_iters")?;
        let reynolds_dim = int_token(&mut tokens, "reynolds_dim")?;
        let density = float_token(&mut tokens, "density")?;
        let accel = float_token(&mut tokens, "accel")?;
        let omega = float_token(&mut tokens, "omega")?;

        if ny < 2 {
            bail!("ny must be at least 2, got {ny}");
        }
        if omega <= 0.0 || omega >= 2.0 {
            bail!("omega must lie strictly between 0 and 2, got {omega}");
        }

        Ok(Self {
            nx,
            ny,
            max_iters,
            reynolds_dim,
            density,
            accel,
            omega,
        })
    }

    /// Total cell count `nx * ny`.
    pub fn cells(&self) -> usize {
        self.nx * self.ny
    }

    /// Kinematic viscosity implied by the relaxation parameter.
    pub fn viscosity(&self) -> Float {
        1.0 / 6.0 * (2.0 / self.omega - 1.0)
    }
}

fn int_token(tokens: &mut SplitWhitespace<'_>, name: &str) -> Result<usize> {
    let token = tokens
        .next()
        .with_context(|| format!("missing parameter `{name}`"))?;
    let value: usize = token
        .parse()
        .with_context(|| format!("parameter `{name}` is not a valid integer: `{token}`"))?;
    if value == 0 {
        bail!("parameter `{name}` must be positive");
    }
    Ok(value)
}

fn float_token(tokens: &mut SplitWhitespace<'_>, name: &str) -> Result<Float> {
    let token = tokens
        .next()
        .with_context(|| format!("missing parameter `{name}`"))?;
    token
        .parse()
        .with_context(|| format!("parameter `{name}` is not a valid number: `{token}`"))
}
