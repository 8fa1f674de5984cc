use anyhow::{Context, Result, bail};

use crate::config::Params;

/// Solid-cell mask for the simulation domain, read-only after load.
#[derive(Debug, Clone)]
pub struct ObstacleMap {
    nx: usize,
    mask: Vec<bool>,
    fluid_count: usize,
}

impl ObstacleMap {
    pub fn from_file(path: &str, params: &Params) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read obstacle file: {path}"))?;
        Self::parse(&content, params).with_context(|| format!("malformed obstacle file: {path}"))
    }

    /// Parse `x y flag` lines. Coordinates must lie inside the domain and the
    /// flag must be 1; anything else is fatal. Blank lines are ignored.
    pub fn parse(content: &str, params: &Params) -> Result<Self> {
        let mut mask = vec![false; params.cells()];

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let lineno = index + 1;

            let mut fields = line.split_whitespace();
            let x = parse_field(fields.next(), lineno, "x")?;
            let y = parse_field(fields.next(), lineno, "y")?;
            let flag = parse_field(fields.next(), lineno, "flag")?;
            if fields.next().is_some() {
                bail!("line {lineno}: expected exactly three fields `x y flag`");
            }

            if x >= params.nx {
                bail!("line {lineno}: x = {x} outside domain [0, {})", params.nx);
            }
            if y >= params.ny {
                bail!("line {lineno}: y = {y} outside domain [0, {})", params.ny);
            }
            if flag != 1 {
                bail!("line {lineno}: obstacle flag must be 1, got {flag}");
            }

            mask[y * params.nx + x] = true;
        }

        let fluid_count = mask.iter().filter(|&&solid| !solid).count();
        Ok(Self {
            nx: params.nx,
            mask,
            fluid_count,
        })
    }

    /// Mask with no obstacles, used by tests.
    pub fn open(params: &Params) -> Self {
        Self {
            nx: params.nx,
            mask: vec![false; params.cells()],
            fluid_count: params.cells(),
        }
    }

    pub fn is_solid(&self, y: usize, x: usize) -> bool {
        self.mask[y * self.nx + x]
    }

    /// Row-major mask, indexed `y * nx + x`.
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    pub fn fluid_count(&self) -> usize {
        self.fluid_count
    }

    pub fn solid_count(&self) -> usize {
        self.mask.len() - self.fluid_count
    }
}

fn parse_field(field: Option<&str>, lineno: usize, name: &str) -> Result<usize> {
    let token = field.with_context(|| format!("line {lineno}: missing `{name}` field"))?;
    token.parse().with_context(|| {
        format!("line {lineno}: `{name}` is not a valid non-negative integer: `{token}`")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> Params {
        Params::parse("4 3 10 4 0.1 0.005 1.0").unwrap()
    }

    #[test]
    fn parses_obstacle_lines() {
        let map = ObstacleMap::parse("0 0 1\n3 2 1\n", &params()).unwrap();
        assert!(map.is_solid(0, 0));
        assert!(map.is_solid(2, 3));
        assert!(!map.is_solid(1, 1));
        assert_eq!(map.solid_count(), 2);
        assert_eq!(map.fluid_count(), 10);
    }

    #[test]
    fn empty_file_is_all_fluid() {
        let map = ObstacleMap::parse("", &params()).unwrap();
        assert_eq!(map.fluid_count(), 12);
        assert_eq!(map.solid_count(), 0);
    }

    #[test]
    fn skips_blank_lines() {
        let map = ObstacleMap::parse("\n1 1 1\n\n  \n2 1 1\n", &params()).unwrap();
        assert_eq!(map.solid_count(), 2);
    }

    #[test]
    fn duplicate_cells_count_once() {
        let map = ObstacleMap::parse("1 1 1\n1 1 1\n", &params()).unwrap();
        assert_eq!(map.solid_count(), 1);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(ObstacleMap::parse("4 0 1\n", &params()).is_err());
        assert!(ObstacleMap::parse("0 3 1\n", &params()).is_err());
        assert!(ObstacleMap::parse("-1 0 1\n", &params()).is_err());
    }

    #[test]
    fn rejects_bad_flag() {
        assert!(ObstacleMap::parse("0 0 0\n", &params()).is_err());
        assert!(ObstacleMap::parse("0 0 2\n", &params()).is_err());
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(ObstacleMap::parse("0 0\n", &params()).is_err());
        assert!(ObstacleMap::parse("0 0 1 1\n", &params()).is_err());
        assert!(ObstacleMap::parse("zero 0 1\n", &params()).is_err());
    }
}
