use crate::Float;
use crate::config::Params;

/// D2Q9 lattice model constants
pub struct D2Q9;

impl D2Q9 {
    /// Number of discrete velocities
    pub const Q: usize = 9;

    /// Discrete velocities: rest, then axis directions, then diagonals
    pub const VELOCITIES: [[i32; 2]; 9] = [
        [0, 0],
        [1, 0],
        [0, 1],
        [-1, 0],
        [0, -1],
        [1, 1],
        [-1, 1],
        [-1, -1],
        [1, -1],
    ];

    /// Weights for each direction
    pub const WEIGHTS: [Float; 9] = [
        4.0 / 9.0,
        1.0 / 9.0,
        1.0 / 9.0,
        1.0 / 9.0,
        1.0 / 9.0,
        1.0 / 36.0,
        1.0 / 36.0,
        1.0 / 36.0,
        1.0 / 36.0,
    ];

    /// Opposite directions for bounce-back boundary conditions
    pub const OPPOSITE: [usize; 9] = [0, 3, 4, 1, 2, 7, 8, 5, 6];

    /// Speed of sound squared
    pub const CS2: Float = 1.0 / 3.0;
}

/// Double-buffered distribution field in structure-of-arrays order:
/// nine speed planes, each row-major, linear index `k * cells + y * nx + x`.
///
/// `f` is the authoritative state at timestep boundaries; streaming writes
/// `f_new` from `f`, and the collision/bounce-back stage writes `f` back from
/// `f_new`.
pub struct Lattice {
    pub nx: usize,
    pub ny: usize,
    pub cells: usize,
    pub f: Vec<Float>,
    pub f_new: Vec<Float>,
}

impl Lattice {
    /// Allocate both buffers with every cell at rest: `4·density/9` on the
    /// rest speed, `density/9` on the axis speeds, `density/36` on the
    /// diagonals.
    pub fn new(params: &Params) -> Self {
        let cells = params.cells();
        let w0 = 4.0 * params.density / 9.0;
        let w_axis = params.density / 9.0;
        let w_diag = params.density / 36.0;

        let mut f = vec![0.0; D2Q9::Q * cells];
        for (k, plane) in f.chunks_exact_mut(cells).enumerate() {
            let value = match k {
                0 => w0,
                1..=4 => w_axis,
                _ => w_diag,
            };
            plane.fill(value);
        }
        let f_new = f.clone();

        Self {
            nx: params.nx,
            ny: params.ny,
            cells,
            f,
            f_new,
        }
    }

    /// Cell index within one speed plane.
    #[inline]
    pub fn cell_index(&self, y: usize, x: usize) -> usize {
        y * self.nx + x
    }

    /// Speed plane `k` of the authoritative buffer.
    pub fn plane(&self, k: usize) -> &[Float] {
        &self.f[k * self.cells..(k + 1) * self.cells]
    }

    /// Total density over all cells and speeds, accumulated in f64 so the
    /// probe itself does not drown the conservation signal in rounding.
    pub fn total_density(&self) -> f64 {
        self.f.iter().map(|&v| v as f64).sum()
    }
}
