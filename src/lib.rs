pub mod config;
pub mod lattice;
pub mod obstacles;
pub mod output;
pub mod solver;
pub mod timing;

pub use config::Params;
pub use lattice::{D2Q9, Lattice};
pub use obstacles::ObstacleMap;
pub use output::StateWriter;
pub use solver::Solver;

pub type Float = f32;
