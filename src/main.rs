use std::env;
use std::time::Instant;

use anyhow::Result;
use log::info;

use channel_lbm::output::format_e12;
use channel_lbm::{ObstacleMap, Params, Solver, StateWriter, timing};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <paramfile> <obstaclefile>", args[0]);
        eprintln!("  paramfile    - text file with nx ny max_iters reynolds_dim density accel omega");
        eprintln!("  obstaclefile - text file with one `x y 1` line per blocked cell");
        std::process::exit(1);
    }

    let param_path = &args[1];
    let obstacle_path = &args[2];

    info!("loading parameters from: {param_path}");
    let params = Params::from_file(param_path)?;
    info!("  domain: {}x{}", params.nx, params.ny);
    info!("  timesteps: {}", params.max_iters);
    info!(
        "  density: {}, acceleration: {}, omega: {}",
        params.density, params.accel, params.omega
    );

    let obstacles = ObstacleMap::from_file(obstacle_path, &params)?;
    info!(
        "  obstacle cells: {}, fluid cells: {}",
        obstacles.solid_count(),
        obstacles.fluid_count()
    );

    let mut solver = Solver::new(params.clone(), obstacles);

    let wall = Instant::now();
    solver.run();
    let elapsed = wall.elapsed().as_secs_f64();
    let cpu = timing::process_cpu_times();

    let writer = StateWriter::new(&params);
    writer.write_final_state("final_state.dat", solver.lattice(), solver.obstacles())?;
    writer.write_av_vels("av_vels.dat", solver.av_vels())?;

    println!("==done==");
    println!("Reynolds number:\t\t{}", format_e12(solver.reynolds()));
    println!("Elapsed time:\t\t\t{elapsed:.6} (s)");
    println!("Elapsed user CPU time:\t\t{:.6} (s)", cpu.user);
    println!("Elapsed system CPU time:\t{:.6} (s)", cpu.system);

    Ok(())
}
