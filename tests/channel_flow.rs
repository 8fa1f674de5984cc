use std::fs;

use channel_lbm::{Float, ObstacleMap, Params, Solver, StateWriter};

fn write_fixtures(dir: &std::path::Path, params: &str, obstacles: &str) -> (String, String) {
    let param_path = dir.join("input.params");
    let obstacle_path = dir.join("obstacles.dat");
    fs::write(&param_path, params).unwrap();
    fs::write(&obstacle_path, obstacles).unwrap();
    (
        param_path.to_str().unwrap().to_string(),
        obstacle_path.to_str().unwrap().to_string(),
    )
}

fn run_to_files(dir: &std::path::Path, params_text: &str, obstacles_text: &str) -> (String, String) {
    let (param_path, obstacle_path) = write_fixtures(dir, params_text, obstacles_text);

    let params = Params::from_file(&param_path).unwrap();
    let obstacles = ObstacleMap::from_file(&obstacle_path, &params).unwrap();
    let mut solver = Solver::new(params.clone(), obstacles);
    solver.run();

    let final_state = dir.join("final_state.dat");
    let av_vels = dir.join("av_vels.dat");
    let writer = StateWriter::new(&params);
    writer
        .write_final_state(final_state.to_str().unwrap(), solver.lattice(), solver.obstacles())
        .unwrap();
    writer
        .write_av_vels(av_vels.to_str().unwrap(), solver.av_vels())
        .unwrap();

    (
        fs::read_to_string(final_state).unwrap(),
        fs::read_to_string(av_vels).unwrap(),
    )
}

const PARAMS_16: &str = "16\n16\n50\n16\n0.1\n0.005\n1.0\n";
const OBSTACLES_16: &str = "5 5 1\n6 5 1\n7 5 1\n5 6 1\n6 6 1\n7 6 1\n";

#[test]
fn end_to_end_produces_both_output_files() {
    let dir = tempfile::tempdir().unwrap();
    let (final_state, av_vels) = run_to_files(dir.path(), PARAMS_16, OBSTACLES_16);

    let state_lines: Vec<&str> = final_state.lines().collect();
    assert_eq!(state_lines.len(), 16 * 16);
    for line in &state_lines {
        let fields: Vec<&str> = line.split(' ').collect();
        assert_eq!(fields.len(), 7);
        for value in &fields[2..6] {
            assert!(value.parse::<Float>().unwrap().is_finite(), "bad field in {line}");
        }
        assert!(matches!(fields[6], "0" | "1"));
    }
    let solid_lines = state_lines.iter().filter(|l| l.ends_with(" 1")).count();
    assert_eq!(solid_lines, 6);

    let vel_lines: Vec<&str> = av_vels.lines().collect();
    assert_eq!(vel_lines.len(), 50);
    let last: Float = vel_lines
        .last()
        .unwrap()
        .split_once(":\t")
        .unwrap()
        .1
        .parse()
        .unwrap();
    // momentum has been injected for 50 steps, the channel must be moving
    assert!(last > 0.0);
}

#[test]
fn identical_inputs_give_byte_identical_outputs() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    let a = run_to_files(dir_a.path(), PARAMS_16, OBSTACLES_16);
    let b = run_to_files(dir_b.path(), PARAMS_16, OBSTACLES_16);
    assert_eq!(a.0, b.0);
    assert_eq!(a.1, b.1);
}

#[test]
fn missing_parameter_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("does_not_exist.params");
    let err = Params::from_file(bogus.to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("does_not_exist.params"));
}

#[test]
fn obstacle_file_errors_carry_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let (param_path, obstacle_path) = write_fixtures(dir.path(), PARAMS_16, "99 0 1\n");
    let params = Params::from_file(&param_path).unwrap();
    let err = ObstacleMap::from_file(&obstacle_path, &params).unwrap_err();
    assert!(err.to_string().contains("obstacles.dat"));
}
