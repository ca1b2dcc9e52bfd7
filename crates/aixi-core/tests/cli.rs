//! End-to-end tests of the command-line driver: argument handling, exit
//! codes, and the CSV log contract.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn aixi() -> Command {
    Command::cargo_bin("aixi-core").expect("aixi-core binary should exist")
}

/// Write a config file into `dir` and return its path as a String.
fn write_config(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path.display().to_string()
}

#[test]
fn missing_arguments_fail() {
    aixi().assert().failure();
    aixi().arg("only-one.conf").assert().failure();
}

#[test]
fn unreadable_config_fails() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("log.csv");
    aixi()
        .args(["/nonexistent/agent.conf", &log.display().to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ERROR"));
}

#[test]
fn unknown_environment_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "bad.conf", "environment=freeway\n");
    let log = dir.path().join("log.csv");
    aixi()
        .args([&config, &log.display().to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown environment"));
}

#[test]
fn missing_environment_key_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "empty.conf", "# no environment selected\n");
    let log = dir.path().join("log.csv");
    aixi()
        .args([&config, &log.display().to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("environment"));
}

#[test]
fn malformed_option_value_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        "bad-depth.conf",
        "environment=coin-flip\nct-depth=shallow\nterminate-age=5\n",
    );
    let log = dir.path().join("log.csv");
    aixi()
        .args([&config, &log.display().to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ct-depth"));
}

#[test]
fn coin_flip_run_writes_the_log() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        "coinflip.conf",
        "environment=coin-flip\n\
         coin-flip-p = 0.7   # biased coin\n\
         ct-depth=4\n\
         agent-horizon=2\n\
         mc-simulations=10\n\
         terminate-age=20\n\
         random-seed=1\n",
    );
    let log = dir.path().join("log.csv");

    aixi()
        .args([&config, &log.display().to_string()])
        .assert()
        .success();

    let contents = fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(
        lines[0],
        "cycle,observation,reward,action,explored,explore_rate,\
         total_reward,average_reward,cycle_time_seconds,model_size"
    );
    // terminate-age=20 allows 21 cycles before age exceeds the bound.
    assert_eq!(lines.len(), 1 + 21);

    // Cycle numbers count up from 1 and every field parses.
    for (index, line) in lines[1..].iter().enumerate() {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 10, "bad row: {line}");
        assert_eq!(fields[0].parse::<u64>().unwrap(), index as u64 + 1);
        assert!(fields[1].parse::<u64>().is_ok());
        assert!(fields[6].parse::<f64>().is_ok());
        assert!(fields[9].parse::<u64>().unwrap() >= 1);
    }
}

#[test]
fn exploration_shows_up_in_the_log() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        "explore.conf",
        "environment=coin-flip\n\
         ct-depth=4\n\
         agent-horizon=2\n\
         mc-simulations=5\n\
         terminate-age=30\n\
         exploration=1.0\n\
         explore-decay=1.0\n\
         random-seed=0\n",
    );
    let log = dir.path().join("log.csv");

    aixi()
        .args([&config, &log.display().to_string()])
        .assert()
        .success();

    let contents = fs::read_to_string(&log).unwrap();
    // With exploration pinned at 1.0 every action is explored.
    for line in contents.lines().skip(1) {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields[4], "1", "unexplored cycle in {line}");
        assert_eq!(fields[5], "1", "explore rate should stay 1 in {line}");
    }
}

#[test]
fn maze_run_with_layout_options() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        "maze.conf",
        "environment=maze\n\
         maze-num-rows=4\n\
         maze-num-cols=4\n\
         maze-layout1=@@@@\n\
         maze-layout2=@*!@\n\
         maze-layout3=@*@@\n\
         maze-layout4=@@@@\n\
         maze-rewards1=0,0,0,0\n\
         maze-rewards2=0,-1,10,0\n\
         maze-rewards3=0,-1,0,0\n\
         maze-rewards4=0,0,0,0\n\
         maze-observation-encoding=walls\n\
         ct-depth=8\n\
         agent-horizon=3\n\
         mc-simulations=10\n\
         terminate-age=15\n",
    );
    let log = dir.path().join("log.csv");

    aixi()
        .args([&config, &log.display().to_string()])
        .assert()
        .success();

    assert!(fs::read_to_string(&log).unwrap().lines().count() > 1);
}
