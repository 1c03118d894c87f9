//! Loading simulation settings from TOML files

use std::io::Write;

use coalition_core::{ConfigError, EngineError, Game, LimitAction, SimulationConfig, Stability};
use coalition_core::{PreferencePolicy, ReviewPolicy};
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
agents = 4
review_policy = "pessimist"
preference_policy = "maximum"
stability = "ics"
seed = 12
max_rounds = 3

[reputation]
damping = 0.15
tolerance = 1e-6
max_iterations = 500

[search]
partition_limit = 100
on_limit = "warn"
"#,
    );

    let config = SimulationConfig::load(file.path()).unwrap();
    assert_eq!(config.agents, 4);
    assert_eq!(config.review_policy, ReviewPolicy::Pessimist);
    assert_eq!(config.preference_policy, PreferencePolicy::Maximum);
    assert_eq!(config.stability, Stability::Ics);
    assert_eq!(config.seed, Some(12));
    assert_eq!(config.max_rounds, Some(3));
    assert_eq!(config.reputation.max_iterations, 500);
    assert_eq!(config.search.on_limit, LimitAction::Warn);

    let mut game = Game::new(&config).unwrap();
    let report = game.run().unwrap();
    assert!(report.rounds_played <= 3);
    assert_eq!(report.agent_ids, vec![0, 1, 2, 3]);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = SimulationConfig::load(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_bad_values_fail_before_setup() {
    let file = write_config("agents = 2\n");
    let config = SimulationConfig::load(file.path()).unwrap();
    match Game::new(&config) {
        Err(EngineError::Config(ConfigError::TooFewAgents(2))) => {}
        other => panic!("expected TooFewAgents, got {:?}", other.err()),
    }
}

#[test]
fn test_warn_lets_large_search_through() {
    let file = write_config(
        r#"
agents = 6
seed = 1
max_rounds = 1

[search]
partition_limit = 10
"#,
    );
    let mut config = SimulationConfig::load(file.path()).unwrap();
    assert!(matches!(Game::new(&config), Err(EngineError::EnumerationLimit { .. })));

    config.search.on_limit = LimitAction::Warn;
    assert!(Game::new(&config).is_ok());
}
