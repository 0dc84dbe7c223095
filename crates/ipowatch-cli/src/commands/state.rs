use std::path::Path;

use ipowatch_core::{Config, IpoInfo, IpoStatus, PersistedState, StateStore, UtcDateTime};
use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;

#[derive(Debug, Serialize)]
struct StateView<'a> {
    path: &'a Path,
    exists: bool,
    status: IpoStatus,
    snapshot: Option<IpoInfo>,
    updated_at: Option<UtcDateTime>,
}

/// A corrupt file is an error here, unlike during `run`, where it silently
/// resets to the initial state.
pub fn run(config: &Config) -> Result<Value, CliError> {
    let store = StateStore::new(config.state_path.clone());
    let loaded = store.try_load()?;
    let exists = loaded.is_some();
    let state = loaded.unwrap_or_else(PersistedState::initial);

    Ok(serde_json::to_value(StateView {
        path: store.path(),
        exists,
        status: state.status,
        snapshot: state.snapshot,
        updated_at: state.updated_at,
    })?)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use ipowatch_core::{ProviderId, StateError, Symbol};

    use super::*;

    fn config_for(path: &Path) -> Config {
        Config::from_lookup(|_| None)
            .expect("defaults are valid")
            .with_state_path(path)
    }

    #[test]
    fn missing_state_prints_initial_status() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("ipo_state.json");

        let value = run(&config_for(&path)).expect("state command succeeds");

        assert_eq!(value["exists"], false);
        assert_eq!(value["status"], "not_found");
        assert_eq!(value["snapshot"], Value::Null);
    }

    #[test]
    fn saved_state_is_printed() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("ipo_state.json");
        let snapshot = IpoInfo::new(
            Symbol::parse("KLAR").expect("valid symbol"),
            IpoStatus::Listed,
            ProviderId::Yahoo,
        );
        StateStore::new(&path)
            .save(&PersistedState::from_snapshot(snapshot))
            .expect("save succeeds");

        let value = run(&config_for(&path)).expect("state command succeeds");

        assert_eq!(value["exists"], true);
        assert_eq!(value["status"], "listed");
        assert_eq!(value["snapshot"]["source"], "yahoo");
    }

    #[test]
    fn corrupt_state_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("ipo_state.json");
        fs::write(&path, "{\"status\": \"lis").expect("write fixture");

        let error = run(&config_for(&path)).expect_err("must fail");

        assert!(matches!(error, CliError::State(StateError::Corrupt { .. })));
        assert_eq!(error.exit_code(), 10);
    }
}
