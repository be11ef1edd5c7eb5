use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use lexi_config::Config;

const DEFAULT_PROFILE: &str = "config.json";

/// Profile file named by `LEXI_CONFIG`, else `config.json` when it exists
fn profile_path() -> Option<PathBuf> {
    match std::env::var("LEXI_CONFIG") {
        Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
        _ => {
            let default = PathBuf::from(DEFAULT_PROFILE);
            default.exists().then_some(default)
        }
    }
}

/// Loads a JSON profile; fields it leaves out keep their defaults
pub fn load_profile(path: &Path) -> anyhow::Result<Config> {
    tracing::info!("Loading profile {}", path.display());
    let file = File::open(path)?;
    let config = serde_json::from_reader(BufReader::new(file))?;
    Ok(config)
}

/// Startup configuration: profile if any, then environment overrides
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = match profile_path() {
        Some(path) => load_profile(&path)?,
        None => {
            tracing::info!("No profile found, using defaults");
            Config::default()
        }
    };
    config.apply_env();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_profile_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(
            &path,
            r#"{"store":{"data_path":"/tmp/words.json"},"page":{"scan_on_load":false},"delta_time":250}"#,
        )
        .unwrap();

        let config = load_profile(&path).unwrap();

        assert_eq!(config.store.data_path, "/tmp/words.json");
        assert!(!config.page.scan_on_load);
        assert_eq!(config.delta_time, 250);
        assert_eq!(config.translator.default_model, "gpt-4o-mini");
    }

    #[test]
    fn test_load_profile_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(load_profile(&path).is_err());
        assert!(load_profile(&dir.path().join("missing.json")).is_err());
    }
}
