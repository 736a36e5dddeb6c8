//! Environment-driven configuration

use std::path::PathBuf;

const DEFAULT_API_URL: &str = "http://localhost:3000/api";
const DEFAULT_DATA_DIR: &str = ".taskdeck";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the backend API
    pub api_url: String,
    /// Directory holding persisted credentials
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let api_url =
            std::env::var("TASKDECK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let data_dir = std::env::var("TASKDECK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));
        Self { api_url, data_dir }
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.data_dir.join("credentials.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_path_under_data_dir() {
        let config = Config {
            api_url: DEFAULT_API_URL.to_string(),
            data_dir: PathBuf::from("/tmp/td"),
        };
        assert_eq!(
            config.credentials_path(),
            PathBuf::from("/tmp/td/credentials.json")
        );
    }
}
