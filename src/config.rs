use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Deserialize, Serialize, PartialEq, Eq, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub username: String,
    pub version: String,
    pub batch: usize,
    pub token: Option<String>,
    pub endpoint: String,
    /// GraphQL document id. Changes whenever the web client is redeployed.
    pub doc_id: String,
    pub user_agent: String,
    pub timeout_secs: Option<u64>,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: "natgeo".to_string(),
            version: "01".to_string(),
            batch: 50,
            token: None,
            endpoint: "https://www.instagram.com/graphql/query/".to_string(),
            doc_id: "789826179xxxxxxxx".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            timeout_secs: None,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Reads `path`, falling back to the defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let config = toml::from_str::<Config>(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if config.batch == 0 {
            return Err(ConfigError::ZeroBatch);
        }
        Ok(config)
    }

    pub fn posts_file(&self) -> PathBuf {
        self.output_dir.join(format!(
            "instagram_posts_{}_{}.json",
            self.username, self.version
        ))
    }

    pub fn state_file(&self) -> PathBuf {
        self.output_dir.join(format!(
            "resume_state_{}_{}.json",
            self.username, self.version
        ))
    }
}

#[test]
fn partial_config_keeps_defaults() {
    let config = toml::from_str::<Config>(
        r#"
username = "nasa"
batch = 12
token = "abc"
"#,
    )
    .unwrap();
    assert_eq!(
        config,
        Config {
            username: "nasa".to_string(),
            batch: 12,
            token: Some("abc".to_string()),
            ..Config::default()
        }
    );
    assert_eq!(
        config.posts_file(),
        PathBuf::from("./instagram_posts_nasa_01.json")
    );
    assert_eq!(
        config.state_file(),
        PathBuf::from("./resume_state_nasa_01.json")
    );
}

#[test]
fn missing_config_file_is_default() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&dir.path().join("ig_posts.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn zero_batch_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ig_posts.toml");
    fs::write(&path, "batch = 0\n").unwrap();
    assert!(matches!(Config::load(&path), Err(ConfigError::ZeroBatch)));
}

#[test]
fn invalid_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ig_posts.toml");
    fs::write(&path, "batch = \"many\"\n").unwrap();
    assert!(matches!(
        Config::load(&path),
        Err(ConfigError::Parse { .. })
    ));
}
