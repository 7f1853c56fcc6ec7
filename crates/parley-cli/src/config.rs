//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides the config file location
pub const CONFIG_PATH_ENV: &str = "PARLEY_CONFIG_PATH";

/// Configuration for parley. Every field is optional; command-line flags win.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model wire id, e.g. "llama-3.1-8b-instant"
    pub model: Option<String>,
    /// Persona name
    pub persona: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Full-screen UI unless false
    pub tui: Option<bool>,
    /// "dark" or "light"
    pub theme: Option<String>,
    /// OpenAI-compatible API root, defaults to Groq
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_keys: ApiKeys,
}

/// Keys used when the environment has none
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    pub groq: Option<String>,
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("parley")
    }

    /// `$PARLEY_CONFIG_PATH`, else `<config dir>/parley/config.toml`
    pub fn config_path() -> PathBuf {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => Self::config_dir().join("config.toml"),
        }
    }

    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load from `path`. A missing or broken file yields the defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read config file");
                eprintln!("Warning: Failed to read config file: {}", e);
                return Self::default();
            }
        };

        match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to parse config file");
                eprintln!("Warning: Failed to parse config file: {}", e);
                Self::default()
            }
        }
    }

    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        Self::init_at(&path)?;
        Ok(path)
    }

    /// Write the example config unless a file already exists
    pub fn init_at(path: &Path) -> std::io::Result<()> {
        if path.exists() {
            return Ok(());
        }
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, example_config())
    }

    /// Groq key from the file, if set and not blank
    pub fn groq_api_key(&self) -> Option<String> {
        self.api_keys
            .groq
            .clone()
            .filter(|k| !k.trim().is_empty())
    }
}

/// Example config content
pub fn example_config() -> &'static str {
    r#"# parley configuration file
# Place at ~/.config/parley/config.toml (Linux), ~/Library/Application Support/parley/config.toml (macOS)
# or %APPDATA%\parley\config.toml (Windows). PARLEY_CONFIG_PATH overrides the location.

# Model: gemma2-9b-it, llama-3.1-8b-instant or qwen-2.5-32b
model = "gemma2-9b-it"

# Persona: Default, Professional, Creative or Concise
persona = "Default"

# Sampling temperature, 0.0 to 1.0
temperature = 0.7

# Maximum answer length in tokens, 50 to 1000
max_tokens = 250

# Full-screen UI (set to false for plain stdin/stdout)
tui = true

# Color theme: dark or light
theme = "dark"

# API root (any OpenAI-compatible server)
# base_url = "https://api.groq.com/openai/v1"

# API keys (optional). GROQ_API_KEY in the environment takes precedence.
[api_keys]
# groq = "gsk_..."
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.model.as_deref(), Some("gemma2-9b-it"));
        assert_eq!(config.persona.as_deref(), Some("Default"));
        assert_eq!(config.temperature, Some(0.7));
        assert_eq!(config.max_tokens, Some(250));
        assert_eq!(config.tui, Some(true));
        assert_eq!(config.base_url, None);
        assert_eq!(config.groq_api_key(), None);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "persona = \"Concise\"\nbase_url = \"http://localhost:8080/v1\"\n\n[api_keys]\ngroq = \"gsk_file\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.persona.as_deref(), Some("Concise"));
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080/v1"));
        assert_eq!(config.model, None);
        assert_eq!(config.groq_api_key().as_deref(), Some("gsk_file"));
    }

    #[test]
    fn test_broken_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "model = [unterminated").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_blank_file_key_ignored() {
        let config = Config {
            api_keys: ApiKeys {
                groq: Some("  ".into()),
            },
            ..Config::default()
        };
        assert_eq!(config.groq_api_key(), None);
    }

    #[test]
    fn test_init_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        Config::init_at(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), example_config());

        fs::write(&path, "tui = false\n").unwrap();
        Config::init_at(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "tui = false\n");
    }
}
