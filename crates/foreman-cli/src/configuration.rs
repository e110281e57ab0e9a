use crate::error::{to_env_var, ConfigError, ENV_PREFIX};
use config::{Config, Environment, File};
use foreman::mcp::McpServerConfig;
use foreman::providers::configs::{
    OpenAiProviderConfig, DEFAULT_TIMEOUT_SECS, OPENAI_BASE_URL, OPENAI_MODEL,
};
use foreman::react::DEFAULT_MAX_TURNS;
use foreman::{LoopOptions, UnknownToolPolicy};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "foreman.toml";

/// Fields that have no default and must be supplied
const REQUIRED_FIELDS: &[&str] = &["provider.api_key"];

#[derive(Debug, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<i32>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderSettings {
    pub fn into_config(self) -> OpenAiProviderConfig {
        OpenAiProviderConfig {
            base_url: self.base_url,
            api_key: self.api_key,
            model: self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout_secs: self.timeout_secs,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AgentSettings {
    /// 0 lifts the limit
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
    #[serde(default)]
    pub unknown_tool: UnknownToolPolicy,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            unknown_tool: UnknownToolPolicy::default(),
        }
    }
}

impl AgentSettings {
    pub fn loop_options(&self) -> LoopOptions {
        let max_turns = (self.max_turns > 0).then_some(self.max_turns);
        LoopOptions::default()
            .with_max_turns(max_turns)
            .with_unknown_tool(self.unknown_tool)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SupervisorSettings {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// A worker agent whose tools come from remote providers
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSettings {
    pub name: String,
    pub prompt: String,
    /// Keys into the `mcp` table
    #[serde(default)]
    pub mcp_servers: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub provider: ProviderSettings,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub supervisor: SupervisorSettings,
    #[serde(default)]
    pub workers: Vec<WorkerSettings>,
    #[serde(default)]
    pub mcp: BTreeMap<String, McpServerConfig>,
}

impl Settings {
    /// Load `path` (or `foreman.toml` if present) under `FOREMAN_*` variables
    pub fn new(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_and_validate(path)
    }

    fn load_and_validate(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config = Config::builder()
            .set_default("provider.base_url", default_base_url())?
            .set_default("provider.model", default_model())?
            .set_default("provider.timeout_secs", default_timeout_secs())?
            .set_default("agent.max_turns", default_max_turns() as u64)?
            .add_source(file)
            // Environment variables win over the file
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        for field in REQUIRED_FIELDS {
            if let Err(config::ConfigError::NotFound(_)) = config.get_string(field) {
                return Err(ConfigError::MissingEnvVar {
                    env_var: to_env_var(field),
                });
            }
        }

        let result: Result<Self, config::ConfigError> = config.try_deserialize();
        match result {
            Ok(settings) => Ok(settings.normalize_provider_names()),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                if let config::ConfigError::NotFound(field) = &err {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }

    /// Table keys come back lowercased from the config crate while list
    /// values keep their case, so provider names are compared lowercased.
    fn normalize_provider_names(mut self) -> Self {
        self.mcp = std::mem::take(&mut self.mcp)
            .into_iter()
            .map(|(name, config)| (name.to_lowercase(), config))
            .collect();
        for worker in &mut self.workers {
            for name in &mut worker.mcp_servers {
                *name = name.to_lowercase();
            }
        }
        self
    }
}

fn default_base_url() -> String {
    OPENAI_BASE_URL.to_string()
}

fn default_model() -> String {
    OPENAI_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_turns() -> usize {
    DEFAULT_MAX_TURNS
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::fs;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("FOREMAN_") {
                env::remove_var(&key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();
        env::set_var("FOREMAN_PROVIDER__API_KEY", "test-key");

        let settings = Settings::new(None).unwrap();
        assert_eq!(settings.provider.base_url, "https://api.openai.com/v1");
        assert_eq!(settings.provider.api_key, "test-key");
        assert_eq!(settings.provider.model, "gpt-4o");
        assert_eq!(settings.provider.temperature, None);
        assert_eq!(settings.provider.timeout_secs, 600);
        assert_eq!(settings.agent.max_turns, 25);
        assert_eq!(settings.agent.unknown_tool, UnknownToolPolicy::Skip);
        assert!(settings.supervisor.prompt.is_none());
        assert!(settings.workers.is_empty());
        assert!(settings.mcp.is_empty());

        env::remove_var("FOREMAN_PROVIDER__API_KEY");
    }

    #[test]
    #[serial]
    fn test_missing_api_key() {
        clean_env();

        match Settings::new(None) {
            Err(ConfigError::MissingEnvVar { env_var }) => {
                assert_eq!(env_var, "FOREMAN_PROVIDER__API_KEY");
            }
            other => panic!("Expected missing env var, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        env::set_var("FOREMAN_PROVIDER__API_KEY", "test-key");
        env::set_var("FOREMAN_PROVIDER__BASE_URL", "http://localhost:8000/v1");
        env::set_var("FOREMAN_PROVIDER__MODEL", "qwen-max");
        env::set_var("FOREMAN_PROVIDER__TEMPERATURE", "0.5");
        env::set_var("FOREMAN_AGENT__MAX_TURNS", "0");
        env::set_var("FOREMAN_AGENT__UNKNOWN_TOOL", "report");

        let settings = Settings::new(None).unwrap();
        assert_eq!(settings.provider.base_url, "http://localhost:8000/v1");
        assert_eq!(settings.provider.model, "qwen-max");
        assert_eq!(settings.provider.temperature, Some(0.5));

        let options = settings.agent.loop_options();
        assert_eq!(options.max_turns, None);
        assert_eq!(options.unknown_tool, UnknownToolPolicy::Report);

        clean_env();
    }

    #[test]
    #[serial]
    fn test_config_file() {
        clean_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foreman.toml");
        fs::write(
            &path,
            r#"
[provider]
api_key = "file-key"
model = "gpt-4o-mini"

[supervisor]
prompt = "Route map questions to map_assistant."

[[workers]]
name = "map_assistant"
prompt = "You look up places and plan routes."
mcp_servers = ["map_search"]

[mcp.map_search]
url = "https://mcp.example.com/sse"
timeout_secs = 30

[mcp.map_search.headers]
authorization = "Bearer secret"
"#,
        )
        .unwrap();
        env::set_var("FOREMAN_PROVIDER__MODEL", "gpt-4.1");

        let settings = Settings::new(Some(&path)).unwrap();
        assert_eq!(settings.provider.api_key, "file-key");
        assert_eq!(settings.provider.model, "gpt-4.1");
        assert_eq!(
            settings.supervisor.prompt.as_deref(),
            Some("Route map questions to map_assistant.")
        );
        assert_eq!(settings.workers.len(), 1);
        assert_eq!(settings.workers[0].mcp_servers, vec!["map_search"]);

        let server = &settings.mcp["map_search"];
        assert_eq!(server.url, "https://mcp.example.com/sse");
        assert_eq!(server.timeout_secs, Some(30));
        assert_eq!(
            server.headers.get("authorization").map(String::as_str),
            Some("Bearer secret")
        );

        clean_env();
    }

    #[test]
    #[serial]
    fn test_provider_names_ignore_case() {
        clean_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foreman.toml");
        fs::write(
            &path,
            r#"
[provider]
api_key = "file-key"

[[workers]]
name = "map_assistant"
prompt = "You look up places."
mcp_servers = ["MapSearch"]

[mcp.MapSearch]
url = "https://mcp.example.com/sse"
"#,
        )
        .unwrap();

        let settings = Settings::new(Some(&path)).unwrap();
        assert_eq!(settings.workers[0].mcp_servers, vec!["mapsearch"]);
        assert!(settings.mcp.contains_key(&settings.workers[0].mcp_servers[0]));

        clean_env();
    }

    #[test]
    #[serial]
    fn test_explicit_file_must_exist() {
        clean_env();
        env::set_var("FOREMAN_PROVIDER__API_KEY", "test-key");

        let result = Settings::new(Some(Path::new("/nonexistent/foreman.toml")));
        assert!(matches!(result, Err(ConfigError::Other(_))));

        clean_env();
    }
}
