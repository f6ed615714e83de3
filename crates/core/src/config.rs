use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::property::PropertyNames;

static DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
static DEFAULT_NOTION_VERSION: &str = "2022-06-28";
static DEFAULT_TIMEOUT_SECS: u64 = 30;
static DEFAULT_ENV_FILE: &str = ".env";

static ENV_API_KEY: &str = "NOTION_API_KEY";
static ENV_DATABASE_ID: &str = "NOTION_DATABASE_ID";
static ENV_BASE_URL: &str = "NOTION_BASE_URL";
static ENV_VERSION: &str = "NOTION_VERSION";
static ENV_TIMEOUT: &str = "NOTION_TIMEOUT_SECS";
static ENV_PROPERTY_PREFIX: &str = "NOTION_PROPERTY_";

/// Process-wide settings, resolved once at startup and never mutated.
#[derive(Clone)]
pub struct AppConfig {
    api_key: String,
    database_id: String,
    base_url: String,
    notion_version: String,
    timeout: Duration,
    properties: PropertyNames,
}

impl AppConfig {
    /// Resolve configuration from the process environment, falling back to
    /// the given dotenv file or, without one, the nearest `.env` above the
    /// working directory.
    pub fn discover(env_file: Option<PathBuf>) -> Result<Self> {
        let file_vars = match env_file {
            Some(path) => read_env_file(&path)?,
            None => match find_env_file() {
                Some(path) => read_env_file(&path)?,
                None => HashMap::new(),
            },
        };
        Self::from_lookup(|key| env::var(key).ok().or_else(|| file_vars.get(key).cloned()))
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required = |key: &str| {
            value(key).ok_or_else(|| {
                anyhow!(
                    "{} is not set; add it to the environment or the .env file",
                    key
                )
            })
        };

        let api_key = required(ENV_API_KEY)?;
        let database_id = required(ENV_DATABASE_ID)?;
        let mut config = Self::new(api_key, database_id)?;

        if let Some(base_url) = value(ENV_BASE_URL) {
            config = config.with_base_url(base_url);
        }
        if let Some(version) = value(ENV_VERSION) {
            config.notion_version = version;
        }
        if let Some(raw) = value(ENV_TIMEOUT) {
            let secs: u64 = raw.parse().ok().filter(|secs| *secs > 0).ok_or_else(|| {
                anyhow!("{} must be a positive integer, got '{}'", ENV_TIMEOUT, raw)
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        let mut properties = PropertyNames::default();
        {
            let slots: [(&str, &mut String); 9] = [
                ("TASK", &mut properties.task),
                ("STATUS", &mut properties.status),
                ("ASSIGNEE", &mut properties.assignee),
                ("DUE", &mut properties.due),
                ("PRIORITY", &mut properties.priority),
                ("TAGS", &mut properties.tags),
                ("SPRINT", &mut properties.sprint),
                ("PROJECT", &mut properties.project),
                ("LINK", &mut properties.link),
            ];
            for (suffix, slot) in slots {
                if let Some(name) = value(&format!("{}{}", ENV_PROPERTY_PREFIX, suffix)) {
                    *slot = name;
                }
            }
        }

        Ok(config.with_properties(properties))
    }

    /// Construct [`AppConfig`] with defaults for everything but the credential
    /// and target collection.
    pub fn new(api_key: impl Into<String>, database_id: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        let database_id = database_id.into();
        if api_key.trim().is_empty() {
            return Err(anyhow!("{} cannot be empty", ENV_API_KEY));
        }
        if database_id.trim().is_empty() {
            return Err(anyhow!("{} cannot be empty", ENV_DATABASE_ID));
        }
        Ok(Self {
            api_key,
            database_id,
            base_url: DEFAULT_BASE_URL.to_string(),
            notion_version: DEFAULT_NOTION_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            properties: PropertyNames::default(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_properties(mut self, properties: PropertyNames) -> Self {
        self.properties = properties;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn notion_version(&self) -> &str {
        &self.notion_version
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn properties(&self) -> &PropertyNames {
        &self.properties
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("database_id", &self.database_id)
            .field("base_url", &self.base_url)
            .field("notion_version", &self.notion_version)
            .field("timeout", &self.timeout)
            .field("properties", &self.properties)
            .finish()
    }
}

/// Parse a dotenv file without touching the process environment.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let entries = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to open env file at {}", path.display()))?;
    entries
        .map(|entry| {
            entry.with_context(|| format!("Failed to parse env file at {}", path.display()))
        })
        .collect()
}

fn find_env_file() -> Option<PathBuf> {
    let mut dir = env::current_dir().ok()?;
    loop {
        let candidate = dir.join(DEFAULT_ENV_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}
