//! Layered configuration for huddle.

use crate::RetryPolicy;
use config::{Config, File, FileFormat};
use huddle_error::{
    ConfigError, HuddleError, HuddleResult, ProviderError, ProviderErrorKind, ProviderKind,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Model identifier for each generation stage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Research model
    pub research_primary: String,
    /// Research model used after a schema violation
    pub research_fallback: String,
    /// Outline model
    pub plan: String,
    /// Article model
    pub write: String,
    /// Patch model
    pub patch: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            research_primary: "sonar".into(),
            research_fallback: "sonar-mini".into(),
            plan: "gpt-5".into(),
            write: "gpt-5".into(),
            patch: "gpt-5".into(),
        }
    }
}

/// Connection settings for one upstream API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EndpointConfig {
    /// Base URL or full endpoint URL
    pub base_url: String,
    /// Minimum spacing between requests
    #[serde(default)]
    pub min_interval_ms: u64,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retry schedule for transient failures
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_timeout_secs() -> u64 {
    120
}

impl EndpointConfig {
    fn new(base_url: &str, min_interval_ms: u64, timeout_secs: u64, retry: RetryPolicy) -> Self {
        Self {
            base_url: base_url.into(),
            min_interval_ms,
            timeout_secs,
            retry,
        }
    }
}

/// USD price per million tokens for one model.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ModelPricing {
    /// Prompt token price
    pub input_per_million: f64,
    /// Completion token price
    pub output_per_million: f64,
}

/// API credentials for the two generation providers.
///
/// Read from the environment only and never serialized.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// OpenAI key
    pub openai_api_key: Option<String>,
    /// Perplexity key
    pub perplexity_api_key: Option<String>,
}

impl Credentials {
    /// The key for `provider`, or a `MissingApiKey` error naming it.
    pub fn require(&self, provider: ProviderKind) -> Result<&str, ProviderError> {
        let key = match provider {
            ProviderKind::Research => self.perplexity_api_key.as_deref(),
            ProviderKind::Writer => self.openai_api_key.as_deref(),
        };
        key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            ProviderError::new(
                provider,
                ProviderErrorKind::MissingApiKey(provider.credential_var()),
            )
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |k: &Option<String>| if k.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("openai_api_key", &mask(&self.openai_api_key))
            .field("perplexity_api_key", &mask(&self.perplexity_api_key))
            .finish()
    }
}

/// Top-level huddle configuration.
///
/// Loads with a precedence system:
/// 1. Bundled defaults (include_str! from huddle.toml)
/// 2. User config in home directory (~/.config/huddle/huddle.toml)
/// 3. User config in current directory (./huddle.toml)
/// 4. Environment variables
///
/// Built once at startup and passed by reference to every component.
///
/// # Example
///
/// ```no_run
/// use huddle_rate_limit::HuddleConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = HuddleConfig::load()?;
/// println!("Writing with {}", config.models.write);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HuddleConfig {
    /// Sleeper league identifier
    pub league_id: Option<String>,
    /// IANA timezone used to infer the season
    pub timezone: String,
    /// Root of the per-week cache directories
    pub output_dir: PathBuf,
    /// Model per stage
    pub models: ModelConfig,
    /// Sports API connection
    pub sleeper: EndpointConfig,
    /// Research provider connection
    pub research: EndpointConfig,
    /// Writer provider connection
    pub writer: EndpointConfig,
    /// Token prices keyed by model id
    pub pricing: HashMap<String, ModelPricing>,
    /// Provider credentials
    #[serde(skip)]
    pub credentials: Credentials,
}

impl Default for HuddleConfig {
    fn default() -> Self {
        let price = |input_per_million, output_per_million| ModelPricing {
            input_per_million,
            output_per_million,
        };
        let pricing = [
            ("gpt-5", price(1.25, 10.0)),
            ("gpt-5-mini", price(0.25, 2.0)),
            ("gpt-5-nano", price(0.05, 0.4)),
            ("gpt-4o", price(2.5, 10.0)),
            ("gpt-4o-mini", price(0.15, 0.6)),
            ("sonar", price(1.0, 1.0)),
            ("sonar-mini", price(1.0, 1.0)),
            ("sonar-pro", price(3.0, 15.0)),
        ]
        .into_iter()
        .map(|(model, p)| (model.to_string(), p))
        .collect();

        Self {
            league_id: None,
            timezone: "America/New_York".into(),
            output_dir: PathBuf::from("out"),
            models: ModelConfig::default(),
            sleeper: EndpointConfig::new(
                "https://api.sleeper.app/v1",
                0,
                30,
                RetryPolicy::sleeper(),
            ),
            research: EndpointConfig::new(
                "https://api.perplexity.ai/chat/completions",
                2000,
                120,
                RetryPolicy::default(),
            ),
            writer: EndpointConfig::new(
                "https://api.openai.com/v1/chat/completions",
                1500,
                120,
                RetryPolicy::default(),
            ),
            pricing,
            credentials: Credentials::default(),
        }
    }
}

// Bundled default configuration
const DEFAULT_CONFIG: &str = include_str!("../../../huddle.toml");

impl HuddleConfig {
    /// Load configuration from a specific file path, without environment overrides.
    ///
    /// Values missing from the file keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> HuddleResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                HuddleError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                HuddleError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// The bundled defaults alone.
    pub fn bundled() -> HuddleResult<Self> {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .and_then(|built| built.try_deserialize())
            .map_err(|e| {
                HuddleError::from(ConfigError::new(format!(
                    "Failed to parse bundled configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration with precedence: environment > ./huddle.toml >
    /// ~/.config/huddle/huddle.toml > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> HuddleResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/huddle/huddle.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("huddle").required(false));

        let config: Self = builder
            .build()
            .map_err(|e| {
                HuddleError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                HuddleError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        Ok(config.with_env_overrides())
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup; blank values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("OPENAI_API_KEY") {
            self.credentials.openai_api_key = Some(key);
        }
        if let Some(key) = get("PERPLEXITY_API_KEY") {
            self.credentials.perplexity_api_key = Some(key);
        }
        if let Some(league) = get("SLEEPER_LEAGUE_ID") {
            self.league_id = Some(league);
        }
        if let Some(tz) = get("TIMEZONE") {
            self.timezone = tz;
        }
        if let Some(dir) = get("HUDDLE_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }

        let models = [
            ("MODEL_STEP1_PRIMARY", &mut self.models.research_primary),
            ("MODEL_STEP1_FALLBACK", &mut self.models.research_fallback),
            ("MODEL_STEP2", &mut self.models.plan),
            ("MODEL_STEP3", &mut self.models.write),
            ("MODEL_STEP4_PATCH", &mut self.models.patch),
        ];
        for (key, slot) in models {
            if let Some(model) = get(key) {
                debug!(key, model = %model, "Model override from environment");
                *slot = model;
            }
        }
        self
    }

    /// Price entry for a model id.
    pub fn pricing_for(&self, model: &str) -> Option<ModelPricing> {
        self.pricing.get(model).copied()
    }
}
