//! Configuration for the strategy service.
//!
//! All request-handling behaviour is controlled through [`ServiceConfig`],
//! built once at startup via [`ServiceConfigBuilder`] (or
//! [`ServiceConfig::from_env`]) and injected into the pipeline and the HTTP
//! router. Nothing downstream reads the process environment.
//!
//! The provider credential is the only required value. `build()` refuses an
//! empty key so a misconfigured deployment fails at startup instead of on the
//! first request.

use crate::error::StratosError;
use crate::guard::GuardPolicy;
use crate::pipeline::provider::GenerationProvider;
use std::fmt;
use std::sync::Arc;

/// Default Gemini REST endpoint (v1beta exposes model listing).
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Browser-like identity sent with page fetches.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Environment variable holding the provider key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuration for strategy generation.
///
/// # Example
/// ```rust
/// use stratos::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .api_key("test-key")
///     .fetch_timeout_secs(5)
///     .build()
///     .unwrap();
/// assert_eq!(config.body_char_limit, 4500);
/// ```
#[derive(Clone)]
pub struct ServiceConfig {
    /// Provider API key. Never logged; redacted from `Debug`.
    pub api_key: String,

    /// Base URL of the Gemini REST API. Default: [`DEFAULT_API_BASE`].
    pub api_base: String,

    /// Substring a model name must contain to be selected. Default: "gemini".
    pub model_family: String,

    /// Pre-constructed provider. Takes precedence over `api_key`/`api_base`.
    pub provider: Option<Arc<dyn GenerationProvider>>,

    /// Upper bound on the page fetch, headers and body together. Default: 8.
    pub fetch_timeout_secs: u64,

    /// `User-Agent` sent with page fetches.
    pub user_agent: String,

    /// Maximum characters of page body text passed to the model. Default: 4500.
    pub body_char_limit: usize,

    /// Maximum characters of user notes passed to the model. Default: 2000.
    pub notes_char_limit: usize,

    /// Main-content text shorter than this falls back to the whole body.
    /// Default: 200.
    pub min_content_chars: usize,

    /// Campaign objective used when the request carries no mode.
    pub default_mode: String,

    /// Custom prompt template with `{mode}` and `{source}` placeholders.
    /// If None, uses [`crate::prompts::STRATEGY_PROMPT`].
    pub prompt_template: Option<String>,

    /// SSRF deny-list applied before any fetch.
    pub guard: GuardPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            model_family: "gemini".to_string(),
            provider: None,
            fetch_timeout_secs: 8,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            body_char_limit: 4500,
            notes_char_limit: 2000,
            min_content_chars: 200,
            default_mode: "General Awareness".to_string(),
            prompt_template: None,
            guard: GuardPolicy::default(),
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("api_base", &self.api_base)
            .field("model_family", &self.model_family)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn GenerationProvider>"))
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("body_char_limit", &self.body_char_limit)
            .field("notes_char_limit", &self.notes_char_limit)
            .field("min_content_chars", &self.min_content_chars)
            .field("default_mode", &self.default_mode)
            .field("guard", &self.guard)
            .finish()
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a config from the process environment.
    ///
    /// Reads `GEMINI_API_KEY` (required), `STRATOS_API_BASE`,
    /// `STRATOS_MODEL_FAMILY`, `STRATOS_FETCH_TIMEOUT` and
    /// `STRATOS_PLATFORM_DOMAIN` (optional).
    pub fn from_env() -> Result<Self, StratosError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, StratosError> {
        let set = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        let mut builder = Self::builder();
        if let Some(key) = var(API_KEY_ENV) {
            builder = builder.api_key(key);
        }
        if let Some(base) = set("STRATOS_API_BASE") {
            builder = builder.api_base(base);
        }
        if let Some(family) = set("STRATOS_MODEL_FAMILY") {
            builder = builder.model_family(family.trim());
        }
        if let Some(secs) = var("STRATOS_FETCH_TIMEOUT") {
            let secs = secs.trim().parse::<u64>().map_err(|_| {
                StratosError::InvalidConfig(format!(
                    "STRATOS_FETCH_TIMEOUT must be a whole number of seconds, got '{secs}'"
                ))
            })?;
            builder = builder.fetch_timeout_secs(secs);
        }
        if let Some(domain) = set("STRATOS_PLATFORM_DOMAIN") {
            builder = builder.guard(GuardPolicy::default().with_platform_domain(domain.trim()));
        }
        builder.build()
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into().trim().to_string();
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model_family(mut self, family: impl Into<String>) -> Self {
        self.config.model_family = family.into();
        self
    }

    pub fn provider(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch_timeout_secs = secs;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn body_char_limit(mut self, n: usize) -> Self {
        self.config.body_char_limit = n;
        self
    }

    pub fn notes_char_limit(mut self, n: usize) -> Self {
        self.config.notes_char_limit = n;
        self
    }

    pub fn min_content_chars(mut self, n: usize) -> Self {
        self.config.min_content_chars = n;
        self
    }

    pub fn default_mode(mut self, mode: impl Into<String>) -> Self {
        self.config.default_mode = mode.into();
        self
    }

    pub fn prompt_template(mut self, template: impl Into<String>) -> Self {
        self.config.prompt_template = Some(template.into());
        self
    }

    pub fn guard(mut self, policy: GuardPolicy) -> Self {
        self.config.guard = policy;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, StratosError> {
        let c = &self.config;
        if c.api_key.is_empty() && c.provider.is_none() {
            return Err(StratosError::MissingApiKey);
        }
        if c.fetch_timeout_secs == 0 {
            return Err(StratosError::InvalidConfig(
                "Fetch timeout must be ≥ 1 second".into(),
            ));
        }
        if c.body_char_limit == 0 {
            return Err(StratosError::InvalidConfig(
                "Body character limit must be ≥ 1".into(),
            ));
        }
        if c.model_family.trim().is_empty() {
            return Err(StratosError::InvalidConfig(
                "Model family marker must not be empty".into(),
            ));
        }
        if let Some(ref t) = c.prompt_template {
            if !t.contains("{source}") {
                return Err(StratosError::InvalidConfig(
                    "Prompt template must contain a {source} placeholder".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_budgets() {
        let c = ServiceConfig::builder().api_key("k").build().unwrap();
        assert_eq!(c.fetch_timeout_secs, 8);
        assert_eq!(c.body_char_limit, 4500);
        assert_eq!(c.notes_char_limit, 2000);
        assert_eq!(c.min_content_chars, 200);
        assert_eq!(c.model_family, "gemini");
        assert_eq!(c.default_mode, "General Awareness");
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: std::collections::HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn env_sets_family_and_platform_domain() {
        let c = ServiceConfig::from_lookup(env(&[
            ("GEMINI_API_KEY", "k"),
            ("STRATOS_MODEL_FAMILY", "gemini-2"),
            ("STRATOS_PLATFORM_DOMAIN", "Example.NET"),
        ]))
        .unwrap();
        assert_eq!(c.model_family, "gemini-2");
        assert!(!c.guard.allows_host("app.example.net"));
        assert!(c.guard.allows_host("example.com"));
    }

    #[test]
    fn env_defaults_when_unset() {
        let c = ServiceConfig::from_lookup(env(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert_eq!(c.model_family, "gemini");
        assert_eq!(
            c.guard.platform_domain,
            GuardPolicy::default().platform_domain
        );
        let err = ServiceConfig::from_lookup(env(&[])).unwrap_err();
        assert!(matches!(err, StratosError::MissingApiKey));
    }

    #[test]
    fn env_rejects_bad_timeout() {
        let err = ServiceConfig::from_lookup(env(&[
            ("GEMINI_API_KEY", "k"),
            ("STRATOS_FETCH_TIMEOUT", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, StratosError::InvalidConfig(_)));
    }

    #[test]
    fn missing_key_fails_fast() {
        let err = ServiceConfig::builder().build().unwrap_err();
        assert!(matches!(err, StratosError::MissingApiKey));

        let err = ServiceConfig::builder().api_key("   ").build().unwrap_err();
        assert!(matches!(err, StratosError::MissingApiKey));
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = ServiceConfig::builder()
            .api_key("k")
            .fetch_timeout_secs(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, StratosError::InvalidConfig(_)));
    }

    #[test]
    fn template_needs_source_placeholder() {
        let err = ServiceConfig::builder()
            .api_key("k")
            .prompt_template("Write a poster for {mode}")
            .build()
            .unwrap_err();
        assert!(matches!(err, StratosError::InvalidConfig(_)));
    }

    #[test]
    fn api_base_trailing_slash_trimmed() {
        let c = ServiceConfig::builder()
            .api_key("k")
            .api_base("http://localhost:1234/")
            .build()
            .unwrap();
        assert_eq!(c.api_base, "http://localhost:1234");
    }

    #[test]
    fn debug_redacts_key() {
        let c = ServiceConfig::builder()
            .api_key("AIzaSecret")
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("AIzaSecret"));
        assert!(dbg.contains("<redacted>"));
    }
}
