//! Settings read from the process environment

use parley_ai::providers::groq::API_KEY_ENV;

/// Enables the external tracing pass-through
pub const TRACE_API_KEY_ENV: &str = "LANGCHAIN_API_KEY";
/// Project name reported to the tracing collaborator
pub const TRACE_PROJECT_ENV: &str = "LANGCHAIN_PROJECT";
/// Project name used when none is set
pub const DEFAULT_TRACE_PROJECT: &str = "parley";

/// Tracing pass-through settings. Cosmetic: nothing depends on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceSettings {
    pub api_key: String,
    pub project: String,
}

/// Credentials and flags found in the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// Completion API key; `None` if unset or blank
    pub api_key: Option<String>,
    /// Present only when a tracing key is set
    pub tracing: Option<TraceSettings>,
}

impl Environment {
    /// Read from the real process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read through an arbitrary lookup function
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let tracing = non_blank(TRACE_API_KEY_ENV).map(|api_key| TraceSettings {
            api_key,
            project: non_blank(TRACE_PROJECT_ENV)
                .unwrap_or_else(|| DEFAULT_TRACE_PROJECT.to_string()),
        });

        Self {
            api_key: non_blank(API_KEY_ENV),
            tracing,
        }
    }

    /// Fill a missing API key from another source (e.g. a config file)
    pub fn with_fallback_api_key(mut self, key: Option<String>) -> Self {
        if self.api_key.is_none() {
            self.api_key = key.filter(|k| !k.trim().is_empty());
        }
        self
    }
}
