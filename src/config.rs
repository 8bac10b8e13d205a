//! Client settings
//!
//! Two layers, mirroring how the settings reach the client in practice:
//!
//! - [`ClientConfig`] is the file/environment-expressible subset (base URL,
//!   per-service enabled/delay/trigger preset), loaded through the `config`
//!   crate with layered overrides.
//! - [`Settings`] is the full runtime configuration: the initial query state
//!   and one [`ServiceSettings`] per service, including the callbacks that
//!   can only be attached in code.
//!
//! Every option has a documented default; overlaying a [`ClientConfig`] onto
//! defaults is explicit field-by-field work in [`Settings::from_config`],
//! not generic object merging.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{AuthResponse, BestBetList, Categories, Matches, Suggestions};
use crate::query::{InstantTrigger, Query, TriggerCondition, TriggerPolicy};
use crate::services::transport::RequestInit;

/// Callback invoked before a dispatch; returning `false` vetoes the request.
pub type RequestCallback = Arc<dyn Fn(&Url, &RequestInit) -> bool + Send + Sync>;

/// Callback invoked with the parsed payload of a successful dispatch.
pub type SuccessCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Callback invoked with the error of a failed dispatch.
pub type ErrorCallback = Arc<dyn Fn(&AppError) + Send + Sync>;

/// The three interception points of one service call. All optional; an unset
/// request callback lets every dispatch through.
pub struct Callbacks<T> {
    pub request: Option<RequestCallback>,
    pub success: Option<SuccessCallback<T>>,
    pub error: Option<ErrorCallback>,
}

impl<T> Default for Callbacks<T> {
    fn default() -> Self {
        Self {
            request: None,
            success: None,
            error: None,
        }
    }
}

impl<T> Clone for Callbacks<T> {
    fn clone(&self) -> Self {
        Self {
            request: self.request.clone(),
            success: self.success.clone(),
            error: self.error.clone(),
        }
    }
}

impl<T> fmt::Debug for Callbacks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("request", &self.request.is_some())
            .field("success", &self.success.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

/// Configuration of one service call.
#[derive(Debug, Clone)]
pub struct ServiceSettings<T> {
    /// Whether the service is constructed at all. Default true.
    pub enabled: bool,

    /// Endpoint path relative to the client base URL.
    pub path: String,

    /// Debounce window for triggered dispatches. `None` (the default)
    /// dispatches immediately when a trigger fires.
    pub delay: Option<Duration>,

    /// Per-field trigger conditions. Default: nothing fires (manual-only).
    pub trigger: TriggerPolicy,

    /// Request/success/error interception. Default: none set.
    pub callbacks: Callbacks<T>,
}

impl<T> ServiceSettings<T> {
    fn with_path(path: &str) -> Self {
        Self {
            enabled: true,
            path: path.to_string(),
            delay: None,
            trigger: TriggerPolicy::default(),
            callbacks: Callbacks::default(),
        }
    }

    /// Set the enabled flag.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the debounce window.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replace the trigger policy.
    pub fn trigger(mut self, trigger: TriggerPolicy) -> Self {
        self.trigger = trigger;
        self
    }

    /// Attach a request callback.
    pub fn on_request(mut self, cb: impl Fn(&Url, &RequestInit) -> bool + Send + Sync + 'static) -> Self {
        self.callbacks.request = Some(Arc::new(cb));
        self
    }

    /// Attach a success callback.
    pub fn on_success(mut self, cb: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.callbacks.success = Some(Arc::new(cb));
        self
    }

    /// Attach an error callback.
    pub fn on_error(mut self, cb: impl Fn(&AppError) + Send + Sync + 'static) -> Self {
        self.callbacks.error = Some(Arc::new(cb));
        self
    }
}

/// Full runtime configuration of a client.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Initial query state; also what [`crate::SearchClient::reset`] restores.
    pub query: Query,

    /// Bearer token to start with, when one is already known.
    pub authentication_token: Option<String>,

    /// Request timeout applied by the default HTTP transport.
    pub timeout: Duration,

    pub autocomplete: ServiceSettings<Suggestions>,
    pub find: ServiceSettings<Matches>,
    pub categorize: ServiceSettings<Categories>,
    pub best_bets: ServiceSettings<BestBetList>,
    pub all_categories: ServiceSettings<Categories>,
    pub authentication: ServiceSettings<AuthResponse>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            query: Query::default(),
            authentication_token: None,
            timeout: Duration::from_secs(default_timeout_secs()),
            autocomplete: ServiceSettings::with_path("autocomplete"),
            find: ServiceSettings::with_path("find"),
            categorize: ServiceSettings::with_path("categorize"),
            best_bets: ServiceSettings::with_path("bestbets"),
            all_categories: ServiceSettings::with_path("allcategories"),
            authentication: ServiceSettings::with_path("auth/token"),
        }
    }
}

impl Settings {
    /// Overlay a loaded [`ClientConfig`] onto defaults. Callbacks stay unset;
    /// attach them on the returned value.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut settings = Settings {
            timeout: Duration::from_secs(config.timeout_secs),
            ..Default::default()
        };
        config.autocomplete.apply(&mut settings.autocomplete)?;
        config.find.apply(&mut settings.find)?;
        config.categorize.apply(&mut settings.categorize)?;
        config.best_bets.apply(&mut settings.best_bets)?;
        config.all_categories.apply(&mut settings.all_categories)?;
        config.authentication.apply(&mut settings.authentication)?;
        Ok(settings)
    }
}

/// Trigger presets expressible in configuration files.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPreset {
    /// Nothing fires; dispatch only through explicit update calls.
    #[default]
    Manual,
    /// [`TriggerPolicy::live_search`]
    LiveSearch,
    /// [`TriggerPolicy::live_categorize`]
    LiveCategorize,
    /// [`TriggerPolicy::live_autocomplete`]
    LiveAutocomplete,
}

/// File-expressible configuration of one service.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceConfig {
    /// Overrides the enabled flag when set.
    pub enabled: Option<bool>,

    /// Overrides the endpoint path when set.
    pub path: Option<String>,

    /// Debounce window in milliseconds.
    pub delay_ms: Option<u64>,

    /// Trigger preset to install.
    #[serde(default)]
    pub trigger: TriggerPreset,

    /// Overrides the instant-dispatch pattern of the installed preset.
    pub instant_pattern: Option<String>,
}

impl ServiceConfig {
    fn apply<T>(&self, settings: &mut ServiceSettings<T>) -> Result<()> {
        if let Some(enabled) = self.enabled {
            settings.enabled = enabled;
        }
        if let Some(path) = &self.path {
            settings.path = path.clone();
        }
        if let Some(delay_ms) = self.delay_ms {
            settings.delay = Some(Duration::from_millis(delay_ms));
        }
        settings.trigger = match self.trigger {
            TriggerPreset::Manual => TriggerPolicy::default(),
            TriggerPreset::LiveSearch => TriggerPolicy::live_search(),
            TriggerPreset::LiveCategorize => TriggerPolicy::live_categorize(),
            TriggerPreset::LiveAutocomplete => TriggerPolicy::live_autocomplete(),
        };
        if let Some(pattern) = &self.instant_pattern {
            let rule = InstantTrigger::from_pattern(pattern, false)
                .map_err(|e| AppError::Configuration(format!("Bad instant pattern: {}", e)))?;
            settings.trigger.query_text = TriggerCondition::OnQueryTextChangeInstant(rule);
        }
        Ok(())
    }
}

/// File/environment configuration of a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the search backend (http or https).
    pub base_url: String,

    /// Request timeout in seconds for the default transport.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub autocomplete: ServiceConfig,

    #[serde(default)]
    pub find: ServiceConfig,

    #[serde(default)]
    pub categorize: ServiceConfig,

    #[serde(default)]
    pub best_bets: ServiceConfig,

    #[serde(default)]
    pub all_categories: ServiceConfig,

    #[serde(default)]
    pub authentication: ServiceConfig,
}

impl ClientConfig {
    /// Load configuration from the embedded defaults, an optional file named
    /// by `SEARCH_CONDUCTOR_CONFIG`, and `SEARCH_CONDUCTOR__`-prefixed
    /// environment variables, in that precedence order.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("SEARCH_CONDUCTOR_CONFIG")
            .unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(config::File::with_name(&config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SEARCH_CONDUCTOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
            .map_err(AppError::from)
    }
}

fn default_timeout_secs() -> u64 {
    30
}
