//! Client-side query orchestration for multi-endpoint search backends
//!
//! This crate fronts a search backend that exposes separate autocomplete,
//! find, categorize, best-bets, all-categories and authentication endpoints.
//! It keeps one shared mutable [`Query`], observes every field mutation,
//! maps each through per-service [trigger policies](query::TriggerPolicy),
//! and turns the ones that fire into deferred, debounced, cancelable
//! dispatches with callback-based request/success/error interception:
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                SearchClient                     │
//! ├─────────────────────────────────────────────────┤
//! │  set_query_text()  set_filters()  force_update()│
//! │  defer_updates_for_all()  reset()  paging       │
//! └──────────────────────┬──────────────────────────┘
//!                        │ FieldChange fan-out
//!                        ▼
//! ┌─────────────────────────────────────────────────┐
//! │     Service calls (one per endpoint)            │
//! ├─────────────────────────────────────────────────┤
//! │  trigger policy → defer / debounce → veto       │
//! │  → transport → success / error callbacks        │
//! └──────────────────────┬──────────────────────────┘
//!                        ▼
//! ┌─────────────────────────────────────────────────┐
//! │  Transport (reqwest by default) + AuthToken     │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use search_conductor::{SearchClient, Settings, TriggerPolicy};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut settings = Settings::default();
//!     settings.find = settings
//!         .find
//!         .trigger(TriggerPolicy::live_search())
//!         .on_success(|matches| println!("{} matches", matches.estimated_match_count))
//!         .on_error(|error| eprintln!("find failed: {}", error));
//!
//!     let client = SearchClient::new("http://localhost:9950/RestService/v4/", settings)?;
//!
//!     client.set_query_text("quarterly ");
//!     // A trailing space completes a word: the find call dispatches
//!     // immediately and the callback above receives the matches.
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod services;

pub use auth::AuthToken;
pub use client::{SearchClient, DEBUG_MARKER};
pub use config::{Callbacks, ClientConfig, ServiceConfig, ServiceSettings, Settings, TriggerPreset};
pub use error::{AppError, Result};
pub use models::{AuthResponse, BestBet, BestBetList, Categories, Category, Group, Matches, MetaItem, SearchMatch, Suggestions};
pub use query::{
    CategorizationType, DateSpecification, FieldChange, InstantTrigger, OrderBy, Query, QueryField,
    RelativeDate, SearchType, TriggerCondition, TriggerPolicy,
};
pub use services::{
    AllCategories, Authentication, Autocomplete, BestBets, CacheMode, Categorize, CredentialsMode,
    Find, HttpMethod, HttpTransport, RequestInit, Transport,
};
