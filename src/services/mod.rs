//! Per-endpoint service calls and their shared dispatch core
//!
//! Each backend capability gets one service call instance owning its own
//! settings, defer/debounce state and trigger policy. All of them share the
//! live query, the auth token and the transport:
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │                 SearchClient                   │
//! │  property setters ──► FieldChange fan-out      │
//! └───────┬────────┬────────┬───────┬──────────────┘
//!         ▼        ▼        ▼       ▼
//!   Autocomplete  Find  Categorize  ...   (one CallCore each:
//!         │        │        │       │      trigger → defer/debounce →
//!         └────────┴───┬────┴───────┘      veto → transport → callbacks)
//!                      ▼
//!            Transport + AuthToken + Query (shared)
//! ```

mod all_categories;
mod authentication;
mod autocomplete;
mod best_bets;
mod categorize;
pub(crate) mod core;
mod find;
pub mod transport;

pub use all_categories::AllCategories;
pub use authentication::Authentication;
pub use autocomplete::Autocomplete;
pub use best_bets::BestBets;
pub use categorize::Categorize;
pub use find::Find;
pub use transport::{CacheMode, CredentialsMode, HttpMethod, HttpTransport, RequestInit, Transport};
