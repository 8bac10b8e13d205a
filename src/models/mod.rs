//! Response payloads returned by the backend services

pub mod authentication;
pub mod best_bets;
pub mod categories;
pub mod matches;

pub use authentication::AuthResponse;
pub use best_bets::{BestBet, BestBetList};
pub use categories::{Categories, Category, Group};
pub use matches::{Matches, MetaItem, SearchMatch};

/// Response payload of the autocomplete service
pub type Suggestions = Vec<String>;
