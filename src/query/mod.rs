//! Query state, filter keys and trigger policies
//!
//! The query is the single source of truth for what the user is currently
//! asking the backend. The client facade mutates it field by field; every
//! applied mutation is broadcast to the service calls as a [`FieldChange`],
//! which each call maps through its [`TriggerPolicy`] to decide whether the
//! mutation becomes a network dispatch.

pub mod filters;
mod state;
mod trigger;
mod types;

pub use state::{shared, Query, SharedQuery};
pub use trigger::{FieldChange, InstantTrigger, QueryField, TriggerCondition, TriggerPolicy};
pub use types::{CategorizationType, DateSpecification, OrderBy, RelativeDate, SearchType};
