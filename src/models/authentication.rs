use serde::{Deserialize, Serialize};

/// Response payload of the authentication service
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthResponse {
    /// The bearer token subsequent requests should carry
    pub token: String,
}
