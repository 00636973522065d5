//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// Response body of `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    pub connections: usize,
}
