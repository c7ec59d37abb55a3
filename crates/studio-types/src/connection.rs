use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Active,
    Inactive,
    Error,
}

impl ConnectionStatus {
    /// Normalise a provider status string. Unknown values count as inactive.
    pub fn from_provider(status: &str) -> Self {
        match status {
            "ACTIVE" | "active" => ConnectionStatus::Active,
            "ERROR" | "error" => ConnectionStatus::Error,
            _ => ConnectionStatus::Inactive,
        }
    }
}

/// A user's authorization of a third-party app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub user_id: String,
    pub app_id: String,
    pub app_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_icon: Option<String>,
    pub status: ConnectionStatus,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Connection {
    pub fn is_active(&self) -> bool {
        self.status == ConnectionStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_normalisation() {
        assert_eq!(ConnectionStatus::from_provider("ACTIVE"), ConnectionStatus::Active);
        assert_eq!(ConnectionStatus::from_provider("active"), ConnectionStatus::Active);
        assert_eq!(ConnectionStatus::from_provider("ERROR"), ConnectionStatus::Error);
        assert_eq!(ConnectionStatus::from_provider("INITIATED"), ConnectionStatus::Inactive);
        assert_eq!(ConnectionStatus::from_provider(""), ConnectionStatus::Inactive);
    }
}
