use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Friend request lifecycle: `Pending` moves to `Accepted` or `Rejected` and stays there.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Awaiting an answer from the recipient
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Recipient accepted; the two users are friends
    #[sea_orm(string_value = "accepted")]
    Accepted,
    /// Recipient declined
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RequestStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Only pending requests may still change status.
    #[must_use]
    pub const fn can_resolve(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str() {
        assert_eq!(RequestStatus::Pending.as_str(), "pending");
        assert_eq!(RequestStatus::Accepted.as_str(), "accepted");
        assert_eq!(RequestStatus::Rejected.as_str(), "rejected");
    }

    #[test]
    fn test_only_pending_can_resolve() {
        assert!(RequestStatus::Pending.can_resolve());
        assert!(!RequestStatus::Accepted.can_resolve());
        assert!(!RequestStatus::Rejected.can_resolve());
    }

    #[test]
    fn test_default() {
        assert_eq!(RequestStatus::default(), RequestStatus::Pending);
    }
}
