//! Group role hierarchy
//!
//! Roles form a total order: `member < moderator < admin < owner`.
//! Every permission check in the engine reduces to a rank comparison.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a member within a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Member,
    Moderator,
    Admin,
    Owner,
}

impl GroupRole {
    /// Numeric rank used for ordering (member=1 .. owner=4)
    #[inline]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Member => 1,
            Self::Moderator => 2,
            Self::Admin => 3,
            Self::Owner => 4,
        }
    }

    /// Whether this role meets or exceeds the required role
    #[inline]
    pub const fn at_least(self, need: Self) -> bool {
        self.rank() >= need.rank()
    }

    /// Database / wire representation
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }
}

impl fmt::Display for GroupRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Self::Member),
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            "owner" => Ok(Self::Owner),
            other => Err(format!("unknown group role: {other}")),
        }
    }
}

impl PartialOrd for GroupRole {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GroupRole {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [GroupRole; 4] = [
        GroupRole::Member,
        GroupRole::Moderator,
        GroupRole::Admin,
        GroupRole::Owner,
    ];

    #[test]
    fn test_rank_total_order() {
        assert!(GroupRole::Member < GroupRole::Moderator);
        assert!(GroupRole::Moderator < GroupRole::Admin);
        assert!(GroupRole::Admin < GroupRole::Owner);
    }

    #[test]
    fn test_at_least_all_pairs() {
        for have in ALL {
            for need in ALL {
                assert_eq!(
                    have.at_least(need),
                    have.rank() >= need.rank(),
                    "at_least({have}, {need})"
                );
            }
        }
    }

    #[test]
    fn test_round_trip_str() {
        for role in ALL {
            assert_eq!(role.as_str().parse::<GroupRole>().unwrap(), role);
        }
        assert!("farmer".parse::<GroupRole>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&GroupRole::Moderator).unwrap();
        assert_eq!(json, "\"moderator\"");
        let role: GroupRole = serde_json::from_str("\"owner\"").unwrap();
        assert_eq!(role, GroupRole::Owner);
    }
}
