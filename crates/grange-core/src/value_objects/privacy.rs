//! Group privacy levels

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who may join a group, and how
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupPrivacy {
    /// Anyone may join directly
    #[default]
    Public,
    /// Joining creates a pending request an admin must approve
    Private,
    /// Joining is only possible through an invitation
    InviteOnly,
}

impl GroupPrivacy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::InviteOnly => "invite_only",
        }
    }
}

impl fmt::Display for GroupPrivacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupPrivacy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "invite_only" => Ok(Self::InviteOnly),
            other => Err(format!("unknown group privacy: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for p in [
            GroupPrivacy::Public,
            GroupPrivacy::Private,
            GroupPrivacy::InviteOnly,
        ] {
            assert_eq!(p.as_str().parse::<GroupPrivacy>().unwrap(), p);
        }
    }

    #[test]
    fn test_default_is_public() {
        assert_eq!(GroupPrivacy::default(), GroupPrivacy::Public);
    }
}
