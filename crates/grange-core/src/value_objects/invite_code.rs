//! Invite code - short shareable identifier for group invitations
//!
//! Codes are 8 characters drawn from `[A-Z0-9]`. Lookups are case-insensitive:
//! parsing normalizes input to uppercase before validating.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Length of every invite code
pub const CODE_LEN: usize = 8;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Validated invite code
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InviteCode(String);

impl InviteCode {
    /// Generate a random code
    pub fn generate() -> Self {
        use rand::Rng;

        let mut rng = rand::thread_rng();
        let code = (0..CODE_LEN)
            .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
            .collect();
        Self(code)
    }

    /// Parse a user-supplied code, normalizing case
    pub fn parse(input: &str) -> Result<Self, InviteCodeParseError> {
        let code = input.trim().to_ascii_uppercase();
        if code.len() != CODE_LEN {
            return Err(InviteCodeParseError::InvalidLength(code.len()));
        }
        if !code.bytes().all(|b| CHARSET.contains(&b)) {
            return Err(InviteCodeParseError::InvalidCharacter);
        }
        Ok(Self(code))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Error when parsing an invite code from a string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InviteCodeParseError {
    #[error("invite code must be {CODE_LEN} characters, got {0}")]
    InvalidLength(usize),

    #[error("invite code contains invalid characters")]
    InvalidCharacter,
}

impl fmt::Display for InviteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for InviteCode {
    type Err = InviteCodeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for InviteCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for InviteCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
