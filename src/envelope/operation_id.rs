use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use super::EnvelopeError;

static OPERATION_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^echo-[0-9]+-[a-f0-9]{16}$").expect("operation id pattern is a valid regex")
});

/// Identifier of one processor operation, always of the form
/// `echo-<digits>-<16 lowercase hex chars>`.
///
/// The only way to obtain one is through [`OperationId::parse`] or
/// [`OperationId::generate`], so holding an `OperationId` means the format
/// check already passed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OperationId(String);

impl OperationId {
    /// Validate a candidate id. Nothing is trimmed or normalized.
    pub fn parse(candidate: &str) -> Result<Self, EnvelopeError> {
        if OPERATION_ID_PATTERN.is_match(candidate) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(EnvelopeError::InvalidOperationId {
                candidate: candidate.to_string(),
            })
        }
    }

    /// Generate a fresh id from the current unix time and 64 random bits.
    pub fn generate() -> Self {
        let seconds = chrono::Utc::now().timestamp().max(0);
        let entropy: u64 = rand::random();
        Self(format!("echo-{seconds}-{entropy:016x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OperationId {
    type Error = EnvelopeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OperationId> for String {
    fn from(id: OperationId) -> Self {
        id.0
    }
}

impl AsRef<str> for OperationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
