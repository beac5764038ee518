use core::fmt;
use serde::{Deserialize, Serialize};

/// Classification recorded for every waterfall attempt and for a whole cycle.
///
/// Each variant carries a stable numeric code that is written into outcome
/// report URLs. Codes 1 and 4 are reserved and never produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeCode {
    /// The source produced a displayable ad.
    Success,
    /// The source explicitly reported that it has no inventory.
    UnableToFill,
    /// The mediated adapter could not be resolved, lacks the required
    /// capability, or failed during construction.
    MediatedSdkUnavailable,
    /// The source neither succeeded nor failed in time, or an unexpected
    /// error occurred.
    InternalError,
}

impl OutcomeCode {
    /// Numeric code used on the wire.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::UnableToFill => 2,
            Self::MediatedSdkUnavailable => 3,
            Self::InternalError => 5,
        }
    }

    /// Inverse of [`code`](Self::code).
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            2 => Some(Self::UnableToFill),
            3 => Some(Self::MediatedSdkUnavailable),
            5 => Some(Self::InternalError),
            _ => None,
        }
    }

    /// Stable, snake-case identifier for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::UnableToFill => "unable_to_fill",
            Self::MediatedSdkUnavailable => "mediated_sdk_unavailable",
            Self::InternalError => "internal_error",
        }
    }

    /// Returns true for [`OutcomeCode::Success`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for OutcomeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
