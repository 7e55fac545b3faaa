//! Event lifecycle status.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Lifecycle status of an event.
///
/// Status transitions are driven by the vendor-facing collaborator via
/// registry updates; the registry itself never advances the status.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// The event has not yet started. New events begin here.
    #[default]
    Upcoming,
    /// The event is currently in progress.
    Ongoing,
    /// The event has finished.
    Completed,
    /// The event was called off by its vendor.
    Cancelled,
}

impl EventStatus {
    /// Return the lowercase storage representation of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl core::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl core::str::FromStr for EventStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(Self::Upcoming),
            "ongoing" => Ok(Self::Ongoing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus {
                value: other.to_owned(),
            }),
        }
    }
}

/// Error returned when parsing an unrecognized status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event status: {value}")]
pub struct UnknownStatus {
    /// The string that failed to parse.
    pub value: String,
}
