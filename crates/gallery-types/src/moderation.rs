use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::ids::{ActionId, AppId, MessageId, ReportId, UserId};

/// An abuse report filed against a gallery app.
///
/// Lifecycle: created open, transitions once to resolved. `resolved_at` is
/// set on that single transition and never rewritten.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub app_id: AppId,
    pub reporter_id: UserId,
    /// The app's developer at the time the report was filed.
    pub offender_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Report {
    pub fn is_open(&self) -> bool {
        !self.resolved
    }
}

/// What a moderator decided about a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    /// The report was unfounded.
    Dismiss,
    /// The app was hidden from the gallery.
    DeactivateApp,
    /// The developer was sent a warning message.
    WarnUser,
    /// The report was closed without further action.
    ResolveOnly,
}

impl ActionType {
    /// Stable numeric code, for callers that transmit actions as integers.
    pub fn code(&self) -> u8 {
        match self {
            Self::Dismiss => 0,
            Self::DeactivateApp => 1,
            Self::WarnUser => 2,
            Self::ResolveOnly => 3,
        }
    }
}

impl TryFrom<u8> for ActionType {
    type Error = TypeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Dismiss),
            1 => Ok(Self::DeactivateApp),
            2 => Ok(Self::WarnUser),
            3 => Ok(Self::ResolveOnly),
            other => Err(TypeError::UnknownActionType(other)),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dismiss => write!(f, "Dismiss"),
            Self::DeactivateApp => write!(f, "DeactivateApp"),
            Self::WarnUser => write!(f, "WarnUser"),
            Self::ResolveOnly => write!(f, "ResolveOnly"),
        }
    }
}

/// Immutable audit entry describing one moderator decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationAction {
    pub id: ActionId,
    pub report_id: ReportId,
    pub app_id: AppId,
    /// Message sent to the offender as part of this action, if any.
    pub message_id: Option<MessageId>,
    pub moderator_id: UserId,
    pub action_type: ActionType,
    pub moderator_name: String,
    pub message_preview: String,
    pub created_at: DateTime<Utc>,
}
