use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{LessonId, PollId, UserId};

use super::room_state::PollingOption;

/// A learner's collected answers at the moment the poll ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPollingAnswer {
    pub user_id: UserId,
    pub answers: Vec<String>,
}

/// Immutable snapshot of a finished poll.
///
/// Written once when the poll ends and never updated; the live document and
/// every member's answer state are cleared in the same transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollingArchive {
    pub id: PollId,
    pub lesson_id: LessonId,
    pub options: Vec<PollingOption>,
    pub created_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub user_answers: Vec<UserPollingAnswer>,
}
