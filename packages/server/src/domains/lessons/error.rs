use thiserror::Error;

use crate::common::{LessonId, MediaId};

use super::models::room_state::{PollingStatus, RoomStateError};

/// Command execution errors for the live lesson room.
///
/// Validation and state-precondition failures indicate a bad or stale client
/// request and are surfaced as-is, never retried. `Storage` wraps collaborator
/// failures; any error returned from a handler rolls the surrounding
/// transaction back.
#[derive(Error, Debug)]
pub enum LessonError {
    #[error("lesson {0} not found")]
    LessonNotFound(LessonId),

    #[error("media {media_id} does not belong to lesson {lesson_id}")]
    MediaNotInLesson {
        media_id: MediaId,
        lesson_id: LessonId,
    },

    #[error(transparent)]
    InvalidRoomState(#[from] RoomStateError),

    #[error("invalid poll options: {0}")]
    InvalidPollOptions(String),

    #[error("a poll is already in progress")]
    PollingAlreadyExists,

    #[error("no poll is in progress")]
    PollingNotFound,

    #[error("poll must be {expected} (currently {actual})")]
    PollingStatus {
        expected: PollingStatus,
        actual: PollingStatus,
    },

    #[error("answer \"{0}\" is not one of the poll options")]
    AnswerNotInOptions(String),

    #[error("submitted answer is empty")]
    EmptyAnswer,

    #[error("only submit 1 time")]
    AlreadySubmitted,

    #[error("room state changed concurrently, reload and retry")]
    RoomStateConflict,

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("member state of lesson {found} mixed into lesson {expected}")]
    ForeignMemberState {
        expected: LessonId,
        found: LessonId,
    },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
