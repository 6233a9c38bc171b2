//! Command handlers.
//!
//! One handler per command variant, grouped by concern. Handlers never open
//! their own transaction: the dispatcher passes the single `RoomStoreTx` for
//! the whole execution, and composite handlers reuse it for their
//! sub-commands.

pub mod material;
pub mod member_states;
pub mod polling;
pub mod queries;
pub mod recording;
pub mod room;

use crate::common::LessonId;

use super::error::LessonError;
use super::models::{Lesson, RoomState};
use super::store::{RoomStateWrite, RoomStoreTx};

pub(crate) async fn require_lesson(
    tx: &mut dyn RoomStoreTx,
    lesson_id: &LessonId,
) -> Result<Lesson, LessonError> {
    tx.find_lesson(lesson_id)
        .await?
        .ok_or(LessonError::LessonNotFound(*lesson_id))
}

/// Validate and write the whole room state document under the version the
/// lesson was read at.
pub(crate) async fn write_room_state(
    tx: &mut dyn RoomStoreTx,
    lesson: &Lesson,
    state: &RoomState,
) -> Result<(), LessonError> {
    state.validate()?;
    match tx
        .update_room_state(&lesson.id, state, lesson.room_state_version)
        .await?
    {
        RoomStateWrite::Committed => Ok(()),
        RoomStateWrite::Conflict => Err(LessonError::RoomStateConflict),
    }
}
