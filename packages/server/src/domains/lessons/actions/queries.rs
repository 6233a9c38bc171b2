//! Read-side assembly of the live lesson view.

use crate::common::LessonId;

use super::super::error::LessonError;
use super::super::models::{LiveLessonState, MemberStateFilter, UserStates};
use super::super::store::RoomStore;

/// Assemble the full room view: the room state document plus every member's
/// states grouped by user, with absent state types at their zero values.
pub async fn get_live_lesson_state(
    lesson_id: &LessonId,
    store: &dyn RoomStore,
) -> Result<LiveLessonState, LessonError> {
    let lesson = store
        .find_lesson(lesson_id)
        .await?
        .ok_or(LessonError::LessonNotFound(*lesson_id))?;
    let rows = store
        .member_states(&MemberStateFilter::for_lesson(*lesson_id))
        .await?;
    let user_states = UserStates::from_rows(lesson_id, &rows)?;
    Ok(LiveLessonState {
        lesson_id: *lesson_id,
        room_state: lesson.room_state,
        user_states,
    })
}
