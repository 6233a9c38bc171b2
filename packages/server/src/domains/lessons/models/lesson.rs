use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{CourseId, LessonGroupId, LessonId, UserId};

use super::room_state::RoomState;

/// A scheduled live lesson with its roster and room state document.
///
/// Lesson CRUD and scheduling live elsewhere; this crate only loads a lesson,
/// transitions `room_state` and writes it back under `room_state_version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub course_id: CourseId,
    pub lesson_group_id: LessonGroupId,
    pub teacher_ids: Vec<UserId>,
    pub learner_ids: Vec<UserId>,
    pub room_state: RoomState,
    /// Monotonic token bumped on every room state write; whole-document
    /// writes must present the version they read.
    pub room_state_version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lesson {
    /// A fresh lesson starts with an empty room state document.
    pub fn new(
        course_id: CourseId,
        lesson_group_id: LessonGroupId,
        teacher_ids: Vec<UserId>,
        learner_ids: Vec<UserId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: LessonId::new(),
            course_id,
            lesson_group_id,
            teacher_ids,
            learner_ids,
            room_state: RoomState::default(),
            room_state_version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_teacher(&self, user_id: &UserId) -> bool {
        self.teacher_ids.contains(user_id)
    }

    pub fn is_learner(&self, user_id: &UserId) -> bool {
        self.learner_ids.contains(user_id)
    }
}
