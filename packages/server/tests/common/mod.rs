// Shared test harness: a seeded in-memory room with the full command
// pipeline (permission checker + dispatcher) in front of it.
#![allow(dead_code)]

use std::sync::Arc;

use classroom_core::common::{CourseId, LessonGroupId, LessonId, MediaId, UserId};
use classroom_core::domains::lessons::commands::{
    Command, CommandDispatcher, CommandPipeline, PermissionChecker,
};
use classroom_core::domains::lessons::models::{Lesson, PollingOption};
use classroom_core::domains::lessons::LessonError;
use classroom_core::kernel::MemoryRoomStore;

pub struct Room {
    pub store: Arc<MemoryRoomStore>,
    pub pipeline: CommandPipeline,
    pub lesson_id: LessonId,
    pub teachers: Vec<UserId>,
    pub learners: Vec<UserId>,
    pub media_id: MediaId,
}

impl Room {
    pub async fn execute(&self, command: Command) -> Result<(), LessonError> {
        self.pipeline.execute(&command).await
    }

    pub fn teacher(&self) -> UserId {
        self.teachers[0]
    }

    pub fn learner(&self, index: usize) -> UserId {
        self.learners[index]
    }
}

/// A lesson room with the given roster sizes and one media item in its
/// lesson group.
pub fn classroom(teacher_count: usize, learner_count: usize) -> Room {
    classroom_with_user_groups(teacher_count, learner_count, &[])
}

/// Like `classroom`, additionally seeding external user-group lookups for
/// commanders outside the roster.
pub fn classroom_with_user_groups(
    teacher_count: usize,
    learner_count: usize,
    user_groups: &[(UserId, &str)],
) -> Room {
    let teachers: Vec<UserId> = (0..teacher_count).map(|_| UserId::new()).collect();
    let learners: Vec<UserId> = (0..learner_count).map(|_| UserId::new()).collect();
    let course_id = CourseId::new();
    let group_id = LessonGroupId::new();
    let media_id = MediaId::new();

    let lesson = Lesson::new(course_id, group_id, teachers.clone(), learners.clone());
    let lesson_id = lesson.id;

    let mut store = MemoryRoomStore::new()
        .with_lesson(lesson)
        .with_lesson_group(group_id, course_id, [media_id]);
    for (user_id, group) in user_groups {
        store = store.with_user_group(*user_id, group);
    }
    let store = Arc::new(store);

    let dispatcher = CommandDispatcher::new(store.clone());
    let pipeline = CommandPipeline::new(dispatcher)
        .with_guard(Arc::new(PermissionChecker::new(store.clone())));

    Room {
        store,
        pipeline,
        lesson_id,
        teachers,
        learners,
        media_id,
    }
}

pub fn poll_options(spec: &[(&str, bool)]) -> Vec<PollingOption> {
    spec.iter()
        .map(|(answer, is_correct)| PollingOption {
            answer: answer.to_string(),
            is_correct: *is_correct,
        })
        .collect()
}
