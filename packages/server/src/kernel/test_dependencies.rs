// MemoryRoomStore - in-memory store double for tests
//
// Mirrors the transactional contract of the Postgres store: a transaction
// works on a copy of the shared state and publishes it on commit, so a
// transaction dropped without commit rolls back. Committed write operations
// are counted for assertions about no-op commands.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::Utc;

use crate::common::{CourseId, LessonGroupId, LessonId, MediaId, UserId};
use crate::domains::lessons::models::{
    CurrentMaterial, Lesson, MemberState, MemberStateFilter, PollingArchive, Recording, RoomState,
    StateType, StateValue, WhiteboardZoomState,
};
use crate::domains::lessons::store::{RoomStateWrite, RoomStore, RoomStoreTx};

#[derive(Default, Clone)]
struct MemoryState {
    lessons: HashMap<LessonId, Lesson>,
    lesson_groups: HashMap<(LessonGroupId, CourseId), HashSet<MediaId>>,
    member_states: HashMap<(LessonId, UserId, StateType), MemberState>,
    polling_archives: Vec<PollingArchive>,
    spotlights: HashMap<LessonId, UserId>,
    whiteboard_zoom: HashMap<LessonId, WhiteboardZoomState>,
    user_groups: HashMap<UserId, String>,
}

pub struct MemoryRoomStore {
    state: Arc<Mutex<MemoryState>>,
    committed_writes: Arc<AtomicU64>,
}

impl MemoryRoomStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            committed_writes: Arc::new(AtomicU64::new(0)),
        }
    }

    // Seeding builders

    pub fn with_lesson(self, lesson: Lesson) -> Self {
        self.state.lock().unwrap().lessons.insert(lesson.id, lesson);
        self
    }

    pub fn with_lesson_group(
        self,
        group_id: LessonGroupId,
        course_id: CourseId,
        media_ids: impl IntoIterator<Item = MediaId>,
    ) -> Self {
        self.state
            .lock()
            .unwrap()
            .lesson_groups
            .insert((group_id, course_id), media_ids.into_iter().collect());
        self
    }

    pub fn with_user_group(self, user_id: UserId, group: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .user_groups
            .insert(user_id, group.to_string());
        self
    }

    // Inspection helpers for assertions

    pub fn lesson(&self, lesson_id: &LessonId) -> Option<Lesson> {
        self.state.lock().unwrap().lessons.get(lesson_id).cloned()
    }

    pub fn member_state(
        &self,
        lesson_id: &LessonId,
        user_id: &UserId,
        state_type: StateType,
    ) -> Option<MemberState> {
        self.state
            .lock()
            .unwrap()
            .member_states
            .get(&(*lesson_id, *user_id, state_type))
            .cloned()
    }

    pub fn polling_archives(&self) -> Vec<PollingArchive> {
        self.state.lock().unwrap().polling_archives.clone()
    }

    pub fn spotlight(&self, lesson_id: &LessonId) -> Option<UserId> {
        self.state.lock().unwrap().spotlights.get(lesson_id).copied()
    }

    pub fn whiteboard_zoom(&self, lesson_id: &LessonId) -> Option<WhiteboardZoomState> {
        self.state
            .lock()
            .unwrap()
            .whiteboard_zoom
            .get(lesson_id)
            .cloned()
    }

    /// Number of committed write operations across all transactions.
    pub fn write_count(&self) -> u64 {
        self.committed_writes.load(Ordering::SeqCst)
    }
}

struct MemoryTx {
    shared: Arc<Mutex<MemoryState>>,
    committed_writes: Arc<AtomicU64>,
    working: MemoryState,
    writes: u64,
}

impl MemoryTx {
    fn lesson_mut(&mut self, lesson_id: &LessonId) -> Result<&mut Lesson> {
        self.working
            .lessons
            .get_mut(lesson_id)
            .ok_or_else(|| anyhow!("lesson {} not found", lesson_id))
    }

    fn upsert_row(
        &mut self,
        lesson_id: &LessonId,
        user_id: &UserId,
        state_type: StateType,
        value: &StateValue,
    ) {
        let now = Utc::now();
        self.working
            .member_states
            .entry((*lesson_id, *user_id, state_type))
            .and_modify(|row| {
                row.bool_value = value.bool_value;
                row.string_array_value = value.string_array_value.clone();
                row.updated_at = now;
            })
            .or_insert_with(|| MemberState {
                lesson_id: *lesson_id,
                user_id: *user_id,
                state_type,
                bool_value: value.bool_value,
                string_array_value: value.string_array_value.clone(),
                created_at: now,
                updated_at: now,
            });
        self.writes += 1;
    }
}

#[async_trait]
impl RoomStore for MemoryRoomStore {
    async fn begin(&self) -> Result<Box<dyn RoomStoreTx>> {
        let working = self.state.lock().unwrap().clone();
        Ok(Box::new(MemoryTx {
            shared: self.state.clone(),
            committed_writes: self.committed_writes.clone(),
            working,
            writes: 0,
        }))
    }

    async fn find_lesson(&self, lesson_id: &LessonId) -> Result<Option<Lesson>> {
        Ok(self.state.lock().unwrap().lessons.get(lesson_id).cloned())
    }

    async fn member_states(&self, filter: &MemberStateFilter) -> Result<Vec<MemberState>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<MemberState> = state
            .member_states
            .values()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect();
        rows.sort_by_key(|row| (row.user_id, row.state_type.to_string()));
        Ok(rows)
    }

    async fn user_group(&self, user_id: &UserId) -> Result<String> {
        match self.state.lock().unwrap().user_groups.get(user_id) {
            Some(group) => Ok(group.clone()),
            None => bail!("user {} not found", user_id),
        }
    }
}

#[async_trait]
impl RoomStoreTx for MemoryTx {
    async fn find_lesson(&mut self, lesson_id: &LessonId) -> Result<Option<Lesson>> {
        Ok(self.working.lessons.get(lesson_id).cloned())
    }

    async fn update_room_state(
        &mut self,
        lesson_id: &LessonId,
        state: &RoomState,
        expected_version: i64,
    ) -> Result<RoomStateWrite> {
        let new_state = state.clone();
        let lesson = self.lesson_mut(lesson_id)?;
        if lesson.room_state_version != expected_version {
            return Ok(RoomStateWrite::Conflict);
        }
        lesson.room_state = new_state;
        lesson.room_state_version += 1;
        lesson.updated_at = Utc::now();
        self.writes += 1;
        Ok(RoomStateWrite::Committed)
    }

    async fn grant_recording_permission(
        &mut self,
        lesson_id: &LessonId,
        creator: &UserId,
    ) -> Result<()> {
        let creator = *creator;
        let lesson = self.lesson_mut(lesson_id)?;
        lesson.room_state.recording = Some(Recording {
            is_recording: true,
            creator: Some(creator),
        });
        lesson.room_state_version += 1;
        lesson.updated_at = Utc::now();
        self.writes += 1;
        Ok(())
    }

    async fn stop_recording(&mut self, lesson_id: &LessonId) -> Result<()> {
        let lesson = self.lesson_mut(lesson_id)?;
        lesson.room_state.recording = Some(Recording {
            is_recording: false,
            creator: None,
        });
        lesson.room_state_version += 1;
        lesson.updated_at = Utc::now();
        self.writes += 1;
        Ok(())
    }

    async fn lesson_group_media(
        &mut self,
        group_id: &LessonGroupId,
        course_id: &CourseId,
    ) -> Result<HashSet<MediaId>> {
        match self.working.lesson_groups.get(&(*group_id, *course_id)) {
            Some(media_ids) => Ok(media_ids.clone()),
            None => bail!("lesson group {} not found in course {}", group_id, course_id),
        }
    }

    async fn member_state(
        &mut self,
        lesson_id: &LessonId,
        user_id: &UserId,
        state_type: StateType,
    ) -> Result<Option<MemberState>> {
        Ok(self
            .working
            .member_states
            .get(&(*lesson_id, *user_id, state_type))
            .cloned())
    }

    async fn member_states(&mut self, filter: &MemberStateFilter) -> Result<Vec<MemberState>> {
        let mut rows: Vec<MemberState> = self
            .working
            .member_states
            .values()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect();
        rows.sort_by_key(|row| (row.user_id, row.state_type.to_string()));
        Ok(rows)
    }

    async fn upsert_member_state(
        &mut self,
        lesson_id: &LessonId,
        user_id: &UserId,
        state_type: StateType,
        value: &StateValue,
    ) -> Result<()> {
        self.upsert_row(lesson_id, user_id, state_type, value);
        Ok(())
    }

    async fn upsert_member_state_for_users(
        &mut self,
        lesson_id: &LessonId,
        user_ids: &[UserId],
        state_type: StateType,
        value: &StateValue,
    ) -> Result<()> {
        for user_id in user_ids {
            self.upsert_row(lesson_id, user_id, state_type, value);
        }
        Ok(())
    }

    async fn upsert_all_member_state(
        &mut self,
        lesson_id: &LessonId,
        state_type: StateType,
        value: &StateValue,
    ) -> Result<()> {
        let learner_ids = self.lesson_mut(lesson_id)?.learner_ids.clone();
        for user_id in learner_ids {
            self.upsert_row(lesson_id, &user_id, state_type, value);
        }
        Ok(())
    }

    async fn create_polling_archive(&mut self, archive: &PollingArchive) -> Result<()> {
        self.working.polling_archives.push(archive.clone());
        self.writes += 1;
        Ok(())
    }

    async fn set_spotlight(&mut self, lesson_id: &LessonId, user_id: &UserId) -> Result<()> {
        self.working.spotlights.insert(*lesson_id, *user_id);
        self.writes += 1;
        Ok(())
    }

    async fn clear_spotlight(&mut self, lesson_id: &LessonId) -> Result<()> {
        self.working.spotlights.remove(lesson_id);
        self.writes += 1;
        Ok(())
    }

    async fn upsert_whiteboard_zoom(
        &mut self,
        lesson_id: &LessonId,
        state: &WhiteboardZoomState,
    ) -> Result<()> {
        self.working
            .whiteboard_zoom
            .insert(*lesson_id, state.clone());
        self.writes += 1;
        Ok(())
    }

    async fn upsert_current_material(
        &mut self,
        lesson_id: &LessonId,
        material: Option<&CurrentMaterial>,
    ) -> Result<()> {
        let material = material.cloned();
        let lesson = self.lesson_mut(lesson_id)?;
        lesson.room_state.current_material = material;
        lesson.room_state_version += 1;
        lesson.updated_at = Utc::now();
        self.writes += 1;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryTx {
            shared,
            committed_writes,
            working,
            writes,
        } = *self;
        *shared.lock().unwrap() = working;
        committed_writes.fetch_add(writes, Ordering::SeqCst);
        Ok(())
    }
}
