//! Storage contracts consumed by the command handlers.
//!
//! The engine never talks to a database directly: reads and writes go through
//! `RoomStore`/`RoomStoreTx`, keeping the Postgres implementation and the
//! in-memory test double interchangeable. One `RoomStoreTx` spans one
//! top-level command execution; dropping it without `commit` rolls everything
//! back.

pub mod postgres;

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;

use crate::common::{CourseId, LessonGroupId, LessonId, MediaId, UserId};

use super::models::{
    CurrentMaterial, Lesson, MemberState, MemberStateFilter, PollingArchive, RoomState, StateType,
    StateValue, WhiteboardZoomState,
};

/// Outcome of a versioned room state write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStateWrite {
    Committed,
    /// The stored version no longer matches what the caller read.
    Conflict,
}

#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Open the transaction a single command execution runs in.
    async fn begin(&self) -> Result<Box<dyn RoomStoreTx>>;

    async fn find_lesson(&self, lesson_id: &LessonId) -> Result<Option<Lesson>>;

    async fn member_states(&self, filter: &MemberStateFilter) -> Result<Vec<MemberState>>;

    /// External user-group lookup, consulted only for commanders outside the
    /// lesson roster.
    async fn user_group(&self, user_id: &UserId) -> Result<String>;
}

/// Transactional storage operations, grouped by the upstream contract they
/// serve. `commit` must be atomic: either every write since `begin` lands or
/// none do.
#[async_trait]
pub trait RoomStoreTx: Send {
    // Lessons
    async fn find_lesson(&mut self, lesson_id: &LessonId) -> Result<Option<Lesson>>;

    /// Whole-document room state write guarded by the version token.
    /// Implementations bump the version on success and report `Conflict` when
    /// `expected_version` no longer matches the stored one.
    async fn update_room_state(
        &mut self,
        lesson_id: &LessonId,
        state: &RoomState,
        expected_version: i64,
    ) -> Result<RoomStateWrite>;

    async fn grant_recording_permission(
        &mut self,
        lesson_id: &LessonId,
        creator: &UserId,
    ) -> Result<()>;

    async fn stop_recording(&mut self, lesson_id: &LessonId) -> Result<()>;

    // Lesson groups
    async fn lesson_group_media(
        &mut self,
        group_id: &LessonGroupId,
        course_id: &CourseId,
    ) -> Result<HashSet<MediaId>>;

    // Member states
    async fn member_state(
        &mut self,
        lesson_id: &LessonId,
        user_id: &UserId,
        state_type: StateType,
    ) -> Result<Option<MemberState>>;

    async fn member_states(&mut self, filter: &MemberStateFilter) -> Result<Vec<MemberState>>;

    async fn upsert_member_state(
        &mut self,
        lesson_id: &LessonId,
        user_id: &UserId,
        state_type: StateType,
        value: &StateValue,
    ) -> Result<()>;

    async fn upsert_member_state_for_users(
        &mut self,
        lesson_id: &LessonId,
        user_ids: &[UserId],
        state_type: StateType,
        value: &StateValue,
    ) -> Result<()>;

    /// Upsert `value` for every learner on the lesson roster.
    async fn upsert_all_member_state(
        &mut self,
        lesson_id: &LessonId,
        state_type: StateType,
        value: &StateValue,
    ) -> Result<()>;

    // Poll archives
    async fn create_polling_archive(&mut self, archive: &PollingArchive) -> Result<()>;

    // Room-level auxiliary state
    async fn set_spotlight(&mut self, lesson_id: &LessonId, user_id: &UserId) -> Result<()>;

    async fn clear_spotlight(&mut self, lesson_id: &LessonId) -> Result<()>;

    async fn upsert_whiteboard_zoom(
        &mut self,
        lesson_id: &LessonId,
        state: &WhiteboardZoomState,
    ) -> Result<()>;

    async fn upsert_current_material(
        &mut self,
        lesson_id: &LessonId,
        material: Option<&CurrentMaterial>,
    ) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;
}
