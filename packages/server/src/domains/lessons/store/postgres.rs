//! Postgres-backed room store.
//!
//! The room state document and the whiteboard zoom state are JSONB columns;
//! rosters and media sets are uuid arrays. Every write issued through a
//! `PgRoomStoreTx` rides one `sqlx` transaction. Field-level room state
//! updates (material, recording) also bump `room_state_version`, so a
//! concurrent whole-document write observes them as a conflict.

use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use crate::common::{CourseId, LessonGroupId, LessonId, MediaId, UserId};
use crate::config::Config;

use super::super::models::{
    CurrentMaterial, Lesson, MemberState, MemberStateFilter, PollingArchive, Recording, RoomState,
    StateType, StateValue, WhiteboardZoomState,
};
use super::{RoomStateWrite, RoomStore, RoomStoreTx};

/// Embedded schema migrations (`migrations/`).
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

pub struct PgRoomStore {
    pool: PgPool,
}

impl PgRoomStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with the environment configuration and run pending migrations.
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_db_connections)
            .connect(&config.database_url)
            .await
            .context("connecting to postgres")?;
        MIGRATOR.run(&pool).await.context("running migrations")?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

pub struct PgRoomStoreTx {
    tx: Transaction<'static, Postgres>,
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct LessonRow {
    id: LessonId,
    course_id: CourseId,
    lesson_group_id: LessonGroupId,
    teacher_ids: Vec<UserId>,
    learner_ids: Vec<UserId>,
    room_state: Json<RoomState>,
    room_state_version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LessonRow> for Lesson {
    fn from(row: LessonRow) -> Self {
        Self {
            id: row.id,
            course_id: row.course_id,
            lesson_group_id: row.lesson_group_id,
            teacher_ids: row.teacher_ids,
            learner_ids: row.learner_ids,
            room_state: row.room_state.0,
            room_state_version: row.room_state_version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MemberStateRow {
    lesson_id: LessonId,
    user_id: UserId,
    state_type: String,
    bool_value: bool,
    string_array_value: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MemberStateRow> for MemberState {
    type Error = anyhow::Error;

    fn try_from(row: MemberStateRow) -> Result<Self> {
        Ok(Self {
            lesson_id: row.lesson_id,
            user_id: row.user_id,
            state_type: row.state_type.parse()?,
            bool_value: row.bool_value,
            string_array_value: row.string_array_value,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ============================================================================
// Shared queries
// ============================================================================

const LESSON_COLUMNS: &str = "id, course_id, lesson_group_id, teacher_ids, learner_ids, \
     room_state, room_state_version, created_at, updated_at";

async fn fetch_lesson<'e, E>(executor: E, lesson_id: &LessonId) -> Result<Option<Lesson>>
where
    E: sqlx::PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, LessonRow>(&format!(
        "SELECT {LESSON_COLUMNS} FROM lessons WHERE id = $1"
    ))
    .bind(lesson_id)
    .fetch_optional(executor)
    .await?;
    Ok(row.map(Lesson::from))
}

async fn fetch_member_states<'e, E>(
    executor: E,
    filter: &MemberStateFilter,
) -> Result<Vec<MemberState>>
where
    E: sqlx::PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, MemberStateRow>(
        r#"
        SELECT lesson_id, user_id, state_type, bool_value, string_array_value,
               created_at, updated_at
        FROM lesson_member_states
        WHERE lesson_id = $1
          AND ($2::uuid[] IS NULL OR user_id = ANY($2))
          AND ($3::text IS NULL OR state_type = $3)
        ORDER BY user_id, state_type
        "#,
    )
    .bind(filter.lesson_id)
    .bind(filter.user_ids.as_deref())
    .bind(filter.state_type.map(|t| t.to_string()))
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(MemberState::try_from).collect()
}

// ============================================================================
// RoomStore
// ============================================================================

#[async_trait]
impl RoomStore for PgRoomStore {
    async fn begin(&self) -> Result<Box<dyn RoomStoreTx>> {
        let tx = self.pool.begin().await.context("opening transaction")?;
        Ok(Box::new(PgRoomStoreTx { tx }))
    }

    async fn find_lesson(&self, lesson_id: &LessonId) -> Result<Option<Lesson>> {
        fetch_lesson(&self.pool, lesson_id).await
    }

    async fn member_states(&self, filter: &MemberStateFilter) -> Result<Vec<MemberState>> {
        fetch_member_states(&self.pool, filter).await
    }

    async fn user_group(&self, user_id: &UserId) -> Result<String> {
        let group: Option<String> =
            sqlx::query_scalar("SELECT user_group FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        match group {
            Some(group) => Ok(group),
            None => bail!("user {} not found", user_id),
        }
    }
}

// ============================================================================
// RoomStoreTx
// ============================================================================

#[async_trait]
impl RoomStoreTx for PgRoomStoreTx {
    async fn find_lesson(&mut self, lesson_id: &LessonId) -> Result<Option<Lesson>> {
        fetch_lesson(&mut *self.tx, lesson_id).await
    }

    async fn update_room_state(
        &mut self,
        lesson_id: &LessonId,
        state: &RoomState,
        expected_version: i64,
    ) -> Result<RoomStateWrite> {
        let result = sqlx::query(
            r#"
            UPDATE lessons
            SET room_state = $2,
                room_state_version = room_state_version + 1,
                updated_at = NOW()
            WHERE id = $1 AND room_state_version = $3
            "#,
        )
        .bind(lesson_id)
        .bind(Json(state))
        .bind(expected_version)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 1 {
            Ok(RoomStateWrite::Committed)
        } else {
            Ok(RoomStateWrite::Conflict)
        }
    }

    async fn grant_recording_permission(
        &mut self,
        lesson_id: &LessonId,
        creator: &UserId,
    ) -> Result<()> {
        let recording = Recording {
            is_recording: true,
            creator: Some(*creator),
        };
        let result = sqlx::query(
            r#"
            UPDATE lessons
            SET room_state = jsonb_set(room_state, '{recording}', $2, true),
                room_state_version = room_state_version + 1,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(lesson_id)
        .bind(Json(recording))
        .execute(&mut *self.tx)
        .await?;
        if result.rows_affected() == 0 {
            bail!("lesson {} not found", lesson_id);
        }
        Ok(())
    }

    async fn stop_recording(&mut self, lesson_id: &LessonId) -> Result<()> {
        let recording = Recording {
            is_recording: false,
            creator: None,
        };
        let result = sqlx::query(
            r#"
            UPDATE lessons
            SET room_state = jsonb_set(room_state, '{recording}', $2, true),
                room_state_version = room_state_version + 1,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(lesson_id)
        .bind(Json(recording))
        .execute(&mut *self.tx)
        .await?;
        if result.rows_affected() == 0 {
            bail!("lesson {} not found", lesson_id);
        }
        Ok(())
    }

    async fn lesson_group_media(
        &mut self,
        group_id: &LessonGroupId,
        course_id: &CourseId,
    ) -> Result<HashSet<MediaId>> {
        let media_ids: Option<Vec<MediaId>> = sqlx::query_scalar(
            "SELECT media_ids FROM lesson_groups WHERE id = $1 AND course_id = $2",
        )
        .bind(group_id)
        .bind(course_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        match media_ids {
            Some(media_ids) => Ok(media_ids.into_iter().collect()),
            None => bail!("lesson group {} not found in course {}", group_id, course_id),
        }
    }

    async fn member_state(
        &mut self,
        lesson_id: &LessonId,
        user_id: &UserId,
        state_type: StateType,
    ) -> Result<Option<MemberState>> {
        // FOR UPDATE: the caller checks this row before writing it, so the
        // read must hold the row lock until the transaction ends.
        let row = sqlx::query_as::<_, MemberStateRow>(
            r#"
            SELECT lesson_id, user_id, state_type, bool_value, string_array_value,
                   created_at, updated_at
            FROM lesson_member_states
            WHERE lesson_id = $1 AND user_id = $2 AND state_type = $3
            FOR UPDATE
            "#,
        )
        .bind(lesson_id)
        .bind(user_id)
        .bind(state_type.to_string())
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(MemberState::try_from).transpose()
    }

    async fn member_states(&mut self, filter: &MemberStateFilter) -> Result<Vec<MemberState>> {
        fetch_member_states(&mut *self.tx, filter).await
    }

    async fn upsert_member_state(
        &mut self,
        lesson_id: &LessonId,
        user_id: &UserId,
        state_type: StateType,
        value: &StateValue,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO lesson_member_states
                (lesson_id, user_id, state_type, bool_value, string_array_value)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (lesson_id, user_id, state_type) DO UPDATE
            SET bool_value = EXCLUDED.bool_value,
                string_array_value = EXCLUDED.string_array_value,
                updated_at = NOW()
            "#,
        )
        .bind(lesson_id)
        .bind(user_id)
        .bind(state_type.to_string())
        .bind(value.bool_value)
        .bind(&value.string_array_value)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn upsert_member_state_for_users(
        &mut self,
        lesson_id: &LessonId,
        user_ids: &[UserId],
        state_type: StateType,
        value: &StateValue,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO lesson_member_states
                (lesson_id, user_id, state_type, bool_value, string_array_value)
            SELECT $1, unnest($2::uuid[]), $3, $4, $5
            ON CONFLICT (lesson_id, user_id, state_type) DO UPDATE
            SET bool_value = EXCLUDED.bool_value,
                string_array_value = EXCLUDED.string_array_value,
                updated_at = NOW()
            "#,
        )
        .bind(lesson_id)
        .bind(user_ids)
        .bind(state_type.to_string())
        .bind(value.bool_value)
        .bind(&value.string_array_value)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn upsert_all_member_state(
        &mut self,
        lesson_id: &LessonId,
        state_type: StateType,
        value: &StateValue,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO lesson_member_states
                (lesson_id, user_id, state_type, bool_value, string_array_value)
            SELECT l.id, unnest(l.learner_ids), $2, $3, $4
            FROM lessons l
            WHERE l.id = $1
            ON CONFLICT (lesson_id, user_id, state_type) DO UPDATE
            SET bool_value = EXCLUDED.bool_value,
                string_array_value = EXCLUDED.string_array_value,
                updated_at = NOW()
            "#,
        )
        .bind(lesson_id)
        .bind(state_type.to_string())
        .bind(value.bool_value)
        .bind(&value.string_array_value)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn create_polling_archive(&mut self, archive: &PollingArchive) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO polling_archives
                (id, lesson_id, options, user_answers, created_at, stopped_at, ended_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(archive.id)
        .bind(archive.lesson_id)
        .bind(Json(&archive.options))
        .bind(Json(&archive.user_answers))
        .bind(archive.created_at)
        .bind(archive.stopped_at)
        .bind(archive.ended_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn set_spotlight(&mut self, lesson_id: &LessonId, user_id: &UserId) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO lesson_spotlights (lesson_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (lesson_id) DO UPDATE
            SET user_id = EXCLUDED.user_id, updated_at = NOW()
            "#,
        )
        .bind(lesson_id)
        .bind(user_id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn clear_spotlight(&mut self, lesson_id: &LessonId) -> Result<()> {
        sqlx::query("DELETE FROM lesson_spotlights WHERE lesson_id = $1")
            .bind(lesson_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn upsert_whiteboard_zoom(
        &mut self,
        lesson_id: &LessonId,
        state: &WhiteboardZoomState,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO whiteboard_zoom_states (lesson_id, state)
            VALUES ($1, $2)
            ON CONFLICT (lesson_id) DO UPDATE
            SET state = EXCLUDED.state, updated_at = NOW()
            "#,
        )
        .bind(lesson_id)
        .bind(Json(state))
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn upsert_current_material(
        &mut self,
        lesson_id: &LessonId,
        material: Option<&CurrentMaterial>,
    ) -> Result<()> {
        let result = match material {
            Some(material) => {
                sqlx::query(
                    r#"
                    UPDATE lessons
                    SET room_state = jsonb_set(room_state, '{current_material}', $2, true),
                        room_state_version = room_state_version + 1,
                        updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(lesson_id)
                .bind(Json(material))
                .execute(&mut *self.tx)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    UPDATE lessons
                    SET room_state = room_state - 'current_material',
                        room_state_version = room_state_version + 1,
                        updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(lesson_id)
                .execute(&mut *self.tx)
                .await?
            }
        };
        if result.rows_affected() == 0 {
            bail!("lesson {} not found", lesson_id);
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.context("committing transaction")?;
        Ok(())
    }
}
