//! Share material handlers.

use chrono::Utc;
use tracing::info;

use super::super::commands::{ShareMaterial, StopSharingMaterial};
use super::super::error::LessonError;
use super::super::models::CurrentMaterial;
use super::super::store::RoomStoreTx;
use super::require_lesson;

/// Share a material with the room, or clear the shared material when the
/// command carries no payload. The requested media must belong to the media
/// set of the lesson's group.
pub async fn share_material(
    cmd: &ShareMaterial,
    tx: &mut dyn RoomStoreTx,
) -> Result<(), LessonError> {
    let lesson = require_lesson(tx, &cmd.lesson_id).await?;

    let Some(request) = &cmd.material else {
        info!("Clearing shared material in lesson {}", cmd.lesson_id);
        tx.upsert_current_material(&cmd.lesson_id, None).await?;
        return Ok(());
    };

    let media_ids = tx
        .lesson_group_media(&lesson.lesson_group_id, &lesson.course_id)
        .await?;
    if !media_ids.contains(&request.media_id) {
        return Err(LessonError::MediaNotInLesson {
            media_id: request.media_id,
            lesson_id: cmd.lesson_id,
        });
    }

    let material = CurrentMaterial {
        media_id: request.media_id,
        updated_at: Utc::now(),
        video_state: request.video_state.clone(),
        audio_state: request.audio_state.clone(),
    };
    material.validate()?;

    info!(
        "Sharing media {} in lesson {}",
        request.media_id, cmd.lesson_id
    );
    tx.upsert_current_material(&cmd.lesson_id, Some(&material))
        .await?;
    Ok(())
}

/// Stopping is sharing with an empty payload.
pub async fn stop_sharing_material(
    cmd: &StopSharingMaterial,
    tx: &mut dyn RoomStoreTx,
) -> Result<(), LessonError> {
    let clear = ShareMaterial {
        commander_id: cmd.commander_id,
        lesson_id: cmd.lesson_id,
        material: None,
    };
    share_material(&clear, tx).await
}
