//! Recording handlers.
//!
//! Recording writes are unconditional overwrites; there is no prior-state
//! precondition on either transition.

use tracing::info;

use super::super::commands::{RequestRecording, StopRecording};
use super::super::error::LessonError;
use super::super::store::RoomStoreTx;

pub async fn request_recording(
    cmd: &RequestRecording,
    tx: &mut dyn RoomStoreTx,
) -> Result<(), LessonError> {
    info!(
        "User {} starts recording lesson {}",
        cmd.commander_id, cmd.lesson_id
    );
    tx.grant_recording_permission(&cmd.lesson_id, &cmd.commander_id)
        .await?;
    Ok(())
}

pub async fn stop_recording(
    cmd: &StopRecording,
    tx: &mut dyn RoomStoreTx,
) -> Result<(), LessonError> {
    info!("Stopping recording of lesson {}", cmd.lesson_id);
    tx.stop_recording(&cmd.lesson_id).await?;
    Ok(())
}
