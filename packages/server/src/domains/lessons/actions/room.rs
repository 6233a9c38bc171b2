//! Room-level handlers: spotlight, whiteboard zoom and the composite reset.

use tracing::info;

use super::super::commands::{
    DisableAllAnnotation, FoldHandAll, ResetAllChat, ResetAllStates, ResetPolling, ShareMaterial,
    Spotlight, WhiteboardZoom,
};
use super::super::error::LessonError;
use super::super::models::WhiteboardZoomState;
use super::super::store::RoomStoreTx;
use super::{material, member_states, polling};

/// Spotlight a user, or clear the spotlight when no user is given. Whether
/// the user belongs to the lesson is deliberately not checked here.
pub async fn spotlight(cmd: &Spotlight, tx: &mut dyn RoomStoreTx) -> Result<(), LessonError> {
    match &cmd.spotlighted_user {
        Some(user_id) => tx.set_spotlight(&cmd.lesson_id, user_id).await?,
        None => tx.clear_spotlight(&cmd.lesson_id).await?,
    }
    Ok(())
}

pub async fn whiteboard_zoom(
    cmd: &WhiteboardZoom,
    tx: &mut dyn RoomStoreTx,
) -> Result<(), LessonError> {
    tx.upsert_whiteboard_zoom(&cmd.lesson_id, &cmd.state).await?;
    Ok(())
}

/// Macro command: return the whole room to its default state. Every
/// sub-handler runs on the same transaction, so a single failure rolls back
/// all of it.
pub async fn reset_all_states(
    cmd: &ResetAllStates,
    tx: &mut dyn RoomStoreTx,
) -> Result<(), LessonError> {
    info!("Resetting all room states for lesson {}", cmd.lesson_id);

    material::share_material(
        &ShareMaterial {
            commander_id: cmd.commander_id,
            lesson_id: cmd.lesson_id,
            material: None,
        },
        tx,
    )
    .await?;
    member_states::disable_all_annotation(
        &DisableAllAnnotation {
            commander_id: cmd.commander_id,
            lesson_id: cmd.lesson_id,
        },
        tx,
    )
    .await?;
    member_states::fold_hand_all(
        &FoldHandAll {
            commander_id: cmd.commander_id,
            lesson_id: cmd.lesson_id,
        },
        tx,
    )
    .await?;
    polling::reset_polling(
        &ResetPolling {
            commander_id: cmd.commander_id,
            lesson_id: cmd.lesson_id,
        },
        tx,
    )
    .await?;
    spotlight(
        &Spotlight {
            commander_id: cmd.commander_id,
            lesson_id: cmd.lesson_id,
            spotlighted_user: None,
        },
        tx,
    )
    .await?;
    whiteboard_zoom(
        &WhiteboardZoom {
            commander_id: cmd.commander_id,
            lesson_id: cmd.lesson_id,
            state: WhiteboardZoomState::default(),
        },
        tx,
    )
    .await?;
    member_states::reset_all_chat(
        &ResetAllChat {
            commander_id: cmd.commander_id,
            lesson_id: cmd.lesson_id,
        },
        tx,
    )
    .await?;
    tx.stop_recording(&cmd.lesson_id).await?;
    Ok(())
}
