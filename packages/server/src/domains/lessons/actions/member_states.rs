//! Hand-raise, annotation and chat permission handlers.

use tracing::info;

use super::super::commands::{
    DisableAllAnnotation, FoldHandAll, ResetAllChat, UpdateAnnotation, UpdateChat, UpdateHandsUp,
};
use super::super::error::LessonError;
use super::super::models::member_state::{ANNOTATION_DISABLED, CHAT_ENABLED, HANDS_DOWN};
use super::super::models::{StateType, StateValue};
use super::super::store::RoomStoreTx;

pub async fn update_hands_up(
    cmd: &UpdateHandsUp,
    tx: &mut dyn RoomStoreTx,
) -> Result<(), LessonError> {
    tx.upsert_member_state(
        &cmd.lesson_id,
        &cmd.user_id,
        StateType::HandsUp,
        &StateValue::flag(cmd.is_up),
    )
    .await?;
    Ok(())
}

pub async fn fold_hand_all(
    cmd: &FoldHandAll,
    tx: &mut dyn RoomStoreTx,
) -> Result<(), LessonError> {
    info!("Folding all hands in lesson {}", cmd.lesson_id);
    tx.upsert_all_member_state(&cmd.lesson_id, StateType::HandsUp, &HANDS_DOWN)
        .await?;
    Ok(())
}

pub async fn update_annotation(
    cmd: &UpdateAnnotation,
    tx: &mut dyn RoomStoreTx,
) -> Result<(), LessonError> {
    tx.upsert_member_state_for_users(
        &cmd.lesson_id,
        &cmd.user_ids,
        StateType::Annotation,
        &StateValue::flag(cmd.enabled),
    )
    .await?;
    Ok(())
}

pub async fn disable_all_annotation(
    cmd: &DisableAllAnnotation,
    tx: &mut dyn RoomStoreTx,
) -> Result<(), LessonError> {
    info!("Disabling annotation for lesson {}", cmd.lesson_id);
    tx.upsert_all_member_state(&cmd.lesson_id, StateType::Annotation, &ANNOTATION_DISABLED)
        .await?;
    Ok(())
}

pub async fn update_chat(cmd: &UpdateChat, tx: &mut dyn RoomStoreTx) -> Result<(), LessonError> {
    tx.upsert_member_state_for_users(
        &cmd.lesson_id,
        &cmd.user_ids,
        StateType::Chat,
        &StateValue::flag(cmd.enabled),
    )
    .await?;
    Ok(())
}

pub async fn reset_all_chat(
    cmd: &ResetAllChat,
    tx: &mut dyn RoomStoreTx,
) -> Result<(), LessonError> {
    info!("Resetting chat permissions for lesson {}", cmd.lesson_id);
    tx.upsert_all_member_state(&cmd.lesson_id, StateType::Chat, &CHAT_ENABLED)
        .await?;
    Ok(())
}
