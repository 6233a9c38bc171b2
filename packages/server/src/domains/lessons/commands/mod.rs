//! Room commands.
//!
//! Every mutation of a live room flows through one `Command` variant. The
//! enum is closed on purpose: adding a variant without wiring its handler
//! into the dispatcher fails to compile instead of failing at runtime.

pub mod dispatcher;
pub mod permission;

pub use dispatcher::{CommandDispatcher, CommandPipeline};
pub use permission::{CommandGuard, PermissionChecker};

use crate::common::{LessonId, MediaId, UserId};

use super::models::{MediaPlayback, PollingOption, WhiteboardZoomState};

/// Requested shared material. `video_state` and `audio_state` are mutually
/// exclusive; the handler validates the assembled material.
#[derive(Debug, Clone)]
pub struct SharedMaterialRequest {
    pub media_id: MediaId,
    pub video_state: Option<MediaPlayback>,
    pub audio_state: Option<MediaPlayback>,
}

#[derive(Debug, Clone)]
pub struct ShareMaterial {
    pub commander_id: UserId,
    pub lesson_id: LessonId,
    /// `None` clears the shared material.
    pub material: Option<SharedMaterialRequest>,
}

#[derive(Debug, Clone)]
pub struct StopSharingMaterial {
    pub commander_id: UserId,
    pub lesson_id: LessonId,
}

#[derive(Debug, Clone)]
pub struct FoldHandAll {
    pub commander_id: UserId,
    pub lesson_id: LessonId,
}

#[derive(Debug, Clone)]
pub struct UpdateHandsUp {
    pub commander_id: UserId,
    pub lesson_id: LessonId,
    pub user_id: UserId,
    pub is_up: bool,
}

#[derive(Debug, Clone)]
pub struct ResetAllStates {
    pub commander_id: UserId,
    pub lesson_id: LessonId,
}

#[derive(Debug, Clone)]
pub struct UpdateAnnotation {
    pub commander_id: UserId,
    pub lesson_id: LessonId,
    pub user_ids: Vec<UserId>,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct DisableAllAnnotation {
    pub commander_id: UserId,
    pub lesson_id: LessonId,
}

#[derive(Debug, Clone)]
pub struct StartPolling {
    pub commander_id: UserId,
    pub lesson_id: LessonId,
    pub options: Vec<PollingOption>,
}

#[derive(Debug, Clone)]
pub struct StopPolling {
    pub commander_id: UserId,
    pub lesson_id: LessonId,
}

#[derive(Debug, Clone)]
pub struct EndPolling {
    pub commander_id: UserId,
    pub lesson_id: LessonId,
}

#[derive(Debug, Clone)]
pub struct SubmitPollingAnswer {
    pub commander_id: UserId,
    pub lesson_id: LessonId,
    pub user_id: UserId,
    pub answers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ResetPolling {
    pub commander_id: UserId,
    pub lesson_id: LessonId,
}

#[derive(Debug, Clone)]
pub struct RequestRecording {
    pub commander_id: UserId,
    pub lesson_id: LessonId,
}

#[derive(Debug, Clone)]
pub struct StopRecording {
    pub commander_id: UserId,
    pub lesson_id: LessonId,
}

#[derive(Debug, Clone)]
pub struct Spotlight {
    pub commander_id: UserId,
    pub lesson_id: LessonId,
    /// `None` clears the spotlight.
    pub spotlighted_user: Option<UserId>,
}

#[derive(Debug, Clone)]
pub struct WhiteboardZoom {
    pub commander_id: UserId,
    pub lesson_id: LessonId,
    pub state: WhiteboardZoomState,
}

#[derive(Debug, Clone)]
pub struct UpdateChat {
    pub commander_id: UserId,
    pub lesson_id: LessonId,
    pub user_ids: Vec<UserId>,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct ResetAllChat {
    pub commander_id: UserId,
    pub lesson_id: LessonId,
}

/// A request to change room or member state.
#[derive(Debug, Clone)]
pub enum Command {
    ShareMaterial(ShareMaterial),
    StopSharingMaterial(StopSharingMaterial),
    FoldHandAll(FoldHandAll),
    UpdateHandsUp(UpdateHandsUp),
    ResetAllStates(ResetAllStates),
    UpdateAnnotation(UpdateAnnotation),
    DisableAllAnnotation(DisableAllAnnotation),
    StartPolling(StartPolling),
    StopPolling(StopPolling),
    EndPolling(EndPolling),
    SubmitPollingAnswer(SubmitPollingAnswer),
    ResetPolling(ResetPolling),
    RequestRecording(RequestRecording),
    StopRecording(StopRecording),
    Spotlight(Spotlight),
    WhiteboardZoom(WhiteboardZoom),
    UpdateChat(UpdateChat),
    ResetAllChat(ResetAllChat),
}

impl Command {
    pub fn commander_id(&self) -> &UserId {
        match self {
            Command::ShareMaterial(cmd) => &cmd.commander_id,
            Command::StopSharingMaterial(cmd) => &cmd.commander_id,
            Command::FoldHandAll(cmd) => &cmd.commander_id,
            Command::UpdateHandsUp(cmd) => &cmd.commander_id,
            Command::ResetAllStates(cmd) => &cmd.commander_id,
            Command::UpdateAnnotation(cmd) => &cmd.commander_id,
            Command::DisableAllAnnotation(cmd) => &cmd.commander_id,
            Command::StartPolling(cmd) => &cmd.commander_id,
            Command::StopPolling(cmd) => &cmd.commander_id,
            Command::EndPolling(cmd) => &cmd.commander_id,
            Command::SubmitPollingAnswer(cmd) => &cmd.commander_id,
            Command::ResetPolling(cmd) => &cmd.commander_id,
            Command::RequestRecording(cmd) => &cmd.commander_id,
            Command::StopRecording(cmd) => &cmd.commander_id,
            Command::Spotlight(cmd) => &cmd.commander_id,
            Command::WhiteboardZoom(cmd) => &cmd.commander_id,
            Command::UpdateChat(cmd) => &cmd.commander_id,
            Command::ResetAllChat(cmd) => &cmd.commander_id,
        }
    }

    pub fn lesson_id(&self) -> &LessonId {
        match self {
            Command::ShareMaterial(cmd) => &cmd.lesson_id,
            Command::StopSharingMaterial(cmd) => &cmd.lesson_id,
            Command::FoldHandAll(cmd) => &cmd.lesson_id,
            Command::UpdateHandsUp(cmd) => &cmd.lesson_id,
            Command::ResetAllStates(cmd) => &cmd.lesson_id,
            Command::UpdateAnnotation(cmd) => &cmd.lesson_id,
            Command::DisableAllAnnotation(cmd) => &cmd.lesson_id,
            Command::StartPolling(cmd) => &cmd.lesson_id,
            Command::StopPolling(cmd) => &cmd.lesson_id,
            Command::EndPolling(cmd) => &cmd.lesson_id,
            Command::SubmitPollingAnswer(cmd) => &cmd.lesson_id,
            Command::ResetPolling(cmd) => &cmd.lesson_id,
            Command::RequestRecording(cmd) => &cmd.lesson_id,
            Command::StopRecording(cmd) => &cmd.lesson_id,
            Command::Spotlight(cmd) => &cmd.lesson_id,
            Command::WhiteboardZoom(cmd) => &cmd.lesson_id,
            Command::UpdateChat(cmd) => &cmd.lesson_id,
            Command::ResetAllChat(cmd) => &cmd.lesson_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::ShareMaterial(_) => "share_material",
            Command::StopSharingMaterial(_) => "stop_sharing_material",
            Command::FoldHandAll(_) => "fold_hand_all",
            Command::UpdateHandsUp(_) => "update_hands_up",
            Command::ResetAllStates(_) => "reset_all_states",
            Command::UpdateAnnotation(_) => "update_annotation",
            Command::DisableAllAnnotation(_) => "disable_all_annotation",
            Command::StartPolling(_) => "start_polling",
            Command::StopPolling(_) => "stop_polling",
            Command::EndPolling(_) => "end_polling",
            Command::SubmitPollingAnswer(_) => "submit_polling_answer",
            Command::ResetPolling(_) => "reset_polling",
            Command::RequestRecording(_) => "request_recording",
            Command::StopRecording(_) => "stop_recording",
            Command::Spotlight(_) => "spotlight",
            Command::WhiteboardZoom(_) => "whiteboard_zoom",
            Command::UpdateChat(_) => "update_chat",
            Command::ResetAllChat(_) => "reset_all_chat",
        }
    }
}
