//! Command dispatch.

use std::sync::Arc;

use tracing::{info, warn};

use super::super::actions::{material, member_states, polling, recording, room};
use super::super::error::LessonError;
use super::super::store::{RoomStore, RoomStoreTx};
use super::{Command, CommandGuard};

/// Resolves every command to its handler inside a single store transaction.
pub struct CommandDispatcher {
    store: Arc<dyn RoomStore>,
}

impl CommandDispatcher {
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    /// Execute one command: one transaction, committed on success, rolled
    /// back on any error.
    pub async fn execute(&self, command: &Command) -> Result<(), LessonError> {
        info!(
            "Executing {} for lesson {}",
            command.name(),
            command.lesson_id()
        );
        let mut tx = self.store.begin().await?;
        match dispatch(command, tx.as_mut()).await {
            Ok(()) => {
                tx.commit().await?;
                Ok(())
            }
            Err(err) => {
                warn!(
                    "{} failed for lesson {}: {}",
                    command.name(),
                    command.lesson_id(),
                    err
                );
                Err(err)
            }
        }
    }
}

/// The exhaustive variant-to-handler mapping. A new `Command` variant without
/// an arm here is a compile error.
async fn dispatch(command: &Command, tx: &mut dyn RoomStoreTx) -> Result<(), LessonError> {
    match command {
        Command::ShareMaterial(cmd) => material::share_material(cmd, tx).await,
        Command::StopSharingMaterial(cmd) => material::stop_sharing_material(cmd, tx).await,
        Command::FoldHandAll(cmd) => member_states::fold_hand_all(cmd, tx).await,
        Command::UpdateHandsUp(cmd) => member_states::update_hands_up(cmd, tx).await,
        Command::ResetAllStates(cmd) => room::reset_all_states(cmd, tx).await,
        Command::UpdateAnnotation(cmd) => member_states::update_annotation(cmd, tx).await,
        Command::DisableAllAnnotation(cmd) => member_states::disable_all_annotation(cmd, tx).await,
        Command::StartPolling(cmd) => polling::start_polling(cmd, tx).await,
        Command::StopPolling(cmd) => polling::stop_polling(cmd, tx).await,
        Command::EndPolling(cmd) => polling::end_polling(cmd, tx).await,
        Command::SubmitPollingAnswer(cmd) => polling::submit_polling_answer(cmd, tx).await,
        Command::ResetPolling(cmd) => polling::reset_polling(cmd, tx).await,
        Command::RequestRecording(cmd) => recording::request_recording(cmd, tx).await,
        Command::StopRecording(cmd) => recording::stop_recording(cmd, tx).await,
        Command::Spotlight(cmd) => room::spotlight(cmd, tx).await,
        Command::WhiteboardZoom(cmd) => room::whiteboard_zoom(cmd, tx).await,
        Command::UpdateChat(cmd) => member_states::update_chat(cmd, tx).await,
        Command::ResetAllChat(cmd) => member_states::reset_all_chat(cmd, tx).await,
    }
}

/// Ordered guard list in front of the dispatcher. The caller composes the
/// chain explicitly; execution stops at the first failing guard.
pub struct CommandPipeline {
    guards: Vec<Arc<dyn CommandGuard>>,
    dispatcher: CommandDispatcher,
}

impl CommandPipeline {
    pub fn new(dispatcher: CommandDispatcher) -> Self {
        Self {
            guards: Vec::new(),
            dispatcher,
        }
    }

    pub fn with_guard(mut self, guard: Arc<dyn CommandGuard>) -> Self {
        self.guards.push(guard);
        self
    }

    pub async fn execute(&self, command: &Command) -> Result<(), LessonError> {
        for guard in &self.guards {
            if let Err(err) = guard.check(command).await {
                warn!("{} rejected: {}", command.name(), err);
                return Err(err);
            }
        }
        self.dispatcher.execute(command).await
    }
}
