//! Command authorization.
//!
//! A guard runs before dispatch; guards compose into an ordered list on the
//! pipeline instead of chaining through the dispatcher itself.

use std::sync::Arc;

use async_trait::async_trait;

use crate::common::UserId;

use super::super::error::LessonError;
use super::super::models::Lesson;
use super::super::store::RoomStore;
use super::Command;

/// External user-group value that never receives teacher-level privileges.
pub const USER_GROUP_STUDENT: &str = "student";

/// A single authorization step run before dispatch.
#[async_trait]
pub trait CommandGuard: Send + Sync {
    async fn check(&self, command: &Command) -> Result<(), LessonError>;
}

enum CommanderRole {
    Teacher,
    Learner,
    /// Commander outside the roster; carries the externally looked-up group.
    External(String),
}

/// Evaluates whether the commander may execute a command against the
/// lesson's roster.
pub struct PermissionChecker {
    store: Arc<dyn RoomStore>,
}

impl PermissionChecker {
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    async fn resolve_role(
        &self,
        lesson: &Lesson,
        commander: &UserId,
    ) -> Result<CommanderRole, LessonError> {
        if lesson.is_teacher(commander) {
            return Ok(CommanderRole::Teacher);
        }
        if lesson.is_learner(commander) {
            return Ok(CommanderRole::Learner);
        }
        let group = self.store.user_group(commander).await?;
        Ok(CommanderRole::External(group))
    }

    /// Default rule: lesson teachers and non-student outsiders pass;
    /// learners and student-group outsiders do not.
    fn require_teacher(role: &CommanderRole, command: &Command) -> Result<(), LessonError> {
        match role {
            CommanderRole::Teacher => Ok(()),
            CommanderRole::External(group) if group != USER_GROUP_STUDENT => Ok(()),
            _ => Err(LessonError::PermissionDenied(format!(
                "{} requires teacher privileges",
                command.name()
            ))),
        }
    }
}

#[async_trait]
impl CommandGuard for PermissionChecker {
    async fn check(&self, command: &Command) -> Result<(), LessonError> {
        let lesson = self
            .store
            .find_lesson(command.lesson_id())
            .await?
            .ok_or(LessonError::LessonNotFound(*command.lesson_id()))?;
        let commander = command.commander_id();
        let role = self.resolve_role(&lesson, commander).await?;

        match command {
            Command::UpdateHandsUp(cmd) => {
                if matches!(role, CommanderRole::Learner) {
                    if cmd.user_id == *commander {
                        Ok(())
                    } else {
                        Err(LessonError::PermissionDenied(
                            "a learner may only change their own hand state".to_string(),
                        ))
                    }
                } else {
                    Self::require_teacher(&role, command)
                }
            }
            Command::SubmitPollingAnswer(cmd) => {
                if !matches!(role, CommanderRole::Learner) {
                    return Err(LessonError::PermissionDenied(
                        "only lesson learners may submit poll answers".to_string(),
                    ));
                }
                if cmd.user_id != *commander {
                    return Err(LessonError::PermissionDenied(
                        "a learner may only submit their own answer".to_string(),
                    ));
                }
                Ok(())
            }
            _ => Self::require_teacher(&role, command),
        }
    }
}
