//! Polling lifecycle handlers.
//!
//! The poll walks Started -> Stopped -> archived-and-cleared; every
//! transition checks the status it leaves from and writes the document back
//! under the version it read.

use std::collections::HashSet;

use chrono::Utc;
use tracing::info;

use crate::common::PollId;

use super::super::commands::{
    EndPolling, ResetPolling, StartPolling, StopPolling, SubmitPollingAnswer,
};
use super::super::error::LessonError;
use super::super::models::member_state::POLLING_ANSWER_CLEARED;
use super::super::models::{
    CurrentPolling, MemberStateFilter, PollingArchive, PollingOption, PollingStatus, StateType,
    StateValue, UserPollingAnswer,
};
use super::super::store::RoomStoreTx;
use super::{require_lesson, write_room_state};

const MIN_POLL_OPTIONS: usize = 2;
const MAX_POLL_OPTIONS: usize = 10;

fn validate_options(options: &[PollingOption]) -> Result<(), LessonError> {
    if options.len() < MIN_POLL_OPTIONS || options.len() > MAX_POLL_OPTIONS {
        return Err(LessonError::InvalidPollOptions(format!(
            "expected {MIN_POLL_OPTIONS}-{MAX_POLL_OPTIONS} options, got {}",
            options.len()
        )));
    }
    if !options.iter().any(|option| option.is_correct) {
        return Err(LessonError::InvalidPollOptions(
            "at least one option must be correct".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for option in options {
        if !seen.insert(option.answer.as_str()) {
            return Err(LessonError::InvalidPollOptions(format!(
                "duplicate answer \"{}\"",
                option.answer
            )));
        }
    }
    Ok(())
}

/// Start a poll. Only one poll can run per lesson.
pub async fn start_polling(
    cmd: &StartPolling,
    tx: &mut dyn RoomStoreTx,
) -> Result<(), LessonError> {
    let lesson = require_lesson(tx, &cmd.lesson_id).await?;
    if lesson.room_state.current_polling.is_some() {
        return Err(LessonError::PollingAlreadyExists);
    }
    validate_options(&cmd.options)?;

    let mut state = lesson.room_state.clone();
    state.current_polling = Some(CurrentPolling {
        options: cmd.options.clone(),
        status: PollingStatus::Started,
        created_at: Utc::now(),
        stopped_at: None,
    });

    info!(
        "Starting poll with {} options in lesson {}",
        cmd.options.len(),
        cmd.lesson_id
    );
    write_room_state(tx, &lesson, &state).await
}

/// Stop the running poll. Only a Started poll can be stopped.
pub async fn stop_polling(cmd: &StopPolling, tx: &mut dyn RoomStoreTx) -> Result<(), LessonError> {
    let lesson = require_lesson(tx, &cmd.lesson_id).await?;
    let mut state = lesson.room_state.clone();
    let polling = state
        .current_polling
        .as_mut()
        .ok_or(LessonError::PollingNotFound)?;
    if polling.status != PollingStatus::Started {
        return Err(LessonError::PollingStatus {
            expected: PollingStatus::Started,
            actual: polling.status,
        });
    }

    polling.status = PollingStatus::Stopped;
    polling.stopped_at = Some(Utc::now());

    info!("Stopping poll in lesson {}", cmd.lesson_id);
    write_room_state(tx, &lesson, &state).await
}

/// End a stopped poll: archive the options with every collected answer,
/// clear the live poll and reset all member answer states, all in the one
/// surrounding transaction.
pub async fn end_polling(cmd: &EndPolling, tx: &mut dyn RoomStoreTx) -> Result<(), LessonError> {
    let lesson = require_lesson(tx, &cmd.lesson_id).await?;
    let mut state = lesson.room_state.clone();
    let polling = state
        .current_polling
        .take()
        .ok_or(LessonError::PollingNotFound)?;
    if polling.status != PollingStatus::Stopped {
        return Err(LessonError::PollingStatus {
            expected: PollingStatus::Stopped,
            actual: polling.status,
        });
    }

    let filter =
        MemberStateFilter::for_lesson(cmd.lesson_id).with_state_type(StateType::PollingAnswer);
    let rows = tx.member_states(&filter).await?;
    let user_answers: Vec<UserPollingAnswer> = rows
        .iter()
        .filter(|row| !row.string_array_value.is_empty())
        .map(|row| UserPollingAnswer {
            user_id: row.user_id,
            answers: row.string_array_value.clone(),
        })
        .collect();

    let now = Utc::now();
    let archive = PollingArchive {
        id: PollId::new(),
        lesson_id: cmd.lesson_id,
        options: polling.options.clone(),
        created_at: polling.created_at,
        stopped_at: polling.stopped_at.unwrap_or(now),
        ended_at: now,
        user_answers,
    };
    tx.create_polling_archive(&archive).await?;
    tx.upsert_all_member_state(&cmd.lesson_id, StateType::PollingAnswer, &POLLING_ANSWER_CLEARED)
        .await?;

    info!(
        "Ended poll in lesson {}, archived as {}",
        cmd.lesson_id, archive.id
    );
    write_room_state(tx, &lesson, &state).await
}

/// Record a learner's answers. Each answer must be one of the poll options
/// and a member may submit exactly once.
pub async fn submit_polling_answer(
    cmd: &SubmitPollingAnswer,
    tx: &mut dyn RoomStoreTx,
) -> Result<(), LessonError> {
    let lesson = require_lesson(tx, &cmd.lesson_id).await?;
    let polling = lesson
        .room_state
        .current_polling
        .as_ref()
        .ok_or(LessonError::PollingNotFound)?;
    if polling.status != PollingStatus::Started {
        return Err(LessonError::PollingStatus {
            expected: PollingStatus::Started,
            actual: polling.status,
        });
    }

    if cmd.answers.is_empty() {
        return Err(LessonError::EmptyAnswer);
    }
    for answer in &cmd.answers {
        if !polling.contains_answer(answer) {
            return Err(LessonError::AnswerNotInOptions(answer.clone()));
        }
    }

    let prior = tx
        .member_state(&cmd.lesson_id, &cmd.user_id, StateType::PollingAnswer)
        .await?;
    if prior.is_some_and(|row| !row.string_array_value.is_empty()) {
        return Err(LessonError::AlreadySubmitted);
    }

    tx.upsert_member_state(
        &cmd.lesson_id,
        &cmd.user_id,
        StateType::PollingAnswer,
        &StateValue::answers(cmd.answers.clone()),
    )
    .await?;
    Ok(())
}

/// Drop the running poll without archiving. A lesson without a poll is left
/// untouched: no error, no write.
pub async fn reset_polling(
    cmd: &ResetPolling,
    tx: &mut dyn RoomStoreTx,
) -> Result<(), LessonError> {
    let lesson = require_lesson(tx, &cmd.lesson_id).await?;
    if lesson.room_state.current_polling.is_none() {
        return Ok(());
    }

    let mut state = lesson.room_state.clone();
    state.current_polling = None;

    info!("Resetting poll in lesson {}", cmd.lesson_id);
    tx.upsert_all_member_state(&cmd.lesson_id, StateType::PollingAnswer, &POLLING_ANSWER_CLEARED)
        .await?;
    write_room_state(tx, &lesson, &state).await
}
