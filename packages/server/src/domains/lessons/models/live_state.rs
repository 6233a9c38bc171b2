//! On-demand read model of a lesson room.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::common::{LessonId, UserId};

use super::super::error::LessonError;
use super::member_state::{MemberState, StateType};
use super::room_state::RoomState;

/// One learner's view-facing state, grouped from their member rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerState {
    pub user_id: UserId,
    pub is_hands_up: bool,
    pub is_annotation_enabled: bool,
    pub is_chat_enabled: bool,
    pub polling_answers: Vec<String>,
}

impl LearnerState {
    fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            is_hands_up: false,
            is_annotation_enabled: false,
            is_chat_enabled: false,
            polling_answers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStates {
    pub learners: Vec<LearnerState>,
}

impl UserStates {
    /// Group member rows by user. A state type with no row keeps its zero
    /// value; a row from another lesson is a hard error, never silently
    /// dropped.
    pub fn from_rows(lesson_id: &LessonId, rows: &[MemberState]) -> Result<Self, LessonError> {
        let mut by_user: BTreeMap<UserId, LearnerState> = BTreeMap::new();
        for row in rows {
            if row.lesson_id != *lesson_id {
                return Err(LessonError::ForeignMemberState {
                    expected: *lesson_id,
                    found: row.lesson_id,
                });
            }
            let state = by_user
                .entry(row.user_id)
                .or_insert_with(|| LearnerState::empty(row.user_id));
            match row.state_type {
                StateType::HandsUp => state.is_hands_up = row.bool_value,
                StateType::Annotation => state.is_annotation_enabled = row.bool_value,
                StateType::Chat => state.is_chat_enabled = row.bool_value,
                StateType::PollingAnswer => {
                    state.polling_answers = row.string_array_value.clone()
                }
            }
        }
        Ok(Self {
            learners: by_user.into_values().collect(),
        })
    }
}

/// Full room view assembled on demand; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveLessonState {
    pub lesson_id: LessonId,
    pub room_state: RoomState,
    pub user_states: UserStates,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(
        lesson_id: LessonId,
        user_id: UserId,
        state_type: StateType,
        bool_value: bool,
        answers: &[&str],
    ) -> MemberState {
        let now = Utc::now();
        MemberState {
            lesson_id,
            user_id,
            state_type,
            bool_value,
            string_array_value: answers.iter().map(|s| s.to_string()).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn groups_rows_by_user_with_zero_defaults() {
        let lesson_id = LessonId::new();
        let alice = UserId::new();
        let bob = UserId::new();
        let rows = vec![
            row(lesson_id, alice, StateType::HandsUp, true, &[]),
            row(lesson_id, alice, StateType::PollingAnswer, false, &["A"]),
            row(lesson_id, bob, StateType::Chat, true, &[]),
        ];

        let states = UserStates::from_rows(&lesson_id, &rows).unwrap();
        assert_eq!(states.learners.len(), 2);

        let alice_state = states
            .learners
            .iter()
            .find(|s| s.user_id == alice)
            .unwrap();
        assert!(alice_state.is_hands_up);
        assert_eq!(alice_state.polling_answers, vec!["A".to_string()]);
        // No annotation or chat row: zero values.
        assert!(!alice_state.is_annotation_enabled);
        assert!(!alice_state.is_chat_enabled);

        let bob_state = states.learners.iter().find(|s| s.user_id == bob).unwrap();
        assert!(bob_state.is_chat_enabled);
        assert!(!bob_state.is_hands_up);
    }

    #[test]
    fn foreign_lesson_row_is_a_hard_error() {
        let lesson_id = LessonId::new();
        let other_lesson = LessonId::new();
        let rows = vec![row(other_lesson, UserId::new(), StateType::HandsUp, true, &[])];

        let err = UserStates::from_rows(&lesson_id, &rows).unwrap_err();
        assert!(matches!(
            err,
            LessonError::ForeignMemberState { expected, found }
                if expected == lesson_id && found == other_lesson
        ));
    }

    #[test]
    fn no_rows_means_no_learners() {
        let states = UserStates::from_rows(&LessonId::new(), &[]).unwrap();
        assert!(states.learners.is_empty());
    }
}
