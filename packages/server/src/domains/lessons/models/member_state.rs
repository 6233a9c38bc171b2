//! Per-(lesson, user, state type) member rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{LessonId, UserId};

/// The per-member state kinds tracked for a live lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateType {
    HandsUp,
    Annotation,
    PollingAnswer,
    Chat,
}

impl StateType {
    /// The payload written by the lesson-wide reset of this state type.
    pub fn reset_value(&self) -> StateValue {
        match self {
            StateType::HandsUp => HANDS_DOWN,
            StateType::Annotation => ANNOTATION_DISABLED,
            StateType::PollingAnswer => POLLING_ANSWER_CLEARED,
            StateType::Chat => CHAT_ENABLED,
        }
    }
}

impl std::fmt::Display for StateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateType::HandsUp => write!(f, "hands_up"),
            StateType::Annotation => write!(f, "annotation"),
            StateType::PollingAnswer => write!(f, "polling_answer"),
            StateType::Chat => write!(f, "chat"),
        }
    }
}

impl std::str::FromStr for StateType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "hands_up" => Ok(StateType::HandsUp),
            "annotation" => Ok(StateType::Annotation),
            "polling_answer" => Ok(StateType::PollingAnswer),
            "chat" => Ok(StateType::Chat),
            _ => Err(anyhow::anyhow!("Invalid state type: {}", s)),
        }
    }
}

/// Value payload written to a member state row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateValue {
    pub bool_value: bool,
    pub string_array_value: Vec<String>,
}

impl StateValue {
    pub fn flag(value: bool) -> Self {
        Self {
            bool_value: value,
            string_array_value: Vec::new(),
        }
    }

    pub fn answers(answers: Vec<String>) -> Self {
        Self {
            bool_value: false,
            string_array_value: answers,
        }
    }
}

// Lesson-wide reset payloads, named so the reset semantics stay auditable
// instead of living as literals at each call site.

pub const HANDS_DOWN: StateValue = StateValue {
    bool_value: false,
    string_array_value: Vec::new(),
};

pub const ANNOTATION_DISABLED: StateValue = StateValue {
    bool_value: false,
    string_array_value: Vec::new(),
};

/// Chat resets to the permissive lesson default; teachers restrict per user.
pub const CHAT_ENABLED: StateValue = StateValue {
    bool_value: true,
    string_array_value: Vec::new(),
};

pub const POLLING_ANSWER_CLEARED: StateValue = StateValue {
    bool_value: false,
    string_array_value: Vec::new(),
};

/// One stored member state row.
///
/// `lesson_id` must match the owning lesson wherever rows are aggregated; see
/// `UserStates::from_rows`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberState {
    pub lesson_id: LessonId,
    pub user_id: UserId,
    pub state_type: StateType,
    pub bool_value: bool,
    pub string_array_value: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filter for member state reads: lesson scope plus optional user and state
/// type restrictions.
#[derive(Debug, Clone)]
pub struct MemberStateFilter {
    pub lesson_id: LessonId,
    pub user_ids: Option<Vec<UserId>>,
    pub state_type: Option<StateType>,
}

impl MemberStateFilter {
    pub fn for_lesson(lesson_id: LessonId) -> Self {
        Self {
            lesson_id,
            user_ids: None,
            state_type: None,
        }
    }

    pub fn with_users(mut self, user_ids: Vec<UserId>) -> Self {
        self.user_ids = Some(user_ids);
        self
    }

    pub fn with_state_type(mut self, state_type: StateType) -> Self {
        self.state_type = Some(state_type);
        self
    }

    pub fn matches(&self, row: &MemberState) -> bool {
        row.lesson_id == self.lesson_id
            && self.state_type.map_or(true, |t| t == row.state_type)
            && self
                .user_ids
                .as_ref()
                .map_or(true, |users| users.contains(&row.user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_values_clear_everything_except_chat() {
        assert!(!StateType::HandsUp.reset_value().bool_value);
        assert!(!StateType::Annotation.reset_value().bool_value);
        assert!(StateType::PollingAnswer
            .reset_value()
            .string_array_value
            .is_empty());
        // Chat is the deliberate odd one out: reset restores the permissive
        // default.
        assert!(StateType::Chat.reset_value().bool_value);
    }

    #[test]
    fn state_type_string_roundtrip() {
        for state_type in [
            StateType::HandsUp,
            StateType::Annotation,
            StateType::PollingAnswer,
            StateType::Chat,
        ] {
            let parsed: StateType = state_type.to_string().parse().unwrap();
            assert_eq!(state_type, parsed);
        }
        assert!("spotlight".parse::<StateType>().is_err());
    }

    #[test]
    fn filter_scopes_by_lesson_user_and_type() {
        let lesson_id = LessonId::new();
        let user_id = UserId::new();
        let now = Utc::now();
        let row = MemberState {
            lesson_id,
            user_id,
            state_type: StateType::HandsUp,
            bool_value: true,
            string_array_value: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        assert!(MemberStateFilter::for_lesson(lesson_id).matches(&row));
        assert!(MemberStateFilter::for_lesson(lesson_id)
            .with_state_type(StateType::HandsUp)
            .with_users(vec![user_id])
            .matches(&row));
        assert!(!MemberStateFilter::for_lesson(LessonId::new()).matches(&row));
        assert!(!MemberStateFilter::for_lesson(lesson_id)
            .with_state_type(StateType::Chat)
            .matches(&row));
        assert!(!MemberStateFilter::for_lesson(lesson_id)
            .with_users(vec![UserId::new()])
            .matches(&row));
    }
}
