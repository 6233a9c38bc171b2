//! Authorization rules: roster roles, the external user-group fallback and
//! the per-command target restrictions.

mod common;

use classroom_core::common::{LessonId, UserId};
use classroom_core::domains::lessons::commands::{
    Command, FoldHandAll, StartPolling, StopPolling, SubmitPollingAnswer, UpdateHandsUp,
};
use classroom_core::domains::lessons::models::StateType;
use classroom_core::domains::lessons::LessonError;
use common::{classroom, classroom_with_user_groups, poll_options};

fn hands_up(commander: UserId, lesson_id: LessonId, target: UserId) -> Command {
    Command::UpdateHandsUp(UpdateHandsUp {
        commander_id: commander,
        lesson_id,
        user_id: target,
        is_up: true,
    })
}

fn start_poll(commander: UserId, lesson_id: LessonId) -> Command {
    Command::StartPolling(StartPolling {
        commander_id: commander,
        lesson_id,
        options: poll_options(&[("A", true), ("B", false)]),
    })
}

fn submit_answer(commander: UserId, lesson_id: LessonId, target: UserId) -> Command {
    Command::SubmitPollingAnswer(SubmitPollingAnswer {
        commander_id: commander,
        lesson_id,
        user_id: target,
        answers: vec!["A".to_string()],
    })
}

#[tokio::test]
async fn learner_can_raise_their_own_hand() {
    let room = classroom(1, 2);
    let learner = room.learner(0);

    room.execute(hands_up(learner, room.lesson_id, learner))
        .await
        .unwrap();

    let row = room
        .store
        .member_state(&room.lesson_id, &learner, StateType::HandsUp)
        .unwrap();
    assert!(row.bool_value);
}

#[tokio::test]
async fn learner_cannot_raise_another_learners_hand() {
    let room = classroom(1, 2);

    let err = room
        .execute(hands_up(room.learner(0), room.lesson_id, room.learner(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, LessonError::PermissionDenied(_)));
    assert!(room
        .store
        .member_state(&room.lesson_id, &room.learner(1), StateType::HandsUp)
        .is_none());
}

#[tokio::test]
async fn teacher_can_change_any_hand_state() {
    let room = classroom(1, 2);

    room.execute(hands_up(room.teacher(), room.lesson_id, room.learner(1)))
        .await
        .unwrap();

    let row = room
        .store
        .member_state(&room.lesson_id, &room.learner(1), StateType::HandsUp)
        .unwrap();
    assert!(row.bool_value);
}

#[tokio::test]
async fn learner_cannot_run_teacher_commands() {
    let room = classroom(1, 2);

    let err = room
        .execute(start_poll(room.learner(0), room.lesson_id))
        .await
        .unwrap_err();
    assert!(matches!(err, LessonError::PermissionDenied(_)));
}

#[tokio::test]
async fn non_student_outsider_passes_the_default_rule() {
    let supervisor = UserId::new();
    let room = classroom_with_user_groups(1, 1, &[(supervisor, "school_admin")]);

    room.execute(Command::FoldHandAll(FoldHandAll {
        commander_id: supervisor,
        lesson_id: room.lesson_id,
    }))
    .await
    .unwrap();
}

#[tokio::test]
async fn student_outsider_is_denied() {
    let outsider = UserId::new();
    let room = classroom_with_user_groups(1, 1, &[(outsider, "student")]);

    let err = room
        .execute(start_poll(outsider, room.lesson_id))
        .await
        .unwrap_err();
    assert!(matches!(err, LessonError::PermissionDenied(_)));
}

#[tokio::test]
async fn student_outsider_may_not_even_raise_a_hand() {
    let outsider = UserId::new();
    let room = classroom_with_user_groups(1, 1, &[(outsider, "student")]);

    // Not a roster learner, so the self-target exemption does not apply.
    let err = room
        .execute(hands_up(outsider, room.lesson_id, outsider))
        .await
        .unwrap_err();
    assert!(matches!(err, LessonError::PermissionDenied(_)));
}

#[tokio::test]
async fn teachers_cannot_submit_poll_answers() {
    let room = classroom(1, 1);
    room.execute(start_poll(room.teacher(), room.lesson_id))
        .await
        .unwrap();

    let err = room
        .execute(submit_answer(
            room.teacher(),
            room.lesson_id,
            room.teacher(),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, LessonError::PermissionDenied(_)));
}

#[tokio::test]
async fn learner_cannot_submit_for_someone_else() {
    let room = classroom(1, 2);
    room.execute(start_poll(room.teacher(), room.lesson_id))
        .await
        .unwrap();

    let err = room
        .execute(submit_answer(
            room.learner(0),
            room.lesson_id,
            room.learner(1),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, LessonError::PermissionDenied(_)));
}

#[tokio::test]
async fn commands_against_unknown_lessons_are_rejected() {
    let room = classroom(1, 1);
    let unknown = LessonId::new();

    let err = room
        .execute(Command::StopPolling(StopPolling {
            commander_id: room.teacher(),
            lesson_id: unknown,
        }))
        .await
        .unwrap_err();
    assert!(matches!(err, LessonError::LessonNotFound(id) if id == unknown));
}
