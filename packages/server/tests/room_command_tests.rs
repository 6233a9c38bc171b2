//! Material sharing, recording, spotlight, whiteboard zoom, chat/annotation
//! permissions, the composite reset and the assembled read model.

mod common;

use classroom_core::common::MediaId;
use classroom_core::domains::lessons::actions::queries::get_live_lesson_state;
use classroom_core::domains::lessons::commands::{
    Command, RequestRecording, ResetAllStates, ShareMaterial, SharedMaterialRequest, Spotlight,
    StartPolling, StopRecording, StopSharingMaterial, UpdateAnnotation, UpdateChat, UpdateHandsUp,
    WhiteboardZoom,
};
use classroom_core::domains::lessons::models::{
    MediaPlayback, PlayerState, StateType, WhiteboardZoomState,
};
use classroom_core::domains::lessons::LessonError;
use common::{classroom, poll_options, Room};

fn share(room: &Room, media_id: MediaId, video_state: Option<MediaPlayback>) -> Command {
    Command::ShareMaterial(ShareMaterial {
        commander_id: room.teacher(),
        lesson_id: room.lesson_id,
        material: Some(SharedMaterialRequest {
            media_id,
            video_state,
            audio_state: None,
        }),
    })
}

#[tokio::test]
async fn share_material_sets_and_clears_the_document_field() {
    let room = classroom(1, 1);

    room.execute(share(
        &room,
        room.media_id,
        Some(MediaPlayback {
            player_state: PlayerState::Playing,
            current_time_ms: 0,
        }),
    ))
    .await
    .unwrap();

    let material = room
        .store
        .lesson(&room.lesson_id)
        .unwrap()
        .room_state
        .current_material
        .unwrap();
    assert_eq!(material.media_id, room.media_id);
    assert!(material.video_state.is_some());
    assert!(material.audio_state.is_none());

    room.execute(Command::StopSharingMaterial(StopSharingMaterial {
        commander_id: room.teacher(),
        lesson_id: room.lesson_id,
    }))
    .await
    .unwrap();
    assert!(room
        .store
        .lesson(&room.lesson_id)
        .unwrap()
        .room_state
        .current_material
        .is_none());
}

#[tokio::test]
async fn share_material_rejects_media_outside_the_lesson_group() {
    let room = classroom(1, 1);
    let foreign_media = MediaId::new();

    let err = room
        .execute(share(&room, foreign_media, None))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LessonError::MediaNotInLesson { media_id, lesson_id }
            if media_id == foreign_media && lesson_id == room.lesson_id
    ));

    // The transaction rolled back: no write reached the store.
    assert!(room
        .store
        .lesson(&room.lesson_id)
        .unwrap()
        .room_state
        .current_material
        .is_none());
    assert_eq!(room.store.write_count(), 0);
}

#[tokio::test]
async fn share_material_rejects_negative_playback_offset() {
    let room = classroom(1, 1);

    let err = room
        .execute(share(
            &room,
            room.media_id,
            Some(MediaPlayback {
                player_state: PlayerState::Pause,
                current_time_ms: -5,
            }),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, LessonError::InvalidRoomState(_)));
    assert_eq!(room.store.write_count(), 0);
}

#[tokio::test]
async fn recording_transitions_are_unconditional_overwrites() {
    let room = classroom(2, 1);

    room.execute(Command::RequestRecording(RequestRecording {
        commander_id: room.teachers[0],
        lesson_id: room.lesson_id,
    }))
    .await
    .unwrap();
    let recording = room
        .store
        .lesson(&room.lesson_id)
        .unwrap()
        .room_state
        .recording
        .unwrap();
    assert!(recording.is_recording);
    assert_eq!(recording.creator, Some(room.teachers[0]));

    // A second teacher may take over without stopping first.
    room.execute(Command::RequestRecording(RequestRecording {
        commander_id: room.teachers[1],
        lesson_id: room.lesson_id,
    }))
    .await
    .unwrap();
    let recording = room
        .store
        .lesson(&room.lesson_id)
        .unwrap()
        .room_state
        .recording
        .unwrap();
    assert_eq!(recording.creator, Some(room.teachers[1]));

    room.execute(Command::StopRecording(StopRecording {
        commander_id: room.teachers[0],
        lesson_id: room.lesson_id,
    }))
    .await
    .unwrap();
    let recording = room
        .store
        .lesson(&room.lesson_id)
        .unwrap()
        .room_state
        .recording
        .unwrap();
    assert!(!recording.is_recording);
    assert_eq!(recording.creator, None);
}

#[tokio::test]
async fn spotlight_sets_and_clears() {
    let room = classroom(1, 2);

    room.execute(Command::Spotlight(Spotlight {
        commander_id: room.teacher(),
        lesson_id: room.lesson_id,
        spotlighted_user: Some(room.learner(1)),
    }))
    .await
    .unwrap();
    assert_eq!(room.store.spotlight(&room.lesson_id), Some(room.learner(1)));

    room.execute(Command::Spotlight(Spotlight {
        commander_id: room.teacher(),
        lesson_id: room.lesson_id,
        spotlighted_user: None,
    }))
    .await
    .unwrap();
    assert_eq!(room.store.spotlight(&room.lesson_id), None);
}

#[tokio::test]
async fn whiteboard_zoom_is_upserted() {
    let room = classroom(1, 1);
    let zoom = WhiteboardZoomState {
        pdf_scale_ratio: 150.0,
        center_x: 12.0,
        center_y: -4.0,
        pdf_width: 960.0,
        pdf_height: 540.0,
    };

    room.execute(Command::WhiteboardZoom(WhiteboardZoom {
        commander_id: room.teacher(),
        lesson_id: room.lesson_id,
        state: zoom.clone(),
    }))
    .await
    .unwrap();
    assert_eq!(room.store.whiteboard_zoom(&room.lesson_id), Some(zoom));
}

#[tokio::test]
async fn chat_and_annotation_updates_cover_many_users() {
    let room = classroom(1, 3);
    let targets = vec![room.learner(0), room.learner(2)];

    room.execute(Command::UpdateChat(UpdateChat {
        commander_id: room.teacher(),
        lesson_id: room.lesson_id,
        user_ids: targets.clone(),
        enabled: false,
    }))
    .await
    .unwrap();
    room.execute(Command::UpdateAnnotation(UpdateAnnotation {
        commander_id: room.teacher(),
        lesson_id: room.lesson_id,
        user_ids: targets.clone(),
        enabled: true,
    }))
    .await
    .unwrap();

    for user_id in &targets {
        let chat = room
            .store
            .member_state(&room.lesson_id, user_id, StateType::Chat)
            .unwrap();
        assert!(!chat.bool_value);
        let annotation = room
            .store
            .member_state(&room.lesson_id, user_id, StateType::Annotation)
            .unwrap();
        assert!(annotation.bool_value);
    }
    // The untargeted learner has no rows.
    assert!(room
        .store
        .member_state(&room.lesson_id, &room.learner(1), StateType::Chat)
        .is_none());
}

#[tokio::test]
async fn reset_all_states_returns_the_room_to_defaults() {
    let room = classroom(1, 2);

    // Mess the room up first.
    room.execute(share(&room, room.media_id, None)).await.unwrap();
    room.execute(Command::StartPolling(StartPolling {
        commander_id: room.teacher(),
        lesson_id: room.lesson_id,
        options: poll_options(&[("A", true), ("B", false)]),
    }))
    .await
    .unwrap();
    room.execute(Command::UpdateHandsUp(UpdateHandsUp {
        commander_id: room.learner(0),
        lesson_id: room.lesson_id,
        user_id: room.learner(0),
        is_up: true,
    }))
    .await
    .unwrap();
    room.execute(Command::UpdateChat(UpdateChat {
        commander_id: room.teacher(),
        lesson_id: room.lesson_id,
        user_ids: vec![room.learner(0)],
        enabled: false,
    }))
    .await
    .unwrap();
    room.execute(Command::Spotlight(Spotlight {
        commander_id: room.teacher(),
        lesson_id: room.lesson_id,
        spotlighted_user: Some(room.learner(0)),
    }))
    .await
    .unwrap();
    room.execute(Command::RequestRecording(RequestRecording {
        commander_id: room.teacher(),
        lesson_id: room.lesson_id,
    }))
    .await
    .unwrap();

    room.execute(Command::ResetAllStates(ResetAllStates {
        commander_id: room.teacher(),
        lesson_id: room.lesson_id,
    }))
    .await
    .unwrap();

    let lesson = room.store.lesson(&room.lesson_id).unwrap();
    assert!(lesson.room_state.current_material.is_none());
    assert!(lesson.room_state.current_polling.is_none());
    assert!(!lesson.room_state.recording.unwrap().is_recording);
    assert_eq!(room.store.spotlight(&room.lesson_id), None);
    assert_eq!(
        room.store.whiteboard_zoom(&room.lesson_id),
        Some(WhiteboardZoomState::default())
    );
    for learner in &room.learners {
        let hands = room
            .store
            .member_state(&room.lesson_id, learner, StateType::HandsUp)
            .unwrap();
        assert!(!hands.bool_value);
        let annotation = room
            .store
            .member_state(&room.lesson_id, learner, StateType::Annotation)
            .unwrap();
        assert!(!annotation.bool_value);
        // Chat resets to the permissive default.
        let chat = room
            .store
            .member_state(&room.lesson_id, learner, StateType::Chat)
            .unwrap();
        assert!(chat.bool_value);
        let answers = room
            .store
            .member_state(&room.lesson_id, learner, StateType::PollingAnswer)
            .unwrap();
        assert!(answers.string_array_value.is_empty());
    }
}

#[tokio::test]
async fn live_lesson_state_groups_member_rows() {
    let room = classroom(1, 3);

    room.execute(Command::UpdateHandsUp(UpdateHandsUp {
        commander_id: room.learner(0),
        lesson_id: room.lesson_id,
        user_id: room.learner(0),
        is_up: true,
    }))
    .await
    .unwrap();
    room.execute(Command::UpdateChat(UpdateChat {
        commander_id: room.teacher(),
        lesson_id: room.lesson_id,
        user_ids: vec![room.learner(1)],
        enabled: true,
    }))
    .await
    .unwrap();

    let view = get_live_lesson_state(&room.lesson_id, &*room.store)
        .await
        .unwrap();
    assert_eq!(view.lesson_id, room.lesson_id);
    // Only users with rows appear.
    assert_eq!(view.user_states.learners.len(), 2);

    let raiser = view
        .user_states
        .learners
        .iter()
        .find(|l| l.user_id == room.learner(0))
        .unwrap();
    assert!(raiser.is_hands_up);
    assert!(!raiser.is_chat_enabled);

    let chatter = view
        .user_states
        .learners
        .iter()
        .find(|l| l.user_id == room.learner(1))
        .unwrap();
    assert!(chatter.is_chat_enabled);
    assert!(!chatter.is_hands_up);
    assert!(chatter.polling_answers.is_empty());
}
