//! The per-lesson room state document.
//!
//! Stored as a single JSON document on the lesson row and mutated only by
//! command handlers. Spotlight, whiteboard zoom and per-member states live
//! outside the document (see the store contracts).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::{MediaId, UserId};

/// Validation failures for the room state document and its sub-states.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoomStateError {
    #[error("shared material requires a media id")]
    MissingMediaId,

    #[error("shared material requires an update timestamp")]
    MissingUpdatedAt,

    #[error("shared material cannot carry both video and audio state")]
    AmbiguousPlayback,

    #[error("playback offset cannot be negative")]
    NegativePlaybackOffset,

    #[error("poll has no options")]
    NoPollOptions,

    #[error("poll stopped before it was created")]
    StoppedBeforeCreated,

    #[error("recording creator set while not recording")]
    CreatorWithoutRecording,
}

/// Player state of the shared video/audio material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    Playing,
    Pause,
    Ended,
}

/// Playback position of the shared material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaPlayback {
    pub player_state: PlayerState,
    /// Offset into the media, in milliseconds from the start.
    pub current_time_ms: i64,
}

impl MediaPlayback {
    fn validate(&self) -> Result<(), RoomStateError> {
        match self.player_state {
            PlayerState::Playing | PlayerState::Pause if self.current_time_ms < 0 => {
                Err(RoomStateError::NegativePlaybackOffset)
            }
            _ => Ok(()),
        }
    }
}

/// The material currently shared with the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentMaterial {
    pub media_id: MediaId,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_state: Option<MediaPlayback>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_state: Option<MediaPlayback>,
}

impl CurrentMaterial {
    pub fn validate(&self) -> Result<(), RoomStateError> {
        if self.media_id.is_nil() {
            return Err(RoomStateError::MissingMediaId);
        }
        if self.updated_at == DateTime::<Utc>::UNIX_EPOCH {
            return Err(RoomStateError::MissingUpdatedAt);
        }
        if self.video_state.is_some() && self.audio_state.is_some() {
            return Err(RoomStateError::AmbiguousPlayback);
        }
        if let Some(playback) = self.video_state.as_ref().or(self.audio_state.as_ref()) {
            playback.validate()?;
        }
        Ok(())
    }
}

/// Lifecycle of the in-room poll. `Stopped` is reachable only from `Started`,
/// and a poll leaves the document (via archive) only from `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollingStatus {
    Started,
    Stopped,
    Ended,
}

impl std::fmt::Display for PollingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollingStatus::Started => write!(f, "started"),
            PollingStatus::Stopped => write!(f, "stopped"),
            PollingStatus::Ended => write!(f, "ended"),
        }
    }
}

impl std::str::FromStr for PollingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "started" => Ok(PollingStatus::Started),
            "stopped" => Ok(PollingStatus::Stopped),
            "ended" => Ok(PollingStatus::Ended),
            _ => Err(anyhow::anyhow!("Invalid polling status: {}", s)),
        }
    }
}

/// One answer a learner can pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingOption {
    pub answer: String,
    pub is_correct: bool,
}

/// The poll currently running in the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentPolling {
    pub options: Vec<PollingOption>,
    pub status: PollingStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopped_at: Option<DateTime<Utc>>,
}

impl CurrentPolling {
    pub fn validate(&self) -> Result<(), RoomStateError> {
        if self.options.is_empty() {
            return Err(RoomStateError::NoPollOptions);
        }
        if let Some(stopped_at) = self.stopped_at {
            if stopped_at < self.created_at {
                return Err(RoomStateError::StoppedBeforeCreated);
            }
        }
        Ok(())
    }

    pub fn contains_answer(&self, answer: &str) -> bool {
        self.options.iter().any(|o| o.answer == answer)
    }
}

/// Recording status of the room. `creator` is set only while recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub is_recording: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<UserId>,
}

/// The shared room state document, one per lesson.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_material: Option<CurrentMaterial>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_polling: Option<CurrentPolling>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording: Option<Recording>,
}

impl RoomState {
    /// Validate the document and every present sub-state.
    pub fn validate(&self) -> Result<(), RoomStateError> {
        if let Some(material) = &self.current_material {
            material.validate()?;
        }
        if let Some(polling) = &self.current_polling {
            polling.validate()?;
        }
        if let Some(recording) = &self.recording {
            if recording.creator.is_some() && !recording.is_recording {
                return Err(RoomStateError::CreatorWithoutRecording);
            }
        }
        Ok(())
    }
}

/// Whiteboard viewport shared with every participant. Lives outside the room
/// state document; the room-wide reset restores `Default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhiteboardZoomState {
    pub pdf_scale_ratio: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub pdf_width: f64,
    pub pdf_height: f64,
}

impl Default for WhiteboardZoomState {
    fn default() -> Self {
        Self {
            pdf_scale_ratio: 100.0,
            center_x: 0.0,
            center_y: 0.0,
            pdf_width: 1920.0,
            pdf_height: 1080.0,
        }
    }
}
