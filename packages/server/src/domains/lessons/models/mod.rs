pub mod lesson;
pub mod live_state;
pub mod member_state;
pub mod polling_archive;
pub mod room_state;

pub use lesson::Lesson;
pub use live_state::{LearnerState, LiveLessonState, UserStates};
pub use member_state::{MemberState, MemberStateFilter, StateType, StateValue};
pub use polling_archive::{PollingArchive, UserPollingAnswer};
pub use room_state::{
    CurrentMaterial, CurrentPolling, MediaPlayback, PlayerState, PollingOption, PollingStatus,
    Recording, RoomState, RoomStateError, WhiteboardZoomState,
};
