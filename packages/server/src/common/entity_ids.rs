//! Typed ID aliases for the lesson room domain.
//!
//! Each alias is incompatible with the others at compile time, so a roster
//! lookup can never accidentally receive a media ID.

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for Lesson entities.
pub struct Lesson;

/// Marker type for User entities (teachers and learners alike).
pub struct User;

/// Marker type for Media entities (videos, audio, PDFs shared into a room).
pub struct Media;

/// Marker type for LessonGroup entities (the media set a lesson draws from).
pub struct LessonGroup;

/// Marker type for Course entities.
pub struct Course;

/// Marker type for archived polls.
pub struct Polling;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for Lesson entities.
pub type LessonId = Id<Lesson>;

/// Typed ID for User entities.
pub type UserId = Id<User>;

/// Typed ID for Media entities.
pub type MediaId = Id<Media>;

/// Typed ID for LessonGroup entities.
pub type LessonGroupId = Id<LessonGroup>;

/// Typed ID for Course entities.
pub type CourseId = Id<Course>;

/// Typed ID for archived polls.
pub type PollId = Id<Polling>;
