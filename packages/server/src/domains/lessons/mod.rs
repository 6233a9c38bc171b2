//! Live lesson rooms: the room state document, per-member states and the
//! command pipeline that mutates them.

pub mod actions;
pub mod commands;
pub mod error;
pub mod models;
pub mod store;

pub use error::LessonError;
