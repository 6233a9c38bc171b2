//! Kernel module - infrastructure shared by tests and wiring code.

pub mod test_dependencies;

pub use test_dependencies::MemoryRoomStore;
