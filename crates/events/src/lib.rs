//! Domain events and the deterministic command execution loop.

pub mod event;
pub mod handler;

pub use event::Event;
pub use handler::execute;
