pub mod event_bus;
pub mod generation;

pub use event_bus::*;
pub use generation::*;
