//! Viewport-driven marker synchronization.
//!
//! Everything here runs on one cooperative event loop (a tokio
//! current-thread runtime with a `LocalSet`). Shared state is `Rc`/`RefCell`
//! and borrows are never held across an `.await`.

pub mod controller;
pub mod coordinator;
pub mod geolocation;
pub mod reports;

use std::cell::RefCell;
use std::rc::Rc;

use layers::MarkerRegistry;

pub use controller::*;
pub use coordinator::*;
pub use geolocation::*;
pub use reports::*;

pub type SharedRegistry<S> = Rc<RefCell<MarkerRegistry<S>>>;

pub fn shared_registry<S: layers::MapSurface>(surface: S) -> SharedRegistry<S> {
    Rc::new(RefCell::new(MarkerRegistry::new(surface)))
}
