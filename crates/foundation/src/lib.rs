pub mod geo;
pub mod handles;

// Foundation crate: small, well-tested primitives only.
pub use geo::*;
pub use handles::*;
