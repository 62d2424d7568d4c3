pub mod classifier;
pub mod layer;
pub mod marker;
pub mod registry;
pub mod surface;
pub mod symbology;

pub use classifier::*;
pub use layer::*;
pub use marker::*;
pub use registry::*;
pub use surface::*;
pub use symbology::*;
