pub mod http;
pub mod protocol;
pub mod source;

pub use http::*;
pub use protocol::*;
pub use source::*;
