//! Domain models for the clinsight system.

mod context;
mod feedback;
mod message;
mod metric;
mod review;

pub use context::*;
pub use feedback::*;
pub use message::*;
pub use metric::*;
pub use review::*;
