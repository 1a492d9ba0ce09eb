//! Utility helpers including math extensions, handle allocation, logging, and profiling.

pub mod allocator;
pub mod logging;
pub mod math;
pub mod profiling;

pub use allocator::{Arena, BodyHandle};
pub use math::*;
pub use profiling::{TickPhase, TickProfile};
