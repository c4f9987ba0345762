pub mod pipeline;
pub mod taps;

pub use pipeline::TouchEngine;
