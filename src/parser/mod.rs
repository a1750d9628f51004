//! Tolerant decoding of model output into structured JSON.

mod json;
mod relaxed;

pub use json::parse;
