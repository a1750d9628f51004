mod explanation;
mod normalize;
mod types;

pub use explanation::to_legacy_explanation;
pub use normalize::{degraded_report, merge_static_findings, normalize, NormalizeContext};
#[cfg(test)]
pub use normalize::placeholder_code;
pub use types::*;
