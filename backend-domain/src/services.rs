// Pure domain services
pub mod access_policy;
pub mod grouping;

pub use access_policy::*;
pub use grouping::*;
