pub mod error;
pub mod math;
pub mod sampler;
pub mod storage;

pub use error::*;
