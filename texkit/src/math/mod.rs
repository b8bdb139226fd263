pub mod scalar;
pub mod vec4d;

pub use scalar::*;
pub use vec4d::*;
