pub mod convert;
pub mod filter;
pub mod mipmaps;
pub mod sampler;
pub mod sampler_array;

pub use convert::*;
pub use filter::{Filter, Wrap, wrap_coord};
pub use sampler::*;
pub use sampler_array::*;
