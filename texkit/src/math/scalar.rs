use bytemuck::Pod;
use std::fmt::Debug;

/// A texel exchanged with samplers: four channels regardless of the format's own count.
pub type Texel<T> = [T; 4];

/// Channel types a sampler can expose texels as.
pub trait TexelScalar: Pod + PartialEq + Debug + Default {
    /// Scalar used for normalized coordinates and levels of detail.
    type Interp: Copy + Debug + Into<f64>;

    const ZERO: Self;
    const ONE: Self;

    /// Converts a logical channel value; integer types round and saturate.
    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
}

impl TexelScalar for f32 {
    type Interp = f32;
    const ZERO: f32 = 0.0;
    const ONE: f32 = 1.0;

    fn from_f64(value: f64) -> f32 {
        value as f32
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl TexelScalar for f64 {
    type Interp = f64;
    const ZERO: f64 = 0.0;
    const ONE: f64 = 1.0;

    fn from_f64(value: f64) -> f64 {
        value
    }

    fn to_f64(self) -> f64 {
        self
    }
}

impl TexelScalar for u32 {
    type Interp = f32;
    const ZERO: u32 = 0;
    const ONE: u32 = 1;

    fn from_f64(value: f64) -> u32 {
        value.round() as u32
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl TexelScalar for i32 {
    type Interp = f32;
    const ZERO: i32 = 0;
    const ONE: i32 = 1;

    fn from_f64(value: f64) -> i32 {
        value.round() as i32
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

/// Default texel for channels a format does not store: (0, 0, 0, 1).
pub fn opaque_black<T: TexelScalar>() -> Texel<T> {
    [T::ZERO, T::ZERO, T::ZERO, T::ONE]
}
