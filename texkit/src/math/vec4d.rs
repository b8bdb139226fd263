use crate::math::{Texel, TexelScalar};

/// Double precision 4-vector used as the accumulator of filtering and mip reduction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec4d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Vec4d {
    pub const ZERO: Vec4d = Vec4d { x: 0.0, y: 0.0, z: 0.0, w: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn from_texel<T: TexelScalar>(texel: Texel<T>) -> Self {
        Self { x: texel[0].to_f64(), y: texel[1].to_f64(), z: texel[2].to_f64(), w: texel[3].to_f64() }
    }

    pub fn to_texel<T: TexelScalar>(self) -> Texel<T> {
        [T::from_f64(self.x), T::from_f64(self.y), T::from_f64(self.z), T::from_f64(self.w)]
    }

    /// Linear interpolation: `self` at t = 0, `other` at t = 1.
    pub fn lerp(self, other: Vec4d, t: f64) -> Vec4d {
        self + (other - self) * t
    }
}

// Vec4d + Vec4d
impl std::ops::Add for Vec4d {
    type Output = Vec4d;
    fn add(self, other: Vec4d) -> Vec4d {
        Vec4d { x: self.x + other.x, y: self.y + other.y, z: self.z + other.z, w: self.w + other.w }
    }
}

// Vec4d += Vec4d
impl std::ops::AddAssign for Vec4d {
    fn add_assign(&mut self, other: Vec4d) {
        *self = *self + other;
    }
}

// Vec4d - Vec4d
impl std::ops::Sub for Vec4d {
    type Output = Vec4d;
    fn sub(self, other: Vec4d) -> Vec4d {
        Vec4d { x: self.x - other.x, y: self.y - other.y, z: self.z - other.z, w: self.w - other.w }
    }
}

// Vec4d * f64
impl std::ops::Mul<f64> for Vec4d {
    type Output = Vec4d;
    fn mul(self, scalar: f64) -> Vec4d {
        Vec4d { x: self.x * scalar, y: self.y * scalar, z: self.z * scalar, w: self.w * scalar }
    }
}

// Vec4d / f64
impl std::ops::Div<f64> for Vec4d {
    type Output = Vec4d;
    fn div(self, scalar: f64) -> Vec4d {
        Vec4d { x: self.x / scalar, y: self.y / scalar, z: self.z / scalar, w: self.w / scalar }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texel_round_trip() {
        let v = Vec4d::from_texel([1u32, 2, 3, 4]);
        assert_eq!(v, Vec4d::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(v.to_texel::<i32>(), [1, 2, 3, 4]);
        assert_eq!((v / 4.0).to_texel::<f32>(), [0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn lerp_endpoints_and_middle() {
        let a = Vec4d::new(0.0, 1.0, 2.0, 1.0);
        let b = Vec4d::new(1.0, 3.0, 2.0, 1.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Vec4d::new(0.5, 2.0, 2.0, 1.0));
    }

    #[test]
    fn accumulate() {
        let mut sum = Vec4d::ZERO;
        sum += Vec4d::new(1.0, 0.0, 0.0, 1.0) * 0.25;
        sum += Vec4d::new(0.0, 1.0, 0.0, 1.0) * 0.75;
        assert_eq!(sum, Vec4d::new(0.25, 0.75, 0.0, 1.0));
    }
}
