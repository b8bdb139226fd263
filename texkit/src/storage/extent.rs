use crate::{Error, Result};

/// Size of a texture level, or a texel coordinate inside one, in texels.
/// Unused axes of 1D/2D resources hold 1 for extents and 0 for coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extent3d {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Default for Extent3d {
    fn default() -> Self {
        Self { x: 1, y: 1, z: 1 }
    }
}

impl Extent3d {
    pub const ZERO: Extent3d = Extent3d { x: 0, y: 0, z: 0 };
    pub const ONE: Extent3d = Extent3d { x: 1, y: 1, z: 1 };

    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [u32; 3] {
        [self.x, self.y, self.z]
    }

    pub fn from_array(axes: [u32; 3]) -> Self {
        Self { x: axes[0], y: axes[1], z: axes[2] }
    }

    /// Builds an extent from the first N axes, padding the rest with `fill`.
    pub fn from_slice(axes: &[u32], fill: u32) -> Self {
        let mut full = [fill; 3];
        for (dst, src) in full.iter_mut().zip(axes) {
            *dst = *src;
        }
        Self::from_array(full)
    }

    pub fn volume(self) -> usize {
        self.x as usize * self.y as usize * self.z as usize
    }

    pub fn has_zero(self) -> bool {
        self.x == 0 || self.y == 0 || self.z == 0
    }

    /// Extent of the given mip level: each axis halved per level, never below 1.
    pub fn mip(self, level: usize) -> Self {
        let shrink = |axis: u32| -> u32 { axis.checked_shr(level as u32).unwrap_or(0).max(1) };
        Self { x: shrink(self.x), y: shrink(self.y), z: shrink(self.z) }
    }

    /// Number of blocks needed to cover this extent with the given block footprint.
    pub fn blocks(self, block: Extent3d) -> Self {
        Self { x: self.x.div_ceil(block.x), y: self.y.div_ceil(block.y), z: self.z.div_ceil(block.z) }
    }

    /// Length of the complete mip chain of this extent.
    pub fn max_levels(self) -> usize {
        let largest = self.x.max(self.y).max(self.z).max(1);
        (u32::BITS - largest.leading_zeros()) as usize
    }

    /// Row-major index of `coord` inside this extent, x fastest.
    pub fn linear_index(self, coord: Extent3d) -> usize {
        (coord.z as usize * self.y as usize + coord.y as usize) * self.x as usize + coord.x as usize
    }

    pub fn contains(self, coord: Extent3d) -> bool {
        coord.x < self.x && coord.y < self.y && coord.z < self.z
    }

    /// Fails with `IndexOutOfRange` naming the first axis of `coord` outside this extent.
    pub fn check_contains(self, coord: Extent3d) -> Result<()> {
        let axes = [("texel x", coord.x, self.x), ("texel y", coord.y, self.y), ("texel z", coord.z, self.z)];
        match axes.into_iter().find(|(_, index, count)| index >= count) {
            Some((what, index, count)) => Err(Error::out_of_range(what, index as usize, count as usize)),
            None => Ok(()),
        }
    }
}

impl From<[u32; 1]> for Extent3d {
    fn from(v: [u32; 1]) -> Self {
        Extent3d::new(v[0], 1, 1)
    }
}

impl From<[u32; 2]> for Extent3d {
    fn from(v: [u32; 2]) -> Self {
        Extent3d::new(v[0], v[1], 1)
    }
}

impl From<[u32; 3]> for Extent3d {
    fn from(v: [u32; 3]) -> Self {
        Extent3d::new(v[0], v[1], v[2])
    }
}

impl std::ops::Mul for Extent3d {
    type Output = Extent3d;
    fn mul(self, rhs: Extent3d) -> Extent3d {
        Extent3d { x: self.x * rhs.x, y: self.y * rhs.y, z: self.z * rhs.z }
    }
}
