use super::Converter;
use crate::math::*;
use crate::storage::Texture;
use crate::{Error, Result};
use arrayvec::ArrayVec;

/// Addressing of coordinates outside `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wrap {
    #[default]
    Repeat,
    MirrorRepeat,
    ClampToEdge,
    ClampToBorder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    Nearest,
    Linear,
}

/// Maps an integer texel coordinate into `0..extent`. `None` means the border texel.
pub fn wrap_coord(coord: i64, extent: u32, wrap: Wrap) -> Option<u32> {
    let extent = extent as i64;
    let wrapped = match wrap {
        Wrap::Repeat => coord.rem_euclid(extent),
        Wrap::MirrorRepeat => {
            let period = coord.rem_euclid(2 * extent);
            if period < extent { period } else { 2 * extent - 1 - period }
        }
        Wrap::ClampToEdge => coord.clamp(0, extent - 1),
        Wrap::ClampToBorder => {
            if coord < 0 || coord >= extent {
                return None;
            }
            coord
        }
    };
    Some(wrapped as u32)
}

/// Brings a texel-space coordinate within one wrap period of `0..extent`,
/// addressing the same texels, so that the integer cast cannot saturate.
fn reduce(x: f64, extent: u32, wrap: Wrap) -> f64 {
    let extent = extent as f64;
    let x = match wrap {
        Wrap::Repeat => x.rem_euclid(extent),
        Wrap::MirrorRepeat => x.rem_euclid(2.0 * extent),
        Wrap::ClampToEdge | Wrap::ClampToBorder => x.clamp(-2.0, extent + 1.0),
    };
    // NaN, and infinities under a repeating wrap, address texel 0
    if x.is_nan() { 0.0 } else { x }
}

/// Row-major index of `coord`, x fastest.
pub(crate) fn linear_index<const N: usize>(coord: [u32; N], extent: [u32; N]) -> usize {
    let mut index = 0usize;
    for axis in (0..N).rev() {
        index = index * extent[axis] as usize + coord[axis] as usize;
    }
    index
}

/// The first N axes of the extent of `level`.
pub(crate) fn level_axes<const N: usize>(texture: &Texture, level: usize) -> [u32; N] {
    let extent = texture.extent(level).to_array();
    std::array::from_fn(|axis| extent[axis])
}

/// Inverse of `linear_index`.
pub(crate) fn coord_of<const N: usize>(mut index: usize, extent: [u32; N]) -> [u32; N] {
    std::array::from_fn(|axis| {
        let coord = index % extent[axis] as usize;
        index /= extent[axis] as usize;
        coord as u32
    })
}

/// The texels of one (layer, face, level) slice, decoded on demand.
pub(crate) struct LevelTexels<'a, T: TexelScalar, const N: usize> {
    pub data: &'a [u8],
    pub extent: [u32; N],
    pub converter: &'a Converter<T>,
}

impl<T: TexelScalar, const N: usize> LevelTexels<'_, T, N> {
    pub fn fetch(&self, coord: [u32; N]) -> Texel<T> {
        let block_size = self.converter.format().block_size();
        let offset = linear_index(coord, self.extent) * block_size;
        self.converter.fetch(&self.data[offset..offset + block_size])
    }

    fn fetch_wrapped(&self, coord: [i64; N], wrap: Wrap, border: Texel<T>) -> Texel<T> {
        let mut wrapped = [0u32; N];
        for axis in 0..N {
            match wrap_coord(coord[axis], self.extent[axis], wrap) {
                Some(c) => wrapped[axis] = c,
                None => return border,
            }
        }
        self.fetch(wrapped)
    }

    /// Texel `floor(u * extent)` on every axis.
    pub fn nearest(&self, uv: [f64; N], wrap: Wrap, border: Texel<T>) -> Vec4d {
        let coord = std::array::from_fn(|axis| {
            let extent = self.extent[axis];
            reduce(uv[axis] * extent as f64, extent, wrap).floor() as i64
        });
        Vec4d::from_texel(self.fetch_wrapped(coord, wrap, border))
    }

    /// Multilinear blend of the 2^N texels around `u * extent - 0.5`.
    pub fn linear(&self, uv: [f64; N], wrap: Wrap, border: Texel<T>) -> Vec4d {
        let mut base = [0i64; N];
        let mut frac = [0f64; N];
        for axis in 0..N {
            let extent = self.extent[axis];
            let x = reduce(uv[axis] * extent as f64 - 0.5, extent, wrap);
            let floor = x.floor();
            base[axis] = floor as i64;
            frac[axis] = x - floor;
        }

        let mut corners = ArrayVec::<([i64; N], f64), 8>::new();
        for mask in 0..(1usize << N) {
            let mut coord = base;
            let mut weight = 1.0;
            for axis in 0..N {
                if mask & (1 << axis) != 0 {
                    coord[axis] += 1;
                    weight *= frac[axis];
                } else {
                    weight *= 1.0 - frac[axis];
                }
            }
            if weight != 0.0 {
                corners.push((coord, weight));
            }
        }

        let mut sum = Vec4d::ZERO;
        for (coord, weight) in corners {
            sum += Vec4d::from_texel(self.fetch_wrapped(coord, wrap, border)) * weight;
        }
        sum
    }

    pub fn sample(&self, uv: [f64; N], wrap: Wrap, filter: Filter, border: Texel<T>) -> Vec4d {
        match filter {
            Filter::Nearest => self.nearest(uv, wrap, border),
            Filter::Linear => self.linear(uv, wrap, border),
        }
    }
}

/// Levels contributing to a lookup: `lower` blended towards `upper` by `weight`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LevelBlend {
    pub lower: usize,
    pub upper: usize,
    pub weight: f64,
}

/// Picks the levels a level of detail resolves to. Negative and NaN levels clamp
/// to 0; any level below `levels` stays on the chain, clamped to its last level.
pub(crate) fn resolve_level(lod: f64, levels: usize, mip: Filter) -> Result<LevelBlend> {
    let lod = if lod > 0.0 { lod } else { 0.0 };
    if lod >= levels as f64 {
        // float to int casts saturate
        return Err(Error::out_of_range("level", lod as usize, levels));
    }
    let last = levels - 1;
    let blend = match mip {
        Filter::Nearest => {
            let level = (lod.round() as usize).min(last);
            LevelBlend { lower: level, upper: level, weight: 0.0 }
        }
        Filter::Linear => {
            let lower = lod.floor() as usize;
            let upper = (lower + 1).min(last);
            let weight = if upper > lower { lod - lod.floor() } else { 0.0 };
            LevelBlend { lower, upper, weight }
        }
    };
    Ok(blend)
}
