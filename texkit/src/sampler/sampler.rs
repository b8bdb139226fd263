use super::filter::{LevelTexels, level_axes, linear_index, resolve_level};
use super::mipmaps::generate_mipmaps;
use super::*;
use crate::math::*;
use crate::storage::storage_linear::fill_blocks;
use crate::storage::{Extent3d, Texture, TextureNd};
use crate::{Error, Result};

/// Sampling state applied to every lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerConfig<T: TexelScalar> {
    pub wrap: Wrap,
    /// Blending between levels.
    pub mip: Filter,
    /// Filtering within a level.
    pub min: Filter,
    /// Texel returned for coordinates outside a `ClampToBorder` texture.
    pub border: Texel<T>,
}

impl<T: TexelScalar> Default for SamplerConfig<T> {
    fn default() -> Self {
        Self { wrap: Wrap::default(), mip: Filter::default(), min: Filter::default(), border: opaque_black() }
    }
}

/// Format-converting reads, writes and filtered lookups over an N-dimensional texture.
/// The sampler holds the texture by value; its storage stays shared with the caller's copies.
#[derive(Debug, Clone)]
pub struct Sampler<T: TexelScalar, const N: usize> {
    texture: TextureNd<N>,
    converter: Converter<T>,
    config: SamplerConfig<T>,
}

pub type Sampler1d<T> = Sampler<T, 1>;
pub type Sampler2d<T> = Sampler<T, 2>;
pub type Sampler3d<T> = Sampler<T, 3>;

pub type FSampler1d = Sampler1d<f32>;
pub type FSampler2d = Sampler2d<f32>;
pub type FSampler3d = Sampler3d<f32>;
pub type DSampler1d = Sampler1d<f64>;
pub type DSampler2d = Sampler2d<f64>;
pub type DSampler3d = Sampler3d<f64>;
pub type USampler1d = Sampler1d<u32>;
pub type USampler2d = Sampler2d<u32>;
pub type USampler3d = Sampler3d<u32>;
pub type ISampler1d = Sampler1d<i32>;
pub type ISampler2d = Sampler2d<i32>;
pub type ISampler3d = Sampler3d<i32>;

impl<T: TexelScalar, const N: usize> Sampler<T, N> {
    pub fn new(texture: TextureNd<N>, wrap: Wrap, mip: Filter, min: Filter) -> Result<Self> {
        Self::with_config(texture, &SamplerConfig { wrap, mip, min, ..Default::default() })
    }

    pub fn with_config(texture: TextureNd<N>, config: &SamplerConfig<T>) -> Result<Self> {
        let converter = Converter::new(texture.format())?;
        if texture.is_empty() {
            return Err(Error::InvalidFormat(texture.format()));
        }
        Ok(Self { texture, converter, config: *config })
    }

    pub fn config(&self) -> &SamplerConfig<T> {
        &self.config
    }

    pub fn set_border_color(&mut self, color: Texel<T>) {
        self.config.border = color;
    }

    pub fn border_color(&self) -> Texel<T> {
        self.config.border
    }

    pub fn texture(&self) -> &TextureNd<N> {
        &self.texture
    }

    pub fn into_texture(self) -> TextureNd<N> {
        self.texture
    }

    /// Reads the texel at integer `coord` of `level`, without filtering.
    pub fn texel_fetch(&self, coord: [u32; N], level: usize) -> Result<Texel<T>> {
        fetch(&self.texture, &self.converter, coord, 0, level)
    }

    /// Encodes `texel` into the texel at `coord` of `level`.
    pub fn texel_write(&mut self, coord: [u32; N], level: usize, texel: Texel<T>) -> Result<()> {
        write(&mut self.texture, &self.converter, coord, 0, level, texel)
    }

    /// Writes `texel` to every texel of every level.
    pub fn clear(&mut self, texel: Texel<T>) -> Result<()> {
        let block = self.converter.encode(texel);
        self.texture.for_each_slice_mut(|slice| fill_blocks(slice, &block))
    }

    /// Filtered lookup at normalized `coord`, `level` being the level of detail.
    pub fn texture_lod(&self, coord: [T::Interp; N], level: T::Interp) -> Result<Texel<T>> {
        lookup(&self.texture, &self.converter, &self.config, coord, 0, level)
    }

    /// Regenerates every level below the first one.
    pub fn generate_mipmaps(&mut self, filter: Filter) -> Result<()> {
        let levels = self.texture.levels();
        if levels < 2 {
            return Ok(());
        }
        self.generate_mipmaps_range(0, levels - 1, filter)
    }

    /// Regenerates levels `base + 1..=max`, each from the level above it.
    pub fn generate_mipmaps_range(&mut self, base: usize, max: usize, filter: Filter) -> Result<()> {
        generate_mipmaps::<T, N>(&mut self.texture, &self.converter, 0..=0, base, max, filter)
    }
}

fn check_coord<const N: usize>(texture: &Texture, coord: [u32; N], layer: usize, level: usize) -> Result<()> {
    if layer >= texture.layers() {
        return Err(Error::out_of_range("layer", layer, texture.layers()));
    }
    if level >= texture.levels() {
        return Err(Error::out_of_range("level", level, texture.levels()));
    }
    Extent3d::from_slice(&level_axes::<N>(texture, level), 1).check_contains(Extent3d::from_slice(&coord, 0))
}

pub(super) fn fetch<T: TexelScalar, const N: usize>(
    texture: &Texture,
    converter: &Converter<T>,
    coord: [u32; N],
    layer: usize,
    level: usize,
) -> Result<Texel<T>> {
    check_coord(texture, coord, layer, level)?;
    let data = texture.data(layer, 0, level)?;
    let texels = LevelTexels { data: &data, extent: level_axes(texture, level), converter };
    Ok(texels.fetch(coord))
}

/// Nothing is written unless `coord`, `layer` and `level` all address a texel.
pub(super) fn write<T: TexelScalar, const N: usize>(
    texture: &mut Texture,
    converter: &Converter<T>,
    coord: [u32; N],
    layer: usize,
    level: usize,
    texel: Texel<T>,
) -> Result<()> {
    check_coord(texture, coord, layer, level)?;
    let block_size = converter.format().block_size();
    let offset = linear_index(coord, level_axes(texture, level)) * block_size;
    let mut data = texture.data_mut(layer, 0, level)?;
    converter.write(&mut data[offset..offset + block_size], texel);
    Ok(())
}

fn sample_level<T: TexelScalar, const N: usize>(
    texture: &Texture,
    converter: &Converter<T>,
    config: &SamplerConfig<T>,
    uv: [f64; N],
    layer: usize,
    level: usize,
) -> Result<Vec4d> {
    let data = texture.data(layer, 0, level)?;
    let texels = LevelTexels { data: &data, extent: level_axes(texture, level), converter };
    Ok(texels.sample(uv, config.wrap, config.min, config.border))
}

/// Filtered lookup in `layer`, blending the levels `lod` resolves to.
pub(super) fn lookup<T: TexelScalar, const N: usize>(
    texture: &Texture,
    converter: &Converter<T>,
    config: &SamplerConfig<T>,
    coord: [T::Interp; N],
    layer: usize,
    lod: T::Interp,
) -> Result<Texel<T>> {
    if layer >= texture.layers() {
        return Err(Error::out_of_range("layer", layer, texture.layers()));
    }
    let uv = coord.map(Into::<f64>::into);
    let blend = resolve_level(lod.into(), texture.levels(), config.mip)?;
    let lower = sample_level(texture, converter, config, uv, layer, blend.lower)?;
    if blend.weight == 0.0 {
        return Ok(lower.to_texel());
    }
    let upper = sample_level(texture, converter, config, uv, layer, blend.upper)?;
    Ok(lower.lerp(upper, blend.weight).to_texel())
}
