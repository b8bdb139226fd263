use super::mipmaps::generate_mipmaps;
use super::sampler::{fetch, lookup, write};
use super::*;
use crate::math::*;
use crate::storage::TextureArrayNd;
use crate::storage::storage_linear::fill_blocks;
use crate::{Error, Result};

/// A sampler over every layer of a 1D or 2D texture array. Lookups name the
/// layer explicitly; filtering never crosses layers.
#[derive(Debug, Clone)]
pub struct ArraySampler<T: TexelScalar, const N: usize> {
    texture: TextureArrayNd<N>,
    converter: Converter<T>,
    config: SamplerConfig<T>,
}

pub type Sampler1dArray<T> = ArraySampler<T, 1>;
pub type Sampler2dArray<T> = ArraySampler<T, 2>;

pub type FSampler1dArray = Sampler1dArray<f32>;
pub type FSampler2dArray = Sampler2dArray<f32>;
pub type DSampler1dArray = Sampler1dArray<f64>;
pub type DSampler2dArray = Sampler2dArray<f64>;
pub type USampler1dArray = Sampler1dArray<u32>;
pub type USampler2dArray = Sampler2dArray<u32>;
pub type ISampler1dArray = Sampler1dArray<i32>;
pub type ISampler2dArray = Sampler2dArray<i32>;

impl<T: TexelScalar, const N: usize> ArraySampler<T, N> {
    pub fn new(texture: TextureArrayNd<N>, wrap: Wrap, mip: Filter, min: Filter) -> Result<Self> {
        Self::with_config(texture, &SamplerConfig { wrap, mip, min, ..Default::default() })
    }

    pub fn with_config(texture: TextureArrayNd<N>, config: &SamplerConfig<T>) -> Result<Self> {
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

    pub fn texture(&self) -> &TextureArrayNd<N> {
        &self.texture
    }

    pub fn into_texture(self) -> TextureArrayNd<N> {
        self.texture
    }

    pub fn texel_fetch(&self, coord: [u32; N], layer: usize, level: usize) -> Result<Texel<T>> {
        fetch(&self.texture, &self.converter, coord, layer, level)
    }

    pub fn texel_write(&mut self, coord: [u32; N], layer: usize, level: usize, texel: Texel<T>) -> Result<()> {
        write(&mut self.texture, &self.converter, coord, layer, level, texel)
    }

    /// Writes `texel` to every texel of every layer and level.
    pub fn clear(&mut self, texel: Texel<T>) -> Result<()> {
        let block = self.converter.encode(texel);
        self.texture.for_each_slice_mut(|slice| fill_blocks(slice, &block))
    }

    /// Filtered lookup at normalized `coord` of `layer`, `level` being the level of detail.
    pub fn texture_lod(&self, coord: [T::Interp; N], layer: usize, level: T::Interp) -> Result<Texel<T>> {
        lookup(&self.texture, &self.converter, &self.config, coord, layer, level)
    }

    /// Regenerates every level below the first one, in every layer.
    pub fn generate_mipmaps(&mut self, filter: Filter) -> Result<()> {
        let levels = self.texture.levels();
        if levels < 2 {
            return Ok(());
        }
        self.generate_mipmaps_range(0, self.texture.layers() - 1, 0, levels - 1, filter)
    }

    /// Regenerates levels `base_level + 1..=max_level` of layers `base_layer..=max_layer`.
    pub fn generate_mipmaps_range(
        &mut self,
        base_layer: usize,
        max_layer: usize,
        base_level: usize,
        max_level: usize,
        filter: Filter,
    ) -> Result<()> {
        generate_mipmaps::<T, N>(&mut self.texture, &self.converter, base_layer..=max_layer, base_level, max_level, filter)
    }
}
