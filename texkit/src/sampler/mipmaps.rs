use super::filter::{LevelTexels, coord_of, level_axes};
use super::{Converter, Filter};
use crate::math::*;
use crate::storage::Texture;
use crate::{Error, Result};
use std::ops::RangeInclusive;

/// Rebuilds levels `base + 1..=max` of every face of `layers`, each from the level above it.
pub(crate) fn generate_mipmaps<T: TexelScalar, const N: usize>(
    texture: &mut Texture,
    converter: &Converter<T>,
    layers: RangeInclusive<usize>,
    base: usize,
    max: usize,
    filter: Filter,
) -> Result<()> {
    let (base_layer, max_layer) = layers.into_inner();
    if max_layer >= texture.layers() {
        return Err(Error::out_of_range("layer", max_layer, texture.layers()));
    }
    if base_layer > max_layer {
        return Err(Error::out_of_range("layer", base_layer, max_layer + 1));
    }
    if max >= texture.levels() {
        return Err(Error::out_of_range("level", max, texture.levels()));
    }
    if base >= max {
        return Err(Error::out_of_range("level", base, max));
    }

    let block_size = converter.format().block_size();
    for layer in base_layer..=max_layer {
        for face in 0..texture.faces() {
            for level in base + 1..=max {
                let src_extent = level_axes::<N>(texture, level - 1);
                let dst_extent = level_axes::<N>(texture, level);
                let source = texture.data(layer, face, level - 1)?.to_vec();
                let source = LevelTexels { data: &source, extent: src_extent, converter };

                let mut dst = texture.data_mut(layer, face, level)?;
                for (index, block) in dst.chunks_exact_mut(block_size).enumerate() {
                    let coord = coord_of(index, dst_extent);
                    let texel = match filter {
                        Filter::Nearest => source.fetch(downsample(coord, 0, src_extent)),
                        Filter::Linear => box_filter(&source, coord).to_texel(),
                    };
                    converter.write(block, texel);
                }
                log::debug!(
                    "Generated level {} ({:?}) of layer {} face {} with {:?} filter",
                    level,
                    dst_extent,
                    layer,
                    face,
                    filter
                );
            }
        }
    }
    Ok(())
}

/// Source texel `2 * coord + offset`, clamped to the source level.
fn downsample<const N: usize>(coord: [u32; N], mask: usize, src_extent: [u32; N]) -> [u32; N] {
    std::array::from_fn(|axis| {
        let offset = ((mask >> axis) & 1) as u32;
        (coord[axis] * 2 + offset).min(src_extent[axis] - 1)
    })
}

/// Mean of the 2^N source texels covering `coord`.
fn box_filter<T: TexelScalar, const N: usize>(source: &LevelTexels<'_, T, N>, coord: [u32; N]) -> Vec4d {
    let corners = 1usize << N;
    let mut sum = Vec4d::ZERO;
    for mask in 0..corners {
        sum += Vec4d::from_texel(source.fetch(downsample(coord, mask, source.extent)));
    }
    sum / corners as f64
}
