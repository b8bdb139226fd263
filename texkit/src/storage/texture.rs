use super::*;
use crate::{Error, Result};
use bytemuck::Pod;
use std::cell::{Ref, RefMut};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    Tex1d,
    Tex1dArray,
    #[default]
    Tex2d,
    Tex2dArray,
    Tex3d,
    Cube,
    CubeArray,
}

impl Target {
    pub fn is_array(self) -> bool {
        matches!(self, Target::Tex1dArray | Target::Tex2dArray | Target::CubeArray)
    }

    pub fn is_cube(self) -> bool {
        matches!(self, Target::Cube | Target::CubeArray)
    }

    /// Number of meaningful extent axes.
    pub fn dimensions(self) -> usize {
        match self {
            Target::Tex1d | Target::Tex1dArray => 1,
            Target::Tex2d | Target::Tex2dArray | Target::Cube | Target::CubeArray => 2,
            Target::Tex3d => 3,
        }
    }
}

/// A texture over a shared `StorageLinear`: a format, a target, and the range of
/// layers, faces and levels it exposes. Cloning shares the storage.
///
/// Geometry queries never touch the storage. Data access borrows it and fails
/// with `StorageBusy` while a conflicting borrow from another holder is alive.
#[derive(Clone, Default)]
pub struct Texture {
    storage: Option<SharedStorage>,
    target: Target,
    format: Format,
    storage_format: Format,
    // level 0 of the storage, in texels of `storage_format`
    storage_extent: Extent3d,
    base_layer: usize,
    max_layer: usize,
    base_face: usize,
    max_face: usize,
    base_level: usize,
    max_level: usize,
}

impl Texture {
    pub fn new(
        target: Target,
        format: Format,
        extent: Extent3d,
        layers: usize,
        faces: usize,
        levels: usize,
    ) -> Result<Self> {
        let dims = target.dimensions();
        let shape_ok = (dims >= 2 || extent.y == 1)
            && (dims >= 3 || extent.z == 1)
            && (target.is_array() || layers == 1)
            && (faces == if target.is_cube() { 6 } else { 1 });
        if !shape_ok {
            return Err(Error::InvalidExtent(extent));
        }

        let storage = StorageLinear::new(format, extent, layers, faces, levels)?.into_shared();
        Ok(Self {
            storage: Some(storage),
            target,
            format,
            storage_format: format,
            storage_extent: extent,
            base_layer: 0,
            max_layer: layers - 1,
            base_face: 0,
            max_face: faces - 1,
            base_level: 0,
            max_level: levels - 1,
        })
    }

    /// A texture sharing this one's storage, seen as `format` and narrowed to
    /// levels `base_level..=max_level` (relative to this texture).
    pub fn view(&self, format: Format, base_level: usize, max_level: usize) -> Result<Self> {
        self.storage()?;
        check_compatible(self.format, format)?;
        if max_level >= self.levels() {
            return Err(Error::out_of_range("level", max_level, self.levels()));
        }
        if base_level > max_level {
            return Err(Error::out_of_range("level", base_level, max_level + 1));
        }
        log::trace!("Texture view {:?} -> {:?}, levels {}..={}", self.format, format, base_level, max_level);
        Ok(Self {
            format,
            base_level: self.base_level + base_level,
            max_level: self.base_level + max_level,
            ..self.clone()
        })
    }

    pub(crate) fn storage(&self) -> Result<&SharedStorage> {
        self.storage.as_ref().ok_or(Error::InvalidFormat(self.format))
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_none()
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn base_layer(&self) -> usize {
        self.base_layer
    }

    pub fn max_layer(&self) -> usize {
        self.max_layer
    }

    pub fn layers(&self) -> usize {
        if self.is_empty() { 0 } else { self.max_layer - self.base_layer + 1 }
    }

    pub fn base_face(&self) -> usize {
        self.base_face
    }

    pub fn max_face(&self) -> usize {
        self.max_face
    }

    pub fn faces(&self) -> usize {
        if self.is_empty() { 0 } else { self.max_face - self.base_face + 1 }
    }

    pub fn base_level(&self) -> usize {
        self.base_level
    }

    pub fn max_level(&self) -> usize {
        self.max_level
    }

    pub fn levels(&self) -> usize {
        if self.is_empty() { 0 } else { self.max_level - self.base_level + 1 }
    }

    /// Extent of `level` (relative to the base level) in this texture's format.
    pub fn extent(&self, level: usize) -> Extent3d {
        if self.is_empty() {
            return Extent3d::ZERO;
        }
        view_extent(self.storage_extent.mip(self.base_level + level), self.storage_format, self.format)
    }

    /// Bytes of one (layer, face) slice at `level`.
    pub fn level_size(&self, level: usize) -> usize {
        if self.is_empty() {
            return 0;
        }
        slice_size(self.storage_format, self.storage_extent.mip(self.base_level + level))
    }

    /// Bytes covered by every layer, face and level of this texture.
    pub fn size(&self) -> usize {
        let per_face: usize = (0..self.levels()).map(|level| self.level_size(level)).sum();
        per_face * self.faces() * self.layers()
    }

    /// Number of holders sharing the storage, this texture included.
    pub fn shared_storage_count(&self) -> usize {
        self.storage.as_ref().map_or(0, Rc::strong_count)
    }

    /// Drops this holder and reports how many remain on the storage.
    pub fn release(self) -> usize {
        let remaining = self.shared_storage_count().saturating_sub(1);
        log::debug!("Texture released, {} holder(s) left on {:?} storage", remaining, self.format);
        remaining
    }

    fn slice_range(&self, storage: &StorageLinear, layer: usize, face: usize, level: usize) -> Result<(usize, usize)> {
        if layer >= self.layers() {
            return Err(Error::out_of_range("layer", layer, self.layers()));
        }
        if face >= self.faces() {
            return Err(Error::out_of_range("face", face, self.faces()));
        }
        if level >= self.levels() {
            return Err(Error::out_of_range("level", level, self.levels()));
        }
        let level = self.base_level + level;
        let offset = storage.offset(self.base_layer + layer, self.base_face + face, level)?;
        Ok((offset, storage.level_size(level)))
    }

    /// Bytes of the (layer, face, level) slice.
    pub fn data(&self, layer: usize, face: usize, level: usize) -> Result<Ref<'_, [u8]>> {
        let storage = borrow_storage(self.storage()?)?;
        let (offset, size) = self.slice_range(&storage, layer, face, level)?;
        Ok(Ref::map(storage, |s| &s.data()[offset..offset + size]))
    }

    pub fn data_mut(&mut self, layer: usize, face: usize, level: usize) -> Result<RefMut<'_, [u8]>> {
        let storage = borrow_storage_mut(self.storage()?)?;
        let (offset, size) = self.slice_range(&storage, layer, face, level)?;
        Ok(RefMut::map(storage, |s| &mut s.data_mut()[offset..offset + size]))
    }

    /// Calls `f` with every (layer, face, level) slice of this texture.
    pub(crate) fn for_each_slice_mut(&mut self, mut f: impl FnMut(&mut [u8])) -> Result<()> {
        let mut storage = borrow_storage_mut(self.storage()?)?;
        for layer in 0..self.layers() {
            for face in 0..self.faces() {
                for level in 0..self.levels() {
                    let (offset, size) = self.slice_range(&storage, layer, face, level)?;
                    f(&mut storage.data_mut()[offset..offset + size]);
                }
            }
        }
        Ok(())
    }

    /// Zeroes every slice of this texture.
    pub fn clear(&mut self) -> Result<()> {
        self.for_each_slice_mut(|slice| slice.fill(0))
    }

    /// Writes the bytes of `texel` verbatim into every block of every slice.
    pub fn clear_with<T: Pod>(&mut self, texel: T) -> Result<()> {
        check_texel_size::<T>(self.format)?;
        self.for_each_slice_mut(|slice| fill_blocks(slice, bytemuck::bytes_of(&texel)))
    }

    fn texel_range(&self, storage: &StorageLinear, coord: Extent3d, layer: usize, face: usize, level: usize) -> Result<usize> {
        let (offset, _) = self.slice_range(storage, layer, face, level)?;
        let extent = self.extent(level);
        extent.check_contains(coord)?;
        Ok(offset + extent.linear_index(coord) * self.format.block_size())
    }

    /// Reads the block at `coord` as `T`. The format must be uncompressed and
    /// `T` exactly one block wide.
    pub fn load<T: Pod>(&self, coord: Extent3d, layer: usize, face: usize, level: usize) -> Result<T> {
        check_texel_access::<T>(self.format)?;
        let storage = borrow_storage(self.storage()?)?;
        let offset = self.texel_range(&storage, coord, layer, face, level)?;
        Ok(bytemuck::pod_read_unaligned(&storage.data()[offset..offset + size_of::<T>()]))
    }

    pub fn store<T: Pod>(&mut self, coord: Extent3d, layer: usize, face: usize, level: usize, texel: T) -> Result<()> {
        check_texel_access::<T>(self.format)?;
        let mut storage = borrow_storage_mut(self.storage()?)?;
        let offset = self.texel_range(&storage, coord, layer, face, level)?;
        storage.data_mut()[offset..offset + size_of::<T>()].copy_from_slice(bytemuck::bytes_of(&texel));
        Ok(())
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("target", &self.target)
            .field("format", &self.format)
            .field("extent", &self.extent(0))
            .field("layers", &self.layers())
            .field("faces", &self.faces())
            .field("levels", &self.levels())
            .finish()
    }
}

pub(crate) fn check_texel_size<T>(format: Format) -> Result<()> {
    if size_of::<T>() != format.block_size() {
        return Err(Error::BlockSizeMismatch { block_size: format.block_size(), texel_size: size_of::<T>() });
    }
    Ok(())
}

pub(crate) fn check_texel_access<T>(format: Format) -> Result<()> {
    if format.is_compressed() {
        return Err(Error::CompressedAccess(format));
    }
    check_texel_size::<T>(format)
}

/// A texture with N meaningful axes: 1D, 2D or 3D, one layer and one face.
#[derive(Clone, Default, Debug)]
pub struct TextureNd<const N: usize> {
    texture: Texture,
}

pub type Texture1d = TextureNd<1>;
pub type Texture2d = TextureNd<2>;
pub type Texture3d = TextureNd<3>;

impl<const N: usize> TextureNd<N> {
    pub const TARGET: Target = match N {
        1 => Target::Tex1d,
        2 => Target::Tex2d,
        3 => Target::Tex3d,
        _ => panic!("textures have 1, 2 or 3 dimensions"),
    };

    pub fn new(format: Format, extent: [u32; N], levels: usize) -> Result<Self> {
        let extent = Extent3d::from_slice(&extent, 1);
        let texture = Texture::new(Self::TARGET, format, extent, 1, 1, levels)?;
        Ok(Self { texture })
    }

    /// A texture with the complete mip chain of `extent`.
    pub fn with_mip_chain(format: Format, extent: [u32; N]) -> Result<Self> {
        let levels = Extent3d::from_slice(&extent, 1).max_levels();
        Self::new(format, extent, levels)
    }

    pub fn extent(&self, level: usize) -> [u32; N] {
        let full = self.texture.extent(level).to_array();
        std::array::from_fn(|axis| full[axis])
    }

    /// An image viewing `level` of this texture.
    pub fn image(&self, level: usize) -> Result<Image> {
        Image::from_texture(&self.texture, self.texture.format(), 0, 0, level)
    }

    pub fn view(&self, format: Format, base_level: usize, max_level: usize) -> Result<Self> {
        Ok(Self { texture: self.texture.view(format, base_level, max_level)? })
    }

    pub fn as_texture(&self) -> &Texture {
        &self.texture
    }

    pub fn as_texture_mut(&mut self) -> &mut Texture {
        &mut self.texture
    }

    pub fn into_texture(self) -> Texture {
        self.texture
    }

    pub fn release(self) -> usize {
        self.texture.release()
    }
}

impl<const N: usize> std::ops::Deref for TextureNd<N> {
    type Target = Texture;
    fn deref(&self) -> &Texture {
        &self.texture
    }
}

impl<const N: usize> std::ops::DerefMut for TextureNd<N> {
    fn deref_mut(&mut self) -> &mut Texture {
        &mut self.texture
    }
}

impl<const N: usize> TryFrom<Texture> for TextureNd<N> {
    type Error = Error;

    fn try_from(texture: Texture) -> Result<Self> {
        if texture.target() != Self::TARGET || texture.layers() != 1 || texture.faces() != 1 {
            return Err(Error::InvalidExtent(texture.extent(0)));
        }
        Ok(Self { texture })
    }
}

/// An array of 1D or 2D textures sharing one format and mip chain.
#[derive(Clone, Default, Debug)]
pub struct TextureArrayNd<const N: usize> {
    texture: Texture,
}

pub type Texture1dArray = TextureArrayNd<1>;
pub type Texture2dArray = TextureArrayNd<2>;

impl<const N: usize> TextureArrayNd<N> {
    pub const TARGET: Target = match N {
        1 => Target::Tex1dArray,
        2 => Target::Tex2dArray,
        _ => panic!("texture arrays have 1 or 2 dimensions"),
    };

    pub fn new(format: Format, extent: [u32; N], layers: usize, levels: usize) -> Result<Self> {
        let extent = Extent3d::from_slice(&extent, 1);
        let texture = Texture::new(Self::TARGET, format, extent, layers, 1, levels)?;
        Ok(Self { texture })
    }

    pub fn with_mip_chain(format: Format, extent: [u32; N], layers: usize) -> Result<Self> {
        let levels = Extent3d::from_slice(&extent, 1).max_levels();
        Self::new(format, extent, layers, levels)
    }

    pub fn extent(&self, level: usize) -> [u32; N] {
        let full = self.texture.extent(level).to_array();
        std::array::from_fn(|axis| full[axis])
    }

    /// An image viewing `level` of `layer`.
    pub fn image(&self, layer: usize, level: usize) -> Result<Image> {
        Image::from_texture(&self.texture, self.texture.format(), layer, 0, level)
    }

    pub fn view(&self, format: Format, base_level: usize, max_level: usize) -> Result<Self> {
        Ok(Self { texture: self.texture.view(format, base_level, max_level)? })
    }

    pub fn as_texture(&self) -> &Texture {
        &self.texture
    }

    pub fn into_texture(self) -> Texture {
        self.texture
    }

    pub fn release(self) -> usize {
        self.texture.release()
    }
}

impl<const N: usize> std::ops::Deref for TextureArrayNd<N> {
    type Target = Texture;
    fn deref(&self) -> &Texture {
        &self.texture
    }
}

impl<const N: usize> std::ops::DerefMut for TextureArrayNd<N> {
    fn deref_mut(&mut self) -> &mut Texture {
        &mut self.texture
    }
}

impl<const N: usize> TryFrom<Texture> for TextureArrayNd<N> {
    type Error = Error;

    fn try_from(texture: Texture) -> Result<Self> {
        if texture.target() != Self::TARGET || texture.faces() != 1 {
            return Err(Error::InvalidExtent(texture.extent(0)));
        }
        Ok(Self { texture })
    }
}
