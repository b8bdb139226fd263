use super::*;
use crate::{Error, Result};
use bytemuck::Pod;
use std::cell::{Ref, RefMut};
use std::rc::Rc;

/// One (layer, face, level) slice of a linear storage, possibly seen through a
/// different format with the same block size. Cloning shares the storage.
#[derive(Clone, Default)]
pub struct Image {
    storage: Option<SharedStorage>,
    format: Format,
    storage_format: Format,
    // extent of the slice in texels of `storage_format`
    storage_extent: Extent3d,
    base_layer: usize,
    base_face: usize,
    base_level: usize,
    offset: usize,
    size: usize,
}

impl Image {
    /// Allocates a private single-level storage for a `format` image of `extent`.
    pub fn new(format: Format, extent: Extent3d) -> Result<Self> {
        let storage = StorageLinear::new(format, extent, 1, 1, 1)?;
        let size = storage.level_size(0);
        Ok(Self {
            storage: Some(storage.into_shared()),
            format,
            storage_format: format,
            storage_extent: extent,
            base_layer: 0,
            base_face: 0,
            base_level: 0,
            offset: 0,
            size,
        })
    }

    /// Views the slice of `image` as `format`, without copying.
    /// Both formats must have the same block size.
    pub fn reinterpret(image: &Image, format: Format) -> Result<Self> {
        image.storage()?;
        check_compatible(image.format, format)?;
        log::trace!("Image view {:?} -> {:?}", image.format, format);
        Ok(Self { format, ..image.clone() })
    }

    /// Views the (layer, face, level) slice of `texture` as `format`. Indices are
    /// relative to the texture's base layer, face and level.
    pub fn from_texture(texture: &Texture, format: Format, layer: usize, face: usize, level: usize) -> Result<Self> {
        let shared = texture.storage()?;
        check_compatible(texture.format(), format)?;
        if layer >= texture.layers() {
            return Err(Error::out_of_range("layer", layer, texture.layers()));
        }
        if face >= texture.faces() {
            return Err(Error::out_of_range("face", face, texture.faces()));
        }
        if level >= texture.levels() {
            return Err(Error::out_of_range("level", level, texture.levels()));
        }

        let base_layer = texture.base_layer() + layer;
        let base_face = texture.base_face() + face;
        let base_level = texture.base_level() + level;
        let storage = borrow_storage(shared)?;
        Ok(Self {
            storage: Some(Rc::clone(shared)),
            format,
            storage_format: storage.format(),
            storage_extent: storage.extent(base_level),
            base_layer,
            base_face,
            base_level,
            offset: storage.offset(base_layer, base_face, base_level)?,
            size: storage.level_size(base_level),
        })
    }

    fn storage(&self) -> Result<&SharedStorage> {
        self.storage.as_ref().ok_or(Error::InvalidFormat(self.format))
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_none()
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn base_layer(&self) -> usize {
        self.base_layer
    }

    pub fn base_face(&self) -> usize {
        self.base_face
    }

    pub fn base_level(&self) -> usize {
        self.base_level
    }

    /// Width, height and depth in texels of this image's format.
    pub fn extent(&self) -> Extent3d {
        if self.is_empty() {
            return Extent3d::ZERO;
        }
        view_extent(self.storage_extent, self.storage_format, self.format)
    }

    /// Bytes of the slice.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of `T` blocks in the slice; `T` must be exactly one block wide.
    pub fn block_count<T>(&self) -> Result<usize> {
        check_texel_size::<T>(self.format)?;
        Ok(self.size / size_of::<T>())
    }

    /// Bytes of the slice. The borrow blocks writes through every other holder
    /// of the storage until it is dropped.
    pub fn data(&self) -> Result<Ref<'_, [u8]>> {
        let (offset, size) = (self.offset, self.size);
        let storage = borrow_storage(self.storage()?)?;
        Ok(Ref::map(storage, |s| &s.data()[offset..offset + size]))
    }

    pub fn data_mut(&mut self) -> Result<RefMut<'_, [u8]>> {
        let (offset, size) = (self.offset, self.size);
        let storage = borrow_storage_mut(self.storage()?)?;
        Ok(RefMut::map(storage, |s| &mut s.data_mut()[offset..offset + size]))
    }

    /// The slice as blocks of `T`. `T` must be exactly one block wide.
    pub fn data_as<T: Pod>(&self) -> Result<Ref<'_, [T]>> {
        check_texel_size::<T>(self.format)?;
        let bytes = self.data()?;
        Ref::filter_map(bytes, |b| bytemuck::try_cast_slice(b).ok()).map_err(|_| Error::Misaligned)
    }

    pub fn data_as_mut<T: Pod>(&mut self) -> Result<RefMut<'_, [T]>> {
        check_texel_size::<T>(self.format)?;
        let bytes = self.data_mut()?;
        RefMut::filter_map(bytes, |b| bytemuck::try_cast_slice_mut(b).ok()).map_err(|_| Error::Misaligned)
    }

    /// Zeroes the slice. Does nothing on an empty image.
    pub fn clear(&mut self) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        self.data_mut()?.fill(0);
        Ok(())
    }

    /// Writes the bytes of `texel` verbatim into every block of the slice, without conversion.
    pub fn clear_with<T: Pod>(&mut self, texel: T) -> Result<()> {
        check_texel_size::<T>(self.format)?;
        let mut data = self.data_mut()?;
        fill_blocks(&mut data, bytemuck::bytes_of(&texel));
        Ok(())
    }

    fn texel_offset<T>(&self, coord: Extent3d) -> Result<usize> {
        check_texel_access::<T>(self.format)?;
        let extent = self.extent();
        extent.check_contains(coord)?;
        Ok(self.offset + extent.linear_index(coord) * self.format.block_size())
    }

    /// Reads the texel at `coord`. The format must be uncompressed and `T` one block wide.
    pub fn load<T: Pod>(&self, coord: Extent3d) -> Result<T> {
        self.storage()?;
        let offset = self.texel_offset::<T>(coord)?;
        let storage = borrow_storage(self.storage()?)?;
        Ok(bytemuck::pod_read_unaligned(&storage.data()[offset..offset + size_of::<T>()]))
    }

    /// Writes the texel at `coord`. The format must be uncompressed and `T` one block wide.
    pub fn store<T: Pod>(&mut self, coord: Extent3d, texel: T) -> Result<()> {
        self.storage()?;
        let offset = self.texel_offset::<T>(coord)?;
        let mut storage = borrow_storage_mut(self.storage()?)?;
        storage.data_mut()[offset..offset + size_of::<T>()].copy_from_slice(bytemuck::bytes_of(&texel));
        Ok(())
    }

    /// Number of holders sharing the storage, this image included; 0 for an empty image.
    pub fn shared_storage_count(&self) -> usize {
        self.storage.as_ref().map_or(0, Rc::strong_count)
    }

    /// Drops this holder and reports how many remain on the storage.
    pub fn release(self) -> usize {
        let remaining = self.shared_storage_count().saturating_sub(1);
        log::debug!("Image released, {} holder(s) left on {:?} storage", remaining, self.format);
        remaining
    }
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        if self.format != other.format || self.extent() != other.extent() {
            return false;
        }
        match (self.is_empty(), other.is_empty()) {
            (true, true) => true,
            (false, false) => match (self.data(), other.data()) {
                (Ok(a), Ok(b)) => *a == *b,
                _ => false,
            },
            _ => false,
        }
    }
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("format", &self.format)
            .field("extent", &self.extent())
            .field("layer", &self.base_layer)
            .field("face", &self.base_face)
            .field("level", &self.base_level)
            .field("size", &self.size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_image() {
        let image = Image::default();
        assert!(image.is_empty());
        assert_eq!(image.format(), Format::Undefined);
        assert_eq!(image.size(), 0);
        assert_eq!(image.data().unwrap_err(), Error::InvalidFormat(Format::Undefined));
        assert_eq!(image.shared_storage_count(), 0);
        assert_eq!(image.release(), 0);
    }

    #[test]
    fn new_image_is_zeroed() {
        let image = Image::new(Format::Rgba8Unorm, Extent3d::new(4, 2, 1)).unwrap();
        assert!(!image.is_empty());
        assert_eq!(image.extent(), Extent3d::new(4, 2, 1));
        assert_eq!(image.size(), 32);
        assert!(image.data().unwrap().iter().all(|&b| b == 0));
        assert_eq!(image.shared_storage_count(), 1);
    }

    #[test]
    fn new_image_rejects_bad_input() {
        assert_eq!(Image::new(Format::Undefined, Extent3d::ONE).unwrap_err(), Error::InvalidFormat(Format::Undefined));
        assert_eq!(
            Image::new(Format::R8Unorm, Extent3d::new(0, 1, 1)).unwrap_err(),
            Error::InvalidExtent(Extent3d::new(0, 1, 1))
        );
    }

    #[test]
    fn store_then_load() {
        let mut image = Image::new(Format::Rgba32Sfloat, Extent3d::new(3, 3, 1)).unwrap();
        image.store(Extent3d::new(2, 1, 0), [0.25f32, -1.0, 8.5, 1.0]).unwrap();
        assert_eq!(image.load::<[f32; 4]>(Extent3d::new(2, 1, 0)).unwrap(), [0.25, -1.0, 8.5, 1.0]);
        assert_eq!(image.load::<[f32; 4]>(Extent3d::new(1, 1, 0)).unwrap(), [0.0; 4]);
    }

    #[test]
    fn typed_access_is_size_checked() {
        let mut image = Image::new(Format::Rg8Unorm, Extent3d::new(2, 2, 1)).unwrap();
        assert_eq!(
            image.store(Extent3d::new(0, 0, 0), 1u32),
            Err(Error::BlockSizeMismatch { block_size: 2, texel_size: 4 })
        );
        assert!(image.data_as::<u32>().is_err());
        assert_eq!(image.block_count::<u16>().unwrap(), 4);
        assert_eq!(
            image.load::<u16>(Extent3d::new(2, 0, 0)),
            Err(Error::IndexOutOfRange { what: "texel x", index: 2, count: 2 })
        );
    }

    #[test]
    fn compressed_images_refuse_texel_access() {
        let mut image = Image::new(Format::Bc3Unorm, Extent3d::new(8, 8, 1)).unwrap();
        assert_eq!(image.size(), 4 * 16);
        assert_eq!(image.store(Extent3d::new(0, 0, 0), [0u8; 16]), Err(Error::CompressedAccess(Format::Bc3Unorm)));
        image.clear_with([0xABu8; 16]).unwrap();
        assert!(image.data().unwrap().iter().all(|&b| b == 0xAB));
    }

    #[test]
    fn clear_with_writes_bytes_verbatim() {
        let mut image = Image::new(Format::Rgba8Unorm, Extent3d::new(2, 2, 1)).unwrap();
        image.clear_with(0x04030201u32).unwrap();
        let expected = 0x04030201u32.to_ne_bytes();
        assert!(image.data().unwrap().chunks_exact(4).all(|block| block == expected));
        image.clear().unwrap();
        assert!(image.data().unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn data_as_views_blocks() {
        let mut image = Image::new(Format::R32Uint, Extent3d::new(4, 1, 1)).unwrap();
        image.data_as_mut::<u32>().unwrap().copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(&*image.data_as::<u32>().unwrap(), &[1, 2, 3, 4]);
        assert_eq!(image.load::<u32>(Extent3d::new(2, 0, 0)).unwrap(), 3);
    }

    #[test]
    fn reinterpretation_shares_storage() {
        let mut source = Image::new(Format::Rgba8Uint, Extent3d::new(2, 2, 1)).unwrap();
        let view = Image::reinterpret(&source, Format::R32Sfloat).unwrap();
        assert_eq!(view.format(), Format::R32Sfloat);
        assert_eq!(view.extent(), source.extent());
        assert_eq!(view.size(), source.size());
        assert_eq!(source.shared_storage_count(), 2);

        source.store(Extent3d::new(1, 1, 0), 1.5f32.to_ne_bytes()).unwrap();
        assert_eq!(view.load::<f32>(Extent3d::new(1, 1, 0)).unwrap(), 1.5);
    }

    #[test]
    fn reinterpretation_rescales_block_footprint() {
        let source = Image::new(Format::Rgba32Uint, Extent3d::new(2, 2, 1)).unwrap();
        let view = Image::reinterpret(&source, Format::Bc7Unorm).unwrap();
        assert_eq!(view.extent(), Extent3d::new(8, 8, 1));
        assert_eq!(view.size(), 64);
        let back = Image::reinterpret(&view, Format::Rgba32Uint).unwrap();
        assert_eq!(back.extent(), Extent3d::new(2, 2, 1));
    }

    #[test]
    fn reinterpretation_rejects_other_block_sizes() {
        let source = Image::new(Format::Rg32Sfloat, Extent3d::new(2, 2, 1)).unwrap();
        assert_eq!(
            Image::reinterpret(&source, Format::Rgba8Unorm).unwrap_err(),
            Error::IncompatibleFormat { from: Format::Rg32Sfloat, to: Format::Rgba8Unorm, from_size: 8, to_size: 4 }
        );
        assert!(matches!(Image::reinterpret(&Image::default(), Format::R8Unorm), Err(Error::InvalidFormat(_))));
        assert_eq!(source.shared_storage_count(), 1);
    }

    #[test]
    fn texture_slices() {
        let texture = Texture::new(Target::Tex2dArray, Format::R16Uint, Extent3d::new(4, 4, 1), 3, 1, 2).unwrap();
        let image = Image::from_texture(&texture, Format::Rg8Uint, 2, 0, 1).unwrap();
        assert_eq!(image.extent(), Extent3d::new(2, 2, 1));
        assert_eq!(image.size(), 8);
        assert_eq!(image.base_layer(), 2);
        assert_eq!(image.base_level(), 1);
        assert_eq!(texture.shared_storage_count(), 2);

        assert!(matches!(Image::from_texture(&texture, Format::R16Uint, 3, 0, 0), Err(Error::IndexOutOfRange { what: "layer", .. })));
        assert!(matches!(Image::from_texture(&texture, Format::R16Uint, 0, 1, 0), Err(Error::IndexOutOfRange { what: "face", .. })));
        assert!(matches!(Image::from_texture(&texture, Format::R16Uint, 0, 0, 2), Err(Error::IndexOutOfRange { what: "level", .. })));
        assert!(matches!(Image::from_texture(&texture, Format::R32Uint, 0, 0, 0), Err(Error::IncompatibleFormat { .. })));
    }

    #[test]
    fn release_reports_remaining_holders() {
        let image = Image::new(Format::R8Unorm, Extent3d::new(2, 2, 1)).unwrap();
        let a = image.clone();
        let b = Image::reinterpret(&image, Format::R8Uint).unwrap();
        assert_eq!(image.shared_storage_count(), 3);
        assert_eq!(a.release(), 2);
        assert_eq!(b.release(), 1);
        assert_eq!(image.shared_storage_count(), 1);
        assert_eq!(image.release(), 0);
    }

    #[test]
    fn live_borrow_makes_other_holders_report_busy() {
        let image = Image::new(Format::R8Uint, Extent3d::new(2, 2, 1)).unwrap();
        let mut writer = image.clone();
        {
            let bytes = image.data().unwrap();
            assert_eq!(writer.store(Extent3d::new(1, 0, 0), 5u8), Err(Error::StorageBusy));
            assert_eq!(writer.clear().unwrap_err(), Error::StorageBusy);
            assert!(writer.data_mut().is_err());
            assert_eq!(writer.load::<u8>(Extent3d::new(1, 0, 0)).unwrap(), 0);
            assert_eq!(writer.extent(), Extent3d::new(2, 2, 1));
            assert_eq!(bytes[1], 0);
        }
        writer.store(Extent3d::new(1, 0, 0), 5u8).unwrap();
        assert_eq!(image.load::<u8>(Extent3d::new(1, 0, 0)).unwrap(), 5);
    }

    #[test]
    fn geometry_is_available_while_storage_is_written() {
        let texture = Texture::new(Target::Tex2d, Format::Rgba8Unorm, Extent3d::new(4, 4, 1), 1, 1, 3).unwrap();
        let mut image = Image::from_texture(&texture, Format::R32Uint, 0, 0, 1).unwrap();
        let view = image.clone();
        let _bytes = image.data_mut().unwrap();
        assert_eq!(view.extent(), Extent3d::new(2, 2, 1));
        assert_eq!(texture.extent(2), Extent3d::ONE);
        assert_eq!(texture.size(), (16 + 4 + 1) * 4);
        assert!(format!("{:?}", view).contains("extent"));
        assert_eq!(Image::from_texture(&texture, Format::R32Uint, 0, 0, 0).unwrap_err(), Error::StorageBusy);
        assert_eq!(view.load::<u32>(Extent3d::new(0, 0, 0)), Err(Error::StorageBusy));
    }

    #[test]
    fn equality_compares_contents() {
        let mut a = Image::new(Format::R8Unorm, Extent3d::new(2, 2, 1)).unwrap();
        let b = Image::new(Format::R8Unorm, Extent3d::new(2, 2, 1)).unwrap();
        assert_eq!(a, b);
        a.store(Extent3d::new(0, 0, 0), 1u8).unwrap();
        assert_ne!(a, b);
        assert_eq!(Image::default(), Image::default());
    }
}
