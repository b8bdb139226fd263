use super::{Extent3d, Format};
use crate::{Error, Result};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

/// Storage shared between images, textures and samplers. Holders are counted by `Rc::strong_count`.
pub type SharedStorage = Rc<RefCell<StorageLinear>>;

/// Placement of one mip level inside a face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mip {
    pub extent: Extent3d,
    /// Byte offset from the start of the face.
    pub offset: usize,
    pub size: usize,
}

/// One contiguous allocation holding every layer, face and level of a texture.
/// Slices are laid out layer by layer, face by face, with levels fastest-varying.
pub struct StorageLinear {
    format: Format,
    layers: usize,
    faces: usize,
    mips: Vec<Mip>,
    face_size: usize,
    size: usize,
    // u64 words keep every slice 8-byte aligned for typed views
    words: Vec<u64>,
}

impl StorageLinear {
    pub fn new(format: Format, extent: Extent3d, layers: usize, faces: usize, levels: usize) -> Result<Self> {
        let format = format.validate()?;
        if extent.has_zero() || layers == 0 || faces == 0 || levels == 0 || levels > extent.max_levels() {
            return Err(Error::InvalidExtent(extent));
        }

        let mut face_size = 0usize;
        let mut mips = Vec::with_capacity(levels);
        for level in 0..levels {
            let mip_extent = extent.mip(level);
            let size = slice_size(format, mip_extent);
            mips.push(Mip { extent: mip_extent, offset: face_size, size });
            face_size += size;
        }

        let size = face_size * faces * layers;
        let words = vec![0u64; size.div_ceil(size_of::<u64>())];
        log::debug!(
            "Allocated {} bytes of {:?} storage: {:?}, {} layer(s), {} face(s), {} level(s)",
            size,
            format,
            extent,
            layers,
            faces,
            levels
        );
        Ok(Self { format, layers, faces, mips, face_size, size, words })
    }

    pub fn into_shared(self) -> SharedStorage {
        Rc::new(RefCell::new(self))
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn layers(&self) -> usize {
        self.layers
    }

    pub fn faces(&self) -> usize {
        self.faces
    }

    pub fn levels(&self) -> usize {
        self.mips.len()
    }

    pub fn block_size(&self) -> usize {
        self.format.block_size()
    }

    pub fn block_extent(&self) -> Extent3d {
        self.format.block_extent()
    }

    /// Extent of a level in texels. Levels past the allocated chain keep halving.
    pub fn extent(&self, level: usize) -> Extent3d {
        self.mips[0].extent.mip(level)
    }

    /// Number of blocks along each axis of a level.
    pub fn block_count(&self, level: usize) -> Extent3d {
        self.extent(level).blocks(self.block_extent())
    }

    /// Bytes of one (layer, face) slice at `level`.
    pub fn level_size(&self, level: usize) -> usize {
        match self.mips.get(level) {
            Some(mip) => mip.size,
            None => slice_size(self.format, self.extent(level)),
        }
    }

    pub fn mip(&self, level: usize) -> Option<Mip> {
        self.mips.get(level).copied()
    }

    pub fn face_size(&self) -> usize {
        self.face_size
    }

    pub fn layer_size(&self) -> usize {
        self.face_size * self.faces
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Byte offset of the (layer, face, level) slice.
    pub fn offset(&self, layer: usize, face: usize, level: usize) -> Result<usize> {
        if layer >= self.layers {
            return Err(Error::out_of_range("layer", layer, self.layers));
        }
        if face >= self.faces {
            return Err(Error::out_of_range("face", face, self.faces));
        }
        let mip = self.mips.get(level).ok_or_else(|| Error::out_of_range("level", level, self.mips.len()))?;
        Ok(layer * self.layer_size() + face * self.face_size + mip.offset)
    }

    pub fn data(&self) -> &[u8] {
        &bytemuck::cast_slice(&self.words)[..self.size]
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut(&mut self.words)[..self.size]
    }
}

/// Bytes of one (layer, face) slice of `extent` texels in `format`.
pub fn slice_size(format: Format, extent: Extent3d) -> usize {
    extent.blocks(format.block_extent()).volume() * format.block_size()
}

/// Borrows shared storage for reading. Fails while another holder writes to it.
pub(crate) fn borrow_storage(shared: &SharedStorage) -> Result<Ref<'_, StorageLinear>> {
    shared.try_borrow().map_err(|_| Error::StorageBusy)
}

/// Borrows shared storage for writing. Fails while any other holder accesses it.
pub(crate) fn borrow_storage_mut(shared: &SharedStorage) -> Result<RefMut<'_, StorageLinear>> {
    shared.try_borrow_mut().map_err(|_| Error::StorageBusy)
}

/// Replicates `block` over every block position of `dst`.
pub(crate) fn fill_blocks(dst: &mut [u8], block: &[u8]) {
    use rayon::prelude::*;
    dst.par_chunks_exact_mut(block.len()).for_each(|chunk| chunk.copy_from_slice(block));
}

impl std::fmt::Debug for StorageLinear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageLinear")
            .field("format", &self.format)
            .field("extent", &self.mips[0].extent)
            .field("layers", &self.layers)
            .field("faces", &self.faces)
            .field("levels", &self.mips.len())
            .field("size", &self.size)
            .finish()
    }
}
