pub mod extent;
pub mod format;
pub mod image;
pub mod storage_linear;
pub mod texture;

pub use extent::*;
pub use format::*;
pub use image::*;
pub use storage_linear::*;
pub use texture::*;

/// Extent of a storage level when seen through a format with another block footprint.
pub(crate) fn view_extent(extent: Extent3d, storage_format: Format, view_format: Format) -> Extent3d {
    let storage_block = storage_format.block_extent();
    let view_block = view_format.block_extent();
    if storage_block == view_block { extent } else { extent.blocks(storage_block) * view_block }
}

/// Both formats must store blocks of the same byte size to alias the same memory.
pub(crate) fn check_compatible(from: Format, to: Format) -> crate::Result<()> {
    let to = to.validate()?;
    if from.block_size() != to.block_size() {
        return Err(crate::Error::IncompatibleFormat {
            from,
            to,
            from_size: from.block_size(),
            to_size: to.block_size(),
        });
    }
    Ok(())
}
