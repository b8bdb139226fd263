use crate::storage::{Extent3d, Format};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Invalid or unsupported format: {0:?}")]
    InvalidFormat(Format),

    #[error("Invalid extent {0:?}")]
    InvalidExtent(Extent3d),

    #[error("Incompatible format: {from:?} ({from_size} bytes/block) can't be viewed as {to:?} ({to_size} bytes/block)")]
    IncompatibleFormat { from: Format, to: Format, from_size: usize, to_size: usize },

    #[error("{what} index {index} is out of range, count is {count}")]
    IndexOutOfRange { what: &'static str, index: usize, count: usize },

    #[error("Texel type is {texel_size} bytes but the format block is {block_size} bytes")]
    BlockSizeMismatch { block_size: usize, texel_size: usize },

    #[error("Format {0:?} is block compressed and can't be accessed per texel")]
    CompressedAccess(Format),

    #[error("Texel data is not aligned for the requested type")]
    Misaligned,

    #[error("Storage is borrowed through another holder")]
    StorageBusy,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn out_of_range(what: &'static str, index: usize, count: usize) -> Self {
        Error::IndexOutOfRange { what, index, count }
    }
}
