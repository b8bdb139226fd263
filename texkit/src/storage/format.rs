use super::Extent3d;
use crate::{Error, Result};

/// How each channel of a format is encoded in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Unorm8,
    Snorm8,
    Uint8,
    Sint8,
    Srgb8,
    Unorm16,
    Snorm16,
    Uint16,
    Sint16,
    Sfloat16,
    Uint32,
    Sint32,
    Sfloat32,
    /// Block compressed, no per-channel layout.
    Compressed,
}

impl ComponentKind {
    pub const fn size(self) -> usize {
        match self {
            ComponentKind::Unorm8
            | ComponentKind::Snorm8
            | ComponentKind::Uint8
            | ComponentKind::Sint8
            | ComponentKind::Srgb8 => 1,
            ComponentKind::Unorm16
            | ComponentKind::Snorm16
            | ComponentKind::Uint16
            | ComponentKind::Sint16
            | ComponentKind::Sfloat16 => 2,
            ComponentKind::Uint32 | ComponentKind::Sint32 | ComponentKind::Sfloat32 => 4,
            ComponentKind::Compressed => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    /// Bytes per block, 0 only for `Format::Undefined`.
    pub block_size: usize,
    /// Texels covered by one block along each axis.
    pub block_extent: Extent3d,
    pub components: usize,
    pub kind: ComponentKind,
    /// Red and blue are stored swapped.
    pub bgra: bool,
}

impl FormatInfo {
    const UNDEFINED: FormatInfo = FormatInfo {
        block_size: 0,
        block_extent: Extent3d::ONE,
        components: 0,
        kind: ComponentKind::Compressed,
        bgra: false,
    };

    const fn plain(kind: ComponentKind, components: usize) -> Self {
        Self { block_size: kind.size() * components, block_extent: Extent3d::ONE, components, kind, bgra: false }
    }

    const fn bgra(kind: ComponentKind) -> Self {
        Self { block_size: kind.size() * 4, block_extent: Extent3d::ONE, components: 4, kind, bgra: true }
    }

    const fn compressed(block_size: usize, x: u32, y: u32, components: usize) -> Self {
        Self {
            block_size,
            block_extent: Extent3d::new(x, y, 1),
            components,
            kind: ComponentKind::Compressed,
            bgra: false,
        }
    }
}

/// Texel storage formats known to the storage and sampling layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum Format {
    #[default]
    Undefined = 0,

    R8Unorm,
    Rg8Unorm,
    Rgb8Unorm,
    Rgba8Unorm,
    R8Snorm,
    Rg8Snorm,
    Rgb8Snorm,
    Rgba8Snorm,
    R8Uint,
    Rg8Uint,
    Rgb8Uint,
    Rgba8Uint,
    R8Sint,
    Rg8Sint,
    Rgb8Sint,
    Rgba8Sint,
    Bgra8Unorm,

    R8Srgb,
    Rg8Srgb,
    Rgb8Srgb,
    Rgba8Srgb,
    Bgra8Srgb,

    R16Unorm,
    Rg16Unorm,
    Rgb16Unorm,
    Rgba16Unorm,
    R16Snorm,
    Rg16Snorm,
    Rgb16Snorm,
    Rgba16Snorm,
    R16Uint,
    Rg16Uint,
    Rgb16Uint,
    Rgba16Uint,
    R16Sint,
    Rg16Sint,
    Rgb16Sint,
    Rgba16Sint,
    R16Sfloat,
    Rg16Sfloat,
    Rgb16Sfloat,
    Rgba16Sfloat,

    R32Uint,
    Rg32Uint,
    Rgb32Uint,
    Rgba32Uint,
    R32Sint,
    Rg32Sint,
    Rgb32Sint,
    Rgba32Sint,
    R32Sfloat,
    Rg32Sfloat,
    Rgb32Sfloat,
    Rgba32Sfloat,

    Bc1RgbUnorm,
    Bc1RgbaUnorm,
    Bc2Unorm,
    Bc3Unorm,
    Bc4Unorm,
    Bc5Unorm,
    Bc6hUfloat,
    Bc7Unorm,
    Etc2Rgb8Unorm,
    Etc2Rgba8Unorm,
    Astc4x4Unorm,
    Astc8x8Unorm,
}

impl Format {
    /// Every format in identifier order, so `ALL[id as usize] as u32 == id`.
    pub const ALL: [Format; 67] = [
        Format::Undefined,
        Format::R8Unorm,
        Format::Rg8Unorm,
        Format::Rgb8Unorm,
        Format::Rgba8Unorm,
        Format::R8Snorm,
        Format::Rg8Snorm,
        Format::Rgb8Snorm,
        Format::Rgba8Snorm,
        Format::R8Uint,
        Format::Rg8Uint,
        Format::Rgb8Uint,
        Format::Rgba8Uint,
        Format::R8Sint,
        Format::Rg8Sint,
        Format::Rgb8Sint,
        Format::Rgba8Sint,
        Format::Bgra8Unorm,
        Format::R8Srgb,
        Format::Rg8Srgb,
        Format::Rgb8Srgb,
        Format::Rgba8Srgb,
        Format::Bgra8Srgb,
        Format::R16Unorm,
        Format::Rg16Unorm,
        Format::Rgb16Unorm,
        Format::Rgba16Unorm,
        Format::R16Snorm,
        Format::Rg16Snorm,
        Format::Rgb16Snorm,
        Format::Rgba16Snorm,
        Format::R16Uint,
        Format::Rg16Uint,
        Format::Rgb16Uint,
        Format::Rgba16Uint,
        Format::R16Sint,
        Format::Rg16Sint,
        Format::Rgb16Sint,
        Format::Rgba16Sint,
        Format::R16Sfloat,
        Format::Rg16Sfloat,
        Format::Rgb16Sfloat,
        Format::Rgba16Sfloat,
        Format::R32Uint,
        Format::Rg32Uint,
        Format::Rgb32Uint,
        Format::Rgba32Uint,
        Format::R32Sint,
        Format::Rg32Sint,
        Format::Rgb32Sint,
        Format::Rgba32Sint,
        Format::R32Sfloat,
        Format::Rg32Sfloat,
        Format::Rgb32Sfloat,
        Format::Rgba32Sfloat,
        Format::Bc1RgbUnorm,
        Format::Bc1RgbaUnorm,
        Format::Bc2Unorm,
        Format::Bc3Unorm,
        Format::Bc4Unorm,
        Format::Bc5Unorm,
        Format::Bc6hUfloat,
        Format::Bc7Unorm,
        Format::Etc2Rgb8Unorm,
        Format::Etc2Rgba8Unorm,
        Format::Astc4x4Unorm,
        Format::Astc8x8Unorm,
    ];

    pub const fn info(self) -> FormatInfo {
        use ComponentKind::*;
        match self {
            Format::Undefined => FormatInfo::UNDEFINED,

            Format::R8Unorm => FormatInfo::plain(Unorm8, 1),
            Format::Rg8Unorm => FormatInfo::plain(Unorm8, 2),
            Format::Rgb8Unorm => FormatInfo::plain(Unorm8, 3),
            Format::Rgba8Unorm => FormatInfo::plain(Unorm8, 4),
            Format::R8Snorm => FormatInfo::plain(Snorm8, 1),
            Format::Rg8Snorm => FormatInfo::plain(Snorm8, 2),
            Format::Rgb8Snorm => FormatInfo::plain(Snorm8, 3),
            Format::Rgba8Snorm => FormatInfo::plain(Snorm8, 4),
            Format::R8Uint => FormatInfo::plain(Uint8, 1),
            Format::Rg8Uint => FormatInfo::plain(Uint8, 2),
            Format::Rgb8Uint => FormatInfo::plain(Uint8, 3),
            Format::Rgba8Uint => FormatInfo::plain(Uint8, 4),
            Format::R8Sint => FormatInfo::plain(Sint8, 1),
            Format::Rg8Sint => FormatInfo::plain(Sint8, 2),
            Format::Rgb8Sint => FormatInfo::plain(Sint8, 3),
            Format::Rgba8Sint => FormatInfo::plain(Sint8, 4),
            Format::Bgra8Unorm => FormatInfo::bgra(Unorm8),

            Format::R8Srgb => FormatInfo::plain(Srgb8, 1),
            Format::Rg8Srgb => FormatInfo::plain(Srgb8, 2),
            Format::Rgb8Srgb => FormatInfo::plain(Srgb8, 3),
            Format::Rgba8Srgb => FormatInfo::plain(Srgb8, 4),
            Format::Bgra8Srgb => FormatInfo::bgra(Srgb8),

            Format::R16Unorm => FormatInfo::plain(Unorm16, 1),
            Format::Rg16Unorm => FormatInfo::plain(Unorm16, 2),
            Format::Rgb16Unorm => FormatInfo::plain(Unorm16, 3),
            Format::Rgba16Unorm => FormatInfo::plain(Unorm16, 4),
            Format::R16Snorm => FormatInfo::plain(Snorm16, 1),
            Format::Rg16Snorm => FormatInfo::plain(Snorm16, 2),
            Format::Rgb16Snorm => FormatInfo::plain(Snorm16, 3),
            Format::Rgba16Snorm => FormatInfo::plain(Snorm16, 4),
            Format::R16Uint => FormatInfo::plain(Uint16, 1),
            Format::Rg16Uint => FormatInfo::plain(Uint16, 2),
            Format::Rgb16Uint => FormatInfo::plain(Uint16, 3),
            Format::Rgba16Uint => FormatInfo::plain(Uint16, 4),
            Format::R16Sint => FormatInfo::plain(Sint16, 1),
            Format::Rg16Sint => FormatInfo::plain(Sint16, 2),
            Format::Rgb16Sint => FormatInfo::plain(Sint16, 3),
            Format::Rgba16Sint => FormatInfo::plain(Sint16, 4),
            Format::R16Sfloat => FormatInfo::plain(Sfloat16, 1),
            Format::Rg16Sfloat => FormatInfo::plain(Sfloat16, 2),
            Format::Rgb16Sfloat => FormatInfo::plain(Sfloat16, 3),
            Format::Rgba16Sfloat => FormatInfo::plain(Sfloat16, 4),

            Format::R32Uint => FormatInfo::plain(Uint32, 1),
            Format::Rg32Uint => FormatInfo::plain(Uint32, 2),
            Format::Rgb32Uint => FormatInfo::plain(Uint32, 3),
            Format::Rgba32Uint => FormatInfo::plain(Uint32, 4),
            Format::R32Sint => FormatInfo::plain(Sint32, 1),
            Format::Rg32Sint => FormatInfo::plain(Sint32, 2),
            Format::Rgb32Sint => FormatInfo::plain(Sint32, 3),
            Format::Rgba32Sint => FormatInfo::plain(Sint32, 4),
            Format::R32Sfloat => FormatInfo::plain(Sfloat32, 1),
            Format::Rg32Sfloat => FormatInfo::plain(Sfloat32, 2),
            Format::Rgb32Sfloat => FormatInfo::plain(Sfloat32, 3),
            Format::Rgba32Sfloat => FormatInfo::plain(Sfloat32, 4),

            Format::Bc1RgbUnorm => FormatInfo::compressed(8, 4, 4, 3),
            Format::Bc1RgbaUnorm => FormatInfo::compressed(8, 4, 4, 4),
            Format::Bc2Unorm => FormatInfo::compressed(16, 4, 4, 4),
            Format::Bc3Unorm => FormatInfo::compressed(16, 4, 4, 4),
            Format::Bc4Unorm => FormatInfo::compressed(8, 4, 4, 1),
            Format::Bc5Unorm => FormatInfo::compressed(16, 4, 4, 2),
            Format::Bc6hUfloat => FormatInfo::compressed(16, 4, 4, 3),
            Format::Bc7Unorm => FormatInfo::compressed(16, 4, 4, 4),
            Format::Etc2Rgb8Unorm => FormatInfo::compressed(8, 4, 4, 3),
            Format::Etc2Rgba8Unorm => FormatInfo::compressed(16, 4, 4, 4),
            Format::Astc4x4Unorm => FormatInfo::compressed(16, 4, 4, 4),
            Format::Astc8x8Unorm => FormatInfo::compressed(16, 8, 8, 4),
        }
    }

    pub const fn is_valid(self) -> bool {
        !matches!(self, Format::Undefined)
    }

    pub const fn block_size(self) -> usize {
        self.info().block_size
    }

    pub const fn block_extent(self) -> Extent3d {
        self.info().block_extent
    }

    pub const fn component_count(self) -> usize {
        self.info().components
    }

    pub const fn is_compressed(self) -> bool {
        self.is_valid() && matches!(self.info().kind, ComponentKind::Compressed)
    }

    pub const fn is_srgb(self) -> bool {
        matches!(self.info().kind, ComponentKind::Srgb8)
    }

    /// Fails with `InvalidFormat` unless this is a real format.
    pub fn validate(self) -> Result<Self> {
        if self.is_valid() { Ok(self) } else { Err(Error::InvalidFormat(self)) }
    }
}

impl TryFrom<u32> for Format {
    type Error = Error;

    fn try_from(id: u32) -> Result<Self> {
        match Format::ALL.get(id as usize) {
            Some(format) if format.is_valid() => Ok(*format),
            _ => Err(Error::InvalidFormat(Format::Undefined)),
        }
    }
}
