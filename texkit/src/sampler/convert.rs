use crate::math::*;
use crate::storage::{ComponentKind, Format};
use crate::{Error, Result};
use arrayvec::ArrayVec;

type FetchFunction<T> = fn(&[u8]) -> Texel<T>;
type WriteFunction<T> = fn(&mut [u8], Texel<T>);

/// Largest uncompressed block: four 32-bit channels.
const MAX_BLOCK_SIZE: usize = 16;

/// Translates between raw blocks of one format and `Texel<T>` values.
/// The functions are picked once, when the converter is created.
pub struct Converter<T: TexelScalar> {
    format: Format,
    fetch: FetchFunction<T>,
    write: WriteFunction<T>,
}

impl<T: TexelScalar> Clone for Converter<T> {
    fn clone(&self) -> Self {
        Self { format: self.format, fetch: self.fetch, write: self.write }
    }
}

impl<T: TexelScalar> std::fmt::Debug for Converter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter").field("format", &self.format).finish()
    }
}

impl<T: TexelScalar> Converter<T> {
    pub fn new(format: Format) -> Result<Self> {
        let format = format.validate()?;
        let info = format.info();
        let functions = match info.kind {
            ComponentKind::Unorm8 => select::<T, Unorm8>(info.components, info.bgra),
            ComponentKind::Snorm8 => select::<T, Snorm8>(info.components, info.bgra),
            ComponentKind::Uint8 => select::<T, Uint8>(info.components, info.bgra),
            ComponentKind::Sint8 => select::<T, Sint8>(info.components, info.bgra),
            ComponentKind::Srgb8 => select::<T, Srgb8>(info.components, info.bgra),
            ComponentKind::Unorm16 => select::<T, Unorm16>(info.components, info.bgra),
            ComponentKind::Snorm16 => select::<T, Snorm16>(info.components, info.bgra),
            ComponentKind::Uint16 => select::<T, Uint16>(info.components, info.bgra),
            ComponentKind::Sint16 => select::<T, Sint16>(info.components, info.bgra),
            ComponentKind::Sfloat16 => select::<T, Sfloat16>(info.components, info.bgra),
            ComponentKind::Uint32 => select::<T, Uint32>(info.components, info.bgra),
            ComponentKind::Sint32 => select::<T, Sint32>(info.components, info.bgra),
            ComponentKind::Sfloat32 => select::<T, Sfloat32>(info.components, info.bgra),
            ComponentKind::Compressed => return Err(Error::CompressedAccess(format)),
        };
        let (fetch, write) = functions.ok_or(Error::InvalidFormat(format))?;
        Ok(Self { format, fetch, write })
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Decodes one block. `block` must hold at least one block of the format.
    pub fn fetch(&self, block: &[u8]) -> Texel<T> {
        (self.fetch)(block)
    }

    /// Encodes `texel` into one block. Channels the format lacks are dropped.
    pub fn write(&self, block: &mut [u8], texel: Texel<T>) {
        (self.write)(block, texel)
    }

    /// The encoded bytes of `texel`.
    pub fn encode(&self, texel: Texel<T>) -> ArrayVec<u8, MAX_BLOCK_SIZE> {
        let mut block = ArrayVec::from([0u8; MAX_BLOCK_SIZE]);
        block.truncate(self.format.block_size());
        self.write(&mut block, texel);
        block
    }
}

fn select<T: TexelScalar, C: Component>(
    channels: usize,
    bgra: bool,
) -> Option<(FetchFunction<T>, WriteFunction<T>)> {
    match (channels, bgra) {
        (1, false) => Some(functions::<T, C, 1, false>()),
        (2, false) => Some(functions::<T, C, 2, false>()),
        (3, false) => Some(functions::<T, C, 3, false>()),
        (4, false) => Some(functions::<T, C, 4, false>()),
        (4, true) => Some(functions::<T, C, 4, true>()),
        _ => None,
    }
}

fn functions<T: TexelScalar, C: Component, const CHANNELS: usize, const BGRA: bool>()
-> (FetchFunction<T>, WriteFunction<T>) {
    (fetch_texel::<T, C, CHANNELS, BGRA>, write_texel::<T, C, CHANNELS, BGRA>)
}

fn fetch_texel<T: TexelScalar, C: Component, const CHANNELS: usize, const BGRA: bool>(block: &[u8]) -> Texel<T> {
    let mut texel = opaque_black::<T>();
    for (channel, bytes) in block.chunks_exact(C::SIZE).take(CHANNELS).enumerate() {
        texel[channel] = T::from_f64(C::decode(bytes, channel));
    }
    if BGRA {
        texel.swap(0, 2);
    }
    texel
}

fn write_texel<T: TexelScalar, C: Component, const CHANNELS: usize, const BGRA: bool>(
    block: &mut [u8],
    mut texel: Texel<T>,
) {
    if BGRA {
        texel.swap(0, 2);
    }
    for (channel, bytes) in block.chunks_exact_mut(C::SIZE).take(CHANNELS).enumerate() {
        C::encode(texel[channel].to_f64(), channel, bytes);
    }
}

/// Encoding of a single channel. Multi-byte channels are little-endian.
trait Component {
    const SIZE: usize;
    fn decode(bytes: &[u8], channel: usize) -> f64;
    fn encode(value: f64, channel: usize, bytes: &mut [u8]);
}

struct Unorm8;
struct Snorm8;
struct Uint8;
struct Sint8;
struct Srgb8;
struct Unorm16;
struct Snorm16;
struct Uint16;
struct Sint16;
struct Sfloat16;
struct Uint32;
struct Sint32;
struct Sfloat32;

impl Component for Unorm8 {
    const SIZE: usize = 1;
    fn decode(bytes: &[u8], _channel: usize) -> f64 {
        bytes[0] as f64 / 255.0
    }
    fn encode(value: f64, _channel: usize, bytes: &mut [u8]) {
        bytes[0] = (value.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
}

impl Component for Snorm8 {
    const SIZE: usize = 1;
    fn decode(bytes: &[u8], _channel: usize) -> f64 {
        (bytes[0] as i8 as f64 / 127.0).max(-1.0)
    }
    fn encode(value: f64, _channel: usize, bytes: &mut [u8]) {
        bytes[0] = (value.clamp(-1.0, 1.0) * 127.0).round() as i8 as u8;
    }
}

impl Component for Uint8 {
    const SIZE: usize = 1;
    fn decode(bytes: &[u8], _channel: usize) -> f64 {
        bytes[0] as f64
    }
    fn encode(value: f64, _channel: usize, bytes: &mut [u8]) {
        bytes[0] = value.round() as u8;
    }
}

impl Component for Sint8 {
    const SIZE: usize = 1;
    fn decode(bytes: &[u8], _channel: usize) -> f64 {
        bytes[0] as i8 as f64
    }
    fn encode(value: f64, _channel: usize, bytes: &mut [u8]) {
        bytes[0] = value.round() as i8 as u8;
    }
}

// Alpha stays linear.
impl Component for Srgb8 {
    const SIZE: usize = 1;
    fn decode(bytes: &[u8], channel: usize) -> f64 {
        let value = Unorm8::decode(bytes, channel);
        if channel == 3 { value } else { srgb_to_linear(value) }
    }
    fn encode(value: f64, channel: usize, bytes: &mut [u8]) {
        let value = if channel == 3 { value } else { linear_to_srgb(value.clamp(0.0, 1.0)) };
        Unorm8::encode(value, channel, bytes);
    }
}

impl Component for Unorm16 {
    const SIZE: usize = 2;
    fn decode(bytes: &[u8], _channel: usize) -> f64 {
        u16::from_le_bytes([bytes[0], bytes[1]]) as f64 / 65535.0
    }
    fn encode(value: f64, _channel: usize, bytes: &mut [u8]) {
        let raw = (value.clamp(0.0, 1.0) * 65535.0).round() as u16;
        bytes.copy_from_slice(&raw.to_le_bytes());
    }
}

impl Component for Snorm16 {
    const SIZE: usize = 2;
    fn decode(bytes: &[u8], _channel: usize) -> f64 {
        (i16::from_le_bytes([bytes[0], bytes[1]]) as f64 / 32767.0).max(-1.0)
    }
    fn encode(value: f64, _channel: usize, bytes: &mut [u8]) {
        let raw = (value.clamp(-1.0, 1.0) * 32767.0).round() as i16;
        bytes.copy_from_slice(&raw.to_le_bytes());
    }
}

impl Component for Uint16 {
    const SIZE: usize = 2;
    fn decode(bytes: &[u8], _channel: usize) -> f64 {
        u16::from_le_bytes([bytes[0], bytes[1]]) as f64
    }
    fn encode(value: f64, _channel: usize, bytes: &mut [u8]) {
        bytes.copy_from_slice(&(value.round() as u16).to_le_bytes());
    }
}

impl Component for Sint16 {
    const SIZE: usize = 2;
    fn decode(bytes: &[u8], _channel: usize) -> f64 {
        i16::from_le_bytes([bytes[0], bytes[1]]) as f64
    }
    fn encode(value: f64, _channel: usize, bytes: &mut [u8]) {
        bytes.copy_from_slice(&(value.round() as i16).to_le_bytes());
    }
}

impl Component for Sfloat16 {
    const SIZE: usize = 2;
    fn decode(bytes: &[u8], _channel: usize) -> f64 {
        half::f16::from_le_bytes([bytes[0], bytes[1]]).to_f64()
    }
    fn encode(value: f64, _channel: usize, bytes: &mut [u8]) {
        bytes.copy_from_slice(&half::f16::from_f64(value).to_le_bytes());
    }
}

impl Component for Uint32 {
    const SIZE: usize = 4;
    fn decode(bytes: &[u8], _channel: usize) -> f64 {
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64
    }
    fn encode(value: f64, _channel: usize, bytes: &mut [u8]) {
        bytes.copy_from_slice(&(value.round() as u32).to_le_bytes());
    }
}

impl Component for Sint32 {
    const SIZE: usize = 4;
    fn decode(bytes: &[u8], _channel: usize) -> f64 {
        i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64
    }
    fn encode(value: f64, _channel: usize, bytes: &mut [u8]) {
        bytes.copy_from_slice(&(value.round() as i32).to_le_bytes());
    }
}

impl Component for Sfloat32 {
    const SIZE: usize = 4;
    fn decode(bytes: &[u8], _channel: usize) -> f64 {
        f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64
    }
    fn encode(value: f64, _channel: usize, bytes: &mut [u8]) {
        bytes.copy_from_slice(&(value as f32).to_le_bytes());
    }
}

pub fn srgb_to_linear(value: f64) -> f64 {
    if value <= 0.04045 { value / 12.92 } else { ((value + 0.055) / 1.055).powf(2.4) }
}

pub fn linear_to_srgb(value: f64) -> f64 {
    if value <= 0.0031308 { value * 12.92 } else { 1.055 * value.powf(1.0 / 2.4) - 0.055 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Format::R8Unorm, &[255], [1.0, 0.0, 0.0, 1.0])]
    #[case(Format::Rg8Unorm, &[0, 51], [0.0, 0.2, 0.0, 1.0])]
    #[case(Format::Rgba8Unorm, &[255, 0, 51, 0], [1.0, 0.0, 0.2, 0.0])]
    #[case(Format::Bgra8Unorm, &[51, 0, 255, 255], [1.0, 0.0, 0.2, 1.0])]
    #[case(Format::R8Snorm, &[0x81], [-1.0, 0.0, 0.0, 1.0])]
    #[case(Format::R8Snorm, &[0x80], [-1.0, 0.0, 0.0, 1.0])]
    #[case(Format::Rg8Uint, &[7, 200], [7.0, 200.0, 0.0, 1.0])]
    #[case(Format::R8Sint, &[0xFE], [-2.0, 0.0, 0.0, 1.0])]
    #[case(Format::R16Unorm, &[0xFF, 0xFF], [1.0, 0.0, 0.0, 1.0])]
    #[case(Format::R16Sint, &[0x00, 0x80], [-32768.0, 0.0, 0.0, 1.0])]
    #[case(Format::R16Sfloat, &[0x00, 0x3C], [1.0, 0.0, 0.0, 1.0])]
    #[case(Format::Rg16Sfloat, &[0x00, 0xB8, 0x00, 0x40], [-0.5, 2.0, 0.0, 1.0])]
    #[case(Format::R32Uint, &[1, 1, 0, 0], [257.0, 0.0, 0.0, 1.0])]
    #[case(Format::R32Sfloat, &[0x00, 0x00, 0x80, 0x3E], [0.25, 0.0, 0.0, 1.0])]
    fn fetch_as_f32(#[case] format: Format, #[case] block: &[u8], #[case] expected: [f32; 4]) {
        let converter = Converter::<f32>::new(format).unwrap();
        assert_eq!(converter.fetch(block), expected);
    }

    #[rstest]
    #[case(Format::Rgba8Unorm, [1.0, 0.5, 0.0, 1.0], &[255, 128, 0, 255])]
    #[case(Format::Rgba8Unorm, [2.0, -1.0, 0.0, 0.0], &[255, 0, 0, 0])]
    #[case(Format::Bgra8Unorm, [1.0, 0.0, 0.2, 1.0], &[51, 0, 255, 255])]
    #[case(Format::Rg8Snorm, [-1.0, 0.5, 9.0, 9.0], &[0x81, 64])]
    #[case(Format::R16Unorm, [1.0, 9.0, 9.0, 9.0], &[0xFF, 0xFF])]
    #[case(Format::Rg16Sfloat, [-0.5, 2.0, 0.0, 0.0], &[0x00, 0xB8, 0x00, 0x40])]
    #[case(Format::R32Sfloat, [0.25, 0.0, 0.0, 0.0], &[0x00, 0x00, 0x80, 0x3E])]
    fn encode_from_f32(#[case] format: Format, #[case] texel: [f32; 4], #[case] expected: &[u8]) {
        let converter = Converter::<f32>::new(format).unwrap();
        assert_eq!(&converter.encode(texel)[..], expected);
    }

    #[test]
    fn integer_texels_pass_through_integer_formats() {
        let converter = Converter::<u32>::new(Format::Rgba32Uint).unwrap();
        let texel = [0, 1, u32::MAX, 123456789];
        let block = converter.encode(texel);
        assert_eq!(converter.fetch(&block), texel);

        let converter = Converter::<i32>::new(Format::Rgb16Sint).unwrap();
        let block = converter.encode([-300, 0, 300, 5]);
        assert_eq!(block.len(), 6);
        assert_eq!(converter.fetch(&block), [-300, 0, 300, 1]);
    }

    #[test]
    fn integer_writes_saturate() {
        let converter = Converter::<i32>::new(Format::Rg8Uint).unwrap();
        assert_eq!(&converter.encode([-5, 1000, 0, 0])[..], &[0, 255]);
    }

    #[test]
    fn srgb_decodes_to_linear_and_keeps_alpha() {
        let converter = Converter::<f64>::new(Format::Rgba8Srgb).unwrap();
        let texel = converter.fetch(&[255, 0, 188, 128]);
        assert_eq!(texel[0], 1.0);
        assert_eq!(texel[1], 0.0);
        assert!((texel[2] - 0.5029).abs() < 1e-3);
        assert_eq!(texel[3], 128.0 / 255.0);
        assert_eq!(&converter.encode(texel)[..], &[255, 0, 188, 128]);
    }

    #[test]
    fn srgb_transfer_functions_invert() {
        for step in 0..=20 {
            let value = step as f64 / 20.0;
            assert!((srgb_to_linear(linear_to_srgb(value)) - value).abs() < 1e-9);
        }
    }

    #[test]
    fn rejects_formats_without_texel_layout() {
        assert_eq!(Converter::<f32>::new(Format::Undefined).unwrap_err(), Error::InvalidFormat(Format::Undefined));
        assert_eq!(Converter::<f32>::new(Format::Bc1RgbUnorm).unwrap_err(), Error::CompressedAccess(Format::Bc1RgbUnorm));
    }
}
