use std::path::Path;
use texkit::storage::*;

/// Loads a PNG/JPEG into a full-chain RGBA8 2D texture, level 0 filled.
pub fn load_texture<P: AsRef<Path>>(path: P) -> Result<Texture2d, Box<dyn std::error::Error>> {
    let image = ::image::open(path)?.into_rgba8();
    let mut texture = Texture2d::with_mip_chain(Format::Rgba8Unorm, [image.width(), image.height()])?;
    texture.data_mut(0, 0, 0)?.copy_from_slice(image.as_raw());
    Ok(texture)
}

/// An RGBA8 checkerboard of `cells` x `cells` squares.
pub fn checkerboard(size: u32, cells: u32) -> Result<Texture2d, Box<dyn std::error::Error>> {
    let mut texture = Texture2d::with_mip_chain(Format::Rgba8Unorm, [size, size])?;
    let cell = (size / cells).max(1);
    for y in 0..size {
        for x in 0..size {
            let texel = if (x / cell + y / cell) % 2 == 0 { [230u8, 230, 230, 255] } else { [40u8, 60, 200, 255] };
            texture.store(Extent3d::new(x, y, 0), 0, 0, 0, texel)?;
        }
    }
    Ok(texture)
}

/// Writes one level of an RGBA8 texture as a PNG.
pub fn save_level<P: AsRef<Path>>(texture: &Texture2d, level: usize, path: P) -> Result<(), Box<dyn std::error::Error>> {
    let [width, height] = texture.extent(level);
    let texels = texture.data(0, 0, level)?.to_vec();
    let image = ::image::RgbaImage::from_raw(width, height, texels).ok_or("level size does not match its extent")?;
    image.save(path)?;
    Ok(())
}
