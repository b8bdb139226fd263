use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use texkit::sampler::*;

mod io;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Downsample {
    Nearest,
    Linear,
}

impl From<Downsample> for Filter {
    fn from(value: Downsample) -> Self {
        match value {
            Downsample::Nearest => Filter::Nearest,
            Downsample::Linear => Filter::Linear,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "demo")]
#[command(about = "Generates the mip chain of an image and writes every level as PNG")]
struct Args {
    /// Image to load; a checkerboard is generated when omitted
    input: Option<PathBuf>,

    /// Directory receiving level_NN.png files
    #[arg(long, short, default_value = "mips")]
    output: PathBuf,

    /// Filter used to build each level from the one above it
    #[arg(long, value_enum, default_value_t = Downsample::Linear)]
    filter: Downsample,
}

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let output = args.output;
    let filter = Filter::from(args.filter);

    let texture = match &args.input {
        Some(path) => io::load_texture(path)?,
        None => io::checkerboard(256, 8)?,
    };
    log::info!("Texture {:?}", texture);

    let mut sampler = FSampler2d::new(texture.clone(), Wrap::Repeat, Filter::Linear, Filter::Linear)?;
    let start = std::time::Instant::now();
    sampler.generate_mipmaps(filter)?;
    log::info!("Generated {} levels in {:?}", texture.levels(), start.elapsed());

    std::fs::create_dir_all(&output)?;
    for level in 0..texture.levels() {
        let path = output.join(format!("level_{:02}.png", level));
        io::save_level(&texture, level, &path)?;
        println!("{}: {:?}", path.display(), texture.extent(level));
    }

    // Trilinear lookup half way down the chain.
    let lod = texture.levels() as f32 / 2.0;
    println!("centre at lod {}: {:?}", lod, sampler.texture_lod([0.5, 0.5], lod)?);
    Ok(())
}
