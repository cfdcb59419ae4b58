mod utils;

use std::{
    fs::File,
    io::BufWriter,
    path::PathBuf,
    process::ExitCode,
    time::Instant,
};

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use fourzip::QuadImage;
use image::{ColorType, ImageReader};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use utils::{exists_decision, largest_square, size_reduction, Assume};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Subcommands,

    /// Overwrite output files
    #[arg(short = 'y', long = "overwrite", conflicts_with = "assumeno")]
    assumeyes: bool,

    /// Do not overwrite output files
    #[arg(short = 'n', long = "preserve", conflicts_with = "assumeyes")]
    assumeno: bool,
}

#[derive(Debug, Subcommand)]
enum Subcommands {
    /// Compress a raw image into the FourZip format
    Compress(CompressArgs),

    /// Uncompress a FourZip image and render it
    Decompress(DecompressArgs),

    /// Convert an ordinary image into a raw grayscale image
    Raw(RawArgs),
}

#[derive(Debug, Args)]
struct CompressArgs {
    /// Input raw image, one pixel value per line
    input: PathBuf,

    /// Output path for the compressed image
    output: PathBuf,

    /// Compress on a single thread
    #[arg(short, long)]
    sequential: bool,
}

#[derive(Debug, Args)]
struct DecompressArgs {
    /// Input compressed image
    input: PathBuf,

    /// Render the image to this file, in any format supported by `image`
    output: Option<PathBuf>,

    /// Also write the uncompressed pixels as a raw image
    #[arg(short, long)]
    raw: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RawArgs {
    /// Input image file of any type supported by `image`
    input: PathBuf,

    /// Output path for the raw image
    output: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    let assume = if args.assumeyes {
        Some(Assume::Yes)
    } else if args.assumeno {
        Some(Assume::No)
    } else {
        None
    };

    let result = match args.command {
        Subcommands::Compress(a) => compress(a, assume),
        Subcommands::Decompress(a) => decompress(a, assume),
        Subcommands::Raw(a) => raw(a, assume),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn compress(args: CompressArgs, assume: Option<Assume>) -> Result<()> {
    if !args.input.try_exists()? {
        bail!("Input file {:?} does not exist", args.input);
    }

    if args.output.try_exists()?
        && !exists_decision("Output", "Overwrite", &args.output, assume)
    {
        return Ok(())
    }

    let start = Instant::now();

    let mut picture = QuadImage::open_raw(&args.input)?;
    picture.compress_with(fourzip::CompressOptions {
        parallel: !args.sequential,
    })?;

    println!("{picture}");

    picture.save(&args.output)?;

    let raw_size = picture.raw_size()?;
    let compressed_size = picture.compressed_size()?;

    println!("Raw image size: {raw_size}");
    println!("Compressed image size: {compressed_size}");
    println!("Size reduction: {}%", size_reduction(raw_size, compressed_size));
    println!("Took {}ms.", start.elapsed().as_millis());

    Ok(())
}

fn decompress(args: DecompressArgs, assume: Option<Assume>) -> Result<()> {
    if !args.input.try_exists()? {
        bail!("Input file {:?} does not exist", args.input);
    }

    let mut picture = fourzip::open(&args.input)?;
    picture.uncompress()?;

    println!("{picture}");

    let side = picture.side_dim();
    println!("Side dimension: {side}");

    if let Some(raw_path) = args.raw {
        if !raw_path.try_exists()?
            || exists_decision("Raw output", "Overwrite", &raw_path, assume)
        {
            picture.save_raw(&raw_path)?;
        }
    }

    let Some(output) = args.output else {
        return Ok(())
    };

    if output.try_exists()?
        && !exists_decision("Output", "Overwrite", &output, assume)
    {
        return Ok(())
    }

    let pixels = picture.into_raw()?;
    debug!(side, path = ?output, "rendering image");

    image::save_buffer(
        output,
        &pixels,
        side as u32,
        side as u32,
        ColorType::L8,
    )?;

    Ok(())
}

fn raw(args: RawArgs, assume: Option<Assume>) -> Result<()> {
    if !args.input.try_exists()? {
        bail!("Input file {:?} does not exist", args.input);
    }

    if args.output.try_exists()?
        && !exists_decision("Output", "Overwrite", &args.output, assume)
    {
        return Ok(())
    }

    let gray = ImageReader::open(&args.input)?
        .decode()?
        .into_luma8();

    let Some(square) = largest_square(&gray) else {
        bail!("Input image {:?} is empty", args.input);
    };

    let picture = QuadImage::from_raw_pixels(square.as_raw())?;
    picture.write_raw(BufWriter::new(File::create(&args.output)?))?;

    println!(
        "Wrote {}x{} raw image from {}x{} input",
        picture.side_dim(),
        picture.side_dim(),
        gray.width(),
        gray.height(),
    );

    Ok(())
}
