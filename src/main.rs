//! ddslook CLI - Command-line tool for inspecting and converting DDS textures.
//!
//! This is the main entry point for the ddslook command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use image::RgbaImage;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

use ddslook::prelude::*;

/// ddslook - DDS texture inspection and conversion tool
#[derive(Parser)]
#[command(name = "ddslook")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show codec, dimensions and mip count of a DDS file
    Info {
        /// Input DDS file
        #[arg(short, long, env = "DDSLOOK_INPUT")]
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode a DDS file to PNG
    Convert {
        /// Input DDS file
        #[arg(short, long, env = "DDSLOOK_INPUT")]
        input: PathBuf,

        /// Output PNG file
        #[arg(short, long, env = "DDSLOOK_OUTPUT")]
        output: PathBuf,

        /// Preferred width; picks the smallest mip at least this wide
        #[arg(long)]
        width: Option<u32>,

        /// Preferred height; picks the smallest mip at least this tall
        #[arg(long)]
        height: Option<u32>,
    },

    /// Generate PNG thumbnails for every matching DDS file
    Thumbnails {
        /// Input glob pattern (e.g. "textures/**/*.dds")
        #[arg(short, long, env = "DDSLOOK_INPUT")]
        input: String,

        /// Output directory
        #[arg(short, long, env = "DDSLOOK_OUTPUT")]
        output: PathBuf,

        /// Maximum thumbnail edge in pixels
        #[arg(short, long, default_value = "256")]
        size: u32,
    },
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Info { input, json } => {
            cmd_info(&input, json)?;
        }
        Commands::Convert {
            input,
            output,
            width,
            height,
        } => {
            cmd_convert(&input, &output, width, height)?;
        }
        Commands::Thumbnails { input, output, size } => {
            cmd_thumbnails(&input, &output, size)?;
        }
    }

    Ok(())
}

fn cmd_info(input: &Path, json: bool) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;
    let info = probe(&data).context("Failed to parse DDS header")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("File:     {}", input.display());
    println!("Codec:    {}", info.codec_name);
    println!("Size:     {}x{}", info.width, info.height);
    println!("Mips:     {}", info.mip_count);
    println!("Cubemap:  {}", if info.is_cubemap { "yes" } else { "no" });

    Ok(())
}

fn cmd_convert(input: &Path, output: &Path, width: Option<u32>, height: Option<u32>) -> Result<()> {
    println!("Converting: {} -> {}", input.display(), output.display());

    let start = Instant::now();
    let data = fs::read(input).context("Failed to read input file")?;

    let surface = decode(&data, width, height).context("Failed to decode DDS")?;
    info!(
        level = surface.level,
        width = surface.width,
        height = surface.height,
        "decoded surface"
    );

    save_png(surface, output)?;

    println!("Conversion complete in {:?}", start.elapsed());

    Ok(())
}

fn save_png(surface: DecodedSurface, path: &Path) -> Result<()> {
    let image = RgbaImage::from_raw(surface.width, surface.height, surface.rgba)
        .context("Decoded buffer does not match its dimensions")?;
    image
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Holds the image handed over by the thumbnail adapter.
#[derive(Default)]
struct ThumbnailSlot {
    image: Option<DecodedSurface>,
}

impl ThumbnailSurface for ThumbnailSlot {
    fn set_image(&mut self, image: DecodedSurface, badge: Option<&'static str>) {
        debug!(?badge, width = image.width, height = image.height, "thumbnail ready");
        self.image = Some(image);
    }
}

fn cmd_thumbnails(pattern: &str, output: &Path, size: u32) -> Result<()> {
    let paths: Vec<PathBuf> = glob::glob(pattern)
        .context("Invalid glob pattern")?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();

    println!("Generating {} thumbnails...", paths.len());

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    fs::create_dir_all(output)?;

    let start = Instant::now();
    let failed = AtomicUsize::new(0);

    paths.par_iter().for_each(|path| {
        if let Err(e) = write_thumbnail(path, output, size) {
            pb.println(format!("  {}: {e:#}", path.display()));
            failed.fetch_add(1, Ordering::Relaxed);
        }
        pb.inc(1);
    });

    pb.finish_with_message("Done");

    let failed = failed.into_inner();
    println!(
        "Thumbnails completed in {:?}: {} written, {} failed",
        start.elapsed(),
        paths.len() - failed,
        failed
    );

    Ok(())
}

fn write_thumbnail(path: &Path, output: &Path, size: u32) -> Result<()> {
    let data = fs::read(path).context("Failed to read file")?;

    let mut slot = ThumbnailSlot::default();
    let max = f64::from(size);
    generate_thumbnail(&data, max, max, &mut slot, &NeverCancelled)?;
    let surface = slot.image.context("No thumbnail produced")?;

    let (width, height) = (surface.width, surface.height);
    let image = RgbaImage::from_raw(width, height, surface.rgba)
        .context("Decoded buffer does not match its dimensions")?;

    // the chosen mip is at least `size` on both axes; shrink to fit
    let image = if width > size || height > size {
        let scale = f64::from(size) / f64::from(width.max(height));
        let w = ((f64::from(width) * scale).round() as u32).max(1);
        let h = ((f64::from(height) * scale).round() as u32).max(1);
        image::imageops::thumbnail(&image, w, h)
    } else {
        image
    };

    let stem = path.file_stem().context("File has no name")?;
    let target = output.join(format!("{}.png", stem.to_string_lossy()));
    image
        .save(&target)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    Ok(())
}
