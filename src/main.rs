//! Texstore CLI - Command-line tool for inspecting DDS texture files.
//!
//! This is the main entry point for the texstore command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use texstore::prelude::*;

/// Texstore - DDS texture inspection tool
#[derive(Parser)]
#[command(name = "texstore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Reject textures whose payload is larger than this many bytes
    #[arg(long, env = "TEXSTORE_MAX_PAYLOAD", global = true)]
    max_payload: Option<u64>,

    /// Ignore the pitch declared in the header and compute it instead
    #[arg(long, env = "TEXSTORE_RECOMPUTE_PITCH", global = true)]
    recompute_pitch: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the header, format, shape and level table of a DDS file
    Info {
        /// Input DDS file
        file: PathBuf,
    },

    /// Write every level of a DDS file to its own raw file
    Dump {
        /// Input DDS file
        file: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Load every file matching a glob pattern and report failures
    Verify {
        /// Glob pattern, e.g. "textures/**/*.dds"
        pattern: String,
    },
}

impl Cli {
    fn loader(&self) -> DdsLoader {
        let mut options = LoadOptions::new();
        if self.recompute_pitch {
            options = options.pitch_policy(PitchPolicy::Recompute);
        }
        if let Some(limit) = self.max_payload {
            options = options.max_payload_bytes(limit);
        }
        DdsLoader::new(options)
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let loader = cli.loader();

    match &cli.command {
        Commands::Info { file } => {
            cmd_info(&loader, file)?;
        }
        Commands::Dump { file, output } => {
            cmd_dump(&loader, file, output)?;
        }
        Commands::Verify { pattern } => {
            cmd_verify(&loader, pattern)?;
        }
    }

    Ok(())
}

fn cmd_info(loader: &DdsLoader, file: &Path) -> Result<()> {
    let info = loader
        .inspect_file(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let header = &info.headers.header;
    let pf = &header.pixel_format;
    println!("File:        {}", file.display());
    println!(
        "Header:      {}x{}x{}, {} mips declared, flags {:#x}, caps {:#x}/{:#x}",
        { header.width },
        { header.height },
        { header.depth },
        { header.mipmap_count },
        { header.flags },
        { header.caps },
        { header.caps2 },
    );
    println!(
        "Pixel fmt:   flags {:#x}, fourcc {}, {} bits",
        { pf.flags },
        pf.four_cc,
        { pf.rgb_bit_count },
    );
    if let Some(dxt10) = &info.headers.dxt10 {
        println!(
            "DX10:        {}, dimension {}, array {}, misc {:#x}",
            dxt10.format(),
            { dxt10.resource_dimension },
            { dxt10.array_size },
            { dxt10.misc_flag },
        );
    }

    let format = &info.format;
    println!(
        "Format:      {} ({} {:?}, {}x{} blocks of {} bytes)",
        format,
        format.channels,
        format.numeric,
        format.block.width,
        format.block.height,
        format.block_bytes,
    );
    println!("Alpha:       {:?}", info.alpha_mode);

    let shape = &info.shape;
    println!(
        "Shape:       {:?}{}, {} layers, {} faces, {} mips",
        shape.kind,
        if shape.kind.is_array() { " (array)" } else { "" },
        shape.layers,
        shape.faces,
        shape.mip_levels
    );
    println!("Payload:     {} bytes", info.payload_size());

    println!();
    println!(
        "{:>5} {:>4} {:>4} {:>17} {:>10} {:>12} {:>12}",
        "layer", "face", "mip", "extent", "pitch", "offset", "size"
    );
    for plan in info.layout.levels() {
        let e = &plan.extent;
        println!(
            "{:>5} {:>4} {:>4} {:>17} {:>10} {:>12} {:>12}",
            plan.layer,
            plan.face,
            plan.level,
            format!("{}x{}x{}", e.width, e.height, e.depth),
            e.row_pitch,
            plan.offset,
            e.size,
        );
    }

    Ok(())
}

fn cmd_dump(loader: &DdsLoader, file: &Path, output: &Path) -> Result<()> {
    println!("Dumping: {} -> {}", file.display(), output.display());

    let storage = loader
        .load_file(file)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    let written = dump_levels(&storage, output)?;

    println!("Wrote {} levels ({} bytes)", written, storage.size());

    Ok(())
}

/// File name a level is dumped under.
fn level_file_name(layer: u32, face: u32, level: u32) -> String {
    format!("layer{layer}_face{face}_mip{level}.bin")
}

fn dump_levels(storage: &Storage, output: &Path) -> Result<usize> {
    fs::create_dir_all(output).context("Failed to create output directory")?;

    for plan in storage.levels() {
        let start = plan.offset;
        let bytes = &storage.data()[start..start + plan.extent.size];
        let path = output.join(level_file_name(plan.layer, plan.face, plan.level));
        fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(storage.levels().count())
}

fn cmd_verify(loader: &DdsLoader, pattern: &str) -> Result<()> {
    let paths: Vec<PathBuf> = glob::glob(pattern)
        .context("Invalid glob pattern")?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("skipping {}: {}", e.path().display(), e.error());
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();

    println!("Verifying {} files...", paths.len());

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let mut failures: Vec<(PathBuf, texstore::dds::Error)> = paths
        .par_iter()
        .filter_map(|path| {
            let result = loader.load_file(path);
            pb.inc(1);
            result.err().map(|e| (path.clone(), e))
        })
        .collect();
    pb.finish_and_clear();

    failures.sort_by(|a, b| a.0.cmp(&b.0));
    for (path, error) in &failures {
        eprintln!("{:?}: {}: {}", error.kind(), path.display(), error);
    }

    println!(
        "Verified {} files in {:?} ({} failed)",
        paths.len(),
        start.elapsed(),
        failures.len()
    );

    if !failures.is_empty() {
        anyhow::bail!("{} of {} files failed to load", failures.len(), paths.len());
    }

    Ok(())
}
