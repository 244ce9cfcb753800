//! Main entry point for the memzip CLI application.
//!
//! This binary is the filesystem-facing caller of the in-memory codec: it
//! loads archives and files from disk, hands the bytes to [`ZipCodec`], and
//! writes the results back.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use clap::Parser;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use memzip::{Cli, DeflateCompressor, ExtractedFile, NewFile, ZipCodec};

/// Application entry point.
///
/// Parses command-line arguments and dispatches to create, list or
/// extract mode.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let codec = ZipCodec::new(DeflateCompressor::new(cli.compression()));

    if cli.create {
        return create_archive(&codec, &cli).await;
    }

    let buffer = fs::read(&cli.archive)
        .await
        .with_context(|| format!("cannot read {}", cli.archive))?;

    if cli.list || cli.verbose {
        return list_files(&codec, &buffer, cli.verbose);
    }

    let files = codec.extract(&buffer).await?;
    let selected: Vec<_> = files
        .into_iter()
        .filter(|f| !f.name.ends_with('/') && cli.wants(&f.name))
        .collect();

    let show_filename = cli.pipe && selected.len() > 1;
    for file in &selected {
        extract_file(file, &cli, show_filename).await?;
    }

    Ok(())
}

/// Build `cli.archive` from the files named on the command line.
///
/// Entry names are the paths as given, with `\` turned into `/`; each
/// entry's modification time comes from the file's metadata.
async fn create_archive(codec: &ZipCodec, cli: &Cli) -> Result<()> {
    if cli.files.is_empty() {
        bail!("-c needs at least one file to add");
    }
    if !cli.overwrite && fs::try_exists(&cli.archive).await? {
        bail!("{} already exists (use -o to overwrite)", cli.archive);
    }

    let mut inputs = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let metadata = fs::metadata(path)
            .await
            .with_context(|| format!("cannot stat {path}"))?;
        if !metadata.is_file() {
            bail!("{path} is not a regular file");
        }
        let data = fs::read(path)
            .await
            .with_context(|| format!("cannot read {path}"))?;

        let mut file = NewFile::new(path.replace('\\', "/"), data);
        if let Ok(modified) = metadata.modified() {
            file = file.with_last_modification(DateTime::<Local>::from(modified).naive_local());
        }
        if !cli.is_quiet() {
            println!("  adding: {}", file.name);
        }
        inputs.push(file);
    }

    let archive = codec.create(&inputs).await?;
    fs::write(&cli.archive, &archive)
        .await
        .with_context(|| format!("cannot write {}", cli.archive))?;

    if !cli.is_quiet() {
        eprintln!(
            "\n{} files, {} written to {}",
            inputs.len(),
            format_size(archive.len() as u64),
            cli.archive
        );
    }

    Ok(())
}

/// List files in the ZIP archive.
///
/// Supports two output formats:
/// - Simple format (`-l`): Just file names, one per line
/// - Verbose format (`-v`): Detailed table with size, compression ratio, and timestamps
fn list_files(codec: &ZipCodec, buffer: &[u8], verbose: bool) -> Result<()> {
    let entries = codec.list(buffer)?;

    if !verbose {
        for entry in &entries {
            println!("{}", entry.name);
        }
        return Ok(());
    }

    println!(
        "{:>10}  {:>10}  {:>5}  {:>10}  {:>5}  Name",
        "Length", "Size", "Cmpr", "Date", "Time"
    );
    println!("{}", "-".repeat(70));

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in &entries {
        let (year, month, day) = entry.mod_date();
        let (hour, minute, _second) = entry.mod_time();
        println!(
            "{:>10}  {:>10}  {}  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
            entry.uncompressed_size,
            entry.compressed_size,
            ratio(entry.compressed_size as u64, entry.uncompressed_size as u64),
            year,
            month,
            day,
            hour,
            minute,
            entry.name
        );

        if !entry.is_directory() {
            total_uncompressed += entry.uncompressed_size as u64;
            total_compressed += entry.compressed_size as u64;
            file_count += 1;
        }
    }

    println!("{}", "-".repeat(70));
    println!(
        "{:>10}  {:>10}  {}  {:>21}  {} files",
        total_uncompressed,
        total_compressed,
        ratio(total_compressed, total_uncompressed),
        "",
        file_count
    );

    Ok(())
}

/// Percentage saved by compression, right-aligned to five columns.
fn ratio(compressed: u64, uncompressed: u64) -> String {
    if uncompressed > 0 && compressed <= uncompressed {
        format!("{:>4}%", 100 - (compressed * 100 / uncompressed))
    } else {
        "  0%".to_string()
    }
}

/// Write one extracted file to stdout (`-p`) or below the output directory.
///
/// Names that would escape the output directory are skipped, as are
/// existing files unless `-o` is given.
async fn extract_file(file: &ExtractedFile, cli: &Cli, show_filename: bool) -> Result<()> {
    if cli.pipe {
        let mut stdout = tokio::io::stdout();
        if show_filename {
            stdout
                .write_all(format!("--- {} ---\n", file.name).as_bytes())
                .await?;
        }
        stdout.write_all(&file.data).await?;
        stdout.flush().await?;
        return Ok(());
    }

    let relative = Path::new(&file.name);
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        warn!(name = %file.name, "skipping entry with unsafe path");
        return Ok(());
    }
    let output_path = match cli.extract_dir {
        Some(ref dir) => PathBuf::from(dir).join(relative),
        None => relative.to_path_buf(),
    };

    if !cli.overwrite && fs::try_exists(&output_path).await? {
        if !cli.is_very_quiet() {
            eprintln!("Skipping: {} (use -o to overwrite)", file.name);
        }
        return Ok(());
    }

    if !cli.is_quiet() {
        println!("  extracting: {}", file.name);
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(&output_path, &file.data)
        .await
        .with_context(|| format!("cannot write {}", output_path.display()))?;

    Ok(())
}

/// Format a byte size into a human-readable string.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
