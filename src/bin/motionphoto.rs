//! Thin CLI batch driver: pairs each still image in a folder with its
//! sibling movie and assembles a Motion Photo for each pair.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, warn};

use motionphoto::{assemble, AssembleOptions};

#[derive(Parser, Debug)]
#[command(name = "motionphoto", about = "Assemble Motion Photos from HEIC/JPEG + MOV/MP4 pairs")]
struct Cli {
    /// Folder to scan for still image / movie pairs
    folder: PathBuf,

    /// Directory to write assembled Motion Photos into (defaults to `folder`)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Use the movie's own duration instead of the "-1" presentation offset sentinel
    #[arg(long)]
    use_movie_duration: bool,

    /// Parse and mutate in memory but write no output files
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let pairs = match find_pairs(&cli.folder) {
        Ok(pairs) => pairs,
        Err(e) => {
            error!("failed to scan {}: {}", cli.folder.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if pairs.is_empty() {
        warn!("no still image / movie pairs found in {}", cli.folder.display());
        return ExitCode::SUCCESS;
    }

    let mut options = AssembleOptions::default();
    if cli.use_movie_duration {
        options = options.without_presentation_offset_fix();
    }
    if cli.dry_run {
        options = options.dry_run();
    }

    let out_dir = cli.out_dir.unwrap_or_else(|| cli.folder.clone());
    let mut failures = 0usize;
    for (image, movie) in &pairs {
        let output = out_dir.join(output_name(image));
        if let Err(e) = assemble(image, movie, &output, &options) {
            error!("failed to assemble {}: {}", image.display(), e);
            failures += 1;
        }
    }

    if failures > 0 {
        error!("{} of {} pairs failed", failures, pairs.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Still images paired with a sibling movie of the same stem (`IMG_0001.heic`
/// + `IMG_0001.mov` or `IMG_0001.mp4`).
fn find_pairs(folder: &Path) -> std::io::Result<Vec<(PathBuf, PathBuf)>> {
    let mut pairs = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !ext.eq_ignore_ascii_case("heic") && !ext.eq_ignore_ascii_case("jpeg")
            && !ext.eq_ignore_ascii_case("jpg")
        {
            continue;
        }
        let stem = path.file_stem().unwrap_or_default();
        let movie = ["mov", "mp4"]
            .iter()
            .map(|ext| path.with_file_name(stem).with_extension(ext))
            .find(|p| p.exists());
        if let Some(movie) = movie {
            pairs.push((path, movie));
        } else {
            warn!("no companion movie for {}", path.display());
        }
    }
    Ok(pairs)
}

fn output_name(image: &Path) -> PathBuf {
    let stem = image.file_stem().unwrap_or_default();
    Path::new(stem).with_extension("motion.heic")
}
