//! Convert a dataset episode into a recording file.

use std::io::Write;
use std::path::{Path, PathBuf};

use rowcast_common::config::AppConfig;
use rowcast_data_model::dataset::{Dataset, EpisodeFilter};
use rowcast_processing_core::{log_dataset, ConversionProgress, ProgressCallback};
use rowcast_recording::{RecordingHeader, RecordingWriter};
use rowcast_video::FfmpegDecoder;

pub fn run(
    config: &AppConfig,
    dataset_path: PathBuf,
    episode: Option<i64>,
    output: Option<PathBuf>,
    force: bool,
) -> anyhow::Result<()> {
    let dataset = Dataset::open(&dataset_path)
        .map_err(|e| anyhow::anyhow!("Failed to open dataset: {e}"))?;

    let output = output
        .unwrap_or_else(|| cache_file_path(&config.cache_dir, dataset.name(), episode));

    if output.exists() && !force {
        println!(
            "Recording already exists: {} (use --force to rebuild)",
            output.display()
        );
        return Ok(());
    }

    tracing::debug!(output = %output.display(), force, "Writing recording");

    let label = episode_label(episode);
    println!("Converting {} episode {label}", dataset.name());

    let conversion = &config.conversion;
    let header = RecordingHeader::new(
        &conversion.application_id,
        format!("{} episode {label}", dataset.name()),
    );
    let partial = partial_path(&output);
    let writer = RecordingWriter::create(partial.clone(), &header)?;
    let filter = episode.map(|e| EpisodeFilter::new(&conversion.episode_column, e));

    let decoder = FfmpegDecoder::new();
    let result = log_dataset(
        &dataset,
        filter,
        writer,
        decoder,
        conversion,
        Some(progress_printer()),
    );
    let summary = match result {
        Ok((writer, summary)) => {
            drop(writer);
            std::fs::rename(&partial, &output)?;
            summary
        }
        Err(e) => {
            println!();
            std::fs::remove_file(&partial).ok();
            return Err(e.into());
        }
    };

    println!();
    println!("  Rows: {}", summary.rows);
    println!("  Entries: {}", summary.entries);
    println!("  Videos decoded: {}", summary.videos_decoded);
    if summary.time_warnings > 0 {
        println!("  Skipped time values: {}", summary.time_warnings);
    }
    println!("Recording saved to: {}", output.display());

    Ok(())
}

/// `<cache_dir>/<dataset>_<episode>.jsonl`.
pub fn cache_file_path(cache_dir: &Path, dataset_name: &str, episode: Option<i64>) -> PathBuf {
    cache_dir.join(format!("{dataset_name}_{}.jsonl", episode_label(episode)))
}

/// Sibling path a recording is written to until conversion succeeds.
fn partial_path(output: &Path) -> PathBuf {
    let mut name = output.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    output.with_file_name(name)
}

fn episode_label(episode: Option<i64>) -> String {
    episode.map_or_else(|| "all".to_string(), |e| e.to_string())
}

fn progress_printer() -> ProgressCallback {
    Box::new(|progress: ConversionProgress| {
        let total = progress
            .total_rows
            .map(|t| format!("/{t}"))
            .unwrap_or_default();
        print!(
            "\r  {}{total} rows, {} entries ({:.0} rows/s)",
            progress.rows_processed, progress.entries_logged, progress.rows_per_sec
        );
        std::io::stdout().flush().ok();
    })
}
