//! Show dataset information.

use std::path::PathBuf;

use rowcast_data_model::dataset::Dataset;
use rowcast_processing_core::archetype_kind;

pub fn run(path: PathBuf, episode_column: &str) -> anyhow::Result<()> {
    let dataset =
        Dataset::open(&path).map_err(|e| anyhow::anyhow!("Failed to open dataset: {e}"))?;

    println!("Dataset: {}", dataset.name());
    println!("  Rows file: {}", dataset.rows_path().display());

    let mut rows = 0usize;
    let mut episodes: Vec<i64> = Vec::new();
    let mut first = None;
    for row in dataset.rows()? {
        let row = row?;
        if let Some(episode) = row.get(episode_column).and_then(|c| c.as_i64()) {
            if !episodes.contains(&episode) {
                episodes.push(episode);
            }
        }
        if first.is_none() {
            first = Some(row);
        }
        rows += 1;
    }

    println!("  Rows: {rows}");
    if episodes.is_empty() {
        println!("  Episodes: none ('{episode_column}' not present)");
    } else {
        println!("  Episodes: {} ({episode_column})", episodes.len());
    }
    println!();

    let Some(first) = first else {
        println!("Dataset has no rows.");
        return Ok(());
    };

    println!("Columns (first row):");
    for (column, value) in first.iter() {
        println!(
            "  {column}: {} -> {}",
            value.type_name(),
            archetype_kind(column, value)
        );
    }

    Ok(())
}
