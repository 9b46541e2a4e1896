//! Check system capabilities.

use rowcast_common::config::{config_file_path, AppConfig};
use rowcast_video::FfmpegDecoder;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Rowcast System Check");
    println!("{}", "=".repeat(50));

    let decoder = FfmpegDecoder::new();
    let tools = [
        ("ffmpeg", decoder.ffmpeg_available()),
        ("ffprobe", decoder.ffprobe_available()),
    ];
    for (name, available) in tools {
        if available {
            println!("[OK] {name} found");
        } else {
            println!("[WARN] {name} not found (video columns cannot be decoded)");
        }
    }

    println!();
    println!("Config: {}", config_file_path().display());
    println!("Cache directory: {}", config.cache_dir.display());
    println!(
        "Time-like columns: {}",
        config.conversion.time_like_columns.join(", ")
    );
    println!(
        "Ignored columns: {}",
        config.conversion.ignored_columns.join(", ")
    );

    println!();
    if tools.iter().all(|(_, ok)| *ok) {
        println!("All capabilities are available. Rowcast is ready.");
    } else {
        println!("Datasets without video columns can still be converted.");
    }

    Ok(())
}
