//! Summarize a recording file.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use rowcast_recording::read_recording;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let recording = read_recording(&path)?;

    println!("Recording: {}", path.display());
    match &recording.header {
        Some(header) => {
            println!("  Application: {}", header.application_id);
            println!("  Source: {}", header.source);
            println!("  Created: {}", header.created_at);
            println!("  Schema: {}", header.schema_version);
        }
        None => println!("  (no header)"),
    }
    println!("  Entries: {}", recording.entries.len());
    println!();

    let mut per_path: BTreeMap<String, (usize, BTreeSet<&'static str>)> = BTreeMap::new();
    let mut timelines = BTreeSet::new();
    for entry in &recording.entries {
        let slot = per_path.entry(entry.path.to_string()).or_default();
        slot.0 += 1;
        slot.1.insert(entry.archetype.kind().as_str());
        timelines.extend(entry.time.iter().map(|(name, _)| name.to_string()));
    }

    println!("Entities:");
    for (path, (count, kinds)) in &per_path {
        let kinds: Vec<_> = kinds.iter().copied().collect();
        println!("  {path}: {count} ({})", kinds.join(", "));
    }
    println!();

    println!("Timelines:");
    if timelines.is_empty() {
        println!("  (none)");
    }
    for name in &timelines {
        println!("  {name}");
    }

    Ok(())
}
