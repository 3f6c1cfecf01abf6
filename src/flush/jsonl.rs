use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::model::Snapshot;

/// File stems written by [`flush_to_jsonl`], in write order.
pub const SECTIONS: [&str; 8] = [
    "streets",
    "blocks",
    "lots",
    "dwellings",
    "businesses",
    "residents",
    "events",
    "beliefs",
];

/// Write an iterator of serializable items to a JSONL file (one JSON object per line).
fn write_jsonl<T: Serialize>(path: &Path, items: impl Iterator<Item = T>) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for item in items {
        serde_json::to_writer(&mut writer, &item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Read every record of a JSONL file written by [`flush_to_jsonl`].
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> io::Result<Vec<T>> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

/// Flush a snapshot to JSONL files in the given output directory.
///
/// Creates the output directory if it does not exist and writes one
/// `<section>.jsonl` file per entry of [`SECTIONS`].
pub fn flush_to_jsonl(snapshot: &Snapshot, output_dir: &Path) -> io::Result<()> {
    fs::create_dir_all(output_dir)?;

    let path = |stem: &str| output_dir.join(format!("{stem}.jsonl"));
    write_jsonl(&path("streets"), snapshot.streets.iter())?;
    write_jsonl(&path("blocks"), snapshot.blocks.iter())?;
    write_jsonl(&path("lots"), snapshot.lots.iter())?;
    write_jsonl(&path("dwellings"), snapshot.dwellings.iter())?;
    write_jsonl(&path("businesses"), snapshot.businesses.iter())?;
    write_jsonl(&path("residents"), snapshot.residents.iter())?;
    write_jsonl(&path("events"), snapshot.events.iter())?;
    write_jsonl(&path("beliefs"), snapshot.beliefs.iter())?;

    Ok(())
}
