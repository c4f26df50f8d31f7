use std::{
    collections::BTreeMap,
    fs::{File, OpenOptions},
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::Context as _;
use log::info;

/// Root-relative path to file text.
pub type Snapshot = BTreeMap<String, String>;

pub fn load_snapshot(snapshot_path: &Path) -> anyhow::Result<Snapshot> {
    let fd = File::open(snapshot_path)
        .with_context(|| format!("opening snapshot {snapshot_path:?}"))?;
    let reader = BufReader::new(fd);
    let snapshot: Snapshot = serde_json::from_reader(reader)
        .with_context(|| format!("snapshot {snapshot_path:?} is not a JSON object of strings"))?;
    info!("loaded {} files from {snapshot_path:?}", snapshot.len());
    Ok(snapshot)
}

pub fn save_snapshot(snapshot_path: &Path, snapshot: &Snapshot) -> anyhow::Result<()> {
    let fd = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(snapshot_path)
        .with_context(|| format!("creating snapshot {snapshot_path:?}"))?;
    let writer = BufWriter::new(fd);
    serde_json::to_writer_pretty(writer, snapshot)?;
    info!("saved {} files to {snapshot_path:?}", snapshot.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");
        let mut snapshot = Snapshot::new();
        snapshot.insert("pages/pari.md".into(), "---\ntitle: pari\n---\n# pari".into());
        snapshot.insert("empty.md".into(), String::new());

        save_snapshot(&path, &snapshot).unwrap();
        assert_eq!(load_snapshot(&path).unwrap(), snapshot);

        // shorter content must not leave a tail of the previous file
        save_snapshot(&path, &Snapshot::new()).unwrap();
        assert!(load_snapshot(&path).unwrap().is_empty());
    }

    #[test]
    fn rejects_non_string_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"a.md": 1}"#).unwrap();
        assert!(load_snapshot(&path).is_err());
        assert!(load_snapshot(&dir.path().join("missing.json")).is_err());
    }
}
