use std::{io::Write, path::Path};

use serde::{Serialize, de::DeserializeOwned};

use crate::error::{Error, Result};

/// Serialize `value` as JSON to `path`, replacing any existing file
/// atomically. The payload is written to a sibling temp file first and
/// renamed into place, so a concurrent reader never observes a partially
/// written artifact.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let tmp = path.with_extension("json.tmp");

    let mut file = std::fs::File::create(&tmp)?;
    serde_json::to_writer(&mut file, value)?;
    file.flush()?;
    file.sync_all()?;

    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// Load a JSON artifact. Maps a missing file to `MissingPrerequisite` so
/// callers surface an actionable message instead of a raw I/O error.
pub fn read_json<T: DeserializeOwned>(
    path: &Path,
    artifact: &'static str,
) -> Result<T> {
    if !path.exists() {
        return Err(Error::MissingPrerequisite { artifact });
    }
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}
