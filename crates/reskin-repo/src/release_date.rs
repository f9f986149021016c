//! Release date of a resolved artifact
//!
//! The repository gives no signal about whether a forced resolve actually
//! fetched the file. A modification time at or after the moment the
//! resolve started means it did, and that time is the release date. An
//! older modification time means the cached copy was kept, so the first
//! archive entry's timestamp is used instead.

use std::fs::File;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDate, TimeZone};

use crate::error::Result;

pub fn resolve_release_date(artifact_file: &Path, resolve_start: SystemTime) -> Result<DateTime<Local>> {
    let modified = std::fs::metadata(artifact_file)?.modified()?;
    let modified_local = DateTime::<Local>::from(modified);

    if modified >= resolve_start {
        return Ok(modified_local);
    }

    match first_entry_time(artifact_file) {
        Some(entry_time) => Ok(entry_time),
        None => {
            tracing::warn!(
                file = %artifact_file.display(),
                "Artifact is not an archive with entries, using its modification time as release date"
            );
            Ok(modified_local)
        }
    }
}

/// Modification time of the first entry of a zip archive
fn first_entry_time(path: &Path) -> Option<DateTime<Local>> {
    let file = File::open(path).ok()?;
    let mut archive = zip::ZipArchive::new(file).ok()?;
    if archive.len() == 0 {
        return None;
    }
    let entry = archive.by_index(0).ok()?;
    let stamp = entry.last_modified();

    let naive = NaiveDate::from_ymd_opt(
        i32::from(stamp.year()),
        u32::from(stamp.month()),
        u32::from(stamp.day()),
    )?
    .and_hms_opt(
        u32::from(stamp.hour()),
        u32::from(stamp.minute()),
        u32::from(stamp.second()),
    )?;
    Local.from_local_datetime(&naive).earliest()
}
