//! Small shared helpers: downloads-folder cleanup and display formatting.

use std::fs;
use std::io;
use std::path::Path;

/// Removes every regular file under `dir`, recursively. Directories are kept.
///
/// Best-effort housekeeping for the downloads folder between runs; a missing
/// directory is not an error and counts as zero removals.
///
/// # Returns
///
/// The number of files removed.
pub fn cleanup_downloads(dir: &Path) -> io::Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            removed += cleanup_downloads(&path)?;
        } else {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }

    log::info!("Cleaned {} file(s) under {}", removed, dir.display());
    Ok(removed)
}

/// Renders an ETA in seconds as `"X min Y sec"`, or `"Y sec"` under a minute.
pub fn format_eta(seconds: u64) -> String {
    let minutes = seconds / 60;
    let secs = seconds % 60;
    if minutes > 0 {
        format!("{} min {} sec", minutes, secs)
    } else {
        format!("{} sec", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn test_cleanup_downloads_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("batch-a");
        fs::create_dir_all(&sub).unwrap();
        File::create(dir.path().join("a.pdf"))
            .unwrap()
            .write_all(b"x")
            .unwrap();
        File::create(sub.join("b.mp4")).unwrap().write_all(b"y").unwrap();

        let removed = cleanup_downloads(dir.path()).unwrap();
        assert_eq!(removed, 2);
        assert!(sub.exists(), "directories should be kept");
    }

    #[test]
    fn test_cleanup_downloads_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(cleanup_downloads(&missing).unwrap(), 0);
    }

    #[test]
    fn test_format_eta() {
        assert_eq!(format_eta(0), "0 sec");
        assert_eq!(format_eta(45), "45 sec");
        assert_eq!(format_eta(65), "1 min 5 sec");
        assert_eq!(format_eta(3600), "60 min 0 sec");
    }
}
