//! Per-file diagnostic cache.
//!
//! One cache file per analyzed source path, named by the hash of that path.
//! Contents: line 1 the source-content hash, line 2 a timestamp in
//! nanoseconds since the epoch, line 3 the diagnostic count `N`, then
//! `N x 6` lines: severity index, rule name, message, filename, line,
//! column. A hash mismatch invalidates the entry.

use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use cclint_diagnostics::{Diagnostic, Location, Severity};
use rustc_hash::FxHasher;
use tracing::debug;

/// Stable content hash used for cache keys and freshness checks.
pub fn content_hash(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    hasher.finish()
}

fn severity_index(severity: Severity) -> u8 {
    match severity {
        Severity::Error => 0,
        Severity::Warning => 1,
        Severity::Info => 2,
        Severity::Note => 3,
    }
}

fn severity_from_index(index: &str) -> Severity {
    match index {
        "0" => Severity::Error,
        "2" => Severity::Info,
        "3" => Severity::Note,
        _ => Severity::Warning,
    }
}

/// Filesystem-backed diagnostic cache.
#[derive(Debug)]
pub struct FileCache {
    directory: PathBuf,
}

impl FileCache {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        FileCache { directory: directory.into() }
    }

    fn entry_path(&self, source_path: &str) -> PathBuf {
        self.directory.join(format!("{:016x}.cache", content_hash(source_path)))
    }

    /// Load cached diagnostics for `source_path` if the stored hash matches
    /// the current content hash.
    pub fn load(&self, source_path: &str, hash: u64) -> Option<Vec<Diagnostic>> {
        let entry = self.entry_path(source_path);
        let text = fs::read_to_string(&entry).ok()?;
        let mut lines = text.lines();

        let stored_hash: u64 = lines.next()?.parse().ok()?;
        if stored_hash != hash {
            debug!(path = source_path, "cache entry is stale");
            return None;
        }
        let _timestamp = lines.next()?;
        let count: usize = lines.next()?.parse().ok()?;

        let mut diagnostics = Vec::with_capacity(count);
        for _ in 0..count {
            let severity = severity_from_index(lines.next()?);
            let rule = lines.next()?;
            let message = lines.next()?;
            let file = lines.next()?;
            let line: u32 = lines.next()?.parse().ok()?;
            let column: u32 = lines.next()?.parse().ok()?;
            diagnostics.push(Diagnostic::new(
                severity,
                rule,
                message,
                Location::new(file, line, column),
            ));
        }

        debug!(path = source_path, count, "cache hit");
        Some(diagnostics)
    }

    /// Store diagnostics for `source_path`. Fix hints, ranges, and notes are
    /// not round-tripped; only the reportable core of each diagnostic is.
    pub fn store(&self, source_path: &str, hash: u64, diagnostics: &[Diagnostic]) {
        if fs::create_dir_all(&self.directory).is_err() {
            return;
        }

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);

        let mut text = format!("{hash}\n{timestamp}\n{}\n", diagnostics.len());
        for diag in diagnostics {
            text.push_str(&format!(
                "{}\n{}\n{}\n{}\n{}\n{}\n",
                severity_index(diag.severity),
                diag.rule_name.replace('\n', " "),
                diag.message.replace('\n', " "),
                diag.location.file.replace('\n', " "),
                diag.location.line,
                diag.location.column
            ));
        }

        let _ = fs::write(self.entry_path(source_path), text);
    }

    /// Drop the entry for one source path.
    pub fn invalidate(&self, source_path: &str) {
        let _ = fs::remove_file(self.entry_path(source_path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<Diagnostic> {
        vec![
            Diagnostic::new(
                Severity::Error,
                "naming-convention",
                "bad name",
                Location::new("a.cpp", 3, 5),
            ),
            Diagnostic::new(
                Severity::Warning,
                "max-line-length",
                "too long",
                Location::new("a.cpp", 7, 1),
            ),
        ]
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        let hash = content_hash("int x;\n");

        cache.store("src/a.cpp", hash, &sample());
        let loaded = cache.load("src/a.cpp", hash).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].severity, Severity::Error);
        assert_eq!(loaded[0].rule_name, "naming-convention");
        assert_eq!(loaded[0].message, "bad name");
        assert_eq!(loaded[0].location, Location::new("a.cpp", 3, 5));
        assert_eq!(loaded[1].severity, Severity::Warning);
    }

    #[test]
    fn test_stale_hash_misses() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());

        cache.store("src/a.cpp", content_hash("old"), &sample());
        assert!(cache.load("src/a.cpp", content_hash("new")).is_none());
    }

    #[test]
    fn test_missing_entry_misses() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        assert!(cache.load("never/stored.cpp", 1).is_none());
    }

    #[test]
    fn test_invalidate() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        let hash = content_hash("x");

        cache.store("a.cpp", hash, &sample());
        assert!(cache.load("a.cpp", hash).is_some());
        cache.invalidate("a.cpp");
        assert!(cache.load("a.cpp", hash).is_none());
    }

    #[test]
    fn test_wire_format_lines() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        let hash = content_hash("int x;\n");
        cache.store("src/a.cpp", hash, &sample());

        let entry = dir
            .path()
            .read_dir()
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        let text = fs::read_to_string(entry).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], hash.to_string());
        assert_eq!(lines[2], "2");
        // 3 header lines + 2 diagnostics x 6 lines
        assert_eq!(lines.len(), 3 + 12);
        assert_eq!(lines[3], "0");
        assert_eq!(lines[4], "naming-convention");
    }
}
