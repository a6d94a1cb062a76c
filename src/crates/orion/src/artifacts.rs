//! Chart artifact lifecycle
//!
//! Each render gets a unique file name. The store remembers the latest chart
//! per session and removes the file it replaces, so one chart per session
//! stays on disk once requests settle.
//!
//! Renders are ordered by a ticket taken before rendering starts. A render
//! that finishes after a newer one in the same session is not recorded, and
//! a chart that may still be in flight to its caller is never deleted.
//!
//! Entries live as long as the store. Hosts with unbounded session ids should
//! call [`ArtifactStore::forget`] when a session ends.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;

use chrono::Local;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::chart::ChartKind;

/// Most recently modified `*.csv` directly inside `dir`
pub fn latest_csv(dir: &Path) -> Option<PathBuf> {
    let pattern = format!(
        "{}/*.csv",
        glob::Pattern::escape(&dir.to_string_lossy())
    );

    let entries = match glob::glob(&pattern) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "invalid CSV search pattern");
            return None;
        }
    };

    entries
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .map(|path| {
            let modified = std::fs::metadata(&path)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, path)
        })
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, path)| path)
}

/// Ordering stamp for one render, taken before it starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RenderTicket(u64);

#[derive(Debug)]
struct Entry {
    started: u64,
    recorded: u64,
    path: PathBuf,
}

/// Latest chart file per session
#[derive(Debug)]
pub struct ArtifactStore {
    output_dir: PathBuf,
    clock: AtomicU64,
    latest: Mutex<HashMap<Uuid, Entry>>,
}

impl ArtifactStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            clock: AtomicU64::new(0),
            latest: Mutex::new(HashMap::new()),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Take a ticket before rendering; later tickets win in [`record`](Self::record)
    pub fn begin(&self) -> RenderTicket {
        RenderTicket(self.tick())
    }

    /// Fresh output path: `chart-<kind>-<timestamp>-<request id>.png`
    pub fn allocate(&self, kind: ChartKind, request_id: Uuid) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        self.output_dir
            .join(format!("chart-{}-{}-{}.png", kind, stamp, request_id))
    }

    /// Make `path` the session's latest chart unless a newer render already is.
    ///
    /// The replaced file is deleted only when it was recorded before `ticket`
    /// was taken, so its own request had already returned. Returns whether
    /// `path` became the latest.
    pub fn record(&self, session: Uuid, ticket: RenderTicket, path: PathBuf) -> bool {
        let stale = {
            let mut latest = self.lock();
            if let Some(current) = latest.get(&session) {
                if current.started > ticket.0 {
                    debug!(path = %path.display(), "newer chart already recorded");
                    return false;
                }
            }
            let entry = Entry {
                started: ticket.0,
                recorded: self.tick(),
                path: path.clone(),
            };
            latest
                .insert(session, entry)
                .filter(|old| old.recorded < ticket.0 && old.path != path)
        };

        if let Some(old) = stale {
            match std::fs::remove_file(&old.path) {
                Ok(()) => debug!(path = %old.path.display(), "replaced chart removed"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %old.path.display(), error = %e, "could not remove old chart"),
            }
        }
        true
    }

    /// The session's latest chart, if its file still exists
    pub fn latest_for(&self, session: Uuid) -> Option<PathBuf> {
        self.lock()
            .get(&session)
            .map(|entry| entry.path.clone())
            .filter(|p| p.exists())
    }

    /// Drop the session's entry; the chart file stays on disk
    pub fn forget(&self, session: Uuid) -> Option<PathBuf> {
        self.lock().remove(&session).map(|entry| entry.path)
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Entry>> {
        self.latest.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    #[test]
    fn test_latest_csv_picks_newest() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(latest_csv(dir.path()), None);

        let old = dir.path().join("old.csv");
        let new = dir.path().join("new.csv");
        fs::write(&old, "a\n1\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(&new, "a\n2\n").unwrap();

        let past = SystemTime::now() - Duration::from_secs(3600);
        fs::File::options()
            .write(true)
            .open(&old)
            .unwrap()
            .set_modified(past)
            .unwrap();

        assert_eq!(latest_csv(dir.path()), Some(new));
    }

    #[test]
    fn test_latest_csv_escapes_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("datos [2024]");
        fs::create_dir(&data).unwrap();
        fs::write(data.join("ventas.csv"), "a\n1\n").unwrap();

        assert_eq!(latest_csv(&data), Some(data.join("ventas.csv")));
    }

    #[test]
    fn test_allocated_names_are_unique() {
        let store = ArtifactStore::new("/tmp/out");
        let a = store.allocate(ChartKind::Bar, Uuid::new_v4());
        let b = store.allocate(ChartKind::Bar, Uuid::new_v4());
        assert_ne!(a, b);

        let name = a.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("chart-bar-"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn test_record_replaces_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let session = Uuid::new_v4();

        let first = store.allocate(ChartKind::Bar, Uuid::new_v4());
        fs::write(&first, b"1").unwrap();
        assert!(store.record(session, store.begin(), first.clone()));

        let second = store.allocate(ChartKind::Pie, Uuid::new_v4());
        fs::write(&second, b"2").unwrap();
        assert!(store.record(session, store.begin(), second.clone()));

        assert!(!first.exists());
        assert_eq!(store.latest_for(session), Some(second));
    }

    #[test]
    fn test_sessions_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let chart = dir.path().join("a.png");
        fs::write(&chart, b"a").unwrap();
        store.record(a, store.begin(), chart.clone());

        assert_eq!(store.latest_for(a), Some(chart.clone()));
        assert_eq!(store.latest_for(b), None);

        fs::remove_file(&chart).unwrap();
        assert_eq!(store.latest_for(a), None);
    }

    #[test]
    fn test_overlapping_renders_keep_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let session = Uuid::new_v4();
        let (older, newer) = (dir.path().join("older.png"), dir.path().join("newer.png"));
        fs::write(&older, b"1").unwrap();
        fs::write(&newer, b"2").unwrap();

        let first = store.begin();
        let second = store.begin();
        assert!(store.record(session, first, older.clone()));
        assert!(store.record(session, second, newer.clone()));

        assert!(older.exists());
        assert_eq!(store.latest_for(session), Some(newer));
    }

    #[test]
    fn test_late_older_render_does_not_evict_newer() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let session = Uuid::new_v4();
        let (older, newer) = (dir.path().join("older.png"), dir.path().join("newer.png"));
        fs::write(&older, b"1").unwrap();
        fs::write(&newer, b"2").unwrap();

        let first = store.begin();
        let second = store.begin();
        assert!(store.record(session, second, newer.clone()));
        assert!(!store.record(session, first, older.clone()));

        assert!(older.exists());
        assert!(newer.exists());
        assert_eq!(store.latest_for(session), Some(newer));
    }

    #[test]
    fn test_forget_drops_entry_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let session = Uuid::new_v4();
        let chart = dir.path().join("c.png");
        fs::write(&chart, b"c").unwrap();
        store.record(session, store.begin(), chart.clone());

        assert_eq!(store.forget(session), Some(chart.clone()));
        assert_eq!(store.latest_for(session), None);
        assert!(chart.exists());
    }
}
