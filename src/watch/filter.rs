// src/watch/filter.rs

//! The change filter: decides which raw notifications become accepted
//! change events.
//!
//! A raw change is accepted only if all of these hold:
//! 1. it is a content write ([`ChangeKind::Write`]),
//! 2. the path is not under an ignored directory,
//! 3. the full path ends with one of the watched suffixes,
//! 4. it arrived more than `debounce` after the last *accepted* change.
//!
//! Times are arrival times, stamped when the backend delivered the
//! notification. Duplicates that queue up behind a long build therefore
//! still collapse into the change that started it.
//!
//! The filter owns the "last accepted" timestamp and is driven from a
//! single task, so no synchronisation is needed.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::types::ChangeKind;
use crate::watch::path_utils::has_watched_suffix;
use crate::watch::patterns::IgnoreSet;

/// A single path-level notification from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChange {
    pub path: PathBuf,
    pub kind: ChangeKind,
    /// When the backend delivered it.
    pub at: Instant,
}

impl RawChange {
    /// A change arriving now.
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
            at: Instant::now(),
        }
    }

    pub fn write(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ChangeKind::Write)
    }

    /// Override the arrival time.
    pub fn at(mut self, at: Instant) -> Self {
        self.at = at;
        self
    }
}

/// A change that passed every filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub accepted_at: Instant,
}

/// Why a raw change was (or was not) accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    NotAWrite,
    Ignored,
    ExtensionMismatch,
    Debounced,
}

#[derive(Debug, Clone)]
pub struct ChangeFilter {
    extensions: Vec<String>,
    debounce: Duration,
    ignore: Option<IgnoreSet>,
    last_accepted: Option<Instant>,
}

impl ChangeFilter {
    pub fn new(extensions: Vec<String>, debounce: Duration) -> Self {
        Self {
            extensions,
            debounce,
            ignore: None,
            last_accepted: None,
        }
    }

    pub fn with_ignore(mut self, ignore: IgnoreSet) -> Self {
        self.ignore = if ignore.is_empty() { None } else { Some(ignore) };
        self
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn last_accepted(&self) -> Option<Instant> {
        self.last_accepted
    }

    /// Classify `change`, recording its arrival time as the last accepted
    /// time if (and only if) the change is accepted.
    pub fn evaluate(&mut self, change: &RawChange) -> Verdict {
        if change.kind != ChangeKind::Write {
            return Verdict::NotAWrite;
        }
        if self
            .ignore
            .as_ref()
            .is_some_and(|ignore| ignore.is_ignored(&change.path))
        {
            return Verdict::Ignored;
        }
        if !has_watched_suffix(&change.path, &self.extensions) {
            return Verdict::ExtensionMismatch;
        }
        if let Some(last) = self.last_accepted {
            if change.at.saturating_duration_since(last) <= self.debounce {
                return Verdict::Debounced;
            }
        }

        self.last_accepted = Some(change.at);
        Verdict::Accepted
    }

    /// Convenience over [`evaluate`](Self::evaluate) that yields the
    /// accepted event.
    pub fn accept(&mut self, change: RawChange) -> Option<ChangeEvent> {
        match self.evaluate(&change) {
            Verdict::Accepted => Some(ChangeEvent {
                path: change.path,
                accepted_at: change.at,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> ChangeFilter {
        ChangeFilter::new(vec![".go".into(), ".tmpl".into()], Duration::from_millis(250))
    }

    fn write_at(path: &str, at: Instant) -> RawChange {
        RawChange::write(path).at(at)
    }

    #[test]
    fn first_matching_write_is_accepted() {
        let mut f = filter();
        let now = Instant::now();
        assert_eq!(f.evaluate(&write_at("/p/main.go", now)), Verdict::Accepted);
        assert_eq!(f.last_accepted(), Some(now));
    }

    #[test]
    fn non_write_kinds_are_dropped() {
        let mut f = filter();
        for kind in [
            ChangeKind::Create,
            ChangeKind::Remove,
            ChangeKind::Rename,
            ChangeKind::Other,
        ] {
            let change = RawChange::new("/p/main.go", kind);
            assert_eq!(f.evaluate(&change), Verdict::NotAWrite);
        }
        assert_eq!(f.last_accepted(), None);
    }

    #[test]
    fn writes_inside_window_collapse() {
        let mut f = filter();
        let t0 = Instant::now();
        let ms = Duration::from_millis;
        assert!(f.accept(write_at("/p/a.go", t0)).is_some());
        assert!(f.accept(write_at("/p/a.go", t0 + ms(10))).is_none());
        assert!(f.accept(write_at("/p/b.go", t0 + ms(250))).is_none());
        assert!(f.accept(write_at("/p/a.go", t0 + ms(251))).is_some());
    }

    #[test]
    fn rejected_changes_do_not_extend_the_window() {
        let mut f = filter();
        let t0 = Instant::now();
        let ms = Duration::from_millis;
        assert!(f.accept(write_at("/p/a.go", t0)).is_some());
        // Debounced at +200ms; must not push the window out to +450ms.
        assert!(f.accept(write_at("/p/a.go", t0 + ms(200))).is_none());
        assert!(f.accept(write_at("/p/a.go", t0 + ms(300))).is_some());
    }

    #[test]
    fn window_is_measured_between_arrivals_not_evaluations() {
        let mut f = filter();
        let t0 = Instant::now();
        let first = write_at("/p/a.go", t0);
        let duplicate = write_at("/p/a.go", t0 + Duration::from_millis(2));

        assert!(f.accept(first).is_some());
        // Evaluated long after it arrived, as when it waited behind a build.
        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(f.evaluate(&duplicate), Verdict::Debounced);
    }

    #[test]
    fn accepted_event_carries_the_arrival_time() {
        let mut f = filter();
        let t0 = Instant::now();
        let event = f.accept(write_at("/p/a.go", t0)).unwrap();
        assert_eq!(event.accepted_at, t0);
    }

    #[test]
    fn ignored_paths_never_match() {
        let ignore = IgnoreSet::new("/p", &["vendor".to_string()]).unwrap();
        let mut f = filter().with_ignore(ignore);
        assert_eq!(
            f.evaluate(&RawChange::write("/p/vendor/lib.go")),
            Verdict::Ignored
        );
    }
}
