//! Undo/redo over full-buffer snapshots.
//!
//! The log is linear: recording at a non-tip position discards the redo
//! tail. The oldest snapshot is dropped once `max_depth` is exceeded, so
//! the log never holds more than `max_depth` entries.

/// Snapshot log with a cursor. Invariant: `index < snapshots.len()`.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    snapshots: Vec<String>,
    index: usize,
    max_depth: usize,
}

impl HistoryLog {
    pub fn new(initial: impl Into<String>, max_depth: usize) -> Self {
        let max_depth = max_depth.max(1);
        let mut snapshots = Vec::with_capacity(max_depth.min(64));
        snapshots.push(initial.into());
        Self {
            snapshots,
            index: 0,
            max_depth,
        }
    }

    /// Record `text` as the newest state.
    ///
    /// Returns `false` when `text` equals the current snapshot; nothing is
    /// recorded and the redo tail is kept.
    pub fn record(&mut self, text: &str) -> bool {
        if self.current() == text {
            return false;
        }
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(text.to_string());
        if self.snapshots.len() > self.max_depth {
            self.snapshots.remove(0);
        }
        self.index = self.snapshots.len() - 1;
        true
    }

    /// Step back one snapshot and return it.
    pub fn undo(&mut self) -> Option<&str> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }

    /// Step forward one snapshot and return it.
    pub fn redo(&mut self) -> Option<&str> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    pub fn current(&self) -> &str {
        &self.snapshots[self.index]
    }

    /// Forget everything and start over from `text`.
    pub fn reset(&mut self, text: impl Into<String>) {
        self.snapshots.clear();
        self.snapshots.push(text.into());
        self.index = 0;
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// A log always holds the current snapshot.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_then_redo_walks_the_log() {
        let mut log = HistoryLog::new("a", 10);
        log.record("ab");
        log.record("abc");
        assert_eq!(log.undo(), Some("ab"));
        assert_eq!(log.undo(), Some("a"));
        assert_eq!(log.undo(), None);
        assert_eq!(log.redo(), Some("ab"));
        assert_eq!(log.current(), "ab");
    }

    #[test]
    fn recording_mid_log_discards_redo_tail() {
        let mut log = HistoryLog::new("a", 10);
        log.record("b");
        log.record("c");
        log.undo();
        log.record("d");
        assert!(!log.can_redo());
        assert_eq!(log.len(), 3);
        assert_eq!(log.undo(), Some("b"));
    }

    #[test]
    fn identical_snapshot_is_skipped() {
        let mut log = HistoryLog::new("a", 10);
        assert!(!log.record("a"));
        assert!(!log.can_undo());
    }

    #[test]
    fn depth_drops_oldest() {
        let mut log = HistoryLog::new("0", 3);
        for s in ["1", "2", "3", "4"] {
            log.record(s);
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.current(), "4");
        log.undo();
        log.undo();
        assert_eq!(log.current(), "2");
        assert!(!log.can_undo());
    }

    #[test]
    fn zero_depth_keeps_one_snapshot() {
        let mut log = HistoryLog::new("a", 0);
        log.record("b");
        assert_eq!(log.len(), 1);
        assert_eq!(log.current(), "b");
        assert!(!log.can_undo());
    }
}
