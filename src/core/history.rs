//! Line history with recall navigation and file persistence.

use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use tracing::{debug, info};

use crate::error::HistoryError;

/// Default number of entries kept.
pub const DEFAULT_MAX_SIZE: usize = 1000;

/// Ordered history, oldest first.
///
/// While a line is being read, the uncommitted line sits at the end as a
/// placeholder so navigation can return to it. The placeholder never counts
/// against `max_size`, is never saved, and is dropped by [`History::finish_recall`].
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<String>,
    max_size: usize,
    index: usize,
    recall_most_recent: bool,
    /// Where a down-arrow lands after a read that accepted a recalled entry.
    resume_index: Option<usize>,
    recalling: bool,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE)
    }
}

impl History {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_size,
            index: 0,
            recall_most_recent: false,
            resume_index: None,
            recalling: false,
        }
    }

    /// Number of committed entries.
    pub fn len(&self) -> usize {
        self.entries.len() - usize::from(self.recalling)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        if idx < self.len() {
            self.entries.get(idx).map(String::as_str)
        } else {
            None
        }
    }

    /// Committed entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().take(self.len()).map(String::as_str)
    }

    /// Append a line unless it repeats the newest entry.
    ///
    /// Embedded newlines become spaces. When full, the oldest entry is evicted.
    /// Returns whether the line was stored.
    pub fn add(&mut self, line: &str) -> bool {
        if self.max_size == 0 {
            return false;
        }
        let line = line.replace(['\r', '\n'], " ");
        let committed = self.len();
        if committed > 0 && self.entries[committed - 1] == line {
            return false;
        }
        if committed >= self.max_size {
            self.evict_oldest();
        }
        let at = self.len();
        self.entries.insert(at, line);
        if self.recalling && self.index >= at {
            self.index += 1;
        }
        true
    }

    /// Shrink or grow the capacity, evicting the oldest entries to fit.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        while self.len() > max_size {
            self.evict_oldest();
        }
    }

    pub fn clear(&mut self) {
        let placeholder = if self.recalling {
            self.entries.pop_back()
        } else {
            None
        };
        self.entries.clear();
        self.entries.extend(placeholder);
        self.index = self.entries.len().saturating_sub(1);
        self.resume_index = None;
    }

    fn evict_oldest(&mut self) {
        if self.len() == 0 {
            return;
        }
        self.entries.pop_front();
        self.index = self.index.saturating_sub(1);
        self.resume_index = self.resume_index.and_then(|idx| idx.checked_sub(1));
        debug!(remaining = self.len(), "evicted oldest history entry");
    }

    /// Begin a read: push the placeholder and park the cursor on it.
    pub fn start_recall(&mut self) {
        if self.recalling {
            return;
        }
        self.entries.push_back(String::new());
        self.recalling = true;
        self.index = self.entries.len() - 1;
        self.recall_most_recent = false;
    }

    /// Copy the live line into the placeholder when the cursor is on it.
    pub fn update_current(&mut self, line: &str) {
        if self.recalling && self.index + 1 == self.entries.len() {
            if let Some(last) = self.entries.back_mut() {
                last.clear();
                last.push_str(line);
            }
        }
    }

    /// End a read. An accepted recalled entry anchors the next down-arrow.
    pub fn finish_recall(&mut self, accepted: bool) {
        if !self.recalling {
            return;
        }
        self.resume_index = if accepted && self.recall_most_recent {
            Some(self.index + 1)
        } else {
            None
        };
        self.entries.pop_back();
        self.recalling = false;
        self.recall_most_recent = false;
        self.index = self.entries.len();
    }

    /// The entry under the navigation cursor, placeholder included.
    pub fn current(&self) -> Option<&str> {
        self.entries.get(self.index).map(String::as_str)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Step one entry up (older) or down (newer).
    ///
    /// The first down-arrow after accepting a recalled entry resumes one past that
    /// entry instead of stepping from the newest line. Returns `false` at either end.
    pub fn move_by(&mut self, up: bool) -> bool {
        if self.entries.len() < 2 {
            return false;
        }
        let resume = self.resume_index.take();
        let target = match (resume, up) {
            (Some(resume), false) => Some(resume),
            (_, true) => self.index.checked_sub(1),
            (_, false) => Some(self.index + 1),
        };
        let last = self.entries.len() - 1;
        match target {
            None => {
                self.index = 0;
                false
            }
            Some(target) if target > last => {
                self.index = last;
                false
            }
            Some(target) => {
                self.index = target;
                self.recall_most_recent = true;
                true
            }
        }
    }

    /// Jump to the oldest entry or back to the newest (the live line).
    pub fn jump(&mut self, to_start: bool) -> bool {
        if self.entries.len() < 2 {
            return false;
        }
        self.resume_index = None;
        self.index = if to_start { 0 } else { self.entries.len() - 1 };
        self.recall_most_recent = true;
        true
    }

    /// Cycle from the cursor to the next entry sharing the first `prefix_len`
    /// chars of `text`, skipping entries equal to `text` itself.
    ///
    /// Outside a read the cursor sits past the newest entry, so every entry is a
    /// candidate: backward starts at the newest, forward at the oldest.
    pub fn common_prefix_search(&mut self, text: &str, prefix_len: usize, backward: bool) -> bool {
        let count = self.entries.len();
        if count == 0 {
            return false;
        }
        let (origin, steps) = if self.index < count {
            (self.index, count - 1)
        } else if backward {
            (0, count)
        } else {
            (count - 1, count)
        };
        let prefix: String = text.chars().take(prefix_len).collect();
        for step in 1..=steps {
            let idx = if backward {
                (origin + 2 * count - step) % count
            } else {
                (origin + step) % count
            };
            let entry = &self.entries[idx];
            if entry != text && entry.starts_with(&prefix) {
                self.index = idx;
                self.resume_index = None;
                self.recall_most_recent = true;
                return true;
            }
        }
        false
    }

    /// Index of the nearest entry containing `needle`, scanning from `from`.
    ///
    /// `from` itself is included. Used by incremental search, which keeps its own
    /// cursor and only commits to `index` on exit.
    pub fn find_containing(&self, needle: &str, from: usize, backward: bool) -> Option<usize> {
        let count = self.entries.len();
        if count == 0 {
            return None;
        }
        let mut idx = from.min(count - 1);
        loop {
            if self.entries[idx].contains(needle) {
                return Some(idx);
            }
            if backward {
                idx = idx.checked_sub(1)?;
            } else {
                idx += 1;
                if idx >= count {
                    return None;
                }
            }
        }
    }

    /// Raw entry access including the placeholder.
    pub fn entry(&self, idx: usize) -> Option<&str> {
        self.entries.get(idx).map(String::as_str)
    }

    /// Number of entries including the placeholder.
    pub fn slot_count(&self) -> usize {
        self.entries.len()
    }

    /// Move the navigation cursor to `idx` as a recall.
    pub fn select(&mut self, idx: usize) {
        if idx < self.entries.len() {
            self.index = idx;
            self.resume_index = None;
            self.recall_most_recent = true;
        }
    }

    /// Write one entry per line to `path`, owner read/write only.
    ///
    /// The data goes to a sibling temp file that is renamed over `path`, so a
    /// failed save leaves the previous file untouched.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), HistoryError> {
        let path = path.as_ref();
        let to_error = |source| HistoryError::Save {
            path: path.to_path_buf(),
            source,
        };
        let temp = temp_path(path);
        let result = self.write_entries(&temp).and_then(|_| fs::rename(&temp, path));
        if let Err(source) = result {
            let _ = fs::remove_file(&temp);
            return Err(to_error(source));
        }
        info!(path = %path.display(), entries = self.len(), "history saved");
        Ok(())
    }

    fn write_entries(&self, temp: &Path) -> io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(temp)?;
        let mut body = String::new();
        for entry in self.iter().filter(|entry| !entry.is_empty()) {
            body.push_str(entry);
            body.push('\n');
        }
        file.write_all(body.as_bytes())?;
        file.sync_all()
    }

    /// Append the entries of a newline-delimited file.
    ///
    /// CR before LF is stripped and blank lines are skipped. Each line goes through
    /// [`History::add`], so capacity and duplicate rules apply.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), HistoryError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| HistoryError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes);
        let mut loaded = 0usize;
        for line in text.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                continue;
            }
            if self.add(line) {
                loaded += 1;
            }
        }
        info!(path = %path.display(), loaded, "history loaded");
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "history".to_string());
    path.with_file_name(format!(".{name}.{}.tmp", process::id()))
}
