//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Command history lookup used by Up/Down recall.

use std::collections::VecDeque;

/// Query side of a command history store.
pub trait HistoryProvider {
    /// Return the entry `index` steps back among entries starting with `prefix`.
    ///
    /// Index 0 is the most recent match.
    fn find(&self, prefix: &str, index: usize) -> Option<String>;
}

impl<T: HistoryProvider + ?Sized> HistoryProvider for &T {
    fn find(&self, prefix: &str, index: usize) -> Option<String> {
        (**self).find(prefix, index)
    }
}

/// History provider that never matches.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHistory;

impl HistoryProvider for NoHistory {
    fn find(&self, _prefix: &str, _index: usize) -> Option<String> {
        None
    }
}

/// Bounded in-memory history, newest last.
#[derive(Clone, Debug)]
pub struct MemoryHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        MemoryHistory::with_capacity(100)
    }
}

impl MemoryHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        MemoryHistory {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Record a submitted line. Blank lines and immediate repeats are skipped.
    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        if line.trim().is_empty() || self.entries.back() == Some(&line) {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(line);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HistoryProvider for MemoryHistory {
    fn find(&self, prefix: &str, index: usize) -> Option<String> {
        self.entries
            .iter()
            .rev()
            .filter(|entry| entry.starts_with(prefix))
            .nth(index)
            .cloned()
    }
}
