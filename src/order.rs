//! The in-memory ordered list and every operation that changes a key.
//!
//! Each mutation writes through the [`EntryStore`] first and only touches
//! memory once the write succeeded. The list is re-sorted before any method
//! returns, success or failure, so callers never observe a stale order.

use crate::entry::{Entry, cmp_entries, format_key, normalize_key};
use crate::error::{ParseError, Result, SortError};
use crate::store::EntryStore;
use log::{debug, info, warn};
use std::path::Path;

/// Spacing used for renumbering and for stepping past either end.
pub const STEP: f64 = 10.0;

/// Sort entries into canonical order. Stable and total.
pub fn sort(entries: &mut [Entry]) {
    entries.sort_by(cmp_entries);
}

/// Parse user input into a key. Only finite numbers are accepted.
pub fn parse_key(input: &str) -> std::result::Result<f64, ParseError> {
    let trimmed = input.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(normalize_key(v)),
        _ => Err(ParseError { input: input.to_string() }),
    }
}

/// Key that places an entry at `target` in `entries`, which must already be
/// sorted and must not contain the entry being moved. `target` ranges over
/// `0..=entries.len()`; larger values are clamped to the tail.
///
/// A keyless lower neighbor resolves to the nearest keyed entry before it
/// (or 0), so the moved entry always lands after the keyed entries it was
/// dropped behind.
pub fn compute_insertion_key(entries: &[Entry], target: usize) -> f64 {
    let target = target.min(entries.len());
    let keyed_before =
        |idx: usize| entries[..idx].iter().rev().find_map(|e| e.sort_key);

    if target == entries.len() {
        return keyed_before(target).map_or(STEP, |k| k + STEP);
    }
    if target == 0 {
        return entries[0].sort_key.unwrap_or(0.0) - STEP;
    }

    let lower = keyed_before(target).unwrap_or(0.0);
    let upper = entries[target].sort_key.unwrap_or(lower + STEP);
    let key = (lower + upper) / 2.0;
    if key <= lower || key >= upper {
        warn!(
            "insertion key {} is not strictly between {} and {}; renumber to restore spacing",
            format_key(key),
            format_key(lower),
            format_key(upper)
        );
    }
    key
}

/// Entries kept in canonical order at rest.
#[derive(Debug, Default, Clone)]
pub struct OrderedList {
    entries: Vec<Entry>,
}

impl OrderedList {
    pub fn new(mut entries: Vec<Entry>) -> Self {
        sort(&mut entries);
        Self { entries }
    }

    pub fn load(store: &impl EntryStore) -> Result<Self> {
        Ok(Self::new(store.load()?))
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn position_of(&self, path: &Path) -> Option<usize> {
        self.entries.iter().position(|e| e.path() == path)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(SortError::OutOfRange(index))
        }
    }

    /// Re-sort and report where `path` ended up.
    fn settle(&mut self, path: &Path) -> usize {
        sort(&mut self.entries);
        self.position_of(path).unwrap_or(0)
    }

    /// Give every keyed entry a fresh key 0, 10, 20, ... in current order.
    /// Keyless entries stay keyless. Stops at the first failed write; keys
    /// already written stay. Returns how many entries were renumbered.
    pub fn renumber_all(&mut self, store: &impl EntryStore) -> Result<usize> {
        let result = self.renumber_in_order(store);
        sort(&mut self.entries);
        if let Ok(count) = &result {
            info!("renumbered {count} entries");
        }
        result
    }

    fn renumber_in_order(&mut self, store: &impl EntryStore) -> Result<usize> {
        let mut next = 0.0;
        let mut count = 0;
        for entry in self.entries.iter_mut().filter(|e| e.is_keyed()) {
            store.persist(entry.path(), next)?;
            entry.sort_key = Some(next);
            next += STEP;
            count += 1;
        }
        Ok(count)
    }

    /// Overwrite the key of the entry at `index` from user input. Returns the
    /// entry's new index.
    pub fn set_key(
        &mut self,
        store: &impl EntryStore,
        index: usize,
        input: &str,
    ) -> Result<usize> {
        self.check_index(index)?;
        let key = parse_key(input)?;
        let path = self.entries[index].path().to_path_buf();
        store.persist(&path, key)?;
        self.entries[index].sort_key = Some(key);
        debug!("set {} to {}", path.display(), format_key(key));
        Ok(self.settle(&path))
    }

    /// Make the entry at `index` keyless. Returns its new index.
    pub fn clear(&mut self, store: &impl EntryStore, index: usize) -> Result<usize> {
        self.check_index(index)?;
        let path = self.entries[index].path().to_path_buf();
        store.clear_key(&path)?;
        self.entries[index].sort_key = None;
        debug!("cleared {}", path.display());
        Ok(self.settle(&path))
    }

    /// Move the entry at `from` so it ends up at index `to`, writing the
    /// computed key. Returns the entry's index after re-sorting, which is
    /// `to` unless equal keys tie-break it elsewhere.
    pub fn move_entry(
        &mut self,
        store: &impl EntryStore,
        from: usize,
        to: usize,
    ) -> Result<usize> {
        self.check_index(from)?;
        self.check_index(to)?;

        let mut others = self.entries.clone();
        let moving = others.remove(from);
        let key = compute_insertion_key(&others, to);

        let path = moving.path().to_path_buf();
        store.persist(&path, key)?;
        self.entries[from].sort_key = Some(key);
        let landed = self.settle(&path);
        info!(
            "moved {} from {} to {} (sort {})",
            moving.display_name(),
            from,
            landed,
            format_key(key)
        );
        Ok(landed)
    }
}
