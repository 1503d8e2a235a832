//! Note files as the backing store for sort keys.
//! The key lives inline as a `sort: <number>` line; everything else in the
//! file is carried through untouched, line endings included.

use crate::entry::{Entry, format_key, normalize_key};
use crate::error::StoreError;
use log::{debug, warn};
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Notes containing this text are never listed.
pub const EXCLUDE_MARKER: &str = "hltb: ∞";
pub const NOTE_EXT: &str = "md";

static SORT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^sort:\s*(-?[0-9]+(?:\.[0-9]+)?)").expect("valid sort regex")
});

/// Where entries come from and where changed keys go back to.
pub trait EntryStore {
    /// Enumerate every eligible note. Order is unspecified.
    fn load(&self) -> Result<Vec<Entry>, StoreError>;

    /// Write `key` into the note, adding the marker line when missing.
    fn persist(&self, path: &Path, key: f64) -> Result<(), StoreError>;

    /// Drop the marker line so the note becomes keyless.
    fn clear_key(&self, path: &Path) -> Result<(), StoreError>;
}

/// Split one `split_inclusive('\n')` segment into the line and its terminator.
fn split_terminator(segment: &str) -> (&str, &str) {
    if let Some(line) = segment.strip_suffix("\r\n") {
        (line, "\r\n")
    } else if let Some(line) = segment.strip_suffix('\n') {
        (line, "\n")
    } else {
        (segment, "")
    }
}

/// First `sort:` line in the text wins.
pub fn find_sort_key(text: &str) -> Option<f64> {
    text.split_inclusive('\n').find_map(|segment| {
        let (line, _) = split_terminator(segment);
        SORT_LINE
            .captures(line)
            .and_then(|caps| caps[1].parse::<f64>().ok())
            .map(normalize_key)
    })
}

pub fn is_excluded(text: &str) -> bool {
    text.contains(EXCLUDE_MARKER)
}

/// Replace every marker line with `sort: <key>`, or prepend one when the
/// text has none.
pub fn rewrite_sort_line(text: &str, key: f64) -> String {
    let marker = format!("sort: {}", format_key(key));
    let mut out = String::with_capacity(text.len() + marker.len() + 2);
    let mut written = false;

    for segment in text.split_inclusive('\n') {
        let (line, terminator) = split_terminator(segment);
        if SORT_LINE.is_match(line) {
            out.push_str(&marker);
            out.push_str(terminator);
            written = true;
        } else {
            out.push_str(segment);
        }
    }

    if !written {
        let terminator = text
            .split_inclusive('\n')
            .next()
            .map(|segment| split_terminator(segment).1)
            .filter(|t| !t.is_empty())
            .unwrap_or("\n");
        out.insert_str(0, &format!("{marker}{terminator}"));
    }
    out
}

/// Remove every marker line. `None` when there was nothing to remove.
pub fn strip_sort_lines(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut removed = false;
    for segment in text.split_inclusive('\n') {
        let (line, _) = split_terminator(segment);
        if SORT_LINE.is_match(line) {
            removed = true;
        } else {
            out.push_str(segment);
        }
    }
    removed.then_some(out)
}

/// Notes stored as `*.md` files directly inside one directory.
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve a user supplied note name (`foo` or `foo.md`) to its file.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let direct = self.dir.join(name);
        if direct.is_file() {
            return Some(direct);
        }
        let with_ext = self.dir.join(format!("{name}.{NOTE_EXT}"));
        with_ext.is_file().then_some(with_ext)
    }

    /// Symlinked notes count as notes; dangling links are skipped.
    fn list_note_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some(NOTE_EXT) {
                continue;
            }
            match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => warn!("skipping {}: {e}", path.display()),
            }
        }
        Ok(files)
    }
}

fn read_note(path: &Path) -> Result<String, StoreError> {
    fs::read_to_string(path).map_err(|e| StoreError::new(path, e))
}

/// Write through a sibling temp file so a crash leaves either the old or the
/// new content, never a truncated note. A symlinked note is written at its
/// target, and the note keeps its permission bits.
fn write_note(path: &Path, content: &str) -> Result<(), StoreError> {
    let target = fs::canonicalize(path).map_err(|e| StoreError::new(path, e))?;
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = target.with_file_name(format!(".{name}.nsort-tmp"));
    replace_contents(&target, &tmp, content).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        StoreError::new(path, e)
    })
}

fn replace_contents(target: &Path, tmp: &Path, content: &str) -> io::Result<()> {
    let permissions = fs::metadata(target)?.permissions();
    fs::write(tmp, content)?;
    fs::set_permissions(tmp, permissions)?;
    fs::rename(tmp, target)
}

impl EntryStore for DirStore {
    fn load(&self) -> Result<Vec<Entry>, StoreError> {
        let files = self
            .list_note_files()
            .map_err(|e| StoreError::new(&self.dir, e))?;

        let mut entries = Vec::with_capacity(files.len());
        let mut skipped = 0usize;
        for path in files {
            let text = read_note(&path)?;
            if is_excluded(&text) {
                skipped += 1;
                continue;
            }
            let key = find_sort_key(&text);
            entries.push(Entry::new(path, key));
        }
        debug!(
            "loaded {} notes from {} ({} excluded)",
            entries.len(),
            self.dir.display(),
            skipped
        );
        Ok(entries)
    }

    fn persist(&self, path: &Path, key: f64) -> Result<(), StoreError> {
        let text = read_note(path)?;
        write_note(path, &rewrite_sort_line(&text, key)).inspect_err(|e| {
            warn!("persist failed: {e}");
        })?;
        debug!("wrote sort {} to {}", format_key(key), path.display());
        Ok(())
    }

    fn clear_key(&self, path: &Path) -> Result<(), StoreError> {
        let text = read_note(path)?;
        match strip_sort_lines(&text) {
            Some(stripped) => {
                write_note(path, &stripped)?;
                debug!("cleared sort in {}", path.display());
            }
            None => debug!("no sort line in {}", path.display()),
        }
        Ok(())
    }
}
