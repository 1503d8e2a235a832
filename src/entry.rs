use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// One note file and the sort key parsed from it. The path never changes
/// after load; only `sort_key` is mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    path: PathBuf,
    pub sort_key: Option<f64>,
}

impl Entry {
    pub fn new(path: impl Into<PathBuf>, sort_key: Option<f64>) -> Self {
        Self { path: path.into(), sort_key }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name shown to the user and used to break key ties.
    pub fn display_name(&self) -> String {
        display_name(&self.path)
    }

    pub fn is_keyed(&self) -> bool {
        self.sort_key.is_some()
    }
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Fold `-0.0` into `0.0` so numerically equal keys compare equal.
pub fn normalize_key(key: f64) -> f64 {
    key + 0.0
}

/// Keyless entries always land after every keyed entry.
pub fn cmp_keys(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => normalize_key(a).total_cmp(&normalize_key(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Canonical order: key ascending, keyless last, then file name, then the
/// full path so two entries never compare equal.
pub fn cmp_entries(a: &Entry, b: &Entry) -> Ordering {
    cmp_keys(a.sort_key, b.sort_key)
        .then_with(|| a.display_name().cmp(&b.display_name()))
        .then_with(|| a.path.cmp(&b.path))
}

/// Format a key the way it is written back into a note.
pub fn format_key(key: f64) -> String {
    // -0.0 would otherwise print as "-0"
    if key == 0.0 { "0".to_string() } else { key.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyless_sorts_after_negative_and_zero() {
        assert_eq!(cmp_keys(Some(-5.0), None), Ordering::Less);
        assert_eq!(cmp_keys(None, Some(0.0)), Ordering::Greater);
        assert_eq!(cmp_keys(None, None), Ordering::Equal);
    }

    #[test]
    fn negative_zero_equals_zero() {
        assert_eq!(cmp_keys(Some(-0.0), Some(0.0)), Ordering::Equal);
        let a = Entry::new("/n/a.md", Some(0.0));
        let b = Entry::new("/n/b.md", Some(-0.0));
        assert_eq!(cmp_entries(&a, &b), Ordering::Less);
        assert!(normalize_key(-0.0).is_sign_positive());
    }

    #[test]
    fn equal_keys_tie_break_on_file_name() {
        let a = Entry::new("/notes/b/alpha.md", Some(0.0));
        let b = Entry::new("/notes/a/beta.md", Some(0.0));
        assert_eq!(cmp_entries(&a, &b), Ordering::Less);
    }

    #[test]
    fn same_name_falls_back_to_full_path() {
        let a = Entry::new("/x/note.md", None);
        let b = Entry::new("/y/note.md", None);
        assert_eq!(cmp_entries(&a, &b), Ordering::Less);
        assert_eq!(cmp_entries(&b, &a), Ordering::Greater);
    }

    #[test]
    fn format_key_is_shortest_round_trip() {
        assert_eq!(format_key(15.0), "15");
        assert_eq!(format_key(12.5), "12.5");
        assert_eq!(format_key(-5.0), "-5");
        assert_eq!(format_key(-0.0), "0");
        assert_eq!(format_key(1e21), "1000000000000000000000");
    }
}
