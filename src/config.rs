use std::env;
use std::io;
use std::path::PathBuf;

pub const DIR_ENV: &str = "NOTE_SORT_DIR";
pub const PAGE_SIZE_ENV: &str = "NOTE_SORT_PAGE_SIZE";
pub const LOG_ENV: &str = "NOTE_SORT_LOG";
pub const LOG_DIR_ENV: &str = "NOTE_SORT_LOG_DIR";
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Settings resolved once per invocation from flags and the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub dir: PathBuf,
    pub max_page_size: usize,
    pub use_color: bool,
    pub log_spec: String,
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// `dir_flag` (from `-d/--dir`) beats `NOTE_SORT_DIR`, which beats the
    /// current directory.
    pub fn resolve(dir_flag: Option<PathBuf>) -> io::Result<Self> {
        let dir = match dir_flag {
            Some(dir) => dir,
            None => match env::var(DIR_ENV) {
                Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
                _ => env::current_dir()?,
            },
        };

        let max_page_size = env::var(PAGE_SIZE_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Ok(Self {
            dir,
            max_page_size,
            use_color: env::var("NO_COLOR").is_err(),
            log_spec: env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string()),
            log_dir: env::var(LOG_DIR_ENV).ok().filter(|d| !d.is_empty()).map(PathBuf::from),
        })
    }

    /// Rows available for entries: the configured maximum, capped by the
    /// terminal height minus four rows for the status area.
    pub fn page_size(&self, terminal_rows: Option<u16>) -> usize {
        let rows = terminal_rows
            .map(|r| usize::from(r).saturating_sub(4))
            .unwrap_or(self.max_page_size);
        self.max_page_size.min(rows).max(1)
    }
}
