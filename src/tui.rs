//! Interactive pager: browse the ordered notes, move one to a new slot, type
//! a key, clear a key or renumber everything.
//!
//! [`Browser`] holds the session state and reacts to key presses without
//! touching the terminal, so it can be driven from tests. [`run`] owns the
//! terminal: raw mode, alternate screen, drawing and the event loop.

use crate::config::Config;
use crate::formatting::FormatContext;
use crate::order::OrderedList;
use crate::store::EntryStore;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{
    Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
};
use crossterm::{execute, queue};
use log::{debug, warn};
use std::error::Error;
use std::io::{self, Write};

const BROWSE_HELP: &str = "Enter: move  i: set value  d: clear  ,/.: page  a: renumber  q: quit";
const MOVING_HELP: &str = "Moving: arrows to reposition, Enter to commit, Esc to cancel";
const INPUT_HELP: &str = "Type a number, Enter to save, Esc to cancel";

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Browse,
    /// Holding the entry that was at `from` while the cursor picks a slot.
    Moving { from: usize },
    /// Typing a new value for the selected entry.
    Input { buffer: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Browser<'a, S: EntryStore> {
    store: &'a S,
    list: OrderedList,
    selected: usize,
    page_size: usize,
    mode: Mode,
    status: Option<String>,
}

impl<'a, S: EntryStore> Browser<'a, S> {
    pub fn new(store: &'a S, list: OrderedList, page_size: usize) -> Self {
        Self {
            store,
            list,
            selected: 0,
            page_size: page_size.max(1),
            mode: Mode::Browse,
            status: None,
        }
    }

    pub fn list(&self) -> &OrderedList {
        &self.list
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn page(&self) -> usize {
        self.selected / self.page_size
    }

    pub fn total_pages(&self) -> usize {
        self.list.len().saturating_sub(1) / self.page_size + 1
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
    }

    fn last_index(&self) -> usize {
        self.list.len().saturating_sub(1)
    }

    fn select(&mut self, index: usize) {
        self.selected = index.min(self.last_index());
    }

    fn report<E: Error>(&mut self, err: E) {
        warn!("{err}");
        self.status = Some(err.to_string());
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.kind != KeyEventKind::Press {
            return Flow::Continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        if let Mode::Input { buffer } = &mut self.mode {
            match key.code {
                KeyCode::Char(c) => buffer.push(c),
                KeyCode::Backspace => {
                    buffer.pop();
                }
                KeyCode::Esc => self.mode = Mode::Browse,
                KeyCode::Enter => {
                    let input = std::mem::take(buffer);
                    self.mode = Mode::Browse;
                    self.commit_input(&input);
                }
                _ => {}
            }
            return Flow::Continue;
        }

        self.status = None;
        match key.code {
            KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Up | KeyCode::Char('k') => {
                self.select(self.selected.saturating_sub(1))
            }
            KeyCode::Down | KeyCode::Char('j') => self.select(self.selected + 1),
            KeyCode::Char(',') | KeyCode::PageUp => {
                self.select(self.selected.saturating_sub(self.page_size))
            }
            KeyCode::Char('.') | KeyCode::PageDown => {
                self.select(self.selected + self.page_size)
            }
            KeyCode::Esc => self.mode = Mode::Browse,
            KeyCode::Enter => self.toggle_moving(),
            KeyCode::Char('i') if self.mode == Mode::Browse && !self.list.is_empty() => {
                self.mode = Mode::Input { buffer: String::new() };
            }
            KeyCode::Char('d') if self.mode == Mode::Browse => self.clear_selected(),
            KeyCode::Char('a') if self.mode == Mode::Browse => self.renumber(),
            _ => {}
        }
        Flow::Continue
    }

    fn toggle_moving(&mut self) {
        if self.list.is_empty() {
            return;
        }
        match self.mode {
            Mode::Moving { from } => {
                self.mode = Mode::Browse;
                match self.list.move_entry(self.store, from, self.selected) {
                    Ok(landed) => {
                        self.selected = landed;
                        debug!("move committed at {landed}");
                    }
                    Err(err) => self.report(err),
                }
            }
            _ => self.mode = Mode::Moving { from: self.selected },
        }
    }

    fn commit_input(&mut self, input: &str) {
        match self.list.set_key(self.store, self.selected, input) {
            Ok(index) => self.selected = index,
            Err(err) => self.report(err),
        }
    }

    fn clear_selected(&mut self) {
        if self.list.is_empty() {
            return;
        }
        match self.list.clear(self.store, self.selected) {
            Ok(index) => self.select(index),
            Err(err) => self.report(err),
        }
    }

    fn renumber(&mut self) {
        let current = self.list.get(self.selected).map(|e| e.path().to_path_buf());
        match self.list.renumber_all(self.store) {
            Ok(count) => self.status = Some(format!("Renumbered {count} entries")),
            Err(err) => self.report(err),
        }
        if let Some(index) = current.and_then(|p| self.list.position_of(&p)) {
            self.selected = index;
        }
    }

    /// Everything shown on screen, one string per row, each at most `width`
    /// visible columns.
    pub fn render_lines(&self, ctx: &FormatContext, width: usize) -> Vec<String> {
        let start = self.page() * self.page_size;
        let end = (start + self.page_size).min(self.list.len());
        let held = match self.mode {
            Mode::Moving { from } => Some(from),
            _ => None,
        };

        let mut lines: Vec<String> = (start..end)
            .filter_map(|i| {
                self.list.get(i).map(|entry| {
                    ctx.entry_line(entry, i == self.selected, held == Some(i), width)
                })
            })
            .collect();
        if self.list.is_empty() {
            lines.push("No notes found.".to_string());
        }
        lines.resize(self.page_size, String::new());

        let help = match self.mode {
            Mode::Browse => BROWSE_HELP,
            Mode::Moving { .. } => MOVING_HELP,
            Mode::Input { .. } => INPUT_HELP,
        };
        lines.push(ctx.format_header(&crate::shared::table::truncate_with_ellipsis(help, width)));
        lines.push(format!("Page {}/{}", self.page() + 1, self.total_pages()));

        let last = match (&self.mode, &self.status) {
            (Mode::Input { buffer }, _) => {
                let name = self
                    .list
                    .get(self.selected)
                    .map(|e| e.display_name())
                    .unwrap_or_default();
                format!("New sort value for {name}: {buffer}")
            }
            (_, Some(status)) => ctx.format_error(status),
            _ => String::new(),
        };
        lines.push(last);
        lines
    }
}

/// Restores the terminal even if the loop bails out early or panics.
struct TerminalGuard;

impl TerminalGuard {
    fn enter(out: &mut impl Write) -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, Hide)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

fn terminal_dims() -> (usize, Option<u16>) {
    match terminal_size::terminal_size() {
        Some((terminal_size::Width(w), terminal_size::Height(h))) => (usize::from(w), Some(h)),
        None => (80, None),
    }
}

fn draw(out: &mut impl Write, lines: &[String]) -> io::Result<()> {
    queue!(out, Clear(ClearType::All))?;
    for (row, line) in lines.iter().enumerate() {
        let row = u16::try_from(row).unwrap_or(u16::MAX);
        queue!(out, MoveTo(0, row), Print(line))?;
    }
    out.flush()
}

/// Run the interactive session until the user quits.
pub fn run(config: &Config, store: &impl EntryStore) -> Result<(), Box<dyn Error>> {
    let list = OrderedList::load(store)?;
    let ctx = FormatContext::new(config.use_color);
    let (mut width, rows) = terminal_dims();
    let mut browser = Browser::new(store, list, config.page_size(rows));

    let mut stdout = io::stdout();
    let _guard = TerminalGuard::enter(&mut stdout)?;
    loop {
        draw(&mut stdout, &browser.render_lines(&ctx, width))?;
        match event::read()? {
            Event::Key(key) => {
                if browser.handle_key(key) == Flow::Quit {
                    break;
                }
            }
            Event::Resize(cols, rows) => {
                width = usize::from(cols);
                browser.set_page_size(config.page_size(Some(rows)));
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DirStore;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn notes(items: &[(&str, &str)]) -> TempDir {
        let tmp = tempdir().unwrap();
        for (name, body) in items {
            fs::write(tmp.path().join(name), body).unwrap();
        }
        tmp
    }

    fn names<S: EntryStore>(browser: &Browser<'_, S>) -> Vec<String> {
        browser.list().entries().iter().map(|e| e.display_name()).collect()
    }

    #[test]
    fn enter_twice_moves_entry_to_cursor() {
        let tmp = notes(&[
            ("a.md", "sort: 10\n"),
            ("b.md", "sort: 20\n"),
            ("c.md", "sort: 30\n"),
        ]);
        let store = DirStore::new(tmp.path());
        let mut b = Browser::new(&store, OrderedList::load(&store).unwrap(), 10);

        b.handle_key(press(KeyCode::Enter));
        assert_eq!(b.mode(), &Mode::Moving { from: 0 });
        b.handle_key(press(KeyCode::Down));
        b.handle_key(press(KeyCode::Down));
        b.handle_key(press(KeyCode::Enter));

        assert_eq!(b.mode(), &Mode::Browse);
        assert_eq!(names(&b), ["b.md", "c.md", "a.md"]);
        assert_eq!(b.selected(), 2);
        assert_eq!(fs::read_to_string(tmp.path().join("a.md")).unwrap(), "sort: 40\n");
    }

    #[test]
    fn escape_cancels_a_move() {
        let tmp = notes(&[("a.md", "sort: 1\n"), ("b.md", "sort: 2\n")]);
        let store = DirStore::new(tmp.path());
        let mut b = Browser::new(&store, OrderedList::load(&store).unwrap(), 10);
        b.handle_key(press(KeyCode::Enter));
        b.handle_key(press(KeyCode::Down));
        b.handle_key(press(KeyCode::Esc));
        assert_eq!(b.mode(), &Mode::Browse);
        assert_eq!(names(&b), ["a.md", "b.md"]);
    }

    #[test]
    fn typed_value_is_saved_and_resorted() {
        let tmp = notes(&[("a.md", "sort: 1\n"), ("b.md", "body\n")]);
        let store = DirStore::new(tmp.path());
        let mut b = Browser::new(&store, OrderedList::load(&store).unwrap(), 10);

        b.handle_key(press(KeyCode::Down));
        b.handle_key(press(KeyCode::Char('i')));
        for c in "-2.5".chars() {
            b.handle_key(press(KeyCode::Char(c)));
        }
        b.handle_key(press(KeyCode::Enter));

        assert_eq!(names(&b), ["b.md", "a.md"]);
        assert_eq!(b.selected(), 0);
        assert_eq!(
            fs::read_to_string(tmp.path().join("b.md")).unwrap(),
            "sort: -2.5\nbody\n"
        );
    }

    #[test]
    fn bad_value_shows_error_and_changes_nothing() {
        let tmp = notes(&[("a.md", "sort: 1\n")]);
        let store = DirStore::new(tmp.path());
        let mut b = Browser::new(&store, OrderedList::load(&store).unwrap(), 10);

        b.handle_key(press(KeyCode::Char('i')));
        for c in "abc".chars() {
            b.handle_key(press(KeyCode::Char(c)));
        }
        b.handle_key(press(KeyCode::Enter));

        assert!(b.status().unwrap().contains("Invalid sort value"));
        assert_eq!(b.list().get(0).unwrap().sort_key, Some(1.0));
        assert_eq!(fs::read_to_string(tmp.path().join("a.md")).unwrap(), "sort: 1\n");
    }

    #[test]
    fn clear_and_renumber_keys() {
        let tmp = notes(&[
            ("a.md", "sort: 3\n"),
            ("b.md", "sort: 7.5\n"),
            ("c.md", "sort: 9\n"),
        ]);
        let store = DirStore::new(tmp.path());
        let mut b = Browser::new(&store, OrderedList::load(&store).unwrap(), 10);

        b.handle_key(press(KeyCode::Char('d')));
        assert_eq!(names(&b), ["b.md", "c.md", "a.md"]);
        assert_eq!(b.selected(), 2);

        b.handle_key(press(KeyCode::Char('a')));
        assert_eq!(b.status(), Some("Renumbered 2 entries"));
        let keys: Vec<Option<f64>> = b.list().entries().iter().map(|e| e.sort_key).collect();
        assert_eq!(keys, [Some(0.0), Some(10.0), None]);
        assert_eq!(b.selected(), 2);
    }

    #[test]
    fn paging_moves_selection_by_a_page() {
        let files: Vec<(String, String)> = (0..7)
            .map(|i| (format!("n{i}.md"), format!("sort: {i}\n")))
            .collect();
        let refs: Vec<(&str, &str)> =
            files.iter().map(|(n, b)| (n.as_str(), b.as_str())).collect();
        let tmp = notes(&refs);
        let store = DirStore::new(tmp.path());
        let mut b = Browser::new(&store, OrderedList::load(&store).unwrap(), 3);

        assert_eq!(b.total_pages(), 3);
        b.handle_key(press(KeyCode::Char('.')));
        assert_eq!((b.selected(), b.page()), (3, 1));
        b.handle_key(press(KeyCode::Char('.')));
        b.handle_key(press(KeyCode::Char('.')));
        assert_eq!((b.selected(), b.page()), (6, 2));
        b.handle_key(press(KeyCode::Char(',')));
        assert_eq!((b.selected(), b.page()), (3, 1));
    }

    #[test]
    fn render_shows_page_of_entries_and_footer() {
        let tmp = notes(&[("a.md", "sort: 5\n"), ("b.md", "x\n")]);
        let store = DirStore::new(tmp.path());
        let b = Browser::new(&store, OrderedList::load(&store).unwrap(), 4);
        let lines = b.render_lines(&FormatContext::new(false), 80);

        assert_eq!(lines.len(), 4 + 3);
        assert_eq!(lines[0], "     5 a.md");
        assert_eq!(lines[1], "  None b.md");
        assert_eq!(lines[2], "");
        assert_eq!(lines[4], BROWSE_HELP);
        assert_eq!(lines[5], "Page 1/1");
    }

    #[test]
    fn quit_keys() {
        let store = DirStore::new(tempdir().unwrap().path());
        let mut b = Browser::new(&store, OrderedList::default(), 5);
        assert_eq!(b.handle_key(press(KeyCode::Down)), Flow::Continue);
        assert_eq!(b.handle_key(press(KeyCode::Enter)), Flow::Continue);
        assert_eq!(b.handle_key(press(KeyCode::Char('q'))), Flow::Quit);
        assert_eq!(
            b.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Flow::Quit
        );
    }
}
