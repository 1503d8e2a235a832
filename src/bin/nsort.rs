//! Short alias binary (`nsort`) that forwards to the `note_sort` library.

fn main() {
    if let Err(err) = note_sort::entry() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
