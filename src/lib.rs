pub mod args;
pub mod config;
pub mod entry;
pub mod error;
pub mod formatting;
pub mod logging;
pub mod order;
pub mod shared;
pub mod store;
pub mod tui;

use crate::args::{ArgParser, split_global_flags};
use crate::config::Config;
use crate::entry::format_key;
use crate::formatting::FormatContext;
use crate::order::OrderedList;
use crate::shared::table::{Align, render_table};
use crate::store::DirStore;
use std::env;
use std::error::Error;
use std::path::PathBuf;

pub fn entry() -> Result<(), Box<dyn Error>> {
    let (flags, mut args) = split_global_flags(env::args().skip(1).collect())?;
    let mut config = Config::resolve(flags.dir)?;
    config.use_color &= !flags.plain;
    let cmd = if args.is_empty() { "browse".to_string() } else { args.remove(0) };
    if let Err(err) = logging::init_logging(&config, cmd == "browse") {
        eprintln!("{err}");
    }

    let store = DirStore::new(&config.dir);
    let ctx = FormatContext::new(config.use_color);

    match cmd.as_str() {
        "browse" => {
            ArgParser::new(args, "browse").finish()?;
            tui::run(&config, &store)?
        }
        "list" => list_entries(args, &store, &ctx)?,
        "set" => set_entry(args, &store)?,
        "clear" => clear_entry(args, &store)?,
        "move" => move_entry(args, &store)?,
        "renumber" => renumber_entries(args, &store)?,
        "path" => println!("{}", config.dir.display()),
        "help" | "-h" | "--help" => print_help(),
        other => {
            eprintln!("Unknown command: {other}");
            print_help();
        }
    }

    Ok(())
}

fn print_help() {
    println!(
        "\
Note Sort CLI
Usage:
  nsort [browse]                      Interactive reordering (Enter to move, i to type a value,
                                      d to clear, a to renumber, ,/. to page, q to quit)
  nsort list                          Show notes in sort order
  nsort set <name> <value>            Set a note's sort value
  nsort clear <name>                  Remove a note's sort value (moves it after all sorted notes)
  nsort move <name> <position|top|bottom>
                                      Move a note to a 1-based position
  nsort renumber                      Respace all sort values as 0, 10, 20, ...
  nsort path                          Show the notes directory
  nsort help                          Show this message

Flags:
  -d, --dir <path>                    Notes directory (overrides NOTE_SORT_DIR)
  --plain                             Disable colors

Environment:
  NOTE_SORT_DIR                       Notes directory (default: current directory)
  NOTE_SORT_PAGE_SIZE                 Max rows per page in browse mode (default: 100)
  NOTE_SORT_LOG                       Log level, e.g. debug (default: off)
  NOTE_SORT_LOG_DIR                   Write logs to files in this directory instead of stderr
                                      (required for logging in browse mode)
  NO_COLOR                            Disable colors
"
    );
}

/// Load the list and find the index of the note named on the command line.
fn locate(
    store: &DirStore,
    name: &str,
) -> Result<(OrderedList, usize, PathBuf), Box<dyn Error>> {
    let path = store
        .resolve(name)
        .ok_or_else(|| format!("Note {name} not found"))?;
    let list = OrderedList::load(store)?;
    let index = list
        .position_of(&path)
        .ok_or_else(|| format!("Note {name} is excluded from sorting"))?;
    Ok((list, index, path))
}

fn list_entries(
    args: Vec<String>,
    store: &DirStore,
    ctx: &FormatContext,
) -> Result<(), Box<dyn Error>> {
    ArgParser::new(args, "list").finish()?;
    let list = OrderedList::load(store)?;
    if list.is_empty() {
        println!("No notes found in {}.", store.dir().display());
        return Ok(());
    }

    let headers = vec![
        ctx.format_header("#"),
        ctx.format_header("sort"),
        ctx.format_header("name"),
    ];
    let rows: Vec<Vec<String>> = list
        .entries()
        .iter()
        .enumerate()
        .map(|(i, e)| {
            vec![
                ctx.format_position(i + 1),
                ctx.format_key(e.sort_key),
                e.display_name(),
            ]
        })
        .collect();
    println!(
        "{}",
        render_table(&headers, &[Align::Right, Align::Right, Align::Left], &rows)
    );
    Ok(())
}

fn set_entry(args: Vec<String>, store: &DirStore) -> Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "set");
    let name = parser.require("a note name")?;
    let value = parser.require("a sort value")?;
    parser.finish()?;

    let (mut list, index, path) = locate(store, &name)?;
    let landed = list.set_key(store, index, &value)?;
    let key = list.get(landed).and_then(|e| e.sort_key);
    println!(
        "Set {} to {} (position {})",
        entry::display_name(&path),
        key.map(format_key).unwrap_or_default(),
        landed + 1
    );
    Ok(())
}

fn clear_entry(args: Vec<String>, store: &DirStore) -> Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "clear");
    let name = parser.require("a note name")?;
    parser.finish()?;

    let (mut list, index, path) = locate(store, &name)?;
    let landed = list.clear(store, index)?;
    println!(
        "Cleared {} (position {})",
        entry::display_name(&path),
        landed + 1
    );
    Ok(())
}

/// `top`, `bottom` or a 1-based position, clamped to the list.
fn parse_position(text: &str, len: usize) -> Result<usize, Box<dyn Error>> {
    let last = len.saturating_sub(1);
    match text {
        "top" => Ok(0),
        "bottom" => Ok(last),
        _ => {
            let position: usize = text
                .parse()
                .map_err(|_| format!("Position must be a number, top or bottom: {text}"))?;
            if position == 0 {
                return Err("Positions start at 1".into());
            }
            Ok((position - 1).min(last))
        }
    }
}

fn move_entry(args: Vec<String>, store: &DirStore) -> Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "move");
    let name = parser.require("a note name")?;
    let position = parser.require("a position")?;
    parser.finish()?;

    let (mut list, from, path) = locate(store, &name)?;
    let to = parse_position(&position, list.len())?;
    let landed = list.move_entry(store, from, to)?;
    let key = list.get(landed).and_then(|e| e.sort_key);
    println!(
        "Moved {} to position {} (sort {})",
        entry::display_name(&path),
        landed + 1,
        key.map(format_key).unwrap_or_default()
    );
    Ok(())
}

fn renumber_entries(
    args: Vec<String>,
    store: &DirStore,
) -> Result<(), Box<dyn Error>> {
    ArgParser::new(args, "renumber").finish()?;
    let mut list = OrderedList::load(store)?;
    let count = list.renumber_all(store)?;
    println!("Renumbered {count} entries");
    Ok(())
}
