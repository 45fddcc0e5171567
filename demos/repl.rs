//! A small REPL exercising completion, hints, highlighting, and history.
//!
//! Run with `cargo run --example repl`. Set `TAPE_LINE_LOG=/tmp/repl.log` to trace
//! key handling.

use std::io;

use tape_line::logging;
use tape_line::{words_with_prefix, Color, HistoryError, Hints, LineReader, ReadlineError};

const COMMANDS: &[&str] = &[
    "help", "history", "hello", "hex", "clear", "color", "quit", "exit",
];
const HISTORY_FILE: &str = ".tape_line_history";

fn main() {
    if let Err(err) = logging::init_from_env() {
        eprintln!("logging disabled: {err}");
    }

    let mut reader = LineReader::stdio();
    reader.set_completer(|text: &str, pos: usize| {
        words_with_prefix(COMMANDS.iter().copied(), text, pos)
    });
    reader.set_hinter(|text: &str, pos: usize| {
        let word: String = text.chars().skip(pos).collect();
        if word.is_empty() {
            return Hints::default();
        }
        Hints::new(words_with_prefix(COMMANDS.iter().copied(), text, pos), Color::Gray)
    });
    reader.set_highlighter(|text: &str, colors: &mut [Color]| {
        for (idx, ch) in text.chars().enumerate() {
            if ch.is_ascii_digit() {
                colors[idx] = Color::BrightMagenta;
            }
        }
        if COMMANDS.iter().any(|cmd| text.starts_with(cmd)) {
            let end = text.chars().take_while(|ch| !ch.is_whitespace()).count();
            for color in colors.iter_mut().take(end) {
                *color = Color::BrightGreen;
            }
        }
    });
    match reader.load_history(HISTORY_FILE) {
        Ok(()) => {}
        Err(HistoryError::Load { source, .. }) if source.kind() == io::ErrorKind::NotFound => {}
        Err(err) => eprintln!("{err}"),
    }

    loop {
        match reader.read_line("\x1b[1;32mtape\x1b[0m> ") {
            Ok(line) => match line.trim() {
                "quit" | "exit" => break,
                "clear" => {
                    if let Err(err) = reader.clear_screen() {
                        eprintln!("{err}");
                    }
                }
                "history" => {
                    for (idx, entry) in reader.history().iter().enumerate() {
                        println!("{idx:4}  {entry}");
                    }
                }
                "" => {}
                other => println!("echo: {other}"),
            },
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{err}");
                break;
            }
        }
    }

    if let Err(err) = reader.save_history(HISTORY_FILE) {
        eprintln!("{err}");
    }
}
