//! The interactive chat loop.
//!
//! Line-oriented: plain input is dispatched to the model, `/`-prefixed
//! lines are commands. The loop blocks on the in-flight request, so at
//! most one send or summary is outstanding at a time.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use docchat_ai::{DocumentSource, GenerativeClient};
use tracing::warn;

use crate::conversation::Conversation;
use crate::export;

#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Say(&'a str),
    Summary,
    Export(&'a str),
    ExportJson(&'a str),
    Open(Vec<&'a str>),
    Help,
    Quit,
    Empty,
    Unknown(&'a str),
}

/// Parse one input line into a command.
pub fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    if !line.starts_with('/') {
        return Command::Say(line);
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    match name {
        "/quit" | "/exit" => Command::Quit,
        "/help" => Command::Help,
        "/summary" => Command::Summary,
        "/export" if !rest.is_empty() => Command::Export(rest),
        "/export-json" if !rest.is_empty() => Command::ExportJson(rest),
        "/open" if !rest.is_empty() => Command::Open(rest.split_whitespace().collect()),
        _ => Command::Unknown(line),
    }
}

const HELP: &str = "\
commands:
  /summary              structured overview of the loaded documents
  /export <path>        write a plain-text transcript
  /export-json <path>   write a JSON transcript
  /open <paths...>      load a new PDF batch (abandons the conversation)
  /quit                 exit
anything else is sent to the assistant.";

/// Resolve an export target: absolute paths are used as-is, relative
/// ones land in the configured export directory.
fn resolve_export_path(directory: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        directory.join(path)
    }
}

/// A progress callback that prints only the new suffix of each running
/// total, so streaming renders incrementally on the terminal.
fn print_progress() -> Box<dyn Fn(String) + Send + Sync> {
    let printed = Arc::new(Mutex::new(0usize));
    Box::new(move |total| {
        let mut printed = printed.lock().unwrap_or_else(|p| p.into_inner());
        if total.len() > *printed {
            print!("{}", &total[*printed..]);
            let _ = std::io::stdout().flush();
            *printed = total.len();
        }
    })
}

async fn handle_open(conversation: &mut Conversation, paths: &[&str]) {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        match DocumentSource::from_path(path).await {
            Ok(source) => sources.push(source),
            Err(e) => {
                println!("upload rejected: {e}");
                return;
            }
        }
    }
    match conversation.load_documents(&sources).await {
        Ok(()) => println!("loaded {} document(s); conversation reset", paths.len()),
        Err(e) => println!("upload rejected: {e}"),
    }
}

/// Run the chat loop until `/quit` or end of input. Relative export
/// paths are resolved against `export_dir`.
pub async fn run(
    conversation: &mut Conversation,
    client: &dyn GenerativeClient,
    export_dir: &Path,
) -> docchat_common::Result<()> {
    use tokio::io::{AsyncBufReadExt, BufReader};

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::Say(text) => {
                let turn = conversation.send(client, text, print_progress()).await;
                if turn.is_error {
                    // The partial stream (if any) is already on screen;
                    // the kept turn is the failure message.
                    println!("\n{}", turn.text);
                } else {
                    println!();
                }
            }
            Command::Summary => {
                println!("{}", conversation.summarize(client).await);
            }
            Command::Export(path) => {
                let path = resolve_export_path(export_dir, path);
                match export::write_text(&path, conversation.documents(), conversation.turns()) {
                    Ok(()) => println!("transcript written to {}", path.display()),
                    Err(e) => {
                        warn!("export failed: {e}");
                        println!("export failed: {e}");
                    }
                }
            }
            Command::ExportJson(path) => {
                let path = resolve_export_path(export_dir, path);
                match export::write_json(&path, conversation.documents(), conversation.turns()) {
                    Ok(()) => println!("transcript written to {}", path.display()),
                    Err(e) => {
                        warn!("export failed: {e}");
                        println!("export failed: {e}");
                    }
                }
            }
            Command::Open(paths) => handle_open(conversation, &paths).await,
            Command::Unknown(line) => println!("unknown command: {line} (try /help)"),
        }
    }

    Ok(())
}
