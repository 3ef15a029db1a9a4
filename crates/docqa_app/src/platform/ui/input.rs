use std::path::PathBuf;

use docqa_core::Msg;

pub const HELP: &str = "\
Type a question and press Enter to ask it.
  /upload <file> [<file> ...]   upload one or more documents (quote paths with spaces)
  /docs                         show the indexed documents
  /refresh                      reload the document list
  /delete <document id>         delete a document
  /download <source file>       save a cited source into the download folder
  /help                         show this help
  /quit                         leave";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Dispatch(Vec<Msg>),
    ShowDocuments,
    Help,
    Quit,
    Unknown(String),
}

/// Turns one line of terminal input into a command.
pub fn parse_line(line: &str) -> Command {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        // Whatever was typed becomes the input buffer, then it is sent.
        return Command::Dispatch(vec![Msg::InputChanged(line.to_string()), Msg::SendClicked]);
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };
    match name {
        "upload" => Command::Dispatch(vec![Msg::FilesSelected(
            split_paths(args).into_iter().map(PathBuf::from).collect(),
        )]),
        "docs" => Command::ShowDocuments,
        "refresh" => Command::Dispatch(vec![Msg::RefreshRequested]),
        "delete" => Command::Dispatch(vec![Msg::DeleteDocumentClicked {
            document_id: args.to_string(),
        }]),
        "download" => Command::Dispatch(vec![Msg::DownloadSourceClicked {
            source_file: args.to_string(),
        }]),
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    }
}

/// Splits on whitespace, keeping `"..."` or `'...'` groups as one path.
fn split_paths(args: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;
    for c in args.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    paths.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        paths.push(current);
    }
    paths
}
