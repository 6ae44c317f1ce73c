use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Missing argument: path to an SVG file")]
    MissingArgument,
    #[error("Unexpected argument: {0}")]
    UnexpectedArgument(String),
    #[error("Could not read {}: {source}", .path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error when parsing XML: {0}")]
    Parse(String),
    #[error("Path element without \"{attribute}\" attribute")]
    MissingAttribute { attribute: &'static str },
    /// `position` is the byte offset in the path data, if the command came
    /// from parsed data.
    #[error(
        "Unsupported path command '{command}'{}",
        .position.map(|p| format!(" at position {}", p)).unwrap_or_default()
    )]
    UnsupportedCommand {
        command: char,
        position: Option<usize>,
    },
    #[error("Malformed path: command '{command}' takes {arity} parameters per group, got {count}")]
    MalformedPath {
        command: char,
        count: usize,
        arity: usize,
    },
    #[error("Invalid path data: unexpected '{found}' at position {position}")]
    PathSyntax { position: usize, found: char },
    #[error("Could not write output: {0}")]
    Output(#[from] io::Error),
}
