use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::exit;

use log::debug;

use svg2pathcmds::{extract_paths, format_record, Error, PathRecord};

pub const HELP: &str = "svg2pathcmds

USAGE:
    svg2pathcmds [OPTIONS] <INPUT>

OPTIONS:
    -a, --absolute\tRewrite commands as absolute M, L, C, Q, A and Z
    -h, --help\t\tPrint this message

Prints one Octave struct literal per SVG path element.";

/// Parse the arguments, convert the input file and write all records to `out`.
///
/// Every path is parsed before the first line is written, so a failure
/// never leaves partial output behind.
fn run<I, W>(args: I, out: &mut W) -> Result<(), Error>
where
    I: IntoIterator<Item = String>,
    W: Write,
{
    let mut input = None;
    let mut absolute = false;

    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => {
                writeln!(out, "{}", HELP)?;
                return Ok(());
            }
            "-a" | "--absolute" => absolute = true,
            other if other.len() > 1 && other.starts_with('-') => {
                return Err(Error::UnexpectedArgument(other.to_string()));
            }
            other if input.is_some() => {
                return Err(Error::UnexpectedArgument(other.to_string()));
            }
            other => input = Some(PathBuf::from(other)),
        }
    }

    let path = input.ok_or(Error::MissingArgument)?;
    debug!("Reading {}", path.display());
    let svg = fs::read_to_string(&path).map_err(|source| Error::FileNotFound {
        path: path.clone(),
        source,
    })?;

    let mut records = extract_paths(&svg)?;
    if absolute {
        records = records.iter().map(PathRecord::normalized).collect();
    }

    for record in &records {
        writeln!(out, "{}", format_record(record))?;
    }
    out.flush()?;
    Ok(())
}

fn main() {
    // Logging
    env_logger::init();

    let result = {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        run(std::env::args().skip(1), &mut out)
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        match e {
            Error::MissingArgument | Error::UnexpectedArgument(_) => {
                eprintln!("\n{}", HELP);
                exit(1);
            }
            _ => exit(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::env;

    /// An SVG file in the temp dir, removed again when dropped.
    struct SvgFile(PathBuf);

    impl SvgFile {
        fn new(name: &str, content: &str) -> Self {
            let path = env::temp_dir().join(format!(
                "svg2pathcmds-{}-{}.svg",
                std::process::id(),
                name
            ));
            fs::write(&path, content).unwrap();
            Self(path)
        }

        fn arg(&self) -> String {
            self.0.to_string_lossy().into_owned()
        }
    }

    impl Drop for SvgFile {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.0);
        }
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_run_single_path() {
        let file = SvgFile::new(
            "single",
            r#"<svg xmlns="http://www.w3.org/2000/svg"><path id="p1" d="M0,0 L10,10 Z"/></svg>"#,
        );
        let mut out: Vec<u8> = Vec::new();
        run(args(&[file.arg().as_str()]), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "svgpath = struct(\"cmd\",\"MLZ\",\"data\",{[0,0],[10,10],[]});\n\
             svgpathid = \"p1\"; $\n"
        );
    }

    #[test]
    fn test_run_document_order() {
        let file = SvgFile::new(
            "order",
            r#"<svg xmlns="http://www.w3.org/2000/svg">
                <path id="b" d="M1 1"/>
                <g><path id="a" d="M2 2"/></g>
            </svg>"#,
        );
        let mut out: Vec<u8> = Vec::new();
        run(args(&[file.arg().as_str()]), &mut out).unwrap();
        let output = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "svgpath = struct(\"cmd\",\"M\",\"data\",{[1,1]});");
        assert_eq!(lines[1], "svgpathid = \"b\"; $");
        assert_eq!(lines[2], "svgpath = struct(\"cmd\",\"M\",\"data\",{[2,2]});");
        assert_eq!(lines[3], "svgpathid = \"a\"; $");
    }

    #[test]
    fn test_run_absolute() {
        let file = SvgFile::new(
            "absolute",
            r#"<svg xmlns="http://www.w3.org/2000/svg"><path id="p" d="m 1 1 h 2 v 2 z"/></svg>"#,
        );
        let mut out: Vec<u8> = Vec::new();
        run(args(&["--absolute", file.arg().as_str()]), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "svgpath = struct(\"cmd\",\"MLLZ\",\"data\",{[1,1],[3,1],[3,3],[]});\n\
             svgpathid = \"p\"; $\n"
        );
    }

    #[test]
    fn test_run_no_paths() {
        let file = SvgFile::new("empty", r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#);
        let mut out: Vec<u8> = Vec::new();
        run(args(&[file.arg().as_str()]), &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_run_error_leaves_no_output() {
        let file = SvgFile::new(
            "bad",
            r#"<svg xmlns="http://www.w3.org/2000/svg">
                <path id="good" d="M0 0"/>
                <path id="bad" d="M0 0 X 1 1"/>
            </svg>"#,
        );
        let mut out: Vec<u8> = Vec::new();
        let result = run(args(&[file.arg().as_str()]), &mut out);
        assert!(matches!(result, Err(Error::UnsupportedCommand { .. })));
        assert!(out.is_empty());
    }

    #[test]
    fn test_svg_file_cleanup() {
        let file = SvgFile::new("cleanup", "<svg/>");
        let path = file.0.clone();
        assert!(path.exists());
        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn test_run_missing_argument() {
        let mut out: Vec<u8> = Vec::new();
        assert!(matches!(
            run(args(&[]), &mut out),
            Err(Error::MissingArgument)
        ));
    }

    #[test]
    fn test_run_unexpected_arguments() {
        let mut out: Vec<u8> = Vec::new();
        assert!(matches!(
            run(args(&["a.svg", "b.svg"]), &mut out),
            Err(Error::UnexpectedArgument(ref arg)) if arg == "b.svg"
        ));
        assert!(matches!(
            run(args(&["-x", "a.svg"]), &mut out),
            Err(Error::UnexpectedArgument(ref arg)) if arg == "-x"
        ));
    }

    #[test]
    fn test_run_file_not_found() {
        let mut out: Vec<u8> = Vec::new();
        let missing = env::temp_dir()
            .join("svg2pathcmds-does-not-exist.svg")
            .to_string_lossy()
            .into_owned();
        let result = run(args(&[missing.as_str()]), &mut out);
        assert!(matches!(result, Err(Error::FileNotFound { .. })));
    }

    #[test]
    fn test_run_help() {
        let mut out: Vec<u8> = Vec::new();
        run(args(&["--help"]), &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("svg2pathcmds"));
    }
}
