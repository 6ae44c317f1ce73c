//! Extract the path commands of an SVG file and print them as struct
//! literals that can be pasted into an Octave session.
//!
//! For every `path` element in the SVG namespace, the `d` attribute is split
//! into its drawing commands and written out as
//!
//! ```text
//! svgpath = struct("cmd","MLZ","data",{[0,0],[10,10],[]});
//! svgpathid = "p1"; $
//! ```
//!
//! Nothing is rendered or flattened; the commands are passed through as
//! written. Use [`normalize`] to get absolute commands without shorthands.
//!
//! You can optionally get serde 1 support by enabling the `serde` feature.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

use std::str;

use log::{debug, trace};
use quick_xml::events::{BytesStart, Event};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod error;
mod normalize;
mod path;

pub use crate::error::Error;
pub use crate::normalize::normalize;
pub use crate::path::{tokenize_path_data, CommandKind, PathCommand};

const SVG_NAMESPACE: &[u8] = b"http://www.w3.org/2000/svg";

/// The commands of a single SVG path element, together with its id.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathRecord {
    id: String,
    commands: Vec<PathCommand>,
}

impl PathRecord {
    pub fn new(id: impl Into<String>, commands: Vec<PathCommand>) -> Self {
        Self {
            id: id.into(),
            commands,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The commands in draw order.
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// All command letters concatenated, e.g. `"MLLZ"`.
    pub fn command_letters(&self) -> String {
        self.commands.iter().map(PathCommand::letter).collect()
    }

    /// A copy of this record with absolute, shorthand free commands.
    pub fn normalized(&self) -> Self {
        Self {
            id: self.id.clone(),
            commands: normalize(&self.commands),
        }
    }
}

/// The raw attributes of a path element.
#[derive(Debug, PartialEq)]
struct PathElement {
    id: String,
    d: String,
}

fn is_svg_path(namespace: Option<&[u8]>, e: &BytesStart) -> bool {
    namespace == Some(SVG_NAMESPACE) && e.local_name() == b"path"
}

/// Read the `d` and `id` attributes of a path element.
fn read_path_element(e: &BytesStart) -> Result<PathElement, Error> {
    let mut d = None;
    let mut id = None;
    for attr in e.attributes() {
        let attr = attr.map_err(|e| Error::Parse(e.to_string()))?;
        let target = match attr.key {
            b"d" => &mut d,
            b"id" => &mut id,
            _ => continue,
        };
        if target.is_none() {
            let value = attr
                .unescaped_value()
                .map_err(|e| Error::Parse(e.to_string()))?;
            let value = str::from_utf8(&value)
                .map_err(|e| Error::Parse(e.to_string()))?
                .to_string();
            *target = Some(value);
        }
    }

    let d = d.ok_or(Error::MissingAttribute { attribute: "d" })?;
    let id = id.ok_or(Error::MissingAttribute { attribute: "id" })?;
    Ok(PathElement { id, d })
}

/// A well-formed document has exactly one root element.
fn check_single_root(roots: usize) -> Result<(), Error> {
    if roots > 1 {
        return Err(Error::Parse("Document has more than one root element".into()));
    }
    Ok(())
}

/// Parse an SVG string, return the attributes of all path elements in
/// document order.
fn parse_xml(svg: &str) -> Result<Vec<PathElement>, Error> {
    trace!("parse_xml");

    let mut reader = quick_xml::Reader::from_str(svg);
    reader.trim_text(true);

    let mut paths = Vec::new();
    let mut buf = Vec::new();
    let mut ns_buf = Vec::new();
    let mut depth = 0_usize;
    let mut roots = 0_usize;
    loop {
        match reader.read_namespaced_event(&mut buf, &mut ns_buf) {
            Ok((ns, Event::Start(ref e))) => {
                trace!("parse_xml: Matched start of {:?}", e.name());
                if depth == 0 {
                    roots += 1;
                    check_single_root(roots)?;
                }
                depth += 1;
                if is_svg_path(ns, e) {
                    trace!("parse_xml: Found path element");
                    paths.push(read_path_element(e)?);
                }
            }
            Ok((ns, Event::Empty(ref e))) => {
                trace!("parse_xml: Matched empty {:?}", e.name());
                if depth == 0 {
                    roots += 1;
                    check_single_root(roots)?;
                }
                if is_svg_path(ns, e) {
                    trace!("parse_xml: Found path element");
                    paths.push(read_path_element(e)?);
                }
            }
            Ok((_, Event::End(_))) => {
                depth = depth.saturating_sub(1);
            }
            Ok((_, Event::Text(ref e))) if depth == 0 => {
                if e.iter().any(|b| !b.is_ascii_whitespace()) {
                    return Err(Error::Parse("Text outside of the root element".into()));
                }
            }
            Ok((_, Event::CData(_))) if depth == 0 => {
                return Err(Error::Parse("CDATA outside of the root element".into()));
            }
            Ok((_, Event::Eof)) => {
                trace!("parse_xml: EOF");
                break;
            }
            Ok(_) => {}
            Err(e) => return Err(Error::Parse(e.to_string())),
        }

        // Namespace bindings live in ns_buf and must survive across events
        buf.clear();
    }

    if depth > 0 {
        return Err(Error::Parse(format!(
            "Unexpected end of document, {} element(s) not closed",
            depth
        )));
    }
    if roots == 0 {
        return Err(Error::Parse("Document has no root element".into()));
    }

    trace!("parse_xml: Return {} paths", paths.len());
    Ok(paths)
}

/// Parse an SVG string into one record per path element, in document order.
///
/// A malformed path in any element fails the whole extraction.
pub fn extract_paths(svg: &str) -> Result<Vec<PathRecord>, Error> {
    trace!("extract_paths");

    let elements = parse_xml(svg)?;
    debug!("extract_paths: Found {} path elements", elements.len());

    elements
        .into_iter()
        .map(|element| -> Result<PathRecord, Error> {
            trace!("extract_paths: Tokenizing path {:?}", element.id);
            let commands = tokenize_path_data(&element.d)?;
            Ok(PathRecord::new(element.id, commands))
        })
        .collect()
}

/// Format a record as two lines of Octave input.
///
/// The id is written as is. An id containing double quotes produces output
/// that Octave cannot parse.
pub fn format_record(record: &PathRecord) -> String {
    let data = record
        .commands
        .iter()
        .map(|command| {
            let params: Vec<String> = command.params().iter().map(f64::to_string).collect();
            format!("[{}]", params.join(","))
        })
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "svgpath = struct(\"cmd\",\"{}\",\"data\",{{{}}});\nsvgpathid = \"{}\"; $",
        record.command_letters(),
        data,
        record.id
    )
}
