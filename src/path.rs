//! Tokenizer for the SVG path data mini language (the `d` attribute).
//!
//! The tokenizer keeps every command exactly as written: relative commands
//! stay relative and shorthand commands (`H`, `S`, `T`...) are not expanded.
//! Use [`normalize`](crate::normalize) to get a rewritten sequence.

use log::trace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The kind of a path command, independent of absolute / relative form.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CommandKind {
    MoveTo,
    LineTo,
    HorizontalLineTo,
    VerticalLineTo,
    CurveTo,
    SmoothCurveTo,
    Quadratic,
    SmoothQuadratic,
    EllipticalArc,
    ClosePath,
}

impl CommandKind {
    /// Look up the command kind for a path command letter (either case).
    pub fn from_letter(letter: char) -> Option<Self> {
        let kind = match letter.to_ascii_uppercase() {
            'M' => Self::MoveTo,
            'L' => Self::LineTo,
            'H' => Self::HorizontalLineTo,
            'V' => Self::VerticalLineTo,
            'C' => Self::CurveTo,
            'S' => Self::SmoothCurveTo,
            'Q' => Self::Quadratic,
            'T' => Self::SmoothQuadratic,
            'A' => Self::EllipticalArc,
            'Z' => Self::ClosePath,
            _ => return None,
        };
        Some(kind)
    }

    /// Number of parameters a single command of this kind takes.
    pub fn arity(self) -> usize {
        match self {
            Self::ClosePath => 0,
            Self::HorizontalLineTo | Self::VerticalLineTo => 1,
            Self::MoveTo | Self::LineTo | Self::SmoothQuadratic => 2,
            Self::SmoothCurveTo | Self::Quadratic => 4,
            Self::CurveTo => 6,
            Self::EllipticalArc => 7,
        }
    }

    /// The command letter, uppercase for absolute and lowercase for relative.
    pub fn letter(self, abs: bool) -> char {
        let letter = match self {
            Self::MoveTo => 'M',
            Self::LineTo => 'L',
            Self::HorizontalLineTo => 'H',
            Self::VerticalLineTo => 'V',
            Self::CurveTo => 'C',
            Self::SmoothCurveTo => 'S',
            Self::Quadratic => 'Q',
            Self::SmoothQuadratic => 'T',
            Self::EllipticalArc => 'A',
            Self::ClosePath => 'Z',
        };
        if abs {
            letter
        } else {
            letter.to_ascii_lowercase()
        }
    }
}

/// A single path command with its parameters.
///
/// The number of parameters always matches the arity of the command kind.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawPathCommand"))]
pub struct PathCommand {
    kind: CommandKind,
    abs: bool,
    params: Vec<f64>,
}

/// Unchecked form of a [`PathCommand`], as it appears in serialized data.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawPathCommand {
    kind: CommandKind,
    abs: bool,
    params: Vec<f64>,
}

#[cfg(feature = "serde")]
impl std::convert::TryFrom<RawPathCommand> for PathCommand {
    type Error = Error;

    fn try_from(raw: RawPathCommand) -> Result<Self, Self::Error> {
        Self::new(raw.kind.letter(raw.abs), raw.params)
    }
}

impl PathCommand {
    /// Create a command from its letter and parameters.
    pub fn new(letter: char, params: Vec<f64>) -> Result<Self, Error> {
        let kind = CommandKind::from_letter(letter).ok_or(Error::UnsupportedCommand {
            command: letter,
            position: None,
        })?;
        if params.len() != kind.arity() {
            return Err(Error::MalformedPath {
                command: letter,
                count: params.len(),
                arity: kind.arity(),
            });
        }
        Ok(Self::from_parts(kind, letter.is_ascii_uppercase(), params))
    }

    /// Create a command without validating the parameter count.
    pub(crate) fn from_parts(kind: CommandKind, abs: bool, params: Vec<f64>) -> Self {
        debug_assert_eq!(params.len(), kind.arity());
        Self { kind, abs, params }
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn is_absolute(&self) -> bool {
        self.abs
    }

    pub fn letter(&self) -> char {
        self.kind.letter(self.abs)
    }

    pub fn params(&self) -> &[f64] {
        &self.params
    }
}

/// Byte cursor over path data.
///
/// Only ASCII bytes are ever consumed, so `pos` always sits on a char
/// boundary of the underlying string.
struct Scanner<'a> {
    data: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(data: &'a str) -> Self {
        Self { data, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.data.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.data.as_bytes().get(self.pos + offset).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.data[self.pos..].chars().next()
    }

    fn syntax_error(&self) -> Error {
        Error::PathSyntax {
            position: self.pos,
            found: self.peek_char().unwrap_or(' '),
        }
    }

    fn skip_separators(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() || b == b',' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn skip_digits(&mut self) -> usize {
        let start = self.pos;
        while self.peek().map_or(false, |b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// Whether the next byte can start a number.
    fn at_number(&self) -> bool {
        matches!(self.peek(), Some(b'0'..=b'9' | b'.' | b'+' | b'-'))
    }

    /// Parse a number, stopping at the first byte that cannot continue it.
    ///
    /// This accepts packed sequences such as `1-2` or `0.5.5` as two numbers.
    fn parse_number(&mut self) -> Result<f64, Error> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let mut digits = self.skip_digits();
        if self.peek() == Some(b'.') {
            self.pos += 1;
            digits += self.skip_digits();
        }
        if digits == 0 {
            self.pos = start;
            return Err(self.syntax_error());
        }

        // Only treat `e` as an exponent when digits follow, so that `1em`
        // style garbage is reported at the letter.
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let exp_digit = match self.peek_at(1) {
                Some(b'+' | b'-') => self.peek_at(2),
                other => other,
            };
            if exp_digit.map_or(false, |b| b.is_ascii_digit()) {
                self.pos += 1;
                if matches!(self.peek(), Some(b'+' | b'-')) {
                    self.pos += 1;
                }
                self.skip_digits();
            }
        }

        self.data[start..self.pos]
            .parse::<f64>()
            .map_err(|_| Error::PathSyntax {
                position: start,
                found: self.data[start..].chars().next().unwrap_or(' '),
            })
    }

    /// Parse an arc flag, which is a single `0` or `1` and may be packed
    /// together with the following parameter.
    fn parse_flag(&mut self) -> Result<f64, Error> {
        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                Ok(0.0)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(1.0)
            }
            _ => Err(self.syntax_error()),
        }
    }

    /// Read all numbers following a command letter, up to the next letter
    /// or the end of the data.
    fn parse_parameters(&mut self, kind: CommandKind) -> Result<Vec<f64>, Error> {
        let arity = kind.arity();
        let mut params = Vec::with_capacity(arity);
        loop {
            self.skip_separators();
            if !self.at_number() {
                break;
            }
            let is_flag = kind == CommandKind::EllipticalArc && matches!(params.len() % arity, 3 | 4);
            let value = if is_flag {
                self.parse_flag()?
            } else {
                self.parse_number()?
            };
            params.push(value);
        }
        Ok(params)
    }
}

/// Split the parameters following one command letter into commands,
/// applying the implicit repeat rule.
fn push_commands(
    commands: &mut Vec<PathCommand>,
    kind: CommandKind,
    abs: bool,
    params: Vec<f64>,
) -> Result<(), Error> {
    let arity = kind.arity();
    let malformed = || Error::MalformedPath {
        command: kind.letter(abs),
        count: params.len(),
        arity,
    };

    if arity == 0 {
        if !params.is_empty() {
            return Err(malformed());
        }
        commands.push(PathCommand::from_parts(kind, abs, params));
        return Ok(());
    }
    if params.is_empty() || params.len() % arity != 0 {
        return Err(malformed());
    }

    for (idx, group) in params.chunks(arity).enumerate() {
        // Coordinate pairs after a move are implicit line-to commands
        let kind = if idx > 0 && kind == CommandKind::MoveTo {
            CommandKind::LineTo
        } else {
            kind
        };
        commands.push(PathCommand::from_parts(kind, abs, group.to_vec()));
    }
    Ok(())
}

/// Tokenize a path expression into its drawing commands, in source order.
pub fn tokenize_path_data(d: &str) -> Result<Vec<PathCommand>, Error> {
    trace!("tokenize_path_data");
    let mut scanner = Scanner::new(d);
    let mut commands = Vec::new();

    loop {
        scanner.skip_separators();
        let position = scanner.pos;
        let letter = match scanner.peek_char() {
            Some(c) => c,
            None => break,
        };
        if !letter.is_ascii_alphabetic() {
            return Err(scanner.syntax_error());
        }
        let kind = CommandKind::from_letter(letter).ok_or(Error::UnsupportedCommand {
            command: letter,
            position: Some(position),
        })?;
        scanner.pos += 1;

        let params = scanner.parse_parameters(kind)?;
        trace!(
            "tokenize_path_data: '{}' with {} parameters",
            letter,
            params.len()
        );
        push_commands(&mut commands, kind, letter.is_ascii_uppercase(), params)?;
    }

    trace!("tokenize_path_data: Return {} commands", commands.len());
    Ok(commands)
}
