//! Rewrite path commands into absolute coordinates without shorthands.
//!
//! The result only contains `M`, `L`, `C`, `Q`, `A` and `Z` commands, all in
//! absolute form. This is the shape most downstream scripts expect.

use log::trace;

use crate::path::{CommandKind, PathCommand};

#[derive(Debug, PartialEq, Copy, Clone)]
struct Point {
    x: f64,
    y: f64,
}

impl Point {
    fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Mirror `ctrl` along this point.
    fn reflect(self, ctrl: Self) -> Self {
        Self::new(2.0 * self.x - ctrl.x, 2.0 * self.y - ctrl.y)
    }
}

/// Pen state while walking through a command sequence.
struct Pen {
    current: Point,

    /// Start of the current subpath, where a close-path returns to.
    start: Point,

    /// Second control point of the previous cubic curve, if the previous
    /// command was one.
    last_cubic: Option<Point>,

    /// Control point of the previous quadratic curve, if the previous
    /// command was one.
    last_quadratic: Option<Point>,
}

impl Pen {
    fn new() -> Self {
        Self {
            current: Point::new(0.0, 0.0),
            start: Point::new(0.0, 0.0),
            last_cubic: None,
            last_quadratic: None,
        }
    }

    /// Resolve a coordinate pair against the current point.
    fn point(&self, abs: bool, x: f64, y: f64) -> Point {
        if abs {
            Point::new(x, y)
        } else {
            Point::new(self.current.x + x, self.current.y + y)
        }
    }

    fn step(&mut self, command: &PathCommand) -> PathCommand {
        let abs = command.is_absolute();
        let p = command.params();
        let mut last_cubic = None;
        let mut last_quadratic = None;

        let (kind, params) = match command.kind() {
            CommandKind::MoveTo => {
                let to = self.point(abs, p[0], p[1]);
                self.start = to;
                self.current = to;
                (CommandKind::MoveTo, vec![to.x, to.y])
            }
            CommandKind::LineTo => {
                let to = self.point(abs, p[0], p[1]);
                self.current = to;
                (CommandKind::LineTo, vec![to.x, to.y])
            }
            CommandKind::HorizontalLineTo => {
                let x = if abs { p[0] } else { self.current.x + p[0] };
                self.current.x = x;
                (CommandKind::LineTo, vec![x, self.current.y])
            }
            CommandKind::VerticalLineTo => {
                let y = if abs { p[0] } else { self.current.y + p[0] };
                self.current.y = y;
                (CommandKind::LineTo, vec![self.current.x, y])
            }
            CommandKind::CurveTo => {
                let ctrl1 = self.point(abs, p[0], p[1]);
                let ctrl2 = self.point(abs, p[2], p[3]);
                let to = self.point(abs, p[4], p[5]);
                self.current = to;
                last_cubic = Some(ctrl2);
                (
                    CommandKind::CurveTo,
                    vec![ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y],
                )
            }
            CommandKind::SmoothCurveTo => {
                // Without a preceding cubic curve, the first control point
                // coincides with the current point.
                let ctrl1 = self
                    .last_cubic
                    .map_or(self.current, |prev| self.current.reflect(prev));
                let ctrl2 = self.point(abs, p[0], p[1]);
                let to = self.point(abs, p[2], p[3]);
                self.current = to;
                last_cubic = Some(ctrl2);
                (
                    CommandKind::CurveTo,
                    vec![ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y],
                )
            }
            CommandKind::Quadratic => {
                let ctrl = self.point(abs, p[0], p[1]);
                let to = self.point(abs, p[2], p[3]);
                self.current = to;
                last_quadratic = Some(ctrl);
                (CommandKind::Quadratic, vec![ctrl.x, ctrl.y, to.x, to.y])
            }
            CommandKind::SmoothQuadratic => {
                let ctrl = self
                    .last_quadratic
                    .map_or(self.current, |prev| self.current.reflect(prev));
                let to = self.point(abs, p[0], p[1]);
                self.current = to;
                last_quadratic = Some(ctrl);
                (CommandKind::Quadratic, vec![ctrl.x, ctrl.y, to.x, to.y])
            }
            CommandKind::EllipticalArc => {
                let to = self.point(abs, p[5], p[6]);
                self.current = to;
                (
                    CommandKind::EllipticalArc,
                    vec![p[0], p[1], p[2], p[3], p[4], to.x, to.y],
                )
            }
            CommandKind::ClosePath => {
                self.current = self.start;
                (CommandKind::ClosePath, vec![])
            }
        };

        self.last_cubic = last_cubic;
        self.last_quadratic = last_quadratic;
        PathCommand::from_parts(kind, true, params)
    }
}

/// Rewrite a command sequence into absolute `M`, `L`, `C`, `Q`, `A` and `Z`
/// commands describing the same geometry.
pub fn normalize(commands: &[PathCommand]) -> Vec<PathCommand> {
    trace!("normalize: {} commands", commands.len());
    let mut pen = Pen::new();
    commands.iter().map(|command| pen.step(command)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::tokenize_path_data;

    fn normalized(d: &str) -> Vec<PathCommand> {
        normalize(&tokenize_path_data(d).unwrap())
    }

    fn cmd(letter: char, params: &[f64]) -> PathCommand {
        PathCommand::new(letter, params.to_vec()).unwrap()
    }

    #[test]
    fn test_absolute_unchanged() {
        let commands = tokenize_path_data("M 0,0 L 10,10 C 1 2 3 4 5 6 Z").unwrap();
        assert_eq!(normalize(&commands), commands);
    }

    #[test]
    fn test_relative_lines() {
        assert_eq!(
            normalized("M 10,100 40,70 h 10 m -20,40 10,-20"),
            vec![
                cmd('M', &[10., 100.]),
                cmd('L', &[40., 70.]),
                cmd('L', &[50., 70.]),
                cmd('M', &[30., 110.]),
                cmd('L', &[40., 90.]),
            ]
        );
    }

    #[test]
    fn test_horizontal_vertical() {
        assert_eq!(
            normalized("M 113,35 H 40 v 14 V 0"),
            vec![
                cmd('M', &[113., 35.]),
                cmd('L', &[40., 35.]),
                cmd('L', &[40., 49.]),
                cmd('L', &[40., 0.]),
            ]
        );
    }

    #[test]
    fn test_close_resets_current_point() {
        assert_eq!(
            normalized("M 10,10 20,15 10,20 Z m 0,40 H 0"),
            vec![
                cmd('M', &[10., 10.]),
                cmd('L', &[20., 15.]),
                cmd('L', &[10., 20.]),
                cmd('Z', &[]),
                cmd('M', &[10., 50.]),
                cmd('L', &[0., 50.]),
            ]
        );
    }

    /// All four spellings describe the same smooth curve.
    #[test]
    fn test_smooth_curve() {
        let expected = normalized("M 10 20 C 10 20 11 17 12 15 S 2 7 10 20 z");
        assert_eq!(expected[2], cmd('C', &[13., 13., 2., 7., 10., 20.]));
        assert_eq!(normalized("M 10 20 C 10 20 11 17 12 15 s -10 -8 -2 5 z"), expected);
        assert_eq!(normalized("M 10 20 c 0 0 1 -3 2 -5 S 2 7 10 20 z"), expected);
        assert_eq!(normalized("M 10 20 c 0 0 1 -3 2 -5 s -10 -8 -2 5 z"), expected);
    }

    #[test]
    fn test_smooth_curve_without_previous_curve() {
        assert_eq!(
            normalized("M 5 5 S 10 0 20 5"),
            vec![
                cmd('M', &[5., 5.]),
                cmd('C', &[5., 5., 10., 0., 20., 5.]),
            ]
        );
    }

    #[test]
    fn test_smooth_quadratic() {
        assert_eq!(
            normalized("M 0 0 q 5 10 10 0 t 10 0 T 30 0"),
            vec![
                cmd('M', &[0., 0.]),
                cmd('Q', &[5., 10., 10., 0.]),
                cmd('Q', &[15., -10., 20., 0.]),
                cmd('Q', &[25., 10., 30., 0.]),
            ]
        );
    }

    #[test]
    fn test_arc() {
        assert_eq!(
            normalized("M 10 10 a 5 5 30 1 0 10 0"),
            vec![
                cmd('M', &[10., 10.]),
                cmd('A', &[5., 5., 30., 1., 0., 20., 10.]),
            ]
        );
    }
}
