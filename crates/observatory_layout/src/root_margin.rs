//! Root margin parsing
//!
//! A root margin grows or shrinks the viewport rectangle before intersection
//! is computed, so elements can be reported visible slightly before (positive
//! margin) or after (negative margin) they cross the real edge.
//!
//! Syntax follows the CSS `margin` shorthand with 1 to 4 lengths:
//!
//! ```text
//! "0px"                -> all edges
//! "10px 20%"           -> vertical, horizontal
//! "10px 0px -5%"       -> top, horizontal, bottom
//! "1px 2px 3px 4px"    -> top, right, bottom, left
//! ```
//!
//! Lengths are `px` or `%`. A bare number is only accepted for `0`.
//! Percentages resolve against the root height for top/bottom and the root
//! width for left/right.

use std::fmt;
use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case},
    character::complete::{multispace0, multispace1},
    combinator::{all_consuming, opt},
    multi::separated_list1,
    number::complete::float,
    sequence::delimited,
    Finish, IResult,
};
use observatory_core::{EdgeInsets, Rect};

use crate::error::{LayoutError, Result};

type ParseResult<'a, O> = IResult<&'a str, O>;

/// One edge of a root margin
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginLength {
    Px(f32),
    Percent(f32),
}

impl MarginLength {
    /// Resolve to pixels against the root dimension of this edge's axis
    pub fn resolve(&self, basis: f32) -> f32 {
        match *self {
            MarginLength::Px(px) => px,
            MarginLength::Percent(pct) => basis * pct / 100.0,
        }
    }
}

impl fmt::Display for MarginLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginLength::Px(px) => write!(f, "{px}px"),
            MarginLength::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

/// Parsed root margin, one length per edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top: MarginLength,
    pub right: MarginLength,
    pub bottom: MarginLength,
    pub left: MarginLength,
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::ZERO
    }
}

impl RootMargin {
    pub const ZERO: RootMargin = RootMargin {
        top: MarginLength::Px(0.0),
        right: MarginLength::Px(0.0),
        bottom: MarginLength::Px(0.0),
        left: MarginLength::Px(0.0),
    };

    /// Parse a CSS-style margin shorthand
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || LayoutError::InvalidRootMargin(input.to_string());

        let (_, lengths) = parse_lengths(input).finish().map_err(|_| invalid())?;

        let mut edges = Vec::with_capacity(lengths.len());
        for (value, unit) in lengths {
            if !value.is_finite() {
                return Err(invalid());
            }
            let length = match unit {
                Some("%") => MarginLength::Percent(value),
                Some(_) => MarginLength::Px(value),
                None if value == 0.0 => MarginLength::Px(0.0),
                None => return Err(invalid()),
            };
            edges.push(length);
        }

        let (top, right, bottom, left) = match edges.as_slice() {
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            _ => return Err(invalid()),
        };

        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }

    /// Resolve against the root rectangle
    pub fn resolve(&self, root: Rect) -> EdgeInsets {
        EdgeInsets::new(
            self.top.resolve(root.height),
            self.right.resolve(root.width),
            self.bottom.resolve(root.height),
            self.left.resolve(root.width),
        )
    }

    /// Root rectangle after applying the margin
    pub fn apply(&self, root: Rect) -> Rect {
        root.expand(self.resolve(root))
    }
}

impl FromStr for RootMargin {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

/// A number with an optional unit suffix
fn parse_length(input: &str) -> ParseResult<'_, (f32, Option<&str>)> {
    let (input, value) = float(input)?;
    let (input, unit) = opt(alt((tag_no_case("px"), tag("%"))))(input)?;
    Ok((input, (value, unit)))
}

fn parse_lengths(input: &str) -> ParseResult<'_, Vec<(f32, Option<&str>)>> {
    all_consuming(delimited(
        multispace0,
        separated_list1(multispace1, parse_length),
        multispace0,
    ))(input)
}
