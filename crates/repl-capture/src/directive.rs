//! Inline display directives.
//!
//! An input line may end with the reserved token followed by a directive of
//! shape `<command>` or `<command>-<axis>`, where the command is `show` or
//! `hide` and the axis starts with `in` or `out`:
//!
//! ```text
//! x = compute()          #repl:hide-output
//! #repl:hide
//! ```
//!
//! A directive on an otherwise blank line is a standalone toggle of the
//! session's persistent display defaults; on a non-blank line it overrides
//! the display of that line only.

use crate::error::{CaptureError, Result};

/// Which display axes a directive addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Input echo only.
    Input,
    /// Output recording only.
    Output,
    /// Both axes.
    Both,
}

/// A parsed display directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive {
    /// `true` for `show`, `false` for `hide`.
    pub show: bool,
    /// The axes addressed.
    pub axis: Axis,
}

impl Directive {
    /// Parse the directive text following the reserved token.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::MalformedDirective`] when the command is not
    /// `show`/`hide` or the axis does not start with `in`/`out`.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let parts: Vec<&str> = trimmed.split('-').collect();
        let (command, axis) = match parts.as_slice() {
            [command] => (*command, Axis::Both),
            [command, axis] if axis.starts_with("in") => (*command, Axis::Input),
            [command, axis] if axis.starts_with("out") => (*command, Axis::Output),
            _ => return Err(CaptureError::malformed_directive(trimmed)),
        };
        let show = match command {
            "show" => true,
            "hide" => false,
            _ => return Err(CaptureError::malformed_directive(trimmed)),
        };
        Ok(Self { show, axis })
    }

    /// The input-echo setting this directive specifies, if any.
    #[must_use]
    pub const fn input(&self) -> Option<bool> {
        match self.axis {
            Axis::Input | Axis::Both => Some(self.show),
            Axis::Output => None,
        }
    }

    /// The output-recording setting this directive specifies, if any.
    #[must_use]
    pub const fn output(&self) -> Option<bool> {
        match self.axis {
            Axis::Output | Axis::Both => Some(self.show),
            Axis::Input => None,
        }
    }
}

/// Split a line at the last occurrence of the reserved token.
///
/// Returns the text before the token and the directive text after it, or
/// `None` when the line carries no directive.
#[must_use]
pub fn split_directive<'a>(line: &'a str, token: &str) -> Option<(&'a str, &'a str)> {
    line.rsplit_once(token)
}
