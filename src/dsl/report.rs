//! Parse diagnostics and the accumulated error report.

use std::fmt;

use thiserror::Error;

use super::lexer::{Keyword, TokenKind};
use crate::error::{ConnectionError, DeviceError, MonitorError};

/// Width of the source excerpt shown under a diagnostic.
const EXCERPT_WIDTH: usize = 73;
const EXCERPT_HALF: usize = EXCERPT_WIDTH / 2;

/// Token class named in "Expected a ..." messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolClass {
    DeviceType,
    Name,
}

impl fmt::Display for SymbolClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SymbolClass::DeviceType => "DEVICE TYPE",
            SymbolClass::Name => "NAME",
        })
    }
}

/// Everything the parser can report. The `Display` text of each variant is
/// the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("End of file not reached.")]
    NoEndOfFile,

    #[error("List declaration not made. Expected '{expected}'. Advancing to next list.")]
    MissingKeyword { expected: Keyword },

    #[error("Expected a ':' after a list declaration. Advancing to next list.")]
    MissingColon,

    #[error("Expected a {expected}.")]
    UnexpectedSymbol { expected: SymbolClass },

    #[error("This does not match a known device.")]
    UnknownDevice,

    #[error(
        "Expected a name for the device. Make sure it is not one of the reserved keywords \
         and follows the correct syntax."
    )]
    BadName,

    #[error("Expected a '{symbol}'.")]
    ExpectedSymbol { symbol: &'static str },

    /// A list keyword or ':' appeared where an item or END should be.
    #[error("Expected either another item in list or the keyword END.")]
    MissingEnd,

    #[error("Not expecting an identifier.")]
    IdentifierPresent,

    #[error("No identifier present.")]
    NoIdentifier,

    #[error("Not all inputs are connected.")]
    UnconnectedInputs,

    #[error("No monitor points chosen. At least one output must be monitored.")]
    NoMonitor,

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Monitor(#[from] MonitorError),
}

/// Tokens the parser skips forward to after an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSet {
    /// End of file only.
    EndOfFile,
    /// The `END` keyword.
    End,
    /// `;` or `END`.
    Item,
    /// Any list keyword, `END` included.
    List,
}

impl StopSet {
    /// True if recovery stops at `kind`. End of file always stops.
    pub fn contains(self, kind: TokenKind) -> bool {
        match (self, kind) {
            (_, TokenKind::EndOfFile) => true,
            (StopSet::End | StopSet::Item, TokenKind::Keyword(Keyword::End)) => true,
            (StopSet::Item, TokenKind::Semicolon) => true,
            (StopSet::List, TokenKind::Keyword(_)) => true,
            _ => false,
        }
    }
}

impl ParseErrorKind {
    /// Number of distinct error kinds, for error-code allocation.
    pub const COUNT: usize = 26;

    /// Where recovery resumes after this error.
    pub fn stop_set(&self) -> StopSet {
        match self {
            ParseErrorKind::NoEndOfFile
            | ParseErrorKind::UnconnectedInputs
            | ParseErrorKind::NoMonitor => StopSet::EndOfFile,
            ParseErrorKind::MissingKeyword { .. } | ParseErrorKind::MissingColon => StopSet::End,
            ParseErrorKind::MissingEnd => StopSet::List,
            _ => StopSet::Item,
        }
    }

    /// Position of this kind in `0..COUNT`.
    pub fn ordinal(&self) -> usize {
        match self {
            ParseErrorKind::NoEndOfFile => 0,
            ParseErrorKind::MissingKeyword { .. } => 1,
            ParseErrorKind::MissingColon => 2,
            ParseErrorKind::UnexpectedSymbol { .. } => 3,
            ParseErrorKind::UnknownDevice => 4,
            ParseErrorKind::BadName => 5,
            ParseErrorKind::ExpectedSymbol { .. } => 6,
            ParseErrorKind::MissingEnd => 7,
            ParseErrorKind::IdentifierPresent => 8,
            ParseErrorKind::NoIdentifier => 9,
            ParseErrorKind::UnconnectedInputs => 10,
            ParseErrorKind::NoMonitor => 11,
            ParseErrorKind::Device(err) => {
                12 + match err {
                    DeviceError::DuplicateName => 0,
                    DeviceError::MissingConfiguration { .. } => 1,
                    DeviceError::InvalidConfiguration { .. } => 2,
                    DeviceError::UnexpectedConfiguration { .. } => 3,
                    DeviceError::UnknownDevice => 4,
                    DeviceError::NotASwitch => 5,
                }
            }
            ParseErrorKind::Connection(err) => {
                18 + match err {
                    ConnectionError::InputIsAlreadyDriven => 0,
                    ConnectionError::EndpointIsNotAnInput => 1,
                    ConnectionError::EndpointIsNotAnOutput => 2,
                    ConnectionError::UnknownDevice => 3,
                    ConnectionError::UnknownPin => 4,
                }
            }
            ParseErrorKind::Monitor(err) => {
                23 + match err {
                    MonitorError::NotAnOutput => 0,
                    MonitorError::AlreadyMonitored => 1,
                    MonitorError::UnknownDevice => 2,
                }
            }
        }
    }
}

/// One reported error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ParseErrorKind,
    /// Error code allocated from the symbol table.
    pub code: usize,
    /// Position of the token that was current when the error was raised.
    pub line: usize,
    pub column: usize,
    /// Line of the token parsing resumed at, if recovery advanced.
    pub resumed_line: Option<usize>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***Error: {}", self.kind)?;
        if let Some(line) = self.resumed_line {
            write!(f, " Parsing resumed on line {}.", line)?;
        }
        f.write_str("***")
    }
}

/// Errors accumulated over one parse, in the order they were raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorReport {
    diagnostics: Vec<Diagnostic>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Render every diagnostic with the offending source line and a caret
    /// under its column.
    pub fn render(&self, source: &str) -> String {
        let lines: Vec<&str> = source.lines().collect();
        let mut out = String::new();
        for diagnostic in &self.diagnostics {
            let text = diagnostic
                .line
                .checked_sub(1)
                .and_then(|i| lines.get(i))
                .copied()
                .unwrap_or("");
            out.push_str("---------\n");
            out.push_str(&format!("In line {}:\n", diagnostic.line));
            out.push_str(&excerpt(text, diagnostic.column));
            out.push('\n');
            out.push_str(&diagnostic.to_string());
            out.push('\n');
        }
        if !out.is_empty() {
            out.push_str("---------\n");
        }
        out
    }
}

/// The source line with a caret under `column`. Long lines are windowed
/// around the column and elided with `...`.
pub fn excerpt(line: &str, column: usize) -> String {
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();
    let column = column.max(1);

    let (shown, offset) = if len <= EXCERPT_WIDTH || column <= EXCERPT_HALF + 1 {
        (line.to_string(), column - 1)
    } else if column + EXCERPT_HALF >= len {
        let start = len - EXCERPT_WIDTH;
        let tail: String = chars[start..].iter().collect();
        (format!("...{}", tail), column - 1 - start + 3)
    } else {
        let start = column - 1 - EXCERPT_HALF;
        let window: String = chars[start..start + EXCERPT_WIDTH].iter().collect();
        (format!("...{}...", window), EXCERPT_HALF + 3)
    };

    format!("{}\n{}^", shown, " ".repeat(offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::DeviceType;

    fn diagnostic(kind: ParseErrorKind, line: usize, column: usize) -> Diagnostic {
        Diagnostic {
            code: kind.ordinal(),
            kind,
            line,
            column,
            resumed_line: None,
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ParseErrorKind::MissingKeyword {
                expected: Keyword::ConnectionList
            }
            .to_string(),
            "List declaration not made. Expected 'CONNECTION_LIST'. Advancing to next list."
        );
        assert_eq!(
            ParseErrorKind::UnexpectedSymbol {
                expected: SymbolClass::DeviceType
            }
            .to_string(),
            "Expected a DEVICE TYPE."
        );
        assert_eq!(
            ParseErrorKind::ExpectedSymbol { symbol: "->" }.to_string(),
            "Expected a '->'."
        );
        assert_eq!(
            ParseErrorKind::from(ConnectionError::InputIsAlreadyDriven).to_string(),
            "The input is already connected elsewhere."
        );
        assert_eq!(
            ParseErrorKind::from(DeviceError::InvalidConfiguration {
                kind: DeviceType::Switch
            })
            .to_string(),
            "Property not recognised for device. Make sure property is either 'OFF' or 'ON'."
        );
    }

    #[test]
    fn test_diagnostic_display() {
        let mut d = diagnostic(ParseErrorKind::NoIdentifier, 3, 7);
        assert_eq!(d.to_string(), "***Error: No identifier present.***");
        d.resumed_line = Some(4);
        assert_eq!(
            d.to_string(),
            "***Error: No identifier present. Parsing resumed on line 4.***"
        );
    }

    #[test]
    fn test_stop_sets() {
        let end = TokenKind::Keyword(Keyword::End);
        let list = TokenKind::Keyword(Keyword::MonitorList);
        assert!(StopSet::EndOfFile.contains(TokenKind::EndOfFile));
        assert!(!StopSet::EndOfFile.contains(end));
        assert!(StopSet::End.contains(end));
        assert!(!StopSet::End.contains(TokenKind::Semicolon));
        assert!(StopSet::Item.contains(TokenKind::Semicolon));
        assert!(!StopSet::Item.contains(list));
        assert!(StopSet::List.contains(list));
        assert!(!StopSet::List.contains(TokenKind::Semicolon));
    }

    #[test]
    fn test_ordinals_are_distinct() {
        let kinds = [
            ParseErrorKind::NoMonitor,
            ParseErrorKind::Device(DeviceError::NotASwitch),
            ParseErrorKind::Connection(ConnectionError::InputIsAlreadyDriven),
            ParseErrorKind::Connection(ConnectionError::UnknownPin),
            ParseErrorKind::Monitor(MonitorError::NotAnOutput),
            ParseErrorKind::Monitor(MonitorError::UnknownDevice),
        ];
        let ordinals: Vec<_> = kinds.iter().map(ParseErrorKind::ordinal).collect();
        assert_eq!(ordinals, vec![11, 17, 18, 22, 23, 25]);
        assert!(ordinals.iter().all(|&o| o < ParseErrorKind::COUNT));
    }

    #[test]
    fn test_excerpt_short_line() {
        assert_eq!(excerpt("sw1 -> g1;", 8), "sw1 -> g1;\n       ^");
    }

    #[test]
    fn test_excerpt_long_line() {
        let line: String = ('a'..='z').cycle().take(200).collect();

        let head = excerpt(&line, 10);
        assert_eq!(head.lines().next().unwrap(), line);

        let middle = excerpt(&line, 100);
        let (shown, caret) = middle.split_once('\n').unwrap();
        assert!(shown.starts_with("...") && shown.ends_with("..."));
        assert_eq!(shown.len(), EXCERPT_WIDTH + 6);
        let at = caret.len() - 1;
        assert_eq!(shown.as_bytes()[at], line.as_bytes()[99]);

        let tail = excerpt(&line, 195);
        let (shown, caret) = tail.split_once('\n').unwrap();
        assert!(shown.starts_with("...") && !shown.ends_with("..."));
        let at = caret.len() - 1;
        assert_eq!(shown.as_bytes()[at], line.as_bytes()[194]);
    }

    #[test]
    fn test_render() {
        let mut report = ErrorReport::new();
        let mut d = diagnostic(ParseErrorKind::ExpectedSymbol { symbol: ";" }, 2, 11);
        d.resumed_line = Some(3);
        report.push(d);
        let rendered = report.render("DEVICE_LIST:\nAND g1 2 g2\nEND");
        assert_eq!(
            rendered,
            "---------\nIn line 2:\nAND g1 2 g2\n          ^\n\
             ***Error: Expected a ';'. Parsing resumed on line 3.***\n---------\n"
        );
    }
}
