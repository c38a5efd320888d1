//! Parser for logic circuit definition files.
//!
//! A definition file declares devices, wires outputs to inputs and picks the
//! outputs to monitor, in three mandatory sections in this order.
//!
//! # Grammar Overview
//!
//! ```text
//! file        = devices connections monitors
//! devices     = "DEVICE_LIST" ':' { device } "END"
//! connections = "CONNECTION_LIST" ':' { connection } "END"
//! monitors    = "MONITOR_LIST" ':' { output ';' } "END"
//!
//! device      = type name [property] ';'
//! connection  = output "->" input ';'
//! output      = name ['.' pin]
//! input       = name '.' pin
//!
//! type        = "AND" | "NAND" | "OR" | "NOR" | "XOR" | "DTYPE"
//!             | "CLOCK" | "SWITCH" | "SIGGEN"
//! property    = number | "ON" | "OFF"
//! pin         = name | number
//! name        = letter { letter | digit | '_' }
//! number      = digit { digit }
//! ```
//!
//! Comments are `// ...` to end of line and `/* ... */`. Reserved words are
//! case-sensitive and cannot be used as names.
//!
//! # Device Types
//!
//! | Type | Property | Inputs | Outputs |
//! |------|----------|--------|---------|
//! | AND, NAND, OR, NOR | input count 1..16 | `1` .. `n` | unnamed |
//! | XOR | none | `1`, `2` | unnamed |
//! | DTYPE | none | DATA, CLK, SET, CLEAR | Q, QBAR |
//! | CLOCK | half period (cycles) | none | unnamed |
//! | SWITCH | ON/OFF or 1/0 | none | unnamed |
//! | SIGGEN | bit pattern, e.g. `0110` | none | unnamed |
//!
//! # Example
//!
//! ```text
//! DEVICE_LIST:
//! SWITCH sw1 OFF;
//! AND g1 2;
//! END
//! CONNECTION_LIST:
//! sw1 -> g1.1;
//! sw1 -> g1.2;
//! END
//! MONITOR_LIST:
//! g1;
//! END
//! ```

mod lexer;
mod parser;
mod report;

pub use lexer::{Keyword, Lexer, Token, TokenKind};
pub use parser::{ParseOutcome, Parser};
pub use report::{excerpt, Diagnostic, ErrorReport, ParseErrorKind, StopSet, SymbolClass};

use crate::circuit::Circuit;
use crate::error::{LogsimError, Result};

/// Parse a definition file, returning the circuit as far as it could be
/// built together with every error found.
pub fn parse(source: &str) -> ParseOutcome {
    Parser::new().parse(source)
}

/// Parse a definition file into a circuit ready to simulate.
pub fn load(source: &str) -> Result<Circuit> {
    let outcome = parse(source);
    if outcome.is_success() {
        Ok(outcome.circuit)
    } else {
        Err(LogsimError::ParseFailed {
            count: outcome.report.len(),
            report: outcome.report.render(source),
        })
    }
}

/// Parse a definition file from disk.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> Result<Circuit> {
    let content = std::fs::read_to_string(path).map_err(|e| LogsimError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    load(&content)
}
