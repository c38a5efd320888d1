//! Recursive-descent parser for definition files.
//!
//! The parser builds directly into a [`Circuit`]. Errors never abort the
//! parse: each is recorded in the [`ErrorReport`] and the parser skips ahead
//! to a recovery token. Once a section fails to build, the remaining sections
//! are only checked for syntax.

use std::ops::Range;

use log::{debug, info, warn};

use super::lexer::{Keyword, Lexer, Token, TokenKind};
use super::report::{Diagnostic, ErrorReport, ParseErrorKind, SymbolClass};
use crate::circuit::{Circuit, DeviceType, PinRef, Property};
use crate::error::DeviceError;
use crate::names::NameId;

/// Whether list items are built into the circuit or only checked for syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Build,
    SyntaxOnly,
}

/// The three sections of a definition file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Devices,
    Connections,
    Monitors,
}

impl Section {
    fn keyword(self) -> Keyword {
        match self {
            Section::Devices => Keyword::DeviceList,
            Section::Connections => Keyword::ConnectionList,
            Section::Monitors => Keyword::MonitorList,
        }
    }

    /// Token class every item of the section starts with.
    fn item_start(self) -> SymbolClass {
        match self {
            Section::Devices => SymbolClass::DeviceType,
            Section::Connections | Section::Monitors => SymbolClass::Name,
        }
    }

    fn starts_item(self, kind: TokenKind) -> bool {
        match self.item_start() {
            SymbolClass::DeviceType => matches!(kind, TokenKind::DeviceType(_)),
            SymbolClass::Name => kind == TokenKind::Name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Input,
    Output,
}

/// Mutable progress of one parse.
struct ParseState<'a> {
    lexer: Lexer<'a>,
    current: Token,
    report: ErrorReport,
    codes: Range<usize>,
    /// Recovery ran into end of file; remaining sections are absent.
    reached_eof: bool,
    /// The current list was abandoned without its END.
    missing_end: bool,
}

/// Result of parsing a definition file.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// The circuit as far as it could be built.
    pub circuit: Circuit,
    pub report: ErrorReport,
    reached_end: bool,
}

impl ParseOutcome {
    /// True if the file parsed without errors through to end of file.
    pub fn is_success(&self) -> bool {
        self.report.is_empty() && self.reached_end
    }
}

/// Parser for definition files.
pub struct Parser {
    circuit: Circuit,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a parser building into an empty circuit.
    pub fn new() -> Self {
        Self::with_circuit(Circuit::new())
    }

    /// Create a parser building into `circuit`.
    pub fn with_circuit(circuit: Circuit) -> Self {
        Self { circuit }
    }

    /// Parse the whole definition file.
    pub fn parse(mut self, source: &str) -> ParseOutcome {
        let mut lexer = Lexer::new(source);
        let codes = self
            .circuit
            .names
            .unique_error_codes(ParseErrorKind::COUNT);
        let current = lexer.next_token(&mut self.circuit.names);
        let mut state = ParseState {
            lexer,
            current,
            report: ErrorReport::new(),
            codes,
            reached_eof: false,
            missing_end: false,
        };

        if !self.device_list(&mut state) {
            warn!("Errors encountered in device list. Checking the rest of the file for syntax errors.");
            self.connection_list(&mut state, Mode::SyntaxOnly);
            self.monitor_list(&mut state, Mode::SyntaxOnly);
        } else if !self.connection_list(&mut state, Mode::Build) {
            warn!("Errors encountered in connection list. Checking the monitor list for syntax errors.");
            self.monitor_list(&mut state, Mode::SyntaxOnly);
        } else {
            self.monitor_list(&mut state, Mode::Build);
        }

        let reached_end = state.current.kind == TokenKind::EndOfFile;
        if reached_end && state.report.is_empty() {
            info!("Parsing complete.");
        } else {
            info!(
                "Parsing complete. Unable to build network. {} error(s) found.",
                state.report.len()
            );
        }

        ParseOutcome {
            circuit: self.circuit,
            report: state.report,
            reached_end,
        }
    }

    fn advance(&mut self, state: &mut ParseState) {
        state.current = state.lexer.next_token(&mut self.circuit.names);
    }

    /// Record an error at the current token. With `recover`, skip to the
    /// error's stop set and resume after the stopping token.
    fn error(&mut self, state: &mut ParseState, kind: ParseErrorKind, recover: bool) {
        let line = state.current.line;
        let column = state.current.column;
        let code = state.codes.start + kind.ordinal();
        let mut resumed_line = None;

        if recover {
            let stop = kind.stop_set();
            while !stop.contains(state.current.kind) {
                self.advance(state);
            }
            if state.current.kind == TokenKind::EndOfFile {
                state.reached_eof = true;
            } else {
                self.advance(state);
                resumed_line = Some(state.current.line);
            }
        }

        debug!("{}:{}: {}", line, column, kind);
        state.report.push(Diagnostic {
            kind,
            code,
            line,
            column,
            resumed_line,
        });
    }

    /// Consume `kind`, or report that `symbol` was expected.
    fn expect(&mut self, state: &mut ParseState, kind: TokenKind, symbol: &'static str) -> bool {
        if state.current.kind == kind {
            self.advance(state);
            true
        } else {
            self.error(state, ParseErrorKind::ExpectedSymbol { symbol }, true);
            false
        }
    }

    fn device_list(&mut self, state: &mut ParseState) -> bool {
        if state.reached_eof {
            return false;
        }
        info!("Parsing device list...");

        if !self.list_start(state, Section::Devices) {
            return false;
        }
        if !self.build_list(state, Section::Devices, Mode::Build) {
            self.close_failed_list(state);
            return false;
        }
        self.check_end(state, true);
        true
    }

    fn connection_list(&mut self, state: &mut ParseState, mode: Mode) -> bool {
        if state.reached_eof {
            return false;
        }
        info!("Parsing connection list...");

        if !self.list_start(state, Section::Connections) {
            return false;
        }
        if !self.build_list(state, Section::Connections, mode) {
            self.close_failed_list(state);
            return false;
        }

        if mode == Mode::Build && !self.circuit.network.validate_fully_wired() {
            let pins: Vec<String> = self
                .circuit
                .network
                .unconnected_inputs()
                .into_iter()
                .map(|pin| self.circuit.signal_name(pin))
                .collect();
            info!("Unconnected inputs: {}", pins.join(", "));
            self.error(state, ParseErrorKind::UnconnectedInputs, false);
            self.check_end(state, true);
            return false;
        }

        self.check_end(state, true);
        true
    }

    fn monitor_list(&mut self, state: &mut ParseState, mode: Mode) {
        if state.reached_eof {
            return;
        }
        info!("Parsing monitor list...");

        if !self.list_start(state, Section::Monitors) {
            return;
        }
        self.build_list(state, Section::Monitors, mode);
        if mode == Mode::Build && self.circuit.monitors.is_empty() {
            self.error(state, ParseErrorKind::NoMonitor, false);
        }

        if state.missing_end {
            state.missing_end = false;
        } else {
            self.check_end(state, false);
        }
        if state.current.kind != TokenKind::EndOfFile {
            self.error(state, ParseErrorKind::NoEndOfFile, false);
        }
    }

    /// Expect `KEYWORD ':'` opening `section`.
    fn list_start(&mut self, state: &mut ParseState, section: Section) -> bool {
        let keyword = section.keyword();
        if state.current.kind != TokenKind::Keyword(keyword) {
            self.error(
                state,
                ParseErrorKind::MissingKeyword { expected: keyword },
                true,
            );
            return false;
        }
        self.advance(state);
        if state.current.kind != TokenKind::Colon {
            self.error(state, ParseErrorKind::MissingColon, true);
            return false;
        }
        self.advance(state);
        true
    }

    /// Parse items until END or end of file. False if any item failed or
    /// the list was abandoned.
    fn build_list(&mut self, state: &mut ParseState, section: Section, mode: Mode) -> bool {
        let mut success = true;
        loop {
            match state.current.kind {
                TokenKind::Keyword(Keyword::End) | TokenKind::EndOfFile => break,
                kind if section.starts_item(kind) => {
                    if !self.item(state, section, mode) {
                        success = false;
                    }
                }
                TokenKind::Keyword(_) | TokenKind::Colon => {
                    self.error(state, ParseErrorKind::MissingEnd, false);
                    state.missing_end = true;
                    return false;
                }
                _ => {
                    let expected = section.item_start();
                    self.error(state, ParseErrorKind::UnexpectedSymbol { expected }, true);
                    success = false;
                }
            }
        }
        success
    }

    fn item(&mut self, state: &mut ParseState, section: Section, mode: Mode) -> bool {
        match (section, mode) {
            (Section::Devices, _) => self.device(state),
            (Section::Connections, Mode::Build) => self.connection(state),
            (Section::Connections, Mode::SyntaxOnly) => self.connection_syntax(state),
            (Section::Monitors, Mode::Build) => self.monitor_point(state),
            (Section::Monitors, Mode::SyntaxOnly) => self.monitor_syntax(state),
        }
    }

    /// After a failed list: expect END unless the list was already abandoned.
    fn close_failed_list(&mut self, state: &mut ParseState) {
        if state.missing_end {
            state.missing_end = false;
        } else {
            self.check_end(state, true);
        }
    }

    fn check_end(&mut self, state: &mut ParseState, recover: bool) {
        if state.current.kind == TokenKind::Keyword(Keyword::End) {
            self.advance(state);
        } else {
            self.error(state, ParseErrorKind::MissingEnd, recover);
        }
    }

    /// `TYPE name [property] ';'`
    fn device(&mut self, state: &mut ParseState) -> bool {
        let TokenKind::DeviceType(ty) = state.current.kind else {
            self.error(state, ParseErrorKind::UnknownDevice, true);
            return false;
        };
        self.advance(state);

        let name = match (state.current.kind, state.current.id) {
            (TokenKind::Name, Some(id)) => id,
            _ => {
                self.error(state, ParseErrorKind::BadName, true);
                return false;
            }
        };
        if self.circuit.devices().resolve(name).is_some() {
            self.error(state, DeviceError::DuplicateName.into(), true);
            return false;
        }
        self.advance(state);

        let property = match state.current.kind {
            TokenKind::Property(on) => Some(Property::State(on)),
            TokenKind::Number => state
                .current
                .id
                .and_then(|id| self.circuit.names.resolve(id))
                .map(|text| Property::Number(text.to_string())),
            _ => None,
        };
        if property.is_some() {
            self.advance(state);
        }

        match self
            .circuit
            .network
            .devices_mut()
            .declare(name, ty, property)
        {
            Ok(id) => debug!("Declared {} {}", ty, self.circuit.device_name(id)),
            Err(err) => {
                self.error(state, err.into(), true);
                return false;
            }
        }

        self.expect(state, TokenKind::Semicolon, ";")
    }

    /// `output '->' input ';'`
    fn connection(&mut self, state: &mut ParseState) -> bool {
        let Some(output) = self.pin_ref(state, Direction::Output) else {
            return false;
        };
        if !self.expect(state, TokenKind::Arrow, "->") {
            return false;
        }
        if state.current.kind != TokenKind::Name {
            let expected = SymbolClass::Name;
            self.error(state, ParseErrorKind::UnexpectedSymbol { expected }, true);
            return false;
        }
        let Some(input) = self.pin_ref(state, Direction::Input) else {
            return false;
        };

        if let Err(err) = self.circuit.network.connect(input, output) {
            self.error(state, err.into(), true);
            return false;
        }
        self.expect(state, TokenKind::Semicolon, ";")
    }

    fn connection_syntax(&mut self, state: &mut ParseState) -> bool {
        if !self.pin_syntax(state, Direction::Output) {
            return false;
        }
        if !self.expect(state, TokenKind::Arrow, "->") {
            return false;
        }
        if state.current.kind != TokenKind::Name {
            let expected = SymbolClass::Name;
            self.error(state, ParseErrorKind::UnexpectedSymbol { expected }, true);
            return false;
        }
        if !self.pin_syntax(state, Direction::Input) {
            return false;
        }
        self.expect(state, TokenKind::Semicolon, ";")
    }

    /// `output ';'`
    fn monitor_point(&mut self, state: &mut ParseState) -> bool {
        let Some(point) = self.pin_ref(state, Direction::Output) else {
            return false;
        };
        if let Err(err) = self.circuit.monitor(point) {
            self.error(state, err.into(), true);
            return false;
        }
        self.expect(state, TokenKind::Semicolon, ";")
    }

    fn monitor_syntax(&mut self, state: &mut ParseState) -> bool {
        if !self.pin_syntax(state, Direction::Output) {
            return false;
        }
        self.expect(state, TokenKind::Semicolon, ";")
    }

    /// `name ['.' pin]`, starting at the name token. Inputs and D-type
    /// outputs need the pin; other outputs must not have one.
    fn pin_ref(&mut self, state: &mut ParseState, direction: Direction) -> Option<PinRef> {
        let device = state
            .current
            .id
            .and_then(|name| self.circuit.devices().resolve(name));
        let Some(device) = device else {
            self.error(state, ParseErrorKind::UnknownDevice, true);
            return None;
        };
        let needs_pin = direction == Direction::Input
            || self
                .circuit
                .devices()
                .get(device)
                .is_some_and(|d| d.device_type == DeviceType::DType);
        self.advance(state);

        if state.current.kind == TokenKind::Period {
            if !needs_pin {
                self.error(state, ParseErrorKind::IdentifierPresent, true);
                return None;
            }
            self.advance(state);
            let Some(pin) = pin_name(&state.current) else {
                self.error(state, ParseErrorKind::NoIdentifier, true);
                return None;
            };
            self.advance(state);
            Some(PinRef::named(device, pin))
        } else if needs_pin {
            self.error(state, ParseErrorKind::ExpectedSymbol { symbol: "." }, true);
            None
        } else {
            Some(PinRef::output(device))
        }
    }

    /// Syntax of `name ['.' pin]` without resolving anything. Inputs must
    /// carry the pin.
    fn pin_syntax(&mut self, state: &mut ParseState, direction: Direction) -> bool {
        self.advance(state);
        if state.current.kind == TokenKind::Period {
            self.advance(state);
            if pin_name(&state.current).is_none() {
                self.error(state, ParseErrorKind::NoIdentifier, true);
                return false;
            }
            self.advance(state);
            true
        } else if direction == Direction::Input {
            self.error(state, ParseErrorKind::ExpectedSymbol { symbol: "." }, true);
            false
        } else {
            true
        }
    }
}

/// A pin is a name (`Q`, `CLK`) or a gate input ordinal (`2`).
fn pin_name(token: &Token) -> Option<NameId> {
    match token.kind {
        TokenKind::Name | TokenKind::Number => token.id,
        _ => None,
    }
}
