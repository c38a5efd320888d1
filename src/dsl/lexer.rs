//! Lexer (tokenizer) for the circuit definition language.

use std::fmt;

use crate::circuit::DeviceType;
use crate::names::{NameId, Names};

/// A token produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// Interned text of a word or number literal
    pub id: Option<NameId>,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

/// List keywords of the definition language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    DeviceList,
    ConnectionList,
    MonitorList,
    End,
}

impl Keyword {
    pub const ALL: [Keyword; 4] = [
        Keyword::DeviceList,
        Keyword::ConnectionList,
        Keyword::MonitorList,
        Keyword::End,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::DeviceList => "DEVICE_LIST",
            Keyword::ConnectionList => "CONNECTION_LIST",
            Keyword::MonitorList => "MONITOR_LIST",
            Keyword::End => "END",
        }
    }

    fn from_word(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kw| kw.as_str() == word)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token types in the definition language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// DEVICE_LIST, CONNECTION_LIST, MONITOR_LIST or END
    Keyword(Keyword),
    /// A device type keyword such as AND or DTYPE
    DeviceType(DeviceType),
    /// A device or pin name
    Name,
    /// `ON` (true) or `OFF` (false)
    Property(bool),
    /// A run of decimal digits
    Number,
    /// Colon ':'
    Colon,
    /// Semicolon ';'
    Semicolon,
    /// Arrow '->'
    Arrow,
    /// Period '.'
    Period,
    /// End of file
    EndOfFile,
    /// A character sequence that is not part of the language
    Invalid,
}

/// Lexer for tokenizing definition files.
///
/// Names and number literals are interned into the [`Names`] table passed
/// to [`Lexer::next_token`], so the token carries only the id.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Get the next token. Once the input is exhausted every call returns
    /// an end-of-file token at the final position.
    pub fn next_token(&mut self, names: &mut Names) -> Token {
        self.skip_whitespace_and_comments();

        let line = self.line;
        let column = self.column;
        let token = |kind, id| Token {
            kind,
            id,
            line,
            column,
        };

        let Some(ch) = self.chars.peek().copied() else {
            return token(TokenKind::EndOfFile, None);
        };

        match ch {
            ':' => {
                self.advance();
                token(TokenKind::Colon, None)
            }
            ';' => {
                self.advance();
                token(TokenKind::Semicolon, None)
            }
            '.' => {
                self.advance();
                token(TokenKind::Period, None)
            }
            '-' => {
                self.advance();
                if self.chars.peek() == Some(&'>') {
                    self.advance();
                    token(TokenKind::Arrow, None)
                } else {
                    token(TokenKind::Invalid, None)
                }
            }
            '0'..='9' => {
                let text = self.read_while(|c| c.is_ascii_digit());
                token(TokenKind::Number, Some(names.intern(&text)))
            }
            _ if ch.is_ascii_alphabetic() => {
                let word = self.read_while(|c| c.is_ascii_alphanumeric() || c == '_');
                token(classify(&word), Some(names.intern(&word)))
            }
            _ => {
                self.advance();
                token(TokenKind::Invalid, None)
            }
        }
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next()
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.chars.peek().copied() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') => match self.peek_second() {
                    Some('/') => {
                        // Line comment: the newline itself is skipped as whitespace
                        while let Some(&c) = self.chars.peek() {
                            if c == '\n' {
                                break;
                            }
                            self.advance();
                        }
                    }
                    Some('*') => {
                        self.advance();
                        self.advance();
                        // An unterminated block comment runs to end of input
                        let mut star = false;
                        while let Some(c) = self.advance() {
                            if star && c == '/' {
                                break;
                            }
                            star = c == '*';
                        }
                    }
                    _ => return,
                },
                _ => return,
            }
        }
    }

    fn read_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(&ch) = self.chars.peek() {
            if !accept(ch) {
                break;
            }
            text.push(ch);
            self.advance();
        }
        text
    }
}

/// Classify an identifier by the reserved word sets.
fn classify(word: &str) -> TokenKind {
    if let Some(keyword) = Keyword::from_word(word) {
        TokenKind::Keyword(keyword)
    } else if let Some(ty) = DeviceType::from_keyword(word) {
        TokenKind::DeviceType(ty)
    } else {
        match word {
            "ON" => TokenKind::Property(true),
            "OFF" => TokenKind::Property(false),
            _ => TokenKind::Name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> (Vec<Token>, Names) {
        let mut names = Names::new();
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token(&mut names);
            tokens.push(tok);
            if tok.kind == TokenKind::EndOfFile {
                break;
            }
        }
        (tokens, names)
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input).0.into_iter().map(|tok| tok.kind).collect()
    }

    #[test]
    fn test_lexer_basic() {
        use TokenKind::*;
        assert_eq!(
            kinds("DEVICE_LIST:\nSWITCH sw1 OFF;\nAND g1 2;\nEND"),
            vec![
                Keyword(super::Keyword::DeviceList),
                Colon,
                DeviceType(crate::circuit::DeviceType::Switch),
                Name,
                Property(false),
                Semicolon,
                DeviceType(crate::circuit::DeviceType::And),
                Name,
                Number,
                Semicolon,
                Keyword(super::Keyword::End),
                EndOfFile,
            ]
        );
    }

    #[test]
    fn test_lexer_connection() {
        use TokenKind::*;
        assert_eq!(
            kinds("d1.QBAR->g1.12;"),
            vec![Name, Period, Name, Arrow, Name, Period, Number, Semicolon, EndOfFile]
        );
    }

    #[test]
    fn test_lexer_interns_names_and_numbers() {
        let (tokens, names) = lex("sw_1 0110 sw_1");
        assert_eq!(tokens[0].id, tokens[2].id);
        assert_eq!(names.resolve(tokens[0].id.unwrap()), Some("sw_1"));
        assert_eq!(names.resolve(tokens[1].id.unwrap()), Some("0110"));
    }

    #[test]
    fn test_lexer_interns_reserved_words() {
        let (tokens, names) = lex("DEVICE_LIST NAND ON : ;");
        let words: Vec<_> = tokens[..3]
            .iter()
            .map(|t| t.id.and_then(|id| names.resolve(id)))
            .collect();
        assert_eq!(words, vec![Some("DEVICE_LIST"), Some("NAND"), Some("ON")]);
        assert_eq!(tokens[3].id, None);
        assert_eq!(tokens[4].id, None);
    }

    #[test]
    fn test_lexer_reserved_words_are_case_sensitive() {
        use TokenKind::*;
        assert_eq!(
            kinds("end and on Off"),
            vec![Name, Name, Name, Name, EndOfFile]
        );
    }

    #[test]
    fn test_lexer_positions() {
        let (tokens, _) = lex("AND g1 2;\n  g1 -> x.1;");
        let pos: Vec<_> = tokens.iter().map(|t| (t.line, t.column)).collect();
        assert_eq!(
            pos,
            vec![
                (1, 1),
                (1, 5),
                (1, 8),
                (1, 9),
                (2, 3),
                (2, 6),
                (2, 9),
                (2, 10),
                (2, 11),
                (2, 12),
                (2, 13)
            ]
        );
    }

    #[test]
    fn test_lexer_comments() {
        use TokenKind::*;
        let input = "// header\nEND /* block\n spanning */ ; /**//* x */// tail\n:";
        let (tokens, _) = lex(input);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![Keyword(super::Keyword::End), Semicolon, Colon, EndOfFile]
        );
        assert_eq!((tokens[1].line, tokens[1].column), (3, 14));
        assert_eq!((tokens[2].line, tokens[2].column), (4, 1));
    }

    #[test]
    fn test_lexer_unterminated_block_comment() {
        assert_eq!(kinds("END /* never closed ;"), vec![
            TokenKind::Keyword(Keyword::End),
            TokenKind::EndOfFile
        ]);
    }

    #[test]
    fn test_lexer_invalid_characters() {
        use TokenKind::*;
        let (tokens, _) = lex("a - > b # / c");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![Name, Invalid, Invalid, Name, Invalid, Invalid, Name, EndOfFile]
        );
        assert_eq!(tokens[1].column, 3);
        assert_eq!(tokens[2].column, 5);
    }

    #[test]
    fn test_lexer_eof_is_sticky() {
        let mut names = Names::new();
        let mut lexer = Lexer::new("x\n");
        lexer.next_token(&mut names);
        let first = lexer.next_token(&mut names);
        let second = lexer.next_token(&mut names);
        assert_eq!(first.kind, TokenKind::EndOfFile);
        assert_eq!(first, second);
        assert_eq!((first.line, first.column), (2, 1));
    }
}
