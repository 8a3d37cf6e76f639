use std::fmt;

use ecow::EcoString;

use crate::{
    error::{AplError, AplResult},
    value::Ident,
};

/// Every glyph the primitive and operator registries know
pub const GLYPHS: &str = "+-×÷*⍟|⌊⌈!○?~∧∨⍲⍱<≤=≥>≠≡≢⍴⍳,⍪∊↑↓⌽⊖⍉⍋⍒⍸∪⍷⊥⊤⍕⍎⊢⊣⌹/⌿\\⍀¨⍨∘.⍣⍤@⌺";

/// Tokenise one line of source
pub fn lex(input: &str) -> AplResult<Vec<Sp<Token>>> {
    Lexer {
        input_chars: input.chars().collect(),
        loc: Loc::default(),
        tokens: Vec::new(),
    }
    .run()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Loc {
    /// Character position in the line
    pub pos: usize,
    pub line: usize,
    pub col: usize,
}

impl Default for Loc {
    fn default() -> Self {
        Loc {
            pos: 0,
            line: 1,
            col: 1,
        }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeSpan {
    pub start: Loc,
    pub end: Loc,
}

impl CodeSpan {
    pub fn merge(self, end: Self) -> Self {
        CodeSpan {
            start: self.start.min(end.start),
            end: self.end.max(end.end),
        }
    }
}

impl fmt::Display for CodeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)
    }
}

/// A source position, or the marker for errors raised inside primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    Code(CodeSpan),
    Builtin,
}

impl Span {
    pub fn merge(self, end: Self) -> Self {
        match (self, end) {
            (Span::Code(a), Span::Code(b)) => Span::Code(a.merge(b)),
            (Span::Code(a), Span::Builtin) | (Span::Builtin, Span::Code(a)) => Span::Code(a),
            (Span::Builtin, Span::Builtin) => Span::Builtin,
        }
    }
    pub const fn sp<T>(self, value: T) -> Sp<T> {
        Sp { value, span: self }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Span::Code(span) => write!(f, "{span}"),
            Span::Builtin => write!(f, "<builtin>"),
        }
    }
}

/// A value paired with its source span
#[derive(Clone, PartialEq, Eq)]
pub struct Sp<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Sp<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Sp<U> {
        Sp {
            value: f(self.value),
            span: self.span,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Sp<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.span)?;
        self.value.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A numeric literal, including `¯`, exponent, `J` and `a` forms
    Number(EcoString),
    /// A double-quoted string scalar
    Str(EcoString),
    /// A single-quoted character vector
    Chars(EcoString),
    /// A name, `⎕`-name, lambda-local name or `pkg→name`
    Ident(Ident),
    /// A primitive or operator glyph
    Glyph(char),
    Simple(Simple),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Simple {
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    Semicolon,
    Colon,
    /// The statement separator `⋄`
    Diamond,
    LeftArrow,
    Newline,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(s) => write!(f, "{s}"),
            Token::Str(s) => write!(f, "{s:?}"),
            Token::Chars(s) => write!(f, "'{s}'"),
            Token::Ident(s) => write!(f, "{s}"),
            Token::Glyph(c) => write!(f, "{c}"),
            Token::Simple(s) => write!(f, "{s}"),
        }
    }
}

impl fmt::Display for Simple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Simple::OpenParen => write!(f, "("),
            Simple::CloseParen => write!(f, ")"),
            Simple::OpenBracket => write!(f, "["),
            Simple::CloseBracket => write!(f, "]"),
            Simple::OpenCurly => write!(f, "{{"),
            Simple::CloseCurly => write!(f, "}}"),
            Simple::Semicolon => write!(f, ";"),
            Simple::Colon => write!(f, ":"),
            Simple::Diamond => write!(f, "⋄"),
            Simple::LeftArrow => write!(f, "←"),
            Simple::Newline => write!(f, "\\n"),
        }
    }
}

impl From<Simple> for Token {
    fn from(s: Simple) -> Self {
        Token::Simple(s)
    }
}

struct Lexer {
    input_chars: Vec<char>,
    loc: Loc,
    tokens: Vec<Sp<Token>>,
}

impl Lexer {
    fn peek_char(&self) -> Option<char> {
        self.input_chars.get(self.loc.pos).copied()
    }
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input_chars.get(self.loc.pos + offset).copied()
    }
    fn update_loc(&mut self, c: char) {
        match c {
            '\n' => {
                self.loc.line += 1;
                self.loc.col = 1;
            }
            '\r' => {}
            _ => self.loc.col += 1,
        }
        self.loc.pos += 1;
    }
    fn next_char_if(&mut self, f: impl Fn(char) -> bool) -> Option<char> {
        let c = *self.input_chars.get(self.loc.pos)?;
        if !f(c) {
            return None;
        }
        self.update_loc(c);
        Some(c)
    }
    fn next_char_exact(&mut self, c: char) -> bool {
        self.next_char_if(|c2| c2 == c).is_some()
    }
    fn next_char(&mut self) -> Option<char> {
        self.next_char_if(|_| true)
    }
    fn end_span(&self, start: Loc) -> Span {
        Span::Code(CodeSpan {
            start,
            end: self.loc,
        })
    }
    fn end(&mut self, token: impl Into<Token>, start: Loc) {
        self.tokens.push(Sp {
            value: token.into(),
            span: self.end_span(start),
        })
    }
    fn error(&self, start: Loc, message: impl Into<String>) -> AplError {
        AplError::syntax(message).at(self.end_span(start))
    }

    fn run(mut self) -> AplResult<Vec<Sp<Token>>> {
        use Simple::*;
        loop {
            let start = self.loc;
            let Some(c) = self.next_char() else {
                break;
            };
            match c {
                '(' => self.end(OpenParen, start),
                ')' => self.end(CloseParen, start),
                '[' => self.end(OpenBracket, start),
                ']' => self.end(CloseBracket, start),
                '{' => self.end(OpenCurly, start),
                '}' => self.end(CloseCurly, start),
                ';' => self.end(Semicolon, start),
                ':' => self.end(Colon, start),
                '⋄' => self.end(Diamond, start),
                '←' => self.end(LeftArrow, start),
                '\n' => self.end(Newline, start),
                ' ' | '\t' | '\r' => continue,
                // Comments extend to end of line
                '⍝' => {
                    while self.next_char_if(|c| c != '\n').is_some() {}
                }
                // Negative, numeric or fractional literals
                '¯' | '.' if self.peek_char().is_some_and(|c| c.is_ascii_digit() || c == '.') => {
                    let number = self.number(c);
                    self.end(Token::Number(number), start)
                }
                c if c.is_ascii_digit() => {
                    let number = self.number(c);
                    self.end(Token::Number(number), start)
                }
                // Strings are scalars
                '"' => {
                    let mut string = EcoString::new();
                    loop {
                        match self.next_char() {
                            Some('"') => break,
                            Some('\\') => match self.next_char() {
                                Some('n') => string.push('\n'),
                                Some('t') => string.push('\t'),
                                Some('\\') => string.push('\\'),
                                Some('"') => string.push('"'),
                                Some(e) => {
                                    return Err(self.error(start, format!("invalid escape {e:?}")))
                                }
                                None => return Err(self.error(start, "unterminated string")),
                            },
                            Some(c) => string.push(c),
                            None => return Err(self.error(start, "unterminated string")),
                        }
                    }
                    self.end(Token::Str(string), start)
                }
                // Single quotes make character vectors
                '\'' => {
                    let mut chars = EcoString::new();
                    loop {
                        match self.next_char() {
                            Some('\'') => break,
                            Some(c) => chars.push(c),
                            None => return Err(self.error(start, "unterminated character literal")),
                        }
                    }
                    self.end(Token::Chars(chars), start)
                }
                // System names
                '⎕' => {
                    let mut ident = EcoString::from("⎕");
                    while let Some(c) = self.next_char_if(|c| c.is_ascii_alphanumeric()) {
                        ident.push(c);
                    }
                    self.end(Token::Ident(ident), start)
                }
                // Lambda-local names
                '⍺' | '⍵' => {
                    let mut ident = EcoString::new();
                    ident.push(c);
                    if self.next_char_exact(c) {
                        ident.push(c);
                    }
                    self.end(Token::Ident(ident), start)
                }
                '∇' => self.end(Token::Ident(EcoString::from("∇")), start),
                '^' => self.end(Token::Glyph('∧'), start),
                c if GLYPHS.contains(c) => self.end(Token::Glyph(c), start),
                c if c.is_alphabetic() => {
                    let mut ident = EcoString::new();
                    ident.push(c);
                    while let Some(c) = self.next_char_if(|c| c.is_alphanumeric()) {
                        ident.push(c);
                    }
                    // Package-qualified names
                    if self.peek_char() == Some('→')
                        && self.peek_at(1).is_some_and(char::is_alphabetic)
                    {
                        self.next_char();
                        ident.push('→');
                        while let Some(c) = self.next_char_if(|c| c.is_alphanumeric()) {
                            ident.push(c);
                        }
                    }
                    self.end(Token::Ident(ident), start)
                }
                c => return Err(self.error(start, format!("unexpected character {c:?}"))),
            }
        }
        Ok(self.tokens)
    }

    /// Scan a numeric literal starting with `init`, including fraction,
    /// exponent and the complex `J`/polar `a` forms
    fn number(&mut self, init: char) -> EcoString {
        let mut number = EcoString::new();
        number.push(init);
        self.real(&mut number, init == '.');
        if let Some(sep) = self.peek_char().filter(|&c| c == 'J' || c == 'j' || c == 'a') {
            let next = self.peek_at(1);
            let starts_real =
                next.is_some_and(|c| c.is_ascii_digit() || c == '¯' || c == '.');
            if starts_real {
                self.next_char();
                number.push(sep);
                let init = self.next_char().unwrap_or('0');
                number.push(init);
                self.real(&mut number, init == '.');
            }
        }
        number
    }

    fn real(&mut self, number: &mut EcoString, mut seen_dot: bool) {
        while let Some(c) = self.next_char_if(|c| c.is_ascii_digit()) {
            number.push(c);
        }
        if !seen_dot {
            let before_dot = self.loc;
            if self.next_char_exact('.') {
                if self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                    number.push('.');
                    while let Some(c) = self.next_char_if(|c| c.is_ascii_digit()) {
                        number.push(c);
                    }
                    seen_dot = true;
                } else {
                    self.loc = before_dot;
                }
            }
        }
        let _ = seen_dot;
        // Exponent, with backtracking if no digits follow
        let before_e = self.loc;
        let len_before_e = number.chars().count();
        if self.next_char_if(|c| c == 'e' || c == 'E').is_some() {
            number.push('e');
            if self
                .next_char_if(|c| c == '-' || c == '¯')
                .is_some()
            {
                number.push('-');
            }
            let mut got_digit = false;
            while let Some(c) = self.next_char_if(|c| c.is_ascii_digit()) {
                number.push(c);
                got_digit = true;
            }
            if !got_digit {
                self.loc = before_e;
                let keep: EcoString = number.chars().take(len_before_e).collect();
                *number = keep;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        lex(input).unwrap().into_iter().map(|t| t.value).collect()
    }

    #[test]
    fn numbers_and_strands() {
        let toks = kinds("1 2.5 ¯3 1J1 2.2a20 1e¯3");
        let nums: Vec<&str> = toks
            .iter()
            .map(|t| match t {
                Token::Number(s) => s.as_str(),
                t => panic!("{t:?}"),
            })
            .collect();
        assert_eq!(nums, ["1", "2.5", "¯3", "1J1", "2.2a20", "1e-3"]);
    }

    #[test]
    fn package_qualified_idents() {
        let toks = kinds("s→toupper X ⎕IO ⍺⍺");
        assert_eq!(
            toks,
            [
                Token::Ident("s→toupper".into()),
                Token::Ident("X".into()),
                Token::Ident("⎕IO".into()),
                Token::Ident("⍺⍺".into()),
            ]
        );
    }

    #[test]
    fn comments_and_separators() {
        let toks = kinds("1⋄2 ⍝ rest is ignored ⋄ 3");
        assert_eq!(
            toks,
            [
                Token::Number("1".into()),
                Token::Simple(Simple::Diamond),
                Token::Number("2".into()),
            ]
        );
    }

    #[test]
    fn caret_is_an_alias_for_and() {
        assert_eq!(kinds("^"), [Token::Glyph('∧')]);
    }
}
