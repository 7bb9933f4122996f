//! Reef lexer -- tokenizer for the Reef programming language.
//!
//! Scans raw source bytes into a `Vec<Token>` terminated by a single
//! `END` token. Whitespace is consumed silently; comments are emitted as
//! `COMMENT` tokens and skipped later by the parser. The lexer only
//! classifies literals -- numeric conversion (and its overflow
//! diagnostics) happens in the parser.

mod cursor;

use cursor::Cursor;
use reef_common::token::{keyword_from_str, Base, Token, TokenKind};

/// The Reef lexer. Converts source text into a stream of tokens.
///
/// Implements `Iterator<Item = Token>` so callers can consume tokens
/// lazily or collect them with [`Lexer::tokenize`]. Operators are scanned
/// greedily with at most three characters of lookahead.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    /// Whether the final `END` token has been emitted.
    emitted_end: bool,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            emitted_end: false,
        }
    }

    /// Convenience: tokenize the entire source into a `Vec<Token>`.
    ///
    /// The returned vector always ends with the `END` token.
    pub fn tokenize(source: &'src str) -> Vec<Token<'src>> {
        Lexer::new(source).collect()
    }

    /// Produce the next token.
    fn produce_token(&mut self) -> Token<'src> {
        self.skip_whitespace();

        let start = self.cursor.pos();
        let line = self.cursor.line();
        let column = self.cursor.column();

        let Some(c) = self.cursor.peek() else {
            return Token::new(TokenKind::End, "", line, column);
        };

        let kind = match c {
            // ── Single-character delimiters ─────────────────────────────
            ',' => self.single(TokenKind::Comma),
            ';' => self.single(TokenKind::Semicolon),
            '(' => self.single(TokenKind::Lparen),
            ')' => self.single(TokenKind::Rparen),
            '{' => self.single(TokenKind::Lbrace),
            '}' => self.single(TokenKind::Rbrace),
            '[' => self.single(TokenKind::Lbracket),
            ']' => self.single(TokenKind::Rbracket),
            '?' => self.single(TokenKind::What),

            // ── Multi-character operators ───────────────────────────────
            '=' => self.lex_eq(),
            '!' => self.lex_bang(),
            '<' => self.lex_lt(),
            '>' => self.lex_gt(),
            '&' => self.with_assign(TokenKind::And, TokenKind::AndAssign),
            '|' => self.with_assign(TokenKind::Or, TokenKind::OrAssign),
            '^' => self.with_assign(TokenKind::Xor, TokenKind::XorAssign),
            '~' => self.with_assign(TokenKind::Not, TokenKind::NotAssign),
            '+' => self.with_assign(TokenKind::Plus, TokenKind::PlusAssign),
            '-' => self.with_assign(TokenKind::Minus, TokenKind::MinusAssign),
            '%' => self.with_assign(TokenKind::Percent, TokenKind::PercentAssign),
            '*' => self.lex_star(),
            '/' => self.lex_slash(),
            ':' => self.lex_colon(),
            '.' => self.lex_dot(),

            // ── Literals ────────────────────────────────────────────────
            '0'..='9' => self.lex_number(),
            '"' => self.lex_string(),
            '\'' => self.lex_character(),
            '\\' => self.lex_multiline_string(),

            // ── Identifiers and keywords ────────────────────────────────
            c if is_ident_start(c) => self.lex_ident(start),

            // ── Unknown byte ────────────────────────────────────────────
            _ => {
                self.cursor.advance();
                TokenKind::Illegal
            }
        };

        let text = self.cursor.slice(start, self.cursor.pos());
        Token::new(kind, text, line, column)
    }

    // ── Helpers ────────────────────────────────────────────────────────

    /// Skip whitespace. Newlines are not significant in Reef.
    fn skip_whitespace(&mut self) {
        self.cursor
            .eat_while(|c| c == ' ' || c == '\t' || c == '\n' || c == '\r');
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.advance();
        kind
    }

    /// `X` or `X=` for operators whose only two-byte form is the
    /// compound assignment.
    fn with_assign(&mut self, plain: TokenKind, assign: TokenKind) -> TokenKind {
        self.cursor.advance();
        if self.cursor.peek() == Some('=') {
            self.cursor.advance();
            assign
        } else {
            plain
        }
    }

    /// `=` -> ASSIGN, `==` -> EQ, `=>` -> FAT_ARROW
    fn lex_eq(&mut self) -> TokenKind {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('=') => self.single(TokenKind::Eq),
            Some('>') => self.single(TokenKind::FatArrow),
            _ => TokenKind::Assign,
        }
    }

    /// `!` -> BANG, `!=` -> NEQ
    fn lex_bang(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.peek() == Some('=') {
            self.single(TokenKind::NotEq)
        } else {
            TokenKind::Bang
        }
    }

    /// `<` -> LT, `<=` -> LTEQ, `<<` -> SHL, `<<=` -> SHL_ASSIGN
    fn lex_lt(&mut self) -> TokenKind {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('=') => self.single(TokenKind::LtEq),
            Some('<') => {
                self.cursor.advance();
                if self.cursor.peek() == Some('=') {
                    self.single(TokenKind::ShlAssign)
                } else {
                    TokenKind::Shl
                }
            }
            _ => TokenKind::Lt,
        }
    }

    /// `>` -> GT, `>=` -> GTEQ, `>>` -> SHR, `>>=` -> SHR_ASSIGN
    fn lex_gt(&mut self) -> TokenKind {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('=') => self.single(TokenKind::GtEq),
            Some('>') => {
                self.cursor.advance();
                if self.cursor.peek() == Some('=') {
                    self.single(TokenKind::ShrAssign)
                } else {
                    TokenKind::Shr
                }
            }
            _ => TokenKind::Gt,
        }
    }

    /// `*` -> STAR, `**` -> STAR_STAR, `*=` -> STAR_ASSIGN
    fn lex_star(&mut self) -> TokenKind {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('*') => self.single(TokenKind::StarStar),
            Some('=') => self.single(TokenKind::StarAssign),
            _ => TokenKind::Star,
        }
    }

    /// `/` -> SLASH, `/=` -> SLASH_ASSIGN, `//` -> line COMMENT
    fn lex_slash(&mut self) -> TokenKind {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('=') => self.single(TokenKind::SlashAssign),
            Some('/') => {
                self.cursor.eat_while(|c| c != '\n');
                TokenKind::Comment
            }
            _ => TokenKind::Slash,
        }
    }

    /// `:` -> COLON, `:=` -> WALRUS, `::` -> COLON_COLON
    fn lex_colon(&mut self) -> TokenKind {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('=') => self.single(TokenKind::Walrus),
            Some(':') => self.single(TokenKind::ColonColon),
            _ => TokenKind::Colon,
        }
    }

    /// `.` -> DOT, `..` -> DOT_DOT, `..=` -> DOT_DOT_EQ
    fn lex_dot(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.peek() == Some('.') {
            self.cursor.advance();
            if self.cursor.peek() == Some('=') {
                self.single(TokenKind::DotDotEq)
            } else {
                TokenKind::DotDot
            }
        } else {
            TokenKind::Dot
        }
    }

    // ── Number literals ───────────────────────────────────────────────

    /// Lex a number starting with a digit.
    ///
    /// The lexer only classifies: it eats the alphanumeric run (so a
    /// malformed digit like `0b12` stays inside one token for the parser
    /// to reject) and derives the kind from the base prefix and the
    /// `u`/`z`/`uz` suffix. Floats require a `.` with a following digit.
    fn lex_number(&mut self) -> TokenKind {
        let start = self.cursor.pos();
        let first = self.cursor.advance().unwrap_or('0');

        let base = if first == '0' {
            match self.cursor.peek() {
                Some('b' | 'B') => Some(Base::Binary),
                Some('o' | 'O') => Some(Base::Octal),
                Some('x' | 'X') => Some(Base::Hexadecimal),
                _ => None,
            }
        } else {
            None
        };

        if let Some(base) = base {
            self.cursor.advance(); // base marker
            self.cursor.eat_while(|c| c.is_ascii_alphanumeric());
            let text = self.cursor.slice(start, self.cursor.pos());
            return integer_kind(text, base);
        }

        self.cursor.eat_while(|c| c.is_ascii_digit());

        // Float: `.` followed by a digit (`1..2` stays a range).
        if self.cursor.peek() == Some('.')
            && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.cursor.advance(); // '.'
            self.cursor.eat_while(|c| c.is_ascii_digit());

            if matches!(self.cursor.peek(), Some('e' | 'E')) {
                self.cursor.advance();
                if matches!(self.cursor.peek(), Some('+' | '-')) {
                    self.cursor.advance();
                }
                self.cursor.eat_while(|c| c.is_ascii_digit());
            }

            return TokenKind::Float;
        }

        self.cursor.eat_while(|c| c.is_ascii_alphanumeric());
        let text = self.cursor.slice(start, self.cursor.pos());
        integer_kind(text, Base::Decimal)
    }

    // ── String literals ───────────────────────────────────────────────

    /// Lex `"..."`. A doubled `""` inside the string escapes one quote.
    ///
    /// An unterminated string (end of line or input before the closing
    /// quote) degrades to ILLEGAL.
    fn lex_string(&mut self) -> TokenKind {
        self.cursor.advance(); // opening quote
        loop {
            match self.cursor.peek() {
                None | Some('\n') => return TokenKind::Illegal,
                Some('"') => {
                    if self.cursor.peek_next() == Some('"') {
                        self.cursor.advance();
                        self.cursor.advance();
                    } else {
                        self.cursor.advance();
                        return TokenKind::String;
                    }
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// Lex `'c'` or `'\c'` including the quotes.
    fn lex_character(&mut self) -> TokenKind {
        self.cursor.advance(); // opening quote
        match self.cursor.peek() {
            None | Some('\n') => return TokenKind::Illegal,
            Some('\\') => {
                self.cursor.advance();
                self.cursor.advance(); // escaped byte
            }
            Some(_) => {
                self.cursor.advance();
            }
        }
        if self.cursor.peek() == Some('\'') {
            self.cursor.advance();
            TokenKind::Character
        } else {
            TokenKind::Illegal
        }
    }

    /// Lex a run of consecutive `\\`-prefixed lines as one token.
    ///
    /// The slice spans from the first backslash to the end of the last
    /// contributing line's content; interior newlines are included, the
    /// trailing one is not. A lone `\` is ILLEGAL.
    fn lex_multiline_string(&mut self) -> TokenKind {
        if self.cursor.peek_next() != Some('\\') {
            self.cursor.advance();
            return TokenKind::Illegal;
        }

        loop {
            self.cursor.advance(); // '\'
            self.cursor.advance(); // '\'
            self.cursor.eat_while(|c| c != '\n');

            let continues = self.cursor.peek() == Some('\n')
                && self.cursor.peek_next() == Some('\\')
                && self.cursor.peek_third() == Some('\\');
            if !continues {
                return TokenKind::MultilineString;
            }
            self.cursor.advance(); // the newline between contributing lines
        }
    }

    // ── Identifiers and keywords ──────────────────────────────────────

    fn lex_ident(&mut self, start: usize) -> TokenKind {
        self.cursor.advance();
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice(start, self.cursor.pos());

        if text == "_" {
            return TokenKind::Underscore;
        }
        keyword_from_str(text).unwrap_or(TokenKind::Ident)
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Token<'src>> {
        if self.emitted_end {
            return None;
        }
        let token = self.produce_token();
        if token.kind == TokenKind::End {
            self.emitted_end = true;
        }
        Some(token)
    }
}

/// Map an eaten alphanumeric run to its integer token kind.
///
/// The trailing `u`/`z`/`uz` suffix (any case) selects signedness; the
/// digits themselves are validated later by the parser's conversion.
fn integer_kind(text: &str, base: Base) -> TokenKind {
    let (signed, unsigned, size) = match base {
        Base::Binary => (TokenKind::Int2, TokenKind::Uint2, TokenKind::Size2),
        Base::Octal => (TokenKind::Int8, TokenKind::Uint8, TokenKind::Size8),
        Base::Decimal => (TokenKind::Int10, TokenKind::Uint10, TokenKind::Size10),
        Base::Hexadecimal => (TokenKind::Int16, TokenKind::Uint16, TokenKind::Size16),
    };

    // `uz` ends in `z`, so the last byte alone settles signedness.
    match text.as_bytes().last() {
        Some(b'z' | b'Z') => size,
        Some(b'u' | b'U') => unsigned,
        _ => signed,
    }
}

/// Whether a character can start an identifier.
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Whether a character can continue an identifier.
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lex_simple_declaration() {
        assert_eq!(
            kinds("var x := 5;"),
            vec![
                TokenKind::Var,
                TokenKind::Ident,
                TokenKind::Walrus,
                TokenKind::Int10,
                TokenKind::Semicolon,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn lex_positions_are_one_based() {
        let tokens = Lexer::tokenize("var x := 5;\nconst y := 10;");
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1)); // var
        assert_eq!((tokens[1].line, tokens[1].column), (1, 5)); // x
        assert_eq!((tokens[3].line, tokens[3].column), (1, 10)); // 5
        assert_eq!((tokens[5].line, tokens[5].column), (2, 1)); // const
        assert_eq!((tokens[6].line, tokens[6].column), (2, 7)); // y
    }

    #[test]
    fn lex_integer_bases_and_suffixes() {
        let tokens = Lexer::tokenize("5 0b101 0o17 0xFF8a91d 5u 0o17U 3z 3uz 0xFFuZ");
        let expected = [
            TokenKind::Int10,
            TokenKind::Int2,
            TokenKind::Int8,
            TokenKind::Int16,
            TokenKind::Uint10,
            TokenKind::Uint8,
            TokenKind::Size10,
            TokenKind::Size10,
            TokenKind::Size16,
        ];
        for (tok, expected) in tokens.iter().zip(expected) {
            assert_eq!(tok.kind, expected, "token {:?}", tok.text);
        }
    }

    #[test]
    fn lex_floats() {
        assert_eq!(kinds("1023.0")[0], TokenKind::Float);
        assert_eq!(kinds("1023.234612e234")[0], TokenKind::Float);
        assert_eq!(kinds("4.9e-2")[0], TokenKind::Float);
        // A range between integers is not a float.
        assert_eq!(
            kinds("1..2"),
            vec![TokenKind::Int10, TokenKind::DotDot, TokenKind::Int10, TokenKind::End]
        );
    }

    #[test]
    fn lex_operator_families() {
        assert_eq!(
            kinds(".. ..= :: := => == != <= << <<= >> >>= ** ~="),
            vec![
                TokenKind::DotDot,
                TokenKind::DotDotEq,
                TokenKind::ColonColon,
                TokenKind::Walrus,
                TokenKind::FatArrow,
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::LtEq,
                TokenKind::Shl,
                TokenKind::ShlAssign,
                TokenKind::Shr,
                TokenKind::ShrAssign,
                TokenKind::StarStar,
                TokenKind::NotAssign,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn lex_strings_and_characters() {
        let tokens = Lexer::tokenize(r#""hello" 'a' '\n'"#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, r#""hello""#);
        assert_eq!(tokens[1].kind, TokenKind::Character);
        assert_eq!(tokens[2].kind, TokenKind::Character);
    }

    #[test]
    fn lex_string_with_doubled_quote() {
        let tokens = Lexer::tokenize(r#""say ""hi"" now""#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, r#""say ""hi"" now""#);
    }

    #[test]
    fn lex_unterminated_string_is_illegal() {
        assert_eq!(kinds("\"oops")[0], TokenKind::Illegal);
        assert_eq!(kinds("'x")[0], TokenKind::Illegal);
    }

    #[test]
    fn lex_multiline_string_spans_lines() {
        let source = "\\\\Hello, 'World'!\n\\\\\n;";
        let tokens = Lexer::tokenize(source);
        assert_eq!(tokens[0].kind, TokenKind::MultilineString);
        assert_eq!(tokens[0].text, "\\\\Hello, 'World'!\n\\\\");
        assert_eq!(tokens[1].kind, TokenKind::Semicolon);
    }

    #[test]
    fn lex_single_line_multiline_string() {
        let tokens = Lexer::tokenize("\\\\This is a string\n;");
        assert_eq!(tokens[0].kind, TokenKind::MultilineString);
        assert_eq!(tokens[0].text, "\\\\This is a string");
    }

    #[test]
    fn lex_comments_are_emitted() {
        assert_eq!(
            kinds("5 // trailing\n6"),
            vec![TokenKind::Int10, TokenKind::Comment, TokenKind::Int10, TokenKind::End]
        );
    }

    #[test]
    fn lex_underscore_and_identifiers() {
        assert_eq!(
            kinds("_ _x x_1"),
            vec![TokenKind::Underscore, TokenKind::Ident, TokenKind::Ident, TokenKind::End]
        );
    }

    #[test]
    fn lex_keywords_and_primitives() {
        assert_eq!(
            kinds("fn orelse packed int size do"),
            vec![
                TokenKind::Function,
                TokenKind::Orelse,
                TokenKind::Packed,
                TokenKind::IntType,
                TokenKind::SizeType,
                TokenKind::Do,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn lex_unknown_bytes_are_illegal() {
        assert_eq!(kinds("@")[0], TokenKind::Illegal);
        assert_eq!(kinds("é")[0], TokenKind::Illegal);
    }

    #[test]
    fn token_slices_cover_the_input() {
        // Concatenating token slices with the whitespace between them
        // reproduces the source verbatim.
        let source = "var x := 5; // note\nconst y := \"hi\";";
        let tokens = Lexer::tokenize(source);
        let mut rebuilt = String::new();
        let mut offset = 0;
        for tok in &tokens {
            if tok.kind == TokenKind::End {
                break;
            }
            let at = source[offset..].find(tok.text).expect("slice present") + offset;
            rebuilt.push_str(&source[offset..at]);
            rebuilt.push_str(tok.text);
            offset = at + tok.text.len();
        }
        rebuilt.push_str(&source[offset..]);
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn stream_always_ends_with_end() {
        assert_eq!(kinds(""), vec![TokenKind::End]);
        assert_eq!(kinds("   \n\t "), vec![TokenKind::End]);
    }
}
