//! Hand-written lexer producing spanned tokens for the parser.

use crate::SyntaxError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Tok {
    /// Numeric literal, kept as text so it converts to a decimal exactly.
    Num(String),
    Ident(String),
    True,
    False,
    LParen,
    RParen,
    Comma,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
}

impl Tok {
    /// Short description used in parse diagnostics.
    pub(crate) fn describe(&self) -> String {
        match self {
            Tok::Num(text) => format!("number `{text}`"),
            Tok::Ident(name) => format!("identifier `{name}`"),
            Tok::True => "`true`".into(),
            Tok::False => "`false`".into(),
            Tok::LParen => "`(`".into(),
            Tok::RParen => "`)`".into(),
            Tok::Comma => "`,`".into(),
            Tok::Plus => "`+`".into(),
            Tok::Minus => "`-`".into(),
            Tok::Star => "`*`".into(),
            Tok::Slash => "`/`".into(),
            Tok::Percent => "`%`".into(),
            Tok::Caret => "`^`".into(),
            Tok::Eq => "`=`".into(),
            Tok::NotEq => "`!=`".into(),
            Tok::Lt => "`<`".into(),
            Tok::Le => "`<=`".into(),
            Tok::Gt => "`>`".into(),
            Tok::Ge => "`>=`".into(),
            Tok::And => "`and`".into(),
            Tok::Or => "`or`".into(),
            Tok::Not => "`not`".into(),
        }
    }
}

/// A token together with the byte range it was read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Spanned {
    pub(crate) tok: Tok,
    pub(crate) start: usize,
    pub(crate) end: usize,
}

pub(crate) struct Lexer<'input> {
    input: &'input str,
    pos: usize,
}

impl<'input> Lexer<'input> {
    pub(crate) fn new(input: &'input str) -> Self {
        Lexer { input, pos: 0 }
    }

    /// Reads every token, stopping at the first lexical error.
    pub(crate) fn tokenize(self) -> Result<Vec<Spanned>, SyntaxError> {
        self.collect()
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.bytes().take_while(u8::is_ascii_whitespace).count();
    }

    fn take_ident(&mut self) -> &'input str {
        let rest = &self.input[self.pos..];
        let end = rest
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();
        self.pos += end;
        &rest[..end]
    }

    // digits[.digits] or .digits, then an optional exponent
    fn take_num(&mut self) -> Result<&'input str, SyntaxError> {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        let digits_from = |mut at: usize| {
            while at < bytes.len() && bytes[at].is_ascii_digit() {
                at += 1;
            }
            at
        };

        let mut end = digits_from(start);
        if bytes.get(end) == Some(&b'.') {
            let fraction_end = digits_from(end + 1);
            if fraction_end == end + 1 {
                return Err(SyntaxError::new("expected digits after `.`", end));
            }
            end = fraction_end;
        }

        if matches!(bytes.get(end), Some(b'e' | b'E')) {
            let mut exponent = end + 1;
            if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
                exponent += 1;
            }
            let exponent_end = digits_from(exponent);
            if exponent_end > exponent {
                end = exponent_end;
            }
        }

        self.pos = end;
        Ok(&self.input[start..end])
    }

    fn peek_byte(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Spanned, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        let start = self.pos;
        let c = self.input[self.pos..].chars().next()?;

        let tok = match c {
            'a'..='z' | 'A'..='Z' | '_' => {
                let ident = self.take_ident();
                match ident.to_ascii_lowercase().as_str() {
                    "and" => Tok::And,
                    "or" => Tok::Or,
                    "not" => Tok::Not,
                    "true" => Tok::True,
                    "false" => Tok::False,
                    _ => Tok::Ident(ident.to_string()),
                }
            }
            '0'..='9' | '.' => match self.take_num() {
                Ok(text) => Tok::Num(text.to_string()),
                Err(error) => return Some(Err(error)),
            },
            _ => {
                self.pos += c.len_utf8();
                match c {
                    '(' => Tok::LParen,
                    ')' => Tok::RParen,
                    ',' => Tok::Comma,
                    '+' => Tok::Plus,
                    '-' => Tok::Minus,
                    '*' => Tok::Star,
                    '/' => Tok::Slash,
                    '%' => Tok::Percent,
                    '^' => Tok::Caret,
                    '=' => {
                        if self.peek_byte() == Some(b'=') {
                            self.pos += 1;
                        }
                        Tok::Eq
                    }
                    '!' => {
                        if self.peek_byte() == Some(b'=') {
                            self.pos += 1;
                            Tok::NotEq
                        } else {
                            Tok::Not
                        }
                    }
                    '<' => match self.peek_byte() {
                        Some(b'=') => {
                            self.pos += 1;
                            Tok::Le
                        }
                        Some(b'>') => {
                            self.pos += 1;
                            Tok::NotEq
                        }
                        _ => Tok::Lt,
                    },
                    '>' => {
                        if self.peek_byte() == Some(b'=') {
                            self.pos += 1;
                            Tok::Ge
                        } else {
                            Tok::Gt
                        }
                    }
                    '&' if self.peek_byte() == Some(b'&') => {
                        self.pos += 1;
                        Tok::And
                    }
                    '|' if self.peek_byte() == Some(b'|') => {
                        self.pos += 1;
                        Tok::Or
                    }
                    _ => {
                        return Some(Err(SyntaxError::new(
                            format!("unexpected character `{c}`"),
                            start,
                        )));
                    }
                }
            }
        };

        Some(Ok(Spanned {
            tok,
            start,
            end: self.pos,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(input: &str) -> Vec<Tok> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|spanned| spanned.tok)
            .collect()
    }

    #[test]
    fn arithmetic() {
        assert_eq!(
            toks("a_1 + 2.5*(b - .5)"),
            vec![
                Tok::Ident("a_1".into()),
                Tok::Plus,
                Tok::Num("2.5".into()),
                Tok::Star,
                Tok::LParen,
                Tok::Ident("b".into()),
                Tok::Minus,
                Tok::Num(".5".into()),
                Tok::RParen,
            ]
        );
    }

    #[test]
    fn comparisons_and_keywords() {
        assert_eq!(
            toks("a <= 1 AND b <> 2 or !c == TRUE && d != e"),
            vec![
                Tok::Ident("a".into()),
                Tok::Le,
                Tok::Num("1".into()),
                Tok::And,
                Tok::Ident("b".into()),
                Tok::NotEq,
                Tok::Num("2".into()),
                Tok::Or,
                Tok::Not,
                Tok::Ident("c".into()),
                Tok::Eq,
                Tok::True,
                Tok::And,
                Tok::Ident("d".into()),
                Tok::NotEq,
                Tok::Ident("e".into()),
            ]
        );
    }

    #[test]
    fn exponent_is_part_of_number() {
        assert_eq!(toks("1e3"), vec![Tok::Num("1e3".into())]);
        assert_eq!(toks("2E-2"), vec![Tok::Num("2E-2".into())]);
    }

    #[test]
    fn spans_point_into_input() {
        let spanned = Lexer::new("  foo").tokenize().unwrap();
        assert_eq!((spanned[0].start, spanned[0].end), (2, 5));
    }

    #[test]
    fn unexpected_character() {
        let error = Lexer::new("a # b").tokenize().unwrap_err();
        assert_eq!(error.to_string(), "unexpected character `#` at position 2");
    }
}
