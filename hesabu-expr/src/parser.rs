//! Parser: formula text → [`Expr`].
//!
//! Precedence climbing over the token stream, lowest to highest:
//! `or`, `and`, comparison (not chainable), `+ -`, `* / %`, prefix
//! `- + not`, and right-associative `^`. Left-associative levels are parsed
//! into flat [`Expr::Chain`] nodes, so long sums add no nesting.

use crate::{
    BinaryOp, Expr, SyntaxError, UnaryOp,
    lexer::{Lexer, Spanned, Tok},
};

/// Deepest allowed nesting of parentheses, call arguments, prefix operators
/// and exponents.
const MAX_NESTING: usize = 64;

/// Parses a formula into an expression tree.
///
/// # Errors
///
/// Returns a [`SyntaxError`] pointing at the first token that does not fit
/// the grammar, or at the point where the formula nests too deeply.
///
/// # Examples
///
/// ```
/// use hesabu_expr::{BinaryOp, Expr, parse};
///
/// let ast = parse("a > 1").unwrap();
/// assert!(matches!(ast, Expr::Binary { op: BinaryOp::Gt, .. }));
/// assert!(parse("a +").is_err());
/// ```
pub fn parse(input: &str) -> Result<Expr, SyntaxError> {
    let tokens = Lexer::new(input).tokenize()?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };

    let expr = parser.or()?;
    match parser.peek() {
        None => Ok(expr),
        Some(spanned) => Err(SyntaxError::new(
            format!("unexpected {}", spanned.tok.describe()),
            spanned.start,
        )),
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn peek_tok(&self) -> Option<&Tok> {
        self.peek().map(|spanned| &spanned.tok)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let spanned = self.tokens.get(self.pos).cloned();
        if spanned.is_some() {
            self.pos += 1;
        }
        spanned
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek_tok() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: &Tok) -> Result<(), SyntaxError> {
        if self.eat(tok) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("expected {}", tok.describe())))
        }
    }

    /// Position of the next token, or the end of the last one.
    fn position(&self) -> usize {
        match self.peek() {
            Some(spanned) => spanned.start,
            None => self.tokens.last().map_or(0, |spanned| spanned.end),
        }
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let found = match self.peek() {
            Some(spanned) => spanned.tok.describe(),
            None => "end of input".to_string(),
        };
        SyntaxError::new(format!("{expected} but found {found}"), self.position())
    }

    /// Runs `parse` one nesting level deeper.
    fn nested(
        &mut self,
        parse: fn(&mut Self) -> Result<Expr, SyntaxError>,
    ) -> Result<Expr, SyntaxError> {
        if self.depth == MAX_NESTING {
            return Err(SyntaxError::new(
                "expression is nested too deeply",
                self.position(),
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Parses `operand (op operand)*` into a flat chain.
    fn chain(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, SyntaxError>,
        operator: fn(&Tok) -> Option<BinaryOp>,
    ) -> Result<Expr, SyntaxError> {
        let first = operand(self)?;
        let mut rest = Vec::new();
        while let Some(op) = self.peek_tok().and_then(operator) {
            self.pos += 1;
            rest.push((op, operand(self)?));
        }
        Ok(Expr::chain(first, rest))
    }

    fn or(&mut self) -> Result<Expr, SyntaxError> {
        self.chain(Self::and, |tok| (*tok == Tok::Or).then_some(BinaryOp::Or))
    }

    fn and(&mut self) -> Result<Expr, SyntaxError> {
        self.chain(Self::comparison, |tok| {
            (*tok == Tok::And).then_some(BinaryOp::And)
        })
    }

    fn comparison(&mut self) -> Result<Expr, SyntaxError> {
        let lhs = self.additive()?;
        let Some(op) = self.peek_tok().and_then(comparison_op) else {
            return Ok(lhs);
        };
        self.pos += 1;
        let rhs = self.additive()?;

        if let Some(spanned) = self.peek().filter(|s| comparison_op(&s.tok).is_some()) {
            return Err(SyntaxError::new(
                "comparison operators cannot be chained",
                spanned.start,
            ));
        }
        Ok(Expr::binary(op, lhs, rhs))
    }

    fn additive(&mut self) -> Result<Expr, SyntaxError> {
        self.chain(Self::multiplicative, |tok| match tok {
            Tok::Plus => Some(BinaryOp::Add),
            Tok::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        self.chain(Self::unary, |tok| match tok {
            Tok::Star => Some(BinaryOp::Mul),
            Tok::Slash => Some(BinaryOp::Div),
            Tok::Percent => Some(BinaryOp::Rem),
            _ => None,
        })
    }

    fn unary(&mut self) -> Result<Expr, SyntaxError> {
        let op = match self.peek_tok() {
            Some(Tok::Minus) => UnaryOp::Neg,
            Some(Tok::Plus) => UnaryOp::Plus,
            Some(Tok::Not) => UnaryOp::Not,
            _ => return self.power(),
        };
        self.pos += 1;
        let operand = self.nested(Self::unary)?;
        Ok(Expr::unary(op, operand))
    }

    fn power(&mut self) -> Result<Expr, SyntaxError> {
        let base = self.primary()?;
        if self.eat(&Tok::Caret) {
            // Right-associative, and the exponent may carry its own sign.
            let exponent = self.nested(Self::unary)?;
            return Ok(Expr::binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, SyntaxError> {
        let Some(spanned) = self.advance() else {
            return Err(self.unexpected("expected an expression"));
        };

        match spanned.tok {
            Tok::Num(text) => Ok(Expr::Number(text)),
            Tok::True => Ok(Expr::Bool(true)),
            Tok::False => Ok(Expr::Bool(false)),
            Tok::Ident(name) => {
                if self.eat(&Tok::LParen) {
                    let args = self.arguments()?;
                    Ok(Expr::Call {
                        name,
                        args,
                        position: spanned.start,
                    })
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            Tok::LParen => {
                let inner = self.nested(Self::or)?;
                self.expect(&Tok::RParen)?;
                Ok(inner)
            }
            other => Err(SyntaxError::new(
                format!("expected an expression but found {}", other.describe()),
                spanned.start,
            )),
        }
    }

    /// Parses a comma-separated argument list after the opening parenthesis.
    fn arguments(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut args = Vec::new();
        if self.eat(&Tok::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.nested(Self::or)?);
            if self.eat(&Tok::RParen) {
                return Ok(args);
            }
            if !self.eat(&Tok::Comma) {
                return Err(self.unexpected("expected `,` or `)`"));
            }
        }
    }
}

fn comparison_op(tok: &Tok) -> Option<BinaryOp> {
    match tok {
        Tok::Eq => Some(BinaryOp::Eq),
        Tok::NotEq => Some(BinaryOp::NotEq),
        Tok::Lt => Some(BinaryOp::Lt),
        Tok::Le => Some(BinaryOp::Le),
        Tok::Gt => Some(BinaryOp::Gt),
        Tok::Ge => Some(BinaryOp::Ge),
        _ => None,
    }
}
