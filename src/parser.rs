use core::fmt;

use crate::{
    ast::{Expr, InfixOp},
    lexer::{self, Lexer, Token, TokenKind},
    span::Span,
};

/// What the parser was looking for when it gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Token(TokenKind),
    Expression,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expected::Token(kind) => write!(f, "{kind}"),
            Expected::Expression => write!(f, "expression"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lexer(#[from] lexer::Error),

    #[error("expected '{expected}' but got '{found}'")]
    UnexpectedToken {
        expected: Expected,
        found: TokenKind,
        span: Span,
    },

    #[error("integer literal '{text}' is out of range")]
    IntegerOutOfRange { text: String, span: Span },

    #[error("expression nested deeper than {max} levels", max = MAX_DEPTH)]
    TooDeep { span: Span },
}

impl Error {
    pub fn span(&self) -> Span {
        match self {
            Error::Lexer(error) => error.span(),
            Error::UnexpectedToken { span, .. }
            | Error::IntegerOutOfRange { span, .. }
            | Error::TooDeep { span } => *span,
        }
    }

    pub fn position(&self) -> usize {
        self.span().start.index
    }

    pub fn at_end_of_input(&self) -> bool {
        matches!(
            self,
            Error::UnexpectedToken {
                found: TokenKind::Eof,
                ..
            }
        )
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Parentheses, `let` and `if` may nest this far before parsing stops.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug)]
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    token: Token,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Result<Self> {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            token,
            depth: 0,
        })
    }

    /// Parses one expression and requires the input to end right after it.
    pub fn parse(mut self) -> Result<Expr> {
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Eof)?;
        Ok(expr)
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        if self.depth == MAX_DEPTH {
            return Err(Error::TooDeep {
                span: self.token.span,
            });
        }
        self.depth += 1;
        let expr = self.parse_nested_expr();
        self.depth -= 1;
        expr
    }

    fn parse_nested_expr(&mut self) -> Result<Expr> {
        match self.token.kind {
            TokenKind::Let => {
                self.advance()?;
                self.parse_let_expr()
            }
            TokenKind::If => {
                self.advance()?;
                self.parse_cond_expr()
            }
            _ => self.parse_call_expr(),
        }
    }

    fn parse_let_expr(&mut self) -> Result<Expr> {
        let name = self.expect_identifier()?;

        if self.token.kind == TokenKind::Identifier {
            let param = self.expect_identifier()?;
            self.expect(TokenKind::Equal)?;
            let body = self.parse_expr()?;
            self.expect(TokenKind::In)?;
            let let_body = self.parse_expr()?;
            self.expect(TokenKind::End)?;
            return Ok(Expr::let_fun(name, param, body, let_body));
        }

        self.expect(TokenKind::Equal)?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::In)?;
        let body = self.parse_expr()?;
        self.expect(TokenKind::End)?;
        Ok(Expr::let_in(name, value, body))
    }

    fn parse_cond_expr(&mut self) -> Result<Expr> {
        let cond = self.parse_expr()?;
        self.expect(TokenKind::Then)?;
        let then = self.parse_expr()?;
        self.expect(TokenKind::Else)?;
        let alt = self.parse_expr()?;
        Ok(Expr::condition(cond, then, alt))
    }

    fn parse_call_expr(&mut self) -> Result<Expr> {
        let mut func = self.parse_add_expr()?;
        while self.token.kind.starts_atom() {
            let arg = self.parse_add_expr()?;
            func = Expr::application(func, arg);
        }
        Ok(func)
    }

    fn parse_add_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_mul_expr()?;
        while let Some(op) = InfixOp::additive_from_token(self.token.kind) {
            self.advance()?;
            let rhs = self.parse_mul_expr()?;
            lhs = Expr::infix(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_mul_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_atom()?;
        while self.token.kind == TokenKind::Star {
            self.advance()?;
            let rhs = self.parse_atom()?;
            lhs = Expr::infix(InfixOp::Mul, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        match self.token.kind {
            TokenKind::Integer => {
                let token = self.advance()?;
                let value = token.text.parse::<i64>().map_err(|_| Error::IntegerOutOfRange {
                    text: token.text.clone(),
                    span: token.span,
                })?;
                Ok(Expr::Integer(value))
            }
            TokenKind::Boolean => {
                let token = self.advance()?;
                Ok(Expr::Boolean(token.text == "true"))
            }
            TokenKind::Identifier => {
                let token = self.advance()?;
                Ok(Expr::Identifier(token.text))
            }
            TokenKind::ParenLeft => {
                self.advance()?;
                let expr = self.parse_expr()?;
                self.expect(TokenKind::ParenRight)?;
                Ok(expr)
            }
            _ => Err(self.unexpected(Expected::Expression)),
        }
    }

    /// Moves to the next token and hands back the one just consumed.
    fn advance(&mut self) -> Result<Token> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.token, next))
    }

    fn expect(&mut self, kind: TokenKind) -> Result<()> {
        if self.token.kind != kind {
            return Err(self.unexpected(Expected::Token(kind)));
        }
        if kind != TokenKind::Eof {
            self.advance()?;
        }
        Ok(())
    }

    fn expect_identifier(&mut self) -> Result<String> {
        if self.token.kind != TokenKind::Identifier {
            return Err(self.unexpected(Expected::Token(TokenKind::Identifier)));
        }
        Ok(self.advance()?.text)
    }

    fn unexpected(&self, expected: Expected) -> Error {
        Error::UnexpectedToken {
            expected,
            found: self.token.kind,
            span: self.token.span,
        }
    }
}

pub fn parse(input: &str) -> Result<Expr> {
    Parser::new(input)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(value: i64) -> Expr {
        Expr::Integer(value)
    }

    fn var(name: &str) -> Expr {
        Expr::identifier(name)
    }

    #[test]
    fn subtraction_is_left_associative() {
        assert_eq!(
            parse("1 - 2 - 3").unwrap(),
            Expr::infix(
                InfixOp::Sub,
                Expr::infix(InfixOp::Sub, int(1), int(2)),
                int(3)
            )
        );
    }

    #[test]
    fn multiplication_binds_tighter() {
        assert_eq!(
            parse("1 + 2 * 3").unwrap(),
            Expr::infix(
                InfixOp::Add,
                int(1),
                Expr::infix(InfixOp::Mul, int(2), int(3))
            )
        );
        assert_eq!(
            parse("2 * 3 * 4 < 5").unwrap(),
            Expr::infix(
                InfixOp::Lt,
                Expr::infix(
                    InfixOp::Mul,
                    Expr::infix(InfixOp::Mul, int(2), int(3)),
                    int(4)
                ),
                int(5)
            )
        );
    }

    #[test]
    fn comparison_shares_the_additive_tier() {
        assert_eq!(
            parse("a < b + c = d").unwrap(),
            Expr::infix(
                InfixOp::Eq,
                Expr::infix(
                    InfixOp::Add,
                    Expr::infix(InfixOp::Lt, var("a"), var("b")),
                    var("c")
                ),
                var("d")
            )
        );
    }

    #[test]
    fn let_binding() {
        assert_eq!(
            parse("let x = 1 in x end").unwrap(),
            Expr::let_in("x", int(1), var("x"))
        );
    }

    #[test]
    fn let_function_binding() {
        assert_eq!(
            parse("let f x = x in f 1 end").unwrap(),
            Expr::let_fun("f", "x", var("x"), Expr::application(var("f"), int(1)))
        );
    }

    #[test]
    fn equal_inside_let_value_is_comparison() {
        assert_eq!(
            parse("let b = x = 1 in b end").unwrap(),
            Expr::let_in("b", Expr::infix(InfixOp::Eq, var("x"), int(1)), var("b"))
        );
    }

    #[test]
    fn application_chains_left() {
        assert_eq!(
            parse("f a b").unwrap(),
            Expr::application(Expr::application(var("f"), var("a")), var("b"))
        );
    }

    #[test]
    fn application_argument_is_an_additive_expression() {
        assert_eq!(
            parse("f a + b").unwrap(),
            Expr::application(var("f"), Expr::infix(InfixOp::Add, var("a"), var("b")))
        );
        assert_eq!(
            parse("1 1").unwrap(),
            Expr::application(int(1), int(1))
        );
    }

    #[test]
    fn conditional_and_parentheses() {
        assert_eq!(
            parse("if (x < 1) then true else f (x - 1)").unwrap(),
            Expr::condition(
                Expr::infix(InfixOp::Lt, var("x"), int(1)),
                Expr::Boolean(true),
                Expr::application(var("f"), Expr::infix(InfixOp::Sub, var("x"), int(1)))
            )
        );
    }

    #[test]
    fn nested_let_in_conditional_branches() {
        let expr = parse("if b then let x = 1 in x end else 0").unwrap();
        assert_eq!(
            expr,
            Expr::condition(var("b"), Expr::let_in("x", int(1), var("x")), int(0))
        );
    }

    #[test]
    fn unclosed_paren_expects_paren_right() {
        let err = parse("(1").unwrap_err();
        assert_eq!(
            err,
            Error::UnexpectedToken {
                expected: Expected::Token(TokenKind::ParenRight),
                found: TokenKind::Eof,
                span: err.span(),
            }
        );
        assert_eq!(err.position(), 2);
        assert!(err.at_end_of_input());
    }

    #[test]
    fn trailing_input_expects_eof() {
        let err = parse("1 )").unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedToken {
                expected: Expected::Token(TokenKind::Eof),
                found: TokenKind::ParenRight,
                ..
            }
        ));
        assert_eq!(err.position(), 2);
    }

    #[test]
    fn missing_operand_expects_expression() {
        let err = parse("1 +").unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedToken {
                expected: Expected::Expression,
                found: TokenKind::Eof,
                ..
            }
        ));
        assert_eq!(err.to_string(), "expected 'expression' but got 'EOF'");
    }

    #[test]
    fn let_requires_a_name() {
        let err = parse("let 1 = 2 in 3 end").unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedToken {
                expected: Expected::Token(TokenKind::Identifier),
                found: TokenKind::Integer,
                ..
            }
        ));
    }

    #[test]
    fn let_requires_end() {
        let err = parse("let x = 1 in x").unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedToken {
                expected: Expected::Token(TokenKind::End),
                ..
            }
        ));
    }

    #[test]
    fn assignment_symbol_is_not_an_expression() {
        let err = parse("x := 1").unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedToken {
                expected: Expected::Token(TokenKind::Eof),
                found: TokenKind::ColonEqual,
                ..
            }
        ));
    }

    #[test]
    fn lexer_errors_surface() {
        let err = parse("1 & 2").unwrap_err();
        assert!(matches!(err, Error::Lexer(lexer::Error::InvalidCharacter('&', _))));
        assert_eq!(err.position(), 2);
    }

    #[test]
    fn oversized_integer_is_rejected() {
        let err = parse("99999999999999999999").unwrap_err();
        assert!(matches!(err, Error::IntegerOutOfRange { .. }));
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let source = format!("{}1", "(".repeat(100_000));
        let err = parse(&source).unwrap_err();
        assert!(matches!(err, Error::TooDeep { .. }));
        assert_eq!(err.position(), MAX_DEPTH);

        let source = "let x = ".repeat(MAX_DEPTH + 1);
        assert!(matches!(parse(&source), Err(Error::TooDeep { .. })));
    }

    #[test]
    fn nesting_up_to_the_limit_parses() {
        let depth = MAX_DEPTH - 1;
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(parse(&source).unwrap(), int(1));
    }

    #[test]
    fn long_chains_do_not_nest_the_parser() {
        let source = format!("1{}", " + 1".repeat(100_000));
        let expr = parse(&source).unwrap();
        assert_eq!(expr.size(), 200_001);

        let source = format!("f{}", " a".repeat(100_000));
        let expr = parse(&source).unwrap();
        assert_eq!(expr.size(), 200_001);
    }

    #[test]
    fn non_ascii_identifier_continuation() {
        assert_eq!(
            parse("let café = 1 in café end").unwrap(),
            Expr::let_in("café", int(1), var("café"))
        );
    }

    #[test]
    fn empty_input_expects_expression() {
        assert!(matches!(
            parse("").unwrap_err(),
            Error::UnexpectedToken {
                expected: Expected::Expression,
                found: TokenKind::Eof,
                ..
            }
        ));
    }
}
