use core::fmt;
use std::mem;

use crate::lexer::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Lt,
    Eq,
}

impl InfixOp {
    /// Operators of the additive tier. `*` is handled one level down.
    pub fn additive_from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(InfixOp::Add),
            TokenKind::Hyphen => Some(InfixOp::Sub),
            TokenKind::LessThan => Some(InfixOp::Lt),
            TokenKind::Equal => Some(InfixOp::Eq),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Lt => "<",
            InfixOp::Eq => "=",
        }
    }
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Syntactic role of a child expression under its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Cond,
    Then,
    Else,
    Rhs,
    Body,
    FunBody,
    LetBody,
    Fun,
    Arg,
    Lhs,
    RhsOperand,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Cond => "cond",
            Role::Then => "then",
            Role::Else => "else",
            Role::Rhs => "rhs",
            Role::Body => "body",
            Role::FunBody => "fBody",
            Role::LetBody => "letBody",
            Role::Fun => "fun",
            Role::Arg => "arg",
            Role::Lhs => "L",
            Role::RhsOperand => "R",
        }
    }

    pub fn is_operand(self) -> bool {
        matches!(self, Role::Lhs | Role::RhsOperand)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Integer(i64),
    Boolean(bool),
    Identifier(String),
    Infix {
        op: InfixOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Condition {
        cond: Box<Expr>,
        then: Box<Expr>,
        alt: Box<Expr>,
    },
    Let {
        name: String,
        value: Box<Expr>,
        body: Box<Expr>,
    },
    LetFun {
        name: String,
        param: String,
        body: Box<Expr>,
        let_body: Box<Expr>,
    },
    Application {
        func: Box<Expr>,
        arg: Box<Expr>,
    },
}

impl Expr {
    pub fn identifier(name: impl Into<String>) -> Self {
        Expr::Identifier(name.into())
    }

    pub fn infix(op: InfixOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Infix {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn condition(cond: Expr, then: Expr, alt: Expr) -> Self {
        Expr::Condition {
            cond: Box::new(cond),
            then: Box::new(then),
            alt: Box::new(alt),
        }
    }

    pub fn let_in(name: impl Into<String>, value: Expr, body: Expr) -> Self {
        Expr::Let {
            name: name.into(),
            value: Box::new(value),
            body: Box::new(body),
        }
    }

    pub fn let_fun(
        name: impl Into<String>,
        param: impl Into<String>,
        body: Expr,
        let_body: Expr,
    ) -> Self {
        Expr::LetFun {
            name: name.into(),
            param: param.into(),
            body: Box::new(body),
            let_body: Box::new(let_body),
        }
    }

    pub fn application(func: Expr, arg: Expr) -> Self {
        Expr::Application {
            func: Box::new(func),
            arg: Box::new(arg),
        }
    }

    /// Direct children in source order, tagged with their role.
    pub fn children(&self) -> Vec<(Role, &Expr)> {
        match self {
            Expr::Integer(_) | Expr::Boolean(_) | Expr::Identifier(_) => Vec::new(),
            Expr::Infix { lhs, rhs, .. } => vec![(Role::Lhs, &**lhs), (Role::RhsOperand, &**rhs)],
            Expr::Condition { cond, then, alt } => {
                vec![(Role::Cond, &**cond), (Role::Then, &**then), (Role::Else, &**alt)]
            }
            Expr::Let { value, body, .. } => vec![(Role::Rhs, &**value), (Role::Body, &**body)],
            Expr::LetFun { body, let_body, .. } => {
                vec![(Role::FunBody, &**body), (Role::LetBody, &**let_body)]
            }
            Expr::Application { func, arg } => vec![(Role::Fun, &**func), (Role::Arg, &**arg)],
        }
    }

    /// Number of nodes in the tree, this one included.
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            count += 1;
            stack.extend(expr.children().into_iter().map(|(_, child)| child));
        }
        count
    }

    /// Moves the children out, leaving leaves in their place.
    fn take_children(&mut self, out: &mut Vec<Expr>) {
        let mut take = |child: &mut Box<Expr>| out.push(mem::replace(&mut **child, Expr::Integer(0)));
        match self {
            Expr::Integer(_) | Expr::Boolean(_) | Expr::Identifier(_) => {}
            Expr::Infix { lhs, rhs, .. } => {
                take(lhs);
                take(rhs);
            }
            Expr::Condition { cond, then, alt } => {
                take(cond);
                take(then);
                take(alt);
            }
            Expr::Let { value, body, .. } => {
                take(value);
                take(body);
            }
            Expr::LetFun { body, let_body, .. } => {
                take(body);
                take(let_body);
            }
            Expr::Application { func, arg } => {
                take(func);
                take(arg);
            }
        }
    }

    fn is_leaf(&self) -> bool {
        matches!(
            self,
            Expr::Integer(_) | Expr::Boolean(_) | Expr::Identifier(_)
        )
    }
}

/// Long operator and application chains nest as deep as they are long, so
/// teardown walks the tree with an explicit stack.
impl Drop for Expr {
    fn drop(&mut self) {
        if self.is_leaf() {
            return;
        }
        let mut stack = Vec::new();
        self.take_children(&mut stack);
        while let Some(mut expr) = stack.pop() {
            expr.take_children(&mut stack);
        }
    }
}

enum Piece<'e> {
    Node(&'e Expr),
    Text(&'e str),
}

/// Fully parenthesized source text; parsing it yields the same tree.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Piece::{Node, Text};

        let mut stack = vec![Node(self)];
        while let Some(piece) = stack.pop() {
            let expr = match piece {
                Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
                Node(expr) => expr,
            };
            let pieces = match expr {
                Expr::Integer(val) => {
                    write!(f, "{val}")?;
                    continue;
                }
                Expr::Boolean(val) => {
                    write!(f, "{val}")?;
                    continue;
                }
                Expr::Identifier(id) => {
                    f.write_str(id)?;
                    continue;
                }
                Expr::Infix { op, lhs, rhs } => vec![
                    Text("("),
                    Node(&**lhs),
                    Text(" "),
                    Text(op.symbol()),
                    Text(" "),
                    Node(&**rhs),
                    Text(")"),
                ],
                Expr::Condition { cond, then, alt } => vec![
                    Text("(if "),
                    Node(&**cond),
                    Text(" then "),
                    Node(&**then),
                    Text(" else "),
                    Node(&**alt),
                    Text(")"),
                ],
                Expr::Let { name, value, body } => vec![
                    Text("(let "),
                    Text(name.as_str()),
                    Text(" = "),
                    Node(&**value),
                    Text(" in "),
                    Node(&**body),
                    Text(" end)"),
                ],
                Expr::LetFun {
                    name,
                    param,
                    body,
                    let_body,
                } => vec![
                    Text("(let "),
                    Text(name.as_str()),
                    Text(" "),
                    Text(param.as_str()),
                    Text(" = "),
                    Node(&**body),
                    Text(" in "),
                    Node(&**let_body),
                    Text(" end)"),
                ],
                Expr::Application { func, arg } => vec![
                    Text("("),
                    Node(&**func),
                    Text(" "),
                    Node(&**arg),
                    Text(")"),
                ],
            };
            stack.extend(pieces.into_iter().rev());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parenthesizes_compound_nodes() {
        let expr = Expr::let_fun(
            "f",
            "x",
            Expr::infix(InfixOp::Mul, Expr::identifier("x"), Expr::Integer(2)),
            Expr::application(Expr::identifier("f"), Expr::Boolean(true)),
        );
        assert_eq!(expr.to_string(), "(let f x = (x * 2) in (f true) end)");
    }

    #[test]
    fn children_follow_source_order() {
        let expr = Expr::condition(Expr::Boolean(true), Expr::Integer(1), Expr::Integer(2));
        let roles: Vec<_> = expr.children().into_iter().map(|(role, _)| role).collect();
        assert_eq!(roles, vec![Role::Cond, Role::Then, Role::Else]);
    }

    #[test]
    fn size_counts_every_node() {
        let expr = Expr::let_in(
            "x",
            Expr::infix(InfixOp::Add, Expr::Integer(1), Expr::Integer(2)),
            Expr::identifier("x"),
        );
        assert_eq!(expr.size(), 5);
        assert_eq!(Expr::Integer(0).size(), 1);
    }

    #[test]
    fn long_left_chain_prints_and_drops() {
        let mut expr = Expr::Integer(0);
        for _ in 0..100_000 {
            expr = Expr::infix(InfixOp::Add, expr, Expr::Integer(1));
        }
        assert_eq!(expr.size(), 200_001);

        let text = expr.to_string();
        assert!(text.starts_with("(((("));
        assert!(text.ends_with(" + 1) + 1)"));
        drop(expr);
    }

    #[test]
    fn clone_keeps_the_original_intact() {
        let expr = Expr::application(Expr::identifier("f"), Expr::Integer(1));
        let copy = expr.clone();
        drop(copy);
        assert_eq!(expr.to_string(), "(f 1)");
    }
}
