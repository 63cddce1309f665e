//! Mermaid flowchart rendering of an [`Expr`] tree.
//!
//! Nodes are numbered `N0, N1, ...` in pre-order. Each child subtree is
//! emitted in full before the edge that connects it to its parent, so the
//! output for a given tree is always the same.

use core::fmt;
use std::str::FromStr;

use crate::ast::{Expr, Role};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    TopDown,
    LeftRight,
    BottomTop,
    RightLeft,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::TopDown => write!(f, "TD"),
            Direction::LeftRight => write!(f, "LR"),
            Direction::BottomTop => write!(f, "BT"),
            Direction::RightLeft => write!(f, "RL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown graph direction '{0}', expected one of TD, LR, BT, RL")]
pub struct UnknownDirection(String);

impl FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TD" | "TB" => Ok(Direction::TopDown),
            "LR" => Ok(Direction::LeftRight),
            "BT" => Ok(Direction::BottomTop),
            "RL" => Ok(Direction::RightLeft),
            _ => Err(UnknownDirection(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderConfig {
    pub direction: Direction,
    /// Label operator operand edges with `L` / `R`.
    pub label_operands: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Constants: `(["..."])`
    Stadium,
    /// Variables and control forms: `("...")`
    Rounded,
    /// Operators: `["..."]`
    Rectangle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Node {
        id: usize,
        shape: Shape,
        label: String,
    },
    Edge {
        from: usize,
        to: usize,
        label: Option<&'static str>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    pub direction: Direction,
    pub statements: Vec<Statement>,
}

impl Graph {
    pub fn from_expr(expr: &Expr, config: &RenderConfig) -> Self {
        let mut statements = Vec::with_capacity(expr.size() * 2);
        visit(expr, config, &mut statements);
        Graph {
            direction: config.direction,
            statements,
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Statement> {
        self.statements
            .iter()
            .filter(|statement| matches!(statement, Statement::Node { .. }))
    }

    pub fn edges(&self) -> impl Iterator<Item = &Statement> {
        self.statements
            .iter()
            .filter(|statement| matches!(statement, Statement::Edge { .. }))
    }
}

enum Step<'e> {
    /// Visit a node, remembering the parent edge that leads to it.
    Visit(&'e Expr, Option<(usize, Role)>),
    Edge { from: usize, to: usize, role: Role },
}

/// Pre-order walk with an explicit stack. A node's incoming edge is pushed
/// beneath its children so it comes out after the whole subtree.
fn visit(root: &Expr, config: &RenderConfig, out: &mut Vec<Statement>) {
    let mut next = 0;
    let mut stack = vec![Step::Visit(root, None)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Visit(expr, parent) => {
                let id = next;
                next += 1;
                let (shape, label) = node_label(expr);
                out.push(Statement::Node { id, shape, label });
                if let Some((from, role)) = parent {
                    stack.push(Step::Edge { from, to: id, role });
                }
                for (role, child) in expr.children().into_iter().rev() {
                    stack.push(Step::Visit(child, Some((id, role))));
                }
            }
            Step::Edge { from, to, role } => {
                let label = (!role.is_operand() || config.label_operands).then(|| role.label());
                out.push(Statement::Edge { from, to, label });
            }
        }
    }
}

fn node_label(expr: &Expr) -> (Shape, String) {
    match expr {
        Expr::Integer(val) => (Shape::Stadium, val.to_string()),
        Expr::Boolean(true) => (Shape::Stadium, "True".to_string()),
        Expr::Boolean(false) => (Shape::Stadium, "False".to_string()),
        Expr::Identifier(name) => (Shape::Rounded, name.clone()),
        Expr::Infix { op, .. } => (Shape::Rectangle, op.to_string()),
        Expr::Condition { .. } => (Shape::Rounded, "if".to_string()),
        Expr::Let { name, .. } => (Shape::Rounded, format!("let {name}")),
        Expr::LetFun { name, .. } => (Shape::Rounded, format!("letfun {name}")),
        Expr::Application { .. } => (Shape::Rounded, "call".to_string()),
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Statement::Node { id, shape, label } => match shape {
                Shape::Stadium => write!(f, "  N{id}([\"{label}\"])"),
                Shape::Rounded => write!(f, "  N{id}(\"{label}\")"),
                Shape::Rectangle => write!(f, "  N{id}[\"{label}\"]"),
            },
            Statement::Edge {
                from,
                to,
                label: Some(label),
            } => write!(f, "  N{from} -->|{label}|N{to}"),
            Statement::Edge {
                from,
                to,
                label: None,
            } => write!(f, "  N{from} -->N{to}"),
        }
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "graph {}", self.direction)?;
        for statement in &self.statements {
            writeln!(f, "{statement}")?;
        }
        Ok(())
    }
}

pub fn render_with(expr: &Expr, config: &RenderConfig) -> String {
    Graph::from_expr(expr, config).to_string()
}

pub fn render(expr: &Expr) -> String {
    render_with(expr, &RenderConfig::default())
}
