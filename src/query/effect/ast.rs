//! Effect program syntax tree.

use serde::{Deserialize, Serialize};

use crate::board::Direction;
use crate::core::Value;

/// The object an attribute access or method call is aimed at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRef {
    /// `BOARD`
    Board,
    /// `WINDOW`
    Window,
    /// `THIS`: the running phase's own attribute store.
    This,
    /// `PIECE[e]`, `PEACE[e]` or `BOARD.pieces[e]`.
    Piece(Box<Expr>),
}

impl TargetRef {
    /// Literal piece index, when the index expression is a constant.
    #[must_use]
    pub fn literal_piece_index(&self) -> Option<i64> {
        match self {
            TargetRef::Piece(index) => match index.as_ref() {
                Expr::Literal(Value::Int(i)) => Some(*i),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Built-in functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Builtin {
    /// `rand(lo, hi)`: inclusive random integer from the board RNG.
    Rand,
    /// `abs(x)`
    Abs,
    /// `min(a, b, ...)`
    Min,
    /// `max(a, b, ...)`
    Max,
    /// `ticks()`: elapsed ticks from the input source.
    Ticks,
    /// `mouse_x()`
    MouseX,
    /// `mouse_y()`
    MouseY,
}

impl Builtin {
    /// Look up a builtin by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rand" => Some(Self::Rand),
            "abs" => Some(Self::Abs),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "ticks" => Some(Self::Ticks),
            "mouse_x" => Some(Self::MouseX),
            "mouse_y" => Some(Self::MouseY),
            _ => None,
        }
    }

    /// Name as written in programs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rand => "rand",
            Self::Abs => "abs",
            Self::Min => "min",
            Self::Max => "max",
            Self::Ticks => "ticks",
            Self::MouseX => "mouse_x",
            Self::MouseY => "mouse_y",
        }
    }
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `not x`
    Not,
}

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// `/`, integer floor division like `//`.
    Div,
    FloorDiv,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Short-circuit `and`.
    And,
    /// Short-circuit `or`.
    Or,
}

impl BinaryOp {
    /// Operator as written.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::FloorDiv => "//",
            Self::Mod => "%",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Expressions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    /// Literal value.
    Literal(Value),
    /// Local variable.
    Local(String),
    /// `UP`, `DOWN`, `LEFT`, `RIGHT`.
    Direction(Direction),
    /// `(a, b)`
    Pair(Box<Expr>, Box<Expr>),
    /// `TARGET.attr`
    GetAttr { target: TargetRef, attr: String },
    /// `TARGET.method(args)`
    CallMethod {
        target: TargetRef,
        method: String,
        args: Vec<Expr>,
    },
    /// `builtin(args)`
    Builtin { func: Builtin, args: Vec<Expr> },
    /// Unary operation.
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Binary operation.
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Integer literal.
    #[must_use]
    pub fn int(value: i64) -> Self {
        Expr::Literal(Value::Int(value))
    }

    /// Binary operation helper.
    #[must_use]
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

/// Statements.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stmt {
    /// `TARGET.attr = value`
    SetAttr {
        target: TargetRef,
        attr: String,
        value: Expr,
    },
    /// `name = value`
    SetLocal { name: String, value: Expr },
    /// Expression evaluated for its side effects.
    Eval(Expr),
    /// `if` / `elif` / `else`.
    If {
        branches: Vec<(Expr, Vec<Stmt>)>,
        otherwise: Vec<Stmt>,
    },
    /// `for var in range(count):`
    For {
        var: String,
        count: Expr,
        body: Vec<Stmt>,
    },
    /// `END` or `BOARD.end_phase()`: stop and complete the phase.
    EndPhase,
}

/// A parsed effect body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectProgram {
    /// Top-level statements.
    pub statements: Vec<Stmt>,
}

impl EffectProgram {
    /// Wrap parsed statements.
    #[must_use]
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }

    /// A program that does nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// No statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Visit every expression, depth first, including nested ones.
    pub fn visit_exprs(&self, visit: &mut dyn FnMut(&Expr)) {
        for stmt in &self.statements {
            visit_stmt(stmt, visit);
        }
    }

    /// Visit every attribute assignment as `(target, attr)`, including
    /// nested ones.
    pub fn visit_assignments(&self, visit: &mut dyn FnMut(&TargetRef, &str)) {
        fn walk(stmts: &[Stmt], visit: &mut dyn FnMut(&TargetRef, &str)) {
            for stmt in stmts {
                match stmt {
                    Stmt::SetAttr { target, attr, .. } => visit(target, attr),
                    Stmt::If {
                        branches,
                        otherwise,
                    } => {
                        for (_, body) in branches {
                            walk(body, visit);
                        }
                        walk(otherwise, visit);
                    }
                    Stmt::For { body, .. } => walk(body, visit),
                    _ => {}
                }
            }
        }
        walk(&self.statements, visit);
    }
}

fn visit_target(target: &TargetRef, visit: &mut dyn FnMut(&Expr)) {
    if let TargetRef::Piece(index) = target {
        visit_expr(index, visit);
    }
}

fn visit_expr(expr: &Expr, visit: &mut dyn FnMut(&Expr)) {
    visit(expr);
    match expr {
        Expr::Literal(_) | Expr::Local(_) | Expr::Direction(_) => {}
        Expr::Pair(a, b) => {
            visit_expr(a, visit);
            visit_expr(b, visit);
        }
        Expr::GetAttr { target, .. } => visit_target(target, visit),
        Expr::CallMethod { target, args, .. } => {
            visit_target(target, visit);
            for arg in args {
                visit_expr(arg, visit);
            }
        }
        Expr::Builtin { args, .. } => {
            for arg in args {
                visit_expr(arg, visit);
            }
        }
        Expr::Unary { operand, .. } => visit_expr(operand, visit),
        Expr::Binary { lhs, rhs, .. } => {
            visit_expr(lhs, visit);
            visit_expr(rhs, visit);
        }
    }
}

fn visit_stmt(stmt: &Stmt, visit: &mut dyn FnMut(&Expr)) {
    match stmt {
        Stmt::SetAttr { target, value, .. } => {
            visit_target(target, visit);
            visit_expr(value, visit);
        }
        Stmt::SetLocal { value, .. } => visit_expr(value, visit),
        Stmt::Eval(expr) => visit_expr(expr, visit),
        Stmt::If {
            branches,
            otherwise,
        } => {
            for (cond, body) in branches {
                visit_expr(cond, visit);
                for s in body {
                    visit_stmt(s, visit);
                }
            }
            for s in otherwise {
                visit_stmt(s, visit);
            }
        }
        Stmt::For { count, body, .. } => {
            visit_expr(count, visit);
            for s in body {
                visit_stmt(s, visit);
            }
        }
        Stmt::EndPhase => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_piece_index() {
        assert_eq!(TargetRef::Piece(Box::new(Expr::int(3))).literal_piece_index(), Some(3));
        assert_eq!(
            TargetRef::Piece(Box::new(Expr::Local("i".into()))).literal_piece_index(),
            None
        );
        assert_eq!(TargetRef::Board.literal_piece_index(), None);
    }

    #[test]
    fn test_visit_reaches_nested_targets() {
        let program = EffectProgram::new(vec![Stmt::For {
            var: "i".into(),
            count: Expr::int(2),
            body: vec![Stmt::Eval(Expr::CallMethod {
                target: TargetRef::Piece(Box::new(Expr::int(7))),
                method: "move".into(),
                args: vec![Expr::Direction(Direction::Up)],
            })],
        }]);

        let mut indices = Vec::new();
        program.visit_exprs(&mut |expr| {
            if let Expr::CallMethod { target, .. } = expr {
                indices.extend(target.literal_piece_index());
            }
        });
        assert_eq!(indices, vec![7]);
    }

    #[test]
    fn test_visit_assignments() {
        let program = EffectProgram::new(vec![Stmt::If {
            branches: vec![(
                Expr::Literal(Value::Bool(true)),
                vec![Stmt::SetAttr {
                    target: TargetRef::Window,
                    attr: "score".into(),
                    value: Expr::int(1),
                }],
            )],
            otherwise: vec![],
        }]);

        let mut seen = Vec::new();
        program.visit_assignments(&mut |target, attr| seen.push((target.clone(), attr.to_string())));
        assert_eq!(seen, vec![(TargetRef::Window, "score".to_string())]);
    }

    #[test]
    fn test_operator_symbols() {
        assert_eq!(BinaryOp::FloorDiv.symbol(), "//");
        assert_eq!(Builtin::from_name("mouse_x"), Some(Builtin::MouseX));
        assert_eq!(Builtin::Rand.name(), "rand");
    }
}
