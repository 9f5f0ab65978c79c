//! Effect program evaluation.
//!
//! Programs run against an [`EffectContext`]: mutable board, window and
//! phase memory plus read-only input. Every symbolic reference goes
//! through [`Scriptable`], so a bad name is an [`EvalError`], never a
//! panic.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::board::{BoardState, Scriptable, Window};
use crate::core::Value;
use crate::error::{EvalError, EvalResult};
use crate::input::InputSource;

use super::ast::{BinaryOp, Builtin, EffectProgram, Expr, Stmt, TargetRef, UnaryOp};

/// Everything an effect program can see while it runs.
pub struct EffectContext<'a> {
    /// `BOARD` and `PIECE[i]`.
    pub board: &'a mut BoardState,
    /// `WINDOW`.
    pub window: &'a mut Window,
    /// `THIS`.
    pub this: &'a mut dyn Scriptable,
    /// Input for `ticks()`, `mouse_x()` and `mouse_y()`.
    pub input: &'a dyn InputSource,
    /// Cap on a single `for` loop.
    pub max_loop_iterations: u32,
}

/// How a program finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Ran to the end.
    Continue,
    /// Hit `END` / `BOARD.end_phase()`.
    EndPhase,
}

/// Resolved target of an attribute access.
enum Host {
    Board,
    Window,
    This,
    Piece(i64),
}

struct Interpreter<'c, 'a> {
    ctx: &'c mut EffectContext<'a>,
    locals: FxHashMap<String, Value>,
}

impl Interpreter<'_, '_> {
    fn resolve(&mut self, target: &TargetRef) -> EvalResult<Host> {
        Ok(match target {
            TargetRef::Board => Host::Board,
            TargetRef::Window => Host::Window,
            TargetRef::This => Host::This,
            TargetRef::Piece(index) => {
                let value = self.eval(index)?;
                Host::Piece(expect_int(&value)?)
            }
        })
    }

    fn host(&mut self, host: &Host) -> EvalResult<&mut dyn Scriptable> {
        let host: &mut dyn Scriptable = match host {
            Host::Board => &mut *self.ctx.board,
            Host::Window => &mut *self.ctx.window,
            Host::This => &mut *self.ctx.this,
            Host::Piece(index) => self.ctx.board.piece_mut_checked(*index)?,
        };
        Ok(host)
    }

    fn run_block(&mut self, stmts: &[Stmt]) -> EvalResult<Flow> {
        for stmt in stmts {
            if self.run_stmt(stmt)? == Flow::EndPhase {
                return Ok(Flow::EndPhase);
            }
        }
        Ok(Flow::Continue)
    }

    fn run_stmt(&mut self, stmt: &Stmt) -> EvalResult<Flow> {
        match stmt {
            Stmt::SetAttr {
                target,
                attr,
                value,
            } => {
                let host = self.resolve(target)?;
                let value = self.eval(value)?;
                self.host(&host)?.set_attr(attr, value)?;
            }
            Stmt::SetLocal { name, value } => {
                let value = self.eval(value)?;
                self.locals.insert(name.clone(), value);
            }
            Stmt::Eval(expr) => {
                self.eval(expr)?;
            }
            Stmt::If {
                branches,
                otherwise,
            } => {
                for (cond, body) in branches {
                    if self.eval(cond)?.is_truthy() {
                        return self.run_block(body);
                    }
                }
                return self.run_block(otherwise);
            }
            Stmt::For { var, count, body } => {
                let count = expect_int(&self.eval(count)?)?;
                let limit = self.ctx.max_loop_iterations;
                if count > i64::from(limit) {
                    return Err(EvalError::LoopLimit {
                        requested: count,
                        limit,
                    });
                }
                for i in 0..count.max(0) {
                    self.locals.insert(var.clone(), Value::Int(i));
                    if self.run_block(body)? == Flow::EndPhase {
                        return Ok(Flow::EndPhase);
                    }
                }
            }
            Stmt::EndPhase => return Ok(Flow::EndPhase),
        }
        Ok(Flow::Continue)
    }

    fn eval_args(&mut self, args: &[Expr]) -> EvalResult<SmallVec<[Value; 4]>> {
        args.iter().map(|arg| self.eval(arg)).collect()
    }

    fn eval(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Local(name) => self
                .locals
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UndefinedVariable(name.clone())),
            Expr::Direction(direction) => Ok(direction.step().into()),
            Expr::Pair(a, b) => {
                let a = expect_int(&self.eval(a)?)?;
                let b = expect_int(&self.eval(b)?)?;
                Ok(Value::Pair(a, b))
            }
            Expr::GetAttr { target, attr } => {
                let host = self.resolve(target)?;
                self.host(&host)?.get_attr(attr)
            }
            Expr::CallMethod {
                target,
                method,
                args,
            } => {
                let host = self.resolve(target)?;
                let args = self.eval_args(args)?;
                self.host(&host)?.call_method(method, &args)
            }
            Expr::Builtin { func, args } => {
                let args = self.eval_args(args)?;
                self.call_builtin(*func, &args)
            }
            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                unary(*op, value)
            }
            Expr::Binary { op, lhs, rhs } => match op {
                BinaryOp::And => {
                    let lhs = self.eval(lhs)?;
                    if lhs.is_truthy() {
                        self.eval(rhs)
                    } else {
                        Ok(lhs)
                    }
                }
                BinaryOp::Or => {
                    let lhs = self.eval(lhs)?;
                    if lhs.is_truthy() {
                        Ok(lhs)
                    } else {
                        self.eval(rhs)
                    }
                }
                _ => {
                    let lhs = self.eval(lhs)?;
                    let rhs = self.eval(rhs)?;
                    binary(*op, &lhs, &rhs)
                }
            },
        }
    }

    fn call_builtin(&mut self, func: Builtin, args: &[Value]) -> EvalResult<Value> {
        let name = func.name();
        match func {
            Builtin::Rand => {
                arity(name, 2, args)?;
                let (lo, hi) = (expect_int(&args[0])?, expect_int(&args[1])?);
                Ok(Value::Int(self.ctx.board.rng.roll(lo, hi)))
            }
            Builtin::Abs => {
                arity(name, 1, args)?;
                expect_int(&args[0])?
                    .checked_abs()
                    .map(Value::Int)
                    .ok_or(EvalError::Overflow("abs"))
            }
            Builtin::Min | Builtin::Max => {
                if args.is_empty() {
                    return Err(EvalError::Arity {
                        name: name.to_string(),
                        expected: 1,
                        got: 0,
                    });
                }
                let ints = args.iter().map(expect_int).collect::<EvalResult<Vec<_>>>()?;
                let pick = if func == Builtin::Min {
                    ints.into_iter().min()
                } else {
                    ints.into_iter().max()
                };
                Ok(pick.map_or(Value::None, Value::Int))
            }
            Builtin::Ticks => {
                arity(name, 0, args)?;
                Ok(Value::Int(
                    i64::try_from(self.ctx.input.ticks()).unwrap_or(i64::MAX),
                ))
            }
            Builtin::MouseX => {
                arity(name, 0, args)?;
                Ok(Value::Int(self.ctx.input.mouse_position().0))
            }
            Builtin::MouseY => {
                arity(name, 0, args)?;
                Ok(Value::Int(self.ctx.input.mouse_position().1))
            }
        }
    }
}

fn arity(name: &str, expected: usize, args: &[Value]) -> EvalResult<()> {
    crate::board::host::check_arity(name, expected, args)
}

fn expect_int(value: &Value) -> EvalResult<i64> {
    crate::board::host::expect_int(value)
}

fn unary(op: UnaryOp, value: Value) -> EvalResult<Value> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
        UnaryOp::Neg => match value {
            Value::Int(v) => v.checked_neg().map(Value::Int).ok_or(EvalError::Overflow("-")),
            Value::Pair(a, b) => match (a.checked_neg(), b.checked_neg()) {
                (Some(a), Some(b)) => Ok(Value::Pair(a, b)),
                _ => Err(EvalError::Overflow("-")),
            },
            other => Err(EvalError::TypeMismatch {
                expected: "int or pair",
                got: other.type_name(),
            }),
        },
    }
}

fn floor_div(a: i64, b: i64) -> EvalResult<i64> {
    if b == 0 {
        return Err(EvalError::DivisionByZero);
    }
    let q = a.checked_div(b).ok_or(EvalError::Overflow("//"))?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

fn floor_mod(a: i64, b: i64) -> EvalResult<i64> {
    if b == 0 {
        return Err(EvalError::DivisionByZero);
    }
    let r = a.checked_rem(b).ok_or(EvalError::Overflow("%"))?;
    if r != 0 && ((r < 0) != (b < 0)) {
        Ok(r + b)
    } else {
        Ok(r)
    }
}

fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult<Value> {
    let symbol = op.symbol();
    let unsupported = || EvalError::UnsupportedOperands {
        op: symbol,
        lhs: lhs.type_name(),
        rhs: rhs.type_name(),
    };
    let overflow = || EvalError::Overflow(symbol);

    let value = match (op, lhs, rhs) {
        (BinaryOp::Eq, a, b) => Value::Bool(a == b),
        (BinaryOp::Ne, a, b) => Value::Bool(a != b),

        (BinaryOp::Add, Value::Int(a), Value::Int(b)) => {
            Value::Int(a.checked_add(*b).ok_or_else(overflow)?)
        }
        (BinaryOp::Add, Value::Pair(a0, a1), Value::Pair(b0, b1)) => Value::Pair(
            a0.checked_add(*b0).ok_or_else(overflow)?,
            a1.checked_add(*b1).ok_or_else(overflow)?,
        ),
        (BinaryOp::Add, Value::Text(a), Value::Text(b)) => Value::Text(format!("{a}{b}")),
        (BinaryOp::Sub, Value::Int(a), Value::Int(b)) => {
            Value::Int(a.checked_sub(*b).ok_or_else(overflow)?)
        }
        (BinaryOp::Sub, Value::Pair(a0, a1), Value::Pair(b0, b1)) => Value::Pair(
            a0.checked_sub(*b0).ok_or_else(overflow)?,
            a1.checked_sub(*b1).ok_or_else(overflow)?,
        ),
        (BinaryOp::Mul, Value::Int(a), Value::Int(b)) => {
            Value::Int(a.checked_mul(*b).ok_or_else(overflow)?)
        }
        (BinaryOp::Mul, Value::Pair(p0, p1), Value::Int(k))
        | (BinaryOp::Mul, Value::Int(k), Value::Pair(p0, p1)) => Value::Pair(
            p0.checked_mul(*k).ok_or_else(overflow)?,
            p1.checked_mul(*k).ok_or_else(overflow)?,
        ),
        (BinaryOp::Div | BinaryOp::FloorDiv, Value::Int(a), Value::Int(b)) => {
            Value::Int(floor_div(*a, *b)?)
        }
        (BinaryOp::Mod, Value::Int(a), Value::Int(b)) => Value::Int(floor_mod(*a, *b)?),

        (BinaryOp::Lt, Value::Int(a), Value::Int(b)) => Value::Bool(a < b),
        (BinaryOp::Le, Value::Int(a), Value::Int(b)) => Value::Bool(a <= b),
        (BinaryOp::Gt, Value::Int(a), Value::Int(b)) => Value::Bool(a > b),
        (BinaryOp::Ge, Value::Int(a), Value::Int(b)) => Value::Bool(a >= b),
        (BinaryOp::Lt, Value::Text(a), Value::Text(b)) => Value::Bool(a < b),
        (BinaryOp::Le, Value::Text(a), Value::Text(b)) => Value::Bool(a <= b),
        (BinaryOp::Gt, Value::Text(a), Value::Text(b)) => Value::Bool(a > b),
        (BinaryOp::Ge, Value::Text(a), Value::Text(b)) => Value::Bool(a >= b),

        _ => return Err(unsupported()),
    };
    Ok(value)
}

/// Run a program to completion or to `END`.
///
/// Assignments made before an error stay applied; there is no rollback.
///
/// # Errors
///
/// Returns the first [`EvalError`] raised by the program.
pub fn run_program(program: &EffectProgram, ctx: &mut EffectContext<'_>) -> EvalResult<Flow> {
    let mut interpreter = Interpreter {
        ctx,
        locals: FxHashMap::default(),
    };
    interpreter.run_block(&program.statements)
}
