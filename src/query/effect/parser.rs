//! Recursive-descent parser for effect bodies.
//!
//! Grammar, informally:
//!
//! ```text
//! block      := line+                      (same indentation)
//! line       := if_stmt | for_stmt | simple (';' simple)*
//! if_stmt    := 'if' expr ':' suite ('elif' expr ':' suite)* ('else' ':' suite)?
//! for_stmt   := 'for' NAME 'in' 'range' '(' expr ')' ':' suite
//! suite      := simple (';' simple)*       (same line)
//!             | NEWLINE block               (deeper indentation)
//! simple     := 'END' | 'pass' | place assign_op expr | expr
//! expr       := or ; or := and ('or' and)* ; and := not ('and' not)*
//! not        := 'not' not | cmp ; cmp := sum (cmp_op sum)?
//! sum        := term (('+'|'-') term)* ; term := unary (('*'|'/'|'//'|'%') unary)*
//! unary      := '-' unary | atom
//! ```

use crate::board::Direction;
use crate::core::Value;
use crate::error::{QueryError, QueryResult};

use super::ast::{BinaryOp, Builtin, EffectProgram, Expr, Stmt, TargetRef, UnaryOp};
use super::lexer::{tokenize, Line, Token};

/// Deepest allowed nesting of expressions, and separately of blocks.
pub const MAX_NESTING_DEPTH: usize = 64;

fn syntax(line: usize, message: impl Into<String>) -> QueryError {
    QueryError::Syntax {
        line,
        message: message.into(),
    }
}

/// Cursor over the tokens of one line.
struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    line: usize,
    depth: usize,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a Line) -> Self {
        Self {
            tokens: &line.tokens,
            pos: 0,
            line: line.number,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_name(&mut self, name: &str) -> bool {
        if self.peek().is_some_and(|t| t.is_name(name)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> QueryError {
        syntax(self.line, message)
    }

    fn expect(&mut self, expected: &Token, what: &str) -> QueryResult<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn expect_ident(&mut self, what: &str) -> QueryResult<&'a str> {
        match self.peek() {
            Some(Token::Name(name)) => {
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    /// Run `parse` one nesting level deeper.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> QueryResult<T>) -> QueryResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error(format!(
                "expression nested deeper than {MAX_NESTING_DEPTH} levels"
            )));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn unexpected(&self, what: &str) -> QueryError {
        match self.peek() {
            Some(token) => self.error(format!("expected {what}, found `{}`", token.describe())),
            None => self.error(format!("expected {what}, found end of line")),
        }
    }
}

const RESERVED: &[&str] = &[
    "if", "elif", "else", "for", "in", "and", "or", "not", "pass", "END", "True", "False", "None",
];

struct Parser<'a> {
    lines: &'a [Line],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn parse_block(&mut self, indent: usize) -> QueryResult<Vec<Stmt>> {
        let lines = self.lines;
        let mut stmts = Vec::new();
        while let Some(line) = lines.get(self.pos) {
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(syntax(line.number, "unexpected indent"));
            }
            self.pos += 1;
            self.parse_line(line, &mut stmts)?;
        }
        Ok(stmts)
    }

    fn parse_line(&mut self, line: &'a Line, out: &mut Vec<Stmt>) -> QueryResult<()> {
        let mut cur = Cursor::new(line);
        match cur.peek() {
            Some(t) if t.is_name("if") => {
                cur.advance();
                out.push(self.parse_if(cur, line.indent)?);
                Ok(())
            }
            Some(t) if t.is_name("for") => {
                cur.advance();
                out.push(self.parse_for(cur, line.indent)?);
                Ok(())
            }
            Some(t) if t.is_name("elif") || t.is_name("else") => {
                Err(cur.error(format!("`{}` without a matching `if`", t.describe())))
            }
            _ => parse_simple_list(&mut cur, out),
        }
    }

    fn parse_suite(&mut self, mut cur: Cursor<'a>, indent: usize) -> QueryResult<Vec<Stmt>> {
        let mut body = Vec::new();
        if !cur.at_end() {
            parse_simple_list(&mut cur, &mut body)?;
            return Ok(body);
        }
        let next_indent = self.lines.get(self.pos).map(|next| next.indent);
        match next_indent {
            Some(_) if self.depth >= MAX_NESTING_DEPTH => Err(cur.error(format!(
                "blocks nested deeper than {MAX_NESTING_DEPTH} levels"
            ))),
            Some(deeper) if deeper > indent => {
                self.depth += 1;
                let body = self.parse_block(deeper);
                self.depth -= 1;
                body
            }
            _ => Err(cur.error("expected an indented block")),
        }
    }

    fn parse_if(&mut self, mut cur: Cursor<'a>, indent: usize) -> QueryResult<Stmt> {
        let cond = parse_expr(&mut cur)?;
        cur.expect(&Token::Colon, "`:` after if condition")?;
        let body = self.parse_suite(cur, indent)?;

        let mut branches = vec![(cond, body)];
        let mut otherwise = Vec::new();

        let lines = self.lines;
        while let Some(line) = lines.get(self.pos) {
            if line.indent != indent {
                break;
            }
            let mut cur = Cursor::new(line);
            if cur.eat_name("elif") {
                self.pos += 1;
                let cond = parse_expr(&mut cur)?;
                cur.expect(&Token::Colon, "`:` after elif condition")?;
                let body = self.parse_suite(cur, indent)?;
                branches.push((cond, body));
            } else if cur.eat_name("else") {
                self.pos += 1;
                cur.expect(&Token::Colon, "`:` after else")?;
                otherwise = self.parse_suite(cur, indent)?;
                break;
            } else {
                break;
            }
        }

        Ok(Stmt::If {
            branches,
            otherwise,
        })
    }

    fn parse_for(&mut self, mut cur: Cursor<'a>, indent: usize) -> QueryResult<Stmt> {
        let var = cur.expect_ident("loop variable")?;
        if RESERVED.contains(&var) {
            return Err(cur.error(format!("`{var}` cannot be a loop variable")));
        }
        if !cur.eat_name("in") {
            return Err(cur.unexpected("`in`"));
        }
        if !cur.eat_name("range") {
            return Err(cur.unexpected("`range`"));
        }
        cur.expect(&Token::LParen, "`(`")?;
        let count = parse_expr(&mut cur)?;
        cur.expect(&Token::RParen, "`)`")?;
        cur.expect(&Token::Colon, "`:` after for header")?;
        let body = self.parse_suite(cur, indent)?;
        Ok(Stmt::For {
            var: var.to_string(),
            count,
            body,
        })
    }
}

fn parse_simple_list(cur: &mut Cursor<'_>, out: &mut Vec<Stmt>) -> QueryResult<()> {
    loop {
        if let Some(stmt) = parse_simple(cur)? {
            out.push(stmt);
        }
        if cur.at_end() {
            return Ok(());
        }
        cur.expect(&Token::Semicolon, "`;` or end of line")?;
        if cur.at_end() {
            return Ok(());
        }
    }
}

fn parse_simple(cur: &mut Cursor<'_>) -> QueryResult<Option<Stmt>> {
    if cur.eat_name("END") {
        return Ok(Some(Stmt::EndPhase));
    }
    if cur.eat_name("pass") {
        return Ok(None);
    }

    let expr = parse_expr(cur)?;

    let compound = match cur.peek() {
        Some(Token::Assign) => None,
        Some(Token::PlusAssign) => Some(BinaryOp::Add),
        Some(Token::MinusAssign) => Some(BinaryOp::Sub),
        Some(Token::StarAssign) => Some(BinaryOp::Mul),
        _ => {
            return Ok(Some(match expr {
                Expr::CallMethod {
                    target: TargetRef::Board,
                    method,
                    args,
                } if method == "end_phase" && args.is_empty() => Stmt::EndPhase,
                other => Stmt::Eval(other),
            }));
        }
    };
    cur.advance();

    let rhs = parse_expr(cur)?;
    let value = match compound {
        Some(op) => Expr::binary(op, expr.clone(), rhs),
        None => rhs,
    };

    match expr {
        Expr::Local(name) => Ok(Some(Stmt::SetLocal { name, value })),
        Expr::GetAttr { target, attr } => Ok(Some(Stmt::SetAttr {
            target,
            attr,
            value,
        })),
        _ => Err(cur.error("left side of assignment must be a variable or attribute")),
    }
}

fn parse_expr(cur: &mut Cursor<'_>) -> QueryResult<Expr> {
    cur.nested(parse_or)
}

fn parse_or(cur: &mut Cursor<'_>) -> QueryResult<Expr> {
    let mut lhs = parse_and(cur)?;
    while cur.eat_name("or") {
        let rhs = parse_and(cur)?;
        lhs = Expr::binary(BinaryOp::Or, lhs, rhs);
    }
    Ok(lhs)
}

fn parse_and(cur: &mut Cursor<'_>) -> QueryResult<Expr> {
    let mut lhs = parse_not(cur)?;
    while cur.eat_name("and") {
        let rhs = parse_not(cur)?;
        lhs = Expr::binary(BinaryOp::And, lhs, rhs);
    }
    Ok(lhs)
}

fn parse_not(cur: &mut Cursor<'_>) -> QueryResult<Expr> {
    if cur.eat_name("not") {
        let operand = cur.nested(parse_not)?;
        return Ok(Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        });
    }
    parse_comparison(cur)
}

fn parse_comparison(cur: &mut Cursor<'_>) -> QueryResult<Expr> {
    let lhs = parse_sum(cur)?;
    let op = match cur.peek() {
        Some(Token::Eq) => BinaryOp::Eq,
        Some(Token::Ne) => BinaryOp::Ne,
        Some(Token::Lt) => BinaryOp::Lt,
        Some(Token::Le) => BinaryOp::Le,
        Some(Token::Gt) => BinaryOp::Gt,
        Some(Token::Ge) => BinaryOp::Ge,
        _ => return Ok(lhs),
    };
    cur.advance();
    let rhs = parse_sum(cur)?;
    Ok(Expr::binary(op, lhs, rhs))
}

fn parse_sum(cur: &mut Cursor<'_>) -> QueryResult<Expr> {
    let mut lhs = parse_term(cur)?;
    loop {
        let op = match cur.peek() {
            Some(Token::Plus) => BinaryOp::Add,
            Some(Token::Minus) => BinaryOp::Sub,
            _ => return Ok(lhs),
        };
        cur.advance();
        let rhs = parse_term(cur)?;
        lhs = Expr::binary(op, lhs, rhs);
    }
}

fn parse_term(cur: &mut Cursor<'_>) -> QueryResult<Expr> {
    let mut lhs = parse_unary(cur)?;
    loop {
        let op = match cur.peek() {
            Some(Token::Star) => BinaryOp::Mul,
            Some(Token::Slash) => BinaryOp::Div,
            Some(Token::SlashSlash) => BinaryOp::FloorDiv,
            Some(Token::Percent) => BinaryOp::Mod,
            _ => return Ok(lhs),
        };
        cur.advance();
        let rhs = parse_unary(cur)?;
        lhs = Expr::binary(op, lhs, rhs);
    }
}

fn parse_unary(cur: &mut Cursor<'_>) -> QueryResult<Expr> {
    if cur.eat(&Token::Minus) {
        let operand = cur.nested(parse_unary)?;
        return Ok(match operand {
            Expr::Literal(Value::Int(v)) => Expr::int(-v),
            other => Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(other),
            },
        });
    }
    parse_atom(cur)
}

fn parse_args(cur: &mut Cursor<'_>) -> QueryResult<Vec<Expr>> {
    let mut args = Vec::new();
    if cur.eat(&Token::RParen) {
        return Ok(args);
    }
    loop {
        args.push(parse_expr(cur)?);
        if cur.eat(&Token::RParen) {
            return Ok(args);
        }
        cur.expect(&Token::Comma, "`,` or `)`")?;
    }
}

fn parse_index(cur: &mut Cursor<'_>) -> QueryResult<Box<Expr>> {
    cur.expect(&Token::LBracket, "`[`")?;
    let index = parse_expr(cur)?;
    cur.expect(&Token::RBracket, "`]`")?;
    Ok(Box::new(index))
}

/// `.attr` or `.method(args)` after a target.
fn parse_member(cur: &mut Cursor<'_>, target: TargetRef) -> QueryResult<Expr> {
    cur.expect(&Token::Dot, "`.` after target")?;
    let name = cur.expect_ident("attribute or method name")?.to_string();
    if cur.eat(&Token::LParen) {
        let args = parse_args(cur)?;
        Ok(Expr::CallMethod {
            target,
            method: name,
            args,
        })
    } else {
        Ok(Expr::GetAttr { target, attr: name })
    }
}

fn parse_atom(cur: &mut Cursor<'_>) -> QueryResult<Expr> {
    let Some(token) = cur.advance() else {
        return Err(cur.error("expected an expression, found end of line"));
    };

    match token {
        Token::Int(v) => Ok(Expr::int(*v)),
        Token::Str(s) => Ok(Expr::Literal(Value::Text(s.clone()))),
        Token::LParen => {
            let first = parse_expr(cur)?;
            if cur.eat(&Token::Comma) {
                let second = parse_expr(cur)?;
                cur.expect(&Token::RParen, "`)` closing pair")?;
                Ok(Expr::Pair(Box::new(first), Box::new(second)))
            } else {
                cur.expect(&Token::RParen, "`)`")?;
                Ok(first)
            }
        }
        Token::Name(name) => parse_name(cur, name),
        other => Err(cur.error(format!("unexpected `{}`", other.describe()))),
    }
}

fn parse_name(cur: &mut Cursor<'_>, name: &str) -> QueryResult<Expr> {
    match name {
        "True" => return Ok(Expr::Literal(Value::Bool(true))),
        "False" => return Ok(Expr::Literal(Value::Bool(false))),
        "None" => return Ok(Expr::Literal(Value::None)),
        "BOARD" => {
            let is_pieces = cur.peek() == Some(&Token::Dot)
                && cur.peek_at(1).is_some_and(|t| t.is_name("pieces"))
                && cur.peek_at(2) == Some(&Token::LBracket);
            if is_pieces {
                cur.advance();
                cur.advance();
                let index = parse_index(cur)?;
                return parse_member(cur, TargetRef::Piece(index));
            }
            return parse_member(cur, TargetRef::Board);
        }
        "WINDOW" => return parse_member(cur, TargetRef::Window),
        "THIS" => return parse_member(cur, TargetRef::This),
        "PIECE" | "PEACE" => {
            let index = parse_index(cur)?;
            return parse_member(cur, TargetRef::Piece(index));
        }
        _ => {}
    }

    if let Some(direction) = Direction::from_keyword(name) {
        return Ok(Expr::Direction(direction));
    }

    if RESERVED.contains(&name) {
        return Err(cur.error(format!("unexpected keyword `{name}`")));
    }

    if cur.peek() == Some(&Token::LParen) {
        let Some(func) = Builtin::from_name(name) else {
            return Err(cur.error(format!("unknown function `{name}`")));
        };
        cur.advance();
        let args = parse_args(cur)?;
        return Ok(Expr::Builtin { func, args });
    }

    Ok(Expr::Local(name.to_string()))
}

/// Parse an effect body into a program.
///
/// # Errors
///
/// Returns [`QueryError::Syntax`] with the 1-based body line on any
/// lexical or grammatical error.
pub fn parse_program(body: &str) -> QueryResult<EffectProgram> {
    let lines = tokenize(body)?;
    let Some(first) = lines.first() else {
        return Ok(EffectProgram::empty());
    };
    let mut parser = Parser {
        lines: &lines,
        pos: 0,
        depth: 0,
    };
    let statements = parser.parse_block(first.indent)?;
    if let Some(line) = lines.get(parser.pos) {
        return Err(syntax(line.number, "unindent does not match any outer block"));
    }
    Ok(EffectProgram::new(statements))
}
