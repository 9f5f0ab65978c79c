//! Line-oriented tokenizer for effect bodies.
//!
//! Each non-blank physical line becomes a [`Line`] carrying its
//! indentation width and tokens. Blocks are recovered from indentation by
//! the parser. `#` starts a comment outside string literals.

use crate::error::{QueryError, QueryResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Token {
    Int(i64),
    Str(String),
    Name(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Colon,
    Semicolon,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    SlashSlash,
    Percent,
}

impl Token {
    pub(crate) fn is_name(&self, name: &str) -> bool {
        matches!(self, Token::Name(n) if n == name)
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Int(v) => v.to_string(),
            Token::Str(s) => format!("{s:?}"),
            Token::Name(n) => n.clone(),
            other => format!("{other:?}"),
        }
    }
}

/// One logical line of the effect body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Line {
    /// 1-based line number within the body.
    pub number: usize,
    /// Leading whitespace width (tabs count as 4).
    pub indent: usize,
    pub tokens: Vec<Token>,
}

fn syntax(line: usize, message: impl Into<String>) -> QueryError {
    QueryError::Syntax {
        line,
        message: message.into(),
    }
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

fn tokenize_line(text: &str, number: usize) -> QueryResult<Vec<Token>> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c == '#' {
            break;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let digits: String = chars[start..i].iter().collect();
            let value = digits
                .parse::<i64>()
                .map_err(|_| syntax(number, format!("integer literal {digits} is too large")))?;
            tokens.push(Token::Int(value));
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Name(chars[start..i].iter().collect()));
            continue;
        }

        if c == '"' || c == '\'' {
            let quote = c;
            let mut text = String::new();
            i += 1;
            loop {
                match chars.get(i) {
                    None => return Err(syntax(number, "unterminated string literal")),
                    Some(&ch) if ch == quote => {
                        i += 1;
                        break;
                    }
                    Some('\\') => {
                        match chars.get(i + 1) {
                            Some('n') => text.push('\n'),
                            Some('t') => text.push('\t'),
                            Some(&other) => text.push(other),
                            None => return Err(syntax(number, "unterminated string literal")),
                        }
                        i += 2;
                    }
                    Some(&ch) => {
                        text.push(ch);
                        i += 1;
                    }
                }
            }
            tokens.push(Token::Str(text));
            continue;
        }

        let (token, width) = match (c, next) {
            ('=', Some('=')) => (Token::Eq, 2),
            ('!', Some('=')) => (Token::Ne, 2),
            ('<', Some('=')) => (Token::Le, 2),
            ('>', Some('=')) => (Token::Ge, 2),
            ('+', Some('=')) => (Token::PlusAssign, 2),
            ('-', Some('=')) => (Token::MinusAssign, 2),
            ('*', Some('=')) => (Token::StarAssign, 2),
            ('/', Some('/')) => (Token::SlashSlash, 2),
            ('=', _) => (Token::Assign, 1),
            ('<', _) => (Token::Lt, 1),
            ('>', _) => (Token::Gt, 1),
            ('+', _) => (Token::Plus, 1),
            ('-', _) => (Token::Minus, 1),
            ('*', _) => (Token::Star, 1),
            ('/', _) => (Token::Slash, 1),
            ('%', _) => (Token::Percent, 1),
            ('(', _) => (Token::LParen, 1),
            (')', _) => (Token::RParen, 1),
            ('[', _) => (Token::LBracket, 1),
            (']', _) => (Token::RBracket, 1),
            (',', _) => (Token::Comma, 1),
            ('.', _) => (Token::Dot, 1),
            (':', _) => (Token::Colon, 1),
            (';', _) => (Token::Semicolon, 1),
            _ => return Err(syntax(number, format!("unexpected character {c:?}"))),
        };
        tokens.push(token);
        i += width;
    }

    Ok(tokens)
}

/// Tokenize an effect body into non-empty lines.
pub(crate) fn tokenize(body: &str) -> QueryResult<Vec<Line>> {
    let mut lines = Vec::new();
    for (offset, raw) in body.lines().enumerate() {
        let number = offset + 1;
        let tokens = tokenize_line(raw, number)?;
        if tokens.is_empty() {
            continue;
        }
        lines.push(Line {
            number,
            indent: indent_width(raw),
            tokens,
        });
    }
    Ok(lines)
}
