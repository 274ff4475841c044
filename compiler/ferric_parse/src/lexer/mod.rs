//! Lexer built on `logos`.
//!
//! Whitespace and `//` comments are skipped. String literals are cooked
//! here: the token carries the text with `\n`, `\t`, `\\`, `\"` and `\0`
//! escapes already resolved.

use std::fmt;

use logos::Logos;

use crate::ParseError;

#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"([ \t\r\n\f]+|//[^\n]*)")]
pub enum Token {
    // === Keywords ===
    #[token("use")]
    Use,
    #[token("struct")]
    Struct,
    #[token("static")]
    Static,
    #[token("mut")]
    Mut,
    #[token("impl")]
    Impl,
    #[token("for")]
    For,
    #[token("type")]
    Type,
    #[token("fn")]
    Fn,
    #[token("let")]
    Let,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("return")]
    Return,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("println!")]
    Println,

    // === Symbols ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("::")]
    DoubleColon,
    #[token(":")]
    Colon,
    #[token("->")]
    Arrow,
    #[token(".")]
    Dot,
    #[token("=")]
    Eq,

    // === Operators ===
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("**")]
    StarStar,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("<")]
    Lt,

    // === Literals ===
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| cook_string(lex.slice()))]
    Str(String),

    // `self` and `void` lex as identifiers.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Use => "`use`",
            Token::Struct => "`struct`",
            Token::Static => "`static`",
            Token::Mut => "`mut`",
            Token::Impl => "`impl`",
            Token::For => "`for`",
            Token::Type => "`type`",
            Token::Fn => "`fn`",
            Token::Let => "`let`",
            Token::If => "`if`",
            Token::Else => "`else`",
            Token::While => "`while`",
            Token::Return => "`return`",
            Token::True => "`true`",
            Token::False => "`false`",
            Token::Println => "`println!`",
            Token::LParen => "`(`",
            Token::RParen => "`)`",
            Token::LBrace => "`{`",
            Token::RBrace => "`}`",
            Token::LBracket => "`[`",
            Token::RBracket => "`]`",
            Token::Comma => "`,`",
            Token::Semicolon => "`;`",
            Token::DoubleColon => "`::`",
            Token::Colon => "`:`",
            Token::Arrow => "`->`",
            Token::Dot => "`.`",
            Token::Eq => "`=`",
            Token::Plus => "`+`",
            Token::Minus => "`-`",
            Token::StarStar => "`**`",
            Token::Star => "`*`",
            Token::Slash => "`/`",
            Token::Lt => "`<`",
            Token::Int(n) => return write!(f, "integer `{n}`"),
            Token::Str(s) => return write!(f, "string {s:?}"),
            Token::Ident(name) => return write!(f, "identifier `{name}`"),
        };
        f.write_str(text)
    }
}

/// Strip the quotes of a string literal and resolve its escapes.
///
/// Unknown escapes are kept verbatim (backslash included).
fn cook_string(raw: &str) -> Option<String> {
    let body = raw.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            '0' => out.push('\0'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Some(out)
}

/// Tokenize a whole source file.
pub fn lex(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push(token),
            Err(()) => {
                return Err(ParseError::InvalidToken {
                    text: lexer.slice().to_string(),
                })
            }
        }
    }
    tracing::trace!(count = tokens.len(), "lexed");
    Ok(tokens)
}
