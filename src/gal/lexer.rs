//! Lexer for the equation files produced by pete
//!
//! The format is line oriented: a line starting without whitespace begins a
//! new command, `;` also ends a command. Lines starting with `;` are
//! comments, `/* */` comments may span lines, and the CUPL-style header
//! lines (Name, Device, ...) are skipped without tokenization because they
//! may contain characters no token matches.

use std::sync::LazyLock;

use regex::Regex;

use super::error::AsmError;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\t ]+").unwrap());
static KEYWORD_PIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?i)PIN[\t ]+").unwrap());
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[_A-Za-z][_A-Za-z0-9]*").unwrap());
static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(0|[1-9][0-9]*)").unwrap());
static NUMBER_BINARY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?i)'b'([01]+)").unwrap());
static OR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[|+#]").unwrap());
static AND: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[&*]").unwrap());
static NOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[!~/]").unwrap());
static EQUALS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^=").unwrap());
static DOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\.").unwrap());
static SEMICOLON: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^;").unwrap());

/// Header lines that are skipped without tokenization
const SKIPPED_HEADERS: [&str; 8] = [
    "device ", "partno ", "revision ", "date ", "designer ", "company ", "assembly ", "location ",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    KeywordPin,
    Identifier(String),
    Number(u64),
    Or,
    And,
    Not,
    Equals,
    Dot,
    EndCmd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

/// A short name for error messages.
pub fn kind_name(kind: &TokenKind) -> &'static str {
    match kind {
        TokenKind::KeywordPin => "PIN",
        TokenKind::Identifier(_) => "identifier",
        TokenKind::Number(_) => "number",
        TokenKind::Or => "or",
        TokenKind::And => "and",
        TokenKind::Not => "not",
        TokenKind::Equals => "equals",
        TokenKind::Dot => "dot",
        TokenKind::EndCmd => "end of command",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    /// Value of the `Name` header line, if present
    pub project_name: Option<String>,
}

pub fn tokenize(source: &str) -> Result<LexOutput, AsmError> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut project_name = None;
    let mut in_block_comment = false;
    let mut cmd_empty = true;
    let mut line_number = 0;

    for (i, raw) in source.lines().enumerate() {
        line_number = i + 1;

        if raw.starts_with(';') {
            continue;
        }

        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("name ") {
            let mut name = raw[5..].trim().to_string();
            if name.ends_with(';') {
                name.pop();
                name.truncate(name.trim_end().len());
            }
            project_name = Some(name);
            continue;
        }
        if SKIPPED_HEADERS.iter().any(|h| lower.starts_with(h)) {
            continue;
        }

        // Strip /* */ comments; they may span lines
        let mut stripped = raw.to_string();
        loop {
            if in_block_comment {
                match stripped.find("*/") {
                    Some(end) => {
                        stripped.replace_range(..end + 2, "");
                        in_block_comment = false;
                    }
                    None => {
                        stripped.clear();
                        break;
                    }
                }
            } else {
                match stripped.find("/*") {
                    Some(start) => match stripped[start + 2..].find("*/") {
                        Some(end) => {
                            stripped.replace_range(start..start + 2 + end + 2, "");
                        }
                        None => {
                            stripped.truncate(start);
                            in_block_comment = true;
                            break;
                        }
                    },
                    None => break,
                }
            }
        }
        let line = stripped.trim_end();

        if !line.is_empty() && !WHITESPACE.is_match(line) {
            // A line starting without whitespace begins a new command
            if !cmd_empty {
                tokens.push(Token {
                    kind: TokenKind::EndCmd,
                    line: line_number,
                });
            }
            cmd_empty = true;
        }

        let mut rest = line;
        while !rest.is_empty() {
            let (consumed, kind) = scan_token(rest, line_number)?;
            rest = &rest[consumed..];
            if let Some(kind) = kind {
                // A semicolon closes the command; anything else opens one
                cmd_empty = kind == TokenKind::EndCmd;
                tokens.push(Token {
                    kind,
                    line: line_number,
                });
            }
        }
    }

    if !cmd_empty {
        tokens.push(Token {
            kind: TokenKind::EndCmd,
            line: line_number,
        });
    }

    Ok(LexOutput {
        tokens,
        project_name,
    })
}

/// Match one token at the start of `rest`; whitespace consumes without
/// producing a token.
fn scan_token(rest: &str, line: usize) -> Result<(usize, Option<TokenKind>), AsmError> {
    if let Some(m) = WHITESPACE.find(rest) {
        return Ok((m.end(), None));
    }
    if let Some(m) = KEYWORD_PIN.find(rest) {
        return Ok((m.end(), Some(TokenKind::KeywordPin)));
    }
    if let Some(m) = IDENTIFIER.find(rest) {
        return Ok((
            m.end(),
            Some(TokenKind::Identifier(rest[..m.end()].to_string())),
        ));
    }
    if let Some(m) = NUMBER.find(rest) {
        let number = rest[..m.end()].parse().map_err(|_| AsmError::Syntax {
            line,
            expected: "number",
            found: rest[..m.end()].to_string(),
        })?;
        return Ok((m.end(), Some(TokenKind::Number(number))));
    }
    if let Some(caps) = NUMBER_BINARY.captures(rest) {
        let digits = caps.get(1).map_or("", |m| m.as_str());
        let number = u64::from_str_radix(digits, 2).map_err(|_| AsmError::Syntax {
            line,
            expected: "binary number",
            found: digits.to_string(),
        })?;
        let end = caps.get(0).map_or(0, |m| m.end());
        return Ok((end, Some(TokenKind::Number(number))));
    }
    if let Some(m) = OR.find(rest) {
        return Ok((m.end(), Some(TokenKind::Or)));
    }
    if let Some(m) = AND.find(rest) {
        return Ok((m.end(), Some(TokenKind::And)));
    }
    if let Some(m) = NOT.find(rest) {
        return Ok((m.end(), Some(TokenKind::Not)));
    }
    if let Some(m) = EQUALS.find(rest) {
        return Ok((m.end(), Some(TokenKind::Equals)));
    }
    if let Some(m) = DOT.find(rest) {
        return Ok((m.end(), Some(TokenKind::Dot)));
    }
    if let Some(m) = SEMICOLON.find(rest) {
        return Ok((m.end(), Some(TokenKind::EndCmd)));
    }

    Err(AsmError::InvalidCharacter {
        line,
        text: rest.to_string(),
    })
}
