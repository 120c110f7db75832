use silo_core::{DriverError, Error, Result};

/// Token stream over the SQL subset the engine executes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    /// Unquoted word: keyword or identifier.
    Word(String),
    /// Double-quoted identifier.
    Quoted(String),
    /// Single-quoted string literal.
    Str(String),
    Number(String),
    /// A `?` bind placeholder, numbered in order of appearance.
    Placeholder(usize),
    Symbol(&'static str),
}

impl Token {
    pub fn is_word(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        matches!(self, Token::Symbol(s) if *s == symbol)
    }
}

fn unexpected(text: &str, position: usize) -> Error {
    Error::new(DriverError::message(format!(
        "unexpected character at byte {} in `{}`",
        position, text
    )))
}

pub(crate) fn tokenize(sql: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let bytes = sql.as_bytes();
    let mut i = 0;
    let mut placeholders = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            ' ' | '\t' | '\r' | '\n' => i += 1,
            '?' => {
                tokens.push(Token::Placeholder(placeholders));
                placeholders += 1;
                i += 1;
            }
            '\'' | '"' => {
                let quote = bytes[i];
                let mut text = String::new();
                let mut j = i + 1;
                let mut start = j;
                loop {
                    let Some(&b) = bytes.get(j) else {
                        return Err(Error::new(DriverError::message(format!(
                            "unterminated quote in `{sql}`"
                        ))));
                    };
                    if b == quote {
                        text.push_str(&sql[start..j]);
                        // A doubled quote is an escaped quote character.
                        if bytes.get(j + 1) == Some(&quote) {
                            text.push(quote as char);
                            j += 2;
                            start = j;
                            continue;
                        }
                        break;
                    }
                    j += 1;
                }
                tokens.push(if quote == b'\'' {
                    Token::Str(text)
                } else {
                    Token::Quoted(text)
                });
                i = j + 1;
            }
            '0'..='9' => {
                let start = i;
                while i < bytes.len()
                    && matches!(bytes[i] as char, '0'..='9' | '.' | 'e' | 'E' | '+' | '-')
                {
                    // Stop before `+`/`-` that are operators, not exponents.
                    if matches!(bytes[i] as char, '+' | '-')
                        && !matches!(bytes[i - 1] as char, 'e' | 'E')
                    {
                        break;
                    }
                    i += 1;
                }
                tokens.push(Token::Number(sql[start..i].to_owned()));
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let start = i;
                while i < bytes.len()
                    && matches!(bytes[i] as char, 'a'..='z' | 'A'..='Z' | '0'..='9' | '_')
                {
                    i += 1;
                }
                tokens.push(Token::Word(sql[start..i].to_owned()));
            }
            '<' => {
                if bytes.get(i + 1) == Some(&b'>') {
                    tokens.push(Token::Symbol("<>"));
                    i += 2;
                } else if bytes.get(i + 1) == Some(&b'=') {
                    tokens.push(Token::Symbol("<="));
                    i += 2;
                } else {
                    tokens.push(Token::Symbol("<"));
                    i += 1;
                }
            }
            '>' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    tokens.push(Token::Symbol(">="));
                    i += 2;
                } else {
                    tokens.push(Token::Symbol(">"));
                    i += 1;
                }
            }
            '|' => {
                if bytes.get(i + 1) == Some(&b'|') {
                    tokens.push(Token::Symbol("||"));
                    i += 2;
                } else {
                    return Err(unexpected(sql, i));
                }
            }
            '!' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    tokens.push(Token::Symbol("<>"));
                    i += 2;
                } else {
                    return Err(unexpected(sql, i));
                }
            }
            '(' | ')' | ',' | '.' | ';' | '*' | '=' | '+' | '-' | '/' => {
                tokens.push(Token::Symbol(match c {
                    '(' => "(",
                    ')' => ")",
                    ',' => ",",
                    '.' => ".",
                    ';' => ";",
                    '*' => "*",
                    '=' => "=",
                    '+' => "+",
                    '-' => "-",
                    _ => "/",
                }));
                i += 1;
            }
            _ => return Err(unexpected(sql, i)),
        }
    }
    Ok(tokens)
}
