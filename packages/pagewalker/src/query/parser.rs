//! Parser for structural query strings.

use super::ast::{Axis, Expr, NodeTest, Operand, Query};
use crate::error::{BrowserError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Name(String),
    Literal(String),
    DoubleColon,
    LeftBracket,
    RightBracket,
    LeftParen,
    RightParen,
    Equals,
    At,
    Star,
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn tokenize(input: &str) -> std::result::Result<Vec<Token>, String> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '[' => {
                tokens.push(Token::LeftBracket);
                i += 1;
            }
            ']' => {
                tokens.push(Token::RightBracket);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LeftParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RightParen);
                i += 1;
            }
            '=' => {
                tokens.push(Token::Equals);
                i += 1;
            }
            '@' => {
                tokens.push(Token::At);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            ':' if chars.get(i + 1) == Some(&':') => {
                tokens.push(Token::DoubleColon);
                i += 2;
            }
            '\'' => {
                let mut literal = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err("unterminated string literal".to_string()),
                        Some('\'') if chars.get(i + 1) == Some(&'\'') => {
                            literal.push('\'');
                            i += 2;
                        }
                        Some('\'') => {
                            i += 1;
                            break;
                        }
                        Some(other) => {
                            literal.push(*other);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Literal(literal));
            }
            c if is_name_start(c) => {
                let start = i;
                while i < chars.len() {
                    let current = chars[i];
                    // A single colon joins a prefixed name; `::` ends it.
                    let prefixed = current == ':'
                        && chars.get(i + 1).is_some_and(|next| is_name_start(*next));
                    if is_name_char(current) || prefixed {
                        i += 1;
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Name(chars[start..i].iter().collect()));
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    position: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>) -> BrowserError {
        BrowserError::InvalidQuery {
            query: self.input.to_string(),
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        match self.next() {
            Some(ref token) if token == expected => Ok(()),
            Some(token) => Err(self.error(format!("expected {expected:?}, found {token:?}"))),
            None => Err(self.error(format!("expected {expected:?}, found end of query"))),
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Name(name)) if name == keyword)
    }

    fn query(&mut self) -> Result<Query> {
        let axis = match self.next() {
            Some(Token::Name(name)) if name == "descendant" => Axis::Descendant,
            Some(Token::Name(name)) if name == "ancestor" => Axis::Ancestor,
            _ => return Err(self.error("query must start with 'descendant::' or 'ancestor::'")),
        };
        self.expect(&Token::DoubleColon)?;

        let test = match self.next() {
            Some(Token::Star) => NodeTest::Any,
            Some(Token::Name(name)) => NodeTest::Name(name.to_ascii_lowercase()),
            _ => return Err(self.error("expected a tag name or '*'")),
        };

        let mut predicates = Vec::new();
        while self.peek() == Some(&Token::LeftBracket) {
            self.next();
            predicates.push(self.or_expr()?);
            self.expect(&Token::RightBracket)?;
        }

        if let Some(token) = self.peek() {
            return Err(self.error(format!("unexpected trailing {token:?}")));
        }

        Ok(Query {
            axis,
            test,
            predicates,
        })
    }

    fn or_expr(&mut self) -> Result<Expr> {
        let mut items = vec![self.and_expr()?];
        while self.peek_keyword("or") {
            self.next();
            items.push(self.and_expr()?);
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            Expr::Or(items)
        })
    }

    fn and_expr(&mut self) -> Result<Expr> {
        let mut items = vec![self.primary()?];
        while self.peek_keyword("and") {
            self.next();
            items.push(self.primary()?);
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            Expr::And(items)
        })
    }

    fn primary(&mut self) -> Result<Expr> {
        if self.peek() == Some(&Token::LeftParen) {
            self.next();
            let inner = self.or_expr()?;
            self.expect(&Token::RightParen)?;
            return Ok(inner);
        }

        let operand = self.operand()?;
        if self.peek() != Some(&Token::Equals) {
            return Ok(Expr::Exists(operand));
        }
        self.next();
        match self.next() {
            Some(Token::Literal(literal)) => Ok(Expr::Equals(operand, literal)),
            _ => Err(self.error("expected a quoted literal after '='")),
        }
    }

    fn operand(&mut self) -> Result<Operand> {
        match self.next() {
            Some(Token::At) => match self.next() {
                Some(Token::Name(name)) => Ok(Operand::Attribute(name.to_ascii_lowercase())),
                _ => Err(self.error("expected an attribute name after '@'")),
            },
            Some(Token::Name(name)) => {
                self.expect(&Token::LeftParen)?;
                let operand = match name.as_str() {
                    "text" => Operand::Text,
                    "local-name" => Operand::LocalName,
                    "lower-case" => Operand::LowerCase(Box::new(self.operand()?)),
                    other => return Err(self.error(format!("unknown function '{other}()'"))),
                };
                self.expect(&Token::RightParen)?;
                Ok(operand)
            }
            _ => Err(self.error("expected '@name', 'text()', 'local-name()' or 'lower-case(...)'")),
        }
    }
}

/// Parse a structural query string.
///
/// # Examples
/// ```
/// use pagewalker::query::{parse_query, Axis};
///
/// let query = parse_query("descendant::input[lower-case(@name)='q']").unwrap();
/// assert_eq!(query.axis, Axis::Descendant);
/// assert_eq!(query.to_string(), "descendant::input[lower-case(@name)='q']");
/// ```
pub fn parse_query(input: &str) -> Result<Query> {
    let tokens = tokenize(input).map_err(|message| BrowserError::InvalidQuery {
        query: input.to_string(),
        message,
    })?;
    Parser {
        input,
        tokens,
        position: 0,
    }
    .query()
}
