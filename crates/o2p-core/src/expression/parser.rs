//! Lexer and recursive-descent parser for update expressions.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use super::ast::{AttributeRef, SetAction, UpdateExpr};

/// Words that may not appear as bare attribute names.
///
/// This is the subset of the DynamoDB reserved word list that realistic
/// record attributes collide with; `#` placeholders sidestep it entirely.
const RESERVED_WORDS: &[&str] = &[
    "abort", "action", "all", "and", "as", "attribute", "between", "by", "case", "count", "create",
    "data", "date", "desc", "drop", "exists", "from", "group", "hash", "in", "index", "insert",
    "item", "key", "limit", "list", "name", "not", "null", "number", "or", "order", "range",
    "return", "select", "size", "status", "string", "table", "time", "timestamp", "to", "type",
    "update", "user", "value", "values", "where", "year",
];

/// Errors raised while parsing or evaluating an update expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpressionError {
    /// An unexpected token was encountered.
    #[error("Unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        /// What was expected.
        expected: String,
        /// What was found.
        found: String,
    },
    /// A bare attribute name collided with a reserved word.
    #[error("Attribute name is a reserved keyword; reserved keyword: {word}")]
    ReservedWord {
        /// The offending word as written.
        word: String,
    },
    /// A clause other than `SET` was used.
    #[error("Unsupported update clause: {clause}")]
    UnsupportedClause {
        /// The clause keyword.
        clause: String,
    },
    /// An expression attribute name placeholder could not be resolved.
    #[error("Unresolved expression attribute name: {name}")]
    UnresolvedName {
        /// The unresolved name reference.
        name: String,
    },
    /// An expression attribute value placeholder could not be resolved.
    #[error("Unresolved expression attribute value: {name}")]
    UnresolvedValue {
        /// The unresolved value reference.
        name: String,
    },
}

/// Lexer token.
#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// A plain identifier (attribute name).
    Identifier(String),
    /// An expression attribute name reference (`#name`).
    ExprAttrName(String),
    /// An expression attribute value reference (`:value`).
    ExprAttrValue(String),
    /// `=`
    Eq,
    /// `,`
    Comma,
    /// `SET`
    Set,
    /// `REMOVE`
    Remove,
    /// `ADD`
    Add,
    /// `DELETE`
    Delete,
    /// End of input.
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(s) => write!(f, "identifier '{s}'"),
            Self::ExprAttrName(s) | Self::ExprAttrValue(s) => f.write_str(s),
            Self::Eq => write!(f, "'='"),
            Self::Comma => write!(f, "','"),
            Self::Set => write!(f, "SET"),
            Self::Remove => write!(f, "REMOVE"),
            Self::Add => write!(f, "ADD"),
            Self::Delete => write!(f, "DELETE"),
            Self::Eof => write!(f, "EOF"),
        }
    }
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn tokenize(&mut self) -> Result<Vec<Token>, ExpressionError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            if tok == Token::Eof {
                tokens.push(Token::Eof);
                break;
            }
            tokens.push(tok);
        }
        Ok(tokens)
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(char::is_ascii_whitespace) {
            self.chars.next();
        }
    }

    fn next_token(&mut self) -> Result<Token, ExpressionError> {
        self.skip_whitespace();

        let Some(&ch) = self.chars.peek() else {
            return Ok(Token::Eof);
        };

        match ch {
            '#' => self.read_placeholder('#').map(Token::ExprAttrName),
            ':' => self.read_placeholder(':').map(Token::ExprAttrValue),
            '=' => {
                self.chars.next();
                Ok(Token::Eq)
            }
            ',' => {
                self.chars.next();
                Ok(Token::Comma)
            }
            c if is_ident_start(c) => Ok(self.read_identifier_or_keyword()),
            _ => Err(ExpressionError::UnexpectedToken {
                expected: "valid token".to_owned(),
                found: format!("'{ch}'"),
            }),
        }
    }

    /// Read `#name` or `:name`, keeping the sigil.
    fn read_placeholder(&mut self, sigil: char) -> Result<String, ExpressionError> {
        self.chars.next();
        let name = self.read_ident_chars();
        if name.is_empty() {
            return Err(ExpressionError::UnexpectedToken {
                expected: format!("placeholder name after '{sigil}'"),
                found: "empty".to_owned(),
            });
        }
        Ok(format!("{sigil}{name}"))
    }

    fn read_ident_chars(&mut self) -> String {
        let mut s = String::new();
        while let Some(&c) = self.chars.peek() {
            if is_ident_continue(c) {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        s
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let ident = self.read_ident_chars();
        match ident.to_ascii_lowercase().as_str() {
            "set" => Token::Set,
            "remove" => Token::Remove,
            "add" => Token::Add,
            "delete" => Token::Delete,
            _ => Token::Identifier(ident),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_reserved(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    RESERVED_WORDS.contains(&lower.as_str())
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<Token, ExpressionError> {
        let tok = self.advance();
        if std::mem::discriminant(&tok) == std::mem::discriminant(expected) {
            Ok(tok)
        } else {
            Err(ExpressionError::UnexpectedToken {
                expected: expected.to_string(),
                found: tok.to_string(),
            })
        }
    }

    fn at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn parse_update_expr(&mut self) -> Result<UpdateExpr, ExpressionError> {
        let mut update = UpdateExpr::default();

        while !self.at_end() {
            match self.advance() {
                Token::Set => self.parse_set_clause(&mut update.set_actions)?,
                tok @ (Token::Remove | Token::Add | Token::Delete) => {
                    return Err(ExpressionError::UnsupportedClause {
                        clause: tok.to_string(),
                    });
                }
                other => {
                    return Err(ExpressionError::UnexpectedToken {
                        expected: "SET".to_owned(),
                        found: other.to_string(),
                    });
                }
            }
        }

        Ok(update)
    }

    fn parse_set_clause(&mut self, actions: &mut Vec<SetAction>) -> Result<(), ExpressionError> {
        actions.push(self.parse_set_action()?);
        while matches!(self.peek(), Token::Comma) {
            self.advance();
            actions.push(self.parse_set_action()?);
        }
        Ok(())
    }

    fn parse_set_action(&mut self) -> Result<SetAction, ExpressionError> {
        let path = match self.advance() {
            Token::Identifier(word) if is_reserved(&word) => {
                return Err(ExpressionError::ReservedWord { word });
            }
            Token::Identifier(name) => AttributeRef::Name(name),
            Token::ExprAttrName(name) => AttributeRef::Placeholder(name),
            other => {
                return Err(ExpressionError::UnexpectedToken {
                    expected: "attribute name".to_owned(),
                    found: other.to_string(),
                });
            }
        };
        self.expect(&Token::Eq)?;
        match self.advance() {
            Token::ExprAttrValue(value) => Ok(SetAction { path, value }),
            other => Err(ExpressionError::UnexpectedToken {
                expected: "expression attribute value".to_owned(),
                found: other.to_string(),
            }),
        }
    }
}

/// Parse an update expression such as `SET #attr0 = :val0, #attr1 = :val1`.
///
/// # Errors
///
/// Returns `ExpressionError` if the expression is syntactically invalid, uses
/// a clause other than `SET`, or names a reserved word without a placeholder.
pub fn parse_update(input: &str) -> Result<UpdateExpr, ExpressionError> {
    let tokens = Lexer::new(input).tokenize()?;
    let mut parser = Parser::new(tokens);
    let update = parser.parse_update_expr()?;

    if update.set_actions.is_empty() {
        return Err(ExpressionError::UnexpectedToken {
            expected: "SET".to_owned(),
            found: "empty update expression".to_owned(),
        });
    }

    Ok(update)
}
