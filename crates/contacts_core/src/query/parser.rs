//! Recursive-descent parser for filter expressions.
//!
//! Precedence, lowest first: `OR`, `AND`, `NOT`, primary.

use super::lexer::{Token, TokenKind};
use super::predicate::{Comparison, Expr, TextField, TextMethod};
use super::{CompileError, MAX_NESTING_DEPTH, MAX_TERMS};

enum FieldRef {
    Id,
    Text(TextField),
}

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    terms: usize,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            terms: 0,
        }
    }

    /// Parses a complete expression; trailing tokens are an error.
    pub(crate) fn parse(mut self) -> Result<Expr, CompileError> {
        let expr = self.parse_or()?;
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            return Err(unexpected("end of input", token));
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<Expr, CompileError> {
        let mut terms = vec![self.parse_and()?];
        while self.peek().kind == TokenKind::Or {
            self.advance();
            terms.push(self.parse_and()?);
        }
        Ok(collapse(terms, Expr::Or))
    }

    fn parse_and(&mut self) -> Result<Expr, CompileError> {
        let mut terms = vec![self.parse_unary()?];
        while self.peek().kind == TokenKind::And {
            self.advance();
            terms.push(self.parse_unary()?);
        }
        Ok(collapse(terms, Expr::And))
    }

    fn parse_unary(&mut self) -> Result<Expr, CompileError> {
        if self.peek().kind == TokenKind::Not {
            self.advance();
            self.enter()?;
            let inner = self.parse_unary()?;
            self.depth -= 1;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, CompileError> {
        let token = self.advance();
        match &token.kind {
            TokenKind::LParen => {
                self.enter()?;
                let inner = self.parse_or()?;
                self.depth -= 1;
                self.expect(TokenKind::RParen, "`)`")?;
                Ok(inner)
            }
            TokenKind::Ident(name) => {
                self.terms += 1;
                if self.terms > MAX_TERMS {
                    return Err(CompileError::TooManyTerms { max: MAX_TERMS });
                }
                let field = resolve_field(name).ok_or_else(|| CompileError::UnknownField {
                    name: name.clone(),
                    offset: token.offset,
                })?;
                if self.peek().kind == TokenKind::Dot {
                    self.advance();
                    self.parse_method(field, token.offset)
                } else {
                    self.parse_comparison(field, token.offset)
                }
            }
            _ => Err(unexpected("field name, `(` or NOT", &token)),
        }
    }

    fn parse_comparison(&mut self, field: FieldRef, offset: usize) -> Result<Expr, CompileError> {
        let op_token = self.advance();
        let op = match op_token.kind {
            TokenKind::Eq => Comparison::Eq,
            TokenKind::Ne => Comparison::Ne,
            TokenKind::Lt => Comparison::Lt,
            TokenKind::Le => Comparison::Le,
            TokenKind::Gt => Comparison::Gt,
            TokenKind::Ge => Comparison::Ge,
            _ => return Err(unexpected("comparison operator or `.`", &op_token)),
        };

        let literal = self.advance();
        match (field, literal.kind) {
            (FieldRef::Id, TokenKind::Int(value)) => Ok(Expr::Id { op, value }),
            (FieldRef::Id, TokenKind::Str(_)) => Err(CompileError::TypeMismatch {
                field: "id",
                reason: "integer field cannot be compared with a string".to_string(),
                offset,
            }),
            (FieldRef::Text(field), TokenKind::Str(value)) => {
                if op.is_relational() {
                    return Err(CompileError::TypeMismatch {
                        field: field.name(),
                        reason: "string fields only support `==` and `!=`".to_string(),
                        offset,
                    });
                }
                Ok(Expr::Text { field, op, value })
            }
            (FieldRef::Text(field), TokenKind::Int(_)) => Err(CompileError::TypeMismatch {
                field: field.name(),
                reason: "string field cannot be compared with an integer".to_string(),
                offset,
            }),
            (_, kind) => Err(unexpected(
                "literal",
                &Token {
                    kind,
                    offset: literal.offset,
                },
            )),
        }
    }

    fn parse_method(&mut self, field: FieldRef, offset: usize) -> Result<Expr, CompileError> {
        let name_token = self.advance();
        let name = match &name_token.kind {
            TokenKind::Ident(name) => name.clone(),
            _ => return Err(unexpected("method name", &name_token)),
        };
        let method = match name.to_ascii_lowercase().as_str() {
            "contains" => TextMethod::Contains,
            "startswith" => TextMethod::StartsWith,
            "endswith" => TextMethod::EndsWith,
            _ => {
                return Err(CompileError::UnknownMethod {
                    name,
                    offset: name_token.offset,
                })
            }
        };
        let FieldRef::Text(field) = field else {
            return Err(CompileError::TypeMismatch {
                field: "id",
                reason: format!("`{name}` is only available on string fields"),
                offset,
            });
        };

        self.expect(TokenKind::LParen, "`(`")?;
        let argument = self.advance();
        let needle = match argument.kind {
            TokenKind::Str(needle) => needle,
            _ => {
                return Err(CompileError::TypeMismatch {
                    field: field.name(),
                    reason: format!("`{name}` expects a string argument"),
                    offset: argument.offset,
                })
            }
        };
        self.expect(TokenKind::RParen, "`)`")?;

        Ok(Expr::Method {
            field,
            method,
            needle,
        })
    }

    fn enter(&mut self) -> Result<(), CompileError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(CompileError::TooDeep {
                max: MAX_NESTING_DEPTH,
            });
        }
        Ok(())
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<(), CompileError> {
        let token = self.advance();
        if token.kind != kind {
            return Err(unexpected(expected, &token));
        }
        Ok(())
    }

    fn peek(&self) -> &Token {
        // tokenize() always terminates the stream with Eof.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }
}

fn collapse(mut terms: Vec<Expr>, combine: fn(Vec<Expr>) -> Expr) -> Expr {
    if terms.len() == 1 {
        terms.remove(0)
    } else {
        combine(terms)
    }
}

fn resolve_field(name: &str) -> Option<FieldRef> {
    let field = match name.to_ascii_lowercase().as_str() {
        "id" => return Some(FieldRef::Id),
        "firstname" => TextField::FirstName,
        "lastname" => TextField::LastName,
        "company" => TextField::Company,
        "email" => TextField::Email,
        "phonenumber" => TextField::PhoneNumber,
        "address" => TextField::Address,
        "note" => TextField::Note,
        _ => return None,
    };
    Some(FieldRef::Text(field))
}

fn unexpected(expected: &'static str, token: &Token) -> CompileError {
    CompileError::UnexpectedToken {
        expected,
        found: token.kind.describe(),
        offset: token.offset,
    }
}
