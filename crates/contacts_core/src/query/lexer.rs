//! Tokenizer for filter expressions.

use super::CompileError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident(String),
    Str(String),
    Int(i64),
    LParen,
    RParen,
    Dot,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
    Eof,
}

impl TokenKind {
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Ident(name) => format!("identifier `{name}`"),
            Self::Str(value) => format!("string \"{value}\""),
            Self::Int(value) => format!("integer {value}"),
            Self::LParen => "`(`".to_string(),
            Self::RParen => "`)`".to_string(),
            Self::Dot => "`.`".to_string(),
            Self::Eq => "`==`".to_string(),
            Self::Ne => "`!=`".to_string(),
            Self::Lt => "`<`".to_string(),
            Self::Le => "`<=`".to_string(),
            Self::Gt => "`>`".to_string(),
            Self::Ge => "`>=`".to_string(),
            Self::And => "`AND`".to_string(),
            Self::Or => "`OR`".to_string(),
            Self::Not => "`NOT`".to_string(),
            Self::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Splits `input` into tokens, always ending with `TokenKind::Eof`.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, CompileError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let kind = match ch {
            '(' => {
                chars.next();
                TokenKind::LParen
            }
            ')' => {
                chars.next();
                TokenKind::RParen
            }
            '.' => {
                chars.next();
                TokenKind::Dot
            }
            '=' => {
                chars.next();
                chars.next_if(|&(_, next)| next == '=');
                TokenKind::Eq
            }
            '!' => {
                chars.next();
                if chars.next_if(|&(_, next)| next == '=').is_some() {
                    TokenKind::Ne
                } else {
                    TokenKind::Not
                }
            }
            '<' => {
                chars.next();
                if chars.next_if(|&(_, next)| next == '=').is_some() {
                    TokenKind::Le
                } else if chars.next_if(|&(_, next)| next == '>').is_some() {
                    TokenKind::Ne
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                chars.next();
                if chars.next_if(|&(_, next)| next == '=').is_some() {
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '&' | '|' => {
                chars.next();
                if chars.next_if(|&(_, next)| next == ch).is_none() {
                    return Err(CompileError::UnexpectedChar { ch, offset });
                }
                if ch == '&' {
                    TokenKind::And
                } else {
                    TokenKind::Or
                }
            }
            '"' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        None => return Err(CompileError::UnterminatedString { offset }),
                        Some((_, '"')) => break,
                        Some((escape_offset, '\\')) => match chars.next() {
                            Some((_, '"')) => value.push('"'),
                            Some((_, '\\')) => value.push('\\'),
                            Some((_, 'n')) => value.push('\n'),
                            Some((_, 't')) => value.push('\t'),
                            Some((_, other)) => {
                                return Err(CompileError::InvalidEscape {
                                    ch: other,
                                    offset: escape_offset,
                                })
                            }
                            None => return Err(CompileError::UnterminatedString { offset }),
                        },
                        Some((_, other)) => value.push(other),
                    }
                }
                TokenKind::Str(value)
            }
            '-' | '0'..='9' => {
                let mut text = String::new();
                if ch == '-' {
                    text.push(ch);
                    chars.next();
                }
                while let Some((_, digit)) = chars.next_if(|&(_, next)| next.is_ascii_digit()) {
                    text.push(digit);
                }
                if chars.peek().is_some_and(|&(_, next)| is_ident_char(next)) {
                    return Err(CompileError::InvalidNumber { text, offset });
                }
                let value = text
                    .parse::<i64>()
                    .map_err(|_| CompileError::InvalidNumber {
                        text: text.clone(),
                        offset,
                    })?;
                TokenKind::Int(value)
            }
            c if is_ident_start(c) => {
                let mut name = String::new();
                while let Some((_, next)) = chars.next_if(|&(_, next)| is_ident_char(next)) {
                    name.push(next);
                }
                keyword_or_ident(name)
            }
            other => return Err(CompileError::UnexpectedChar { ch: other, offset }),
        };

        tokens.push(Token { kind, offset });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        offset: input.len(),
    });
    Ok(tokens)
}

fn keyword_or_ident(name: String) -> TokenKind {
    match name.to_ascii_lowercase().as_str() {
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        _ => TokenKind::Ident(name),
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::{tokenize, TokenKind};
    use crate::query::CompileError;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn operators_and_keywords() {
        assert_eq!(
            kinds("a<>b && !c || d <= 3 and not e"),
            vec![
                TokenKind::Ident("a".to_string()),
                TokenKind::Ne,
                TokenKind::Ident("b".to_string()),
                TokenKind::And,
                TokenKind::Not,
                TokenKind::Ident("c".to_string()),
                TokenKind::Or,
                TokenKind::Ident("d".to_string()),
                TokenKind::Le,
                TokenKind::Int(3),
                TokenKind::And,
                TokenKind::Not,
                TokenKind::Ident("e".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds(r#""say \"hi\"\\""#),
            vec![TokenKind::Str("say \"hi\"\\".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_string_is_rejected() {
        assert_eq!(
            tokenize("note == \"abc").unwrap_err(),
            CompileError::UnterminatedString { offset: 8 }
        );
    }

    #[test]
    fn single_ampersand_is_rejected() {
        assert!(matches!(
            tokenize("a & b").unwrap_err(),
            CompileError::UnexpectedChar { ch: '&', offset: 2 }
        ));
    }

    #[test]
    fn negative_and_overflowing_numbers() {
        assert_eq!(kinds("-12"), vec![TokenKind::Int(-12), TokenKind::Eof]);
        assert!(matches!(
            tokenize("99999999999999999999").unwrap_err(),
            CompileError::InvalidNumber { .. }
        ));
        assert!(matches!(
            tokenize("12abc").unwrap_err(),
            CompileError::InvalidNumber { .. }
        ));
    }
}
