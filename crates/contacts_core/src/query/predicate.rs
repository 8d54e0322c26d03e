//! Compiled filter predicates.
//!
//! # Responsibility
//! - Hold the typed expression tree produced by the parser.
//! - Evaluate it against a record in memory.
//! - Render it as a parameterised SQL fragment for storage pushdown.
//!
//! # Invariants
//! - Both evaluation paths agree for every record: comparisons are
//!   case-sensitive and containment works on characters.
//! - SQL output only contains whitelisted column names; every literal is a
//!   bound parameter.

use crate::model::contact::{ContactEntity, ContactId};

/// String-valued record field usable in filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    FirstName,
    LastName,
    Company,
    Email,
    PhoneNumber,
    Address,
    Note,
}

impl TextField {
    pub fn name(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Company => "company",
            Self::Email => "email",
            Self::PhoneNumber => "phoneNumber",
            Self::Address => "address",
            Self::Note => "note",
        }
    }

    pub(crate) fn column(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Company => "company",
            Self::Email => "email",
            Self::PhoneNumber => "phone_number",
            Self::Address => "address",
            Self::Note => "note",
        }
    }

    fn value(self, contact: &ContactEntity) -> &str {
        match self {
            Self::FirstName => &contact.first_name,
            Self::LastName => &contact.last_name,
            Self::Company => &contact.company,
            Self::Email => &contact.email,
            Self::PhoneNumber => &contact.phone_number,
            Self::Address => &contact.address,
            Self::Note => &contact.note,
        }
    }
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    pub fn is_relational(self) -> bool {
        !matches!(self, Self::Eq | Self::Ne)
    }

    fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    fn holds<T: Ord>(self, left: &T, right: &T) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Ne => left != right,
            Self::Lt => left < right,
            Self::Le => left <= right,
            Self::Gt => left > right,
            Self::Ge => left >= right,
        }
    }
}

/// String method usable on text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMethod {
    Contains,
    StartsWith,
    EndsWith,
}

/// Typed expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Id {
        op: Comparison,
        value: ContactId,
    },
    /// Only `Eq`/`Ne` reach this variant.
    Text {
        field: TextField,
        op: Comparison,
        value: String,
    },
    Method {
        field: TextField,
        method: TextMethod,
        needle: String,
    },
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl Expr {
    pub fn matches(&self, contact: &ContactEntity) -> bool {
        match self {
            Self::Id { op, value } => op.holds(&contact.id, value),
            Self::Text { field, op, value } => op.holds(&field.value(contact), &value.as_str()),
            Self::Method {
                field,
                method,
                needle,
            } => {
                let haystack = field.value(contact);
                match method {
                    TextMethod::Contains => haystack.contains(needle.as_str()),
                    TextMethod::StartsWith => haystack.starts_with(needle.as_str()),
                    TextMethod::EndsWith => haystack.ends_with(needle.as_str()),
                }
            }
            Self::Not(inner) => !inner.matches(contact),
            Self::And(terms) => terms.iter().all(|term| term.matches(contact)),
            Self::Or(terms) => terms.iter().any(|term| term.matches(contact)),
        }
    }

    fn write_sql(&self, sql: &mut String, params: &mut Vec<SqlParam>) {
        match self {
            Self::Id { op, value } => {
                sql.push_str(&format!("id {} ?", op.sql()));
                params.push(SqlParam::Integer(*value));
            }
            Self::Text { field, op, value } => {
                sql.push_str(&format!("{} {} ?", field.column(), op.sql()));
                params.push(SqlParam::Text(value.clone()));
            }
            Self::Method {
                field,
                method,
                needle,
            } => {
                // Text functions stop at the first NUL; blobs compare every byte.
                let column = field.column();
                let repeat = match method {
                    TextMethod::Contains => {
                        sql.push_str(&format!(
                            "(? = '' OR instr(CAST({column} AS BLOB), CAST(? AS BLOB)) > 0)"
                        ));
                        2
                    }
                    TextMethod::StartsWith => {
                        sql.push_str(&format!(
                            "(? = '' OR substr(CAST({column} AS BLOB), 1, length(CAST(? AS BLOB))) = CAST(? AS BLOB))"
                        ));
                        3
                    }
                    TextMethod::EndsWith => {
                        sql.push_str(&format!(
                            "(? = '' OR substr(CAST({column} AS BLOB), -length(CAST(? AS BLOB))) = CAST(? AS BLOB))"
                        ));
                        3
                    }
                };
                for _ in 0..repeat {
                    params.push(SqlParam::Text(needle.clone()));
                }
            }
            Self::Not(inner) => {
                sql.push_str("NOT (");
                inner.write_sql(sql, params);
                sql.push(')');
            }
            Self::And(terms) => write_joined(sql, params, terms, " AND "),
            Self::Or(terms) => write_joined(sql, params, terms, " OR "),
        }
    }
}

fn write_joined(sql: &mut String, params: &mut Vec<SqlParam>, terms: &[Expr], joiner: &str) {
    sql.push('(');
    for (index, term) in terms.iter().enumerate() {
        if index > 0 {
            sql.push_str(joiner);
        }
        term.write_sql(sql, params);
    }
    sql.push(')');
}

/// Bound parameter value for a [`SqlFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Integer(i64),
    Text(String),
}

/// SQL `WHERE` fragment with positional `?` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFilter {
    pub clause: String,
    pub params: Vec<SqlParam>,
}

/// Compiled, storage-independent filter over contact records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    source: String,
    root: Expr,
}

impl Predicate {
    pub(crate) fn new(source: impl Into<String>, root: Expr) -> Self {
        Self {
            source: source.into(),
            root,
        }
    }

    /// Original expression text.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.root
    }

    /// Evaluates this predicate against one record.
    pub fn matches(&self, contact: &ContactEntity) -> bool {
        self.root.matches(contact)
    }

    /// Renders this predicate as a SQL fragment over the `contacts` table.
    pub fn to_sql(&self) -> SqlFilter {
        let mut clause = String::new();
        let mut params = Vec::new();
        self.root.write_sql(&mut clause, &mut params);
        SqlFilter { clause, params }
    }
}
