//! Contact repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide keyed CRUD plus bounded list/scan over the `contacts` table.
//! - Enforce (email, phone_number) uniqueness and report it as `Conflict`.
//!
//! # Invariants
//! - Ids are assigned by storage on insert and never reused.
//! - Every write is one statement, so a rejected write leaves storage unchanged.
//! - `scan` pushes the compiled predicate down as bound SQL; results equal
//!   in-memory evaluation of the same predicate.
//! - Repositories do not validate content; callers validate before writing.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::contact::{ContactEntity, ContactId};
use crate::query::{Predicate, SqlParam};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CONTACT_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    company,
    email,
    phone_number,
    address,
    note
FROM contacts";

const DUPLICATE_CONTACT_MESSAGE: &str = "a contact with this email and phone number already exists";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for contact persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(ContactId),
    /// Write would violate (email, phone_number) uniqueness.
    Conflict(String),
    InvalidData(String),
    /// Store cannot serve requests (e.g. a poisoned in-process lock).
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "contact not found: {id}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted contact data: {message}"),
            Self::Unavailable(message) => write!(f, "contact store unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage boundary for contact records.
pub trait ContactRepository {
    /// Returns up to `limit` contacts in ascending id order.
    fn get_all(&self, limit: u32) -> RepoResult<Vec<ContactEntity>>;
    fn get_by_id(&self, id: ContactId) -> RepoResult<Option<ContactEntity>>;
    /// Returns up to `limit` matching contacts in ascending id order.
    fn scan(&self, predicate: &Predicate, limit: u32) -> RepoResult<Vec<ContactEntity>>;
    /// Persists a new contact; the input id is ignored and a fresh one assigned.
    fn insert(&self, contact: &ContactEntity) -> RepoResult<ContactEntity>;
    fn update(&self, contact: &ContactEntity) -> RepoResult<()>;
    fn delete(&self, id: ContactId) -> RepoResult<()>;
}

impl<R: ContactRepository + ?Sized> ContactRepository for &R {
    fn get_all(&self, limit: u32) -> RepoResult<Vec<ContactEntity>> {
        (**self).get_all(limit)
    }

    fn get_by_id(&self, id: ContactId) -> RepoResult<Option<ContactEntity>> {
        (**self).get_by_id(id)
    }

    fn scan(&self, predicate: &Predicate, limit: u32) -> RepoResult<Vec<ContactEntity>> {
        (**self).scan(predicate, limit)
    }

    fn insert(&self, contact: &ContactEntity) -> RepoResult<ContactEntity> {
        (**self).insert(contact)
    }

    fn update(&self, contact: &ContactEntity) -> RepoResult<()> {
        (**self).update(contact)
    }

    fn delete(&self, id: ContactId) -> RepoResult<()> {
        (**self).delete(id)
    }
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    /// Wraps a connection returned by [`crate::db::open_db`].
    ///
    /// Fails when the connection schema is not at the latest migration.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let db_version = current_user_version(conn)?;
        let expected = latest_version();
        if db_version != expected {
            return Err(DbError::SchemaNotReady {
                db_version,
                expected,
            }
            .into());
        }
        Ok(Self { conn })
    }

    fn query_contacts(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<ContactEntity>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }
        Ok(contacts)
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn get_all(&self, limit: u32) -> RepoResult<Vec<ContactEntity>> {
        self.query_contacts(
            &format!("{CONTACT_SELECT_SQL} ORDER BY id ASC LIMIT ?"),
            vec![Value::Integer(i64::from(limit))],
        )
    }

    fn get_by_id(&self, id: ContactId) -> RepoResult<Option<ContactEntity>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_contact_row(row)?));
        }
        Ok(None)
    }

    fn scan(&self, predicate: &Predicate, limit: u32) -> RepoResult<Vec<ContactEntity>> {
        let filter = predicate.to_sql();
        let mut bind_values: Vec<Value> = filter
            .params
            .into_iter()
            .map(|param| match param {
                SqlParam::Integer(value) => Value::Integer(value),
                SqlParam::Text(value) => Value::Text(value),
            })
            .collect();
        bind_values.push(Value::Integer(i64::from(limit)));

        self.query_contacts(
            &format!(
                "{CONTACT_SELECT_SQL} WHERE {} ORDER BY id ASC LIMIT ?",
                filter.clause
            ),
            bind_values,
        )
    }

    fn insert(&self, contact: &ContactEntity) -> RepoResult<ContactEntity> {
        self.conn
            .execute(
                "INSERT INTO contacts (
                    first_name,
                    last_name,
                    company,
                    email,
                    phone_number,
                    address,
                    note
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    contact.first_name,
                    contact.last_name,
                    contact.company,
                    contact.email,
                    contact.phone_number,
                    contact.address,
                    contact.note,
                ],
            )
            .map_err(map_write_error)?;

        Ok(ContactEntity {
            id: self.conn.last_insert_rowid(),
            ..contact.clone()
        })
    }

    fn update(&self, contact: &ContactEntity) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE contacts
                 SET
                    first_name = ?1,
                    last_name = ?2,
                    company = ?3,
                    email = ?4,
                    phone_number = ?5,
                    address = ?6,
                    note = ?7,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?8;",
                params![
                    contact.first_name,
                    contact.last_name,
                    contact.company,
                    contact.email,
                    contact.phone_number,
                    contact.address,
                    contact.note,
                    contact.id,
                ],
            )
            .map_err(map_write_error)?;

        if changed == 0 {
            return Err(RepoError::NotFound(contact.id));
        }
        Ok(())
    }

    fn delete(&self, id: ContactId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM contacts WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn map_write_error(err: rusqlite::Error) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
            return RepoError::Conflict(DUPLICATE_CONTACT_MESSAGE.to_string());
        }
    }
    err.into()
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<ContactEntity> {
    let id: ContactId = row.get("id")?;
    if id <= 0 {
        return Err(RepoError::InvalidData(format!(
            "invalid id value `{id}` in contacts.id"
        )));
    }

    Ok(ContactEntity {
        id,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        company: row.get("company")?,
        email: row.get("email")?,
        phone_number: row.get("phone_number")?,
        address: row.get("address")?,
        note: row.get("note")?,
    })
}

pub(crate) fn duplicate_contact_message() -> String {
    DUPLICATE_CONTACT_MESSAGE.to_string()
}
