//! SQL statement construction.
//!
//! Every database and table name is emitted as a backtick-quoted identifier
//! with embedded backticks doubled, so any string is treated as a name and
//! never as syntax. Column definitions, column specs and position clauses are
//! raw SQL fragments and are inserted verbatim.

use crate::error::{DbError, DbResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Schemas created by the server itself, excluded from user database counts.
pub const SYSTEM_SCHEMAS: &[&str] = &["information_schema", "mysql", "performance_schema", "sys"];

/// Quote a MySQL identifier: wrap in backticks, doubling any backtick inside.
///
/// ```
/// use mysql_mcp_server::db::statements::quote_identifier;
///
/// assert_eq!(quote_identifier("users"), "`users`");
/// assert_eq!(quote_identifier("we`ird"), "`we``ird`");
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Validate a required identifier argument and return it trimmed.
pub fn require_identifier<'a>(value: &'a str, what: &str) -> DbResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DbError::invalid_input(format!("{} name is required", what)));
    }
    if trimmed.contains('\0') {
        return Err(DbError::invalid_input(format!(
            "{} name must not contain NUL characters",
            what
        )));
    }
    Ok(trimmed)
}

/// Normalize an optional identifier argument: blank means "not given".
pub fn optional_identifier<'a>(value: Option<&'a str>, what: &str) -> DbResult<Option<&'a str>> {
    match value {
        Some(v) if v.trim().is_empty() => Ok(None),
        Some(v) => require_identifier(v, what).map(Some),
        None => Ok(None),
    }
}

/// Validate a charset, collation or engine name.
///
/// These are keywords rather than identifiers, so they are restricted to
/// ASCII letters, digits and underscores instead of being quoted.
pub fn require_keyword<'a>(value: &'a str, what: &str) -> DbResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DbError::invalid_input(format!("{} must not be empty", what)));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(DbError::invalid_input(format!(
            "Invalid {} '{}': only letters, digits and underscores are allowed",
            what, trimmed
        )));
    }
    Ok(trimmed)
}

/// Reject empty raw SQL fragments.
fn require_fragment<'a>(value: &'a str, what: &str) -> DbResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DbError::invalid_input(format!("{} is required", what)));
    }
    Ok(trimmed)
}

/// `db`.`table` when a database is given, `table` otherwise.
pub fn qualified_table(database: Option<&str>, table: &str) -> String {
    match database {
        Some(db) => format!("{}.{}", quote_identifier(db), quote_identifier(table)),
        None => quote_identifier(table),
    }
}

/// Column operation for ALTER TABLE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlterAction {
    /// Add a new column
    #[serde(alias = "add")]
    Add,
    /// Change a column's definition, keeping its name
    #[serde(alias = "modify")]
    Modify,
    /// Rename a column and change its definition
    #[serde(alias = "change")]
    Change,
    /// Remove a column
    #[serde(alias = "drop")]
    Drop,
}

impl AlterAction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Modify => "MODIFY",
            Self::Change => "CHANGE",
            Self::Drop => "DROP",
        }
    }
}

impl std::fmt::Display for AlterAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

pub fn show_databases() -> String {
    "SHOW DATABASES".to_string()
}

pub fn use_database(database: &str) -> DbResult<String> {
    let db = require_identifier(database, "Database")?;
    Ok(format!("USE {}", quote_identifier(db)))
}

pub fn select_current_database() -> String {
    "SELECT DATABASE() AS `database`".to_string()
}

pub fn show_tables(database: Option<&str>) -> DbResult<String> {
    Ok(match optional_identifier(database, "Database")? {
        Some(db) => format!("SHOW TABLES FROM {}", quote_identifier(db)),
        None => "SHOW TABLES".to_string(),
    })
}

pub fn describe_table(database: Option<&str>, table: &str) -> DbResult<String> {
    let table = require_identifier(table, "Table")?;
    let db = optional_identifier(database, "Database")?;
    Ok(format!("DESCRIBE {}", qualified_table(db, table)))
}

pub fn show_create_table(database: Option<&str>, table: &str) -> DbResult<String> {
    let table = require_identifier(table, "Table")?;
    let db = optional_identifier(database, "Database")?;
    Ok(format!("SHOW CREATE TABLE {}", qualified_table(db, table)))
}

/// CREATE DATABASE. Without a collation the server picks the charset's default.
pub fn create_database(
    database: &str,
    if_not_exists: bool,
    charset: &str,
    collation: Option<&str>,
) -> DbResult<String> {
    let db = require_identifier(database, "Database")?;
    let charset = require_keyword(charset, "character set")?;
    let mut sql = format!(
        "CREATE DATABASE {}{} CHARACTER SET {}",
        if if_not_exists { "IF NOT EXISTS " } else { "" },
        quote_identifier(db),
        charset
    );
    if let Some(collation) = collation {
        sql.push_str(" COLLATE ");
        sql.push_str(require_keyword(collation, "collation")?);
    }
    Ok(sql)
}

pub fn drop_database(database: &str, if_exists: bool) -> DbResult<String> {
    let db = require_identifier(database, "Database")?;
    Ok(format!(
        "DROP DATABASE {}{}",
        if if_exists { "IF EXISTS " } else { "" },
        quote_identifier(db)
    ))
}

/// Parameters for CREATE TABLE.
#[derive(Debug, Clone)]
pub struct CreateTable<'a> {
    pub database: Option<&'a str>,
    pub table: &'a str,
    /// Raw column definitions, e.g. "id INT PRIMARY KEY, name VARCHAR(50)"
    pub columns: &'a str,
    pub if_not_exists: bool,
    pub engine: &'a str,
    pub charset: &'a str,
}

pub fn create_table(spec: &CreateTable<'_>) -> DbResult<String> {
    let table = require_identifier(spec.table, "Table")?;
    let db = optional_identifier(spec.database, "Database")?;
    let columns = require_fragment(spec.columns, "Column definitions")?;
    let engine = require_keyword(spec.engine, "engine")?;
    let charset = require_keyword(spec.charset, "character set")?;
    Ok(format!(
        "CREATE TABLE {}{} ({}) ENGINE={} DEFAULT CHARSET={}",
        if spec.if_not_exists {
            "IF NOT EXISTS "
        } else {
            ""
        },
        qualified_table(db, table),
        columns,
        engine,
        charset
    ))
}

pub fn alter_table(
    database: Option<&str>,
    table: &str,
    action: AlterAction,
    column_spec: &str,
    position: Option<&str>,
) -> DbResult<String> {
    let table = require_identifier(table, "Table")?;
    let db = optional_identifier(database, "Database")?;
    let column_spec = require_fragment(column_spec, "Column specification")?;
    let mut sql = format!(
        "ALTER TABLE {} {} COLUMN {}",
        qualified_table(db, table),
        action.as_sql(),
        column_spec
    );
    if let Some(position) = position.map(str::trim).filter(|p| !p.is_empty()) {
        sql.push(' ');
        sql.push_str(position);
    }
    Ok(sql)
}

pub fn drop_table(database: Option<&str>, table: &str, if_exists: bool) -> DbResult<String> {
    let table = require_identifier(table, "Table")?;
    let db = optional_identifier(database, "Database")?;
    Ok(format!(
        "DROP TABLE {}{}",
        if if_exists { "IF EXISTS " } else { "" },
        qualified_table(db, table)
    ))
}

pub fn list_users() -> String {
    "SELECT user, host FROM mysql.user".to_string()
}

pub fn show_processlist() -> String {
    "SHOW PROCESSLIST".to_string()
}

pub fn select_version() -> String {
    "SELECT VERSION() AS `version`".to_string()
}

pub fn select_current_user() -> String {
    "SELECT CURRENT_USER() AS `user`".to_string()
}

pub fn show_global_status(variable: &str) -> String {
    format!("SHOW GLOBAL STATUS LIKE '{}'", variable.replace('\'', "''"))
}

pub fn count_user_databases() -> String {
    let excluded = SYSTEM_SCHEMAS
        .iter()
        .map(|s| format!("'{}'", s))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "SELECT COUNT(*) AS `count` FROM information_schema.SCHEMATA WHERE SCHEMA_NAME NOT IN ({})",
        excluded
    )
}
