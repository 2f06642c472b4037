//! SQL statement validation for read-only enforcement.
//!
//! `read_query` only accepts statements that begin with a read keyword
//! (SELECT, SHOW, DESCRIBE, DESC, EXPLAIN, WITH). The check is lexical: the
//! text is tokenized with the [sqlparser](https://docs.rs/sqlparser/) MySQL
//! dialect and the first token of every `;`-separated statement must be one of
//! those keywords. Nothing is parsed further, so any MySQL syntax the server
//! accepts after the keyword passes through unchanged.

use crate::error::{DbError, DbResult};
use sqlparser::dialect::MySqlDialect;
use sqlparser::tokenizer::{Token, Tokenizer, Whitespace, Word};

/// Leading keywords accepted by `read_query`.
pub const READ_KEYWORDS: &[&str] = &["SELECT", "SHOW", "DESCRIBE", "DESC", "EXPLAIN", "WITH"];

const READ_ONLY_REASON: &str = "read_query only accepts statements starting with SELECT, SHOW, DESCRIBE, DESC, EXPLAIN or WITH. Use write_query for changes.";

/// Validate SQL for read-only execution in the `read_query` tool.
///
/// Returns `Err(DbError::Permission)` when the statement does not start with
/// an allowed keyword, and `Err(DbError::InvalidInput)` for empty text.
///
/// # Examples
///
/// ```
/// use mysql_mcp_server::tools::sql_validator::validate_readonly;
///
/// assert!(validate_readonly("  select * from users").is_ok());
/// assert!(validate_readonly("DELETE FROM users").is_err());
/// ```
pub fn validate_readonly(sql: &str) -> DbResult<()> {
    let trimmed = sql.trim();
    if trimmed.is_empty() {
        return Err(DbError::invalid_input("SQL statement cannot be empty"));
    }

    let dialect = MySqlDialect {};
    let tokens = Tokenizer::new(&dialect, trimmed)
        .tokenize()
        .map_err(|e| DbError::invalid_input(format!("Failed to read SQL statement: {}", e)))?;

    // The first statement must start with the keyword itself, not a comment.
    match tokens.first() {
        Some(Token::Word(word)) if is_read_keyword(word) => {}
        other => return Err(reject(other)),
    }

    let has_executable_comment = tokens.iter().any(|t| {
        matches!(t, Token::Whitespace(Whitespace::MultiLineComment(body)) if body.starts_with('!'))
    });
    if has_executable_comment {
        return Err(DbError::permission(
            "executable comment",
            "MySQL executable comments (/*! ... */) are not allowed in read_query.",
        ));
    }

    for statement in tokens.split(|t| matches!(t, Token::SemiColon)).skip(1) {
        match statement.iter().find(|t| !matches!(t, Token::Whitespace(_))) {
            None => {}
            Some(Token::Word(word)) if is_read_keyword(word) => {}
            other => return Err(reject(other)),
        }
    }

    Ok(())
}

fn is_read_keyword(word: &Word) -> bool {
    word.quote_style.is_none()
        && READ_KEYWORDS
            .iter()
            .any(|keyword| word.value.eq_ignore_ascii_case(keyword))
}

fn reject(token: Option<&Token>) -> DbError {
    let operation = match token {
        Some(Token::Word(word)) if word.quote_style.is_none() => word.value.to_uppercase(),
        Some(Token::Whitespace(_)) => "comment".to_string(),
        _ => "statement".to_string(),
    };
    DbError::permission(operation, READ_ONLY_REASON)
}
