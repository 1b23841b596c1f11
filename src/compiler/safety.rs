//! Raw-fragment trust boundary.
//!
//! Caller-supplied SQL text (as opposed to compiled predicate trees) passes
//! through here before any concatenation. The check is deliberately
//! conservative: statement terminators, comment markers and unbalanced
//! quoting are rejected; `unsafe_*` builder variants bypass it.

use crate::error::{SqlError, SqlResult};

/// Verify a raw SQL fragment, returning it unchanged when safe.
pub fn verify_fragment(fragment: &str) -> SqlResult<&str> {
    let reject = |reason| {
        Err(SqlError::UnsafeFragment {
            fragment: fragment.to_string(),
            reason,
        })
    };

    let mut in_string = false;
    let mut chars = fragment.chars().peekable();
    while let Some(c) = chars.next() {
        if in_string {
            if c == '\'' {
                // Doubled quote is an escaped quote inside the literal.
                if chars.peek() == Some(&'\'') {
                    chars.next();
                } else {
                    in_string = false;
                }
            }
            continue;
        }
        match c {
            '\'' => in_string = true,
            ';' => return reject("statement terminator"),
            '-' if chars.peek() == Some(&'-') => return reject("line comment"),
            '/' if chars.peek() == Some(&'*') => return reject("block comment"),
            '*' if chars.peek() == Some(&'/') => return reject("block comment"),
            _ => {}
        }
    }
    if in_string {
        return reject("unbalanced quote");
    }
    Ok(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_fragments() {
        assert!(verify_fragment("\"Age\" > 18").is_ok());
        assert!(verify_fragment("Name = 'O''Brien'").is_ok());
    }

    #[test]
    fn test_rejects_terminator_and_comments() {
        assert!(verify_fragment("1=1; DROP TABLE x").is_err());
        assert!(verify_fragment("1=1 --").is_err());
        assert!(verify_fragment("1=1 /* hidden */").is_err());
    }

    #[test]
    fn test_rejects_unbalanced_quote() {
        assert!(verify_fragment("Name = 'open").is_err());
    }

    #[test]
    fn test_quoted_content_is_opaque() {
        // A terminator or comment marker inside a closed string literal is
        // data, not SQL.
        assert!(verify_fragment("Name = 'a;b'").is_ok());
        assert!(verify_fragment("Name LIKE 'a--b'").is_ok());
    }
}
