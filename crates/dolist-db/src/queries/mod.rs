pub mod lists;
pub mod namespaces;
pub mod notifications;
pub mod rights;
pub mod tasks;
pub mod teams;
pub mod users;

use anyhow::Result;

/// `LIKE` pattern matching `search` anywhere in the column. Wildcards in
/// `search` match literally; use with `ESCAPE '\'`.
pub(crate) fn contains(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Matches grants held by user `?1` directly or through any team they belong to,
/// on the resource whose id is in `column`.
pub(crate) fn held_by_user(kind: &str, column: &str) -> String {
    format!(
        "EXISTS (SELECT 1 FROM rights r
                 WHERE r.resource_kind = '{kind}' AND r.resource_id = {column}
                   AND ((r.subject_kind = 'user' AND r.subject_id = ?1)
                     OR (r.subject_kind = 'team' AND r.subject_id IN
                         (SELECT team_id FROM team_members WHERE user_id = ?1))))"
    )
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_escapes_wildcards() {
        assert_eq!(contains(""), "%%");
        assert_eq!(contains("bob"), "%bob%");
        assert_eq!(contains("dave_x"), "%dave\\_x%");
        assert_eq!(contains("50%"), "%50\\%%");
        assert_eq!(contains("a\\b"), "%a\\\\b%");
    }
}
