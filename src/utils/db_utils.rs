use chrono::NaiveDate;
use sqlx::sqlite::SqliteArguments;
use sqlx::{Arguments, Executor, Sqlite};

use crate::utils::search::{like_pattern, search_terms};

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    I64(i64),
    Date(NaiveDate),
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
///
/// Column names are taken from the caller, never from request payloads.
/// Returns `None` when there is nothing to set.
pub fn build_update_sql(
    table: &str,
    assignments: Vec<(&'static str, SqlValue)>,
    id_column: &str,
    id_value: i64,
) -> Option<SqlUpdate> {
    if assignments.is_empty() {
        return None;
    }

    let set_clause = assignments
        .iter()
        .map(|(column, _)| format!("{} = ?", column))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values: Vec<SqlValue> = assignments.into_iter().map(|(_, v)| v).collect();

    // WHERE id = ?
    values.push(SqlValue::I64(id_value));

    Some(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update<'e, E>(executor: E, update: SqlUpdate) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query_with(&update.sql, sql_arguments(update.values))
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Positional arguments for a query built with `query_with` / `query_as_with`.
pub fn sql_arguments<'q>(values: Vec<SqlValue>) -> SqliteArguments<'q> {
    let mut args = SqliteArguments::default();
    for value in values {
        match value {
            SqlValue::Text(v) => args.add(v),
            SqlValue::I64(v) => args.add(v),
            SqlValue::Date(v) => args.add(v),
        }
    }
    args
}

/// ===============================
/// Dynamic WHERE clause
/// ===============================
#[derive(Debug, Default)]
pub struct WhereClause {
    conditions: Vec<String>,
    bindings: Vec<SqlValue>,
}

impl WhereClause {
    pub fn eq(&mut self, column: &str, value: SqlValue) -> &mut Self {
        self.conditions.push(format!("{} = ?", column));
        self.bindings.push(value);
        self
    }

    /// Every search term has to match at least one of `columns` as a
    /// substring. SQLite's `LIKE` ignores case for ASCII letters only, other
    /// characters match as typed.
    pub fn search(&mut self, columns: &[&str], raw: &str) -> &mut Self {
        for term in search_terms(raw) {
            let pattern = like_pattern(&term);
            let any_column = columns
                .iter()
                .map(|c| format!("{} LIKE ? ESCAPE '\\'", c))
                .collect::<Vec<_>>()
                .join(" OR ");

            self.conditions.push(format!("({})", any_column));
            for _ in columns {
                self.bindings.push(SqlValue::Text(pattern.clone()));
            }
        }
        self
    }

    pub fn sql(&self) -> String {
        if self.conditions.is_empty() {
            "".to_string()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn into_bindings(self) -> Vec<SqlValue> {
        self.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_sql_lists_columns_in_order_and_appends_id() {
        let update = build_update_sql(
            "employees",
            vec![
                ("full_name", SqlValue::Text("Ada".into())),
                ("department", SqlValue::Text("R&D".into())),
            ],
            "id",
            7,
        )
        .unwrap();

        assert_eq!(
            update.sql,
            "UPDATE employees SET full_name = ?, department = ? WHERE id = ?"
        );
        assert_eq!(update.values.last(), Some(&SqlValue::I64(7)));
        assert_eq!(update.values.len(), 3);
    }

    #[test]
    fn update_sql_is_none_without_assignments() {
        assert!(build_update_sql("employees", vec![], "id", 1).is_none());
    }

    #[test]
    fn where_clause_ands_terms_and_ors_columns() {
        let mut clause = WhereClause::default();
        clause
            .eq("a.employee_id", SqlValue::I64(3))
            .search(&["e.full_name", "a.status"], "Ada present");

        assert_eq!(
            clause.sql(),
            "WHERE a.employee_id = ? \
             AND (e.full_name LIKE ? ESCAPE '\\' OR a.status LIKE ? ESCAPE '\\') \
             AND (e.full_name LIKE ? ESCAPE '\\' OR a.status LIKE ? ESCAPE '\\')"
        );
        let bindings = clause.into_bindings();
        assert_eq!(bindings.len(), 5);
        assert_eq!(bindings[1], SqlValue::Text("%Ada%".into()));
        assert_eq!(bindings[3], SqlValue::Text("%present%".into()));
    }

    #[test]
    fn empty_where_clause_renders_nothing() {
        assert_eq!(WhereClause::default().sql(), "");
    }
}
