//! Generic persistence over a single table
//!
//! A [`RowStore`] borrows a connection (or a transaction, which derefs to one)
//! and compiles its statements through `prepare_cached`, so each statement is
//! compiled once per connection and reused for every row of a pass.

use std::fmt;
use std::marker::PhantomData;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, ToSql};

use crate::error::{Error, Result};
use crate::models::{require, Identifiable, Table};

/// Stores that can add a new row.
pub trait Insertable<M> {
    /// Insert the row and return its storage row id.
    fn insert(&self, row: &M) -> Result<i64>;
}

/// Stores that can overwrite an existing row selected by `K`.
pub trait Updatable<M, K> {
    /// Returns the number of rows changed; zero means no row matched `key`.
    fn update(&self, row: &M, key: K) -> Result<usize>;
}

/// Stores that can remove rows selected by `K`.
pub trait Deletable<K> {
    fn delete(&self, key: K) -> Result<usize>;
}

/// Stores that can be read back with a [`Filter`].
pub trait Queryable<M> {
    fn query(&self, filter: &Filter) -> Result<Vec<M>>;
}

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Is(&'static str, Value),
    IsNot(&'static str, Value),
}

impl Condition {
    const fn column(&self) -> &'static str {
        match self {
            Self::Is(column, _) | Self::IsNot(column, _) => *column,
        }
    }

    const fn value(&self) -> &Value {
        match self {
            Self::Is(_, value) | Self::IsNot(_, value) => value,
        }
    }
}

/// Column filter for [`Queryable::query`].
///
/// Comparisons use `IS` / `IS NOT`, so filtering on `NULL` behaves like any
/// other value. Column names are checked against the table's columns before
/// any SQL is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
    order_by: Option<&'static str>,
    limit: Option<u32>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Is(column, value.into()));
        self
    }

    #[must_use]
    pub fn ne(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::IsNot(column, value.into()));
        self
    }

    #[must_use]
    pub const fn order_by(mut self, column: &'static str) -> Self {
        self.order_by = Some(column);
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    fn check_column(table: &str, columns: &[&str], column: &str) -> Result<()> {
        if columns.contains(&column) {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "unknown column `{column}` for {table}"
            )))
        }
    }

    /// Render the clause following `FROM table`, with its bind values.
    pub(crate) fn render(&self, table: &str, columns: &[&str]) -> Result<(String, Vec<&Value>)> {
        let mut sql = String::new();
        let mut values = Vec::with_capacity(self.conditions.len());

        for (index, condition) in self.conditions.iter().enumerate() {
            Self::check_column(table, columns, condition.column())?;
            sql.push_str(if index == 0 { " WHERE " } else { " AND " });
            let operator = match condition {
                Condition::Is(..) => "IS",
                Condition::IsNot(..) => "IS NOT",
            };
            sql.push_str(&format!("{} {operator} ?", condition.column()));
            values.push(condition.value());
        }

        if let Some(column) = self.order_by {
            Self::check_column(table, columns, column)?;
            sql.push_str(&format!(" ORDER BY {column}"));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        Ok((sql, values))
    }
}

pub(crate) fn select_sql(table: &str, columns: &[&str]) -> String {
    format!("SELECT {} FROM {table}", columns.join(", "))
}

pub(crate) fn insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {table} ({}) VALUES ({placeholders})",
        columns.join(", ")
    )
}

/// `SET` list over every column not in `preserved`, paired with its bind values.
pub(crate) fn update_assignments<'v, M: Table>(
    row: &'v M,
    preserved: &[&str],
) -> (String, Vec<&'v dyn ToSql>) {
    let (columns, values): (Vec<&&str>, Vec<&dyn ToSql>) = M::COLUMNS
        .iter()
        .zip(row.values())
        .filter(|(column, _)| !preserved.contains(*column))
        .unzip();
    let assignments = columns
        .iter()
        .map(|column| format!("{column} = ?"))
        .collect::<Vec<_>>()
        .join(", ");
    (assignments, values)
}

pub(crate) fn run_query<M: Table>(
    conn: &Connection,
    columns: &[&str],
    filter: &Filter,
) -> Result<Vec<M>> {
    let (clause, values) = filter.render(M::TABLE, columns)?;
    let sql = format!("{}{clause}", select_sql(M::TABLE, columns));
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(values), M::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub(crate) fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {table}");
    let count = conn.prepare_cached(&sql)?.query_row([], |row| row.get(0))?;
    Ok(count)
}

pub(crate) fn delete_all_rows(conn: &Connection, table: &str) -> Result<usize> {
    let sql = format!("DELETE FROM {table}");
    Ok(conn.prepare_cached(&sql)?.execute([])?)
}

/// Persistence for one table of `M` rows.
pub struct RowStore<'c, M> {
    conn: &'c Connection,
    model: PhantomData<fn() -> M>,
}

impl<M> Clone for RowStore<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for RowStore<'_, M> {}

impl<M: Table> fmt::Debug for RowStore<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowStore")
            .field("table", &M::TABLE)
            .finish_non_exhaustive()
    }
}

impl<'c, M: Table> RowStore<'c, M> {
    pub const fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            model: PhantomData,
        }
    }

    pub const fn connection(&self) -> &'c Connection {
        self.conn
    }

    pub fn count(&self) -> Result<i64> {
        count_rows(self.conn, M::TABLE)
    }

    pub fn delete_all(&self) -> Result<usize> {
        delete_all_rows(self.conn, M::TABLE)
    }

    /// Every row of the table, in storage order.
    pub fn all(&self) -> Result<Vec<M>> {
        self.query(&Filter::new())
    }
}

impl<M: Identifiable> RowStore<'_, M> {
    /// Update every column, `PRESERVED_ON_UPDATE` ones included, in one statement.
    pub(crate) fn overwrite(&self, row: &M, uid: &str) -> Result<usize> {
        self.update_columns(row, uid, &[])
    }

    fn update_columns(&self, row: &M, uid: &str, preserved: &[&str]) -> Result<usize> {
        row.validate()?;
        require(M::TABLE, M::UID_COLUMN, uid)?;

        let (assignments, mut values) = update_assignments(row, preserved);
        values.push(&uid);
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE {} = ?",
            M::TABLE,
            M::UID_COLUMN
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        Ok(stmt.execute(&*values)?)
    }

    pub fn get(&self, uid: &str) -> Result<Option<M>> {
        let filter = Filter::new().eq(M::UID_COLUMN, uid.to_string()).limit(1);
        Ok(self.query(&filter)?.into_iter().next())
    }

    /// Like [`RowStore::get`], failing with [`Error::NotFound`] when absent.
    pub fn require(&self, uid: &str) -> Result<M> {
        self.get(uid)?
            .ok_or_else(|| Error::NotFound(format!("{} {uid}", M::TABLE)))
    }
}

impl<M: Table> Insertable<M> for RowStore<'_, M> {
    fn insert(&self, row: &M) -> Result<i64> {
        row.validate()?;
        let values = row.values();
        let mut stmt = self.conn.prepare_cached(&insert_sql(M::TABLE, M::COLUMNS))?;
        Ok(stmt.insert(&*values)?)
    }
}

impl<M: Identifiable> Updatable<M, &str> for RowStore<'_, M> {
    fn update(&self, row: &M, uid: &str) -> Result<usize> {
        self.update_columns(row, uid, M::PRESERVED_ON_UPDATE)
    }
}

impl<M: Identifiable> Deletable<&str> for RowStore<'_, M> {
    fn delete(&self, uid: &str) -> Result<usize> {
        require(M::TABLE, M::UID_COLUMN, uid)?;
        let sql = format!("DELETE FROM {} WHERE {} = ?", M::TABLE, M::UID_COLUMN);
        let mut stmt = self.conn.prepare_cached(&sql)?;
        Ok(stmt.execute([uid])?)
    }
}

impl<M: Table> Queryable<M> for RowStore<'_, M> {
    fn query(&self, filter: &Filter) -> Result<Vec<M>> {
        run_query(self.conn, M::COLUMNS, filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{OrganisationUnitRow, ProgramRow, ProgramStageRow};
    use pretty_assertions::assert_eq;

    fn unit(uid: &str, name: &str) -> OrganisationUnitRow {
        OrganisationUnitRow {
            uid: uid.to_string(),
            name: Some(name.to_string()),
            level: Some(2),
            ..Default::default()
        }
    }

    #[test]
    fn insert_then_get() {
        let db = Database::open_in_memory().unwrap();
        let store = RowStore::<OrganisationUnitRow>::new(db.connection());

        let row_id = store.insert(&unit("DiszpKrYNg8", "Ngelehun CHC")).unwrap();
        assert!(row_id > 0);

        let fetched = store.get("DiszpKrYNg8").unwrap().unwrap();
        assert_eq!(fetched, unit("DiszpKrYNg8", "Ngelehun CHC"));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn update_reports_zero_rows_for_unknown_uid() {
        let db = Database::open_in_memory().unwrap();
        let store = RowStore::<OrganisationUnitRow>::new(db.connection());

        let changed = store.update(&unit("missing0001", "x"), "missing0001").unwrap();
        assert_eq!(changed, 0);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn update_overwrites_fields() {
        let db = Database::open_in_memory().unwrap();
        let store = RowStore::<OrganisationUnitRow>::new(db.connection());
        store.insert(&unit("DiszpKrYNg8", "Old")).unwrap();

        let changed = store.update(&unit("DiszpKrYNg8", "New"), "DiszpKrYNg8").unwrap();
        assert_eq!(changed, 1);
        assert_eq!(
            store.get("DiszpKrYNg8").unwrap().unwrap().name.as_deref(),
            Some("New")
        );
    }

    #[test]
    fn blank_uid_fails_before_touching_storage() {
        let db = Database::open_in_memory().unwrap();
        let store = RowStore::<OrganisationUnitRow>::new(db.connection());

        let error = store.insert(&unit("", "x")).unwrap_err();
        assert!(matches!(error, Error::Validation { field: "uid", .. }));

        let error = store.delete("").unwrap_err();
        assert!(matches!(error, Error::Validation { .. }));
    }

    #[test]
    fn missing_parent_is_a_constraint_error() {
        let db = Database::open_in_memory().unwrap();
        let stages = RowStore::<ProgramStageRow>::new(db.connection());

        let stage = ProgramStageRow {
            uid: "A03MvHHogjR".to_string(),
            program: "IpHINAT79UW".to_string(),
            ..Default::default()
        };
        let error = stages.insert(&stage).unwrap_err();
        assert!(matches!(error, Error::Constraint(_)), "{error:?}");
    }

    #[test]
    fn delete_cascades_to_children() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.connection();
        let programs = RowStore::<ProgramRow>::new(conn);
        let stages = RowStore::<ProgramStageRow>::new(conn);

        programs
            .insert(&ProgramRow {
                uid: "IpHINAT79UW".to_string(),
                ..Default::default()
            })
            .unwrap();
        stages
            .insert(&ProgramStageRow {
                uid: "A03MvHHogjR".to_string(),
                program: "IpHINAT79UW".to_string(),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(programs.delete("IpHINAT79UW").unwrap(), 1);
        assert_eq!(stages.count().unwrap(), 0);
    }

    #[test]
    fn query_filters_and_orders() {
        let db = Database::open_in_memory().unwrap();
        let store = RowStore::<OrganisationUnitRow>::new(db.connection());
        store.insert(&unit("ou00000000b", "B")).unwrap();
        store.insert(&unit("ou00000000a", "A")).unwrap();
        store
            .insert(&OrganisationUnitRow {
                uid: "ou00000000c".to_string(),
                ..Default::default()
            })
            .unwrap();

        let named = store
            .query(&Filter::new().eq("level", 2).order_by("name"))
            .unwrap();
        let names: Vec<_> = named.iter().map(|row| row.uid.as_str()).collect();
        assert_eq!(names, vec!["ou00000000a", "ou00000000b"]);

        let unnamed = store.query(&Filter::new().eq("name", Value::Null)).unwrap();
        assert_eq!(unnamed.len(), 1);
    }

    #[test]
    fn query_rejects_unknown_columns() {
        let db = Database::open_in_memory().unwrap();
        let store = RowStore::<OrganisationUnitRow>::new(db.connection());

        let error = store
            .query(&Filter::new().eq("uid; DROP TABLE x", 1))
            .unwrap_err();
        assert!(matches!(error, Error::InvalidInput(_)));
    }

    #[test]
    fn delete_all_clears_table() {
        let db = Database::open_in_memory().unwrap();
        let store = RowStore::<OrganisationUnitRow>::new(db.connection());
        store.insert(&unit("ou00000000a", "A")).unwrap();
        store.insert(&unit("ou00000000b", "B")).unwrap();

        assert_eq!(store.delete_all().unwrap(), 2);
        assert!(store.all().unwrap().is_empty());
    }
}
