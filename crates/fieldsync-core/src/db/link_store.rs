//! Persistence for association tables keyed by a pair of UIDs

use std::fmt;
use std::marker::PhantomData;

use rusqlite::Connection;

use super::store::{
    count_rows, delete_all_rows, insert_sql, run_query, update_assignments, Deletable, Filter,
    Insertable, Queryable, Updatable,
};
use crate::error::Result;
use crate::models::{require, LinkKey, LinkRow};

/// Persistence for one association table of `L` rows.
///
/// Link rows have no identity beyond their key pair, so updates and deletes
/// select on both key columns.
pub struct LinkStore<'c, L> {
    conn: &'c Connection,
    link: PhantomData<fn() -> L>,
}

impl<L> Clone for LinkStore<'_, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for LinkStore<'_, L> {}

impl<L: LinkRow> fmt::Debug for LinkStore<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkStore")
            .field("table", &L::TABLE)
            .field("key", &L::KEY)
            .finish_non_exhaustive()
    }
}

impl<'c, L: LinkRow> LinkStore<'c, L> {
    pub const fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            link: PhantomData,
        }
    }

    pub const fn connection(&self) -> &'c Connection {
        self.conn
    }

    fn check_key(key: LinkKey<'_>) -> Result<()> {
        require(L::TABLE, L::KEY[0], key.first)?;
        require(L::TABLE, L::KEY[1], key.second)
    }

    pub fn get(&self, key: LinkKey<'_>) -> Result<Option<L>> {
        let filter = Filter::new()
            .eq(L::KEY[0], key.first.to_string())
            .eq(L::KEY[1], key.second.to_string())
            .limit(1);
        Ok(self.query(&filter)?.into_iter().next())
    }

    /// Rows whose owning side is `first`.
    pub fn query_for(&self, first: &str) -> Result<Vec<L>> {
        self.query(&Filter::new().eq(L::KEY[0], first.to_string()))
    }

    /// Remove every row whose owning side is `first`.
    pub fn delete_all_for(&self, first: &str) -> Result<usize> {
        self.delete(first)
    }

    pub fn count(&self) -> Result<i64> {
        count_rows(self.conn, L::TABLE)
    }

    pub fn delete_all(&self) -> Result<usize> {
        delete_all_rows(self.conn, L::TABLE)
    }
}

impl<L: LinkRow> Insertable<L> for LinkStore<'_, L> {
    fn insert(&self, link: &L) -> Result<i64> {
        link.validate()?;
        let values = link.values();
        let mut stmt = self.conn.prepare_cached(&insert_sql(L::TABLE, L::COLUMNS))?;
        Ok(stmt.insert(&*values)?)
    }
}

impl<L: LinkRow> Updatable<L, LinkKey<'_>> for LinkStore<'_, L> {
    fn update(&self, link: &L, key: LinkKey<'_>) -> Result<usize> {
        self.update_columns(link, key, L::PRESERVED_ON_UPDATE)
    }
}

impl<L: LinkRow> LinkStore<'_, L> {
    /// Update every column, `PRESERVED_ON_UPDATE` ones included, in one statement.
    pub(crate) fn overwrite(&self, link: &L, key: LinkKey<'_>) -> Result<usize> {
        self.update_columns(link, key, &[])
    }

    fn update_columns(&self, link: &L, key: LinkKey<'_>, preserved: &[&str]) -> Result<usize> {
        link.validate()?;
        Self::check_key(key)?;

        let (assignments, mut values) = update_assignments(link, preserved);
        values.push(&key.first);
        values.push(&key.second);
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE {} = ? AND {} = ?",
            L::TABLE,
            L::KEY[0],
            L::KEY[1]
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        Ok(stmt.execute(&*values)?)
    }
}

impl<L: LinkRow> Deletable<LinkKey<'_>> for LinkStore<'_, L> {
    fn delete(&self, key: LinkKey<'_>) -> Result<usize> {
        Self::check_key(key)?;
        let sql = format!(
            "DELETE FROM {} WHERE {} = ? AND {} = ?",
            L::TABLE,
            L::KEY[0],
            L::KEY[1]
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        Ok(stmt.execute([key.first, key.second])?)
    }
}

impl<L: LinkRow> Deletable<&str> for LinkStore<'_, L> {
    fn delete(&self, first: &str) -> Result<usize> {
        require(L::TABLE, L::KEY[0], first)?;
        let sql = format!("DELETE FROM {} WHERE {} = ?", L::TABLE, L::KEY[0]);
        let mut stmt = self.conn.prepare_cached(&sql)?;
        Ok(stmt.execute([first])?)
    }
}

impl<L: LinkRow> Queryable<L> for LinkStore<'_, L> {
    fn query(&self, filter: &Filter) -> Result<Vec<L>> {
        run_query(self.conn, L::COLUMNS, filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, RowStore};
    use crate::error::Error;
    use crate::models::{OrganisationUnitRow, UserOrganisationUnitRow, UserRow};
    use pretty_assertions::assert_eq;

    fn seed(db: &Database) {
        let conn = db.connection();
        RowStore::<UserRow>::new(conn)
            .insert(&UserRow {
                uid: "DXyJmlo9rge".to_string(),
                ..Default::default()
            })
            .unwrap();
        let units = RowStore::<OrganisationUnitRow>::new(conn);
        for uid in ["DiszpKrYNg8", "ImspTQPwCqd"] {
            units
                .insert(&OrganisationUnitRow {
                    uid: uid.to_string(),
                    ..Default::default()
                })
                .unwrap();
        }
    }

    fn link(unit: &str) -> UserOrganisationUnitRow {
        UserOrganisationUnitRow {
            user: "DXyJmlo9rge".to_string(),
            organisation_unit: unit.to_string(),
        }
    }

    #[test]
    fn update_then_insert_does_not_duplicate() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        let store = LinkStore::<UserOrganisationUnitRow>::new(db.connection());

        for _ in 0..2 {
            let row = link("DiszpKrYNg8");
            if store.update(&row, row.key()).unwrap() == 0 {
                store.insert(&row).unwrap();
            }
        }

        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn duplicate_insert_is_a_constraint_error() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        let store = LinkStore::<UserOrganisationUnitRow>::new(db.connection());

        store.insert(&link("DiszpKrYNg8")).unwrap();
        let error = store.insert(&link("DiszpKrYNg8")).unwrap_err();
        assert!(matches!(error, Error::Constraint(_)));
    }

    #[test]
    fn delete_by_pair_and_by_owner() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        let store = LinkStore::<UserOrganisationUnitRow>::new(db.connection());
        store.insert(&link("DiszpKrYNg8")).unwrap();
        store.insert(&link("ImspTQPwCqd")).unwrap();

        let removed = store
            .delete(LinkKey::new("DXyJmlo9rge", "DiszpKrYNg8"))
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(
            store.query_for("DXyJmlo9rge").unwrap(),
            vec![link("ImspTQPwCqd")]
        );

        assert_eq!(store.delete_all_for("DXyJmlo9rge").unwrap(), 1);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn deleting_either_side_cascades() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        let conn = db.connection();
        let store = LinkStore::<UserOrganisationUnitRow>::new(conn);
        store.insert(&link("DiszpKrYNg8")).unwrap();
        store.insert(&link("ImspTQPwCqd")).unwrap();

        RowStore::<OrganisationUnitRow>::new(conn)
            .delete("DiszpKrYNg8")
            .unwrap();
        assert_eq!(store.count().unwrap(), 1);

        RowStore::<UserRow>::new(conn).delete("DXyJmlo9rge").unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn blank_key_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let store = LinkStore::<UserOrganisationUnitRow>::new(db.connection());

        let error = store.delete(LinkKey::new("DXyJmlo9rge", "")).unwrap_err();
        assert!(matches!(
            error,
            Error::Validation {
                field: "organisation_unit",
                ..
            }
        ));
    }
}
