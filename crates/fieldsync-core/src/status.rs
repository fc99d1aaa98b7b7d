//! Per-row synchronization state for locally authorable rows
//!
//! The pull path never goes through here: server writes leave the `state`
//! column alone. Local edits and push outcomes move a row through the
//! [`State`] transitions.

use std::marker::PhantomData;

use rusqlite::{Connection, OptionalExtension};

use crate::db::{Insertable, LinkStore, RowStore};
use crate::error::{Error, Result};
use crate::models::{require, Identifiable, LinkKey, LinkRow, State, Stateful};

/// Read and write the state of one row selected by `K`.
pub trait StatusTracker<K: Copy> {
    fn get(&self, key: K) -> Result<State>;

    fn set(&self, key: K, state: State) -> Result<()>;

    fn record_local_edit(&self, key: K) -> Result<State> {
        let next = self.get(key)?.after_local_edit();
        self.set(key, next)?;
        Ok(next)
    }

    fn record_push_success(&self, key: K) -> Result<State> {
        let next = self.get(key)?.after_push_success();
        self.set(key, next)?;
        Ok(next)
    }

    fn record_push_failure(&self, key: K) -> Result<State> {
        let next = self.get(key)?.after_push_failure();
        self.set(key, next)?;
        Ok(next)
    }
}

/// Tracker for UID-keyed stateful rows.
pub struct RowStatus<'c, M> {
    conn: &'c Connection,
    model: PhantomData<fn() -> M>,
}

impl<'c, M: Identifiable + Stateful> RowStatus<'c, M> {
    pub const fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            model: PhantomData,
        }
    }
}

impl<M: Identifiable + Stateful> StatusTracker<&str> for RowStatus<'_, M> {
    fn get(&self, uid: &str) -> Result<State> {
        require(M::TABLE, M::UID_COLUMN, uid)?;
        let sql = format!("SELECT state FROM {} WHERE {} = ?", M::TABLE, M::UID_COLUMN);
        self.conn
            .prepare_cached(&sql)?
            .query_row([uid], |row| row.get(0))
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("{} {uid}", M::TABLE)))
    }

    fn set(&self, uid: &str, state: State) -> Result<()> {
        require(M::TABLE, M::UID_COLUMN, uid)?;
        let sql = format!("UPDATE {} SET state = ? WHERE {} = ?", M::TABLE, M::UID_COLUMN);
        let changed = self
            .conn
            .prepare_cached(&sql)?
            .execute(rusqlite::params![state, uid])?;
        if changed == 0 {
            return Err(Error::NotFound(format!("{} {uid}", M::TABLE)));
        }
        tracing::debug!("{} {uid} is now {state}", M::TABLE);
        Ok(())
    }
}

/// Tracker for pair-keyed stateful links (attribute and data values).
pub struct LinkStatus<'c, L> {
    conn: &'c Connection,
    link: PhantomData<fn() -> L>,
}

impl<'c, L: LinkRow + Stateful> LinkStatus<'c, L> {
    pub const fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            link: PhantomData,
        }
    }
}

impl<L: LinkRow + Stateful> StatusTracker<LinkKey<'_>> for LinkStatus<'_, L> {
    fn get(&self, key: LinkKey<'_>) -> Result<State> {
        let sql = format!(
            "SELECT state FROM {} WHERE {} = ? AND {} = ?",
            L::TABLE,
            L::KEY[0],
            L::KEY[1]
        );
        self.conn
            .prepare_cached(&sql)?
            .query_row([key.first, key.second], |row| row.get(0))
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("{} {key}", L::TABLE)))
    }

    fn set(&self, key: LinkKey<'_>, state: State) -> Result<()> {
        let sql = format!(
            "UPDATE {} SET state = ? WHERE {} = ? AND {} = ?",
            L::TABLE,
            L::KEY[0],
            L::KEY[1]
        );
        let changed = self
            .conn
            .prepare_cached(&sql)?
            .execute(rusqlite::params![state, key.first, key.second])?;
        if changed == 0 {
            return Err(Error::NotFound(format!("{} {key}", L::TABLE)));
        }
        tracing::debug!("{} {key} is now {state}", L::TABLE);
        Ok(())
    }
}

impl<'c, M: Identifiable + Stateful> RowStore<'c, M> {
    pub fn status(&self) -> RowStatus<'c, M> {
        RowStatus::new(self.connection())
    }
}

impl<'c, L: LinkRow + Stateful> LinkStore<'c, L> {
    pub fn status(&self) -> LinkStatus<'c, L> {
        LinkStatus::new(self.connection())
    }
}

/// Local authoring path: rows created on the device start as `TO_POST`,
/// later edits move the state as [`State::after_local_edit`] says.
#[derive(Debug, Clone, Copy)]
pub struct LocalWriter<S> {
    store: S,
}

impl<S> LocalWriter<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }
}

impl<M: Identifiable + Stateful> LocalWriter<RowStore<'_, M>> {
    pub fn create(&self, row: &mut M) -> Result<i64> {
        row.set_state(State::ToPost);
        self.store.insert(row)
    }

    /// Overwrite the row's fields and its new state in one statement; returns the state.
    pub fn edit(&self, row: &mut M) -> Result<State> {
        let status = self.store.status();
        let next = status.get(row.uid())?.after_local_edit();
        row.set_state(next);
        let row: &M = row;
        if self.store.overwrite(row, row.uid())? == 0 {
            return Err(Error::NotFound(format!("{} {}", M::TABLE, row.uid())));
        }
        tracing::debug!("{} {} is now {next}", M::TABLE, row.uid());
        Ok(next)
    }
}

impl<L: LinkRow + Stateful> LocalWriter<LinkStore<'_, L>> {
    pub fn create(&self, link: &mut L) -> Result<i64> {
        link.set_state(State::ToPost);
        self.store.insert(link)
    }

    /// Overwrite the link's payload and its new state in one statement; returns the state.
    pub fn edit(&self, link: &mut L) -> Result<State> {
        let status = self.store.status();
        let next = status.get(link.key())?.after_local_edit();
        link.set_state(next);
        let link: &L = link;
        if self.store.overwrite(link, link.key())? == 0 {
            return Err(Error::NotFound(format!("{} {}", L::TABLE, link.key())));
        }
        tracing::debug!("{} {} is now {next}", L::TABLE, link.key());
        Ok(next)
    }
}
