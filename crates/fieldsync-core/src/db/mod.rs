//! Database layer for fieldsync

mod connection;
mod link_store;
mod migrations;
mod store;
mod stores;

pub use connection::{Database, SharedDatabase};
pub use link_store::LinkStore;
pub use migrations::CURRENT_VERSION;
pub use store::{Deletable, Filter, Insertable, Queryable, RowStore, Updatable};
pub use stores::{PendingRows, Stores};
