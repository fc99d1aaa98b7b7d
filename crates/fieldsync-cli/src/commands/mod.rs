pub mod common;
pub mod login;
pub mod mark;
pub mod pending;
pub mod reconcile;
pub mod status;
