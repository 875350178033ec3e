//! MiniDrive Database Library
//!
//! SQLite persistence for MiniDrive: the owner-tagged record store and the
//! credential table used by the local authentication oracle. Both live in one
//! database opened through a shared [`DatabaseHandle`].

pub mod db;

pub use db::{list_visible, DatabaseHandle, RecordStore, SqliteRecordStore, UserRepository};
