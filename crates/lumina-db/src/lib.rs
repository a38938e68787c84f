//! Lumina metadata store
//!
//! The narrow contract the pipeline consumes the relational metadata store
//! through ([`RecordStore`]), and its Postgres implementation. The object
//! store holds the artifacts; the rows here are the authoritative source of
//! which artifacts exist and who owns them.

pub mod postgres;
pub mod traits;

pub use postgres::PgRecordStore;
pub use traits::RecordStore;

/// Embedded migrations, applied at startup.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();
