pub mod client;
pub mod connect;
pub mod entities;
pub mod events;
pub mod locks;
pub mod stats;
pub mod views;

use sea_orm::DbErr;

/// Collapses the `ON CONFLICT DO NOTHING` outcome into "did this row actually
/// insert". sea-orm surfaces a skipped insert as `DbErr::RecordNotInserted`;
/// every other error is a real persistence failure.
pub(crate) fn insert_outcome<T>(res: Result<T, DbErr>) -> eyre::Result<bool> {
    match res {
        Ok(_) => Ok(true),
        Err(DbErr::RecordNotInserted) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
