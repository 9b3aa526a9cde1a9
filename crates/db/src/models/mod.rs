use thiserror::Error;

pub mod address;
pub mod banner;
pub mod brand;
pub mod category;
pub mod order;
pub mod product;
pub mod user;

/// List pages show a fixed window of 12 rows.
pub const PAGE_SIZE: i64 = 12;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    /// The row is still referenced by dependent rows and cannot be
    /// deleted until those are removed.
    #[error("{entity} is still referenced by {count} {dependents}")]
    Referenced {
        entity: &'static str,
        dependents: &'static str,
        count: i64,
    },
}
