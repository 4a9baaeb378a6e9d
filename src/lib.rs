//! Generic repository layer over SeaORM entities.
//!
//! [`Repository`] binds one mapped entity type to a connection (or an open
//! transaction) and exposes get/find/create/update/get-or-create operations
//! on top of SeaORM's query builder. A process-wide [`registry`] maps
//! repository names to entity types, rejecting duplicate names.
//!
//! ```ignore
//! let db = sea_repository::database::connect(&database_url).await?;
//! sea_repository::registry::register::<article::Entity>("ArticleRepository")?;
//!
//! let txn = db.begin().await?;
//! let articles = Repository::<_, article::Entity>::new(&txn);
//! let (row, created) = articles
//!     .get_or_create(FieldValues::new().field("title", "hello"))
//!     .await?;
//! txn.commit().await?;
//! ```

pub mod database;
pub mod error;
pub mod query;
pub mod registry;
pub mod repository;

pub use error::{RepoResult, RepositoryError};
pub use query::{FieldValues, Query};
pub use repository::{Repository, BATCH_SIZE};

pub mod prelude {
    pub use crate::error::{RepoResult, RepositoryError};
    pub use crate::query::{FieldValues, Query};
    pub use crate::registry;
    pub use crate::repository::{Repository, BATCH_SIZE};
}
