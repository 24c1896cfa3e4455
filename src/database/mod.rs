pub mod manager;
pub mod memory;
pub mod paths;
pub mod postgres;
pub mod repository;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryDocumentStore;
pub use paths::{CollectionPath, DocPath, LetterKind, TenantScope};
pub use postgres::PgDocumentStore;
pub use repository::Repository;
pub use store::{Direction, Document, DocumentStore, Query, StoreError};
