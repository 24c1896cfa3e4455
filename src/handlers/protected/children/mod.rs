// handlers/protected/children/mod.rs - Enrollment endpoints

pub mod collection; // GET, POST /api/children
pub mod record;     // GET, PATCH, DELETE /api/children/:cnp

pub use collection::{children_get, children_post};
pub use record::{child_delete, child_get, child_patch};
