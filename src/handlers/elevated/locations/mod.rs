// handlers/elevated/locations/mod.rs - Locations and their groups
//
// GET, POST     /api/admin/locations
// GET, PATCH    /api/admin/locations/:location_id
// POST          /api/admin/locations/:location_id/groups
// PATCH, DELETE /api/admin/locations/:location_id/groups/:grupa_id

pub mod groups;
pub mod record;

pub use groups::{group_delete, group_patch, groups_post};
pub use record::{location_admin_get, location_patch, locations_get, locations_post};
