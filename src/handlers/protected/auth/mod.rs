// handlers/protected/auth/mod.rs - Authenticated identity endpoints

pub mod whoami; // GET /api/auth/whoami

pub use whoami::whoami_get;
