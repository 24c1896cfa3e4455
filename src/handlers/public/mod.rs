// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Route Prefix: No /api prefix (e.g., /auth/*, /health)
// Middleware: CORS + tracing only

pub mod auth;
pub mod health;

pub use auth::*;
pub use health::*;
