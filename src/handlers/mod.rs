// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) → Protected (JWT + tenant resolution) → Elevated (organization owner)
//
pub mod public;    // Tier 1: No authentication required (/, /health, /auth/*)
pub mod protected; // Tier 2: JWT authentication + resolved tenant (/api/*)
pub mod elevated;  // Tier 3: Owner role required (/api/admin/*)
