// handlers/elevated/mod.rs - Elevated handlers (organization owner only)
//
// Security Level: JWT + tenant resolution + owner role
// Route Prefix: /api/admin/*
// Middleware: jwt_auth_middleware → resolve_tenant_middleware → require_owner_middleware
//
// Owners manage every location of their organization here, so these routes
// take the location id from the path instead of the `?location=` hint.

pub mod finance;
pub mod guardians;
pub mod locations;
pub mod staff;
