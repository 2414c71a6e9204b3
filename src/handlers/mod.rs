// handlers/mod.rs - two handler tiers
//
// Public (no auth) → Protected (JWT auth, then a role policy per handler).
// Role checks live in the `Authorized<P>` extractor, so one route can mix
// policies across methods.

pub mod public; // /, /health, /api/auth/login
pub mod protected; // /api/* behind jwt_auth_middleware
