// handlers/public/mod.rs - Public handlers (no authentication)
//
// Route prefix: /, /health, /api/auth/login

pub mod login;
pub mod system;

pub use login::login;
pub use system::{health, root};
