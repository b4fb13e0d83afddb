// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth): registration, login, landing page, health
// Protected (bearer token): publication create / list / delete
pub mod public;
pub mod protected;

pub use public::*;
pub use protected::*;
