// handlers/public/auth/mod.rs - Account creation and token acquisition
//
// Both endpoints take `{email, password}` and forward it to the credential
// provider. Registration relays the provider's error message; login does not,
// so a failed login never reveals whether the account exists.
pub mod login;
pub mod register;

pub use login::token_post;
pub use register::register_post;
