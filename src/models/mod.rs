pub mod publication;
pub mod user;

pub use publication::{NewPublication, PublicationInput, PUBLICATION_TTL_DAYS};
pub use user::{Credentials, CredentialsInput, Session, User};
