mod account_guard;
mod credentials;
mod password;

pub use account_guard::{Administrator, AuthenticatedAccount};
pub use credentials::Credentials;
pub use password::{hash_password, verify_password_hash};
