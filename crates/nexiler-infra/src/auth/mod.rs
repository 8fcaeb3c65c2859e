//! Authentication implementations.

mod jwt;
mod password;
mod provider;
mod users;

pub use jwt::{JwtConfig, JwtTokenService};
pub use password::Argon2PasswordService;
pub use provider::LocalAuthProvider;
pub use users::InMemoryUserRepository;
