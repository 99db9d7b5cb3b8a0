//! Bearer token validation for the `/api` tree.

mod claims;
mod jwt;

pub use claims::Claims;
pub use jwt::JwtValidator;
