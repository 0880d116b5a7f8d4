//! Token and digest primitives shared by the blogger platform crates.
//!
//! - `jwt`: HS256 access/refresh token issue and validation
//! - `hash`: SHA-256 digests and random one-time codes

pub mod hash;
pub mod jwt;

pub use jwt::{AccessClaims, JwtSettings, RefreshClaims};
