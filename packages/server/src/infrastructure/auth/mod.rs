//! AuthService 実装
//!
//! - `jwt`: HMAC-SHA256 署名の JSON Web Token

pub mod jwt;

pub use jwt::JwtAuthService;
