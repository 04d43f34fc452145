//! Authentication
//!
//! - [`JwtService`]: access token issuing / validation
//! - [`CurrentUser`]: identity extracted from `Authorization: Bearer <token>`
//! - [`require_auth`]: middleware guarding the protected routers
//! - [`RateLimiter`]: per-IP throttling of login and registration

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod rate_limit;

pub use jwt::{CurrentUser, JwtError, JwtService};
pub use middleware::require_auth;
pub use rate_limit::{RateLimiter, login_rate_limit, register_rate_limit};
