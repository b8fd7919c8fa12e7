/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: access/refresh token issuance and validation
/// - [`middleware`]: bearer-token extraction and the per-request [`middleware::AuthContext`]
/// - [`authorization`]: owner / member / creator checks on loaded resources

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
