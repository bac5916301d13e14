/// Router Module Index
///
/// Splits the routing table by access level so that authentication is applied per
/// module (via Axum layers) rather than per handler.

/// Routes accessible to everyone: health, registration, login and the public reads.
pub mod public;

/// Routes protected by the auth middleware. Requires a valid, stored access token.
pub mod authenticated;

/// Staff-only routes, nested under `/admin`.
pub mod admin;
