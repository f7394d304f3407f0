/// Middleware modules for the API server
///
/// - `security`: Security headers on every response

pub mod security;
