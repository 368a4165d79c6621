//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//! 5. Rate limiting on cart and wishlist mutations (governor)

pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use rate_limit::mutation_rate_limiter;
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
