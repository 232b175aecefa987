/// iland cloud API integration module
///
/// ## Request flow
///
/// 1. A public operation builds a relative path and calls the client
/// 2. The session makes sure a valid token is held, authenticating or
///    refreshing under a single lock
/// 3. The request is sent with the bearer token and versioned media type
/// 4. The `)]}'` prefix is stripped and the body decoded, or the error
///    envelope is turned into an `ApiError`
/// 5. Returned records are linked back to the session for follow-up calls
pub mod client;
pub mod config;
pub mod resources;
pub mod session;
pub mod types;

pub use client::IlandClient;
pub use config::{ClientConfig, Credentials};
pub use resources::*;
pub use session::{Session, SessionLink};
pub use types::{ApiError, ApiErrorResponse, AuthError, IlandError, Token};
