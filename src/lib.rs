//! Serverless API authorization and response-shaping core.
//!
//! The hosting gateway hands each invocation an event; this crate verifies
//! the bearer token against the issuer's published JWKS, turns the outcome
//! into an allow/deny policy (or a hard reject), and shapes every
//! application response into one uniform envelope. The user store and the
//! JWKS endpoint are external collaborators, injected behind traits.

pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod policy;
pub mod response;
pub mod services;
pub mod util;
pub mod validation;

pub use config::Config;
pub use error::{AppError, AuthErrorKind};
pub use event::GatewayEvent;
pub use policy::{AuthOutcome, authorize};
pub use response::{ApiResponse, ResponseParts, make_response};
