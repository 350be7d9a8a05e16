pub mod claims;
pub mod jwks;
pub mod verifier;

pub use claims::{AccessCheck, is_user_allowed, user_claims, user_id};
pub use jwks::{HttpJwksFetcher, JwksFetcher, KeySet, KeySetCache, MemoryKeySetCache, NoCache};
pub use verifier::{TokenVerifier, VerificationContext};
