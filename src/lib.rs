#![warn(missing_docs)]
//! Compact-serialization [JSON Web Token](https://tools.ietf.org/html/rfc7519) signing and
//! verification.
//!
//! This crate produces and validates tokens of the form
//! `base64url(header) . base64url(payload) . base64url(signature)` for two signature
//! algorithms:
//!
//! * `HS256` (HMAC using SHA-256), keyed by an opaque shared secret ([`HmacKey`]); and
//! * `RS256` (RSASSA-PKCS1-v1_5 using SHA-256), keyed by a PEM-encoded RSA key pair
//!   ([`RsaPrivateSigningKey`] / [`RsaPublicVerificationKey`]).
//!
//! Only structural and cryptographic validity is checked. Claim-level semantics such as
//! expiration (`exp`), issuer (`iss`), or audience (`aud`) are left to the caller; the
//! payload is treated as opaque JSON.
//!
//! # Example
//!
//! ```
//! use jws_compact::{sign, verify, HmacKey, JwsSigningAlgorithm};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let key = HmacKey::new("secret");
//!
//! let token = sign(&key, &json!({"userId": 2}), JwsSigningAlgorithm::HmacSha256)?;
//! let payload: serde_json::Value = verify(&key, &token)?;
//!
//! assert_eq!(payload, json!({"userId": 2}));
//! # Ok(())
//! # }
//! ```
//!
//! # Security Warning
//!
//! [`verify`] selects the verification algorithm from the token's own `alg` header
//! parameter. This mirrors the behavior of many JWT implementations, but it is a known
//! vulnerability class when a single key is usable with more than one algorithm (see
//! [Critical vulnerabilities in JSON Web Token libraries](
//!     https://auth0.com/blog/critical-vulnerabilities-in-json-web-token-libraries/)).
//! The typed key interface limits the damage (an [`HmacKey`] refuses `RS256` tokens and an
//! RSA key refuses `HS256` tokens), but callers that know which algorithm to expect should
//! prefer [`verify_with_algorithm`], which rejects any token whose header disagrees before
//! looking at the signature.
//!
//! Signature comparison is constant-time for both the HMAC path and the RSA digest-match
//! path.

mod crypto;
mod helpers;
mod jwt;
mod key;
mod types;
mod verification;

pub use crate::jwt::{sign, JsonWebTokenError, JwsHeader};
pub use crate::key::{
    HmacKey, PrivateSigningKey, RsaPrivateSigningKey, RsaPublicVerificationKey, VerificationKey,
};
pub use crate::types::{JwsSigningAlgorithm, SigningError};
pub use crate::verification::{
    verify, verify_with_algorithm, SignatureVerificationError, TokenVerificationError,
};
