use crate::helpers;
use crate::jwt::UnverifiedToken;
use crate::key::VerificationKey;
use crate::types::JwsSigningAlgorithm;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Error verifying a signature or MAC.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SignatureVerificationError {
    /// Invalid signature for the supplied message and key.
    #[error("Crypto error: {0}")]
    CryptoError(String),
    /// The supplied key cannot be used in this context. This occurs when the key type does
    /// not match the signature type (e.g., an RSA key used to validate an HMAC).
    #[error("Invalid cryptographic key: {0}")]
    InvalidKey(String),
    /// An unexpected error occurred.
    #[error("Other error: {0}")]
    Other(String),
}

/// Error verifying a token.
///
/// Verification fails fast: malformed input is rejected before any cryptographic
/// comparison, the signature is checked before the payload is decoded, and no failure
/// yields a partial result.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TokenVerificationError {
    /// The token does not consist of exactly three non-empty dot-separated segments, or
    /// the header or signature segment failed to decode.
    #[error("Malformed token: {0}")]
    Malformed(String),
    /// The header's `alg` parameter is absent or names an algorithm this crate does not
    /// support.
    #[error("Unknown signature algorithm: {0}")]
    UnknownAlgorithm(String),
    /// The header's `alg` parameter disagrees with the algorithm the caller expects (see
    /// [`verify_with_algorithm`]).
    #[error("Token algorithm {found} does not match expected algorithm {expected}")]
    AlgorithmMismatch {
        /// The algorithm the caller expects.
        expected: JwsSigningAlgorithm,
        /// The algorithm declared by the token's header.
        found: JwsSigningAlgorithm,
    },
    /// The signature does not match the token's header and payload under the supplied
    /// key.
    #[error("Signature verification failed")]
    InvalidSignature(#[source] SignatureVerificationError),
    /// The payload segment failed to decode. The signature was already verified, so this
    /// indicates a signer that embeds non-JSON payloads rather than a forgery.
    #[error("Failed to decode payload: {0}")]
    PayloadDecode(String),
}

/// Verifies `token` with `key` and returns its decoded payload.
///
/// The verification algorithm is selected by the token's own `alg` header parameter.
///
/// # Security Warning
///
/// Trusting the header to pick the algorithm is the behavior attackers exploit in
/// algorithm-confusion attacks. The typed key interface rules out HS256/RS256 confusion
/// here (the key refuses algorithms it cannot serve), but callers that know which
/// algorithm to expect should prefer [`verify_with_algorithm`].
pub fn verify<P, K>(key: &K, token: &str) -> Result<P, TokenVerificationError>
where
    P: DeserializeOwned,
    K: VerificationKey,
{
    verify_token(key, token, None)
}

/// Verifies `token` with `key`, rejecting any token whose header does not declare
/// `expected_alg`, and returns its decoded payload.
///
/// The algorithm check happens after structural validation but before any signature
/// comparison.
pub fn verify_with_algorithm<P, K>(
    key: &K,
    token: &str,
    expected_alg: JwsSigningAlgorithm,
) -> Result<P, TokenVerificationError>
where
    P: DeserializeOwned,
    K: VerificationKey,
{
    verify_token(key, token, Some(expected_alg))
}

fn verify_token<P, K>(
    key: &K,
    token: &str,
    expected_alg: Option<JwsSigningAlgorithm>,
) -> Result<P, TokenVerificationError>
where
    P: DeserializeOwned,
    K: VerificationKey,
{
    let unverified = UnverifiedToken::parse(token)?;

    let alg = match unverified.header.alg.as_deref() {
        Some(name) => JwsSigningAlgorithm::from_field(name)
            .ok_or_else(|| TokenVerificationError::UnknownAlgorithm(name.to_string()))?,
        None => {
            return Err(TokenVerificationError::UnknownAlgorithm(
                "missing `alg` header parameter".to_string(),
            ))
        }
    };
    if let Some(expected) = expected_alg {
        if alg != expected {
            return Err(TokenVerificationError::AlgorithmMismatch {
                expected,
                found: alg,
            });
        }
    }

    // The signature covers the verbatim header and payload segments; re-encoding the
    // decoded header could change the signed bytes.
    key.verify_signature(
        &alg,
        unverified.signing_input.as_bytes(),
        &unverified.signature,
    )
    .map_err(TokenVerificationError::InvalidSignature)?;

    helpers::decode_json(unverified.payload_segment).ok_or_else(|| {
        TokenVerificationError::PayloadDecode(
            "payload segment is not base64url-encoded JSON".to_string(),
        )
    })
}
