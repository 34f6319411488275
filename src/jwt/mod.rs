use crate::helpers::{self, deserialize_option_or_none};
use crate::key::PrivateSigningKey;
use crate::types::{JwsSigningAlgorithm, SigningError};
use crate::verification::TokenVerificationError;

use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
pub(crate) mod tests;

/// JOSE header of a compact-serialization token.
///
/// Field order is significant: serialization emits fields in declaration order, so every
/// header produced for a given algorithm is byte-identical (`{"typ":"JWT","alg":…}`).
/// Header parameters other than `typ` and `alg` are ignored when reading a token.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct JwsHeader {
    /// Declared media type of the token; always `JWT` for tokens produced by this crate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    /// The `alg` header parameter, verbatim. `None` if the parameter was absent or not a
    /// JSON string; distinguishing a missing algorithm from a malformed header is what
    /// lets verification report [`TokenVerificationError::UnknownAlgorithm`] instead of
    /// lumping both cases together.
    #[serde(
        default,
        deserialize_with = "deserialize_option_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub alg: Option<String>,
}
impl JwsHeader {
    pub(crate) fn for_algorithm(alg: JwsSigningAlgorithm) -> Self {
        Self {
            typ: Some("JWT".to_string()),
            alg: Some(alg.as_str().to_string()),
        }
    }
}

/// Error creating a JSON Web Token.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JsonWebTokenError {
    /// Failed to serialize JWT.
    #[error("Failed to serialize JWT")]
    SerializationError(#[source] serde_json::Error),
    /// Failed to sign JWT.
    #[error("Failed to sign JWT")]
    SigningError(#[source] SigningError),
}

/// Signs `payload` with `key` and returns the compact serialization
/// `base64url(header) . base64url(payload) . base64url(signature)`.
///
/// A fresh `{"typ":"JWT","alg":…}` header is built for `alg` on every call. Signing is
/// deterministic for both supported algorithms: the same key, payload, and algorithm
/// always produce the same token.
pub fn sign<P, K>(key: &K, payload: &P, alg: JwsSigningAlgorithm) -> Result<String, JsonWebTokenError>
where
    P: Serialize,
    K: PrivateSigningKey,
{
    let header_base64 = helpers::encode_json(&JwsHeader::for_algorithm(alg))
        .map_err(JsonWebTokenError::SerializationError)?;
    let payload_base64 =
        helpers::encode_json(payload).map_err(JsonWebTokenError::SerializationError)?;

    let signing_input = format!("{}.{}", header_base64, payload_base64);

    let signature = key
        .sign(&alg, signing_input.as_bytes())
        .map_err(JsonWebTokenError::SigningError)?;

    Ok(format!(
        "{}.{}",
        signing_input,
        BASE64_URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// A structurally valid token whose signature has not yet been checked.
///
/// The payload segment is retained undecoded: a payload must never be interpreted before
/// the signature over it has been verified.
pub(crate) struct UnverifiedToken<'a> {
    pub(crate) header: JwsHeader,
    /// The first two token segments, verbatim as they appeared on the wire.
    pub(crate) signing_input: &'a str,
    pub(crate) payload_segment: &'a str,
    pub(crate) signature: Vec<u8>,
}
impl<'a> UnverifiedToken<'a> {
    pub(crate) fn parse(token: &'a str) -> Result<Self, TokenVerificationError> {
        let parts = token.split('.').collect::<Vec<_>>();

        // NB: We avoid including segment contents in the error output to avoid clients
        // potentially logging sensitive values.
        if parts.len() != 3 {
            return Err(TokenVerificationError::Malformed(format!(
                "found {} parts (expected 3)",
                parts.len()
            )));
        }
        if parts.iter().any(|part| part.is_empty()) {
            return Err(TokenVerificationError::Malformed(
                "empty segment".to_string(),
            ));
        }

        let header_json = BASE64_URL_SAFE_NO_PAD.decode(parts[0]).map_err(|err| {
            TokenVerificationError::Malformed(format!(
                "Invalid base64url header encoding: {:?}",
                err
            ))
        })?;
        let header = serde_json::from_slice(&header_json).map_err(|err| {
            TokenVerificationError::Malformed(format!("Failed to parse header JSON: {:?}", err))
        })?;

        let signature = BASE64_URL_SAFE_NO_PAD.decode(parts[2]).map_err(|err| {
            TokenVerificationError::Malformed(format!(
                "Invalid base64url signature encoding: {:?}",
                err
            ))
        })?;

        Ok(Self {
            header,
            signing_input: &token[..parts[0].len() + 1 + parts[1].len()],
            payload_segment: parts[1],
            signature,
        })
    }
}
