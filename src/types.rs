use thiserror::Error;

use std::fmt;

/// JSON Web Signature algorithm for signing or verifying a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JwsSigningAlgorithm {
    /// HMAC using SHA-256.
    HmacSha256,
    /// RSA SSA PKCS#1 v1.5 using SHA-256.
    RsaSsaPkcs1V15Sha256,
}
impl JwsSigningAlgorithm {
    /// The canonical `alg` header parameter value for this algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            JwsSigningAlgorithm::HmacSha256 => "HS256",
            JwsSigningAlgorithm::RsaSsaPkcs1V15Sha256 => "RS256",
        }
    }

    /// Matches an `alg` header parameter value against the supported algorithms.
    ///
    /// NB: Section 4.1.1 of RFC 7515 specifies `alg` as case-sensitive, but tokens produced
    /// by some legacy implementations carry lower-cased names, so we match ignoring ASCII
    /// case. Serialization always emits the canonical upper-case name.
    pub fn from_field(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("HS256") {
            Some(JwsSigningAlgorithm::HmacSha256)
        } else if name.eq_ignore_ascii_case("RS256") {
            Some(JwsSigningAlgorithm::RsaSsaPkcs1V15Sha256)
        } else {
            None
        }
    }
}
impl fmt::Display for JwsSigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error signing a message.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SigningError {
    /// Failed to sign the message using the given key and parameters.
    #[error("Crypto error")]
    CryptoError,
    /// Unsupported signature algorithm.
    #[error("Unsupported signature algorithm: {0}")]
    UnsupportedAlg(String),
    /// An unexpected error occurred.
    #[error("Other error: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::JwsSigningAlgorithm;

    #[test]
    fn test_algorithm_field_matching() {
        assert_eq!(
            JwsSigningAlgorithm::from_field("HS256"),
            Some(JwsSigningAlgorithm::HmacSha256)
        );
        assert_eq!(
            JwsSigningAlgorithm::from_field("RS256"),
            Some(JwsSigningAlgorithm::RsaSsaPkcs1V15Sha256)
        );
        // Case-insensitive on read.
        assert_eq!(
            JwsSigningAlgorithm::from_field("hs256"),
            Some(JwsSigningAlgorithm::HmacSha256)
        );
        assert_eq!(
            JwsSigningAlgorithm::from_field("rs256"),
            Some(JwsSigningAlgorithm::RsaSsaPkcs1V15Sha256)
        );
        assert_eq!(JwsSigningAlgorithm::from_field("none"), None);
        assert_eq!(JwsSigningAlgorithm::from_field("HS384"), None);
        assert_eq!(JwsSigningAlgorithm::from_field("XX999"), None);
        assert_eq!(JwsSigningAlgorithm::from_field(""), None);
    }

    #[test]
    fn test_algorithm_display() {
        assert_eq!(JwsSigningAlgorithm::HmacSha256.to_string(), "HS256");
        assert_eq!(
            JwsSigningAlgorithm::RsaSsaPkcs1V15Sha256.to_string(),
            "RS256"
        );
    }
}
