use crate::crypto;
use crate::types::{JwsSigningAlgorithm, SigningError};
use crate::verification::SignatureVerificationError;

use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::BigUint;


/// Private or symmetric key capable of signing a JWS signing input.
pub trait PrivateSigningKey {
    /// The matching key type used to verify signatures produced by this key.
    type VerificationKey: VerificationKey;

    /// Signs `message` using the specified signature algorithm.
    fn sign(
        &self,
        signature_alg: &JwsSigningAlgorithm,
        message: &[u8],
    ) -> Result<Vec<u8>, SigningError>;

    /// Returns the key that verifies signatures produced by this key.
    fn as_verification_key(&self) -> Self::VerificationKey;
}

/// Public or symmetric key capable of verifying a JWS signature.
pub trait VerificationKey {
    /// Verifies `signature` over `message` using the specified signature algorithm.
    ///
    /// A key rejects an algorithm its key type cannot serve with
    /// [`SignatureVerificationError::InvalidKey`], so an RSA token can never be checked
    /// against an HMAC secret or vice versa.
    fn verify_signature(
        &self,
        signature_alg: &JwsSigningAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), SignatureVerificationError>;
}

/// HMAC secret key.
///
/// This key signs `HS256` tokens and, being symmetric, also verifies them.
#[derive(Clone)]
pub struct HmacKey {
    secret: Vec<u8>,
}
impl HmacKey {
    /// Instantiate a new key from the specified secret bytes.
    pub fn new<T>(secret: T) -> Self
    where
        T: Into<Vec<u8>>,
    {
        Self {
            secret: secret.into(),
        }
    }
}
impl PrivateSigningKey for HmacKey {
    type VerificationKey = HmacKey;

    fn sign(
        &self,
        signature_alg: &JwsSigningAlgorithm,
        message: &[u8],
    ) -> Result<Vec<u8>, SigningError> {
        match *signature_alg {
            JwsSigningAlgorithm::HmacSha256 => crypto::sign_hmac(&self.secret, message),
            ref other => Err(SigningError::UnsupportedAlg(other.as_str().to_string())),
        }
    }

    fn as_verification_key(&self) -> HmacKey {
        self.clone()
    }
}
impl VerificationKey for HmacKey {
    fn verify_signature(
        &self,
        signature_alg: &JwsSigningAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), SignatureVerificationError> {
        match *signature_alg {
            JwsSigningAlgorithm::HmacSha256 => {
                crypto::verify_hmac(&self.secret, message, signature)
            }
            _ => Err(SignatureVerificationError::InvalidKey(
                "key type does not match signature algorithm".to_string(),
            )),
        }
    }
}

/// Trait used to allow testing with an alternative RNG.
/// Clone is necessary to get a mutable version of the RNG.
pub(crate) trait RngClone: dyn_clone::DynClone + rand::RngCore + rand::CryptoRng {}
dyn_clone::clone_trait_object!(RngClone);
impl<T> RngClone for T where T: rand::RngCore + rand::CryptoRng + Clone {}

/// RSA private key.
///
/// This key signs `RS256` tokens; its public half (see
/// [`as_verification_key`](PrivateSigningKey::as_verification_key)) verifies them.
pub struct RsaPrivateSigningKey {
    key_pair: rsa::RsaPrivateKey,
    rng: Box<dyn RngClone + Send + Sync>,
}
impl core::fmt::Debug for RsaPrivateSigningKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RsaPrivateSigningKey")
            .field("key_pair", &self.key_pair)
            .finish_non_exhaustive()
    }
}
impl RsaPrivateSigningKey {
    /// Parses an RSA private key from PKCS#8 (`PRIVATE KEY`) or PKCS#1
    /// (`RSA PRIVATE KEY`) PEM.
    pub fn from_pem(pem: &str) -> Result<Self, String> {
        Self::from_pem_internal(pem, Box::new(rand::rngs::OsRng))
    }

    pub(crate) fn from_pem_internal(
        pem: &str,
        rng: Box<dyn RngClone + Send + Sync>,
    ) -> Result<Self, String> {
        let key_pair = rsa::RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| rsa::RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|err| err.to_string())?;
        Ok(Self { key_pair, rng })
    }
}
impl PrivateSigningKey for RsaPrivateSigningKey {
    type VerificationKey = RsaPublicVerificationKey;

    fn sign(
        &self,
        signature_alg: &JwsSigningAlgorithm,
        message: &[u8],
    ) -> Result<Vec<u8>, SigningError> {
        match *signature_alg {
            JwsSigningAlgorithm::RsaSsaPkcs1V15Sha256 => crypto::sign_rsa(
                &self.key_pair,
                &mut dyn_clone::clone_box(&self.rng),
                message,
            ),
            ref other => Err(SigningError::UnsupportedAlg(other.as_str().to_string())),
        }
    }

    fn as_verification_key(&self) -> RsaPublicVerificationKey {
        RsaPublicVerificationKey {
            key: self.key_pair.to_public_key(),
        }
    }
}

/// RSA public key used to verify `RS256` tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RsaPublicVerificationKey {
    key: rsa::RsaPublicKey,
}
impl RsaPublicVerificationKey {
    /// Parses an RSA public key from SPKI (`PUBLIC KEY`) or PKCS#1 (`RSA PUBLIC KEY`) PEM.
    pub fn from_pem(pem: &str) -> Result<Self, String> {
        let key = rsa::RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| rsa::RsaPublicKey::from_pkcs1_pem(pem))
            .map_err(|err| err.to_string())?;
        Ok(Self { key })
    }

    /// Instantiates a key from the raw big-endian modulus (`n`) and public exponent (`e`),
    /// for keys delivered out of band (e.g., as JWK parameters).
    pub fn from_components(n: &[u8], e: &[u8]) -> Result<Self, String> {
        let key = rsa::RsaPublicKey::new(BigUint::from_bytes_be(n), BigUint::from_bytes_be(e))
            .map_err(|err| err.to_string())?;
        Ok(Self { key })
    }
}
impl VerificationKey for RsaPublicVerificationKey {
    fn verify_signature(
        &self,
        signature_alg: &JwsSigningAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), SignatureVerificationError> {
        match *signature_alg {
            JwsSigningAlgorithm::RsaSsaPkcs1V15Sha256 => {
                crypto::verify_rsa_signature(&self.key, message, signature)
            }
            _ => Err(SignatureVerificationError::InvalidKey(
                "key type does not match signature algorithm".to_string(),
            )),
        }
    }
}
