//! Entitlement authorities.
//!
//! The "Developer" badge is unlocked by redeeming a code. The client never
//! holds the accepted code itself: it asks an [`EntitlementAuthority`],
//! which either compares against a BLAKE3 digest handed out by the operator
//! or verifies a redemption token signed by an issuing server.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::constants::KDF_CONTEXT_PROMO_CODE;
use crate::error::EntitlementError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Badge {
    Developer,
}

/// What a successful redemption unlocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub badge: Badge,
    pub valid_until: Option<DateTime<Utc>>,
}

impl Grant {
    pub fn developer() -> Self {
        Self {
            badge: Badge::Developer,
            valid_until: None,
        }
    }
}

/// Decides whether a redemption code unlocks an entitlement for `holder`
/// (the user's handle).
pub trait EntitlementAuthority: Send + Sync {
    fn verify(&self, code: &str, holder: &str) -> Result<Grant, EntitlementError>;
}

/// Authority used when nothing is configured: rejects every code.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl EntitlementAuthority for DenyAll {
    fn verify(&self, _code: &str, _holder: &str) -> Result<Grant, EntitlementError> {
        Err(EntitlementError::Rejected)
    }
}

// ---------------------------------------------------------------------------
// Digest authority
// ---------------------------------------------------------------------------

/// Accepts the single code whose BLAKE3 digest it was configured with.
#[derive(Clone)]
pub struct DigestAuthority {
    digest: [u8; 32],
}

impl DigestAuthority {
    pub fn new(digest: [u8; 32]) -> Self {
        Self { digest }
    }

    /// Parse a 64-character hex digest, as produced by [`Self::digest_code`].
    pub fn from_hex(hex_digest: &str) -> Result<Self, EntitlementError> {
        Ok(Self::new(parse_hex_key(hex_digest)?))
    }

    /// Build an authority accepting `code`. Meant for tooling and tests; the
    /// running client is configured with the digest only.
    pub fn for_code(code: &str) -> Self {
        Self::new(Self::digest_code(code))
    }

    pub fn digest_code(code: &str) -> [u8; 32] {
        blake3::derive_key(KDF_CONTEXT_PROMO_CODE, code.as_bytes())
    }
}

impl EntitlementAuthority for DigestAuthority {
    fn verify(&self, code: &str, _holder: &str) -> Result<Grant, EntitlementError> {
        let candidate = Self::digest_code(code);
        if bool::from(candidate[..].ct_eq(&self.digest[..])) {
            Ok(Grant::developer())
        } else {
            Err(EntitlementError::Rejected)
        }
    }
}

// ---------------------------------------------------------------------------
// Signed redemption tokens
// ---------------------------------------------------------------------------

// Token signed by the issuing server, presented by the user as a code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionToken {
    pub holder: String,
    pub valid_until: DateTime<Utc>,
    pub signature: Vec<u8>,
}

// payload = holder || 0x00 || valid_until (rfc3339)
fn signing_payload(holder: &str, valid_until: &DateTime<Utc>) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(holder.as_bytes());
    payload.push(0);
    payload.extend_from_slice(valid_until.to_rfc3339().as_bytes());
    payload
}

impl RedemptionToken {
    pub fn issue(holder: &str, valid_until: DateTime<Utc>, issuer_key: &SigningKey) -> Self {
        use ed25519_dalek::Signer;

        let signature = issuer_key.sign(&signing_payload(holder, &valid_until));

        Self {
            holder: holder.to_string(),
            valid_until,
            signature: signature.to_bytes().to_vec(),
        }
    }

    /// Encode as the string the user types or pastes into the redeem dialog.
    pub fn encode(&self) -> Result<String, EntitlementError> {
        let json = serde_json::to_vec(self)
            .map_err(|e| EntitlementError::MalformedToken(e.to_string()))?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    pub fn decode(code: &str) -> Result<Self, EntitlementError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(code.trim())
            .map_err(|e| EntitlementError::MalformedToken(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| EntitlementError::MalformedToken(e.to_string()))
    }
}

/// Verifies redemption tokens against the issuer's Ed25519 public key.
#[derive(Clone)]
pub struct TokenAuthority {
    issuer_pubkey: [u8; 32],
}

impl TokenAuthority {
    pub fn new(issuer_pubkey: [u8; 32]) -> Self {
        Self { issuer_pubkey }
    }

    pub fn from_hex(hex_key: &str) -> Result<Self, EntitlementError> {
        let key = parse_hex_key(hex_key)?;
        VerifyingKey::from_bytes(&key).map_err(|e| EntitlementError::InvalidKey(e.to_string()))?;
        Ok(Self::new(key))
    }
}

impl EntitlementAuthority for TokenAuthority {
    fn verify(&self, code: &str, holder: &str) -> Result<Grant, EntitlementError> {
        let token = RedemptionToken::decode(code)?;

        if token.holder != holder {
            return Err(EntitlementError::WrongHolder);
        }
        if Utc::now() > token.valid_until {
            return Err(EntitlementError::Expired);
        }

        let verifying_key = VerifyingKey::from_bytes(&self.issuer_pubkey)
            .map_err(|e| EntitlementError::InvalidKey(e.to_string()))?;
        let signature = Signature::from_slice(&token.signature)
            .map_err(|e| EntitlementError::MalformedToken(e.to_string()))?;

        verifying_key
            .verify(&signing_payload(&token.holder, &token.valid_until), &signature)
            .map_err(|_| EntitlementError::Rejected)?;

        Ok(Grant {
            badge: Badge::Developer,
            valid_until: Some(token.valid_until),
        })
    }
}

fn parse_hex_key(hex_key: &str) -> Result<[u8; 32], EntitlementError> {
    let bytes = hex::decode(hex_key.trim()).map_err(|e| EntitlementError::InvalidKey(e.to_string()))?;
    if bytes.len() != 32 {
        return Err(EntitlementError::InvalidKey(format!(
            "expected 32 bytes, got {}",
            bytes.len()
        )));
    }
    let mut key = [0u8; 32];
    key.copy_from_slice(&bytes);
    Ok(key)
}
