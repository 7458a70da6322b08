//! Signed bearer-token codec for session claims.
//!
//! Tokens are `v1.auth.` + base64url(claims-json || tag), where the tag is an
//! HMAC-SHA256 over a length-prefixed encoding of header and payload, keyed by
//! a process-wide secret. Verification checks integrity before it trusts any
//! byte of the payload, then expiry.

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use super::claims::SessionClaims;

const HEADER: &str = "v1.auth.";
const TAG_LEN: usize = 32;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum TokenError {
    /// Structurally unusable: wrong prefix, bad base64, truncated body, or an
    /// authenticated payload that does not decode into claims.
    #[error("malformed token")]
    Malformed,
    /// Authentication tag mismatch.
    #[error("token signature mismatch")]
    Tampered,
    /// Signature is valid but the expiry has passed.
    #[error("token expired")]
    Expired,
    /// Claims could not be serialized at issuance.
    #[error("invalid claims json")]
    Json(#[from] serde_json::Error),
    /// Timestamp could not be formatted at issuance.
    #[error("time format error")]
    TimeFormat,
    /// Signing key rejected at construction.
    #[error("invalid signing key")]
    InvalidKey,
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenPayload {
    iat: String,
    exp: String,
    #[serde(flatten)]
    claims: SessionClaims,
}

/// Stateless issue/verify over a fixed signing secret.
///
/// The secret is immutable for the codec's lifetime; rotation means
/// constructing a new codec at process start.
#[derive(Clone)]
pub struct TokenCodec {
    mac: HmacSha256,
}

impl TokenCodec {
    /// Build a codec from the process-wide signing secret.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidKey`] for an empty secret.
    pub fn new(secret: &SecretString) -> Result<Self, TokenError> {
        let key = secret.expose_secret().as_bytes();
        if key.is_empty() {
            return Err(TokenError::InvalidKey);
        }
        let mac = HmacSha256::new_from_slice(key).map_err(|_| TokenError::InvalidKey)?;
        Ok(Self { mac })
    }

    /// Sign `claims` into a bearer token expiring `ttl_seconds` from now.
    ///
    /// # Errors
    ///
    /// Returns an error if the claims fail to serialize or the expiry cannot
    /// be represented.
    pub fn issue(&self, claims: &SessionClaims, ttl_seconds: i64) -> Result<String, TokenError> {
        self.issue_at(claims, ttl_seconds, OffsetDateTime::now_utc().unix_timestamp())
    }

    /// Issue with an explicit clock, for callers that pin time.
    ///
    /// # Errors
    ///
    /// See [`TokenCodec::issue`].
    pub fn issue_at(
        &self,
        claims: &SessionClaims,
        ttl_seconds: i64,
        now_unix_seconds: i64,
    ) -> Result<String, TokenError> {
        let payload = TokenPayload {
            iat: rfc3339_from_unix(now_unix_seconds)?,
            exp: rfc3339_from_unix(now_unix_seconds + ttl_seconds)?,
            claims: claims.clone(),
        };
        let payload = serde_json::to_vec(&payload)?;
        let tag = self.tag(&payload);

        let mut message = Vec::with_capacity(payload.len() + TAG_LEN);
        message.extend_from_slice(&payload);
        message.extend_from_slice(&tag);
        Ok(format!("{HEADER}{}", Base64UrlUnpadded::encode_string(&message)))
    }

    /// Decode and validate a token against the current clock.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Malformed`], [`TokenError::Tampered`], or
    /// [`TokenError::Expired`]; nothing else.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.verify_at(token, OffsetDateTime::now_utc().unix_timestamp())
    }

    /// Verification is a pure function of (token, clock, secret).
    ///
    /// # Errors
    ///
    /// See [`TokenCodec::verify`].
    pub fn verify_at(
        &self,
        token: &str,
        now_unix_seconds: i64,
    ) -> Result<SessionClaims, TokenError> {
        let body = token.strip_prefix(HEADER).ok_or(TokenError::Malformed)?;
        let message = Base64UrlUnpadded::decode_vec(body).map_err(|_| TokenError::Malformed)?;
        if message.len() <= TAG_LEN {
            return Err(TokenError::Malformed);
        }
        let (payload, tag) = message.split_at(message.len() - TAG_LEN);

        // Integrity first: no payload byte is trusted until the tag checks out.
        let mut mac = self.mac.clone();
        mac.update(&pae(&[HEADER.as_bytes(), payload]));
        mac.verify_slice(tag).map_err(|_| TokenError::Tampered)?;

        let payload: TokenPayload =
            serde_json::from_slice(payload).map_err(|_| TokenError::Malformed)?;
        let iat = unix_from_rfc3339(&payload.iat)?;
        let exp = unix_from_rfc3339(&payload.exp)?;

        if iat > now_unix_seconds {
            return Err(TokenError::Malformed);
        }
        if exp <= now_unix_seconds {
            return Err(TokenError::Expired);
        }
        if exp <= iat {
            return Err(TokenError::Malformed);
        }

        Ok(payload.claims)
    }

    fn tag(&self, payload: &[u8]) -> [u8; TAG_LEN] {
        let mut mac = self.mac.clone();
        mac.update(&pae(&[HEADER.as_bytes(), payload]));
        mac.finalize().into_bytes().into()
    }
}

fn rfc3339_from_unix(unix_seconds: i64) -> Result<String, TokenError> {
    let dt =
        OffsetDateTime::from_unix_timestamp(unix_seconds).map_err(|_| TokenError::TimeFormat)?;
    dt.format(&Rfc3339).map_err(|_| TokenError::TimeFormat)
}

fn unix_from_rfc3339(value: &str) -> Result<i64, TokenError> {
    let dt = OffsetDateTime::parse(value, &Rfc3339).map_err(|_| TokenError::Malformed)?;
    Ok(dt.unix_timestamp())
}

/// Pre-authentication encoding: each piece is length-prefixed so piece
/// boundaries cannot be shifted without changing the tag.
fn pae(pieces: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&le64(pieces.len() as u64));
    for piece in pieces {
        out.extend_from_slice(&le64(piece.len() as u64));
        out.extend_from_slice(piece);
    }
    out
}

fn le64(mut value: u64) -> [u8; 8] {
    let mut out = [0u8; 8];
    for (i, byte) in out.iter_mut().enumerate() {
        if i == 7 {
            value &= 0x7f;
        }
        *byte = (value & 0xff) as u8;
        value >>= 8;
    }
    out
}
