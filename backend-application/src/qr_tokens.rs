// Signed QR payloads
// The scannable payload wraps the ticket's qr_id in an HMAC-signed
// envelope so forged codes are rejected before any store lookup. Raw
// qr_ids keep working for manual front-desk entry.

use anyhow::anyhow;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::AppError;

const TOKEN_PREFIX: &str = "entrada";
const TOKEN_VERSION: &str = "v1";

type HmacSha256 = Hmac<Sha256>;

/// Build the scannable payload for a qr_id: `entrada.v1.<qr_id>.<sig>`.
pub fn issue(secret: &str, qr_id: &str) -> Result<String, AppError> {
    let signature = sign(secret, qr_id)?;
    Ok(format!(
        "{}.{}.{}.{}",
        TOKEN_PREFIX, TOKEN_VERSION, qr_id, signature
    ))
}

/// Resolve a scanned payload to its qr_id.
///
/// Signed payloads are verified; anything not carrying the envelope
/// prefix is treated as a raw qr_id typed in by hand.
pub fn resolve_qr_id(secret: &str, scanned: &str) -> Result<String, AppError> {
    let scanned = scanned.trim();
    if scanned.is_empty() {
        return Err(AppError::InvalidInput("empty qr payload".to_string()));
    }
    if !scanned.starts_with(TOKEN_PREFIX) {
        return Ok(scanned.to_string());
    }
    let parts: Vec<&str> = scanned.split('.').collect();
    if parts.len() != 4 || parts[0] != TOKEN_PREFIX || parts[1] != TOKEN_VERSION {
        return Err(AppError::InvalidInput("malformed qr payload".to_string()));
    }
    let qr_id = parts[2];
    let expected = sign(secret, qr_id)?;
    if expected != parts[3] {
        return Err(AppError::InvalidInput("qr signature mismatch".to_string()));
    }
    Ok(qr_id.to_string())
}

fn sign(secret: &str, qr_id: &str) -> Result<String, AppError> {
    let payload = format!("{}|{}|{}", TOKEN_PREFIX, TOKEN_VERSION, qr_id);
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|err| AppError::Internal(anyhow!("hmac init failed: {err}")))?;
    mac.update(payload.as_bytes());
    let digest = mac.finalize().into_bytes();

    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    Ok(out)
}
