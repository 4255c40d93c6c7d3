// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! HMAC-SHA256 webhook signatures.
//!
//! Webhook senders sign the raw request body with a shared secret and send
//! the result as `sha256=<hex-digest>`. [`verify`] recomputes the digest and
//! compares it in constant time.
//!
//! ```
//! use account_ledger::signature;
//!
//! let header = signature::sign(b"secret", br#"{"action":"completed"}"#).unwrap();
//! assert!(signature::verify(b"secret", br#"{"action":"completed"}"#, &header).is_ok());
//! ```

use crate::error::SignatureError;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const PREFIX: &str = "sha256=";

fn mac(secret: &[u8], body: &[u8]) -> Result<HmacSha256, SignatureError> {
    // HMAC accepts any key length; an empty one would let anyone sign.
    if secret.is_empty() {
        return Err(SignatureError::InvalidSecret);
    }
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::InvalidSecret)?;
    mac.update(body);
    Ok(mac)
}

/// Signs `body`, returning the header value `sha256=<hex-digest>`.
///
/// # Errors
///
/// [`SignatureError::InvalidSecret`] if `secret` is empty.
pub fn sign(secret: &[u8], body: &[u8]) -> Result<String, SignatureError> {
    let digest = mac(secret, body)?.finalize().into_bytes();
    Ok(format!("{PREFIX}{}", hex::encode(digest)))
}

/// Verifies a `sha256=<hex-digest>` header against `body`.
///
/// # Errors
///
/// - [`SignatureError::InvalidSecret`] - `secret` is empty.
/// - [`SignatureError::MissingPrefix`] - header does not start with `sha256=`.
/// - [`SignatureError::InvalidHex`] - digest is not hex.
/// - [`SignatureError::Mismatch`] - digest does not match the body.
pub fn verify(secret: &[u8], body: &[u8], header: &str) -> Result<(), SignatureError> {
    let digest = header
        .strip_prefix(PREFIX)
        .ok_or(SignatureError::MissingPrefix)?;
    let expected = hex::decode(digest).map_err(|_| SignatureError::InvalidHex)?;

    // verify_slice compares in constant time.
    mac(secret, body)?
        .verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}
