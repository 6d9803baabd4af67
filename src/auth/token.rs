// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared-secret admin token.
//!
//! Only an HMAC-SHA256 digest of the configured token is kept in memory.
//! Candidates are checked with `Mac::verify_slice`, which compares in
//! constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const DIGEST_KEY: &[u8] = b"church-giving-admin-token";

#[derive(Clone)]
pub struct AdminToken {
    digest: Vec<u8>,
}

impl AdminToken {
    /// `None` for an empty or whitespace-only secret.
    pub fn new(secret: &str) -> Option<Self> {
        let secret = secret.trim();
        if secret.is_empty() {
            return None;
        }
        Some(Self {
            digest: keyed(secret)?.finalize().into_bytes().to_vec(),
        })
    }

    pub fn verify(&self, candidate: &str) -> bool {
        keyed(candidate).is_some_and(|mac| mac.verify_slice(&self.digest).is_ok())
    }
}

impl std::fmt::Debug for AdminToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminToken(..)")
    }
}

fn keyed(value: &str) -> Option<HmacSha256> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(DIGEST_KEY).ok()?;
    mac.update(value.as_bytes());
    Some(mac)
}
