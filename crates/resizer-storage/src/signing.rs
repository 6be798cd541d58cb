//! Signed upload URLs for the local backend.
//!
//! Message: `PUT\n{bucket}\n{key}\n{expires_at}`.
//! Signature = base64url(HMAC-SHA256(secret, message)).
//!
//! A signature is accepted once. Consumed signatures are remembered until
//! their expiry passes.

use crate::{StorageError, StorageResult};
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub struct UploadSigner {
    secret: Vec<u8>,
    consumed: Mutex<HashMap<String, u64>>,
}

impl UploadSigner {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            consumed: Mutex::new(HashMap::new()),
        }
    }

    /// Unix timestamp `expires_in` from now.
    pub fn expiry_from_now(expires_in: Duration) -> u64 {
        unix_now().saturating_add(expires_in.as_secs())
    }

    pub fn sign(&self, bucket: &str, storage_key: &str, expires_at: u64) -> StorageResult<String> {
        let mac = self.mac(bucket, storage_key, expires_at)?;
        let tag = mac.finalize().into_bytes();
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(tag))
    }

    /// Check a presented signature and mark it used.
    pub fn verify_and_consume(
        &self,
        bucket: &str,
        storage_key: &str,
        expires_at: u64,
        signature: &str,
    ) -> StorageResult<()> {
        let tag = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| StorageError::SignatureRejected("malformed signature".to_string()))?;

        self.mac(bucket, storage_key, expires_at)?
            .verify_slice(&tag)
            .map_err(|_| StorageError::SignatureRejected("signature mismatch".to_string()))?;

        let now = unix_now();
        if now > expires_at {
            return Err(StorageError::SignatureRejected(
                "upload URL has expired".to_string(),
            ));
        }

        let mut consumed = self
            .consumed
            .lock()
            .map_err(|_| StorageError::BackendError("signature registry poisoned".to_string()))?;
        consumed.retain(|_, expiry| *expiry >= now);
        if consumed.contains_key(signature) {
            return Err(StorageError::SignatureRejected(
                "upload URL has already been used".to_string(),
            ));
        }
        consumed.insert(signature.to_string(), expires_at);

        Ok(())
    }

    fn mac(&self, bucket: &str, storage_key: &str, expires_at: u64) -> StorageResult<Hmac<Sha256>> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.secret)
            .map_err(|e| StorageError::ConfigError(format!("Invalid signing secret: {}", e)))?;
        mac.update(format!("PUT\n{}\n{}\n{}", bucket, storage_key, expires_at).as_bytes());
        Ok(mac)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> UploadSigner {
        UploadSigner::new(b"0123456789abcdef0123456789abcdef".to_vec())
    }

    #[test]
    fn signature_is_accepted_once() {
        let signer = signer();
        let expires_at = UploadSigner::expiry_from_now(Duration::from_secs(60));
        let sig = signer.sign("src", "cat.png", expires_at).unwrap();

        assert!(signer
            .verify_and_consume("src", "cat.png", expires_at, &sig)
            .is_ok());
        assert!(matches!(
            signer.verify_and_consume("src", "cat.png", expires_at, &sig),
            Err(StorageError::SignatureRejected(_))
        ));
    }

    #[test]
    fn signature_is_scoped_to_bucket_and_key() {
        let signer = signer();
        let expires_at = UploadSigner::expiry_from_now(Duration::from_secs(60));
        let sig = signer.sign("src", "cat.png", expires_at).unwrap();

        assert!(signer
            .verify_and_consume("src", "dog.png", expires_at, &sig)
            .is_err());
        assert!(signer
            .verify_and_consume("dest", "cat.png", expires_at, &sig)
            .is_err());
        assert!(signer
            .verify_and_consume("src", "cat.png", expires_at + 1, &sig)
            .is_err());
    }

    #[test]
    fn expired_signature_is_rejected() {
        let signer = signer();
        let expires_at = unix_now() - 10;
        let sig = signer.sign("src", "cat.png", expires_at).unwrap();

        let err = signer
            .verify_and_consume("src", "cat.png", expires_at, &sig)
            .unwrap_err();
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn garbage_signature_is_rejected() {
        let signer = signer();
        let expires_at = UploadSigner::expiry_from_now(Duration::from_secs(60));
        assert!(signer
            .verify_and_consume("src", "cat.png", expires_at, "not base64!")
            .is_err());
    }
}
