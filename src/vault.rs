//! AES-256-GCM vault that keeps provider tokens encrypted at rest.
//!
//! Tokens are only ever persisted as vault ciphertexts; plaintext values exist transiently in
//! memory while a flow is in progress. Ciphertexts are `base64(nonce || aead output)` so they fit
//! a text column in any document store. Decryption authenticates the payload—malformed input or a
//! key mismatch surfaces [`VaultError`] instead of silently returning garbage.

// crates.io
use aes_gcm::{
	Aes256Gcm, Nonce,
	aead::{Aead, KeyInit},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use rand::RngCore;
// self
use crate::_prelude::*;

const KEY_SIZE: usize = 32;
const NONCE_SIZE: usize = 12;

/// Errors produced while sealing or opening vault ciphertexts.
#[derive(Debug, ThisError)]
pub enum VaultError {
	/// Key material is not exactly 32 bytes of hex.
	#[error("Encryption key must be {KEY_SIZE} bytes ({} hex characters).", KEY_SIZE * 2)]
	InvalidKey,
	/// Key material is not valid hex at all.
	#[error("Encryption key is not valid hex.")]
	KeyDecode(#[from] hex::FromHexError),
	/// Ciphertext is not valid base64.
	#[error("Ciphertext is not valid base64.")]
	CiphertextDecode(#[from] base64::DecodeError),
	/// Ciphertext is shorter than the prepended nonce.
	#[error("Ciphertext is too short to contain a nonce.")]
	CiphertextTooShort,
	/// Authenticated decryption failed; the data is corrupted or the key does not match.
	#[error("Decryption failed; the data is corrupted or the key does not match.")]
	DecryptionFailed,
	/// Encryption itself failed (should not happen with a valid key).
	#[error("Encryption failed.")]
	EncryptionFailed,
}

/// Process-wide symmetric vault constructed once at startup from the configured key.
#[derive(Clone)]
pub struct Vault {
	cipher: Aes256Gcm,
}
impl Vault {
	/// Creates a vault from a hex-encoded 32-byte key.
	pub fn new(key_hex: &str) -> Result<Self, VaultError> {
		let bytes = hex::decode(key_hex.trim())?;

		if bytes.len() != KEY_SIZE {
			return Err(VaultError::InvalidKey);
		}

		let cipher = Aes256Gcm::new_from_slice(&bytes).map_err(|_| VaultError::InvalidKey)?;

		Ok(Self { cipher })
	}

	/// Encrypts a plaintext token under a fresh random nonce.
	///
	/// Ciphertexts are non-deterministic, but `decrypt(encrypt(x)) == x` always holds.
	pub fn encrypt(&self, plaintext: &str) -> Result<String, VaultError> {
		let mut nonce_bytes = [0_u8; NONCE_SIZE];

		rand::rng().fill_bytes(&mut nonce_bytes);

		let nonce = Nonce::from_slice(&nonce_bytes);
		let ciphertext = self
			.cipher
			.encrypt(nonce, plaintext.as_bytes())
			.map_err(|_| VaultError::EncryptionFailed)?;
		let mut combined = nonce_bytes.to_vec();

		combined.extend(ciphertext);

		Ok(BASE64.encode(combined))
	}

	/// Opens a ciphertext produced by [`Vault::encrypt`].
	pub fn decrypt(&self, ciphertext_b64: &str) -> Result<String, VaultError> {
		let combined = BASE64.decode(ciphertext_b64)?;

		if combined.len() < NONCE_SIZE {
			return Err(VaultError::CiphertextTooShort);
		}

		let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
		let nonce = Nonce::from_slice(nonce_bytes);
		let plaintext = self
			.cipher
			.decrypt(nonce, ciphertext)
			.map_err(|_| VaultError::DecryptionFailed)?;

		String::from_utf8(plaintext).map_err(|_| VaultError::DecryptionFailed)
	}
}
impl Debug for Vault {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Vault").finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const TEST_KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

	fn vault() -> Vault {
		Vault::new(TEST_KEY).expect("Vault fixture key should be valid.")
	}

	#[test]
	fn round_trip_restores_plaintext() {
		let vault = vault();

		for plaintext in ["", "a", "BQDa-access-token", "refresh✓token with spaces"] {
			let sealed = vault.encrypt(plaintext).expect("Encryption should succeed.");

			assert_ne!(sealed, plaintext);
			assert_eq!(
				vault.decrypt(&sealed).expect("Decryption should restore the plaintext."),
				plaintext,
			);
		}
	}

	#[test]
	fn ciphertexts_are_non_deterministic() {
		let vault = vault();
		let first = vault.encrypt("same-token").expect("First encryption should succeed.");
		let second = vault.encrypt("same-token").expect("Second encryption should succeed.");

		assert_ne!(first, second);
	}

	#[test]
	fn wrong_key_fails_closed() {
		let sealed = vault().encrypt("secret").expect("Encryption should succeed.");
		let other = Vault::new("ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff")
			.expect("Alternate key should be valid hex.");
		let err = other.decrypt(&sealed).expect_err("Key mismatch must fail decryption.");

		assert!(matches!(err, VaultError::DecryptionFailed));
	}

	#[test]
	fn malformed_ciphertext_is_rejected() {
		let vault = vault();

		assert!(matches!(
			vault.decrypt("not base64 at all!"),
			Err(VaultError::CiphertextDecode(_)),
		));
		// "YWJj" decodes to three bytes, shorter than the nonce prefix.
		assert!(matches!(vault.decrypt("YWJj"), Err(VaultError::CiphertextTooShort)));
	}

	#[test]
	fn key_validation_rejects_bad_material() {
		assert!(matches!(Vault::new("zz"), Err(VaultError::KeyDecode(_))));
		assert!(matches!(Vault::new("abcd"), Err(VaultError::InvalidKey)));
	}
}
