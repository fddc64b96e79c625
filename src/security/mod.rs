// src/security/mod.rs
//
// Startup unlock check. Operators seal a fixed check phrase under a
// passphrase-derived key; a run only proceeds if the configured token
// decrypts back to that phrase with the passphrase supplied at launch.
use crate::error::{QuestError, QuestResult};
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use argon2::{password_hash::SaltString, Argon2, PasswordHasher};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

const CHECK_PHRASE: &str = "wallet secrets unlocked";

/// Sealed check-token envelope, base64(JSON)-encoded for the settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EncryptedToken {
    ciphertext: Vec<u8>,
    nonce: [u8; 12],
    salt: String,
    version: u8,
}

/// Seal the check phrase under a fresh salt. The result goes into the
/// settings file as `check_token`.
pub fn seal_check_token(passphrase: &str) -> QuestResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let key = derive_key(passphrase, &salt)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_slice()));

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, CHECK_PHRASE.as_bytes())
        .map_err(|e| QuestError::Encryption(e.to_string()))?;

    let token = EncryptedToken {
        ciphertext,
        nonce: nonce.into(),
        salt: salt.as_str().to_string(),
        version: 1,
    };

    let encoded = serde_json::to_vec(&token).map_err(|e| QuestError::Encryption(e.to_string()))?;
    Ok(general_purpose::STANDARD.encode(encoded))
}

/// True when the passphrase opens the sealed token back to the check phrase.
pub fn verify_check_token(passphrase: &str, token: &str) -> bool {
    open_check_token(passphrase, token)
        .map(|plain| plain.as_slice() == CHECK_PHRASE.as_bytes())
        .unwrap_or(false)
}

fn open_check_token(passphrase: &str, token: &str) -> QuestResult<Zeroizing<Vec<u8>>> {
    let decoded = general_purpose::STANDARD
        .decode(token)
        .map_err(|e| QuestError::Decryption(e.to_string()))?;
    let token: EncryptedToken =
        serde_json::from_slice(&decoded).map_err(|e| QuestError::Decryption(e.to_string()))?;

    if token.version != 1 {
        return Err(QuestError::Decryption(format!(
            "unsupported token version: {}",
            token.version
        )));
    }

    let salt = SaltString::from_b64(&token.salt)
        .map_err(|e| QuestError::Decryption(e.to_string()))?;
    let key = derive_key(passphrase, &salt)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_slice()));

    let plain = cipher
        .decrypt(
            Nonce::from_slice(&token.nonce),
            token.ciphertext.as_slice(),
        )
        .map_err(|e| QuestError::Decryption(e.to_string()))?;
    Ok(Zeroizing::new(plain))
}

/// Derive the 32-byte AES key from the passphrase with Argon2.
fn derive_key(passphrase: &str, salt: &SaltString) -> QuestResult<Zeroizing<[u8; 32]>> {
    let hash = Argon2::default()
        .hash_password(passphrase.as_bytes(), salt)
        .map_err(|e| QuestError::Encryption(e.to_string()))?;
    let output = hash
        .hash
        .ok_or_else(|| QuestError::Encryption("no key material derived".to_string()))?;

    let bytes = output.as_bytes();
    if bytes.len() < 32 {
        return Err(QuestError::Encryption("derived key too short".to_string()));
    }
    let mut key = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(&bytes[..32]);
    Ok(key)
}
