//! The local identity provider: one-time sign-in codes and opaque session
//! tokens.
//!
//! Codes and tokens are 32 random bytes, hex-encoded. Only their SHA-256
//! hashes are persisted, so a leaked database cannot be replayed.

use rand_core::{OsRng, RngCore as _};
use rusqlite::OptionalExtension as _;
use sha2::{Digest as _, Sha256};
use uuid::Uuid;

use creatorlink_core::{
  session::{Identity, Session},
  store::IdentityProvider,
};

use crate::{
  Error, Result,
  encode::{decode_dt, decode_uuid, encode_dt, encode_uuid, now},
  store::SqliteStore,
};

fn random_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

fn hash_token(token: &str) -> String {
  hex::encode(Sha256::digest(token.trim().as_bytes()))
}

impl SqliteStore {
  /// Mint a one-time sign-in code for `email`, creating the user on first
  /// use. The plaintext code is returned once and never stored.
  pub async fn issue_code(&self, email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let code = random_token();
    let code_hash = hash_token(&code);
    let issued_at = now();
    let now_str = encode_dt(issued_at);
    let expires_str = encode_dt(issued_at + self.code_ttl);
    let new_user_id = encode_uuid(Uuid::new_v4());

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO users (user_id, email, created_at) VALUES (?1, ?2, ?3)
           ON CONFLICT (email) DO NOTHING",
          rusqlite::params![new_user_id, email, now_str],
        )?;
        let user_id: String = tx.query_row(
          "SELECT user_id FROM users WHERE email = ?1",
          rusqlite::params![email],
          |r| r.get(0),
        )?;
        tx.execute(
          "INSERT INTO auth_codes (code_hash, user_id, expires_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![code_hash, user_id, expires_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(code)
  }

  /// Remove expired codes and sessions. Returns the number of rows deleted.
  pub async fn purge_expired(&self) -> Result<usize> {
    let now_str = encode_dt(now());
    let n = self
      .conn
      .call(move |conn| {
        let codes = conn.execute(
          "DELETE FROM auth_codes WHERE expires_at <= ?1",
          rusqlite::params![now_str],
        )?;
        let sessions = conn.execute(
          "DELETE FROM sessions WHERE expires_at <= ?1",
          rusqlite::params![now_str],
        )?;
        Ok(codes + sessions)
      })
      .await?;
    Ok(n)
  }
}

impl IdentityProvider for SqliteStore {
  type AuthError = Error;

  async fn exchange_code(&self, code: &str) -> Result<Session> {
    let code_hash = hash_token(code);
    let token = random_token();
    let token_hash = hash_token(&token);
    let issued_at = now();
    let expires_at = issued_at + self.session_ttl;
    let now_str = encode_dt(issued_at);
    let expires_str = encode_dt(expires_at);

    let found: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let row: Option<(String, String)> = tx
          .query_row(
            "SELECT c.user_id, u.email
             FROM auth_codes c
             JOIN users u ON u.user_id = c.user_id
             WHERE c.code_hash = ?1 AND c.used_at IS NULL AND c.expires_at > ?2",
            rusqlite::params![code_hash, now_str],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;
        let Some((user_id, email)) = row else {
          return Ok(None);
        };
        tx.execute(
          "UPDATE auth_codes SET used_at = ?2 WHERE code_hash = ?1",
          rusqlite::params![code_hash, now_str],
        )?;
        tx.execute(
          "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![token_hash, user_id, now_str, expires_str],
        )?;
        tx.commit()?;
        Ok(Some((user_id, email)))
      })
      .await?;

    let (user_id, email) = found.ok_or(Error::InvalidCode)?;
    Ok(Session {
      token,
      identity: Identity { user_id: decode_uuid(&user_id)?, email },
      expires_at,
    })
  }

  async fn resolve_session(&self, token: &str) -> Result<Option<Session>> {
    let token_hash = hash_token(token);
    let now_str = encode_dt(now());

    let row: Option<(String, String, String)> = self
      .conn
      .call(move |conn| {
        let row: Option<(String, String, String)> = conn
          .query_row(
            "SELECT s.user_id, u.email, s.expires_at
             FROM sessions s
             JOIN users u ON u.user_id = s.user_id
             WHERE s.token_hash = ?1 AND s.expires_at > ?2",
            rusqlite::params![token_hash, now_str],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
          )
          .optional()?;
        if row.is_none() {
          conn.execute(
            "DELETE FROM sessions WHERE token_hash = ?1 AND expires_at <= ?2",
            rusqlite::params![token_hash, now_str],
          )?;
        }
        Ok(row)
      })
      .await?;

    let Some((user_id, email, expires_at)) = row else {
      return Ok(None);
    };
    Ok(Some(Session {
      token:      token.trim().to_owned(),
      identity:   Identity { user_id: decode_uuid(&user_id)?, email },
      expires_at: decode_dt(&expires_at)?,
    }))
  }

  async fn revoke_session(&self, token: &str) -> Result<()> {
    let token_hash = hash_token(token);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM sessions WHERE token_hash = ?1",
          rusqlite::params![token_hash],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tokens_are_random_hex() {
    let (a, b) = (random_token(), random_token());
    assert_eq!(a.len(), 64);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a, b);
  }

  #[test]
  fn hashing_ignores_surrounding_whitespace() {
    assert_eq!(hash_token(" abc\n"), hash_token("abc"));
    assert_ne!(hash_token("abc"), hash_token("abd"));
  }
}
