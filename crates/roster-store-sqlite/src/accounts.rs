//! [`UserStore`] implementation: accounts and login sessions.

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use roster_core::{
  store::UserStore,
  user::{NewUser, Session, User, UserId},
};

use crate::{
  Result, SqliteStore,
  encode::{RawUser, USER_COLUMNS, encode_dt, encode_user_id, now},
};

/// What happened to an account insert, decided inside one transaction.
enum InsertUser {
  Inserted,
  UsernameTaken,
  EmailTaken,
}

impl UserStore for SqliteStore {
  async fn create_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:       UserId::new(),
      username:      input.username,
      email:         input.email,
      first_name:    input.first_name,
      password_hash: input.password_hash,
      created_at:    now(),
    };

    let id_str     = encode_user_id(user.user_id);
    let at_str     = encode_dt(user.created_at);
    let username   = user.username.clone();
    let email      = user.email.clone();
    let first_name = user.first_name.clone();
    let hash       = user.password_hash.clone();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let username_taken = tx
          .query_row(
            "SELECT 1 FROM users WHERE username = ?1",
            rusqlite::params![username],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if username_taken {
          return Ok(InsertUser::UsernameTaken);
        }

        // `email` is declared COLLATE NOCASE, so this comparison is too.
        let email_taken = tx
          .query_row(
            "SELECT 1 FROM users WHERE email = ?1",
            rusqlite::params![email],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if email_taken {
          return Ok(InsertUser::EmailTaken);
        }

        tx.execute(
          &format!("INSERT INTO users ({USER_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
          rusqlite::params![id_str, username, email, first_name, hash, at_str],
        )?;
        tx.commit()?;
        Ok(InsertUser::Inserted)
      })
      .await?;

    match outcome {
      InsertUser::Inserted => Ok(user),
      InsertUser::UsernameTaken => {
        Err(roster_core::Error::UsernameTaken(user.username).into())
      }
      InsertUser::EmailTaken => Err(roster_core::Error::EmailTaken(user.email).into()),
    }
  }

  async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
    let username = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
              rusqlite::params![username],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn create_session(&self, session: Session) -> Result<()> {
    let user_str    = encode_user_id(session.user_id);
    let created_str = encode_dt(session.created_at);
    let expires_str = encode_dt(session.expires_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![session.token_hash, user_str, created_str, expires_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn session_user(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<User>> {
    let token_hash = token_hash.to_owned();
    let now_str    = encode_dt(now);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT u.user_id, u.username, u.email, u.first_name,
                      u.password_hash, u.created_at
               FROM sessions s
               JOIN users u ON u.user_id = s.user_id
               WHERE s.token_hash = ?1 AND s.expires_at > ?2",
              rusqlite::params![token_hash, now_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn delete_session(&self, token_hash: &str) -> Result<()> {
    let token_hash = token_hash.to_owned();

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

  async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
    let now_str = encode_dt(now);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sessions WHERE expires_at <= ?1",
          rusqlite::params![now_str],
        )?)
      })
      .await?;
    Ok(removed)
  }
}
