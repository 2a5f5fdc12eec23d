//! [`SqliteStore`] and its [`ContactStore`] implementation.

use std::path::Path;

use rusqlite::{OptionalExtension as _, functions::FunctionFlags};
use uuid::Uuid;

use roster_core::{
  contact::{Contact, ContactPatch, NewContact},
  query::ContactQuery,
  store::{ContactStore, Store},
  user::UserId,
};

use crate::{
  Error, Result,
  encode::{
    CONTACT_COLUMNS, RawContact, encode_category, encode_user_id, encode_uuid,
    like_pattern, now,
  },
  schema::SCHEMA,
};

/// Shared `WHERE` clause for `list` and `count`.
///
/// `?1` owner, `?2` LIKE pattern or NULL, `?3` category or NULL,
/// `?4` favorites-only flag. Both sides of the search go through
/// [`FOLD_FN`], since `LIKE` alone only folds ASCII.
const FILTER: &str = r"owner_id = ?1
  AND (?2 IS NULL
       OR fold(name)  LIKE fold(?2) ESCAPE '\'
       OR fold(email) LIKE fold(?2) ESCAPE '\'
       OR fold(phone) LIKE fold(?2) ESCAPE '\')
  AND (?3 IS NULL OR category = ?3)
  AND (?4 = 0 OR is_favorite = 1)";

/// Unicode lowercase, registered on every connection.
const FOLD_FN: &str = "fold";

fn register_fold(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    FOLD_FN,
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| s.to_lowercase())),
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Roster store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        register_fold(conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Bound parameters for [`FILTER`], owned so they can move onto the
/// connection thread.
struct FilterParams {
  owner:          String,
  pattern:        Option<String>,
  category:       Option<&'static str>,
  favorites_only: bool,
}

impl FilterParams {
  fn new(owner: UserId, query: &ContactQuery) -> Self {
    Self {
      owner:          encode_user_id(owner),
      pattern:        query.search.as_deref().map(like_pattern),
      category:       query.category.map(encode_category),
      favorites_only: query.favorites_only,
    }
  }
}

// ─── ContactStore impl ───────────────────────────────────────────────────────

impl Store for SqliteStore {
  type Error = Error;
}

impl ContactStore for SqliteStore {
  async fn create(&self, owner: UserId, input: NewContact) -> Result<Contact> {
    let input = input.validate()?;

    let contact = Contact {
      contact_id:  Uuid::new_v4(),
      owner_id:    owner,
      name:        input.name,
      phone:       input.phone,
      email:       input.email,
      address:     input.address,
      category:    input.category,
      is_favorite: input.is_favorite,
      created_at:  now(),
    };

    let raw = RawContact::from_contact(&contact);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO contacts ({CONTACT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
          ),
          rusqlite::params![
            raw.contact_id,
            raw.owner_id,
            raw.name,
            raw.phone,
            raw.email,
            raw.address,
            raw.category,
            raw.is_favorite,
            raw.created_at,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(contact)
  }

  async fn get(&self, owner: UserId, id: Uuid) -> Result<Contact> {
    let id_str    = encode_uuid(id);
    let owner_str = encode_user_id(owner);

    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {CONTACT_COLUMNS} FROM contacts
                 WHERE contact_id = ?1 AND owner_id = ?2"
              ),
              rusqlite::params![id_str, owner_str],
              RawContact::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .ok_or(roster_core::Error::ContactNotFound(id))?
      .into_contact()
  }

  async fn list(&self, owner: UserId, query: &ContactQuery) -> Result<Vec<Contact>> {
    let filter = FilterParams::new(owner, query);
    // SQLite treats a negative LIMIT as "no limit".
    let limit  = query.limit.map_or(-1, |n| n as i64);
    let offset = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawContact> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CONTACT_COLUMNS} FROM contacts
           WHERE {FILTER}
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?5 OFFSET ?6"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              filter.owner,
              filter.pattern,
              filter.category,
              filter.favorites_only,
              limit,
              offset,
            ],
            RawContact::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }

  async fn count(&self, owner: UserId, query: &ContactQuery) -> Result<usize> {
    let filter = FilterParams::new(owner, query);

    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!("SELECT COUNT(*) FROM contacts WHERE {FILTER}"),
          rusqlite::params![
            filter.owner,
            filter.pattern,
            filter.category,
            filter.favorites_only,
          ],
          |r| r.get(0),
        )?)
      })
      .await?;

    Ok(n as usize)
  }

  async fn update(&self, owner: UserId, id: Uuid, patch: ContactPatch) -> Result<Contact> {
    let mut contact = self.get(owner, id).await?;
    if patch.is_empty() {
      return Ok(contact);
    }
    contact.apply(patch)?;

    let raw = RawContact::from_contact(&contact);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE contacts
           SET name = ?3, phone = ?4, email = ?5, address = ?6,
               category = ?7, is_favorite = ?8
           WHERE contact_id = ?1 AND owner_id = ?2",
          rusqlite::params![
            raw.contact_id,
            raw.owner_id,
            raw.name,
            raw.phone,
            raw.email,
            raw.address,
            raw.category,
            raw.is_favorite,
          ],
        )?)
      })
      .await?;

    // Deleted between the read and the write.
    if changed == 0 {
      return Err(roster_core::Error::ContactNotFound(id).into());
    }
    Ok(contact)
  }

  async fn delete(&self, owner: UserId, id: Uuid) -> Result<()> {
    let id_str    = encode_uuid(id);
    let owner_str = encode_user_id(owner);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM contacts WHERE contact_id = ?1 AND owner_id = ?2",
          rusqlite::params![id_str, owner_str],
        )?)
      })
      .await?;

    if removed == 0 {
      return Err(roster_core::Error::ContactNotFound(id).into());
    }
    Ok(())
  }

  async fn toggle_favorite(&self, owner: UserId, id: Uuid) -> Result<bool> {
    let id_str    = encode_uuid(id);
    let owner_str = encode_user_id(owner);

    let flipped: Option<bool> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "UPDATE contacts SET is_favorite = NOT is_favorite
               WHERE contact_id = ?1 AND owner_id = ?2
               RETURNING is_favorite",
              rusqlite::params![id_str, owner_str],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    flipped.ok_or_else(|| Error::Core(roster_core::Error::ContactNotFound(id)))
  }
}
