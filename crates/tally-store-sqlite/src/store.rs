//! [`SqliteStore`] — the SQLite implementation of [`Store`].

use std::{path::Path, time::Duration};

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior, types::Value};
use tally_core::{
  PostId,
  comment::{Comment, NewComment},
  identity::{Identity, Lookup},
  post::Post,
  score::Tally,
  store::Store,
  vote::VoteAction,
};

use crate::{
  Error, Result,
  encode::{
    RawComment, RawIdentity, RawPost, decode_action, decode_id, encode_action,
    encode_count, encode_dt, encode_id,
  },
  schema::SCHEMA,
};

/// How long a writer waits on a lock held by another connection before the
/// statement fails with `SQLITE_BUSY`.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const POST_COLUMNS: &str = "
  p.id, p.title, p.text, p.images, p.verified, p.views, p.created_at,
  i.id, i.name, i.vip, i.staff,
  (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id),
  (SELECT COALESCE(SUM(v.action), 0) FROM votes v WHERE v.post_id = p.id)";

const TALLY_SQL: &str = "
  SELECT
    COALESCE(SUM(CASE WHEN action =  1 THEN 1 ELSE 0 END), 0),
    COALESCE(SUM(CASE WHEN action = -1 THEN 1 ELSE 0 END), 0)
  FROM votes WHERE post_id = ?1";

fn raw_post(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPost> {
  Ok(RawPost {
    id:           row.get(0)?,
    title:        row.get(1)?,
    text:         row.get(2)?,
    images:       row.get(3)?,
    verified:     row.get(4)?,
    views:        row.get(5)?,
    created_at:   row.get(6)?,
    author_id:    row.get(7)?,
    author_name:  row.get(8)?,
    author_vip:   row.get(9)?,
    author_staff: row.get(10)?,
    comments:     row.get(11)?,
    score:        row.get(12)?,
  })
}

/// Up/down counts for a post, read on `conn` (or an open transaction).
fn count_votes(conn: &rusqlite::Connection, post_val: i64) -> rusqlite::Result<(i64, i64)> {
  conn.query_row(TALLY_SQL, rusqlite::params![post_val], |r| Ok((r.get(0)?, r.get(1)?)))
}

fn decode_tally((up, down): (i64, i64)) -> Result<Tally> {
  Ok(Tally::new(decode_id(up)?, decode_id(down)?))
}

fn raw_identity(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawIdentity> {
  Ok(RawIdentity {
    id:      row.get(0)?,
    name:    row.get(1)?,
    address: row.get(2)?,
    vip:     row.get(3)?,
    staff:   row.get(4)?,
  })
}

/// Split a lookup into its `WHERE` clause and bound value.
fn identity_key(lookup: Lookup) -> Result<(&'static str, Value)> {
  Ok(match lookup {
    Lookup::Id(id) => ("id = ?1", Value::Integer(encode_id(id)?)),
    Lookup::Address(address) => ("address = ?1", Value::Text(address)),
  })
}

// ─── Admin input ─────────────────────────────────────────────────────────────

/// A post to insert. Posts are authored outside this backend; this exists for
/// seeding and tests.
#[derive(Debug, Clone)]
pub struct NewPost {
  pub address:  String,
  pub title:    String,
  pub text:     String,
  pub images:   Vec<String>,
  pub verified: bool,
  pub public:   bool,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tally store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Several
/// stores (or processes) may open the same file; WAL mode and a busy timeout
/// serialise their writes.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
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
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a post and return its id.
  pub async fn add_post(&self, post: NewPost) -> Result<PostId> {
    let created_at = encode_dt(Utc::now());
    let images = post.images.join(",");

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO posts (address, title, text, images, verified, public, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            post.address,
            post.title,
            post.text,
            images,
            post.verified,
            post.public,
            created_at,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    decode_id(id)
  }

  /// Set the administrative flags on an identity.
  pub async fn set_identity_flags(&self, id: u64, vip: bool, staff: bool) -> Result<()> {
    let id_val = encode_id(id)?;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE identities SET vip = ?2, staff = ?3 WHERE id = ?1",
          rusqlite::params![id_val, vip, staff],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::IdentityNotFound(id.to_string()));
    }
    Ok(())
  }

  /// Number of ledger rows for the pair.
  pub(crate) async fn count_vote_rows(&self, post_id: PostId, address: &str) -> Result<u64> {
    let post_val = encode_id(post_id)?;
    let address = address.to_owned();

    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM votes WHERE post_id = ?1 AND address = ?2",
          rusqlite::params![post_val, address],
          |r| r.get(0),
        )?)
      })
      .await?;

    decode_id(n)
  }
}

// ─── Store impl ──────────────────────────────────────────────────────────────

impl Store for SqliteStore {
  type Error = Error;

  // ── Identities ────────────────────────────────────────────────────────────

  async fn identity_exists(&self, lookup: Lookup) -> Result<bool> {
    let (clause, key) = identity_key(lookup)?;

    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT 1 FROM identities WHERE {clause}"),
              [key],
              |_| Ok(()),
            )
            .optional()?
            .is_some(),
        )
      })
      .await?;

    Ok(found)
  }

  async fn get_identity(&self, lookup: Lookup) -> Result<Option<Identity>> {
    let (clause, key) = identity_key(lookup)?;

    let raw: Option<RawIdentity> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT id, name, address, vip, staff FROM identities WHERE {clause}"
              ),
              [key],
              raw_identity,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawIdentity::into_identity).transpose()
  }

  async fn insert_identity_if_absent(
    &self,
    address: String,
    name: String,
  ) -> Result<(Identity, bool)> {
    let created_at = encode_dt(Utc::now());

    let (raw, inserted): (RawIdentity, usize) = self
      .conn
      .call(move |conn| {
        // Take the write lock up front so the read-back sees our insert or
        // the row that beat it.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let inserted = tx.execute(
          "INSERT INTO identities (name, address, created_at) VALUES (?1, ?2, ?3)
           ON CONFLICT (address) DO NOTHING",
          rusqlite::params![name, address, created_at],
        )?;
        let raw = tx.query_row(
          "SELECT id, name, address, vip, staff FROM identities WHERE address = ?1",
          rusqlite::params![address],
          raw_identity,
        )?;
        tx.commit()?;
        Ok((raw, inserted))
      })
      .await?;

    Ok((raw.into_identity()?, inserted > 0))
  }

  // ── Name pool ─────────────────────────────────────────────────────────────

  async fn load_names(&self) -> Result<Vec<String>> {
    let names = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT name FROM names ORDER BY name")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(names)
  }

  async fn add_names(&self, names: Vec<String>) -> Result<usize> {
    let added = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut added = 0;
        {
          let mut stmt = tx.prepare("INSERT OR IGNORE INTO names (name) VALUES (?1)")?;
          for name in &names {
            added += stmt.execute(rusqlite::params![name])?;
          }
        }
        tx.commit()?;
        Ok(added)
      })
      .await?;
    Ok(added)
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  async fn upsert_vote(
    &self,
    post_id: PostId,
    address: String,
    action: VoteAction,
  ) -> Result<Tally> {
    let post_val = encode_id(post_id)?;
    let action_val = encode_action(action);

    let counts = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
          "INSERT INTO votes (post_id, address, action) VALUES (?1, ?2, ?3)
           ON CONFLICT (post_id, address) DO UPDATE SET action = excluded.action",
          rusqlite::params![post_val, address, action_val],
        )?;
        let counts = count_votes(&tx, post_val)?;
        tx.commit()?;
        Ok(counts)
      })
      .await?;

    decode_tally(counts)
  }

  async fn delete_vote(&self, post_id: PostId, address: String) -> Result<Tally> {
    let post_val = encode_id(post_id)?;

    let counts = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
          "DELETE FROM votes WHERE post_id = ?1 AND address = ?2",
          rusqlite::params![post_val, address],
        )?;
        let counts = count_votes(&tx, post_val)?;
        tx.commit()?;
        Ok(counts)
      })
      .await?;

    decode_tally(counts)
  }

  async fn get_vote(&self, post_id: PostId, address: String) -> Result<Option<VoteAction>> {
    let post_val = encode_id(post_id)?;

    let raw: Option<i64> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT action FROM votes WHERE post_id = ?1 AND address = ?2",
              rusqlite::params![post_val, address],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(decode_action).transpose()
  }

  async fn tally(&self, post_id: PostId) -> Result<Tally> {
    let post_val = encode_id(post_id)?;

    let counts = self
      .conn
      .call(move |conn| Ok(count_votes(conn, post_val)?))
      .await?;

    decode_tally(counts)
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn post_exists(&self, post_id: PostId) -> Result<bool> {
    let post_val = encode_id(post_id)?;

    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM posts WHERE id = ?1 AND public = 1",
              rusqlite::params![post_val],
              |_| Ok(()),
            )
            .optional()?
            .is_some(),
        )
      })
      .await?;
    Ok(found)
  }

  async fn get_post(&self, post_id: PostId) -> Result<Option<Post>> {
    let post_val = encode_id(post_id)?;

    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {POST_COLUMNS}
                 FROM posts p
                 INNER JOIN identities i ON i.address = p.address
                 WHERE p.id = ?1"
              ),
              rusqlite::params![post_val],
              raw_post,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  async fn list_posts(&self, limit: usize, offset: usize) -> Result<Vec<Post>> {
    let limit_val = encode_count(limit)?;
    let offset_val = encode_count(offset)?;

    let raws: Vec<RawPost> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {POST_COLUMNS}
           FROM posts p
           INNER JOIN identities i ON i.address = p.address
           WHERE p.public = 1
           ORDER BY p.id DESC
           LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val, offset_val], raw_post)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPost::into_post).collect()
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn add_comment(&self, input: NewComment) -> Result<Comment> {
    let post_val = encode_id(input.post_id)?;
    let now = Utc::now();
    let created_at = encode_dt(now);
    let text = input.text.clone();

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (post_id, address, text, created_at) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![post_val, input.address, input.text, created_at],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Comment {
      id: decode_id(id)?,
      post_id: input.post_id,
      text,
      date: now,
      author: None,
    })
  }

  async fn comments_for_post(&self, post_id: PostId) -> Result<Vec<Comment>> {
    let post_val = encode_id(post_id)?;

    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT c.id, c.post_id, c.text, c.created_at, i.id, i.name, i.vip, i.staff
           FROM comments c
           INNER JOIN identities i ON i.address = c.address
           WHERE c.post_id = ?1
           ORDER BY c.id DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![post_val], |row| {
            Ok(RawComment {
              id:         row.get(0)?,
              post_id:    row.get(1)?,
              text:       row.get(2)?,
              created_at: row.get(3)?,
              author:     Some((row.get(4)?, row.get(5)?, row.get(6)?, row.get(7)?)),
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  async fn comments_by_address(&self, address: String) -> Result<Vec<Comment>> {
    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, post_id, text, created_at
           FROM comments
           WHERE address = ?1
           ORDER BY id DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![address], |row| {
            Ok(RawComment {
              id:         row.get(0)?,
              post_id:    row.get(1)?,
              text:       row.get(2)?,
              created_at: row.get(3)?,
              author:     None,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }
}
