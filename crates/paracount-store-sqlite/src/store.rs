//! [`SqliteStore`] — the SQLite implementation of [`ParagraphStore`].

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::OptionalExtension as _;

use paracount_core::{
  paragraph::{
    NewParagraph, Owner, Paragraph, ParagraphId, RankedParagraph, WordOccurrence, WordTotal,
  },
  store::ParagraphStore,
  tokenizer::TokenCounts,
};

use crate::{
  Result,
  encode::{RawParagraph, encode_day_bounds, encode_dt, encode_uuid},
  schema::SCHEMA,
};

const SELECT_PARAGRAPH: &str = "
  SELECT p.paragraph_id, p.user_id, u.display_name, p.raw_text, p.created_at
  FROM paragraphs p
  JOIN users u ON u.user_id = p.user_id";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A paragraph store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
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

  /// Open an in-memory store — useful for testing.
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
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn count(&self, sql: &'static str) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(sql, [], |r| r.get(0))?))
      .await?;
    Ok(n.max(0) as u64)
  }
}

// ─── ParagraphStore impl ─────────────────────────────────────────────────────

impl ParagraphStore for SqliteStore {
  type Error = crate::Error;

  // ── Paragraphs ────────────────────────────────────────────────────────────

  async fn create_paragraph(&self, input: NewParagraph) -> Result<Paragraph> {
    let user_id_str = encode_uuid(input.owner.user_id);
    let name        = input.owner.display_name.clone();
    let text        = input.raw_text.clone();
    let at_str      = encode_dt(input.created_at);

    let id: i64 = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO users (user_id, display_name) VALUES (?1, ?2)
           ON CONFLICT (user_id) DO NOTHING",
          rusqlite::params![user_id_str, name],
        )?;
        tx.execute(
          "INSERT INTO paragraphs (user_id, raw_text, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![user_id_str, text, at_str],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
      })
      .await?;

    Ok(Paragraph {
      paragraph_id: ParagraphId(id),
      owner:        input.owner,
      raw_text:     input.raw_text,
      created_at:   input.created_at,
    })
  }

  async fn get_paragraph(&self, id: ParagraphId) -> Result<Option<Paragraph>> {
    let raw: Option<RawParagraph> = self
      .conn
      .call(move |conn| {
        let sql = format!("{SELECT_PARAGRAPH} WHERE p.paragraph_id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id.0], RawParagraph::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawParagraph::into_paragraph).transpose()
  }

  async fn delete_paragraph(&self, id: ParagraphId) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM paragraphs WHERE paragraph_id = ?1",
          rusqlite::params![id.0],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }

  async fn delete_paragraphs_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
    let cutoff_str = encode_dt(cutoff);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM paragraphs WHERE created_at < ?1",
          rusqlite::params![cutoff_str],
        )?)
      })
      .await?;
    Ok(deleted as u64)
  }

  async fn update_owner(&self, owner: &Owner) -> Result<()> {
    let user_id_str = encode_uuid(owner.user_id);
    let name        = owner.display_name.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, display_name) VALUES (?1, ?2)
           ON CONFLICT (user_id) DO UPDATE SET display_name = excluded.display_name",
          rusqlite::params![user_id_str, name],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Occurrences ───────────────────────────────────────────────────────────

  async fn record_occurrences(
    &self,
    id:     ParagraphId,
    tokens: &TokenCounts,
  ) -> Result<Option<usize>> {
    let rows: Vec<(String, u32)> = tokens
      .counts
      .iter()
      .map(|(word, count)| (word.clone(), *count))
      .collect();

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let exists = tx
          .query_row(
            "SELECT 1 FROM paragraphs WHERE paragraph_id = ?1",
            rusqlite::params![id.0],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(None);
        }

        // The UNIQUE constraint turns a repeated word into a no-op, so
        // concurrent or repeated runs cannot duplicate or overwrite rows.
        let mut inserted = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO word_occurrences (paragraph_id, word, count)
             VALUES (?1, ?2, ?3)",
          )?;
          for (word, count) in &rows {
            inserted += stmt.execute(rusqlite::params![id.0, word, count])?;
          }
        }
        tx.commit()?;
        Ok(Some(inserted))
      })
      .await?;

    Ok(inserted)
  }

  async fn occurrences(&self, id: ParagraphId) -> Result<Vec<WordOccurrence>> {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT word, count FROM word_occurrences
           WHERE paragraph_id = ?1
           ORDER BY word",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id.0], |row| {
            Ok(WordOccurrence { paragraph_id: id, word: row.get(0)?, count: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  // ── Rankings and aggregates ───────────────────────────────────────────────

  async fn top_paragraphs_for_word(
    &self,
    word:  &str,
    limit: usize,
  ) -> Result<Vec<RankedParagraph>> {
    let word      = word.to_owned();
    let limit_val = limit as i64;

    let raws: Vec<(RawParagraph, u32)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT p.paragraph_id, p.user_id, u.display_name, p.raw_text, p.created_at,
                  o.count
           FROM word_occurrences o
           JOIN paragraphs p ON p.paragraph_id = o.paragraph_id
           JOIN users u      ON u.user_id      = p.user_id
           WHERE o.word = ?1
           ORDER BY o.count DESC, o.paragraph_id ASC
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![word, limit_val], |row| {
            Ok((RawParagraph::from_row(row)?, row.get(5)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(raw, count)| Ok(RankedParagraph { paragraph: raw.into_paragraph()?, count }))
      .collect()
  }

  async fn count_paragraphs(&self) -> Result<u64> {
    self.count("SELECT COUNT(*) FROM paragraphs").await
  }

  async fn count_occurrences(&self) -> Result<u64> {
    self.count("SELECT COUNT(*) FROM word_occurrences").await
  }

  async fn top_words_for_date(&self, date: NaiveDate, limit: usize) -> Result<Vec<WordTotal>> {
    let (start, end) = encode_day_bounds(date);
    let limit_val    = limit as i64;

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT o.word, SUM(o.count) AS total
           FROM word_occurrences o
           JOIN paragraphs p ON p.paragraph_id = o.paragraph_id
           WHERE p.created_at >= ?1 AND p.created_at < ?2
           GROUP BY o.word
           ORDER BY total DESC, o.word ASC
           LIMIT ?3",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![start, end, limit_val], |row| {
            let total: i64 = row.get(1)?;
            Ok(WordTotal { word: row.get(0)?, count: total.max(0) as u64 })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }
}
