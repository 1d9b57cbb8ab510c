//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (microseconds,
//! `Z` suffix) so that SQL string comparison matches chronological order.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use paracount_core::paragraph::{Owner, Paragraph, ParagraphId};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// `[start, end)` bounds of a UTC calendar day, encoded for comparison
/// against `created_at`.
pub fn encode_day_bounds(date: NaiveDate) -> (String, String) {
  let start = date.and_time(NaiveTime::MIN).and_utc();
  let end = start + chrono::Duration::days(1);
  (encode_dt(start), encode_dt(end))
}

// ─── Raw rows ─────────────────────────────────────────────────────────────────

/// A paragraph row joined with its owner, before decoding.
pub struct RawParagraph {
  pub paragraph_id: i64,
  pub user_id:      String,
  pub display_name: String,
  pub raw_text:     String,
  pub created_at:   String,
}

impl RawParagraph {
  /// Read the five leading columns of `row`, in struct order.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      paragraph_id: row.get(0)?,
      user_id:      row.get(1)?,
      display_name: row.get(2)?,
      raw_text:     row.get(3)?,
      created_at:   row.get(4)?,
    })
  }

  pub fn into_paragraph(self) -> Result<Paragraph> {
    Ok(Paragraph {
      paragraph_id: ParagraphId(self.paragraph_id),
      owner:        Owner {
        user_id:      decode_uuid(&self.user_id)?,
        display_name: self.display_name,
      },
      raw_text:     self.raw_text,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}
