//! Integration tests for `SqliteStore` and the core operations running on
//! top of it, against an in-memory database.

use std::sync::{
  Arc,
  atomic::{AtomicUsize, Ordering},
};

use chrono::{DateTime, Duration, NaiveDate, TimeZone as _, Utc};
use paracount_core::{
  Error as CoreError,
  ingest::{RetryPolicy, TokenizeOutcome, ingest, ingest_to_completion, tokenize_paragraph},
  maintenance::{run_daily_statistics, run_retention_pruning},
  paragraph::{
    NewParagraph, Owner, Paragraph, ParagraphId, RankedParagraph, WordOccurrence, WordTotal,
  },
  search::search,
  store::ParagraphStore,
  tokenizer::{TokenCounts, tokenize},
};
use tokio::sync::Notify;
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn owner(name: &str) -> Owner {
  Owner { user_id: Uuid::new_v4(), display_name: name.into() }
}

fn retry() -> RetryPolicy {
  RetryPolicy { attempts: 1, backoff: std::time::Duration::ZERO }
}

/// Create a paragraph with an explicit creation time and index it.
async fn seed(
  s: &SqliteStore,
  who: &Owner,
  text: &str,
  created_at: chrono::DateTime<Utc>,
) -> ParagraphId {
  let p = s
    .create_paragraph(NewParagraph { owner: who.clone(), raw_text: text.into(), created_at })
    .await
    .unwrap();
  s.record_occurrences(p.paragraph_id, &tokenize(text)).await.unwrap();
  p.paragraph_id
}

// ─── Paragraphs ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_paragraph() {
  let s = store().await;
  let alice = owner("alice");

  let created = s
    .create_paragraph(NewParagraph::new(alice.clone(), "Hello there"))
    .await
    .unwrap();

  let fetched = s.get_paragraph(created.paragraph_id).await.unwrap().unwrap();
  assert_eq!(fetched.paragraph_id, created.paragraph_id);
  assert_eq!(fetched.owner, alice);
  assert_eq!(fetched.raw_text, "Hello there");
  assert_eq!(fetched.created_at, created.created_at);
}

#[tokio::test]
async fn paragraph_ids_increase_and_are_not_reused() {
  let s = store().await;
  let alice = owner("alice");

  let a = s.create_paragraph(NewParagraph::new(alice.clone(), "one")).await.unwrap();
  let b = s.create_paragraph(NewParagraph::new(alice.clone(), "two")).await.unwrap();
  assert!(b.paragraph_id > a.paragraph_id);

  assert!(s.delete_paragraph(b.paragraph_id).await.unwrap());
  let c = s.create_paragraph(NewParagraph::new(alice, "three")).await.unwrap();
  assert!(c.paragraph_id > b.paragraph_id);
}

#[tokio::test]
async fn get_paragraph_missing_returns_none() {
  let s = store().await;
  assert!(s.get_paragraph(ParagraphId(42)).await.unwrap().is_none());
  assert!(!s.delete_paragraph(ParagraphId(42)).await.unwrap());
}

#[tokio::test]
async fn latest_display_name_wins() {
  let s = store().await;
  let mut bob = owner("bob");
  let first = ingest(&s, &bob, "first", &retry()).await.unwrap().paragraph_ids[0];

  // Creating a paragraph on its own does not rename a known owner.
  bob.display_name = "robert".into();
  s.create_paragraph(NewParagraph::new(bob.clone(), "stray")).await.unwrap();
  let fetched = s.get_paragraph(first).await.unwrap().unwrap();
  assert_eq!(fetched.owner.display_name, "bob");

  ingest(&s, &bob, "second", &retry()).await.unwrap();
  let fetched = s.get_paragraph(first).await.unwrap().unwrap();
  assert_eq!(fetched.owner.display_name, "robert");
}

// ─── Occurrences ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_occurrences_stores_counts() {
  let s = store().await;
  let p = s
    .create_paragraph(NewParagraph::new(owner("alice"), "The quick, quick fox."))
    .await
    .unwrap();

  let inserted = s
    .record_occurrences(p.paragraph_id, &tokenize(&p.raw_text))
    .await
    .unwrap();
  assert_eq!(inserted, Some(3));

  let occ = s.occurrences(p.paragraph_id).await.unwrap();
  let pairs: Vec<(&str, u32)> = occ.iter().map(|o| (o.word.as_str(), o.count)).collect();
  assert_eq!(pairs, vec![("fox", 1), ("quick", 2), ("the", 1)]);
}

#[tokio::test]
async fn record_occurrences_is_idempotent_and_first_write_wins() {
  let s = store().await;
  let p = s
    .create_paragraph(NewParagraph::new(owner("alice"), "cat cat dog"))
    .await
    .unwrap();
  let tokens = tokenize(&p.raw_text);

  assert_eq!(s.record_occurrences(p.paragraph_id, &tokens).await.unwrap(), Some(2));
  assert_eq!(s.record_occurrences(p.paragraph_id, &tokens).await.unwrap(), Some(0));

  // Different counts for an existing word do not overwrite it; new words are
  // still added.
  let other = tokenize("cat cat cat cat bird");
  assert_eq!(s.record_occurrences(p.paragraph_id, &other).await.unwrap(), Some(1));

  let occ = s.occurrences(p.paragraph_id).await.unwrap();
  let cat = occ.iter().find(|o| o.word == "cat").unwrap();
  assert_eq!(cat.count, 2);
  assert_eq!(occ.len(), 3);
  assert_eq!(s.count_occurrences().await.unwrap(), 3);
}

#[tokio::test]
async fn concurrent_record_occurrences_never_duplicates() {
  let s = store().await;
  let p = s
    .create_paragraph(NewParagraph::new(owner("alice"), "alpha beta gamma alpha"))
    .await
    .unwrap();
  let tokens = tokenize(&p.raw_text);

  let mut handles = Vec::new();
  for _ in 0..8 {
    let s = s.clone();
    let tokens = tokens.clone();
    let id = p.paragraph_id;
    handles.push(tokio::spawn(async move { s.record_occurrences(id, &tokens).await }));
  }

  let mut total = 0;
  for h in handles {
    total += h.await.unwrap().unwrap().unwrap();
  }
  assert_eq!(total, 3);
  assert_eq!(s.occurrences(p.paragraph_id).await.unwrap().len(), 3);
}

#[tokio::test]
async fn record_occurrences_for_missing_paragraph() {
  let s = store().await;
  let result = s.record_occurrences(ParagraphId(7), &tokenize("hello world")).await.unwrap();
  assert_eq!(result, None);
  assert_eq!(s.count_occurrences().await.unwrap(), 0);
}

#[tokio::test]
async fn delete_paragraph_cascades() {
  let s = store().await;
  let alice = owner("alice");
  let keep = seed(&s, &alice, "keep these words", Utc::now()).await;
  let drop = seed(&s, &alice, "drop these words please", Utc::now()).await;
  assert_eq!(s.count_occurrences().await.unwrap(), 7);

  assert!(s.delete_paragraph(drop).await.unwrap());

  assert!(s.occurrences(drop).await.unwrap().is_empty());
  assert_eq!(s.occurrences(keep).await.unwrap().len(), 3);
  assert_eq!(s.count_occurrences().await.unwrap(), 3);
  assert_eq!(s.count_paragraphs().await.unwrap(), 1);
}

// ─── Ranking ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn top_paragraphs_orders_by_count_then_id() {
  let s = store().await;
  let alice = owner("alice");
  let now = Utc::now();
  let p1 = seed(&s, &alice, &"cat ".repeat(5), now).await;
  let p2 = seed(&s, &alice, &"cat ".repeat(9), now).await;
  let p3 = seed(&s, &alice, &"cat ".repeat(5), now).await;
  seed(&s, &alice, "dog only", now).await;

  let ranked = s.top_paragraphs_for_word("cat", 10).await.unwrap();
  let ids: Vec<ParagraphId> = ranked.iter().map(|r| r.paragraph.paragraph_id).collect();
  assert_eq!(ids, vec![p2, p1, p3]);
  assert_eq!(ranked[0].count, 9);
  assert_eq!(ranked[0].paragraph.owner.display_name, "alice");

  let limited = s.top_paragraphs_for_word("cat", 2).await.unwrap();
  assert_eq!(limited.len(), 2);
}

#[tokio::test]
async fn top_words_for_date_only_counts_that_day() {
  let s = store().await;
  let alice = owner("alice");
  let today = Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap();
  let yesterday = today - Duration::days(1);

  seed(&s, &alice, "apple apple banana", today).await;
  seed(&s, &alice, "apple cherry", today + Duration::hours(14)).await;
  seed(&s, &alice, "banana banana banana banana", yesterday).await;

  let words = s.top_words_for_date(today.date_naive(), 10).await.unwrap();
  let pairs: Vec<(&str, u64)> = words.iter().map(|w| (w.word.as_str(), w.count)).collect();
  assert_eq!(pairs, vec![("apple", 3), ("banana", 1), ("cherry", 1)]);
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ingest_splits_and_indexes_in_order() {
  let s = store().await;
  let alice = owner("alice");

  let outcome = ingest(&s, &alice, "Para one.\n\n\nPara two.", &retry()).await.unwrap();
  assert_eq!(outcome.count, 2);
  assert_eq!(outcome.paragraph_ids.len(), 2);
  assert!(outcome.paragraph_ids[0] < outcome.paragraph_ids[1]);

  let first = s.get_paragraph(outcome.paragraph_ids[0]).await.unwrap().unwrap();
  let second = s.get_paragraph(outcome.paragraph_ids[1]).await.unwrap().unwrap();
  assert_eq!(first.raw_text, "Para one.");
  assert_eq!(second.raw_text, "Para two.");

  // Tokenization is recorded before ingest returns.
  assert_eq!(s.occurrences(first.paragraph_id).await.unwrap().len(), 2);
  assert_eq!(outcome.paragraphs[1].total_words, 2);
  assert_eq!(outcome.paragraphs[1].unique_words, 2);
}

#[tokio::test]
async fn ingest_rejects_blank_input() {
  let s = store().await;
  for text in ["", "   ", "\n\n\t\n"] {
    let err = ingest(&s, &owner("alice"), text, &retry()).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
  }
  assert_eq!(s.count_paragraphs().await.unwrap(), 0);
}

#[tokio::test]
async fn tokenize_paragraph_reports_missing_paragraph() {
  let s = store().await;
  let outcome = tokenize_paragraph(&s, ParagraphId(99), &retry()).await.unwrap();
  assert_eq!(outcome, TokenizeOutcome::NotFound(ParagraphId(99)));
}

#[tokio::test]
async fn retokenizing_is_a_no_op() {
  let s = store().await;
  let outcome = ingest(&s, &owner("alice"), "again and again", &retry()).await.unwrap();
  let id = outcome.paragraph_ids[0];

  let TokenizeOutcome::Recorded(report) = tokenize_paragraph(&s, id, &retry()).await.unwrap()
  else {
    panic!("paragraph should exist");
  };
  assert_eq!(report.inserted, 0);
  assert_eq!(report.unique_words, 2);
  assert_eq!(s.count_occurrences().await.unwrap(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ingests_keep_owners_apart() {
  let s = store().await;
  let owners: Vec<Owner> = (0..8).map(|i| owner(&format!("user{i}"))).collect();

  let handles: Vec<_> = owners
    .iter()
    .enumerate()
    .map(|(i, who)| {
      let s = s.clone();
      let who = who.clone();
      tokio::spawn(async move {
        let text = format!("tag{i} shared shared\n\ntag{i} alone");
        ingest(&s, &who, &text, &retry()).await
      })
    })
    .collect();

  for (i, (handle, who)) in handles.into_iter().zip(&owners).enumerate() {
    let outcome = handle.await.unwrap().unwrap();
    assert_eq!(outcome.count, 2);
    assert!(outcome.paragraph_ids[0] < outcome.paragraph_ids[1]);

    let tag = format!("tag{i}");
    let expected = [
      vec![("shared".to_string(), 2), (tag.clone(), 1)],
      vec![("alone".to_string(), 1), (tag.clone(), 1)],
    ];
    for (id, want) in outcome.paragraph_ids.iter().zip(expected) {
      let p = s.get_paragraph(*id).await.unwrap().unwrap();
      assert_eq!(p.owner.user_id, who.user_id);
      assert_eq!(p.owner.display_name, who.display_name);

      let got: Vec<(String, u32)> =
        s.occurrences(*id).await.unwrap().into_iter().map(|o| (o.word, o.count)).collect();
      assert_eq!(got, want);
    }
  }

  assert_eq!(s.count_paragraphs().await.unwrap(), 16);
  assert_eq!(s.count_occurrences().await.unwrap(), 32);
  let shared = s.top_paragraphs_for_word("shared", 100).await.unwrap();
  assert_eq!(shared.len(), 8);
  assert!(shared.iter().all(|r| r.count == 2));
}

// ─── Failures and rollback ───────────────────────────────────────────────────

/// Which calls a [`FaultyStore`] fails. Call numbers are 1-based and count
/// every call made through the store.
#[derive(Default)]
struct Faults {
  fail_create:     Option<usize>,
  /// The first `failing_records` calls to `record_occurrences` fail.
  failing_records: usize,
  /// Park this `record_occurrences` call until `release` is notified, then
  /// fail it if the flag is set.
  hold_record:     Option<(usize, bool)>,
  fail_deletes:    bool,
}

/// A [`SqliteStore`] that fails the calls selected by its [`Faults`].
struct FaultyStore {
  inner:   SqliteStore,
  faults:  Faults,
  creates: AtomicUsize,
  records: AtomicUsize,
  release: Notify,
}

impl FaultyStore {
  async fn new(faults: Faults) -> Self {
    Self {
      inner: store().await,
      faults,
      creates: AtomicUsize::new(0),
      records: AtomicUsize::new(0),
      release: Notify::new(),
    }
  }

  /// Poll until the store holds exactly the given number of rows.
  async fn settle(&self, paragraphs: u64, occurrences: u64) {
    for _ in 0..300 {
      let p = self.count_paragraphs().await.unwrap();
      let o = self.count_occurrences().await.unwrap();
      if (p, o) == (paragraphs, occurrences) {
        return;
      }
      tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("store never settled at {paragraphs} paragraphs / {occurrences} occurrences");
  }
}

fn injected() -> crate::Error { crate::Error::Database(tokio_rusqlite::Error::ConnectionClosed) }

impl ParagraphStore for FaultyStore {
  type Error = crate::Error;

  async fn create_paragraph(&self, input: NewParagraph) -> crate::Result<Paragraph> {
    let n = self.creates.fetch_add(1, Ordering::SeqCst) + 1;
    if self.faults.fail_create == Some(n) {
      return Err(injected());
    }
    self.inner.create_paragraph(input).await
  }

  async fn get_paragraph(&self, id: ParagraphId) -> crate::Result<Option<Paragraph>> {
    self.inner.get_paragraph(id).await
  }

  async fn delete_paragraph(&self, id: ParagraphId) -> crate::Result<bool> {
    if self.faults.fail_deletes {
      return Err(injected());
    }
    self.inner.delete_paragraph(id).await
  }

  async fn delete_paragraphs_before(&self, cutoff: DateTime<Utc>) -> crate::Result<u64> {
    self.inner.delete_paragraphs_before(cutoff).await
  }

  async fn update_owner(&self, owner: &Owner) -> crate::Result<()> {
    self.inner.update_owner(owner).await
  }

  async fn record_occurrences(
    &self,
    id: ParagraphId,
    tokens: &TokenCounts,
  ) -> crate::Result<Option<usize>> {
    let n = self.records.fetch_add(1, Ordering::SeqCst) + 1;
    if let Some((at, fail)) = self.faults.hold_record
      && at == n
    {
      self.release.notified().await;
      if fail {
        return Err(injected());
      }
    }
    if n <= self.faults.failing_records {
      return Err(injected());
    }
    self.inner.record_occurrences(id, tokens).await
  }

  async fn occurrences(&self, id: ParagraphId) -> crate::Result<Vec<WordOccurrence>> {
    self.inner.occurrences(id).await
  }

  async fn top_paragraphs_for_word(
    &self,
    word: &str,
    limit: usize,
  ) -> crate::Result<Vec<RankedParagraph>> {
    self.inner.top_paragraphs_for_word(word, limit).await
  }

  async fn count_paragraphs(&self) -> crate::Result<u64> { self.inner.count_paragraphs().await }

  async fn count_occurrences(&self) -> crate::Result<u64> { self.inner.count_occurrences().await }

  async fn top_words_for_date(
    &self,
    date: NaiveDate,
    limit: usize,
  ) -> crate::Result<Vec<WordTotal>> {
    self.inner.top_words_for_date(date, limit).await
  }
}

const THREE_PARAGRAPHS: &str = "one two\n\nthree four\n\nfive six";

#[tokio::test]
async fn mid_batch_failure_rolls_back_every_paragraph() {
  let s = FaultyStore::new(Faults { fail_create: Some(3), ..Faults::default() }).await;

  let err = ingest(&s, &owner("alice"), THREE_PARAGRAPHS, &retry()).await.unwrap_err();
  assert!(matches!(err, CoreError::Storage(_)), "{err}");
  assert_eq!(s.count_paragraphs().await.unwrap(), 0);
  assert_eq!(s.count_occurrences().await.unwrap(), 0);
}

#[tokio::test]
async fn failed_rollback_reports_orphaned_paragraphs() {
  let s = FaultyStore::new(Faults {
    fail_create: Some(2),
    fail_deletes: true,
    ..Faults::default()
  })
  .await;

  let err = ingest(&s, &owner("alice"), THREE_PARAGRAPHS, &retry()).await.unwrap_err();
  let CoreError::PartialIngest { cause, orphaned } = err else {
    panic!("expected a partial ingest");
  };
  assert!(matches!(*cause, CoreError::Storage(_)));
  assert_eq!(orphaned.len(), 1);
  assert!(s.inner.get_paragraph(orphaned[0]).await.unwrap().is_some());
}

#[tokio::test]
async fn transient_record_failures_are_retried() {
  let policy = RetryPolicy { attempts: 3, backoff: std::time::Duration::from_millis(1) };
  let s = FaultyStore::new(Faults { failing_records: 2, ..Faults::default() }).await;

  let outcome = ingest(&s, &owner("alice"), "retry me", &policy).await.unwrap();
  assert_eq!(outcome.paragraphs[0].inserted, 2);
  assert_eq!(s.records.load(Ordering::SeqCst), 3);
  assert_eq!(s.count_occurrences().await.unwrap(), 2);
}

#[tokio::test]
async fn exhausted_retries_roll_back() {
  let policy = RetryPolicy { attempts: 2, backoff: std::time::Duration::from_millis(1) };
  let s = FaultyStore::new(Faults { failing_records: 2, ..Faults::default() }).await;

  let err = ingest(&s, &owner("alice"), "retry me", &policy).await.unwrap_err();
  assert!(matches!(err, CoreError::Storage(_)));
  assert_eq!(s.count_paragraphs().await.unwrap(), 0);
}

#[tokio::test]
async fn abandoned_ingest_still_rolls_back() {
  let s = Arc::new(
    FaultyStore::new(Faults { hold_record: Some((2, true)), ..Faults::default() }).await,
  );

  let call = ingest_to_completion(s.clone(), owner("alice"), THREE_PARAGRAPHS.into(), retry());
  let timed_out = tokio::time::timeout(std::time::Duration::from_millis(100), call).await;
  assert!(timed_out.is_err());

  // The batch is parked on the second paragraph with nobody waiting for it.
  assert_eq!(s.count_paragraphs().await.unwrap(), 2);
  s.release.notify_one();
  s.settle(0, 0).await;
}

#[tokio::test]
async fn abandoned_ingest_still_completes() {
  let s = Arc::new(
    FaultyStore::new(Faults { hold_record: Some((2, false)), ..Faults::default() }).await,
  );

  let call = ingest_to_completion(s.clone(), owner("alice"), THREE_PARAGRAPHS.into(), retry());
  let timed_out = tokio::time::timeout(std::time::Duration::from_millis(100), call).await;
  assert!(timed_out.is_err());

  s.release.notify_one();
  s.settle(3, 6).await;
  for word in ["one", "three", "five"] {
    assert_eq!(s.top_paragraphs_for_word(word, 10).await.unwrap().len(), 1);
  }
}

#[tokio::test]
async fn failed_ingest_does_not_rename_owner() {
  let s = FaultyStore::new(Faults { fail_create: Some(3), ..Faults::default() }).await;
  let alice = owner("alice");
  ingest(&s, &alice, "shared words", &retry()).await.unwrap();

  let renamed = Owner { display_name: "mallory".into(), ..alice.clone() };
  ingest(&s, &renamed, "shared one\n\nshared two", &retry()).await.unwrap_err();

  let response = search(&s, "shared", None).await.unwrap();
  assert_eq!(response.results_count, 1);
  assert_eq!(response.results[0].user_name, "alice");
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_ranks_by_count() {
  let s = store().await;
  let alice = owner("alice");
  let now = Utc::now();
  let p1 = seed(&s, &alice, &"cat ".repeat(5), now).await;
  let p2 = seed(&s, &alice, &"Cat ".repeat(9), now).await;

  let response = search(&s, " CAT ", None).await.unwrap();
  assert_eq!(response.word, "cat");
  assert_eq!(response.results_count, 2);
  assert_eq!(response.results[0].paragraph_id, p2);
  assert_eq!(response.results[0].word_count, 9);
  assert_eq!(response.results[1].paragraph_id, p1);
  assert_eq!(response.results[1].user_name, "alice");
}

#[tokio::test]
async fn search_validation_and_empty_results() {
  let s = store().await;
  assert!(matches!(search(&s, "a", None).await, Err(CoreError::Validation(_))));
  assert!(matches!(search(&s, "", None).await, Err(CoreError::Validation(_))));

  let response = search(&s, "xyzxyz", None).await.unwrap();
  assert_eq!(response.results_count, 0);
  assert!(response.results.is_empty());
}

#[tokio::test]
async fn search_limit_is_capped_and_preview_truncated() {
  let s = store().await;
  let alice = owner("alice");
  for _ in 0..12 {
    seed(&s, &alice, &"word ".repeat(200), Utc::now()).await;
  }

  let capped = search(&s, "word", Some(50)).await.unwrap();
  assert_eq!(capped.results_count, 10);
  assert!(capped.results.iter().all(|r| r.raw_text.chars().count() == 500));

  let three = search(&s, "word", Some(3)).await.unwrap();
  assert_eq!(three.results_count, 3);
}

// ─── Maintenance ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn retention_prunes_old_paragraphs_only() {
  let s = store().await;
  let alice = owner("alice");
  let now = Utc::now();
  let old = seed(&s, &alice, "ancient history", now - Duration::days(91)).await;
  let recent = seed(&s, &alice, "recent news", now - Duration::days(10)).await;

  let report = run_retention_pruning(&s, now, Duration::days(90)).await.unwrap();
  assert_eq!(report.deleted_count, 1);
  assert!(s.get_paragraph(old).await.unwrap().is_none());
  assert!(s.occurrences(old).await.unwrap().is_empty());
  assert!(s.get_paragraph(recent).await.unwrap().is_some());

  let again = run_retention_pruning(&s, now, Duration::days(90)).await.unwrap();
  assert_eq!(again.deleted_count, 0);
  assert_eq!(s.count_occurrences().await.unwrap(), 2);
}

#[tokio::test]
async fn retention_cutoff_is_strict() {
  let s = store().await;
  let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
  let at_cutoff = seed(&s, &owner("alice"), "boundary case", now - Duration::days(90)).await;

  let report = run_retention_pruning(&s, now, Duration::days(90)).await.unwrap();
  assert_eq!(report.deleted_count, 0);
  assert!(s.get_paragraph(at_cutoff).await.unwrap().is_some());
}

#[tokio::test]
async fn retention_below_one_day_deletes_nothing() {
  let s = store().await;
  let now = Utc::now();
  seed(&s, &owner("alice"), "fresh paragraph", now - Duration::minutes(5)).await;

  for retention in [Duration::days(-1), Duration::zero(), Duration::hours(23)] {
    let err = run_retention_pruning(&s, now, retention).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)), "{err}");
  }
  let err = run_retention_pruning(&s, now, Duration::MAX).await.unwrap_err();
  assert!(matches!(err, CoreError::Validation(_)), "{err}");
  assert_eq!(s.count_paragraphs().await.unwrap(), 1);
}

#[tokio::test]
async fn daily_statistics_excludes_older_paragraphs() {
  let s = store().await;
  let alice = owner("alice");
  let now = Utc.with_ymd_and_hms(2026, 10, 16, 18, 30, 0).unwrap();

  seed(&s, &alice, "rust rust tokio", now - Duration::hours(2)).await;
  seed(&s, &alice, "rust rust rust rust rust serde", now - Duration::days(3)).await;

  let stats = run_daily_statistics(&s, now).await.unwrap();
  assert_eq!(stats.timestamp, now);
  assert_eq!(stats.total_paragraphs, 2);
  assert_eq!(stats.total_occurrences, 4);

  let pairs: Vec<(&str, u64)> =
    stats.top_words_today.iter().map(|w| (w.word.as_str(), w.count)).collect();
  assert_eq!(pairs, vec![("rust", 2), ("tokio", 1)]);
}
