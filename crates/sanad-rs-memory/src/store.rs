//! Conversation memory trait and the key-value backed implementation.

use crate::keywords::{calculate_similarity, extract_keywords, generate_id};
use crate::model::{
    ConversationDraft, ConversationPatch, ConversationRecord, MAX_TAGS, MemoryStats,
    ScoredConversation,
};
use crate::slot::KeyValueSlot;
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

/// Fixed slot key holding the serialized conversation list.
pub const MEMORY_KEY: &str = "conversations";

/// Default capacity of the conversation log.
pub const DEFAULT_MAX_CONVERSATIONS: usize = 100;

/// Bounded, newest-first log of past conversations.
///
/// Memory is best-effort and never blocks the primary flow: read
/// operations degrade to empty results and writes to no-ops when the
/// backing slot fails, so no method here returns an error.
#[async_trait]
pub trait ConversationMemory: Send + Sync {
    /// Store a new record, returning its assigned id.
    ///
    /// Returns an empty id and leaves the log untouched when persistence
    /// fails.
    async fn save(&self, draft: ConversationDraft) -> String;

    /// All records, newest first.
    async fn get_all(&self) -> Vec<ConversationRecord>;

    /// Records matching a free-text query, newest first.
    ///
    /// A record matches when the case-folded query is a substring of its
    /// user input or document type, or equals one of its tags. An empty
    /// query matches every record.
    async fn search(&self, query: &str) -> Vec<ConversationRecord>;

    /// Up to `limit` records of the given document type, ranked by
    /// descending similarity to `user_input`.
    async fn get_similar(
        &self,
        doc_type: &str,
        user_input: &str,
        limit: usize,
    ) -> Vec<ScoredConversation>;

    /// Aggregate statistics over the log.
    async fn get_stats(&self) -> MemoryStats;

    /// Remove the record with the given id; no-op when absent.
    async fn delete(&self, id: &str);

    /// Merge patch fields into the record with the given id; no-op when
    /// absent.
    async fn update(&self, id: &str, patch: ConversationPatch);

    /// Serialize the full log for backup.
    async fn export_all(&self) -> String;

    /// Replace the log from a serialized backup.
    ///
    /// Returns false and leaves existing state untouched unless the
    /// payload parses as a record sequence and the rewrite persists.
    async fn import_all(&self, payload: &str) -> bool;
}

/// [`ConversationMemory`] implementation backed by one key-value slot.
///
/// The full list is read once at construction and rewritten in full on
/// every mutation. A mutex serializes the read-modify-write cycle.
pub struct KvConversationMemory {
    /// Backing persistence slot.
    slot: Arc<dyn KeyValueSlot>,
    /// Maximum number of records kept.
    capacity: usize,
    /// Cached snapshot, newest first.
    records: Mutex<Vec<ConversationRecord>>,
}

impl KvConversationMemory {
    /// Create a store over the given slot with the default capacity.
    pub fn new(slot: Arc<dyn KeyValueSlot>) -> Self {
        Self::with_capacity(slot, DEFAULT_MAX_CONVERSATIONS)
    }

    /// Create a store over the given slot with an explicit capacity.
    pub fn with_capacity(slot: Arc<dyn KeyValueSlot>, capacity: usize) -> Self {
        let records = load_snapshot(slot.as_ref());
        Self {
            slot,
            capacity,
            records: Mutex::new(records),
        }
    }

    /// Persist `next` and commit it to the cache, or keep the old state.
    fn commit(&self, records: &mut Vec<ConversationRecord>, next: Vec<ConversationRecord>) -> bool {
        let serialized = match serde_json::to_string(&next) {
            Ok(serialized) => serialized,
            Err(err) => {
                warn!("conversation snapshot serialization failed: {err}");
                return false;
            }
        };
        if let Err(err) = self.slot.set(MEMORY_KEY, &serialized) {
            warn!("conversation snapshot write failed: {err}");
            return false;
        }
        *records = next;
        true
    }
}

/// Read and deserialize the slot's snapshot, degrading to empty.
fn load_snapshot(slot: &dyn KeyValueSlot) -> Vec<ConversationRecord> {
    let serialized = match slot.get(MEMORY_KEY) {
        Ok(Some(serialized)) => serialized,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!("conversation snapshot read failed: {err}");
            return Vec::new();
        }
    };
    match serde_json::from_str(&serialized) {
        Ok(records) => records,
        Err(err) => {
            warn!("conversation snapshot corrupt, starting empty: {err}");
            Vec::new()
        }
    }
}

#[async_trait]
impl ConversationMemory for KvConversationMemory {
    async fn save(&self, draft: ConversationDraft) -> String {
        let mut tags = draft.tags;
        tags.truncate(MAX_TAGS);
        let record = ConversationRecord {
            id: generate_id(),
            timestamp: Utc::now(),
            doc_type: draft.doc_type,
            user_input: draft.user_input,
            generated_content: draft.generated_content,
            tags,
            rating: None,
        };

        let mut records = self.records.lock();
        let mut next = Vec::with_capacity(records.len() + 1);
        next.push(record.clone());
        next.extend(records.iter().cloned());
        next.truncate(self.capacity);

        if !self.commit(&mut records, next) {
            return String::new();
        }
        debug!(
            "saved conversation (id={}, doc_type={}, tags={})",
            record.id,
            record.doc_type,
            record.tags.len()
        );
        record.id
    }

    async fn get_all(&self) -> Vec<ConversationRecord> {
        self.records.lock().clone()
    }

    async fn search(&self, query: &str) -> Vec<ConversationRecord> {
        let query = query.to_lowercase();
        self.records
            .lock()
            .iter()
            .filter(|record| {
                record.user_input.to_lowercase().contains(&query)
                    || record.doc_type.to_lowercase().contains(&query)
                    || record.tags.iter().any(|tag| tag.to_lowercase() == query)
            })
            .cloned()
            .collect()
    }

    async fn get_similar(
        &self,
        doc_type: &str,
        user_input: &str,
        limit: usize,
    ) -> Vec<ScoredConversation> {
        let keywords = extract_keywords(user_input);
        let mut scored: Vec<ScoredConversation> = self
            .records
            .lock()
            .iter()
            .filter(|record| record.doc_type == doc_type)
            .map(|record| ScoredConversation {
                similarity: calculate_similarity(&keywords, &record.user_input),
                record: record.clone(),
            })
            .collect();
        // Stable sort keeps newest-first order among equal scores.
        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });
        scored.truncate(limit);
        scored
    }

    async fn get_stats(&self) -> MemoryStats {
        let records = self.records.lock();
        let mut distribution: HashMap<String, usize> = HashMap::new();
        let mut first_seen: Vec<String> = Vec::new();
        let mut rating_sum = 0u64;
        let mut rating_count = 0u64;

        for record in records.iter() {
            if !distribution.contains_key(&record.doc_type) {
                first_seen.push(record.doc_type.clone());
            }
            *distribution.entry(record.doc_type.clone()).or_insert(0) += 1;
            if let Some(rating) = record.rating {
                rating_sum += u64::from(rating);
                rating_count += 1;
            }
        }

        // Ties resolve to the doc type seen first in stored order.
        let mut most_used = String::new();
        let mut best = 0usize;
        for doc_type in &first_seen {
            let count = distribution[doc_type];
            if count > best {
                best = count;
                most_used = doc_type.clone();
            }
        }

        MemoryStats {
            total_conversations: records.len(),
            doc_type_distribution: distribution,
            average_rating: if rating_count == 0 {
                0.0
            } else {
                rating_sum as f64 / rating_count as f64
            },
            most_used_doc_type: most_used,
        }
    }

    async fn delete(&self, id: &str) {
        let mut records = self.records.lock();
        if !records.iter().any(|record| record.id == id) {
            return;
        }
        let next: Vec<ConversationRecord> = records
            .iter()
            .filter(|record| record.id != id)
            .cloned()
            .collect();
        self.commit(&mut records, next);
    }

    async fn update(&self, id: &str, patch: ConversationPatch) {
        let mut records = self.records.lock();
        let Some(index) = records.iter().position(|record| record.id == id) else {
            return;
        };
        let mut next = records.clone();
        let record = &mut next[index];
        if let Some(user_input) = patch.user_input {
            record.user_input = user_input;
        }
        if let Some(generated_content) = patch.generated_content {
            record.generated_content = Some(generated_content);
        }
        if let Some(mut tags) = patch.tags {
            tags.truncate(MAX_TAGS);
            record.tags = tags;
        }
        if let Some(rating) = patch.rating
            && (1..=5).contains(&rating)
        {
            record.rating = Some(rating);
        }
        self.commit(&mut records, next);
    }

    async fn export_all(&self) -> String {
        let records = self.records.lock();
        serde_json::to_string(&*records).unwrap_or_else(|_| "[]".to_string())
    }

    async fn import_all(&self, payload: &str) -> bool {
        let mut imported: Vec<ConversationRecord> = match serde_json::from_str(payload) {
            Ok(imported) => imported,
            Err(err) => {
                warn!("import rejected, payload is not a record sequence: {err}");
                return false;
            }
        };
        imported.truncate(self.capacity);
        let mut records = self.records.lock();
        self.commit(&mut records, imported)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConversationMemory, DEFAULT_MAX_CONVERSATIONS, KvConversationMemory, MEMORY_KEY};
    use crate::model::{ConversationDraft, ConversationPatch};
    use crate::slot::{FileKvSlot, InMemoryKvSlot, KeyValueSlot};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn store() -> KvConversationMemory {
        KvConversationMemory::new(Arc::new(InMemoryKvSlot::new()))
    }

    fn draft(doc_type: &str, user_input: &str) -> ConversationDraft {
        ConversationDraft {
            doc_type: doc_type.to_string(),
            user_input: user_input.to_string(),
            generated_content: Some("نص المستند".to_string()),
            tags: vec!["سقالات".to_string()],
        }
    }

    #[tokio::test]
    async fn save_prepends_and_populates_identity() {
        let store = store();
        let first = store.save(draft("عقد إيجار سقالات", "مشروع الرياض")).await;
        let second = store.save(draft("سند تسليم", "موقع جدة")).await;
        assert!(!first.is_empty());
        assert_ne!(first, second);

        let records = store.get_all().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, second);
        assert_eq!(records[0].doc_type, "سند تسليم");
        assert_eq!(records[0].user_input, "موقع جدة");
        assert_eq!(records[0].tags, vec!["سقالات".to_string()]);
        assert_eq!(records[1].id, first);
    }

    #[tokio::test]
    async fn save_clamps_tags_to_five() {
        let store = store();
        let mut input = draft("عقد عمل", "توظيف");
        input.tags = (0..8).map(|index| format!("tag{index}")).collect();
        store.save(input).await;
        assert_eq!(store.get_all().await[0].tags.len(), 5);
    }

    #[tokio::test]
    async fn capacity_evicts_oldest_records() {
        let store = store();
        for index in 0..(DEFAULT_MAX_CONVERSATIONS + 5) {
            store
                .save(draft("عقد إيجار سقالات", &format!("طلب رقم {index}")))
                .await;
        }
        let records = store.get_all().await;
        assert_eq!(records.len(), DEFAULT_MAX_CONVERSATIONS);
        assert_eq!(records[0].user_input, "طلب رقم 104");
        assert_eq!(records.last().expect("tail").user_input, "طلب رقم 5");
    }

    #[tokio::test]
    async fn save_fails_soft_on_write_failure() {
        let store = KvConversationMemory::new(Arc::new(InMemoryKvSlot::failing()));
        let id = store.save(draft("عقد عمل", "مدخل")).await;
        assert_eq!(id, "");
        assert_eq!(store.get_all().await, vec![]);
    }

    #[tokio::test]
    async fn corrupt_snapshot_degrades_to_empty() {
        let slot = Arc::new(InMemoryKvSlot::new());
        slot.set(MEMORY_KEY, "{not json").expect("seed");
        let store = KvConversationMemory::new(slot);
        assert_eq!(store.get_all().await, vec![]);
    }

    #[tokio::test]
    async fn snapshot_survives_a_reload() {
        let temp = tempdir().expect("tempdir");
        let slot = Arc::new(FileKvSlot::new(temp.path()).expect("slot"));
        let store = KvConversationMemory::new(slot.clone());
        let id = store.save(draft("مطالبة مالية", "دفعة متأخرة")).await;

        let reloaded = KvConversationMemory::new(slot);
        let records = reloaded.get_all().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].user_input, "دفعة متأخرة");
    }

    #[tokio::test]
    async fn search_matches_input_doc_type_and_tags() {
        let store = store();
        store
            .save(draft("عقد إيجار سقالات", "مشروع البناء الجديد"))
            .await;
        store.save(draft("سند تسليم", "توريد معدات")).await;

        let matched = store.search("مشروع").await;
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].user_input, "مشروع البناء الجديد");

        // doc type substring and exact tag also match.
        assert_eq!(store.search("تسليم").await.len(), 1);
        assert_eq!(store.search("سقالات").await.len(), 2);
        assert_eq!(store.search("لا يوجد").await.len(), 0);
    }

    #[tokio::test]
    async fn empty_search_query_matches_everything() {
        let store = store();
        store.save(draft("عقد عمل", "توظيف عامل")).await;
        store.save(draft("سند إرجاع", "إرجاع معدات")).await;
        assert_eq!(store.search("").await.len(), 2);
    }

    #[tokio::test]
    async fn get_similar_filters_ranks_and_limits() {
        let store = store();
        store
            .save(draft("عقد إيجار سقالات", "سقالات معدنية لموقع الرياض"))
            .await;
        store
            .save(draft("عقد إيجار سقالات", "مشروع برج سكني كبير"))
            .await;
        store.save(draft("سند تسليم", "سقالات معدنية")).await;

        let similar = store
            .get_similar("عقد إيجار سقالات", "سقالات معدنية للموقع", 3)
            .await;
        assert_eq!(similar.len(), 2);
        assert!(similar.iter().all(|s| s.record.doc_type == "عقد إيجار سقالات"));
        assert!(similar[0].similarity >= similar[1].similarity);
        assert_eq!(similar[0].record.user_input, "سقالات معدنية لموقع الرياض");

        let limited = store
            .get_similar("عقد إيجار سقالات", "سقالات معدنية للموقع", 1)
            .await;
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn get_similar_with_empty_input_still_returns_doc_type_matches() {
        let store = store();
        store.save(draft("عقد عمل", "توظيف عامل جديد")).await;
        let similar = store.get_similar("عقد عمل", "", 2).await;
        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0].similarity, 0.0);
    }

    #[tokio::test]
    async fn stats_on_empty_store_are_zeroed() {
        let stats = store().get_stats().await;
        assert_eq!(stats.total_conversations, 0);
        assert!(stats.doc_type_distribution.is_empty());
        assert_eq!(stats.average_rating, 0.0);
        assert_eq!(stats.most_used_doc_type, "");
    }

    #[tokio::test]
    async fn stats_aggregate_counts_and_ratings() {
        let store = store();
        let a1 = store.save(draft("عقد عمل", "أ")).await;
        let a2 = store.save(draft("عقد عمل", "ب")).await;
        let b = store.save(draft("سند تسليم", "ج")).await;
        store.update(&a1, ConversationPatch::rating(5)).await;
        store.update(&a2, ConversationPatch::rating(4)).await;
        store.update(&b, ConversationPatch::rating(3)).await;

        let stats = store.get_stats().await;
        assert_eq!(stats.total_conversations, 3);
        assert_eq!(stats.doc_type_distribution["عقد عمل"], 2);
        assert_eq!(stats.doc_type_distribution["سند تسليم"], 1);
        assert_eq!(stats.average_rating, 4.0);
        assert_eq!(stats.most_used_doc_type, "عقد عمل");
    }

    #[tokio::test]
    async fn delete_removes_only_the_target() {
        let store = store();
        let first = store.save(draft("عقد عمل", "أ")).await;
        let second = store.save(draft("عقد عمل", "ب")).await;
        let third = store.save(draft("عقد عمل", "ج")).await;

        store.delete(&second).await;
        let ids: Vec<String> = store.get_all().await.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![third, first]);

        store.delete("missing-id").await;
        assert_eq!(store.get_all().await.len(), 2);
    }

    #[tokio::test]
    async fn update_merges_patch_fields_in_place() {
        let store = store();
        let id = store.save(draft("عقد عمل", "قبل")).await;
        store
            .update(
                &id,
                ConversationPatch {
                    user_input: Some("بعد".to_string()),
                    generated_content: Some("نص جديد".to_string()),
                    rating: Some(4),
                    ..ConversationPatch::default()
                },
            )
            .await;

        let record = store.get_all().await.remove(0);
        assert_eq!(record.user_input, "بعد");
        assert_eq!(record.generated_content, Some("نص جديد".to_string()));
        assert_eq!(record.rating, Some(4));

        // Out-of-range ratings and unknown ids are ignored.
        store.update(&id, ConversationPatch::rating(9)).await;
        assert_eq!(store.get_all().await[0].rating, Some(4));
        store.update("missing-id", ConversationPatch::rating(1)).await;
        assert_eq!(store.get_all().await.len(), 1);
    }

    #[tokio::test]
    async fn export_import_round_trips_and_rejects_bad_payloads() {
        let store = store();
        store.save(draft("عرض سعر", "تسعير سقالات")).await;
        let exported = store.export_all().await;

        let restored = KvConversationMemory::new(Arc::new(InMemoryKvSlot::new()));
        assert!(restored.import_all(&exported).await);
        assert_eq!(restored.get_all().await, store.get_all().await);

        assert!(!restored.import_all("{}").await);
        assert!(!restored.import_all("not json").await);
        assert_eq!(restored.get_all().await.len(), 1);
    }
}
