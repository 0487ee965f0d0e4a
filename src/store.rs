use tokio::sync::RwLock;

use crate::ids;

/// A record with a stable string identity.
pub trait HasId {
    fn id(&self) -> &str;
}

/// Insertion-ordered in-memory collection for one resource type. Owned by
/// `AppState` rather than living in process-wide globals, so tests build
/// isolated instances.
pub struct ResourceStore<T> {
    records: RwLock<Vec<T>>,
}

impl<T> ResourceStore<T>
where
    T: HasId + Clone,
{
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    pub async fn all(&self) -> Vec<T> {
        self.records.read().await.clone()
    }

    pub async fn find(&self, id: &str) -> Option<T> {
        self.records
            .read()
            .await
            .iter()
            .find(|record| record.id() == id)
            .cloned()
    }

    pub async fn append(&self, record: T) {
        self.records.write().await.push(record);
    }

    /// Allocates the next id and appends the record built from it under a
    /// single write lock, so the id cannot be handed out twice.
    pub async fn insert(&self, build: impl FnOnce(String) -> T) -> T {
        let mut records = self.records.write().await;
        let id = ids::next_id(records.iter().map(HasId::id));
        let record = build(id);
        records.push(record.clone());
        record
    }

    /// Overwrites the stored record carrying the same id, preserving its
    /// position in the collection.
    pub async fn replace(&self, record: T) -> Option<T> {
        let mut records = self.records.write().await;
        let slot = records.iter_mut().find(|r| r.id() == record.id())?;
        *slot = record.clone();
        Some(record)
    }

    pub async fn remove_by_id(&self, id: &str) -> Option<T> {
        let mut records = self.records.write().await;
        let index = records.iter().position(|record| record.id() == id)?;
        Some(records.remove(index))
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

impl<T> Default for ResourceStore<T>
where
    T: HasId + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{HasId, ResourceStore};

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: String,
        text: String,
    }

    impl HasId for Note {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn note(id: &str, text: &str) -> Note {
        Note {
            id: id.to_string(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn insert_allocates_sequential_ids() {
        let store = ResourceStore::new();

        let first = store.insert(|id| note(&id, "a")).await;
        let second = store.insert(|id| note(&id, "b")).await;

        assert_eq!(first.id, "1");
        assert_eq!(second.id, "2");
    }

    #[tokio::test]
    async fn all_preserves_insertion_order() {
        let store = ResourceStore::new();
        store.append(note("9", "first")).await;
        store.append(note("2", "second")).await;
        store.append(note("5", "third")).await;

        let texts: Vec<String> = store.all().await.into_iter().map(|n| n.text).collect();
        assert_eq!(texts, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn find_returns_the_matching_record() {
        let store = ResourceStore::new();
        store.append(note("1", "a")).await;

        assert_eq!(store.find("1").await, Some(note("1", "a")));
        assert_eq!(store.find("2").await, None);
    }

    #[tokio::test]
    async fn replace_keeps_the_record_position() {
        let store = ResourceStore::new();
        store.append(note("1", "a")).await;
        store.append(note("2", "b")).await;

        let replaced = store.replace(note("1", "changed")).await;
        assert_eq!(replaced, Some(note("1", "changed")));

        let all = store.all().await;
        assert_eq!(all[0], note("1", "changed"));
        assert_eq!(all[1], note("2", "b"));
    }

    #[tokio::test]
    async fn replace_of_an_unknown_id_is_a_no_op() {
        let store = ResourceStore::new();
        store.append(note("1", "a")).await;

        assert_eq!(store.replace(note("2", "x")).await, None);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn remove_by_id_returns_the_removed_record() {
        let store = ResourceStore::new();
        store.append(note("1", "a")).await;
        store.append(note("2", "b")).await;

        assert_eq!(store.remove_by_id("1").await, Some(note("1", "a")));
        assert_eq!(store.remove_by_id("1").await, None);
        assert_eq!(store.all().await, [note("2", "b")]);
    }

    #[tokio::test]
    async fn insert_skips_over_non_numeric_ids() {
        let store = ResourceStore::new();
        store.append(note("special", "a")).await;

        let inserted = store.insert(|id| note(&id, "b")).await;
        assert_eq!(inserted.id, "1");
    }
}
