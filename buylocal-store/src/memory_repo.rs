use async_trait::async_trait;
use buylocal_core::{CoreError, CoreResult, Entity, Repository};
use tokio::sync::RwLock;
use tracing::debug;

struct Table<T> {
    rows: Vec<T>,
    next_id: i64,
}

impl<T: Entity> Table<T> {
    fn insert(&mut self, mut entity: T) -> CoreResult<T> {
        if entity.id() == 0 {
            entity.set_id(self.next_id);
        } else if self.rows.iter().any(|row| row.id() == entity.id()) {
            return Err(CoreError::Conflict {
                entity: T::KIND,
                id: entity.id(),
            });
        }

        self.next_id = self.next_id.max(entity.id() + 1);
        self.rows.push(entity.clone());
        Ok(entity)
    }
}

/// Repository held entirely in memory, in insertion order.
///
/// Ids are assigned from a per-table sequence starting at 1. Writes take the
/// table lock, so each call is atomic with respect to the others.
pub struct InMemoryRepository<T> {
    table: RwLock<Table<T>>,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                rows: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Seed the table. Rows without an id are assigned one; rows whose id
    /// collides with an earlier row are rejected.
    pub fn with_rows(rows: Vec<T>) -> CoreResult<Self> {
        let mut table = Table {
            rows: Vec::with_capacity(rows.len()),
            next_id: 1,
        };
        for row in rows {
            table.insert(row)?;
        }
        Ok(Self {
            table: RwLock::new(table),
        })
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    async fn add(&self, entity: T) -> CoreResult<T> {
        let mut table = self.table.write().await;
        let entity = table.insert(entity)?;
        debug!("Added {} {}", T::KIND, entity.id());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> CoreResult<T> {
        let mut table = self.table.write().await;
        let row = table
            .rows
            .iter_mut()
            .find(|row| row.id() == entity.id())
            .ok_or(CoreError::NotFound {
                entity: T::KIND,
                id: entity.id(),
            })?;

        *row = entity.clone();
        Ok(entity)
    }

    async fn remove(&self, entity: &T) -> CoreResult<()> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|row| row.id() != entity.id());

        if table.rows.len() == before {
            return Err(CoreError::NotFound {
                entity: T::KIND,
                id: entity.id(),
            });
        }
        Ok(())
    }

    async fn all(&self) -> CoreResult<Vec<T>> {
        Ok(self.table.read().await.rows.clone())
    }

    async fn find_by_id(&self, id: i64) -> CoreResult<Option<T>> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|row| row.id() == id).cloned())
    }

    async fn query(&self, predicate: &(dyn for<'a> Fn(&'a T) -> bool + Send + Sync)) -> CoreResult<Vec<T>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .filter(|row| predicate(*row))
            .cloned()
            .collect())
    }

    async fn modify(
        &self,
        id: i64,
        change: &(dyn for<'a> Fn(&'a mut T) -> bool + Send + Sync),
    ) -> CoreResult<Option<T>> {
        let mut table = self.table.write().await;
        let row = table
            .rows
            .iter_mut()
            .find(|row| row.id() == id)
            .ok_or(CoreError::NotFound { entity: T::KIND, id })?;

        let mut candidate = row.clone();
        if !change(&mut candidate) {
            return Ok(None);
        }
        *row = candidate.clone();
        Ok(Some(candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: i64,
        body: String,
    }

    impl Note {
        fn new(body: &str) -> Self {
            Self {
                id: 0,
                body: body.to_string(),
            }
        }
    }

    impl Entity for Note {
        const KIND: &'static str = "note";

        fn id(&self) -> i64 {
            self.id
        }

        fn set_id(&mut self, id: i64) {
            self.id = id;
        }
    }

    #[tokio::test]
    async fn test_add_assigns_sequential_ids() {
        let repo = InMemoryRepository::new();

        let first = repo.add(Note::new("a")).await.unwrap();
        let second = repo.add(Note::new("b")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repo.len().await, 2);
    }

    #[tokio::test]
    async fn test_seeded_ids_are_kept_and_sequence_moves_past_them() {
        let mut seeded = Note::new("seeded");
        seeded.id = 10;
        let repo = InMemoryRepository::with_rows(vec![seeded, Note::new("fresh")]).unwrap();

        let all = repo.all().await.unwrap();
        assert_eq!(all[0].id, 10);
        assert_eq!(all[1].id, 11);

        let next = repo.add(Note::new("next")).await.unwrap();
        assert_eq!(next.id, 12);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_a_conflict() {
        let repo = InMemoryRepository::new();
        let note = repo.add(Note::new("a")).await.unwrap();

        let result = repo.add(note).await;
        assert!(matches!(result, Err(CoreError::Conflict { entity: "note", id: 1 })));
    }

    #[tokio::test]
    async fn test_update_replaces_row_in_place() {
        let repo = InMemoryRepository::new();
        repo.add(Note::new("a")).await.unwrap();
        let mut b = repo.add(Note::new("b")).await.unwrap();
        repo.add(Note::new("c")).await.unwrap();

        b.body = "b2".to_string();
        repo.update(b).await.unwrap();

        let bodies: Vec<String> = repo.all().await.unwrap().into_iter().map(|n| n.body).collect();
        assert_eq!(bodies, vec!["a", "b2", "c"]);
    }

    #[tokio::test]
    async fn test_update_unknown_row_is_not_found() {
        let repo: InMemoryRepository<Note> = InMemoryRepository::new();
        let mut ghost = Note::new("ghost");
        ghost.id = 99;

        let result = repo.update(ghost).await;
        assert!(matches!(result, Err(CoreError::NotFound { id: 99, .. })));
    }

    #[tokio::test]
    async fn test_remove_and_query() {
        let repo = InMemoryRepository::new();
        let a = repo.add(Note::new("keep")).await.unwrap();
        let b = repo.add(Note::new("drop")).await.unwrap();

        repo.remove(&b).await.unwrap();
        assert!(repo.find_by_id(b.id).await.unwrap().is_none());
        assert!(repo.remove(&b).await.is_err());

        let found = repo.query(&|n: &Note| n.body == "keep").await.unwrap();
        assert_eq!(found, vec![a]);
    }

    #[tokio::test]
    async fn test_modify_applies_only_accepted_changes() {
        let repo = InMemoryRepository::new();
        let note = repo.add(Note::new("draft")).await.unwrap();

        let publish = |n: &mut Note| {
            if n.body != "draft" {
                return false;
            }
            n.body = "published".to_string();
            true
        };

        let first = repo.modify(note.id, &publish).await.unwrap();
        assert_eq!(first.map(|n| n.body), Some("published".to_string()));

        // The stored row no longer matches, so the second change is declined.
        assert!(repo.modify(note.id, &publish).await.unwrap().is_none());
        assert_eq!(repo.find_by_id(note.id).await.unwrap().unwrap().body, "published");

        let missing = repo.modify(42, &publish).await;
        assert!(matches!(missing, Err(CoreError::NotFound { id: 42, .. })));
    }

    #[tokio::test]
    async fn test_concurrent_modify_has_one_winner() {
        let repo = std::sync::Arc::new(InMemoryRepository::new());
        let id = repo.add(Note::new("draft")).await.unwrap().id;

        let claims = (0..8).map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.modify(id, &|n: &mut Note| {
                    if n.body != "draft" {
                        return false;
                    }
                    n.body = "claimed".to_string();
                    true
                })
                .await
                .unwrap()
                .is_some()
            })
        });

        let mut winners = 0;
        for claim in claims.collect::<Vec<_>>() {
            if claim.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
