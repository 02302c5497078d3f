use async_trait::async_trait;

use crate::{CoreError, CoreResult};

/// Anything a repository can store. Identity is assigned by the repository on
/// `add`; an id of `0` means the entity has not been persisted yet.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Name used in errors and logs, e.g. `"offer"`.
    const KIND: &'static str;

    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
}

/// Entities that are never physically removed by the engine.
pub trait SoftDelete: Entity {
    fn is_deleted(&self) -> bool;

    /// Once set, the flag is never cleared.
    fn mark_deleted(&mut self);
}

/// Generic store over one entity type.
///
/// Implementations own concurrency control. Enumeration order (`all`, `query`)
/// must be stable, since callers rely on it to break ordering ties.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    async fn add(&self, entity: T) -> CoreResult<T>;

    async fn update(&self, entity: T) -> CoreResult<T>;

    /// Soft or hard, at the implementation's discretion.
    async fn remove(&self, entity: &T) -> CoreResult<()>;

    async fn all(&self) -> CoreResult<Vec<T>>;

    async fn find_by_id(&self, id: i64) -> CoreResult<Option<T>>;

    async fn query(&self, predicate: &(dyn for<'a> Fn(&'a T) -> bool + Send + Sync)) -> CoreResult<Vec<T>>;

    /// Apply `change` to the stored row and persist it when `change` returns
    /// `true`. Returns `None`, with the row untouched, when it declines.
    ///
    /// The default reads then writes. Implementations that can hold the row
    /// across both steps should override it so the change is a compare-and-set.
    async fn modify(
        &self,
        id: i64,
        change: &(dyn for<'a> Fn(&'a mut T) -> bool + Send + Sync),
    ) -> CoreResult<Option<T>> {
        let mut row = self
            .find_by_id(id)
            .await?
            .ok_or(CoreError::NotFound { entity: T::KIND, id })?;
        if !change(&mut row) {
            return Ok(None);
        }
        self.update(row).await.map(Some)
    }
}
