//! Generic repository facade.
//!
//! One repository binds one entity type to one connection for its lifetime
//! and holds no other state; everything persistent lives in the backing
//! store. Write operations run inside a nested unit of work on the wrapped
//! connection: when the repository wraps a `DatabaseTransaction`, `begin`
//! opens a savepoint and committing it makes the writes visible within the
//! outer transaction without committing it. Commit/rollback of the outer
//! unit of work stays with whoever owns the connection.

use std::marker::PhantomData;

use sea_orm::sea_query::IntoCondition;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel,
    QueryFilter, QuerySelect, Related, TransactionTrait,
};

use crate::error::{RepoResult, RepositoryError};
use crate::query::{entity_table, FieldValues, Query};
use crate::registry;

/// Ceiling on the number of rows accepted by a single batch insert.
pub const BATCH_SIZE: usize = 1000;

/// Repository over the entity `E`, backed by a connection or transaction.
pub struct Repository<'c, C, E>
where
    C: ConnectionTrait + TransactionTrait,
    E: EntityTrait,
{
    conn: &'c C,
    entity: PhantomData<E>,
}

impl<'c, C, E> Repository<'c, C, E>
where
    C: ConnectionTrait + TransactionTrait,
    E: EntityTrait,
{
    pub fn new(conn: &'c C) -> Self {
        Self {
            conn,
            entity: PhantomData,
        }
    }

    /// The repository name bound to `E` in the registry, or the generic
    /// fallback when no name was registered.
    pub fn name(&self) -> String {
        registry::repository_name::<E>()
    }

    fn not_found() -> RepositoryError {
        RepositoryError::NotFound {
            entity: entity_table::<E>(),
        }
    }

    fn ambiguous() -> RepositoryError {
        RepositoryError::Ambiguous {
            entity: entity_table::<E>(),
        }
    }

    /// Fetch exactly one matching row.
    pub async fn get(&self, query: impl Into<Query<E>>) -> RepoResult<E::Model> {
        match self.get_or_none(query).await? {
            Some(model) => Ok(model),
            None => Err(Self::not_found()),
        }
    }

    /// Fetch at most one matching row.
    pub async fn get_or_none(&self, query: impl Into<Query<E>>) -> RepoResult<Option<E::Model>> {
        let mut rows = query.into().build()?.limit(2).all(self.conn).await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(Some(rows.remove(0))),
            _ => Err(Self::ambiguous()),
        }
    }

    /// Fetch every matching row. Order is unspecified unless the query asks
    /// for one.
    pub async fn find(&self, query: impl Into<Query<E>>) -> RepoResult<Vec<E::Model>> {
        Ok(query.into().build()?.all(self.conn).await?)
    }

    /// Fetch matching rows together with their `R` collections in a single
    /// round trip (left join), instead of one relation query per row.
    pub async fn find_with_related<R>(
        &self,
        related: R,
        filter: impl IntoCondition,
    ) -> RepoResult<Vec<(E::Model, Vec<R::Model>)>>
    where
        R: EntityTrait,
        E: Related<R>,
    {
        Ok(E::find()
            .find_with_related(related)
            .filter(filter.into_condition())
            .all(self.conn)
            .await?)
    }

    /// Fetch exactly one row together with its `R` collection.
    pub async fn get_with_related<R>(
        &self,
        related: R,
        filter: impl IntoCondition,
    ) -> RepoResult<(E::Model, Vec<R::Model>)>
    where
        R: EntityTrait,
        E: Related<R>,
    {
        let mut rows = self.find_with_related(related, filter).await?;
        match rows.len() {
            0 => Err(Self::not_found()),
            1 => Ok(rows.remove(0)),
            _ => Err(Self::ambiguous()),
        }
    }

    /// Insert a new row and return the persisted model.
    pub async fn create(&self, model: E::ActiveModel) -> RepoResult<E::Model>
    where
        E::Model: IntoActiveModel<E::ActiveModel>,
        E::ActiveModel: ActiveModelBehavior + Send,
    {
        let txn = self.conn.begin().await?;
        let model = model.insert(&txn).await?;
        txn.commit().await?;
        tracing::debug!(table = %entity_table::<E>(), "Row created");
        Ok(model)
    }

    /// Insert a new row from dynamically named field values.
    pub async fn create_from_values(&self, values: FieldValues) -> RepoResult<E::Model>
    where
        E::Model: IntoActiveModel<E::ActiveModel>,
        E::ActiveModel: ActiveModelBehavior + Send,
    {
        self.create(values.active_model::<E>()?).await
    }

    /// Insert up to [`BATCH_SIZE`] rows in one statement and return the
    /// persisted models. An oversized batch fails before anything is written.
    pub async fn create_batch(&self, models: Vec<E::ActiveModel>) -> RepoResult<Vec<E::Model>>
    where
        E::Model: IntoActiveModel<E::ActiveModel>,
        E::ActiveModel: ActiveModelBehavior + Send,
    {
        if models.len() > BATCH_SIZE {
            return Err(RepositoryError::BatchTooLarge {
                size: models.len(),
                limit: BATCH_SIZE,
            });
        }
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let txn = self.conn.begin().await?;
        let rows = E::insert_many(models)
            .exec_with_returning_many(&txn)
            .await?;
        txn.commit().await?;
        tracing::debug!(table = %entity_table::<E>(), rows = rows.len(), "Batch created");
        Ok(rows)
    }

    /// Like [`Self::create_batch`], but each row is built from field values.
    /// Every row is validated before any insert happens.
    pub async fn create_batch_from_values(
        &self,
        rows: Vec<FieldValues>,
    ) -> RepoResult<Vec<E::Model>>
    where
        E::Model: IntoActiveModel<E::ActiveModel>,
        E::ActiveModel: ActiveModelBehavior + Send,
    {
        if rows.len() > BATCH_SIZE {
            return Err(RepositoryError::BatchTooLarge {
                size: rows.len(),
                limit: BATCH_SIZE,
            });
        }
        let mut models = Vec::with_capacity(rows.len());
        for values in &rows {
            models.push(values.active_model::<E>()?);
        }
        self.create_batch(models).await
    }

    /// Persist the changed fields of an active model.
    pub async fn update(&self, model: E::ActiveModel) -> RepoResult<E::Model>
    where
        E::Model: IntoActiveModel<E::ActiveModel>,
        E::ActiveModel: ActiveModelBehavior + Send,
    {
        let txn = self.conn.begin().await?;
        let model = model.update(&txn).await?;
        txn.commit().await?;
        Ok(model)
    }

    /// Apply named overrides to an existing model and persist them. With no
    /// overrides the model is returned untouched.
    pub async fn update_values(
        &self,
        model: E::Model,
        overrides: FieldValues,
    ) -> RepoResult<E::Model>
    where
        E::Model: IntoActiveModel<E::ActiveModel>,
        E::ActiveModel: ActiveModelBehavior + Send,
    {
        if overrides.is_empty() {
            return Ok(model);
        }
        let mut active = model.into_active_model();
        overrides.apply_to::<E>(&mut active)?;
        self.update(active).await
    }

    /// Fetch the row matching the field values, inserting it first if no row
    /// matches. Returns the model and whether it was created.
    ///
    /// This is a read-then-write sequence and is not atomic against
    /// concurrent callers: two callers racing on a unique key can both
    /// observe "no row" and both insert, with the loser surfacing
    /// [`RepositoryError::ConstraintViolation`] from the store rather than
    /// the winner's row.
    pub async fn get_or_create(&self, values: FieldValues) -> RepoResult<(E::Model, bool)>
    where
        E::Model: IntoActiveModel<E::ActiveModel>,
        E::ActiveModel: ActiveModelBehavior + Send,
    {
        if let Some(model) = self.get_or_none(values.condition::<E>()?).await? {
            return Ok((model, false));
        }
        let model = self.create(values.active_model::<E>()?).await?;
        Ok((model, true))
    }
}
