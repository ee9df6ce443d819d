//! Schema-checked repository.
//!
//! [`TypedRepository`] wraps [`SqlRepository`] and parses every input and
//! output through the schema set named by an [`EntitySchemas`] binding.

use std::marker::PhantomData;

use sea_orm::{ConnectionTrait, DatabaseTransaction, EntityTrait};
use serde::Serialize;
use serde_json::Value as Json;

use super::base::{CrudRepository, SqlRepository, TimestampedEntity};
use super::validation::{validate_input, validate_output, Schema};
use crate::errors::AppResult;

/// The five bindings of a typed repository.
///
/// Leaving one out is a compile error at the `impl`.
pub trait EntitySchemas: Send + Sync + 'static {
    type Entity: TimestampedEntity;
    /// What every operation returns
    type Model: Schema;
    type Insert: Schema;
    type Filter: Schema;
    type Update: Schema;
}

/// Operation input: a schema value or a raw JSON mapping to be parsed into one
#[derive(Debug, Clone)]
pub enum Payload<S> {
    Schema(S),
    Raw(Json),
}

impl<S> Payload<S> {
    pub fn raw(value: Json) -> Self {
        Payload::Raw(value)
    }
}

impl<S> From<S> for Payload<S> {
    fn from(schema: S) -> Self {
        Payload::Schema(schema)
    }
}

/// Repository over `S::Entity` within one session.
pub struct TypedRepository<'s, S, C = DatabaseTransaction>
where
    S: EntitySchemas,
{
    inner: SqlRepository<'s, S::Entity, C>,
    _schemas: PhantomData<S>,
}

impl<'s, S, C> TypedRepository<'s, S, C>
where
    S: EntitySchemas,
    <S::Entity as EntityTrait>::Model: Serialize + Sync,
    C: ConnectionTrait + Sync,
{
    pub fn new(conn: &'s C) -> Self {
        Self {
            inner: SqlRepository::new(conn),
            _schemas: PhantomData,
        }
    }

    pub async fn insert(
        &self,
        data: impl Into<Payload<S::Insert>> + Send,
    ) -> AppResult<S::Model> {
        let fields = validate_input("insert", data.into())?;
        let row = self.inner.insert(fields).await?;
        Ok(validate_output("insert", &row)?)
    }

    /// `None` when the row conflicts with an existing one
    pub async fn insert_or_ignore(
        &self,
        data: impl Into<Payload<S::Insert>> + Send,
    ) -> AppResult<Option<S::Model>> {
        let fields = validate_input("insert_or_ignore", data.into())?;
        match self.inner.insert_or_ignore(fields).await? {
            Some(row) => Ok(Some(validate_output("insert_or_ignore", &row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_one(
        &self,
        filters: impl Into<Payload<S::Filter>> + Send,
    ) -> AppResult<Option<S::Model>> {
        let fields = validate_input("get_one", filters.into())?;
        match self.inner.get_one(fields).await? {
            Some(row) => Ok(Some(validate_output("get_one", &row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_all(
        &self,
        filters: impl Into<Payload<S::Filter>> + Send,
    ) -> AppResult<Vec<S::Model>> {
        let fields = validate_input("get_all", filters.into())?;
        let rows = self.inner.get_all(fields).await?;
        rows.iter()
            .map(|row| validate_output("get_all", row).map_err(Into::into))
            .collect()
    }

    pub async fn update(
        &self,
        filters: impl Into<Payload<S::Filter>> + Send,
        data: impl Into<Payload<S::Update>> + Send,
    ) -> AppResult<Option<S::Model>> {
        let filters = validate_input("update", filters.into())?;
        let data = validate_input("update", data.into())?;
        match self.inner.update(filters, data).await? {
            Some(row) => Ok(Some(validate_output("update", &row)?)),
            None => Ok(None),
        }
    }

    pub async fn delete(
        &self,
        filters: impl Into<Payload<S::Filter>> + Send,
    ) -> AppResult<Option<S::Model>> {
        let fields = validate_input("delete", filters.into())?;
        match self.inner.delete(fields).await? {
            Some(row) => Ok(Some(validate_output("delete", &row)?)),
            None => Ok(None),
        }
    }
}
