//! Unit of Work pattern implementation.
//!
//! A [`UnitOfWork`] owns one database transaction and hands out typed
//! repositories bound to it. Nothing is persisted unless `commit` is called;
//! `close` (and dropping the guard) discards whatever is still pending.

use std::future::Future;
use std::pin::Pin;

use sea_orm::{DatabaseConnection, DatabaseTransaction, EntityTrait, TransactionTrait};
use serde::Serialize;

use super::repositories::{
    ConfigRepository, EntitySchemas, PaymentRepository, TypedRepository, UserRepository,
};
use crate::errors::{AppError, AppResult};

/// Transactional scope over one session.
pub struct UnitOfWork {
    db: DatabaseConnection,
    txn: Option<DatabaseTransaction>,
}

impl UnitOfWork {
    /// Open a session and start its first transaction.
    pub async fn begin(db: &DatabaseConnection) -> AppResult<Self> {
        let txn = db.begin().await?;
        tracing::debug!("Unit of work started");

        Ok(Self {
            db: db.clone(),
            txn: Some(txn),
        })
    }

    fn session(&self) -> AppResult<&DatabaseTransaction> {
        self.txn
            .as_ref()
            .ok_or_else(|| AppError::internal("Unit of work has no open transaction"))
    }

    fn take(&mut self) -> AppResult<DatabaseTransaction> {
        self.txn
            .take()
            .ok_or_else(|| AppError::internal("Unit of work has no open transaction"))
    }

    /// Persist pending changes; the scope stays usable afterwards.
    pub async fn commit(&mut self) -> AppResult<()> {
        self.take()?.commit().await?;
        self.txn = Some(self.db.begin().await?);
        tracing::debug!("Unit of work committed");
        Ok(())
    }

    /// Discard pending changes; the scope stays usable afterwards.
    pub async fn rollback(&mut self) -> AppResult<()> {
        self.take()?.rollback().await?;
        self.txn = Some(self.db.begin().await?);
        tracing::debug!("Unit of work rolled back");
        Ok(())
    }

    /// Roll back anything uncommitted and release the session.
    pub async fn close(mut self) -> AppResult<()> {
        if let Some(txn) = self.txn.take() {
            txn.rollback().await?;
        }
        tracing::debug!("Unit of work closed");
        Ok(())
    }

    pub fn users(&self) -> AppResult<UserRepository<'_>> {
        self.repository()
    }

    pub fn payments(&self) -> AppResult<PaymentRepository<'_>> {
        self.repository()
    }

    pub fn configs(&self) -> AppResult<ConfigRepository<'_>> {
        self.repository()
    }

    /// Typed repository for any schema binding, scoped to this session.
    pub fn repository<S>(&self) -> AppResult<TypedRepository<'_, S>>
    where
        S: EntitySchemas,
        <S::Entity as EntityTrait>::Model: Serialize + Sync,
    {
        Ok(TypedRepository::new(self.session()?))
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        // SeaORM rolls the transaction back when it is dropped uncommitted
        if self.txn.is_some() {
            tracing::debug!("Unit of work dropped without close, rolling back");
        }
    }
}

/// Body of a unit of work; see [`Persistence::run`].
pub type UnitOfWorkFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Factory for units of work.
#[derive(Clone)]
pub struct Persistence {
    db: DatabaseConnection,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn begin(&self) -> AppResult<UnitOfWork> {
        UnitOfWork::begin(&self.db).await
    }

    /// Run `f` inside a fresh unit of work and always close it afterwards.
    ///
    /// Writes persist only if `f` called [`UnitOfWork::commit`]. When both
    /// the body and the close fail, the body's error is returned.
    pub async fn run<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a mut UnitOfWork) -> UnitOfWorkFuture<'a, T> + Send,
        T: Send,
    {
        let mut uow = self.begin().await?;
        let result = f(&mut uow).await;
        let closed = uow.close().await;

        match (result, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(close_err)) => Err(close_err),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                tracing::error!("Failed to close unit of work: {}", close_err);
                Err(e)
            }
        }
    }
}

/// Run a block inside a unit of work:
///
/// ```ignore
/// let user = with_unit_of_work!(persistence, |uow| {
///     let user = uow.users()?.insert(UserInsert::new(42)).await?;
///     uow.commit().await?;
///     Ok(user)
/// })?;
/// ```
///
/// The block is moved into the unit of work, so it may only capture owned
/// values.
#[macro_export]
macro_rules! with_unit_of_work {
    ($persistence:expr, |$uow:ident| { $($body:tt)* }) => {
        $persistence
            .run(move |$uow| ::std::boxed::Box::pin(async move { $($body)* }))
            .await
    };
}
