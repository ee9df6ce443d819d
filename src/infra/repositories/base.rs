//! Untyped CRUD over a single SeaORM entity.
//!
//! Filters and data are plain field maps. Keys are matched against the
//! entity's column names and values are bound according to each column's
//! declared type, so one implementation serves every table.

use std::marker::PhantomData;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Condition, Expr, OnConflict, Query, SimpleExpr};
use sea_orm::{
    ColumnTrait, ColumnType, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, IdenStatic,
    Iterable, QueryFilter, Statement, StatementBuilder, Value,
};
use serde::Serialize;
use serde_json::Value as Json;

use crate::errors::AppResult;

/// Column name to JSON value
pub type Fields = serde_json::Map<String, Json>;

/// Entities whose rows carry creation and modification stamps
pub trait TimestampedEntity: EntityTrait {
    fn created_at() -> Self::Column;
    fn updated_at() -> Self::Column;
}

/// Six generic operations; every filter is an exact-equality conjunction.
#[async_trait]
pub trait CrudRepository: Send + Sync {
    type Row: Send;

    /// Insert one row and return it as stored.
    async fn insert(&self, data: Fields) -> AppResult<Self::Row>;

    /// Insert one row unless it conflicts with an existing one.
    async fn insert_or_ignore(&self, data: Fields) -> AppResult<Option<Self::Row>>;

    async fn get_one(&self, filters: Fields) -> AppResult<Option<Self::Row>>;

    async fn get_all(&self, filters: Fields) -> AppResult<Vec<Self::Row>>;

    /// Update every matching row, returning one of them.
    async fn update(&self, filters: Fields, data: Fields) -> AppResult<Option<Self::Row>>;

    /// Delete every matching row, returning one of them.
    async fn delete(&self, filters: Fields) -> AppResult<Option<Self::Row>>;
}

/// [`CrudRepository`] bound to one entity and one session.
pub struct SqlRepository<'s, E, C> {
    conn: &'s C,
    _entity: PhantomData<E>,
}

impl<'s, E, C> SqlRepository<'s, E, C>
where
    E: TimestampedEntity,
    C: ConnectionTrait,
{
    pub fn new(conn: &'s C) -> Self {
        Self {
            conn,
            _entity: PhantomData,
        }
    }

    fn column(name: &str) -> Result<E::Column, DbErr> {
        E::Column::iter()
            .find(|column| column.as_str() == name)
            .ok_or_else(|| {
                DbErr::Type(format!(
                    "unknown column `{}` on `{}`",
                    name,
                    E::default().table_name()
                ))
            })
    }

    fn bind(fields: Fields) -> Result<Vec<(E::Column, Value)>, DbErr> {
        fields
            .into_iter()
            .map(|(name, value)| {
                let column = Self::column(&name)?;
                let value = to_db_value(column.def().get_column_type(), &name, &value)?;
                Ok((column, value))
            })
            .collect()
    }

    fn stamp(pairs: &mut Vec<(E::Column, Value)>, column: E::Column, now: DateTime<Utc>) {
        pairs.retain(|(existing, _)| existing.as_str() != column.as_str());
        pairs.push((column, Value::from(now)));
    }

    fn condition(pairs: Vec<(E::Column, Value)>) -> Condition {
        pairs
            .into_iter()
            .fold(Condition::all(), |condition, (column, value)| {
                condition.add(Expr::col(column).eq(value))
            })
    }

    fn build(&self, statement: &impl StatementBuilder) -> Statement {
        self.conn.get_database_backend().build(statement)
    }

    async fn insert_row(&self, data: Fields, ignore_conflicts: bool) -> AppResult<Option<E::Model>> {
        let mut pairs = Self::bind(data)?;
        let now = Utc::now();
        Self::stamp(&mut pairs, E::created_at(), now);
        Self::stamp(&mut pairs, E::updated_at(), now);

        let (columns, values): (Vec<_>, Vec<_>) = pairs
            .into_iter()
            .map(|(column, value)| (column, SimpleExpr::from(value)))
            .unzip();

        let mut insert = Query::insert();
        insert
            .into_table(E::default().table_ref())
            .columns(columns)
            .values(values)
            .map_err(|e| DbErr::Custom(e.to_string()))?;
        if ignore_conflicts {
            insert.on_conflict(OnConflict::new().do_nothing().to_owned());
        }
        insert.returning_all();

        let statement = self.build(&insert);
        Ok(E::Model::find_by_statement(statement)
            .one(self.conn)
            .await?)
    }
}

#[async_trait]
impl<'s, E, C> CrudRepository for SqlRepository<'s, E, C>
where
    E: TimestampedEntity,
    E::Model: Serialize + Sync,
    C: ConnectionTrait + Sync,
{
    type Row = E::Model;

    async fn insert(&self, data: Fields) -> AppResult<E::Model> {
        self.insert_row(data, false)
            .await?
            .ok_or_else(|| DbErr::RecordNotInserted.into())
    }

    async fn insert_or_ignore(&self, data: Fields) -> AppResult<Option<E::Model>> {
        self.insert_row(data, true).await
    }

    async fn get_one(&self, filters: Fields) -> AppResult<Option<E::Model>> {
        let condition = Self::condition(Self::bind(filters)?);
        Ok(E::find().filter(condition).one(self.conn).await?)
    }

    async fn get_all(&self, filters: Fields) -> AppResult<Vec<E::Model>> {
        let condition = Self::condition(Self::bind(filters)?);
        Ok(E::find().filter(condition).all(self.conn).await?)
    }

    async fn update(&self, filters: Fields, data: Fields) -> AppResult<Option<E::Model>> {
        let condition = Self::condition(Self::bind(filters)?);
        let mut pairs = Self::bind(data)?;
        Self::stamp(&mut pairs, E::updated_at(), Utc::now());

        let mut update = Query::update();
        update.table(E::default().table_ref());
        for (column, value) in pairs {
            update.value(column, value);
        }
        update.cond_where(condition).returning_all();

        let statement = self.build(&update);
        Ok(E::Model::find_by_statement(statement)
            .one(self.conn)
            .await?)
    }

    async fn delete(&self, filters: Fields) -> AppResult<Option<E::Model>> {
        let condition = Self::condition(Self::bind(filters)?);

        let mut delete = Query::delete();
        delete
            .from_table(E::default().table_ref())
            .cond_where(condition)
            .returning_all();

        let statement = self.build(&delete);
        Ok(E::Model::find_by_statement(statement)
            .one(self.conn)
            .await?)
    }
}

/// Bind a JSON value to the column's declared type.
fn to_db_value(column_type: &ColumnType, name: &str, value: &Json) -> Result<Value, DbErr> {
    let mismatch = || DbErr::Type(format!("cannot bind {} to column `{}`", value, name));

    let bound = match column_type {
        ColumnType::Boolean => match value {
            Json::Null => Value::Bool(None),
            Json::Bool(flag) => Value::from(*flag),
            _ => return Err(mismatch()),
        },
        ColumnType::Integer => match value {
            Json::Null => Value::Int(None),
            _ => value
                .as_i64()
                .and_then(|number| i32::try_from(number).ok())
                .map(Value::from)
                .ok_or_else(mismatch)?,
        },
        ColumnType::BigInteger => match value {
            Json::Null => Value::BigInt(None),
            _ => value.as_i64().map(Value::from).ok_or_else(mismatch)?,
        },
        ColumnType::Decimal(_) => {
            let decimal = match value {
                Json::Null => None,
                Json::String(text) => Some(Decimal::from_str(text).map_err(|_| mismatch())?),
                Json::Number(number) => {
                    Some(Decimal::from_str(&number.to_string()).map_err(|_| mismatch())?)
                }
                _ => return Err(mismatch()),
            };
            Value::from(decimal)
        }
        ColumnType::TimestampWithTimeZone | ColumnType::Timestamp | ColumnType::DateTime => {
            let timestamp = match value {
                Json::Null => None,
                Json::String(text) => Some(
                    DateTime::parse_from_rfc3339(text)
                        .map_err(|_| mismatch())?
                        .with_timezone(&Utc),
                ),
                _ => return Err(mismatch()),
            };
            Value::from(timestamp)
        }
        ColumnType::String(_) | ColumnType::Text | ColumnType::Char(_) => match value {
            Json::Null => Value::String(None),
            Json::String(text) => Value::from(text.clone()),
            _ => return Err(mismatch()),
        },
        other => {
            return Err(DbErr::Type(format!(
                "unsupported column type {:?} for `{}`",
                other, name
            )))
        }
    };

    Ok(bound)
}
