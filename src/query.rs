//! Query construction helpers.
//!
//! [`FieldValues`] carries dynamically named field/value pairs (lookup keys,
//! insert values, update overrides) and validates them against the entity's
//! declared columns. [`Query`] builds a `Select` from predicates, join
//! directives, ordering and an optional column projection.

use std::str::FromStr;

use sea_orm::sea_query::{ColumnType, IntoCondition, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoSimpleExpr, JoinType,
    Order, QueryFilter, QueryOrder, QuerySelect, RelationDef, Select, Value,
};

use crate::error::{RepoResult, RepositoryError};

pub(crate) fn entity_table<E: EntityTrait>() -> String {
    E::default().table_name().to_owned()
}

/// Resolve a field name against the columns `E` declares.
pub(crate) fn resolve_column<E>(name: &str) -> RepoResult<E::Column>
where
    E: EntityTrait,
{
    E::Column::from_str(name).map_err(|_| RepositoryError::InvalidField {
        entity: entity_table::<E>(),
        field: name.to_owned(),
    })
}

/// Coarse value classification used to reject definite type conflicts before
/// they reach the store. Anything null, backend-specific or ambiguous passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Bool,
    Integer,
    Float,
    Text,
    Bytes,
    Uuid,
    DateTime,
    Json,
}

fn value_kind(value: &Value) -> Option<ValueKind> {
    match value {
        Value::Bool(Some(_)) => Some(ValueKind::Bool),
        Value::TinyInt(Some(_))
        | Value::SmallInt(Some(_))
        | Value::Int(Some(_))
        | Value::BigInt(Some(_))
        | Value::TinyUnsigned(Some(_))
        | Value::SmallUnsigned(Some(_))
        | Value::Unsigned(Some(_))
        | Value::BigUnsigned(Some(_)) => Some(ValueKind::Integer),
        Value::Float(Some(_)) | Value::Double(Some(_)) => Some(ValueKind::Float),
        Value::String(Some(_)) | Value::Char(Some(_)) => Some(ValueKind::Text),
        Value::Bytes(Some(_)) => Some(ValueKind::Bytes),
        Value::Uuid(Some(_)) => Some(ValueKind::Uuid),
        Value::Json(Some(_)) => Some(ValueKind::Json),
        Value::ChronoDate(Some(_))
        | Value::ChronoTime(Some(_))
        | Value::ChronoDateTime(Some(_))
        | Value::ChronoDateTimeUtc(Some(_))
        | Value::ChronoDateTimeLocal(Some(_))
        | Value::ChronoDateTimeWithTimeZone(Some(_)) => Some(ValueKind::DateTime),
        _ => None,
    }
}

fn column_kind(column_type: &ColumnType) -> Option<ValueKind> {
    match column_type {
        ColumnType::Boolean => Some(ValueKind::Bool),
        ColumnType::TinyInteger
        | ColumnType::SmallInteger
        | ColumnType::Integer
        | ColumnType::BigInteger
        | ColumnType::TinyUnsigned
        | ColumnType::SmallUnsigned
        | ColumnType::Unsigned
        | ColumnType::BigUnsigned => Some(ValueKind::Integer),
        ColumnType::Float | ColumnType::Double => Some(ValueKind::Float),
        ColumnType::Char(_) | ColumnType::String(_) | ColumnType::Text => Some(ValueKind::Text),
        ColumnType::Binary(_) | ColumnType::VarBinary(_) | ColumnType::Blob => {
            Some(ValueKind::Bytes)
        }
        ColumnType::Uuid => Some(ValueKind::Uuid),
        ColumnType::Json | ColumnType::JsonBinary => Some(ValueKind::Json),
        ColumnType::Date
        | ColumnType::Time
        | ColumnType::DateTime
        | ColumnType::Timestamp
        | ColumnType::TimestampWithTimeZone => Some(ValueKind::DateTime),
        _ => None,
    }
}

fn check_value(field: &str, column_type: &ColumnType, value: &Value) -> RepoResult<()> {
    if let (Some(expected), Some(actual)) = (column_kind(column_type), value_kind(value)) {
        if expected != actual {
            return Err(RepositoryError::TypeMismatch {
                field: field.to_owned(),
                expected: format!("{column_type:?}"),
            });
        }
    }
    Ok(())
}

/// Ordered field/value pairs addressed by column name.
///
/// Names are validated lazily, when the pairs are turned into predicates or
/// an active model, so an unknown field surfaces as
/// [`RepositoryError::InvalidField`] from the operation that used it.
#[derive(Debug, Clone, Default)]
pub struct FieldValues {
    pairs: Vec<(String, Value)>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field/value pair.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.pairs.push((name.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Conjunction of equality predicates over the declared columns of `E`.
    pub(crate) fn condition<E>(&self) -> RepoResult<Condition>
    where
        E: EntityTrait,
    {
        let mut condition = Condition::all();
        for (name, value) in &self.pairs {
            let column = resolve_column::<E>(name)?;
            condition = condition.add(column.eq(value.clone()));
        }
        Ok(condition)
    }

    /// Set each pair on an active model, after checking the value kind
    /// against the declared column type.
    pub(crate) fn apply_to<E>(&self, model: &mut E::ActiveModel) -> RepoResult<()>
    where
        E: EntityTrait,
    {
        for (name, value) in &self.pairs {
            let column = resolve_column::<E>(name)?;
            let def = column.def();
            check_value(name, def.get_column_type(), value)?;
            model.set(column, value.clone());
        }
        Ok(())
    }

    /// Active model built from the pairs alone.
    pub(crate) fn active_model<E>(&self) -> RepoResult<E::ActiveModel>
    where
        E: EntityTrait,
    {
        let mut model = <E::ActiveModel as ActiveModelTrait>::default();
        self.apply_to::<E>(&mut model)?;
        Ok(model)
    }
}

/// Select builder for an entity.
///
/// Explicit predicates pass through unchanged; named fields become equality
/// predicates validated at [`Query::build`] time. Joins are inner joins along
/// declared relationship paths and exist for filtering; eager loads live on
/// the repository (`*_with_related`) because they change the result shape.
pub struct Query<E: EntityTrait> {
    condition: Condition,
    fields: Vec<(String, Value)>,
    joins: Vec<RelationDef>,
    order_by: Vec<(SimpleExpr, Order)>,
    columns: Vec<E::Column>,
}

impl<E: EntityTrait> Default for Query<E> {
    fn default() -> Self {
        Self {
            condition: Condition::all(),
            fields: Vec::new(),
            joins: Vec::new(),
            order_by: Vec::new(),
            columns: Vec::new(),
        }
    }
}

impl<E: EntityTrait> Query<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// AND a caller-supplied predicate into the query, unchanged.
    pub fn filter(mut self, predicate: impl IntoCondition) -> Self {
        self.condition = self.condition.add(predicate.into_condition());
        self
    }

    /// AND an equality predicate on a named field. The name is checked
    /// against the entity's columns when the query is built.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Inner-join a declared relationship path, e.g.
    /// `article::Relation::Comments.def()`, so predicates can reference the
    /// related table.
    pub fn join(mut self, relation: RelationDef) -> Self {
        self.joins.push(relation);
        self
    }

    pub fn order_by(mut self, column: E::Column, order: Order) -> Self {
        self.order_by.push((column.into_simple_expr(), order));
        self
    }

    pub fn order_by_expr(mut self, expr: SimpleExpr, order: Order) -> Self {
        self.order_by.push((expr, order));
        self
    }

    /// Project onto the given columns instead of selecting the full model.
    /// Callers finish such queries themselves, e.g. with `into_tuple()`.
    pub fn select_columns(mut self, columns: impl IntoIterator<Item = E::Column>) -> Self {
        self.columns.extend(columns);
        self
    }

    /// Build the underlying `Select`, validating named fields. Public so
    /// callers can compose further (pagination, custom result shapes).
    pub fn build(self) -> RepoResult<Select<E>> {
        let mut condition = self.condition;
        for (name, value) in &self.fields {
            let column = resolve_column::<E>(name)?;
            condition = condition.add(column.eq(value.clone()));
        }

        let mut select = E::find().filter(condition);
        for relation in self.joins {
            select = select.join(JoinType::InnerJoin, relation);
        }
        for (expr, order) in self.order_by {
            select = select.order_by(expr, order);
        }
        if !self.columns.is_empty() {
            select = select.select_only().columns(self.columns);
        }
        Ok(select)
    }
}

impl<E: EntityTrait> From<SimpleExpr> for Query<E> {
    fn from(predicate: SimpleExpr) -> Self {
        Query::new().filter(predicate)
    }
}

impl<E: EntityTrait> From<Condition> for Query<E> {
    fn from(condition: Condition) -> Self {
        Query::new().filter(condition)
    }
}

impl<E: EntityTrait> From<FieldValues> for Query<E> {
    fn from(values: FieldValues) -> Self {
        let mut query = Query::new();
        query.fields = values.pairs;
        query
    }
}
