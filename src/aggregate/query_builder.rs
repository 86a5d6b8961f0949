//! Fluent builder for grouped aggregation queries.
//!
//! The builder renders PostgreSQL text: `{}` placeholders in WHERE become
//! `$1`, `$2`, ... and values are bound by the caller on the returned
//! `QueryAs`. JOIN and ORDER BY accept raw fragments, which is what lets a
//! calendar series join be attached through [`SeriesScope`].

#[cfg(feature = "postgres")]
use sqlx::postgres::{PgArguments, PgRow, Postgres};
#[cfg(feature = "postgres")]
use sqlx::query::QueryAs;
#[cfg(feature = "postgres")]
use sqlx::FromRow;

use crate::traits::SeriesScope;
use crate::{get_or_insert_sql, prepare_where};

/// Type of SQL join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl std::fmt::Display for JoinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinType::Inner => write!(f, "INNER JOIN"),
            JoinType::Left => write!(f, "LEFT JOIN"),
            JoinType::Right => write!(f, "RIGHT JOIN"),
            JoinType::Full => write!(f, "FULL JOIN"),
        }
    }
}

/// Aggregate function applied to a column, with optional alias.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateFunction {
    Sum(String, Option<String>),
    Avg(String, Option<String>),
    Count(Option<String>, Option<String>), // None means COUNT(*)
    Min(String, Option<String>),
    Max(String, Option<String>),
}

impl AggregateFunction {
    fn to_sql(&self) -> String {
        let (expr, alias) = match self {
            AggregateFunction::Sum(col, alias) => (format!("SUM({})", col), alias),
            AggregateFunction::Avg(col, alias) => (format!("AVG({})", col), alias),
            AggregateFunction::Count(None, alias) => ("COUNT(*)".to_string(), alias),
            AggregateFunction::Count(Some(col), alias) => (format!("COUNT({})", col), alias),
            AggregateFunction::Min(col, alias) => (format!("MIN({})", col), alias),
            AggregateFunction::Max(col, alias) => (format!("MAX({})", col), alias),
        };
        match alias {
            Some(a) => format!("{} AS {}", expr, a),
            None => expr,
        }
    }
}

/// Fluent query builder for aggregation queries.
///
/// # Example
///
/// ```ignore
/// use sqlx_time_series::{AggQueryBuilder, SeriesRange, TimeSeriesExt};
///
/// // Paid orders per day of the current year, zero-filled.
/// let rows: Vec<(chrono::DateTime<chrono::Utc>, i64)> = AggQueryBuilder::new("orders")
///     .select("day")
///     .count_column_as("orders.id", "total")
///     .time_series(
///         SeriesRange::DaysOfYear,
///         "date_trunc('day', day) = date_trunc('day', orders.created_at) AND orders.status = 'paid'",
///     )
///     .group_by("day")
///     .build_query_as()
///     .fetch_all(&pool)
///     .await?;
/// ```
///
/// Filters on the joined table belong in the series `ON` clause. A WHERE
/// predicate on `orders` is NULL for empty buckets and drops them.
#[derive(Debug, Clone, Default)]
pub struct AggQueryBuilder {
    table_name: String,
    columns: Vec<String>,
    aggregates: Vec<AggregateFunction>,
    joins: Vec<String>,
    where_clause: Option<String>,
    where_params: Vec<String>,
    group_by_columns: Vec<String>,
    order_by: Vec<String>,
}

impl AggQueryBuilder {
    /// Creates a new aggregation query builder for the given table.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    /// Adds a plain column or expression to the SELECT list.
    pub fn select(mut self, column: &str) -> Self {
        self.columns.push(column.to_string());
        self
    }

    /// Adds a JOIN of the given type.
    ///
    /// ```ignore
    /// .join(JoinType::Left, "customers", "orders.customer_id = customers.id")
    /// ```
    pub fn join(mut self, join_type: JoinType, table: &str, condition: &str) -> Self {
        self.joins.push(format!("{} {} ON {}", join_type, table, condition));
        self
    }

    /// Adds a SUM aggregation with a custom alias.
    pub fn sum_as(mut self, column: &str, alias: &str) -> Self {
        self.aggregates.push(AggregateFunction::Sum(column.to_string(), Some(alias.to_string())));
        self
    }

    /// Adds an AVG aggregation with a custom alias.
    pub fn avg_as(mut self, column: &str, alias: &str) -> Self {
        self.aggregates.push(AggregateFunction::Avg(column.to_string(), Some(alias.to_string())));
        self
    }

    /// Adds a COUNT(*) aggregation with a custom alias.
    pub fn count_as(mut self, alias: &str) -> Self {
        self.aggregates.push(AggregateFunction::Count(None, Some(alias.to_string())));
        self
    }

    /// Adds a COUNT(column) aggregation with a custom alias.
    ///
    /// Counting a column of the joined table is what yields 0 for empty
    /// series buckets; `COUNT(*)` would count the series row itself.
    pub fn count_column_as(mut self, column: &str, alias: &str) -> Self {
        self.aggregates.push(AggregateFunction::Count(Some(column.to_string()), Some(alias.to_string())));
        self
    }

    /// Adds a MIN aggregation with a custom alias.
    pub fn min_as(mut self, column: &str, alias: &str) -> Self {
        self.aggregates.push(AggregateFunction::Min(column.to_string(), Some(alias.to_string())));
        self
    }

    /// Adds a MAX aggregation with a custom alias.
    pub fn max_as(mut self, column: &str, alias: &str) -> Self {
        self.aggregates.push(AggregateFunction::Max(column.to_string(), Some(alias.to_string())));
        self
    }

    /// Adds a WHERE clause with "{}" parameter placeholders.
    ///
    /// ```ignore
    /// .where_("status = {} AND amount > {}", &["active", "100"])
    /// ```
    pub fn where_(mut self, clause: &str, params: &[&str]) -> Self {
        self.where_clause = Some(clause.to_string());
        self.where_params = params.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Values recorded by `where_`, in placeholder order.
    pub fn where_params(&self) -> &[String] {
        &self.where_params
    }

    /// Adds a GROUP BY clause for the specified column.
    pub fn group_by(mut self, column: &str) -> Self {
        self.group_by_columns.push(column.to_string());
        self
    }

    /// Adds an ORDER BY term. Anything other than "DESC" (case-insensitive)
    /// sorts ascending.
    pub fn order_by(self, column: &str, direction: &str) -> Self {
        let dir = if direction.to_uppercase() == "DESC" {
            "DESC"
        } else {
            "ASC"
        };
        self.order_raw(&format!("{} {}", column, dir))
    }

    fn build_sql(&self) -> String {
        let select_parts: Vec<String> = self
            .columns
            .iter()
            .cloned()
            .chain(self.aggregates.iter().map(AggregateFunction::to_sql))
            .collect();
        let select_clause = if select_parts.is_empty() {
            "*".to_string()
        } else {
            select_parts.join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", select_clause, self.table_name);
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }
        if let Some(ref clause) = self.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&prepare_where(clause, 1));
        }
        if !self.group_by_columns.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by_columns.join(", "));
        }
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }

        #[cfg(feature = "log_sql")]
        tracing::debug!(table = %self.table_name, %sql, "built aggregation query");

        sql
    }

    /// Builds the query and returns a cached SQL string.
    pub fn build(&self) -> &'static str {
        let cache_key = format!(
            "{}-agg-select-{:?}-{:?}-joins-{:?}-where-{:?}-groupby-{:?}-orderby-{:?}",
            self.table_name,
            self.columns,
            self.aggregates,
            self.joins,
            self.where_clause,
            self.group_by_columns,
            self.order_by
        );

        get_or_insert_sql(cache_key, || self.build_sql())
    }

    /// Builds the query as an unbound sqlx `QueryAs`; bind the `where_`
    /// values in order before fetching.
    #[cfg(feature = "postgres")]
    pub fn build_query_as<O>(&self) -> QueryAs<'static, Postgres, O, PgArguments>
    where
        O: for<'r> FromRow<'r, PgRow>,
    {
        sqlx::query_as::<Postgres, O>(self.build())
    }
}

impl SeriesScope for AggQueryBuilder {
    fn join_raw(mut self, fragment: &str) -> Self {
        self.joins.push(fragment.to_string());
        self
    }

    fn order_raw(mut self, fragment: &str) -> Self {
        self.order_by.push(fragment.to_string());
        self
    }
}
