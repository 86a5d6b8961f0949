//! Calendar series joins for sqlx aggregation queries.
//!
//! Right-joins a query against `generate_series` over the current year so
//! that grouped results contain one row per day or month, including buckets
//! with no matching records.
//!
//! ```ignore
//! use sqlx_time_series::{AggQueryBuilder, SeriesRange, TimeSeriesExt};
//!
//! let rows: Vec<(chrono::NaiveDateTime, i64)> = AggQueryBuilder::new("orders")
//!     .select("month")
//!     .count_column_as("orders.id", "total")
//!     .time_series(SeriesRange::MonthsOfYear, None::<&str>)
//!     .group_by("month")
//!     .build_query_as()
//!     .fetch_all(&pool)
//!     .await?;
//! ```
//!
//! Join overrides are spliced into the statement verbatim. Never pass
//! end-user input as an override.

pub mod aggregate;
mod error;
pub mod series;
pub mod traits;

pub use aggregate::{AggQueryBuilder, AggregateFunction, JoinType};
pub use error::{Result, SeriesError};
pub use series::{compile, JoinOverride, RawSql, SeriesFragments, SeriesJoin, SeriesRange};
pub use traits::{attach_time_series, SeriesScope, TimeSeriesExt};

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

// Global SQL cache. Generated statements are leaked once per distinct key so
// they can be handed to sqlx as `&'static str`.
static SQL_CACHE: Lazy<Mutex<HashMap<String, &'static str>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Get SQL from cache or compute and store it.
fn get_or_insert_sql(key: String, gen_fn: impl FnOnce() -> String) -> &'static str {
    let mut cache = SQL_CACHE.lock().unwrap_or_else(PoisonError::into_inner);
    *cache
        .entry(key)
        .or_insert_with(|| &*Box::leak(gen_fn().into_boxed_str()))
}

/// Replaces "{}" placeholders with PostgreSQL parameter markers.
///
/// # Example
///
/// ```ignore
/// prepare_where("name = {} AND age = {}", 1);
/// // "name = $1 AND age = $2"
/// ```
fn prepare_where(w: &str, field_count: i32) -> String {
    let param_count = w.matches("{}").count() as i32;
    let mut where_sql = w.to_string();

    for i in 0..param_count {
        let param = format!("${}", i + field_count);
        if let Some(pos) = where_sql.find("{}") {
            where_sql.replace_range(pos..pos + 2, &param);
        }
    }

    where_sql
}
