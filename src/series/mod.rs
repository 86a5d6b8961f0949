//! Calendar series joins.
//!
//! A series join right-joins a query against `generate_series` over the
//! current year, so grouped results carry one row per day or month even
//! for buckets with no matching records.
//!
//! # Example
//!
//! ```ignore
//! use sqlx_time_series::{compile, SeriesRange};
//!
//! let fragments = compile(SeriesRange::MonthsOfYear, None::<&str>);
//! // RIGHT JOIN LATERAL (SELECT * FROM generate_series(...) month) series
//! //     ON month = date_trunc('month', created_at)
//! assert_eq!(fragments.order, "month ASC");
//! ```

mod compiler;
mod range;

pub use compiler::{compile, JoinOverride, RawSql, SeriesFragments, SeriesJoin};
pub use range::SeriesRange;
