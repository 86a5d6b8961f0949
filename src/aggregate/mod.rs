//! Aggregation query builder for series-joined reports.
//!
//! This module provides a fluent builder for SUM, AVG, COUNT, MIN, MAX with
//! GROUP BY, ORDER BY, WHERE and JOIN support, and implements
//! [`SeriesScope`](crate::SeriesScope) so a calendar series can be attached.

mod query_builder;

pub use query_builder::{AggQueryBuilder, AggregateFunction, JoinType};
