use crate::series::{JoinOverride, SeriesJoin, SeriesRange};

/// A query builder that accepts raw JOIN and ORDER BY fragments.
///
/// This is the whole surface a series join needs from its host: both
/// fragments are appended as-is and the builder is handed back for further
/// chaining.
pub trait SeriesScope: Sized {
    fn join_raw(self, fragment: &str) -> Self;
    fn order_raw(self, fragment: &str) -> Self;
}

/// Adds `time_series` to every [`SeriesScope`].
///
/// # Example
///
/// ```ignore
/// use sqlx_time_series::{AggQueryBuilder, SeriesRange, TimeSeriesExt};
///
/// let sql = AggQueryBuilder::new("orders")
///     .select("day")
///     .count_column_as("orders.id", "total")
///     .time_series(SeriesRange::DaysOfYear, "day = orders.created_at")
///     .group_by("day")
///     .build();
/// ```
pub trait TimeSeriesExt: SeriesScope {
    fn time_series(self, range: SeriesRange, join_override: impl Into<JoinOverride>) -> Self {
        attach_time_series(self, range, join_override)
    }
}

impl<T: SeriesScope> TimeSeriesExt for T {}

/// Compiles a series join for `range` and attaches it to `query`.
pub fn attach_time_series<Q: SeriesScope>(
    query: Q,
    range: SeriesRange,
    join_override: impl Into<JoinOverride>,
) -> Q {
    let fragments = SeriesJoin::new(range).on(join_override).build();
    query.join_raw(&fragments.join).order_raw(&fragments.order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        joins: Vec<String>,
        orders: Vec<String>,
    }

    impl SeriesScope for Recorder {
        fn join_raw(mut self, fragment: &str) -> Self {
            self.joins.push(fragment.to_string());
            self
        }

        fn order_raw(mut self, fragment: &str) -> Self {
            self.orders.push(fragment.to_string());
            self
        }
    }

    #[test]
    fn test_attach_appends_both_fragments() {
        let query = attach_time_series(Recorder::default(), SeriesRange::MonthsOfYear, None::<&str>);
        let expected = crate::compile(SeriesRange::MonthsOfYear, None::<&str>);
        assert_eq!(query.joins, vec![expected.join]);
        assert_eq!(query.orders, vec![expected.order]);
    }

    #[test]
    fn test_extension_matches_free_function() {
        let a = Recorder::default().time_series(SeriesRange::DaysOfYear, "day = created_at");
        let b = attach_time_series(Recorder::default(), SeriesRange::DaysOfYear, "day = created_at");
        assert_eq!(a.joins, b.joins);
        assert_eq!(a.orders, b.orders);
    }
}
