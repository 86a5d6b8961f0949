//! Compiles a series range and an optional join override into SQL fragments.

use std::fmt;

use super::range::SeriesRange;

/// SQL text that is spliced into a statement verbatim.
///
/// Nothing wrapped in `RawSql` is escaped or bound as a parameter. Only
/// developer-authored text belongs here, never end-user input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawSql(String);

impl RawSql {
    pub fn new(sql: impl Into<String>) -> Self {
        RawSql(sql.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RawSql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the generated series is matched against the outer query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum JoinOverride {
    /// Use the range's default join condition.
    #[default]
    Default,
    /// A caller-supplied bucket-matching clause.
    ///
    /// Without `=` the clause is used as the whole `ON` predicate. With `=`
    /// it is split at the first `=` and both sides are truncated to the
    /// range's precision unless they already call `date_trunc`.
    ///
    /// Only the first `=` is a split point, so comparison operators do not
    /// survive: `day >= created_at` becomes
    /// `date_trunc('day', day >) = date_trunc('day', created_at)`. Pass such
    /// predicates with both sides already wrapped in `date_trunc`.
    Clause(RawSql),
}

impl From<RawSql> for JoinOverride {
    fn from(sql: RawSql) -> Self {
        JoinOverride::Clause(sql)
    }
}

impl From<&str> for JoinOverride {
    fn from(sql: &str) -> Self {
        JoinOverride::Clause(RawSql::new(sql))
    }
}

impl From<String> for JoinOverride {
    fn from(sql: String) -> Self {
        JoinOverride::Clause(RawSql::new(sql))
    }
}

impl<T: Into<JoinOverride>> From<Option<T>> for JoinOverride {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// The two fragments handed to the host query builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesFragments {
    /// `RIGHT JOIN LATERAL (...) series ON <condition>`
    pub join: String,
    /// `<step_label> ASC`
    pub order: String,
}

/// A single series-join request.
///
/// # Example
///
/// ```ignore
/// use sqlx_time_series::{SeriesJoin, SeriesRange};
///
/// let fragments = SeriesJoin::new(SeriesRange::DaysOfYear)
///     .on("day = orders.created_at")
///     .build();
///
/// assert_eq!(fragments.order, "day ASC");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesJoin {
    range: SeriesRange,
    join_override: JoinOverride,
}

impl SeriesJoin {
    pub fn new(range: SeriesRange) -> Self {
        Self {
            range,
            join_override: JoinOverride::Default,
        }
    }

    /// Replaces the join condition. `None` keeps the range default.
    pub fn on(mut self, join_override: impl Into<JoinOverride>) -> Self {
        self.join_override = join_override.into();
        self
    }

    /// Derives the `ON` predicate for this request.
    pub fn effective_condition(&self) -> String {
        match &self.join_override {
            JoinOverride::Default => self.range.default_join_condition().to_string(),
            JoinOverride::Clause(sql) => {
                let precision = self.range.step_label();
                match sql.as_str().split_once('=') {
                    Some((left, right)) => format!(
                        "{} = {}",
                        date_trunc_fmt(precision, left),
                        date_trunc_fmt(precision, right)
                    ),
                    None => sql.as_str().to_string(),
                }
            }
        }
    }

    /// Renders the join and order fragments.
    pub fn build(&self) -> SeriesFragments {
        let condition = self.effective_condition();
        let range = self.range;

        let join = format!(
            "RIGHT JOIN LATERAL (SELECT * FROM generate_series({}, {}, {}) {}) series ON {}",
            range.start_expr(),
            range.end_expr(),
            range.step_interval(),
            range.step_label(),
            condition
        );
        let order = format!("{} ASC", range.step_label());

        #[cfg(feature = "log_sql")]
        tracing::debug!(%range, %condition, %join, %order, "compiled series join");

        SeriesFragments { join, order }
    }
}

/// Compiles `range` with an optional override in one call.
pub fn compile(range: SeriesRange, join_override: impl Into<JoinOverride>) -> SeriesFragments {
    SeriesJoin::new(range).on(join_override).build()
}

/// Truncates `expr` to `precision` unless it already calls `date_trunc`.
fn date_trunc_fmt(precision: &str, expr: &str) -> String {
    let expr = expr.trim();
    if expr.contains("date_trunc") {
        expr.to_string()
    } else {
        format!("date_trunc('{}', {})", precision, expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_SERIES: &str = "RIGHT JOIN LATERAL (SELECT * FROM generate_series(date_trunc('year', now()), date_trunc('year', now()) + INTERVAL '1 year - 1 day', INTERVAL '1 day') day) series ON ";

    #[test]
    fn test_default_condition() {
        for range in SeriesRange::ALL {
            let fragments = SeriesJoin::new(range).build();
            let expected_suffix = format!(" ON {}", range.default_join_condition());
            assert!(fragments.join.ends_with(&expected_suffix), "{}", fragments.join);
        }
    }

    #[test]
    fn test_day_join_fragment() {
        let fragments = SeriesJoin::new(SeriesRange::DaysOfYear).build();
        assert_eq!(
            fragments.join,
            format!("{}day = date_trunc('day', created_at)", DAY_SERIES)
        );
        assert_eq!(fragments.order, "day ASC");
    }

    #[test]
    fn test_month_join_fragment() {
        let fragments = SeriesJoin::new(SeriesRange::MonthsOfYear).build();
        assert_eq!(
            fragments.join,
            "RIGHT JOIN LATERAL (SELECT * FROM generate_series(date_trunc('year', now()), date_trunc('year', now()) + INTERVAL '1 year - 1 day', INTERVAL '1 month') month) series ON month = date_trunc('month', created_at)"
        );
        assert_eq!(fragments.order, "month ASC");
    }

    #[test]
    fn test_clause_without_equals_is_verbatim() {
        let join = SeriesJoin::new(SeriesRange::DaysOfYear).on("created_at");
        assert_eq!(join.effective_condition(), "created_at");
        assert_eq!(join.build().join, format!("{}created_at", DAY_SERIES));
    }

    #[test]
    fn test_clause_sides_are_truncated() {
        let join = SeriesJoin::new(SeriesRange::DaysOfYear).on("day = created_at");
        assert_eq!(
            join.effective_condition(),
            "date_trunc('day', day) = date_trunc('day', created_at)"
        );
    }

    #[test]
    fn test_truncated_side_is_left_alone() {
        let join = SeriesJoin::new(SeriesRange::MonthsOfYear)
            .on("month=date_trunc('month', created_at)");
        assert_eq!(
            join.effective_condition(),
            "date_trunc('month', month) = date_trunc('month', created_at)"
        );

        let normalized = join.effective_condition();
        let again = SeriesJoin::new(SeriesRange::MonthsOfYear).on(normalized.as_str());
        assert_eq!(again.effective_condition(), normalized);
    }

    #[test]
    fn test_splits_on_first_equals_only() {
        let join = SeriesJoin::new(SeriesRange::DaysOfYear).on("day = created_at AND kind = 'x'");
        assert_eq!(
            join.effective_condition(),
            "date_trunc('day', day) = date_trunc('day', created_at AND kind = 'x')"
        );
    }

    #[test]
    fn test_none_matches_default() {
        let none = SeriesJoin::new(SeriesRange::DaysOfYear).on(None::<&str>).build();
        let default = SeriesJoin::new(SeriesRange::DaysOfYear).on(JoinOverride::Default).build();
        assert_eq!(none, default);
        assert_eq!(none, SeriesJoin::new(SeriesRange::DaysOfYear).build());
    }

    #[test]
    fn test_some_clause_matches_plain_clause() {
        let some = compile(SeriesRange::DaysOfYear, Some("day = created_at"));
        let plain = compile(SeriesRange::DaysOfYear, "day = created_at");
        assert_eq!(some, plain);
    }

    #[test]
    fn test_order_ignores_override() {
        for range in SeriesRange::ALL {
            let expected = format!("{} ASC", range.step_label());
            assert_eq!(compile(range, None::<&str>).order, expected);
            assert_eq!(compile(range, "created_at").order, expected);
            assert_eq!(compile(range, "a = b").order, expected);
        }
    }

    #[test]
    fn test_build_is_repeatable() {
        let join = SeriesJoin::new(SeriesRange::MonthsOfYear).on(String::from("month = o.created_at"));
        assert_eq!(join.build(), join.build());
    }

    #[test]
    #[cfg(feature = "log_sql")]
    fn test_build_with_sql_logging() {
        let fragments = SeriesJoin::new(SeriesRange::DaysOfYear).on("day = created_at").build();
        assert_eq!(fragments.order, "day ASC");
        assert!(fragments.join.ends_with("ON date_trunc('day', day) = date_trunc('day', created_at)"));
    }

    #[test]
    fn test_comparison_operator_splits_at_first_equals() {
        let join = SeriesJoin::new(SeriesRange::DaysOfYear).on("day >= created_at");
        assert_eq!(
            join.effective_condition(),
            "date_trunc('day', day >) = date_trunc('day', created_at)"
        );
    }

    #[test]
    fn test_raw_sql_display() {
        let sql = RawSql::new("day = created_at");
        assert_eq!(sql.to_string(), "day = created_at");
        assert_eq!(JoinOverride::from(sql.clone()), JoinOverride::Clause(sql));
    }
}
