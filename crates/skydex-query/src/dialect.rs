//! Per-database syntax differences.
//!
//! Every place the rest of the engine would otherwise need an `if dialect ==
//! ...` goes through one of these six-ish pure functions instead, so adding
//! a third backend later is a matter of adding one more match arm per
//! function rather than hunting down scattered string formatting.

/// Which database backend a query is being rendered for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

/// Bucketing granularity for [`crate::GroupByField::DateTrunc`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interval {
    Hour,
    Day,
    Week,
    Month,
}

impl Dialect {
    /// The placeholder for the `i`-th (1-indexed) bind parameter.
    pub fn placeholder(&self, i: usize) -> String {
        match self {
            Self::Sqlite => "?".to_string(),
            Self::Postgres => format!("${i}"),
        }
    }

    /// `n` placeholders starting at `start`, comma-separated.
    pub fn placeholders(&self, n: usize, start: usize) -> String {
        (0..n)
            .map(|k| self.placeholder(start + k))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Extract a dotted JSON path as text.
    ///
    /// SQLite has one function for any depth; Postgres needs a chain of
    /// `->` (returns JSON) ending in a single `->>` (returns text).
    pub fn json_extract(&self, column: &str, path: &[&str]) -> String {
        match self {
            Self::Sqlite => format!("json_extract({column},'$.{}')", path.join(".")),
            Self::Postgres => {
                let (last, init) = path.split_last().expect("json path must have >=1 segment");
                let mut expr = column.to_string();
                for segment in init {
                    expr = format!("{expr}->'{segment}'");
                }
                format!("{expr}->>'{last}'")
            }
        }
    }

    /// Wrap a JSON field expression so it compares as an integer.
    ///
    /// Only ever applied to JSON field expressions — table columns are
    /// never cast.
    pub fn integer_cast(&self, expr: &str) -> String {
        match self {
            Self::Sqlite => format!("CAST({expr} AS INTEGER)"),
            Self::Postgres => format!("({expr})::INTEGER"),
        }
    }

    /// The current-time expression.
    pub fn now(&self) -> &'static str {
        match self {
            Self::Sqlite => "datetime('now')",
            Self::Postgres => "NOW()",
        }
    }

    /// The case-insensitive substring match operator.
    pub fn like_operator(&self) -> &'static str {
        match self {
            Self::Sqlite => "LIKE",
            Self::Postgres => "ILIKE",
        }
    }

    /// The collation clause to append after a `LIKE`, if any.
    ///
    /// `ILIKE` is already case-insensitive on Postgres, so there is nothing
    /// to append there.
    pub fn like_collation(&self) -> &'static str {
        match self {
            Self::Sqlite => " COLLATE NOCASE",
            Self::Postgres => "",
        }
    }

    /// Truncate a timestamp expression to a bucket boundary, rendered as text.
    pub fn date_trunc(&self, expr: &str, interval: Interval) -> String {
        match self {
            Self::Sqlite => {
                let fmt = match interval {
                    Interval::Hour => "%Y-%m-%d %H:00:00",
                    Interval::Day => "%Y-%m-%d",
                    Interval::Week => "%Y-%W",
                    Interval::Month => "%Y-%m",
                };
                format!("strftime('{fmt}', {expr})")
            }
            Self::Postgres => {
                let fmt = match interval {
                    Interval::Hour => "YYYY-MM-DD HH24:00:00",
                    Interval::Day => "YYYY-MM-DD",
                    Interval::Week => "IYYY-IW",
                    Interval::Month => "YYYY-MM",
                };
                format!("TO_CHAR(({expr})::timestamp, '{fmt}')")
            }
        }
    }

    /// Wrap a datetime-typed JSON field so an unparseable value reads as
    /// `NULL` rather than sorting arbitrarily (or erroring, on Postgres).
    pub fn datetime_or_null(&self, expr: &str) -> String {
        match self {
            Self::Sqlite => format!("CASE WHEN datetime({expr}) IS NOT NULL THEN {expr} ELSE NULL END"),
            Self::Postgres => format!(
                "CASE WHEN {expr} ~ '^[0-9]{{4}}-[0-9]{{2}}-[0-9]{{2}}' THEN ({expr})::timestamptz ELSE NULL END"
            ),
        }
    }
}
