use chrono::{DateTime, Months, Utc};

/// Date range a history query is scoped to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HistoryWindow {
    /// From `years` before the query time until the query time
    Rolling { years: u32 },
    /// Fixed calendar range
    Fixed {
        from: DateTime<Utc>,
        till: DateTime<Utc>,
    },
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::Rolling { years: 10 }
    }
}

impl HistoryWindow {
    /// Concrete `(from, till)` bounds relative to `now`
    pub fn resolve(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        match self {
            Self::Rolling { years } => {
                let from = now
                    .checked_sub_months(Months::new(years.saturating_mul(12)))
                    .unwrap_or(DateTime::<Utc>::MIN_UTC);
                (from, now)
            }
            Self::Fixed { from, till } => (*from, *till),
        }
    }
}
