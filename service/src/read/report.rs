//! Reporting read definitions.

use common::{calendar, DateTime};
use rust_decimal::Decimal;

#[cfg(doc)]
use crate::domain::{DailyReport, Interaction};
use crate::domain::agent;

/// Time window of a per-agent performance report.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Window {
    /// Agent the report is about.
    pub agent: agent::Id,

    /// Start of the window (inclusive).
    pub start: DateTime,

    /// End of the window (inclusive).
    pub end: DateTime,
}

impl Window {
    /// Indicates whether the provided instant falls into this [`Window`].
    #[must_use]
    pub fn contains(&self, at: DateTime) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Operational counts of one agent within a [`Window`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Tally {
    /// Listings created (both sides).
    pub listings_created: u64,

    /// Visits scheduled.
    pub visits_scheduled: u64,

    /// Sessions scheduled.
    pub sessions_scheduled: u64,

    /// Trades closed.
    pub trades_closed: u64,
}

/// [`Interaction`] counts of one agent within a [`Window`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct InteractionStats {
    /// Interactions the agent sent.
    pub sent: u64,

    /// Sent interactions whose receiver viewed or responded.
    pub viewed_or_responded: u64,
}

impl InteractionStats {
    /// Response rate of the window: `viewed_or_responded / sent`.
    ///
    /// Zero when nothing was sent.
    #[must_use]
    pub fn response_rate(&self) -> Decimal {
        if self.sent == 0 {
            Decimal::ZERO
        } else {
            Decimal::from(self.viewed_or_responded) / Decimal::from(self.sent)
        }
    }
}

/// Selector of one agent's [`DailyReport`]s within one business month.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AgentMonth {
    /// Agent the reports belong to.
    pub agent: agent::Id,

    /// Business year.
    pub year: u16,

    /// Business month, `1..=12`.
    pub month: u8,
}

/// One day cell of the month grid.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DayCell {
    /// Day the cell stands for.
    pub date: calendar::Date,

    /// Indicator whether a [`DailyReport`] was submitted on that day.
    pub submitted: bool,
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::InteractionStats;

    #[test]
    fn response_rate() {
        let stats = InteractionStats {
            sent: 4,
            viewed_or_responded: 3,
        };
        assert_eq!(stats.response_rate(), Decimal::new(75, 2));

        let idle = InteractionStats::default();
        assert_eq!(idle.response_rate(), Decimal::ZERO);
    }
}
