//! 聚合层 - 订单 / 卡片汇总
//!
//! Pure functions over flat record lists fetched by the repositories.
//! Nothing here touches the database or the clock; the same input always
//! produces the same output.
//!
//! - [`period`]: year → month buckets for charts
//! - [`card_metrics`]: per-card and extension-wide balances
//!
//! Missing amounts count as zero. Sums are exact `Decimal` additions.

pub mod card_metrics;
pub mod period;

#[cfg(test)]
mod tests;

pub use card_metrics::{
    BalanceStanding, CardMetrics, CardSummary, CardTotals, StatusCounts, aggregate_cards,
    summarize_card,
};
pub use period::{PeriodReport, PeriodTotals, TypeBreakdown, YearSummary, aggregate_by_period};
