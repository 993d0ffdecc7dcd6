//! Fare calculation.
//!
//! Discounts are taken once from the undiscounted subtotal and the result is
//! rounded half-up to a whole naira. Callers reject zero dates/weeks before
//! asking for a fare.

use serde::{Deserialize, Serialize};

/// Per-trip price used by the profile subscription planner.
pub const PLANNER_BASE_PRICE: i64 = 2400;

/// Weekly passes are billed as six trips per week.
pub const WEEKLY_TRIPS_PER_WEEK: i64 = 6;

/// Planner weekly plans count two trips on each of five working days.
pub const PLANNER_TRIPS_PER_WEEK: i64 = 10;

pub const HYBRID_BULK_THRESHOLD: usize = 5;
pub const HYBRID_BULK_DISCOUNT: u32 = 5;
pub const FOUR_WEEK_DISCOUNT: u32 = 7;
pub const PLANNER_DISCOUNT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareBreakdown {
    pub subtotal: i64,
    pub discount_percent: u32,
    pub total: i64,
}

impl FareBreakdown {
    fn discounted(subtotal: i64, discount_percent: u32) -> Self {
        Self {
            subtotal,
            discount_percent,
            total: apply_discount(subtotal, discount_percent),
        }
    }

    /// Undiscounted fare.
    pub fn flat(total: i64) -> Self {
        Self::discounted(total, 0)
    }

    pub fn savings(&self) -> i64 {
        self.subtotal - self.total
    }
}

/// `subtotal * (100 - percent) / 100`, rounded half-up.
pub fn apply_discount(subtotal: i64, percent: u32) -> i64 {
    let scaled = subtotal * i64::from(100 - percent.min(100));
    if scaled >= 0 {
        (scaled * 2 + 100) / 200
    } else {
        -((-scaled * 2 + 99) / 200)
    }
}

pub fn single_fare(route_price: i64) -> i64 {
    route_price
}

/// Route price per selected date, 5% off from five dates up.
pub fn hybrid_fare(route_price: i64, dates: usize) -> FareBreakdown {
    let subtotal = route_price * dates as i64;
    let discount = if dates >= HYBRID_BULK_THRESHOLD {
        HYBRID_BULK_DISCOUNT
    } else {
        0
    };
    FareBreakdown::discounted(subtotal, discount)
}

/// Six trips per week; 7% off for exactly four weeks and nothing otherwise.
pub fn weekly_subscription_fare(route_price: i64, weeks: u32) -> FareBreakdown {
    let subtotal = route_price * i64::from(weeks) * WEEKLY_TRIPS_PER_WEEK;
    let discount = if weeks == 4 { FOUR_WEEK_DISCOUNT } else { 0 };
    FareBreakdown::discounted(subtotal, discount)
}

/// Weekly plan quoted from the profile planner: ten trips a week at the
/// planner base price, flat 5% off whatever the length.
pub fn planner_weekly_fare(weeks: u32) -> FareBreakdown {
    let subtotal = PLANNER_BASE_PRICE * PLANNER_TRIPS_PER_WEEK * i64::from(weeks);
    FareBreakdown::discounted(subtotal, PLANNER_DISCOUNT)
}

/// Round trip on each chosen date at the planner base price, flat 5% off.
pub fn custom_subscription_fare(dates: usize) -> FareBreakdown {
    let subtotal = PLANNER_BASE_PRICE * dates as i64 * 2;
    FareBreakdown::discounted(subtotal, PLANNER_DISCOUNT)
}

/// Split `total` over `parts` rows so that the rows sum to `total`; the
/// remainder goes to the earliest rows.
pub fn split_fare(total: i64, parts: usize) -> Vec<i64> {
    if parts == 0 {
        return Vec::new();
    }
    let n = parts as i64;
    let (base, remainder) = (total / n, total % n);
    (0..n).map(|i| base + i64::from(i < remainder)).collect()
}
