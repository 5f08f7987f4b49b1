//! Query filters for catalog and ledger listings.
//!
//! Filters only describe *what* to select; evaluation happens in the store.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use storekeep_core::{DomainError, DomainResult, ItemId, ValueObject};

use crate::movement::TxnType;

/// Inclusive range of effective dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl ValueObject for DateRange {}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> DomainResult<Self> {
        if to < from {
            return Err(DomainError::InvalidDateRange {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(Self { from, to })
    }

    /// The `days`-day window ending on (and including) `today`, clamped at
    /// the earliest representable date.
    pub fn ending_on(today: NaiveDate, days: u32) -> Self {
        let span = u64::from(days.max(1)) - 1;
        Self {
            from: today.checked_sub_days(Days::new(span)).unwrap_or(NaiveDate::MIN),
            to: today,
        }
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self { from: day, to: day }
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Catalog listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFilter {
    /// Substring of the item name.
    pub name_contains: Option<String>,
    /// Exact category name.
    pub category: Option<String>,
}

impl ItemFilter {
    pub fn name_contains(mut self, needle: impl Into<String>) -> Self {
        self.name_contains = Some(needle.into());
        self
    }

    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Ledger listing filter. Results are ordered most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFilter {
    /// Substring of the denormalised item name.
    pub name_contains: Option<String>,
    /// Substring of the acting party's name.
    pub actor_contains: Option<String>,
    pub txn_type: Option<TxnType>,
    /// Exact denormalised category.
    pub category: Option<String>,
    pub item_id: Option<ItemId>,
    /// Inclusive effective-date range.
    pub date_range: Option<DateRange>,
}

impl TransactionFilter {
    pub fn name_contains(mut self, needle: impl Into<String>) -> Self {
        self.name_contains = Some(needle.into());
        self
    }

    pub fn actor_contains(mut self, needle: impl Into<String>) -> Self {
        self.actor_contains = Some(needle.into());
        self
    }

    pub fn of_type(mut self, txn_type: TxnType) -> Self {
        self.txn_type = Some(txn_type);
        self
    }

    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn for_item(mut self, item_id: ItemId) -> Self {
        self.item_id = Some(item_id);
        self
    }

    pub fn between(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }
}
