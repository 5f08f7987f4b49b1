//! Raw form input and its parsing rules.
//!
//! Forms hold exactly what the operator typed. Parsing trims text fields,
//! treats a blank optional field as absent, and maps the combo-box value
//! `All` to "no filter".

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use storekeep_core::{DomainError, DomainResult, ItemId};
use storekeep_inventory::{
    DateRange, IssueStock, ItemFilter, MovementMetadata, Quantity, ReceiveStock, TransactionFilter,
    TxnType,
};

/// Combo-box value meaning "do not filter".
pub const ALL: &str = "All";

/// Window used when the transaction filter has no start date.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveForm {
    pub item_name: String,
    pub category: String,
    pub quantity: String,
    pub user_name: String,
    pub bill_no: String,
    pub rate: String,
    pub gst: String,
    /// `YYYY-MM-DD`; blank means today.
    pub date: String,
}

impl ReceiveForm {
    pub fn parse(&self, now: DateTime<Local>) -> DomainResult<ReceiveStock> {
        let quantity = parse_quantity(&self.quantity)?;
        let effective_date = parse_optional_date(&self.date, "date")?.unwrap_or(now.date_naive());
        let metadata = MovementMetadata::receipt(
            optional_text(&self.bill_no),
            parse_optional_decimal(&self.rate, "rate")?,
            parse_optional_decimal(&self.gst, "GST")?,
        );

        Ok(ReceiveStock {
            name: required_text(&self.item_name, "item name")?,
            category: required_text(&self.category, "category")?,
            quantity,
            actor: required_text(&self.user_name, "user name")?,
            occurred_at: now.with_timezone(&Utc),
            effective_date: Some(effective_date),
            metadata,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueForm {
    pub item_id: String,
    pub quantity: String,
    pub user_name: String,
    pub destination: String,
    pub date: String,
}

impl IssueForm {
    pub fn parse(&self, now: DateTime<Local>) -> DomainResult<IssueStock> {
        let item_id = required_text(&self.item_id, "item")?.parse::<ItemId>()?;
        let quantity = parse_quantity(&self.quantity)?;
        let effective_date = parse_optional_date(&self.date, "date")?.unwrap_or(now.date_naive());

        Ok(IssueStock {
            item_id,
            quantity,
            actor: required_text(&self.user_name, "user name")?,
            destination: optional_text(&self.destination),
            occurred_at: now.with_timezone(&Utc),
            effective_date: Some(effective_date),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFilterForm {
    pub name: String,
    pub category: String,
}

impl ItemFilterForm {
    pub fn parse(&self) -> ItemFilter {
        let mut filter = ItemFilter::default();
        if let Some(name) = optional_text(&self.name) {
            filter = filter.name_contains(name);
        }
        if let Some(category) = combo_value(&self.category) {
            filter = filter.in_category(category);
        }
        filter
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFilterForm {
    pub item_name: String,
    pub user_name: String,
    /// `IN`, `OUT`, `All` or blank.
    pub txn_type: String,
    pub category: String,
    pub item_id: String,
    pub from_date: String,
    pub to_date: String,
}

impl TransactionFilterForm {
    /// Build the filter. Missing dates default to the
    /// [`DEFAULT_WINDOW_DAYS`]-day window ending `today`.
    pub fn parse(&self, today: NaiveDate) -> DomainResult<TransactionFilter> {
        let mut filter = TransactionFilter::default();
        if let Some(name) = optional_text(&self.item_name) {
            filter = filter.name_contains(name);
        }
        if let Some(user) = optional_text(&self.user_name) {
            filter = filter.actor_contains(user);
        }
        if let Some(txn_type) = combo_value(&self.txn_type) {
            filter = filter.of_type(txn_type.parse::<TxnType>()?);
        }
        if let Some(category) = combo_value(&self.category) {
            filter = filter.in_category(category);
        }
        if let Some(id) = optional_text(&self.item_id) {
            filter = filter.for_item(id.parse::<ItemId>()?);
        }

        let to = parse_optional_date(&self.to_date, "to date")?.unwrap_or(today);
        let from = match parse_optional_date(&self.from_date, "from date")? {
            Some(from) => from,
            None => DateRange::ending_on(to, DEFAULT_WINDOW_DAYS).from(),
        };
        Ok(filter.between(DateRange::new(from, to)?))
    }
}

/// All ASCII digits and positive.
pub fn parse_quantity(raw: &str) -> DomainResult<Quantity> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::validation(format!(
            "quantity must be a whole number, got '{raw}'"
        )));
    }
    let value = raw
        .parse::<u32>()
        .map_err(|_| DomainError::validation(format!("quantity {raw} is too large")))?;
    Quantity::new(value)
}

fn required_text(raw: &str, field: &str) -> DomainResult<String> {
    optional_text(raw).ok_or_else(|| DomainError::validation(format!("{field} is required")))
}

fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// `None` for blank or `All`.
fn combo_value(raw: &str) -> Option<String> {
    optional_text(raw).filter(|v| !v.eq_ignore_ascii_case(ALL))
}

fn parse_optional_decimal(raw: &str, field: &str) -> DomainResult<Option<f64>> {
    let Some(text) = optional_text(raw) else {
        return Ok(None);
    };
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(Some(value)),
        _ => Err(DomainError::validation(format!(
            "{field} must be a non-negative number, got '{text}'"
        ))),
    }
}

fn parse_optional_date(raw: &str, field: &str) -> DomainResult<Option<NaiveDate>> {
    let Some(text) = optional_text(raw) else {
        return Ok(None);
    };
    let invalid = || DomainError::validation(format!("{field} must be YYYY-MM-DD, got '{text}'"));
    if !is_plain_iso_date(&text) {
        return Err(invalid());
    }
    let date = NaiveDate::parse_from_str(&text, DATE_FORMAT).map_err(|_| invalid())?;
    if date.year() < 1 {
        return Err(invalid());
    }
    Ok(Some(date))
}

/// Exactly `DDDD-DD-DD`. `%Y` alone also takes signed and 5+ digit years,
/// which would not sort correctly as stored text.
fn is_plain_iso_date(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
