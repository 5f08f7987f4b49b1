use chrono::{DateTime, NaiveDate, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use storekeep_core::{Aggregate, AggregateRoot, DomainError, DomainResult, ItemId};

use crate::movement::{ItemRef, LedgerEntry, MovementMetadata, Quantity, TxnType};

/// Which columns identify an item in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogRevision {
    /// One item per name; receiving under another category moves the item.
    NameKeyed,
    /// One item per (name, category) pair.
    #[default]
    NameCategoryKeyed,
}

impl CatalogRevision {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogRevision::NameKeyed => "name",
            CatalogRevision::NameCategoryKeyed => "name-category",
        }
    }

    /// The lookup key a receipt resolves against under this revision.
    pub fn item_key(&self, name: &str, category: &str) -> ItemKey {
        match self {
            CatalogRevision::NameKeyed => ItemKey {
                name: name.to_string(),
                category: None,
            },
            CatalogRevision::NameCategoryKeyed => ItemKey {
                name: name.to_string(),
                category: Some(category.to_string()),
            },
        }
    }
}

impl core::fmt::Display for CatalogRevision {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogRevision {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" | "name-keyed" => Ok(CatalogRevision::NameKeyed),
            "name-category" | "name-category-keyed" => Ok(CatalogRevision::NameCategoryKeyed),
            other => Err(DomainError::validation(format!(
                "unknown catalog revision '{other}' (expected 'name' or 'name-category')"
            ))),
        }
    }
}

/// Item lookup key. `category` is `None` when items are keyed by name only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey {
    pub name: String,
    pub category: Option<String>,
}

/// Aggregate root: InventoryItem.
///
/// `quantity` is the materialised running total of the item's ledger entries
/// and only changes through `apply`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    id: ItemId,
    name: String,
    category: String,
    quantity: u32,
}

impl InventoryItem {
    pub fn new(id: ItemId, name: impl Into<String>, category: impl Into<String>, quantity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            category: category.into(),
            quantity,
        }
    }

    pub fn id_typed(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn item_ref(&self) -> ItemRef {
        ItemRef {
            item_id: self.id,
            item_name: self.name.clone(),
            category: self.category.clone(),
        }
    }
}

impl AggregateRoot for InventoryItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Command: receive goods into an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiveStock {
    pub name: String,
    pub category: String,
    pub quantity: Quantity,
    /// Who the goods were received from.
    pub actor: String,
    pub occurred_at: DateTime<Utc>,
    /// Defaults to the day of `occurred_at`.
    pub effective_date: Option<NaiveDate>,
    pub metadata: MovementMetadata,
}

impl ReceiveStock {
    /// Trim text fields, drop blank optional fields and check required ones.
    pub fn normalized(self) -> DomainResult<Self> {
        let name = required(&self.name, "item name")?;
        let category = required(&self.category, "category")?;
        let actor = required(&self.actor, "received from")?;
        let metadata = MovementMetadata::receipt(
            optional(self.metadata.bill_no.as_deref()),
            self.metadata.rate,
            self.metadata.gst,
        );
        metadata.validate()?;
        Ok(Self {
            name,
            category,
            actor,
            metadata,
            ..self
        })
    }

    pub fn effective_date(&self) -> NaiveDate {
        self.effective_date
            .unwrap_or_else(|| self.occurred_at.date_naive())
    }
}

/// Command: issue goods out of an existing item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueStock {
    pub item_id: ItemId,
    pub quantity: Quantity,
    /// Who the goods were given to.
    pub actor: String,
    pub destination: Option<String>,
    pub occurred_at: DateTime<Utc>,
    /// Defaults to the day of `occurred_at`.
    pub effective_date: Option<NaiveDate>,
}

impl IssueStock {
    /// Trim text fields, drop a blank destination and check required ones.
    pub fn normalized(self) -> DomainResult<Self> {
        let actor = required(&self.actor, "given to")?;
        let destination = optional(self.destination.as_deref());
        Ok(Self {
            actor,
            destination,
            ..self
        })
    }

    pub fn effective_date(&self) -> NaiveDate {
        self.effective_date
            .unwrap_or_else(|| self.occurred_at.date_naive())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StockCommand {
    Receive(ReceiveStock),
    Issue(IssueStock),
}

impl Aggregate for InventoryItem {
    type Command = StockCommand;
    type Event = LedgerEntry;
    type Error = DomainError;

    fn apply(&mut self, entry: &Self::Event) {
        match entry.txn_type {
            TxnType::In => {
                self.quantity += entry.quantity.get();
                // Name-keyed catalogs move the item to the category it was last received under.
                self.category = entry.item.category.clone();
            }
            TxnType::Out => {
                self.quantity -= entry.quantity.get();
            }
        }
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            StockCommand::Receive(cmd) => self.handle_receive(cmd),
            StockCommand::Issue(cmd) => self.handle_issue(cmd),
        }
    }
}

impl InventoryItem {
    fn handle_receive(&self, cmd: &ReceiveStock) -> Result<Vec<LedgerEntry>, DomainError> {
        let cmd = cmd.clone().normalized()?;
        if cmd.name != self.name {
            return Err(DomainError::validation(format!(
                "receipt for '{}' resolved to item '{}'",
                cmd.name, self.name
            )));
        }
        if self.quantity.checked_add(cmd.quantity.get()).is_none() {
            return Err(DomainError::validation("quantity on hand would overflow"));
        }

        let effective_date = cmd.effective_date();
        Ok(vec![LedgerEntry {
            item: ItemRef {
                item_id: self.id,
                item_name: self.name.clone(),
                category: cmd.category,
            },
            txn_type: TxnType::In,
            quantity: cmd.quantity,
            actor: cmd.actor,
            recorded_at: cmd.occurred_at,
            effective_date,
            metadata: cmd.metadata,
        }])
    }

    fn handle_issue(&self, cmd: &IssueStock) -> Result<Vec<LedgerEntry>, DomainError> {
        if cmd.item_id != self.id {
            return Err(DomainError::validation("item_id mismatch"));
        }
        let cmd = cmd.clone().normalized()?;

        let requested = cmd.quantity.get();
        if requested > self.quantity {
            return Err(DomainError::insufficient_stock(requested, self.quantity));
        }

        let effective_date = cmd.effective_date();
        Ok(vec![LedgerEntry {
            item: self.item_ref(),
            txn_type: TxnType::Out,
            quantity: cmd.quantity,
            actor: cmd.actor,
            recorded_at: cmd.occurred_at,
            effective_date,
            metadata: MovementMetadata::issue(cmd.destination),
        }])
    }
}

fn required(raw: &str, field: &str) -> DomainResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(value.to_string())
}

fn optional(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn pen(quantity: u32) -> InventoryItem {
        InventoryItem::new(ItemId::new(1), "Pen", "Stationery", quantity)
    }

    fn receive(quantity: u32) -> ReceiveStock {
        ReceiveStock {
            name: "Pen".to_string(),
            category: "Stationery".to_string(),
            quantity: Quantity::new(quantity).unwrap(),
            actor: "Alice".to_string(),
            occurred_at: test_time(),
            effective_date: None,
            metadata: MovementMetadata::receipt(Some("B-17".into()), Some(2.5), Some(18.0)),
        }
    }

    fn issue(quantity: u32) -> IssueStock {
        IssueStock {
            item_id: ItemId::new(1),
            quantity: Quantity::new(quantity).unwrap(),
            actor: "Bob".to_string(),
            destination: Some("RoomA".to_string()),
            occurred_at: test_time(),
            effective_date: NaiveDate::from_ymd_opt(2024, 1, 2),
        }
    }

    #[test]
    fn receive_emits_in_entry_and_increments_stock() {
        let mut item = pen(0);
        let entries = item
            .handle(&StockCommand::Receive(receive(100)))
            .unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.txn_type, TxnType::In);
        assert_eq!(entry.quantity.get(), 100);
        assert_eq!(entry.actor, "Alice");
        assert_eq!(entry.effective_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(entry.metadata.bill_no.as_deref(), Some("B-17"));

        item.apply(entry);
        assert_eq!(item.quantity(), 100);
    }

    #[test]
    fn issue_carries_destination_and_snapshot() {
        let mut item = pen(100);
        let entries = item.handle(&StockCommand::Issue(issue(30))).unwrap();
        let entry = &entries[0];
        assert_eq!(entry.txn_type, TxnType::Out);
        assert_eq!(entry.item, item.item_ref());
        assert_eq!(entry.metadata.destination.as_deref(), Some("RoomA"));
        assert_eq!(entry.signed_delta(), -30);

        item.apply(entry);
        assert_eq!(item.quantity(), 70);
    }

    #[test]
    fn over_issue_is_rejected_with_available_stock() {
        let item = pen(70);
        let err = item.handle(&StockCommand::Issue(issue(100))).unwrap_err();
        assert_eq!(err, DomainError::insufficient_stock(100, 70));
    }

    #[test]
    fn issuing_everything_on_hand_empties_the_item() {
        let mut item = pen(70);
        let entries = item.handle(&StockCommand::Issue(issue(70))).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].signed_delta(), -70);
        item.apply(&entries[0]);
        assert_eq!(item.quantity(), 0);

        let err = item.handle(&StockCommand::Issue(issue(1))).unwrap_err();
        assert_eq!(err, DomainError::insufficient_stock(1, 0));
    }

    #[test]
    fn blank_actor_is_a_validation_error() {
        let item = pen(10);
        let mut cmd = issue(1);
        cmd.actor = "  ".to_string();
        assert!(matches!(
            item.handle(&StockCommand::Issue(cmd)),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn receipt_under_new_category_moves_name_keyed_item() {
        let mut item = pen(5);
        let mut cmd = receive(5);
        cmd.category = "Office".to_string();
        let entries = item.handle(&StockCommand::Receive(cmd)).unwrap();
        assert_eq!(entries[0].item.category, "Office");
        item.apply(&entries[0]);
        assert_eq!(item.category(), "Office");
        assert_eq!(item.quantity(), 10);
    }

    #[test]
    fn receive_rejects_overflow() {
        let item = pen(u32::MAX);
        assert!(matches!(
            item.handle(&StockCommand::Receive(receive(1))),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn revision_round_trips_through_its_name() {
        for rev in [CatalogRevision::NameKeyed, CatalogRevision::NameCategoryKeyed] {
            assert_eq!(rev.as_str().parse::<CatalogRevision>().unwrap(), rev);
        }
        assert_eq!(
            CatalogRevision::NameKeyed.item_key("Pen", "Stationery").category,
            None
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: for any sequence of receipts and issues, the item's quantity
        /// equals the signed sum of the accepted entries and never goes negative.
        #[test]
        fn quantity_is_running_total_of_accepted_entries(
            ops in prop::collection::vec((any::<bool>(), 1u32..500u32), 1..40)
        ) {
            let mut item = pen(0);
            let mut ledger_total: i64 = 0;

            for (is_receipt, qty) in ops {
                let cmd = if is_receipt {
                    StockCommand::Receive(receive(qty))
                } else {
                    StockCommand::Issue(issue(qty))
                };
                let before = item.quantity();
                match item.handle(&cmd) {
                    Ok(entries) => {
                        for e in &entries {
                            ledger_total += e.signed_delta();
                            item.apply(e);
                        }
                    }
                    Err(DomainError::InsufficientStock { requested, available }) => {
                        prop_assert!(!is_receipt);
                        prop_assert_eq!(requested, qty);
                        prop_assert_eq!(available, before);
                        prop_assert_eq!(item.quantity(), before);
                    }
                    Err(other) => prop_assert!(false, "unexpected error: {other:?}"),
                }
                prop_assert!(ledger_total >= 0);
            }

            prop_assert_eq!(i64::from(item.quantity()), ledger_total);
        }
    }
}
