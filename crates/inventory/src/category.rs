use serde::{Deserialize, Serialize};

use storekeep_core::{CategoryId, DomainError, DomainResult, Entity};

/// A named grouping for items.
///
/// Items reference their category by name only, so deleting a category never
/// touches item or ledger rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Trim a raw category name and reject blanks.
pub fn normalize_category_name(raw: &str) -> DomainResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation("category name cannot be empty"));
    }
    Ok(name.to_string())
}
