//! Command handlers for front-end integration.
//!
//! Each handler takes raw input, calls the store, and returns display rows
//! or a message suitable for a message box.

use anyhow::Context;
use chrono::Local;

use storekeep_core::{CategoryId, DomainError};
use storekeep_store::{Store, StoreConfig, StoreError};

use crate::forms::{ALL, IssueForm, ItemFilterForm, ReceiveForm, TransactionFilterForm};
use crate::types::{AuditSummary, CategoryRow, ItemRow, MovementResult, TransactionRow};

/// Application state shared across command handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    store: Store,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Open the store described by `config`.
    pub async fn open(config: &StoreConfig) -> anyhow::Result<Self> {
        let store = Store::open(config)
            .await
            .with_context(|| format!("failed to open inventory store at {:?}", config.location))?;
        Ok(Self::new(store))
    }

    /// Initialise logging and open the store configured by the environment.
    pub async fn from_env() -> anyhow::Result<Self> {
        storekeep_observability::init();
        let config = StoreConfig::from_env().context("failed to read store configuration")?;
        tracing::info!(revision = %config.revision, "starting storekeep");
        Self::open(&config).await
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

/// Operator-facing text for a failed command.
pub fn error_message(err: &StoreError) -> String {
    match err {
        StoreError::Domain(DomainError::InsufficientStock {
            requested,
            available,
        }) => format!("Not enough stock: requested {requested}, only {available} available"),
        StoreError::Domain(DomainError::DuplicateCategory(name)) => {
            format!("Category '{name}' already exists")
        }
        StoreError::Domain(DomainError::NotFound) => "No such record".to_string(),
        StoreError::Domain(other) => capitalize(&other.to_string()),
        other => {
            tracing::error!(error = %other, "store failure");
            format!("Database error: {other}")
        }
    }
}

fn capitalize(msg: &str) -> String {
    let mut chars = msg.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn domain_message(err: DomainError) -> String {
    error_message(&StoreError::Domain(err))
}

pub async fn add_category(name: String, state: &AppState) -> Result<CategoryRow, String> {
    state
        .store
        .add_category(&name)
        .await
        .map(Into::into)
        .map_err(|e| error_message(&e))
}

pub async fn delete_category(id: String, state: &AppState) -> Result<CategoryRow, String> {
    let id = id.parse::<CategoryId>().map_err(domain_message)?;
    state
        .store
        .delete_category(id)
        .await
        .map(Into::into)
        .map_err(|e| error_message(&e))
}

pub async fn list_categories(state: &AppState) -> Result<Vec<CategoryRow>, String> {
    let categories = state
        .store
        .list_categories()
        .await
        .map_err(|e| error_message(&e))?;
    Ok(categories.into_iter().map(Into::into).collect())
}

/// Category names for a filter combo box, with `All` first.
pub async fn category_options(state: &AppState) -> Result<Vec<String>, String> {
    let names = state
        .store
        .category_names()
        .await
        .map_err(|e| error_message(&e))?;
    Ok(std::iter::once(ALL.to_string()).chain(names).collect())
}

pub async fn receive_stock(form: ReceiveForm, state: &AppState) -> Result<MovementResult, String> {
    let cmd = form.parse(Local::now()).map_err(domain_message)?;
    let outcome = state
        .store
        .receive(cmd)
        .await
        .map_err(|e| error_message(&e))?;
    Ok(outcome.into())
}

pub async fn issue_stock(form: IssueForm, state: &AppState) -> Result<MovementResult, String> {
    let cmd = form.parse(Local::now()).map_err(domain_message)?;
    let outcome = state
        .store
        .issue(cmd)
        .await
        .map_err(|e| error_message(&e))?;
    Ok(outcome.into())
}

pub async fn list_items(form: ItemFilterForm, state: &AppState) -> Result<Vec<ItemRow>, String> {
    let items = state
        .store
        .list_items(&form.parse())
        .await
        .map_err(|e| error_message(&e))?;
    Ok(items.into_iter().map(Into::into).collect())
}

pub async fn list_transactions(
    form: TransactionFilterForm,
    state: &AppState,
) -> Result<Vec<TransactionRow>, String> {
    let filter = form
        .parse(Local::now().date_naive())
        .map_err(domain_message)?;
    let rows = state
        .store
        .list_transactions(&filter)
        .await
        .map_err(|e| error_message(&e))?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn audit_ledger(state: &AppState) -> Result<AuditSummary, String> {
    let report = state.store.audit().await.map_err(|e| error_message(&e))?;
    if !report.is_consistent() {
        tracing::warn!(
            discrepancies = report.discrepancies.len(),
            "ledger audit found discrepancies"
        );
    }
    Ok(report.into())
}
