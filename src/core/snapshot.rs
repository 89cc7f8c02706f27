//! Portfolio snapshots as JSON files: `[{"token": "BTC", "quantity": 2, "value": 60000}]`.

use crate::core::ledger::Holding;
use crate::core::token::TokenCatalog;
use anyhow::{Context, Result, anyhow};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub fn write_snapshot(path: &Path, holdings: &[Holding]) -> Result<()> {
    let json = serde_json::to_string_pretty(holdings).context("Failed to serialize portfolio")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write snapshot: {}", path.display()))
}

/// Reads and validates a snapshot, mapping each row to its catalog symbol.
pub fn read_snapshot(path: &Path, catalog: &TokenCatalog) -> Result<Vec<Holding>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
    parse_snapshot(&text, catalog)
        .with_context(|| format!("Invalid snapshot: {}", path.display()))
}

/// Rows may name a token by symbol, display name or id. Two rows that resolve
/// to the same symbol are rejected.
pub fn parse_snapshot(text: &str, catalog: &TokenCatalog) -> Result<Vec<Holding>> {
    let mut holdings: Vec<Holding> = serde_json::from_str(text)?;
    let mut seen: HashMap<String, String> = HashMap::new();

    for holding in &mut holdings {
        let token = catalog.resolve(&holding.token)?;
        let original = std::mem::replace(&mut holding.token, token.symbol);
        holding.validate()?;
        if let Some(previous) = seen.insert(holding.token.clone(), original.trim().to_string()) {
            return Err(anyhow!(
                "Duplicate token in snapshot: {} ({} and {})",
                holding.token,
                previous,
                original.trim()
            ));
        }
    }
    Ok(holdings)
}
