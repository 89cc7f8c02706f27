use crate::core::TokenCatalog;
use crate::core::snapshot;
use crate::store::Ledger;
use anyhow::Result;
use std::path::Path;
use tracing::info;

pub async fn export(ledger: &Ledger, path: &Path) -> Result<()> {
    let holdings = ledger.holdings().await?;
    snapshot::write_snapshot(path, &holdings)?;

    info!(count = holdings.len(), path = %path.display(), "Exported portfolio");
    println!("Exported {} holdings to {}", holdings.len(), path.display());
    Ok(())
}

pub async fn import(ledger: &Ledger, catalog: &TokenCatalog, path: &Path) -> Result<()> {
    let holdings = snapshot::read_snapshot(path, catalog)?;
    let count = ledger.import_holdings(&holdings).await?;

    println!("Imported {} holdings from {}", count, path.display());
    Ok(())
}
