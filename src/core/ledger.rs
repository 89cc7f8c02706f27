//! Holdings, transactions and the arithmetic that ties them together.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Recorded quantity of one token and its USD value at the last fetched price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub token: String,
    pub quantity: f64,
    pub value: f64,
}

impl Holding {
    /// Applies a buy on top of an optional existing holding.
    ///
    /// The quantity accumulates; the value is recomputed for the whole
    /// position at `price`.
    pub fn accumulate(existing: Option<&Holding>, token: &str, added: f64, price: f64) -> Holding {
        let quantity = existing.map_or(0.0, |h| h.quantity) + added;
        Holding {
            token: token.to_string(),
            quantity,
            value: quantity * price,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(anyhow!("Holding token must not be empty"));
        }
        validate_quantity(self.quantity)?;
        if !self.value.is_finite() || self.value < 0.0 {
            return Err(anyhow!(
                "Invalid value {} for token {}",
                self.value,
                self.token
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Buy,
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Buy => write!(f, "Buy"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Buy" => Ok(TransactionKind::Buy),
            _ => Err(anyhow!("Unknown transaction type: {}", s)),
        }
    }
}

/// One entry of the append-only transaction log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Option<i64>,
    pub token: String,
    pub timestamp: DateTime<Utc>,
    pub kind: TransactionKind,
    pub quantity: f64,
    pub price: f64,
    pub total_value: f64,
}

impl Transaction {
    pub fn buy(token: &str, quantity: f64, price: f64) -> Self {
        Self {
            id: None,
            token: token.to_string(),
            timestamp: Utc::now(),
            kind: TransactionKind::Buy,
            quantity,
            price,
            total_value: quantity * price,
        }
    }

    /// Rejects entries whose computed total is not representable.
    pub fn validate(&self) -> Result<()> {
        if !self.total_value.is_finite() || self.total_value < 0.0 {
            return Err(anyhow!(
                "Invalid total value {} for {} {} at {}",
                self.total_value,
                self.quantity,
                self.token,
                self.price
            ));
        }
        Ok(())
    }
}

pub fn validate_quantity(quantity: f64) -> Result<f64> {
    if quantity.is_finite() && quantity > 0.0 {
        Ok(quantity)
    } else {
        Err(anyhow!("Quantity must be a positive number, got {}", quantity))
    }
}
