//! Account classification.

use serde::{Deserialize, Serialize};

/// The side of the ledger a line (or an account's normal balance) sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Left side of the ledger.
    Debit,
    /// Right side of the ledger.
    Credit,
}

impl Side {
    /// Returns the canonical string form used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "Debit",
            Self::Credit => "Credit",
        }
    }

    /// Parses the canonical string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Debit" => Some(Self::Debit),
            "Credit" => Some(Self::Credit),
            _ => None,
        }
    }

    /// Returns the opposite side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a chart-of-accounts entry.
///
/// Contra types carry a normal balance opposite to their parent category
/// (e.g. accumulated depreciation is a credit-normal asset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Resources owned (cash, receivables, equipment).
    Asset,
    /// Credit-normal offset to an asset (accumulated depreciation).
    ContraAsset,
    /// Obligations owed (payables, unearned revenue).
    Liability,
    /// Owner's residual interest (capital, drawings).
    Equity,
    /// Income earned in a period.
    Revenue,
    /// Debit-normal offset to revenue (sales returns, discounts).
    ContraRevenue,
    /// Costs incurred in a period.
    Expense,
}

impl AccountType {
    /// Returns the canonical string form used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "Asset",
            Self::ContraAsset => "Contra Asset",
            Self::Liability => "Liability",
            Self::Equity => "Equity",
            Self::Revenue => "Revenue",
            Self::ContraRevenue => "Contra Revenue",
            Self::Expense => "Expense",
        }
    }

    /// Parses the canonical string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Asset" => Some(Self::Asset),
            "Contra Asset" => Some(Self::ContraAsset),
            "Liability" => Some(Self::Liability),
            "Equity" => Some(Self::Equity),
            "Revenue" => Some(Self::Revenue),
            "Contra Revenue" => Some(Self::ContraRevenue),
            "Expense" => Some(Self::Expense),
            _ => None,
        }
    }

    /// The side on which increases to this type are recorded.
    #[must_use]
    pub const fn normal_side(self) -> Side {
        match self {
            Self::Asset | Self::ContraRevenue | Self::Expense => Side::Debit,
            Self::ContraAsset | Self::Liability | Self::Equity | Self::Revenue => Side::Credit,
        }
    }

    /// Whether balances of this type are swept into capital at period close.
    #[must_use]
    pub const fn is_temporary(self) -> bool {
        matches!(self, Self::Revenue | Self::ContraRevenue | Self::Expense)
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
