//! Credit ledger entries and grants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::CreditError;
use crate::domain::foundation::{
    CampaignId, ProfileId, Timestamp, TransactionId, ValidationError,
};

/// Kind of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Credits added from a payment.
    Grant,
    /// Credits moved into a campaign budget (negative amount).
    Spend,
    /// Administrative correction, either sign.
    Adjustment,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Grant => "grant",
            TransactionKind::Spend => "spend",
            TransactionKind::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grant" => Ok(TransactionKind::Grant),
            "spend" => Ok(TransactionKind::Spend),
            "adjustment" => Ok(TransactionKind::Adjustment),
            other => Err(ValidationError::invalid_format(
                "kind",
                format!("unknown transaction kind '{}'", other),
            )),
        }
    }
}

/// Immutable ledger entry. `amount` is signed: grants are positive,
/// spends negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreditTransaction {
    pub id: TransactionId,
    pub profile_id: ProfileId,
    pub campaign_id: Option<CampaignId>,
    pub kind: TransactionKind,
    pub amount: i64,
    pub description: String,
    /// Payment intent or invoice id. Unique across the ledger.
    pub payment_reference: Option<String>,
    pub created_at: Timestamp,
}

impl CreditTransaction {
    pub fn spend(profile_id: ProfileId, campaign_id: CampaignId, amount: i64, name: &str) -> Self {
        Self {
            id: TransactionId::new(),
            profile_id,
            campaign_id: Some(campaign_id),
            kind: TransactionKind::Spend,
            amount: -amount.abs(),
            description: format!("Funded campaign '{}'", name),
            payment_reference: None,
            created_at: Timestamp::now(),
        }
    }

    pub fn adjustment(profile_id: ProfileId, delta: i64, description: impl Into<String>) -> Self {
        Self {
            id: TransactionId::new(),
            profile_id,
            campaign_id: None,
            kind: TransactionKind::Adjustment,
            amount: delta,
            description: description.into(),
            payment_reference: None,
            created_at: Timestamp::now(),
        }
    }
}

/// A confirmed payment to be turned into credits.
///
/// `payment_reference` is the idempotency key: applying the same grant
/// twice credits the profile once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditGrant {
    pub profile_id: ProfileId,
    pub amount: i64,
    pub payment_reference: String,
    pub description: String,
}

impl CreditGrant {
    pub fn new(
        profile_id: ProfileId,
        amount: i64,
        payment_reference: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, CreditError> {
        let payment_reference = payment_reference.into();
        if amount <= 0 {
            return Err(CreditError::InvalidAmount(amount));
        }
        if payment_reference.trim().is_empty() {
            return Err(CreditError::MissingReference);
        }
        Ok(Self {
            profile_id,
            amount,
            payment_reference,
            description: description.into(),
        })
    }

    /// Ledger row written when the grant is applied.
    pub fn to_transaction(&self) -> CreditTransaction {
        CreditTransaction {
            id: TransactionId::new(),
            profile_id: self.profile_id,
            campaign_id: None,
            kind: TransactionKind::Grant,
            amount: self.amount,
            description: self.description.clone(),
            payment_reference: Some(self.payment_reference.clone()),
            created_at: Timestamp::now(),
        }
    }
}

/// Result of applying a grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantOutcome {
    /// Credits were added and a ledger entry written.
    Applied {
        transaction: CreditTransaction,
        balance: i64,
    },
    /// The reference was already granted; nothing changed.
    Duplicate { balance: i64 },
}

impl GrantOutcome {
    pub fn balance(&self) -> i64 {
        match self {
            GrantOutcome::Applied { balance, .. } | GrantOutcome::Duplicate { balance } => *balance,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, GrantOutcome::Duplicate { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_requires_positive_amount() {
        assert_eq!(
            CreditGrant::new(ProfileId::new(), 0, "pi_1", "x"),
            Err(CreditError::InvalidAmount(0))
        );
        assert_eq!(
            CreditGrant::new(ProfileId::new(), -3, "pi_1", "x"),
            Err(CreditError::InvalidAmount(-3))
        );
    }

    #[test]
    fn grant_requires_reference() {
        assert_eq!(
            CreditGrant::new(ProfileId::new(), 10, "  ", "x"),
            Err(CreditError::MissingReference)
        );
    }

    #[test]
    fn grant_transaction_carries_reference() {
        let grant = CreditGrant::new(ProfileId::new(), 500, "pi_123", "Credit pack").unwrap();
        let tx = grant.to_transaction();
        assert_eq!(tx.kind, TransactionKind::Grant);
        assert_eq!(tx.amount, 500);
        assert_eq!(tx.payment_reference.as_deref(), Some("pi_123"));
        assert_eq!(tx.profile_id, grant.profile_id);
    }

    #[test]
    fn spend_amount_is_negative() {
        let tx = CreditTransaction::spend(ProfileId::new(), CampaignId::new(), 40, "Launch");
        assert_eq!(tx.amount, -40);
        assert_eq!(tx.kind, TransactionKind::Spend);
        assert!(tx.campaign_id.is_some());
    }

    #[test]
    fn outcome_exposes_balance() {
        assert_eq!(GrantOutcome::Duplicate { balance: 7 }.balance(), 7);
        assert!(GrantOutcome::Duplicate { balance: 7 }.is_duplicate());
    }

    #[test]
    fn kind_string_roundtrip() {
        for kind in [
            TransactionKind::Grant,
            TransactionKind::Spend,
            TransactionKind::Adjustment,
        ] {
            assert_eq!(kind.as_str().parse::<TransactionKind>().unwrap(), kind);
        }
    }
}
