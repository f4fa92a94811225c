use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a client
pub type ClientId = Uuid;

/// unique identifier for an installment
pub type InstallmentId = Uuid;

/// loan lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanState {
    /// loan within its term and carrying a balance
    Active,
    /// past the term end date with a balance outstanding
    Overdue,
    /// balance reached zero, through payments or manual override
    Paid,
    /// closed by a refinancing; terminal for the original loan
    Refinanced,
}

impl LoanState {
    /// Active and Overdue are the only open states
    pub fn is_open(&self) -> bool {
        matches!(self, LoanState::Active | LoanState::Overdue)
    }
}

/// whether a loan was taken out directly or spawned by a refinancing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanKind {
    Original,
    Refinanced,
}

/// how an installment landed relative to the loan's schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeliness {
    OnTime,
    Early,
    Late,
}

/// collection cadence label; the schedule math always uses the daily
/// 22-installment term regardless of this tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaymentFrequency {
    #[default]
    Daily,
    Weekly,
}
