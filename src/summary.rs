use serde::{Deserialize, Serialize};

use crate::config::LoanTerms;
use crate::decimal::Money;
use crate::fees::admin_fee;
use crate::loan::Loan;
use crate::types::LoanState;

/// portfolio-wide counts and sums over loan states.
///
/// Callers must run a refresh pass over the open loans immediately before
/// aggregating so the sums reflect current-day accrual; `LoanBook::summary`
/// does this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PortfolioSummary {
    pub total_loans: usize,
    pub active: usize,
    pub overdue: usize,
    pub paid: usize,
    pub refinanced: usize,
    /// sum of balances over open (active + overdue) loans
    pub open_balance: Money,
    /// sum of overdue debt over open loans
    pub open_overdue_debt: Money,
    /// sum of administrative fees over all loans
    pub admin_fees: Money,
}

/// aggregate already-refreshed loans
pub fn summarize<'a, I>(loans: I, terms: &LoanTerms) -> PortfolioSummary
where
    I: IntoIterator<Item = &'a Loan>,
{
    let mut summary = PortfolioSummary::default();

    for loan in loans {
        summary.total_loans += 1;
        match loan.state {
            LoanState::Active => summary.active += 1,
            LoanState::Overdue => summary.overdue += 1,
            LoanState::Paid => summary.paid += 1,
            LoanState::Refinanced => summary.refinanced += 1,
        }
        if loan.is_open() {
            summary.open_balance += loan.balance;
            summary.open_overdue_debt += loan.overdue_debt;
        }
        summary.admin_fees += admin_fee(loan, terms);
    }

    summary
}
