use crate::config::LoanTerms;
use crate::decimal::Money;
use crate::loan::Loan;

/// administrative fee for a loan: one fee unit per full principal bracket,
/// charged only at the fee-bearing interest tier.
///
/// There is no enforced minimum; principals below one bracket pay nothing.
/// Pure, recomputed on demand, never persisted.
pub fn admin_fee(loan: &Loan, terms: &LoanTerms) -> Money {
    if loan.interest_rate != terms.admin_fee_rate_tier {
        return Money::ZERO;
    }

    let principal = loan.principal.as_decimal();
    if principal <= rust_decimal::Decimal::ZERO {
        return Money::ZERO;
    }

    let brackets = (principal / terms.admin_fee_step).floor();
    Money::from_decimal(brackets * terms.admin_fee_per_step.as_decimal())
}
