use chrono::NaiveDate;

use crate::accrual::AccrualEngine;
use crate::config::LoanTerms;
use crate::decimal::Rate;
use crate::errors::{LoanError, Result};
use crate::events::{Event, EventStore};
use crate::loan::Loan;
use crate::types::LoanState;

/// close `original` and build its successor loan.
///
/// The original is refreshed first and must still be open with a balance
/// outstanding; it is then marked Refinanced (terminal) and the refreshed
/// balance becomes the successor's principal, so interest is charged again
/// on the whole remaining debt. The caller persists both loans; the
/// original is never deleted.
pub fn refinance(
    engine: &AccrualEngine,
    original: &mut Loan,
    new_rate: Rate,
    today: NaiveDate,
    terms: &LoanTerms,
    events: &mut EventStore,
) -> Result<Loan> {
    engine.refresh(original, today);

    if !original.state.is_open() || !original.balance.is_positive() {
        return Err(LoanError::NotRefinanceable {
            state: original.state,
            balance: original.balance,
        });
    }

    original.state = LoanState::Refinanced;

    let successor = Loan::successor(original, new_rate, today, terms)?;

    events.emit(Event::LoanRefinanced {
        original_id: original.id,
        successor_id: successor.id,
        carried_balance: successor.principal,
        new_rate,
        date: today,
    });

    Ok(successor)
}

/// administrative override: force the loan settled regardless of balance.
///
/// The one-level parent cascade for refinanced successors lives in the
/// book, which can reach the parent loan.
pub fn mark_paid_manually(loan: &mut Loan, today: NaiveDate, events: &mut EventStore) {
    loan.force_settled(today);
    events.emit(Event::LoanManuallySettled {
        loan_id: loan.id,
        cascaded_from: None,
        date: today,
    });
}
