use chrono::NaiveDate;

use crate::accrual::AccrualEngine;
use crate::config::LoanTerms;
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::events::{Event, EventStore};
use crate::loan::{Installment, Loan};
use crate::types::LoanState;

/// result of applying a payment to a loan
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationResult {
    /// the installment appended to the loan's history
    pub installment: Installment,
    /// portion applied to expected-but-unpaid base debt
    pub to_base: Money,
    /// portion applied to accrued penalty
    pub to_penalty: Money,
    /// amount actually applied; overpayment beyond base+penalty is
    /// truncated, never held as credit
    pub effective_amount: Money,
    /// penalty still pending after the payment
    pub pending_penalty: Money,
    /// whether this payment brought the balance to zero
    pub fully_settled: bool,
}

/// splits an incoming payment between base debt and penalty, in that order.
///
/// The only operation that appends an installment.
#[derive(Debug, Clone)]
pub struct PaymentAllocator {
    engine: AccrualEngine,
}

impl PaymentAllocator {
    pub fn new(terms: LoanTerms) -> Self {
        Self {
            engine: AccrualEngine::new(terms),
        }
    }

    pub fn apply(
        &self,
        loan: &mut Loan,
        amount: Money,
        today: NaiveDate,
        events: &mut EventStore,
    ) -> Result<AllocationResult> {
        if !amount.is_positive() {
            return Err(LoanError::InvalidPaymentAmount { amount });
        }

        let due = self.engine.refresh(loan, today);
        if !loan.balance.is_positive() {
            return Err(LoanError::AlreadySettled);
        }

        // base debt first, then penalty; any surplus is truncated
        let to_base = amount.min(due.base_overdue);
        let to_penalty = (amount - to_base).min(due.pending_penalty);
        let mut effective = to_base + to_penalty;

        let mut fully_settled = false;
        if loan.balance <= effective {
            effective = loan.balance;
            loan.balance = Money::ZERO;
            loan.state = LoanState::Paid;
            if loan.completion_date.is_none() {
                loan.completion_date = Some(today);
            }
            fully_settled = true;
        } else {
            loan.balance -= effective;
        }

        // classified against the history before this installment lands
        let timeliness = self.engine.classify_timing(loan, today);
        let installment = Installment::new(
            effective,
            today,
            timeliness,
            format!("daily installment (base: {}, penalty: {})", to_base, to_penalty),
        );
        loan.record_installment(installment.clone());

        let post = self.engine.refresh(loan, today);

        events.emit(Event::InstallmentRecorded {
            loan_id: loan.id,
            amount: effective,
            to_base,
            to_penalty,
            timeliness,
            date: today,
        });
        if fully_settled {
            events.emit(Event::LoanSettled {
                loan_id: loan.id,
                date: today,
            });
        }

        Ok(AllocationResult {
            installment,
            to_base,
            to_penalty,
            effective_amount: effective,
            pending_penalty: post.pending_penalty,
            fully_settled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::types::{PaymentFrequency, Timeliness};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 500 at 10%: total 550, daily installment 25, Monday start
    fn monday_loan() -> Loan {
        Loan::originate(
            Uuid::new_v4(),
            Money::from_major(500),
            Rate::from_percentage(10),
            date(2024, 6, 3),
            PaymentFrequency::Daily,
            &LoanTerms::standard(),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let allocator = PaymentAllocator::new(LoanTerms::standard());
        let mut loan = monday_loan();
        let mut events = EventStore::new();

        let err = allocator
            .apply(&mut loan, Money::ZERO, date(2024, 6, 3), &mut events)
            .unwrap_err();
        assert!(matches!(err, LoanError::InvalidPaymentAmount { .. }));
        assert!(loan.installments.is_empty());
    }

    #[test]
    fn test_rejects_settled_loan() {
        let allocator = PaymentAllocator::new(LoanTerms::standard());
        let mut loan = monday_loan();
        loan.state = LoanState::Paid;
        let mut events = EventStore::new();

        let err = allocator
            .apply(&mut loan, Money::from_major(25), date(2024, 6, 4), &mut events)
            .unwrap_err();
        assert!(matches!(err, LoanError::AlreadySettled));
    }

    #[test]
    fn test_base_takes_priority_over_penalty() {
        let allocator = PaymentAllocator::new(LoanTerms::standard());
        let mut loan = monday_loan();
        let mut events = EventStore::new();

        // Wednesday of the first week: 3 inclusive business days,
        // 75 expected, nothing paid, no penalty yet
        let result = allocator
            .apply(&mut loan, Money::from_major(30), date(2024, 6, 5), &mut events)
            .unwrap();

        assert_eq!(result.to_base, Money::from_major(30));
        assert_eq!(result.to_penalty, Money::ZERO);
        assert_eq!(result.effective_amount, Money::from_major(30));
        assert_eq!(loan.balance, Money::from_major(520));
        assert!(!result.fully_settled);
    }

    #[test]
    fn test_split_covers_base_then_penalty() {
        let allocator = PaymentAllocator::new(LoanTerms::standard());
        let mut loan = monday_loan();
        let mut events = EventStore::new();

        // five overdue business days past the 2024-07-03 end:
        // base 550, penalty 13.75
        let result = allocator
            .apply(&mut loan, Money::from_major(560), date(2024, 7, 8), &mut events)
            .unwrap();

        assert_eq!(result.to_base, Money::from_major(550));
        assert_eq!(result.to_penalty, Money::from_major(10));
        assert_eq!(result.effective_amount, Money::from_major(560));
        assert_eq!(loan.balance, Money::from_str_exact("3.75").unwrap());
        assert_eq!(
            result.pending_penalty,
            Money::from_str_exact("3.75").unwrap()
        );
        assert!(!result.fully_settled);
    }

    #[test]
    fn test_full_settlement() {
        let allocator = PaymentAllocator::new(LoanTerms::standard());
        let mut loan = monday_loan();
        let mut events = EventStore::new();

        // 510 already paid; by 2024-07-01 the schedule is saturated
        // (22 business days * 25 = 550 expected), so the remaining 40 is
        // all due and there is no penalty yet
        loan.record_installment(Installment::new(
            Money::from_major(510),
            date(2024, 6, 10),
            Timeliness::OnTime,
            String::new(),
        ));

        let today = date(2024, 7, 1);
        let result = allocator
            .apply(&mut loan, Money::from_major(100), today, &mut events)
            .unwrap();

        assert_eq!(result.effective_amount, Money::from_major(40));
        assert!(result.fully_settled);
        assert_eq!(loan.balance, Money::ZERO);
        assert_eq!(loan.state, LoanState::Paid);
        assert_eq!(loan.completion_date, Some(today));
        assert!(events
            .events()
            .iter()
            .any(|e| matches!(e, Event::LoanSettled { .. })));
    }

    #[test]
    fn test_overpayment_truncated_to_amount_due() {
        let allocator = PaymentAllocator::new(LoanTerms::standard());
        let mut loan = monday_loan();
        let mut events = EventStore::new();

        // only one installment of 25 is expected on the start date;
        // the rest of the 150 is truncated, not held as credit
        let result = allocator
            .apply(&mut loan, Money::from_major(150), date(2024, 6, 3), &mut events)
            .unwrap();
        assert_eq!(result.effective_amount, Money::from_major(25));
        assert_eq!(loan.balance, Money::from_major(525));

        // nothing further due the same day: the second payment truncates
        // to zero and leaves the balance untouched
        let result = allocator
            .apply(&mut loan, Money::from_major(100), date(2024, 6, 3), &mut events)
            .unwrap();

        assert_eq!(result.effective_amount, Money::ZERO);
        assert_eq!(loan.balance, Money::from_major(525));
        assert_eq!(loan.installments.len(), 2);
    }

    #[test]
    fn test_installment_classified_and_recorded() {
        let allocator = PaymentAllocator::new(LoanTerms::standard());
        let mut loan = monday_loan();
        let mut events = EventStore::new();

        let result = allocator
            .apply(&mut loan, Money::from_major(25), date(2024, 6, 3), &mut events)
            .unwrap();

        assert_eq!(result.installment.timeliness, Timeliness::OnTime);
        assert_eq!(loan.installments.len(), 1);
        assert_eq!(loan.installments[0], result.installment);

        // Thursday: 100 expected, only 25 paid so far, so a short
        // payment lands late
        let result = allocator
            .apply(&mut loan, Money::from_major(25), date(2024, 6, 6), &mut events)
            .unwrap();
        assert_eq!(result.installment.timeliness, Timeliness::Late);
    }
}
