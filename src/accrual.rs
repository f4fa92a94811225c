use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::calendar::{count_business_days, elapsed_calendar_days};
use crate::config::LoanTerms;
use crate::decimal::Money;
use crate::loan::Loan;
use crate::types::{LoanState, Timeliness};

/// derived amounts produced by a refresh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshOutcome {
    /// expected-but-unpaid base debt plus pending penalty
    pub overdue_debt: Money,
    /// expected-but-unpaid base debt only
    pub base_overdue: Money,
    /// accrued penalty not yet covered by payment surplus
    pub pending_penalty: Money,
}

impl RefreshOutcome {
    pub const ZERO: RefreshOutcome = RefreshOutcome {
        overdue_debt: Money::ZERO,
        base_overdue: Money::ZERO,
        pending_penalty: Money::ZERO,
    };
}

/// engine recomputing a loan's derived fields against the current date.
///
/// Every read or write path must refresh before using `balance`,
/// `overdue_debt` or `state`; the engine never schedules itself.
#[derive(Debug, Clone)]
pub struct AccrualEngine {
    terms: LoanTerms,
}

impl AccrualEngine {
    pub fn new(terms: LoanTerms) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    /// recompute calendar days elapsed since the start date; idempotent
    pub fn refresh_elapsed_days(&self, loan: &mut Loan, today: NaiveDate) -> u32 {
        loan.elapsed_days = elapsed_calendar_days(loan.start_date, today);
        loan.elapsed_days
    }

    /// recompute overdue debt, penalty, balance and state.
    ///
    /// Settled and refinanced loans short-circuit to zeros. State moves
    /// forward only: open loans past the term end with a balance become
    /// Overdue; an Overdue loan whose balance reaches zero becomes Paid.
    pub fn refresh(&self, loan: &mut Loan, today: NaiveDate) -> RefreshOutcome {
        self.refresh_elapsed_days(loan, today);

        if !loan.state.is_open() {
            loan.overdue_debt = Money::ZERO;
            loan.pending_penalty = Money::ZERO;
            loan.balance = Money::ZERO;
            return RefreshOutcome::ZERO;
        }

        let end = loan.effective_end_date(&self.terms);
        let schedule_cutoff = today.min(end);
        let business_days =
            count_business_days(loan.start_date, schedule_cutoff, self.terms.schedule_days);

        let expected_debt = loan.daily_installment * Decimal::from(business_days);
        let total_paid = loan.total_paid();
        let base_overdue = (expected_debt - total_paid).max(Money::ZERO);

        // penalty accrues per overdue business day, on the stored balance
        // from before this recompute
        let mut total_penalty = Money::ZERO;
        if today > end && loan.balance.is_positive() {
            let overdue_days = count_business_days(end, today, self.terms.schedule_days);
            let daily_penalty =
                Money::from_decimal(loan.total_owed.as_decimal() * self.terms.daily_penalty_rate);
            total_penalty = daily_penalty * Decimal::from(overdue_days);
        }

        // payment surplus beyond the expected base debt eats into the penalty
        let surplus = (total_paid - expected_debt).max(Money::ZERO);
        let pending_penalty = (total_penalty - surplus).max(Money::ZERO);

        loan.overdue_debt = base_overdue + pending_penalty;
        loan.pending_penalty = pending_penalty;
        loan.balance = (loan.total_owed - total_paid + total_penalty).max(Money::ZERO);

        if today > end && loan.balance.is_positive() {
            loan.state = LoanState::Overdue;
        } else if loan.state == LoanState::Overdue && loan.balance.is_zero() {
            loan.state = LoanState::Paid;
            if loan.completion_date.is_none() {
                loan.completion_date = Some(today);
            }
        }

        RefreshOutcome {
            overdue_debt: loan.overdue_debt,
            base_overdue,
            pending_penalty,
        }
    }

    /// classify how a payment on `payment_date` lands against the schedule.
    ///
    /// Before the start date it is early, on the start date on time;
    /// afterwards it is on time iff the cumulative payments dated through
    /// `payment_date` cover the cumulative expected debt through that day.
    /// The installment being created must not be recorded yet.
    pub fn classify_timing(&self, loan: &Loan, payment_date: NaiveDate) -> Timeliness {
        let days_since_start = (payment_date - loan.start_date).num_days();

        if days_since_start < 0 {
            return Timeliness::Early;
        }
        if days_since_start == 0 {
            return Timeliness::OnTime;
        }

        let expected = loan.daily_installment * Decimal::from(days_since_start + 1);
        if loan.paid_through(payment_date) >= expected {
            Timeliness::OnTime
        } else {
            Timeliness::Late
        }
    }
}
