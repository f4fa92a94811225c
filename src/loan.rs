use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::term_end;
use crate::config::LoanTerms;
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::types::{ClientId, InstallmentId, LoanId, LoanKind, LoanState, PaymentFrequency, Timeliness};

/// total owed on a loan: principal plus flat interest
pub fn calc_total_owed(principal: Money, rate: Rate) -> Money {
    principal + principal.percentage(rate.as_decimal())
}

/// a single recorded payment against a loan; immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub id: InstallmentId,
    pub amount: Money,
    pub payment_date: NaiveDate,
    pub timeliness: Timeliness,
    pub description: String,
}

impl Installment {
    pub fn new(
        amount: Money,
        payment_date: NaiveDate,
        timeliness: Timeliness,
        description: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            payment_date,
            timeliness,
            description,
        }
    }
}

/// loan aggregate: a principal+interest obligation with its payment history.
///
/// `total_owed`, `daily_installment`, `start_date` and `end_date` are fixed
/// at creation. `balance`, `overdue_debt`, `pending_penalty`, `elapsed_days`
/// and `state` are derived and recomputed by the accrual engine's refresh;
/// callers must refresh before reading any of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub client_id: ClientId,
    pub kind: LoanKind,
    /// the loan this one refinanced, if any (weak reference)
    pub parent_loan_id: Option<LoanId>,

    pub principal: Money,
    pub interest_rate: Rate,
    pub total_owed: Money,
    pub daily_installment: Money,

    pub start_date: NaiveDate,
    /// nominal term end; loaded rows may lack it, see `effective_end_date`
    pub end_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,

    pub state: LoanState,
    pub frequency: PaymentFrequency,

    pub balance: Money,
    pub overdue_debt: Money,
    pub pending_penalty: Money,
    pub elapsed_days: u32,

    /// ordered, append-only payment history, loaded eagerly
    pub installments: Vec<Installment>,
}

impl Loan {
    /// create a new original loan
    pub fn originate(
        client_id: ClientId,
        principal: Money,
        interest_rate: Rate,
        start_date: NaiveDate,
        frequency: PaymentFrequency,
        terms: &LoanTerms,
    ) -> Result<Self> {
        if !principal.is_positive() {
            return Err(LoanError::InvalidPrincipal { amount: principal });
        }
        if interest_rate.is_negative() {
            return Err(LoanError::InvalidInterestRate {
                rate: interest_rate,
            });
        }

        Ok(Self::build(
            client_id,
            principal,
            interest_rate,
            start_date,
            frequency,
            LoanKind::Original,
            None,
            terms,
        ))
    }

    /// create the successor loan of a refinancing: the parent's outstanding
    /// balance becomes the new principal, interest is charged on it again
    pub(crate) fn successor(
        parent: &Loan,
        new_rate: Rate,
        today: NaiveDate,
        terms: &LoanTerms,
    ) -> Result<Self> {
        if new_rate.is_negative() {
            return Err(LoanError::InvalidInterestRate { rate: new_rate });
        }

        Ok(Self::build(
            parent.client_id,
            parent.balance,
            new_rate,
            today,
            parent.frequency,
            LoanKind::Refinanced,
            Some(parent.id),
            terms,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        client_id: ClientId,
        principal: Money,
        interest_rate: Rate,
        start_date: NaiveDate,
        frequency: PaymentFrequency,
        kind: LoanKind,
        parent_loan_id: Option<LoanId>,
        terms: &LoanTerms,
    ) -> Self {
        let total_owed = calc_total_owed(principal, interest_rate);
        let daily_installment = total_owed / Decimal::from(terms.schedule_days);

        Self {
            id: Uuid::new_v4(),
            client_id,
            kind,
            parent_loan_id,
            principal,
            interest_rate,
            total_owed,
            daily_installment,
            start_date,
            end_date: Some(term_end(start_date, terms.term_days)),
            completion_date: None,
            state: LoanState::Active,
            frequency,
            balance: total_owed,
            overdue_debt: Money::ZERO,
            pending_penalty: Money::ZERO,
            elapsed_days: 0,
            installments: Vec::new(),
        }
    }

    /// term end, falling back to start + term for rows loaded without one
    pub fn effective_end_date(&self, terms: &LoanTerms) -> NaiveDate {
        self.end_date
            .unwrap_or_else(|| term_end(self.start_date, terms.term_days))
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// sum of all recorded installments
    pub fn total_paid(&self) -> Money {
        self.installments.iter().map(|i| i.amount).sum()
    }

    /// installments dated on or before `cutoff`
    pub fn paid_through(&self, cutoff: NaiveDate) -> Money {
        self.installments
            .iter()
            .filter(|i| i.payment_date <= cutoff)
            .map(|i| i.amount)
            .sum()
    }

    pub fn record_installment(&mut self, installment: Installment) {
        self.installments.push(installment);
    }

    /// force the loan settled: zero balance, Paid state, completion stamped.
    /// Used by the manual override and the refinancing cascade.
    pub(crate) fn force_settled(&mut self, today: NaiveDate) {
        self.state = LoanState::Paid;
        self.balance = Money::ZERO;
        self.overdue_debt = Money::ZERO;
        self.pending_penalty = Money::ZERO;
        if self.completion_date.is_none() {
            self.completion_date = Some(today);
        }
    }
}
