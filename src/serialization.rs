/// serialization support for loans and clients
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::book::Client;
use crate::config::LoanTerms;
use crate::decimal::{Money, Rate};
use crate::fees::admin_fee;
use crate::loan::{Installment, Loan};
use crate::types::{ClientId, InstallmentId, LoanId, LoanKind, LoanState, PaymentFrequency, Timeliness};

/// serializable view of an installment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentView {
    pub id: InstallmentId,
    pub amount: Money,
    pub payment_date: NaiveDate,
    pub timeliness: Timeliness,
    pub description: String,
}

impl From<&Installment> for InstallmentView {
    fn from(installment: &Installment) -> Self {
        Self {
            id: installment.id,
            amount: installment.amount,
            payment_date: installment.payment_date,
            timeliness: installment.timeliness,
            description: installment.description.clone(),
        }
    }
}

/// serializable view of a loan's state.
///
/// Projection only: building a view never mutates the loan. Callers refresh
/// first (the book's view methods do), then project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanView {
    pub id: LoanId,
    pub client_id: ClientId,
    pub kind: LoanKind,
    pub parent_loan_id: Option<LoanId>,
    pub principal: Money,
    pub total_owed: Money,
    pub interest_rate: Rate,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
    pub state: LoanState,
    pub frequency: PaymentFrequency,
    pub balance: Money,
    pub overdue_debt: Money,
    pub pending_penalty: Money,
    pub daily_installment: Money,
    pub elapsed_days: u32,
    pub installment_count: usize,
    pub total_paid: Money,
    pub admin_fee: Money,
    pub installments: Vec<InstallmentView>,
}

impl LoanView {
    pub fn from_loan(loan: &Loan, terms: &LoanTerms) -> Self {
        Self {
            id: loan.id,
            client_id: loan.client_id,
            kind: loan.kind,
            parent_loan_id: loan.parent_loan_id,
            principal: loan.principal,
            total_owed: loan.total_owed,
            interest_rate: loan.interest_rate,
            start_date: loan.start_date,
            end_date: loan.end_date,
            completion_date: loan.completion_date,
            state: loan.state,
            frequency: loan.frequency,
            balance: loan.balance,
            overdue_debt: loan.overdue_debt,
            pending_penalty: loan.pending_penalty,
            daily_installment: loan.daily_installment,
            elapsed_days: loan.elapsed_days,
            installment_count: loan.installments.len(),
            total_paid: loan.total_paid(),
            admin_fee: admin_fee(loan, terms),
            installments: loan.installments.iter().map(InstallmentView::from).collect(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// serializable view of a client with their loans
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientView {
    pub id: ClientId,
    pub name: String,
    pub document_id: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub registered: NaiveDate,
    pub has_open_loan: bool,
    pub loans: Vec<LoanView>,
}

impl ClientView {
    pub fn new(client: &Client, loans: Vec<LoanView>) -> Self {
        let has_open_loan = loans.iter().any(|l| l.state.is_open());
        Self {
            id: client.id,
            name: client.name.clone(),
            document_id: client.document_id.clone(),
            phone: client.phone.clone(),
            address: client.address.clone(),
            registered: client.registered,
            has_open_loan,
            loans,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accrual::AccrualEngine;
    use crate::types::PaymentFrequency;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_view_is_read_only() {
        let terms = LoanTerms::standard();
        let engine = AccrualEngine::new(terms.clone());
        let mut loan = Loan::originate(
            Uuid::new_v4(),
            Money::from_major(500),
            Rate::from_percentage(10),
            date(2024, 6, 3),
            PaymentFrequency::Daily,
            &terms,
        )
        .unwrap();
        engine.refresh(&mut loan, date(2024, 6, 6));

        let before = loan.clone();
        let view = LoanView::from_loan(&loan, &terms);

        // projecting changes nothing on the loan
        assert_eq!(loan.balance, before.balance);
        assert_eq!(loan.state, before.state);
        assert_eq!(loan.elapsed_days, before.elapsed_days);

        assert_eq!(view.total_owed, Money::from_major(550));
        assert_eq!(view.overdue_debt, Money::from_major(100));
        assert_eq!(view.admin_fee, Money::from_major(10));
        assert_eq!(view.installment_count, 0);
    }

    #[test]
    fn test_view_round_trips_json() {
        let terms = LoanTerms::standard();
        let loan = Loan::originate(
            Uuid::new_v4(),
            Money::from_major(500),
            Rate::from_percentage(10),
            date(2024, 6, 3),
            PaymentFrequency::Daily,
            &terms,
        )
        .unwrap();

        let view = LoanView::from_loan(&loan, &terms);
        let json = view.to_json_pretty().unwrap();
        let parsed: LoanView = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, view.id);
        assert_eq!(parsed.balance, view.balance);
    }
}
