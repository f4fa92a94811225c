use std::collections::HashMap;

use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use uuid::Uuid;

use crate::accrual::{AccrualEngine, RefreshOutcome};
use crate::config::LoanTerms;
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::events::{Event, EventStore};
use crate::loan::Loan;
use crate::payment::{AllocationResult, PaymentAllocator};
use crate::refinance;
use crate::serialization::{ClientView, LoanView};
use crate::summary::{summarize, PortfolioSummary};
use crate::types::{ClientId, LoanId, LoanKind, LoanState, PaymentFrequency};

/// a registered borrower
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub document_id: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub registered: NaiveDate,
}

/// the loan portfolio: clients, loans and their payment histories.
///
/// Stands in for the persistence collaborator — loans live here fully
/// loaded with their installments, and every operation runs the
/// refresh-then-mutate sequence the engine requires. Time comes from the
/// caller-supplied provider so books are fully testable.
pub struct LoanBook {
    terms: LoanTerms,
    engine: AccrualEngine,
    allocator: PaymentAllocator,
    clients: HashMap<ClientId, Client>,
    loans: HashMap<LoanId, Loan>,
    events: EventStore,
}

impl LoanBook {
    pub fn new(terms: LoanTerms) -> Self {
        Self {
            engine: AccrualEngine::new(terms.clone()),
            allocator: PaymentAllocator::new(terms.clone()),
            terms,
            clients: HashMap::new(),
            loans: HashMap::new(),
            events: EventStore::new(),
        }
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    // ---- clients ----

    pub fn register_client(
        &mut self,
        name: String,
        document_id: String,
        phone: Option<String>,
        address: Option<String>,
        time: &SafeTimeProvider,
    ) -> Result<ClientId> {
        if self.clients.values().any(|c| c.document_id == document_id) {
            return Err(LoanError::ClientAlreadyExists { document_id });
        }

        let client = Client {
            id: Uuid::new_v4(),
            name,
            document_id,
            phone,
            address,
            registered: time.now().date_naive(),
        };
        let client_id = client.id;
        self.clients.insert(client_id, client);

        self.events.emit(Event::ClientRegistered { client_id });
        tracing::info!("registered client {}", client_id);
        Ok(client_id)
    }

    pub fn client(&self, id: ClientId) -> Result<&Client> {
        self.clients
            .get(&id)
            .ok_or(LoanError::ClientNotFound { id })
    }

    pub fn clients(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    /// whether the client currently holds an Active or Overdue loan,
    /// judged on stored state
    pub fn client_has_open_loan(&self, id: ClientId) -> bool {
        self.loans
            .values()
            .any(|l| l.client_id == id && l.is_open())
    }

    /// clients eligible for a new loan
    pub fn clients_without_open_loan(&self) -> Vec<&Client> {
        self.clients
            .values()
            .filter(|c| !self.client_has_open_loan(c.id))
            .collect()
    }

    /// remove a client and cascade to all their loans and installments
    pub fn remove_client(&mut self, id: ClientId) -> Result<usize> {
        if !self.clients.contains_key(&id) {
            return Err(LoanError::ClientNotFound { id });
        }

        let before = self.loans.len();
        self.loans.retain(|_, l| l.client_id != id);
        let loans_removed = before - self.loans.len();
        self.clients.remove(&id);

        self.events.emit(Event::ClientRemoved {
            client_id: id,
            loans_removed,
        });
        tracing::info!("removed client {} and {} loans", id, loans_removed);
        Ok(loans_removed)
    }

    /// refreshed view of a client with all their loans
    pub fn client_view(&mut self, id: ClientId, time: &SafeTimeProvider) -> Result<ClientView> {
        let loans = self.client_history(id, time)?;
        let client = self.client(id)?;
        Ok(ClientView::new(client, loans))
    }

    // ---- loans ----

    /// create a loan for a client; one open loan per client at a time
    pub fn originate_loan(
        &mut self,
        client_id: ClientId,
        principal: Money,
        interest_rate: Rate,
        start_date: NaiveDate,
        frequency: PaymentFrequency,
    ) -> Result<LoanId> {
        if !self.clients.contains_key(&client_id) {
            return Err(LoanError::ClientNotFound { id: client_id });
        }
        if self.client_has_open_loan(client_id) {
            return Err(LoanError::ClientHasOpenLoan { id: client_id });
        }

        let loan = Loan::originate(
            client_id,
            principal,
            interest_rate,
            start_date,
            frequency,
            &self.terms,
        )?;
        let loan_id = loan.id;

        self.events.emit(Event::LoanOriginated {
            loan_id,
            client_id,
            principal: loan.principal,
            total_owed: loan.total_owed,
            start_date,
        });
        tracing::info!("originated loan {} for client {}", loan_id, client_id);

        self.loans.insert(loan_id, loan);
        Ok(loan_id)
    }

    pub fn loan(&self, id: LoanId) -> Result<&Loan> {
        self.loans.get(&id).ok_or(LoanError::LoanNotFound { id })
    }

    pub fn loans(&self) -> impl Iterator<Item = &Loan> {
        self.loans.values()
    }

    /// refresh a loan's derived fields against the provider's current date
    pub fn refresh_loan(
        &mut self,
        id: LoanId,
        time: &SafeTimeProvider,
    ) -> Result<RefreshOutcome> {
        let today = time.now().date_naive();
        self.refresh_internal(id, today)
            .ok_or(LoanError::LoanNotFound { id })
    }

    fn refresh_internal(&mut self, id: LoanId, today: NaiveDate) -> Option<RefreshOutcome> {
        let loan = self.loans.get_mut(&id)?;
        let old_state = loan.state;
        let outcome = self.engine.refresh(loan, today);
        let new_state = loan.state;

        if old_state != new_state {
            self.events.emit(Event::StateChanged {
                loan_id: id,
                old_state,
                new_state,
                date: today,
            });
            tracing::info!("loan {} moved {:?} -> {:?}", id, old_state, new_state);
        }
        Some(outcome)
    }

    /// refreshed, read-only projection of a loan
    pub fn loan_view(&mut self, id: LoanId, time: &SafeTimeProvider) -> Result<LoanView> {
        self.refresh_loan(id, time)?;
        let loan = self.loan(id)?;
        Ok(LoanView::from_loan(loan, &self.terms))
    }

    /// all of a client's loans, newest first, refreshed and projected
    pub fn client_history(
        &mut self,
        client_id: ClientId,
        time: &SafeTimeProvider,
    ) -> Result<Vec<LoanView>> {
        if !self.clients.contains_key(&client_id) {
            return Err(LoanError::ClientNotFound { id: client_id });
        }
        let today = time.now().date_naive();

        let mut ids: Vec<(NaiveDate, LoanId)> = self
            .loans
            .values()
            .filter(|l| l.client_id == client_id)
            .map(|l| (l.start_date, l.id))
            .collect();
        ids.sort_by(|a, b| b.0.cmp(&a.0));

        let mut views = Vec::with_capacity(ids.len());
        for (_, id) in ids {
            self.refresh_internal(id, today);
            let loan = self.loan(id)?;
            views.push(LoanView::from_loan(loan, &self.terms));
        }
        Ok(views)
    }

    // ---- mutations ----

    /// record a payment against a loan, split between base debt and penalty
    pub fn record_payment(
        &mut self,
        id: LoanId,
        amount: Money,
        time: &SafeTimeProvider,
    ) -> Result<AllocationResult> {
        let today = time.now().date_naive();
        let loan = self
            .loans
            .get_mut(&id)
            .ok_or(LoanError::LoanNotFound { id })?;

        let old_state = loan.state;
        let result = self.allocator.apply(loan, amount, today, &mut self.events)?;
        let new_state = loan.state;

        if old_state != new_state {
            self.events.emit(Event::StateChanged {
                loan_id: id,
                old_state,
                new_state,
                date: today,
            });
        }
        tracing::info!(
            "recorded installment of {} against loan {} (base: {}, penalty: {})",
            result.effective_amount,
            id,
            result.to_base,
            result.to_penalty,
        );
        Ok(result)
    }

    /// close a loan into a successor carrying its outstanding balance
    pub fn refinance_loan(
        &mut self,
        id: LoanId,
        new_rate: Rate,
        time: &SafeTimeProvider,
    ) -> Result<LoanId> {
        let today = time.now().date_naive();
        let successor = {
            let loan = self
                .loans
                .get_mut(&id)
                .ok_or(LoanError::LoanNotFound { id })?;
            refinance::refinance(
                &self.engine,
                loan,
                new_rate,
                today,
                &self.terms,
                &mut self.events,
            )?
        };

        let successor_id = successor.id;
        self.loans.insert(successor_id, successor);
        tracing::info!("refinanced loan {} into {}", id, successor_id);
        Ok(successor_id)
    }

    /// administrative override: settle a loan regardless of balance.
    ///
    /// On a refinanced successor the settlement cascades to the direct
    /// parent loan — one level only, never the full chain.
    pub fn mark_paid_manually(&mut self, id: LoanId, time: &SafeTimeProvider) -> Result<()> {
        let today = time.now().date_naive();
        let loan = self
            .loans
            .get_mut(&id)
            .ok_or(LoanError::LoanNotFound { id })?;

        refinance::mark_paid_manually(loan, today, &mut self.events);
        let cascade = match (loan.kind, loan.parent_loan_id) {
            (LoanKind::Refinanced, Some(parent_id)) => Some(parent_id),
            _ => None,
        };
        tracing::info!("loan {} manually settled", id);

        if let Some(parent_id) = cascade {
            if let Some(parent) = self.loans.get_mut(&parent_id) {
                if parent.state != LoanState::Paid {
                    parent.force_settled(today);
                    self.events.emit(Event::LoanManuallySettled {
                        loan_id: parent_id,
                        cascaded_from: Some(id),
                        date: today,
                    });
                    tracing::info!("settlement cascaded to parent loan {}", parent_id);
                }
            }
        }
        Ok(())
    }

    // ---- portfolio ----

    /// refresh every Active and Overdue loan; returns how many were touched
    pub fn refresh_open_loans(&mut self, time: &SafeTimeProvider) -> usize {
        let today = time.now().date_naive();
        let ids: Vec<LoanId> = self
            .loans
            .values()
            .filter(|l| l.is_open())
            .map(|l| l.id)
            .collect();

        for id in &ids {
            self.refresh_internal(*id, today);
        }
        ids.len()
    }

    /// portfolio-wide counts and sums, refreshed to the current date
    pub fn summary(&mut self, time: &SafeTimeProvider) -> PortfolioSummary {
        self.refresh_open_loans(time);
        summarize(self.loans.values(), &self.terms)
    }

    // ---- events ----

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }
}
