pub mod accrual;
pub mod book;
pub mod calendar;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod fees;
pub mod loan;
pub mod payment;
pub mod refinance;
pub mod serialization;
pub mod summary;
pub mod types;

// re-export key types
pub use accrual::{AccrualEngine, RefreshOutcome};
pub use book::{Client, LoanBook};
pub use calendar::count_business_days;
pub use config::LoanTerms;
pub use decimal::{Money, Rate};
pub use errors::{LoanError, Result};
pub use events::{Event, EventStore};
pub use fees::admin_fee;
pub use loan::{calc_total_owed, Installment, Loan};
pub use payment::{AllocationResult, PaymentAllocator};
pub use refinance::{mark_paid_manually, refinance};
pub use serialization::{ClientView, InstallmentView, LoanView};
pub use summary::{summarize, PortfolioSummary};
pub use types::{
    ClientId, InstallmentId, LoanId, LoanKind, LoanState, PaymentFrequency, Timeliness,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
