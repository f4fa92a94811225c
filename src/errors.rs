use thiserror::Error;

use crate::decimal::{Money, Rate};
use crate::types::{ClientId, LoanId, LoanState};

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("loan already settled")]
    AlreadySettled,

    #[error("loan not refinanceable: state {state:?}, balance {balance}")]
    NotRefinanceable {
        state: LoanState,
        balance: Money,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: LoanId,
    },

    #[error("client not found: {id}")]
    ClientNotFound {
        id: ClientId,
    },

    #[error("client with document {document_id} already registered")]
    ClientAlreadyExists {
        document_id: String,
    },

    #[error("client {id} already has an open loan")]
    ClientHasOpenLoan {
        id: ClientId,
    },

    #[error("invalid principal: {amount}")]
    InvalidPrincipal {
        amount: Money,
    },

    #[error("invalid interest rate: {rate}")]
    InvalidInterestRate {
        rate: Rate,
    },

    #[error("malformed amount: {0}")]
    AmountParse(#[from] rust_decimal::Error),
}

pub type Result<T> = std::result::Result<T, LoanError>;
