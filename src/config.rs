use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};

/// schedule and fee terms shared by every loan in a book
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    /// nominal term length in calendar days
    pub term_days: i64,
    /// nominal number of business days in the term; also caps every
    /// business-day count, including the overdue span
    pub schedule_days: u32,
    /// penalty charged per overdue business day, as a fraction of total owed
    pub daily_penalty_rate: Decimal,
    /// interest-rate tier that triggers the administrative fee
    pub admin_fee_rate_tier: Rate,
    /// principal bracket size for the administrative fee
    pub admin_fee_step: Decimal,
    /// fee charged per full bracket of principal
    pub admin_fee_per_step: Money,
}

impl LoanTerms {
    /// the production terms: 30-day term, 22 daily installments,
    /// 0.5% daily penalty, 1 unit of fee per 50 of principal at the 10% tier
    pub fn standard() -> Self {
        Self {
            term_days: 30,
            schedule_days: 22,
            daily_penalty_rate: dec!(0.005),
            admin_fee_rate_tier: Rate::from_decimal(dec!(10.0)),
            admin_fee_step: dec!(50),
            admin_fee_per_step: Money::ONE,
        }
    }
}

impl Default for LoanTerms {
    fn default() -> Self {
        Self::standard()
    }
}
