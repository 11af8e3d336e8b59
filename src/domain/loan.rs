//! Loan lifecycle: `pending -> approved -> repaid (record deleted)`.
//!
//! An approved loan past its due date stays approved and has
//! [`OVERDUE_PENALTY`] added to the outstanding amount on every review.

use super::economy::TenantEconomy;
use super::ids::UserId;
use super::money::Amount;
use crate::error::{EconomyError, EntityKind, Result};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const OVERDUE_PENALTY: Decimal = dec!(0.1);

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Pending,
    Approved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    /// Outstanding principal.
    pub amount: Decimal,
    pub currency: String,
    pub status: LoanStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl Loan {
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == LoanStatus::Approved && self.due_date.is_some_and(|due| now > due)
    }
}

/// Result of a repayment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Repayment {
    pub paid: Decimal,
    pub remaining: Decimal,
}

impl Repayment {
    pub fn is_settled(&self) -> bool {
        self.remaining <= Decimal::ZERO
    }
}

impl TenantEconomy {
    pub fn request_loan(&mut self, user: &UserId, amount: Amount, currency: &str) -> Result<()> {
        self.ledger.require_currency(currency)?;
        if self.loans.contains_key(user) {
            return Err(EconomyError::already_exists(EntityKind::Loan, user.as_str()));
        }
        self.loans.insert(
            user.clone(),
            Loan {
                amount: amount.value(),
                currency: currency.to_string(),
                status: LoanStatus::Pending,
                interest: None,
                term: None,
                due_date: None,
            },
        );
        Ok(())
    }

    /// Approves a pending loan and disburses the principal into the
    /// borrower's wallet. Without an explicit interest the tenant's
    /// `loan_interest_rate` is recorded.
    pub fn approve_loan(
        &mut self,
        user: &UserId,
        interest: Option<Decimal>,
        term_days: u32,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>> {
        let default_interest = self.config.loan_interest_rate;
        let loan = self
            .loans
            .get(user)
            .ok_or_else(|| EconomyError::not_found(EntityKind::Loan, user.as_str()))?;
        if loan.status != LoanStatus::Pending {
            return Err(EconomyError::InvalidState(format!(
                "Loan for {user} is not pending approval"
            )));
        }
        let principal = Amount::new(loan.amount)?;
        let currency = loan.currency.clone();
        let due_date = now
            .checked_add_signed(Duration::days(i64::from(term_days)))
            .ok_or_else(|| {
                EconomyError::ValidationError(format!("Loan term of {term_days} days is too long"))
            })?;

        self.ledger.credit(user, &currency, principal)?;
        if let Some(loan) = self.loans.get_mut(user) {
            loan.status = LoanStatus::Approved;
            loan.interest = Some(interest.unwrap_or(default_interest));
            loan.term = Some(term_days);
            loan.due_date = Some(due_date);
        }
        info!(%user, %principal, currency = %currency, %due_date, "loan approved");
        Ok(due_date)
    }

    /// Pays down an approved loan. The payment is capped at the outstanding
    /// amount; the loan record is removed once nothing is left.
    pub fn repay_loan(&mut self, user: &UserId, amount: Amount) -> Result<Repayment> {
        let loan = self
            .loans
            .get(user)
            .ok_or_else(|| EconomyError::not_found(EntityKind::Loan, user.as_str()))?;
        if loan.status != LoanStatus::Approved {
            return Err(EconomyError::InvalidState(format!(
                "Loan for {user} is not approved"
            )));
        }
        let payment = Amount::new(amount.value().min(loan.amount))?;
        let currency = loan.currency.clone();

        self.ledger.debit(user, &currency, payment)?;

        let remaining = match self.loans.get_mut(user) {
            Some(loan) => {
                loan.amount -= payment.value();
                loan.amount
            }
            None => Decimal::ZERO,
        };
        if remaining <= Decimal::ZERO {
            self.loans.remove(user);
            info!(%user, "loan repaid");
        }
        Ok(Repayment {
            paid: payment.value(),
            remaining: remaining.max(Decimal::ZERO),
        })
    }

    pub fn loan_info(&self, user: &UserId) -> Result<&Loan> {
        self.loans
            .get(user)
            .ok_or_else(|| EconomyError::not_found(EntityKind::Loan, user.as_str()))
    }

    /// Applies the overdue penalty to every approved loan past its due date.
    /// Once the penalty would overflow, the outstanding amount stops growing.
    pub fn review_overdue(&mut self, now: DateTime<Utc>) -> usize {
        let mut penalized = 0;
        for (user, loan) in self.loans.iter_mut() {
            if !loan.is_overdue(now) {
                continue;
            }
            let penalty = loan.amount.checked_mul(OVERDUE_PENALTY);
            match penalty.and_then(|p| loan.amount.checked_add(p)) {
                Some(outstanding) => {
                    loan.amount = outstanding;
                    penalized += 1;
                    info!(%user, %outstanding, "overdue penalty applied");
                }
                None => {
                    warn!(%user, outstanding = %loan.amount, "overdue penalty overflows, skipped");
                }
            }
        }
        penalized
    }
}
