use super::economy::TenantEconomy;
use super::ids::UserId;
use super::money::Amount;
use crate::error::{EconomyError, EntityKind, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub salary: Amount,
    pub currency: String,
    /// Advertised pay period in minutes. Salaries are paid once per
    /// scheduler tick regardless.
    pub interval: u32,
    #[serde(default)]
    pub employees: BTreeSet<UserId>,
}

impl TenantEconomy {
    pub fn create_job(&mut self, name: &str, salary: Amount, currency: &str, interval: u32) -> Result<()> {
        if self.jobs.contains_key(name) {
            return Err(EconomyError::already_exists(EntityKind::Job, name));
        }
        self.ledger.require_currency(currency)?;
        self.jobs.insert(
            name.to_string(),
            Job {
                salary,
                currency: currency.to_string(),
                interval,
                employees: BTreeSet::new(),
            },
        );
        Ok(())
    }

    fn job_mut(&mut self, name: &str) -> Result<&mut Job> {
        self.jobs
            .get_mut(name)
            .ok_or_else(|| EconomyError::not_found(EntityKind::Job, name))
    }

    pub fn apply_job(&mut self, name: &str, user: &UserId) -> Result<()> {
        if !self.job_mut(name)?.employees.insert(user.clone()) {
            return Err(EconomyError::already_exists(EntityKind::Employee, user.as_str()));
        }
        Ok(())
    }

    pub fn quit_job(&mut self, name: &str, user: &UserId) -> Result<()> {
        if !self.job_mut(name)?.employees.remove(user) {
            return Err(EconomyError::not_found(EntityKind::Employee, user.as_str()));
        }
        Ok(())
    }

    pub fn list_jobs(&self) -> impl Iterator<Item = (&String, &Job)> {
        self.jobs.iter()
    }

    /// Credits every employee of every job with one salary. Returns the
    /// number of payments made; a salary that would overflow is not paid.
    pub fn pay_salaries(&mut self) -> usize {
        let mut paid = 0;
        for (name, job) in &self.jobs {
            if !self.ledger.currencies.contains_key(&job.currency) {
                continue;
            }
            for employee in &job.employees {
                match self.ledger.wallet_mut(employee).credit(&job.currency, job.salary) {
                    Ok(()) => paid += 1,
                    Err(e) => warn!(job = %name, %employee, error = %e, "salary skipped"),
                }
            }
        }
        paid
    }
}
