use super::command::{Command, Outcome};
use super::tenant_store::TenantStore;
use crate::domain::economy::TenantEconomy;
use crate::domain::ids::{TenantId, UserId};
use crate::domain::money::Balance;
use crate::domain::ports::SharedClock;
use crate::error::{EconomyError, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// One row of the final wallet report.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletRow {
    pub tenant: TenantId,
    pub user: UserId,
    pub currency: String,
    pub balance: Balance,
}

/// The entry point for driving tenant economies.
///
/// `EconomyEngine` resolves the tenant through the [`TenantStore`] and applies
/// each command inside that tenant's critical section, stamping it with the
/// clock's current time.
pub struct EconomyEngine {
    store: Arc<TenantStore>,
    clock: SharedClock,
}

impl EconomyEngine {
    pub fn new(store: Arc<TenantStore>, clock: SharedClock) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<TenantStore> {
        &self.store
    }

    /// Applies one command to one tenant.
    pub async fn process(&self, tenant: &TenantId, command: Command) -> Result<Outcome> {
        debug!(%tenant, ?command, "processing command");
        match command {
            Command::PurgeTenant => {
                self.store.purge(tenant).await?;
                Ok(Outcome::Done)
            }
            command => {
                let now = self.clock.now();
                self.store
                    .with_tenant(tenant, |economy| execute(economy, command, now))
                    .await
            }
        }
    }

    /// Every wallet balance of every loaded tenant, ordered by tenant, user
    /// and currency.
    pub async fn wallet_table(&self) -> Result<Vec<WalletRow>> {
        let mut rows = Vec::new();
        for tenant in self.store.tenant_ids().await {
            let economy = self.store.snapshot(&tenant).await?;
            for (user, wallet) in &economy.ledger.wallets {
                for (currency, balance) in wallet.balances() {
                    rows.push(WalletRow {
                        tenant: tenant.clone(),
                        user: user.clone(),
                        currency: currency.clone(),
                        balance: *balance,
                    });
                }
            }
        }
        Ok(rows)
    }
}

fn execute(economy: &mut TenantEconomy, command: Command, now: DateTime<Utc>) -> Result<Outcome> {
    let outcome = match command {
        Command::CreateCurrency {
            name,
            symbol,
            exchange_rate,
        } => Outcome::Currency(
            economy
                .ledger
                .create_currency(&name, &symbol, exchange_rate)?
                .clone(),
        ),
        Command::AdjustSupply { currency, delta } => {
            Outcome::Supply(economy.ledger.adjust_supply(&currency, delta)?)
        }
        Command::CurrencyInfo { currency } => {
            Outcome::Currency(economy.ledger.currency(&currency)?.clone())
        }
        Command::GrantFunds {
            user,
            currency,
            amount,
        } => Outcome::Balance(economy.ledger.grant(&user, &currency, amount)?),
        Command::WalletBalance { user } => Outcome::Wallet(economy.ledger.wallet(&user).clone()),
        Command::Pay {
            from,
            to,
            currency,
            amount,
        } => {
            economy.ledger.transfer(&from, &to, &currency, amount)?;
            Outcome::Done
        }

        Command::CreateItem { name, properties } => {
            economy.create_item(&name, properties.as_slice())?;
            Outcome::Done
        }
        Command::ItemInfo { name } => Outcome::Item(economy.item(&name)?.clone()),
        Command::GiveItem { user, item, amount } => {
            Outcome::Quantity(economy.give_item(&user, &item, amount)?)
        }
        Command::Inventory { user } => Outcome::Inventory(economy.inventory(&user)),

        Command::CreateBank {
            name,
            interest_rate,
        } => {
            economy.create_bank(&name, interest_rate)?;
            Outcome::Done
        }
        Command::BankDeposit {
            bank,
            user,
            currency,
            amount,
        } => Outcome::Balance(economy.bank_deposit(&bank, &user, &currency, amount)?),
        Command::BankWithdraw {
            bank,
            user,
            currency,
            amount,
        } => Outcome::Balance(economy.bank_withdraw(&bank, &user, &currency, amount)?),
        Command::BankBalance { bank, user } => {
            Outcome::Wallet(economy.bank_balance(&bank, &user)?.clone())
        }
        Command::AccrueInterest => Outcome::Count(economy.accrue_interest()),

        Command::CreateMarket { name } => {
            economy.create_market(&name)?;
            Outcome::Done
        }
        Command::ListItem {
            market,
            seller,
            item,
            amount,
            price,
            currency,
        } => Outcome::ListingId(economy.list_item(&market, &seller, &item, amount, price, &currency)?),
        Command::BuyListing {
            market,
            buyer,
            listing_id,
        } => Outcome::Purchase(economy.buy_listing(&market, &buyer, listing_id)?),
        Command::CancelListing {
            market,
            seller,
            listing_id,
        } => Outcome::Listing(economy.cancel_listing(&market, &seller, listing_id)?),
        Command::BrowseMarket { market } => {
            Outcome::Listings(economy.browse_market(&market)?.to_vec())
        }

        Command::CreateJob {
            name,
            salary,
            currency,
            interval,
        } => {
            economy.create_job(&name, salary, &currency, interval)?;
            Outcome::Done
        }
        Command::ApplyJob { job, user } => {
            economy.apply_job(&job, &user)?;
            Outcome::Done
        }
        Command::QuitJob { job, user } => {
            economy.quit_job(&job, &user)?;
            Outcome::Done
        }
        Command::ListJobs => Outcome::Jobs(
            economy
                .list_jobs()
                .map(|(name, job)| (name.clone(), job.clone()))
                .collect(),
        ),
        Command::PaySalaries => Outcome::Count(economy.pay_salaries()),

        Command::RequestLoan {
            user,
            amount,
            currency,
        } => {
            economy.request_loan(&user, amount, &currency)?;
            Outcome::Done
        }
        Command::ApproveLoan {
            user,
            interest,
            term_days,
        } => Outcome::DueDate(economy.approve_loan(&user, interest, term_days, now)?),
        Command::RepayLoan { user, amount } => {
            Outcome::Repayment(economy.repay_loan(&user, amount)?)
        }
        Command::LoanInfo { user } => Outcome::Loan(economy.loan_info(&user)?.clone()),
        Command::ReviewOverdue => Outcome::Count(economy.review_overdue(now)),

        Command::CreateResource {
            name,
            regen_rate,
            max_amount,
        } => {
            economy.create_resource(&name, regen_rate, max_amount, now)?;
            Outcome::Done
        }
        Command::Gather {
            resource,
            user,
            amount,
        } => Outcome::Quantity(economy.gather(&resource, &user, amount, now)?),
        Command::ResourceInfo { name } => {
            Outcome::Resource(economy.resource_info(&name, now)?.clone())
        }

        Command::CreateRecipe { name, ingredients } => {
            economy.create_recipe(&name, ingredients.as_slice())?;
            Outcome::Done
        }
        Command::RecipeInfo { name } => Outcome::Recipe(economy.recipe(&name)?.clone()),
        Command::ListRecipes => Outcome::Names(economy.list_recipes().cloned().collect()),
        Command::Craft { recipe, user } => Outcome::Quantity(economy.craft(&recipe, &user)?),

        Command::SetTaxRate { rate } => {
            economy.set_tax_rate(rate)?;
            Outcome::Done
        }
        Command::TaxInfo => Outcome::Rate(economy.tax_rate()),
        Command::CollectTaxes => Outcome::Count(economy.collect_taxes()),
        Command::SetConfig { parameter, value } => {
            economy.set_config(&parameter, &value)?;
            Outcome::Done
        }
        Command::ShowConfig => Outcome::Config(economy.config.entries()),

        Command::AssignRole { user, role } => {
            economy.assign_role(&user, &role);
            Outcome::Done
        }
        Command::HasRole { user, role } => Outcome::Flag(economy.has_role(&user, &role)),
        Command::SetHook { trigger, action } => {
            economy.set_hook(&trigger, &action);
            Outcome::Done
        }

        Command::EconomyReport => Outcome::Report(economy.economy_report()),
        Command::Leaderboard { currency, limit } => {
            Outcome::Leaderboard(economy.leaderboard(&currency, limit)?)
        }
        Command::MarketTrends => Outcome::Trends(economy.market_trends()),
        Command::RunMaintenance => Outcome::Maintenance(economy.run_maintenance(now)),
        // Purging also deletes the snapshot, which only the tenant store can do.
        Command::PurgeTenant => {
            return Err(EconomyError::InvalidState(
                "Tenant purge must go through the tenant store".to_string(),
            ));
        }
    };
    Ok(outcome)
}
