//! Read-only projections over a tenant economy.

use super::economy::TenantEconomy;
use super::ids::UserId;
use super::loan::LoanStatus;
use super::money::Balance;
use crate::error::Result;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct CurrencySummary {
    pub name: String,
    pub symbol: String,
    pub total_supply: Decimal,
    pub in_circulation: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EconomyReport {
    pub currencies: Vec<CurrencySummary>,
    /// Sum of `amount * price` over every open listing, saturating at
    /// `Decimal::MAX`.
    pub total_market_value: Decimal,
    pub job_count: usize,
    pub active_loans: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user: UserId,
    pub balance: Balance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketTrend {
    pub market: String,
    pub item: String,
    pub average_price: Decimal,
    pub currency: String,
    pub listings: usize,
}

impl TenantEconomy {
    pub fn economy_report(&self) -> EconomyReport {
        let currencies = self
            .ledger
            .currencies
            .iter()
            .map(|(name, c)| CurrencySummary {
                name: name.clone(),
                symbol: c.symbol.clone(),
                total_supply: c.total_supply,
                in_circulation: c.in_circulation,
            })
            .collect();
        let total_market_value = self
            .markets
            .values()
            .flat_map(|m| m.listings.iter())
            .map(|l| l.amount.value().saturating_mul(l.price.value()))
            .fold(Decimal::ZERO, Decimal::saturating_add);
        EconomyReport {
            currencies,
            total_market_value,
            job_count: self.jobs.len(),
            active_loans: self
                .loans
                .values()
                .filter(|l| l.status == LoanStatus::Approved)
                .count(),
        }
    }

    /// Richest wallets in `currency`, highest first; ties ordered by user id.
    pub fn leaderboard(&self, currency: &str, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        self.ledger.require_currency(currency)?;
        let mut ranked: Vec<(&UserId, Balance)> = self
            .ledger
            .wallets
            .iter()
            .map(|(user, wallet)| (user, wallet.balance(currency)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        Ok(ranked
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, (user, balance))| LeaderboardEntry {
                rank: i + 1,
                user: user.clone(),
                balance,
            })
            .collect())
    }

    /// Average listing price per market and item. The currency reported is
    /// the one of the first listing seen for that item.
    pub fn market_trends(&self) -> Vec<MarketTrend> {
        let mut trends = Vec::new();
        for (market_name, market) in &self.markets {
            let mut by_item: BTreeMap<&str, (Decimal, usize, &str)> = BTreeMap::new();
            for listing in &market.listings {
                let entry = by_item
                    .entry(listing.item.as_str())
                    .or_insert((Decimal::ZERO, 0, listing.currency.as_str()));
                entry.0 = entry.0.saturating_add(listing.price.value());
                entry.1 += 1;
            }
            for (item, (total, count, currency)) in by_item {
                trends.push(MarketTrend {
                    market: market_name.clone(),
                    item: item.to_string(),
                    average_price: total / Decimal::from(count),
                    currency: currency.to_string(),
                    listings: count,
                });
            }
        }
        trends
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Amount;
    use rust_decimal_macros::dec;

    fn amount(v: Decimal) -> Amount {
        Amount::new(v).unwrap()
    }

    fn populated() -> TenantEconomy {
        let mut economy = TenantEconomy::new();
        economy.ledger.create_currency("gold", "G", dec!(1)).unwrap();
        economy.create_market("bazaar").unwrap();
        for (user, funds) in [("carol", dec!(50)), ("alice", dec!(90)), ("bob", dec!(50))] {
            economy
                .ledger
                .grant(&UserId::from(user), "gold", amount(funds))
                .unwrap();
        }
        let seller = UserId::from("alice");
        economy.inventory_mut(&seller).add("ore", amount(dec!(10))).unwrap();
        economy
            .list_item("bazaar", &seller, "ore", amount(dec!(2)), amount(dec!(10)), "gold")
            .unwrap();
        economy
            .list_item("bazaar", &seller, "ore", amount(dec!(3)), amount(dec!(20)), "gold")
            .unwrap();
        economy
    }

    #[test]
    fn test_leaderboard_order_and_limit() {
        let economy = populated();
        let board = economy.leaderboard("gold", 2).unwrap();
        let users: Vec<&str> = board.iter().map(|e| e.user.as_str()).collect();
        assert_eq!(users, vec!["alice", "bob"]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[0].balance, Balance::new(dec!(90)));
        assert!(economy.leaderboard("silver", 10).is_err());
    }

    #[test]
    fn test_economy_report() {
        let economy = populated();
        let report = economy.economy_report();
        assert_eq!(report.total_market_value, dec!(80));
        assert_eq!(report.job_count, 0);
        assert_eq!(report.active_loans, 0);
        assert_eq!(report.currencies[0].in_circulation, dec!(190));
    }

    #[test]
    fn test_market_trends_average() {
        let economy = populated();
        let trends = economy.market_trends();
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].item, "ore");
        assert_eq!(trends[0].average_price, dec!(15));
        assert_eq!(trends[0].listings, 2);
    }

    #[test]
    fn test_report_saturates_on_huge_listings() {
        let mut economy = populated();
        let seller = UserId::from("alice");
        let max = amount(Decimal::MAX);
        economy
            .list_item("bazaar", &seller, "ore", amount(dec!(2)), max, "gold")
            .unwrap();
        economy
            .list_item("bazaar", &seller, "ore", amount(dec!(3)), max, "gold")
            .unwrap();

        assert_eq!(economy.economy_report().total_market_value, Decimal::MAX);
        assert_eq!(economy.market_trends()[0].listings, 4);
    }
}
