use super::economy::TenantEconomy;
use super::ids::UserId;
use super::money::Amount;
use crate::error::{EconomyError, EntityKind, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// An offer of a fixed quantity for a flat price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: u64,
    pub seller: UserId,
    pub item: String,
    pub amount: Amount,
    pub price: Amount,
    pub currency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Market {
    pub listings: Vec<Listing>,
    /// Next listing id; never reused after a listing is removed.
    pub next_listing_id: u64,
}

impl Market {
    fn take(&mut self, listing_id: u64) -> Option<Listing> {
        let index = self.listings.iter().position(|l| l.id == listing_id)?;
        Some(self.listings.remove(index))
    }

    pub fn listing(&self, listing_id: u64) -> Option<&Listing> {
        self.listings.iter().find(|l| l.id == listing_id)
    }
}

/// Details of a completed purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub listing: Listing,
    pub fee: Decimal,
}

impl TenantEconomy {
    pub fn create_market(&mut self, name: &str) -> Result<()> {
        if self.markets.contains_key(name) {
            return Err(EconomyError::already_exists(EntityKind::Market, name));
        }
        self.markets.insert(name.to_string(), Market::default());
        Ok(())
    }

    fn market_mut(&mut self, name: &str) -> Result<&mut Market> {
        self.markets
            .get_mut(name)
            .ok_or_else(|| EconomyError::not_found(EntityKind::Market, name))
    }

    /// Moves `amount` of `item` out of the seller's inventory into a new listing.
    pub fn list_item(
        &mut self,
        market: &str,
        seller: &UserId,
        item: &str,
        amount: Amount,
        price: Amount,
        currency: &str,
    ) -> Result<u64> {
        if !self.markets.contains_key(market) {
            return Err(EconomyError::not_found(EntityKind::Market, market));
        }
        self.ledger.require_currency(currency)?;
        self.inventory_mut(seller).remove(item, amount)?;

        let board = self.market_mut(market)?;
        let id = board.next_listing_id;
        board.next_listing_id += 1;
        board.listings.push(Listing {
            id,
            seller: seller.clone(),
            item: item.to_string(),
            amount,
            price,
            currency: currency.to_string(),
        });
        debug!(market, listing_id = id, %seller, item, %amount, %price, "listing created");
        Ok(id)
    }

    /// Buys a listing outright: buyer pays the flat price, the seller is paid
    /// minus the configured market fee, the buyer receives the goods.
    pub fn buy_listing(&mut self, market: &str, buyer: &UserId, listing_id: u64) -> Result<Purchase> {
        let fee_rate = self.config.market_fee;
        let listing = self
            .markets
            .get(market)
            .ok_or_else(|| EconomyError::not_found(EntityKind::Market, market))?
            .listing(listing_id)
            .cloned()
            .ok_or_else(|| EconomyError::not_found(EntityKind::Listing, listing_id.to_string()))?;

        let fee = listing
            .price
            .value()
            .checked_mul(fee_rate)
            .ok_or_else(|| EconomyError::overflow(format!("computing the fee on listing {listing_id}")))?;
        let proceeds = listing
            .price
            .value()
            .checked_sub(fee)
            .and_then(|p| Amount::new(p).ok());
        if let Some(proceeds) = proceeds
            && &listing.seller != buyer
        {
            self.ledger
                .check_credit(&listing.seller, &listing.currency, proceeds)?;
        }
        if let Some(inventory) = self.inventories.get(buyer) {
            inventory.check_add(&listing.item, listing.amount)?;
        }

        self.ledger.debit(buyer, &listing.currency, listing.price)?;
        if let Some(proceeds) = proceeds {
            self.ledger.credit(&listing.seller, &listing.currency, proceeds)?;
        }
        if fee > Decimal::ZERO
            && let Some(currency) = self.ledger.currencies.get_mut(&listing.currency)
        {
            currency.in_circulation = currency.in_circulation.saturating_sub(fee).max(Decimal::ZERO);
        }
        self.inventory_mut(buyer).add(&listing.item, listing.amount)?;
        self.market_mut(market)?.take(listing_id);

        debug!(market, listing_id, %buyer, seller = %listing.seller, "listing bought");
        Ok(Purchase { listing, fee })
    }

    /// Withdraws a listing and returns its goods to the seller.
    pub fn cancel_listing(&mut self, market: &str, seller: &UserId, listing_id: u64) -> Result<Listing> {
        let listing = self
            .markets
            .get(market)
            .ok_or_else(|| EconomyError::not_found(EntityKind::Market, market))?
            .listing(listing_id)
            .ok_or_else(|| EconomyError::not_found(EntityKind::Listing, listing_id.to_string()))?;
        if &listing.seller != seller {
            return Err(EconomyError::InvalidState(format!(
                "Listing {listing_id} belongs to another seller"
            )));
        }
        if let Some(inventory) = self.inventories.get(seller) {
            inventory.check_add(&listing.item, listing.amount)?;
        }
        let listing = self
            .market_mut(market)?
            .take(listing_id)
            .ok_or_else(|| EconomyError::not_found(EntityKind::Listing, listing_id.to_string()))?;
        self.inventory_mut(seller).add(&listing.item, listing.amount)?;
        Ok(listing)
    }

    pub fn browse_market(&self, market: &str) -> Result<&[Listing]> {
        self.markets
            .get(market)
            .map(|m| m.listings.as_slice())
            .ok_or_else(|| EconomyError::not_found(EntityKind::Market, market))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Balance;
    use rust_decimal_macros::dec;

    fn amount(v: Decimal) -> Amount {
        Amount::new(v).unwrap()
    }

    fn setup() -> (TenantEconomy, UserId, UserId) {
        let mut economy = TenantEconomy::new();
        economy.ledger.create_currency("gold", "G", dec!(1)).unwrap();
        economy.create_market("bazaar").unwrap();
        let seller = UserId::from("seller");
        let buyer = UserId::from("buyer");
        economy.inventory_mut(&seller).add("ore", amount(dec!(5))).unwrap();
        economy.ledger.grant(&buyer, "gold", amount(dec!(80))).unwrap();
        (economy, seller, buyer)
    }

    #[test]
    fn test_list_and_buy_round_trip() {
        let (mut economy, seller, buyer) = setup();
        let id = economy
            .list_item("bazaar", &seller, "ore", amount(dec!(3)), amount(dec!(50)), "gold")
            .unwrap();
        assert_eq!(economy.inventory(&seller).quantity("ore"), dec!(2));

        let purchase = economy.buy_listing("bazaar", &buyer, id).unwrap();
        assert_eq!(purchase.fee, dec!(0));
        assert_eq!(economy.inventory(&buyer).quantity("ore"), dec!(3));
        assert_eq!(economy.ledger.balance(&buyer, "gold").unwrap(), Balance::new(dec!(30)));
        assert_eq!(economy.ledger.balance(&seller, "gold").unwrap(), Balance::new(dec!(50)));
        assert!(economy.browse_market("bazaar").unwrap().is_empty());
    }

    #[test]
    fn test_list_requires_inventory() {
        let (mut economy, seller, _) = setup();
        let result =
            economy.list_item("bazaar", &seller, "ore", amount(dec!(6)), amount(dec!(1)), "gold");
        assert!(matches!(
            result,
            Err(EconomyError::InsufficientFunds { .. })
        ));
        assert_eq!(economy.inventory(&seller).quantity("ore"), dec!(5));
        assert!(economy.browse_market("bazaar").unwrap().is_empty());
    }

    #[test]
    fn test_buy_insufficient_funds_keeps_listing() {
        let (mut economy, seller, buyer) = setup();
        let id = economy
            .list_item("bazaar", &seller, "ore", amount(dec!(1)), amount(dec!(81)), "gold")
            .unwrap();
        let result = economy.buy_listing("bazaar", &buyer, id);
        assert!(matches!(
            result,
            Err(EconomyError::InsufficientFunds { .. })
        ));
        assert_eq!(economy.browse_market("bazaar").unwrap().len(), 1);
        assert_eq!(economy.inventory(&buyer).quantity("ore"), dec!(0));
        assert_eq!(economy.ledger.balance(&buyer, "gold").unwrap(), Balance::new(dec!(80)));
    }

    #[test]
    fn test_listing_ids_are_not_reused() {
        let (mut economy, seller, buyer) = setup();
        let one = amount(dec!(1));
        let first = economy.list_item("bazaar", &seller, "ore", one, one, "gold").unwrap();
        let second = economy.list_item("bazaar", &seller, "ore", one, one, "gold").unwrap();
        economy.buy_listing("bazaar", &buyer, first).unwrap();
        let third = economy.list_item("bazaar", &seller, "ore", one, one, "gold").unwrap();

        assert_eq!((first, second, third), (0, 1, 2));
        let ids: Vec<u64> = economy
            .browse_market("bazaar")
            .unwrap()
            .iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_market_fee_withheld_from_seller() {
        let (mut economy, seller, buyer) = setup();
        economy.set_config("market_fee", "0.1").unwrap();
        let id = economy
            .list_item("bazaar", &seller, "ore", amount(dec!(1)), amount(dec!(50)), "gold")
            .unwrap();
        let purchase = economy.buy_listing("bazaar", &buyer, id).unwrap();
        assert_eq!(purchase.fee, dec!(5));
        assert_eq!(economy.ledger.balance(&seller, "gold").unwrap(), Balance::new(dec!(45)));
        assert_eq!(economy.ledger.balance(&buyer, "gold").unwrap(), Balance::new(dec!(30)));
    }

    #[test]
    fn test_cancel_returns_goods() {
        let (mut economy, seller, buyer) = setup();
        let id = economy
            .list_item("bazaar", &seller, "ore", amount(dec!(4)), amount(dec!(10)), "gold")
            .unwrap();
        assert!(matches!(
            economy.cancel_listing("bazaar", &buyer, id),
            Err(EconomyError::InvalidState(_))
        ));
        economy.cancel_listing("bazaar", &seller, id).unwrap();
        assert_eq!(economy.inventory(&seller).quantity("ore"), dec!(5));
        assert!(matches!(
            economy.buy_listing("bazaar", &buyer, id),
            Err(EconomyError::NotFound { .. })
        ));
    }

    #[test]
    fn test_buy_overflow_moves_nothing() {
        let (mut economy, seller, buyer) = setup();
        let id = economy
            .list_item("bazaar", &seller, "ore", amount(dec!(1)), amount(dec!(50)), "gold")
            .unwrap();
        economy
            .ledger
            .wallet_mut(&seller)
            .credit("gold", amount(Decimal::MAX))
            .unwrap();

        let result = economy.buy_listing("bazaar", &buyer, id);
        assert!(matches!(result, Err(EconomyError::ValidationError(_))));
        assert_eq!(economy.ledger.balance(&buyer, "gold").unwrap(), Balance::new(dec!(80)));
        assert_eq!(economy.inventory(&buyer).quantity("ore"), dec!(0));
        assert_eq!(economy.browse_market("bazaar").unwrap().len(), 1);
    }
}
