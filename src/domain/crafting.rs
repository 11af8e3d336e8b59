use super::economy::TenantEconomy;
use super::ids::UserId;
use super::money::{Amount, parse_decimal};
use crate::error::{EconomyError, EntityKind, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ingredients consumed to produce one unit named after the recipe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipe {
    pub ingredients: BTreeMap<String, Amount>,
}

impl Recipe {
    /// Parses a flat `item, quantity, item, quantity, ...` argument list.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        if args.is_empty() || args.len() % 2 != 0 {
            return Err(EconomyError::ValidationError(
                "Recipe ingredients must be item/quantity pairs".to_string(),
            ));
        }
        let mut ingredients = BTreeMap::new();
        for pair in args.chunks(2) {
            let item = pair[0].as_ref().trim();
            if item.is_empty() {
                return Err(EconomyError::ValidationError(
                    "Ingredient name must not be empty".to_string(),
                ));
            }
            let quantity = Amount::new(parse_decimal(pair[1].as_ref())?)?;
            if ingredients.insert(item.to_string(), quantity).is_some() {
                return Err(EconomyError::ValidationError(format!(
                    "Ingredient {item} listed twice"
                )));
            }
        }
        Ok(Self { ingredients })
    }
}

/// Produced by every successful craft.
const CRAFT_YIELD: Decimal = Decimal::ONE;

impl TenantEconomy {
    pub fn create_recipe<S: AsRef<str>>(&mut self, name: &str, args: &[S]) -> Result<()> {
        if self.recipes.contains_key(name) {
            return Err(EconomyError::already_exists(EntityKind::Recipe, name));
        }
        let recipe = Recipe::from_args(args)?;
        self.recipes.insert(name.to_string(), recipe);
        Ok(())
    }

    pub fn recipe(&self, name: &str) -> Result<&Recipe> {
        self.recipes
            .get(name)
            .ok_or_else(|| EconomyError::not_found(EntityKind::Recipe, name))
    }

    pub fn list_recipes(&self) -> impl Iterator<Item = &String> {
        self.recipes.keys()
    }

    /// Consumes every ingredient and adds one unit of the recipe's output.
    /// If any ingredient is short the inventory is left untouched.
    pub fn craft(&mut self, name: &str, user: &UserId) -> Result<Decimal> {
        let recipe = self.recipe(name)?.clone();
        let output = Amount::new(CRAFT_YIELD)?;
        let inventory = self.inventory_mut(user);
        inventory.check_add(name, output)?;
        if let Some((item, required)) = recipe
            .ingredients
            .iter()
            .find(|(item, required)| !inventory.has(item, **required))
        {
            return Err(EconomyError::insufficient(
                required.value(),
                inventory.quantity(item),
            ));
        }
        for (item, required) in &recipe.ingredients {
            inventory.remove(item, *required)?;
        }
        inventory.add(name, output)?;
        Ok(inventory.quantity(name))
    }
}
