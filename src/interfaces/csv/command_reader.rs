use crate::application::command::Command;
use crate::domain::analytics::DEFAULT_LEADERBOARD_SIZE;
use crate::domain::ids::{TenantId, UserId};
use crate::domain::money::{Amount, parse_decimal, parse_rate};
use crate::error::{EconomyError, Result};
use csv::StringRecord;
use rust_decimal::Decimal;
use std::io::Read;

/// Reads economy commands from a CSV script.
///
/// Each row is `tenant,operation,args...`. There is no header row, rows may
/// have any number of fields, and lines starting with `#` are skipped.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .flexible(true)
            .comment(Some(b'#'))
            .from_reader(source);
        Self { reader }
    }

    /// Lazily parses the script. A malformed row yields an error and reading
    /// continues with the next row.
    pub fn commands(self) -> impl Iterator<Item = Result<(TenantId, Command)>> {
        self.reader.into_records().map(|record| {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            parse_record(&record).map_err(|e| match e {
                EconomyError::ValidationError(msg) => {
                    EconomyError::ValidationError(format!("line {line}: {msg}"))
                }
                other => other,
            })
        })
    }
}

/// Positional arguments of one row.
struct Args<'a> {
    op: &'a str,
    fields: Vec<&'a str>,
    next: usize,
}

impl<'a> Args<'a> {
    fn text(&mut self, name: &str) -> Result<&'a str> {
        match self.fields.get(self.next).copied() {
            Some(field) if !field.is_empty() => {
                self.next += 1;
                Ok(field)
            }
            _ => Err(EconomyError::ValidationError(format!(
                "{} is missing argument '{name}'",
                self.op
            ))),
        }
    }

    fn string(&mut self, name: &str) -> Result<String> {
        self.text(name).map(str::to_string)
    }

    fn user(&mut self, name: &str) -> Result<UserId> {
        self.text(name).map(UserId::from)
    }

    fn amount(&mut self, name: &str) -> Result<Amount> {
        self.text(name)?.parse()
    }

    fn decimal(&mut self, name: &str) -> Result<Decimal> {
        parse_decimal(self.text(name)?)
    }

    fn rate(&mut self, name: &str) -> Result<Decimal> {
        parse_rate(self.text(name)?)
    }

    fn integer<T: std::str::FromStr>(&mut self, name: &str) -> Result<T> {
        let raw = self.text(name)?;
        raw.parse().map_err(|_| {
            EconomyError::ValidationError(format!("Invalid {name} '{raw}' for {}", self.op))
        })
    }

    /// An argument that may be absent or left empty.
    fn optional(&mut self) -> Option<&'a str> {
        let field = self.fields.get(self.next).copied();
        self.next += 1;
        field.filter(|f| !f.is_empty())
    }

    fn rest(&mut self) -> Vec<String> {
        let rest = self
            .fields
            .get(self.next..)
            .unwrap_or_default()
            .iter()
            .map(|f| f.to_string())
            .collect();
        self.next = self.fields.len();
        rest
    }

    fn finish(self, command: Command) -> Result<Command> {
        if self.next < self.fields.len() {
            return Err(EconomyError::ValidationError(format!(
                "{} takes {} arguments, got {}",
                self.op,
                self.next,
                self.fields.len()
            )));
        }
        Ok(command)
    }
}

fn parse_record(record: &StringRecord) -> Result<(TenantId, Command)> {
    let mut fields = record.iter();
    let tenant = match fields.next() {
        Some(t) if !t.is_empty() => TenantId::from(t),
        _ => return Err(EconomyError::ValidationError("missing tenant".to_string())),
    };
    let op = match fields.next() {
        Some(op) if !op.is_empty() => op,
        _ => return Err(EconomyError::ValidationError("missing operation".to_string())),
    };
    let mut args = Args {
        op,
        fields: fields.collect(),
        next: 0,
    };

    let command = match op {
        "createCurrency" => Command::CreateCurrency {
            name: args.string("name")?,
            symbol: args.string("symbol")?,
            exchange_rate: args.decimal("exchange_rate")?,
        },
        "adjustSupply" => Command::AdjustSupply {
            currency: args.string("currency")?,
            delta: args.decimal("delta")?,
        },
        "currencyInfo" => Command::CurrencyInfo {
            currency: args.string("currency")?,
        },
        "grantFunds" => Command::GrantFunds {
            user: args.user("user")?,
            currency: args.string("currency")?,
            amount: args.amount("amount")?,
        },
        "walletBalance" => Command::WalletBalance {
            user: args.user("user")?,
        },
        "pay" => Command::Pay {
            from: args.user("from")?,
            to: args.user("to")?,
            currency: args.string("currency")?,
            amount: args.amount("amount")?,
        },
        "createItem" => Command::CreateItem {
            name: args.string("name")?,
            properties: args.rest(),
        },
        "itemInfo" => Command::ItemInfo {
            name: args.string("name")?,
        },
        "giveItem" => Command::GiveItem {
            user: args.user("user")?,
            item: args.string("item")?,
            amount: args.amount("amount")?,
        },
        "inventory" => Command::Inventory {
            user: args.user("user")?,
        },
        "createBank" => Command::CreateBank {
            name: args.string("name")?,
            interest_rate: args.rate("interest_rate")?,
        },
        "bankDeposit" => Command::BankDeposit {
            bank: args.string("bank")?,
            user: args.user("user")?,
            currency: args.string("currency")?,
            amount: args.amount("amount")?,
        },
        "bankWithdraw" => Command::BankWithdraw {
            bank: args.string("bank")?,
            user: args.user("user")?,
            currency: args.string("currency")?,
            amount: args.amount("amount")?,
        },
        "bankBalance" => Command::BankBalance {
            bank: args.string("bank")?,
            user: args.user("user")?,
        },
        "accrueInterest" => Command::AccrueInterest,
        "createMarket" => Command::CreateMarket {
            name: args.string("name")?,
        },
        "listItem" => Command::ListItem {
            market: args.string("market")?,
            seller: args.user("seller")?,
            item: args.string("item")?,
            amount: args.amount("amount")?,
            price: args.amount("price")?,
            currency: args.string("currency")?,
        },
        "buyListing" => Command::BuyListing {
            market: args.string("market")?,
            buyer: args.user("buyer")?,
            listing_id: args.integer("listing_id")?,
        },
        "cancelListing" => Command::CancelListing {
            market: args.string("market")?,
            seller: args.user("seller")?,
            listing_id: args.integer("listing_id")?,
        },
        "browseMarket" => Command::BrowseMarket {
            market: args.string("market")?,
        },
        "createJob" => Command::CreateJob {
            name: args.string("name")?,
            salary: args.amount("salary")?,
            currency: args.string("currency")?,
            interval: args.integer("interval")?,
        },
        "applyJob" => Command::ApplyJob {
            job: args.string("job")?,
            user: args.user("user")?,
        },
        "quitJob" => Command::QuitJob {
            job: args.string("job")?,
            user: args.user("user")?,
        },
        "listJobs" => Command::ListJobs,
        "paySalaries" => Command::PaySalaries,
        "requestLoan" => Command::RequestLoan {
            user: args.user("user")?,
            amount: args.amount("amount")?,
            currency: args.string("currency")?,
        },
        "approveLoan" => Command::ApproveLoan {
            user: args.user("user")?,
            interest: args.optional().map(parse_rate).transpose()?,
            term_days: args.integer("term")?,
        },
        "repayLoan" => Command::RepayLoan {
            user: args.user("user")?,
            amount: args.amount("amount")?,
        },
        "loanInfo" => Command::LoanInfo {
            user: args.user("user")?,
        },
        "reviewOverdue" => Command::ReviewOverdue,
        "createResource" => Command::CreateResource {
            name: args.string("name")?,
            regen_rate: args.rate("regen_rate")?,
            max_amount: args.rate("max_amount")?,
        },
        "gather" => Command::Gather {
            resource: args.string("resource")?,
            user: args.user("user")?,
            amount: args.amount("amount")?,
        },
        "resourceInfo" => Command::ResourceInfo {
            name: args.string("name")?,
        },
        "createRecipe" => Command::CreateRecipe {
            name: args.string("name")?,
            ingredients: args.rest(),
        },
        "recipeInfo" => Command::RecipeInfo {
            name: args.string("name")?,
        },
        "listRecipes" => Command::ListRecipes,
        "craft" => Command::Craft {
            recipe: args.string("recipe")?,
            user: args.user("user")?,
        },
        "setTaxRate" => Command::SetTaxRate {
            rate: args.decimal("rate")?,
        },
        "taxInfo" => Command::TaxInfo,
        "collectTaxes" => Command::CollectTaxes,
        "setConfig" => Command::SetConfig {
            parameter: args.string("parameter")?,
            value: args.string("value")?,
        },
        "showConfig" => Command::ShowConfig,
        "assignRole" => Command::AssignRole {
            user: args.user("user")?,
            role: args.string("role")?,
        },
        "hasRole" => Command::HasRole {
            user: args.user("user")?,
            role: args.string("role")?,
        },
        "setHook" => Command::SetHook {
            trigger: args.string("trigger")?,
            action: args.string("action")?,
        },
        "economyReport" => Command::EconomyReport,
        "leaderboard" => Command::Leaderboard {
            currency: args.string("currency")?,
            limit: match args.optional() {
                Some(raw) => raw.parse().map_err(|_| {
                    EconomyError::ValidationError(format!("Invalid limit '{raw}'"))
                })?,
                None => DEFAULT_LEADERBOARD_SIZE,
            },
        },
        "marketTrends" => Command::MarketTrends,
        "runMaintenance" => Command::RunMaintenance,
        "purgeTenant" => Command::PurgeTenant,
        other => {
            return Err(EconomyError::ValidationError(format!(
                "Unknown operation: {other}"
            )));
        }
    };
    Ok((tenant, args.finish(command)?))
}
