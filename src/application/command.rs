use crate::domain::analytics::{EconomyReport, LeaderboardEntry, MarketTrend};
use crate::domain::crafting::Recipe;
use crate::domain::economy::MaintenanceReport;
use crate::domain::ids::UserId;
use crate::domain::inventory::{Inventory, Item};
use crate::domain::ledger::{Currency, Wallet};
use crate::domain::loan::{Loan, Repayment};
use crate::domain::market::{Listing, Purchase};
use crate::domain::money::{Amount, Balance};
use crate::domain::payroll::Job;
use crate::domain::resource::Resource;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// One operation against a single tenant's economy.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateCurrency {
        name: String,
        symbol: String,
        exchange_rate: Decimal,
    },
    AdjustSupply {
        currency: String,
        delta: Decimal,
    },
    CurrencyInfo {
        currency: String,
    },
    GrantFunds {
        user: UserId,
        currency: String,
        amount: Amount,
    },
    WalletBalance {
        user: UserId,
    },
    Pay {
        from: UserId,
        to: UserId,
        currency: String,
        amount: Amount,
    },
    CreateItem {
        name: String,
        properties: Vec<String>,
    },
    ItemInfo {
        name: String,
    },
    GiveItem {
        user: UserId,
        item: String,
        amount: Amount,
    },
    Inventory {
        user: UserId,
    },
    CreateBank {
        name: String,
        interest_rate: Decimal,
    },
    BankDeposit {
        bank: String,
        user: UserId,
        currency: String,
        amount: Amount,
    },
    BankWithdraw {
        bank: String,
        user: UserId,
        currency: String,
        amount: Amount,
    },
    BankBalance {
        bank: String,
        user: UserId,
    },
    AccrueInterest,
    CreateMarket {
        name: String,
    },
    ListItem {
        market: String,
        seller: UserId,
        item: String,
        amount: Amount,
        price: Amount,
        currency: String,
    },
    BuyListing {
        market: String,
        buyer: UserId,
        listing_id: u64,
    },
    CancelListing {
        market: String,
        seller: UserId,
        listing_id: u64,
    },
    BrowseMarket {
        market: String,
    },
    CreateJob {
        name: String,
        salary: Amount,
        currency: String,
        interval: u32,
    },
    ApplyJob {
        job: String,
        user: UserId,
    },
    QuitJob {
        job: String,
        user: UserId,
    },
    ListJobs,
    PaySalaries,
    RequestLoan {
        user: UserId,
        amount: Amount,
        currency: String,
    },
    ApproveLoan {
        user: UserId,
        interest: Option<Decimal>,
        term_days: u32,
    },
    RepayLoan {
        user: UserId,
        amount: Amount,
    },
    LoanInfo {
        user: UserId,
    },
    ReviewOverdue,
    CreateResource {
        name: String,
        regen_rate: Decimal,
        max_amount: Decimal,
    },
    Gather {
        resource: String,
        user: UserId,
        amount: Amount,
    },
    ResourceInfo {
        name: String,
    },
    CreateRecipe {
        name: String,
        ingredients: Vec<String>,
    },
    RecipeInfo {
        name: String,
    },
    ListRecipes,
    Craft {
        recipe: String,
        user: UserId,
    },
    SetTaxRate {
        rate: Decimal,
    },
    TaxInfo,
    CollectTaxes,
    SetConfig {
        parameter: String,
        value: String,
    },
    ShowConfig,
    AssignRole {
        user: UserId,
        role: String,
    },
    HasRole {
        user: UserId,
        role: String,
    },
    SetHook {
        trigger: String,
        action: String,
    },
    EconomyReport,
    Leaderboard {
        currency: String,
        limit: usize,
    },
    MarketTrends,
    RunMaintenance,
    PurgeTenant,
}

/// The success value of a [`Command`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Done,
    Currency(Currency),
    Supply(Decimal),
    Balance(Balance),
    Wallet(Wallet),
    Item(Item),
    Inventory(Inventory),
    /// A quantity left or held after the operation.
    Quantity(Decimal),
    Count(usize),
    ListingId(u64),
    Purchase(Purchase),
    Listing(Listing),
    Listings(Vec<Listing>),
    Jobs(Vec<(String, Job)>),
    DueDate(DateTime<Utc>),
    Repayment(Repayment),
    Loan(Loan),
    Resource(Resource),
    Recipe(Recipe),
    Names(Vec<String>),
    Rate(Decimal),
    Config(Vec<(&'static str, Decimal)>),
    Flag(bool),
    Report(EconomyReport),
    Leaderboard(Vec<LeaderboardEntry>),
    Trends(Vec<MarketTrend>),
    Maintenance(MaintenanceReport),
}
