use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// The kind of entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Tenant,
    Currency,
    Wallet,
    Item,
    Bank,
    BankAccount,
    Market,
    Listing,
    Job,
    Employee,
    Loan,
    Resource,
    Recipe,
    Ingredient,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Tenant => "tenant",
            EntityKind::Currency => "currency",
            EntityKind::Wallet => "wallet",
            EntityKind::Item => "item",
            EntityKind::Bank => "bank",
            EntityKind::BankAccount => "bank account",
            EntityKind::Market => "market",
            EntityKind::Listing => "listing",
            EntityKind::Job => "job",
            EntityKind::Employee => "employee",
            EntityKind::Loan => "loan",
            EntityKind::Resource => "resource",
            EntityKind::Recipe => "recipe",
            EntityKind::Ingredient => "ingredient",
        };
        f.write_str(name)
    }
}

/// Discriminant of [`EconomyError`], for front ends that map errors to messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InsufficientFunds,
    InvalidState,
    ValidationError,
    Storage,
}

#[derive(Error, Debug)]
pub enum EconomyError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: EntityKind, name: String },
    #[error("{kind} already exists: {name}")]
    AlreadyExists { kind: EntityKind, name: String },
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] toml::de::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl EconomyError {
    pub fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn already_exists(kind: EntityKind, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            name: name.into(),
        }
    }

    pub fn insufficient(required: Decimal, available: Decimal) -> Self {
        Self::InsufficientFunds {
            required,
            available,
        }
    }

    /// A quantity that would exceed the range of `Decimal`.
    pub fn overflow(what: impl fmt::Display) -> Self {
        Self::ValidationError(format!("Numeric overflow {what}"))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EconomyError::NotFound { .. } => ErrorKind::NotFound,
            EconomyError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            EconomyError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            EconomyError::InvalidState(_) => ErrorKind::InvalidState,
            EconomyError::ValidationError(_) => ErrorKind::ValidationError,
            _ => ErrorKind::Storage,
        }
    }
}

pub type Result<T> = std::result::Result<T, EconomyError>;
