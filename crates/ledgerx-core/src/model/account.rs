use serde::{Deserialize, Serialize};

use crate::errors::{LedgerXError, Result};
use crate::mapping::{ColumnDef, ColumnType, Entity, EntityDescriptor, Polymorphic, Row};

pub static ACCOUNT: EntityDescriptor = EntityDescriptor {
    name: "Account",
    table: "account",
    id_column: "id",
    columns: &[
        ColumnDef::new("owner", ColumnType::Text),
        ColumnDef::new("balance", ColumnType::Real),
        ColumnDef::new("interest_rate", ColumnType::Real),
    ],
    parent: None,
};

pub static CREDIT_ACCOUNT: EntityDescriptor = EntityDescriptor {
    name: "CreditAccount",
    table: "credit_account",
    id_column: "id",
    columns: &[ColumnDef::new("credit_limit", ColumnType::Real)],
    parent: Some("Account"),
};

pub static DEBIT_ACCOUNT: EntityDescriptor = EntityDescriptor {
    name: "DebitAccount",
    table: "debit_account",
    id_column: "id",
    columns: &[ColumnDef::new("overdraft_fee", ColumnType::Real)],
    parent: Some("Account"),
};

/// Base account, persisted in the `account` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Store-generated identifier, shared with any subclass row
    pub id: Option<i64>,
    pub owner: String,
    pub balance: f64,
    pub interest_rate: f64,
}

impl Account {
    pub fn new(owner: impl Into<String>, balance: f64, interest_rate: f64) -> Self {
        Self {
            id: None,
            owner: owner.into(),
            balance,
            interest_rate,
        }
    }

    fn write_columns(&self, row: &mut Row) {
        row.set("owner", self.owner.as_str());
        row.set("balance", self.balance);
        row.set("interest_rate", self.interest_rate);
    }

    fn read_columns(entity: &str, row: &Row) -> Result<Self> {
        Ok(Self {
            id: Some(row.require_id(entity)?),
            owner: row.require_text(entity, "owner")?,
            balance: row.require_f64(entity, "balance")?,
            interest_rate: row.require_f64(entity, "interest_rate")?,
        })
    }
}

impl Entity for Account {
    fn descriptor() -> &'static EntityDescriptor {
        &ACCOUNT
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn to_row(&self) -> Row {
        let mut row = Row::with_id(self.id);
        self.write_columns(&mut row);
        row
    }

    fn from_row(row: &Row) -> Result<Self> {
        Self::read_columns(ACCOUNT.name, row)
    }
}

/// Account with a credit line, extra state in `credit_account`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditAccount {
    #[serde(flatten)]
    pub account: Account,
    pub credit_limit: f64,
}

impl CreditAccount {
    pub fn new(
        owner: impl Into<String>,
        balance: f64,
        interest_rate: f64,
        credit_limit: f64,
    ) -> Self {
        Self {
            account: Account::new(owner, balance, interest_rate),
            credit_limit,
        }
    }

    /// Funds available before the credit line is exhausted
    pub fn available(&self) -> f64 {
        self.account.balance + self.credit_limit
    }
}

impl Entity for CreditAccount {
    fn descriptor() -> &'static EntityDescriptor {
        &CREDIT_ACCOUNT
    }

    fn id(&self) -> Option<i64> {
        self.account.id
    }

    fn set_id(&mut self, id: i64) {
        self.account.id = Some(id);
    }

    fn to_row(&self) -> Row {
        let mut row = Row::with_id(self.account.id);
        self.account.write_columns(&mut row);
        row.set("credit_limit", self.credit_limit);
        row
    }

    fn from_row(row: &Row) -> Result<Self> {
        let entity = CREDIT_ACCOUNT.name;
        Ok(Self {
            account: Account::read_columns(entity, row)?,
            credit_limit: row.require_f64(entity, "credit_limit")?,
        })
    }
}

/// Account charging a fee on overdraft, extra state in `debit_account`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebitAccount {
    #[serde(flatten)]
    pub account: Account,
    pub overdraft_fee: f64,
}

impl DebitAccount {
    pub fn new(
        owner: impl Into<String>,
        balance: f64,
        interest_rate: f64,
        overdraft_fee: f64,
    ) -> Self {
        Self {
            account: Account::new(owner, balance, interest_rate),
            overdraft_fee,
        }
    }

    pub fn is_overdrawn(&self) -> bool {
        self.account.balance < 0.0
    }
}

impl Entity for DebitAccount {
    fn descriptor() -> &'static EntityDescriptor {
        &DEBIT_ACCOUNT
    }

    fn id(&self) -> Option<i64> {
        self.account.id
    }

    fn set_id(&mut self, id: i64) {
        self.account.id = Some(id);
    }

    fn to_row(&self) -> Row {
        let mut row = Row::with_id(self.account.id);
        self.account.write_columns(&mut row);
        row.set("overdraft_fee", self.overdraft_fee);
        row
    }

    fn from_row(row: &Row) -> Result<Self> {
        let entity = DEBIT_ACCOUNT.name;
        Ok(Self {
            account: Account::read_columns(entity, row)?,
            overdraft_fee: row.require_f64(entity, "overdraft_fee")?,
        })
    }
}

/// Concrete kind resolved by a polymorphic account query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Plain,
    Credit,
    Debit,
}

impl AccountKind {
    pub fn entity_name(&self) -> &'static str {
        match self {
            AccountKind::Plain => ACCOUNT.name,
            AccountKind::Credit => CREDIT_ACCOUNT.name,
            AccountKind::Debit => DEBIT_ACCOUNT.name,
        }
    }
}

/// Any row of the account hierarchy, as its most specific type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnyAccount {
    Plain(Account),
    Credit(CreditAccount),
    Debit(DebitAccount),
}

impl AnyAccount {
    pub fn kind(&self) -> AccountKind {
        match self {
            AnyAccount::Plain(_) => AccountKind::Plain,
            AnyAccount::Credit(_) => AccountKind::Credit,
            AnyAccount::Debit(_) => AccountKind::Debit,
        }
    }

    /// The base-table part shared by every kind
    pub fn account(&self) -> &Account {
        match self {
            AnyAccount::Plain(a) => a,
            AnyAccount::Credit(c) => &c.account,
            AnyAccount::Debit(d) => &d.account,
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.account().id
    }
}

impl Polymorphic for AnyAccount {
    fn base() -> &'static EntityDescriptor {
        &ACCOUNT
    }

    fn from_concrete(entity: &str, row: &Row) -> Result<Self> {
        match entity {
            "Account" => Ok(AnyAccount::Plain(Account::from_row(row)?)),
            "CreditAccount" => Ok(AnyAccount::Credit(CreditAccount::from_row(row)?)),
            "DebitAccount" => Ok(AnyAccount::Debit(DebitAccount::from_row(row)?)),
            other => Err(LedgerXError::UnmappedEntity {
                entity: other.to_string(),
            }),
        }
    }
}

impl From<Account> for AnyAccount {
    fn from(a: Account) -> Self {
        AnyAccount::Plain(a)
    }
}

impl From<CreditAccount> for AnyAccount {
    fn from(c: CreditAccount) -> Self {
        AnyAccount::Credit(c)
    }
}

impl From<DebitAccount> for AnyAccount {
    fn from(d: DebitAccount) -> Self {
        AnyAccount::Debit(d)
    }
}
