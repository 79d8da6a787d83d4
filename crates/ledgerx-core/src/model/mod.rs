//! Mapped account hierarchy
//!
//! `Account` is a concrete base entity; `CreditAccount` and `DebitAccount`
//! each add their own table joined on the account id.

pub mod account;

pub use account::{
    Account, AccountKind, AnyAccount, CreditAccount, DebitAccount, ACCOUNT, CREDIT_ACCOUNT,
    DEBIT_ACCOUNT,
};
