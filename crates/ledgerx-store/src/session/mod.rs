//! Session factory, sessions and units of work
//!
//! A [`SessionFactory`] is the long-lived, cloneable product of a provider
//! build. It opens [`Session`]s, each owning one connection, and sessions run
//! closures against a transaction-scoped [`UnitOfWork`].

mod convert;
mod factory;
mod plan;
#[allow(clippy::module_inception)]
mod session;
mod unit_of_work;

pub use factory::{SessionFactory, SessionFactoryBuilder};
pub use session::Session;
pub use unit_of_work::UnitOfWork;
