//! Session: one connection, one unit of work at a time

use rusqlite::Connection;

use ledgerx_core::mapping::{Entity, Polymorphic};
use ledgerx_core_types::SessionId;

use super::factory::SessionFactory;
use super::unit_of_work::UnitOfWork;
use crate::errors::{from_rusqlite, Result};

/// Scoped handle for reads and writes
///
/// Each convenience method runs in its own transaction; use
/// [`transaction`](Self::transaction) to group several operations.
///
/// # Example
///
/// ```no_run
/// # use ledgerx_store::session::SessionFactory;
/// # fn demo(factory: &SessionFactory) -> ledgerx_store::Result<()> {
/// use ledgerx_core::{AnyAccount, CreditAccount};
///
/// let mut session = factory.open_session()?;
/// let mut credit = CreditAccount::new("ana", 100.0, 0.02, 500.0);
/// session.persist(&mut credit)?;
/// let all: Vec<AnyAccount> = session.list_polymorphic()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    conn: Connection,
    factory: SessionFactory,
}

impl Session {
    pub(crate) fn new(conn: Connection, factory: SessionFactory) -> Self {
        Self {
            id: SessionId::new(),
            conn,
            factory,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn factory(&self) -> &SessionFactory {
        &self.factory
    }

    /// Run `work` in one transaction: commit on `Ok`, roll back on `Err`
    ///
    /// # Errors
    ///
    /// `RegistryDestroyed` once the factory is closed; otherwise whatever
    /// `work` or the commit returns.
    pub fn transaction<T, F>(&mut self, work: F) -> Result<T>
    where
        F: FnOnce(&UnitOfWork<'_>) -> Result<T>,
    {
        self.factory.ensure_open("transaction")?;

        let tx = self.conn.transaction().map_err(from_rusqlite)?;
        let outcome = {
            let uow = UnitOfWork::new(
                &tx,
                self.factory.model(),
                self.factory.settings().show_sql,
                &self.id,
            );
            work(&uow)
        };

        match outcome {
            Ok(value) => {
                tx.commit().map_err(from_rusqlite)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback() {
                    tracing::warn!(
                        session_id = self.id.as_str(),
                        error = %rollback,
                        "rollback failed"
                    );
                }
                Err(err)
            }
        }
    }

    /// # Errors
    ///
    /// See [`UnitOfWork::persist`].
    pub fn persist<E: Entity>(&mut self, entity: &mut E) -> Result<i64> {
        self.transaction(|uow| uow.persist(entity))
    }

    /// # Errors
    ///
    /// See [`UnitOfWork::find`].
    pub fn find<E: Entity>(&mut self, id: i64) -> Result<Option<E>> {
        self.transaction(|uow| uow.find(id))
    }

    /// # Errors
    ///
    /// See [`UnitOfWork::list`].
    pub fn list<E: Entity>(&mut self) -> Result<Vec<E>> {
        self.transaction(|uow| uow.list())
    }

    /// # Errors
    ///
    /// See [`UnitOfWork::count`].
    pub fn count<E: Entity>(&mut self) -> Result<u64> {
        self.transaction(|uow| uow.count::<E>())
    }

    /// # Errors
    ///
    /// See [`UnitOfWork::find_polymorphic`].
    pub fn find_polymorphic<P: Polymorphic>(&mut self, id: i64) -> Result<Option<P>> {
        self.transaction(|uow| uow.find_polymorphic(id))
    }

    /// # Errors
    ///
    /// See [`UnitOfWork::list_polymorphic`].
    pub fn list_polymorphic<P: Polymorphic>(&mut self) -> Result<Vec<P>> {
        self.transaction(|uow| uow.list_polymorphic())
    }

    /// # Errors
    ///
    /// See [`UnitOfWork::update`].
    pub fn update<E: Entity>(&mut self, entity: &E) -> Result<()> {
        self.transaction(|uow| uow.update(entity))
    }

    /// # Errors
    ///
    /// See [`UnitOfWork::remove`].
    pub fn remove<E: Entity>(&mut self, id: i64) -> Result<bool> {
        self.transaction(|uow| uow.remove::<E>(id))
    }
}
