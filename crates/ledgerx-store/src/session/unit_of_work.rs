//! Statements of one transaction against the joined mapping
//!
//! A [`UnitOfWork`] only exists inside [`Session::transaction`], so every
//! multi-table write it issues commits or rolls back together.
//!
//! [`Session::transaction`]: super::Session::transaction

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use std::time::Instant;

use ledgerx_core::errors::{ExError, LedgerXError};
use ledgerx_core::mapping::{Entity, EntityDescriptor, MappingModel, Polymorphic, Row, Value};
use ledgerx_core::{log_op_end, log_op_error, log_op_start};
use ledgerx_core_types::SessionId;

use super::convert::{from_sql, to_sql};
use super::plan::{Decoded, SelectPlan};
use crate::errors::{from_rusqlite, row_not_found, Result};
use crate::sql_log;

/// Transaction-scoped access to mapped entities
pub struct UnitOfWork<'a> {
    conn: &'a Connection,
    model: &'a MappingModel,
    show_sql: bool,
    session_id: &'a SessionId,
}

impl<'a> UnitOfWork<'a> {
    pub(crate) fn new(
        conn: &'a Connection,
        model: &'a MappingModel,
        show_sql: bool,
        session_id: &'a SessionId,
    ) -> Self {
        Self {
            conn,
            model,
            show_sql,
            session_id,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        self.session_id
    }

    /// Insert `entity` into every table of its chain, root first
    ///
    /// The root insert yields the identifier unless the entity already
    /// carries one; each subclass row reuses it. The id is written back into
    /// `entity`.
    ///
    /// # Errors
    ///
    /// - `MissingMapping` if `E` is not part of the model
    /// - `Serialization` if `to_row` omits a mapped column
    /// - `Persistence` on constraint violations (e.g. a duplicate id)
    pub fn persist<E: Entity>(&self, entity: &mut E) -> Result<i64> {
        let descriptor = E::descriptor();
        self.instrumented("persist", descriptor.name, || {
            let chain = self.chain_of(descriptor)?;
            let row = entity.to_row();

            let mut id = entity.id();
            for table in &chain {
                let mut columns = Vec::with_capacity(table.columns.len() + 1);
                let mut values = Vec::with_capacity(table.columns.len() + 1);

                if let Some(id) = id {
                    columns.push(table.id_column);
                    values.push(SqlValue::Integer(id));
                }
                for column in table.columns {
                    columns.push(column.name);
                    values.push(to_sql(mapped_value(&row, descriptor.name, column.name)?));
                }

                let sql = if columns.is_empty() {
                    format!("INSERT INTO {} DEFAULT VALUES", table.table)
                } else {
                    let placeholders: Vec<String> =
                        (1..=columns.len()).map(|i| format!("?{}", i)).collect();
                    format!(
                        "INSERT INTO {} ({}) VALUES ({})",
                        table.table,
                        columns.join(", "),
                        placeholders.join(", ")
                    )
                };
                self.execute(&sql, &values)
                    .map_err(|e| e.with_table(table.table))?;

                if id.is_none() {
                    id = Some(self.conn.last_insert_rowid());
                }
            }

            let id = id.ok_or_else(|| LedgerXError::MissingId {
                entity: descriptor.name.to_string(),
            })?;
            entity.set_id(id);
            Ok(id)
        })
    }

    /// Load one `E` by id through an inner join of its chain
    ///
    /// Returns `None` when any table of the chain lacks the id, so a plain
    /// account is never returned as a credit account.
    ///
    /// # Errors
    ///
    /// `MissingMapping` for unmapped types, `Persistence` on SQL failure.
    pub fn find<E: Entity>(&self, id: i64) -> Result<Option<E>> {
        let descriptor = E::descriptor();
        self.instrumented("find", descriptor.name, || {
            let plan = SelectPlan::joined(&self.chain_of(descriptor)?);
            let rows = self.query(&plan, &plan.by_id(), &[SqlValue::Integer(id)])?;
            match rows.into_iter().next() {
                Some(decoded) => Ok(Some(E::from_row(&decoded.row)?)),
                None => Ok(None),
            }
        })
    }

    /// Every `E`, ordered by id
    ///
    /// # Errors
    ///
    /// `MissingMapping` for unmapped types, `Persistence` on SQL failure.
    pub fn list<E: Entity>(&self) -> Result<Vec<E>> {
        let descriptor = E::descriptor();
        self.instrumented("list", descriptor.name, || {
            let plan = SelectPlan::joined(&self.chain_of(descriptor)?);
            self.query(&plan, &plan.all(), &[])?
                .into_iter()
                .map(|decoded| E::from_row(&decoded.row).map_err(ExError::from))
                .collect()
        })
    }

    /// Number of rows that are (at least) an `E`
    ///
    /// # Errors
    ///
    /// `MissingMapping` for unmapped types, `Persistence` on SQL failure.
    pub fn count<E: Entity>(&self) -> Result<u64> {
        let descriptor = E::descriptor();
        self.instrumented("count", descriptor.name, || {
            let plan = SelectPlan::joined(&self.chain_of(descriptor)?);
            let sql = plan.count();
            sql_log::statement(self.show_sql, self.session_id.as_str(), &sql);
            let n: i64 = self
                .conn
                .query_row(&sql, [], |row| row.get(0))
                .map_err(from_rusqlite)?;
            Ok(n.max(0) as u64)
        })
    }

    /// Load one row of `P::base()` as its most-derived mapped type
    ///
    /// # Errors
    ///
    /// - `InvariantViolation` if the id sits in two sibling subclass tables
    /// - `MissingMapping` for unmapped types, `Persistence` on SQL failure
    pub fn find_polymorphic<P: Polymorphic>(&self, id: i64) -> Result<Option<P>> {
        let base = P::base();
        self.instrumented("find_polymorphic", base.name, || {
            let plan = self.polymorphic_plan(base)?;
            let rows = self.query(&plan, &plan.by_id(), &[SqlValue::Integer(id)])?;
            match rows.into_iter().next() {
                Some(decoded) => Ok(Some(self.resolve(base, decoded)?)),
                None => Ok(None),
            }
        })
    }

    /// Every row of `P::base()`, each as its most-derived mapped type
    ///
    /// # Errors
    ///
    /// As [`find_polymorphic`](Self::find_polymorphic).
    pub fn list_polymorphic<P: Polymorphic>(&self) -> Result<Vec<P>> {
        let base = P::base();
        self.instrumented("list_polymorphic", base.name, || {
            let plan = self.polymorphic_plan(base)?;
            self.query(&plan, &plan.all(), &[])?
                .into_iter()
                .map(|decoded| self.resolve(base, decoded))
                .collect()
        })
    }

    /// Write every column of `entity` back to the tables of its chain
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the entity has no id
    /// - `NotFound` if no row of type `E` has that id
    /// - `Serialization` if `to_row` omits a mapped column
    pub fn update<E: Entity>(&self, entity: &E) -> Result<()> {
        let descriptor = E::descriptor();
        self.instrumented("update", descriptor.name, || {
            let id = entity.id().ok_or_else(|| LedgerXError::MissingId {
                entity: descriptor.name.to_string(),
            })?;
            let chain = self.chain_of(descriptor)?;
            if !self.exists(&chain, id)? {
                return Err(row_not_found("update", descriptor.name, id));
            }

            // Every column is resolved before the first statement runs
            let row = entity.to_row();
            let mut statements = Vec::with_capacity(chain.len());
            for table in chain.iter().filter(|t| !t.columns.is_empty()) {
                let mut assignments = Vec::with_capacity(table.columns.len());
                let mut values = Vec::with_capacity(table.columns.len() + 1);
                for (i, column) in table.columns.iter().enumerate() {
                    assignments.push(format!("{} = ?{}", column.name, i + 1));
                    values.push(to_sql(mapped_value(&row, descriptor.name, column.name)?));
                }
                values.push(SqlValue::Integer(id));

                let sql = format!(
                    "UPDATE {} SET {} WHERE {} = ?{}",
                    table.table,
                    assignments.join(", "),
                    table.id_column,
                    values.len()
                );
                statements.push((table.table, sql, values));
            }

            for (table, sql, values) in statements {
                self.execute(&sql, &values).map_err(|e| e.with_table(table))?;
            }
            Ok(())
        })
    }

    /// Delete the `E` with `id` from every table that holds it
    ///
    /// Tables below `E` go first (deepest first), then the chain from `E`
    /// back up to the root. Returns `false` when no `E` had that id.
    ///
    /// # Errors
    ///
    /// `MissingMapping` for unmapped types, `Persistence` on SQL failure.
    pub fn remove<E: Entity>(&self, id: i64) -> Result<bool> {
        let descriptor = E::descriptor();
        self.instrumented("remove", descriptor.name, || {
            let chain = self.chain_of(descriptor)?;
            if !self.exists(&chain, id)? {
                return Ok(false);
            }

            let below = self.model.descendants(descriptor.name);
            for table in below.iter().rev().chain(chain.iter().rev()) {
                let sql = format!("DELETE FROM {} WHERE {} = ?1", table.table, table.id_column);
                self.execute(&sql, &[SqlValue::Integer(id)])
                    .map_err(|e| e.with_table(table.table))?;
            }
            Ok(true)
        })
    }

    fn chain_of(&self, descriptor: &EntityDescriptor) -> Result<Vec<&'static EntityDescriptor>> {
        if !self.model.contains(descriptor) {
            return Err(LedgerXError::UnmappedEntity {
                entity: descriptor.name.to_string(),
            }
            .into());
        }
        Ok(self.model.chain(descriptor.name)?)
    }

    fn polymorphic_plan(&self, base: &EntityDescriptor) -> Result<SelectPlan> {
        let chain = self.chain_of(base)?;
        let descendants = self.model.descendants(base.name);
        Ok(SelectPlan::polymorphic(&chain, &descendants))
    }

    /// Pick the most-derived entity for a decoded row
    ///
    /// Matched descendants must form one path below `base`; two matched
    /// tables where neither is an ancestor of the other is ambiguous.
    fn resolve<P: Polymorphic>(&self, base: &EntityDescriptor, decoded: Decoded) -> Result<P> {
        let Decoded { row, matched } = decoded;

        let leaves: Vec<&'static EntityDescriptor> = matched
            .iter()
            .copied()
            .filter(|d| !matched.iter().any(|other| other.parent == Some(d.name)))
            .collect();

        let concrete = match leaves.as_slice() {
            [] => base.name,
            [leaf] => leaf.name,
            many => {
                return Err(LedgerXError::AmbiguousConcreteType {
                    entity: base.name.to_string(),
                    id: row.id().unwrap_or_default(),
                    candidates: many.iter().map(|d| d.name.to_string()).collect(),
                }
                .into())
            }
        };

        Ok(P::from_concrete(concrete, &row)?)
    }

    fn exists(&self, chain: &[&'static EntityDescriptor], id: i64) -> Result<bool> {
        let sql = SelectPlan::joined(chain).exists();
        sql_log::statement(self.show_sql, self.session_id.as_str(), &sql);
        let n: i64 = self
            .conn
            .query_row(&sql, [id], |row| row.get(0))
            .map_err(from_rusqlite)?;
        Ok(n > 0)
    }

    fn execute(&self, sql: &str, values: &[SqlValue]) -> Result<usize> {
        sql_log::statement(self.show_sql, self.session_id.as_str(), sql);
        self.conn
            .execute(sql, params_from_iter(values.iter()))
            .map_err(from_rusqlite)
    }

    fn query(&self, plan: &SelectPlan, sql: &str, values: &[SqlValue]) -> Result<Vec<Decoded>> {
        sql_log::statement(self.show_sql, self.session_id.as_str(), sql);
        let mut stmt = self.conn.prepare(sql).map_err(from_rusqlite)?;
        let mut rows = stmt
            .query(params_from_iter(values.iter()))
            .map_err(from_rusqlite)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(from_rusqlite)? {
            let mut values = Vec::with_capacity(plan.width());
            for i in 0..plan.width() {
                values.push(from_sql(row.get_ref(i).map_err(from_rusqlite)?)?);
            }
            out.push(plan.decode(values));
        }
        Ok(out)
    }

    fn instrumented<T>(
        &self,
        op: &'static str,
        entity: &str,
        body: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        let start = Instant::now();
        log_op_start!(op, entity = entity, session_id = self.session_id.as_str());

        match body() {
            Ok(value) => {
                log_op_end!(
                    op,
                    duration_ms = start.elapsed().as_millis() as u64,
                    entity = entity
                );
                Ok(value)
            }
            Err(err) => {
                let mut err = err.with_session_id(self.session_id.clone());
                if err.entity().is_none() {
                    err = err.with_entity(entity);
                }
                log_op_error!(
                    op,
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    entity = entity
                );
                Err(err)
            }
        }
    }
}

/// Value of a mapped column; a column left out of `to_row` is an error, not NULL
fn mapped_value<'r>(
    row: &'r Row,
    entity: &str,
    column: &str,
) -> std::result::Result<&'r Value, LedgerXError> {
    row.get(column).ok_or_else(|| LedgerXError::MissingColumn {
        entity: entity.to_string(),
        column: column.to_string(),
    })
}
