//! Validated registry of mapped entities
//!
//! `MappingModelBuilder` collects descriptors in registration order and
//! `build()` checks the hierarchy before anything touches a database.

use std::collections::{BTreeMap, BTreeSet};

use super::descriptor::EntityDescriptor;
use super::entity::Entity;
use crate::errors::{LedgerXError, Result};

/// Collects entity descriptors prior to validation
#[derive(Debug, Clone, Default)]
pub struct MappingModelBuilder {
    entities: Vec<&'static EntityDescriptor>,
}

impl MappingModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapped entity type
    pub fn add<E: Entity>(self) -> Self {
        self.add_descriptor(E::descriptor())
    }

    pub fn add_descriptor(mut self, descriptor: &'static EntityDescriptor) -> Self {
        self.entities.push(descriptor);
        self
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Validate the hierarchy and freeze it
    ///
    /// # Errors
    ///
    /// - `EmptyModel` when nothing was registered
    /// - `DuplicateEntity` / `DuplicateTable` for repeated names
    /// - `UnknownParent` when a parent was not registered
    /// - `InheritanceCycle` when parent links loop
    /// - `ColumnCollision` when a column repeats along a chain
    pub fn build(self) -> Result<MappingModel> {
        if self.entities.is_empty() {
            return Err(LedgerXError::EmptyModel);
        }

        let mut index = BTreeMap::new();
        let mut tables: BTreeMap<&'static str, &'static str> = BTreeMap::new();
        for (pos, descriptor) in self.entities.iter().enumerate() {
            if index.insert(descriptor.name, pos).is_some() {
                return Err(LedgerXError::DuplicateEntity {
                    entity: descriptor.name.to_string(),
                });
            }
            if let Some(first) = tables.insert(descriptor.table, descriptor.name) {
                return Err(LedgerXError::DuplicateTable {
                    table: descriptor.table.to_string(),
                    first: first.to_string(),
                    second: descriptor.name.to_string(),
                });
            }
        }

        let model = MappingModel {
            entities: self.entities,
            index,
        };

        for descriptor in &model.entities {
            if let Some(parent) = descriptor.parent {
                if !model.index.contains_key(parent) {
                    return Err(LedgerXError::UnknownParent {
                        entity: descriptor.name.to_string(),
                        parent: parent.to_string(),
                    });
                }
            }
        }

        for descriptor in &model.entities {
            // chain() walks parent links and reports cycles
            let chain = model.chain(descriptor.name)?;
            let ids: BTreeSet<&str> = chain.iter().map(|d| d.id_column).collect();
            let mut seen = BTreeSet::new();
            for column in chain.iter().flat_map(|d| d.columns.iter()) {
                if ids.contains(column.name) || !seen.insert(column.name) {
                    return Err(LedgerXError::ColumnCollision {
                        entity: descriptor.name.to_string(),
                        column: column.name.to_string(),
                    });
                }
            }
        }

        Ok(model)
    }
}

/// Immutable, validated set of mapped entities
#[derive(Debug, Clone)]
pub struct MappingModel {
    entities: Vec<&'static EntityDescriptor>,
    index: BTreeMap<&'static str, usize>,
}

impl MappingModel {
    pub fn builder() -> MappingModelBuilder {
        MappingModelBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities in registration order
    pub fn entities(&self) -> impl Iterator<Item = &'static EntityDescriptor> + '_ {
        self.entities.iter().copied()
    }

    pub fn entity(&self, name: &str) -> Option<&'static EntityDescriptor> {
        self.index.get(name).map(|&pos| self.entities[pos])
    }

    /// Like [`entity`](Self::entity) but fails with `UnmappedEntity`
    pub fn require(&self, name: &str) -> Result<&'static EntityDescriptor> {
        self.entity(name).ok_or_else(|| LedgerXError::UnmappedEntity {
            entity: name.to_string(),
        })
    }

    pub fn contains(&self, descriptor: &EntityDescriptor) -> bool {
        self.entity(descriptor.name)
            .map(|d| d == descriptor)
            .unwrap_or(false)
    }

    /// Entities from the hierarchy root down to `name`, inclusive
    pub fn chain(&self, name: &str) -> Result<Vec<&'static EntityDescriptor>> {
        let mut chain = vec![self.require(name)?];
        while let Some(parent) = chain[chain.len() - 1].parent {
            if chain.len() > self.entities.len() {
                return Err(LedgerXError::InheritanceCycle {
                    entity: name.to_string(),
                });
            }
            chain.push(self.require(parent)?);
        }
        chain.reverse();
        Ok(chain)
    }

    /// Root of the hierarchy `name` belongs to
    pub fn root_of(&self, name: &str) -> Result<&'static EntityDescriptor> {
        Ok(self.chain(name)?[0])
    }

    /// Number of ancestors above `name`
    pub fn depth(&self, name: &str) -> Result<usize> {
        Ok(self.chain(name)?.len() - 1)
    }

    /// Direct subclasses, in registration order
    pub fn subclasses(&self, name: &str) -> Vec<&'static EntityDescriptor> {
        self.entities
            .iter()
            .copied()
            .filter(|d| d.parent == Some(name))
            .collect()
    }

    /// All subclasses below `name`, parents before children
    pub fn descendants(&self, name: &str) -> Vec<&'static EntityDescriptor> {
        let mut out = Vec::new();
        let mut stack: Vec<&'static EntityDescriptor> =
            self.subclasses(name).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.subclasses(next.name).into_iter().rev());
        }
        out
    }

    /// Root tables first; a table never precedes the table it references
    pub fn tables_in_creation_order(&self) -> Vec<&'static EntityDescriptor> {
        let mut ordered: Vec<(usize, &'static EntityDescriptor)> = self
            .entities
            .iter()
            .map(|d| (self.depth(d.name).unwrap_or(0), *d))
            .collect();
        // stable: siblings keep registration order
        ordered.sort_by_key(|(depth, _)| *depth);
        ordered.into_iter().map(|(_, d)| d).collect()
    }

    pub fn tables_in_drop_order(&self) -> Vec<&'static EntityDescriptor> {
        let mut ordered = self.tables_in_creation_order();
        ordered.reverse();
        ordered
    }
}
