//! SELECT construction for joined hierarchies
//!
//! The chain of an entity (root down to the entity itself) is always inner
//! joined on the shared identifier: a row is only an `E` if every table of
//! its chain holds it. Polymorphic plans additionally left join every
//! descendant table, each onto its own parent, and read back which of them
//! matched.

use ledgerx_core::mapping::{EntityDescriptor, Row, Value};

/// What one selected column feeds
#[derive(Debug, Clone, Copy)]
enum Slot {
    Id,
    Column(&'static str),
    /// Key column of the n-th descendant; non-null when that table matched
    DescendantKey(usize),
    DescendantColumn(usize, &'static str),
}

#[derive(Debug)]
pub(crate) struct SelectPlan {
    from: String,
    root: &'static EntityDescriptor,
    slots: Vec<Slot>,
    select_list: Vec<String>,
    descendants: Vec<&'static EntityDescriptor>,
}

/// One decoded result row
#[derive(Debug)]
pub(crate) struct Decoded {
    pub row: Row,
    /// Descendants whose table held the id, in plan order
    pub matched: Vec<&'static EntityDescriptor>,
}

impl SelectPlan {
    /// Inner join of `chain` (root first)
    pub fn joined(chain: &[&'static EntityDescriptor]) -> Self {
        Self::polymorphic(chain, &[])
    }

    /// Inner join of `chain`, left join of `descendants`
    ///
    /// `descendants` must list parents before children.
    pub fn polymorphic(
        chain: &[&'static EntityDescriptor],
        descendants: &[&'static EntityDescriptor],
    ) -> Self {
        let root = chain[0];
        let mut from = format!("{} t0", root.table);
        let mut slots = vec![Slot::Id];
        let mut select_list = vec![format!("t0.{}", root.id_column)];
        let mut aliases: Vec<(&'static str, String)> = Vec::new();

        for (i, entity) in chain.iter().enumerate() {
            let alias = format!("t{}", i);
            if i > 0 {
                from.push_str(&format!(
                    " JOIN {} {} ON {}.{} = t0.{}",
                    entity.table, alias, alias, entity.id_column, root.id_column
                ));
            }
            for column in entity.columns {
                slots.push(Slot::Column(column.name));
                select_list.push(format!("{}.{}", alias, column.name));
            }
            aliases.push((entity.name, alias));
        }

        for (i, entity) in descendants.iter().enumerate() {
            let alias = format!("d{}", i);
            let (parent_alias, parent_key) = entity
                .parent
                .and_then(|parent| {
                    let alias = aliases.iter().find(|(name, _)| *name == parent)?;
                    let key = chain
                        .iter()
                        .chain(descendants.iter())
                        .find(|d| d.name == parent)?
                        .id_column;
                    Some((alias.1.clone(), key))
                })
                .unwrap_or_else(|| ("t0".to_string(), root.id_column));
            from.push_str(&format!(
                " LEFT JOIN {} {} ON {}.{} = {}.{}",
                entity.table, alias, alias, entity.id_column, parent_alias, parent_key
            ));

            slots.push(Slot::DescendantKey(i));
            select_list.push(format!("{}.{}", alias, entity.id_column));
            for column in entity.columns {
                slots.push(Slot::DescendantColumn(i, column.name));
                select_list.push(format!("{}.{}", alias, column.name));
            }
            aliases.push((entity.name, alias));
        }

        Self {
            from,
            root,
            slots,
            select_list,
            descendants: descendants.to_vec(),
        }
    }

    pub fn width(&self) -> usize {
        self.slots.len()
    }

    pub fn by_id(&self) -> String {
        format!(
            "SELECT {} FROM {} WHERE t0.{} = ?1",
            self.select_list.join(", "),
            self.from,
            self.root.id_column
        )
    }

    pub fn all(&self) -> String {
        format!(
            "SELECT {} FROM {} ORDER BY t0.{}",
            self.select_list.join(", "),
            self.from,
            self.root.id_column
        )
    }

    pub fn count(&self) -> String {
        format!("SELECT COUNT(*) FROM {}", self.from)
    }

    pub fn exists(&self) -> String {
        format!(
            "SELECT COUNT(*) FROM {} WHERE t0.{} = ?1",
            self.from, self.root.id_column
        )
    }

    /// Split one result row into entity values and matched descendants
    ///
    /// Columns of descendants that did not match are left out of the row.
    pub fn decode(&self, values: Vec<Value>) -> Decoded {
        let mut row = Row::new();
        let mut present = vec![false; self.descendants.len()];

        for (slot, value) in self.slots.iter().zip(values) {
            match *slot {
                Slot::Id => {
                    if let Value::Integer(id) = value {
                        row.set_id(id);
                    }
                }
                Slot::Column(name) => row.set(name, value),
                Slot::DescendantKey(i) => present[i] = !value.is_null(),
                Slot::DescendantColumn(i, name) => {
                    if present[i] {
                        row.set(name, value);
                    }
                }
            }
        }

        let matched = self
            .descendants
            .iter()
            .zip(present)
            .filter_map(|(d, hit)| hit.then_some(*d))
            .collect();
        Decoded { row, matched }
    }
}
