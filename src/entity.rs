//! Entity types - the closed set of indexer models that get a relation
//!
//! Every model the indexer persists maps to one `EntityKind`:
//! - `BlockRef`: lightweight (number, hash, parent) link used for reorg tracking
//! - `TransactionRef`: transaction hash to block position lookup
//! - `Transaction`: full transaction body
//! - `ContinuesIndexedRound`: a contiguous range of blocks already indexed
//! - `Block`: block header
//! - `Log`: event log emitted by a transaction

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

/// Indexer entity kinds, one relation each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    BlockRef,
    TransactionRef,
    Transaction,
    ContinuesIndexedRound,
    Block,
    Log,
}

impl EntityKind {
    /// Relation name backing this entity
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::BlockRef => "block_refs",
            EntityKind::TransactionRef => "transaction_refs",
            EntityKind::Transaction => "transactions",
            EntityKind::ContinuesIndexedRound => "continues_indexed_rounds",
            EntityKind::Block => "blocks",
            EntityKind::Log => "logs",
        }
    }

    /// All entity kinds, in registration order
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::BlockRef,
            EntityKind::TransactionRef,
            EntityKind::Transaction,
            EntityKind::ContinuesIndexedRound,
            EntityKind::Block,
            EntityKind::Log,
        ]
    }

    /// Static definition of the relation for this entity
    pub fn descriptor(&self) -> EntityDescriptor {
        match self {
            EntityKind::BlockRef => EntityDescriptor {
                kind: *self,
                relation: self.as_str(),
                columns: vec![
                    Column::integer("number").primary_key(),
                    Column::text("hash").unique(),
                    Column::text("parent_hash"),
                ],
                unique: vec![],
                indexes: vec![],
            },
            EntityKind::TransactionRef => EntityDescriptor {
                kind: *self,
                relation: self.as_str(),
                columns: vec![
                    Column::text("hash").primary_key(),
                    Column::integer("block_number"),
                    Column::integer("transaction_index"),
                ],
                unique: vec![],
                indexes: vec![IndexDef::on(&["block_number"])],
            },
            EntityKind::Transaction => EntityDescriptor {
                kind: *self,
                relation: self.as_str(),
                columns: vec![
                    Column::text("hash").primary_key(),
                    Column::integer("block_number"),
                    Column::text("block_hash"),
                    Column::integer("transaction_index"),
                    Column::text("from_address"),
                    Column::text("to_address").nullable(),
                    Column::text("value"),
                    Column::integer("nonce"),
                    Column::integer("gas"),
                    Column::text("gas_price").nullable(),
                    Column::text("input"),
                    Column::integer("status").nullable(),
                ],
                unique: vec![],
                indexes: vec![
                    IndexDef::on(&["block_number"]),
                    IndexDef::on(&["from_address"]),
                    IndexDef::on(&["to_address"]),
                ],
            },
            EntityKind::ContinuesIndexedRound => EntityDescriptor {
                kind: *self,
                relation: self.as_str(),
                columns: vec![
                    Column::integer("id").primary_key(),
                    Column::integer("start_block"),
                    Column::integer("end_block"),
                    Column::text("updated_at").default("CURRENT_TIMESTAMP"),
                ],
                unique: vec![],
                indexes: vec![],
            },
            EntityKind::Block => EntityDescriptor {
                kind: *self,
                relation: self.as_str(),
                columns: vec![
                    Column::integer("number").primary_key(),
                    Column::text("hash").unique(),
                    Column::text("parent_hash"),
                    Column::integer("timestamp"),
                    Column::text("miner"),
                    Column::integer("gas_used"),
                    Column::integer("gas_limit"),
                    Column::integer("transaction_count").default("0"),
                ],
                unique: vec![],
                indexes: vec![IndexDef::on(&["timestamp"])],
            },
            EntityKind::Log => EntityDescriptor {
                kind: *self,
                relation: self.as_str(),
                columns: vec![
                    Column::integer("id").primary_key(),
                    Column::text("transaction_hash"),
                    Column::integer("block_number"),
                    Column::integer("log_index"),
                    Column::text("address"),
                    Column::text("topics"),
                    Column::text("data"),
                    Column::integer("removed").default("0"),
                ],
                unique: vec![vec!["transaction_hash", "log_index"]],
                indexes: vec![IndexDef::on(&["block_number"]), IndexDef::on(&["address"])],
            },
        }
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "block_refs" | "blockref" | "block_ref" => Ok(EntityKind::BlockRef),
            "transaction_refs" | "transactionref" | "transaction_ref" => Ok(EntityKind::TransactionRef),
            "transactions" | "transaction" | "tx" => Ok(EntityKind::Transaction),
            "continues_indexed_rounds" | "continuesindexedround" | "continues_indexed_round" => {
                Ok(EntityKind::ContinuesIndexedRound)
            }
            "blocks" | "block" => Ok(EntityKind::Block),
            "logs" | "log" => Ok(EntityKind::Log),
            _ => Err(Error::UnknownEntity(s.to_string())),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// SQL storage class of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text,
}

impl ColumnType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Text => "TEXT",
        }
    }
}

/// One column of a relation.
///
/// Columns are `NOT NULL` unless marked `nullable()`. A primary key column is
/// never rendered with an explicit `NOT NULL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    /// Raw SQL default expression
    pub default: Option<&'static str>,
}

impl Column {
    pub fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            nullable: false,
            primary_key: false,
            unique: false,
            default: None,
        }
    }

    pub fn integer(name: &'static str) -> Self {
        Self::new(name, ColumnType::Integer)
    }

    pub fn text(name: &'static str) -> Self {
        Self::new(name, ColumnType::Text)
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default(mut self, expr: &'static str) -> Self {
        self.default = Some(expr);
        self
    }
}

/// Secondary index over one or more columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    pub columns: Vec<&'static str>,
}

impl IndexDef {
    pub fn on(columns: &[&'static str]) -> Self {
        Self {
            columns: columns.to_vec(),
        }
    }
}

/// Static definition of one entity's relation: name, columns and indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub kind: EntityKind,
    pub relation: &'static str,
    pub columns: Vec<Column>,
    /// Composite unique constraints, declared inline with the table
    pub unique: Vec<Vec<&'static str>>,
    pub indexes: Vec<IndexDef>,
}

impl EntityDescriptor {
    /// Check that the descriptor can be rendered into well-formed DDL
    pub fn validate(&self) -> Result<()> {
        if !is_identifier(self.relation) {
            return Err(Error::InvalidDescriptor(format!(
                "invalid relation name {:?}",
                self.relation
            )));
        }
        if self.columns.is_empty() {
            return Err(Error::InvalidDescriptor(format!(
                "relation {} has no columns",
                self.relation
            )));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !is_identifier(column.name) {
                return Err(Error::InvalidDescriptor(format!(
                    "invalid column name {:?} in {}",
                    column.name, self.relation
                )));
            }
            if !seen.insert(column.name) {
                return Err(Error::InvalidDescriptor(format!(
                    "duplicate column {} in {}",
                    column.name, self.relation
                )));
            }
        }

        if self.columns.iter().filter(|c| c.primary_key).count() > 1 {
            return Err(Error::InvalidDescriptor(format!(
                "relation {} declares more than one primary key column",
                self.relation
            )));
        }

        let referenced = self
            .unique
            .iter()
            .map(|cols| cols.as_slice())
            .chain(self.indexes.iter().map(|idx| idx.columns.as_slice()));
        for cols in referenced {
            if cols.is_empty() {
                return Err(Error::InvalidDescriptor(format!(
                    "empty constraint column list in {}",
                    self.relation
                )));
            }
            if let Some(missing) = cols.iter().find(|c| !seen.contains(*c)) {
                return Err(Error::InvalidDescriptor(format!(
                    "constraint on {} references unknown column {}",
                    self.relation, missing
                )));
            }
        }

        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_names() {
        let names: Vec<_> = EntityKind::all().iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "block_refs",
                "transaction_refs",
                "transactions",
                "continues_indexed_rounds",
                "blocks",
                "logs",
            ]
        );
    }

    #[test]
    fn test_all_descriptors_valid() {
        for kind in EntityKind::all() {
            let descriptor = kind.descriptor();
            assert_eq!(descriptor.kind, *kind);
            assert_eq!(descriptor.relation, kind.as_str());
            descriptor.validate().unwrap();
        }
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("blocks".parse::<EntityKind>().unwrap(), EntityKind::Block);
        assert_eq!("BlockRef".parse::<EntityKind>().unwrap(), EntityKind::BlockRef);
        assert_eq!(
            "ContinuesIndexedRound".parse::<EntityKind>().unwrap(),
            EntityKind::ContinuesIndexedRound
        );
        assert!(matches!(
            "receipts".parse::<EntityKind>(),
            Err(Error::UnknownEntity(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_descriptors() {
        let mut descriptor = EntityKind::Log.descriptor();
        descriptor.relation = "logs; DROP TABLE blocks";
        assert!(matches!(descriptor.validate(), Err(Error::InvalidDescriptor(_))));

        let mut descriptor = EntityKind::Log.descriptor();
        descriptor.columns.clear();
        assert!(descriptor.validate().is_err());

        let mut descriptor = EntityKind::Block.descriptor();
        descriptor.columns.push(Column::text("hash"));
        assert!(descriptor.validate().is_err());

        let mut descriptor = EntityKind::Block.descriptor();
        descriptor.columns.push(Column::text("extra").primary_key());
        assert!(descriptor.validate().is_err());

        let mut descriptor = EntityKind::Transaction.descriptor();
        descriptor.indexes.push(IndexDef::on(&["missing"]));
        assert!(descriptor.validate().is_err());
    }

    #[test]
    fn test_column_builders() {
        let descriptor = EntityKind::Transaction.descriptor();
        let to = descriptor.column("to_address").unwrap();
        assert!(to.nullable);
        let hash = descriptor.column("hash").unwrap();
        assert!(hash.primary_key);
        assert!(!hash.nullable);
    }
}
