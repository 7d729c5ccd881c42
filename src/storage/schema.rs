//! DDL rendering for entity descriptors

use crate::entity::{Column, EntityDescriptor, IndexDef};
use crate::registrar::{CreateTableOptions, register};

/// SQL to create the relation for `descriptor`
pub fn create_table_sql(descriptor: &EntityDescriptor, options: &CreateTableOptions) -> String {
    let mut defs: Vec<String> = descriptor.columns.iter().map(column_sql).collect();
    for cols in &descriptor.unique {
        defs.push(format!("UNIQUE({})", cols.join(", ")));
    }

    format!(
        "CREATE TABLE {}{} (\n    {}\n)",
        if_not_exists(options),
        descriptor.relation,
        defs.join(",\n    ")
    )
}

/// SQL to create one secondary index of `descriptor`
pub fn create_index_sql(
    descriptor: &EntityDescriptor,
    index: &IndexDef,
    options: &CreateTableOptions,
) -> String {
    format!(
        "CREATE INDEX {}{} ON {}({})",
        if_not_exists(options),
        index_name(descriptor, index),
        descriptor.relation,
        index.columns.join(", ")
    )
}

/// Index names follow `idx_<relation>_<col>[_<col>...]`
pub fn index_name(descriptor: &EntityDescriptor, index: &IndexDef) -> String {
    format!("idx_{}_{}", descriptor.relation, index.columns.join("_"))
}

/// The table statement followed by its index statements
pub fn statements_for(descriptor: &EntityDescriptor, options: &CreateTableOptions) -> Vec<String> {
    let mut stmts = vec![create_table_sql(descriptor, options)];
    stmts.extend(
        descriptor
            .indexes
            .iter()
            .map(|idx| create_index_sql(descriptor, idx, options)),
    );
    stmts
}

/// All schema creation statements for the registry, in registration order
pub fn render_schema() -> String {
    let options = CreateTableOptions::default();
    register()
        .iter()
        .flat_map(|d| statements_for(d, &options))
        .map(|stmt| format!("{};\n", stmt))
        .collect::<Vec<_>>()
        .join("\n")
}

fn column_sql(column: &Column) -> String {
    let mut sql = format!("{} {}", column.name, column.ty.as_sql());
    if column.primary_key {
        sql.push_str(" PRIMARY KEY");
    } else if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    if column.unique {
        sql.push_str(" UNIQUE");
    }
    if let Some(default) = column.default {
        sql.push_str(" DEFAULT ");
        sql.push_str(default);
    }
    sql
}

fn if_not_exists(options: &CreateTableOptions) -> &'static str {
    if options.if_not_exists { "IF NOT EXISTS " } else { "" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;

    #[test]
    fn test_create_table_sql() {
        let sql = create_table_sql(&EntityKind::BlockRef.descriptor(), &CreateTableOptions::default());
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS block_refs (\n    number INTEGER PRIMARY KEY,\n    hash TEXT NOT NULL UNIQUE,\n    parent_hash TEXT NOT NULL\n)"
        );
    }

    #[test]
    fn test_without_if_not_exists() {
        let options = CreateTableOptions { if_not_exists: false };
        let sql = create_table_sql(&EntityKind::Block.descriptor(), &options);
        assert!(sql.starts_with("CREATE TABLE blocks ("));
    }

    #[test]
    fn test_unique_and_defaults() {
        let sql = create_table_sql(&EntityKind::Log.descriptor(), &CreateTableOptions::default());
        assert!(sql.contains("removed INTEGER NOT NULL DEFAULT 0"));
        assert!(sql.contains("UNIQUE(transaction_hash, log_index)"));

        let sql = create_table_sql(&EntityKind::Transaction.descriptor(), &CreateTableOptions::default());
        assert!(sql.contains("to_address TEXT,"));
    }

    #[test]
    fn test_index_sql() {
        let descriptor = EntityKind::Transaction.descriptor();
        let options = CreateTableOptions::default();
        let stmts = statements_for(&descriptor, &options);
        assert_eq!(stmts.len(), 4);
        assert_eq!(
            stmts[1],
            "CREATE INDEX IF NOT EXISTS idx_transactions_block_number ON transactions(block_number)"
        );

        let composite = IndexDef::on(&["block_hash", "transaction_index"]);
        assert_eq!(
            create_index_sql(&descriptor, &composite, &options),
            "CREATE INDEX IF NOT EXISTS idx_transactions_block_hash_transaction_index ON transactions(block_hash, transaction_index)"
        );
    }

    #[test]
    fn test_render_schema_order() {
        let schema = render_schema();
        let positions: Vec<usize> = EntityKind::all()
            .iter()
            .map(|k| {
                schema
                    .find(&format!("CREATE TABLE IF NOT EXISTS {} (", k.as_str()))
                    .unwrap()
            })
            .collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
    }
}
