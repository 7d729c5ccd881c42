use crate::storage::SchemaStatus;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Relation")]
    pub relation: String,
    #[tabled(rename = "Rows")]
    pub rows: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, relation: &str, rows: &str) {
        self.rows.push(TableRow {
            relation: relation.to_string(),
            rows: rows.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn status_table(status: &SchemaStatus) -> String {
    let mut builder = TableBuilder::new();
    for r in &status.relations {
        let rows = r.rows.map(|n| n.to_string()).unwrap_or_else(|| "missing".to_string());
        builder.add_row(r.relation, &rows);
    }
    builder.build()
}
