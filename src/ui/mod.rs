pub mod icons;
pub mod output;
pub mod table;

pub use icons::Icons;
pub use output::{dim, header, info, relation_missing, relation_present, section, success};
pub use table::{TableBuilder, status_table};
