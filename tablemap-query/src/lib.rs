mod alter;
mod create;
mod delete;
mod insert;
mod predicate;
mod select;
mod update;

pub use alter::AlterTableBuilder;
pub use create::CreateTableBuilder;
pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use predicate::normalize_predicate;
pub use select::SelectBuilder;
pub use update::UpdateBuilder;

#[derive(Debug)]
pub struct QueryBuilder {}

impl QueryBuilder {
    pub fn select(table: &str) -> SelectBuilder {
        SelectBuilder::new(table)
    }

    pub fn insert(table: &str) -> InsertBuilder {
        InsertBuilder::new(table)
    }

    pub fn update(table: &str) -> UpdateBuilder {
        UpdateBuilder::new(table)
    }

    pub fn delete(table: &str) -> DeleteBuilder {
        DeleteBuilder::new(table)
    }

    pub fn create_table(table: &str) -> CreateTableBuilder {
        CreateTableBuilder::new(table)
    }

    pub fn alter_table(table: &str) -> AlterTableBuilder {
        AlterTableBuilder::new(table)
    }

    /// Table lookup, `table` must already be a checked identifier
    ///
    /// # Examples
    ///
    /// ```
    /// use tablemap_query::QueryBuilder;
    ///
    /// assert_eq!(QueryBuilder::show_tables_like("scores"), "SHOW TABLES LIKE 'scores'");
    /// ```
    pub fn show_tables_like(table: &str) -> String {
        format!("SHOW TABLES LIKE '{}'", table)
    }

    pub fn show_columns(table: &str) -> String {
        format!("SHOW COLUMNS FROM {}", table)
    }
}
