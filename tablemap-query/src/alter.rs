use tablemap_error::Result;

#[derive(Debug, Default)]
pub struct AlterTableBuilder {
    table: String,
    adds: Vec<String>,
    modifies: Vec<String>,
    key_drops: Vec<String>,
    drops: Vec<String>,
}

impl AlterTableBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    /// Append `ADD` clause, `definition` is a column definition or a constraint
    pub fn add<S: ToString>(&mut self, definition: S) -> &mut Self {
        self.adds.push(definition.to_string());
        self
    }

    /// Append `MODIFY` clause
    pub fn modify<S: ToString>(&mut self, definition: S) -> &mut Self {
        self.modifies.push(definition.to_string());
        self
    }

    /// Append `DROP PRIMARY KEY` clause
    pub fn drop_primary_key(&mut self) -> &mut Self {
        self.key_drops.push("PRIMARY KEY".into());
        self
    }

    /// Append `DROP INDEX` clause
    pub fn drop_index<S: ToString>(&mut self, index: S) -> &mut Self {
        self.key_drops.push(format!("INDEX {}", index.to_string()));
        self
    }

    /// Append `DROP COLUMN` clause
    pub fn drop_column<S: ToString>(&mut self, column: S) -> &mut Self {
        self.drops.push(column.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.adds.is_empty()
            && self.modifies.is_empty()
            && self.key_drops.is_empty()
            && self.drops.is_empty()
    }

    /// Build sql, clauses are ordered adds, modifies, key drops, column drops whatever the call
    /// order
    ///
    /// # Examples
    ///
    /// ```
    /// use tablemap_query::QueryBuilder;
    ///
    /// let sql = QueryBuilder::alter_table("scores")
    ///     .drop_column("legacy")
    ///     .drop_index("Player")
    ///     .modify("Score BIGINT NOT NULL")
    ///     .add("Rank INT NOT NULL")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(
    ///     &sql,
    ///     "ALTER TABLE scores ADD Rank INT NOT NULL, MODIFY Score BIGINT NOT NULL, \
    ///      DROP INDEX Player, DROP COLUMN legacy"
    /// );
    /// ```
    pub fn build(&self) -> Result<String> {
        // Validate builder
        self.validate()?;

        let clauses = self
            .adds
            .iter()
            .map(|def| format!("ADD {}", def))
            .chain(self.modifies.iter().map(|def| format!("MODIFY {}", def)))
            .chain(self.key_drops.iter().map(|key| format!("DROP {}", key)))
            .chain(self.drops.iter().map(|col| format!("DROP COLUMN {}", col)))
            .collect::<Vec<_>>();

        Ok(format!("ALTER TABLE {} {}", self.table, clauses.join(", ")))
    }

    /// Validate builder
    fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(tablemap_error::query_builder!(
                "Alter table `{}` without clauses",
                self.table
            ));
        }

        Ok(())
    }
}
