use tablemap_error::Result;

#[derive(Debug, Default)]
pub struct CreateTableBuilder {
    table: String,
    definitions: Vec<String>,
    foreign_keys: Vec<(String, String, String)>, // (column, foreign table, foreign column)
}

impl CreateTableBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    /// Append column definition, e.g. `id INT UNSIGNED NOT NULL PRIMARY KEY`
    pub fn column<S: ToString>(&mut self, definition: S) -> &mut Self {
        self.definitions.push(definition.to_string());
        self
    }

    /// Append foreign key constraint
    ///
    /// # Examples
    ///
    /// ```
    /// use tablemap_query::QueryBuilder;
    ///
    /// let sql = QueryBuilder::create_table("cards")
    ///     .column("Id INT NOT NULL PRIMARY KEY")
    ///     .column("Owner INT NOT NULL")
    ///     .foreign_key("Owner", "players", "Id")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(
    ///     &sql,
    ///     "CREATE TABLE cards (Id INT NOT NULL PRIMARY KEY, Owner INT NOT NULL, FOREIGN KEY (Owner) REFERENCES players(Id))"
    /// );
    /// ```
    pub fn foreign_key(&mut self, column: &str, table: &str, foreign_column: &str) -> &mut Self {
        self.foreign_keys
            .push((column.into(), table.into(), foreign_column.into()));
        self
    }

    /// Build sql
    pub fn build(&self) -> Result<String> {
        // Validate builder
        self.validate()?;

        let mut entries = self.definitions.clone();
        entries.extend(self.foreign_keys.iter().map(|(col, table, foreign_col)| {
            format!("FOREIGN KEY ({}) REFERENCES {}({})", col, table, foreign_col)
        }));

        Ok(format!(
            "CREATE TABLE {table} ({entries})",
            table = self.table,
            entries = entries.join(", ")
        ))
    }

    /// Validate builder
    fn validate(&self) -> Result<()> {
        if self.definitions.is_empty() {
            return Err(tablemap_error::query_builder!(
                "Create table `{}` without columns",
                self.table
            ));
        }

        Ok(())
    }
}
