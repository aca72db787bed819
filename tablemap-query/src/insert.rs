use tablemap_error::Result;

#[derive(Debug, Default)]
pub struct InsertBuilder {
    table: String,
    columns: Vec<String>,
    values_list: Vec<Vec<String>>,
}

impl InsertBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    /// Append column
    ///
    /// # Examples
    ///
    /// ```
    /// use tablemap_query::QueryBuilder;
    ///
    /// let sql = QueryBuilder::insert("ta")
    ///     .column("a")
    ///     .column("b")
    ///     .values(["?", "?"])
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(&sql, "INSERT INTO ta (a, b) VALUES (?, ?)");
    /// ```
    pub fn column(&mut self, col: &str) -> &mut Self {
        self.columns.push(col.into());
        self
    }

    /// Set columns
    ///
    /// # Examples
    ///
    /// ```
    /// use tablemap_query::QueryBuilder;
    ///
    /// let sql = QueryBuilder::insert("ta")
    ///     .columns(["a", "b", "c"])
    ///     .values(["1", "2", "'abc'"])
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(&sql, "INSERT INTO ta (a, b, c) VALUES (1, 2, 'abc')");
    /// ```
    pub fn columns<T, S>(&mut self, cols: T) -> &mut Self
    where
        T: IntoIterator<Item = S>,
        S: ToString,
    {
        self.columns = cols.into_iter().map(|s| s.to_string()).collect();
        self
    }

    /// Append one value tuple, every tuple shares the column list
    ///
    /// # Examples
    ///
    /// ```
    /// use tablemap_query::QueryBuilder;
    ///
    /// let sql = QueryBuilder::insert("ta")
    ///     .columns(["a", "b"])
    ///     .values(["?", "?"])
    ///     .values(["?", "?"])
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(&sql, "INSERT INTO ta (a, b) VALUES (?, ?), (?, ?)");
    /// ```
    pub fn values<T, S>(&mut self, values: T) -> &mut Self
    where
        T: IntoIterator<Item = S>,
        S: ToString,
    {
        self.values_list
            .push(values.into_iter().map(|v| v.to_string()).collect());
        self
    }

    /// Build sql
    pub fn build(&self) -> Result<String> {
        // Validate builder
        self.validate()?;

        let mut parts = Vec::<String>::new();

        // Build prefix
        parts.push(format!("INSERT INTO {}", self.table));

        // Build columns
        parts.push(format!("({})", self.columns.join(", ")));

        // Build values
        parts.push("VALUES".into());
        parts.push(
            self.values_list
                .iter()
                .map(|values| format!("({})", values.join(", ")))
                .collect::<Vec<String>>()
                .join(", "),
        );

        Ok(parts.join(" "))
    }

    /// Validate builder
    fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(tablemap_error::query_builder!("Insert empty columns"));
        }

        if self.values_list.is_empty() {
            return Err(tablemap_error::query_builder!("Empty values list"));
        }

        for values in &self.values_list {
            if values.len() != self.columns.len() {
                return Err(tablemap_error::query_builder!(
                    "Columns and values length mismatch"
                ));
            }
        }

        Ok(())
    }
}
