use tablemap_error::Result;

use crate::normalize_predicate;

#[derive(Debug, Default)]
pub struct SelectBuilder {
    table: String,
    columns: Vec<String>,
    predicate: Option<String>,
    limit: Option<u64>,
}

impl SelectBuilder {
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
    /// let a = QueryBuilder::select("ta")
    ///     .column("a")
    ///     .column("b")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(&a, "SELECT a, b FROM ta");
    /// ```
    pub fn column(&mut self, col: &str) -> &mut Self {
        self.columns.push(col.into());
        self
    }

    /// Set predicate, an empty predicate selects every row
    ///
    /// # Examples
    ///
    /// ```
    /// use tablemap_query::QueryBuilder;
    ///
    /// let sql = QueryBuilder::select("ta")
    ///     .column("*")
    ///     .predicate("where Id = 'a'")
    ///     .limit(1)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(&sql, "SELECT * FROM ta WHERE Id = 'a' LIMIT 1");
    /// ```
    pub fn predicate(&mut self, predicate: &str) -> &mut Self {
        self.predicate = normalize_predicate(predicate);
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    /// Build sql
    pub fn build(&self) -> Result<String> {
        // Validate builder
        self.validate()?;

        let mut parts = Vec::<String>::new();

        // Build prefix
        parts.push("SELECT".into());

        // Build columns
        parts.push(self.columns.join(", "));

        // Build table
        parts.push("FROM".into());
        parts.push(self.table.clone());

        // Build where
        if let Some(pred) = &self.predicate {
            parts.push("WHERE".into());
            parts.push(pred.clone());
        }

        // Build limit
        if let Some(limit) = self.limit {
            parts.push(format!("LIMIT {}", limit));
        }

        Ok(parts.join(" "))
    }

    /// Validate builder
    fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(tablemap_error::query_builder!("Select empty columns"));
        }

        Ok(())
    }
}
