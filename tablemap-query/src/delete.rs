use tablemap_error::Result;

use crate::normalize_predicate;

#[derive(Debug, Default)]
pub struct DeleteBuilder {
    table: String,
    predicate: Option<String>,
}

impl DeleteBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    /// Set predicate
    ///
    /// # Examples
    ///
    /// ```
    /// use tablemap_query::QueryBuilder;
    ///
    /// let sql = QueryBuilder::delete("ta")
    ///     .predicate("a > 1 AND b < 5")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(&sql, "DELETE FROM ta WHERE a > 1 AND b < 5");
    /// ```
    pub fn predicate(&mut self, predicate: &str) -> &mut Self {
        self.predicate = normalize_predicate(predicate);
        self
    }

    /// Build sql
    pub fn build(&self) -> Result<String> {
        // Validate builder
        self.validate()?;

        let mut parts = Vec::<String>::new();

        // Build prefix
        parts.push("DELETE".into());

        // Build table
        parts.push("FROM".into());
        parts.push(self.table.clone());

        // Build where
        if let Some(pred) = &self.predicate {
            parts.push("WHERE".into());
            parts.push(pred.clone());
        }

        Ok(parts.join(" "))
    }

    /// Validate builder
    fn validate(&self) -> Result<()> {
        if self.predicate.is_none() {
            return Err(tablemap_error::missing_predicate!(
                "Refuse to delete every row of `{}`",
                self.table
            ));
        }

        Ok(())
    }
}
