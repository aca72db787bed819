use tablemap_error::Result;

use crate::normalize_predicate;

#[derive(Debug, Default)]
pub struct UpdateBuilder {
    table: String,
    kvs: Vec<(String, String)>,
    predicate: Option<String>,
}

impl UpdateBuilder {
    pub fn new<S>(table: S) -> Self
    where
        S: ToString,
    {
        Self {
            table: table.to_string(),
            ..Default::default()
        }
    }

    /// Append kv pair
    ///
    /// # Examples
    ///
    /// ```
    /// use tablemap_query::QueryBuilder;
    ///
    /// let sql = QueryBuilder::update("ta")
    ///     .set("a", "?")
    ///     .set("b", "'abc'")
    ///     .predicate("id = 1")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(&sql, "UPDATE ta SET a = ?, b = 'abc' WHERE id = 1");
    /// ```
    pub fn set<K, V>(&mut self, col: K, val: V) -> &mut Self
    where
        K: ToString,
        V: ToString,
    {
        self.kvs.push((col.to_string(), val.to_string()));
        self
    }

    /// Set predicate, normalized, see [`normalize_predicate`]
    ///
    /// # Examples
    ///
    /// ```
    /// use tablemap_query::QueryBuilder;
    ///
    /// let sql = QueryBuilder::update("ta")
    ///     .set("a", "?")
    ///     .predicate("WHERE banned = true")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(&sql, "UPDATE ta SET a = ? WHERE banned = 1");
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
        parts.push("UPDATE".into());
        parts.push(self.table.clone());

        // Build kvs
        parts.push("SET".into());
        parts.push(
            self.kvs
                .iter()
                .map(|(k, v)| format!("{} = {}", k, v))
                .collect::<Vec<_>>()
                .join(", "),
        );

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
                "Refuse to update every row of `{}`",
                self.table
            ));
        }

        if self.kvs.is_empty() {
            return Err(tablemap_error::query_builder!("Update empty columns"));
        }

        Ok(())
    }
}
