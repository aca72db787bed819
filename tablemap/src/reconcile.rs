//! Bring a live table in line with a type's schema.

use tablemap_query::QueryBuilder;

use crate::{connection::Session, error::Result, ColumnDescriptor, Row, TypeSchema, Value};

/// Outcome of `ensure_table`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Live table already matched
    Unchanged,
    Created,
    Altered,
    /// A database error occurred, it has been logged
    Failed,
}

impl Reconciliation {
    /// `false` only for [`Reconciliation::Failed`]
    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// Column changes needed to turn the live table into the expected one
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDiff {
    pub add: Vec<ColumnDescriptor>,
    /// (expected, live)
    pub modify: Vec<(ColumnDescriptor, ColumnDescriptor)>,
    pub drop: Vec<String>,
}

impl SchemaDiff {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.modify.is_empty() && self.drop.is_empty()
    }
}

/// Column definition, e.g. `id INT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY`
///
/// `with_primary_key` and `with_unique` control whether those constraints are repeated.
pub fn column_definition(
    desc: &ColumnDescriptor,
    with_primary_key: bool,
    with_unique: bool,
) -> String {
    let mut parts = vec![desc.name.clone(), desc.sql_type.clone()];

    if desc.is_unsigned && !desc.sql_type.to_uppercase().contains("UNSIGNED") {
        parts.push("UNSIGNED".into());
    }
    if !desc.is_nullable || desc.is_primary_key {
        parts.push("NOT NULL".into());
    }
    if desc.should_auto_increment {
        parts.push("AUTO_INCREMENT".into());
    }
    if with_unique && desc.is_unique && !desc.is_primary_key {
        parts.push("UNIQUE".into());
    }
    if with_primary_key && desc.is_primary_key {
        parts.push("PRIMARY KEY".into());
    }

    parts.join(" ")
}

pub fn create_table_sql(schema: &TypeSchema) -> Result<String> {
    let mut builder = QueryBuilder::create_table(schema.table());

    for col in schema.columns() {
        builder.column(column_definition(col, true, true));
    }
    for col in schema.columns().iter().filter(|col| col.is_foreign_key) {
        builder.foreign_key(&col.name, &col.foreign_table, &col.foreign_column);
    }

    builder.build()
}

/// `ALTER TABLE` applying `diff`, `None` when there is nothing to change
pub fn alter_table_sql(schema: &TypeSchema, diff: &SchemaDiff) -> Result<Option<String>> {
    if diff.is_empty() {
        return Ok(None);
    }

    let mut builder = QueryBuilder::alter_table(schema.table());

    for col in &diff.add {
        builder.add(column_definition(col, true, true));
        if col.is_foreign_key {
            builder.add(format!(
                "FOREIGN KEY ({}) REFERENCES {}({})",
                col.name, col.foreign_table, col.foreign_column
            ));
        }
    }

    for (expected, live) in &diff.modify {
        let drops_primary_key = live.is_primary_key && !expected.is_primary_key;

        // MODIFY keeps existing keys, repeating one would be rejected as a duplicate
        builder.modify(column_definition(
            expected,
            !live.is_primary_key,
            !live.is_unique && (!live.is_primary_key || drops_primary_key),
        ));

        if drops_primary_key {
            builder.drop_primary_key();
        }
        // A column level UNIQUE index is named after its column
        if live.is_unique && !expected.is_unique && !expected.is_primary_key {
            builder.drop_index(&live.name);
        }
    }

    for name in &diff.drop {
        builder.drop_column(name);
    }

    Ok(Some(builder.build()?))
}

/// Parse `SHOW COLUMNS` rows into descriptors
pub fn live_columns(rows: &[Row]) -> Result<Vec<ColumnDescriptor>> {
    let mut columns = vec![];

    for row in rows {
        let name = row.get::<String>("Field")?;
        let sql_type = row.get::<String>("Type")?;
        let null = row.get::<Option<String>>("Null")?.unwrap_or_default();
        let key = row.get::<Option<String>>("Key")?.unwrap_or_default();
        let extra = row.get::<Option<String>>("Extra")?.unwrap_or_default();

        let mut desc = ColumnDescriptor::new(name, sql_type);
        if null.eq_ignore_ascii_case("YES") {
            desc = desc.nullable();
        }
        if key.eq_ignore_ascii_case("PRI") {
            desc = desc.primary_key();
        } else if key.eq_ignore_ascii_case("UNI") {
            desc = desc.unique();
        }
        if extra.to_lowercase().contains("auto_increment") {
            desc = desc.auto_increment();
        }

        columns.push(desc);
    }

    Ok(columns)
}

/// Classify columns into ADD, MODIFY and DROP, names compare case-insensitively
pub fn diff(schema: &TypeSchema, live: &[ColumnDescriptor]) -> Result<SchemaDiff> {
    let mut diff = SchemaDiff::default();
    let has_primary_key = schema.columns().iter().any(|col| col.is_primary_key);

    for expected in schema.columns() {
        match live
            .iter()
            .find(|col| col.name.eq_ignore_ascii_case(&expected.name))
        {
            None => diff.add.push(expected.clone()),
            Some(current) => {
                let current = reported_key(expected, current, has_primary_key);
                if differs(expected, &current)? {
                    diff.modify.push((expected.clone(), current));
                }
            }
        }
    }

    for current in live {
        if schema.column(&current.name).is_none() {
            diff.drop.push(current.name.clone());
        }
    }

    Ok(diff)
}

/// MySQL reports a `NOT NULL UNIQUE` column of a table without primary key as `PRI`
fn reported_key(
    expected: &ColumnDescriptor,
    current: &ColumnDescriptor,
    has_primary_key: bool,
) -> ColumnDescriptor {
    let mut current = current.clone();

    if !has_primary_key && current.is_primary_key && expected.is_unique {
        current.is_primary_key = false;
        current.is_unique = true;
    }

    current
}

fn differs(expected: &ColumnDescriptor, current: &ColumnDescriptor) -> Result<bool> {
    // MySQL reports a primary key neither unique nor nullable
    let flags = |col: &ColumnDescriptor| {
        (
            col.is_primary_key,
            col.is_unique && !col.is_primary_key,
            col.is_nullable && !col.is_primary_key,
            col.is_unsigned,
            col.should_auto_increment,
        )
    };

    let type_changed = expected.runtime_type()? != current.runtime_type()?;

    Ok(type_changed || flags(expected) != flags(current))
}

pub(crate) async fn table_exists(session: &Session, table: &str) -> Result<bool> {
    let rows = session
        .query(&QueryBuilder::show_tables_like(table), vec![])
        .await?;

    // `_` and `%` are wildcards for LIKE
    Ok(rows.iter().any(|row| {
        row.columns()
            .filter_map(|col| row.value(col))
            .any(|v| matches!(v.as_text(), Some(name) if name == table))
    }))
}

pub(crate) async fn run(session: &Session, schema: &TypeSchema) -> Result<Reconciliation> {
    if !table_exists(session, schema.table()).await? {
        let sql = create_table_sql(schema)?;
        session.execute(&sql, vec![]).await?;
        log::debug!("Created table `{}`", schema.table());

        return Ok(Reconciliation::Created);
    }

    let rows = session
        .query(&QueryBuilder::show_columns(schema.table()), Vec::<Value>::new())
        .await?;
    let live = live_columns(&rows)?;
    let diff = diff(schema, &live)?;

    log::debug!(
        "Table `{}`: {} to add, {} to modify, {} to drop",
        schema.table(),
        diff.add.len(),
        diff.modify.len(),
        diff.drop.len()
    );

    match alter_table_sql(schema, &diff)? {
        Some(sql) => {
            session.execute(&sql, vec![]).await?;
            Ok(Reconciliation::Altered)
        }
        None => Ok(Reconciliation::Unchanged),
    }
}
