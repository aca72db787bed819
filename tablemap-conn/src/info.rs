use tablemap_error::Result;

use crate::ColumnType;

/// One mapped column.
///
/// Built with the chained setters, e.g.
/// `ColumnDescriptor::new("id", "INT").unsigned().primary_key().auto_increment()`.
#[derive(Debug, Clone, Default)]
pub struct ColumnDescriptor {
    pub name: String,
    pub sql_type: String,
    pub is_nullable: bool,
    pub is_unique: bool,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub is_unsigned: bool,
    pub should_auto_increment: bool,
    pub foreign_table: String,
    pub foreign_column: String,
}

impl ColumnDescriptor {
    /// Descriptor of `sql_type`, unsigned when the type names `UNSIGNED` itself
    pub fn new<N, T>(name: N, sql_type: T) -> Self
    where
        N: ToString,
        T: ToString,
    {
        let sql_type = sql_type.to_string();

        Self {
            name: name.to_string(),
            is_unsigned: sql_type
                .split(|c: char| !c.is_ascii_alphanumeric())
                .any(|word| word.eq_ignore_ascii_case("UNSIGNED")),
            sql_type,
            ..Default::default()
        }
    }

    /// Column with the default SQL type of `ty`, unsigned when `ty` is an unsigned type
    pub fn of<N: ToString>(name: N, ty: ColumnType) -> Self {
        Self {
            is_unsigned: ty.is_unsigned(),
            ..Self::new(name, ty.sql_type(None))
        }
    }

    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn unsigned(mut self) -> Self {
        self.is_unsigned = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.should_auto_increment = true;
        self
    }

    pub fn foreign_key<T, C>(mut self, table: T, column: C) -> Self
    where
        T: ToString,
        C: ToString,
    {
        self.is_foreign_key = true;
        self.foreign_table = table.to_string();
        self.foreign_column = column.to_string();
        self
    }

    /// Runtime type implied by `sql_type`
    pub fn runtime_type(&self) -> Result<ColumnType> {
        ColumnType::from_sql_type(&self.sql_type)
    }
}

// Foreign key fields are not part of equality, live introspection cannot recover them
impl PartialEq for ColumnDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.sql_type == other.sql_type
            && self.is_nullable == other.is_nullable
            && self.is_unique == other.is_unique
            && self.is_primary_key == other.is_primary_key
            && self.is_unsigned == other.is_unsigned
            && self.should_auto_increment == other.should_auto_increment
    }
}

impl Eq for ColumnDescriptor {}

/// Table name plus the ordered columns of a mapped type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSchema {
    table: String,
    columns: Vec<ColumnDescriptor>,
}

impl TypeSchema {
    pub fn new<S: ToString>(table: S, columns: Vec<ColumnDescriptor>) -> Result<Self> {
        let table = table.to_string();
        check_identifier(&table)?;

        for (index, col) in columns.iter().enumerate() {
            check_identifier(&col.name)?;

            if col.sql_type.trim().is_empty() {
                return Err(tablemap_error::argument!(
                    "Column `{}` of `{}` has empty sql type",
                    col.name,
                    table
                ));
            }

            if columns[..index]
                .iter()
                .any(|prev| prev.name.eq_ignore_ascii_case(&col.name))
            {
                return Err(tablemap_error::argument!(
                    "Duplicate column `{}` in `{}`",
                    col.name,
                    table
                ));
            }

            if col.is_foreign_key {
                if col.foreign_table.is_empty() || col.foreign_column.is_empty() {
                    return Err(tablemap_error::argument!(
                        "Foreign key `{}` of `{}` must name table and column",
                        col.name,
                        table
                    ));
                }
                check_identifier(&col.foreign_table)?;
                check_identifier(&col.foreign_column)?;
            }
        }

        Ok(Self { table, columns })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns
            .iter()
            .find(|col| col.name.eq_ignore_ascii_case(name))
    }

    /// Columns written by insert and full-value update
    pub fn writable_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|col| !col.should_auto_increment)
    }
}

/// Names are spliced into SQL text, so only plain identifiers are accepted
pub fn check_identifier(name: &str) -> Result<()> {
    if !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    {
        Ok(())
    } else {
        Err(tablemap_error::argument!("Invalid identifier `{}`", name))
    }
}
