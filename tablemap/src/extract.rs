use crate::{error::Result, Table, TypeSchema};

/// Schema of `T` under its declared table name
pub fn extract<T: Table>() -> Result<TypeSchema> {
    let table = T::TABLE_NAME.ok_or_else(|| {
        crate::error::missing_schema_name!(
            "Type `{}` declares no table name",
            std::any::type_name::<T>()
        )
    })?;

    extract_for::<T>(table)
}

/// Schema of `T` stored under another table name
pub fn extract_for<T: Table>(table: &str) -> Result<TypeSchema> {
    TypeSchema::new(table, T::columns()?)
}
