use tablemap_error::Result;

/// Runtime type of a mapped column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Decimal,
    Char,
    Str,
    DateTime,
    Uuid,
    Bytes,
}

impl ColumnType {
    /// SQL type used when creating a column of this type.
    ///
    /// `length` only affects `INT(n)` and `VARCHAR(n)`.
    pub fn sql_type(&self, length: Option<usize>) -> String {
        match self {
            Self::Bool => "BOOL".into(),
            Self::I8 | Self::U8 => "TINYINT".into(),
            Self::I16 | Self::U16 => "SMALLINT".into(),
            Self::I32 | Self::U32 => match length {
                Some(len) => format!("INT({})", len),
                None => "INT".into(),
            },
            Self::I64 | Self::U64 => "BIGINT".into(),
            Self::F32 => "REAL".into(),
            Self::F64 => "FLOAT".into(),
            Self::Decimal => "DECIMAL".into(),
            Self::Char => "CHAR".into(),
            Self::Str => match length {
                Some(len) => format!("VARCHAR({})", len),
                None => "TEXT".into(),
            },
            Self::DateTime => "DATETIME".into(),
            Self::Uuid => "LONGTEXT".into(),
            Self::Bytes => "VARBINARY(MAX)".into(),
        }
    }

    /// Runtime type implied by a SQL type string, as written in a schema or reported by
    /// `SHOW COLUMNS`.
    ///
    /// Integer types resolve to their signed variant, text types (including the uuid
    /// `LONGTEXT`) to `Str`; signedness is carried by the column's unsigned flag.
    pub fn from_sql_type(sql_type: &str) -> Result<Self> {
        let normalized = sql_type
            .split_whitespace()
            .filter(|word| {
                !word.eq_ignore_ascii_case("unsigned") && !word.eq_ignore_ascii_case("zerofill")
            })
            .collect::<String>()
            .to_ascii_uppercase();

        if normalized == "TINYINT(1)" {
            return Ok(Self::Bool);
        }

        let base = match normalized.find('(') {
            Some(pos) => &normalized[..pos],
            None => normalized.as_str(),
        };

        let ty = match base {
            "BOOL" | "BOOLEAN" | "BIT" => Self::Bool,
            "TINYINT" => Self::I8,
            "SMALLINT" => Self::I16,
            "INT" | "INTEGER" | "MEDIUMINT" => Self::I32,
            "BIGINT" => Self::I64,
            // MySQL reports REAL columns as DOUBLE
            "REAL" | "DOUBLE" => Self::F32,
            "FLOAT" => Self::F64,
            "DECIMAL" | "NUMERIC" | "DEC" => Self::Decimal,
            "CHAR" => Self::Char,
            "VARCHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" => Self::Str,
            "DATETIME" | "TIMESTAMP" | "DATE" => Self::DateTime,
            "VARBINARY" | "BINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
                Self::Bytes
            }
            _ => {
                return Err(tablemap_error::unsupported_sql_type!(
                    "Cannot map sql type `{}`",
                    sql_type
                ))
            }
        };

        Ok(ty)
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    /// Column holds text
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Char | Self::Str)
    }

    /// Column text goes through the quote escape, a single `CHAR` has no room for it
    pub fn is_escaped(&self) -> bool {
        matches!(self, Self::Str)
    }
}
