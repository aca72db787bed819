use tablemap::{error::Error, extract, ColumnDescriptor, ColumnType, FromValue, Table, ToValue, Value};

#[derive(Debug, Clone, Default, PartialEq)]
struct Address {
    pub city: String,
    pub street: String,
}

impl ToValue for Address {
    fn to_value(&self) -> Value {
        Value::Str(format!("{}#{}", self.city, self.street))
    }
}

impl FromValue for Address {
    type Output = Address;

    fn from_value(v: &Value) -> tablemap::error::Result<Self::Output> {
        let s = String::from_value(v)?;
        let mut arr = s.split('#');
        let city = arr
            .next()
            .ok_or_else(|| tablemap::error::from_value!("Invalid address string"))?;
        let street = arr
            .next()
            .ok_or_else(|| tablemap::error::from_value!("Invalid address string"))?;

        Ok(Self {
            city: city.into(),
            street: street.into(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Rank {
    Bronze,
    Silver,
    Gold,
}

impl Default for Rank {
    fn default() -> Self {
        Self::Bronze
    }
}

tablemap::impl_sql_enum!(Rank {
    Bronze = 0,
    Silver = 1,
    Gold = 2,
});

#[derive(Debug, Default, PartialEq, Table)]
#[tablemap(name = "players")]
struct Player {
    #[tablemap(primary_key, auto_increment)]
    id: u32,
    #[tablemap(length = 32, unique)]
    name: String,
    /// Last login
    #[tablemap(column = "LastSeen")]
    last_seen: Option<chrono::NaiveDateTime>,
    email: Option<String>,
    #[tablemap(ignore)]
    online: bool,
    balance: rust_decimal::Decimal,
    token: uuid::Uuid,
    avatar: Vec<u8>,
    #[tablemap(length = 11)]
    level: i32,
    ratio: f32,
    precise: f64,
    tag: char,
    #[tablemap(enumeration)]
    tier: Rank,
    #[tablemap(column_type = "VARCHAR(100)")]
    address: Address,
}

#[derive(Debug, Default, Table)]
#[tablemap(name = "cards")]
struct Card {
    #[tablemap(primary_key, auto_increment)]
    id: u64,
    #[tablemap(foreign_key("players", "id"))]
    owner: u32,
    #[tablemap(nullable, unsigned)]
    power: i16,
}

#[derive(Debug, Default, Table)]
struct Nameless {
    id: i32,
}

#[derive(Debug, Default, Table)]
#[tablemap(name = "homes")]
struct Home {
    id: i32,
    address: Address,
}

#[test]
fn test_extract_columns() {
    let schema = extract::<Player>().unwrap();
    assert_eq!(schema.table(), "players");

    assert_eq!(
        schema.columns(),
        &[
            ColumnDescriptor::new("id", "INT")
                .unsigned()
                .primary_key()
                .auto_increment(),
            ColumnDescriptor::new("name", "VARCHAR(32)").unique(),
            ColumnDescriptor::new("LastSeen", "DATETIME").nullable(),
            ColumnDescriptor::new("email", "TEXT").nullable(),
            ColumnDescriptor::new("balance", "DECIMAL"),
            ColumnDescriptor::new("token", "LONGTEXT"),
            ColumnDescriptor::new("avatar", "VARBINARY(MAX)"),
            ColumnDescriptor::new("level", "INT(11)"),
            ColumnDescriptor::new("ratio", "REAL"),
            ColumnDescriptor::new("precise", "FLOAT"),
            ColumnDescriptor::new("tag", "CHAR"),
            ColumnDescriptor::new("tier", "INT"),
            ColumnDescriptor::new("address", "VARCHAR(100)"),
        ]
    );

    // Ignored field is not a column
    assert!(schema.column("online").is_none());
    assert_eq!(
        schema.column("lastseen").unwrap().runtime_type().unwrap(),
        ColumnType::DateTime
    );
}

#[test]
fn test_foreign_key() {
    let schema = extract::<Card>().unwrap();
    let owner = schema.column("owner").unwrap();

    assert!(owner.is_foreign_key);
    assert_eq!(owner.foreign_table, "players");
    assert_eq!(owner.foreign_column, "id");
    assert!(owner.is_unsigned);

    let power = schema.column("power").unwrap();
    assert!(power.is_nullable && power.is_unsigned);
    assert_eq!(power.sql_type, "SMALLINT");

    assert_eq!(
        tablemap::reconcile::create_table_sql(&schema).unwrap(),
        "CREATE TABLE cards (id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY, \
         owner INT UNSIGNED NOT NULL, power SMALLINT UNSIGNED, \
         FOREIGN KEY (owner) REFERENCES players(id))"
    );
}

#[test]
fn test_missing_name() {
    assert!(matches!(
        extract::<Nameless>(),
        Err(Error::MissingSchemaName(_))
    ));

    let schema = tablemap::extract_for::<Nameless>("nameless").unwrap();
    assert_eq!(schema.columns().len(), 1);
}

#[test]
fn test_unsupported_type() {
    assert!(matches!(Home::columns(), Err(Error::UnsupportedType(_))));
    assert!(matches!(extract::<Home>(), Err(Error::UnsupportedType(_))));
}

#[test]
fn test_values_order() {
    let card = Card {
        id: 3,
        owner: 7,
        power: -2,
    };

    let names = card.to_values().into_iter().map(|(name, _)| name).collect::<Vec<_>>();
    assert_eq!(names, vec!["id", "owner", "power"]);
}

#[test]
fn test_invalid_identifier() {
    #[derive(Debug, Default, Table)]
    #[tablemap(name = "bad name")]
    struct Bad {
        id: i32,
    }

    assert!(extract::<Bad>().is_err());
}
