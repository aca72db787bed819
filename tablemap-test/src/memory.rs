use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

use sqlparser::{
    ast::{
        self, AlterTableOperation, AssignmentTarget, BinaryOperator, ColumnOption, DataType, Expr,
        FromTable, Ident, LimitClause, ObjectName, SetExpr, ShowStatementFilter,
        ShowStatementFilterPosition, TableFactor, TableObject, TableWithJoins, UnaryOperator,
    },
    dialect::MySqlDialect,
    parser::Parser,
    tokenizer::{Token, Tokenizer},
};
use tablemap::{
    error::Result, BlockingEngine, Connection, Connector, Driver, Engine, Row, Value,
    DATETIME_FORMAT,
};

/// Statement received by a memory connection
#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Debug, Clone)]
struct Column {
    name: String,
    ty: String,
    nullable: bool,
    primary: bool,
    unique: bool,
    auto_increment: bool,
}

impl Column {
    fn from_def<'a, I>(name: &Ident, data_type: &DataType, options: I) -> Self
    where
        I: IntoIterator<Item = &'a ColumnOption>,
    {
        let ty = data_type.to_string().to_uppercase();
        let (ty, unsigned) = match ty.strip_suffix(" UNSIGNED") {
            Some(base) => (base.to_string(), true),
            None => (ty, false),
        };

        let mut column = Self {
            name: name.value.clone(),
            ty: reported_type(&ty, unsigned),
            nullable: true,
            primary: false,
            unique: false,
            auto_increment: false,
        };

        for option in options {
            match option {
                ColumnOption::NotNull => column.nullable = false,
                ColumnOption::Null => column.nullable = true,
                ColumnOption::Unique {
                    is_primary: true, ..
                } => column.primary = true,
                ColumnOption::Unique { .. } => column.unique = true,
                ColumnOption::DialectSpecific(tokens)
                    if tokens
                        .iter()
                        .any(|tok| tok.to_string().eq_ignore_ascii_case("AUTO_INCREMENT")) =>
                {
                    column.auto_increment = true
                }
                _ => {}
            }
        }

        column
    }

    fn accepts_null(&self) -> bool {
        self.nullable && !self.primary
    }

    /// Value existing rows get when the column is added
    fn implicit_default(&self) -> Value {
        if self.accepts_null() {
            return Value::Null;
        }

        let numeric = ["tinyint", "smallint", "mediumint", "int", "bigint", "decimal", "double", "float"]
            .iter()
            .any(|prefix| self.ty.starts_with(prefix));
        if numeric {
            Value::I64(0)
        } else {
            Value::Str(String::new())
        }
    }
}

#[derive(Debug, Clone)]
struct MemTable {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
    next_id: i64,
}

impl MemTable {
    fn new(name: String) -> Self {
        Self {
            name,
            columns: vec![],
            rows: vec![],
            next_id: 1,
        }
    }

    fn index_of(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|col| col.name.eq_ignore_ascii_case(column))
            .ok_or_else(|| {
                tablemap::error::database!(
                    "Unknown column '{}' in table '{}'",
                    column,
                    self.name
                )
            })
    }

    fn add_column(&mut self, column: Column) -> Result<()> {
        if self.index_of(&column.name).is_ok() {
            return Err(tablemap::error::database!(
                "Duplicate column name '{}'",
                column.name
            ));
        }
        if column.primary && self.columns.iter().any(|col| col.primary) {
            return Err(tablemap::error::database!("Multiple primary key defined"));
        }

        let filler = column.implicit_default();
        self.columns.push(column);
        self.rows.iter_mut().for_each(|row| row.push(filler.clone()));

        Ok(())
    }

    /// `Key` of `SHOW COLUMNS`, MySQL reports the first `NOT NULL UNIQUE` column of a table
    /// without primary key as `PRI`
    fn reported_key(&self, idx: usize) -> &'static str {
        let col = &self.columns[idx];
        let promoted = !self.columns.iter().any(|col| col.primary)
            && self
                .columns
                .iter()
                .position(|col| col.unique && !col.nullable)
                == Some(idx);

        if col.primary || promoted {
            "PRI"
        } else if col.unique {
            "UNI"
        } else {
            ""
        }
    }

    fn matches(&self, row: &[Value], filter: Option<&Filter>) -> Result<bool> {
        filter.map_or(Ok(true), |filter| filter.matches(self, row))
    }

    /// Reject rows breaking NOT NULL, PRIMARY KEY or UNIQUE
    fn check(&self, rows: &[Vec<Value>]) -> Result<()> {
        for (idx, col) in self.columns.iter().enumerate() {
            for (pos, row) in rows.iter().enumerate() {
                let value = &row[idx];
                if value.is_null() {
                    if !col.accepts_null() {
                        return Err(tablemap::error::database!(
                            "Column '{}' cannot be null",
                            col.name
                        ));
                    }
                    continue;
                }

                if col.primary || col.unique {
                    let entry = text(value);
                    if rows[..pos].iter().any(|other| text(&other[idx]) == entry) {
                        return Err(tablemap::error::database!(
                            "Duplicate entry '{}' for key '{}'",
                            entry.unwrap_or_default(),
                            col.name
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    fn to_row(&self, values: &[Value]) -> Row {
        self.columns
            .iter()
            .zip(values)
            .map(|(col, v)| (col.name.clone(), wire_value(v)))
            .collect()
    }
}

/// WHERE clause with its placeholders bound
#[derive(Debug)]
enum Filter {
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
    Compare {
        column: String,
        op: BinaryOperator,
        value: Value,
    },
    IsNull {
        column: String,
        negated: bool,
    },
}

impl Filter {
    fn bind(selection: Option<&Expr>, params: &mut VecDeque<Value>) -> Result<Option<Self>> {
        selection.map(|expr| Self::from_expr(expr, params)).transpose()
    }

    /// Placeholders are consumed left to right
    fn from_expr(expr: &Expr, params: &mut VecDeque<Value>) -> Result<Self> {
        match expr {
            Expr::Nested(inner) => Self::from_expr(inner, params),
            Expr::BinaryOp {
                left,
                op: BinaryOperator::And,
                right,
            } => {
                let left = Self::from_expr(left, params)?;
                Ok(Self::And(Box::new(left), Box::new(Self::from_expr(right, params)?)))
            }
            Expr::BinaryOp {
                left,
                op: BinaryOperator::Or,
                right,
            } => {
                let left = Self::from_expr(left, params)?;
                Ok(Self::Or(Box::new(left), Box::new(Self::from_expr(right, params)?)))
            }
            Expr::BinaryOp { left, op, right } => Ok(Self::Compare {
                column: column_name(left)?,
                op: op.clone(),
                value: bind_value(right, params)?,
            }),
            Expr::IsNull(inner) => Ok(Self::IsNull {
                column: column_name(inner)?,
                negated: false,
            }),
            Expr::IsNotNull(inner) => Ok(Self::IsNull {
                column: column_name(inner)?,
                negated: true,
            }),
            expr => Err(tablemap::error::database!(
                "Unsupported condition `{}`",
                expr
            )),
        }
    }

    fn matches(&self, table: &MemTable, row: &[Value]) -> Result<bool> {
        let matched = match self {
            Self::And(left, right) => left.matches(table, row)? && right.matches(table, row)?,
            Self::Or(left, right) => left.matches(table, row)? || right.matches(table, row)?,
            Self::Compare { column, op, value } => {
                compare(&row[table.index_of(column)?], op, value)
            }
            Self::IsNull { column, negated } => row[table.index_of(column)?].is_null() != *negated,
        };

        Ok(matched)
    }
}

#[derive(Debug, Default)]
struct State {
    tables: Vec<MemTable>,
    executed: Vec<Executed>,
    opened: usize,
    closed: usize,
    fail_pattern: Option<String>,
    refuse_connections: bool,
}

impl State {
    fn table(&self, name: &str) -> Result<&MemTable> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| tablemap::error::database!("Table 'memory.{}' doesn't exist", name))
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut MemTable> {
        self.tables
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or_else(|| tablemap::error::database!("Table 'memory.{}' doesn't exist", name))
    }

    /// Returns (rows, affected)
    fn apply(&mut self, stmt: &ast::Statement, params: Vec<Value>) -> Result<(Vec<Row>, u64)> {
        let mut params = VecDeque::from(params);

        match stmt {
            ast::Statement::ShowTables { show_options, .. } => {
                let pattern = match &show_options.filter_position {
                    Some(ShowStatementFilterPosition::Infix(ShowStatementFilter::Like(p)))
                    | Some(ShowStatementFilterPosition::Suffix(ShowStatementFilter::Like(p))) => {
                        Some(p.as_str())
                    }
                    _ => None,
                };
                let header = match pattern {
                    Some(p) => format!("Tables_in_memory ({})", p),
                    None => "Tables_in_memory".into(),
                };

                let rows = self
                    .tables
                    .iter()
                    .filter(|t| pattern.map_or(true, |p| like(p, &t.name)))
                    .map(|t| {
                        vec![(header.clone(), text_value(&t.name))]
                            .into_iter()
                            .collect::<Row>()
                    })
                    .collect();

                Ok((rows, 0))
            }

            ast::Statement::ShowColumns { show_options, .. } => {
                let name = show_options
                    .show_in
                    .as_ref()
                    .and_then(|show_in| show_in.parent_name.as_ref())
                    .ok_or_else(|| tablemap::error::database!("SHOW COLUMNS without table"))?;
                let table = self.table(&object_name(name))?;

                let rows = table
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(idx, col)| {
                        vec![
                            ("Field", text_value(&col.name)),
                            ("Type", text_value(&col.ty)),
                            ("Null", text_value(if col.accepts_null() { "YES" } else { "NO" })),
                            ("Key", text_value(table.reported_key(idx))),
                            ("Default", Value::Null),
                            (
                                "Extra",
                                text_value(if col.auto_increment {
                                    "auto_increment"
                                } else {
                                    ""
                                }),
                            ),
                        ]
                        .into_iter()
                        .collect::<Row>()
                    })
                    .collect();

                Ok((rows, 0))
            }

            ast::Statement::CreateTable(create) => {
                let name = object_name(&create.name);
                if self.table(&name).is_ok() {
                    return Err(tablemap::error::database!(
                        "Table '{}' already exists",
                        name
                    ));
                }

                // Table constraints, foreign keys included, are not enforced
                let mut created = MemTable::new(name);
                for def in &create.columns {
                    created.add_column(Column::from_def(
                        &def.name,
                        &def.data_type,
                        def.options.iter().map(|opt| &opt.option),
                    ))?;
                }
                self.tables.push(created);

                Ok((vec![], 0))
            }

            ast::Statement::AlterTable {
                name, operations, ..
            } => {
                // All or nothing, like MySQL
                let current = self.table_mut(&object_name(name))?;
                let mut altered = current.clone();

                // MySQL drops keys before adding new ones
                let (key_drops, others): (Vec<_>, Vec<_>) = operations.iter().partition(|op| {
                    matches!(
                        op,
                        AlterTableOperation::DropPrimaryKey | AlterTableOperation::DropIndex { .. }
                    )
                });

                for op in key_drops.into_iter().chain(others) {
                    alter(&mut altered, op)?;
                }

                altered.check(&altered.rows)?;
                *current = altered;

                Ok((vec![], 0))
            }

            ast::Statement::Insert(insert) => {
                let name = match &insert.table {
                    TableObject::TableName(name) => object_name(name),
                    table => {
                        return Err(tablemap::error::database!(
                            "Unsupported insert target `{}`",
                            table
                        ))
                    }
                };
                let values = match insert.source.as_ref().map(|query| query.body.as_ref()) {
                    Some(SetExpr::Values(values)) => &values.rows,
                    _ => return Err(tablemap::error::database!("INSERT without VALUES")),
                };
                let bound = values
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|expr| bind_value(expr, &mut params))
                            .collect::<Result<Vec<_>>>()
                    })
                    .collect::<Result<Vec<_>>>()?;

                let table = self.table_mut(&name)?;
                let indexes = insert
                    .columns
                    .iter()
                    .map(|col| table.index_of(&col.value))
                    .collect::<Result<Vec<_>>>()?;

                let mut next_id = table.next_id;
                let mut inserted = vec![];
                for values in bound {
                    if values.len() != indexes.len() {
                        return Err(tablemap::error::database!(
                            "Column count doesn't match value count"
                        ));
                    }

                    let mut row = vec![Value::Null; table.columns.len()];
                    for (idx, value) in indexes.iter().zip(values) {
                        row[*idx] = value;
                    }
                    for (idx, col) in table.columns.iter().enumerate() {
                        if col.auto_increment && row[idx].is_null() {
                            row[idx] = Value::I64(next_id);
                            next_id += 1;
                        }
                    }
                    inserted.push(row);
                }

                let affected = inserted.len() as u64;
                let mut all = table.rows.clone();
                all.extend(inserted);
                table.check(&all)?;

                table.rows = all;
                table.next_id = next_id;

                Ok((vec![], affected))
            }

            ast::Statement::Update {
                table,
                assignments,
                selection,
                ..
            } => {
                let assignments = assignments
                    .iter()
                    .map(|assignment| match &assignment.target {
                        AssignmentTarget::ColumnName(col) => {
                            Ok((object_name(col), bind_value(&assignment.value, &mut params)?))
                        }
                        target => Err(tablemap::error::database!(
                            "Unsupported assignment to `{}`",
                            target
                        )),
                    })
                    .collect::<Result<Vec<_>>>()?;
                let filter = Filter::bind(selection.as_ref(), &mut params)?;

                let table = self.table_mut(&relation_name(table)?)?;
                let assignments = assignments
                    .into_iter()
                    .map(|(col, v)| Ok((table.index_of(&col)?, v)))
                    .collect::<Result<Vec<_>>>()?;

                let mut rows = table.rows.clone();
                let mut affected = 0;
                for row in rows.iter_mut() {
                    if table.matches(row, filter.as_ref())? {
                        for (idx, v) in &assignments {
                            row[*idx] = v.clone();
                        }
                        affected += 1;
                    }
                }
                table.check(&rows)?;
                table.rows = rows;

                Ok((vec![], affected))
            }

            ast::Statement::Delete(delete) => {
                let tables = match &delete.from {
                    FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => tables,
                };
                let relation = tables
                    .first()
                    .ok_or_else(|| tablemap::error::database!("DELETE without table"))?;
                let filter = Filter::bind(delete.selection.as_ref(), &mut params)?;

                let table = self.table_mut(&relation_name(relation)?)?;
                let mut kept = vec![];
                for row in &table.rows {
                    if !table.matches(row, filter.as_ref())? {
                        kept.push(row.clone());
                    }
                }
                let affected = (table.rows.len() - kept.len()) as u64;
                table.rows = kept;

                Ok((vec![], affected))
            }

            ast::Statement::Query(query) => {
                let select = match query.body.as_ref() {
                    SetExpr::Select(select) => select,
                    body => {
                        return Err(tablemap::error::database!(
                            "Unsupported query `{}`",
                            body
                        ))
                    }
                };
                let relation = select
                    .from
                    .first()
                    .ok_or_else(|| tablemap::error::database!("No tables used"))?;
                let filter = Filter::bind(select.selection.as_ref(), &mut params)?;
                let limit = match &query.limit_clause {
                    Some(LimitClause::LimitOffset {
                        limit: Some(limit), ..
                    })
                    | Some(LimitClause::OffsetCommaLimit { limit, .. }) => {
                        match bind_value(limit, &mut params)? {
                            Value::I64(n) if n >= 0 => Some(n as usize),
                            v => {
                                return Err(tablemap::error::database!(
                                    "Incorrect LIMIT {:?}",
                                    v
                                ))
                            }
                        }
                    }
                    _ => None,
                };

                let table = self.table(&relation_name(relation)?)?;
                let mut rows = vec![];
                for values in &table.rows {
                    if limit.map_or(false, |limit| rows.len() >= limit) {
                        break;
                    }
                    if table.matches(values, filter.as_ref())? {
                        rows.push(table.to_row(values));
                    }
                }

                Ok((rows, 0))
            }

            stmt => Err(tablemap::error::database!(
                "Unsupported statement `{}`",
                stmt
            )),
        }
    }
}

fn alter(table: &mut MemTable, op: &AlterTableOperation) -> Result<()> {
    match op {
        AlterTableOperation::AddColumn { column_def, .. } => table.add_column(Column::from_def(
            &column_def.name,
            &column_def.data_type,
            column_def.options.iter().map(|opt| &opt.option),
        )),

        // Foreign keys are not enforced
        AlterTableOperation::AddConstraint(_) => Ok(()),

        AlterTableOperation::ModifyColumn {
            col_name,
            data_type,
            options,
            ..
        } => {
            let idx = table.index_of(&col_name.value)?;
            let mut column = Column::from_def(col_name, data_type, options);

            // MODIFY keeps existing keys
            let previous = &table.columns[idx];
            let adds_primary = column.primary && !previous.primary;
            column.primary |= previous.primary;
            column.unique |= previous.unique;

            if adds_primary && table.columns.iter().any(|col| col.primary) {
                return Err(tablemap::error::database!("Multiple primary key defined"));
            }
            table.columns[idx] = column;

            Ok(())
        }

        AlterTableOperation::DropColumn { column_name, .. } => {
            let idx = table.index_of(&column_name.value).map_err(|_| {
                tablemap::error::database!(
                    "Can't DROP '{}'; check that column/key exists",
                    column_name.value
                )
            })?;
            table.columns.remove(idx);
            table.rows.iter_mut().for_each(|row| {
                row.remove(idx);
            });

            Ok(())
        }

        AlterTableOperation::DropPrimaryKey => {
            let col = table
                .columns
                .iter_mut()
                .find(|col| col.primary)
                .ok_or_else(|| {
                    tablemap::error::database!("Can't DROP 'PRIMARY'; check that column/key exists")
                })?;
            col.primary = false;

            Ok(())
        }

        // A column level UNIQUE index is named after its column
        AlterTableOperation::DropIndex { name } => {
            let col = table
                .columns
                .iter_mut()
                .find(|col| col.unique && col.name.eq_ignore_ascii_case(&name.value))
                .ok_or_else(|| {
                    tablemap::error::database!(
                        "Can't DROP '{}'; check that column/key exists",
                        name.value
                    )
                })?;
            col.unique = false;

            Ok(())
        }

        op => Err(tablemap::error::database!(
            "Unsupported alter operation `{}`",
            op
        )),
    }
}

/// Parse exactly one statement taking exactly `params` placeholders
fn parse(sql: &str, params: &[Value]) -> Result<ast::Statement> {
    let syntax = |e: &dyn std::fmt::Display| {
        tablemap::error::database!("You have an error in your SQL syntax: {}", e)
    };

    let placeholders = Tokenizer::new(&MySqlDialect {}, sql)
        .tokenize()
        .map_err(|e| syntax(&e))?
        .iter()
        .filter(|tok| matches!(tok, Token::Placeholder(_)))
        .count();
    if placeholders != params.len() {
        return Err(tablemap::error::database!(
            "Incorrect arguments to execute, {} placeholders for {} parameters",
            placeholders,
            params.len()
        ));
    }

    let mut statements = Parser::parse_sql(&MySqlDialect {}, sql).map_err(|e| syntax(&e))?;
    match statements.len() {
        1 => Ok(statements.remove(0)),
        n => Err(tablemap::error::database!(
            "Expected one statement, found {}",
            n
        )),
    }
}

fn object_name(name: &ObjectName) -> String {
    name.0
        .last()
        .and_then(|part| part.as_ident())
        .map(|ident| ident.value.clone())
        .unwrap_or_default()
}

fn relation_name(table: &TableWithJoins) -> Result<String> {
    match &table.relation {
        TableFactor::Table { name, .. } => Ok(object_name(name)),
        relation => Err(tablemap::error::database!(
            "Unsupported table `{}`",
            relation
        )),
    }
}

fn column_name(expr: &Expr) -> Result<String> {
    match expr {
        Expr::Identifier(ident) => Ok(ident.value.clone()),
        Expr::CompoundIdentifier(parts) => parts
            .last()
            .map(|ident| ident.value.clone())
            .ok_or_else(|| tablemap::error::database!("Empty column name")),
        expr => Err(tablemap::error::database!(
            "Expected column, found `{}`",
            expr
        )),
    }
}

/// Literal or next parameter
fn bind_value(expr: &Expr, params: &mut VecDeque<Value>) -> Result<Value> {
    match expr {
        Expr::Value(v) => match &v.value {
            ast::Value::Placeholder(_) => params
                .pop_front()
                .ok_or_else(|| tablemap::error::database!("Incorrect arguments to execute")),
            ast::Value::SingleQuotedString(s) => Ok(Value::Str(s.clone())),
            ast::Value::HexStringLiteral(hex) => decode_hex(hex).map(Value::Bytes),
            ast::Value::Number(n, _) => match n.parse::<i64>() {
                Ok(v) => Ok(Value::I64(v)),
                Err(_) => n
                    .parse::<f64>()
                    .map(Value::F64)
                    .map_err(|_| tablemap::error::database!("Bad number `{}`", n)),
            },
            ast::Value::Boolean(b) => Ok(Value::I64(*b as i64)),
            ast::Value::Null => Ok(Value::Null),
            v => Err(tablemap::error::database!("Unsupported literal `{}`", v)),
        },
        Expr::Nested(inner) => bind_value(inner, params),
        Expr::UnaryOp {
            op: UnaryOperator::Minus,
            expr,
        } => match bind_value(expr, params)? {
            Value::I64(n) => Ok(Value::I64(-n)),
            Value::F64(n) => Ok(Value::F64(-n)),
            v => Err(tablemap::error::database!("Cannot negate {:?}", v)),
        },
        expr => Err(tablemap::error::database!(
            "Unsupported value `{}`",
            expr
        )),
    }
}

fn decode_hex(hex: &str) -> Result<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return Err(tablemap::error::database!("Odd hex literal X'{}'", hex));
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| tablemap::error::database!("Bad hex literal X'{}'", hex))
        })
        .collect()
}

/// In-memory MySQL-flavoured database.
///
/// Records every statement its connections receive and counts opened and closed
/// connections, so tests can assert on exactly what the engine sent.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<State>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connector(&self) -> MemoryConnector {
        MemoryConnector { db: self.clone() }
    }

    pub fn engine(&self) -> Engine {
        Engine::new(self.connector())
    }

    pub fn blocking_engine(&self) -> Result<BlockingEngine> {
        BlockingEngine::new(self.connector())
    }

    /// Run a statement directly, it is neither recorded nor counted
    pub fn run(&self, sql: &str) -> Result<Vec<Row>> {
        let stmt = parse(sql, &[])?;
        Ok(self.state().apply(&stmt, vec![])?.0)
    }

    /// Statements received so far
    pub fn executed(&self) -> Vec<Executed> {
        self.state().executed.clone()
    }

    /// Sql text of statements received so far
    pub fn statements(&self) -> Vec<String> {
        self.state()
            .executed
            .iter()
            .map(|e| e.sql.clone())
            .collect()
    }

    pub fn clear_statements(&self) {
        self.state().executed.clear();
    }

    pub fn opened(&self) -> usize {
        self.state().opened
    }

    pub fn closed(&self) -> usize {
        self.state().closed
    }

    /// Fail every statement whose sql contains `pattern`
    pub fn fail_statements_containing(&self, pattern: &str) {
        self.state().fail_pattern = Some(pattern.into());
    }

    pub fn clear_failures(&self) {
        let mut state = self.state();
        state.fail_pattern = None;
        state.refuse_connections = false;
    }

    pub fn refuse_connections(&self) {
        self.state().refuse_connections = true;
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.state().table(name).is_ok()
    }

    /// (Field, Type) pairs as `SHOW COLUMNS` reports them
    pub fn column_types(&self, table: &str) -> Vec<(String, String)> {
        self.state()
            .table(table)
            .map(|t| {
                t.columns
                    .iter()
                    .map(|col| (col.name.clone(), col.ty.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Stored values, as written
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.state()
            .table(table)
            .map(|t| {
                t.rows
                    .iter()
                    .map(|values| {
                        t.columns
                            .iter()
                            .zip(values)
                            .map(|(col, v)| (col.name.clone(), v.clone()))
                            .collect()
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn dispatch(&self, sql: &str, params: Vec<Value>) -> Result<(Vec<Row>, u64)> {
        let mut state = self.state();
        state.executed.push(Executed {
            sql: sql.into(),
            params: params.clone(),
        });

        if let Some(pattern) = &state.fail_pattern {
            if sql.contains(pattern.as_str()) {
                return Err(tablemap::error::database!("Lost connection during `{}`", sql));
            }
        }

        let stmt = parse(sql, &params)?;
        state.apply(&stmt, params)
    }
}

#[derive(Clone)]
pub struct MemoryConnector {
    db: MemoryDatabase,
}

#[tablemap::async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self) -> Result<Connection> {
        {
            let mut state = self.db.state();
            if state.refuse_connections {
                return Err(tablemap::error::connection!(
                    "Can't connect to memory server"
                ));
            }
            state.opened += 1;
        }

        Ok(Connection::new(Arc::new(MemoryDriver {
            db: self.db.clone(),
            open: AtomicBool::new(true),
        })))
    }
}

struct MemoryDriver {
    db: MemoryDatabase,
    open: AtomicBool,
}

impl MemoryDriver {
    fn check_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(tablemap::error::connection!("Connection already closed"))
        }
    }
}

#[tablemap::async_trait]
impl Driver for MemoryDriver {
    async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<u64> {
        self.check_open()?;
        Ok(self.db.dispatch(sql, params)?.1)
    }

    async fn query(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>> {
        self.check_open()?;
        Ok(self.db.dispatch(sql, params)?.0)
    }

    async fn close(&self) -> Result<()> {
        if self.open.swap(false, Ordering::SeqCst) {
            self.db.state().closed += 1;
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

/// Type string as MySQL 5.7 reports it in `SHOW COLUMNS`
fn reported_type(ty: &str, unsigned: bool) -> String {
    let upper = ty.to_uppercase();
    let (base, args) = match upper.find('(') {
        Some(pos) => (&upper[..pos], Some(upper[pos + 1..].trim_end_matches(')'))),
        None => (upper.as_str(), None),
    };

    let sized = |name: &str, signed_width: &str, unsigned_width: &str| {
        let width = if unsigned { unsigned_width } else { signed_width };
        format!("{}({})", name, args.unwrap_or(width))
    };

    let (reported, numeric) = match base {
        "BOOL" | "BOOLEAN" => return "tinyint(1)".into(),
        "TINYINT" => (sized("tinyint", "4", "3"), true),
        "SMALLINT" => (sized("smallint", "6", "5"), true),
        "MEDIUMINT" => (sized("mediumint", "9", "8"), true),
        "INT" | "INTEGER" => (sized("int", "11", "10"), true),
        "BIGINT" => (sized("bigint", "20", "20"), true),
        "DECIMAL" | "NUMERIC" => (sized("decimal", "10,0", "10,0"), true),
        "REAL" | "DOUBLE" => ("double".to_string(), true),
        "FLOAT" => ("float".to_string(), true),
        "CHAR" => (format!("char({})", args.unwrap_or("1")), false),
        _ => (upper.to_lowercase(), false),
    };

    if unsigned && numeric {
        format!("{} unsigned", reported)
    } else {
        reported
    }
}

/// Text protocol sends strings as bytes
fn wire_value(v: &Value) -> Value {
    match v {
        Value::Str(s) => Value::Bytes(s.as_bytes().to_vec()),
        v => v.clone(),
    }
}

fn text_value(s: &str) -> Value {
    Value::Bytes(s.as_bytes().to_vec())
}

fn text(v: &Value) -> Option<String> {
    let text = match v {
        Value::Null => return None,
        Value::Bool(b) => (*b as i64).to_string(),
        Value::U8(n) => n.to_string(),
        Value::I8(n) => n.to_string(),
        Value::U16(n) => n.to_string(),
        Value::I16(n) => n.to_string(),
        Value::U32(n) => n.to_string(),
        Value::I32(n) => n.to_string(),
        Value::U64(n) => n.to_string(),
        Value::I64(n) => n.to_string(),
        Value::F32(n) => n.to_string(),
        Value::F64(n) => n.to_string(),
        Value::Decimal(d) => d.to_string(),
        Value::Str(s) => s.clone(),
        Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        Value::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
        Value::Uuid(uuid) => uuid.to_string(),
    };

    Some(text)
}

fn compare(stored: &Value, op: &BinaryOperator, operand: &Value) -> bool {
    // Comparing with NULL is never true
    let (a, b) = match (text(stored), text(operand)) {
        (Some(a), Some(b)) => (a, b),
        _ => return false,
    };

    let ordering = match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y),
        _ => Some(a.cmp(&b)),
    };

    match (op, ordering) {
        (BinaryOperator::Eq, Some(o)) => o.is_eq(),
        (BinaryOperator::NotEq, Some(o)) => o.is_ne(),
        (BinaryOperator::Lt, Some(o)) => o.is_lt(),
        (BinaryOperator::Gt, Some(o)) => o.is_gt(),
        (BinaryOperator::LtEq, Some(o)) => o.is_le(),
        (BinaryOperator::GtEq, Some(o)) => o.is_ge(),
        _ => false,
    }
}

/// `LIKE` with `%` and `_` wildcards
fn like(pattern: &str, s: &str) -> bool {
    fn matches(p: &[char], s: &[char]) -> bool {
        match p.split_first() {
            None => s.is_empty(),
            Some(('%', rest)) => (0..=s.len()).any(|i| matches(rest, &s[i..])),
            Some(('_', rest)) => !s.is_empty() && matches(rest, &s[1..]),
            Some((c, rest)) => s.first() == Some(c) && matches(rest, &s[1..]),
        }
    }

    let p = pattern.chars().collect::<Vec<_>>();
    let s = s.chars().collect::<Vec<_>>();
    matches(&p, &s)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_reported_type() {
        assert_eq!(reported_type("INT", false), "int(11)");
        assert_eq!(reported_type("INT", true), "int(10) unsigned");
        assert_eq!(reported_type("BOOL", false), "tinyint(1)");
        assert_eq!(reported_type("REAL", false), "double");
        assert_eq!(reported_type("VARCHAR(64)", false), "varchar(64)");
    }

    #[test]
    fn test_bound_parameters() {
        let db = MemoryDatabase::new();
        db.run("CREATE TABLE scores (Id VARCHAR(16) NOT NULL PRIMARY KEY, Score INT NOT NULL)")
            .unwrap();

        db.dispatch(
            "INSERT INTO scores (Id, Score) VALUES (?, ?), ('c', ?)",
            vec![Value::from("a"), Value::from(1), Value::from(3)],
        )
        .unwrap();
        let affected = db
            .dispatch(
                "UPDATE scores SET Score = ? WHERE Id = ? OR (Score > ? AND Id <> 'a')",
                vec![Value::from(7), Value::from("a"), Value::from(2)],
            )
            .unwrap()
            .1;
        assert_eq!(affected, 2);

        assert!(db
            .dispatch("SELECT * FROM scores WHERE Id = ?", vec![])
            .is_err());
        assert!(db.run("SELEC * FROM scores").is_err());

        let rows = db.run("SELECT * FROM scores WHERE Score = 7 LIMIT 5").unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_escaped_literals() {
        let db = MemoryDatabase::new();
        db.run("CREATE TABLE notes (body TEXT, payload VARBINARY(8))").unwrap();
        db.run(r"INSERT INTO notes (body, payload) VALUES ('it''s a\\', X'CAFE')")
            .unwrap();

        let rows = db.rows("notes");
        assert_eq!(rows[0].value("body"), Some(&Value::Str(r"it's a\".into())));
        assert_eq!(rows[0].value("payload"), Some(&Value::Bytes(vec![0xca, 0xfe])));
    }

    #[test]
    fn test_reported_keys() {
        let db = MemoryDatabase::new();
        db.run("CREATE TABLE tags (label VARCHAR(32) NOT NULL UNIQUE, alias VARCHAR(32) UNIQUE)")
            .unwrap();

        let keys = |db: &MemoryDatabase| {
            db.run("SHOW COLUMNS FROM tags")
                .unwrap()
                .iter()
                .map(|row| row.get::<String>("Key").unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(keys(&db), vec!["PRI", "UNI"]);

        db.run("ALTER TABLE tags DROP INDEX label").unwrap();
        assert_eq!(keys(&db), vec!["", "UNI"]);

        assert!(db.run("ALTER TABLE tags DROP PRIMARY KEY").is_err());
        db.run("ALTER TABLE tags MODIFY alias VARCHAR(32) NOT NULL PRIMARY KEY")
            .unwrap();
        assert_eq!(keys(&db), vec!["", "PRI"]);
        assert!(db
            .run("ALTER TABLE tags MODIFY label VARCHAR(32) NOT NULL PRIMARY KEY")
            .is_err());
    }

    #[test]
    fn test_like() {
        assert!(like("scores", "scores"));
        assert!(like("a_b", "axb"));
        assert!(!like("a_b", "ab"));
        assert!(like("sc%", "scores"));
    }
}
