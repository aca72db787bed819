use proc_macro_error::abort;
use quote::ToTokens;
use syn::{Attribute, Data, DataStruct, DeriveInput, Expr, Lit};

#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub field: String,               // Field rust name
    pub ty: String,                  // Field rust type without spaces
    pub column: String,              // Sql column name, default it's same with field
    pub column_type: Option<String>, // User specific sql type
    pub length: Option<usize>,
    pub is_nullable: bool,
    pub is_unique: bool,
    pub is_primary_key: bool,
    pub foreign_key: Option<(String, String)>, // (table, column)
    pub is_unsigned: bool,
    pub is_auto_increment: bool,
    pub is_enum: bool,
    pub is_ignored: bool,
}

#[derive(Debug)]
pub struct TableInfo {
    pub struct_name: String,
    pub table_name: Option<String>,
    pub columns: Vec<ColumnInfo>,
}

#[derive(Debug)]
enum AttrInfo {
    TableName(String),
    Ignore,
    Column(String),
    ColumnType(String),
    Length(usize),
    Nullable,
    Unique,
    PrimaryKey,
    ForeignKey((String, String)), // (table, column)
    Unsigned,
    AutoIncrement,
    Enumeration,
}

pub fn parse(input: DeriveInput) -> TableInfo {
    let st = match &input.data {
        Data::Struct(st) => st,
        _ => abort!(input, "Table must be a struct"),
    };

    if !input.generics.params.is_empty() {
        abort!(input.generics, "Table cannot be generic");
    }

    let struct_name = input.ident.to_string();
    let mut table_name = None;

    // Parse struct attrs
    for attr in input.attrs.iter().filter(|a| a.path.is_ident("tablemap")) {
        let attr_infos = parse_tablemap_attr(attr);

        // Process attr
        for attr_info in attr_infos {
            match attr_info {
                AttrInfo::TableName(name) => table_name = Some(name),
                _ => abort!(attr, "Invalid struct attr field: {:?}", attr_info),
            }
        }
    }

    // Parse columns
    let columns = parse_columns(st);

    TableInfo {
        struct_name,
        table_name,
        columns,
    }
}

fn parse_columns(st: &DataStruct) -> Vec<ColumnInfo> {
    let mut columns = Vec::<ColumnInfo>::new();

    for field in &st.fields {
        let name = if let Some(name) = &field.ident {
            name.to_string()
        } else {
            abort!(field, "Field must be named");
        };
        let mut info = ColumnInfo {
            field: name.clone(),
            ty: field.ty.to_token_stream().to_string().replace(' ', ""),
            column: name,
            column_type: None,
            length: None,
            is_nullable: false,
            is_unique: false,
            is_primary_key: false,
            foreign_key: None,
            is_unsigned: false,
            is_auto_increment: false,
            is_enum: false,
            is_ignored: false,
        };

        // Parse attr, other attributes like doc comments are left alone
        for attr in field.attrs.iter().filter(|a| a.path.is_ident("tablemap")) {
            for attr_info in parse_tablemap_attr(attr) {
                match attr_info {
                    AttrInfo::Ignore => info.is_ignored = true,
                    AttrInfo::Column(col) => info.column = col,
                    AttrInfo::ColumnType(ty) => info.column_type = Some(ty),
                    AttrInfo::Length(len) => info.length = Some(len),
                    AttrInfo::Nullable => info.is_nullable = true,
                    AttrInfo::Unique => info.is_unique = true,
                    AttrInfo::PrimaryKey => info.is_primary_key = true,
                    AttrInfo::ForeignKey(fk) => info.foreign_key = Some(fk),
                    AttrInfo::Unsigned => info.is_unsigned = true,
                    AttrInfo::AutoIncrement => info.is_auto_increment = true,
                    AttrInfo::Enumeration => info.is_enum = true,
                    _ => abort!(attr, "Invalid column attr field: {:?}", attr_info),
                }
            }
        }

        columns.push(info);
    }

    columns
}

fn parse_tablemap_attr(attr: &Attribute) -> Vec<AttrInfo> {
    const PARSE_ERR_STR: &str = "Parse failed, syntax is #[tablemap(field [= value])]";
    const ARG_HELP: &str = r#"Syntax is tablemap(name = "TABLE" | ignore | column = "NAME" | column_type = "SQL TYPE" | length = NUMBER | nullable | unique | primary_key | foreign_key("TABLE", "COLUMN") | unsigned | auto_increment | enumeration, ...)"#;

    let mut attrs = Vec::<AttrInfo>::new();

    // Generate function call tokens: tablemap(xxx)
    let path = attr.path.clone();
    let toks = attr.tokens.clone();
    let call_toks = quote::quote! {#path #toks};

    let args = if let Ok(call) = syn::parse2::<syn::ExprCall>(call_toks) {
        call.args
    } else {
        abort!(attr.tokens, PARSE_ERR_STR);
    };

    // Parse args
    for expr in &args {
        match expr {
            Expr::Path(p) => {
                let field_name = p.to_token_stream().to_string();
                match field_name.as_str() {
                    "ignore" => attrs.push(AttrInfo::Ignore),
                    "nullable" => attrs.push(AttrInfo::Nullable),
                    "unique" => attrs.push(AttrInfo::Unique),
                    "primary_key" => attrs.push(AttrInfo::PrimaryKey),
                    "unsigned" => attrs.push(AttrInfo::Unsigned),
                    "auto_increment" => attrs.push(AttrInfo::AutoIncrement),
                    "enumeration" => attrs.push(AttrInfo::Enumeration),

                    // Error
                    _ => abort!(expr, "Syntax error while decode path"; help = ARG_HELP),
                }
            }
            Expr::Assign(assign) => {
                let field_name = assign.left.to_token_stream().to_string();
                match field_name.as_str() {
                    // Parse name = "TABLE"
                    "name" => attrs.push(AttrInfo::TableName(get_str(&assign.right))),

                    // Parse column = "NAME"
                    "column" => attrs.push(AttrInfo::Column(get_str(&assign.right))),

                    // Parse column_type = "SQL TYPE"
                    "column_type" => attrs.push(AttrInfo::ColumnType(get_str(&assign.right))),

                    // Parse length = NUMBER
                    "length" => attrs.push(AttrInfo::Length(get_num(&assign.right))),

                    // Error
                    _ => abort!(expr, "Syntax error while decode assign"; help = ARG_HELP),
                }
            }
            Expr::Call(call) => {
                let func_name = call.func.to_token_stream().to_string();
                match func_name.as_str() {
                    // Parse foreign_key("TABLE", "COLUMN")
                    "foreign_key" if call.args.len() == 2 => {
                        let table = get_str(&call.args[0]);
                        let column = get_str(&call.args[1]);
                        attrs.push(AttrInfo::ForeignKey((table, column)));
                    }

                    // Error
                    _ => abort!(expr, "Syntax error while decode call"; help = ARG_HELP),
                }
            }
            _ => abort!(expr, "Syntax error while match expr"; help = ARG_HELP),
        }
    }

    attrs
}

/// Get string from expr
fn get_str(expr: &Expr) -> String {
    if let Expr::Lit(lit) = expr {
        if let Lit::Str(s) = &lit.lit {
            return s.value();
        }
    }

    abort!(expr, "Expect string")
}

/// Get number from expr
fn get_num(expr: &Expr) -> usize {
    if let Expr::Lit(lit) = expr {
        if let Lit::Int(n) = &lit.lit {
            if let Ok(n) = n.base10_parse::<usize>() {
                return n;
            }
        }
    }

    abort!(expr, "Expect integer")
}
