use std::str::FromStr;

use proc_macro2::TokenStream;
use quote::quote;

use crate::{ColumnInfo, TableInfo};

pub fn generate(info: TableInfo) -> TokenStream {
    let struct_name = str_to_toks(&info.struct_name);
    let table_name_toks = match &info.table_name {
        Some(name) => quote! { Some(#name) },
        None => quote! { None },
    };
    let columns_toks = gen_columns(&info);
    let to_values_toks = gen_to_values(&info);
    let from_row_toks = gen_from_row(&info);

    quote! {
        impl tablemap::Table for #struct_name {
            const TABLE_NAME: Option<&'static str> = #table_name_toks;

            // fn columns() -> Result<Vec<ColumnDescriptor>>;
            #columns_toks

            // fn to_values(&self) -> Vec<(&'static str, Value)>;
            #to_values_toks

            // fn from_row(row: &Row) -> Result<Self>;
            #from_row_toks
        }
    }
}

fn gen_columns(info: &TableInfo) -> TokenStream {
    let push_toks: Vec<TokenStream> = info
        .columns
        .iter()
        .filter(|col| !col.is_ignored)
        .map(|col| gen_column_descriptor(&info.struct_name, col))
        .collect();

    quote! {
        #[allow(unreachable_code)]
        fn columns() -> tablemap::error::Result<Vec<tablemap::ColumnDescriptor>> {
            let mut columns = Vec::<tablemap::ColumnDescriptor>::new();
            #(#push_toks)*
            Ok(columns)
        }
    }
}

fn gen_column_descriptor(struct_name: &str, col: &ColumnInfo) -> TokenStream {
    let (inner_ty, is_option) = unwrap_option(&col.ty);
    let column = &col.column;
    let length_toks = match col.length {
        Some(n) => quote! { Some(#n) },
        None => quote! { None },
    };

    // Resolve sql type, explicit column_type always wins
    let sql_type_toks = if let Some(column_type) = &col.column_type {
        quote! { String::from(#column_type) }
    } else if col.is_enum {
        quote! { tablemap::ColumnType::I32.sql_type(#length_toks) }
    } else if let Some(variant) = column_type_variant(&inner_ty) {
        let variant = str_to_toks(variant);
        quote! { tablemap::ColumnType::#variant.sql_type(#length_toks) }
    } else {
        // Fail when the descriptors are requested, not at compile time
        let field = &col.field;
        let ty = &col.ty;
        return quote! {
            return Err(tablemap::error::unsupported_type!(
                "Field `{}` of `{}` has unsupported type `{}`",
                #field,
                #struct_name,
                #ty
            ));
        };
    };

    let mut chain = Vec::<TokenStream>::new();
    if col.is_nullable || is_option {
        chain.push(quote! { .nullable() });
    }
    if col.is_unique {
        chain.push(quote! { .unique() });
    }
    if col.is_primary_key {
        chain.push(quote! { .primary_key() });
    }
    if col.is_unsigned || (!col.is_enum && is_unsigned_type(&inner_ty)) {
        chain.push(quote! { .unsigned() });
    }
    if col.is_auto_increment {
        chain.push(quote! { .auto_increment() });
    }
    if let Some((table, foreign_column)) = &col.foreign_key {
        chain.push(quote! { .foreign_key(#table, #foreign_column) });
    }

    quote! {
        columns.push(tablemap::ColumnDescriptor::new(#column, #sql_type_toks) #(#chain)*);
    }
}

fn gen_to_values(info: &TableInfo) -> TokenStream {
    let value_toks: Vec<TokenStream> = info
        .columns
        .iter()
        .filter(|col| !col.is_ignored)
        .map(|col| {
            let column = &col.column;
            let field = str_to_toks(&col.field);
            let (_, is_option) = unwrap_option(&col.ty);

            match (col.is_enum, is_option) {
                (true, false) => quote! {
                    (#column, tablemap::Value::I64(tablemap::SqlEnum::to_i64(&self.#field)))
                },
                (true, true) => quote! {
                    (#column, match &self.#field {
                        Some(v) => tablemap::Value::I64(tablemap::SqlEnum::to_i64(v)),
                        None => tablemap::Value::Null,
                    })
                },
                _ => quote! {
                    (#column, tablemap::ToValue::to_value(&self.#field))
                },
            }
        })
        .collect();

    quote! {
        fn to_values(&self) -> Vec<(&'static str, tablemap::Value)> {
            vec![#(#value_toks),*]
        }
    }
}

fn gen_from_row(info: &TableInfo) -> TokenStream {
    let field_toks: Vec<TokenStream> = info
        .columns
        .iter()
        .map(|col| {
            let column = &col.column;
            let field = str_to_toks(&col.field);
            let (inner_ty, is_option) = unwrap_option(&col.ty);

            if col.is_ignored {
                return quote! {
                    #field: Default::default(),
                };
            }

            match (col.is_enum, is_option) {
                (true, false) => {
                    let ty = str_to_toks(&col.ty);
                    quote! {
                        #field: <#ty as tablemap::SqlEnum>::from_i64(row.get::<i64>(#column)?)?,
                    }
                }
                (true, true) => {
                    let ty = str_to_toks(&inner_ty);
                    quote! {
                        #field: match row.get::<Option<i64>>(#column)? {
                            Some(v) => Some(<#ty as tablemap::SqlEnum>::from_i64(v)?),
                            None => None,
                        },
                    }
                }
                _ => quote! {
                    #field: row.get(#column)?,
                },
            }
        })
        .collect();

    quote! {
        fn from_row(row: &tablemap::Row) -> tablemap::error::Result<Self> {
            Ok(Self {
                #(#field_toks)*
            })
        }
    }
}

fn str_to_toks(s: &str) -> TokenStream {
    TokenStream::from_str(s).unwrap()
}

/// Split `Option<T>` into (`T`, true), other types are returned as is
fn unwrap_option(ty: &str) -> (String, bool) {
    for prefix in ["Option<", "option::Option<", "std::option::Option<"] {
        if let Some(inner) = ty.strip_prefix(prefix) {
            if let Some(inner) = inner.strip_suffix('>') {
                return (inner.to_string(), true);
            }
        }
    }

    (ty.to_string(), false)
}

/// Map rust type to `ColumnType` variant name, only the last path segment is considered
fn column_type_variant(ty: &str) -> Option<&'static str> {
    let last = ty.rsplit("::").next().unwrap_or(ty);

    let variant = match last {
        "bool" => "Bool",
        "i8" => "I8",
        "u8" => "U8",
        "i16" => "I16",
        "u16" => "U16",
        "i32" => "I32",
        "u32" => "U32",
        "i64" => "I64",
        "u64" => "U64",
        "f32" => "F32",
        "f64" => "F64",
        "Decimal" => "Decimal",
        "char" => "Char",
        "String" => "Str",
        "NaiveDateTime" => "DateTime",
        "Uuid" => "Uuid",
        "Vec<u8>" => "Bytes",
        _ => return None,
    };

    Some(variant)
}

fn is_unsigned_type(ty: &str) -> bool {
    matches!(ty, "u8" | "u16" | "u32" | "u64")
}
