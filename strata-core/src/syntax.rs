mod mysql;

pub use mysql::*;

use crate::{StrataError, TableRef, Value, separated_by, split_alias};

/// Dialect rules: identifier quoting, placeholders and where operators.
pub trait Syntax: Send + Sync {
    fn as_dyn(&self) -> &dyn Syntax;

    /// Operators accepted by where predicates.
    fn where_operators(&self) -> &'static [&'static str];

    /// Escape occurrences of `search` char with `replace` while copying into buffer.
    fn write_escaped(&self, out: &mut String, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    /// Quote identifiers ("name") doubling inner quotes.
    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(out, value, '"', "\"\"");
        out.push('"');
    }

    /// Splits `"name as alias"`.
    fn parse_table(&self, value: &str) -> TableRef {
        let (name, alias) = split_alias(value);
        TableRef { name, alias }
    }

    /// Quotes `column`, `table.column` and `column as alias`.
    fn write_column(&self, out: &mut String, column: &str) {
        let (column, alias) = split_alias(column);
        if let Some((table, name)) = column.split_once('.') {
            self.write_identifier_quoted(out, table);
            out.push('.');
            if name == "*" {
                out.push('*');
            } else {
                self.write_identifier_quoted(out, name);
            }
        } else if column == "*" {
            out.push('*');
        } else {
            self.write_identifier_quoted(out, &column);
        }
        if !alias.is_empty() {
            out.push_str(" as ");
            self.write_identifier_quoted(out, &alias);
        }
    }

    fn write_table(&self, out: &mut String, table: &str) {
        self.write_identifier_quoted(out, table);
    }

    /// Writes nothing for an empty table, the alias is declared with `as`.
    fn write_table_ref(&self, out: &mut String, table: &TableRef) {
        if table.name.is_empty() {
            return;
        }
        self.write_table(out, &table.name);
        if !table.alias.is_empty() {
            out.push_str(" as ");
            self.write_table(out, &table.alias);
        }
    }

    /// Comma separated quoted columns, without spaces.
    fn write_column_list(&self, out: &mut String, columns: &[String]) {
        separated_by(out, columns, |out, v| self.write_column(out, v), ",");
    }

    /// `n` comma separated placeholders.
    fn write_placeholders(&self, out: &mut String, len: usize) {
        separated_by(out, 0..len, |out, _| out.push('?'), ",");
    }

    /// Placeholders needed to bind `value`: one for a scalar, one per item for a list.
    /// Empty when the value can't be bound, the predicate is then dropped.
    fn write_placeholders_for(&self, out: &mut String, value: &Value) {
        match value {
            Value::List(items) => {
                self.write_placeholders(out, items.iter().filter(|v| v.is_bindable()).count())
            }
            Value::Map(..) => {}
            v if v.is_null() => {}
            _ => out.push('?'),
        }
    }

    /// Validates a where operator, an empty one means `=`.
    fn prepare_where_operator(&self, operator: &str) -> Result<String, StrataError> {
        if operator.is_empty() {
            return Ok("=".into());
        }
        if self.where_operators().contains(&operator) {
            Ok(operator.to_string())
        } else {
            Err(StrataError::InvalidOperator(operator.to_string()))
        }
    }

    fn wrap_column(&self, column: &str) -> String {
        let mut out = String::with_capacity(column.len() + 4);
        self.write_column(&mut out, column);
        out
    }

    fn wrap_table_ref(&self, table: &TableRef) -> String {
        let mut out = String::with_capacity(table.name.len() + table.alias.len() + 8);
        self.write_table_ref(&mut out, table);
        out
    }

    fn placeholders(&self, len: usize) -> String {
        let mut out = String::with_capacity(len * 2);
        self.write_placeholders(&mut out, len);
        out
    }
}

/// ANSI flavoured dialect with double quoted identifiers.
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSyntax;

impl Syntax for GenericSyntax {
    fn as_dyn(&self) -> &dyn Syntax {
        self
    }

    fn where_operators(&self) -> &'static [&'static str] {
        &[
            "=", "<", ">", "<=", ">=", "<>", "!=", "like", "not like", "ilike", "not ilike",
            "similar to", "not similar to",
        ]
    }
}
