use crate::{
    Bucket, Builder, Direction, Join, Mapped, Mapper, NamingStyle, ParseMode, Predicate, Record,
    Result, StrataError, Syntax, TableRef, Value, separated_by,
};
use std::fmt::Write;

/// What an insert or an update writes.
#[derive(Clone)]
pub enum Payload<'a> {
    Object(&'a dyn Mapped),
    Objects(Vec<&'a dyn Mapped>),
    Record(&'a Record),
    Records(&'a [Record]),
}

impl<'a, T: Mapped> From<&'a T> for Payload<'a> {
    fn from(value: &'a T) -> Self {
        Payload::Object(value)
    }
}

impl<'a, T: Mapped> From<&'a [T]> for Payload<'a> {
    fn from(value: &'a [T]) -> Self {
        Payload::Objects(value.iter().map(|v| v as &dyn Mapped).collect())
    }
}

impl<'a, T: Mapped> From<&'a Vec<T>> for Payload<'a> {
    fn from(value: &'a Vec<T>) -> Self {
        value.as_slice().into()
    }
}

impl<'a> From<&'a Record> for Payload<'a> {
    fn from(value: &'a Record) -> Self {
        Payload::Record(value)
    }
}

impl<'a> From<&'a [Record]> for Payload<'a> {
    fn from(value: &'a [Record]) -> Self {
        Payload::Records(value)
    }
}

impl<'a> From<&'a Vec<Record>> for Payload<'a> {
    fn from(value: &'a Vec<Record>) -> Self {
        Payload::Records(value.as_slice())
    }
}

/// Renders a [`Builder`], and possibly a payload, into SQL text and its bindings.
///
/// Compilation never mutates the builder.
pub struct Grammar<'a> {
    syntax: &'a dyn Syntax,
    naming: &'a dyn NamingStyle,
}

impl<'a> Grammar<'a> {
    pub fn new(syntax: &'a dyn Syntax, naming: &'a dyn NamingStyle) -> Self {
        Self { syntax, naming }
    }

    fn check(builder: &Builder) -> Result<()> {
        match builder.error() {
            Some(error) => Err(error.clone().into()),
            None => Ok(()),
        }
    }

    /// `select` statement, the bindings are the ones of the builder.
    pub fn compile_select(&self, builder: &Builder) -> Result<String> {
        Self::check(builder)?;
        let table = builder.get_table();
        if table.is_empty() {
            return Err(StrataError::TableMissing.into());
        }
        let (order_columns, direction) = builder.get_order();
        let steps = [
            self.compile_columns(builder.is_distinct(), builder.get_columns()),
            self.compile_from(table),
            self.compile_joins(builder.get_joins())?,
            self.compile_where(builder.get_wheres(), true)?,
            self.compile_order_by(order_columns, direction),
            self.compile_limit(builder.get_limit(), builder.get_offset()),
        ];
        let mut out = String::with_capacity(128);
        separated_by(&mut out, steps, |out, v| out.push_str(&v), " ");
        Ok(out)
    }

    pub fn compile_columns(&self, distinct: bool, columns: &[String]) -> String {
        let mut out = String::from(if distinct {
            "select distinct "
        } else {
            "select "
        });
        if columns.is_empty() {
            out.push('*');
        } else {
            self.syntax.write_column_list(&mut out, columns);
        }
        out
    }

    pub fn compile_from(&self, table: &TableRef) -> String {
        let mut out = String::from("from ");
        self.syntax.write_table_ref(&mut out, table);
        out
    }

    pub fn compile_joins(&self, joins: &[Join]) -> Result<String> {
        let mut out = String::new();
        for join in joins {
            if !out.is_empty() {
                out.push(' ');
            }
            let _ = write!(out, "{} ", join.join);
            self.syntax.write_table_ref(&mut out, &join.table);
            for (i, condition) in join.conditions.iter().enumerate() {
                if i == 0 {
                    out.push_str(" on ");
                } else {
                    let _ = write!(out, " {} ", condition.logic);
                }
                self.syntax.write_column(&mut out, &condition.first);
                let _ = write!(out, " {} ", condition.operator);
                self.syntax.write_column(&mut out, &condition.second);
            }
            let wheres = self.compile_where(join.get_wheres(), false)?;
            if !wheres.is_empty() {
                out.push(' ');
                out.push_str(&wheres);
            }
        }
        Ok(out)
    }

    /// Predicates in their declaration order. With `remove_leading` the clause starts
    /// with `where` and the first connective is dropped.
    pub fn compile_where(&self, wheres: &[Predicate], remove_leading: bool) -> Result<String> {
        let mut out = String::new();
        for predicate in wheres {
            let mut sql = String::new();
            match predicate {
                Predicate::Basic {
                    logic,
                    column,
                    operator,
                    value,
                } => {
                    let mut placeholders = String::new();
                    self.syntax.write_placeholders_for(&mut placeholders, value);
                    if placeholders.is_empty() {
                        continue;
                    }
                    let _ = write!(sql, "{} ", logic);
                    self.syntax.write_column(&mut sql, column);
                    let _ = write!(sql, " {} {}", operator, placeholders);
                }
                Predicate::In {
                    logic,
                    column,
                    values,
                    not,
                } => {
                    let mut placeholders = String::new();
                    self.syntax.write_placeholders_for(&mut placeholders, values);
                    if placeholders.is_empty() {
                        continue;
                    }
                    let _ = write!(sql, "{} ", logic);
                    self.syntax.write_column(&mut sql, column);
                    let not = if *not { "not " } else { "" };
                    let _ = write!(sql, " {not}in ({placeholders})");
                }
                Predicate::Between { logic, column, not } => {
                    let _ = write!(sql, "{} ", logic);
                    self.syntax.write_column(&mut sql, column);
                    let not = if *not { "not " } else { "" };
                    let _ = write!(sql, " {not}between ? and ?");
                }
                Predicate::Null { logic, column, not } => {
                    let _ = write!(sql, "{} ", logic);
                    self.syntax.write_column(&mut sql, column);
                    let not = if *not { "not " } else { "" };
                    let _ = write!(sql, " is {not}null");
                }
                Predicate::Sub {
                    logic,
                    column,
                    operator,
                    builder,
                } => {
                    let sub = self.compile_select(builder)?;
                    let _ = write!(sql, "{} ", logic);
                    self.syntax.write_column(&mut sql, column);
                    let _ = write!(sql, " {operator} ({sub})");
                }
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&sql);
        }
        if out.is_empty() || !remove_leading {
            return Ok(out);
        }
        let trimmed = out
            .strip_prefix("and ")
            .or_else(|| out.strip_prefix("or "))
            .unwrap_or(&out);
        Ok(format!("where {trimmed}"))
    }

    pub fn compile_order_by(&self, columns: &[String], direction: Direction) -> String {
        if columns.is_empty() {
            return String::new();
        }
        let mut out = String::from("order by ");
        self.syntax.write_column_list(&mut out, columns);
        let _ = write!(out, " {direction}");
        out
    }

    pub fn compile_limit(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        match (limit, offset) {
            (Some(limit), Some(offset)) => format!("limit {limit} offset {offset}"),
            (Some(limit), None) => format!("limit {limit}"),
            (None, Some(offset)) => format!("offset {offset}"),
            (None, None) => String::new(),
        }
    }

    /// Single row lookup by primary key, bound to one parameter.
    pub fn compile_find(
        &self,
        distinct: bool,
        columns: &[String],
        table: &TableRef,
        primary_key: &str,
    ) -> String {
        let mut out = self.compile_columns(distinct, columns);
        out.push_str(" from ");
        self.syntax.write_table_ref(&mut out, table);
        out.push_str(" where ");
        self.syntax.write_column(&mut out, primary_key);
        out.push_str(" = ?");
        out
    }

    pub fn compile_insert(
        &self,
        payload: &Payload<'_>,
        builder: &Builder,
    ) -> Result<(String, Vec<Value>)> {
        Self::check(builder)?;
        let (table, columns, rows, bindings) = match payload {
            Payload::Object(object) => {
                let (table, columns, values) = self.insert_object(*object)?;
                (table, columns, 1, values)
            }
            Payload::Objects(objects) => self.insert_objects(objects)?,
            Payload::Record(record) => {
                self.insert_records(std::slice::from_ref(*record), builder)?
            }
            Payload::Records(records) => self.insert_records(records, builder)?,
        };
        let table = match builder.get_table() {
            v if !v.is_empty() => v.name.clone(),
            _ => table,
        };
        if table.is_empty() {
            return Err(StrataError::TableMissing.into());
        }
        let mut out = String::with_capacity(64 + columns.len() * 16 + rows * columns.len() * 2);
        out.push_str("insert into ");
        self.syntax.write_table(&mut out, &table);
        out.push_str(" (");
        self.syntax.write_column_list(&mut out, &columns);
        out.push_str(") values ");
        separated_by(
            &mut out,
            0..rows,
            |out, _| {
                out.push('(');
                self.syntax.write_placeholders(out, columns.len());
                out.push(')');
            },
            ",",
        );
        Ok((out, bindings))
    }

    fn insert_object(&self, object: &dyn Mapped) -> Result<(String, Vec<String>, Vec<Value>)> {
        let mut mapper = Mapper::new(self.syntax, self.naming);
        mapper.parse(object, ParseMode::Insert)?;
        let (columns, values) = mapper.get_insert_column_and_values();
        if columns.is_empty() {
            return Err(StrataError::ColumnSetEmpty("insert struct").into());
        }
        Ok((mapper.table().name.clone(), columns, values))
    }

    /// The first element mapped successfully decides the columns, failing elements are skipped.
    fn insert_objects(
        &self,
        objects: &[&dyn Mapped],
    ) -> Result<(String, Vec<String>, usize, Vec<Value>)> {
        if objects.is_empty() {
            return Err(StrataError::ObjectNil.into());
        }
        let mut table = String::new();
        let mut columns = Vec::<String>::new();
        let mut rows = 0;
        let mut bindings = Vec::new();
        for (i, object) in objects.iter().enumerate() {
            if columns.is_empty() {
                match self.insert_object(*object) {
                    Ok((t, c, v)) => {
                        table = t;
                        columns = c;
                        bindings.extend(v);
                        rows += 1;
                    }
                    Err(e) => log::warn!("Skipping element {} of the batch insert: {:#}", i, e),
                }
                continue;
            }
            let mut mapper = Mapper::new(self.syntax, self.naming);
            match mapper.parse(*object, ParseMode::Insert) {
                Ok(()) => {
                    bindings.extend(mapper.get_values_by_columns(&columns));
                    rows += 1;
                }
                Err(e) => log::warn!("Skipping element {} of the batch insert: {:#}", i, e),
            }
        }
        if rows == 0 {
            return Err(StrataError::ColumnSetEmpty("insert struct batch").into());
        }
        Ok((table, columns, rows, bindings))
    }

    /// Columns are the sorted keys of the first record, missing keys bind `NULL`.
    fn insert_records(
        &self,
        records: &[Record],
        builder: &Builder,
    ) -> Result<(String, Vec<String>, usize, Vec<Value>)> {
        if builder.get_table().is_empty() {
            return Err(StrataError::TableMissing.into());
        }
        let Some(first) = records.first() else {
            return Err(StrataError::ColumnSetEmpty("insert map").into());
        };
        if first.is_empty() {
            return Err(StrataError::ColumnSetEmpty("insert map").into());
        }
        let columns = first.keys().cloned().collect::<Vec<_>>();
        let bindings = records
            .iter()
            .flat_map(|record| {
                columns
                    .iter()
                    .map(|c| record.get(c).cloned().unwrap_or(Value::Null))
            })
            .collect();
        Ok((
            builder.get_table().name.clone(),
            columns,
            records.len(),
            bindings,
        ))
    }

    /// `update` statement, bound as join values, set values, then where values.
    pub fn compile_update(
        &self,
        payload: &Payload<'_>,
        builder: &Builder,
    ) -> Result<(String, Vec<Value>)> {
        Self::check(builder)?;
        let (table, columns, values) = match payload {
            Payload::Object(object) => {
                let mut mapper = Mapper::new(self.syntax, self.naming);
                mapper.set_table(builder.get_table().clone());
                mapper.set_join_map(builder.join_map());
                mapper.parse(*object, ParseMode::Update)?;
                let (columns, values) = mapper.get_update_column_and_values();
                if columns.is_empty() {
                    return Err(StrataError::ColumnSetEmpty("update struct").into());
                }
                (mapper.table().clone(), columns, values)
            }
            Payload::Record(record) => {
                if builder.get_table().is_empty() {
                    return Err(StrataError::TableMissing.into());
                }
                if record.is_empty() {
                    return Err(StrataError::ColumnSetEmpty("update map").into());
                }
                let (columns, values): (Vec<String>, Vec<Value>) =
                    record.iter().map(|(k, v)| (k.clone(), v.clone())).unzip();
                (builder.get_table().clone(), columns, values)
            }
            Payload::Objects(..) | Payload::Records(..) => {
                return Err(StrataError::UnsupportedValueShape(
                    "update accepts a single struct or a single map",
                )
                .into());
            }
        };
        if table.is_empty() {
            return Err(StrataError::TableMissing.into());
        }
        let mut out = String::from("update ");
        self.syntax.write_table_ref(&mut out, &table);
        let joins = self.compile_joins(builder.get_joins())?;
        if !joins.is_empty() {
            out.push(' ');
            out.push_str(&joins);
        }
        out.push_str(" set ");
        separated_by(
            &mut out,
            &columns,
            |out, v| {
                self.syntax.write_column(out, v);
                out.push_str(" = ?");
            },
            ",",
        );
        let wheres = self.compile_where(builder.get_wheres(), true)?;
        if !wheres.is_empty() {
            out.push(' ');
            out.push_str(&wheres);
        }
        let mut bindings = builder.binding().bucket_bindings(Bucket::Join);
        bindings.extend(builder.binding().prepare_update_binding(values));
        Ok((out, bindings))
    }

    /// `delete` statement, bound to the where values only.
    pub fn compile_delete(&self, builder: &Builder) -> Result<String> {
        Self::check(builder)?;
        let table = builder.get_table();
        if table.is_empty() {
            return Err(StrataError::TableMissing.into());
        }
        let mut out = String::from("delete from ");
        self.syntax.write_table(&mut out, &table.name);
        let wheres = self.compile_where(builder.get_wheres(), true)?;
        if !wheres.is_empty() {
            out.push(' ');
            out.push_str(&wheres);
        }
        Ok(out)
    }
}
