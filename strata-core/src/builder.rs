use crate::{
    Binding, Bucket, Direction, Join, JoinType, Logic, Predicate, StrataError, Syntax, TableRef,
    Value,
};
use std::{collections::HashMap, sync::Arc};

/// Shape of one statement: table, columns, joins, predicates, order and paging.
///
/// Values are collected in a [`Binding`] while the predicates are added, so the
/// binding order always follows the order of the placeholders. The first invalid
/// call is remembered and reported when the statement is compiled.
#[derive(Clone)]
pub struct Builder {
    syntax: Arc<dyn Syntax>,
    error: Option<StrataError>,
    distinct: bool,
    columns: Vec<String>,
    table: TableRef,
    joins: Vec<Join>,
    join_map: HashMap<String, String>,
    wheres: Vec<Predicate>,
    order_columns: Vec<String>,
    direction: Direction,
    limit: Option<u64>,
    offset: Option<u64>,
    binding: Binding,
}

impl Builder {
    pub fn new(syntax: Arc<dyn Syntax>) -> Self {
        Self {
            syntax,
            error: None,
            distinct: false,
            columns: Vec::new(),
            table: TableRef::default(),
            joins: Vec::new(),
            join_map: HashMap::new(),
            wheres: Vec::new(),
            order_columns: Vec::new(),
            direction: Direction::Asc,
            limit: None,
            offset: None,
            binding: Binding::new(),
        }
    }

    /// Back to an empty statement, the syntax is kept.
    pub fn reset(&mut self) {
        *self = Builder::new(self.syntax.clone());
    }

    pub fn syntax(&self) -> &dyn Syntax {
        self.syntax.as_dyn()
    }

    /// Sets the table, optionally as `"name as alias"`.
    pub fn table(&mut self, table: &str) -> &mut Self {
        self.table = self.syntax.parse_table(table);
        self.join_map
            .insert(self.table.name.clone(), self.table.alias.clone());
        self
    }

    pub fn set_alias(&mut self, alias: &str) -> &mut Self {
        self.table.alias = alias.into();
        self.join_map
            .insert(self.table.name.clone(), self.table.alias.clone());
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    /// Replaces the selected columns.
    pub fn select<S: Into<String>>(&mut self, columns: impl IntoIterator<Item = S>) -> &mut Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn join(&mut self, table: &str, first: &str, operator: &str, second: &str) -> &mut Self {
        self.add_join(JoinType::Inner, table, |j| {
            j.on(first, operator, second);
        })
    }

    pub fn left_join(
        &mut self,
        table: &str,
        first: &str,
        operator: &str,
        second: &str,
    ) -> &mut Self {
        self.add_join(JoinType::Left, table, |j| {
            j.on(first, operator, second);
        })
    }

    pub fn right_join(
        &mut self,
        table: &str,
        first: &str,
        operator: &str,
        second: &str,
    ) -> &mut Self {
        self.add_join(JoinType::Right, table, |j| {
            j.on(first, operator, second);
        })
    }

    pub fn join_with(&mut self, table: &str, f: impl FnOnce(&mut Join)) -> &mut Self {
        self.add_join(JoinType::Inner, table, f)
    }

    pub fn left_join_with(&mut self, table: &str, f: impl FnOnce(&mut Join)) -> &mut Self {
        self.add_join(JoinType::Left, table, f)
    }

    pub fn right_join_with(&mut self, table: &str, f: impl FnOnce(&mut Join)) -> &mut Self {
        self.add_join(JoinType::Right, table, f)
    }

    fn add_join(&mut self, join: JoinType, table: &str, f: impl FnOnce(&mut Join)) -> &mut Self {
        let table = self.syntax.parse_table(table);
        let mut join = Join::new(join, table, Builder::new(self.syntax.clone()));
        f(&mut join);
        if let Some(error) = join.error.clone() {
            self.fail(error);
        }
        if join.conditions.is_empty() {
            log::warn!("Skipping the join of `{}`, it has no conditions", join.table);
            return self;
        }
        self.join_map
            .insert(join.table.name.clone(), join.table.alias.clone());
        // Join predicates are written before the where clause.
        self.binding.merge_into(Bucket::Join, &join.binding);
        self.joins.push(join);
        self
    }

    pub fn and_where(
        &mut self,
        column: &str,
        operator: &str,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.basic(Logic::And, column, operator, value.into())
    }

    pub fn or_where(&mut self, column: &str, operator: &str, value: impl Into<Value>) -> &mut Self {
        self.basic(Logic::Or, column, operator, value.into())
    }

    fn basic(&mut self, logic: Logic, column: &str, operator: &str, value: Value) -> &mut Self {
        let operator = match self.syntax.prepare_where_operator(operator) {
            Ok(v) => v,
            Err(e) => return self.fail(e),
        };
        self.binding.add_binding(Bucket::Where, value.clone());
        self.wheres.push(Predicate::Basic {
            logic,
            column: column.into(),
            operator,
            value,
        });
        self
    }

    pub fn where_in<V: Into<Value>>(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.is_in(Logic::And, column, values, false)
    }

    pub fn where_not_in<V: Into<Value>>(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.is_in(Logic::And, column, values, true)
    }

    pub fn or_where_in<V: Into<Value>>(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.is_in(Logic::Or, column, values, false)
    }

    pub fn or_where_not_in<V: Into<Value>>(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.is_in(Logic::Or, column, values, true)
    }

    fn is_in<V: Into<Value>>(
        &mut self,
        logic: Logic,
        column: &str,
        values: impl IntoIterator<Item = V>,
        not: bool,
    ) -> &mut Self {
        let values = Value::List(values.into_iter().map(Into::into).collect());
        self.binding.add_binding(Bucket::Where, values.clone());
        self.wheres.push(Predicate::In {
            logic,
            column: column.into(),
            values,
            not,
        });
        self
    }

    pub fn where_between(
        &mut self,
        column: &str,
        first: impl Into<Value>,
        last: impl Into<Value>,
    ) -> &mut Self {
        self.between(Logic::And, column, first.into(), last.into(), false)
    }

    pub fn where_not_between(
        &mut self,
        column: &str,
        first: impl Into<Value>,
        last: impl Into<Value>,
    ) -> &mut Self {
        self.between(Logic::And, column, first.into(), last.into(), true)
    }

    pub fn or_where_between(
        &mut self,
        column: &str,
        first: impl Into<Value>,
        last: impl Into<Value>,
    ) -> &mut Self {
        self.between(Logic::Or, column, first.into(), last.into(), false)
    }

    pub fn or_where_not_between(
        &mut self,
        column: &str,
        first: impl Into<Value>,
        last: impl Into<Value>,
    ) -> &mut Self {
        self.between(Logic::Or, column, first.into(), last.into(), true)
    }

    fn between(
        &mut self,
        logic: Logic,
        column: &str,
        first: Value,
        last: Value,
        not: bool,
    ) -> &mut Self {
        let scalar = |v: &Value| v.is_bindable() && !v.is_null();
        if !scalar(&first) || !scalar(&last) {
            return self.fail(StrataError::InvalidBetweenValue);
        }
        self.binding.add_binding(Bucket::Where, first);
        self.binding.add_binding(Bucket::Where, last);
        self.wheres.push(Predicate::Between {
            logic,
            column: column.into(),
            not,
        });
        self
    }

    pub fn where_null(&mut self, column: &str) -> &mut Self {
        self.null(Logic::And, column, false)
    }

    pub fn where_not_null(&mut self, column: &str) -> &mut Self {
        self.null(Logic::And, column, true)
    }

    pub fn or_where_null(&mut self, column: &str) -> &mut Self {
        self.null(Logic::Or, column, false)
    }

    pub fn or_where_not_null(&mut self, column: &str) -> &mut Self {
        self.null(Logic::Or, column, true)
    }

    fn null(&mut self, logic: Logic, column: &str, not: bool) -> &mut Self {
        self.wheres.push(Predicate::Null {
            logic,
            column: column.into(),
            not,
        });
        self
    }

    /// `column operator (sub select)`, the sub select is described by `f`.
    pub fn where_sub(
        &mut self,
        column: &str,
        operator: &str,
        f: impl FnOnce(&mut Builder),
    ) -> &mut Self {
        self.sub(Logic::And, column, operator, f)
    }

    pub fn or_where_sub(
        &mut self,
        column: &str,
        operator: &str,
        f: impl FnOnce(&mut Builder),
    ) -> &mut Self {
        self.sub(Logic::Or, column, operator, f)
    }

    fn sub(
        &mut self,
        logic: Logic,
        column: &str,
        operator: &str,
        f: impl FnOnce(&mut Builder),
    ) -> &mut Self {
        let mut builder = Builder::new(self.syntax.clone());
        f(&mut builder);
        if let Some(error) = builder.error.clone() {
            return self.fail(error);
        }
        self.binding.merge_into(Bucket::Where, &builder.binding);
        self.wheres.push(Predicate::Sub {
            logic,
            column: column.into(),
            operator: if operator.is_empty() { "=" } else { operator }.into(),
            builder: Box::new(builder),
        });
        self
    }

    /// Adds a column to the order by clause, the direction applies to every column.
    pub fn order_by(&mut self, column: &str, direction: &str) -> &mut Self {
        self.order_by_multi([column], direction)
    }

    pub fn order_by_multi<S: Into<String>>(
        &mut self,
        columns: impl IntoIterator<Item = S>,
        direction: &str,
    ) -> &mut Self {
        self.direction = Direction::parse(direction);
        self.order_columns
            .extend(columns.into_iter().map(Into::into));
        self
    }

    /// Rows to skip, negative values count as zero.
    pub fn skip(&mut self, n: i64) -> &mut Self {
        self.offset = Some(n.max(0) as u64);
        self
    }

    /// Maximum number of rows, negative values are ignored.
    pub fn take(&mut self, n: i64) -> &mut Self {
        if n >= 0 {
            self.limit = Some(n as u64);
        }
        self
    }

    fn fail(&mut self, error: StrataError) -> &mut Self {
        if self.error.is_none() {
            self.error = Some(error);
        }
        self
    }

    pub fn error(&self) -> Option<&StrataError> {
        self.error.as_ref()
    }

    pub fn get_table(&self) -> &TableRef {
        &self.table
    }

    pub fn get_columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn get_joins(&self) -> &[Join] {
        &self.joins
    }

    /// Table to alias of the builder table and of every joined table.
    pub fn join_map(&self) -> &HashMap<String, String> {
        &self.join_map
    }

    pub fn get_wheres(&self) -> &[Predicate] {
        &self.wheres
    }

    pub fn get_order(&self) -> (&[String], Direction) {
        (&self.order_columns, self.direction)
    }

    pub fn get_limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn get_offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// Values in placeholder order.
    pub fn bindings(&self) -> Vec<Value> {
        self.binding.bindings()
    }
}
