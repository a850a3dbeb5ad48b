use crate::{
    Builder, Driver, Error, Grammar, Join, Mapped, Mapper, NamingStyle, Payload, QueryLogger,
    Record, Result, Rows, RowsAffected, Statement, StatementCache, StrataError, Syntax,
    Transaction, Value, truncate_long,
};
use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};
use tokio::time::{Instant, timeout_at};

type RowsOf<D> = <<D as Driver>::Statement as Statement>::Rows;

struct ActiveTransaction<T> {
    transaction: T,
    deadline: Option<Instant>,
}

impl<T> ActiveTransaction<T> {
    fn expired(&self) -> bool {
        self.deadline.is_some_and(|v| Instant::now() >= v)
    }
}

/// Runs `future`, failing with [`StrataError::DeadlineExceeded`] once `deadline` is reached.
async fn within<T>(
    deadline: Option<Instant>,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    let Some(deadline) = deadline else {
        return future.await;
    };
    if Instant::now() >= deadline {
        return Err(StrataError::DeadlineExceeded.into());
    }
    match timeout_at(deadline, future).await {
        Ok(result) => result,
        Err(..) => Err(StrataError::DeadlineExceeded.into()),
    }
}

/// Copies the values of one row into the scan buffers of the requested columns.
fn fill(mapper: &mut Mapper<'_>, columns: &[String], values: Vec<Value>) {
    for (target, value) in mapper.get_address_by_column(columns).into_iter().zip(values) {
        if let Some(target) = target {
            *target = value;
        }
    }
}

fn record(columns: &[String], values: Vec<Value>) -> Record {
    columns
        .iter()
        .cloned()
        .zip(values.into_iter().map(Value::into_text_if_blob))
        .collect()
}

/// A unit of work on a connection: a query builder, a statement cache and possibly a transaction.
///
/// Builder calls accumulate until a terminal operation (`find`, `get`, `insert`, ...) runs
/// the statement, the builder is then reset whatever the outcome. While a transaction is
/// active every statement of the session runs inside it.
pub struct Session<D: Driver> {
    driver: Arc<D>,
    syntax: Arc<dyn Syntax>,
    naming: Arc<dyn NamingStyle>,
    shared: Option<Arc<StatementCache<D::Statement>>>,
    cache: StatementCache<D::Statement>,
    logger: Option<Arc<dyn QueryLogger>>,
    builder: Builder,
    transaction: Option<ActiveTransaction<D::Transaction>>,
}

impl<D: Driver> Session<D> {
    pub(crate) fn new(
        driver: Arc<D>,
        syntax: Arc<dyn Syntax>,
        naming: Arc<dyn NamingStyle>,
        shared: Option<Arc<StatementCache<D::Statement>>>,
        logger: Option<Arc<dyn QueryLogger>>,
    ) -> Self {
        Self {
            builder: Builder::new(syntax.clone()),
            driver,
            syntax,
            naming,
            shared,
            cache: StatementCache::new(),
            logger,
            transaction: None,
        }
    }

    pub fn builder(&self) -> &Builder {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut Builder {
        &mut self.builder
    }

    /// Statements prepared by this session alone.
    pub fn cache(&self) -> &StatementCache<D::Statement> {
        &self.cache
    }

    pub fn table(&mut self, table: &str) -> &mut Self {
        self.builder.table(table);
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.builder.distinct();
        self
    }

    pub fn select<S: Into<String>>(&mut self, columns: impl IntoIterator<Item = S>) -> &mut Self {
        self.builder.select(columns);
        self
    }

    pub fn join(&mut self, table: &str, first: &str, operator: &str, second: &str) -> &mut Self {
        self.builder.join(table, first, operator, second);
        self
    }

    pub fn join_with(&mut self, table: &str, f: impl FnOnce(&mut Join)) -> &mut Self {
        self.builder.join_with(table, f);
        self
    }

    pub fn left_join(
        &mut self,
        table: &str,
        first: &str,
        operator: &str,
        second: &str,
    ) -> &mut Self {
        self.builder.left_join(table, first, operator, second);
        self
    }

    pub fn left_join_with(&mut self, table: &str, f: impl FnOnce(&mut Join)) -> &mut Self {
        self.builder.left_join_with(table, f);
        self
    }

    pub fn right_join(
        &mut self,
        table: &str,
        first: &str,
        operator: &str,
        second: &str,
    ) -> &mut Self {
        self.builder.right_join(table, first, operator, second);
        self
    }

    pub fn right_join_with(&mut self, table: &str, f: impl FnOnce(&mut Join)) -> &mut Self {
        self.builder.right_join_with(table, f);
        self
    }

    pub fn and_where(
        &mut self,
        column: &str,
        operator: &str,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.builder.and_where(column, operator, value);
        self
    }

    pub fn or_where(&mut self, column: &str, operator: &str, value: impl Into<Value>) -> &mut Self {
        self.builder.or_where(column, operator, value);
        self
    }

    pub fn where_in<V: Into<Value>>(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.builder.where_in(column, values);
        self
    }

    pub fn where_not_in<V: Into<Value>>(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.builder.where_not_in(column, values);
        self
    }

    pub fn or_where_in<V: Into<Value>>(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.builder.or_where_in(column, values);
        self
    }

    pub fn or_where_not_in<V: Into<Value>>(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.builder.or_where_not_in(column, values);
        self
    }

    pub fn where_between(
        &mut self,
        column: &str,
        first: impl Into<Value>,
        last: impl Into<Value>,
    ) -> &mut Self {
        self.builder.where_between(column, first, last);
        self
    }

    pub fn where_not_between(
        &mut self,
        column: &str,
        first: impl Into<Value>,
        last: impl Into<Value>,
    ) -> &mut Self {
        self.builder.where_not_between(column, first, last);
        self
    }

    pub fn or_where_between(
        &mut self,
        column: &str,
        first: impl Into<Value>,
        last: impl Into<Value>,
    ) -> &mut Self {
        self.builder.or_where_between(column, first, last);
        self
    }

    pub fn or_where_not_between(
        &mut self,
        column: &str,
        first: impl Into<Value>,
        last: impl Into<Value>,
    ) -> &mut Self {
        self.builder.or_where_not_between(column, first, last);
        self
    }

    pub fn where_null(&mut self, column: &str) -> &mut Self {
        self.builder.where_null(column);
        self
    }

    pub fn where_not_null(&mut self, column: &str) -> &mut Self {
        self.builder.where_not_null(column);
        self
    }

    pub fn or_where_null(&mut self, column: &str) -> &mut Self {
        self.builder.or_where_null(column);
        self
    }

    pub fn or_where_not_null(&mut self, column: &str) -> &mut Self {
        self.builder.or_where_not_null(column);
        self
    }

    pub fn where_sub(
        &mut self,
        column: &str,
        operator: &str,
        f: impl FnOnce(&mut Builder),
    ) -> &mut Self {
        self.builder.where_sub(column, operator, f);
        self
    }

    pub fn or_where_sub(
        &mut self,
        column: &str,
        operator: &str,
        f: impl FnOnce(&mut Builder),
    ) -> &mut Self {
        self.builder.or_where_sub(column, operator, f);
        self
    }

    pub fn order_by(&mut self, column: &str, direction: &str) -> &mut Self {
        self.builder.order_by(column, direction);
        self
    }

    pub fn order_by_multi<S: Into<String>>(
        &mut self,
        columns: impl IntoIterator<Item = S>,
        direction: &str,
    ) -> &mut Self {
        self.builder.order_by_multi(columns, direction);
        self
    }

    pub fn skip(&mut self, n: i64) -> &mut Self {
        self.builder.skip(n);
        self
    }

    pub fn take(&mut self, n: i64) -> &mut Self {
        self.builder.take(n);
        self
    }

    fn check(&self) -> Result<()> {
        match self.builder.error() {
            Some(error) => Err(error.clone().into()),
            None => Ok(()),
        }
    }

    fn reset<T>(&mut self, result: Result<T>) -> Result<T> {
        self.builder.reset();
        result
    }

    /// Mapper of `object` for a select on the builder table, the builder adopts the
    /// table of the object when it has none.
    fn select_mapper<'a>(
        &mut self,
        syntax: &'a dyn Syntax,
        naming: &'a dyn NamingStyle,
        join_map: Option<&'a HashMap<String, String>>,
        object: &mut dyn Mapped,
    ) -> Result<Mapper<'a>> {
        let mut mapper = Mapper::new(syntax, naming);
        mapper.set_table(self.builder.get_table().clone());
        if let Some(join_map) = join_map {
            mapper.set_join_map(join_map);
        }
        mapper.parse_select(object)?;
        if self.builder.get_table().is_empty() {
            let table = mapper.table().clone();
            self.builder.table(&table.to_string());
        }
        Ok(mapper)
    }

    /// Columns to read: the builder selection, then the requested ones, then every mapped column.
    fn selected_columns(&mut self, mapper: &Mapper<'_>, columns: &[&str]) -> Vec<String> {
        if !self.builder.get_columns().is_empty() {
            return self.builder.get_columns().to_vec();
        }
        let selected = if columns.is_empty() {
            mapper.columns()
        } else {
            columns.iter().map(|v| v.to_string()).collect::<Vec<_>>()
        };
        self.builder.select(selected.clone());
        selected
    }

    /// Loads the row with primary key `id` into `object`, returns false when there is none.
    pub async fn find<T: Mapped>(
        &mut self,
        id: impl Into<Value>,
        object: &mut T,
        columns: &[&str],
    ) -> Result<bool> {
        let result = self.find_object(id.into(), object, columns).await;
        self.reset(result)
    }

    async fn find_object(
        &mut self,
        id: Value,
        object: &mut dyn Mapped,
        columns: &[&str],
    ) -> Result<bool> {
        self.check()?;
        let (syntax, naming) = (self.syntax.clone(), self.naming.clone());
        let mut mapper = self.select_mapper(&*syntax, &*naming, None, object)?;
        let selected = self.selected_columns(&mapper, columns);
        let sql = Grammar::new(&*syntax, &*naming).compile_find(
            self.builder.is_distinct(),
            &selected,
            mapper.table(),
            &mapper.primary_key(),
        );
        let mut rows = self.query(&sql, &[id]).await?;
        let Some(values) = rows.next().await? else {
            return Ok(false);
        };
        fill(&mut mapper, &selected, values);
        mapper.assign_address_value(object)?;
        Ok(true)
    }

    /// The row with primary key `id` of the builder table, as a record.
    pub async fn find_map(
        &mut self,
        id: impl Into<Value>,
        primary_key: &str,
        columns: &[&str],
    ) -> Result<Option<Record>> {
        let result = self.find_record(id.into(), primary_key, columns).await;
        self.reset(result)
    }

    async fn find_record(
        &mut self,
        id: Value,
        primary_key: &str,
        columns: &[&str],
    ) -> Result<Option<Record>> {
        self.check()?;
        if self.builder.get_table().is_empty() {
            return Err(StrataError::TableMissing.into());
        }
        if primary_key.is_empty() {
            return Err(Error::msg("The primary key can not be empty"));
        }
        let columns = columns.iter().map(|v| v.to_string()).collect::<Vec<_>>();
        let sql = Grammar::new(&*self.syntax, &*self.naming).compile_find(
            self.builder.is_distinct(),
            &columns,
            self.builder.get_table(),
            primary_key,
        );
        let mut rows = self.query(&sql, &[id]).await?;
        Ok(rows
            .next()
            .await?
            .map(|values| record(rows.columns(), values)))
    }

    /// Loads the first matching row into `object`, returns false when there is none.
    pub async fn first<T: Mapped>(&mut self, object: &mut T, columns: &[&str]) -> Result<bool> {
        let result = self.first_object(object, columns).await;
        self.reset(result)
    }

    async fn first_object(&mut self, object: &mut dyn Mapped, columns: &[&str]) -> Result<bool> {
        self.check()?;
        let (syntax, naming) = (self.syntax.clone(), self.naming.clone());
        let join_map = self.builder.join_map().clone();
        let mut mapper = self.select_mapper(&*syntax, &*naming, Some(&join_map), object)?;
        let selected = self.selected_columns(&mapper, columns);
        self.builder.skip(0).take(1);
        let sql = Grammar::new(&*syntax, &*naming).compile_select(&self.builder)?;
        let bindings = self.builder.bindings();
        let mut rows = self.query(&sql, &bindings).await?;
        let Some(values) = rows.next().await? else {
            return Ok(false);
        };
        fill(&mut mapper, &selected, values);
        mapper.assign_address_value(object)?;
        Ok(true)
    }

    pub async fn first_map(&mut self) -> Result<Option<Record>> {
        let result = self.first_record().await;
        self.reset(result)
    }

    async fn first_record(&mut self) -> Result<Option<Record>> {
        self.builder.skip(0).take(1);
        let sql = Grammar::new(&*self.syntax, &*self.naming).compile_select(&self.builder)?;
        let bindings = self.builder.bindings();
        let mut rows = self.query(&sql, &bindings).await?;
        Ok(rows
            .next()
            .await?
            .map(|values| record(rows.columns(), values)))
    }

    /// Every matching row, each one loaded into a new `T`.
    pub async fn get<T: Mapped + Default>(&mut self, columns: &[&str]) -> Result<Vec<T>> {
        let result = self.get_objects(columns).await;
        self.reset(result)
    }

    async fn get_objects<T: Mapped + Default>(&mut self, columns: &[&str]) -> Result<Vec<T>> {
        self.check()?;
        let (syntax, naming) = (self.syntax.clone(), self.naming.clone());
        let join_map = self.builder.join_map().clone();
        let mut prototype = T::default();
        let mut mapper = self.select_mapper(&*syntax, &*naming, Some(&join_map), &mut prototype)?;
        let selected = self.selected_columns(&mapper, columns);
        let sql = Grammar::new(&*syntax, &*naming).compile_select(&self.builder)?;
        let bindings = self.builder.bindings();
        let mut rows = self.query(&sql, &bindings).await?;
        let mut result = Vec::new();
        while let Some(values) = rows.next().await? {
            fill(&mut mapper, &selected, values);
            let mut object = T::default();
            crate::allocate(&mut object)?;
            mapper.assign_address_value(&mut object)?;
            result.push(object);
        }
        Ok(result)
    }

    pub async fn get_map(&mut self) -> Result<Vec<Record>> {
        let result = self.get_records().await;
        self.reset(result)
    }

    async fn get_records(&mut self) -> Result<Vec<Record>> {
        let sql = Grammar::new(&*self.syntax, &*self.naming).compile_select(&self.builder)?;
        let bindings = self.builder.bindings();
        let mut rows = self.query(&sql, &bindings).await?;
        let mut result = Vec::new();
        while let Some(values) = rows.next().await? {
            result.push(record(rows.columns(), values));
        }
        Ok(result)
    }

    /// Inserts one or many structs or records.
    pub async fn insert<'p>(&mut self, payload: impl Into<Payload<'p>>) -> Result<RowsAffected> {
        let compiled = Grammar::new(&*self.syntax, &*self.naming)
            .compile_insert(&payload.into(), &self.builder);
        let result = match compiled {
            Ok((sql, bindings)) => self.execute(&sql, &bindings).await,
            Err(e) => Err(e),
        };
        self.reset(result)
    }

    /// Updates the rows matching the builder, returns the number of rows affected.
    pub async fn update<'p>(&mut self, payload: impl Into<Payload<'p>>) -> Result<u64> {
        let compiled = Grammar::new(&*self.syntax, &*self.naming)
            .compile_update(&payload.into(), &self.builder);
        let result = match compiled {
            Ok((sql, bindings)) => self.execute(&sql, &bindings).await,
            Err(e) => Err(e),
        };
        self.reset(result.map(|v| v.rows_affected))
    }

    /// Deletes the rows matching the builder, returns the number of rows affected.
    pub async fn delete(&mut self) -> Result<u64> {
        let compiled = Grammar::new(&*self.syntax, &*self.naming).compile_delete(&self.builder);
        let result = match compiled {
            Ok(sql) => {
                let bindings = self.builder.binding().prepare_delete_binding();
                self.execute(&sql, &bindings).await
            }
            Err(e) => Err(e),
        };
        self.reset(result.map(|v| v.rows_affected))
    }

    /// Runs a raw statement, the builder is left untouched.
    pub async fn exec(&mut self, sql: &str, bindings: &[Value]) -> Result<RowsAffected> {
        self.execute(sql, bindings).await
    }

    pub fn to_sql(&mut self) -> Result<String> {
        let result = Grammar::new(&*self.syntax, &*self.naming).compile_select(&self.builder);
        self.reset(result)
    }

    pub fn to_insert_sql<'p>(&mut self, payload: impl Into<Payload<'p>>) -> Result<String> {
        let result = Grammar::new(&*self.syntax, &*self.naming)
            .compile_insert(&payload.into(), &self.builder)
            .map(|(sql, _)| sql);
        self.reset(result)
    }

    pub fn to_update_sql<'p>(&mut self, payload: impl Into<Payload<'p>>) -> Result<String> {
        let result = Grammar::new(&*self.syntax, &*self.naming)
            .compile_update(&payload.into(), &self.builder)
            .map(|(sql, _)| sql);
        self.reset(result)
    }

    pub fn to_delete_sql(&mut self) -> Result<String> {
        let result = Grammar::new(&*self.syntax, &*self.naming).compile_delete(&self.builder);
        self.reset(result)
    }

    fn log(&self, sql: &str, bindings: &[Value]) {
        log::debug!("{}", truncate_long!(sql));
        if let Some(logger) = &self.logger {
            logger.append(sql, bindings);
        }
    }

    /// The connection cache first, then the session one, then the driver.
    async fn prepare(&self, sql: &str) -> Result<Arc<D::Statement>> {
        if let Some(statement) = self.shared.as_ref().and_then(|v| v.get(sql)) {
            return Ok(statement);
        }
        if let Some(statement) = self.cache.get(sql) {
            return Ok(statement);
        }
        let statement = Arc::new(self.driver.prepare(sql).await?);
        Ok(match &self.shared {
            Some(shared) => shared.insert(sql, statement),
            None => self.cache.insert(sql, statement),
        })
    }

    async fn query(&mut self, sql: &str, bindings: &[Value]) -> Result<RowsOf<D>> {
        self.log(sql, bindings);
        let result = async {
            let statement = self.prepare(sql).await?;
            match &mut self.transaction {
                Some(active) => {
                    within(
                        active.deadline,
                        active.transaction.query(&statement, bindings),
                    )
                    .await
                }
                None => statement.query(bindings).await,
            }
        }
        .await;
        result.map_err(|e| {
            let e = e.context(format!("While running the query:\n{}", truncate_long!(sql)));
            log::error!("{:#}", e);
            e
        })
    }

    async fn execute(&mut self, sql: &str, bindings: &[Value]) -> Result<RowsAffected> {
        self.log(sql, bindings);
        let result = async {
            let statement = self.prepare(sql).await?;
            match &mut self.transaction {
                Some(active) => {
                    within(
                        active.deadline,
                        active.transaction.exec(&statement, bindings),
                    )
                    .await
                }
                None => statement.exec(bindings).await,
            }
        }
        .await;
        result.map_err(|e| {
            let e = e.context(format!("While executing the query:\n{}", truncate_long!(sql)));
            log::error!("{:#}", e);
            e
        })
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// Begins a transaction, every following statement of the session runs inside it.
    /// With a `timeout` the statements fail with [`StrataError::DeadlineExceeded`] once it elapses.
    pub async fn begin(&mut self, timeout: Option<Duration>) -> Result<()> {
        if self.transaction.is_some() {
            return Err(StrataError::TransactionConflict.into());
        }
        let transaction = self.driver.begin().await.map_err(|e| {
            let e = e.context("While beginning a transaction");
            log::error!("{:#}", e);
            e
        })?;
        self.transaction = Some(ActiveTransaction {
            transaction,
            deadline: timeout.map(|v| Instant::now() + v),
        });
        Ok(())
    }

    /// Commits the active transaction, an expired one is rolled back instead.
    pub async fn commit(&mut self) -> Result<()> {
        let Some(active) = self.transaction.take() else {
            return Err(StrataError::NoTransaction.into());
        };
        if active.expired() {
            if let Err(e) = active.transaction.rollback().await {
                log::error!("{:#}", e.context("While rolling back an expired transaction"));
            }
            return Err(StrataError::DeadlineExceeded.into());
        }
        within(active.deadline, active.transaction.commit())
            .await
            .map_err(|e| {
                let e = e.context("While committing the transaction");
                log::error!("{:#}", e);
                e
            })
    }

    pub async fn rollback(&mut self) -> Result<()> {
        let Some(active) = self.transaction.take() else {
            return Err(StrataError::NoTransaction.into());
        };
        active.transaction.rollback().await.map_err(|e| {
            let e = e.context("While rolling back the transaction");
            log::error!("{:#}", e);
            e
        })
    }

    /// Rolls back a transaction left open and closes the statements prepared by the session.
    pub async fn close(&mut self) -> Result<()> {
        if self.transaction.is_some() {
            log::warn!("Closing a session with an open transaction, rolling it back");
            self.rollback().await?;
        }
        self.cache.close().await
    }
}
