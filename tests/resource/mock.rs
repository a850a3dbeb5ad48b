use log::LevelFilter;
use std::{
    collections::VecDeque,
    env,
    sync::{Arc, Mutex, MutexGuard},
};
use strata::{
    Config, Connection, ConnectionConfig, Driver, Error, MySqlSyntax, Result, Rows, RowsAffected,
    Statement, Syntax, Transaction, Value,
};

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// What the driver was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Prepare(String),
    Query(String, Vec<Value>),
    Exec(String, Vec<Value>),
    Begin,
    TransactionQuery(String, Vec<Value>),
    TransactionExec(String, Vec<Value>),
    Commit,
    Rollback,
    CloseStatement(String),
    Close,
}

#[derive(Default)]
struct State {
    events: Vec<Event>,
    results: VecDeque<(Vec<String>, VecDeque<Vec<Value>>)>,
    fail_exec: bool,
}

/// In memory driver: records every call and answers queries with the scripted rows.
#[derive(Default, Clone)]
pub struct MockDriver {
    state: Arc<Mutex<State>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Default::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Result of the next query.
    pub fn push_rows(&self, columns: &[&str], rows: Vec<Vec<Value>>) {
        self.state().results.push_back((
            columns.iter().map(|v| v.to_string()).collect(),
            rows.into(),
        ));
    }

    pub fn fail_exec(&self, fail: bool) {
        self.state().fail_exec = fail;
    }

    pub fn events(&self) -> Vec<Event> {
        self.state().events.clone()
    }

    pub fn prepared(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|v| match v {
                Event::Prepare(sql) => Some(sql),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.state().events.clear();
    }

    fn record(&self, event: Event) {
        self.state().events.push(event);
    }

    fn next_rows(&self) -> MockRows {
        let (columns, rows) = self.state().results.pop_front().unwrap_or_default();
        MockRows { columns, rows }
    }

    fn affected(&self) -> Result<RowsAffected> {
        if self.state().fail_exec {
            return Err(Error::msg("Mock execution failure"));
        }
        Ok(RowsAffected {
            rows_affected: 1,
            last_affected_id: Some(1),
        })
    }
}

/// A connection on a fresh mock driver, the driver handle inspects what happened.
pub fn connection(config: Config) -> (Connection<MockDriver>, MockDriver) {
    let driver = MockDriver::new();
    (Connection::new(driver.clone(), config), driver)
}

impl Driver for MockDriver {
    const NAME: &'static str = "mock";
    type Statement = MockStatement;
    type Transaction = MockTransaction;

    fn syntax(&self) -> Arc<dyn Syntax> {
        Arc::new(MySqlSyntax)
    }

    async fn connect(_config: &ConnectionConfig) -> Result<Self> {
        Ok(MockDriver::new())
    }

    async fn prepare(&self, sql: &str) -> Result<MockStatement> {
        self.record(Event::Prepare(sql.to_string()));
        Ok(MockStatement {
            sql: sql.to_string(),
            driver: self.clone(),
        })
    }

    async fn begin(&self) -> Result<MockTransaction> {
        self.record(Event::Begin);
        Ok(MockTransaction {
            driver: self.clone(),
        })
    }

    async fn close(&self) -> Result<()> {
        self.record(Event::Close);
        Ok(())
    }
}

pub struct MockStatement {
    pub sql: String,
    driver: MockDriver,
}

impl Statement for MockStatement {
    type Rows = MockRows;

    async fn query(&self, args: &[Value]) -> Result<MockRows> {
        self.driver
            .record(Event::Query(self.sql.clone(), args.to_vec()));
        Ok(self.driver.next_rows())
    }

    async fn exec(&self, args: &[Value]) -> Result<RowsAffected> {
        self.driver
            .record(Event::Exec(self.sql.clone(), args.to_vec()));
        self.driver.affected()
    }

    async fn close(&self) -> Result<()> {
        self.driver.record(Event::CloseStatement(self.sql.clone()));
        Ok(())
    }
}

pub struct MockRows {
    columns: Vec<String>,
    rows: VecDeque<Vec<Value>>,
}

impl Rows for MockRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next(&mut self) -> Result<Option<Vec<Value>>> {
        Ok(self.rows.pop_front())
    }
}

pub struct MockTransaction {
    driver: MockDriver,
}

impl Transaction for MockTransaction {
    type Statement = MockStatement;

    async fn query(&mut self, statement: &MockStatement, args: &[Value]) -> Result<MockRows> {
        self.driver.record(Event::TransactionQuery(
            statement.sql.clone(),
            args.to_vec(),
        ));
        Ok(self.driver.next_rows())
    }

    async fn exec(&mut self, statement: &MockStatement, args: &[Value]) -> Result<RowsAffected> {
        self.driver.record(Event::TransactionExec(
            statement.sql.clone(),
            args.to_vec(),
        ));
        self.driver.affected()
    }

    async fn commit(self) -> Result<()> {
        self.driver.record(Event::Commit);
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.driver.record(Event::Rollback);
        Ok(())
    }
}
