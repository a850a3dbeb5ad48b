use crate::{
    Config, ConnectionConfig, Context, Driver, NamingStyle, QueryLog, QueryLogger, Result,
    RowsAffected, Session, StatementCache, Syntax, Value,
};
use std::{sync::Arc, time::Duration};

/// An established database connection, the factory of [`Session`]s.
///
/// Everything a session needs is shared: the driver, the dialect, the naming style,
/// the statement cache and the query logger.
pub struct Connection<D: Driver> {
    name: String,
    driver: Arc<D>,
    config: Config,
    syntax: Arc<dyn Syntax>,
    naming: Arc<dyn NamingStyle>,
    cache: Arc<StatementCache<D::Statement>>,
    query_log: Option<Arc<QueryLog>>,
    logger: Option<Arc<dyn QueryLogger>>,
}

impl<D: Driver> Clone for Connection<D> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            driver: self.driver.clone(),
            config: self.config.clone(),
            syntax: self.syntax.clone(),
            naming: self.naming.clone(),
            cache: self.cache.clone(),
            query_log: self.query_log.clone(),
            logger: self.logger.clone(),
        }
    }
}

impl<D: Driver> Connection<D> {
    /// Wraps a driver that is already connected.
    pub fn new(driver: D, config: Config) -> Self {
        let query_log = config.query_log.then(|| Arc::new(QueryLog::new()));
        Self {
            name: "default".into(),
            syntax: driver.syntax(),
            naming: config.naming.style(),
            driver: Arc::new(driver),
            config,
            cache: Arc::new(StatementCache::new()),
            logger: query_log.clone().map(|v| v as Arc<dyn QueryLogger>),
            query_log,
        }
    }

    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let context = || {
            format!(
                "While connecting to `{}://{}:{}/{}`",
                config.driver, config.host, config.port, config.database
            )
        };
        if config.driver != D::NAME {
            let error = crate::Error::msg(format!(
                "The url scheme `{}` does not match the driver `{}`",
                config.driver,
                D::NAME
            ))
            .context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        let settings = config.config().with_context(context)?;
        let driver = D::connect(config).await.with_context(context)?;
        Ok(Self::new(driver, settings))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn syntax(&self) -> &dyn Syntax {
        self.syntax.as_dyn()
    }

    pub fn set_naming(&mut self, naming: Arc<dyn NamingStyle>) {
        self.naming = naming;
    }

    /// Statements prepared through the sessions sharing the connection cache.
    pub fn cache(&self) -> &StatementCache<D::Statement> {
        &self.cache
    }

    /// The in memory log, present when the `query_log` option is enabled.
    pub fn query_log(&self) -> Option<&QueryLog> {
        self.query_log.as_deref()
    }

    /// Replaces the logger receiving the statements of the future sessions.
    pub fn set_logger(&mut self, logger: Arc<dyn QueryLogger>) {
        self.logger = Some(logger);
    }

    pub fn session(&self) -> Session<D> {
        Session::new(
            self.driver.clone(),
            self.syntax.clone(),
            self.naming.clone(),
            self.config.shared_cache.then(|| self.cache.clone()),
            self.logger.clone(),
        )
    }

    /// A session on `table`.
    pub fn table(&self, table: &str) -> Session<D> {
        let mut session = self.session();
        session.table(table);
        session
    }

    /// A session with a transaction already begun.
    pub async fn begin(&self, timeout: Option<Duration>) -> Result<Session<D>> {
        let mut session = self.session();
        session.begin(timeout).await?;
        Ok(session)
    }

    /// Runs a raw statement in a throwaway session.
    pub async fn exec(&self, sql: &str, bindings: &[Value]) -> Result<RowsAffected> {
        let mut session = self.session();
        let result = session.exec(sql, bindings).await;
        session.close().await?;
        result
    }

    /// Closes the cached statements, then the driver.
    pub async fn close(self) -> Result<()> {
        let cached = self.cache.close().await;
        self.driver
            .close()
            .await
            .with_context(|| format!("While closing the connection `{}`", self.name))?;
        cached
    }
}
