use crate::{ConnectionConfig, Result, Syntax, Value};
use std::{future::Future, sync::Arc};

/// Database backend, the only component that talks to the network.
///
/// The core compiles SQL text and bindings, a driver prepares and runs them.
pub trait Driver: Send + Sync + Sized + 'static {
    /// Scheme used in the connection url.
    const NAME: &'static str;
    type Statement: Statement;
    type Transaction: Transaction<Statement = Self::Statement>;

    fn syntax(&self) -> Arc<dyn Syntax>;

    fn connect(config: &ConnectionConfig) -> impl Future<Output = Result<Self>> + Send;

    fn prepare(&self, sql: &str) -> impl Future<Output = Result<Self::Statement>> + Send;

    fn begin(&self) -> impl Future<Output = Result<Self::Transaction>> + Send;

    fn close(&self) -> impl Future<Output = Result<()>> + Send;
}

/// A prepared statement, positional `?` placeholders bound in order.
pub trait Statement: Send + Sync + 'static {
    type Rows: Rows;

    fn query(&self, args: &[Value]) -> impl Future<Output = Result<Self::Rows>> + Send;

    fn exec(&self, args: &[Value]) -> impl Future<Output = Result<RowsAffected>> + Send;

    fn close(&self) -> impl Future<Output = Result<()>> + Send;
}

/// Cursor over the rows of a query.
pub trait Rows: Send {
    /// Labels of the returned columns, in the order of the row values.
    fn columns(&self) -> &[String];

    /// Values of the next row, `None` once the rows are exhausted.
    fn next(&mut self) -> impl Future<Output = Result<Option<Vec<Value>>>> + Send;
}

/// Statements executed inside a transaction, the transaction is consumed when it ends.
pub trait Transaction: Send + 'static {
    type Statement: Statement;

    fn query(
        &mut self,
        statement: &Self::Statement,
        args: &[Value],
    ) -> impl Future<Output = Result<<Self::Statement as Statement>::Rows>> + Send;

    fn exec(
        &mut self,
        statement: &Self::Statement,
        args: &[Value],
    ) -> impl Future<Output = Result<RowsAffected>> + Send;

    fn commit(self) -> impl Future<Output = Result<()>> + Send;

    fn rollback(self) -> impl Future<Output = Result<()>> + Send;
}

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Backend-specific last inserted / affected identifier when available.
    pub last_affected_id: Option<i64>,
}
