use crate::{Result, Statement, truncate_long};
use std::{
    collections::HashMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

/// Key of a statement: checksum of its trimmed SQL text.
pub fn checksum(sql: &str) -> u32 {
    crc32fast::hash(sql.trim().as_bytes())
}

/// Prepared statements by checksum, shared between the tasks using it.
///
/// Entries are never evicted, they are closed together with the cache.
/// Concurrent preparations of the same SQL are tolerated, the last one stored wins.
pub struct StatementCache<S: Statement> {
    statements: RwLock<HashMap<u32, Arc<S>>>,
}

impl<S: Statement> Default for StatementCache<S> {
    fn default() -> Self {
        Self {
            statements: RwLock::new(HashMap::new()),
        }
    }
}

impl<S: Statement> StatementCache<S> {
    pub fn new() -> Self {
        Default::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<u32, Arc<S>>> {
        self.statements.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<u32, Arc<S>>> {
        self.statements.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, sql: &str) -> Option<Arc<S>> {
        let statement = self.read().get(&checksum(sql)).cloned();
        if statement.is_some() {
            log::debug!("Statement cache hit: {}", truncate_long!(sql));
        }
        statement
    }

    pub fn insert(&self, sql: &str, statement: Arc<S>) -> Arc<S> {
        self.write().insert(checksum(sql), statement.clone());
        statement
    }

    pub fn contains(&self, sql: &str) -> bool {
        self.read().contains_key(&checksum(sql))
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Closes and removes every statement, the first failure is returned after all were tried.
    pub async fn close(&self) -> Result<()> {
        let statements = self.write().drain().map(|(_, v)| v).collect::<Vec<_>>();
        let mut result = Ok(());
        for statement in statements {
            if let Err(e) = statement.close().await {
                log::error!("{:#}", e);
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }
}
