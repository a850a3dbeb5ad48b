use crate::{Value, truncate_long};
use std::sync::{Mutex, MutexGuard};

/// Receives every statement a session runs, with its bindings.
///
/// Created once with the connection and shared by all of its sessions.
pub trait QueryLogger: Send + Sync {
    fn append(&self, query: &str, bindings: &[Value]);
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryRecord {
    pub query: String,
    pub bindings: Vec<Value>,
}

impl QueryRecord {
    /// The query with every placeholder replaced by its binding, strings are double quoted.
    /// Placeholders without a binding are dropped.
    pub fn raw(&self) -> String {
        if self.bindings.is_empty() {
            return self.query.clone();
        }
        let mut out = String::with_capacity(self.query.len() + self.bindings.len() * 8);
        let mut bindings = self.bindings.iter();
        for c in self.query.chars() {
            if c != '?' {
                out.push(c);
                continue;
            }
            match bindings.next() {
                Some(Value::Varchar(Some(v))) => {
                    out.push('"');
                    out.push_str(v);
                    out.push('"');
                }
                Some(v) => out.push_str(&v.to_string()),
                None => {}
            }
        }
        out
    }
}

/// Keeps the statements in memory, in execution order.
#[derive(Default, Debug)]
pub struct QueryLog {
    records: Mutex<Vec<QueryRecord>>,
}

impl QueryLog {
    pub fn new() -> Self {
        Default::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<QueryRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn records(&self) -> Vec<QueryRecord> {
        self.lock().clone()
    }

    pub fn raw(&self) -> Vec<String> {
        self.lock().iter().map(QueryRecord::raw).collect()
    }

    /// Record at 1-based `index`.
    pub fn get(&self, index: usize) -> Option<QueryRecord> {
        self.lock().get(index.checked_sub(1)?).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl QueryLogger for QueryLog {
    fn append(&self, query: &str, bindings: &[Value]) {
        self.lock().push(QueryRecord {
            query: query.to_string(),
            bindings: bindings.to_vec(),
        });
    }
}

/// Forwards every statement to the `log` facade under the `strata::query` target.
#[derive(Default, Debug, Clone, Copy)]
pub struct LogQueryLogger;

impl QueryLogger for LogQueryLogger {
    fn append(&self, query: &str, bindings: &[Value]) {
        log::info!(
            target: "strata::query",
            "{} {:?}",
            truncate_long!(query),
            bindings.iter().map(ToString::to_string).collect::<Vec<_>>()
        );
    }
}
