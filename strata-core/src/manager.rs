use crate::{Connection, ConnectionConfig, Driver, Error, Result, StrataError};
use indexmap::IndexMap;

const DEFAULT_CONNECTION: &str = "default";

fn connection_name(name: &str) -> &str {
    if name.is_empty() {
        DEFAULT_CONNECTION
    } else {
        name
    }
}

/// Named connection settings, a connection is established on request.
#[derive(Default, Debug, Clone)]
pub struct Manager {
    configs: IndexMap<String, ConnectionConfig>,
}

impl Manager {
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers `config` under `name`, an empty name means `default`.
    pub fn add_connection(&mut self, name: &str, config: ConnectionConfig) -> &mut Self {
        self.configs.insert(connection_name(name).to_string(), config);
        self
    }

    /// Replaces every registered connection.
    pub fn set_connections(&mut self, configs: impl IntoIterator<Item = (String, ConnectionConfig)>) {
        self.configs = configs.into_iter().collect();
    }

    pub fn remove_connection(&mut self, name: &str) -> Option<ConnectionConfig> {
        self.configs.shift_remove(connection_name(name))
    }

    pub fn config(&self, name: &str) -> Option<&ConnectionConfig> {
        self.configs.get(connection_name(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(String::as_str)
    }

    /// Connects to the connection registered under `name`.
    pub async fn connection<D: Driver>(&self, name: &str) -> Result<Connection<D>> {
        let name = connection_name(name);
        let Some(config) = self.configs.get(name) else {
            let error: Error = StrataError::ConnectionNotFound(name.to_string()).into();
            log::error!("{:#}", error);
            return Err(error);
        };
        let mut connection = Connection::<D>::connect(config).await?;
        connection.set_name(name);
        Ok(connection)
    }
}
