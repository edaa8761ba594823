//! Record store access

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Where and as whom to connect to a database
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database name
    pub database: String,
    /// Login user
    pub username: String,
    /// Login password
    pub password: String,
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// One row of a table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Position of the row in the result
    pub index: usize,
    /// Field name to value
    pub attributes: HashMap<String, String>,
}

impl Record {
    /// Empty record at `index`
    pub fn new(index: usize) -> Self {
        Self {
            index,
            attributes: HashMap::new(),
        }
    }

    /// Set one field
    pub fn add_attribute(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(field.into(), value.into());
    }

    /// Value of one field
    pub fn attribute(&self, field: &str) -> Option<&str> {
        self.attributes.get(field).map(String::as_str)
    }
}

/// Live database connection
pub trait Connection: Send + Sync {
    /// Whether the connection is established
    fn is_open(&self) -> bool;
}

/// Inserts and reads records
pub trait Connector: Send + Sync {
    /// Insert field/value pairs into `collection`; `true` on success
    fn insert(&self, collection: &str, record: &HashMap<String, String>) -> bool;

    /// All records of `table`
    fn read(&self, table: &str) -> Vec<Record>;
}
