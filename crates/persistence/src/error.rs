//! Persistence errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Email error: {0}")]
    Email(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<scylla::transport::errors::NewSessionError> for PersistenceError {
    fn from(err: scylla::transport::errors::NewSessionError) -> Self {
        PersistenceError::Connection(err.to_string())
    }
}

impl From<scylla::transport::errors::QueryError> for PersistenceError {
    fn from(err: scylla::transport::errors::QueryError) -> Self {
        PersistenceError::Query(err.to_string())
    }
}

impl From<reqwest::Error> for PersistenceError {
    fn from(err: reqwest::Error) -> Self {
        PersistenceError::Http(err.to_string())
    }
}

impl From<lettre::error::Error> for PersistenceError {
    fn from(err: lettre::error::Error) -> Self {
        PersistenceError::Email(err.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for PersistenceError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        PersistenceError::Email(err.to_string())
    }
}

impl From<lettre::address::AddressError> for PersistenceError {
    fn from(err: lettre::address::AddressError) -> Self {
        PersistenceError::Email(format!("Invalid address: {}", err))
    }
}

impl From<PersistenceError> for call_agent_core::Error {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::Configuration(msg) => call_agent_core::Error::Config(msg),
            other => call_agent_core::Error::Persistence(other.to_string()),
        }
    }
}
