//! Call outcomes, attempt trails, and failover errors.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::endpoints::Endpoint;

/// How a failover call picks its endpoint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Registry order, no probing.
    #[default]
    Simple,
    /// Probe all endpoints first and follow the fresh ranking.
    HealthChecked,
}

/// One endpoint tried during a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub endpoint: Arc<Endpoint>,
    pub succeeded: bool,
    /// Attempts made against this endpoint (retries included).
    pub attempts: u32,
    pub error: Option<String>,
}

impl fmt::Display for AttemptRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            None => write!(f, "{}: ok after {} attempt(s)", self.endpoint.name, self.attempts),
            Some(e) => write!(
                f,
                "{}: failed after {} attempt(s): {}",
                self.endpoint.name, self.attempts, e
            ),
        }
    }
}

/// Ordered record of every endpoint tried during one call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptTrail(pub Vec<AttemptRecord>);

impl AttemptTrail {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttemptRecord> {
        self.0.iter()
    }

    /// Names of the endpoints tried, in order.
    pub fn endpoint_names(&self) -> Vec<&str> {
        self.0.iter().map(|r| r.endpoint.name.as_str()).collect()
    }
}

impl fmt::Display for AttemptTrail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, record) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", record)?;
        }
        Ok(())
    }
}

/// Caller-visible failures of a failover call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailoverError {
    /// Every endpoint exhausted its retries.
    #[error("all {} endpoint(s) failed: {trail}", .trail.len())]
    AllEndpointsFailed { trail: AttemptTrail },

    /// The caller cancelled the call.
    #[error("call cancelled")]
    Cancelled,
}

/// Result of one failover call plus its attempt trail.
#[derive(Debug, Clone)]
pub struct OperationOutcome<T> {
    pub value: Option<T>,
    pub attempts: AttemptTrail,
}

impl<T> OperationOutcome<T> {
    pub fn success(&self) -> bool {
        self.value.is_some()
    }

    /// Turn the outcome into a plain result.
    pub fn into_result(self) -> Result<T, FailoverError> {
        match self.value {
            Some(value) => Ok(value),
            None => Err(FailoverError::AllEndpointsFailed {
                trail: self.attempts,
            }),
        }
    }
}
