//! The unit of work the failover client runs against one endpoint.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::blockchain::types::RpcResult;
use crate::endpoints::Endpoint;

/// One remote query, runnable against any endpoint.
///
/// `run_against` performs exactly one request. Retries and failover are the
/// caller's concern.
#[async_trait]
pub trait LogicalOperation: Send + Sync {
    type Output: Send;

    /// Short label used in logs and metrics (e.g. "getBalance").
    fn name(&self) -> &str;

    async fn run_against(&self, endpoint: Arc<Endpoint>) -> RpcResult<Self::Output>;
}

/// Adapts an async closure into a [`LogicalOperation`].
pub struct FnOperation<F> {
    name: String,
    f: F,
}

/// Build a [`LogicalOperation`] from a name and an async closure.
pub fn operation<F, Fut, T>(name: impl Into<String>, f: F) -> FnOperation<F>
where
    F: Fn(Arc<Endpoint>) -> Fut + Send + Sync,
    Fut: Future<Output = RpcResult<T>> + Send,
    T: Send,
{
    FnOperation {
        name: name.into(),
        f,
    }
}

#[async_trait]
impl<F, Fut, T> LogicalOperation for FnOperation<F>
where
    F: Fn(Arc<Endpoint>) -> Fut + Send + Sync,
    Fut: Future<Output = RpcResult<T>> + Send,
    T: Send,
{
    type Output = T;

    fn name(&self) -> &str {
        &self.name
    }

    async fn run_against(&self, endpoint: Arc<Endpoint>) -> RpcResult<T> {
        (self.f)(endpoint).await
    }
}
