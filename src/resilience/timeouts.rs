//! Timeout enforcement.
//!
//! Every remote call goes through [`with_timeout`] so no attempt can hang a
//! worker past its deadline, whatever the transport's own timeout does.

use std::future::Future;
use std::time::Duration;

use crate::blockchain::types::{RpcError, RpcResult};

/// Run `fut`, mapping an elapsed deadline to [`RpcError::Timeout`].
pub async fn with_timeout<T, F>(timeout: Duration, fut: F) -> RpcResult<T>
where
    F: Future<Output = RpcResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(RpcError::Timeout(timeout.as_millis() as u64)),
    }
}
