//! Commit-or-rollback epilogue shared by transactional use-cases.

use quotebook_domain::error::QuotebookError;

use crate::ports::Transactional;

/// Finish `tx` according to `result`.
///
/// On success the transaction is committed and the value returned. On
/// failure it is rolled back and the original error is returned unchanged;
/// a failed rollback is only logged, since the caller cares about the error
/// that aborted the work.
pub(crate) async fn settle<S, T>(
    store: &S,
    tx: S::Tx,
    result: Result<T, QuotebookError>,
) -> Result<T, QuotebookError>
where
    S: Transactional,
{
    match result {
        Ok(value) => {
            store.commit(tx).await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = store.rollback(tx).await {
                tracing::warn!(error = %rollback_err, "failed to roll back transaction");
            }
            Err(err)
        }
    }
}
