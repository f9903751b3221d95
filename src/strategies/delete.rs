use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use super::{lookup_unit, DeleteStrategy, UnitMap};
use crate::{Error, Result};

/// Ordered, fail-fast delete.
///
/// The first unit error stops the fan-out and is returned wrapped with the
/// failing unit's name. Not transactional: units already deleted stay
/// deleted, and nothing is retried.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialDelete;

impl<K, V> DeleteStrategy<K, V> for SequentialDelete
where
    K: Send + Sync,
    V: Send + Sync,
{
    fn delete<'a>(
        &'a self,
        token: &'a CancellationToken,
        query: &'a K,
        units: &'a UnitMap<K, V>,
        targets: &'a [String],
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            for name in targets {
                if token.is_cancelled() {
                    return Err(Error::Cancelled);
                }

                let unit = lookup_unit(units, name)?;
                if let Err(cause) = unit.delete(token, query).await {
                    tracing::warn!(unit = %name, error = %cause, "Delete failed, stopping fan-out");
                    return Err(Error::UnitFailed {
                        unit: name.clone(),
                        cause: Box::new(cause),
                    });
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::scripted_units;

    fn targets(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn deletes_from_every_target_in_order() {
        let (units, handles) = scripted_units(&["cache", "db"]);
        handles["cache"].put("k", "v");
        handles["db"].put("k", "v");

        SequentialDelete
            .delete(
                &CancellationToken::new(),
                &"k".to_string(),
                &units,
                &targets(&["cache", "db"]),
            )
            .await
            .unwrap();

        assert!(handles["cache"].value("k").is_none());
        assert!(handles["db"].value("k").is_none());
    }

    #[tokio::test]
    async fn stops_at_first_failure_without_compensation() {
        let (units, handles) = scripted_units(&["a", "b", "c"]);
        handles["a"].put("k", "v");
        handles["b"].fail_deletes();

        let err = SequentialDelete
            .delete(
                &CancellationToken::new(),
                &"k".to_string(),
                &units,
                &targets(&["a", "b", "c"]),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UnitFailed { ref unit, .. } if unit == "b"));
        // The earlier delete is not rolled back, the later unit never runs.
        assert!(handles["a"].value("k").is_none());
        assert!(handles["c"].delete_queries().is_empty());
    }

    #[tokio::test]
    async fn honors_cancelled_token() {
        let (units, handles) = scripted_units(&["a"]);
        let token = CancellationToken::new();
        token.cancel();

        let err = SequentialDelete
            .delete(&token, &"k".to_string(), &units, &targets(&["a"]))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert!(handles["a"].delete_queries().is_empty());
    }

    #[tokio::test]
    async fn unknown_target_fails_the_call() {
        let (units, _handles) = scripted_units(&["a"]);

        let err = SequentialDelete
            .delete(
                &CancellationToken::new(),
                &"k".to_string(),
                &units,
                &targets(&["ghost"]),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UnknownUnit(ref name) if name == "ghost"));
    }
}
