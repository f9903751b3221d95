use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use super::{lookup_unit, GetStrategy, Lookup, SaveStrategy, UnitMap};
use crate::{Error, Result};

/// Tiered read with cache promotion.
///
/// Targets are an ordered list of tiers, nearest first. The first tier that
/// answers wins and ends the scan; later tiers are never queried. Tiers
/// that were tried and missed before the hit are then backfilled with the
/// found value through the provided save strategy (read repair). A backfill
/// failure rides along in the returned [`Lookup`]; it never retracts the
/// value. When every tier misses the result is [`Error::NoUnitReturned`]
/// and no backfill happens.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheFallbackGet;

impl<K, V> GetStrategy<K, V> for CacheFallbackGet
where
    K: Send + Sync,
    V: Send + Sync,
{
    fn get<'a>(
        &'a self,
        token: &'a CancellationToken,
        query: &'a K,
        units: &'a UnitMap<K, V>,
        targets: &'a [String],
        promote: &'a dyn SaveStrategy<K, V>,
    ) -> BoxFuture<'a, Result<Lookup<V>>> {
        Box::pin(async move {
            let mut missing = Vec::new();
            let mut found = None;

            for name in targets {
                if token.is_cancelled() {
                    return Err(Error::Cancelled);
                }

                let unit = lookup_unit(units, name)?;
                match unit.get(token, query).await {
                    Ok(value) => {
                        found = Some((name.clone(), value));
                        break;
                    }
                    Err(error) => {
                        // A miss and a backend failure look the same here;
                        // either way the next tier gets its chance.
                        tracing::debug!(unit = %name, %error, "Tier missed");
                        missing.push(name.clone());
                    }
                }
            }

            let (unit, value) = found.ok_or(Error::NoUnitReturned)?;

            let promotion_error = if missing.is_empty() {
                None
            } else {
                promote
                    .save(token, query, &value, units, &missing)
                    .await
                    .err()
            };
            if let Some(error) = &promotion_error {
                tracing::warn!(unit = %unit, %error, "Cache promotion failed, returning value anyway");
            }

            Ok(Lookup {
                value,
                unit,
                missing,
                promotion_error,
            })
        })
    }
}
