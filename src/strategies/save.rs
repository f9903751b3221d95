use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::{lookup_unit, SaveError, SaveStrategy, UnitMap};
use crate::Error;

/// Ordered, fail-fast save.
///
/// Targets are written one at a time in list order. The first unit error
/// stops the fan-out immediately; units after it are never touched, and the
/// returned [`SaveError`] carries the names already written. The
/// cancellation token is checked before every unit call.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialSave;

impl<K, V> SaveStrategy<K, V> for SequentialSave
where
    K: Send + Sync,
    V: Send + Sync,
{
    fn save<'a>(
        &'a self,
        token: &'a CancellationToken,
        query: &'a K,
        item: &'a V,
        units: &'a UnitMap<K, V>,
        targets: &'a [String],
    ) -> BoxFuture<'a, std::result::Result<Vec<String>, SaveError>> {
        Box::pin(async move {
            let token = token.child_token();
            let mut saved = Vec::with_capacity(targets.len());

            for name in targets {
                if token.is_cancelled() {
                    return Err(SaveError {
                        saved,
                        source: Error::Cancelled,
                    });
                }

                let unit = match lookup_unit(units, name) {
                    Ok(unit) => unit,
                    Err(source) => return Err(SaveError { saved, source }),
                };

                if let Err(cause) = unit.save(&token, query, item).await {
                    token.cancel();
                    tracing::warn!(unit = %name, error = %cause, "Save failed, stopping fan-out");
                    return Err(SaveError {
                        saved,
                        source: Error::UnitFailed {
                            unit: name.clone(),
                            cause: Box::new(cause),
                        },
                    });
                }

                saved.push(name.clone());
            }

            Ok(saved)
        })
    }
}

/// Concurrent save: one worker per target, unbounded fan-out.
///
/// A failing worker cancels the shared child token; workers already inside
/// a unit call are not interrupted and must observe the token themselves.
/// `saved` names every unit that genuinely completed, in completion order,
/// so partial success survives a failure elsewhere in the fan-out. Exactly
/// one error is surfaced, chosen non-deterministically on ties.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParallelSave;

impl<K, V> SaveStrategy<K, V> for ParallelSave
where
    K: Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn save<'a>(
        &'a self,
        token: &'a CancellationToken,
        query: &'a K,
        item: &'a V,
        units: &'a UnitMap<K, V>,
        targets: &'a [String],
    ) -> BoxFuture<'a, std::result::Result<Vec<String>, SaveError>> {
        Box::pin(async move {
            let token = token.child_token();

            // Resolve every target before fan-out so an unknown name fails
            // the whole call with nothing written.
            let mut resolved = Vec::with_capacity(targets.len());
            for name in targets {
                match lookup_unit(units, name) {
                    Ok(unit) => resolved.push((name.clone(), Arc::clone(unit))),
                    Err(source) => {
                        return Err(SaveError {
                            saved: Vec::new(),
                            source,
                        })
                    }
                }
            }

            let saved = Arc::new(Mutex::new(Vec::with_capacity(resolved.len())));
            let mut workers = JoinSet::new();

            for (name, unit) in resolved {
                let token = token.clone();
                let query = query.clone();
                let item = item.clone();
                let saved = Arc::clone(&saved);

                workers.spawn(async move {
                    if token.is_cancelled() {
                        return Err(Error::Cancelled);
                    }

                    match unit.save(&token, &query, &item).await {
                        Ok(()) => {
                            saved.lock().expect("poisoned lock").push(name);
                            Ok(())
                        }
                        Err(cause) => {
                            token.cancel();
                            tracing::warn!(unit = %name, error = %cause, "Save failed, cancelling remaining workers");
                            Err(Error::UnitFailed {
                                unit: name,
                                cause: Box::new(cause),
                            })
                        }
                    }
                });
            }

            let mut first_error = None;
            while let Some(joined) = workers.join_next().await {
                let outcome = joined.unwrap_or_else(|err| {
                    Err(Error::Generic(format!("save worker panicked: {err}")))
                });
                if let Err(err) = outcome {
                    first_error.get_or_insert(err);
                }
            }

            let saved = std::mem::take(&mut *saved.lock().expect("poisoned lock"));
            match first_error {
                None => Ok(saved),
                Some(source) => Err(SaveError { saved, source }),
            }
        })
    }
}
