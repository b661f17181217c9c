use crate::health::HealthStatus;
use futures::stream::{FuturesUnordered, StreamExt};
use lifeline_core::{Context, Kind, MultiError, ResourceError, SharedResource};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct Registry {
    resources: HashMap<String, SharedResource>,
    // Registration order, independent of map iteration order.
    order: Vec<String>,
}

/// A registry of named resources.
///
/// Registration takes the write lock, every other operation snapshots the
/// registry under the read lock and works on the snapshot, so no lock is held
/// across an await.
#[derive(Default)]
pub struct Manager {
    registry: RwLock<Registry>,
}

impl Manager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource under its name.
    ///
    /// Fails with [`ResourceError::Duplicate`] if the name is taken; the
    /// existing registration is left untouched.
    pub fn register(&self, resource: SharedResource) -> Result<(), ResourceError> {
        let mut registry = self.registry.write();
        let name = resource.name().to_string();
        if registry.resources.contains_key(&name) {
            return Err(ResourceError::Duplicate { name });
        }
        registry.order.push(name.clone());
        registry.resources.insert(name, resource);
        Ok(())
    }

    /// Looks a resource up by name.
    pub fn get(&self, name: &str) -> Option<SharedResource> {
        self.registry.read().resources.get(name).cloned()
    }

    /// Looks a resource up by name, panicking if it is absent.
    ///
    /// Meant for startup wiring, where a missing resource is a programming
    /// error.
    ///
    /// # Panics
    ///
    /// Panics if no resource is registered under `name`.
    pub fn must_get(&self, name: &str) -> SharedResource {
        match self.get(name) {
            Some(resource) => resource,
            None => panic!("resource {name:?} not found"),
        }
    }

    /// Looks a resource up by name, failing with [`ResourceError::NotFound`].
    pub fn try_get(&self, name: &str) -> Result<SharedResource, ResourceError> {
        self.get(name).ok_or_else(|| ResourceError::NotFound {
            name: name.to_string(),
        })
    }

    /// Returns every resource of `kind`, in registration order.
    pub fn get_by_kind(&self, kind: &Kind) -> Vec<SharedResource> {
        self.snapshot()
            .into_iter()
            .filter(|resource| resource.kind() == kind)
            .collect()
    }

    /// Returns the registered names in registration order.
    pub fn list(&self) -> Vec<String> {
        self.registry.read().order.clone()
    }

    /// Number of registered resources.
    pub fn len(&self) -> usize {
        self.registry.read().order.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.registry.read().order.is_empty()
    }

    fn snapshot(&self) -> Vec<SharedResource> {
        let registry = self.registry.read();
        registry
            .order
            .iter()
            .filter_map(|name| registry.resources.get(name).cloned())
            .collect()
    }

    /// Connects every resource concurrently, one task per resource.
    ///
    /// A failing resource does not stop the others. Every failure is
    /// reported, tagged with the resource name. Resources that connected stay
    /// connected.
    ///
    /// If `cx` ends first, the call stops waiting and returns the failures
    /// seen so far plus the context error. Connects still in flight keep
    /// running on their own tasks and observe the same cancellation.
    pub async fn connect_all(&self, cx: &Context) -> Result<(), MultiError> {
        let mut pending: FuturesUnordered<_> = self
            .snapshot()
            .into_iter()
            .map(|resource| {
                let name = resource.name().to_string();
                let cx = cx.clone();
                let task = tokio::spawn(async move { resource.connect(&cx).await });
                async move { (name, task.await) }
            })
            .collect();

        let mut errors = MultiError::new();
        loop {
            tokio::select! {
                biased;
                next = pending.next() => match next {
                    Some((_, Ok(Ok(())))) => {}
                    Some((name, Ok(Err(err)))) => errors.push(err.named(name)),
                    Some((name, Err(join_err))) => errors.push(ResourceError::TaskFailed {
                        name,
                        message: join_err.to_string(),
                    }),
                    None => break,
                },
                err = cx.done() => {
                    errors.push(err);
                    break;
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            failed = errors.len(),
            unfinished = pending.len(),
            "connect_all finished"
        );

        errors.into_result()
    }

    /// Closes every resource sequentially, in reverse registration order.
    ///
    /// Failures are collected and do not stop the remaining closes.
    pub async fn close_all(&self, cx: &Context) -> Result<(), MultiError> {
        let mut errors = MultiError::new();
        for resource in self.snapshot().into_iter().rev() {
            if let Err(err) = resource.close(cx).await {
                errors.push(err.named(resource.name()));
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(failed = errors.len(), "close_all finished");

        errors.into_result()
    }

    /// Probes every resource concurrently.
    ///
    /// Returns one status per resource, in registration order. A failing or
    /// panicking probe yields an unhealthy entry and never affects the others.
    pub async fn health_check(&self, cx: &Context) -> Vec<HealthStatus> {
        let resources = self.snapshot();
        let probes = resources.iter().map(|resource| {
            let resource = Arc::clone(resource);
            let cx = cx.clone();
            tokio::spawn(async move { HealthStatus::probe(&resource, &cx).await })
        });
        let outcomes = futures::future::join_all(probes).await;

        outcomes
            .into_iter()
            .zip(&resources)
            .map(|(outcome, resource)| match outcome {
                Ok(status) => status,
                Err(join_err) => {
                    HealthStatus::lost(resource, format!("health probe failed: {join_err}"))
                }
            })
            .collect()
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("resources", &self.list())
            .finish()
    }
}
