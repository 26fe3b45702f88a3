//! # Content Cache
//!
//! One slot per content kind, living for as long as the owning [`Resolver`](crate::Resolver).
//!
//! - First caller for an empty slot starts the fetch, later callers await the same shared
//!   future instead of issuing their own request
//! - Successful results stay until [`ContentCache::invalidate`] drops them
//! - Failed fetches leave the slot empty so the next caller tries the API again
//! - A fetch that was in flight while the slot was invalidated does not repopulate it
//! - Every fetch starts a new generation, so late waiters of an older fetch never touch a
//!   newer one
//!
//! The lock only guards state transitions and is never held across an `.await`.
use std::sync::Arc;

use catalog::models::{Employee, Insight, Partner, Photo, Pillar};
use futures::{
    FutureExt, TryFutureExt,
    future::{BoxFuture, Shared},
};
use parking_lot::Mutex;
use tracing::debug;

use crate::{ContentKind, error::FetchError};

pub type Resolved<T> = Arc<Vec<T>>;

type Pending<T> = Shared<BoxFuture<'static, Result<Resolved<T>, FetchError>>>;

enum State<T> {
    Empty,
    InFlight(Pending<T>),
    Ready(Resolved<T>),
}

struct Inner<T> {
    generation: u64,
    state: State<T>,
}

pub struct Slot<T> {
    inner: Mutex<Inner<T>>,
}

impl<T> Slot<T>
where
    T: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                generation: 0,
                state: State::Empty,
            }),
        }
    }

    /// Stored result, if a fetch has completed since the last invalidation.
    pub fn get(&self) -> Option<Resolved<T>> {
        match &self.inner.lock().state {
            State::Ready(items) => Some(items.clone()),
            _ => None,
        }
    }

    pub async fn get_or_fetch<F>(&self, fetch: F) -> Result<Resolved<T>, FetchError>
    where
        F: FnOnce() -> BoxFuture<'static, Result<Vec<T>, FetchError>>,
    {
        let (generation, pending) = {
            let mut inner = self.inner.lock();

            let joined = match &inner.state {
                State::Ready(items) => return Ok(items.clone()),
                State::InFlight(pending) => Some(pending.clone()),
                State::Empty => None,
            };

            let pending = match joined {
                Some(pending) => {
                    debug!("Joining in-flight fetch");
                    pending
                }
                None => {
                    let pending = fetch().map_ok(Arc::new).boxed().shared();
                    inner.generation += 1;
                    inner.state = State::InFlight(pending.clone());
                    pending
                }
            };

            (inner.generation, pending)
        };

        let outcome = pending.await;

        let mut inner = self.inner.lock();
        if inner.generation == generation && matches!(inner.state, State::InFlight(_)) {
            inner.state = match &outcome {
                Ok(items) => State::Ready(items.clone()),
                Err(_) => State::Empty,
            };
        }

        outcome
    }

    pub fn invalidate(&self) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.state = State::Empty;
    }
}

impl<T> Default for Slot<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
pub struct ContentCache {
    pub(crate) pillars: Slot<Pillar>,
    pub(crate) insights: Slot<Insight>,
    pub(crate) partners: Slot<Partner>,
    pub(crate) photos: Slot<Photo>,
    pub(crate) employees: Slot<Employee>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&self, kind: ContentKind) {
        match kind {
            ContentKind::Pillars => self.pillars.invalidate(),
            ContentKind::Insights => self.insights.invalidate(),
            ContentKind::Partners => self.partners.invalidate(),
            ContentKind::Photos => self.photos.invalidate(),
            ContentKind::Employees => self.employees.invalidate(),
        }
    }

    pub fn invalidate_all(&self) {
        for kind in ContentKind::ALL {
            self.invalidate(kind);
        }
    }

    pub fn is_cached(&self, kind: ContentKind) -> bool {
        match kind {
            ContentKind::Pillars => self.pillars.get().is_some(),
            ContentKind::Insights => self.insights.get().is_some(),
            ContentKind::Partners => self.partners.get().is_some(),
            ContentKind::Photos => self.photos.get().is_some(),
            ContentKind::Employees => self.employees.get().is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use futures::{FutureExt, future::join_all, poll};
    use tokio::sync::Notify;

    use super::{ContentCache, Slot};
    use crate::{ContentKind, error::FetchError};

    fn counting(
        calls: &Arc<AtomicUsize>,
        items: Vec<u32>,
    ) -> impl FnOnce() -> futures::future::BoxFuture<'static, Result<Vec<u32>, FetchError>> {
        let calls = calls.clone();
        move || {
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(items)
            }
            .boxed()
        }
    }

    fn failing() -> futures::future::BoxFuture<'static, Result<Vec<u32>, FetchError>> {
        async {
            Err(FetchError::Status {
                url: "http://api/pillars".to_string(),
                status: 503,
            })
        }
        .boxed()
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_slot() {
        let slot = Slot::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let first = slot.get_or_fetch(counting(&calls, vec![1, 2])).await.unwrap();
        let second = slot.get_or_fetch(counting(&calls, vec![3])).await.unwrap();

        assert_eq!(*first, vec![1, 2]);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let slot = Slot::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let results = join_all((0..8).map(|_| slot.get_or_fetch(counting(&calls, vec![4])))).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for result in results {
            assert_eq!(*result.unwrap(), vec![4]);
        }
    }

    #[tokio::test]
    async fn test_failures_are_not_stored() {
        let slot: Slot<u32> = Slot::new();
        let calls = Arc::new(AtomicUsize::new(0));

        assert!(slot.get_or_fetch(failing).await.is_err());
        assert!(slot.get().is_none());

        slot.get_or_fetch(counting(&calls, vec![5])).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(slot.get().as_deref(), Some(&vec![5]));
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let slot = Slot::new();
        let calls = Arc::new(AtomicUsize::new(0));

        slot.get_or_fetch(counting(&calls, vec![1])).await.unwrap();
        slot.invalidate();
        let refreshed = slot.get_or_fetch(counting(&calls, vec![2])).await.unwrap();

        assert_eq!(*refreshed, vec![2]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stale_fetch_does_not_repopulate() {
        let slot = Arc::new(Slot::new());
        let release = Arc::new(Notify::new());

        let stale = {
            let slot = slot.clone();
            let release = release.clone();
            tokio::spawn(async move {
                slot.get_or_fetch(move || {
                    async move {
                        release.notified().await;
                        Ok(vec![1u32])
                    }
                    .boxed()
                })
                .await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        slot.invalidate();
        release.notify_one();

        assert_eq!(*stale.await.unwrap().unwrap(), vec![1]);
        assert!(slot.get().is_none());
    }

    #[tokio::test]
    async fn test_late_waiter_keeps_newer_fetch() {
        let slot = Slot::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let fail = Arc::new(Notify::new());
        let succeed = Arc::new(Notify::new());

        let mut first = Box::pin(slot.get_or_fetch({
            let fail = fail.clone();
            move || {
                async move {
                    fail.notified().await;
                    failing().await
                }
                .boxed()
            }
        }));
        let mut joined = Box::pin(slot.get_or_fetch(counting(&calls, vec![9])));

        assert!(poll!(first.as_mut()).is_pending());
        assert!(poll!(joined.as_mut()).is_pending());

        fail.notify_one();
        assert!(first.await.is_err());

        let mut retry = Box::pin(slot.get_or_fetch({
            let succeed = succeed.clone();
            move || {
                async move {
                    succeed.notified().await;
                    Ok(vec![7u32])
                }
                .boxed()
            }
        }));
        assert!(poll!(retry.as_mut()).is_pending());

        assert!(joined.await.is_err());

        succeed.notify_one();
        assert_eq!(*retry.await.unwrap(), vec![7]);
        assert_eq!(slot.get().as_deref(), Some(&vec![7]));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cache_tracks_kinds_independently() {
        let cache = ContentCache::new();

        for kind in ContentKind::ALL {
            assert!(!cache.is_cached(kind));
        }

        cache.invalidate_all();
        assert!(!cache.is_cached(ContentKind::Pillars));
    }
}
