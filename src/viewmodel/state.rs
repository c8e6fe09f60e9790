//! Observable current-value containers.
//!
//! A [`SharedState`] caches the last published value and counts attached
//! [`Observer`]s. Its upstream (usually a live query) runs only while someone
//! is watching: it starts when the first observer attaches and is torn down
//! once the state has gone unobserved for the whole idle grace window. The
//! cached value survives teardown, so [`SharedState::value`] and new observers
//! never wait for a round trip to the store.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

struct Shared<T> {
    name: &'static str,
    value: watch::Sender<T>,
    observers: watch::Sender<usize>,
}

/// Write side handed to upstream tasks.
pub struct Publisher<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: PartialEq> Publisher<T> {
    /// Store `value` and wake observers. Equal values are swallowed so
    /// observers only wake on real changes.
    pub fn publish(&self, value: T) {
        self.shared.value.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }
}

impl<T: Clone> Publisher<T> {
    pub fn current(&self) -> T {
        self.shared.value.borrow().clone()
    }
}

pub struct SharedState<T> {
    shared: Arc<Shared<T>>,
    driver: Option<JoinHandle<()>>,
}

impl<T> SharedState<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Build a state whose upstream is produced by `upstream` each time the
    /// state gains its first observer. Must be called inside a tokio runtime.
    pub fn new<F, Fut>(name: &'static str, initial: T, idle_grace: Duration, upstream: F) -> Self
    where
        F: Fn(Publisher<T>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let shared = Arc::new(Shared {
            name,
            value: watch::channel(initial).0,
            observers: watch::channel(0).0,
        });
        let driver = tokio::spawn(drive(Arc::clone(&shared), idle_grace, upstream));
        Self {
            shared,
            driver: Some(driver),
        }
    }

    /// Build a state that is only ever written through [`SharedState::publisher`].
    pub fn local(name: &'static str, initial: T) -> Self {
        Self {
            shared: Arc::new(Shared {
                name,
                value: watch::channel(initial).0,
                observers: watch::channel(0).0,
            }),
            driver: None,
        }
    }

    /// The last known value. Never attaches, never waits.
    pub fn value(&self) -> T {
        self.shared.value.borrow().clone()
    }

    pub fn subscribe(&self) -> Observer<T> {
        self.shared.observers.send_modify(|count| *count += 1);
        Observer {
            rx: self.shared.value.subscribe(),
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn publisher(&self) -> Publisher<T> {
        Publisher {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn observer_count(&self) -> usize {
        *self.shared.observers.borrow()
    }

    pub fn name(&self) -> &'static str {
        self.shared.name
    }
}

impl<T> Drop for SharedState<T> {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}

/// An attached reader. Keeps the upstream alive for as long as it exists.
pub struct Observer<T> {
    rx: watch::Receiver<T>,
    shared: Arc<Shared<T>>,
}

impl<T: Clone> Observer<T> {
    pub fn get(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Borrow the current value and mark it as seen.
    pub fn borrow(&mut self) -> watch::Ref<'_, T> {
        self.rx.borrow_and_update()
    }

    /// Wait until a value newer than the last one seen is published.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Wait until the current value satisfies `predicate` and return a copy.
    pub async fn wait_for(&mut self, predicate: impl FnMut(&T) -> bool) -> Option<T> {
        self.rx.wait_for(predicate).await.ok().map(|value| value.clone())
    }

    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }
}

impl<T> Drop for Observer<T> {
    fn drop(&mut self) {
        self.shared
            .observers
            .send_modify(|count| *count = count.saturating_sub(1));
    }
}

/// Aborts the wrapped task when dropped, including when the driver itself is
/// aborted.
struct Upstream(JoinHandle<()>);

impl Drop for Upstream {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn drive<T, F, Fut>(shared: Arc<Shared<T>>, idle_grace: Duration, upstream: F)
where
    T: Send + Sync + 'static,
    F: Fn(Publisher<T>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let mut observers = shared.observers.subscribe();

    loop {
        if !wait_observers(&mut observers, |count| *count > 0).await {
            return;
        }

        log::debug!("{}: observer attached, starting upstream", shared.name);
        let running = Upstream(tokio::spawn(upstream(Publisher {
            shared: Arc::clone(&shared),
        })));

        loop {
            if !wait_observers(&mut observers, |count| *count == 0).await {
                return;
            }
            let revived = tokio::time::timeout(
                idle_grace,
                wait_observers(&mut observers, |count| *count > 0),
            )
            .await;
            match revived {
                Ok(true) => continue,
                Ok(false) => return,
                Err(_) => break,
            }
        }

        drop(running);
        log::debug!("{}: idle past grace window, upstream torn down", shared.name);
    }
}

async fn wait_observers(
    observers: &mut watch::Receiver<usize>,
    predicate: impl FnMut(&usize) -> bool,
) -> bool {
    observers.wait_for(predicate).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_state(starts: Arc<AtomicUsize>, grace: Duration) -> SharedState<u32> {
        SharedState::new("counter", 0, grace, move |publisher| {
            let starts = Arc::clone(&starts);
            async move {
                let run = starts.fetch_add(1, Ordering::SeqCst) as u32 + 1;
                publisher.publish(run * 10);
                std::future::pending::<()>().await;
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn upstream_starts_on_first_observer() {
        let starts = Arc::new(AtomicUsize::new(0));
        let state = counting_state(Arc::clone(&starts), Duration::from_secs(5));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(starts.load(Ordering::SeqCst), 0);
        assert_eq!(state.value(), 0);

        let mut observer = state.subscribe();
        assert_eq!(observer.wait_for(|v| *v == 10).await, Some(10));
        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_teardown_keeps_last_value_and_restarts_lazily() {
        let starts = Arc::new(AtomicUsize::new(0));
        let state = counting_state(Arc::clone(&starts), Duration::from_secs(5));

        let mut observer = state.subscribe();
        observer.wait_for(|v| *v == 10).await;
        drop(observer);

        // Re-attaching inside the grace window keeps the same upstream.
        tokio::time::sleep(Duration::from_secs(2)).await;
        let observer = state.subscribe();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(starts.load(Ordering::SeqCst), 1);
        drop(observer);

        // Past the grace window the upstream goes away but the value stays.
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(state.value(), 10);

        let mut observer = state.subscribe();
        assert_eq!(observer.get(), 10);
        assert_eq!(observer.wait_for(|v| *v == 20).await, Some(20));
        assert_eq!(starts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn equal_values_do_not_wake_observers() {
        let state = SharedState::local("local", 1u32);
        let publisher = state.publisher();
        let observer = state.subscribe();

        publisher.publish(1);
        assert!(!observer.has_changed());
        publisher.publish(2);
        assert!(observer.has_changed());
        assert_eq!(state.value(), 2);
    }
}
