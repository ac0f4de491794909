use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

/// Observable value: holds the current state and signals every change to
/// subscribers. This is the consumption mechanism the orchestrator exposes;
/// a presentation layer reads with `get`/`get_sync` and re-renders on
/// subscriber wakeups.
pub struct Property<T: Clone + Send + Sync> {
    watch_sender: Arc<watch::Sender<T>>,
    watch_receiver: watch::Receiver<T>,
    broadcast_sender: broadcast::Sender<()>,
    name: String,
}

impl<T: Clone + Send + Sync> Property<T> {
    pub fn new(initial_value: T, name: impl Into<String>) -> Self {
        let (watch_sender, watch_receiver) = watch::channel(initial_value);
        let (broadcast_sender, _) = broadcast::channel(100);
        Self {
            watch_sender: Arc::new(watch_sender),
            watch_receiver,
            broadcast_sender,
            name: name.into(),
        }
    }

    pub async fn get(&self) -> T {
        self.watch_receiver.borrow().clone()
    }

    /// Read the value without awaiting. The value is already in memory, so
    /// this is safe from a UI thread.
    pub fn get_sync(&self) -> T {
        self.watch_receiver.borrow().clone()
    }

    pub async fn set(&self, new_value: T) {
        let _ = self.watch_sender.send(new_value);
        let _ = self.broadcast_sender.send(());
    }

    pub async fn update<F>(&self, updater: F)
    where
        F: FnOnce(&mut T),
    {
        let mut new_value = self.watch_receiver.borrow().clone();
        updater(&mut new_value);
        let _ = self.watch_sender.send(new_value);
        let _ = self.broadcast_sender.send(());
    }

    pub fn subscribe(&self) -> PropertySubscriber {
        PropertySubscriber {
            receiver: self.broadcast_sender.subscribe(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T: Clone + Send + Sync> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            watch_sender: self.watch_sender.clone(),
            watch_receiver: self.watch_receiver.clone(),
            broadcast_sender: self.broadcast_sender.clone(),
            name: self.name.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + Debug> Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Property({})", self.name)
    }
}

/// Change listener for a [`Property`].
///
/// Intentionally not `Clone`; call `subscribe()` again for an independent
/// listener.
pub struct PropertySubscriber {
    receiver: broadcast::Receiver<()>,
}

impl PropertySubscriber {
    /// Wait for the next change. Returns `false` once the property is gone.
    pub async fn wait_for_change(&mut self) -> bool {
        loop {
            match self.receiver.recv().await {
                Ok(_) => return true,
                // Lagged behind: skip to the latest and keep waiting
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return false,
            }
        }
    }

    pub fn try_recv(&mut self) -> bool {
        match self.receiver.try_recv() {
            Ok(_) => true,
            Err(broadcast::error::TryRecvError::Empty) => false,
            // Lag counts as a change; the next recv() realigns
            Err(broadcast::error::TryRecvError::Lagged(_)) => true,
            Err(broadcast::error::TryRecvError::Closed) => false,
        }
    }
}

/// Lagging view of a source [`Property`], updated only after the source has
/// been quiet for the configured delay.
///
/// Dropping it aborts the timer task, so a pending emission can never land
/// in a consumer that stopped observing.
pub struct DebouncedProperty<T: Clone + Send + Sync> {
    property: Property<T>,
    task_handle: tokio::task::JoinHandle<()>,
}

impl<T: Clone + Send + Sync> DebouncedProperty<T> {
    pub async fn get(&self) -> T {
        self.property.get().await
    }

    pub fn get_sync(&self) -> T {
        self.property.get_sync()
    }

    pub fn subscribe(&self) -> PropertySubscriber {
        self.property.subscribe()
    }

    pub fn name(&self) -> &str {
        self.property.name()
    }
}

impl<T: Clone + Send + Sync> Drop for DebouncedProperty<T> {
    fn drop(&mut self) {
        self.task_handle.abort();
    }
}

impl<T: Clone + Send + Sync + Debug> Debug for DebouncedProperty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DebouncedProperty({})", self.property.name)
    }
}

impl<T: Clone + Send + Sync + 'static> Property<T> {
    /// Produce a debounced companion of this property.
    ///
    /// Each source change supersedes any pending emission and restarts the
    /// timer; once the source stays quiet for `delay`, the companion is set
    /// to the latest source value, so intermediate values never appear. A
    /// zero delay forwards every settled change immediately with no timer
    /// (the delay cannot be negative; zero is the floor of the contract).
    pub fn debounce(&self, delay: Duration) -> DebouncedProperty<T> {
        let source = self.clone();
        let debounced = Property::new(self.get_sync(), format!("{}.debounced", self.name()));
        let debounced_clone = debounced.clone();

        let task_handle = tokio::spawn(async move {
            let mut subscriber = source.subscribe();

            loop {
                if !subscriber.wait_for_change().await {
                    break; // source dropped
                }

                if delay.is_zero() {
                    debounced_clone.set(source.get_sync()).await;
                    continue;
                }

                // Keep restarting the timer while changes arrive
                loop {
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {
                            debounced_clone.set(source.get_sync()).await;
                            break;
                        }
                        changed = subscriber.wait_for_change() => {
                            if !changed {
                                return; // source dropped mid-burst
                            }
                        }
                    }
                }
            }
        });

        DebouncedProperty {
            property: debounced,
            task_handle,
        }
    }
}
