use log::{debug, trace};
use std::{
    fmt::Debug,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError, Weak,
    },
};

/// Sink that distributes published values to its subscribers.
///
/// Publishing never fails from the caller's perspective, whatever happens
/// to the value afterwards is up to the implementation.
pub trait Publisher<T> {
    fn publish(&self, value: T);
}

impl<T, P> Publisher<T> for &P
where
    P: Publisher<T> + ?Sized,
{
    fn publish(&self, value: T) {
        (**self).publish(value)
    }
}

impl<T, P> Publisher<T> for Arc<P>
where
    P: Publisher<T> + ?Sized,
{
    fn publish(&self, value: T) {
        (**self).publish(value)
    }
}

impl<T, P> Publisher<T> for Box<P>
where
    P: Publisher<T> + ?Sized,
{
    fn publish(&self, value: T) {
        (**self).publish(value)
    }
}

type Callback<T> = Arc<dyn Fn(T) + Send + Sync>;

struct Subscriber<T> {
    id: u64,
    callback: Callback<T>,

    /// Cleared on cancel and finish, checked before every delivery so that
    /// an in-flight publish skips subscribers removed by earlier callbacks.
    active: Arc<AtomicBool>,
}

impl<T> Subscriber<T> {
    fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }
}

struct Inner<T> {
    next_id: u64,
    subscribers: Vec<Subscriber<T>>,
    finished: bool,
}

/// Subject that hands every published value to all current subscribers.
///
/// Nothing is buffered: values published while there are no subscribers
/// are dropped. Clones share subscribers, so any clone may publish to
/// callbacks registered through another.
///
/// ```
/// use result_extensions::{OutcomeExt, PassthroughSubject};
/// use std::sync::{Arc, Mutex};
///
/// let subject = PassthroughSubject::<Result<u32, String>>::new();
/// let seen = Arc::new(Mutex::new(vec![]));
///
/// let sink = seen.clone();
/// let _subscription = subject.subscribe(move |value| sink.lock().unwrap().push(value));
///
/// let ok: Result<u32, String> = Ok(1);
/// let err: Result<u32, String> = Err("bad".into());
/// ok.publish(&subject);
/// err.publish(&subject);
///
/// assert_eq!(*seen.lock().unwrap(), vec![Ok(1), Err("bad".to_string())]);
/// ```
pub struct PassthroughSubject<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> PassthroughSubject<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                next_id: 0,
                subscribers: vec![],
                finished: false,
            })),
        }
    }

    /// Registers callback that will receive every value published from now on.
    ///
    /// Callback stays registered as long as returned [`Subscription`] lives,
    /// see [`Subscription::detach`] for fire-and-forget usage. Subscribing to
    /// finished subject returns inert subscription.
    pub fn subscribe<C>(&self, callback: C) -> Subscription
    where
        T: 'static,
        C: Fn(T) + Send + Sync + 'static,
    {
        let mut inner = lock(&self.inner);
        if inner.finished {
            debug!("PassthroughSubject::subscribe - subject already finished");
            return Subscription {
                id: None,
                subject: None,
            };
        }

        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push(Subscriber {
            id,
            callback: Arc::new(callback),
            active: Arc::new(AtomicBool::new(true)),
        });
        drop(inner);

        debug!("PassthroughSubject::subscribe - registered subscriber {}", id);

        let subject: Arc<dyn Unsubscribe> = self.inner.clone();
        Subscription {
            id: Some(id),
            subject: Some(Arc::downgrade(&subject)),
        }
    }

    /// Completes subject. Subscribers are released and later values go nowhere.
    pub fn finish(&self) {
        let mut inner = lock(&self.inner);
        if inner.finished {
            return;
        }

        inner.finished = true;
        let released = std::mem::take(&mut inner.subscribers);
        drop(inner);

        released.iter().for_each(Subscriber::deactivate);

        debug!(
            "PassthroughSubject::finish - released {} subscribers",
            released.len()
        );
    }

    pub fn is_finished(&self) -> bool {
        lock(&self.inner).finished
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).subscribers.len()
    }
}

impl<T> Publisher<T> for PassthroughSubject<T>
where
    T: Clone,
{
    /// Delivers value to subscribers in order of subscription, on the calling thread.
    ///
    /// Callbacks run without the subject being locked, so they may publish,
    /// subscribe or cancel any subscriber. Subscribers cancelled (or subject
    /// finished) by an earlier callback don't get the value.
    fn publish(&self, value: T) {
        let targets: Vec<(Callback<T>, Arc<AtomicBool>)> = {
            let inner = lock(&self.inner);
            if inner.finished {
                trace!("PassthroughSubject::publish - subject finished, value dropped");
                return;
            }
            inner
                .subscribers
                .iter()
                .map(|s| (s.callback.clone(), s.active.clone()))
                .collect()
        };

        trace!(
            "PassthroughSubject::publish - delivering to {} subscribers",
            targets.len()
        );

        for (callback, active) in &targets {
            if active.load(Ordering::Acquire) {
                callback(value.clone());
            }
        }
    }
}

impl<T> Default for PassthroughSubject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for PassthroughSubject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Debug for PassthroughSubject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("PassthroughSubject")
            .field("subscribers", &inner.subscribers.len())
            .field("finished", &inner.finished)
            .finish()
    }
}

/// List lock is never held while user code runs, so the list itself
/// can't be left half-updated by a panic.
fn lock<T>(inner: &Mutex<Inner<T>>) -> MutexGuard<'_, Inner<T>> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Erases subscriber type so that [`Subscription`] is not generic.
trait Unsubscribe: Send + Sync {
    fn unsubscribe(&self, id: u64);
}

impl<T> Unsubscribe for Mutex<Inner<T>> {
    fn unsubscribe(&self, id: u64) {
        let mut inner = lock(self);
        let position = inner.subscribers.iter().position(|s| s.id == id);
        let removed = position.map(|index| inner.subscribers.remove(index));
        drop(inner);

        if let Some(subscriber) = removed {
            subscriber.deactivate();
            debug!("Subscription::cancel - removed subscriber {}", id);
        }
    }
}

/// Handle to registered subscriber. Dropping it cancels the subscription.
#[must_use = "dropping a Subscription immediately cancels it"]
pub struct Subscription {
    id: Option<u64>,
    subject: Option<Weak<dyn Unsubscribe>>,
}

impl Subscription {
    /// Id of the subscriber, `None` if subject was already finished when subscribing.
    pub fn id(&self) -> Option<u64> {
        self.id
    }

    /// Removes subscriber from the subject.
    pub fn cancel(self) {
        drop(self)
    }

    /// Gives up the handle, subscriber stays registered until subject finishes.
    pub fn detach(mut self) {
        self.subject = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let (Some(id), Some(subject)) = (self.id, self.subject.take()) {
            if let Some(subject) = subject.upgrade() {
                subject.unsubscribe(id);
            }
        }
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("attached", &self.subject.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{PassthroughSubject, Publisher};
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[test]
    fn test_subscription_drop_unsubscribes() {
        let subject = PassthroughSubject::<u8>::new();

        let first = subject.subscribe(|_| {});
        let second = subject.subscribe(|_| {});
        assert_eq!(first.id(), Some(0));
        assert_eq!(second.id(), Some(1));
        assert_eq!(subject.subscriber_count(), 2);

        drop(first);
        assert_eq!(subject.subscriber_count(), 1);

        second.cancel();
        assert_eq!(subject.subscriber_count(), 0);
    }

    #[test]
    fn test_subscription_outlives_subject() {
        let subject = PassthroughSubject::<u8>::new();
        let subscription = subject.subscribe(|_| {});

        drop(subject);
        subscription.cancel();
    }

    #[test]
    fn test_finish_releases_callbacks() {
        let subject = PassthroughSubject::<u8>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        subject.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .detach();

        subject.publish(1);
        subject.finish();
        subject.publish(2);

        assert!(subject.is_finished());
        assert_eq!(subject.subscriber_count(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // Only our handle is left once subject dropped the callback.
        assert_eq!(Arc::strong_count(&calls), 1);

        let late = subject.subscribe(|_| {});
        assert_eq!(late.id(), None);
    }
}
