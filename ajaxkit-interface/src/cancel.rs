//! Multicast, fire-once cancellation.
//!
//! A [`CancellationToken`] is shared by everyone interested in one logical operation: the
//! orchestrator hands it to the transport, a UI scope may fire it on teardown, a timer may
//! fire it on expiry. Only the first [`fire`](CancellationToken::fire) has an effect.
//!
//! Callbacks registered after the token fired are invoked immediately with the reason the
//! token fired with, so a late subscriber can never miss the signal.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures::channel::oneshot;

use crate::Error;

/// Why a token fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// Explicit cancellation, e.g. a UI scope being torn down.
    Aborted,
    /// The request timeout elapsed.
    Timeout,
}

impl CancelReason {
    /// The error a request cancelled for this reason settles with.
    pub fn into_error(self) -> Error {
        match self {
            Self::Aborted => Error::Aborted,
            Self::Timeout => Error::Timeout,
        }
    }
}

impl From<CancelReason> for Error {
    fn from(reason: CancelReason) -> Self {
        reason.into_error()
    }
}

/// A cancellation callback.
///
/// Identity is by allocation: clones of one `Callback` are the same callback, two callbacks
/// created from equal closures are not.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn(CancelReason) + Send + Sync>);

impl Callback {
    /// Wraps a closure.
    pub fn new(f: impl Fn(CancelReason) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Whether both handles refer to the same callback.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn call(&self, reason: CancelReason) {
        (self.0)(reason)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Arc::as_ptr(&self.0))
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<F> From<F> for Callback
where
    F: Fn(CancelReason) + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

/// A shared, fire-once cancellation signal.
///
/// Cloning yields another handle to the same token. No handle owns the token exclusively.
#[derive(Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    fired: Option<CancelReason>,
    callbacks: Vec<Callback>,
    // Forwarding callbacks this token installed on its inputs (see `any_of`).
    links: Vec<(CancellationToken, Callback)>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CancellationToken {
    /// Creates a token that has not fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback`.
    ///
    /// Registering the same callback twice is a no-op. If the token has already fired, the
    /// callback is invoked immediately on the calling thread and is not retained.
    pub fn register(&self, callback: impl Into<Callback>) {
        let callback = callback.into();
        let fired = {
            let mut state = lock(&self.inner.state);
            if state.fired.is_none() && !state.callbacks.iter().any(|c| c.ptr_eq(&callback)) {
                state.callbacks.push(callback.clone());
            }
            state.fired
        };
        if let Some(reason) = fired {
            callback.call(reason);
        }
    }

    /// Removes `callback` if it is registered.
    pub fn deregister(&self, callback: &Callback) {
        lock(&self.inner.state)
            .callbacks
            .retain(|c| !c.ptr_eq(callback));
    }

    /// Fires the token as [`CancelReason::Aborted`].
    ///
    /// Returns `true` if this call fired the token, `false` if it had already fired.
    pub fn fire(&self) -> bool {
        self.fire_with(CancelReason::Aborted)
    }

    /// Fires the token with an explicit reason.
    ///
    /// Only the first call has an effect: every callback registered at that moment is
    /// invoked once, in registration order, outside the internal lock.
    pub fn fire_with(&self, reason: CancelReason) -> bool {
        let callbacks = {
            let mut state = lock(&self.inner.state);
            if state.fired.is_some() {
                return false;
            }
            state.fired = Some(reason);
            std::mem::take(&mut state.callbacks)
        };
        for callback in &callbacks {
            callback.call(reason);
        }
        true
    }

    /// Whether the token has fired.
    pub fn is_cancelled(&self) -> bool {
        self.reason().is_some()
    }

    /// The reason the token fired with, if it has.
    pub fn reason(&self) -> Option<CancelReason> {
        lock(&self.inner.state).fired
    }

    /// Whether both handles refer to the same token.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns a new token that fires as soon as either input fires, with that input's reason.
    ///
    /// The inputs only hold a weak reference to the combined token. Dropping every handle of
    /// the combined token removes its forwarding callbacks from the inputs.
    pub fn any_of(a: &Self, b: &Self) -> Self {
        let combined = Self::new();
        combined.link(a);
        combined.link(b);
        combined
    }

    fn link(&self, input: &Self) {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let forward = Callback::new(move |reason| {
            if let Some(inner) = weak.upgrade() {
                CancellationToken { inner }.fire_with(reason);
            }
        });
        lock(&self.inner.state)
            .links
            .push((input.clone(), forward.clone()));
        input.register(forward);
    }

    /// Waits until the token fires and returns the reason.
    ///
    /// The internal registration is removed when the returned future is dropped.
    pub async fn cancelled(&self) -> CancelReason {
        let (tx, rx) = oneshot::channel();
        let tx = Mutex::new(Some(tx));
        let notify = Callback::new(move |reason| {
            if let Some(tx) = lock(&tx).take() {
                let _ = tx.send(reason);
            }
        });
        let _registration = Registration {
            token: self,
            callback: notify.clone(),
        };
        self.register(notify);
        match rx.await {
            Ok(reason) => reason,
            Err(_) => futures::future::pending().await,
        }
    }

    /// Wraps the token in a guard that fires it when dropped.
    ///
    /// This ties a token to a scope such as a UI component or a task: keep the guard for
    /// as long as the scope lives and pass [`DropGuard::token`] into request configs.
    pub fn drop_guard(self) -> DropGuard {
        DropGuard { token: Some(self) }
    }

    #[cfg(test)]
    fn callback_count(&self) -> usize {
        lock(&self.inner.state).callbacks.len()
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.inner.state);
        f.debug_struct("CancellationToken")
            .field("fired", &state.fired)
            .field("callbacks", &state.callbacks.len())
            .finish()
    }
}

/// Tokens compare by identity.
impl PartialEq for CancellationToken {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for CancellationToken {}

impl Drop for Inner {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (input, forward) in state.links.drain(..) {
            input.deregister(&forward);
        }
    }
}

struct Registration<'a> {
    token: &'a CancellationToken,
    callback: Callback,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.token.deregister(&self.callback);
    }
}

/// Fires its token when dropped. Created by [`CancellationToken::drop_guard`].
#[must_use = "the token fires as soon as the guard is dropped"]
#[derive(Debug)]
pub struct DropGuard {
    token: Option<CancellationToken>,
}

impl DropGuard {
    /// The guarded token.
    pub fn token(&self) -> &CancellationToken {
        self.token
            .as_ref()
            .unwrap_or_else(|| unreachable!("token is only taken on drop or disarm"))
    }

    /// Releases the token without firing it.
    pub fn disarm(mut self) -> CancellationToken {
        self.token
            .take()
            .unwrap_or_else(|| unreachable!("token is only taken on drop or disarm"))
    }
}

impl Drop for DropGuard {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            token.fire();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, Callback) {
        let count = Arc::new(AtomicUsize::new(0));
        let callback = Callback::new({
            let count = count.clone();
            move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            }
        });
        (count, callback)
    }

    #[test]
    fn test_fire_is_idempotent() {
        let token = CancellationToken::new();
        let (count, callback) = counter();
        token.register(callback);

        assert!(token.fire());
        assert!(!token.fire());
        assert!(!token.fire_with(CancelReason::Timeout));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(token.reason(), Some(CancelReason::Aborted));
    }

    #[test]
    fn test_register_is_idempotent_by_reference() {
        let token = CancellationToken::new();
        let (count, callback) = counter();
        token.register(callback.clone());
        token.register(callback.clone());
        assert_eq!(token.callback_count(), 1);

        let (other_count, other) = counter();
        token.register(other);
        token.fire();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(other_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_deregister() {
        let token = CancellationToken::new();
        let (count, callback) = counter();
        token.register(callback.clone());
        token.deregister(&callback);
        // unknown callbacks are ignored
        token.deregister(&counter().1);
        token.fire();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_callbacks_run_in_registration_order() {
        let token = CancellationToken::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..4 {
            let order = order.clone();
            token.register(move |_| order.lock().unwrap().push(i));
        }
        token.fire();
        assert_eq!(*order.lock().unwrap(), [0, 1, 2, 3]);
    }

    #[test]
    fn test_register_after_fire_invokes_immediately() {
        let token = CancellationToken::new();
        token.fire_with(CancelReason::Timeout);

        let seen = Arc::new(Mutex::new(None));
        token.register({
            let seen = seen.clone();
            move |reason| *seen.lock().unwrap() = Some(reason)
        });
        assert_eq!(*seen.lock().unwrap(), Some(CancelReason::Timeout));
        assert_eq!(token.callback_count(), 0);
    }

    #[test]
    fn test_any_of_fires_once_with_first_reason() {
        let a = CancellationToken::new();
        let b = CancellationToken::new();
        let combined = CancellationToken::any_of(&a, &b);
        let (count, callback) = counter();
        combined.register(callback);

        assert!(!combined.is_cancelled());
        b.fire_with(CancelReason::Timeout);
        assert_eq!(combined.reason(), Some(CancelReason::Timeout));
        a.fire();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(combined.reason(), Some(CancelReason::Timeout));
        // inputs stay independent
        assert_eq!(a.reason(), Some(CancelReason::Aborted));
    }

    #[test]
    fn test_any_of_does_not_fire_inputs() {
        let a = CancellationToken::new();
        let b = CancellationToken::new();
        let combined = CancellationToken::any_of(&a, &b);
        combined.fire();
        assert!(!a.is_cancelled());
        assert!(!b.is_cancelled());
    }

    #[test]
    fn test_any_of_with_fired_input() {
        let a = CancellationToken::new();
        a.fire();
        let combined = CancellationToken::any_of(&a, &CancellationToken::new());
        assert_eq!(combined.reason(), Some(CancelReason::Aborted));
    }

    #[test]
    fn test_dropping_combined_token_cleans_up_inputs() {
        let a = CancellationToken::new();
        let b = CancellationToken::new();
        let combined = CancellationToken::any_of(&a, &b);
        assert_eq!(a.callback_count(), 1);
        assert_eq!(b.callback_count(), 1);
        drop(combined);
        assert_eq!(a.callback_count(), 0);
        assert_eq!(b.callback_count(), 0);
        a.fire();
    }

    #[test]
    fn test_concurrent_fire_invokes_once() {
        let token = CancellationToken::new();
        let (count, callback) = counter();
        token.register(callback);
        let fired = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let token = token.clone();
                let fired = fired.clone();
                thread::spawn(move || {
                    if token.fire() {
                        fired.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_guard() {
        let guard = CancellationToken::new().drop_guard();
        let token = guard.token().clone();
        assert!(!token.is_cancelled());
        drop(guard);
        assert_eq!(token.reason(), Some(CancelReason::Aborted));

        let token = CancellationToken::new().drop_guard().disarm();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancelled_future() {
        let token = CancellationToken::new();
        let waiter = {
            let token = token.clone();
            thread::spawn(move || futures::executor::block_on(token.cancelled()))
        };
        while token.callback_count() == 0 {
            thread::yield_now();
        }
        token.fire_with(CancelReason::Timeout);
        assert_eq!(waiter.join().unwrap(), CancelReason::Timeout);

        // already fired
        let reason = futures::executor::block_on(token.cancelled());
        assert_eq!(reason, CancelReason::Timeout);
        assert_eq!(token.callback_count(), 0);
    }
}
