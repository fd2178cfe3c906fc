//! Interceptor hooks.
//!
//! A [`Hook`] is a function tagged with the pipeline [`Phase`] it runs in. Hooks are
//! collected into a [`HookSet`], which keeps one ordered list per phase. A service that
//! extends another resolves its hooks once as `parent ++ own`, so ancestor hooks always
//! run first.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use ajaxkit_interface::{Error, RequestConfig, Result};
use futures::future::BoxFuture;

use crate::Response;

/// A stage of the interceptor pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Transforms the merged configuration before the transport is called.
    BeforeRequest,
    /// Transforms a successful response. May turn it into a failure.
    BeforeSuccess,
    /// Attempts to recover from a failure.
    BeforeFail,
    /// Observes the final success.
    OnSuccess,
    /// Observes a final failure that is not an abort.
    OnFail,
    /// Observes a final failure caused by cancellation.
    OnAbort,
    /// Observes every outcome, after the other terminal hooks.
    OnComplete,
}

impl Phase {
    /// Every phase, in pipeline order.
    pub const ALL: [Phase; 7] = [
        Self::BeforeRequest,
        Self::BeforeSuccess,
        Self::BeforeFail,
        Self::OnSuccess,
        Self::OnFail,
        Self::OnAbort,
        Self::OnComplete,
    ];

    /// The conventional camel-case name of the phase.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BeforeRequest => "beforeRequest",
            Self::BeforeSuccess => "beforeSuccess",
            Self::BeforeFail => "beforeFail",
            Self::OnSuccess => "onSuccess",
            Self::OnFail => "onFail",
            Self::OnAbort => "onAbort",
            Self::OnComplete => "onComplete",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) type BeforeRequestFn =
    Arc<dyn Fn(RequestConfig) -> BoxFuture<'static, Result<RequestConfig>> + Send + Sync>;
pub(crate) type BeforeSuccessFn =
    Arc<dyn Fn(Response) -> BoxFuture<'static, Result<Response>> + Send + Sync>;
pub(crate) type BeforeFailFn =
    Arc<dyn Fn(Error, Arc<RequestConfig>) -> BoxFuture<'static, Result<Response>> + Send + Sync>;
pub(crate) type OnSuccessFn = Arc<dyn Fn(&Response) + Send + Sync>;
pub(crate) type OnFailFn = Arc<dyn Fn(&Error, &RequestConfig) + Send + Sync>;
pub(crate) type OnCompleteFn =
    Arc<dyn Fn(std::result::Result<&Response, &Error>, &RequestConfig) + Send + Sync>;

/// A function bound to a pipeline phase.
#[derive(Clone)]
pub struct Hook(HookFn);

#[derive(Clone)]
enum HookFn {
    BeforeRequest(BeforeRequestFn),
    BeforeSuccess(BeforeSuccessFn),
    BeforeFail(BeforeFailFn),
    OnSuccess(OnSuccessFn),
    OnFail(OnFailFn),
    OnAbort(OnFailFn),
    OnComplete(OnCompleteFn),
}

impl Hook {
    /// Runs before the transport with the configuration produced by the previous hook.
    ///
    /// Returning an error skips the transport and enters the failure path.
    pub fn before_request<F, Fut>(f: F) -> Self
    where
        F: Fn(RequestConfig) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RequestConfig>> + Send + 'static,
    {
        Self(HookFn::BeforeRequest(Arc::new(
            move |config| -> BoxFuture<'static, _> { Box::pin(f(config)) },
        )))
    }

    /// Runs on a successful response with the response produced by the previous hook.
    ///
    /// Returning an error turns the outcome into a failure, e.g. for application-level
    /// error envelopes delivered with status 200.
    pub fn before_success<F, Fut>(f: F) -> Self
    where
        F: Fn(Response) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response>> + Send + 'static,
    {
        Self(HookFn::BeforeSuccess(Arc::new(
            move |res| -> BoxFuture<'static, _> { Box::pin(f(res)) },
        )))
    }

    /// Runs on failure. Returning `Ok` rescues the request with that response.
    ///
    /// Returning an error replaces the current error and hands it to the next
    /// `before_fail` hook.
    pub fn before_fail<F, Fut>(f: F) -> Self
    where
        F: Fn(Error, Arc<RequestConfig>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response>> + Send + 'static,
    {
        Self(HookFn::BeforeFail(Arc::new(
            move |error, config| -> BoxFuture<'static, _> { Box::pin(f(error, config)) },
        )))
    }

    /// Observes the final successful response.
    ///
    /// Terminal hooks run synchronously on the task that awaits the request. They cannot
    /// change the outcome, and a panic inside one is not caught: it unwinds through the
    /// caller of the request.
    pub fn on_success(f: impl Fn(&Response) + Send + Sync + 'static) -> Self {
        Self(HookFn::OnSuccess(Arc::new(f)))
    }

    /// Observes a final failure that is not an abort. See [`Hook::on_success`] for caveats.
    pub fn on_fail(f: impl Fn(&Error, &RequestConfig) + Send + Sync + 'static) -> Self {
        Self(HookFn::OnFail(Arc::new(f)))
    }

    /// Observes a final failure caused by cancellation. See [`Hook::on_success`] for caveats.
    pub fn on_abort(f: impl Fn(&Error, &RequestConfig) + Send + Sync + 'static) -> Self {
        Self(HookFn::OnAbort(Arc::new(f)))
    }

    /// Observes the outcome whatever it is, after `on_success`, `on_fail` or `on_abort`
    /// ran. See [`Hook::on_success`] for caveats.
    pub fn on_complete(
        f: impl Fn(std::result::Result<&Response, &Error>, &RequestConfig) + Send + Sync + 'static,
    ) -> Self {
        Self(HookFn::OnComplete(Arc::new(f)))
    }

    /// The phase this hook runs in.
    pub fn phase(&self) -> Phase {
        match self.0 {
            HookFn::BeforeRequest(_) => Phase::BeforeRequest,
            HookFn::BeforeSuccess(_) => Phase::BeforeSuccess,
            HookFn::BeforeFail(_) => Phase::BeforeFail,
            HookFn::OnSuccess(_) => Phase::OnSuccess,
            HookFn::OnFail(_) => Phase::OnFail,
            HookFn::OnAbort(_) => Phase::OnAbort,
            HookFn::OnComplete(_) => Phase::OnComplete,
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Hook").field(&self.phase()).finish()
    }
}

/// Ordered hook lists, one per phase.
#[derive(Clone, Default)]
pub struct HookSet {
    pub(crate) before_request: Vec<BeforeRequestFn>,
    pub(crate) before_success: Vec<BeforeSuccessFn>,
    pub(crate) before_fail: Vec<BeforeFailFn>,
    pub(crate) on_success: Vec<OnSuccessFn>,
    pub(crate) on_fail: Vec<OnFailFn>,
    pub(crate) on_abort: Vec<OnFailFn>,
    pub(crate) on_complete: Vec<OnCompleteFn>,
}

impl HookSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `hook` to the list of its phase.
    pub fn push(&mut self, hook: Hook) {
        match hook.0 {
            HookFn::BeforeRequest(f) => self.before_request.push(f),
            HookFn::BeforeSuccess(f) => self.before_success.push(f),
            HookFn::BeforeFail(f) => self.before_fail.push(f),
            HookFn::OnSuccess(f) => self.on_success.push(f),
            HookFn::OnFail(f) => self.on_fail.push(f),
            HookFn::OnAbort(f) => self.on_abort.push(f),
            HookFn::OnComplete(f) => self.on_complete.push(f),
        }
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, hook: Hook) -> Self {
        self.push(hook);
        self
    }

    /// Returns `parent`'s hooks followed by `own`'s, phase by phase.
    pub fn chained(parent: &HookSet, own: &HookSet) -> HookSet {
        fn concat<T: Clone>(a: &[T], b: &[T]) -> Vec<T> {
            a.iter().chain(b).cloned().collect()
        }
        HookSet {
            before_request: concat(&parent.before_request, &own.before_request),
            before_success: concat(&parent.before_success, &own.before_success),
            before_fail: concat(&parent.before_fail, &own.before_fail),
            on_success: concat(&parent.on_success, &own.on_success),
            on_fail: concat(&parent.on_fail, &own.on_fail),
            on_abort: concat(&parent.on_abort, &own.on_abort),
            on_complete: concat(&parent.on_complete, &own.on_complete),
        }
    }

    /// Number of hooks registered for `phase`.
    pub fn len(&self, phase: Phase) -> usize {
        match phase {
            Phase::BeforeRequest => self.before_request.len(),
            Phase::BeforeSuccess => self.before_success.len(),
            Phase::BeforeFail => self.before_fail.len(),
            Phase::OnSuccess => self.on_success.len(),
            Phase::OnFail => self.on_fail.len(),
            Phase::OnAbort => self.on_abort.len(),
            Phase::OnComplete => self.on_complete.len(),
        }
    }

    /// Whether no hook is registered for any phase.
    pub fn is_empty(&self) -> bool {
        Phase::ALL.into_iter().all(|phase| self.len(phase) == 0)
    }
}

impl fmt::Debug for HookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(Phase::ALL.into_iter().map(|phase| (phase, self.len(phase))))
            .finish()
    }
}

impl FromIterator<Hook> for HookSet {
    fn from_iter<I: IntoIterator<Item = Hook>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<Hook> for HookSet {
    fn extend<I: IntoIterator<Item = Hook>>(&mut self, iter: I) {
        for hook in iter {
            self.push(hook);
        }
    }
}
