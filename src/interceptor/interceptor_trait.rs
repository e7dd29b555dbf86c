use crate::interceptor::InterceptorBatchMethods;
use std::sync::Arc;

/// User code invoked at armed hook points.
///
/// Every invocation must end with exactly one call to
/// `methods.proceed()` or `methods.hijack()` before returning. The engine
/// resumes the chain only after `intercept` returns, so an interceptor never
/// observes the interceptors after it from inside its own body.
pub trait Interceptor: Send + Sync {
    fn intercept(&self, methods: &mut InterceptorBatchMethods<'_>);
}

impl<F> Interceptor for F
where
    F: Fn(&mut InterceptorBatchMethods<'_>) + Send + Sync,
{
    fn intercept(&self, methods: &mut InterceptorBatchMethods<'_>) {
        self(methods)
    }
}

/// Wraps a closure as a shareable interceptor handle.
///
/// ```
/// use opbatch::interceptor::{InterceptionHookPoint, interceptor_fn};
///
/// let tagger = interceptor_fn(|methods| {
///     if methods.query_interception_hook_point(InterceptionHookPoint::PreSendInitialMetadata) {
///         if let Some(metadata) = methods.get_send_initial_metadata() {
///             metadata.insert("x-tag", "1");
///         }
///     }
///     methods.proceed();
/// });
/// # let _ = tagger;
/// ```
pub fn interceptor_fn<F>(f: F) -> Arc<dyn Interceptor>
where
    F: Fn(&mut InterceptorBatchMethods<'_>) + Send + Sync + 'static,
{
    Arc::new(f)
}
