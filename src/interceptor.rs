//! Opaque request/response hooks carried on the settings object.
//!
//! The configuration core never invokes these; the HTTP transport runs them
//! around each outgoing request. What the core guarantees is that a chain
//! attached to a settings object survives cloning with its count and order
//! intact.

use std::fmt;
use std::sync::Arc;

use crate::wire::WireParameterSet;

/// Hook run by the transport before a request is dispatched. May adjust the
/// outgoing wire parameters (e.g. stamp a trace id).
pub trait RequestInterceptor: Send + Sync {
    fn before_request(&self, params: &mut WireParameterSet);
}

/// Hook run by the transport after a response status line is read.
pub trait ResponseInterceptor: Send + Sync {
    fn after_response(&self, status: u16);
}

/// Ordered chain of shared hooks. Cloning shares the hooks themselves.
pub struct InterceptorChain<T: ?Sized> {
    hooks: Vec<Arc<T>>,
}

pub type RequestInterceptors = InterceptorChain<dyn RequestInterceptor>;
pub type ResponseInterceptors = InterceptorChain<dyn ResponseInterceptor>;

impl<T: ?Sized> InterceptorChain<T> {
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Append a hook at the end of the chain.
    pub fn push(&mut self, hook: Arc<T>) {
        self.hooks.push(hook);
    }

    /// Replace the whole chain, preserving the order of `hooks`.
    pub fn replace(&mut self, hooks: Vec<Arc<T>>) {
        self.hooks = hooks;
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> {
        self.hooks.iter()
    }

    pub fn as_slice(&self) -> &[Arc<T>] {
        &self.hooks
    }
}

impl<T: ?Sized> Default for InterceptorChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for InterceptorChain<T> {
    fn clone(&self) -> Self {
        Self {
            hooks: self.hooks.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for InterceptorChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("len", &self.hooks.len())
            .finish()
    }
}

/// Hooks have no useful value equality; two chains are equal when they hold
/// the same hooks in the same order.
impl<T: ?Sized> PartialEq for InterceptorChain<T> {
    fn eq(&self, other: &Self) -> bool {
        self.hooks.len() == other.hooks.len()
            && self
                .hooks
                .iter()
                .zip(&other.hooks)
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}
