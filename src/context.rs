//! Request-scoped context store
//!
//! A [`RequestContext`] is created for every inbound request by
//! [`request_context_middleware`] and travels with that request only. Handlers
//! and services receive it explicitly (as an extractor or a parameter), so a
//! value written while serving one request can never be read while serving
//! another.

use crate::error::AppError;
use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use std::{
    any::Any,
    collections::HashMap,
    fmt,
    marker::PhantomData,
    sync::{Arc, PoisonError, RwLock},
};
use uuid::Uuid;

/// Typed key into a [`RequestContext`].
///
/// The type parameter fixes what can be stored under the key, so a read
/// always yields the type that was written.
pub struct ContextKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ContextKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for ContextKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ContextKey<T> {}

impl<T> fmt::Debug for ContextKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContextKey").field(&self.name).finish()
    }
}

type Slot = Arc<dyn Any + Send + Sync>;

/// Key/value store owned by a single request.
///
/// Cloning is cheap and yields a handle to the same store, which is how the
/// auth middleware and the handler of one request share it.
#[derive(Clone)]
pub struct RequestContext {
    id: Uuid,
    values: Arc<RwLock<HashMap<&'static str, Slot>>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            values: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Identifier of the request this context belongs to.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set<T>(&self, key: &ContextKey<T>, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.name, Arc::new(value));
    }

    pub fn get<T>(&self, key: &ContextKey<T>) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key.name)
            .and_then(|slot| slot.downcast_ref::<T>())
            .cloned()
    }

    /// Remove the value under `key`. A value stored with a different type is
    /// left in place.
    pub fn remove<T>(&self, key: &ContextKey<T>) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        let value = values.get(key.name)?.downcast_ref::<T>()?.clone();
        values.remove(key.name);
        Some(value)
    }

    pub fn contains<T>(&self, key: &ContextKey<T>) -> bool {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key.name)
    }

    pub fn len(&self) -> usize {
        self.values.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&'static str> = self
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        f.debug_struct("RequestContext")
            .field("id", &self.id)
            .field("keys", &keys)
            .finish()
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| AppError::internal("request context layer is not installed"))
    }
}

/// Attach a fresh [`RequestContext`] to the request.
///
/// The context is dropped together with the request once the response has
/// been produced.
pub async fn request_context_middleware(mut req: Request, next: Next) -> Response {
    let ctx = RequestContext::new();
    tracing::trace!(context_id = %ctx.id(), "Request context created");
    req.extensions_mut().insert(ctx);

    next.run(req).await
}
