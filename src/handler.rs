//! Handler trait and type erasure.
//!
//! # How controller actions are stored
//!
//! A host keeps the handlers of every controller side by side, one radix tree
//! per method. A collection holds one concrete type, so each route is erased
//! to a trait object (`dyn ErasedHandler`) and stored as a [`BoxedHandler`].
//!
//! The binder never hands the host a controller. It closes over the instance
//! and the action instead, which turns every route into the same shape of
//! plain function:
//!
//! ```text
//! controller.call(&action, req)                   ← user code behind a trait object
//!        ↓ binder closes over (Arc<dyn Controller>, Action)
//! move |req| controller.call(&action, req)        ← plain Fn(Request) -> BoxFuture
//!        ↓ Handler blanket impl
//! Arc::new(FnHandler(closure))                    ← BoxedHandler stored by the host
//!        ↓
//! handler.call(req)  at request time              ← one vtable dispatch
//! ```
//!
//! All routes of one controller share the instance through the `Arc`, so
//! state a controller builds in its factory is seen by every action.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Erased types ──────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Pin<Box<…>>` because the runtime polls the future in place and must not
/// move it after the first poll. `Send + 'static` let the host's runtime move
/// it across threads. Controllers return it directly from
/// [`Controller::call`](crate::Controller::call).
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// public `BoxedHandler` alias. External crates only ever call it.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared between the host and the binder.
///
/// `Arc` because a host may hand the same handler to many concurrent
/// requests once it starts serving.
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// Satisfied automatically by any `Fn(Request) -> impl Future<Output = impl IntoResponse>`.
/// The trait is sealed: only the blanket impl below can satisfy it, so every
/// handler the loader produces goes through the same erasure path.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Bridges a concrete handler `F` into the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        // Binder closures already return a BoxFuture; boxing again keeps a
        // single path for every handler shape.
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}
