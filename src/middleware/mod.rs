//! Middleware layer.
//!
//! Middleware is declared, not called, by the loader: descriptors found in
//! `__mid` files and on controllers are resolved to [`BoxedMiddleware`]
//! values and handed to the host in tier order (global, group, file). Running
//! the chain is the host's business; [`Next`] is the hand-off point.
//!
//! ```rust
//! use tsu_loader::middleware::{self, Next};
//! use tsu_loader::Request;
//!
//! let timing = middleware::from_fn(|req: Request, next: Next| async move {
//!     let res = next.run(req).await;
//!     res.with_header("x-served-by", "tsu")
//! });
//! # let _ = timing;
//! ```

mod descriptor;
mod resolve;

use std::future::Future;
use std::sync::Arc;

pub use descriptor::{FileMid, MidSource, MidTables, MiddlewareDescriptor, OneOrMany};
pub use resolve::Resolver;

use crate::handler::{BoxFuture, BoxedHandler};
use crate::request::Request;
use crate::response::IntoResponse;

/// A middleware instance. For class-style (`@name`) modules this is the
/// instantiated value itself, so `middleware` runs against its own state.
pub trait Middleware: Send + Sync + 'static {
    fn middleware(&self, req: Request, next: Next) -> BoxFuture;
}

/// A type-erased middleware as stored by the host.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// The remainder of the chain after the current middleware.
#[derive(Clone)]
pub struct Next(Arc<dyn Fn(Request) -> BoxFuture + Send + Sync>);

impl Next {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Request) -> BoxFuture + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Ends the chain at a route handler.
    pub fn handler(handler: BoxedHandler) -> Self {
        Self::new(move |req| handler.call(req))
    }

    pub fn run(&self, req: Request) -> BoxFuture {
        (self.0)(req)
    }
}

/// Adapts an async closure `Fn(Request, Next) -> impl Future` into a [`Middleware`].
pub fn from_fn<F, Fut, R>(f: F) -> FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    FromFn(f)
}

/// See [`from_fn`].
pub struct FromFn<F>(F);

impl<F, Fut, R> Middleware for FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn middleware(&self, req: Request, next: Next) -> BoxFuture {
        let fut = (self.0)(req, next);
        Box::pin(async move { fut.await.into_response() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Handler;
    use crate::method::Method;
    use crate::response::Response;

    #[tokio::test]
    async fn from_fn_wraps_the_rest_of_the_chain() {
        let handler = (|_req: Request| async { Response::text("inner") }).into_boxed_handler();
        let mw = from_fn(|req: Request, next: Next| async move {
            next.run(req).await.with_header("x-wrapped", "1")
        });

        let res = mw.middleware(Request::new(Method::Get, "/"), Next::handler(handler)).await;
        assert_eq!(res.body().as_ref(), b"inner");
        assert_eq!(res.header("x-wrapped"), Some("1"));
    }

    #[tokio::test]
    async fn middleware_can_short_circuit() {
        let handler = (|_req: Request| async { Response::text("unreachable") }).into_boxed_handler();
        let deny = from_fn(|_req: Request, _next: Next| async { 403u16 });

        let res = deny.middleware(Request::new(Method::Get, "/"), Next::handler(handler)).await;
        assert_eq!(res.status_code(), 403);
        assert!(res.body().is_empty());
    }
}
