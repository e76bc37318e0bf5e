use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::{Method, Request, Response};
use hyper::body::Incoming;

use crate::extract::PathParams;
use crate::response::BoxBody;
use crate::state::AppState;

pub type BoxFuture = Pin<Box<dyn Future<Output = Response<BoxBody>> + Send>>;

/// A named route handler.
///
/// Implemented by the `#[get]`, `#[post]`, `#[put]` and `#[delete]`
/// attribute macros, which turn an `async fn` into a unit struct of the
/// same name. Each argument of the function is built with
/// [`FromRequestParts`](crate::extract::FromRequestParts); the first
/// extraction failure becomes the response.
pub trait Handler: Send + Sync + 'static {
    const NAME: &'static str;
    const METHOD: Method;
    const PATH: &'static str;

    fn call(&self, req: Request<Incoming>, params: PathParams, state: Arc<AppState>)
    -> BoxFuture;
}
