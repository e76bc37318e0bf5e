use std::future::Future;
use std::sync::Arc;

use http::{Method, Request};
use hyper::body::Incoming;

use crate::extract::PathParams;
use crate::handler::{BoxFuture, Handler};
use crate::introspection::RouteInfo;
use crate::response::IntoResponse;
use crate::state::AppState;

mod template;

pub use template::{RouteTemplate, TemplateError};

pub type HandlerFn =
    Arc<dyn Fn(Request<Incoming>, PathParams, Arc<AppState>) -> BoxFuture + Send + Sync>;

struct Route {
    method: Method,
    template: RouteTemplate,
    handler_name: &'static str,
    handler: HandlerFn,
}

/// Outcome of looking a request up in the [`Router`].
pub enum Resolved<'a> {
    Found {
        handler: &'a HandlerFn,
        params: PathParams,
    },
    /// Some template matched the path, none of them for this method.
    MethodNotAllowed(Vec<Method>),
    /// Nothing matched, but the path with its trailing slash toggled would.
    Redirect(String),
    NotFound,
}

/// An ordered route table.
///
/// Routes are tried in registration order and the first one whose template
/// and method both match wins. A literal route meant to take precedence over
/// a parametrized one (`/users/me` over `/users/{user_id}`) must therefore be
/// registered first.
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registers a closure handler.
    ///
    /// # Panics
    ///
    /// Panics when `path` is not a valid [`RouteTemplate`].
    pub fn route<F, Fut, Out>(self, method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Incoming>, PathParams, Arc<AppState>) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Out> + Send + 'static,
        Out: IntoResponse + 'static,
    {
        let handler: HandlerFn = Arc::new(move |req, params, state| {
            let handler = handler.clone();
            Box::pin(async move {
                let output = handler(req, params, state).await;
                output.into_response()
            }) as BoxFuture
        });

        self.push(method, path, "handler", handler)
    }

    pub fn get<F, Fut, Out>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Incoming>, PathParams, Arc<AppState>) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Out> + Send + 'static,
        Out: IntoResponse + 'static,
    {
        self.route(Method::GET, path, handler)
    }

    /// Registers a handler generated by one of the route attribute macros,
    /// using the method, path and name it was declared with.
    ///
    /// # Panics
    ///
    /// Panics when the handler's path is not a valid [`RouteTemplate`].
    pub fn handler<H: Handler>(self, handler: H) -> Self {
        let handler = Arc::new(handler);
        let call: HandlerFn = Arc::new(move |req, params, state| handler.call(req, params, state));
        self.push(H::METHOD, H::PATH, H::NAME, call)
    }

    /// Appends every route of `other` after the routes already registered.
    pub fn merge(mut self, other: Router) -> Self {
        self.routes.extend(other.routes);
        self
    }

    fn push(
        mut self,
        method: Method,
        path: &str,
        handler_name: &'static str,
        handler: HandlerFn,
    ) -> Self {
        let template = match RouteTemplate::parse(path) {
            Ok(template) => template,
            Err(e) => panic!("cannot register `{}` {}: {}", method, path, e),
        };

        tracing::trace!(%method, path, handler = handler_name, "route registered");

        self.routes.push(Route {
            method,
            template,
            handler_name,
            handler,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Route metadata, in registration order.
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.routes
            .iter()
            .map(|r| RouteInfo::new(r.method.as_str(), r.template.as_str(), r.handler_name))
            .collect()
    }

    /// Looks up the handler for an already percent-decoded `path`.
    pub fn resolve(&self, method: &Method, path: &str) -> Resolved<'_> {
        let mut allowed: Vec<Method> = Vec::new();

        for route in &self.routes {
            let Some(params) = route.template.matches(path) else {
                continue;
            };
            if route.method == *method {
                return Resolved::Found {
                    handler: &route.handler,
                    params: PathParams::from(params),
                };
            }
            if !allowed.contains(&route.method) {
                allowed.push(route.method.clone());
            }
        }

        if !allowed.is_empty() {
            return Resolved::MethodNotAllowed(allowed);
        }

        if let Some(alternate) = toggle_trailing_slash(path) {
            if self
                .routes
                .iter()
                .any(|r| r.template.matches(&alternate).is_some())
            {
                return Resolved::Redirect(alternate);
            }
        }

        Resolved::NotFound
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn toggle_trailing_slash(path: &str) -> Option<String> {
    if path == "/" {
        return None;
    }
    match path.strip_suffix('/') {
        Some(trimmed) => Some(trimmed.to_string()),
        None => Some(format!("{}/", path)),
    }
}
