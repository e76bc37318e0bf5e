use serde::Serialize;

/// Method, template and handler name of one registered route.
///
/// ```
/// use sendero::introspection::RouteInfo;
///
/// let info = RouteInfo::new("GET", "/users/{user_id}", "read_user");
/// assert_eq!(info.method, "GET");
/// assert_eq!(info.path, "/users/{user_id}");
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RouteInfo {
    pub method: String,
    /// The route template, parameters included (e.g. `/files/{file_path:path}`).
    pub path: String,
    pub handler_name: String,
}

impl RouteInfo {
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        handler_name: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            handler_name: handler_name.into(),
        }
    }
}
