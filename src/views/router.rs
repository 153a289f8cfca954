use std::fmt;
use std::sync::Arc;
use tracing::debug;
use crate::storage::SessionStore;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/adminlogin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Vendors,
    Orders,
    CreditStatus,
}

const ROUTES: &[(&str, Route)] = &[
    (HOME_PATH, Route::Login),
    (LOGIN_PATH, Route::Login),
    ("/admin", Route::Dashboard),
    ("/admin/vendors", Route::Vendors),
    ("/admin/orders", Route::Orders),
    ("/admin/status", Route::CreditStatus),
];

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => HOME_PATH,
            Route::Dashboard => "/admin",
            Route::Vendors => "/admin/vendors",
            Route::Orders => "/admin/orders",
            Route::CreditStatus => "/admin/status",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Login => "Admin Login",
            Route::Dashboard => "Admin Dashboard",
            Route::Vendors => "Admin Vendor Dashboard",
            Route::Orders => "Orders",
            Route::CreditStatus => "Credit Status",
        }
    }

    pub fn is_protected(self) -> bool {
        !matches!(self, Route::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of routing or guarding: show the child, or go somewhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation<V> {
    Render(V),
    Redirect(&'static str),
}

/// Renders `child` when `is_authenticated` holds, otherwise redirects to the
/// login path.
pub fn guard<V>(child: V, is_authenticated: impl FnOnce() -> bool) -> Navigation<V> {
    if is_authenticated() {
        Navigation::Render(child)
    } else {
        Navigation::Redirect(LOGIN_PATH)
    }
}

/// Drops the query, fragment and any trailing slash.
pub fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { HOME_PATH } else { trimmed }
}

pub struct Router {
    session: Arc<dyn SessionStore>,
}

impl Router {
    pub fn new(session: Arc<dyn SessionStore>) -> Self {
        Self { session }
    }

    /// One routing step. Unknown paths redirect home; protected routes go
    /// through [`guard`].
    pub fn resolve(&self, path: &str) -> Navigation<Route> {
        let path = normalize(path);
        let Some(route) = ROUTES.iter().find(|(p, _)| *p == path).map(|(_, r)| *r) else {
            debug!(path, "Unknown path, redirecting home");
            return Navigation::Redirect(HOME_PATH);
        };

        if route.is_protected() {
            guard(route, || self.session.is_authenticated())
        } else {
            Navigation::Render(route)
        }
    }

    /// Follows redirects until a route renders.
    pub fn navigate(&self, path: &str) -> Route {
        let mut path = path;
        for _ in 0..ROUTES.len() {
            match self.resolve(path) {
                Navigation::Render(route) => {
                    debug!(route = %route, "Navigated");
                    return route;
                }
                Navigation::Redirect(next) => {
                    debug!(from = path, to = next, "Redirect");
                    path = next;
                }
            }
        }
        Route::Login
    }
}
