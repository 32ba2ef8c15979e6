//! Navigation targets

use std::fmt;
use std::str::FromStr;

/// One of the three top-level views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Route {
    #[default]
    Dashboard,
    Todos,
    Users,
}

impl Route {
    /// Routes in navigation-bar order
    pub const ALL: [Route; 3] = [Route::Dashboard, Route::Todos, Route::Users];

    /// Resolve a path; unknown paths have no route
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim();
        let normalized = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };
        match normalized {
            "/" | "" => Some(Route::Dashboard),
            "/todos" => Some(Route::Todos),
            "/users" => Some(Route::Users),
            _ => None,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Dashboard => "/",
            Route::Todos => "/todos",
            Route::Users => "/users",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Dashboard => "Dashboard",
            Route::Todos => "Todos",
            Route::Users => "Users",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Route::Dashboard => 0,
            Route::Todos => 1,
            Route::Users => 2,
        }
    }

    /// Next route, wrapping around
    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous route, wrapping around
    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::from_path(s).ok_or_else(|| {
            format!("Unknown route '{}'. Valid routes: /, /todos, /users", s)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(Route::from_path("/"), Some(Route::Dashboard));
        assert_eq!(Route::from_path("/todos"), Some(Route::Todos));
        assert_eq!(Route::from_path("/users/"), Some(Route::Users));
        assert_eq!(Route::from_path("/settings"), None);
        assert_eq!(Route::from_path("/todos/1"), None);
    }

    #[test]
    fn test_path_round_trips() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
    }

    #[test]
    fn test_cycling() {
        assert_eq!(Route::Dashboard.next(), Route::Todos);
        assert_eq!(Route::Users.next(), Route::Dashboard);
        assert_eq!(Route::Dashboard.prev(), Route::Users);
    }

    #[test]
    fn test_from_str_error() {
        let err = "/nope".parse::<Route>().unwrap_err();
        assert!(err.contains("/todos"));
        assert_eq!("/users".parse::<Route>(), Ok(Route::Users));
    }
}
