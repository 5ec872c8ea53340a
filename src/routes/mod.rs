//! Route table for the client and the navigation decision that applies the
//! auth gates to it.

pub mod paths;

use crate::auth::guards::{self, AuthSnapshot, Gate, GuardDecision};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    Register,
    Verify,
    Dashboard,
    Profile,
    Doctors,
    Doctor(String),
    Laboratories,
    Laboratory(String),
    Medicines,
    Medicine(String),
    Orders,
    Order(String),
    Appointments,
    Cart,
}

impl Route {
    /// Gate wrapping the route. `/verify` is reachable with or without
    /// credentials since a pending registration has neither a full session
    /// nor an anonymous state.
    #[must_use]
    pub fn gate(&self) -> Option<Gate> {
        match self {
            Route::Landing | Route::Login | Route::Register => Some(Gate::PublicOnly),
            Route::Verify => None,
            _ => Some(Gate::Protected),
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Route::Landing => paths::LANDING.to_string(),
            Route::Login => paths::LOGIN.to_string(),
            Route::Register => paths::REGISTER.to_string(),
            Route::Verify => paths::VERIFY.to_string(),
            Route::Dashboard => paths::DASHBOARD.to_string(),
            Route::Profile => paths::PROFILE.to_string(),
            Route::Doctors => paths::DOCTORS.to_string(),
            Route::Doctor(id) => format!("{}/{id}", paths::DOCTORS),
            Route::Laboratories => paths::LABORATORIES.to_string(),
            Route::Laboratory(id) => format!("{}/{id}", paths::LABORATORIES),
            Route::Medicines => paths::MEDICINES.to_string(),
            Route::Medicine(id) => format!("{}/{id}", paths::MEDICINES),
            Route::Orders => paths::ORDERS.to_string(),
            Route::Order(id) => format!("{}/{id}", paths::ORDERS),
            Route::Appointments => paths::APPOINTMENTS.to_string(),
            Route::Cart => paths::CART.to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Matches a location against the route table. Query strings, fragments and
/// trailing slashes are ignored.
#[must_use]
pub fn match_path(location: &str) -> Option<Route> {
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let route = match segments.as_slice() {
        [] => Route::Landing,
        ["login"] => Route::Login,
        ["register"] => Route::Register,
        ["verify"] => Route::Verify,
        ["dashboard"] => Route::Dashboard,
        ["profile"] => Route::Profile,
        ["doctors"] => Route::Doctors,
        ["doctors", id] => Route::Doctor((*id).to_string()),
        ["laboratories"] => Route::Laboratories,
        ["laboratories", id] => Route::Laboratory((*id).to_string()),
        ["medicines"] => Route::Medicines,
        ["medicines", id] => Route::Medicine((*id).to_string()),
        ["orders"] => Route::Orders,
        ["orders", id] => Route::Order((*id).to_string()),
        ["appointments"] => Route::Appointments,
        ["cart"] => Route::Cart,
        _ => return None,
    };
    Some(route)
}

/// What the rendering layer should do for a navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect { to: String, from: Option<String> },
}

/// Resolves a navigation to `location`. Unknown paths go to the landing page.
#[must_use]
pub fn navigate(location: &str, snapshot: &AuthSnapshot) -> Navigation {
    let Some(route) = match_path(location) else {
        return Navigation::Redirect {
            to: paths::LANDING.to_string(),
            from: None,
        };
    };

    let Some(gate) = route.gate() else {
        return Navigation::Render(route);
    };

    match guards::decide(gate, snapshot, &requested_location(&route, location)) {
        GuardDecision::Allow => Navigation::Render(route),
        GuardDecision::Redirect { to, from } => Navigation::Redirect { to, from },
    }
}

/// The canonical route path followed by the query and fragment the caller
/// asked for, so a redirect-back lands on the same view.
fn requested_location(route: &Route, location: &str) -> String {
    let suffix = location.find(['?', '#']).map_or("", |at| &location[at..]);
    format!("{}{suffix}", route.path())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANONYMOUS: AuthSnapshot = AuthSnapshot {
        has_token: false,
        has_user: false,
    };
    const SIGNED_IN: AuthSnapshot = AuthSnapshot {
        has_token: true,
        has_user: true,
    };

    #[test]
    fn matches_static_and_detail_routes() {
        assert_eq!(match_path("/"), Some(Route::Landing));
        assert_eq!(match_path(""), Some(Route::Landing));
        assert_eq!(match_path("/dashboard/"), Some(Route::Dashboard));
        assert_eq!(match_path("/login?next=/cart"), Some(Route::Login));
        assert_eq!(match_path("/orders/42#top"), Some(Route::Order("42".to_string())));
        assert_eq!(
            match_path("/doctors/abc"),
            Some(Route::Doctor("abc".to_string()))
        );
        assert_eq!(match_path("/doctors/abc/reviews"), None);
        assert_eq!(match_path("/nope"), None);
    }

    #[test]
    fn route_paths_round_trip() {
        for route in [
            Route::Verify,
            Route::Appointments,
            Route::Medicine("m-1".to_string()),
            Route::Laboratory("7".to_string()),
        ] {
            assert_eq!(match_path(&route.path()), Some(route));
        }
    }

    #[test]
    fn unknown_path_redirects_to_landing() {
        assert_eq!(
            navigate("/unknown/place", &SIGNED_IN),
            Navigation::Redirect {
                to: "/".to_string(),
                from: None
            }
        );
    }

    #[test]
    fn protected_route_requires_credentials() {
        assert_eq!(
            navigate("/orders/9", &ANONYMOUS),
            Navigation::Redirect {
                to: "/".to_string(),
                from: Some("/orders/9".to_string()),
            }
        );
        assert_eq!(
            navigate("/orders/9", &SIGNED_IN),
            Navigation::Render(Route::Order("9".to_string()))
        );
    }

    #[test]
    fn protected_redirect_keeps_query_and_fragment() {
        assert_eq!(
            navigate("/medicines?search=para#top", &ANONYMOUS),
            Navigation::Redirect {
                to: "/".to_string(),
                from: Some("/medicines?search=para#top".to_string()),
            }
        );
        assert_eq!(
            navigate("/orders/9/#items", &ANONYMOUS),
            Navigation::Redirect {
                to: "/".to_string(),
                from: Some("/orders/9#items".to_string()),
            }
        );
    }

    #[test]
    fn login_redirects_signed_in_user_to_dashboard() {
        assert_eq!(
            navigate("/login", &SIGNED_IN),
            Navigation::Redirect {
                to: "/dashboard".to_string(),
                from: None
            }
        );
        assert_eq!(navigate("/login", &ANONYMOUS), Navigation::Render(Route::Login));
    }

    #[test]
    fn verify_is_reachable_either_way() {
        assert_eq!(navigate("/verify", &ANONYMOUS), Navigation::Render(Route::Verify));
        assert_eq!(navigate("/verify", &SIGNED_IN), Navigation::Render(Route::Verify));
    }
}
