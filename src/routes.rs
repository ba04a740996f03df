//! Navigation table shared with the UI: path patterns, breadcrumbs, and which
//! pages need a signed-in user.

use crate::auth::IdentityState;
use serde::Serialize;
use std::collections::BTreeMap;

pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub name: &'static str,
    pub path: &'static str,
    pub breadcrumb: &'static [&'static str],
    pub requires_auth: bool,
}

pub static ROUTES: &[Route] = &[
    Route {
        name: "home",
        path: "/",
        breadcrumb: &["Accueil"],
        requires_auth: false,
    },
    Route {
        name: "sessions",
        path: "/sessions",
        breadcrumb: &["Accueil", "Sessions"],
        requires_auth: true,
    },
    Route {
        name: "about",
        path: "/about",
        breadcrumb: &["Accueil", "À propos"],
        requires_auth: false,
    },
    Route {
        name: "sessionDetail",
        path: "/sessions/:id",
        breadcrumb: &["Accueil", "Sessions", "Détail de session"],
        requires_auth: true,
    },
    Route {
        name: "ueEvents",
        path: "/sessions/:sessionId/:ueId",
        breadcrumb: &["Accueil", "Sessions", "Détail de session", "Détail de l'UE"],
        requires_auth: true,
    },
    Route {
        name: "eventRoomView",
        path: "/sessions/:sessionId/:ueId/:eventId",
        breadcrumb: &[
            "Accueil",
            "Sessions",
            "Détail de session",
            "Détail de l'UE",
            "Épreuve",
        ],
        requires_auth: true,
    },
    Route {
        name: "presenceView",
        path: "/sessions/:sessionId/:ueId/:eventId/:roomId",
        breadcrumb: &[
            "Accueil",
            "Sessions",
            "Détail de session",
            "Détail de l'UE",
            "Épreuve",
            "Local",
        ],
        requires_auth: true,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    pub route: &'static Route,
    pub params: BTreeMap<String, String>,
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn match_route(route: &'static Route, path: &str) -> Option<RouteMatch> {
    let mut params = BTreeMap::new();
    let mut actual = segments(path);
    for pattern in segments(route.path) {
        let segment = actual.next()?;
        match pattern.strip_prefix(':') {
            Some(name) => {
                let value = urlencoding::decode(segment).ok()?.into_owned();
                params.insert(name.to_string(), value);
            }
            None if pattern == segment => {}
            None => return None,
        }
    }
    if actual.next().is_some() {
        return None;
    }
    Some(RouteMatch { route, params })
}

/// Finds the route for a concrete path; query string and fragment are ignored.
pub fn resolve(path: &str) -> Option<RouteMatch> {
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    ROUTES.iter().find_map(|route| match_route(route, path))
}

pub fn guard(route: &Route, identity: &IdentityState) -> bool {
    !route.requires_auth || identity.is_signed_in(chrono::Utc::now().timestamp())
}
