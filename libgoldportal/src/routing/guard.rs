use crate::auth::session::Session;
use crate::routing::{Route, RouteClass};
use log::debug;

/// Redirects followed before giving up and sending the client to the login page.
const MAX_REDIRECTS: usize = 4;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct GuardPolicy {
    /// Whether protected routes also require the handshake to be complete.
    pub require_handshake: bool,
}

/// Outcome of guarding a single navigation attempt.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Enter,
    Redirect(Route),
}

/// Where a navigation ended up after following all redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub requested: Route,
    pub destination: Route,
    pub redirects: Vec<Route>,
}

impl Navigation {
    pub fn was_redirected(&self) -> bool {
        self.destination != self.requested
    }
}

pub struct RouteGuard {
    policy: GuardPolicy,
}

impl RouteGuard {
    pub fn new(policy: GuardPolicy) -> RouteGuard {
        RouteGuard { policy }
    }

    pub fn policy(&self) -> GuardPolicy {
        self.policy
    }

    /// Decides whether the route may be entered with the given session.
    ///
    /// Authentication is checked before the role.
    pub fn check(&self, route: Route, session: &Session) -> GuardDecision {
        match route.class() {
            RouteClass::Public => GuardDecision::Enter,
            RouteClass::Index => {
                if session.is_authenticated() {
                    GuardDecision::Redirect(Route::Welcome)
                } else {
                    GuardDecision::Enter
                }
            }
            RouteClass::Authenticated => {
                if self.is_signed_in(session) {
                    GuardDecision::Enter
                } else {
                    GuardDecision::Redirect(Route::Login)
                }
            }
            RouteClass::OwnerOnly => {
                if !self.is_signed_in(session) {
                    GuardDecision::Redirect(Route::Login)
                } else if !session.is_owner() {
                    GuardDecision::Redirect(Route::Welcome)
                } else {
                    GuardDecision::Enter
                }
            }
        }
    }

    /// Guards the route and every redirect target until one can be entered.
    pub fn navigate(&self, route: Route, session: &Session) -> Navigation {
        let mut redirects = Vec::new();
        let mut current = route;

        loop {
            match self.check(current, session) {
                GuardDecision::Enter => break,
                GuardDecision::Redirect(target) => {
                    debug!("Redirecting from {current} to {target}");
                    redirects.push(target);
                    current = target;

                    if redirects.len() >= MAX_REDIRECTS {
                        current = Route::Login;
                        break;
                    }
                }
            }
        }

        Navigation {
            requested: route,
            destination: current,
            redirects,
        }
    }

    fn is_signed_in(&self, session: &Session) -> bool {
        session.is_authenticated() && (!self.policy.require_handshake || session.handshake_complete())
    }
}
