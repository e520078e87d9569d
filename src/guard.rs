/// Message shown when a non-admin reaches an admin-only command.
pub const ADMIN_REQUIRED: &str = "Access denied. Admin privileges required.";

/// What a route demands of the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRequirement {
    pub require_auth: bool,
    pub require_admin: bool,
}

impl Default for RouteRequirement {
    fn default() -> Self {
        Self {
            require_auth: true,
            require_admin: false,
        }
    }
}

impl RouteRequirement {
    pub fn public() -> Self {
        Self {
            require_auth: false,
            require_admin: false,
        }
    }

    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn admin() -> Self {
        Self {
            require_auth: true,
            require_admin: true,
        }
    }
}

/// Snapshot of the authentication service the guard decides on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthState {
    pub loading: bool,
    pub authenticated: bool,
    pub admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// The session is still being restored; show a loading state.
    Pending,
    Allow,
    /// Send the user to the login page, remembering where they came from.
    RedirectToLogin { from: String },
    /// Send the user home with an error.
    RedirectHome { error: String },
}

/// Decide whether `location` may be shown for `state`.
pub fn check(requirement: RouteRequirement, state: AuthState, location: &str) -> Access {
    if state.loading {
        return Access::Pending;
    }
    if requirement.require_auth && !state.authenticated {
        return Access::RedirectToLogin {
            from: location.to_string(),
        };
    }
    if requirement.require_admin && !state.admin {
        return Access::RedirectHome {
            error: ADMIN_REQUIRED.to_string(),
        };
    }
    Access::Allow
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const GUEST: AuthState = AuthState {
        loading: false,
        authenticated: false,
        admin: false,
    };
    const MEMBER: AuthState = AuthState {
        loading: false,
        authenticated: true,
        admin: false,
    };
    const ADMIN: AuthState = AuthState {
        loading: false,
        authenticated: true,
        admin: true,
    };

    #[test]
    fn default_requires_auth_only() {
        assert_eq!(RouteRequirement::default(), RouteRequirement::authenticated());
        assert!(!RouteRequirement::default().require_admin);
    }

    #[rstest]
    #[case(RouteRequirement::public())]
    #[case(RouteRequirement::authenticated())]
    #[case(RouteRequirement::admin())]
    fn loading_wins(#[case] requirement: RouteRequirement) {
        let state = AuthState {
            loading: true,
            ..ADMIN
        };
        assert_eq!(check(requirement, state, "/admin"), Access::Pending);
    }

    #[test]
    fn guest_is_sent_to_login() {
        assert_eq!(
            check(RouteRequirement::admin(), GUEST, "/admin"),
            Access::RedirectToLogin {
                from: "/admin".to_string()
            }
        );
        assert_eq!(
            check(RouteRequirement::authenticated(), GUEST, "/bookmarks"),
            Access::RedirectToLogin {
                from: "/bookmarks".to_string()
            }
        );
    }

    #[test]
    fn member_is_refused_admin_routes() {
        assert_eq!(
            check(RouteRequirement::admin(), MEMBER, "/admin"),
            Access::RedirectHome {
                error: ADMIN_REQUIRED.to_string()
            }
        );
        assert_eq!(
            check(RouteRequirement::authenticated(), MEMBER, "/bookmarks"),
            Access::Allow
        );
    }

    #[test]
    fn admin_is_allowed_everywhere() {
        for requirement in [
            RouteRequirement::public(),
            RouteRequirement::authenticated(),
            RouteRequirement::admin(),
        ] {
            assert_eq!(check(requirement, ADMIN, "/admin"), Access::Allow);
        }
    }

    #[test]
    fn public_route_allows_guests() {
        assert_eq!(check(RouteRequirement::public(), GUEST, "/"), Access::Allow);
    }
}
