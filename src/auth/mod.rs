//! Authentication state: the signed-in user, their token and role.
//!
//! The service starts out loading; `restore` checks a previously saved token
//! against the CMS before the session is trusted.

mod role;
mod session;

pub use role::Role;
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};

use crate::api::{AuthResponse, ContentClient, User};
use crate::error::{ApiError, AuthError, SessionError};
use crate::guard::AuthState;

/// The CMS endpoints the service talks to.
pub trait AuthBackend {
    fn login(&self, identifier: &str, password: &str) -> Result<AuthResponse, ApiError>;
    fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError>;
    fn current_user(&self, token: &str) -> Result<User, ApiError>;
}

impl AuthBackend for ContentClient {
    fn login(&self, identifier: &str, password: &str) -> Result<AuthResponse, ApiError> {
        ContentClient::login(self, identifier, password)
    }

    fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        ContentClient::register(self, username, email, password)
    }

    fn current_user(&self, token: &str) -> Result<User, ApiError> {
        ContentClient::current_user(self, token)
    }
}

pub struct AuthService<B, S> {
    backend: B,
    store: S,
    session: Option<Session>,
    loading: bool,
}

impl<B: AuthBackend, S: SessionStore> AuthService<B, S> {
    pub fn new(backend: B, store: S) -> Self {
        Self {
            backend,
            store,
            session: None,
            loading: true,
        }
    }

    /// Load the saved session and keep it only if the CMS still accepts its token.
    pub fn restore(&mut self) {
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(e) => {
                log::warn!("discarding unreadable session: {e}");
                self.discard();
                None
            }
        };

        if let Some(stored) = stored {
            match self.backend.current_user(&stored.jwt) {
                Ok(user) => {
                    log::info!("restored session for {}", user.username);
                    let session = Session {
                        jwt: stored.jwt,
                        user,
                    };
                    if let Err(e) = self.store.save(&session) {
                        log::warn!("failed to refresh saved session: {e}");
                    }
                    self.session = Some(session);
                }
                Err(e) => {
                    log::warn!("saved token rejected, signing out: {e}");
                    self.discard();
                }
            }
        }
        self.loading = false;
    }

    pub fn login(&mut self, identifier: &str, password: &str) -> Result<&User, AuthError> {
        let response = self
            .backend
            .login(identifier, password)
            .map_err(|e| AuthError::rejected(e, "Login failed"))?;
        // The login response omits the role.
        let user = self
            .backend
            .current_user(&response.jwt)
            .map_err(|e| AuthError::rejected(e, "Login failed"))?;
        self.start(Session {
            jwt: response.jwt,
            user,
        })
    }

    pub fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<&User, AuthError> {
        let response = self
            .backend
            .register(username, email, password)
            .map_err(|e| AuthError::rejected(e, "Registration failed"))?;
        self.start(Session {
            jwt: response.jwt,
            user: response.user,
        })
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        if let Some(session) = self.session.take() {
            log::info!("signed out {}", session.user.username);
        }
        self.store.clear()
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|session| &session.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.jwt.as_str())
    }

    pub fn role(&self) -> Role {
        self.user().map_or(Role::Unrecognized, Role::of)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| !session.jwt.is_empty())
    }

    pub fn is_admin(&self) -> bool {
        self.role().is_admin()
    }

    pub fn state(&self) -> AuthState {
        AuthState {
            loading: self.loading,
            authenticated: self.is_authenticated(),
            admin: self.is_admin(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn start(&mut self, session: Session) -> Result<&User, AuthError> {
        self.store.save(&session)?;
        log::info!("signed in as {}", session.user.username);
        self.loading = false;
        Ok(&self.session.insert(session).user)
    }

    fn discard(&mut self) {
        self.session = None;
        if let Err(e) = self.store.clear() {
            log::warn!("failed to clear saved session: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RoleRecord;
    use crate::guard::{self, Access, RouteRequirement};

    const PASSWORD: &str = "hunter22";
    const ISSUED: &str = "issued-token";
    const STORED: &str = "stored-token";

    struct FakeCms {
        role: Option<RoleRecord>,
        accept_stored: bool,
    }

    impl FakeCms {
        fn with_role(kind: &str) -> Self {
            Self {
                role: Some(RoleRecord {
                    id: 1,
                    name: kind.to_string(),
                    kind: kind.to_string(),
                }),
                accept_stored: true,
            }
        }
    }

    fn user(role: Option<RoleRecord>) -> User {
        User {
            id: 3,
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            role,
        }
    }

    impl AuthBackend for FakeCms {
        fn login(&self, _identifier: &str, password: &str) -> Result<AuthResponse, ApiError> {
            if password != PASSWORD {
                return Err(ApiError::Status {
                    status: 400,
                    message: Some("Invalid identifier or password".to_string()),
                });
            }
            Ok(AuthResponse {
                jwt: ISSUED.to_string(),
                user: user(None),
            })
        }

        fn register(
            &self,
            username: &str,
            email: &str,
            _password: &str,
        ) -> Result<AuthResponse, ApiError> {
            if username == "taken" {
                return Err(ApiError::Status {
                    status: 500,
                    message: None,
                });
            }
            Ok(AuthResponse {
                jwt: ISSUED.to_string(),
                user: User {
                    id: 9,
                    username: username.to_string(),
                    email: email.to_string(),
                    role: None,
                },
            })
        }

        fn current_user(&self, token: &str) -> Result<User, ApiError> {
            match token {
                ISSUED => Ok(user(self.role.clone())),
                STORED if self.accept_stored => Ok(user(self.role.clone())),
                _ => Err(ApiError::Status {
                    status: 401,
                    message: None,
                }),
            }
        }
    }

    fn stored_session() -> Session {
        Session {
            jwt: STORED.to_string(),
            user: user(None),
        }
    }

    #[test]
    fn starts_loading_and_unauthenticated() {
        let auth = AuthService::new(FakeCms::with_role("authenticated"), MemorySessionStore::new());
        assert!(auth.is_loading());
        assert!(!auth.is_authenticated());
        assert_eq!(
            guard::check(RouteRequirement::default(), auth.state(), "/ideas"),
            Access::Pending
        );
    }

    #[test]
    fn restore_without_saved_session() {
        let mut auth =
            AuthService::new(FakeCms::with_role("authenticated"), MemorySessionStore::new());
        auth.restore();
        assert!(!auth.is_loading());
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn restore_refreshes_user_with_role() {
        let store = MemorySessionStore::with_session(stored_session());
        let mut auth = AuthService::new(FakeCms::with_role("admin"), store);
        auth.restore();

        assert!(auth.is_authenticated());
        assert!(auth.is_admin());
        assert_eq!(auth.token(), Some(STORED));
        let saved = auth.store.load().unwrap().unwrap();
        assert!(saved.user.role.is_some());
    }

    #[test]
    fn restore_clears_rejected_token() {
        let store = MemorySessionStore::with_session(stored_session());
        let mut cms = FakeCms::with_role("admin");
        cms.accept_stored = false;
        let mut auth = AuthService::new(cms, store);
        auth.restore();

        assert!(!auth.is_loading());
        assert!(!auth.is_authenticated());
        assert_eq!(auth.store.load().unwrap(), None);
    }

    #[test]
    fn login_fetches_role_and_saves() {
        let mut auth = AuthService::new(FakeCms::with_role("authenticated"), MemorySessionStore::new());
        let user = auth.login("ana", PASSWORD).unwrap();
        assert_eq!(user.username, "ana");

        assert_eq!(auth.role(), Role::Authenticated);
        assert!(!auth.is_admin());
        assert_eq!(auth.store.load().unwrap().map(|s| s.jwt), Some(ISSUED.to_string()));
        assert_eq!(
            guard::check(RouteRequirement::admin(), auth.state(), "/admin"),
            Access::RedirectHome {
                error: guard::ADMIN_REQUIRED.to_string()
            }
        );
    }

    #[test]
    fn login_failure_carries_cms_message() {
        let mut auth = AuthService::new(FakeCms::with_role("admin"), MemorySessionStore::new());
        let err = auth.login("ana", "wrong").unwrap_err();
        assert_eq!(err.to_string(), "Invalid identifier or password");
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn registration_failure_uses_default_message() {
        let mut auth = AuthService::new(FakeCms::with_role("admin"), MemorySessionStore::new());
        let err = auth.register("taken", "t@example.com", PASSWORD).unwrap_err();
        assert_eq!(err.to_string(), "Registration failed");
    }

    #[test]
    fn register_signs_in_without_role() {
        let mut auth = AuthService::new(FakeCms::with_role("admin"), MemorySessionStore::new());
        auth.register("bo", "bo@example.com", PASSWORD).unwrap();

        assert!(auth.is_authenticated());
        assert_eq!(auth.role(), Role::Unrecognized);
        assert!(!auth.is_admin());
    }

    #[test]
    fn logout_clears_store() {
        let mut auth = AuthService::new(FakeCms::with_role("admin"), MemorySessionStore::new());
        auth.login("ana", PASSWORD).unwrap();
        auth.logout().unwrap();

        assert!(!auth.is_authenticated());
        assert_eq!(auth.user(), None);
        assert_eq!(auth.store.load().unwrap(), None);
    }
}
