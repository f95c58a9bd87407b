use super::{ActionError, Controller};
use crate::{AuthTab, Banner, Credentials, Page, User, CONNECTIVITY_MESSAGE};
use tracing::{debug, info, warn};

impl Controller {
    /// Startup: an existing session lands on the dashboard, anything else on the auth screen.
    pub async fn start(&self) {
        match self.api.current_user().await {
            Ok(user) => {
                info!(user_id = user.user_id, "session restored");
                self.enter_app(user, None).await;
            }
            Err(err) => {
                debug!(error = %err, "no active session");
                self.update(|s| {
                    s.reset();
                    if err.is_transport() {
                        s.banner = Some(Banner::error(CONNECTIVITY_MESSAGE));
                    }
                });
            }
        }
    }

    pub fn show_auth_tab(&self, tab: AuthTab) {
        self.update(|s| {
            s.auth_tab = tab;
            s.banner = None;
        });
    }

    pub async fn login(&self) {
        let creds = self.with_state(|s| s.forms.login.clone());
        if let Err(err) = self.try_login(creds).await {
            self.fail(err, "Login failed");
        }
    }

    async fn try_login(&self, creds: Credentials) -> Result<(), ActionError> {
        let email = creds.email.trim();
        if email.is_empty() || creds.password.is_empty() {
            return Err(ActionError::Validation("Please fill in all fields"));
        }
        let user = self.api.login(email, &creds.password).await?;
        info!(user_id = user.user_id, "logged in");

        // The login response already identifies the user; a failed confirmation is not fatal.
        let user = match self.api.current_user().await {
            Ok(confirmed) => confirmed,
            Err(err) => {
                warn!(error = %err, "session confirmation after login failed");
                user
            }
        };
        self.enter_app(user, Some(Banner::success("Login successful!"))).await;
        Ok(())
    }

    pub async fn register(&self) {
        let creds = self.with_state(|s| s.forms.register.clone());
        match self.try_register(&creds).await {
            Ok(()) => self.update(|s| {
                s.auth_tab = AuthTab::Login;
                s.forms.login.email = creds.email.trim().to_string();
                s.forms.register = Credentials::default();
                s.banner = Some(Banner::success("Registration successful! Please login."));
            }),
            Err(err) => self.fail(err, "Registration failed"),
        }
    }

    async fn try_register(&self, creds: &Credentials) -> Result<(), ActionError> {
        let email = creds.email.trim();
        if email.is_empty() || creds.password.is_empty() {
            return Err(ActionError::Validation("Please fill in all fields"));
        }
        self.api.register(email, &creds.password).await?;
        info!(email, "registered");
        Ok(())
    }

    /// Always ends on the auth screen, whatever the server says.
    pub async fn logout(&self) {
        if let Err(err) = self.api.logout().await {
            warn!(error = %err, "server logout failed; clearing local session anyway");
        }
        self.update(|s| s.reset());
        info!("logged out");
    }

    async fn enter_app(&self, user: User, banner: Option<Banner>) {
        let token = self.update(|s| {
            let token = s.advance();
            s.user = Some(user);
            s.page = Page::Dashboard;
            s.modal = None;
            s.banner = banner;
            token
        });
        self.load_page(Page::Dashboard, token).await;
    }
}
