//! Sign-in, registration and password recovery.

use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::effects::{Effect, Outcome};
use crate::navigation::{Completion, NavIntent, Screen};
use crate::screens::{looks_like_email, require, Banner, FieldErrors, Step};
use crate::services::{AuthSession, SignUpRequest};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const ACCOUNT_CREATED: &str =
    "Account created! Please check your email to confirm your account, then sign in.";
pub const RESET_LINK_SENT: &str = "Password reset link sent! Check your email.";

fn signed_in(session: AuthSession, ctx: &mut AppContext) -> Step {
    ctx.start(session);
    Step::Intent(NavIntent::Complete(Completion::SignedIn))
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoginScreen {
    pub email: String,
    pub show_reset: bool,
    pub submitting: bool,
    pub banner: Banner,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LoginAction {
    Submit { email: String, password: String },
    ShowReset,
    HideReset,
    SendReset { email: String },
    CreateAccount,
    Onboarding,
}

impl LoginScreen {
    pub fn update(&mut self, action: LoginAction) -> Step {
        match action {
            LoginAction::Submit { email, password } => {
                if self.submitting {
                    return Step::None;
                }
                if email.trim().is_empty() || password.is_empty() {
                    self.banner.error("Please enter your email and password");
                    return Step::None;
                }
                self.email = email.trim().to_string();
                self.submitting = true;
                self.banner.clear();
                Step::Effect(Effect::SignIn {
                    email: self.email.clone(),
                    password,
                })
            }
            LoginAction::ShowReset => {
                self.show_reset = true;
                self.banner.clear();
                Step::None
            }
            LoginAction::HideReset => {
                self.show_reset = false;
                self.banner.clear();
                Step::None
            }
            LoginAction::SendReset { email } => {
                if !looks_like_email(&email) {
                    self.banner.error("Please enter a valid email address");
                    return Step::None;
                }
                self.banner.clear();
                Step::Effect(Effect::SendPasswordReset {
                    email: email.trim().to_string(),
                })
            }
            LoginAction::CreateAccount => Step::navigate(Screen::Signup),
            LoginAction::Onboarding => Step::navigate(Screen::Onboarding),
        }
    }

    pub fn on_outcome(&mut self, outcome: Outcome, ctx: &mut AppContext) -> Step {
        self.submitting = false;
        match outcome {
            Outcome::SignedIn(session) => signed_in(session, ctx),
            Outcome::ResetLinkSent => {
                self.show_reset = false;
                self.banner.notice(RESET_LINK_SENT);
                Step::None
            }
            Outcome::Failed(message) => {
                self.banner.error(message);
                Step::None
            }
            _ => Step::None,
        }
    }
}

/// Registration form. Passwords are accepted but never rendered back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default, skip_serializing)]
    pub confirm_password: String,
    #[serde(default)]
    pub emergency_contact: String,
    #[serde(default)]
    pub agree_to_terms: bool,
}

impl RegistrationForm {
    /// Field errors; `full` adds the onboarding-only requirements.
    pub fn validate(&self, full: bool) -> FieldErrors {
        let mut errors = FieldErrors::new();

        require(&mut errors, "full_name", &self.full_name, "Full name is required");

        if require(&mut errors, "email", &self.email, "Email is required") && !looks_like_email(&self.email) {
            errors.insert("email", "Please enter a valid email address".to_string());
        }

        if require(&mut errors, "phone_number", &self.phone_number, "Phone number is required")
            && !valid_phone(&self.phone_number)
        {
            errors.insert("phone_number", "Please enter a valid phone number".to_string());
        }

        if self.password.is_empty() {
            errors.insert("password", "Password is required".to_string());
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.insert("password", "Password must be at least 6 characters".to_string());
        }

        if self.password != self.confirm_password {
            errors.insert("confirm_password", "Passwords do not match".to_string());
        }

        if full {
            require(
                &mut errors,
                "emergency_contact",
                &self.emergency_contact,
                "Emergency contact is required",
            );
            if !self.agree_to_terms {
                errors.insert("agree_to_terms", "You must agree to the terms and conditions".to_string());
            }
        }

        errors
    }

    fn request(&self) -> SignUpRequest {
        SignUpRequest {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            password: self.password.clone(),
            emergency_contact: self.emergency_contact.trim().to_string(),
        }
    }
}

/// Ten or more digits, spaces, dashes or parentheses, optionally led by `+`.
fn valid_phone(value: &str) -> bool {
    let value = value.trim();
    let body = value.strip_prefix('+').unwrap_or(value);
    body.chars().count() >= 10
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SignupScreen {
    pub form: RegistrationForm,
    pub errors: FieldErrors,
    pub submitting: bool,
    pub banner: Banner,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SignupAction {
    Submit(RegistrationForm),
    SignIn,
}

impl SignupScreen {
    pub fn update(&mut self, action: SignupAction) -> Step {
        match action {
            SignupAction::Submit(form) => {
                if self.submitting {
                    return Step::None;
                }
                self.errors = form.validate(false);
                self.form = form;
                if !self.errors.is_empty() {
                    return Step::None;
                }
                self.submitting = true;
                self.banner.clear();
                Step::Effect(Effect::SignUp(self.form.request()))
            }
            SignupAction::SignIn => Step::navigate(Screen::Login),
        }
    }

    pub fn on_outcome(&mut self, outcome: Outcome, ctx: &mut AppContext) -> Step {
        self.submitting = false;
        match outcome {
            Outcome::SignedIn(session) => signed_in(session, ctx),
            Outcome::SignedUp => {
                self.banner.notice(ACCOUNT_CREATED);
                Step::None
            }
            Outcome::Failed(message) => {
                self.banner.error(message);
                Step::None
            }
            _ => Step::None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    #[default]
    Welcome,
    Register,
}

/// Welcome page followed by the full registration form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OnboardingScreen {
    pub step: OnboardingStep,
    pub form: RegistrationForm,
    pub errors: FieldErrors,
    pub submitting: bool,
    pub banner: Banner,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OnboardingAction {
    GetStarted,
    Submit(RegistrationForm),
    SignIn,
}

impl OnboardingScreen {
    pub fn update(&mut self, action: OnboardingAction) -> Step {
        match action {
            OnboardingAction::GetStarted => {
                self.step = OnboardingStep::Register;
                Step::None
            }
            OnboardingAction::Submit(form) => {
                if self.submitting {
                    return Step::None;
                }
                self.step = OnboardingStep::Register;
                self.errors = form.validate(true);
                self.form = form;
                if !self.errors.is_empty() {
                    return Step::None;
                }
                self.submitting = true;
                self.banner.clear();
                Step::Effect(Effect::SignUp(self.form.request()))
            }
            OnboardingAction::SignIn => Step::navigate(Screen::Login),
        }
    }

    pub fn on_outcome(&mut self, outcome: Outcome, ctx: &mut AppContext) -> Step {
        self.submitting = false;
        match outcome {
            Outcome::SignedIn(session) => signed_in(session, ctx),
            Outcome::SignedUp => {
                self.banner.notice(ACCOUNT_CREATED);
                Step::None
            }
            Outcome::Failed(message) => {
                self.banner.error(message);
                Step::None
            }
            _ => Step::None,
        }
    }
}

/// Request a recovery link, then set a new password once the link has been
/// opened.
#[derive(Debug, Clone, Default)]
pub struct ResetPasswordScreen {
    email: String,
    link_sent: bool,
    recovery: Option<AuthSession>,
    submitting: bool,
    banner: Banner,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetPasswordView {
    pub email: String,
    pub link_sent: bool,
    /// True once a recovery link has been opened; the form then asks for
    /// the new password.
    pub recovering: bool,
    pub submitting: bool,
    pub banner: Banner,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ResetPasswordAction {
    RequestLink { email: String },
    OpenRecovery { access_token: String },
    SetPassword { password: String, confirm_password: String },
    BackToLogin,
}

impl ResetPasswordScreen {
    pub fn update(&mut self, action: ResetPasswordAction) -> Step {
        if self.submitting && !matches!(action, ResetPasswordAction::BackToLogin) {
            return Step::None;
        }
        match action {
            ResetPasswordAction::RequestLink { email } => {
                if !looks_like_email(&email) {
                    self.banner.error("Please enter a valid email address");
                    return Step::None;
                }
                self.email = email.trim().to_string();
                self.submitting = true;
                self.banner.clear();
                Step::Effect(Effect::SendPasswordReset {
                    email: self.email.clone(),
                })
            }
            ResetPasswordAction::OpenRecovery { access_token } => {
                self.submitting = true;
                Step::Effect(Effect::RecoverSession { access_token })
            }
            ResetPasswordAction::SetPassword {
                password,
                confirm_password,
            } => {
                let Some(session) = self.recovery.clone() else {
                    self.banner.error("Open the link from your email to set a new password");
                    return Step::None;
                };
                if password.is_empty() || confirm_password.is_empty() {
                    self.banner.error("Please fill both password fields");
                    return Step::None;
                }
                if password.chars().count() < MIN_PASSWORD_LEN {
                    self.banner.error("Password must be at least 6 characters long");
                    return Step::None;
                }
                if password != confirm_password {
                    self.banner.error("Passwords do not match");
                    return Step::None;
                }
                self.submitting = true;
                self.banner.clear();
                Step::Effect(Effect::UpdatePassword { session, password })
            }
            ResetPasswordAction::BackToLogin => Step::navigate(Screen::Login),
        }
    }

    pub fn on_outcome(&mut self, outcome: Outcome) -> Step {
        self.submitting = false;
        match outcome {
            Outcome::ResetLinkSent => {
                self.link_sent = true;
                self.banner.notice(RESET_LINK_SENT);
                Step::None
            }
            Outcome::RecoverySession(session) => {
                tracing::info!(user_id = %session.user_id, "Password recovery started");
                self.email = session.email.clone();
                self.recovery = Some(session);
                self.banner.clear();
                Step::None
            }
            Outcome::PasswordUpdated => {
                self.recovery = None;
                Step::Intent(NavIntent::Complete(Completion::PasswordReset))
            }
            Outcome::Failed(message) => {
                self.banner.error(message);
                Step::None
            }
            _ => Step::None,
        }
    }

    pub fn view(&self) -> ResetPasswordView {
        ResetPasswordView {
            email: self.email.clone(),
            link_sent: self.link_sent,
            recovering: self.recovery.is_some(),
            submitting: self.submitting,
            banner: self.banner.clone(),
        }
    }
}
