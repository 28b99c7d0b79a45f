/// Errors from an identity provider.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown email, wrong password, or both.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User account is disabled")]
    UserDisabled,

    /// The provider is throttling sign-in attempts for this account.
    #[error("Too many sign-in attempts")]
    TooManyAttempts,

    /// The stored session could not be refreshed and was dropped.
    #[error("Session expired")]
    SessionExpired,

    /// An error code the provider returned that has no dedicated variant.
    #[error("Identity provider error: {code}")]
    Provider { code: String },

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl AuthError {
    /// Map a provider error code such as `INVALID_PASSWORD` or
    /// `TOO_MANY_ATTEMPTS_TRY_LATER : Access to this account...`.
    pub fn from_code(message: &str) -> Self {
        let code = message.split([' ', ':']).next().unwrap_or_default();
        match code {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS"
            | "INVALID_EMAIL" | "MISSING_PASSWORD" => AuthError::InvalidCredentials,
            "USER_DISABLED" => AuthError::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::TooManyAttempts,
            "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" => {
                AuthError::SessionExpired
            }
            _ => AuthError::Provider {
                code: code.to_string(),
            },
        }
    }

    /// Message shown inline on the login form.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Invalid email or password.",
            AuthError::UserDisabled => "This account has been disabled.",
            AuthError::TooManyAttempts => {
                "Too many failed attempts. Please wait a moment and try again."
            }
            AuthError::SessionExpired => "Your session has expired. Please sign in again.",
            AuthError::Request(_) => "Unable to reach the sign-in service. Check your connection.",
            AuthError::Provider { .. } => "Verification failed. Please check your credentials.",
        }
    }
}
