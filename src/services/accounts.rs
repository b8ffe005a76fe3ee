//! Account lifecycle: signup, login, profile maintenance, password
//! recovery, Google sign-in and the public contact form.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        hash_password,
        oauth2::{GoogleOAuthClient, GoogleUserInfo, OAuth2Error},
        reset_token::{decode_uid, encode_uid},
        verify_password, AuthService, AuthUser, PasswordPolicy, ResetTokenGenerator,
    },
    db::{self, DbPool},
    entities::{backoffice_user, company, driver, user, warehouse_user, UserType},
    errors::ServiceError,
    services::{
        companies::apply_company_form,
        devices::DeviceService,
        email::{Mailer, OutgoingEmail},
        form::{FormData, UploadedFile},
        profiles::{apply_driver_form, ensure_backoffice, ensure_driver, ensure_warehouse},
        storage::{StorageService, PROFILE_PICTURES},
        views::{load_profile_view, ProfileView, UserView},
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 150, message = "First name is required."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 150, message = "Last name is required."))]
    pub last_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    pub password: String,
    pub user_type: String,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub payload: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub new_password1: String,
    pub new_password2: String,
    pub uid: String,
    pub token: String,
}

/// Google sign-in body; mobile clients send an access token, web clients a code
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct GoogleAuthRequest {
    #[serde(alias = "code", alias = "access_token")]
    pub token: Option<String>,
    pub user_type: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ContactUsRequest {
    #[validate(length(min = 1, message = "Full name is required."))]
    pub full_name: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "Message is required."))]
    pub message: String,
}

/// Token plus the account as both platforms render it
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: UserView,
    pub user_data: ProfileView,
}

/// Outcome of a Google sign-in; `created` is set when the account is new
#[derive(Debug, Clone)]
pub struct GoogleSession {
    pub session: Session,
    pub created: bool,
    pub message: &'static str,
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub message: &'static str,
    pub user: UserView,
    pub user_data: ProfileView,
}

struct NewAccount {
    first_name: String,
    last_name: String,
    email: String,
    phone_number: Option<String>,
    user_type: UserType,
    password_hash: Option<String>,
    payload: Option<serde_json::Value>,
}

fn parse_user_type(raw: &str) -> Result<UserType, ServiceError> {
    UserType::from_str(raw.trim())
        .map_err(|_| ServiceError::ValidationError(format!("\"{}\" is not a valid choice.", raw)))
}

fn password_attributes(account: &user::Model) -> [(&'static str, &str); 3] {
    [
        ("email address", account.email.as_str()),
        ("first name", account.first_name.as_str()),
        ("last name", account.last_name.as_str()),
    ]
}

async fn ensure_profile<C: ConnectionTrait>(conn: &C, user_id: Uuid, user_type: UserType) -> Result<(), DbErr> {
    match user_type {
        UserType::Driver => ensure_driver(conn, user_id).await.map(|_| ()),
        UserType::Warehouse => ensure_warehouse(conn, user_id).await.map(|_| ()),
        UserType::Backoffice => ensure_backoffice(conn, user_id).await.map(|_| ()),
    }
}

fn platform_check(user_type: UserType, mobile: bool) -> Result<(), ServiceError> {
    match (mobile, user_type) {
        (false, UserType::Driver | UserType::Warehouse) => Err(ServiceError::bad_request(format!(
            "{} is not allowed to login on web",
            user_type
        ))),
        (true, UserType::Backoffice) => Err(ServiceError::bad_request(format!(
            "{} is not allowed to login on Mobile",
            user_type
        ))),
        _ => Ok(()),
    }
}

fn oauth_failure(err: OAuth2Error) -> ServiceError {
    warn!(error = %err, "Google sign-in failed");
    match err {
        OAuth2Error::UserInfoFailed(_) => {
            ServiceError::bad_request("Failed to fetch user info from Google API")
        }
        OAuth2Error::NotConfigured
        | OAuth2Error::ConfigurationError(_)
        | OAuth2Error::TokenExchangeFailed(_) => {
            ServiceError::bad_request("Failed to exchange code for tokens")
        }
    }
}

pub struct AccountService {
    db: Arc<DbPool>,
    auth: Arc<AuthService>,
    storage: StorageService,
    mailer: Arc<dyn Mailer>,
    google: Arc<GoogleOAuthClient>,
    devices: DeviceService,
    reset_tokens: ResetTokenGenerator,
    password_policy: PasswordPolicy,
    password_reset_url: String,
}

impl AccountService {
    pub fn new(
        db: Arc<DbPool>,
        auth: Arc<AuthService>,
        storage: StorageService,
        mailer: Arc<dyn Mailer>,
        google: Arc<GoogleOAuthClient>,
        reset_tokens: ResetTokenGenerator,
        password_reset_url: impl Into<String>,
    ) -> Self {
        Self {
            devices: DeviceService::new(db.clone()),
            db,
            auth,
            storage,
            mailer,
            google,
            reset_tokens,
            password_policy: PasswordPolicy::default(),
            password_reset_url: password_reset_url.into(),
        }
    }

    async fn find_user(&self, user_id: Uuid) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found."))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, ServiceError> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(&*self.db)
            .await?)
    }

    async fn session(&self, account: user::Model, token: String) -> Result<Session, ServiceError> {
        let user_data = load_profile_view(&*self.db, &self.storage, &account).await?;
        Ok(Session {
            token,
            user: UserView::render(&account, &self.storage),
            user_data,
        })
    }

    /// Inserts the account, its role profile and a first token atomically
    async fn create_account(&self, new: NewAccount) -> Result<Session, ServiceError> {
        let auth = self.auth.clone();
        let user_type = new.user_type;
        let (account, issued) = db::transaction(&self.db, "create_account", move |txn| {
            Box::pin(async move {
                let now = Utc::now();
                let account = user::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    first_name: Set(new.first_name),
                    last_name: Set(new.last_name),
                    email: Set(new.email),
                    password_hash: Set(new.password_hash),
                    phone_number: Set(new.phone_number),
                    user_type: Set(new.user_type),
                    profile_picture: Set(None),
                    is_onboarded: Set(false),
                    payload: Set(new.payload),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(txn)
                .await?;
                ensure_profile(txn, account.id, account.user_type).await?;
                let issued = auth.generate_token(txn, &account).await?;
                Ok((account, issued))
            })
        })
        .await?;

        metrics::counter!("backoffice_accounts.created", 1, "user_type" => user_type.to_string());
        info!(user_id = %account.id, user_type = %user_type, "Account created");
        self.session(account, issued.token).await
    }

    /// Issues a token; mobile sessions replace every token the user holds
    async fn issue_token(&self, account: &user::Model, mobile: bool) -> Result<String, ServiceError> {
        if !mobile {
            return Ok(self.auth.generate_token(&*self.db, account).await?.token);
        }
        let auth = self.auth.clone();
        let account = account.clone();
        let issued = db::transaction(&self.db, "rotate_tokens", move |txn| {
            Box::pin(async move {
                auth.revoke_all_for_user(txn, account.id).await?;
                Ok(auth.generate_token(txn, &account).await?)
            })
        })
        .await?;
        Ok(issued.token)
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signup(&self, request: SignupRequest) -> Result<Session, ServiceError> {
        request.validate()?;
        let user_type = parse_user_type(&request.user_type)?;
        let email = request.email.trim().to_lowercase();

        if self.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::bad_request(
                "A user is already registered with this e-mail address.",
            ));
        }

        self.password_policy
            .check(
                &request.password,
                &[
                    ("email address", email.as_str()),
                    ("first name", request.first_name.as_str()),
                    ("last name", request.last_name.as_str()),
                ],
            )
            .map_err(ServiceError::ValidationError)?;

        self.create_account(NewAccount {
            first_name: request.first_name,
            last_name: request.last_name,
            email,
            phone_number: request.phone_number,
            user_type,
            password_hash: Some(hash_password(&request.password)?),
            payload: request.payload,
        })
        .await
    }

    #[instrument(skip(self, request))]
    pub async fn login(&self, request: LoginRequest, mobile: bool) -> Result<Session, ServiceError> {
        let (Some(email), Some(password)) = (
            request.email.filter(|e| !e.trim().is_empty()),
            request.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(ServiceError::bad_request(
                "Must include \"email\" and \"password\".",
            ));
        };

        let invalid = || ServiceError::bad_request("Unable to log in with provided credentials.");
        let account = self.find_by_email(&email).await?.ok_or_else(invalid)?;
        let verified = account
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(&password, hash));
        if !verified {
            warn!(user_id = %account.id, "Rejected login");
            return Err(invalid());
        }

        platform_check(account.user_type, mobile)?;

        let token = self.issue_token(&account, mobile).await?;
        metrics::counter!("backoffice_accounts.logins", 1, "platform" => if mobile { "mobile" } else { "web" });
        info!(user_id = %account.id, mobile, "User logged in");
        self.session(account, token).await
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<(UserView, ProfileView), ServiceError> {
        let account = self.find_user(user_id).await?;
        let profile = load_profile_view(&*self.db, &self.storage, &account).await?;
        Ok((UserView::render(&account, &self.storage), profile))
    }

    /// Updates the account and its role details; every check runs before any write
    #[instrument(skip(self, form))]
    pub async fn update_profile(&self, user_id: Uuid, form: FormData) -> Result<ProfileUpdate, ServiceError> {
        let db = &*self.db;
        let account = self.find_user(user_id).await?;
        let user_type = account.user_type;

        let payload = form.json("payload", "Invalid JSON format in payload.")?;
        let driver_payload = match user_type {
            UserType::Driver => form.json("driver_payload", "Invalid JSON format in driver payload.")?,
            _ => None,
        };
        let company_payload = match user_type {
            UserType::Driver => None,
            _ => form.json("company_payload", "Invalid JSON format in company payload.")?,
        };

        let target_company = match user_type {
            UserType::Driver => None,
            UserType::Warehouse | UserType::Backoffice => {
                let email = form
                    .non_empty("company_email")
                    .map(str::to_lowercase)
                    .ok_or_else(|| {
                        ServiceError::bad_request("Company email is required for updating  data.")
                    })?;
                if user_type == UserType::Warehouse {
                    let found = company::Entity::find()
                        .filter(company::Column::CompanyEmail.eq(email.as_str()))
                        .one(db)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("Company not found."))?;
                    Some(found)
                } else {
                    let profile = ensure_backoffice(db, user_id).await?;
                    let own = match profile.company_id {
                        Some(id) => company::Entity::find_by_id(id).one(db).await?,
                        None => None,
                    };
                    let own = own.ok_or_else(|| ServiceError::bad_request("Company not found."))?;
                    let clash = company::Entity::find()
                        .filter(company::Column::CompanyEmail.eq(email.as_str()))
                        .filter(company::Column::Id.ne(own.id))
                        .one(db)
                        .await?
                        .is_some();
                    if clash {
                        return Err(ServiceError::bad_request(
                            "A company is already registered with this email address.",
                        ));
                    }
                    Some(own)
                }
            }
        };

        let picture = match form.file("profile_picture") {
            Some(file) => Some(self.store_picture(file).await?),
            None => None,
        };

        let account = db::transaction(db, "update_profile", move |txn| {
            Box::pin(async move {
                let mut active: user::ActiveModel = account.into();
                if let Some(v) = form.non_empty("first_name") {
                    active.first_name = Set(v.to_string());
                }
                if let Some(v) = form.non_empty("last_name") {
                    active.last_name = Set(v.to_string());
                }
                if let Some(v) = form.value("phone_number") {
                    active.phone_number = Set(Some(v.to_string()));
                }
                if let Some(payload) = payload {
                    active.payload = Set(Some(payload));
                }
                if let Some(name) = picture {
                    active.profile_picture = Set(Some(name));
                }
                active.updated_at = Set(Utc::now());
                let account = active.update(txn).await?;

                match (account.user_type, target_company) {
                    (UserType::Driver, _) => {
                        let mut profile: driver::ActiveModel = ensure_driver(txn, account.id).await?.into();
                        apply_driver_form(&mut profile, &form, false);
                        if let Some(payload) = driver_payload {
                            profile.driver_payload = Set(Some(payload));
                        }
                        profile.update(txn).await?;
                    }
                    (user_type, Some(found)) => {
                        let company_id = found.id;
                        let mut company: company::ActiveModel = found.into();
                        apply_company_form(&mut company, &form);
                        if let Some(payload) = company_payload {
                            company.company_payload = Set(Some(payload));
                        }
                        company.update(txn).await?;

                        if user_type == UserType::Warehouse {
                            let mut profile: warehouse_user::ActiveModel =
                                ensure_warehouse(txn, account.id).await?.into();
                            profile.company_id = Set(Some(company_id));
                            profile.update(txn).await?;
                        } else {
                            let mut profile: backoffice_user::ActiveModel =
                                ensure_backoffice(txn, account.id).await?.into();
                            profile.company_id = Set(Some(company_id));
                            profile.update(txn).await?;
                        }
                    }
                    (_, None) => {}
                }
                Ok(account)
            })
        })
        .await?;

        let message = match user_type {
            UserType::Driver => "Profile updated successfully.",
            UserType::Warehouse => "Warehouse user profile updated successfully.",
            UserType::Backoffice => "Backoffice user profile updated successfully.",
        };
        info!(user_id = %account.id, "Profile updated");

        Ok(ProfileUpdate {
            message,
            user: UserView::render(&account, &self.storage),
            user_data: load_profile_view(db, &self.storage, &account).await?,
        })
    }

    #[instrument(skip(self, request))]
    pub async fn change_password(&self, user_id: Uuid, request: ChangePasswordRequest) -> Result<(), ServiceError> {
        let account = self.find_user(user_id).await?;

        if request.new_password != request.confirm_new_password {
            return Err(ServiceError::bad_request("Password Didn't match."));
        }
        self.password_policy
            .check(&request.new_password, &password_attributes(&account))
            .map_err(ServiceError::bad_request)?;

        let old_matches = account
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(&request.old_password, hash));
        if !old_matches {
            return Err(ServiceError::bad_request(
                "Incorrect password!. Old password did not match",
            ));
        }

        self.set_password(account, &request.new_password).await?;
        info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    async fn set_password(&self, account: user::Model, password: &str) -> Result<user::Model, ServiceError> {
        let mut active: user::ActiveModel = account.into();
        active.password_hash = Set(Some(hash_password(password)?));
        active.updated_at = Set(Utc::now());
        Ok(active.update(&*self.db).await?)
    }

    async fn store_picture(&self, file: &UploadedFile) -> Result<String, ServiceError> {
        self.storage
            .store(
                PROFILE_PICTURES,
                &file.file_name,
                file.bytes.clone(),
                file.content_type.as_deref(),
            )
            .await
    }

    pub async fn profile_picture(&self, user_id: Uuid) -> Result<Option<String>, ServiceError> {
        let account = self.find_user(user_id).await?;
        Ok(self.storage.url(account.profile_picture.as_deref()))
    }

    #[instrument(skip(self, file))]
    pub async fn upload_profile_picture(
        &self,
        user_id: Uuid,
        file: Option<&UploadedFile>,
    ) -> Result<Option<String>, ServiceError> {
        let file = file.ok_or_else(|| ServiceError::bad_request("Unable to upload Profile Picture"))?;
        let account = self.find_user(user_id).await?;
        let name = self.store_picture(file).await?;

        let mut active: user::ActiveModel = account.into();
        active.profile_picture = Set(Some(name.clone()));
        active.updated_at = Set(Utc::now());
        active.update(&*self.db).await?;
        Ok(self.storage.url(Some(&name)))
    }

    /// Mails a reset link carrying `token` and `uid`
    #[instrument(skip(self, request))]
    pub async fn forgot_password(&self, request: ForgotPasswordRequest) -> Result<(), ServiceError> {
        let account = self
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;

        let token = self
            .reset_tokens
            .make_token(account.id, account.password_hash.as_deref());
        let link = format!(
            "{}?token={}&uid={}",
            self.password_reset_url,
            token,
            encode_uid(account.id)
        );
        let email = OutgoingEmail {
            to: account.email.clone(),
            subject: "Password Reset".to_string(),
            body: format!(
                "Hello {},\n\nUse the link below to reset your password:\n{}\n",
                account.full_name(),
                link
            ),
        };

        self.mailer.send(&email).await.map_err(|e| {
            warn!(user_id = %account.id, error = %e, "Password reset mail failed");
            ServiceError::EmailError("Unable to send email - please try again".to_string())
        })?;
        info!(user_id = %account.id, "Password recovery email sent");
        Ok(())
    }

    #[instrument(skip(self, request))]
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> Result<(), ServiceError> {
        if request.new_password1 != request.new_password2 {
            return Err(ServiceError::bad_request("Passwords do not match"));
        }

        let invalid_uid = || ServiceError::bad_request("Invalid UID.");
        let user_id = decode_uid(&request.uid).ok_or_else(invalid_uid)?;
        let account = user::Entity::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(invalid_uid)?;

        if !self
            .reset_tokens
            .check_token(account.id, account.password_hash.as_deref(), &request.token)
        {
            return Err(ServiceError::bad_request("Invalid token or token has expired"));
        }

        if account
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(&request.new_password1, hash))
        {
            return Err(ServiceError::bad_request(
                "New password cannot be the same as the old password.",
            ));
        }

        self.password_policy
            .check(&request.new_password1, &password_attributes(&account))
            .map_err(ServiceError::bad_request)?;

        self.set_password(account, &request.new_password1).await?;
        info!(user_id = %user_id, "Password reset");
        Ok(())
    }

    /// Forgets the first push device and revokes the presenting token
    #[instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn logout(&self, caller: &AuthUser) -> Result<(), ServiceError> {
        self.devices.remove_first(caller.user_id).await?;
        self.auth.revoke_token(&*self.db, caller.token_id).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), ServiceError> {
        let result = user::Entity::delete_by_id(user_id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("User not found."));
        }
        info!(user_id = %user_id, "User deleted");
        Ok(())
    }

    fn google_account(info: &GoogleUserInfo, user_type: UserType) -> Result<NewAccount, ServiceError> {
        let email = info
            .email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ServiceError::bad_request("Failed to fetch user info from Google API"))?;
        Ok(NewAccount {
            first_name: info.given_name.clone().unwrap_or_default(),
            last_name: info.family_name.clone().unwrap_or_default(),
            email,
            phone_number: None,
            user_type,
            password_hash: None,
            payload: None,
        })
    }

    fn google_user_type(request: &GoogleAuthRequest) -> Result<UserType, ServiceError> {
        let raw = request
            .user_type
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ServiceError::ValidationError("user_type is required.".into()))?;
        parse_user_type(raw)
    }

    /// Mobile exchanges an access token and may sign up; web exchanges a code
    #[instrument(skip(self, request))]
    pub async fn google_login(&self, request: GoogleAuthRequest, mobile: bool) -> Result<GoogleSession, ServiceError> {
        let token = request
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::bad_request("Token is required."))?;

        let info = if mobile {
            self.google.fetch_user_info(token).await
        } else {
            self.google.user_info_from_code(token).await
        }
        .map_err(oauth_failure)?;
        let candidate = info
            .email
            .as_deref()
            .ok_or_else(|| ServiceError::bad_request("Failed to fetch user info from Google API"))?;

        match self.find_by_email(candidate).await? {
            Some(account) => {
                platform_check(account.user_type, mobile)?;
                let token = self.issue_token(&account, mobile).await?;
                info!(user_id = %account.id, mobile, "Google login");
                Ok(GoogleSession {
                    session: self.session(account, token).await?,
                    created: false,
                    message: "User logged in successfully",
                })
            }
            None if mobile => {
                let user_type = Self::google_user_type(&request)?;
                let session = self.create_account(Self::google_account(&info, user_type)?).await?;
                Ok(GoogleSession {
                    session,
                    created: true,
                    message: "User signed up and logged in successfully",
                })
            }
            None => Err(ServiceError::not_found("User does not exist. Please sign up.")),
        }
    }

    #[instrument(skip(self, request))]
    pub async fn google_signup(&self, request: GoogleAuthRequest) -> Result<GoogleSession, ServiceError> {
        let code = request
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::bad_request("Token is required."))?;
        let user_type = Self::google_user_type(&request)?;

        let info = self.google.user_info_from_code(code).await.map_err(oauth_failure)?;
        let new = Self::google_account(&info, user_type)?;
        if self.find_by_email(&new.email).await?.is_some() {
            return Err(ServiceError::bad_request("User already exists. Please log in."));
        }

        Ok(GoogleSession {
            session: self.create_account(new).await?,
            created: true,
            message: "User signed up successfully",
        })
    }

    /// Forwards the contact form to the platform's own mailbox
    #[instrument(skip(self, request))]
    pub async fn contact_us(&self, request: ContactUsRequest) -> Result<(), ServiceError> {
        request.validate()?;
        let email = OutgoingEmail {
            to: self.mailer.from_address().to_string(),
            subject: "Contact Us Form Submission".to_string(),
            body: format!(
                "Full Name: {}\nEmail: {}\nMessage: {}",
                request.full_name, request.email, request.message
            ),
        };
        self.mailer.send(&email).await.map_err(|e| {
            warn!(error = %e, "Contact form mail failed");
            ServiceError::EmailError("Failed to submit form. Please try again later.".to_string())
        })
    }
}
