use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    db::{self, DbPool},
    entities::{company, driver, user, UserType},
    errors::ServiceError,
    services::{
        form::FormData,
        notifications::NotificationService,
        profiles::{apply_driver_form, ensure_backoffice, ensure_driver, ensure_warehouse},
        storage::{StorageService, PROFILE_PICTURES},
        views::{load_profile_view, CompanyView, ProfileView, UserView},
    },
};

/// Company columns that forms may set
pub const COMPANY_FORM_FIELDS: [&str; 9] = [
    "company_name",
    "company_email",
    "company_phone_number",
    "address",
    "country",
    "city",
    "state",
    "zip_code",
    "company_bio",
];

/// Copies the company fields present in `form`
pub fn apply_company_form(active: &mut company::ActiveModel, form: &FormData) {
    for field in COMPANY_FORM_FIELDS {
        let Some(value) = form.value(field).map(str::to_string) else {
            continue;
        };
        match field {
            "company_name" => active.company_name = Set(value),
            "company_email" => active.company_email = Set(value.to_lowercase()),
            "company_phone_number" => active.company_phone_number = Set(Some(value)),
            "address" => active.address = Set(Some(value)),
            "country" => active.country = Set(Some(value)),
            "city" => active.city = Set(Some(value)),
            "state" => active.state = Set(Some(value)),
            "zip_code" => active.zip_code = Set(Some(value)),
            _ => active.company_bio = Set(Some(value)),
        }
    }
}

/// Result of onboarding: the refreshed account and its role profile
#[derive(Debug, Clone)]
pub struct OnboardingOutcome {
    pub user: UserView,
    pub user_data: ProfileView,
}

#[derive(Clone)]
pub struct CompanyService {
    db: Arc<DbPool>,
    storage: StorageService,
    notifications: Arc<NotificationService>,
}

impl CompanyService {
    pub fn new(db: Arc<DbPool>, storage: StorageService, notifications: Arc<NotificationService>) -> Self {
        Self {
            db,
            storage,
            notifications,
        }
    }

    /// Completes the account: role details, company, picture, `is_onboarded`
    #[instrument(skip(self, form))]
    pub async fn onboard(
        &self,
        user_id: Uuid,
        form: FormData,
        mobile: bool,
    ) -> Result<OnboardingOutcome, ServiceError> {
        let db = &*self.db;
        let account = user::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found."))?;

        let company_email = form.non_empty("company_email").map(str::to_lowercase);
        if let Some(email) = &company_email {
            let taken = company::Entity::find()
                .filter(company::Column::CompanyEmail.eq(email.as_str()))
                .one(db)
                .await?
                .is_some();
            if taken {
                return Err(ServiceError::bad_request(
                    "A company is already registered with this email address.",
                ));
            }
        }

        let payload = form.json("payload", "Invalid JSON format in payload.")?;
        let company_payload = form.json("company_payload", "Invalid JSON format in company payload.")?;
        let driver_payload = form.json("driver_payload", "Invalid JSON format in driver payload.")?;

        if account.user_type != UserType::Driver {
            if form.non_empty("company_name").is_none() {
                return Err(ServiceError::ValidationError("Company name is required.".into()));
            }
            if company_email.is_none() {
                return Err(ServiceError::ValidationError("Company email is required.".into()));
            }
        }

        let profile_picture = match form.file("profile_picture") {
            Some(file) => Some(
                self.storage
                    .store(
                        PROFILE_PICTURES,
                        &file.file_name,
                        file.bytes.clone(),
                        file.content_type.as_deref(),
                    )
                    .await?,
            ),
            None => None,
        };

        let account = db::transaction(db, "onboarding", move |txn| {
            Box::pin(async move {
                let user_id = account.id;
                let user_type = account.user_type;
                let mut active: user::ActiveModel = account.into();
                if let Some(phone) = form.non_empty("phone_number") {
                    active.phone_number = Set(Some(phone.to_string()));
                }
                if let Some(payload) = payload {
                    active.payload = Set(Some(payload));
                }

                match user_type {
                    UserType::Driver => {
                        let profile = ensure_driver(txn, user_id).await?;
                        let mut driver: driver::ActiveModel = profile.into();
                        apply_driver_form(&mut driver, &form, true);
                        driver.driver_payload = Set(driver_payload);
                        driver.update(txn).await?;
                    }
                    UserType::Backoffice | UserType::Warehouse => {
                        let now = Utc::now();
                        let mut company = company::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            company_name: Set(String::new()),
                            company_email: Set(String::new()),
                            company_phone_number: Set(None),
                            address: Set(None),
                            country: Set(None),
                            city: Set(None),
                            state: Set(None),
                            zip_code: Set(None),
                            company_bio: Set(None),
                            company_payload: Set(company_payload),
                            created_at: Set(now),
                            updated_at: Set(now),
                        };
                        apply_company_form(&mut company, &form);
                        let company = company.insert(txn).await?;

                        if user_type == UserType::Backoffice {
                            let mut profile: crate::entities::backoffice_user::ActiveModel =
                                ensure_backoffice(txn, user_id).await?.into();
                            profile.company_id = Set(Some(company.id));
                            profile.update(txn).await?;
                        } else {
                            let mut profile: crate::entities::warehouse_user::ActiveModel =
                                ensure_warehouse(txn, user_id).await?.into();
                            profile.company_id = Set(Some(company.id));
                            profile.update(txn).await?;
                        }
                    }
                }

                if let Some(name) = profile_picture {
                    active.profile_picture = Set(Some(name));
                }
                active.is_onboarded = Set(true);
                active.updated_at = Set(Utc::now());
                Ok(active.update(txn).await?)
            })
        })
        .await?;

        info!(user_id = %account.id, user_type = %account.user_type, "User onboarded");

        if mobile {
            if let Err(e) = self
                .notifications
                .create_and_send_notification(
                    account.id,
                    "Welcome",
                    "Welcome to the Platform",
                    Some("welcome"),
                    None,
                )
                .await
            {
                warn!(error = %e, "Could not record welcome notification");
            }
        }

        Ok(OnboardingOutcome {
            user: UserView::render(&account, &self.storage),
            user_data: load_profile_view(db, &self.storage, &account).await?,
        })
    }

    /// Partial update of any company
    #[instrument(skip(self, form))]
    pub async fn edit_company(&self, id: Uuid, form: FormData) -> Result<CompanyView, ServiceError> {
        let db = &*self.db;
        let existing = company::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Company not found"))?;

        let company_payload = form.json("company_payload", "Invalid JSON format in company payload.")?;
        if let Some(email) = form.non_empty("company_email").map(str::to_lowercase) {
            let clash = company::Entity::find()
                .filter(company::Column::CompanyEmail.eq(email.as_str()))
                .filter(company::Column::Id.ne(id))
                .one(db)
                .await?
                .is_some();
            if clash {
                return Err(ServiceError::bad_request(
                    "A company is already registered with this email address.",
                ));
            }
        }

        let mut active: company::ActiveModel = existing.into();
        apply_company_form(&mut active, &form);
        if let Some(payload) = company_payload {
            active.company_payload = Set(Some(payload));
        }
        let updated = active.update(db).await?;

        info!(company_id = %id, "Company updated");
        Ok(CompanyView::from(updated))
    }

    /// Company of a backoffice or warehouse user
    #[instrument(skip(self))]
    pub async fn view_company(&self, user_id: Uuid, user_type: UserType) -> Result<CompanyView, ServiceError> {
        let db = &*self.db;
        let company_id = match user_type {
            UserType::Backoffice => ensure_backoffice(db, user_id).await?.company_id,
            UserType::Warehouse => ensure_warehouse(db, user_id).await?.company_id,
            UserType::Driver => None,
        };
        let not_backoffice = || ServiceError::bad_request("User is not a backoffice user.");

        let company_id = company_id.ok_or_else(not_backoffice)?;
        company::Entity::find_by_id(company_id)
            .one(db)
            .await?
            .map(CompanyView::from)
            .ok_or_else(not_backoffice)
    }
}
