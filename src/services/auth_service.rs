use crate::entities::user_entity as users;
use crate::entities::users::{Plan, Role};
use crate::error::{AppError, AppResult};
use crate::models::billing::FREE_PLAN_CREDITS;
use crate::models::{
    AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest,
    UserResponse,
};
use crate::utils::{JwtService, hash_password, validate_password, verify_password};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthService {
    pool: Arc<DatabaseConnection>,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: Arc<DatabaseConnection>, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let name = request.name.trim();
        let email = request.email.trim().to_lowercase();

        if name.is_empty() || email.is_empty() || request.password.is_empty() {
            return Err(AppError::ValidationError(
                "Please provide all required fields".to_string(),
            ));
        }
        if !email.contains('@') {
            return Err(AppError::ValidationError(
                "Please provide a valid email".to_string(),
            ));
        }
        validate_password(&request.password)?;

        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .one(self.pool.as_ref())
            .await?;
        if existing.is_some() {
            return Err(AppError::ValidationError(
                "User already exists with this email".to_string(),
            ));
        }

        let now = Utc::now();
        let model = users::ActiveModel {
            name: Set(name.to_string()),
            email: Set(email),
            password_hash: Set(hash_password(&request.password)?),
            role: Set(Role::User),
            plan: Set(Plan::Free),
            credits: Set(FREE_PLAN_CREDITS),
            total_generations: Set(0),
            this_month_generations: Set(0),
            last_reset_date: Set(now),
            last_login: Set(now),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let user = model.insert(self.pool.as_ref()).await?;

        let token = self
            .jwt_service
            .generate_token(user.id, &user.email, user.role)?;

        Ok(AuthResponse {
            user: UserResponse::from(user),
            token,
        })
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let email = request.email.trim().to_lowercase();
        if email.is_empty() || request.password.is_empty() {
            return Err(AppError::ValidationError(
                "Please provide email and password".to_string(),
            ));
        }

        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid credentials".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError("Invalid credentials".to_string()));
        }

        let token = self
            .jwt_service
            .generate_token(user.id, &user.email, user.role)?;

        let mut model = user.clone().into_active_model();
        model.last_login = Set(Utc::now());
        let user = model.update(self.pool.as_ref()).await?;

        Ok(AuthResponse {
            user: UserResponse::from(user),
            token,
        })
    }

    pub async fn get_me(&self, user_id: i64) -> AppResult<UserResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(UserResponse::from(user))
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        request: UpdateProfileRequest,
    ) -> AppResult<UserResponse> {
        if request.name.is_none() && request.email.is_none() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let user = users::Entity::find_by_id(user_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if let Some(email) = &request.email {
            let email = email.trim().to_lowercase();
            if email != user.email {
                let taken = users::Entity::find()
                    .filter(users::Column::Email.eq(email))
                    .one(self.pool.as_ref())
                    .await?;
                if taken.is_some() {
                    return Err(AppError::ValidationError(
                        "Email already in use".to_string(),
                    ));
                }
            }
        }

        let mut model = user.into_active_model();
        if let Some(name) = &request.name {
            model.name = Set(name.trim().to_string());
        }
        if let Some(email) = &request.email {
            model.email = Set(email.trim().to_lowercase());
        }
        model.updated_at = Set(Utc::now());
        let user = model.update(self.pool.as_ref()).await?;

        Ok(UserResponse::from(user))
    }

    pub async fn change_password(
        &self,
        user_id: i64,
        request: ChangePasswordRequest,
    ) -> AppResult<()> {
        if request.current_password.is_empty() || request.new_password.is_empty() {
            return Err(AppError::ValidationError(
                "Please provide current and new password".to_string(),
            ));
        }
        validate_password(&request.new_password)?;

        let user = users::Entity::find_by_id(user_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !verify_password(&request.current_password, &user.password_hash)? {
            return Err(AppError::AuthError(
                "Current password is incorrect".to_string(),
            ));
        }

        let mut model = user.into_active_model();
        model.password_hash = Set(hash_password(&request.new_password)?);
        model.updated_at = Set(Utc::now());
        model.update(self.pool.as_ref()).await?;

        Ok(())
    }
}
