use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Phone numbers: 10 or 11 digits, no separators
static PHONE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{10,11}$").unwrap());

fn validate_phone(phone: &str) -> Result<(), validator::ValidationError> {
    if !PHONE_NUMBER.is_match(phone) {
        return Err(validator::ValidationError::new("invalid_phone_number"));
    }
    Ok(())
}

/// User gender
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Account status
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    /// Status not yet assigned
    #[default]
    None,
}

/// User account type
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserType {
    Owner,
    Admin,
    #[default]
    User,
}

/// Postal address owned by a user.
///
/// Addresses have no independent lifecycle: they are written and deleted
/// together with their owning user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub apartment_number: String,
    pub floor: String,
    pub building: String,
    pub street_number: String,
    pub street: String,
    pub city: String,
    pub country: String,
    pub address_type: i32,
}

/// User entity - matches SQL schema
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// User email (unique)
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub username: String,
    /// Argon2 password hash (never exposed in API responses)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub status: UserStatus,
    #[serde(rename = "type")]
    pub user_type: UserType,
    /// Owned address set, replaced wholesale on update
    pub addresses: Vec<Address>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating or fully replacing a user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    #[validate(length(min = 1, max = 100))]
    pub username: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    #[validate(length(min = 1))]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub status: UserStatus,
}

/// Full user view for detail and list responses (addresses omitted, as in
/// the list projection they would dominate the payload)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub username: String,
    pub status: UserStatus,
    #[serde(rename = "type")]
    pub user_type: UserType,
}

impl From<User> for UserDetail {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone: user.phone,
            date_of_birth: user.date_of_birth,
            gender: user.gender,
            username: user.username,
            status: user.status,
            user_type: user.user_type,
        }
    }
}

/// Reduced projection for search results
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

impl User {
    /// Create a new user (password is hashed by the service layer)
    pub fn new(request: UserRequest, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            phone: request.phone,
            date_of_birth: request.date_of_birth,
            gender: request.gender,
            username: request.username,
            password_hash,
            status: request.status,
            user_type: request.user_type,
            addresses: request.addresses,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace all mutable fields and the owned address set.
    ///
    /// The password is only replaced when a new hash is supplied.
    pub fn apply_update(&mut self, request: UserRequest, new_password_hash: Option<String>) {
        self.first_name = request.first_name;
        self.last_name = request.last_name;
        self.email = request.email;
        self.phone = request.phone;
        self.date_of_birth = request.date_of_birth;
        self.gender = request.gender;
        self.username = request.username;
        if let Some(hash) = new_password_hash {
            self.password_hash = hash;
        }
        self.status = request.status;
        self.user_type = request.user_type;
        self.addresses = request.addresses;
        self.updated_at = Utc::now();
    }
}
