use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserDetail, UserRequest, UserStatus, UserSummary};
use crate::query::{Page, PageRequest};
use crate::repository::UserRepository;

/// Service layer for User business logic
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new user with password hashing
    pub async fn create_user(&self, request: UserRequest) -> UserResult<UserDetail> {
        if self.repository.email_exists(&request.email).await? {
            return Err(UserError::DuplicateEmail(request.email));
        }

        let password_hash = self.hash_password(&request.password)?;
        let user = User::new(request, password_hash);

        let created = self.repository.create(user).await?;
        info!(user_id = %created.id, "User created");
        Ok(created.into())
    }

    /// Get a user by ID
    pub async fn get_user(&self, id: Uuid) -> UserResult<UserDetail> {
        let user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        Ok(user.into())
    }

    /// Fully replace a user's fields and addresses.
    ///
    /// The stored password hash is kept unless the request carries a
    /// different password.
    pub async fn update_user(&self, id: Uuid, request: UserRequest) -> UserResult<UserDetail> {
        let mut user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        if request.email.to_lowercase() != user.email.to_lowercase()
            && self.repository.email_exists(&request.email).await?
        {
            return Err(UserError::DuplicateEmail(request.email));
        }

        let new_password_hash = Some(self.hash_password(&request.password)?);
        user.apply_update(request, new_password_hash);

        let updated = self.repository.update(user).await?;
        info!(user_id = %updated.id, "User updated");
        Ok(updated.into())
    }

    /// Change only the account status
    pub async fn change_status(&self, id: Uuid, status: UserStatus) -> UserResult<UserDetail> {
        let mut user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        user.status = status;
        user.updated_at = chrono::Utc::now();

        let updated = self.repository.update(user).await?;
        info!(user_id = %updated.id, status = %status, "User status changed");
        Ok(updated.into())
    }

    /// Delete a user
    pub async fn delete_user(&self, id: Uuid) -> UserResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(UserError::NotFound(id));
        }

        info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// One page of users in the detail projection, optionally sorted by the
    /// given `field:direction` tokens.
    pub async fn list_users(
        &self,
        page_no: u64,
        page_size: u64,
        sort_tokens: &[String],
    ) -> UserResult<Page<UserDetail>> {
        let request = PageRequest::new(page_no, page_size, sort_tokens, None)?;
        let (items, total) = self.repository.list(&request).await?;
        Ok(Page::assemble(&request, items, total))
    }

    /// One page of users matching a case-insensitive substring of first
    /// name, last name or email, in the summary projection.
    pub async fn search_users(
        &self,
        page_no: u64,
        page_size: u64,
        sort_tokens: &[String],
        search: Option<String>,
    ) -> UserResult<Page<UserSummary>> {
        let request = PageRequest::new(page_no, page_size, sort_tokens, search)?;
        let (items, total) = self.repository.search(&request).await?;
        Ok(Page::assemble(&request, items, total))
    }

    fn hash_password(&self, password: &str) -> UserResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserError::PasswordHash(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Address, Gender, UserType};
    use crate::repository::InMemoryUserRepository;
    use chrono::NaiveDate;

    fn request(email: &str) -> UserRequest {
        UserRequest {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: email.to_string(),
            phone: "0123456789".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            gender: Gender::Female,
            username: "janedoe".to_string(),
            password: "secret-password".to_string(),
            user_type: UserType::User,
            addresses: vec![Address {
                apartment_number: "1".to_string(),
                floor: "1".to_string(),
                building: "A".to_string(),
                street_number: "1".to_string(),
                street: "Main St".to_string(),
                city: "Springfield".to_string(),
                country: "US".to_string(),
                address_type: 1,
            }],
            status: UserStatus::Active,
        }
    }

    fn service() -> UserService<InMemoryUserRepository> {
        UserService::new(InMemoryUserRepository::new())
    }

    #[tokio::test]
    async fn test_create_hashes_password() {
        let service = service();
        let created = service.create_user(request("jane@example.com")).await.unwrap();

        let user = service
            .repository
            .get_by_id(created.id)
            .await
            .unwrap()
            .unwrap();
        assert_ne!(user.password_hash, "secret-password");
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let service = service();
        service.create_user(request("jane@example.com")).await.unwrap();

        let result = service.create_user(request("jane@example.com")).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_get_unknown_user_is_not_found() {
        let result = service().get_user(Uuid::now_v7()).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let service = service();
        let created = service.create_user(request("jane@example.com")).await.unwrap();

        let mut update = request("jane@example.com");
        update.first_name = "Janet".to_string();
        let updated = service.update_user(created.id, update).await.unwrap();

        assert_eq!(updated.first_name, "Janet");
    }

    #[tokio::test]
    async fn test_update_rejects_taken_email() {
        let service = service();
        service.create_user(request("jane@example.com")).await.unwrap();
        let other = service.create_user(request("john@example.com")).await.unwrap();

        let result = service
            .update_user(other.id, request("jane@example.com"))
            .await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_change_status() {
        let service = service();
        let created = service.create_user(request("jane@example.com")).await.unwrap();

        let updated = service
            .change_status(created.id, UserStatus::Inactive)
            .await
            .unwrap();
        assert_eq!(updated.status, UserStatus::Inactive);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let service = service();
        let created = service.create_user(request("jane@example.com")).await.unwrap();

        service.delete_user(created.id).await.unwrap();
        assert!(matches!(
            service.get_user(created.id).await,
            Err(UserError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_user(created.id).await,
            Err(UserError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_pages_and_counts() {
        let service = UserService::new(InMemoryUserRepository::seeded(5));

        let page = service.list_users(1, 2, &[]).await.unwrap();
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 2);

        let last = service.list_users(3, 2, &[]).await.unwrap();
        assert_eq!(last.items.len(), 1);
    }

    #[tokio::test]
    async fn test_search_returns_summaries() {
        let service = UserService::new(InMemoryUserRepository::seeded(5));

        let page = service
            .search_users(1, 10, &[], Some("user3".to_string()))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].first_name, "FirstName 3");
    }
}
