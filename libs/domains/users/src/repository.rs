use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{Address, Gender, User, UserDetail, UserStatus, UserSummary, UserType};
use crate::query::{validate_sort, PageRequest, SortDirection};

/// Storage abstraction for users.
///
/// `list` and `search` take a validated [`PageRequest`] and return the page
/// slice together with the total number of matching rows.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    async fn create(&self, user: User) -> UserResult<User>;
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;
    async fn update(&self, user: User) -> UserResult<User>;
    /// Returns false when no user with the id existed.
    async fn delete(&self, id: Uuid) -> UserResult<bool>;
    async fn email_exists(&self, email: &str) -> UserResult<bool>;
    async fn list(&self, request: &PageRequest) -> UserResult<(Vec<UserDetail>, u64)>;
    async fn search(&self, request: &PageRequest) -> UserResult<(Vec<UserSummary>, u64)>;
}

/// In-memory repository for tests and for running without a database.
#[derive(Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-populated with `count` deterministic users, for demos
    /// and local development.
    pub fn seeded(count: usize) -> Self {
        let users: HashMap<Uuid, User> = (1..=count)
            .map(|i| {
                let user = seed_user(i);
                (user.id, user)
            })
            .collect();

        Self {
            users: Arc::new(RwLock::new(users)),
        }
    }

    /// Apply search, sort and paging in memory, mirroring the SQL semantics.
    async fn page_of(&self, request: &PageRequest) -> UserResult<(Vec<User>, u64)> {
        validate_sort(&request.sort)?;

        let users = self.users.read().await;
        let mut matched: Vec<&User> = users
            .values()
            .filter(|user| match &request.search {
                Some(term) => {
                    let term = term.to_lowercase();
                    user.first_name.to_lowercase().contains(&term)
                        || user.last_name.to_lowercase().contains(&term)
                        || user.email.to_lowercase().contains(&term)
                }
                None => true,
            })
            .collect();

        let total = matched.len() as u64;

        matched.sort_by(|a, b| {
            for criterion in &request.sort {
                let ordering = compare_field(a, b, &criterion.field);
                let ordering = match criterion.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            // v7 ids are time-ordered, so this keeps untied rows stable
            a.id.cmp(&b.id)
        });

        let page: Vec<User> = matched
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.page_size as usize)
            .cloned()
            .collect();

        Ok((page, total))
    }
}

fn compare_field(a: &User, b: &User, field: &str) -> Ordering {
    match field {
        "firstName" => a.first_name.cmp(&b.first_name),
        "lastName" => a.last_name.cmp(&b.last_name),
        "email" => a.email.cmp(&b.email),
        "dateOfBirth" => a.date_of_birth.cmp(&b.date_of_birth),
        "username" => a.username.cmp(&b.username),
        "status" => a.status.to_string().cmp(&b.status.to_string()),
        "type" => a.user_type.to_string().cmp(&b.user_type.to_string()),
        _ => Ordering::Equal,
    }
}

fn seed_user(i: usize) -> User {
    let now = chrono::Utc::now();
    User {
        id: Uuid::now_v7(),
        first_name: format!("FirstName {}", i),
        last_name: format!("LastName {}", i),
        email: format!("user{}@example.com", i),
        phone: format!("012345678{}", i % 10),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).expect("constant date"),
        gender: if i % 2 == 0 {
            Gender::Female
        } else {
            Gender::Male
        },
        username: format!("username{}", i),
        password_hash: String::new(),
        status: UserStatus::Active,
        user_type: UserType::User,
        addresses: vec![Address {
            apartment_number: i.to_string(),
            floor: "1".to_string(),
            building: "B".to_string(),
            street_number: i.to_string(),
            street: format!("Street {}", i),
            city: "Springfield".to_string(),
            country: "US".to_string(),
            address_type: 1,
        }],
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(UserError::DuplicateEmail(user.email));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id));
        }
        if users
            .values()
            .any(|existing| existing.id != user.id && existing.email == user.email)
        {
            return Err(UserError::DuplicateEmail(user.email));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|user| user.email == email))
    }

    async fn list(&self, request: &PageRequest) -> UserResult<(Vec<UserDetail>, u64)> {
        let (users, total) = self.page_of(request).await?;
        Ok((users.into_iter().map(UserDetail::from).collect(), total))
    }

    async fn search(&self, request: &PageRequest) -> UserResult<(Vec<UserSummary>, u64)> {
        let (users, total) = self.page_of(request).await?;
        Ok((users.iter().map(UserSummary::from).collect(), total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(first: &str, last: &str, email: &str) -> User {
        let mut user = seed_user(1);
        user.id = Uuid::now_v7();
        user.first_name = first.to_string();
        user.last_name = last.to_string();
        user.email = email.to_string();
        user
    }

    fn page(page_no: u64, page_size: u64, sort: &[&str], search: Option<&str>) -> PageRequest {
        let tokens: Vec<String> = sort.iter().map(|s| s.to_string()).collect();
        PageRequest::new(page_no, page_size, &tokens, search.map(str::to_string))
            .expect("valid page request")
    }

    #[tokio::test]
    async fn test_create_and_get_round_trip() {
        let repo = InMemoryUserRepository::new();
        let user = user_with("Jane", "Doe", "jane@example.com");
        let id = user.id;

        repo.create(user).await.unwrap();

        let fetched = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "jane@example.com");
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let repo = InMemoryUserRepository::new();
        repo.create(user_with("Jane", "Doe", "jane@example.com"))
            .await
            .unwrap();

        let result = repo
            .create(user_with("Janet", "Doe", "jane@example.com"))
            .await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_delete_reports_missing() {
        let repo = InMemoryUserRepository::new();
        assert!(!repo.delete(Uuid::now_v7()).await.unwrap());

        let user = user_with("Jane", "Doe", "jane@example.com");
        let id = user.id;
        repo.create(user).await.unwrap();
        assert!(repo.delete(id).await.unwrap());
        assert!(repo.get_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_filters_across_name_and_email() {
        let repo = InMemoryUserRepository::new();
        repo.create(user_with("Alice", "Smith", "alice@example.com"))
            .await
            .unwrap();
        repo.create(user_with("Bob", "Alison", "bob@example.com"))
            .await
            .unwrap();
        repo.create(user_with("Carol", "Jones", "carol@aliens.net"))
            .await
            .unwrap();
        repo.create(user_with("Dave", "Jones", "dave@example.com"))
            .await
            .unwrap();

        let (items, total) = repo.search(&page(1, 10, &[], Some("ali"))).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(items.len(), 3);
    }

    #[tokio::test]
    async fn test_list_sorts_with_tie_break() {
        let repo = InMemoryUserRepository::new();
        repo.create(user_with("Zoe", "Adams", "zoe@example.com"))
            .await
            .unwrap();
        repo.create(user_with("Amy", "Adams", "amy@example.com"))
            .await
            .unwrap();
        repo.create(user_with("Ben", "Young", "ben@example.com"))
            .await
            .unwrap();

        let (items, _) = repo
            .list(&page(1, 10, &["lastName:asc", "firstName:desc"], None))
            .await
            .unwrap();
        let names: Vec<&str> = items.iter().map(|u| u.first_name.as_str()).collect();
        assert_eq!(names, vec!["Zoe", "Amy", "Ben"]);
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_sort_field() {
        let repo = InMemoryUserRepository::seeded(3);
        let result = repo.list(&page(1, 10, &["password:asc"], None)).await;
        assert!(matches!(result, Err(UserError::InvalidSortField(_))));
    }

    #[tokio::test]
    async fn test_paging_past_last_page_is_empty() {
        let repo = InMemoryUserRepository::seeded(5);

        let (items, total) = repo.list(&page(2, 2, &[], None)).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(items.len(), 2);

        let (items, total) = repo.list(&page(4, 2, &[], None)).await.unwrap();
        assert_eq!(total, 5);
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_seeded_repository_is_deterministic() {
        let repo = InMemoryUserRepository::seeded(3);
        let (items, total) = repo
            .list(&page(1, 10, &["email:asc"], None))
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(items[0].email, "user1@example.com");
        assert_eq!(items[2].email, "user3@example.com");
    }
}
