use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ConnectionTrait, DbBackend, FromQueryResult, Statement, TransactionTrait};
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{Address, User, UserDetail, UserSummary};
use crate::query::{PageRequest, Projection, SqlQuery, UserSearchQuery};
use crate::repository::UserRepository;

/// PostgreSQL implementation of UserRepository using SeaORM raw statements.
///
/// Enums are stored as lowercase text; addresses live in their own table and
/// are replaced wholesale when their owner is updated.
#[derive(Clone)]
pub struct PostgresUserRepository {
    db: sea_orm::DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: sea_orm::DatabaseConnection) -> Self {
        Self { db }
    }
}

fn storage_err(e: impl std::fmt::Display) -> UserError {
    UserError::Storage(format!("Database error: {}", e))
}

fn map_write_err(e: sea_orm::DbErr, email: &str) -> UserError {
    let err_str = e.to_string();
    if err_str.contains("duplicate key") || err_str.contains("unique constraint") {
        UserError::DuplicateEmail(email.to_string())
    } else {
        storage_err(e)
    }
}

fn stmt(query: &SqlQuery) -> Statement {
    Statement::from_sql_and_values(DbBackend::Postgres, &query.sql, query.values.clone())
}

/// Helper struct for deserializing user rows from the database
#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    date_of_birth: NaiveDate,
    gender: String,
    username: String,
    password_hash: String,
    status: String,
    user_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, addresses: Vec<Address>) -> UserResult<User> {
        Ok(User {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            date_of_birth: self.date_of_birth,
            gender: self
                .gender
                .parse()
                .map_err(|_| storage_err(format!("unknown gender '{}'", self.gender)))?,
            username: self.username,
            password_hash: self.password_hash,
            status: self
                .status
                .parse()
                .map_err(|_| storage_err(format!("unknown status '{}'", self.status)))?,
            user_type: self
                .user_type
                .parse()
                .map_err(|_| storage_err(format!("unknown user type '{}'", self.user_type)))?,
            addresses,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromQueryResult)]
struct DetailRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    date_of_birth: NaiveDate,
    gender: String,
    username: String,
    status: String,
    user_type: String,
}

impl DetailRow {
    fn into_detail(self) -> UserResult<UserDetail> {
        Ok(UserDetail {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            date_of_birth: self.date_of_birth,
            gender: self
                .gender
                .parse()
                .map_err(|_| storage_err(format!("unknown gender '{}'", self.gender)))?,
            username: self.username,
            status: self
                .status
                .parse()
                .map_err(|_| storage_err(format!("unknown status '{}'", self.status)))?,
            user_type: self
                .user_type
                .parse()
                .map_err(|_| storage_err(format!("unknown user type '{}'", self.user_type)))?,
        })
    }
}

#[derive(Debug, FromQueryResult)]
struct SummaryRow {
    id: Uuid,
    first_name: String,
    last_name: String,
}

impl From<SummaryRow> for UserSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct AddressRow {
    apartment_number: String,
    floor: String,
    building: String,
    street_number: String,
    street: String,
    city: String,
    country: String,
    address_type: i32,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            apartment_number: row.apartment_number,
            floor: row.floor,
            building: row.building,
            street_number: row.street_number,
            street: row.street,
            city: row.city,
            country: row.country,
            address_type: row.address_type,
        }
    }
}

impl PostgresUserRepository {
    async fn addresses_of<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
    ) -> UserResult<Vec<Address>> {
        let sql = r#"
            SELECT apartment_number, floor, building, street_number, street, city, country, address_type
            FROM addresses WHERE user_id = $1 ORDER BY id
        "#;

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [user_id.into()]);

        let rows = AddressRow::find_by_statement(stmt)
            .all(conn)
            .await
            .map_err(storage_err)?;

        Ok(rows.into_iter().map(Address::from).collect())
    }

    async fn insert_addresses<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        addresses: &[Address],
    ) -> UserResult<()> {
        let sql = r#"
            INSERT INTO addresses (user_id, apartment_number, floor, building, street_number, street, city, country, address_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#;

        for address in addresses {
            let stmt = Statement::from_sql_and_values(
                DbBackend::Postgres,
                sql,
                [
                    user_id.into(),
                    address.apartment_number.clone().into(),
                    address.floor.clone().into(),
                    address.building.clone().into(),
                    address.street_number.clone().into(),
                    address.street.clone().into(),
                    address.city.clone().into(),
                    address.country.clone().into(),
                    address.address_type.into(),
                ],
            );
            conn.execute_raw(stmt).await.map_err(storage_err)?;
        }

        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let sql = r#"
            INSERT INTO users (id, first_name, last_name, email, phone, date_of_birth,
                               gender, username, password_hash, status, user_type,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#;

        let txn = self.db.begin().await.map_err(storage_err)?;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.first_name.clone().into(),
                user.last_name.clone().into(),
                user.email.clone().into(),
                user.phone.clone().into(),
                user.date_of_birth.into(),
                user.gender.to_string().into(),
                user.username.clone().into(),
                user.password_hash.clone().into(),
                user.status.to_string().into(),
                user.user_type.to_string().into(),
                user.created_at.into(),
                user.updated_at.into(),
            ],
        );

        txn.execute_raw(stmt)
            .await
            .map_err(|e| map_write_err(e, &user.email))?;

        self.insert_addresses(&txn, user.id, &user.addresses).await?;

        txn.commit().await.map_err(storage_err)?;

        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let sql = "SELECT * FROM users WHERE id = $1";

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(storage_err)?;

        match row {
            Some(row) => {
                let addresses = self.addresses_of(&self.db, id).await?;
                Ok(Some(row.into_user(addresses)?))
            }
            None => Ok(None),
        }
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let sql = r#"
            UPDATE users
            SET first_name = $2, last_name = $3, email = $4, phone = $5,
                date_of_birth = $6, gender = $7, username = $8, password_hash = $9,
                status = $10, user_type = $11, updated_at = $12
            WHERE id = $1
        "#;

        let txn = self.db.begin().await.map_err(storage_err)?;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.first_name.clone().into(),
                user.last_name.clone().into(),
                user.email.clone().into(),
                user.phone.clone().into(),
                user.date_of_birth.into(),
                user.gender.to_string().into(),
                user.username.clone().into(),
                user.password_hash.clone().into(),
                user.status.to_string().into(),
                user.user_type.to_string().into(),
                user.updated_at.into(),
            ],
        );

        let result = txn
            .execute_raw(stmt)
            .await
            .map_err(|e| map_write_err(e, &user.email))?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(user.id));
        }

        // Address set is replaced wholesale
        let delete_stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM addresses WHERE user_id = $1",
            [user.id.into()],
        );
        txn.execute_raw(delete_stmt).await.map_err(storage_err)?;

        self.insert_addresses(&txn, user.id, &user.addresses).await?;

        txn.commit().await.map_err(storage_err)?;

        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        // addresses cascade via the user_id foreign key
        let sql = "DELETE FROM users WHERE id = $1";

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let result = self.db.execute_raw(stmt).await.map_err(storage_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let sql = "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1) as exists";

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [email.into()]);

        #[derive(FromQueryResult)]
        struct ExistsResult {
            exists: bool,
        }

        let result = ExistsResult::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(storage_err)?;

        Ok(result.map(|r| r.exists).unwrap_or(false))
    }

    async fn list(&self, request: &PageRequest) -> UserResult<(Vec<UserDetail>, u64)> {
        let query = UserSearchQuery::build(request, Projection::Detail)?;

        // Count and data run on separate connections; a write landing between
        // them can skew total_pages by one, which we accept.
        let (rows, total) = tokio::join!(
            DetailRow::find_by_statement(stmt(&query.data)).all(&self.db),
            self.count(&query.count),
        );

        let details = rows
            .map_err(storage_err)?
            .into_iter()
            .map(DetailRow::into_detail)
            .collect::<UserResult<Vec<_>>>()?;

        Ok((details, total?))
    }

    async fn search(&self, request: &PageRequest) -> UserResult<(Vec<UserSummary>, u64)> {
        let query = UserSearchQuery::build(request, Projection::Summary)?;

        let (rows, total) = tokio::join!(
            SummaryRow::find_by_statement(stmt(&query.data)).all(&self.db),
            self.count(&query.count),
        );

        let summaries = rows
            .map_err(storage_err)?
            .into_iter()
            .map(UserSummary::from)
            .collect();

        Ok((summaries, total?))
    }
}

impl PostgresUserRepository {
    async fn count(&self, query: &SqlQuery) -> UserResult<u64> {
        #[derive(FromQueryResult)]
        struct CountResult {
            total: i64,
        }

        let result = CountResult::find_by_statement(stmt(query))
            .one(&self.db)
            .await
            .map_err(storage_err)?;

        Ok(result.map(|r| r.total as u64).unwrap_or(0))
    }
}
