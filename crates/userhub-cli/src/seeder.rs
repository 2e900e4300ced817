//! Development data seeding.
//!
//! Seeded users get `@example.com` addresses so [`clear_users`] can remove
//! them without touching real accounts.

use std::time::Instant;

use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use sqlx::{PgPool, Postgres, Transaction};
use userhub_core::hash_password;
use userhub_models::{UserId, UserRole};

use crate::CliError;

/// Every seeded account logs in with this password.
pub const SEED_PASSWORD: &str = "password123";

const SEED_EMAIL_DOMAIN: &str = "example.com";

/// One fake user ready to insert.
#[derive(Debug, Clone)]
pub struct UserSeed {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Generates `count` users with unique emails. Every tenth user is an admin.
pub fn generate_users(count: usize, password_hash: &str) -> Vec<UserSeed> {
    (0..count)
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let email = format!(
                "{}.{}+{}@{}",
                first_name.to_lowercase(),
                last_name.to_lowercase(),
                idx,
                SEED_EMAIL_DOMAIN
            );
            let role = if idx % 10 == 0 {
                UserRole::Admin
            } else {
                UserRole::User
            };

            UserSeed {
                first_name,
                last_name,
                email,
                password_hash: password_hash.to_string(),
                role,
            }
        })
        .collect()
}

/// Generates and inserts `count` users, returning their ids.
pub async fn seed_users(db: &PgPool, count: usize) -> Result<Vec<UserId>, CliError> {
    let start_time = Instant::now();
    println!("👥 Seeding {} users...", count);

    // Hash once; bcrypt per user would dominate the run time.
    let password_hash =
        hash_password(SEED_PASSWORD).map_err(|e| format!("Failed to hash password: {}", e.error))?;
    let users = generate_users(count, &password_hash);
    let ids = insert_users_batch(db, &users).await?;

    println!(
        "   ✓ Inserted {} users in {:?} (password: {})",
        ids.len(),
        start_time.elapsed(),
        SEED_PASSWORD
    );

    Ok(ids)
}

/// Inserts users in chunks inside one transaction.
pub async fn insert_users_batch(db: &PgPool, users: &[UserSeed]) -> Result<Vec<UserId>, CliError> {
    let mut tx = db.begin().await?;

    // 5 params per user, well under the 65535 bind limit
    const BATCH_SIZE: usize = 1000;

    let mut all_ids = Vec::with_capacity(users.len());
    for chunk in users.chunks(BATCH_SIZE) {
        all_ids.extend(insert_users_chunk(&mut tx, chunk).await?);
    }

    tx.commit().await?;
    Ok(all_ids)
}

async fn insert_users_chunk(
    tx: &mut Transaction<'_, Postgres>,
    users: &[UserSeed],
) -> Result<Vec<UserId>, CliError> {
    if users.is_empty() {
        return Ok(Vec::new());
    }

    let query = insert_users_sql(users.len());

    let mut q = sqlx::query_scalar(&query);
    for user in users {
        q = q
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role);
    }

    let ids: Vec<UserId> = q.fetch_all(&mut **tx).await?;
    Ok(ids)
}

fn insert_users_sql(rows: usize) -> String {
    let mut query =
        String::from("INSERT INTO users (first_name, last_name, email, password, role) VALUES ");

    for i in 0..rows {
        if i > 0 {
            query.push_str(", ");
        }
        let p = i * 5;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${}, ${})",
            p + 1,
            p + 2,
            p + 3,
            p + 4,
            p + 5
        ));
    }

    query.push_str(" ON CONFLICT (email) DO NOTHING RETURNING id");
    query
}

/// Removes seeded users (and their soft-deleted copies).
pub async fn clear_users(db: &PgPool) -> Result<u64, CliError> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded users...");

    let pattern = format!("%@{}", SEED_EMAIL_DOMAIN);
    let mut tx = db.begin().await?;

    let live = sqlx::query("DELETE FROM users WHERE email LIKE $1")
        .bind(&pattern)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    let archived = sqlx::query("DELETE FROM deleted_users WHERE email LIKE $1")
        .bind(&pattern)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;

    println!(
        "   ✓ Deleted {} users and {} deleted-user records in {:?}",
        live,
        archived,
        start_time.elapsed()
    );

    Ok(live + archived)
}
