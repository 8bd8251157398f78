//! One-shot provisioning tool: creates (or reuses) a user by email, mints
//! an API key for them, and prints the key once. The key is stored hashed;
//! there is no way to recover it later.
//!
//! Usage: `provision <email> [key-name]`

use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let mut args = std::env::args().skip(1);
    let email = args.next().expect("usage: provision <email> [key-name]");
    let key_name = args.next().unwrap_or_else(|| "default".to_string());

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&pool)
        .await
        .expect("Failed to look up user");

    let user_id = match existing {
        Some(id) => id,
        None => {
            let id = Uuid::now_v7();
            sqlx::query("INSERT INTO users (id, email) VALUES ($1, $2)")
                .bind(id)
                .bind(&email)
                .execute(&pool)
                .await
                .expect("Failed to create user");
            id
        }
    };

    let (key, key_hash) = daybook_core::auth::generate_api_key();
    let prefix = daybook_core::auth::key_prefix(&key);

    sqlx::query(
        "INSERT INTO api_keys (id, user_id, key_hash, key_prefix, name) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(Uuid::now_v7())
    .bind(user_id)
    .bind(&key_hash)
    .bind(&prefix)
    .bind(&key_name)
    .execute(&pool)
    .await
    .expect("Failed to store API key");

    println!("user:   {user_id} <{email}>");
    println!("key:    {key}");
    println!("prefix: {prefix}");
}
