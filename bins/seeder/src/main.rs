//! Database seeder for Telbill development and testing.
//!
//! Seeds an admin operator, demo subscribers, and a month of usage so a
//! fresh environment has bills to calculate against.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

use telbill_core::auth::hash_password;
use telbill_db::{SubscriberRepository, UsageRepository, UserRepository};
use telbill_shared::types::BillingPeriod;

const ADMIN_EMAIL: &str = "admin@telbill.dev";
const ADMIN_PASSWORD: &str = "admin123";

/// Demo subscribers with (phone minutes, internet MB) for this month.
const DEMO_USAGE: &[(&str, i64, i64)] = &[
    ("5551111111", 2500, 25600),
    ("5552222222", 800, 10240),
    ("5553333333", 1001, 0),
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = Arc::new(
        telbill_db::connect(&database_url)
            .await
            .expect("Failed to connect to database"),
    );

    println!("Seeding admin user...");
    seed_admin(&db).await;

    println!("Seeding demo subscribers and usage...");
    seed_usage(&db).await;

    println!("Seeding complete!");
}

async fn seed_admin(db: &Arc<DatabaseConnection>) {
    let users = UserRepository::new(db.clone());

    if users
        .find_by_email(ADMIN_EMAIL)
        .await
        .expect("Failed to query users")
        .is_some()
    {
        println!("  Admin user already exists, skipping...");
        return;
    }

    let hash = hash_password(ADMIN_PASSWORD).expect("Failed to hash admin password");
    let user = users
        .create_user(ADMIN_EMAIL, &hash, "admin")
        .await
        .expect("Failed to create admin user");
    println!("  Created admin user {} ({})", user.email, user.id);
}

async fn seed_usage(db: &Arc<DatabaseConnection>) {
    let subscribers = SubscriberRepository::new(db.clone());
    let usage = UsageRepository::new(db.clone());

    let now = Utc::now();
    #[allow(clippy::cast_possible_wrap)]
    let period = BillingPeriod::new(now.month() as i32, now.year()).expect("current period");

    for &(subscriber_no, phone_minutes, internet_mb) in DEMO_USAGE {
        subscribers
            .ensure_exists(subscriber_no)
            .await
            .expect("Failed to seed subscriber");
        usage
            .record_usage(subscriber_no, period, phone_minutes, Decimal::from(internet_mb))
            .await
            .expect("Failed to seed usage");
        println!("  {subscriber_no}: {phone_minutes} min, {internet_mb} MB in {period}");
    }
}
