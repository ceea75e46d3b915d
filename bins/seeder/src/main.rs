//! Database seeder for Centavo development and testing.
//!
//! Seeds a demo user plus a representative month of transactions: plain
//! income and expenses, an installment purchase, and a recurring template.
//!
//! Usage: cargo run --bin seeder

use chrono::{Datelike, NaiveDate, Utc};
use uuid::Uuid;

use centavo_core::auth::hash_password;
use centavo_core::transaction::{NewTransaction, NewTransactionKind, RecurrencePattern};
use centavo_db::repositories::{TransactionRepository, UserRepository};
use centavo_shared::types::{Cents, UserId};

/// Demo account credentials for local development.
const DEMO_EMAIL: &str = "demo@centavo.dev";
const DEMO_PASSWORD: &str = "demo-password";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = centavo_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding demo user...");
    let user_id = seed_demo_user(&db).await;

    println!("Seeding sample transactions...");
    seed_sample_transactions(&db, user_id).await;

    println!("Seeding complete!");
}

/// Seeds the demo user, returning its id.
async fn seed_demo_user(db: &sea_orm::DatabaseConnection) -> Uuid {
    let repo = UserRepository::new(db.clone());

    if let Ok(Some(existing)) = repo.find_by_email(DEMO_EMAIL).await {
        println!("  Demo user already exists, skipping...");
        return existing.id;
    }

    let password_hash = hash_password(DEMO_PASSWORD).expect("Failed to hash demo password");
    let user = repo
        .create(DEMO_EMAIL, &password_hash, "Demo User")
        .await
        .expect("Failed to insert demo user");
    println!("  Created demo user: {DEMO_EMAIL}");
    user.id
}

/// Seeds one month of representative records for the demo user.
async fn seed_sample_transactions(db: &sea_orm::DatabaseConnection, user_id: Uuid) {
    let repo = TransactionRepository::new(db.clone());
    let today = Utc::now().date_naive();
    let first_of_month = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
        .expect("first of current month");
    let owner = UserId::from_uuid(user_id);

    let samples = vec![
        NewTransaction {
            user_id: owner,
            description: "Salary".to_string(),
            amount_in_cents: Cents::new(750_000),
            date: first_of_month,
            due_date: None,
            kind: NewTransactionKind::Income,
        },
        NewTransaction {
            user_id: owner,
            description: "Groceries".to_string(),
            amount_in_cents: Cents::new(62_350),
            date: first_of_month,
            due_date: None,
            kind: NewTransactionKind::Expense,
        },
        NewTransaction {
            user_id: owner,
            description: "Rent".to_string(),
            amount_in_cents: Cents::new(180_000),
            date: first_of_month,
            due_date: None,
            kind: NewTransactionKind::Recurring {
                pattern: RecurrencePattern::Monthly,
            },
        },
        NewTransaction {
            user_id: owner,
            description: "Notebook".to_string(),
            amount_in_cents: Cents::new(50_000),
            date: first_of_month,
            due_date: None,
            kind: NewTransactionKind::Installment {
                total_installments: 10,
            },
        },
    ];

    for input in samples {
        let description = input.description.clone();
        match repo.create(input).await {
            Ok(created) => {
                if created.installments.is_empty() {
                    println!("  Created {description}");
                } else {
                    println!(
                        "  Created {description} ({} installments)",
                        created.installments.len()
                    );
                }
            }
            Err(e) => eprintln!("  Failed to create {description}: {e}"),
        }
    }
}
