//! Shared test fixtures: a seeded shop database and a temp data root

use std::path::Path;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Ids seeded by [`seed_shop_fixture`]
#[allow(dead_code)] // not every test binary reads every id
pub struct ShopFixture {
    pub customers: Vec<Uuid>,
    pub products: Vec<Uuid>,
    pub category: Uuid,
    /// Customer id referenced by one interaction but absent from customers
    pub dangling_customer: Uuid,
}

/// Create the shop schema in a fresh sqlite file under `dir`
pub async fn setup_source_db(dir: &Path) -> SqlitePool {
    let db_path = dir.join("shop.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await
        .expect("Should create test database");

    for ddl in [
        "CREATE TABLE interactions (
            id TEXT PRIMARY KEY,
            customer_id TEXT NOT NULL,
            product_id TEXT NOT NULL,
            interaction_type INTEGER NOT NULL
        )",
        "CREATE TABLE customers (
            id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT NOT NULL
        )",
        "CREATE TABLE products (
            id TEXT PRIMARY KEY,
            product_name TEXT NOT NULL,
            price REAL NOT NULL,
            image_url TEXT NOT NULL,
            description TEXT NOT NULL,
            category_id TEXT NOT NULL,
            available_quantity INTEGER NOT NULL
        )",
        "CREATE TABLE product_categories (
            id TEXT PRIMARY KEY,
            category_name TEXT NOT NULL,
            category_code INTEGER NOT NULL
        )",
    ] {
        sqlx::query(ddl).execute(&pool).await.expect("Should create schema");
    }

    pool
}

/// Seed the end-to-end scenario: 3 customers, 3 products, 1 category and
/// 5 interactions, one of which references a customer that does not exist.
pub async fn seed_shop_fixture(pool: &SqlitePool) -> ShopFixture {
    let customers: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    let products: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    let category = Uuid::new_v4();
    let dangling_customer = Uuid::new_v4();

    sqlx::query("INSERT INTO product_categories (id, category_name, category_code) VALUES (?, ?, ?)")
        .bind(category.to_string())
        .bind("Fruits")
        .bind(1_i64)
        .execute(pool)
        .await
        .unwrap();

    for (i, id) in customers.iter().enumerate() {
        sqlx::query(
            "INSERT INTO customers (id, first_name, last_name, email, phone)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(format!("First{i}"))
        .bind(format!("Last{i}"))
        .bind(format!("customer{i}@example.com"))
        .bind(format!("+94000000{i}"))
        .execute(pool)
        .await
        .unwrap();
    }

    for (i, id) in products.iter().enumerate() {
        sqlx::query(
            "INSERT INTO products
             (id, product_name, price, image_url, description, category_id, available_quantity)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(format!("Product {i}"))
        .bind(1.99 + i as f64)
        .bind(format!("https://img.example.com/{i}.png"))
        .bind(format!("Description of product {i}"))
        .bind(category.to_string())
        .bind(100_i64)
        .execute(pool)
        .await
        .unwrap();
    }

    // click / save / click / save, plus one interaction with a dangling
    // customer reference that the join must drop
    let interactions = [
        (customers[0], products[0], 1_i64),
        (customers[1], products[1], 2),
        (customers[2], products[2], 1),
        (customers[0], products[1], 2),
        (dangling_customer, products[0], 1),
    ];
    for (customer_id, product_id, interaction_type) in interactions {
        sqlx::query(
            "INSERT INTO interactions (id, customer_id, product_id, interaction_type)
             VALUES (?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(customer_id.to_string())
        .bind(product_id.to_string())
        .bind(interaction_type)
        .execute(pool)
        .await
        .unwrap();
    }

    ShopFixture {
        customers,
        products,
        category,
        dangling_customer,
    }
}
