use argon2::{
    Argon2, PasswordHasher,
    password_hash::{rand_core::OsRng, SaltString},
};
use rust_decimal_macros::dec;
use storefront_api::{
    config::AppConfig,
    db::create_pool,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_admin(&pool, "admin@example.com", "admin123").await?;
    let user_id = ensure_user(&pool, "user@example.com", "user123").await?;
    seed_taxonomy(&pool).await?;
    seed_products(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_admin(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    ensure_user_with_role(pool, email, password, "admin").await
}

async fn ensure_user(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    ensure_user_with_role(pool, email, password, "user").await
}

async fn ensure_user_with_role(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_taxonomy(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let categories = [
        ("Smartphones", "smartphones"),
        ("Laptops & Computers", "laptops-computers"),
        ("Tablets & iPads", "tablets-ipads"),
        ("Accessories", "accessories"),
        ("Audio", "audio"),
    ];
    for (name, slug) in categories {
        sqlx::query(
            "INSERT INTO categories (id, name, slug) VALUES ($1, $2, $3) ON CONFLICT (name) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slug)
        .execute(pool)
        .await?;
    }

    let brands = [
        ("Apple", "apple"),
        ("Samsung", "samsung"),
        ("Xiaomi", "xiaomi"),
        ("HP", "hp"),
    ];
    for (name, slug) in brands {
        sqlx::query(
            "INSERT INTO brands (id, name, slug) VALUES ($1, $2, $3) ON CONFLICT (name) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slug)
        .execute(pool)
        .await?;
    }

    let options: &[(&str, &str)] = &[
        ("ram", "4GB"),
        ("ram", "8GB"),
        ("ram", "16GB"),
        ("storage", "128GB"),
        ("storage", "256GB"),
        ("storage", "512GB"),
        ("color", "Black"),
        ("color", "Silver"),
        ("color", "Blue"),
    ];
    for (kind, value) in options {
        sqlx::query(
            "INSERT INTO global_options (id, kind, value) VALUES ($1, $2, $3) ON CONFLICT (kind, value) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(kind)
        .bind(value)
        .execute(pool)
        .await?;
    }

    println!("Seeded taxonomy");
    Ok(())
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let products = vec![
        ("Galaxy A16", "galaxy-a16", "Entry-level workhorse", dec!(18500.00), dec!(0), 24),
        ("iPhone 13", "iphone-13", "Ex-Dubai, mint condition", dec!(62000.00), dec!(5), 10),
        ("Redmi Note 13", "redmi-note-13", "Best seller this quarter", dec!(24000.00), dec!(10), 40),
        ("EliteBook 840 G8", "elitebook-840-g8", "Refurbished business laptop", dec!(58000.00), dec!(0), 6),
    ];

    for (title, slug, desc, price, discount, stock) in products {
        let final_price = price * (dec!(100) - discount) / dec!(100);
        sqlx::query(
            r#"
            INSERT INTO products (id, title, slug, description, price, discount, final_price, stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(slug)
        .bind(desc)
        .bind(price)
        .bind(discount)
        .bind(final_price)
        .bind(stock)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
