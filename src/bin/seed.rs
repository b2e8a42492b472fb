// Seeds the catalog with 100 products, 3 properties each.
// Usage: cargo run --bin seed (reads DATABASE_URL from the environment or .env)

use sqlx::postgres::PgPoolOptions;

const PRODUCT_COUNT: i64 = 100;
const PROPS_PER_PRODUCT: usize = 3;

const PROP_NAMES: [&str; 6] = ["color", "size", "material", "weight", "origin", "finish"];
const PROP_VALUES: [&str; 6] = ["red", "large", "steel", "heavy", "domestic", "matte"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL")?;
    let pool = PgPoolOptions::new().connect(&database_url).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    for n in 1..=PRODUCT_COUNT {
        let product_id: i64 = sqlx::query_scalar(
            "INSERT INTO products (name, price, count) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(format!("Product {}", n))
        .bind(n * 100)
        .bind((n % 50) as i32)
        .fetch_one(&pool)
        .await?;

        for k in 0..PROPS_PER_PRODUCT {
            let idx = (n as usize + k) % PROP_NAMES.len();
            sqlx::query("INSERT INTO product_props (product_id, name, value) VALUES ($1, $2, $3)")
                .bind(product_id)
                .bind(PROP_NAMES[idx])
                .bind(PROP_VALUES[(idx + k) % PROP_VALUES.len()])
                .execute(&pool)
                .await?;
        }
    }

    tracing::info!(
        "Seeded {} products with {} properties each",
        PRODUCT_COUNT,
        PROPS_PER_PRODUCT
    );
    Ok(())
}
