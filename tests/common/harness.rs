//! Postgres-backed harness. One container and one migration run are shared
//! by every test in the binary; each test gets its own pool and app.

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use super::TestApp;

struct SharedDatabase {
    url: String,
    // Keeps the container alive for the whole run.
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_DATABASE: OnceCell<SharedDatabase> = OnceCell::const_new();

impl SharedDatabase {
    async fn init() -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let host = postgres.get_host().await?;
        let port = postgres.get_host_port_ipv4(5432).await?;
        let url = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);

        let pool = PgPool::connect(&url)
            .await
            .context("Failed to connect to Postgres for migrations")?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;
        pool.close().await;

        Ok(Self {
            url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_DATABASE
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test database")
            })
            .await
    }
}

pub struct TestHarness {
    pub db_pool: PgPool,
    pub app: TestApp,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let shared = SharedDatabase::get().await;
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&shared.url)
            .await
            .context("Failed to connect to test database")?;

        Ok(Self {
            app: TestApp::with_pool(db_pool.clone()),
            db_pool,
        })
    }
}
