use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{certificates, contact_messages, profile, projects};

pub mod migrator;
pub mod repositories;

pub use repositories::account::Account;
pub use repositories::certificate::NewCertificate;
pub use repositories::contact::NewMessage;
pub use repositories::profile::ProfileUpdate;
pub use repositories::project::NewProject;

use crate::entities::accounts::Role;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Every sqlite :memory: connection is its own database, so the pool
        // must stay at a single connection for in-memory use.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn account_repo(&self) -> repositories::account::AccountRepository {
        repositories::account::AccountRepository::new(self.conn.clone())
    }

    fn profile_repo(&self) -> repositories::profile::ProfileRepository {
        repositories::profile::ProfileRepository::new(self.conn.clone())
    }

    fn project_repo(&self) -> repositories::project::ProjectRepository {
        repositories::project::ProjectRepository::new(self.conn.clone())
    }

    fn certificate_repo(&self) -> repositories::certificate::CertificateRepository {
        repositories::certificate::CertificateRepository::new(self.conn.clone())
    }

    fn contact_repo(&self) -> repositories::contact::ContactRepository {
        repositories::contact::ContactRepository::new(self.conn.clone())
    }

    // ========== Accounts ==========

    pub async fn get_account(&self, id: i32) -> Result<Option<Account>> {
        self.account_repo().get_by_id(id).await
    }

    pub async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.account_repo().get_by_email(email).await
    }

    pub async fn create_account(
        &self,
        email: &str,
        name: &str,
        password: &str,
        role: Role,
        config: &SecurityConfig,
    ) -> Result<Account> {
        self.account_repo()
            .create(email, name, password, role, config)
            .await
    }

    pub async fn verify_account_password(&self, email: &str, password: &str) -> Result<bool> {
        self.account_repo().verify_password(email, password).await
    }

    pub async fn update_account_password(
        &self,
        email: &str,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        self.account_repo()
            .update_password(email, new_password, config)
            .await
    }

    pub async fn record_account_login(&self, id: i32) -> Result<()> {
        self.account_repo().record_login(id).await
    }

    // ========== Profile ==========

    pub async fn get_profile(&self) -> Result<profile::Model> {
        self.profile_repo().get_or_create().await
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<profile::Model> {
        self.profile_repo().upsert(update).await
    }

    // ========== Projects ==========

    pub async fn list_projects(&self) -> Result<Vec<projects::Model>> {
        self.project_repo().list().await
    }

    pub async fn create_project(&self, input: NewProject) -> Result<projects::Model> {
        self.project_repo().create(input).await
    }

    pub async fn delete_project(&self, id: i32) -> Result<bool> {
        self.project_repo().delete(id).await
    }

    // ========== Certificates ==========

    pub async fn list_certificates(&self) -> Result<Vec<certificates::Model>> {
        self.certificate_repo().list().await
    }

    pub async fn create_certificate(&self, input: NewCertificate) -> Result<certificates::Model> {
        self.certificate_repo().create(input).await
    }

    pub async fn delete_certificate(&self, id: i32) -> Result<bool> {
        self.certificate_repo().delete(id).await
    }

    // ========== Contact messages ==========

    pub async fn add_contact_message(
        &self,
        input: NewMessage,
    ) -> Result<contact_messages::Model> {
        self.contact_repo().add(input).await
    }

    pub async fn list_contact_messages(&self) -> Result<Vec<contact_messages::Model>> {
        self.contact_repo().list().await
    }

    pub async fn delete_contact_message(&self, id: i32) -> Result<bool> {
        self.contact_repo().delete(id).await
    }
}
