use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub database_url: String,
    pub jwt_secret: String,

    // External collaborators
    pub user_svc_url: String,
    pub notify_url: String,
    pub manager_email: String,

    // Rate limiting
    pub rate_protected_per_min: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),

            user_svc_url: env::var("USER_SVC_URL")
                .unwrap_or_else(|_| "http://user_service:5000".to_string()),
            notify_url: env::var("NOTIFY_URL")
                .unwrap_or_else(|_| "http://notification_service:5002".to_string()),
            manager_email: env::var("MANAGER_EMAIL")
                .unwrap_or_else(|_| "manager@example.com".to_string()),

            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),
        }
    }
}
