use dotenv::dotenv;
use std::env;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

#[derive(Clone)]
pub struct Config {
    pub allowed_origins: String,
    pub app_name: String,
    pub api_host: String,
    pub api_port: String,
    pub api_base_url: String,
    pub front_end_url: String,
    pub database_url: String,
    pub connection_pool: ConnectionPoolConfig,
    pub environment: Environment,
    pub primary_currency: String,
    pub cashfree_app_id: String,
    pub cashfree_secret_key: String,
    pub cashfree_base_url: String,
    pub cashfree_webhook_secret: String,
    pub http_workers: Option<usize>,
}

#[derive(Clone)]
pub struct ConnectionPoolConfig {
    pub min: u32,
    pub max: u32,
}

const ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";
const APP_NAME: &str = "APP_NAME";
const API_HOST: &str = "API_HOST";
const API_PORT: &str = "API_PORT";
const API_BASE_URL: &str = "API_BASE_URL";
const FRONT_END_URL: &str = "FRONT_END_URL";
const DATABASE_URL: &str = "DATABASE_URL";
const TEST_DATABASE_URL: &str = "TEST_DATABASE_URL";
const CONNECTION_POOL_MIN: &str = "CONNECTION_POOL_MIN";
const CONNECTION_POOL_MAX: &str = "CONNECTION_POOL_MAX";
const PRIMARY_CURRENCY: &str = "PRIMARY_CURRENCY";
const CASHFREE_APP_ID: &str = "CASHFREE_APP_ID";
const CASHFREE_SECRET_KEY: &str = "CASHFREE_SECRET_KEY";
const CASHFREE_BASE_URL: &str = "CASHFREE_BASE_URL";
const CASHFREE_WEBHOOK_SECRET: &str = "CASHFREE_WEBHOOK_SECRET";
const HTTP_WORKERS: &str = "HTTP_WORKERS";

impl Config {
    pub fn new(environment: Environment) -> Self {
        dotenv().ok();

        let app_name = env::var(&APP_NAME).unwrap_or_else(|_| "Stride".to_string());

        let database_url = match environment {
            Environment::Test => {
                env::var(&TEST_DATABASE_URL).unwrap_or_else(|_| panic!("{} must be defined.", TEST_DATABASE_URL))
            }
            _ => env::var(&DATABASE_URL).unwrap_or_else(|_| panic!("{} must be defined.", DATABASE_URL)),
        };

        let connection_pool = ConnectionPoolConfig {
            min: parse_env(CONNECTION_POOL_MIN, 1),
            max: parse_env(CONNECTION_POOL_MAX, 20),
        };

        let allowed_origins = env::var(&ALLOWED_ORIGINS).unwrap_or_else(|_| "*".to_string());
        let api_host = env::var(&API_HOST).unwrap_or_else(|_| "127.0.0.1".to_string());
        let api_port = env::var(&API_PORT).unwrap_or_else(|_| "8088".to_string());
        let api_base_url =
            env::var(&API_BASE_URL).unwrap_or_else(|_| format!("http://{}:{}", api_host, api_port));
        let front_end_url =
            env::var(&FRONT_END_URL).unwrap_or_else(|_| panic!("{} must be defined.", FRONT_END_URL));

        let primary_currency = env::var(&PRIMARY_CURRENCY).unwrap_or_else(|_| "INR".to_string());

        let cashfree_app_id =
            env::var(&CASHFREE_APP_ID).unwrap_or_else(|_| panic!("{} must be defined.", CASHFREE_APP_ID));
        let cashfree_secret_key =
            env::var(&CASHFREE_SECRET_KEY).unwrap_or_else(|_| panic!("{} must be defined.", CASHFREE_SECRET_KEY));
        let cashfree_base_url =
            env::var(&CASHFREE_BASE_URL).unwrap_or_else(|_| "https://sandbox.cashfree.com/pg".to_string());
        let cashfree_webhook_secret = env::var(&CASHFREE_WEBHOOK_SECRET)
            .unwrap_or_else(|_| panic!("{} must be defined.", CASHFREE_WEBHOOK_SECRET));

        let http_workers = env::var(&HTTP_WORKERS).ok().map(|s| {
            s.parse()
                .unwrap_or_else(|_| panic!("{} is not a valid number", HTTP_WORKERS))
        });

        Config {
            allowed_origins,
            app_name,
            api_host,
            api_port,
            api_base_url,
            front_end_url,
            database_url,
            connection_pool,
            environment,
            primary_currency,
            cashfree_app_id,
            cashfree_secret_key,
            cashfree_base_url,
            cashfree_webhook_secret,
            http_workers,
        }
    }

    /// Where the gateway sends the registrant back after the hosted
    /// checkout, carrying the nonce so the bare link is not guessable.
    pub fn payment_callback_url(&self, nonce: &str, payment_id: uuid::Uuid) -> String {
        format!("{}/payments/callback/{}/{}", self.api_base_url, nonce, payment_id)
    }

    pub fn webhook_url(&self) -> String {
        format!("{}/webhooks/cashfree", self.api_base_url)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(s) => s
            .parse()
            .unwrap_or_else(|_| panic!("{} is not a valid number", name)),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_and_webhook_urls() {
        let config = Config {
            allowed_origins: "*".to_string(),
            app_name: "Stride".to_string(),
            api_host: "127.0.0.1".to_string(),
            api_port: "8088".to_string(),
            api_base_url: "https://api.stride.run".to_string(),
            front_end_url: "https://stride.run".to_string(),
            database_url: "postgres://localhost/stride".to_string(),
            connection_pool: ConnectionPoolConfig { min: 1, max: 2 },
            environment: Environment::Test,
            primary_currency: "INR".to_string(),
            cashfree_app_id: "app".to_string(),
            cashfree_secret_key: "secret".to_string(),
            cashfree_base_url: "https://sandbox.cashfree.com/pg".to_string(),
            cashfree_webhook_secret: "whsecret".to_string(),
            http_workers: None,
        };
        let id = uuid::Uuid::nil();
        assert_eq!(
            config.payment_callback_url("abc123", id),
            format!("https://api.stride.run/payments/callback/abc123/{}", id)
        );
        assert_eq!(config.webhook_url(), "https://api.stride.run/webhooks/cashfree");
    }
}
