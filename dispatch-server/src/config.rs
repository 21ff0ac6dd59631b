//! Server configuration, loaded from the environment

use crate::gateway::GatewayConfig;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the redb database file
    pub work_dir: String,
    pub environment: String,
    pub gateway: GatewayConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/dispatch".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            gateway: GatewayConfig {
                pay_url: std::env::var("GATEWAY_PAY_URL")
                    .unwrap_or_else(|_| "https://sandbox.gateway.example/pay".into()),
                merchant_code: std::env::var("GATEWAY_MERCHANT_CODE")
                    .unwrap_or_else(|_| "DISPATCHDEMO".into()),
                secret: std::env::var("GATEWAY_SECRET").unwrap_or_else(|_| "changeme".into()),
                return_url: std::env::var("GATEWAY_RETURN_URL")
                    .unwrap_or_else(|_| "http://localhost:3000/payment/return".into()),
            },
        }
    }

    pub fn db_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("dispatch.redb")
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
