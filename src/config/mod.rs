use serde::Deserialize;
use uuid::Uuid;

use crate::models::PaymentMethod;

const ENV_PREFIX: &str = "BOOKING";

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub api: ApiConfig,
    pub booking: BookingConfig,
    pub circuit_breaker: CircuitBreakerConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub environment: String,
    pub rust_log: String,
    pub log_json: bool,
}

// Настройки доступа к бэкенду
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Пользователь, от имени которого держатся места и идёт оплата.
    pub user_id: Uuid,
}

// Настройки бронирования
#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfig {
    /// Используется, если спектакль не задал свой лимит.
    pub default_max_reservation_count: u32,
    pub payment_method: PaymentMethod,
}

// Настройки Circuit Breaker
#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub timeout_seconds: u64,
}

impl Config {
    /// Значения по умолчанию, затем `booking.toml` (если есть), затем переменные
    /// окружения вида `BOOKING_API__BASE_URL`.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::from_env_source(Self::env_source())
    }

    pub(crate) fn env_source() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    pub(crate) fn from_env_source(env: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("app.environment", "development")?
            .set_default("app.rust_log", "seat_booking=debug")?
            .set_default("app.log_json", false)?
            .set_default("api.base_url", "http://localhost:8080/api/v1")?
            .set_default("api.timeout_seconds", 30_i64)?
            .set_default("api.user_id", "11111111-2222-3333-4444-555555555555")?
            .set_default("booking.default_max_reservation_count", 10_i64)?
            .set_default("booking.payment_method", "CREDIT_CARD")?
            .set_default("circuit_breaker.failure_threshold", 5_i64)?
            .set_default("circuit_breaker.timeout_seconds", 60_i64)?
            .add_source(config::File::with_name("booking").required(false))
            .add_source(env)
            .build()?
            .try_deserialize()
    }
}
