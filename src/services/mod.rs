pub mod circuit_breaker;
pub mod payment;
