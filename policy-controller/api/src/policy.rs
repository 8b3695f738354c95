pub mod circuit_breaker;

pub use self::circuit_breaker::Conf as CircuitBreakerConf;
