use std::{env, str::FromStr, time::Duration};

use crate::error::{MrError, Result};

/// Lee `key` del entorno y la parsea; si no está definida devuelve `default`.
/// Un valor presente pero imposible de parsear es un error, no se ignora.
pub fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| MrError::InvalidConfig(format!("{key}={raw:?}: {e}"))),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(e) => Err(MrError::InvalidConfig(format!("{key}: {e}"))),
    }
}

pub fn env_string_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_millis_or(key: &str, default_ms: u64) -> Result<Duration> {
    env_or(key, default_ms).map(Duration::from_millis)
}

pub fn env_secs_or(key: &str, default_secs: u64) -> Result<Duration> {
    env_or(key, default_secs).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    // set_var no es seguro con otros hilos leyendo el entorno: todo lo que
    // toca variables va en este único test.
    #[test]
    fn values_from_environment() {
        let v: usize = env_or("MR_TEST_CONFIG_MISSING", 7).unwrap();
        assert_eq!(v, 7);
        assert_eq!(
            env_secs_or("MR_TEST_CONFIG_SECS_MISSING", 3).unwrap(),
            Duration::from_secs(3)
        );

        env::set_var("MR_TEST_CONFIG_PRESENT", " 42 ");
        let v: usize = env_or("MR_TEST_CONFIG_PRESENT", 7).unwrap();
        assert_eq!(v, 42);

        env::set_var("MR_TEST_CONFIG_GARBAGE", "diez");
        let err = env_or::<usize>("MR_TEST_CONFIG_GARBAGE", 7).unwrap_err();
        assert!(matches!(err, MrError::InvalidConfig(_)));
        assert!(err.to_string().contains("MR_TEST_CONFIG_GARBAGE"));

        env::set_var("MR_TEST_CONFIG_MS", "250");
        assert_eq!(
            env_millis_or("MR_TEST_CONFIG_MS", 1).unwrap(),
            Duration::from_millis(250)
        );
    }
}
