use crate::errors::AppError;
use log::warn;
use std::env;

/// Warehouse credentials, read once at startup from the environment.
///
/// User, password and account are required for any upload-bearing mode;
/// role, warehouse, database and schema are optional session context.
#[derive(Debug, Clone)]
pub struct StageCredentials {
    pub user: String,
    pub password: String,
    pub account: String,
    pub role: Option<String>,
    pub warehouse: Option<String>,
    pub database: Option<String>,
    pub schema: Option<String>,
}

impl StageCredentials {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).filter(|v| !v.is_empty()).ok_or_else(|| {
                AppError::Config(format!(
                    "Required environment variable '{}' is not set.",
                    key
                ))
            })
        };

        let optional = |key: &str| {
            let value = lookup(key).filter(|v| !v.is_empty());
            if value.is_none() {
                warn!("Optional environment variable '{}' is not set.", key);
            }
            value
        };

        Ok(StageCredentials {
            user: required("SNOWFLAKE_USER")?,
            password: required("SNOWFLAKE_PASSWORD")?,
            account: required("SNOWFLAKE_ACCOUNT")?,
            role: optional("SNOWFLAKE_ROLE"),
            warehouse: optional("SNOWFLAKE_WAREHOUSE"),
            database: optional("SNOWFLAKE_DATABASE"),
            schema: optional("SNOWFLAKE_SCHEMA"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from<'a>(map: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| map.get(key).map(|v| v.to_string())
    }

    #[test]
    fn loads_full_credential_set() {
        let vars = HashMap::from([
            ("SNOWFLAKE_USER", "svc_cam"),
            ("SNOWFLAKE_PASSWORD", "hunter2"),
            ("SNOWFLAKE_ACCOUNT", "xy12345"),
            ("SNOWFLAKE_ROLE", "UPLOADER"),
            ("SNOWFLAKE_WAREHOUSE", "COMPUTE_WH"),
            ("SNOWFLAKE_DATABASE", "FARM"),
            ("SNOWFLAKE_SCHEMA", "RAW"),
        ]);
        let creds = StageCredentials::from_lookup(lookup_from(&vars)).unwrap();
        assert_eq!(creds.user, "svc_cam");
        assert_eq!(creds.account, "xy12345");
        assert_eq!(creds.schema.as_deref(), Some("RAW"));
    }

    #[test]
    fn missing_required_variable_is_an_error() {
        let vars = HashMap::from([
            ("SNOWFLAKE_USER", "svc_cam"),
            ("SNOWFLAKE_ACCOUNT", "xy12345"),
        ]);
        let err = StageCredentials::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(err.to_string().contains("SNOWFLAKE_PASSWORD"));
    }

    #[test]
    fn missing_optional_variables_are_tolerated() {
        let vars = HashMap::from([
            ("SNOWFLAKE_USER", "svc_cam"),
            ("SNOWFLAKE_PASSWORD", "hunter2"),
            ("SNOWFLAKE_ACCOUNT", "xy12345"),
        ]);
        let creds = StageCredentials::from_lookup(lookup_from(&vars)).unwrap();
        assert!(creds.role.is_none());
        assert!(creds.warehouse.is_none());
    }

    #[test]
    fn empty_values_count_as_unset() {
        let vars = HashMap::from([
            ("SNOWFLAKE_USER", ""),
            ("SNOWFLAKE_PASSWORD", "hunter2"),
            ("SNOWFLAKE_ACCOUNT", "xy12345"),
        ]);
        assert!(StageCredentials::from_lookup(lookup_from(&vars)).is_err());
    }
}
