//! Well-known secret keys and limits.

/// Superuser credentials secret
pub const SUPERUSER_USERNAME: &str = "superuser-username";
pub const SUPERUSER_PASSWORD: &str = "superuser-password";
pub const SUPERUSER_EMAIL: &str = "superuser-email";

/// Config secret
pub const CONFIG_PASSWORD: &str = "quay-config-password";

/// Cache (redis) credentials secret
pub const REDIS_PASSWORD: &str = "password";

/// Database credentials secret
pub const DATABASE_USERNAME: &str = "database-username";
pub const DATABASE_PASSWORD: &str = "database-password";
pub const DATABASE_NAME: &str = "database-name";
pub const DATABASE_SERVER: &str = "database-server";
pub const DATABASE_ROOT_PASSWORD: &str = "database-root-password";

/// Access-key style storage credentials (S3, GoogleCloud, RHOCS, RADOS, CloudfrontS3)
pub const ACCESS_KEY: &str = "accessKey";
pub const SECRET_KEY: &str = "secretKey";

/// Azure storage credentials
pub const AZURE_ACCOUNT_NAME: &str = "accountName";
pub const AZURE_ACCOUNT_KEY: &str = "accountKey";
pub const AZURE_SAS_TOKEN: &str = "sasToken";

/// Swift storage credentials
pub const SWIFT_USER: &str = "user";
pub const SWIFT_PASSWORD: &str = "password";

/// TLS secret
pub const TLS_CERTIFICATE: &str = "tls.crt";
pub const TLS_PRIVATE_KEY: &str = "tls.key";

/// Minimum superuser password length, in characters.
pub const MIN_SUPERUSER_PASSWORD_LENGTH: usize = 8;
