//! Domain types
//!
//! Pure data for one validation pass: the declarative request, the storage
//! backend and config-file declarations it carries, and the resolved
//! configuration a successful pass produces. No I/O happens here.

pub mod backend;
pub mod config_file;
pub mod database;
pub mod keys;
pub mod request;
pub mod resolved;

pub use backend::{
    AzureStorage, BackendCredentials, BackendKind, CloudfrontS3Storage, GoogleCloudStorage,
    LocalStorage, ObjectGatewayStorage, RegistryBackend, RegistryStorage, S3Storage,
    StorageCredentials, SwiftStorage,
};
pub use config_file::{ConfigFileEntry, ConfigFileGroup, ConfigFileRequest, ConfigFileType};
pub use database::{DatabaseCredentials, DatabaseDeployment, DatabaseSpec, ResolvedDatabase};
pub use request::{
    CacheSpec, ConfigurationRequest, EcosystemStatus, ExternalAccess, ExternalAccessType,
    PlatformCapabilities, RegistrySpec, RegistryStorageSpec, ScannerSpec, SuperuserCredentials,
    TlsSpec,
};
pub use resolved::{
    ProvidedSecrets, ResolvedConfiguration, ResolvedScanner, SuperuserIdentity, TlsMaterial,
};
