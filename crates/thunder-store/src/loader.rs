//! Start-up loader for YAML-declared resources.
//!
//! The loader walks `<root>/<directory_name>` in lexicographic file order,
//! parses every `*.yaml` file, validates the payload, and inserts it into the
//! generic resource store. Lexicographic order makes duplicate handling
//! deterministic: the first file declaring an id wins and the second fails
//! validation, which is fatal to start-up. Malformed resources are never
//! silently skipped.
//!
//! Per-kind behavior is injected through [`ResourceConfig`]: a parser from
//! raw bytes to a tagged payload, a semantic validator, an id extractor, and
//! an optional [`ExistenceChecker`] capability used in composite mode to
//! reject ids that already exist in the mutable backend.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use thunder_core::{Entity, EntityPayload, ResourceKind};

use crate::contract::ExistenceChecker;
use crate::error::StoreError;
use crate::resource_store::ResourceStore;

/// Parser from file bytes to a tagged payload. Errors are plain messages;
/// the loader attaches file context.
pub type Parser = Box<dyn Fn(&[u8]) -> Result<EntityPayload, String> + Send + Sync>;

/// Extracts the resource id from a parsed payload.
pub type IdExtractor = Box<dyn Fn(&EntityPayload) -> String + Send + Sync>;

/// Semantic validator applied after parsing.
#[async_trait::async_trait]
pub trait ResourceValidator: Send + Sync {
    /// Validate a parsed payload. `checker`, when present, reports whether an
    /// id already exists in the mutable backend.
    async fn validate(
        &self,
        payload: &EntityPayload,
        checker: Option<&dyn ExistenceChecker>,
    ) -> Result<(), String>;
}

/// Per-kind loader configuration.
pub struct ResourceConfig {
    /// Kind every file in the directory must declare
    pub kind: ResourceKind,
    /// Directory under the resource root
    pub directory_name: String,
    /// Bytes-to-payload parser
    pub parser: Parser,
    /// Semantic validator
    pub validator: Box<dyn ResourceValidator>,
    /// Id extraction from the parsed payload
    pub id_extractor: IdExtractor,
    /// Mutable-backend existence capability for cross-store duplicate
    /// rejection; `None` skips the check
    pub existence_checker: Option<Arc<dyn ExistenceChecker>>,
}

/// Loader failures. All of them abort start-up.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// Directory walk or file read failed
    #[error("failed to read {path}: {source}")]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Parser rejected the file contents
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Offending file
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Validator rejected the parsed payload
    #[error("validation failed for {path}: {message}")]
    Validation {
        /// Offending file
        path: PathBuf,
        /// Validator message
        message: String,
    },

    /// A later file re-declared an already-loaded id
    #[error("duplicate resource id {id} declared by {path}")]
    DuplicateId {
        /// The contested id
        id: String,
        /// The losing file
        path: PathBuf,
    },

    /// The generic store rejected the insert
    #[error("store rejected {id}: {source}")]
    Store {
        /// Resource id
        id: String,
        /// Store error
        #[source]
        source: StoreError,
    },
}

/// Walks resource directories and populates the generic store.
pub struct ResourceLoader {
    root: PathBuf,
    store: Arc<ResourceStore>,
}

impl ResourceLoader {
    /// Create a loader rooted at the resource directory.
    pub fn new(root: impl Into<PathBuf>, store: Arc<ResourceStore>) -> Self {
        Self {
            root: root.into(),
            store,
        }
    }

    /// Load every resource of one kind. Returns the number loaded.
    ///
    /// A missing directory is treated as zero declared resources; anything
    /// else that goes wrong is fatal.
    ///
    /// # Errors
    ///
    /// Any [`LoaderError`]: unreadable files, parse or validation failures,
    /// duplicate ids within the directory or against the mutable backend.
    pub async fn load(&self, config: &ResourceConfig) -> Result<usize, LoaderError> {
        let dir = self.root.join(&config.directory_name);
        if !dir.is_dir() {
            debug!(directory = %dir.display(), "resource directory absent, nothing to load");
            return Ok(0);
        }

        let mut loaded = 0;
        for path in yaml_files_sorted(&dir)? {
            self.load_file(config, &path).await?;
            loaded += 1;
        }
        info!(
            kind = %config.kind,
            directory = %dir.display(),
            count = loaded,
            "loaded declared resources"
        );
        Ok(loaded)
    }

    async fn load_file(&self, config: &ResourceConfig, path: &Path) -> Result<(), LoaderError> {
        let bytes = std::fs::read(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let payload = (config.parser)(&bytes).map_err(|message| LoaderError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        if payload.kind() != config.kind {
            return Err(LoaderError::Validation {
                path: path.to_path_buf(),
                message: format!(
                    "payload kind {} does not match directory kind {}",
                    payload.kind(),
                    config.kind
                ),
            });
        }

        let id = (config.id_extractor)(&payload);
        if id.is_empty() {
            return Err(LoaderError::Validation {
                path: path.to_path_buf(),
                message: "declared resource has an empty id".to_string(),
            });
        }

        // First file to declare an id wins; lexicographic order makes the
        // loser deterministic.
        let key = thunder_core::ResourceKey::new(config.kind, id.clone());
        if self.store.get(&key).is_some() {
            return Err(LoaderError::DuplicateId {
                id,
                path: path.to_path_buf(),
            });
        }

        if let Some(checker) = config.existence_checker.as_deref() {
            let taken = checker.exists(&id).await.map_err(|source| LoaderError::Store {
                id: id.clone(),
                source,
            })?;
            if taken {
                return Err(LoaderError::Validation {
                    path: path.to_path_buf(),
                    message: format!("id {id} already exists in the mutable backend"),
                });
            }
        }

        config
            .validator
            .validate(&payload, config.existence_checker.as_deref())
            .await
            .map_err(|message| LoaderError::Validation {
                path: path.to_path_buf(),
                message,
            })?;

        self.store
            .set(Entity::new(id.clone(), payload))
            .map_err(|source| LoaderError::Store { id, source })?;
        Ok(())
    }
}

fn yaml_files_sorted(dir: &Path) -> Result<Vec<PathBuf>, LoaderError> {
    let entries = std::fs::read_dir(dir).map_err(|source| LoaderError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoaderError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "yaml") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use thunder_core::models::OrganizationUnit;

    struct AcceptAll;

    #[async_trait::async_trait]
    impl ResourceValidator for AcceptAll {
        async fn validate(
            &self,
            _payload: &EntityPayload,
            _checker: Option<&dyn ExistenceChecker>,
        ) -> Result<(), String> {
            Ok(())
        }
    }

    fn ou_config(checker: Option<Arc<dyn ExistenceChecker>>) -> ResourceConfig {
        ResourceConfig {
            kind: ResourceKind::OrganizationUnit,
            directory_name: "organization_units".to_string(),
            parser: Box::new(|bytes| {
                serde_yaml::from_slice::<OrganizationUnit>(bytes)
                    .map(EntityPayload::OrganizationUnit)
                    .map_err(|e| e.to_string())
            }),
            validator: Box::new(AcceptAll),
            id_extractor: Box::new(|payload| match payload {
                EntityPayload::OrganizationUnit(ou) => ou.id.clone(),
                EntityPayload::Application(app) => app.id.clone(),
            }),
            existence_checker: checker,
        }
    }

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    #[tokio::test]
    async fn loads_yaml_files_in_lexicographic_order() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("organization_units");
        std::fs::create_dir(&dir).unwrap();
        write_file(&dir, "10-eng.yaml", "id: eng\nhandle: eng\nname: Engineering\n");
        write_file(&dir, "05-root.yaml", "id: root\nhandle: root\nname: Root\n");
        write_file(&dir, "notes.txt", "ignored");

        let store = Arc::new(ResourceStore::new());
        let loader = ResourceLoader::new(tmp.path(), Arc::clone(&store));
        let loaded = loader.load(&ou_config(None)).await.unwrap();
        assert_eq!(loaded, 2);
        assert_eq!(store.count_by_kind(ResourceKind::OrganizationUnit), 2);
    }

    #[tokio::test]
    async fn duplicate_id_fails_and_first_file_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("organization_units");
        std::fs::create_dir(&dir).unwrap();
        write_file(&dir, "a.yaml", "id: eng\nhandle: eng\nname: First\n");
        write_file(&dir, "b.yaml", "id: eng\nhandle: eng2\nname: Second\n");

        let store = Arc::new(ResourceStore::new());
        let loader = ResourceLoader::new(tmp.path(), Arc::clone(&store));
        let err = loader.load(&ou_config(None)).await.unwrap_err();
        assert!(matches!(err, LoaderError::DuplicateId { ref id, .. } if id == "eng"));

        let key = thunder_core::ResourceKey::new(ResourceKind::OrganizationUnit, "eng");
        let kept = store.get(&key).unwrap();
        assert_eq!(kept.payload.as_organization_unit().unwrap().name, "First");
    }

    #[tokio::test]
    async fn parse_failure_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("organization_units");
        std::fs::create_dir(&dir).unwrap();
        write_file(&dir, "bad.yaml", "id: [not\nvalid yaml");

        let store = Arc::new(ResourceStore::new());
        let loader = ResourceLoader::new(tmp.path(), store);
        assert!(matches!(
            loader.load(&ou_config(None)).await,
            Err(LoaderError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn missing_directory_loads_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(ResourceStore::new());
        let loader = ResourceLoader::new(tmp.path(), store);
        assert_eq!(loader.load(&ou_config(None)).await.unwrap(), 0);
    }

    struct AlwaysTaken;

    #[async_trait::async_trait]
    impl ExistenceChecker for AlwaysTaken {
        async fn exists(&self, _id: &str) -> Result<bool, StoreError> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn id_taken_in_mutable_backend_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("organization_units");
        std::fs::create_dir(&dir).unwrap();
        write_file(&dir, "a.yaml", "id: eng\nhandle: eng\nname: Engineering\n");

        let store = Arc::new(ResourceStore::new());
        let loader = ResourceLoader::new(tmp.path(), store);
        let err = loader
            .load(&ou_config(Some(Arc::new(AlwaysTaken))))
            .await
            .unwrap_err();
        assert!(matches!(err, LoaderError::Validation { .. }));
    }
}
