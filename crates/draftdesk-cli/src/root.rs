use anyhow::Context;
use draftdesk_core::api::HttpBackend;
use draftdesk_core::catalog::{CachedCatalog, Catalog};
use draftdesk_core::config::Config;
use draftdesk_core::paths;
use draftdesk_core::selection::{FileSessionStore, SelectionStore, SessionStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Global flags shared by every subcommand.
pub struct GlobalOpts<'a> {
    pub data_dir: Option<&'a Path>,
    pub backend: Option<&'a str>,
    pub session: &'a str,
}

/// Everything a command needs: resolved paths, config, the session file,
/// and handles on the backend.
pub struct Desk {
    pub data_dir: PathBuf,
    pub config: Config,
    session: Arc<FileSessionStore>,
    backend: HttpBackend,
    catalog: Arc<CachedCatalog<HttpBackend>>,
}

impl Desk {
    /// Resolve the data directory and wire up the runtime.
    ///
    /// Priority for each setting:
    /// 1. command-line flag / environment variable
    /// 2. `<data_dir>/config.yaml`
    /// 3. built-in default
    pub fn open(opts: &GlobalOpts<'_>) -> anyhow::Result<Self> {
        let data_dir = paths::resolve_data_dir(opts.data_dir)?;
        let mut config = Config::load(&data_dir)
            .with_context(|| format!("failed to load config from {}", data_dir.display()))?;
        if let Some(url) = opts.backend {
            config.backend.base_url = url.to_string();
        }

        let sessions_dir = config.sessions_dir(&data_dir);
        let session = Arc::new(FileSessionStore::for_session(&sessions_dir, opts.session)?);
        let backend = HttpBackend::new(&config.backend)?;
        let catalog = Arc::new(
            CachedCatalog::new(backend.clone(), config.catalog.cache_policy())
                .with_cache_dir(paths::cache_dir(&data_dir)),
        );
        tracing::debug!(
            data_dir = %data_dir.display(),
            session = %session.path().display(),
            backend = %backend.base_url(),
            "desk opened"
        );

        Ok(Self {
            data_dir,
            config,
            session,
            backend,
            catalog,
        })
    }

    pub fn backend(&self) -> &HttpBackend {
        &self.backend
    }

    pub fn catalog(&self) -> Arc<dyn Catalog> {
        self.catalog.clone()
    }

    /// Drop cached catalogs after an edit made outside the cache.
    pub fn invalidate_catalog(&self) {
        self.catalog.invalidate();
    }

    pub fn session_file(&self) -> &FileSessionStore {
        &self.session
    }

    pub fn session(&self) -> Arc<dyn SessionStore> {
        self.session.clone()
    }

    pub fn selections(&self) -> SelectionStore {
        SelectionStore::new(self.session())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn backend_flag_overrides_config() {
        let dir = TempDir::new().unwrap();
        let desk = Desk::open(&GlobalOpts {
            data_dir: Some(dir.path()),
            backend: Some("http://example.test:9000/"),
            session: "default",
        })
        .unwrap();
        assert_eq!(desk.backend().base_url(), "http://example.test:9000");
        assert_eq!(desk.data_dir, dir.path());
    }

    #[test]
    fn session_file_lives_under_data_dir() {
        let dir = TempDir::new().unwrap();
        let desk = Desk::open(&GlobalOpts {
            data_dir: Some(dir.path()),
            backend: None,
            session: "writer-1",
        })
        .unwrap();
        assert_eq!(
            desk.session_file().path(),
            dir.path().join("sessions").join("writer-1.json")
        );
    }

    #[test]
    fn catalog_cache_lives_under_data_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("cache")).unwrap();
        std::fs::write(dir.path().join("cache/supplementals.json"), "{}").unwrap();
        let desk = Desk::open(&GlobalOpts {
            data_dir: Some(dir.path()),
            backend: None,
            session: "default",
        })
        .unwrap();
        desk.invalidate_catalog();
        assert!(!dir.path().join("cache/supplementals.json").exists());
    }

    #[test]
    fn bad_session_id_is_rejected() {
        let dir = TempDir::new().unwrap();
        let result = Desk::open(&GlobalOpts {
            data_dir: Some(dir.path()),
            backend: None,
            session: "../escape",
        });
        assert!(result.is_err());
    }
}
