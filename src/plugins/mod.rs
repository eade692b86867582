//! # Registry de Plugins
//! src/plugins/mod.rs
//!
//! Descubre handlers a partir de manifiestos JSON en un directorio
//! conocido y los instala en el router como una tabla completa nueva.
//!
//! ## Formato de manifiesto
//!
//! ```json
//! { "handler": "file", "prefixes": ["/FileRequestPlugin"], "root": "./public" }
//! { "handler": "demo", "prefixes": ["/TestPlugin", "/"] }
//! ```
//!
//! El rescan corre en un intervalo fijo desde el loop de supervisión del
//! proceso. Un manifiesto corrupto o ilegible se loggea y se salta: nunca
//! tumba al servidor ni afecta conexiones en vuelo. Un directorio ausente
//! produce una tabla vacía (todo despacha al 404 por defecto).

use crate::handlers::{DemoHandler, FileHandler, RequestHandler};
use crate::router::Router;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Manifiesto de un plugin, tal como se deserializa del JSON
#[derive(Debug, Clone, Deserialize)]
pub struct PluginManifest {
    /// Tipo de handler: "file" o "demo"
    pub handler: String,

    /// Prefijos de ruta que el handler reclama
    pub prefixes: Vec<String>,

    /// Directorio raíz (solo para el handler "file")
    #[serde(default)]
    pub root: Option<String>,
}

/// Registry que descubre plugins y actualiza la tabla del router
pub struct PluginRegistry {
    /// Directorio donde viven los manifiestos `*.json`
    plugins_dir: PathBuf,
}

impl PluginRegistry {
    /// Crea un registry sobre el directorio dado
    pub fn new(plugins_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugins_dir: plugins_dir.into(),
        }
    }

    /// Descubre los plugins y reemplaza la tabla del router
    ///
    /// La tabla se construye completa y se instala con un único swap;
    /// los despachos en curso terminan sobre el snapshot anterior.
    pub fn rescan(&self, router: &Router) {
        router.replace(self.load_handlers());
    }

    /// Lee el directorio de plugins y construye la lista de handlers
    ///
    /// Cada unidad con problemas se loggea y se salta.
    pub fn load_handlers(&self) -> Vec<Arc<dyn RequestHandler>> {
        let entries = match std::fs::read_dir(&self.plugins_dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().map(|ext| ext == "json").unwrap_or(false))
            .collect();

        // Orden estable entre rescans
        paths.sort();

        let mut handlers: Vec<Arc<dyn RequestHandler>> = Vec::new();

        for path in paths {
            match Self::load_manifest(&path) {
                Ok(handler) => handlers.push(handler),
                Err(reason) => {
                    eprintln!("   ❌ Plugin {} ignorado: {}", path.display(), reason);
                }
            }
        }

        handlers
    }

    /// Carga un manifiesto y construye su handler
    fn load_manifest(path: &Path) -> Result<Arc<dyn RequestHandler>, String> {
        let raw = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        let manifest: PluginManifest =
            serde_json::from_str(&raw).map_err(|e| e.to_string())?;

        Self::build_handler(&manifest)
    }

    /// Construye un handler desde un manifiesto validado
    pub fn build_handler(manifest: &PluginManifest) -> Result<Arc<dyn RequestHandler>, String> {
        if manifest.prefixes.is_empty() {
            return Err("manifest has no prefixes".to_string());
        }
        for prefix in &manifest.prefixes {
            if !prefix.starts_with('/') {
                return Err(format!("prefix must start with '/': {:?}", prefix));
            }
        }

        match manifest.handler.as_str() {
            "file" => {
                let root = manifest
                    .root
                    .as_deref()
                    .ok_or_else(|| "file handler requires a root".to_string())?;
                Ok(Arc::new(FileHandler::new(
                    manifest.prefixes.clone(),
                    root,
                )))
            }
            "demo" => Ok(Arc::new(DemoHandler::new(manifest.prefixes.clone()))),
            other => Err(format!("unknown handler kind: {:?}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Request;

    fn write_manifest(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_missing_directory_gives_empty_table() {
        let registry = PluginRegistry::new("/definitely/not/a/dir");
        assert!(registry.load_handlers().is_empty());
    }

    #[test]
    fn test_loads_demo_manifest() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(
            dir.path(),
            "demo.json",
            r#"{ "handler": "demo", "prefixes": ["/TestPlugin"] }"#,
        );

        let registry = PluginRegistry::new(dir.path());
        let handlers = registry.load_handlers();

        assert_eq!(handlers.len(), 1);
        assert!(handlers[0].handles_path("/TestPlugin"));
    }

    #[test]
    fn test_loads_file_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = format!(
            r#"{{ "handler": "file", "prefixes": ["/files"], "root": "{}" }}"#,
            dir.path().display()
        );
        write_manifest(dir.path(), "files.json", &manifest);

        let registry = PluginRegistry::new(dir.path());
        let handlers = registry.load_handlers();

        assert_eq!(handlers.len(), 1);
        assert!(handlers[0].handles_path("/files"));
    }

    #[test]
    fn test_corrupt_manifest_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "bad.json", "{ this is not json");
        write_manifest(
            dir.path(),
            "good.json",
            r#"{ "handler": "demo", "prefixes": ["/ok"] }"#,
        );

        let registry = PluginRegistry::new(dir.path());
        let handlers = registry.load_handlers();

        assert_eq!(handlers.len(), 1);
        assert!(handlers[0].handles_path("/ok"));
    }

    #[test]
    fn test_unknown_kind_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(
            dir.path(),
            "weird.json",
            r#"{ "handler": "teapot", "prefixes": ["/tea"] }"#,
        );

        let registry = PluginRegistry::new(dir.path());
        assert!(registry.load_handlers().is_empty());
    }

    #[test]
    fn test_invalid_prefix_is_rejected() {
        let manifest = PluginManifest {
            handler: "demo".to_string(),
            prefixes: vec!["no-slash".to_string()],
            root: None,
        };
        assert!(PluginRegistry::build_handler(&manifest).is_err());

        let manifest = PluginManifest {
            handler: "demo".to_string(),
            prefixes: vec![],
            root: None,
        };
        assert!(PluginRegistry::build_handler(&manifest).is_err());
    }

    #[test]
    fn test_file_manifest_without_root_is_rejected() {
        let manifest = PluginManifest {
            handler: "file".to_string(),
            prefixes: vec!["/files".to_string()],
            root: None,
        };
        assert!(PluginRegistry::build_handler(&manifest).is_err());
    }

    #[test]
    fn test_rescan_installs_table_in_router() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(
            dir.path(),
            "demo.json",
            r#"{ "handler": "demo", "prefixes": ["/TestPlugin"] }"#,
        );

        let registry = PluginRegistry::new(dir.path());
        let router = Router::new();
        registry.rescan(&router);

        let mut request = Request::parse(b"GET /TestPlugin/info HTTP/1.1\r\n\r\n").unwrap();
        let handler = router.dispatch(&mut request).expect("plugin not installed");
        assert!(handler.handles_path("/TestPlugin"));
        assert_eq!(request.relative_uri(), Some("/info"));

        // Un rescan sobre un directorio ya vacío deja la tabla vacía
        std::fs::remove_file(dir.path().join("demo.json")).unwrap();
        registry.rescan(&router);
        assert!(router.snapshot().is_empty());
    }
}
