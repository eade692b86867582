//! # Handler de Archivos Estáticos
//! src/handlers/file.rs
//!
//! Sirve archivos de un directorio raíz bajo uno o más prefijos de ruta.
//!
//! - La URI relativa se normaliza antes de resolverla: un intento de
//!   escapar de la raíz con ".." produce 403 Forbidden.
//! - Archivo inexistente (o directorio) produce 404.
//! - GET condicional: si `If-None-Match` coincide con el ETag del archivo
//!   (su mtime), la respuesta es 304 Not Modified sin body.

use super::RequestHandler;
use crate::http::{response, Request, Response, StatusCode};
use std::path::{Path, PathBuf};

/// Handler que sirve archivos estáticos
pub struct FileHandler {
    /// Prefijos de ruta que este handler reclama
    prefixes: Vec<String>,

    /// Directorio raíz del que se sirven los archivos
    root: PathBuf,
}

impl FileHandler {
    /// Crea un handler para los prefijos dados sirviendo desde `root`
    pub fn new(prefixes: Vec<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            prefixes,
            root: root.into(),
        }
    }

    /// Normaliza un path relativo resolviendo "." y ".."
    ///
    /// Retorna `None` si el path intenta escapar de la raíz.
    fn normalize(relative: &str) -> Option<Vec<&str>> {
        let mut stack = Vec::new();

        for part in relative.split('/') {
            match part {
                "" | "." => continue,
                ".." => {
                    // Subir por encima de la raíz es un intento de escape
                    if stack.pop().is_none() {
                        return None;
                    }
                }
                normal => stack.push(normal),
            }
        }

        Some(stack)
    }

    /// Resuelve la URI relativa a un path dentro de la raíz
    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let parts = Self::normalize(relative)?;
        let mut path = self.root.clone();
        for part in parts {
            path.push(part);
        }
        Some(path)
    }

    /// Construye la respuesta para un archivo existente
    ///
    /// Aplica GET condicional por ETag antes de armar el 200.
    fn serve_file(&self, request: &Request, path: &Path) -> Response {
        let modified = match std::fs::metadata(path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(_) => return Response::not_found(response::CLOSE),
        };

        let etag = response::file_etag(modified);
        if request.header("if-none-match") == Some(etag.as_str()) {
            return Response::not_modified(response::CLOSE).with_etag(&etag);
        }

        match Response::from_file(StatusCode::Ok, response::CLOSE, path) {
            Ok(response) => response,
            Err(e) => {
                eprintln!("   ❌ Error leyendo {}: {}", path.display(), e);
                Response::internal_server_error(response::CLOSE)
            }
        }
    }
}

impl RequestHandler for FileHandler {
    fn handles_path(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| prefix == path)
    }

    fn do_get(&self, request: &Request) -> Response {
        let relative = request.relative_uri().unwrap_or_else(|| request.uri());

        let path = match self.resolve(relative) {
            Some(path) => path,
            None => return Response::forbidden(response::CLOSE),
        };

        if !path.is_file() {
            return Response::not_found(response::CLOSE);
        }

        self.serve_file(request, &path)
    }
}
