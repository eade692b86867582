//! # Handlers de Requests
//! src/handlers/mod.rs
//!
//! Define la capability que implementan los handlers registrados en el
//! router, y el handler por defecto (404) que atiende cuando ningún
//! prefijo reclama la URI.
//!
//! ## Contrato
//!
//! ```text
//! handles_path(path) -> bool       ¿este handler reclama el prefijo?
//! handle_request(request) -> Response
//! ```
//!
//! `handle_request` tiene una implementación por defecto que despacha por
//! método a operaciones por verbo (`do_get`, `do_post`, ...), cada una con
//! default 505 Not Supported. `do_head` delega en `do_get` sin suprimir el
//! body; un handler que necesite semántica HEAD estricta debe sobreescribir
//! `do_head`.

pub mod demo;
pub mod file;

pub use demo::DemoHandler;
pub use file::FileHandler;

use crate::http::{response, Method, Request, Response};

/// Capability de un handler de requests
///
/// `handles_path` debe ser idempotente: el router la invoca varias veces
/// por despacho (una por prefijo candidato) y entre despachos concurrentes.
pub trait RequestHandler: Send + Sync {
    /// Indica si este handler reclama el prefijo de ruta dado
    fn handles_path(&self, path: &str) -> bool;

    /// Atiende un request completo
    ///
    /// El default despacha por verbo; los handlers concretos normalmente
    /// sobreescriben solo los verbos que soportan.
    fn handle_request(&self, request: &Request) -> Response {
        match request.method() {
            Method::GET => self.do_get(request),
            Method::PUT => self.do_put(request),
            Method::POST => self.do_post(request),
            Method::DELETE => self.do_delete(request),
            Method::HEAD => self.do_head(request),
        }
    }

    /// GET; default 505 Not Supported
    fn do_get(&self, _request: &Request) -> Response {
        Response::version_not_supported(response::CLOSE)
    }

    /// PUT; default 505 Not Supported
    fn do_put(&self, _request: &Request) -> Response {
        Response::version_not_supported(response::CLOSE)
    }

    /// POST; default 505 Not Supported
    fn do_post(&self, _request: &Request) -> Response {
        Response::version_not_supported(response::CLOSE)
    }

    /// DELETE; default 505 Not Supported
    fn do_delete(&self, _request: &Request) -> Response {
        Response::version_not_supported(response::CLOSE)
    }

    /// HEAD; default delega en GET (no suprime el body)
    fn do_head(&self, request: &Request) -> Response {
        self.do_get(request)
    }
}

/// Handler por defecto: reclama cualquier path y responde 404
///
/// El router lo usa cuando ningún handler registrado reclama ningún
/// prefijo de la URI; la respuesta fuerza el cierre de la conexión.
pub struct NotFoundHandler;

impl RequestHandler for NotFoundHandler {
    fn handles_path(&self, _path: &str) -> bool {
        true
    }

    fn handle_request(&self, _request: &Request) -> Response {
        Response::not_found(response::CLOSE)
    }
}
