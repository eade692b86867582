//! # Handler de Demostración
//! src/handlers/demo.rs
//!
//! Handler mínimo que saluda con la URI recibida. Sirve para verificar el
//! routing de punta a punta (la URI y la URI relativa viajan en el body,
//! así cada respuesta identifica al request que la produjo).

use super::RequestHandler;
use crate::http::{response, Request, Response, StatusCode};

/// Handler de demostración/eco
pub struct DemoHandler {
    /// Prefijos de ruta que este handler reclama
    prefixes: Vec<String>,
}

impl DemoHandler {
    /// Crea un handler de demostración para los prefijos dados
    pub fn new(prefixes: Vec<String>) -> Self {
        Self { prefixes }
    }
}

impl RequestHandler for DemoHandler {
    fn handles_path(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| prefix == path)
    }

    fn do_get(&self, request: &Request) -> Response {
        let body = format!(
            "Welcome to the demo handler. You requested {} (relative: {})!",
            request.uri(),
            request.relative_uri().unwrap_or("")
        );
        Response::with_text(StatusCode::Ok, response::CLOSE, &body)
    }
}
