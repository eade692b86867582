//! # Sistema de Routing por Prefijo
//! src/router/mod.rs
//!
//! El router mapea URIs a handlers por el prefijo registrado más largo.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router.dispatch → Handler → Response
//! ```
//!
//! La tabla de handlers es un snapshot inmutable (`Arc`) que el registry de
//! plugins reemplaza completo en cada rescan; ningún lector ve una tabla a
//! medio actualizar. Si ningún handler reclama ningún prefijo de la URI
//! (incluida la raíz "/"), el despacho no tiene dueño y el conector responde
//! con el handler por defecto (404 Not Found) cerrando la conexión.

use crate::handlers::{NotFoundHandler, RequestHandler};
use crate::http::Request;
use std::sync::{Arc, RwLock};

/// Snapshot inmutable de la tabla de handlers
pub type HandlerTable = Arc<Vec<Arc<dyn RequestHandler>>>;

/// Router con tabla de handlers intercambiable atómicamente
pub struct Router {
    /// Tabla viva; el lock se toma solo para clonar/instalar el Arc
    handlers: RwLock<HandlerTable>,

    /// Handler por defecto cuando nadie reclama la URI
    default_handler: Arc<dyn RequestHandler>,
}

impl Router {
    /// Crea un router con la tabla vacía
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Arc::new(Vec::new())),
            default_handler: Arc::new(NotFoundHandler),
        }
    }

    /// Crea un router con una tabla inicial
    pub fn with_handlers(handlers: Vec<Arc<dyn RequestHandler>>) -> Self {
        let router = Self::new();
        router.replace(handlers);
        router
    }

    /// Reemplaza la tabla completa por una nueva
    ///
    /// Es un único swap de referencia: los despachos en curso siguen
    /// leyendo el snapshot anterior hasta terminar.
    pub fn replace(&self, handlers: Vec<Arc<dyn RequestHandler>>) {
        let mut table = self.handlers.write().unwrap();
        *table = Arc::new(handlers);
    }

    /// Obtiene el snapshot actual de la tabla
    pub fn snapshot(&self) -> HandlerTable {
        Arc::clone(&self.handlers.read().unwrap())
    }

    /// Handler por defecto (404) para URIs que nadie reclama
    ///
    /// El conector lo usa cuando [`Router::dispatch`] no encuentra match;
    /// en ese camino la conexión se cierra siempre.
    pub fn default_handler(&self) -> Arc<dyn RequestHandler> {
        Arc::clone(&self.default_handler)
    }

    /// Selecciona el handler para el request y escribe su URI relativa
    ///
    /// Divide la URI en segmentos no vacíos y prueba prefijos del más
    /// específico al menos específico; el primer handler que reclama un
    /// prefijo gana. La URI relativa se produce recortando el prefijo
    /// anclado al inicio de la URI (nunca un reemplazo de substring: un
    /// prefijo que se repite más adentro del path no se recorta de más).
    ///
    /// Retorna `None` cuando ningún handler reclama ningún prefijo de la
    /// URI (incluida la raíz "/"); el caller decide qué hacer con el
    /// request sin dueño (el conector responde con
    /// [`Router::default_handler`] y fuerza el cierre).
    ///
    /// # Ejemplo
    ///
    /// Con un handler registrado en `/TestPlugin`, el request
    /// `GET /TestPlugin/info` despacha a ese handler con URI relativa
    /// `/info`.
    pub fn dispatch(&self, request: &mut Request) -> Option<Arc<dyn RequestHandler>> {
        let snapshot = self.snapshot();
        let uri = request.uri().to_string();

        let segments: Vec<&str> = uri.split('/').filter(|s| !s.is_empty()).collect();

        // Del prefijo más largo al más corto
        for count in (1..=segments.len()).rev() {
            let prefix = format!("/{}", segments[..count].join("/"));

            for handler in snapshot.iter() {
                if handler.handles_path(&prefix) {
                    let relative = uri
                        .strip_prefix(&prefix)
                        .unwrap_or(uri.as_str())
                        .to_string();
                    request.set_relative_uri(relative);
                    return Some(Arc::clone(handler));
                }
            }
        }

        // Último candidato: la raíz
        for handler in snapshot.iter() {
            if handler.handles_path("/") {
                let relative = uri.strip_prefix('/').unwrap_or(uri.as_str()).to_string();
                request.set_relative_uri(relative);
                return Some(Arc::clone(handler));
            }
        }

        None
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
