//! # Web Server
//! src/lib.rs
//!
//! Servidor HTTP/1.x multihilo implementado desde cero para demostrar
//! conceptos de sistemas operativos: concurrencia, sincronización y
//! manejo de recursos compartidos.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: Parsing de requests y construcción de responses HTTP/1.x
//! - `server`: Acceptor, cola de conexiones, pool de workers y conexiones
//! - `router`: Enrutamiento por prefijo de ruta más largo
//! - `handlers`: Contrato de handlers y handlers concretos (archivos, demo)
//! - `plugins`: Descubrimiento de handlers por manifiestos JSON
//! - `stats`: Estadísticas agregadas de servicio
//! - `config`: Configuración por CLI y variables de entorno
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use web_server::config::Config;
//! use web_server::router::Router;
//! use web_server::server::Server;
//! use web_server::stats::ServerStats;
//! use std::sync::Arc;
//!
//! let config = Config::default();
//! let router = Arc::new(Router::new());
//! let stats = Arc::new(ServerStats::new());
//!
//! let server = Server::new(config, router, stats);
//! server.run().expect("Error al iniciar servidor");
//! ```

pub mod config;
pub mod handlers;
pub mod http;
pub mod plugins;
pub mod router;
pub mod server;
pub mod stats;
