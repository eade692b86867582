//! # Módulo HTTP
//! src/http/mod.rs
//!
//! Este módulo implementa el subset HTTP/1.0 / HTTP/1.1 del servidor,
//! sin librerías de alto nivel. Incluye:
//!
//! - Parsing de requests desde el stream de la conexión
//! - Construcción y escritura de responses con framing correcto
//! - Códigos de estado
//! - Query parameters (URI y bodies form-encoded)
//!
//! ### Formato de Request
//!
//! ```text
//! GET /path?query=value HTTP/1.1\r\n
//! Header-Name: Header-Value\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Connection: Close\r\n
//! Content-Length: 13\r\n
//! \r\n
//! <payload>
//! ```

pub mod request;   // Parsing de HTTP requests
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use request::{Method, ParseError, ReadError, Request};
pub use response::{Payload, Response};
pub use status::StatusCode;
