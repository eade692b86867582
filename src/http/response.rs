//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! Este módulo proporciona una API para construir respuestas HTTP y
//! escribirlas al socket con el framing correcto.
//!
//! ## Formato de una respuesta
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Connection: Close\r\n
//! Date: Tue, 07 Oct 2025 12:00:00 GMT\r\n
//! Content-Length: 12\r\n
//! \r\n
//! Hello World!
//! ```
//!
//! El payload es excluyente: o un archivo que se copia en chunks de tamaño
//! fijo (nunca se bufferea entero) o un body en memoria. Los headers se
//! escriben en orden de inserción.

use super::StatusCode;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Versión con la que el servidor responde siempre
pub const DEFAULT_VERSION: &str = "HTTP/1.1";

/// Valor del header Connection cuando la conexión se cierra
pub const CLOSE: &str = "Close";

/// Valor del header Connection cuando la conexión queda abierta
pub const KEEP_ALIVE: &str = "Keep-Alive";

/// Identificación del servidor (header Server)
const SERVER_INFO: &str = "WebServer-Rust/0.1.0";

/// Identificación del proveedor (header Provider)
const PROVIDER: &str = "web_server";

/// Tamaño de chunk para copiar archivos al socket
const CHUNK_LENGTH: usize = 4096;

/// Tabla extensión → tipo MIME
///
/// Si la extensión no está en la tabla, el header Content-Type se omite y
/// el browser decide por su cuenta.
static MIME_TYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("html", "text/html"),
        ("htm", "text/html"),
        ("css", "text/css"),
        ("js", "text/javascript"),
        ("json", "application/json"),
        ("xml", "application/xml"),
        ("txt", "text/plain"),
        ("ico", "image/x-icon"),
        ("png", "image/png"),
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("gif", "image/gif"),
        ("svg", "image/svg+xml"),
        ("pdf", "application/pdf"),
    ]
    .iter()
    .cloned()
    .collect()
});

/// Payload de una respuesta: archivo streameado o body en memoria
#[derive(Debug, Clone)]
pub enum Payload {
    /// Sin body (ej: 304, 505)
    Empty,

    /// Body en memoria
    Bytes(Vec<u8>),

    /// Archivo que se copia al socket en chunks
    File(PathBuf),
}

/// Representa una respuesta HTTP completa
#[derive(Debug, Clone)]
pub struct Response {
    /// Código de estado
    status: StatusCode,

    /// Versión HTTP de la respuesta
    version: String,

    /// Headers en orden de inserción; clave repetida reemplaza en el lugar
    headers: Vec<(String, String)>,

    /// Payload de la respuesta
    payload: Payload,
}

impl Response {
    /// Crea una respuesta sin headers ni payload
    ///
    /// # Ejemplo
    /// ```
    /// use web_server::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok);
    /// assert_eq!(response.status(), StatusCode::Ok);
    /// ```
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            version: DEFAULT_VERSION.to_string(),
            headers: Vec::new(),
            payload: Payload::Empty,
        }
    }

    /// Agrega un header (versión builder)
    ///
    /// Si la clave ya existe (ignorando mayúsculas) se reemplaza el valor
    /// conservando la posición original.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega un header (versión mutable)
    pub fn add_header(&mut self, name: &str, value: &str) {
        for entry in &mut self.headers {
            if entry.0.eq_ignore_ascii_case(name) {
                entry.1 = value.to_string();
                return;
            }
        }
        self.headers.push((name.to_string(), value.to_string()));
    }

    /// Establece el body en memoria desde un string
    ///
    /// Calcula y agrega el header `Content-Length` automáticamente.
    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// Establece el body en memoria desde bytes
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.add_header("Content-Length", &body.len().to_string());
        self.payload = Payload::Bytes(body);
        self
    }

    /// Establece el ETag de la respuesta
    pub fn with_etag(self, tag: &str) -> Self {
        self.with_header("ETag", tag)
    }

    // === Factories ===

    /// Respuesta base con los headers generales ya puestos
    ///
    /// Toda respuesta del servidor lleva Connection, Date, Server y
    /// Provider; `connection` es [`CLOSE`] o [`KEEP_ALIVE`].
    pub fn with_status(status: StatusCode, connection: &str) -> Self {
        let mut response = Self::new(status);
        response.fill_general_headers(connection);
        response
    }

    /// Respuesta con body de texto
    pub fn with_text(status: StatusCode, connection: &str, body: &str) -> Self {
        Self::with_status(status, connection).with_body(body)
    }

    /// Respuesta que streamea un archivo
    ///
    /// Agrega Last-Modified (mtime del archivo), Content-Length (tamaño),
    /// ETag (mtime en segundos desde epoch, como string) y, si la extensión
    /// se resuelve, Content-Type.
    pub fn from_file(status: StatusCode, connection: &str, path: &Path) -> io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let modified = metadata.modified()?;

        let mut response = Self::with_status(status, connection);
        response.add_header("Last-Modified", &httpdate::fmt_http_date(modified));
        response.add_header("Content-Length", &metadata.len().to_string());

        if let Some(mime) = mime_for_path(path) {
            response.add_header("Content-Type", mime);
        }

        response.add_header("ETag", &file_etag(modified));
        response.payload = Payload::File(path.to_path_buf());

        Ok(response)
    }

    /// 404 Not Found con un body corto
    pub fn not_found(connection: &str) -> Self {
        Self::with_text(StatusCode::NotFound, connection, "404 - Page Not Found!")
    }

    /// 400 Bad Request
    pub fn bad_request(connection: &str) -> Self {
        Self::with_status(StatusCode::BadRequest, connection)
    }

    /// 501 Not Implemented
    pub fn not_implemented(connection: &str) -> Self {
        Self::with_status(StatusCode::NotImplemented, connection)
    }

    /// 505 HTTP Version Not Supported
    pub fn version_not_supported(connection: &str) -> Self {
        Self::with_status(StatusCode::VersionNotSupported, connection)
    }

    /// 500 Internal Server Error
    pub fn internal_server_error(connection: &str) -> Self {
        Self::with_status(StatusCode::InternalServerError, connection)
    }

    /// 304 Not Modified
    pub fn not_modified(connection: &str) -> Self {
        Self::with_status(StatusCode::NotModified, connection)
    }

    /// 403 Forbidden
    pub fn forbidden(connection: &str) -> Self {
        Self::with_status(StatusCode::Forbidden, connection)
    }

    /// 201 Created
    pub fn created(connection: &str) -> Self {
        Self::with_status(StatusCode::Created, connection)
    }

    /// Agrega los headers generales que lleva toda respuesta
    fn fill_general_headers(&mut self, connection: &str) {
        self.add_header("Connection", connection);
        self.add_header("Date", &httpdate::fmt_http_date(SystemTime::now()));
        self.add_header("Server", SERVER_INFO);
        self.add_header("Provider", PROVIDER);
    }

    // === Escritura al socket ===

    /// Escribe la respuesta completa al stream
    ///
    /// Status line, headers en orden de inserción, línea vacía y payload.
    /// Un archivo se copia en chunks de [`CHUNK_LENGTH`] bytes.
    pub fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{} {}\r\n", self.version, self.status)?;

        for (name, value) in &self.headers {
            write!(out, "{}: {}\r\n", name, value)?;
        }
        out.write_all(b"\r\n")?;

        match &self.payload {
            Payload::Empty => {}
            Payload::Bytes(body) => out.write_all(body)?,
            Payload::File(path) => {
                let mut file = File::open(path)?;
                let mut chunk = [0u8; CHUNK_LENGTH];
                loop {
                    let bytes_read = file.read(&mut chunk)?;
                    if bytes_read == 0 {
                        break;
                    }
                    out.write_all(&chunk[..bytes_read])?;
                }
            }
        }

        out.flush()
    }

    /// Serializa la respuesta completa a bytes
    ///
    /// Conveniencia para tests; las conexiones usan [`Response::write`]
    /// directamente sobre el socket.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        // Escribir en un Vec no falla
        self.write(&mut buffer).expect("write to Vec failed");
        buffer
    }

    // === Accesores ===

    /// Obtiene el código de estado
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene la versión HTTP de la respuesta
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Obtiene un header por nombre (insensible a mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Obtiene los headers en orden de inserción
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Obtiene el ETag, si la respuesta tiene uno
    pub fn etag(&self) -> Option<&str> {
        self.header("ETag")
    }

    /// Obtiene el payload
    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

/// ETag de un archivo: su mtime en segundos desde epoch, como string
pub fn file_etag(modified: SystemTime) -> String {
    modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        .to_string()
}

/// Resuelve el tipo MIME por la extensión del archivo
fn mime_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?;
    MIME_TYPES.get(extension.to_lowercase().as_str()).copied()
}
