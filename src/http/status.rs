//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Este módulo define los códigos de estado HTTP que reconoce el servidor.
//! El servidor emite realmente 200, 201, 304, 400, 403, 404, 500, 501 y 505;
//! el resto del conjunto se incluye para que el tipo sea completo:
//!
//! - **1xx**: Informacional (101)
//! - **2xx**: Éxito (200, 201, 202, 204)
//! - **3xx**: Redirección (301, 302, 304)
//! - **4xx**: Error del cliente (400, 401, 403, 404, 410, 418)
//! - **5xx**: Error del servidor (500, 501, 503, 505)

/// Representa los códigos de estado HTTP que reconoce el servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 101 Switching Protocols
    SwitchingProtocols = 101,

    /// 200 OK - La petición fue exitosa
    Ok = 200,

    /// 201 Created - Recurso creado
    Created = 201,

    /// 202 Accepted - Petición aceptada para procesamiento
    Accepted = 202,

    /// 204 No Content - Petición exitosa sin contenido en el body
    NoContent = 204,

    /// 301 Moved Permanently - Recurso movido de forma permanente
    MovedPermanently = 301,

    /// 302 Found - Redirección temporal
    Found = 302,

    /// 304 Not Modified - El recurso no cambió desde la versión cacheada
    NotModified = 304,

    /// 400 Bad Request - Request malformado
    BadRequest = 400,

    /// 401 Unauthorized - Falta autenticación
    Unauthorized = 401,

    /// 403 Forbidden - Acceso denegado al recurso
    Forbidden = 403,

    /// 404 Not Found - Ruta o recurso no encontrado
    NotFound = 404,

    /// 410 Gone - El recurso ya no existe
    Gone = 410,

    /// 418 I'm a teapot
    ImATeapot = 418,

    /// 500 Internal Server Error - Error interno del servidor
    InternalServerError = 500,

    /// 501 Not Implemented - Método no implementado
    NotImplemented = 501,

    /// 503 Service Unavailable - Servidor sobrecargado
    ServiceUnavailable = 503,

    /// 505 HTTP Version Not Supported - Versión HTTP no soportada
    VersionNotSupported = 505,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use web_server::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    ///
    /// # Ejemplo
    /// ```
    /// use web_server::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::SwitchingProtocols => "Switching Protocols",
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::Accepted => "Accepted",
            StatusCode::NoContent => "No Content",
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::Found => "Found",
            StatusCode::NotModified => "Not Modified",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::Gone => "Gone",
            StatusCode::ImATeapot => "I'm a teapot",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::ServiceUnavailable => "Service Unavailable",
            StatusCode::VersionNotSupported => "HTTP Version Not Supported",
        }
    }

    /// Verifica si el código indica éxito (2xx)
    ///
    /// # Ejemplo
    /// ```
    /// use web_server::http::StatusCode;
    /// assert!(StatusCode::Ok.is_success());
    /// assert!(!StatusCode::NotFound.is_success());
    /// ```
    pub fn is_success(&self) -> bool {
        let code = self.as_u16();
        (200..300).contains(&code)
    }

    /// Verifica si el código indica error del cliente (4xx)
    pub fn is_client_error(&self) -> bool {
        let code = self.as_u16();
        (400..500).contains(&code)
    }

    /// Verifica si el código indica error del servidor (5xx)
    pub fn is_server_error(&self) -> bool {
        let code = self.as_u16();
        (500..600).contains(&code)
    }
}

impl std::fmt::Display for StatusCode {
    /// Formatea el código de estado para mostrarlo
    ///
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
