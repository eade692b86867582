//! # Parsing de Requests HTTP/1.x
//! src/http/request.rs
//!
//! Este módulo implementa un parser HTTP/1.0 / HTTP/1.1 desde cero,
//! leyendo directamente del stream de la conexión.
//!
//! ## Formato de un Request
//!
//! ```text
//! GET /ruta?param1=value1&param2=value2 HTTP/1.1\r\n
//! Host: localhost:8000\r\n
//! Connection: keep-alive\r\n
//! \r\n
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD /uri VERSION` (exactamente 3 tokens)
//! 2. **Headers**: Pares `Name: Value`, claves en minúscula, última escritura gana
//! 3. **Empty Line**: `\r\n` que separa headers del body
//! 4. **Body**: delimitado por Content-Length si existe; si no, lo que ya
//!    llegó junto con los headers

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};

/// Métodos HTTP soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Obtener un recurso
    GET,

    /// PUT - Reemplazar un recurso
    PUT,

    /// POST - Enviar datos a un recurso
    POST,

    /// DELETE - Eliminar un recurso
    DELETE,

    /// HEAD - Como GET pero solo retorna headers
    HEAD,
}

impl Method {
    /// Parsea un método HTTP desde el token de la request line
    ///
    /// # Errores
    ///
    /// Un token desconocido se clasifica como `NotImplemented` (501),
    /// no como request malformado.
    fn from_token(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            "PUT" => Ok(Method::PUT),
            "POST" => Ok(Method::POST),
            "DELETE" => Ok(Method::DELETE),
            "HEAD" => Ok(Method::HEAD),
            _ => Err(ParseError::NotImplemented(s.to_string())),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::PUT => "PUT",
            Method::POST => "POST",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
        }
    }
}

/// Faltas de protocolo detectadas durante el parsing
///
/// La taxonomía es la del conector: `BadRequest` produce un 400 y
/// `NotImplemented` un 501; en ambos casos la conexión se cierra después
/// de una única respuesta best-effort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Request line malformada o stream truncado a mitad de los headers
    BadRequest(String),

    /// Método HTTP desconocido
    NotImplemented(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::BadRequest(detail) => write!(f, "Bad request: {}", detail),
            ParseError::NotImplemented(method) => {
                write!(f, "Method not implemented: {}", method)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Resultado de intentar leer un request del stream
///
/// Separa las tres situaciones que el conector trata distinto:
/// falta de protocolo (responde y cierra), cierre limpio del peer
/// (termina en silencio) y fallo de transporte (termina en silencio).
#[derive(Debug)]
pub enum ReadError {
    /// El peer cerró la conexión antes de enviar un request
    ConnectionClosed,

    /// Falta de protocolo clasificada
    Protocol(ParseError),

    /// Fallo de I/O del socket (incluye timeout de lectura)
    Io(std::io::Error),
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::ConnectionClosed => write!(f, "Connection closed by peer"),
            ReadError::Protocol(e) => write!(f, "{}", e),
            ReadError::Io(e) => write!(f, "Socket I/O error: {}", e),
        }
    }
}

impl std::error::Error for ReadError {}

impl From<std::io::Error> for ReadError {
    fn from(e: std::io::Error) -> Self {
        ReadError::Io(e)
    }
}

impl From<ParseError> for ReadError {
    fn from(e: ParseError) -> Self {
        ReadError::Protocol(e)
    }
}

/// Representa un request HTTP parseado
///
/// Inmutable después del parsing, con una única excepción: el router
/// escribe `relative_uri` exactamente una vez al seleccionar el handler.
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP
    method: Method,

    /// URI de la petición; para GET/HEAD el sufijo `?query` ya fue separado
    uri: String,

    /// URI relativa al prefijo de ruta que el router seleccionó
    relative_uri: Option<String>,

    /// Versión HTTP tal como llegó (ej: "HTTP/1.1")
    version: String,

    /// Headers con clave en minúscula; clave duplicada: la última gana
    headers: HashMap<String, String>,

    /// Body del request tal como llegó
    body: Vec<u8>,

    /// Query parameters derivados de la URI o del body form-encoded
    query_params: HashMap<String, String>,
}

impl Request {
    /// Lee y parsea un request del stream de la conexión
    ///
    /// Lee exactamente un mensaje: request line, headers hasta la línea
    /// vacía, y el body. El body es delimitado por `Content-Length` cuando
    /// ese header existe y es parseable; si no, se toma lo que ya quedó
    /// buffereado detrás de los headers (así un cliente keep-alive que no
    /// envía body no bloquea la lectura).
    ///
    /// # Errores
    ///
    /// * `ReadError::ConnectionClosed` - EOF antes del primer byte
    /// * `ReadError::Protocol(_)` - request line malformada o método desconocido
    /// * `ReadError::Io(_)` - fallo del socket
    pub fn read<R: Read>(reader: &mut BufReader<R>) -> Result<Self, ReadError> {
        // 1. Request line
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err(ReadError::ConnectionClosed);
        }

        let (method, uri, version) = Self::parse_request_line(line.trim_end_matches(['\r', '\n']))?;

        // 2. Headers hasta la línea vacía
        let headers = Self::parse_headers(reader)?;

        // 3. Body
        let body = Self::read_body(reader, &headers)?;

        let mut request = Request {
            method,
            uri,
            relative_uri: None,
            version,
            headers,
            body,
            query_params: HashMap::new(),
        };

        request.extract_query_params();

        Ok(request)
    }

    /// Parsea un request completo desde un buffer en memoria
    ///
    /// Conveniencia para tests y fixtures; equivale a `read` sobre el buffer.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use web_server::http::Request;
    ///
    /// let raw = b"GET /TestPlugin/info?num=10 HTTP/1.1\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.uri(), "/TestPlugin/info");
    /// assert_eq!(request.query_param("num"), Some("10"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ReadError> {
        let mut reader = BufReader::new(buffer);
        Self::read(&mut reader)
    }

    /// Parsea la request line
    ///
    /// Debe tokenizar en exactamente 3 campos: `METHOD URI VERSION`.
    fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        if parts.len() != 3 {
            return Err(ParseError::BadRequest(format!(
                "request line must have 3 tokens, got {}",
                parts.len()
            )));
        }

        let method = Method::from_token(parts[0])?;

        Ok((method, parts[1].to_string(), parts[2].to_string()))
    }

    /// Lee headers hasta la línea vacía
    ///
    /// Una línea se acepta como header solo si contiene un espacio interno
    /// que no está en la posición 0 ni al final; la clave es el texto antes
    /// del espacio, en minúscula y sin el ':' final. Líneas que no cumplen
    /// se ignoran. Clave repetida: la última escritura gana.
    fn parse_headers<R: Read>(
        reader: &mut BufReader<R>,
    ) -> Result<HashMap<String, String>, ReadError> {
        let mut headers = HashMap::new();

        loop {
            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                // EOF a mitad de los headers: el mensaje quedó truncado
                return Err(ParseError::BadRequest(
                    "unexpected end of stream while reading headers".to_string(),
                )
                .into());
            }

            let line = line.trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() {
                break;
            }

            if let Some(index) = line.find(' ') {
                if index > 0 && index < line.len() - 1 {
                    let key = line[..index]
                        .trim()
                        .trim_end_matches(':')
                        .to_lowercase();
                    let value = line[index + 1..].trim().to_string();
                    headers.insert(key, value);
                }
            }
        }

        Ok(headers)
    }

    /// Lee el body del request
    ///
    /// Con `Content-Length` parseable la lectura es exacta; sin él, se toma
    /// lo que el reader ya tiene buffereado (el equivalente no-bloqueante
    /// del "leer mientras haya datos disponibles" del protocolo).
    fn read_body<R: Read>(
        reader: &mut BufReader<R>,
        headers: &HashMap<String, String>,
    ) -> Result<Vec<u8>, ReadError> {
        if let Some(length) = headers
            .get("content-length")
            .and_then(|v| v.parse::<usize>().ok())
        {
            let mut body = vec![0u8; length];
            reader.read_exact(&mut body)?;
            return Ok(body);
        }

        let buffered = reader.buffer().to_vec();
        reader.consume(buffered.len());
        Ok(buffered)
    }

    /// Deriva los query parameters del request
    ///
    /// Para GET/HEAD el `?query` se separa de la URI (la URI queda solo con
    /// el path). Para los demás métodos, el body se interpreta como query
    /// string únicamente si `Content-Type` es exactamente (ignorando
    /// mayúsculas) `application/x-www-form-urlencoded`.
    fn extract_query_params(&mut self) {
        match self.method {
            Method::GET | Method::HEAD => {
                if let Some(pos) = self.uri.find('?') {
                    let query = self.uri[pos + 1..].to_string();
                    self.uri.truncate(pos);
                    self.query_params = Self::parse_query_string(&query);
                }
            }
            _ => {
                let is_form = self
                    .headers
                    .get("content-type")
                    .map(|v| v.eq_ignore_ascii_case("application/x-www-form-urlencoded"))
                    .unwrap_or(false);

                if is_form {
                    if let Ok(body) = std::str::from_utf8(&self.body) {
                        self.query_params = Self::parse_query_string(body);
                    }
                }
            }
        }
    }

    /// Parsea una query string en un HashMap
    ///
    /// Pares separados por '&', cada uno `key=value` o clave sin valor.
    /// Los valores se decodifican percent-encoding; las claves no.
    fn parse_query_string(query: &str) -> HashMap<String, String> {
        // Tolerar un '?' inicial residual
        let query = query.strip_prefix('?').unwrap_or(query);

        let mut params = HashMap::new();

        for pair in query.split('&') {
            if pair.is_empty() {
                continue;
            }

            match pair.find('=') {
                Some(index) => {
                    let key = &pair[..index];
                    let value = Self::percent_decode(&pair[index + 1..]);
                    params.insert(key.to_string(), value);
                }
                None => {
                    // Parámetro sin valor (ej: "?debug")
                    params.insert(pair.to_string(), String::new());
                }
            }
        }

        params
    }

    /// Decodifica percent-encoding: `%XX` a su byte y '+' a espacio
    fn percent_decode(s: &str) -> String {
        let bytes = s.as_bytes();
        let mut decoded = Vec::with_capacity(bytes.len());
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'+' => {
                    decoded.push(b' ');
                    i += 1;
                }
                b'%' if i + 2 < bytes.len() => {
                    let hi = (bytes[i + 1] as char).to_digit(16);
                    let lo = (bytes[i + 2] as char).to_digit(16);
                    match (hi, lo) {
                        (Some(hi), Some(lo)) => {
                            decoded.push((hi * 16 + lo) as u8);
                            i += 3;
                        }
                        _ => {
                            // '%' sin hex válido se deja tal cual
                            decoded.push(b'%');
                            i += 1;
                        }
                    }
                }
                other => {
                    decoded.push(other);
                    i += 1;
                }
            }
        }

        String::from_utf8_lossy(&decoded).into_owned()
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> Method {
        self.method
    }

    /// Obtiene la URI del request (sin query string para GET/HEAD)
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// URI relativa al prefijo de ruta seleccionado por el router
    ///
    /// `None` hasta que el router despacha el request.
    pub fn relative_uri(&self) -> Option<&str> {
        self.relative_uri.as_deref()
    }

    /// Escribe la URI relativa; la llama el router exactamente una vez
    pub(crate) fn set_relative_uri(&mut self, relative: String) {
        debug_assert!(self.relative_uri.is_none(), "relative_uri written twice");
        self.relative_uri = Some(relative);
    }

    /// Obtiene la versión HTTP tal como llegó
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Obtiene un header por nombre (insensible a mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|s| s.as_str())
    }

    /// Obtiene todos los headers (claves en minúscula)
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene el body del request
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Obtiene el body del request como String
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    /// Obtiene un query parameter específico
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(|s| s.as_str())
    }

    /// Obtiene todos los query parameters
    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_get() {
        let raw = b"GET / HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.uri(), "/");
        assert_eq!(request.version(), "HTTP/1.1");
        assert!(request.query_params().is_empty());
        assert!(request.relative_uri().is_none());
    }

    #[test]
    fn test_parse_all_methods() {
        for (token, method) in [
            ("GET", Method::GET),
            ("PUT", Method::PUT),
            ("POST", Method::POST),
            ("DELETE", Method::DELETE),
            ("HEAD", Method::HEAD),
        ] {
            let raw = format!("{} /x HTTP/1.1\r\n\r\n", token);
            let request = Request::parse(raw.as_bytes()).unwrap();
            assert_eq!(request.method(), method);
        }
    }

    #[test]
    fn test_unknown_method_is_not_implemented() {
        let raw = b"BOGUS / HTTP/1.1\r\n\r\n";
        let result = Request::parse(raw);

        assert!(matches!(
            result,
            Err(ReadError::Protocol(ParseError::NotImplemented(_)))
        ));
    }

    #[test]
    fn test_request_line_with_wrong_token_count() {
        let raw = b"GET /\r\n\r\n";
        let result = Request::parse(raw);

        assert!(matches!(
            result,
            Err(ReadError::Protocol(ParseError::BadRequest(_)))
        ));
    }

    #[test]
    fn test_empty_stream_is_connection_closed() {
        let raw = b"";
        let result = Request::parse(raw);

        assert!(matches!(result, Err(ReadError::ConnectionClosed)));
    }

    #[test]
    fn test_headers_lowercased_and_trimmed() {
        let raw = b"GET / HTTP/1.1\r\nHost: localhost:8000\r\nUser-Agent:   test  \r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.header("host"), Some("localhost:8000"));
        assert_eq!(request.header("HOST"), Some("localhost:8000"));
        assert_eq!(request.header("User-Agent"), Some("test"));
    }

    #[test]
    fn test_duplicate_header_last_write_wins() {
        let raw = b"GET / HTTP/1.1\r\nX-Tag: first\r\nX-Tag: second\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.header("x-tag"), Some("second"));
    }

    #[test]
    fn test_malformed_header_line_is_skipped() {
        // Sin espacio interno: no es un header, pero el request sigue siendo válido
        let raw = b"GET / HTTP/1.1\r\nnospace\r\nHost: here\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.header("host"), Some("here"));
    }

    #[test]
    fn test_truncated_headers_is_bad_request() {
        let raw = b"GET / HTTP/1.1\r\nHost: here\r\n";
        let result = Request::parse(raw);

        assert!(matches!(
            result,
            Err(ReadError::Protocol(ParseError::BadRequest(_)))
        ));
    }

    #[test]
    fn test_query_params_from_uri() {
        let raw = b"GET /calc?num=42&text=hello&fast HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.uri(), "/calc");
        assert_eq!(request.query_param("num"), Some("42"));
        assert_eq!(request.query_param("text"), Some("hello"));
        assert_eq!(request.query_param("fast"), Some(""));
    }

    #[test]
    fn test_query_value_percent_decoded() {
        let raw = b"GET /echo?text=hello%20world&plus=a+b HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.query_param("text"), Some("hello world"));
        assert_eq!(request.query_param("plus"), Some("a b"));
    }

    #[test]
    fn test_query_key_not_decoded() {
        let raw = b"GET /echo?a%20b=c HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.query_param("a%20b"), Some("c"));
        assert_eq!(request.query_param("a b"), None);
    }

    #[test]
    fn test_body_with_content_length() {
        let raw = b"POST /submit HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.body(), b"hello");
    }

    #[test]
    fn test_body_without_content_length_takes_buffered() {
        let raw = b"POST /submit HTTP/1.1\r\nHost: x.y\r\n\r\ntrailing-data";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.body(), b"trailing-data");
    }

    #[test]
    fn test_form_encoded_body_parsed_as_query() {
        let raw = b"POST /submit HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 13\r\n\r\nuser=ana&n=10";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.query_param("user"), Some("ana"));
        assert_eq!(request.query_param("n"), Some("10"));
    }

    #[test]
    fn test_non_form_body_not_parsed_as_query() {
        let raw = b"POST /submit HTTP/1.1\r\nContent-Type: text/plain\r\nContent-Length: 8\r\n\r\nuser=ana";
        let request = Request::parse(raw).unwrap();

        assert!(request.query_params().is_empty());
        assert_eq!(request.body(), b"user=ana");
    }

    #[test]
    fn test_head_uri_query_split() {
        let raw = b"HEAD /doc/page.html?v=2 HTTP/1.0\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.uri(), "/doc/page.html");
        assert_eq!(request.query_param("v"), Some("2"));
    }

    /// Serializa un request a su forma de wire desde sus componentes
    fn to_wire(method: &str, uri: &str, version: &str, headers: &[(String, String)]) -> String {
        let mut wire = format!("{} {} {}\r\n", method, uri, version);
        for (name, value) in headers {
            wire.push_str(&format!("{}: {}\r\n", name, value));
        }
        wire.push_str("\r\n");
        wire
    }

    #[test]
    fn test_wire_round_trip_recovers_request() {
        let method = "POST";
        let uri = "/TestPlugin/submit";
        let version = "HTTP/1.1";
        let fixture_headers = vec![
            ("Host".to_string(), "localhost:8000".to_string()),
            ("Connection".to_string(), "keep-alive".to_string()),
            ("Content-Length".to_string(), "0".to_string()),
        ];

        // Fixture → wire → parse
        let wire = to_wire(method, uri, version, &fixture_headers);
        let first = Request::parse(wire.as_bytes()).unwrap();

        assert_eq!(first.method(), Method::POST);
        assert_eq!(first.uri(), uri);
        assert_eq!(first.version(), version);
        for (name, value) in &fixture_headers {
            // Las claves sobreviven módulo mayúsculas; los valores, exactos
            assert_eq!(first.header(name), Some(value.as_str()));
        }

        // Parse → wire → parse: la segunda pasada recupera lo mismo
        let reserialized_headers: Vec<(String, String)> = first
            .headers()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let wire = to_wire(
            first.method().as_str(),
            first.uri(),
            first.version(),
            &reserialized_headers,
        );
        let second = Request::parse(wire.as_bytes()).unwrap();

        assert_eq!(second.method(), first.method());
        assert_eq!(second.uri(), first.uri());
        assert_eq!(second.version(), first.version());
        assert_eq!(second.headers(), first.headers());
    }

    #[test]
    fn test_version_preserved_verbatim() {
        let raw = b"GET / HTTP/2.0\r\n\r\n";
        // El parser no valida la versión; eso lo hace el conector (505)
        let request = Request::parse(raw).unwrap();
        assert_eq!(request.version(), "HTTP/2.0");
    }
}
