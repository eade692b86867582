//! # Conexiones Persistentes
//! src/server/connection.rs
//!
//! Máquina de estados de una conexión: un worker la corre de punta a punta
//! sobre su propio socket, sin tocar ningún otro.
//!
//! ```text
//! READ → VALIDATE → ROUTE → EXECUTE → WRITE → (keep-alive) → READ
//!                                           ↘ (close) → fin
//! ```
//!
//! Reglas del ciclo:
//! - Falta de protocolo (400/501) o versión no soportada (505): una única
//!   respuesta best-effort y la conexión se cierra.
//! - Cierre limpio del peer o fallo de I/O antes de producir una respuesta:
//!   la conexión termina en silencio y no cuenta en las estadísticas.
//! - La conexión queda viva solo si el request fue ruteado a un handler y
//!   trajo `Connection: keep-alive` (insensible a mayúsculas); un request
//!   sin dueño recibe el 404 por defecto y la conexión se cierra aunque
//!   haya pedido keep-alive. La respuesta refleja la decisión real en su
//!   propio header Connection.
//! - Un pánico del handler se contiene: 500 y cierre forzado, el worker
//!   sobrevive.

use crate::http::{request::ReadError, response, ParseError, Request, Response};
use crate::router::Router;
use crate::stats::ServerStats;
use std::io::BufReader;
use std::net::{Shutdown, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Versiones HTTP que el servidor acepta
const SUPPORTED_VERSIONS: [&str; 2] = ["HTTP/1.1", "HTTP/1.0"];

/// Corre conexiones completas contra el router
pub struct ConnectionHandler {
    /// Router que selecciona el handler por prefijo
    router: Arc<Router>,

    /// Estadísticas agregadas del servidor
    stats: Arc<ServerStats>,

    /// Timeout de lectura del socket; `None` = bloquear indefinidamente
    read_timeout: Option<Duration>,
}

impl ConnectionHandler {
    /// Crea un handler de conexiones
    pub fn new(
        router: Arc<Router>,
        stats: Arc<ServerStats>,
        read_timeout: Option<Duration>,
    ) -> Self {
        Self {
            router,
            stats,
            read_timeout,
        }
    }

    /// Atiende una conexión completa hasta que se cierra
    ///
    /// Cada vuelta del loop lee un request y escribe una respuesta; el
    /// tiempo de servicio se mide desde el primer byte del request hasta
    /// después de escribir la respuesta.
    pub fn run(&self, stream: TcpStream) {
        if stream.set_read_timeout(self.read_timeout).is_err() {
            return;
        }

        let read_half = match stream.try_clone() {
            Ok(clone) => clone,
            Err(e) => {
                eprintln!("   ❌ Error clonando socket: {}", e);
                return;
            }
        };
        let mut reader = BufReader::new(read_half);
        let mut writer = stream;

        loop {
            let started = Instant::now();

            // READ
            let mut request = match Request::read(&mut reader) {
                Ok(request) => request,
                Err(ReadError::ConnectionClosed) | Err(ReadError::Io(_)) => break,
                Err(ReadError::Protocol(fault)) => {
                    let response = match fault {
                        ParseError::BadRequest(_) => Response::bad_request(response::CLOSE),
                        ParseError::NotImplemented(_) => {
                            Response::not_implemented(response::CLOSE)
                        }
                    };
                    self.write_response(&mut writer, &response, started);
                    break;
                }
            };

            // VALIDATE
            if !Self::version_supported(request.version()) {
                let response = Response::version_not_supported(response::CLOSE);
                self.write_response(&mut writer, &response, started);
                break;
            }

            // ROUTE: sin dueño, el 404 por defecto cierra la conexión siempre
            let (handler, routed) = match self.router.dispatch(&mut request) {
                Some(handler) => (handler, true),
                None => (self.router.default_handler(), false),
            };

            let mut keep_alive = routed
                && request
                    .header("connection")
                    .map(|v| v.eq_ignore_ascii_case("keep-alive"))
                    .unwrap_or(false);

            // EXECUTE: un pánico del handler no tumba al worker
            let mut response =
                match panic::catch_unwind(AssertUnwindSafe(|| handler.handle_request(&request))) {
                    Ok(response) => response,
                    Err(_) => {
                        eprintln!(
                            "   ❌ Handler entró en pánico atendiendo {} {}",
                            request.method().as_str(),
                            request.uri()
                        );
                        keep_alive = false;
                        Response::internal_server_error(response::CLOSE)
                    }
                };

            // La respuesta refleja la decisión real sobre la conexión
            let connection = if keep_alive {
                response::KEEP_ALIVE
            } else {
                response::CLOSE
            };
            response.add_header("Connection", connection);

            // WRITE
            if !self.write_response(&mut writer, &response, started) {
                break;
            }

            if !keep_alive {
                break;
            }
        }

        let _ = writer.shutdown(Shutdown::Both);
    }

    /// Escribe una respuesta y registra la conexión atendida
    ///
    /// Toda respuesta producida cuenta en las estadísticas, incluso si la
    /// escritura al socket falla. Retorna `false` si la escritura falló.
    fn write_response<W: std::io::Write>(
        &self,
        writer: &mut W,
        response: &Response,
        started: Instant,
    ) -> bool {
        let result = response.write(writer);
        self.stats.record(started.elapsed());

        if let Err(e) = result {
            eprintln!("   ❌ Error escribiendo respuesta: {}", e);
            return false;
        }
        true
    }

    /// Valida la versión HTTP del request
    fn version_supported(version: &str) -> bool {
        SUPPORTED_VERSIONS
            .iter()
            .any(|supported| version.eq_ignore_ascii_case(supported))
    }
}
