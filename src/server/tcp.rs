//! # Servidor TCP
//! src/server/tcp.rs
//!
//! Acceptor y pool de workers del servidor.
//!
//! ## Arquitectura
//!
//! ```text
//! accept loop ──enqueue──▶ ConnectionQueue ──dequeue──▶ worker-0..N-1
//! ```
//!
//! Un único thread acepta conexiones y las encola; N workers de vida
//! completa las atienden una a la vez. El shutdown es cooperativo: `stop`
//! marca la bandera, se conecta a sí mismo para desbloquear el `accept`,
//! y cierra la cola para que los workers drenen lo pendiente y terminen.

use crate::config::Config;
use crate::router::Router;
use crate::server::connection::ConnectionHandler;
use crate::server::queue::ConnectionQueue;
use crate::stats::ServerStats;
use std::io;
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Servidor HTTP multihilo
pub struct Server {
    /// Configuración de arranque
    config: Config,

    /// Router compartido con todos los workers
    router: Arc<Router>,

    /// Estadísticas agregadas
    stats: Arc<ServerStats>,

    /// Cola de conexiones aceptadas pendientes de atención
    queue: Arc<ConnectionQueue<TcpStream>>,

    /// Bandera de parada del acceptor
    stop: AtomicBool,

    /// Puerto real después del bind (relevante con puerto 0)
    bound_port: AtomicU16,

    /// Workers vivos, para join en el shutdown
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl Server {
    /// Crea un servidor listo para correr
    pub fn new(config: Config, router: Arc<Router>, stats: Arc<ServerStats>) -> Arc<Self> {
        Arc::new(Self {
            config,
            router,
            stats,
            queue: Arc::new(ConnectionQueue::new()),
            stop: AtomicBool::new(false),
            bound_port: AtomicU16::new(0),
            workers: Mutex::new(Vec::new()),
        })
    }

    /// Corre el servidor: bind, workers y accept loop
    ///
    /// Bloquea hasta que [`Server::stop`] detiene el acceptor; antes de
    /// retornar drena la cola y espera a todos los workers.
    pub fn run(self: &Arc<Self>) -> io::Result<()> {
        let listener = TcpListener::bind(self.config.address())?;
        let local = listener.local_addr()?;
        self.bound_port.store(local.port(), Ordering::SeqCst);

        // Un stop() anterior al bind no encontró puerto al que conectarse
        // para despertar el accept; re-chequear antes de entrar al loop
        if self.stop.load(Ordering::SeqCst) {
            self.queue.close();
            println!("   ✅ Servidor detenido");
            return Ok(());
        }

        println!("   ✅ Servidor escuchando en http://{}", local);

        self.spawn_workers();

        for stream in listener.incoming() {
            if self.stop.load(Ordering::SeqCst) {
                break;
            }

            match stream {
                Ok(stream) => {
                    if !self.queue.enqueue(stream) {
                        break;
                    }
                }
                Err(e) => {
                    eprintln!("   ❌ Error aceptando conexión: {}", e);
                }
            }
        }

        // Los workers drenan lo encolado y terminan
        self.queue.close();
        self.join_workers();

        println!("   ✅ Servidor detenido");
        Ok(())
    }

    /// Lanza el pool de workers
    fn spawn_workers(self: &Arc<Self>) {
        let count = self.config.worker_count();
        println!("   ✅ Lanzando {} workers", count);

        let mut workers = self.workers.lock().unwrap();
        for id in 0..count {
            let queue = Arc::clone(&self.queue);
            let connections = ConnectionHandler::new(
                Arc::clone(&self.router),
                Arc::clone(&self.stats),
                self.config.read_timeout(),
            );

            let worker = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || {
                    while let Some(stream) = queue.dequeue() {
                        connections.run(stream);
                    }
                });

            match worker {
                Ok(handle) => workers.push(handle),
                Err(e) => eprintln!("   ❌ Error lanzando worker-{}: {}", id, e),
            }
        }
    }

    /// Espera a que todos los workers terminen
    fn join_workers(&self) {
        let workers = {
            let mut guard = self.workers.lock().unwrap();
            std::mem::take(&mut *guard)
        };
        for worker in workers {
            let _ = worker.join();
        }
    }

    /// Detiene el servidor de forma ordenada
    ///
    /// Idempotente. El acceptor puede estar bloqueado en `accept`, así que
    /// después de marcar la bandera se conecta a sí mismo para despertarlo.
    pub fn stop(&self) {
        if self.stop.swap(true, Ordering::SeqCst) {
            return;
        }

        let port = self.bound_port.load(Ordering::SeqCst);
        if port != 0 {
            // Conexión dummy que desbloquea el accept
            let _ = TcpStream::connect(("127.0.0.1", port));
        }

        self.queue.close();
    }

    /// Indica si el servidor sigue corriendo
    pub fn is_running(&self) -> bool {
        !self.stop.load(Ordering::SeqCst)
    }

    /// Puerto real en el que escucha el servidor (0 antes del bind)
    pub fn local_port(&self) -> u16 {
        self.bound_port.load(Ordering::SeqCst)
    }

    /// Router del servidor
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Estadísticas del servidor
    pub fn stats(&self) -> &Arc<ServerStats> {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{DemoHandler, RequestHandler};
    use std::io::{Read as _, Write as _};
    use std::time::Duration;

    /// Levanta un servidor en puerto efímero con un DemoHandler en /TestPlugin
    fn start_server() -> (Arc<Server>, thread::JoinHandle<io::Result<()>>) {
        let config = Config {
            port: 0,
            workers: 2,
            ..Config::default()
        };
        let handlers: Vec<Arc<dyn RequestHandler>> =
            vec![Arc::new(DemoHandler::new(vec!["/TestPlugin".to_string()]))];
        let router = Arc::new(Router::with_handlers(handlers));
        let stats = Arc::new(ServerStats::new());

        let server = Server::new(config, router, stats);
        let runner = {
            let server = Arc::clone(&server);
            thread::spawn(move || server.run())
        };

        // Esperar el bind
        for _ in 0..100 {
            if server.local_port() != 0 {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert_ne!(server.local_port(), 0, "server did not bind");

        (server, runner)
    }

    fn request(port: u16, raw: &[u8]) -> String {
        let mut client = TcpStream::connect(("127.0.0.1", port)).unwrap();
        client.write_all(raw).unwrap();
        let mut response = String::new();
        client.read_to_string(&mut response).unwrap();
        response
    }

    #[test]
    fn test_serves_and_stops() {
        let (server, runner) = start_server();
        let port = server.local_port();

        let response = request(port, b"GET /TestPlugin/info HTTP/1.1\r\n\r\n");
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));

        assert!(server.is_running());
        server.stop();
        assert!(!server.is_running());

        runner.join().unwrap().unwrap();
        assert_eq!(server.stats().connections(), 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (server, runner) = start_server();

        server.stop();
        server.stop();

        runner.join().unwrap().unwrap();
    }

    #[test]
    fn test_stop_before_run_does_not_block_accept() {
        let config = Config {
            port: 0,
            workers: 2,
            ..Config::default()
        };
        let router = Arc::new(Router::new());
        let stats = Arc::new(ServerStats::new());
        let server = Server::new(config, router, stats);

        // stop() antes del bind: no hay puerto al que hacer la conexión dummy
        server.stop();

        let runner = {
            let server = Arc::clone(&server);
            thread::spawn(move || server.run())
        };

        // run() debe retornar solo, sin quedarse bloqueado en accept
        runner.join().unwrap().unwrap();
    }

    #[test]
    fn test_concurrent_clients_get_their_own_responses() {
        let (server, runner) = start_server();
        let port = server.local_port();

        let mut clients = Vec::new();
        for i in 0..8 {
            clients.push(thread::spawn(move || {
                let raw = format!("GET /TestPlugin/client-{} HTTP/1.1\r\n\r\n", i);
                let response = request(port, raw.as_bytes());
                assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
                // Cada cliente recibe la respuesta de SU request
                assert!(response.contains(&format!("/TestPlugin/client-{}", i)));
            }));
        }

        for client in clients {
            client.join().unwrap();
        }

        server.stop();
        runner.join().unwrap().unwrap();
        assert_eq!(server.stats().connections(), 8);
    }

    #[test]
    fn test_stats_visible_while_running() {
        let (server, runner) = start_server();
        let port = server.local_port();

        request(port, b"GET /TestPlugin HTTP/1.1\r\n\r\n");
        request(port, b"GET /nope HTTP/1.1\r\n\r\n");

        assert_eq!(server.stats().connections(), 2);

        server.stop();
        runner.join().unwrap().unwrap();
    }
}
