//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la configuración del servidor HTTP con soporte
//! para argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./web_server 8080 \
//!   --workers 8 \
//!   --plugins-dir ./plugins \
//!   --scan-interval 5
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 HTTP_HOST=0.0.0.0 ./web_server
//! ```

use clap::Parser;
use std::time::Duration;

/// Configuración del servidor HTTP/1.x
#[derive(Debug, Clone, Parser)]
#[command(name = "web_server")]
#[command(about = "Servidor HTTP/1.x multihilo con routing de plugins por prefijo")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(default_value = "8000", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    /// Número de workers del pool (0 = paralelismo disponible de la máquina)
    #[arg(long, default_value = "0", env = "HTTP_WORKERS")]
    pub workers: usize,

    /// Directorio donde se descubren los manifiestos de plugins
    #[arg(long = "plugins-dir", default_value = "./plugins", env = "PLUGINS_DIR")]
    pub plugins_dir: String,

    /// Segundos entre rescans del directorio de plugins
    #[arg(long = "scan-interval", default_value = "5", env = "SCAN_INTERVAL")]
    pub scan_interval_secs: u64,

    /// Timeout de lectura por socket en milisegundos (0 = sin timeout)
    #[arg(long = "read-timeout-ms", default_value = "0", env = "READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use web_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8000");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Cantidad efectiva de workers del pool
    ///
    /// Con `workers = 0` se usa el paralelismo disponible de la máquina.
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    }

    /// Intervalo entre rescans del directorio de plugins
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    /// Timeout de lectura por socket; `None` = bloquear indefinidamente
    pub fn read_timeout(&self) -> Option<Duration> {
        if self.read_timeout_ms == 0 {
            return None;
        }
        Some(Duration::from_millis(self.read_timeout_ms))
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("Host must not be empty".to_string());
        }
        if self.scan_interval_secs == 0 {
            return Err("Scan interval must be > 0".to_string());
        }
        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║               Web Server Configuration                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        println!("🌐 Network:");
        println!("   Address:       {}", self.address());
        println!();
        println!("👷 Workers:");
        println!("   Pool size:     {}", self.worker_count());
        match self.read_timeout() {
            Some(timeout) => println!("   Read timeout:  {} ms", timeout.as_millis()),
            None => println!("   Read timeout:  disabled"),
        }
        println!();
        println!("🔌 Plugins:");
        println!("   Directory:     {}", self.plugins_dir);
        println!("   Scan every:    {} seconds", self.scan_interval_secs);
        println!();
        println!("═══════════════════════════════════════════════════════════════");
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8000,
            host: "127.0.0.1".to_string(),
            workers: 0,
            plugins_dir: "./plugins".to_string(),
            scan_interval_secs: 5,
            read_timeout_ms: 0,
        }
    }
}
