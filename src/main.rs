//! # Web Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor. Arma el router, las estadísticas y el
//! registry de plugins, lanza el servidor en su propio thread y se queda
//! en el loop de supervisión: rescan de plugins y reporte de la tasa de
//! servicio cada intervalo configurado.

use std::sync::Arc;
use std::thread;

use web_server::config::Config;
use web_server::plugins::PluginRegistry;
use web_server::router::Router;
use web_server::server::Server;
use web_server::stats::ServerStats;

fn main() {
    println!("=================================");
    println!("  Web Server HTTP/1.x");
    println!("=================================\n");

    let config = Config::new();

    if let Err(e) = config.validate() {
        eprintln!("💥 Configuración inválida: {}", e);
        std::process::exit(1);
    }

    config.print_summary();

    let router = Arc::new(Router::new());
    let stats = Arc::new(ServerStats::new());
    let registry = PluginRegistry::new(config.plugins_dir.clone());

    // Tabla inicial antes de aceptar la primera conexión
    registry.rescan(&router);

    let scan_interval = config.scan_interval();
    let server = Server::new(config, Arc::clone(&router), Arc::clone(&stats));

    let runner = {
        let server = Arc::clone(&server);
        thread::spawn(move || server.run())
    };

    // Loop de supervisión: rescan de plugins y reporte periódico
    while server.is_running() && !runner.is_finished() {
        thread::sleep(scan_interval);
        registry.rescan(&router);
        println!("Service Rate: {:.2}", stats.service_rate());
    }

    match runner.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            eprintln!("💥 Error fatal: {}", e);
            std::process::exit(1);
        }
        Err(_) => {
            eprintln!("💥 El thread del servidor entró en pánico");
            std::process::exit(1);
        }
    }
}
