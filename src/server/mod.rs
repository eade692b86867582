//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el plano de conexiones del servidor:
//! 1. El acceptor escucha en un puerto y encola conexiones aceptadas
//! 2. Un pool de workers las desencola y las atiende
//! 3. Cada conexión corre su máquina de estados hasta cerrarse

pub mod connection;
pub mod queue;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use connection::ConnectionHandler;
pub use queue::ConnectionQueue;
pub use tcp::Server;
