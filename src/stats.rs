//! # Estadísticas del Servidor
//! src/stats.rs
//!
//! Contadores agregados de servicio: conexiones atendidas y tiempo total
//! de servicio. De ahí sale la tasa de servicio (conexiones por segundo)
//! que el loop de supervisión imprime periódicamente.
//!
//! Ambos contadores viven bajo un único mutex para que cada registro sea
//! atómico como par: ningún lector ve una conexión contada sin su tiempo.

use std::sync::Mutex;
use std::time::Duration;

/// Contadores internos, siempre actualizados juntos
#[derive(Debug, Default, Clone, Copy)]
struct StatsData {
    /// Conexiones atendidas (al menos una respuesta producida)
    connections: u64,

    /// Tiempo total de servicio acumulado en milisegundos
    service_time_ms: u64,
}

/// Estadísticas agregadas del servidor
#[derive(Debug, Default)]
pub struct ServerStats {
    data: Mutex<StatsData>,
}

impl ServerStats {
    /// Crea las estadísticas en cero
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra una conexión atendida con su tiempo de servicio
    pub fn record(&self, elapsed: Duration) {
        let mut data = self.data.lock().unwrap();
        data.connections += 1;
        data.service_time_ms += elapsed.as_millis() as u64;
    }

    /// Conexiones atendidas hasta ahora
    pub fn connections(&self) -> u64 {
        self.data.lock().unwrap().connections
    }

    /// Tiempo total de servicio acumulado en milisegundos
    pub fn service_time_ms(&self) -> u64 {
        self.data.lock().unwrap().service_time_ms
    }

    /// Tasa de servicio en conexiones por segundo
    ///
    /// Con tiempo acumulado cero (incluye el arranque, antes de la primera
    /// conexión) la tasa es 0.0, nunca una división por cero.
    pub fn service_rate(&self) -> f64 {
        let data = self.data.lock().unwrap();
        if data.service_time_ms == 0 {
            return 0.0;
        }
        data.connections as f64 / data.service_time_ms as f64 * 1000.0
    }
}
