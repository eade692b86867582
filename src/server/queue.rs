//! # Cola de Conexiones
//! src/server/queue.rs
//!
//! Cola bloqueante de productor único (el acceptor) y múltiples
//! consumidores (los workers). Los workers duermen en una condvar hasta
//! que hay trabajo o la cola se cierra; nunca hacen polling.
//!
//! ## Ciclo de vida
//!
//! ```text
//! enqueue → notify_one → dequeue (un worker despierta)
//! close   → notify_all → dequeue drena lo pendiente y luego retorna None
//! ```

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// Estado interno protegido por el mutex
struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Cola bloqueante con cierre ordenado
pub struct ConnectionQueue<T> {
    state: Mutex<QueueState<T>>,
    available: Condvar,
}

impl<T> ConnectionQueue<T> {
    /// Crea una cola vacía y abierta
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Encola un elemento y despierta un consumidor
    ///
    /// Retorna `false` si la cola ya está cerrada (el elemento se descarta).
    pub fn enqueue(&self, item: T) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return false;
        }
        state.items.push_back(item);
        self.available.notify_one();
        true
    }

    /// Extrae el siguiente elemento, bloqueando si la cola está vacía
    ///
    /// Después de `close` sigue entregando lo que quedó encolado; recién
    /// cuando la cola está vacía y cerrada retorna `None`.
    pub fn dequeue(&self) -> Option<T> {
        let mut state = self.state.lock().unwrap();

        loop {
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }
            if state.closed {
                return None;
            }
            state = self.available.wait(state).unwrap();
        }
    }

    /// Cierra la cola y despierta a todos los consumidores
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        state.closed = true;
        self.available.notify_all();
    }

    /// Cantidad de elementos pendientes
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    /// Indica si no hay elementos pendientes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for ConnectionQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
