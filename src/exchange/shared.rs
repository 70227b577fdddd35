//! Thread-safe handle to one [`Exchange`].

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::error::BookError;
use crate::exchange::{Exchange, OrderRequest, SubmitReport, Venue};
use crate::orderbook::BookSnapshot;
use crate::types::Order;

/// Cloneable handle; every clone talks to the same exchange.
///
/// Each call holds the lock for the whole submit, match and settle
/// sequence, so concurrent producers are serialized into one total order.
#[derive(Debug, Clone, Default)]
pub struct SharedExchange {
    inner: Arc<Mutex<Exchange>>,
}

impl SharedExchange {
    pub fn new(exchange: Exchange) -> Self {
        Self {
            inner: Arc::new(Mutex::new(exchange)),
        }
    }

    /// Lock for several reads or writes in one critical section
    pub fn lock(&self) -> MutexGuard<'_, Exchange> {
        self.inner.lock()
    }

    /// Run `f` with exclusive access
    pub fn with<R>(&self, f: impl FnOnce(&mut Exchange) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl Venue for SharedExchange {
    fn submit_order(&mut self, request: OrderRequest) -> Result<SubmitReport, BookError> {
        self.inner.lock().submit_order(request)
    }

    fn cancel_order(&mut self, order_id: u64) -> Result<Order, BookError> {
        self.inner.lock().cancel_order(order_id)
    }

    fn snapshot(&self, levels: usize) -> BookSnapshot {
        self.inner.lock().snapshot(levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side;
    use std::thread;

    #[test]
    fn test_clones_share_state() {
        let mut a = SharedExchange::default();
        let b = a.clone();

        a.submit_order(OrderRequest::limit(1, Side::Buy, 100, 10)).unwrap();
        assert_eq!(b.snapshot(1).best_bid, Some(100));
        assert_eq!(b.with(|ex| ex.book().order_count()), 1);
    }

    #[test]
    fn test_concurrent_submits_serialize() {
        let shared = SharedExchange::default();
        let handles: Vec<_> = (0..4u64)
            .map(|owner| {
                let mut venue = shared.clone();
                thread::spawn(move || {
                    for i in 0..50u64 {
                        let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
                        let price = if side == Side::Buy { 99 } else { 101 };
                        venue
                            .submit_order(OrderRequest::limit(owner + 1, side, price, 1))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let ex = shared.lock();
        assert_eq!(ex.book().order_count(), 200);
        assert!(!ex.book().is_crossed());
        assert_eq!(ex.audit_log().len(), 200);
    }
}
