use std::sync::Arc;
use seatlock_core::SeatRegistry;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SeatRegistry>,
}

impl AppState {
    pub fn new(registry: Arc<SeatRegistry>) -> Self {
        Self { registry }
    }
}
