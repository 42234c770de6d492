use std::sync::Arc;

use crate::observer::Observer;
use crate::resolver::Resolver;

pub struct AppState {
    pub resolver: Arc<dyn Resolver>,
    pub observer: Arc<dyn Observer>,
}
