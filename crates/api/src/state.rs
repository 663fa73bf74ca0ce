use kestrel_dns_infrastructure::dns::ResolverService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ResolverService>,
}

impl AppState {
    pub fn new(service: Arc<ResolverService>) -> Self {
        Self { service }
    }
}
