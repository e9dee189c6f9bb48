use snip_core::Shortener;
use snip_redirector::Redirector;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub(crate) shortener: Arc<dyn Shortener>,
    pub(crate) redirector: Arc<dyn Redirector>,
    base_url: String,
}

impl AppState {
    pub fn new(
        shortener: Arc<dyn Shortener>,
        redirector: Arc<dyn Redirector>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            shortener,
            redirector,
            base_url: public_base_url.into(),
        }
    }

    /// Prefix joined with a short code to build the public short URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
