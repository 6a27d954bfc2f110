use std::sync::Arc;

use crate::config::AppConfig;
use crate::customers::CustomerDirectory;
use crate::store::ReviewCollection;

#[derive(Clone)]
pub struct AppState {
    pub reviews: Arc<dyn ReviewCollection>,
    pub customers: Arc<dyn CustomerDirectory>,
    pub config: AppConfig,
}
