use std::sync::Arc;

use crate::fetch::StatsSource;
use crate::rank::TopN;
use crate::session::Session;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Session>,
    pub source: Arc<dyn StatsSource>,
    pub default_top_n: TopN,
    pub cors_origin: String,
}
