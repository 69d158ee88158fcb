use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::websocket::events::SessionSummary;

pub const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Debug, Deserialize, Validate)]
pub struct ListSessionsQuery {
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SessionPage {
    pub total: usize,
    pub sessions: Vec<SessionSummary>,
}

impl SessionPage {
    pub fn paginate(all: Vec<SessionSummary>, query: &ListSessionsQuery) -> Self {
        let total = all.len();
        let sessions = all
            .into_iter()
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(DEFAULT_PAGE_SIZE))
            .collect();
        Self { total, sessions }
    }
}
