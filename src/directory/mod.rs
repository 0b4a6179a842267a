use crate::error::EngineError;
use crate::models::Expert;
use crate::store::ExpertStore;

/// Single sort key per query. Anything unrecognized keeps the directory's
/// natural (registration) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Natural,
    Rating,
    PriceAsc,
    PriceDesc,
}

impl SortKey {
    pub fn parse(key: Option<&str>) -> Self {
        match key {
            Some("rating") => SortKey::Rating,
            Some("price_asc") => SortKey::PriceAsc,
            Some("price_desc") => SortKey::PriceDesc,
            _ => SortKey::Natural,
        }
    }
}

/// Filter set for a directory query. All filters are optional and compose
/// with AND semantics; defaults filter nothing.
#[derive(Debug, Clone, Default)]
pub struct ExpertFilters {
    pub search_term: Option<String>,
    pub only_available: bool,
    pub selected_languages: Vec<String>,
    /// Inclusive `[min, max]` on the published rate. While active, experts
    /// with no published rate are excluded.
    pub price_range: Option<(f64, f64)>,
    pub sort: SortKey,
}

impl ExpertFilters {
    fn admits(&self, expert: &Expert) -> bool {
        if let Some(term) = self.search_term.as_deref() {
            if !expert.matches_search(term) {
                return false;
            }
        }
        if self.only_available && !expert.available {
            return false;
        }
        if !expert.speaks_any(&self.selected_languages) {
            return false;
        }
        if let Some((min, max)) = self.price_range {
            match expert.price_per_minute {
                Some(price) => {
                    if price < min || price > max {
                        return false;
                    }
                }
                // no published rate: excluded whenever a price filter is active
                None => return false,
            }
        }
        true
    }
}

/// Filter and rank in memory. Sorts are stable, so equal keys keep the
/// directory's natural order; an absent rate orders as zero.
fn apply_filters(filters: &ExpertFilters, mut experts: Vec<Expert>) -> Vec<Expert> {
    experts.retain(|e| filters.admits(e));
    match filters.sort {
        SortKey::Natural => {}
        SortKey::Rating => experts.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        SortKey::PriceAsc => {
            experts.sort_by(|a, b| a.price_or_zero().total_cmp(&b.price_or_zero()))
        }
        SortKey::PriceDesc => {
            experts.sort_by(|a, b| b.price_or_zero().total_cmp(&a.price_or_zero()))
        }
    }
    experts
}

/// Read-only query surface over the expert store. A store failure surfaces as
/// an error, never as an empty result, so callers can tell "no expert matches"
/// from "the directory was unreachable".
pub struct ExpertDirectory {
    store: ExpertStore,
}

impl ExpertDirectory {
    pub fn new(store: ExpertStore) -> Self {
        Self { store }
    }

    pub async fn query(&self, filters: &ExpertFilters) -> Result<Vec<Expert>, EngineError> {
        let experts = self.store.list().await?;
        tracing::debug!(total = experts.len(), "evaluating directory query");
        Ok(apply_filters(filters, experts))
    }
}
