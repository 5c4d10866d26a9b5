use crate::domain::{SuffixTable, normalize_with};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;
use vaultprivacy_lookup::{RatingCache, RatingClient, RatingRecord, ServiceSearch};

/// Called before each lookup with `(position, total, domain)`, position
/// counting from 1.
pub type AnalysisProgressCallback = Arc<dyn Fn(usize, usize, &str) + Send + Sync>;

/// Normalize again, drop empties and duplicates, keep first-seen order.
pub fn unique_root_domains(domains: &[String], suffixes: &dyn SuffixTable) -> Vec<String> {
    let mut seen = HashSet::new();
    domains
        .iter()
        .map(|domain| normalize_with(domain, suffixes))
        .filter(|domain| !domain.is_empty())
        .filter(|domain| seen.insert(domain.clone()))
        .collect()
}

/// Rate every unique root domain, one lookup at a time.
///
/// Always returns one record per unique root domain; failed lookups come
/// back as `Unknown`.
pub async fn analyze<S: ServiceSearch>(
    domains: &[String],
    suffixes: &dyn SuffixTable,
    client: &RatingClient<S>,
    cache: &mut RatingCache,
    progress_callback: Option<AnalysisProgressCallback>,
) -> Vec<RatingRecord> {
    let roots = unique_root_domains(domains, suffixes);
    let total = roots.len();
    let cached = roots.iter().filter(|domain| cache.contains(domain)).count();
    info!("Rating {} root domains ({} cached)", total, cached);

    let mut results = Vec::with_capacity(total);
    for (index, domain) in roots.iter().enumerate() {
        if let Some(ref callback) = progress_callback {
            callback(index + 1, total, domain);
        }
        let mut record = client.lookup(cache, domain).await;
        record.domain = domain.clone();
        results.push(record);
    }

    results
}
