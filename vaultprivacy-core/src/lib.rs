pub mod analysis;
pub mod domain;
pub mod report;
pub mod vault;

pub use analysis::{AnalysisProgressCallback, analyze, unique_root_domains};
pub use domain::{BuiltinSuffixes, MultiPartSuffixes, SuffixTable, normalize, normalize_with};
pub use vault::{VaultError, VaultFormat, extract_domains, extract_domains_with, extract_uris};

