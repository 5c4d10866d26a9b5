//! Reduce vault URIs to registrable root domains.
//!
//! The suffix knowledge is a short hardcoded list of multi-part public
//! suffixes, not the full Public Suffix List. It sits behind
//! [`SuffixTable`] so a fuller dataset can be plugged in without changing
//! [`normalize_with`]. Whatever the table, strings that cannot be reduced
//! come back as themselves (lowercased) or empty, never as an error.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::net::Ipv4Addr;
use std::path::Path;
use url::{Host, Url, quirks};

/// Multi-part public suffixes known out of the box.
pub const BUILTIN_MULTI_PART_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "gov.uk", "com.au", "co.jp", "com.br",
];

/// Answers whether a dotted suffix is a public suffix spanning several labels.
pub trait SuffixTable {
    fn is_multi_part_suffix(&self, suffix: &str) -> bool;
}

/// The built-in table.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSuffixes;

impl SuffixTable for BuiltinSuffixes {
    fn is_multi_part_suffix(&self, suffix: &str) -> bool {
        BUILTIN_MULTI_PART_SUFFIXES.contains(&suffix)
    }
}

/// The built-in table plus user-supplied suffixes.
#[derive(Debug, Clone)]
pub struct MultiPartSuffixes {
    suffixes: HashSet<String>,
}

impl Default for MultiPartSuffixes {
    fn default() -> Self {
        Self {
            suffixes: BUILTIN_MULTI_PART_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl MultiPartSuffixes {
    /// Add suffixes from text with one suffix per line. Blank lines and
    /// `//` or `#` comments are ignored. Returns how many were new.
    pub fn extend_from_str(&mut self, content: &str) -> usize {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("//") && !line.starts_with('#'))
            .map(|line| line.trim_start_matches('.').to_lowercase())
            .filter(|suffix| suffix.contains('.'))
            .filter(|suffix| self.suffixes.insert(suffix.clone()))
            .count()
    }

    pub fn extend_from_file(&mut self, path: &Path) -> io::Result<usize> {
        let content = fs::read_to_string(path)?;
        Ok(self.extend_from_str(&content))
    }

    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }
}

impl SuffixTable for MultiPartSuffixes {
    fn is_multi_part_suffix(&self, suffix: &str) -> bool {
        self.suffixes.contains(suffix)
    }
}

/// Host text of a URI the URL parser rejects (spaces, bad ports and the
/// like): everything between the scheme and the path, minus userinfo and
/// port.
fn lenient_host(uri: &str) -> String {
    let rest = uri.split_once("://").map_or(uri, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

    let host = if host_port.starts_with('[') {
        match host_port.find(']') {
            Some(end) => &host_port[..=end],
            None => host_port,
        }
    } else {
        host_port.split(':').next().unwrap_or_default()
    };

    host.trim().to_string()
}

/// Normalize with the built-in suffix table.
pub fn normalize(raw: &str) -> String {
    normalize_with(raw, &BuiltinSuffixes)
}

/// Reduce a raw URI or host to its root domain, e.g.
/// `https://login.example.co.uk/x` to `example.co.uk`.
///
/// Returns an empty string for empty input, email addresses and URIs with
/// an empty host. Text the URL parser rejects is reduced by hand, so a bare
/// word comes back as itself. Internationalized hosts stay in Unicode.
pub fn normalize_with(raw: &str, suffixes: &dyn SuffixTable) -> String {
    let s = raw.trim().to_lowercase();
    if s.is_empty() {
        return String::new();
    }

    let has_scheme = s.contains("://");
    if s.contains('@') && !has_scheme {
        return String::new();
    }

    let with_scheme = if has_scheme {
        s
    } else {
        format!("https://{}", s)
    };

    let host = match Url::parse(&with_scheme).ok().and_then(|u| u.host().map(|h| h.to_owned())) {
        Some(Host::Domain(domain)) => quirks::domain_to_unicode(&domain),
        Some(Host::Ipv4(ip)) => return ip.to_string(),
        Some(Host::Ipv6(ip)) => return format!("[{}]", ip),
        None => lenient_host(&with_scheme),
    };
    if host.is_empty() || host.parse::<Ipv4Addr>().is_ok() || host.starts_with('[') {
        return host;
    }

    let host = host.trim_end_matches('.');
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .unwrap_or(host);

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return host.to_string();
    }

    let tail = |n: usize| labels[labels.len() - n..].join(".");

    if labels.len() >= 3 && suffixes.is_multi_part_suffix(&tail(2)) {
        return tail(3);
    }
    if labels.len() >= 4 && suffixes.is_multi_part_suffix(&tail(3)) {
        return tail(4);
    }

    tail(2)
}
