//! Seed parsing and neighbour expansion
//!
//! A seed `http://10.1.2.3:9901` expands to the 255 candidates
//! `http://10.1.2.1:9901` … `http://10.1.2.255:9901`, each pointing at
//! the catalog path.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use url::Url;

use super::{CandidateEndpoint, SeedError};

/// Externally supplied `scheme://host:port` triple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedEndpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl SeedEndpoint {
    pub fn parse(seed: &str) -> Result<Self, SeedError> {
        let url = Url::parse(seed.trim()).map_err(|e| SeedError::Unparsable {
            seed: seed.to_string(),
            reason: e.to_string(),
        })?;

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| SeedError::MissingHost(seed.to_string()))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| SeedError::MissingPort(seed.to_string()))?;

        Ok(Self {
            scheme: url.scheme().to_string(),
            host: host.to_string(),
            port,
        })
    }

    /// Host with its final dotted component removed (`10.1.2.3` → `10.1.2`)
    fn network_prefix(&self) -> Result<&str, SeedError> {
        match self.host.rsplit_once('.') {
            Some((prefix, _)) if !prefix.is_empty() => Ok(prefix),
            _ => Err(SeedError::NotDotted(self.host.clone())),
        }
    }

    /// Lazily enumerate the 255 neighbours of this seed.
    pub fn candidates<'a>(&'a self, catalog_path: &'a str) -> Result<Candidates<'a>, SeedError> {
        Candidates::new(self, catalog_path)
    }
}

impl FromStr for SeedEndpoint {
    type Err = SeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SeedEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// Iterator over the candidates of one seed, last octet 1 through 255
#[derive(Debug, Clone)]
pub struct Candidates<'a> {
    seed: &'a SeedEndpoint,
    prefix: &'a str,
    catalog_path: &'a str,
    octets: RangeInclusive<u8>,
}

impl<'a> Candidates<'a> {
    pub fn new(seed: &'a SeedEndpoint, catalog_path: &'a str) -> Result<Self, SeedError> {
        Ok(Self {
            prefix: seed.network_prefix()?,
            seed,
            catalog_path,
            octets: 1..=255,
        })
    }
}

impl Iterator for Candidates<'_> {
    type Item = CandidateEndpoint;

    fn next(&mut self) -> Option<Self::Item> {
        let octet = self.octets.next()?;
        Some(CandidateEndpoint {
            scheme: self.seed.scheme.clone(),
            host: format!("{}.{octet}", self.prefix),
            port: self.seed.port,
            catalog_path: self.catalog_path.to_string(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.octets.size_hint()
    }
}

impl ExactSizeIterator for Candidates<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    const PATH: &str = "/iptv/live/1000.json?key=txiptv";

    #[test]
    fn test_parse_seed() {
        let seed = SeedEndpoint::parse("http://110.52.99.30:9901").unwrap();
        assert_eq!(seed.scheme, "http");
        assert_eq!(seed.host, "110.52.99.30");
        assert_eq!(seed.port, 9901);
        assert_eq!(seed.to_string(), "http://110.52.99.30:9901");
    }

    #[test]
    fn test_parse_seed_default_port() {
        let seed: SeedEndpoint = "https://10.0.0.7".parse().unwrap();
        assert_eq!(seed.port, 443);
    }

    #[test]
    fn test_parse_seed_garbage() {
        assert!(matches!(
            SeedEndpoint::parse("not a url"),
            Err(SeedError::Unparsable { .. })
        ));
    }

    #[test]
    fn test_expands_to_255_neighbours() {
        let seed = SeedEndpoint::parse("http://10.20.30.40:8888").unwrap();
        let candidates: Vec<_> = seed.candidates(PATH).unwrap().collect();

        assert_eq!(candidates.len(), 255);
        assert_eq!(candidates[0].host, "10.20.30.1");
        assert_eq!(candidates[254].host, "10.20.30.255");
        for (i, c) in candidates.iter().enumerate() {
            assert_eq!(c.host, format!("10.20.30.{}", i + 1));
            assert_eq!(c.scheme, "http");
            assert_eq!(c.port, 8888);
            assert_eq!(c.catalog_path, PATH);
        }
        assert_eq!(
            candidates[4].catalog_url(),
            "http://10.20.30.5:8888/iptv/live/1000.json?key=txiptv"
        );
    }

    #[test]
    fn test_candidates_exact_size() {
        let seed = SeedEndpoint::parse("http://1.2.3.4:1").unwrap();
        let mut it = seed.candidates(PATH).unwrap();
        assert_eq!(it.len(), 255);
        it.next();
        assert_eq!(it.len(), 254);
    }

    #[test]
    fn test_undotted_host_rejected() {
        let seed = SeedEndpoint::parse("http://localhost:9901").unwrap();
        assert_eq!(
            seed.candidates(PATH).unwrap_err(),
            SeedError::NotDotted("localhost".to_string())
        );
    }

    #[test]
    fn test_ipv6_host_rejected() {
        let seed = SeedEndpoint::parse("http://[::1]:9901").unwrap();
        assert!(matches!(
            seed.candidates(PATH),
            Err(SeedError::NotDotted(_))
        ));
    }
}
