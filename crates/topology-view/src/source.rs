//! Device/link data source
//!
//! Abstract interface for fetching a site's topology. Implementations wrap the
//! management-cloud API (behind whatever auth the host uses) or, for demos and
//! tests, a fixed topology.

use async_trait::async_trait;
use std::collections::HashMap;
use topology_types::NetworkTopology;

/// Fetches normalized devices and links for a site
///
/// `?Send` so browser fetch futures qualify.
#[async_trait(?Send)]
pub trait TopologySource {
    async fn get_network_topology(&self, site_id: &str) -> anyhow::Result<NetworkTopology>;
}

/// Fixed topologies keyed by site id
#[derive(Debug, Clone, Default)]
pub struct StaticTopologySource {
    sites: HashMap<String, NetworkTopology>,
}

impl StaticTopologySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: register a site's topology
    pub fn with_site(mut self, site_id: impl Into<String>, topology: NetworkTopology) -> Self {
        self.sites.insert(site_id.into(), topology);
        self
    }

    pub fn set_site(&mut self, site_id: impl Into<String>, topology: NetworkTopology) {
        self.sites.insert(site_id.into(), topology);
    }
}

#[async_trait(?Send)]
impl TopologySource for StaticTopologySource {
    async fn get_network_topology(&self, site_id: &str) -> anyhow::Result<NetworkTopology> {
        self.sites
            .get(site_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown site: {}", site_id))
    }
}
