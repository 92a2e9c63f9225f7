//! Station topology.
//!
//! The topology is built once at engine construction: an ordered linear path
//! that tickets traverse, plus the set of order stations reachable only via
//! diagnostic orders. When the tenant has diagnostic fulfillment disabled,
//! Lab and Imaging do not exist at all.

use super::types::{OrderType, Station};

/// The ordered set of clinical stations for one tenant.
#[derive(Debug, Clone)]
pub struct Topology {
    path: Vec<Station>,
    order_stations: Vec<Station>,
}

impl Topology {
    /// Build the topology, filtering order stations by the tenant's
    /// diagnostics feature flag.
    pub fn new(diagnostics_enabled: bool) -> Self {
        let path = vec![
            Station::CheckIn,
            Station::Triage,
            Station::Consult,
            Station::ReturnConsult,
            Station::Pharmacy,
            Station::Billing,
            Station::Done,
        ];
        let order_stations = if diagnostics_enabled {
            vec![Station::Lab, Station::Imaging]
        } else {
            Vec::new()
        };
        Self {
            path,
            order_stations,
        }
    }

    /// The station where new tickets check in.
    pub fn first(&self) -> Station {
        self.path[0]
    }

    /// The station after `station` on the linear path, or `None` at the end.
    /// Order stations have no linear successor; leaving them is driven by
    /// order completion.
    pub fn next_after(&self, station: Station) -> Option<Station> {
        let idx = self.path.iter().position(|s| *s == station)?;
        self.path.get(idx + 1).copied()
    }

    /// Returns true if `station` exists for this tenant.
    pub fn contains(&self, station: Station) -> bool {
        self.path.contains(&station) || self.order_stations.contains(&station)
    }

    /// All stations of this tenant, path first, then order stations.
    pub fn stations(&self) -> Vec<Station> {
        let mut all = self.path.clone();
        all.extend(self.order_stations.iter().copied());
        all
    }

    /// The linear path, in traversal order.
    pub fn path(&self) -> &[Station] {
        &self.path
    }

    /// Enabled order stations.
    pub fn order_stations(&self) -> &[Station] {
        &self.order_stations
    }

    /// Returns true if orders of this type can be fulfilled by this tenant.
    pub fn supports_order_type(&self, order_type: OrderType) -> bool {
        self.order_stations.contains(&order_type.target_station())
    }
}
