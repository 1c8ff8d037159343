//! BGP neighbor inspection
//!
//! Summarises `show bgp neighbor json` into one record per session. Two
//! FRR output generations are understood: 7.2 keys unicast address
//! families as `ipv4Unicast`, 7.0 as `"IPv4 Unicast"`.

use std::collections::{BTreeMap, HashMap};
use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sonic_cfgmgr_common::{CfgMgrError, CfgMgrResult, RemoteAgent};
use tracing::{debug, instrument};

use crate::commands::build_show_bgp_neighbor_cmd;
use crate::paths::frr_fields;

/// VRF reported for every session; SONiC BGP runs in the default VRF only
pub const DEFAULT_VRF: &str = "default";

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Up,
    Down,
}

/// Summary of one BGP session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BgpNeighbor {
    pub remote_as: u32,
    pub local_as: u32,
    pub remote_address: String,
    pub peer_group: Option<String>,
    pub description: Option<String>,
    /// Inbound route-map of the unicast family matching the address
    pub import_policy: Option<String>,
    /// Outbound route-map of the unicast family matching the address
    pub export_policy: Option<String>,
    pub vrf: String,
    pub state: SessionState,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrrNeighbor {
    remote_as: u32,
    local_as: u32,
    peer_group: Option<String>,
    nbr_desc: Option<String>,
    bgp_state: String,
    #[serde(default)]
    address_family_info: HashMap<String, FrrAddressFamily>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrrAddressFamily {
    route_map_for_incoming_advertisements: Option<String>,
    route_map_for_outgoing_advertisements: Option<String>,
}

impl FrrNeighbor {
    fn unicast_family(&self, ip: &IpAddr) -> Option<&FrrAddressFamily> {
        let version = if ip.is_ipv4() { 4 } else { 6 };
        self.address_family_info
            .get(&format!("ipv{version}Unicast"))
            .or_else(|| self.address_family_info.get(&format!("IPv{version} Unicast")))
    }

    fn summarise(self, address: &str, ip: &IpAddr) -> BgpNeighbor {
        let (import_policy, export_policy) = match self.unicast_family(ip) {
            Some(family) => (
                family.route_map_for_incoming_advertisements.clone(),
                family.route_map_for_outgoing_advertisements.clone(),
            ),
            None => (None, None),
        };
        let state = if self.bgp_state == frr_fields::ESTABLISHED {
            SessionState::Up
        } else {
            SessionState::Down
        };

        BgpNeighbor {
            remote_as: self.remote_as,
            local_as: self.local_as,
            remote_address: address.to_string(),
            peer_group: self.peer_group,
            description: self.nbr_desc,
            import_policy,
            export_policy,
            vrf: DEFAULT_VRF.to_string(),
            state,
        }
    }
}

/// Parses raw FRR output, rejecting an unknown-neighbor answer
fn parse_raw(output: &str, neighbor: Option<IpAddr>) -> CfgMgrResult<Value> {
    let cmd = build_show_bgp_neighbor_cmd(neighbor);
    let data: Value =
        serde_json::from_str(output).map_err(|e| CfgMgrError::parse(&cmd, e.to_string()))?;

    if data
        .get(frr_fields::NO_SUCH_NEIGHBOR)
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        return Err(CfgMgrError::NoBgpSession {
            neighbor: neighbor.map(|ip| ip.to_string()).unwrap_or_default(),
        });
    }
    Ok(data)
}

/// Summarises FRR neighbor JSON keyed by neighbor address
pub fn parse_neighbors(
    output: &str,
    neighbor: Option<IpAddr>,
) -> CfgMgrResult<BTreeMap<String, BgpNeighbor>> {
    let data = parse_raw(output, neighbor)?;
    let Value::Object(sessions) = data else {
        return Err(CfgMgrError::parse(
            build_show_bgp_neighbor_cmd(neighbor),
            "expected a JSON object",
        ));
    };

    let mut result = BTreeMap::new();
    for (address, session) in sessions {
        let ip: IpAddr = address
            .parse()
            .map_err(|_| CfgMgrError::parse(&address, "not a neighbor address"))?;
        let frr: FrrNeighbor = serde_json::from_value(session)
            .map_err(|e| CfgMgrError::parse(&address, e.to_string()))?;
        result.insert(address.clone(), frr.summarise(&address, &ip));
    }

    debug!(sessions = result.len(), "Parsed BGP neighbors");
    Ok(result)
}

/// BGP sessions of the device, or of one neighbor
#[instrument(skip(agent))]
pub async fn bgp_neighbors(
    agent: &dyn RemoteAgent,
    neighbor: Option<IpAddr>,
) -> CfgMgrResult<BTreeMap<String, BgpNeighbor>> {
    let output = agent
        .run_or_throw(&build_show_bgp_neighbor_cmd(neighbor))
        .await?;
    parse_neighbors(&output, neighbor)
}

/// Unprocessed FRR neighbor JSON
pub async fn bgp_neighbors_raw(
    agent: &dyn RemoteAgent,
    neighbor: Option<IpAddr>,
) -> CfgMgrResult<Value> {
    let output = agent
        .run_or_throw(&build_show_bgp_neighbor_cmd(neighbor))
        .await?;
    parse_raw(&output, neighbor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sonic_cfgmgr_common::ExecResult;
    use sonic_cfgmgr_test::{fixtures, MockAgent};

    #[test]
    fn test_parse_frr_72() {
        let neighbors = parse_neighbors(fixtures::bgp::NEIGHBORS_JSON, None).unwrap();

        assert_eq!(
            neighbors["192.0.2.254"],
            BgpNeighbor {
                remote_as: 65001,
                local_as: 65000,
                remote_address: "192.0.2.254".to_string(),
                peer_group: Some("SPINE".to_string()),
                description: Some("spine1".to_string()),
                import_policy: Some("RM-CLOS-IN".to_string()),
                export_policy: Some("RM-CLOS-OUT".to_string()),
                vrf: "default".to_string(),
                state: SessionState::Up,
            }
        );

        let v6 = &neighbors["2001:db8::fe"];
        assert_eq!(v6.state, SessionState::Down);
        assert_eq!(v6.import_policy, None);
        assert_eq!(v6.peer_group, None);
    }

    #[test]
    fn test_parse_frr_70_family_key() {
        let neighbors = parse_neighbors(fixtures::bgp::NEIGHBORS_JSON_LEGACY, None).unwrap();
        let n = &neighbors["192.0.2.254"];

        assert_eq!(n.import_policy.as_deref(), Some("FABRIC-IN"));
        assert_eq!(n.export_policy.as_deref(), Some("FABRIC-OUT"));
        assert_eq!(n.state, SessionState::Down);
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_neighbors("{}", None).unwrap().is_empty());
    }

    #[test]
    fn test_no_such_neighbor() {
        let ip: IpAddr = "192.0.2.9".parse().unwrap();
        let err = parse_neighbors(fixtures::bgp::NO_SUCH_NEIGHBOR_JSON, Some(ip)).unwrap_err();
        assert_eq!(err.to_string(), "No BGP session with 192.0.2.9");
    }

    #[test]
    fn test_serialized_state() {
        let neighbors = parse_neighbors(fixtures::bgp::NEIGHBORS_JSON, None).unwrap();
        let value = serde_json::to_value(&neighbors).unwrap();
        assert_eq!(value["192.0.2.254"]["state"], "up");
        assert_eq!(value["2001:db8::fe"]["description"], Value::Null);
    }

    #[tokio::test]
    async fn test_bgp_neighbors_queries_frr() {
        let agent = MockAgent::new().on_command(
            "show bgp neighbor",
            ExecResult::ok(fixtures::bgp::NEIGHBORS_JSON),
        );
        let ip: IpAddr = "192.0.2.254".parse().unwrap();

        let neighbors = bgp_neighbors(&agent, Some(ip)).await.unwrap();
        assert_eq!(neighbors.len(), 2);
        assert_eq!(
            agent.commands(),
            vec!["vtysh -c 'show bgp neighbor 192.0.2.254 json'".to_string()]
        );

        let raw = bgp_neighbors_raw(&agent, None).await.unwrap();
        assert_eq!(raw["192.0.2.254"]["bgpState"], "Established");
    }
}
