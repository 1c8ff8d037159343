//! Device configuration fixtures
//!
//! Realistic samples of what a SONiC switch holds or prints, plus the
//! templates and contexts that render candidates against them.

use serde_json::{json, Value};

/// FRR running configuration, routing policy part
pub mod frr {
    use super::*;

    /// `show run bgp` output, banner lines included
    pub const SHOW_RUN_BGP: &str = "\
Building configuration...

Current configuration:
!
frr version 7.2.1-sonic
frr defaults traditional
hostname tor1
log syslog informational
log facility local4
agentx
!
router bgp 65000
 bgp router-id 192.0.2.1
 neighbor SPINE peer-group
 neighbor SPINE remote-as external
 neighbor 198.51.100.0 peer-group SPINE
 !
 address-family ipv4 unicast
  neighbor SPINE route-map RM-CLOS-IN in
 exit-address-family
!
ip prefix-list PF-DEFAULT seq 10 permit 0.0.0.0/0
!
route-map RM-CLOS-IN permit 10
 match ip address prefix-list PF-DEFAULT
 set local-preference 200
!
line vty
!
end
";

    /// Running configuration after the routing policy template was replayed
    /// with [`changed_context`].
    pub const SHOW_RUN_BGP_AFTER_PUSH: &str = "\
Building configuration...

Current configuration:
!
frr version 7.2.1-sonic
frr defaults traditional
hostname tor1
log syslog informational
log facility local4
agentx
!
router bgp 65000
 bgp router-id 192.0.2.1
 neighbor SPINE peer-group
 neighbor SPINE remote-as external
 neighbor 198.51.100.0 peer-group SPINE
 !
 address-family ipv4 unicast
  neighbor SPINE route-map RM-CLOS-IN in
 exit-address-family
!
ip prefix-list PF-DEFAULT seq 10 permit 0.0.0.0/0
ip prefix-list PF-LOOPBACK seq 10 permit 192.0.2.0/24 le 32
!
route-map RM-CLOS-IN permit 10
 match ip address prefix-list PF-LOOPBACK
 set local-preference 200
!
line vty
!
end
";

    /// Routing policy template
    pub const ROUTING_POLICY_TEMPLATE: &str = "\
ip prefix-list PF-DEFAULT seq 10 permit 0.0.0.0/0
ip prefix-list {{prefix_list}} seq 10 permit {{prefix}}
!
route-map RM-CLOS-IN permit 10
 match ip address prefix-list {{prefix_list}}
 set local-preference {{local_pref}}
!
";

    /// Context rendering a policy identical to [`SHOW_RUN_BGP`]
    pub fn unchanged_context() -> Value {
        json!({
            "prefix_list": "PF-DEFAULT",
            "prefix": "0.0.0.0/0",
            "local_pref": 200,
        })
    }

    /// Context rendering a policy that moves RM-CLOS-IN to PF-LOOPBACK
    pub fn changed_context() -> Value {
        json!({
            "prefix_list": "PF-LOOPBACK",
            "prefix": "192.0.2.0/24 le 32",
            "local_pref": 200,
        })
    }
}

/// SNMP configuration (`snmp.yml`)
pub mod snmp {
    use super::*;

    /// Live snmp.yml
    pub const SNMP_YML: &str = "\
snmp_rocommunity: public
snmp_location: paris-dc1
";

    /// snmp.yml template
    pub const SNMP_TEMPLATE: &str = "\
snmp_rocommunity: {{community}}
snmp_location: {{location}}
";

    /// Template that renders to invalid YAML
    pub const BROKEN_SNMP_TEMPLATE: &str = "snmp_rocommunity: [{{community}}\n";

    /// Context rendering exactly [`SNMP_YML`]
    pub fn unchanged_context() -> Value {
        json!({"community": "public", "location": "paris-dc1"})
    }

    /// Context changing the read-only community
    pub fn changed_context() -> Value {
        json!({"community": "n0c-r3ad", "location": "paris-dc1"})
    }
}

/// CONFIG_DB startup file (`config_db.json`)
pub mod config_db {
    use super::*;

    /// Live config_db.json
    pub const CONFIG_DB_JSON: &str = r#"{
    "DEVICE_METADATA": {
        "localhost": {
            "bgp_asn": "65000",
            "hostname": "tor1",
            "hwsku": "Force10-S6000"
        }
    },
    "LOOPBACK_INTERFACE": {
        "Loopback0|192.0.2.1/32": {}
    }
}
"#;

    /// config_db.json template
    pub const CONFIG_DB_TEMPLATE: &str = r#"{
    "DEVICE_METADATA": {
        "localhost": {
            "bgp_asn": "{{asn}}",
            "hostname": "{{hostname}}",
            "hwsku": "Force10-S6000"
        }
    },
    "LOOPBACK_INTERFACE": {
        "Loopback0|{{loopback}}": {}
    }
}
"#;

    /// Context renaming the device
    pub fn changed_context() -> Value {
        json!({"asn": "65000", "hostname": "tor1-new", "loopback": "192.0.2.1/32"})
    }

    /// `show runningconfiguration all` output
    pub const RUNNING_CONFIG_JSON: &str =
        r#"{"DEVICE_METADATA": {"localhost": {"hostname": "tor1", "bgp_asn": "65000"}}}"#;
}

/// FRR show command outputs
pub mod bgp {
    /// `show bgp neighbor json` on FRR 7.2, one established IPv4 and one
    /// idle IPv6 session
    pub const NEIGHBORS_JSON: &str = r#"{
  "192.0.2.254": {
    "remoteAs": 65001,
    "localAs": 65000,
    "nbrDesc": "spine1",
    "peerGroup": "SPINE",
    "bgpState": "Established",
    "addressFamilyInfo": {
      "ipv4Unicast": {
        "routeMapForIncomingAdvertisements": "RM-CLOS-IN",
        "routeMapForOutgoingAdvertisements": "RM-CLOS-OUT"
      }
    }
  },
  "2001:db8::fe": {
    "remoteAs": 65002,
    "localAs": 65000,
    "bgpState": "Idle",
    "addressFamilyInfo": {}
  }
}"#;

    /// `show bgp neighbor json` on FRR 7.0
    pub const NEIGHBORS_JSON_LEGACY: &str = r#"{
  "192.0.2.254": {
    "remoteAs": 65001,
    "localAs": 65000,
    "peerGroup": "SPINE",
    "bgpState": "Active",
    "addressFamilyInfo": {
      "IPv4 Unicast": {
        "routeMapForIncomingAdvertisements": "FABRIC-IN",
        "routeMapForOutgoingAdvertisements": "FABRIC-OUT"
      }
    }
  }
}"#;

    /// Answer for an unknown neighbor
    pub const NO_SUCH_NEIGHBOR_JSON: &str = r#"{"bgpNoSuchNeighbor": true}"#;

    /// `show route-map ?` output
    pub const ROUTE_MAP_HELP: &str = "\
show route-map ?
  WORD  route-map name
  <cr>
  FABRIC-OUT
  DENY

  FABRIC-IN";
}
