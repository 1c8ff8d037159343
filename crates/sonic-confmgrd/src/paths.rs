//! Device-side file locations for confmgrd

/// SONiC configuration directory
pub const SONIC_DIR: &str = "/etc/sonic/";

/// Staging directory for candidate configurations
pub const STAGING_DIR: &str = "/etc/sonic/tmp/";

/// FRR startup configuration (/etc/frr is mounted from here)
pub const FRR_FILE: &str = "/etc/sonic/frr/frr.conf";

/// SNMP configuration consumed by the snmp container
pub const SNMP_FILE: &str = "/etc/sonic/snmp.yml";

/// CONFIG_DB startup file
pub const CONFIGDB_FILE: &str = "/etc/sonic/config_db.json";

/// Fixed SNMP candidate location
pub const SNMP_CANDIDATE_FILE: &str = "/etc/sonic/tmp/snmp.yml";

/// Fixed CONFIG_DB candidate location
pub const CONFIGDB_CANDIDATE_FILE: &str = "/etc/sonic/tmp/config_db.json";

/// Default location of the daemon's own configuration
pub const DEFAULT_CONFIG_PATH: &str = "/etc/sonic/confmgrd.toml";

/// systemd units restarted after a configuration change
pub mod services {
    /// SNMP agent
    pub const SNMP: &str = "snmp.service";
}

/// Field names in FRR `show bgp neighbor json` output
pub mod frr_fields {
    /// Set when the queried neighbor has no session
    pub const NO_SUCH_NEIGHBOR: &str = "bgpNoSuchNeighbor";

    /// Session state value of an established session
    pub const ESTABLISHED: &str = "Established";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_live_in_staging_dir() {
        assert!(SNMP_CANDIDATE_FILE.starts_with(STAGING_DIR));
        assert!(CONFIGDB_CANDIDATE_FILE.starts_with(STAGING_DIR));
        assert!(STAGING_DIR.starts_with(SONIC_DIR));
    }
}
