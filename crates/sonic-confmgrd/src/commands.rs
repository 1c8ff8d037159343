//! Shell command builders for reconciliation steps

use std::net::IpAddr;

use sonic_cfgmgr_common::shell::{
    self, CONFIG_CMD, CP_CMD, MKDIR_CMD, SHOW_CMD, SONIC_CFGGEN_CMD, SUDO_CMD, SYSTEMCTL_CMD,
    VTYSH_CMD,
};

/// Build staging directory creation command
pub fn build_mkdir_cmd(dir: &str) -> String {
    format!("{} {} -p {}", SUDO_CMD, MKDIR_CMD, shell::shellquote(dir))
}

/// Build FRR candidate check command
///
/// vtysh parses the file without touching the running configuration
pub fn build_vtysh_dryrun_cmd(candidate: &str) -> String {
    format!(
        "{} {} --dryrun --inputfile {}",
        SUDO_CMD,
        VTYSH_CMD,
        shell::shellquote(candidate)
    )
}

/// Build FRR candidate replay command
///
/// Statements are merged line by line into the running configuration
pub fn build_vtysh_push_cmd(candidate: &str) -> String {
    format!(
        "{} {} --inputfile {}",
        SUDO_CMD,
        VTYSH_CMD,
        shell::shellquote(candidate)
    )
}

/// Build FRR running-to-startup save command
pub fn build_vtysh_writeconfig_cmd() -> String {
    format!("{} {} --writeconfig", SUDO_CMD, VTYSH_CMD)
}

/// Build config_db.json syntax check command
pub fn build_cfggen_check_cmd(candidate: &str) -> String {
    format!(
        "{} {} -j {}",
        SUDO_CMD,
        SONIC_CFGGEN_CMD,
        shell::shellquote(candidate)
    )
}

/// Build file copy command
pub fn build_copy_cmd(from: &str, to: &str) -> String {
    format!(
        "{} {} {} {}",
        SUDO_CMD,
        CP_CMD,
        shell::shellquote(from),
        shell::shellquote(to)
    )
}

/// Build service restart command
pub fn build_restart_service_cmd(service: &str) -> String {
    format!(
        "{} {} restart {}",
        SUDO_CMD,
        SYSTEMCTL_CMD,
        shell::shellquote(service)
    )
}

/// Build CONFIG_DB reload command
///
/// Restarts every SONiC service, non-interactively
pub fn build_config_reload_cmd() -> String {
    format!("{} {} reload -y", SUDO_CMD, CONFIG_CMD)
}

/// Build FRR running configuration query
pub fn build_show_run_bgp_cmd() -> String {
    format!("{} run bgp", SHOW_CMD)
}

/// Build running CONFIG_DB query
pub fn build_show_running_configdb_cmd() -> String {
    format!("{} runningconfiguration all", SHOW_CMD)
}

/// Build route-map listing command
///
/// The help completion of `show route-map` lists the configured names
pub fn build_show_route_map_help_cmd() -> String {
    format!("{} route-map {}", SHOW_CMD, shell::shellquote("?"))
}

/// Build BGP neighbor query
///
/// Without a neighbor, every session is returned
pub fn build_show_bgp_neighbor_cmd(neighbor: Option<IpAddr>) -> String {
    match neighbor {
        Some(ip) => format!("{} -c 'show bgp neighbor {} json'", VTYSH_CMD, ip),
        None => format!("{} -c 'show bgp neighbor json'", VTYSH_CMD),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_mkdir_cmd() {
        assert_eq!(
            build_mkdir_cmd("/etc/sonic/tmp/"),
            "sudo /bin/mkdir -p \"/etc/sonic/tmp/\""
        );
    }

    #[test]
    fn test_build_vtysh_cmds() {
        let path = "/etc/sonic/tmp/.1700000000_bgp.patch";
        assert_eq!(
            build_vtysh_dryrun_cmd(path),
            "sudo vtysh --dryrun --inputfile \"/etc/sonic/tmp/.1700000000_bgp.patch\""
        );
        assert_eq!(
            build_vtysh_push_cmd(path),
            "sudo vtysh --inputfile \"/etc/sonic/tmp/.1700000000_bgp.patch\""
        );
        assert_eq!(build_vtysh_writeconfig_cmd(), "sudo vtysh --writeconfig");
    }

    #[test]
    fn test_build_cfggen_check_cmd() {
        let cmd = build_cfggen_check_cmd("/etc/sonic/tmp/config_db.json");
        assert!(cmd.contains("sudo sonic-cfggen -j"));
        assert!(cmd.contains("config_db.json"));
    }

    #[test]
    fn test_build_copy_cmd() {
        assert_eq!(
            build_copy_cmd("/etc/sonic/tmp/snmp.yml", "/etc/sonic/snmp.yml"),
            "sudo /bin/cp \"/etc/sonic/tmp/snmp.yml\" \"/etc/sonic/snmp.yml\""
        );
    }

    #[test]
    fn test_build_service_cmds() {
        assert_eq!(
            build_restart_service_cmd("snmp.service"),
            "sudo systemctl restart \"snmp.service\""
        );
        assert_eq!(build_config_reload_cmd(), "sudo config reload -y");
    }

    #[test]
    fn test_build_show_cmds() {
        assert_eq!(build_show_run_bgp_cmd(), "show run bgp");
        assert_eq!(
            build_show_running_configdb_cmd(),
            "show runningconfiguration all"
        );
        assert_eq!(build_show_route_map_help_cmd(), "show route-map \"?\"");
    }

    #[test]
    fn test_build_show_bgp_neighbor_cmd() {
        let ip: IpAddr = "192.0.2.254".parse().unwrap();
        assert_eq!(
            build_show_bgp_neighbor_cmd(Some(ip)),
            "vtysh -c 'show bgp neighbor 192.0.2.254 json'"
        );
        assert_eq!(
            build_show_bgp_neighbor_cmd(None),
            "vtysh -c 'show bgp neighbor json'"
        );
    }

    #[test]
    fn test_shellquote_safety() {
        let cmd = build_copy_cmd("/tmp/a\"; rm -rf /", "/etc/sonic/");
        // Should be quoted to prevent injection
        assert!(cmd.contains("\"/tmp/a\\\"; rm -rf /\""));
    }
}
