//! Read-only accessors for device configuration

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use sonic_cfgmgr_common::{CfgMgrError, CfgMgrResult, RemoteAgent};
use tracing::debug;

use crate::commands::*;
use crate::paths;

/// Banner lines vtysh prints ahead of the configuration
static BANNER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(Building configuration\.\.\.|Current configuration:)\s*$")
        .expect("Invalid regex pattern")
});

/// Help lines preceding route-map names in `show route-map ?`
const ROUTE_MAP_HELP_LINES: usize = 3;

/// Reads a file, treating a missing file as empty
pub async fn read_or_empty(agent: &dyn RemoteAgent, path: &str) -> CfgMgrResult<String> {
    match agent.read_file(path).await {
        Ok(content) => Ok(content),
        Err(CfgMgrError::FileNotFound { .. }) => {
            debug!(path = %path, "File absent, treated as empty");
            Ok(String::new())
        }
        Err(e) => Err(e),
    }
}

async fn read_existing(agent: &dyn RemoteAgent, path: &str) -> CfgMgrResult<String> {
    if !agent.file_exists(path).await? {
        return Err(CfgMgrError::file_not_found(path));
    }
    agent.read_file(path).await
}

/// SNMP configuration from snmp.yml
pub async fn snmp_config(agent: &dyn RemoteAgent) -> CfgMgrResult<serde_yaml::Value> {
    let data = read_existing(agent, paths::SNMP_FILE).await?;
    serde_yaml::from_str(&data).map_err(|e| CfgMgrError::parse(paths::SNMP_FILE, e.to_string()))
}

/// Startup CONFIG_DB from config_db.json
pub async fn configdb(agent: &dyn RemoteAgent) -> CfgMgrResult<Value> {
    let data = read_existing(agent, paths::CONFIGDB_FILE).await?;
    serde_json::from_str(&data).map_err(|e| CfgMgrError::parse(paths::CONFIGDB_FILE, e.to_string()))
}

/// Running CONFIG_DB
pub async fn running_configdb(agent: &dyn RemoteAgent) -> CfgMgrResult<Value> {
    let cmd = build_show_running_configdb_cmd();
    let output = agent.run_or_throw(&cmd).await?;
    serde_json::from_str(&output).map_err(|e| CfgMgrError::parse(cmd, e.to_string()))
}

/// FRR startup configuration text
pub async fn bgp_startup_config(agent: &dyn RemoteAgent) -> CfgMgrResult<String> {
    read_existing(agent, paths::FRR_FILE).await
}

/// FRR running configuration text, banners removed
pub async fn bgp_running_config(agent: &dyn RemoteAgent) -> CfgMgrResult<String> {
    let output = agent.run_or_throw(&build_show_run_bgp_cmd()).await?;
    Ok(strip_banners(&output))
}

/// Drops vtysh banner lines from a configuration dump
pub fn strip_banners(output: &str) -> String {
    let mut config = output
        .lines()
        .filter(|line| !BANNER_RE.is_match(line))
        .collect::<Vec<_>>()
        .join("\n");
    if !config.is_empty() {
        config.push('\n');
    }
    config
}

/// Saves the FRR running configuration to startup
pub async fn save_bgp_config(agent: &dyn RemoteAgent) -> CfgMgrResult<()> {
    agent.run_or_throw(&build_vtysh_writeconfig_cmd()).await?;
    Ok(())
}

/// Names of the configured route-maps
pub async fn route_maps(agent: &dyn RemoteAgent) -> CfgMgrResult<Vec<String>> {
    let output = agent.run_or_throw(&build_show_route_map_help_cmd()).await?;
    Ok(output
        .lines()
        .skip(ROUTE_MAP_HELP_LINES)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonic_cfgmgr_common::ExecResult;
    use sonic_cfgmgr_test::fixtures;
    use sonic_cfgmgr_test::MockAgent;

    #[test]
    fn test_strip_banners() {
        let config = strip_banners(fixtures::frr::SHOW_RUN_BGP);
        assert!(config.starts_with("\n!\nfrr version 7.2.1-sonic\n"));
        assert!(!config.contains("Building configuration"));
        assert!(!config.contains("Current configuration"));
        assert!(config.ends_with("end\n"));
        assert_eq!(strip_banners(""), "");
    }

    #[tokio::test]
    async fn test_read_or_empty() {
        let agent = MockAgent::new().with_file(paths::SNMP_FILE, "a: 1\n");
        assert_eq!(read_or_empty(&agent, paths::SNMP_FILE).await.unwrap(), "a: 1\n");
        assert_eq!(read_or_empty(&agent, paths::FRR_FILE).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_snmp_config() {
        let agent = MockAgent::new().with_file(paths::SNMP_FILE, fixtures::snmp::SNMP_YML);
        let config = snmp_config(&agent).await.unwrap();
        assert_eq!(config["snmp_rocommunity"].as_str(), Some("public"));
    }

    #[tokio::test]
    async fn test_snmp_config_missing() {
        let err = snmp_config(&MockAgent::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "File /etc/sonic/snmp.yml does not exist");
    }

    #[tokio::test]
    async fn test_snmp_config_unparsable() {
        let agent = MockAgent::new().with_file(paths::SNMP_FILE, "a: [1\n");
        let err = snmp_config(&agent).await.unwrap_err();
        assert!(matches!(err, CfgMgrError::Parse { .. }));
        assert!(err.to_string().starts_with("/etc/sonic/snmp.yml cannot be loaded"));
    }

    #[tokio::test]
    async fn test_configdb() {
        let agent =
            MockAgent::new().with_file(paths::CONFIGDB_FILE, fixtures::config_db::CONFIG_DB_JSON);
        let config = configdb(&agent).await.unwrap();
        assert_eq!(config["DEVICE_METADATA"]["localhost"]["bgp_asn"], "65000");
    }

    #[tokio::test]
    async fn test_running_configdb() {
        let agent = MockAgent::new().on_command(
            "show runningconfiguration all",
            ExecResult::ok(fixtures::config_db::RUNNING_CONFIG_JSON),
        );
        let config = running_configdb(&agent).await.unwrap();
        assert_eq!(config["DEVICE_METADATA"]["localhost"]["hostname"], "tor1");
    }

    #[tokio::test]
    async fn test_running_configdb_not_json() {
        let agent = MockAgent::new()
            .on_command("show runningconfiguration all", ExecResult::ok("Usage: show"));
        let err = running_configdb(&agent).await.unwrap_err();
        assert!(matches!(err, CfgMgrError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_bgp_startup_config() {
        let agent = MockAgent::new().with_file(paths::FRR_FILE, "hostname tor1\n");
        assert_eq!(bgp_startup_config(&agent).await.unwrap(), "hostname tor1\n");

        let err = bgp_startup_config(&MockAgent::new()).await.unwrap_err();
        assert!(matches!(err, CfgMgrError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_bgp_running_config() {
        let agent =
            MockAgent::new().on_command("show run bgp", ExecResult::ok(fixtures::frr::SHOW_RUN_BGP));
        let config = bgp_running_config(&agent).await.unwrap();
        assert!(config.contains("route-map RM-CLOS-IN permit 10\n"));
        assert!(!config.contains("Building configuration"));
    }

    #[tokio::test]
    async fn test_save_bgp_config() {
        let agent = MockAgent::new();
        save_bgp_config(&agent).await.unwrap();
        assert_eq!(agent.commands(), vec!["sudo vtysh --writeconfig".to_string()]);

        let agent = MockAgent::new()
            .on_command("--writeconfig", ExecResult::failed(1, "permission denied"));
        assert!(matches!(
            save_bgp_config(&agent).await,
            Err(CfgMgrError::ShellCommandFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_route_maps() {
        let agent = MockAgent::new()
            .on_command("show route-map", ExecResult::ok(fixtures::bgp::ROUTE_MAP_HELP));
        assert_eq!(
            route_maps(&agent).await.unwrap(),
            vec![
                "FABRIC-OUT".to_string(),
                "DENY".to_string(),
                "FABRIC-IN".to_string(),
            ]
        );
    }
}
