//! Per-domain reconciliation profiles
//!
//! A single workflow implementation serves every domain. What differs
//! between domains (where the candidate is staged, how it is checked,
//! how it is applied and how an apply failure is treated) lives here.

use chrono::{DateTime, Utc};

use crate::commands::*;
use crate::paths::{self, services};
use crate::types::Domain;

/// How a candidate is checked before apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    /// Device-side command; non-zero exit rejects the candidate
    DeviceCommand,
    /// Local YAML syntax check of the rendered text
    YamlSyntax,
}

/// How a validated candidate reaches the live configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// Candidate replaces the live file; diffed as full text
    WholeFile,
    /// Candidate statements are merged into the running router session
    MergeLines,
}

/// How the live configuration is compared with the candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Byte-for-byte text
    Text,
    /// Parsed YAML documents; comments and layout are ignored
    Yaml,
}

/// Domain-specific knobs of the reconciliation workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainProfile {
    pub domain: Domain,
    /// Live configuration file
    pub live_path: &'static str,
    pub validator: Validator,
    pub apply_mode: ApplyMode,
    pub comparison: Comparison,
    /// Raise on apply failure instead of reporting `result = false`
    pub apply_failure_is_fatal: bool,
    /// Skip apply when the live file already matches the candidate
    pub skip_unchanged: bool,
    /// Service restarted after the live file was replaced
    pub restart_service: Option<&'static str>,
    /// Accepts a full configuration reload after apply
    pub supports_reload: bool,
}

impl DomainProfile {
    /// Profile of `domain`
    pub fn for_domain(domain: Domain) -> Self {
        match domain {
            Domain::Bgp => Self {
                domain,
                live_path: paths::FRR_FILE,
                validator: Validator::DeviceCommand,
                apply_mode: ApplyMode::MergeLines,
                comparison: Comparison::Text,
                apply_failure_is_fatal: false,
                skip_unchanged: false,
                restart_service: None,
                supports_reload: false,
            },
            Domain::Snmp => Self {
                domain,
                live_path: paths::SNMP_FILE,
                validator: Validator::YamlSyntax,
                apply_mode: ApplyMode::WholeFile,
                comparison: Comparison::Yaml,
                apply_failure_is_fatal: true,
                skip_unchanged: true,
                restart_service: Some(services::SNMP),
                supports_reload: false,
            },
            Domain::ConfigDb => Self {
                domain,
                live_path: paths::CONFIGDB_FILE,
                validator: Validator::DeviceCommand,
                apply_mode: ApplyMode::WholeFile,
                comparison: Comparison::Text,
                apply_failure_is_fatal: true,
                skip_unchanged: false,
                restart_service: None,
                supports_reload: true,
            },
        }
    }

    /// Candidate file location
    ///
    /// BGP candidates are timestamped so overlapping pushes never share a
    /// file; whole-file domains reuse a fixed name.
    pub fn candidate_path(&self, now: DateTime<Utc>) -> String {
        match self.domain {
            Domain::Bgp => format!("{}.{}_bgp.patch", paths::STAGING_DIR, now.timestamp()),
            Domain::Snmp => paths::SNMP_CANDIDATE_FILE.to_string(),
            Domain::ConfigDb => paths::CONFIGDB_CANDIDATE_FILE.to_string(),
        }
    }

    /// Returns true if the live file already holds what `rendered` describes.
    ///
    /// A live file that does not parse never matches, so it gets replaced.
    pub fn matches_live(&self, live: &str, rendered: &str) -> bool {
        match self.comparison {
            Comparison::Text => live == rendered,
            Comparison::Yaml => {
                let parse = |text: &str| serde_yaml::from_str::<serde_yaml::Value>(text).ok();
                match (parse(live), parse(rendered)) {
                    (Some(live), Some(rendered)) => live == rendered,
                    _ => false,
                }
            }
        }
    }

    /// Device-side validation command, if the validator runs on the device
    pub fn validate_cmd(&self, candidate: &str) -> Option<String> {
        match (self.validator, self.domain) {
            (Validator::YamlSyntax, _) => None,
            (Validator::DeviceCommand, Domain::Bgp) => Some(build_vtysh_dryrun_cmd(candidate)),
            (Validator::DeviceCommand, _) => Some(build_cfggen_check_cmd(candidate)),
        }
    }

    /// Ordered apply steps; the first failing step stops the sequence
    pub fn apply_cmds(&self, candidate: &str, reload: bool) -> Vec<String> {
        let mut cmds = match self.apply_mode {
            ApplyMode::MergeLines => vec![
                build_vtysh_push_cmd(candidate),
                build_vtysh_writeconfig_cmd(),
            ],
            ApplyMode::WholeFile => vec![build_copy_cmd(candidate, self.live_path)],
        };

        if let Some(service) = self.restart_service {
            cmds.push(build_restart_service_cmd(service));
        }
        if reload && self.supports_reload {
            cmds.push(build_config_reload_cmd());
        }
        cmds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ts: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(ts, 0).single().unwrap()
    }

    #[test]
    fn test_failure_policy() {
        assert!(!DomainProfile::for_domain(Domain::Bgp).apply_failure_is_fatal);
        assert!(DomainProfile::for_domain(Domain::Snmp).apply_failure_is_fatal);
        assert!(DomainProfile::for_domain(Domain::ConfigDb).apply_failure_is_fatal);
    }

    #[test]
    fn test_snmp_compares_parsed_yaml() {
        let snmp = DomainProfile::for_domain(Domain::Snmp);
        let live = "snmp_rocommunity: public\nsnmp_location: paris-dc1\n";

        assert!(snmp.matches_live(
            live,
            "# managed by confmgrd\nsnmp_rocommunity:   public\n\nsnmp_location: paris-dc1\n"
        ));
        assert!(!snmp.matches_live(live, "snmp_rocommunity: n0c-r3ad\nsnmp_location: paris-dc1\n"));
        assert!(!snmp.matches_live("", live));
        assert!(!snmp.matches_live("snmp_rocommunity: [public\n", live));
    }

    #[test]
    fn test_config_db_compares_text() {
        let config_db = DomainProfile::for_domain(Domain::ConfigDb);
        assert!(config_db.matches_live("{}\n", "{}\n"));
        assert!(!config_db.matches_live("{}\n", "{ }\n"));
    }

    #[test]
    fn test_candidate_paths() {
        let now = at(1_700_000_000);
        assert_eq!(
            DomainProfile::for_domain(Domain::Bgp).candidate_path(now),
            "/etc/sonic/tmp/.1700000000_bgp.patch"
        );
        assert_eq!(
            DomainProfile::for_domain(Domain::Snmp).candidate_path(now),
            "/etc/sonic/tmp/snmp.yml"
        );
        assert_eq!(
            DomainProfile::for_domain(Domain::ConfigDb).candidate_path(now),
            "/etc/sonic/tmp/config_db.json"
        );
    }

    #[test]
    fn test_validate_cmds() {
        let bgp = DomainProfile::for_domain(Domain::Bgp);
        assert!(bgp.validate_cmd("/c").unwrap().contains("vtysh --dryrun"));

        let config_db = DomainProfile::for_domain(Domain::ConfigDb);
        assert!(config_db.validate_cmd("/c").unwrap().contains("sonic-cfggen -j"));

        assert_eq!(DomainProfile::for_domain(Domain::Snmp).validate_cmd("/c"), None);
    }

    #[test]
    fn test_bgp_apply_cmds() {
        let cmds = DomainProfile::for_domain(Domain::Bgp).apply_cmds("/c", true);
        assert_eq!(
            cmds,
            vec![
                "sudo vtysh --inputfile \"/c\"".to_string(),
                "sudo vtysh --writeconfig".to_string(),
            ]
        );
    }

    #[test]
    fn test_snmp_apply_cmds() {
        let cmds = DomainProfile::for_domain(Domain::Snmp).apply_cmds("/c", false);
        assert_eq!(cmds.len(), 2);
        assert!(cmds[0].contains("/bin/cp \"/c\" \"/etc/sonic/snmp.yml\""));
        assert!(cmds[1].contains("systemctl restart \"snmp.service\""));
    }

    #[test]
    fn test_config_db_reload_is_optional() {
        let profile = DomainProfile::for_domain(Domain::ConfigDb);
        assert_eq!(profile.apply_cmds("/c", false).len(), 1);

        let cmds = profile.apply_cmds("/c", true);
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[1], "sudo config reload -y");
    }
}
