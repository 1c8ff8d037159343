//! Multi-domain reconciliation.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use sonic_cfgmgr_common::{CfgMgrError, ExecResult};
use sonic_cfgmgr_test::{fixtures, CommandVerifier, FileVerifier, MemoryTemplating, MockAgent};
use sonic_confmgrd::paths::{SNMP_FILE, STAGING_DIR};
use sonic_confmgrd::{ApplyRequest, Coordinator, Outcome};

const BGP_TEMPLATE: &str = "salt://sonic/frr_routing_policy.conf";
const SNMP_TEMPLATE: &str = "salt://sonic/snmp.yml";

fn coordinator(agent: &Arc<MockAgent>) -> Coordinator {
    let templating = MemoryTemplating::new()
        .with_template(BGP_TEMPLATE, fixtures::frr::ROUTING_POLICY_TEMPLATE)
        .with_template(SNMP_TEMPLATE, fixtures::snmp::SNMP_TEMPLATE);
    Coordinator::new(agent.clone(), Arc::new(templating))
}

fn switch() -> MockAgent {
    MockAgent::new()
        .with_file(SNMP_FILE, fixtures::snmp::SNMP_YML)
        .with_copy_emulation()
        .on_command_sequence(
            "show run bgp",
            vec![
                ExecResult::ok(fixtures::frr::SHOW_RUN_BGP),
                ExecResult::ok(fixtures::frr::SHOW_RUN_BGP_AFTER_PUSH),
            ],
        )
}

/// Context valid for both the routing policy and the snmp templates
fn context() -> serde_json::Value {
    let mut context = fixtures::frr::changed_context();
    let snmp = fixtures::snmp::changed_context();
    if let (Some(target), Some(source)) = (context.as_object_mut(), snmp.as_object()) {
        target.extend(source.clone());
    }
    context
}

fn request() -> ApplyRequest {
    ApplyRequest::new("base", context())
        .with_template("bgp", BGP_TEMPLATE)
        .with_template("acl", "salt://sonic/acl.json")
        .with_template("snmp", SNMP_TEMPLATE)
}

#[tokio::test]
async fn test_aggregate_in_request_order() {
    let agent = Arc::new(switch());

    let aggregate = coordinator(&agent).apply("tor1", &request()).await.unwrap();

    assert_eq!(aggregate.name, "tor1");
    assert_eq!(aggregate.result, Outcome::Success);
    assert_eq!(
        aggregate.comment,
        vec![
            "** bgp **\n- Configuration pushed and loaded".to_string(),
            "** acl **\nunsupported".to_string(),
            "** snmp **\n- Configuration pushed and loaded".to_string(),
        ]
    );
    assert_eq!(
        aggregate.changes.keys().collect::<Vec<_>>(),
        vec!["bgp", "snmp"]
    );
    assert!(aggregate.changes["snmp"].is_some());

    CommandVerifier::from_agent(&agent)
        .assert_order("sudo vtysh --writeconfig", "/bin/cp")
        .unwrap();
    FileVerifier::new(&agent).assert_dir_empty(STAGING_DIR).unwrap();
}

#[tokio::test]
async fn test_bgp_push_failure_makes_aggregate_false() {
    let agent = Arc::new(switch().on_command(
        "sudo vtysh --inputfile",
        ExecResult::failed(1, "% Unknown command"),
    ));

    let aggregate = coordinator(&agent).apply("tor1", &request()).await.unwrap();

    assert_eq!(aggregate.result, Outcome::Failure);
    assert_eq!(
        aggregate.comment[0],
        "** bgp **\n- Unable to push BGP configuration: % Unknown command"
    );
    // Later domains still run after a reported failure
    FileVerifier::new(&agent)
        .assert_content(SNMP_FILE, "snmp_rocommunity: n0c-r3ad\nsnmp_location: paris-dc1\n")
        .unwrap();
}

#[tokio::test]
async fn test_fatal_error_aborts_remaining_domains() {
    let agent = Arc::new(switch().on_command("--dryrun", ExecResult::failed(1, "% bad line")));

    let err = coordinator(&agent).apply("tor1", &request()).await.unwrap_err();

    assert!(matches!(err, CfgMgrError::InvalidConfiguration { ref domain, .. } if domain == "bgp"));
    FileVerifier::new(&agent)
        .assert_content(SNMP_FILE, fixtures::snmp::SNMP_YML)
        .unwrap();
    FileVerifier::new(&agent).assert_dir_empty(STAGING_DIR).unwrap();
}

#[tokio::test]
async fn test_dry_run_changes_nothing() {
    let agent = Arc::new(switch());
    let request = request().dry_run(true).reload_on_config_db_change(true);

    let aggregate = coordinator(&agent).apply("tor1", &request).await.unwrap();

    assert_eq!(aggregate.result, Outcome::Unknown);
    assert!(aggregate.changes.values().all(Option::is_none));
    assert_eq!(serde_json::to_value(&aggregate).unwrap()["result"], serde_json::Value::Null);

    let commands = CommandVerifier::from_agent(&agent);
    commands
        .assert_command_not_executed("sudo vtysh --inputfile")
        .unwrap();
    commands.assert_command_not_executed("/bin/cp").unwrap();
    commands.assert_command_not_executed("systemctl").unwrap();
    FileVerifier::new(&agent)
        .assert_content(SNMP_FILE, fixtures::snmp::SNMP_YML)
        .unwrap();
    FileVerifier::new(&agent).assert_dir_empty(STAGING_DIR).unwrap();
}

#[tokio::test]
async fn test_push_only_if_changes_is_forwarded() {
    let agent = Arc::new(switch());
    let mut context = fixtures::frr::unchanged_context();
    if let (Some(target), Some(source)) = (
        context.as_object_mut(),
        fixtures::snmp::unchanged_context().as_object(),
    ) {
        target.extend(source.clone());
    }
    let request = ApplyRequest::new("base", context)
        .with_template("bgp", BGP_TEMPLATE)
        .with_template("snmp", SNMP_TEMPLATE)
        .push_only_if_changes(true);

    let aggregate = coordinator(&agent).apply("tor1", &request).await.unwrap();

    assert_eq!(aggregate.result, Outcome::Success);
    assert!(aggregate.changes.values().all(Option::is_none));
    assert!(aggregate.comment[0]
        .starts_with("** bgp **\n- No changes detected in routing_policy:\n"));
    assert_eq!(aggregate.comment[1], "** snmp **\n- No change detected");
    let commands = CommandVerifier::from_agent(&agent);
    commands
        .assert_command_not_executed("sudo vtysh --inputfile")
        .unwrap();
    commands.assert_command_not_executed("systemctl").unwrap();
}
