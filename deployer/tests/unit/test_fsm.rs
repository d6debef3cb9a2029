//! FSM unit tests

use custdeploy::deploy::fsm::{DeploymentEvent, DeploymentFsm, DeploymentState};

fn fsm_at(events: &[DeploymentEvent]) -> DeploymentFsm {
    let mut fsm = DeploymentFsm::new();
    for event in events {
        fsm.process(event.clone()).unwrap();
    }
    fsm
}

#[test]
fn test_fsm_initial_state() {
    let fsm = DeploymentFsm::new();
    assert_eq!(fsm.state(), DeploymentState::Idle);
    assert!(fsm.error().is_none());
    assert!(fsm.failed_stage().is_none());
}

#[test]
fn test_fsm_full_run() {
    let mut fsm = DeploymentFsm::new();

    let expected = [
        (DeploymentEvent::Start, DeploymentState::Authenticating),
        (DeploymentEvent::Authenticated, DeploymentState::PreUploadDelay),
        (DeploymentEvent::DelayElapsed, DeploymentState::Uploading),
        (DeploymentEvent::UploadsCompleted, DeploymentState::PrePublishDelay),
        (DeploymentEvent::DelayElapsed, DeploymentState::Publishing),
        (DeploymentEvent::PublishStarted, DeploymentState::Polling),
        (DeploymentEvent::PublishCompleted, DeploymentState::Succeeded),
    ];
    for (event, state) in expected {
        assert_eq!(fsm.process(event).unwrap(), state);
    }
    assert!(fsm.state().is_terminal());
}

#[test]
fn test_fsm_upload_failure_records_stage() {
    let mut fsm = fsm_at(&[
        DeploymentEvent::Start,
        DeploymentEvent::Authenticated,
        DeploymentEvent::DelayElapsed,
    ]);

    fsm.process(DeploymentEvent::Fail("Upload failed for RW.SiteMap".to_string()))
        .unwrap();

    assert_eq!(fsm.state(), DeploymentState::Failed);
    assert_eq!(fsm.failed_stage(), Some(DeploymentState::Uploading));
    assert_eq!(fsm.error(), Some("Upload failed for RW.SiteMap"));
}

#[test]
fn test_fsm_terminal_states_are_final() {
    let mut failed = fsm_at(&[
        DeploymentEvent::Start,
        DeploymentEvent::Fail("401".to_string()),
    ]);
    assert!(failed.process(DeploymentEvent::Start).is_err());
    assert!(failed.process(DeploymentEvent::Fail("again".to_string())).is_err());
    assert_eq!(failed.error(), Some("401"));

    let mut succeeded = fsm_at(&[
        DeploymentEvent::Start,
        DeploymentEvent::Authenticated,
        DeploymentEvent::DelayElapsed,
        DeploymentEvent::UploadsCompleted,
        DeploymentEvent::DelayElapsed,
        DeploymentEvent::PublishStarted,
        DeploymentEvent::PublishCompleted,
    ]);
    assert!(succeeded.process(DeploymentEvent::Fail("late".to_string())).is_err());
    assert_eq!(succeeded.state(), DeploymentState::Succeeded);
}

#[test]
fn test_fsm_invalid_transition() {
    let mut fsm = DeploymentFsm::new();

    // Cannot upload before logging in
    assert!(fsm.process(DeploymentEvent::UploadsCompleted).is_err());
    assert_eq!(fsm.state(), DeploymentState::Idle);

    // Cannot skip the pre-publish delay
    let mut fsm = fsm_at(&[
        DeploymentEvent::Start,
        DeploymentEvent::Authenticated,
        DeploymentEvent::DelayElapsed,
        DeploymentEvent::UploadsCompleted,
    ]);
    assert!(fsm.process(DeploymentEvent::PublishStarted).is_err());
}

#[test]
fn test_state_display_names_stage() {
    assert_eq!(DeploymentState::Authenticating.to_string(), "authentication");
    assert_eq!(DeploymentState::Polling.to_string(), "publish status polling");
}
