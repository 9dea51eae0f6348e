use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};

use conduit_core::{AppError, ErrorCode, ErrorDescriptor, ResumeState};
use conduit_io::{Session, process};

use crate::integration::common::{data_dir, machine_emitter};

fn connector_config() -> Value {
    json!({
        "connectorCredentials": {"client_id": "abc"},
        "connectorConf": {
            "adaccounts": [{"account_id": "act_1"}, {"account_id": "act_2"}],
            "requests": [
                {"connectorsaccountrequest": {"id": "campaigns", "isDimension": true, "status": 200}},
                {"connectorsaccountrequest": {"id": "insights", "status": 200}}
            ]
        },
        "requestParams": {"start_date": "2024-06-01", "end_date": "2024-06-02", "process_type": "daily"},
        "processId": "run-42"
    })
}

/// Emits one row and one checkpoint per work item.
fn run_all(session: &Session) -> Result<(), ErrorDescriptor> {
    let items = session.work_items().map_err(ErrorDescriptor::from)?;
    for item in &items {
        let mut row = serde_json::Map::new();
        row.insert("requestId".into(), item.request_id().into());
        if let Some(account) = &item.ad_account_id {
            row.insert("accountId".into(), account.as_str().into());
        }
        row.insert("impressions".into(), 10.into());

        session
            .emitter()
            .processed(&row, &ResumeState::checkpoint_for(item))
            .map_err(ErrorDescriptor::from)?;
        session
            .checkpoint_after(item)
            .map_err(ErrorDescriptor::from)?;
    }
    Ok(())
}

#[test]
fn full_run_reports_rows_and_checkpoints() {
    let (_tmp, options) = data_dir(&connector_config(), None);
    let (emitter, captured) = machine_emitter();

    process(&options, emitter, run_all).unwrap();

    let messages = captured.messages();
    // 2 dimension items + 2 dates x 2 accounts, each a row and a checkpoint
    assert_eq!(messages.len(), 12);

    let rows: Vec<&Value> = messages.iter().filter(|m| m["type"] == "processed").collect();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0]["request_id"], "campaigns");
    assert_eq!(rows[0]["date"], "dimension");
    assert_eq!(rows[0]["ad_account"], "act_1");
    assert_eq!(rows[5]["date"], "2024-06-02");
    assert_eq!(rows[5]["ad_account"], "act_2");

    let payload = STANDARD.decode(rows[3]["message"].as_str().unwrap()).unwrap();
    let payload: Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(payload["impressions"], 10);

    let last = messages.last().unwrap();
    assert_eq!(last["type"], "checkpoint");
    assert_eq!(last["state"], json!({"date": "2024-06-02", "requestId": "insights"}));
    assert!(last["error"].is_null());
}

#[test]
fn resumed_run_skips_dimensions_and_earlier_dates() {
    let state = json!({"date": "2024-06-02", "requestId": "insights"});
    let (_tmp, options) = data_dir(&connector_config(), Some(&state));
    let (emitter, captured) = machine_emitter();

    let session = Session::load(&options, emitter).unwrap();
    let items = session.work_items().unwrap();
    session.emitter().plan(&items).unwrap();

    let messages = captured.messages();
    assert_eq!(
        messages[0],
        json!({
            "type": "plan",
            "msg": [
                {"requestId": "insights", "date": "2024-06-02", "accountId": "act_1"},
                {"requestId": "insights", "date": "2024-06-02", "accountId": "act_2"}
            ]
        })
    );
}

#[test]
fn failing_connector_checkpoints_last_good_state() {
    let (_tmp, options) = data_dir(&connector_config(), None);
    let (emitter, captured) = machine_emitter();

    let err = process(&options, emitter, |session| {
        let items = session.work_items().map_err(ErrorDescriptor::from)?;
        session
            .checkpoint_after(&items[0])
            .map_err(ErrorDescriptor::from)?;
        Err(ErrorDescriptor::new(ErrorCode::AuthNotValid).with_details("token revoked"))
    })
    .unwrap_err();

    assert!(matches!(err, AppError::ConnectorFailed(_)));
    assert!(!err.is_retryable());

    let last = captured.messages().pop().unwrap();
    assert_eq!(last["state"], json!({"date": "dimension", "requestId": "campaigns"}));
    assert_eq!(last["error"]["code"], 1000);
    assert_eq!(last["error"]["details"], "token revoked");
}

#[test]
fn invalid_resume_state_fails_planning() {
    let state = json!({"date": "June 2nd"});
    let (_tmp, options) = data_dir(&connector_config(), Some(&state));
    let (emitter, captured) = machine_emitter();

    let err = process(&options, emitter, run_all).unwrap_err();
    let AppError::ConnectorFailed(descriptor) = err else {
        panic!("expected a connector failure");
    };
    assert_eq!(descriptor.error_code(), Some(ErrorCode::InvalidDate));

    let last = captured.messages().pop().unwrap();
    assert_eq!(last["error"]["code"], 1070);
    assert_eq!(last["state"], json!({"date": "June 2nd"}));
}
