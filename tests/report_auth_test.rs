// ==========================================
// 报表与认证集成测试
// ==========================================

mod test_helpers;

use chemlizer::api::ApiError;
use chemlizer::config::config_keys;
use chemlizer::logging;
use chemlizer::report::REPORT_TITLE;
use test_helpers::{create_test_state, equipment_csv, fixture_bytes, register_user};

// ==========================================
// 报表
// ==========================================

#[tokio::test]
async fn test_report_without_upload_is_no_data() {
    logging::init_test();
    let (_temp_file, state) = create_test_state();
    let user = register_user(&state, "alice");
    let out_dir = tempfile::tempdir().unwrap();

    let err = state
        .report_api
        .write_report(&user, out_dir.path())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NoData(_)));
    assert_eq!(std::fs::read_dir(out_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_report_contains_metadata_and_rows() {
    logging::init_test();
    let (_temp_file, state) = create_test_state();
    let user = register_user(&state, "alice");
    let out_dir = tempfile::tempdir().unwrap();

    let response = state
        .upload_api
        .upload_csv(&user, "pump_valve.csv", &fixture_bytes("pump_valve.csv"))
        .await
        .unwrap();

    let path = state
        .report_api
        .write_report(&user, out_dir.path())
        .await
        .unwrap();
    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some(format!("chemlizer_report_{}.txt", response.upload_id).as_str())
    );

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with(REPORT_TITLE));
    assert!(text.contains("File: pump_valve.csv"));
    assert!(text.contains("Total Records: 2"));
    assert!(text.contains("Average Flowrate: 7.50"));
    assert!(text.contains("Average Pressure: 1.75"));
    assert!(text.contains("Average Temperature: 22.50"));
    assert!(text.contains("Pump-1"));
    assert!(text.contains("10.00"));
    assert!(text.contains("Page 1/1"));
}

#[tokio::test]
async fn test_report_pagination_follows_config() {
    logging::init_test();
    let (_temp_file, state) = create_test_state();
    let user = register_user(&state, "alice");

    state
        .config_manager
        .set_value(config_keys::REPORT_ROWS_PER_PAGE, "2")
        .unwrap();

    let csv = equipment_csv(&[
        ("A", "Pump", 1.0, 1.0, 1.0),
        ("B", "Pump", 1.0, 1.0, 1.0),
        ("C", "Pump", 1.0, 1.0, 1.0),
        ("D", "Pump", 1.0, 1.0, 1.0),
        ("E", "Pump", 1.0, 1.0, 1.0),
    ]);
    state
        .upload_api
        .upload_csv(&user, "five.csv", csv.as_bytes())
        .await
        .unwrap();

    let document = state.report_api.build_report(&user).unwrap();
    assert_eq!(document.page_count(), 3);
    assert_eq!(document.pages[0].rows[0][0], "A");
    assert_eq!(document.pages[2].rows[0][0], "E");
}

// ==========================================
// 认证
// ==========================================

#[test]
fn test_login_and_authenticate() {
    logging::init_test();
    let (_temp_file, state) = create_test_state();
    let user = state.auth_api.register("alice", "s3cret").unwrap();

    let session = state.auth_api.login("alice", "s3cret").unwrap();
    assert_eq!(session.user, user);
    assert!(!session.token.is_empty());

    // 每用户一个令牌
    let again = state.auth_api.login("alice", "s3cret").unwrap();
    assert_eq!(again.token, session.token);

    let resolved = state.auth_api.authenticate(&session.token).unwrap();
    assert_eq!(resolved, user);
}

#[test]
fn test_login_failures_are_auth_errors() {
    logging::init_test();
    let (_temp_file, state) = create_test_state();
    state.auth_api.register("alice", "s3cret").unwrap();

    for (username, password) in [("alice", "wrong"), ("nobody", "s3cret"), ("", ""), ("alice", "")] {
        let err = state.auth_api.login(username, password).unwrap_err();
        assert!(matches!(err, ApiError::AuthError(_)), "{}/{}", username, password);
    }

    let err = state.auth_api.authenticate("not-a-token").unwrap_err();
    assert!(matches!(err, ApiError::AuthError(_)));
}

#[test]
fn test_duplicate_registration_rejected() {
    logging::init_test();
    let (_temp_file, state) = create_test_state();
    state.auth_api.register("alice", "pw1").unwrap();

    let err = state.auth_api.register("alice", "pw2").unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[test]
fn test_logout_invalidates_token() {
    logging::init_test();
    let (_temp_file, state) = create_test_state();
    state.auth_api.register("alice", "pw").unwrap();
    let session = state.auth_api.login("alice", "pw").unwrap();

    state.auth_api.logout(&session.token).unwrap();
    assert!(state.auth_api.authenticate(&session.token).is_err());

    // 重新登录获得新令牌
    let next = state.auth_api.login("alice", "pw").unwrap();
    assert_ne!(next.token, session.token);
}
