use chrono::Utc;
use kabu_core::store::port::{SystemStore, User};
use kabu_store::config::set_root_dir;
use kabu_store::system::SqliteSystemStore;
use tempfile::tempdir;

/// # Summary
/// 系统库的端到端集成测试：用户存取与自选股增删查。
#[tokio::test]
async fn test_system_store_full_integration() {
    // 1. 初始化临时测试环境
    let tmp_dir = tempdir().expect("Failed to create temp dir");
    set_root_dir(tmp_dir.path().to_path_buf());

    let store = SqliteSystemStore::new()
        .await
        .expect("Failed to create system store");

    // 2. 用户存取
    let user = User {
        id: "u1".to_string(),
        name: "Tester".to_string(),
        password_hash: "$2b$12$fakehashfakehashfakehash".to_string(),
        created_at: Utc::now(),
    };
    store.save_user(&user).await.unwrap();
    let saved = store.get_user("u1").await.unwrap().expect("User should exist");
    assert_eq!(saved.name, "Tester");
    assert_eq!(saved.password_hash, user.password_hash);
    assert!(store.get_user("nobody").await.unwrap().is_none());

    // 3. save_user 是 Upsert：改名后再存覆盖原行
    let renamed = User {
        name: "Renamed".to_string(),
        ..saved
    };
    store.save_user(&renamed).await.unwrap();
    assert_eq!(store.get_user("u1").await.unwrap().unwrap().name, "Renamed");

    // 4. 自选股：重复添加为 no-op，移除后消失
    store.add_to_watchlist("u1", "AAPL").await.unwrap();
    store.add_to_watchlist("u1", "MSFT").await.unwrap();
    store.add_to_watchlist("u1", "AAPL").await.unwrap();
    let watchlist = store.get_watchlist("u1").await.unwrap();
    assert_eq!(watchlist, vec!["AAPL".to_string(), "MSFT".to_string()]);

    store.remove_from_watchlist("u1", "AAPL").await.unwrap();
    let watchlist = store.get_watchlist("u1").await.unwrap();
    assert_eq!(watchlist, vec!["MSFT".to_string()]);

    // 5. 自选股按用户隔离
    assert!(store.get_watchlist("u2").await.unwrap().is_empty());
}
