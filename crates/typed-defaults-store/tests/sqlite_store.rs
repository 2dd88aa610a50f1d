use typed_defaults_store::{SqliteStore, Store, StoreConfiguration, StoredValue};

#[test]
fn test_values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.sqlite");

    {
        let store = SqliteStore::open(&path, "app").unwrap();
        store.set("launches", StoredValue::Integer(12)).unwrap();
        store.set("ratio", StoredValue::Double(0.25)).unwrap();
        store.set("avatar", StoredValue::Data(vec![1, 2, 3])).unwrap();
        store.set("scratch", StoredValue::Bool(true)).unwrap();
        store.remove("scratch").unwrap();
    }

    let store = SqliteStore::open(&path, "app").unwrap();
    assert_eq!(store.get("launches").unwrap(), Some(StoredValue::Integer(12)));
    assert_eq!(store.get("ratio").unwrap(), Some(StoredValue::Double(0.25)));
    assert_eq!(store.get("avatar").unwrap(), Some(StoredValue::Data(vec![1, 2, 3])));
    assert!(!store.contains("scratch").unwrap());
    assert_eq!(store.keys().unwrap(), vec!["avatar", "launches", "ratio"]);
}

#[test]
fn test_configuration_creates_folder() {
    let dir = tempfile::tempdir().unwrap();
    let folder_path = dir.path().join("nested").join("prefs");

    let configuration = StoreConfiguration::Sqlite {
        folder_path: folder_path.clone(),
        db_name: "app".to_string(),
        domain: "main".to_string(),
    };

    let store = configuration.clone().open().unwrap();
    store
        .set("greeting", StoredValue::String("hi".to_string()))
        .unwrap();
    drop(store);

    assert!(folder_path.join("app.sqlite").exists());

    let reopened = configuration.open().unwrap();
    assert_eq!(
        reopened.get("greeting").unwrap(),
        Some(StoredValue::String("hi".to_string()))
    );
}
