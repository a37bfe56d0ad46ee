// End-to-end behaviour of HasPreferences against SQLite

mod common;

use chrono::{TimeZone, Utc};
use common::{setup_test_db, User};
use modelprefs_core::{Collection, ExErrorKind, HasPreferences, PreferenceBackend, PreferenceValue};
use modelprefs_store::{db, PreferenceSettings, SqlitePreferenceStore};
use serde_json::json;

fn s(v: &str) -> PreferenceValue {
    PreferenceValue::from(v)
}

#[test]
fn test_default_value_before_anything_is_set() {
    let settings = PreferenceSettings::default();
    let conn = setup_test_db(&settings);
    let store = SqlitePreferenceStore::new(&conn, settings);
    let user = User { id: 1, store: &store };

    assert_eq!(user.get_preference("nonexistent", None).unwrap(), None);
    assert_eq!(
        user.get_preference("nonexistent", Some(s("some default")))
            .unwrap(),
        Some(s("some default"))
    );
    assert_eq!(
        user.get_preference("model defined default", None).unwrap(),
        Some(s("defined by model"))
    );
}

#[test]
fn test_set_preferences_writes_rows() {
    let settings = PreferenceSettings::default();
    let conn = setup_test_db(&settings);
    let store = SqlitePreferenceStore::new(&conn, settings);
    let user = User { id: 1, store: &store };

    user.set_preferences([("preference1", "value1"), ("preference2", "value2")])
        .unwrap();

    let rows = user.preferences().all().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].preference, "preference1");
    assert_eq!(rows[0].value, "value1");
    assert_eq!(rows[1].preference, "preference2");
    assert_eq!(rows[1].value, "value2");
    assert_eq!(rows[0].preferable_type, "users");
    assert_eq!(rows[0].preferable_id, 1);
}

#[test]
fn test_override_updates_in_place() {
    let settings = PreferenceSettings::default();
    let conn = setup_test_db(&settings);
    let store = SqlitePreferenceStore::new(&conn, settings);
    let user = User { id: 1, store: &store };

    user.set_preference("preference", "value1").unwrap();
    let first_id = user.preferences().find("preference").unwrap().unwrap().id;
    user.set_preference("preference", "value2").unwrap();

    let rows = user.preferences().all().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, first_id);
    assert_eq!(
        user.get_preference("preference", None).unwrap(),
        Some(s("value2"))
    );
}

#[test]
fn test_clear_preferences_removes_named_rows() {
    let settings = PreferenceSettings::default();
    let conn = setup_test_db(&settings);
    let store = SqlitePreferenceStore::new(&conn, settings);
    let user = User { id: 1, store: &store };
    user.set_preferences([("a", "1"), ("b", "2"), ("c", "3")])
        .unwrap();

    user.clear_preferences(&["a", "c"]).unwrap();

    let rows = user.preferences().all().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].preference, "b");
}

#[test]
fn test_clear_all_reverts_to_defaults() {
    let settings = PreferenceSettings::default();
    let conn = setup_test_db(&settings);
    let store = SqlitePreferenceStore::new(&conn, settings);
    let user = User { id: 1, store: &store };
    let other = User { id: 2, store: &store };
    user.set_preference("model defined default", "changed")
        .unwrap();
    other.set_preference("theme", "dark").unwrap();

    user.clear_all_preferences().unwrap();

    assert_eq!(user.preferences().count().unwrap(), 0);
    assert_eq!(
        user.get_preference("model defined default", None).unwrap(),
        Some(s("defined by model"))
    );
    assert_eq!(other.preferences().count().unwrap(), 1);
}

#[test]
fn test_row_points_back_to_owner() {
    let settings = PreferenceSettings::default();
    let conn = setup_test_db(&settings);
    let store = SqlitePreferenceStore::new(&conn, settings);
    let user = User { id: 7, store: &store };
    user.set_preference("preference", "value").unwrap();
    let id = user.preferences().find("preference").unwrap().unwrap().id;

    let row = store.find(id).unwrap().unwrap();

    assert_eq!(row.preferable(), user.preference_owner());
    assert!(store.find(id + 100).unwrap().is_none());
}

#[test]
fn test_custom_table_holds_rows() {
    let settings = PreferenceSettings::builder()
        .table("account_preferences")
        .environment(Default::default())
        .build()
        .unwrap();
    let conn = setup_test_db(&settings);
    let store = SqlitePreferenceStore::new(&conn, settings);
    let user = User { id: 1, store: &store };

    user.set_preference("theme", "dark").unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM account_preferences", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_visible_json_drops_hidden_attributes() {
    let settings = PreferenceSettings::builder()
        .hidden_attributes(["preferable_type", "preferable_id"])
        .environment(Default::default())
        .build()
        .unwrap();
    let conn = setup_test_db(&settings);
    let store = SqlitePreferenceStore::new(&conn, settings);
    let user = User { id: 1, store: &store };
    user.set_preference("theme", "dark").unwrap();

    let row = user.preferences().find("theme").unwrap().unwrap();
    let json = store.to_visible_json(&row);

    assert_eq!(json["preference"], "theme");
    assert!(json.get("preferable_type").is_none());
    assert!(json.get("preferable_id").is_none());
}

#[test]
fn test_duplicate_rows_read_oldest_and_clear_together() {
    let settings = PreferenceSettings::default();
    let conn = setup_test_db(&settings);
    let store = SqlitePreferenceStore::new(&conn, settings);
    let user = User { id: 1, store: &store };
    let owner = user.preference_owner();
    store.insert_preference(&owner, "theme", "a").unwrap();
    store.insert_preference(&owner, "theme", "b").unwrap();

    assert_eq!(user.get_preference("theme", None).unwrap(), Some(s("a")));

    user.clear_preference("theme").unwrap();

    assert_eq!(user.preferences().count().unwrap(), 0);
}

// ===== STORE FAILURES =====

fn unmigrated() -> rusqlite::Connection {
    db::open_in_memory().unwrap()
}

#[test]
fn test_get_on_missing_table_propagates_persistence_error() {
    let conn = unmigrated();
    let store = SqlitePreferenceStore::new(&conn, PreferenceSettings::default());
    let user = User { id: 1, store: &store };

    let err = user.get_preference("theme", None).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Persistence);
    assert_eq!(err.op(), Some("sqlite"));
    assert_eq!(err.preference(), Some("theme"));
    assert_eq!(err.owner(), Some("users#1"));
}

#[test]
fn test_set_on_missing_table_propagates_persistence_error() {
    let conn = unmigrated();
    let store = SqlitePreferenceStore::new(&conn, PreferenceSettings::default());
    let user = User { id: 1, store: &store };

    let err = user.set_preference("theme", "dark").unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Persistence);
    assert_eq!(err.op(), Some("sqlite"));
    assert_eq!(err.preference(), Some("theme"));
    assert_eq!(err.owner(), Some("users#1"));
}

#[test]
fn test_clear_on_dropped_table_propagates_persistence_error() {
    let settings = PreferenceSettings::default();
    let conn = setup_test_db(&settings);
    conn.execute_batch("DROP TABLE model_preferences").unwrap();
    let store = SqlitePreferenceStore::new(&conn, settings);
    let user = User { id: 1, store: &store };

    let err = user.clear_preference("theme").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Persistence);
    assert_eq!(err.preference(), Some("theme"));
    assert_eq!(err.owner(), Some("users#1"));

    let err = user.clear_all_preferences().unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Persistence);
    assert_eq!(err.owner(), Some("users#1"));
}

#[test]
fn test_unrepresentable_timestamp_is_an_error() {
    let settings = PreferenceSettings::default();
    let conn = setup_test_db(&settings);
    conn.execute(
        "INSERT INTO model_preferences
         (preference, value, preferable_id, preferable_type, created_at, updated_at)
         VALUES ('theme', 'dark', 1, 'users', ?1, 0)",
        [i64::MAX],
    )
    .unwrap();
    let store = SqlitePreferenceStore::new(&conn, settings);
    let user = User { id: 1, store: &store };

    let err = user.preferences().find("theme").unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Persistence);
    assert!(err.message().contains("created_at") || err.message().contains("timestamp"));
}

// ===== CASTS =====

#[test]
fn test_int_and_integer_casts() {
    let settings = PreferenceSettings::default();
    let conn = setup_test_db(&settings);
    let store = SqlitePreferenceStore::new(&conn, settings);
    let user = User { id: 1, store: &store };

    for name in ["int-preference", "integer-preference"] {
        user.set_preference(name, 1234).unwrap();
        assert_eq!(
            user.get_preference(name, None).unwrap(),
            Some(PreferenceValue::Int(1234))
        );
        user.set_preference(name, "1234").unwrap();
        assert_eq!(
            user.get_preference(name, None).unwrap(),
            Some(PreferenceValue::Int(1234))
        );
    }
}

#[test]
fn test_float_casts() {
    let settings = PreferenceSettings::default();
    let conn = setup_test_db(&settings);
    let store = SqlitePreferenceStore::new(&conn, settings);
    let user = User { id: 1, store: &store };

    for name in ["real-preference", "float-preference", "double-preference"] {
        user.set_preference(name, 12.34).unwrap();
        assert_eq!(
            user.get_preference(name, None).unwrap(),
            Some(PreferenceValue::Float(12.34))
        );
    }
}

#[test]
fn test_string_cast() {
    let settings = PreferenceSettings::default();
    let conn = setup_test_db(&settings);
    let store = SqlitePreferenceStore::new(&conn, settings);
    let user = User { id: 1, store: &store };

    user.set_preference("string-preference", 1234).unwrap();

    assert_eq!(
        user.get_preference("string-preference", None).unwrap(),
        Some(s("1234"))
    );
}

#[test]
fn test_bool_and_boolean_casts() {
    let settings = PreferenceSettings::default();
    let conn = setup_test_db(&settings);
    let store = SqlitePreferenceStore::new(&conn, settings);
    let user = User { id: 1, store: &store };

    for name in ["bool-preference", "boolean-preference"] {
        user.set_preference(name, 1).unwrap();
        assert_eq!(
            user.get_preference(name, None).unwrap(),
            Some(PreferenceValue::Bool(true))
        );
        user.set_preference(name, 0).unwrap();
        assert_eq!(
            user.get_preference(name, None).unwrap(),
            Some(PreferenceValue::Bool(false))
        );
        user.set_preference(name, true).unwrap();
        assert_eq!(
            user.get_preference(name, None).unwrap(),
            Some(PreferenceValue::Bool(true))
        );
    }
}

#[test]
fn test_object_cast() {
    let settings = PreferenceSettings::default();
    let conn = setup_test_db(&settings);
    let store = SqlitePreferenceStore::new(&conn, settings);
    let user = User { id: 1, store: &store };
    let object = json!({ "foo": "bar", "count": 2 });

    user.set_preference("object-preference", object.clone())
        .unwrap();

    assert_eq!(
        user.get_preference("object-preference", None).unwrap(),
        Some(PreferenceValue::Json(object))
    );
}

#[test]
fn test_array_and_json_casts() {
    let settings = PreferenceSettings::default();
    let conn = setup_test_db(&settings);
    let store = SqlitePreferenceStore::new(&conn, settings);
    let user = User { id: 1, store: &store };

    for name in ["array-preference", "json-preference"] {
        user.set_preference(name, json!(["foo", "bar"])).unwrap();
        assert_eq!(
            user.get_preference(name, None).unwrap(),
            Some(PreferenceValue::Json(json!(["foo", "bar"])))
        );
    }
}

#[test]
fn test_collection_cast() {
    let settings = PreferenceSettings::default();
    let conn = setup_test_db(&settings);
    let store = SqlitePreferenceStore::new(&conn, settings);
    let user = User { id: 1, store: &store };

    user.set_preference("collection-preference", Collection::from(vec!["foo"]))
        .unwrap();

    let stored = user
        .preferences()
        .find("collection-preference")
        .unwrap()
        .unwrap();
    assert_eq!(stored.value, r#"["foo"]"#);
    assert_eq!(
        user.get_preference("collection-preference", None).unwrap(),
        Some(PreferenceValue::Collection(Collection::from(vec!["foo"])))
    );
}

#[test]
fn test_date_and_datetime_casts() {
    let settings = PreferenceSettings::default();
    let conn = setup_test_db(&settings);
    let store = SqlitePreferenceStore::new(&conn, settings);
    let user = User { id: 1, store: &store };
    let when = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();

    for name in ["date-preference", "datetime-preference"] {
        user.set_preference(name, when).unwrap();
        let stored = user.preferences().find(name).unwrap().unwrap();
        assert_eq!(stored.value, "2024-03-09 07:05:01");
        assert_eq!(
            user.get_preference(name, None).unwrap(),
            Some(PreferenceValue::DateTime(when))
        );
    }
}

#[test]
fn test_timestamp_cast() {
    let settings = PreferenceSettings::default();
    let conn = setup_test_db(&settings);
    let store = SqlitePreferenceStore::new(&conn, settings);
    let user = User { id: 1, store: &store };
    let when = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();

    user.set_preference("timestamp-preference", when).unwrap();

    assert_eq!(
        user.get_preference("timestamp-preference", None).unwrap(),
        Some(PreferenceValue::Int(1709967901))
    );
}

#[test]
fn test_decimal_cast_rounds() {
    let settings = PreferenceSettings::default();
    let conn = setup_test_db(&settings);
    let store = SqlitePreferenceStore::new(&conn, settings);
    let user = User { id: 1, store: &store };

    user.set_preference("decimal-preference", 12.345).unwrap();

    assert_eq!(
        user.get_preference("decimal-preference", None).unwrap(),
        Some(s("12.35"))
    );
}

#[test]
fn test_undefined_cast_leaves_string() {
    let settings = PreferenceSettings::default();
    let conn = setup_test_db(&settings);
    let store = SqlitePreferenceStore::new(&conn, settings);
    let user = User { id: 1, store: &store };

    user.set_preference("undefined-type-preference", "1234")
        .unwrap();

    assert_eq!(
        user.get_preference("undefined-type-preference", None)
            .unwrap(),
        Some(s("1234"))
    );
}
