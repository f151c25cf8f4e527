use super::*;

#[test]
fn round_trip_put_get() {
    let store = ContentStore::in_memory();
    store.put("cat.png", "image/png", b"bytes").unwrap();
    let got = store.get("cat.png").unwrap();
    assert_eq!(got.mime, "image/png");
    assert_eq!(got.bytes, b"bytes");
}

#[test]
fn missing_is_not_found() {
    let store = ContentStore::in_memory();
    assert!(store.get("nope.png").unwrap_err().is_not_found());
    assert_eq!(store.try_get("nope.png").unwrap(), None);
    assert!(!store.delete("nope.png").unwrap());
}

#[test]
fn clones_share_backing_store() {
    let a = ContentStore::in_memory();
    let b = a.clone();
    a.put("x", "image/gif", b"1").unwrap();
    assert!(b.get("x").is_ok());
}

#[test]
fn name_rules() {
    for ok in ["a", "a.png", "my-link_2", "UPPER.JPG", "ünïcode.png"] {
        validate_name(ok).unwrap();
    }
    let long = "x".repeat(MAX_NAME_LEN + 1);
    for bad in ["", ".hidden", "..", "a/b", "a\\b", "tab\there", long.as_str()] {
        assert!(validate_name(bad).is_err(), "{bad:?} should be rejected");
    }
}

#[test]
fn put_rejects_bad_names_and_mime() {
    let store = ContentStore::in_memory();
    assert!(matches!(
        store.put("../etc", "image/png", b""),
        Err(SnapfadeError::Validation(_))
    ));
    assert!(store.put("ok.png", "", b"").is_err());
    assert!(store.put("ok.png", "png", b"").is_err());
    assert!(store.put("ok.png", "image/png\n", b"").is_err());
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn put_rejects_reserved_route_names() {
    let store = ContentStore::in_memory();
    for name in ["upload", "gif", "links"] {
        assert!(
            matches!(
                store.put(name, "image/png", b"x"),
                Err(SnapfadeError::Validation(_))
            ),
            "{name}"
        );
    }
    store.put("Upload", "image/png", b"x").unwrap();
    store.put("upload.png", "image/png", b"x").unwrap();
    assert_eq!(store.list().unwrap().len(), 2);
}
