use super::*;

#[test]
fn put_then_get_returns_exact_pair() {
    let store = MemoryBlobStore::new();
    store.put("a.png", "image/png", b"\x89PNG").unwrap();
    assert_eq!(
        store.get("a.png").unwrap(),
        Some(StoredImage {
            mime: "image/png".to_string(),
            bytes: b"\x89PNG".to_vec(),
        })
    );
}

#[test]
fn put_overwrites_type_and_bytes_together() {
    let store = MemoryBlobStore::new();
    store.put("x", "image/png", b"old").unwrap();
    store.put("x", "image/gif", b"newer").unwrap();
    let got = store.get("x").unwrap().unwrap();
    assert_eq!(got.mime, "image/gif");
    assert_eq!(got.bytes, b"newer");
}

#[test]
fn names_are_case_sensitive() {
    let store = MemoryBlobStore::new();
    store.put("A.png", "image/png", b"1").unwrap();
    assert_eq!(store.get("a.png").unwrap(), None);
}

#[test]
fn delete_reports_existence_and_list_is_sorted() {
    let store = MemoryBlobStore::new();
    store.put("b", "image/png", b"22").unwrap();
    store.put("a", "image/png", b"1").unwrap();
    assert_eq!(
        store.list().unwrap(),
        vec![
            BlobEntry {
                name: "a".to_string(),
                size: 1
            },
            BlobEntry {
                name: "b".to_string(),
                size: 2
            },
        ]
    );
    assert!(store.delete("a").unwrap());
    assert!(!store.delete("a").unwrap());
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn concurrent_readers_see_whole_entries() {
    let store = Arc::new(MemoryBlobStore::new());
    store.put("k", "image/png", &[1u8; 64]).unwrap();

    let writer = {
        let store = Arc::clone(&store);
        std::thread::spawn(move || {
            for i in 0..200u32 {
                if i % 2 == 0 {
                    store.put("k", "image/gif", &[2u8; 128]).unwrap();
                } else {
                    store.put("k", "image/png", &[1u8; 64]).unwrap();
                }
            }
        })
    };
    for _ in 0..200 {
        let got = store.get("k").unwrap().unwrap();
        match got.mime.as_str() {
            "image/png" => assert_eq!(got.bytes, vec![1u8; 64]),
            "image/gif" => assert_eq!(got.bytes, vec![2u8; 128]),
            other => panic!("unexpected mime {other}"),
        }
    }
    writer.join().unwrap();
}
