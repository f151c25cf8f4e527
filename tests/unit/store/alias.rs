use super::*;

#[test]
fn create_get_retarget_delete() {
    let table = AliasTable::in_memory();
    table.create("logo", Some("logo-v1.png")).unwrap();
    assert_eq!(
        table.get("logo").unwrap(),
        Some(Alias {
            slug: "logo".to_string(),
            target: Some("logo-v1.png".to_string()),
        })
    );

    table.retarget("logo", Some("logo-v2.png")).unwrap();
    assert_eq!(
        table.get("logo").unwrap().unwrap().target.as_deref(),
        Some("logo-v2.png")
    );

    table.retarget("logo", None).unwrap();
    assert_eq!(table.get("logo").unwrap().unwrap().target, None);

    assert!(table.delete("logo").unwrap());
    assert!(!table.delete("logo").unwrap());
    assert_eq!(table.get("logo").unwrap(), None);
}

#[test]
fn create_without_target_is_allowed() {
    let table = AliasTable::in_memory();
    let alias = table.create("empty", None).unwrap();
    assert_eq!(alias.target, None);
}

#[test]
fn reserved_and_duplicate_slugs_are_rejected() {
    let table = AliasTable::in_memory();
    for reserved in ["upload", "edit", "delete", "gif", "editor", "links"] {
        assert!(
            matches!(table.create(reserved, None), Err(SnapfadeError::Validation(_))),
            "{reserved} should be reserved"
        );
    }
    table.create("mine", None).unwrap();
    assert!(matches!(
        table.create("mine", Some("x.png")),
        Err(SnapfadeError::Validation(_))
    ));
}

#[test]
fn retarget_missing_alias_is_not_found() {
    let table = AliasTable::in_memory();
    assert!(table.retarget("ghost", Some("a.png")).unwrap_err().is_not_found());
}

#[test]
fn invalid_names_are_rejected_or_absent() {
    let table = AliasTable::in_memory();
    assert!(table.create("a/b", None).is_err());
    assert!(table.create("ok", Some("../x")).is_err());
    assert_eq!(table.get("a/b").unwrap(), None);
}

#[test]
fn list_is_sorted_by_slug() {
    let table = AliasTable::in_memory();
    table.create("b", None).unwrap();
    table.create("a", Some("x.png")).unwrap();
    let slugs: Vec<String> = table.list().unwrap().into_iter().map(|a| a.slug).collect();
    assert_eq!(slugs, vec!["a", "b"]);
}
