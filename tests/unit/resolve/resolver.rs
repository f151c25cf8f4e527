use std::sync::Arc;

use super::*;
use crate::store::blob::{BlobStore, MemoryBlobStore};

fn setup() -> (ContentStore, AliasTable, Resolver) {
    let images = ContentStore::in_memory();
    let aliases = AliasTable::in_memory();
    let resolver = Resolver::new(images.clone(), aliases.clone());
    (images, aliases, resolver)
}

fn image(res: Resolution) -> ResolvedImage {
    match res {
        Resolution::Image(img) => img,
        other => panic!("expected image, got {other:?}"),
    }
}

#[test]
fn reserved_names_win_over_everything() {
    let blobs = Arc::new(MemoryBlobStore::new());
    blobs.put("upload", "image/png", b"sneaky").unwrap();
    let resolver = Resolver::new(ContentStore::new(blobs), AliasTable::in_memory());
    assert_eq!(
        resolver.resolve("upload").unwrap(),
        Resolution::Reserved(Route::Upload)
    );
    assert_eq!(
        resolver.resolve("/").unwrap(),
        Resolution::Reserved(Route::Index)
    );
    assert_eq!(
        resolver.resolve("/links").unwrap(),
        Resolution::Reserved(Route::Links)
    );
}

#[test]
fn reserved_match_is_case_sensitive() {
    let (_, _, resolver) = setup();
    assert_eq!(resolver.resolve("Upload").unwrap(), Resolution::NotFound);
}

#[test]
fn direct_image_is_immutable() {
    let (images, _, resolver) = setup();
    images.put("cat.png", "image/png", b"meow").unwrap();
    let img = image(resolver.resolve("/cat.png").unwrap());
    assert_eq!(img.name, "cat.png");
    assert_eq!(img.via_alias, None);
    assert_eq!(img.mime, "image/png");
    assert_eq!(img.bytes, b"meow");
    assert_eq!(img.cache, CachePolicy::Immutable);
}

#[test]
fn alias_serves_target_without_caching() {
    let (images, aliases, resolver) = setup();
    images.put("v1.gif", "image/gif", b"one").unwrap();
    aliases.create("banner", Some("v1.gif")).unwrap();
    let img = image(resolver.resolve("banner").unwrap());
    assert_eq!(img.name, "v1.gif");
    assert_eq!(img.via_alias.as_deref(), Some("banner"));
    assert_eq!(img.bytes, b"one");
    assert_eq!(img.cache, CachePolicy::NoStore);

    images.put("v2.gif", "image/gif", b"two").unwrap();
    aliases.retarget("banner", Some("v2.gif")).unwrap();
    assert_eq!(image(resolver.resolve("banner").unwrap()).bytes, b"two");
}

#[test]
fn alias_is_checked_before_same_named_image() {
    let (images, aliases, resolver) = setup();
    images.put("promo", "image/png", b"direct").unwrap();
    images.put("promo-target.png", "image/png", b"aliased").unwrap();
    aliases.create("promo", Some("promo-target.png")).unwrap();
    assert_eq!(image(resolver.resolve("promo").unwrap()).bytes, b"aliased");
}

#[test]
fn dangling_alias_falls_through_to_not_found() {
    let (images, aliases, resolver) = setup();
    images.put("a.png", "image/png", b"a").unwrap();
    aliases.create("slug", Some("a.png")).unwrap();
    images.delete("a.png").unwrap();
    assert_eq!(resolver.resolve("slug").unwrap(), Resolution::NotFound);
    assert!(aliases.get("slug").unwrap().is_some());
}

#[test]
fn dangling_alias_falls_through_to_direct_image() {
    let (images, aliases, resolver) = setup();
    aliases.create("slug", Some("gone.png")).unwrap();
    images.put("slug", "image/webp", b"direct").unwrap();
    let img = image(resolver.resolve("slug").unwrap());
    assert_eq!(img.bytes, b"direct");
    assert_eq!(img.cache, CachePolicy::Immutable);
}

#[test]
fn null_alias_falls_through() {
    let (images, aliases, resolver) = setup();
    aliases.create("empty", None).unwrap();
    assert_eq!(resolver.resolve("empty").unwrap(), Resolution::NotFound);
    images.put("empty", "image/png", b"x").unwrap();
    assert_eq!(image(resolver.resolve("empty").unwrap()).via_alias, None);
}

#[test]
fn invalid_names_are_not_found() {
    let (_, _, resolver) = setup();
    for name in ["a/b", "..", ".env", "//double"] {
        assert_eq!(resolver.resolve(name).unwrap(), Resolution::NotFound, "{name}");
    }
}

#[test]
fn cache_control_values() {
    assert!(CachePolicy::NoStore.cache_control().contains("no-store"));
    assert!(CachePolicy::Immutable.cache_control().contains("max-age=31536000"));
}

#[test]
fn route_round_trip() {
    for route in Route::ALL {
        assert_eq!(Route::from_name(route.as_str()), Some(route));
    }
    assert_eq!(Route::from_name("cat.png"), None);
}
