use crate::foundation::error::SnapfadeResult;
use crate::resolve::route::Route;
use crate::store::alias::AliasTable;
use crate::store::content::{ContentStore, validate_name};

/// Caching directive attached to a served image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CachePolicy {
    /// Served through an alias whose target can change at any time.
    NoStore,
    /// Served by its own name; treated as immutable until explicitly overwritten.
    Immutable,
}

impl CachePolicy {
    /// Value for an HTTP `Cache-Control` header.
    pub fn cache_control(self) -> &'static str {
        match self {
            CachePolicy::NoStore => "no-store, no-cache, must-revalidate, max-age=0",
            CachePolicy::Immutable => "public, max-age=31536000, immutable",
        }
    }
}

/// Bytes to serve for a resolved image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedImage {
    /// Name of the stored image actually served.
    pub name: String,
    /// Alias slug the request went through, if any.
    pub via_alias: Option<String>,
    /// Content type.
    pub mime: String,
    /// Payload.
    pub bytes: Vec<u8>,
    /// Caching directive.
    pub cache: CachePolicy,
}

/// Outcome of [`Resolver::resolve`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Not an image lookup; hand the request to this operation.
    Reserved(Route),
    /// Serve these bytes.
    Image(ResolvedImage),
    /// Nothing matched.
    NotFound,
}

/// Resolves request names in fixed precedence: reserved route, alias, direct image, not found.
///
/// An alias with no target, or whose target is gone, falls through to the direct lookup so it
/// never shadows an image stored under the same name.
#[derive(Clone, Debug)]
pub struct Resolver {
    images: ContentStore,
    aliases: AliasTable,
}

impl Resolver {
    /// Resolver over shared stores.
    pub fn new(images: ContentStore, aliases: AliasTable) -> Self {
        Self { images, aliases }
    }

    /// Resolve a request name. A single leading `/` is ignored.
    ///
    /// Only storage failures are errors; every kind of miss is [`Resolution::NotFound`].
    #[tracing::instrument(skip(self))]
    pub fn resolve(&self, name: &str) -> SnapfadeResult<Resolution> {
        let name = name.strip_prefix('/').unwrap_or(name);

        if let Some(route) = Route::from_name(name) {
            return Ok(Resolution::Reserved(route));
        }
        if validate_name(name).is_err() {
            return Ok(Resolution::NotFound);
        }

        if let Some(alias) = self.aliases.get(name)? {
            match alias.target.as_deref() {
                Some(target) if validate_name(target).is_ok() => {
                    if let Some(img) = self.images.try_get(target)? {
                        return Ok(Resolution::Image(ResolvedImage {
                            name: target.to_string(),
                            via_alias: Some(alias.slug),
                            mime: img.mime,
                            bytes: img.bytes,
                            cache: CachePolicy::NoStore,
                        }));
                    }
                    tracing::debug!(
                        alias_target = target,
                        "alias target is missing, falling through"
                    );
                }
                _ => tracing::debug!("alias has no usable target, falling through"),
            }
        }

        if let Some(img) = self.images.try_get(name)? {
            return Ok(Resolution::Image(ResolvedImage {
                name: name.to_string(),
                via_alias: None,
                mime: img.mime,
                bytes: img.bytes,
                cache: CachePolicy::Immutable,
            }));
        }

        Ok(Resolution::NotFound)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/resolver.rs"]
mod tests;
