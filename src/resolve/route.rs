/// Operation keywords that are never looked up as images or aliases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// `/` landing page.
    Index,
    /// Image upload form and handler.
    Upload,
    /// Resize / convert an existing image.
    Edit,
    /// Delete an existing image.
    Delete,
    /// Make one color of an image transparent.
    Transparent,
    /// Single-play vanishing GIF creation.
    Gif,
    /// Layer editor and scene save.
    Editor,
    /// Alias (static link) management.
    Links,
}

impl Route {
    /// Every reserved route.
    pub const ALL: [Route; 8] = [
        Route::Index,
        Route::Upload,
        Route::Edit,
        Route::Delete,
        Route::Transparent,
        Route::Gif,
        Route::Editor,
        Route::Links,
    ];

    /// Path segment this route answers to.
    pub fn as_str(self) -> &'static str {
        match self {
            Route::Index => "",
            Route::Upload => "upload",
            Route::Edit => "edit",
            Route::Delete => "delete",
            Route::Transparent => "transparent",
            Route::Gif => "gif",
            Route::Editor => "editor",
            Route::Links => "links",
        }
    }

    /// Exact, case-sensitive match of `name` against the reserved set.
    pub fn from_name(name: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|r| r.as_str() == name)
    }
}
