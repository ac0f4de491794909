use serde::{Deserialize, Serialize};

/// A single movie as returned by the remote catalog.
///
/// Immutable once fetched: refetching replaces the value wholesale, nothing
/// mutates a `Movie` in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    /// Release date as reported by the catalog ("YYYY-MM-DD"); an empty
    /// string means unknown.
    pub release_date: String,
    /// Raw community rating in [0, 10]. A value of 0 means "not rated yet",
    /// not an actual zero score; use [`Movie::rating`] for the cooked view.
    pub vote_average: f32,
    pub genre_ids: Vec<u64>,
    pub overview: Option<String>,
}

impl Movie {
    /// Community rating, with the catalog's "0 means unrated" convention
    /// mapped to `None`.
    pub fn rating(&self) -> Option<f32> {
        if self.vote_average == 0.0 {
            None
        } else {
            Some(self.vote_average)
        }
    }

    /// Year extracted from the leading digits of the release date.
    pub fn release_year(&self) -> Option<i32> {
        release_year(&self.release_date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Full per-title record backing the detail overlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: u64,
    pub title: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: String,
    pub vote_average: f32,
    pub overview: Option<String>,
    pub runtime: Option<u32>,
    pub tagline: Option<String>,
    pub genres: Vec<Genre>,
}

impl MovieDetail {
    pub fn rating(&self) -> Option<f32> {
        if self.vote_average == 0.0 {
            None
        } else {
            Some(self.vote_average)
        }
    }

    pub fn release_year(&self) -> Option<i32> {
        release_year(&self.release_date)
    }
}

fn release_year(date: &str) -> Option<i32> {
    if date.len() >= 4 {
        date[..4].parse().ok()
    } else {
        None
    }
}

/// One page of catalog results plus pagination metadata.
///
/// `page` is 1-indexed and never exceeds `total_pages` for a page that was
/// actually served; callers must not request pages beyond `total_pages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub page: u32,
    pub items: Vec<Movie>,
    pub total_pages: u32,
    pub total_results: u32,
}

impl Page {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// A selectable listing. Remote categories map to curated server-side
/// collections; `Favorites` is backed entirely by local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    NowPlaying,
    Popular,
    TopRated,
    Upcoming,
    Favorites,
}

impl Category {
    /// Endpoint path for remote categories; `None` for the local one.
    pub fn remote_path(&self) -> Option<&'static str> {
        match self {
            Category::NowPlaying => Some("movie/now_playing"),
            Category::Popular => Some("movie/popular"),
            Category::TopRated => Some("movie/top_rated"),
            Category::Upcoming => Some("movie/upcoming"),
            Category::Favorites => None,
        }
    }

    pub fn is_remote(&self) -> bool {
        self.remote_path().is_some()
    }

    pub fn all() -> [Category; 5] {
        [
            Category::NowPlaying,
            Category::Popular,
            Category::TopRated,
            Category::Upcoming,
            Category::Favorites,
        ]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::NowPlaying => write!(f, "Now Playing"),
            Category::Popular => write!(f, "Popular"),
            Category::TopRated => write!(f, "Top Rated"),
            Category::Upcoming => write!(f, "Upcoming"),
            Category::Favorites => write!(f, "Favorites"),
        }
    }
}

/// Named width buckets for derived image URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    Poster,
    Backdrop,
    Thumbnail,
}

impl ImageSize {
    fn width_segment(&self) -> &'static str {
        match self {
            ImageSize::Poster => "w342",
            ImageSize::Backdrop => "w780",
            ImageSize::Thumbnail => "w154",
        }
    }
}

/// Build a full image URL from a catalog image path and a size bucket.
///
/// A missing path yields no URL; the presentation layer shows a placeholder
/// instead of issuing a request.
pub fn image_url(base_url: &str, path: Option<&str>, size: ImageSize) -> Option<String> {
    path.map(|p| {
        format!(
            "{}/{}{}",
            base_url.trim_end_matches('/'),
            size.width_segment(),
            p
        )
    })
}
