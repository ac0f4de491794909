use serde::Deserialize;

use crate::models::{Genre, Movie, MovieDetail, Page};

// Wire shapes as the catalog serves them; mapped into crate models before
// anything else sees them. Fields the server may omit or null are Options
// here even when the model has a concrete type.

#[derive(Debug, Clone, Deserialize)]
pub struct PageResponse {
    pub page: u32,
    #[serde(default)]
    pub results: Vec<MovieResponse>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovieResponse {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    pub overview: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenreResponse {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovieDetailResponse {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f32>,
    pub overview: Option<String>,
    pub runtime: Option<u32>,
    pub tagline: Option<String>,
    #[serde(default)]
    pub genres: Vec<GenreResponse>,
}

impl From<MovieResponse> for Movie {
    fn from(value: MovieResponse) -> Self {
        Movie {
            id: value.id,
            title: value.title,
            poster_path: value.poster_path,
            backdrop_path: value.backdrop_path,
            release_date: value.release_date.unwrap_or_default(),
            vote_average: value.vote_average.unwrap_or(0.0),
            genre_ids: value.genre_ids,
            overview: value.overview,
        }
    }
}

impl From<PageResponse> for Page {
    fn from(value: PageResponse) -> Self {
        Page {
            page: value.page,
            items: value.results.into_iter().map(Movie::from).collect(),
            total_pages: value.total_pages,
            total_results: value.total_results,
        }
    }
}

impl From<MovieDetailResponse> for MovieDetail {
    fn from(value: MovieDetailResponse) -> Self {
        MovieDetail {
            id: value.id,
            title: value.title,
            poster_path: value.poster_path,
            backdrop_path: value.backdrop_path,
            release_date: value.release_date.unwrap_or_default(),
            vote_average: value.vote_average.unwrap_or(0.0),
            overview: value.overview,
            runtime: value.runtime,
            tagline: value.tagline,
            genres: value
                .genres
                .into_iter()
                .map(|g| Genre {
                    id: g.id,
                    name: g.name,
                })
                .collect(),
        }
    }
}
