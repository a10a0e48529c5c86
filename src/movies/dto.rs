use serde::{Deserialize, Serialize};

/// Catalog movie record as served by TMDB-style listings. Listing payloads
/// occasionally omit fields, so everything non-identifying defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: i64,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    #[serde(default)]
    pub adult: bool,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub video: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub character: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrewMember {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub id: String,
    pub key: String,
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct VideoList {
    #[serde(default)]
    pub results: Vec<Video>,
}

/// Detail payload for a single movie; the base record plus the sections the
/// proxy appends upstream (credits, videos, similar, recommendations).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(default)]
    pub runtime: Option<i64>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub credits: Option<Credits>,
    #[serde(default)]
    pub videos: Option<VideoList>,
    #[serde(default)]
    pub similar: Option<MoviePage>,
    #[serde(default)]
    pub recommendations: Option<MoviePage>,
}

/// One page of catalog results, 1-based.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoviePage {
    pub page: u32,
    pub results: Vec<Movie>,
    pub total_pages: u32,
    pub total_results: u64,
}

impl MoviePage {
    /// Shape returned when the catalog is unreachable: downstream consumers
    /// never have to special-case "catalog down".
    pub fn empty() -> Self {
        Self {
            page: 1,
            results: Vec::new(),
            total_pages: 0,
            total_results: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MoviesQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    pub category: Option<String>,
    pub query: Option<String>,
    pub genre: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_tolerates_sparse_listing_payloads() {
        let m: Movie = serde_json::from_str(r#"{"id": 101, "title": "Arrival"}"#).unwrap();
        assert_eq!(m.id, 101);
        assert!(m.genre_ids.is_empty());
        assert!(m.poster_path.is_none());
    }

    #[test]
    fn details_flatten_base_movie_fields() {
        let d: MovieDetails = serde_json::from_str(
            r#"{"id": 7, "title": "Seven", "runtime": 127, "genres": [{"id": 80, "name": "Crime"}]}"#,
        )
        .unwrap();
        assert_eq!(d.movie.id, 7);
        assert_eq!(d.runtime, Some(127));
        assert_eq!(d.genres[0].name, "Crime");
    }

    #[test]
    fn empty_page_has_zero_totals() {
        let page = MoviePage::empty();
        assert_eq!(page.page, 1);
        assert!(page.results.is_empty());
        assert_eq!(page.total_results, 0);
    }
}
