use std::str::FromStr;

use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::{Map, Value};

/// Client-supplied column name → value mapping, accepted without schema enforcement.
pub type FieldMap = Map<String, Value>;

/// The eight movie columns as read from a [`FieldMap`]; absent keys read as `None`.
/// Numeric columns also take their value as a string (`"year": "2021"`).
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct MovieFields {
    #[serde(default, deserialize_with = "numeric")]
    pub id: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub trailer: Option<String>,
    #[serde(default, deserialize_with = "numeric")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "numeric")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "numeric")]
    pub genre_id: Option<i32>,
    #[serde(default, deserialize_with = "numeric")]
    pub director_id: Option<i32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
}

/// Blank strings read as null; other strings must parse as the column's number type.
fn numeric<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
{
    match Option::<NumberOrText<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(text)) => match text.trim() {
            "" => Ok(None),
            trimmed => trimmed
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("`{text}` is not a number"))),
        },
    }
}

impl MovieFields {
    pub fn from_map(fields: FieldMap) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(fields))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MovieFilter {
    Director(i32),
    Genre(i32),
    Year(i32),
}

#[derive(Debug, Default, Deserialize)]
pub struct MovieQuery {
    pub director_id: Option<String>,
    pub genre_id: Option<String>,
    pub year: Option<String>,
}

impl MovieQuery {
    /// Picks the single filter to apply: director, then genre, then year.
    /// Empty values count as absent. `Some(Err(raw))` carries a value that
    /// cannot match an integer column.
    pub fn filter(&self) -> Option<Result<MovieFilter, String>> {
        let (raw, make): (&str, fn(i32) -> MovieFilter) =
            if let Some(raw) = present(&self.director_id) {
                (raw, MovieFilter::Director)
            } else if let Some(raw) = present(&self.genre_id) {
                (raw, MovieFilter::Genre)
            } else if let Some(raw) = present(&self.year) {
                (raw, MovieFilter::Year)
            } else {
                return None;
            };

        Some(raw.parse().map(make).map_err(|_| raw.to_string()))
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn query(director_id: Option<&str>, genre_id: Option<&str>, year: Option<&str>) -> MovieQuery {
        MovieQuery {
            director_id: director_id.map(String::from),
            genre_id: genre_id.map(String::from),
            year: year.map(String::from),
        }
    }

    #[test]
    fn no_parameters_means_no_filter() {
        assert_eq!(query(None, None, None).filter(), None);
    }

    #[test]
    fn director_wins_over_genre_and_year() {
        let q = query(Some("2"), Some("1"), Some("2021"));
        assert_eq!(q.filter(), Some(Ok(MovieFilter::Director(2))));
    }

    #[test]
    fn genre_wins_over_year() {
        let q = query(None, Some("1"), Some("2021"));
        assert_eq!(q.filter(), Some(Ok(MovieFilter::Genre(1))));
    }

    #[test]
    fn empty_value_falls_through_to_next_parameter() {
        let q = query(Some(""), None, Some("2021"));
        assert_eq!(q.filter(), Some(Ok(MovieFilter::Year(2021))));
    }

    #[test]
    fn non_integer_value_is_reported_raw() {
        let q = query(None, Some("drama"), Some("2021"));
        assert_eq!(q.filter(), Some(Err("drama".to_string())));
    }

    #[test]
    fn field_map_absent_keys_read_as_none() {
        let map = json!({"title": "Dune", "year": 2021, "rating": 8})
            .as_object()
            .cloned()
            .unwrap();
        let fields = MovieFields::from_map(map).unwrap();
        assert_eq!(fields.title.as_deref(), Some("Dune"));
        assert_eq!(fields.year, Some(2021));
        assert_eq!(fields.rating, Some(8.0));
        assert_eq!(fields.description, None);
        assert_eq!(fields.id, None);
    }

    #[test]
    fn field_map_numeric_strings_are_coerced() {
        let map = json!({"year": "2021", "rating": " 7.5 ", "genre_id": "3", "director_id": ""})
            .as_object()
            .cloned()
            .unwrap();
        let fields = MovieFields::from_map(map).unwrap();
        assert_eq!(fields.year, Some(2021));
        assert_eq!(fields.rating, Some(7.5));
        assert_eq!(fields.genre_id, Some(3));
        assert_eq!(fields.director_id, None);
    }

    #[test]
    fn field_map_explicit_null_reads_as_none() {
        let map = json!({"year": null, "rating": null}).as_object().cloned().unwrap();
        let fields = MovieFields::from_map(map).unwrap();
        assert_eq!(fields.year, None);
        assert_eq!(fields.rating, None);
    }

    #[test]
    fn field_map_with_wrong_type_is_rejected() {
        let map = json!({"year": "twenty"}).as_object().cloned().unwrap();
        assert!(MovieFields::from_map(map).is_err());
    }
}
