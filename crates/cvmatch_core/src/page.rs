use serde::Deserialize;
use serde_json::Value;

/// Why a page (or any other collection payload) could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("transport error: {0}")]
    Transport(String),
    /// The server answered 404.
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unexpected response format: {0}")]
    Format(String),
}

/// The two response shapes the list endpoints produce.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Paged<T> {
    Counted { results: Vec<T>, count: u64 },
    Bare(Vec<T>),
}

impl<T> Paged<T>
where
    T: for<'de> Deserialize<'de>,
{
    /// Resolves a raw body into one of the known shapes.
    pub fn decode(raw: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(raw)
    }
}

/// Canonical page contents, replaced wholesale on every fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub total_pages: u32,
}

impl<T> Default for PageResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            total_pages: 0,
        }
    }
}

impl<T> PageResult<T> {
    pub fn from_paged(paged: Paged<T>, page_size: u32) -> Self {
        match paged {
            Paged::Counted { results, count } => Self {
                items: results,
                total_count: count,
                total_pages: total_pages_for(count, page_size),
            },
            Paged::Bare(items) => Self {
                total_count: items.len() as u64,
                items,
                total_pages: 1,
            },
        }
    }
}

/// `ceil(count / page_size)`, saturating at `u32::MAX`.
pub fn total_pages_for(count: u64, page_size: u32) -> u32 {
    let size = u64::from(page_size.max(1));
    u32::try_from(count.div_ceil(size)).unwrap_or(u32::MAX)
}

/// Page count used for navigation, where an empty collection still has page 1.
pub fn navigable_pages(total_pages: u32) -> u32 {
    total_pages.max(1)
}

/// Normalises a lookup body that is either a list or a single record.
///
/// Objects carrying only a `message` (the backend's "nothing found" reply) map to an empty list.
pub fn decode_list_or_single<T>(raw: Value) -> Result<Vec<T>, LoadError>
where
    T: for<'de> Deserialize<'de>,
{
    match raw {
        Value::Array(_) => {
            serde_json::from_value(raw).map_err(|err| LoadError::Format(err.to_string()))
        }
        Value::Object(ref map) if map.len() == 1 && map.contains_key("message") => Ok(Vec::new()),
        Value::Object(_) => serde_json::from_value(raw)
            .map(|single| vec![single])
            .map_err(|err| LoadError::Format(err.to_string())),
        other => Err(LoadError::Format(format!("expected list or object, got {other}"))),
    }
}
