use mealseek_client::ClientError;
use thiserror::Error;

const GENERIC_SEARCH_FAILURE: &str = "failed to fetch search results";
const GENERIC_DETAIL_FAILURE: &str = "failed to fetch shop details";

/// What went wrong, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// The URL carried nothing to search on. Never retried automatically.
    #[error("no search criteria were given")]
    Validation,

    /// A search or detail request failed in transit or returned garbage.
    #[error("{message}")]
    Network { message: String },

    /// The detail lookup found no such shop.
    #[error("shop not found: {shop_id}")]
    NotFound { shop_id: String },
}

impl ErrorKind {
    pub(crate) fn from_search(err: &ClientError) -> Self {
        Self::from_client(err, GENERIC_SEARCH_FAILURE)
    }

    pub(crate) fn from_detail(err: &ClientError) -> Self {
        Self::from_client(err, GENERIC_DETAIL_FAILURE)
    }

    /// Prefers the backend's own message; contract violations keep their
    /// descriptive text; anything else becomes `generic`.
    fn from_client(err: &ClientError, generic: &str) -> Self {
        let message = match err {
            ClientError::NotFound { shop_id } => {
                return ErrorKind::NotFound {
                    shop_id: shop_id.clone(),
                }
            }
            ClientError::MissingShops { .. } => err.to_string(),
            _ => err.backend_message().unwrap_or(generic).to_owned(),
        };
        ErrorKind::Network { message }
    }
}

/// Why a page-change request was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageChangeError {
    #[error("no search is active")]
    NoActiveSearch,

    #[error("page {requested} is outside 1..={total_pages}")]
    OutOfRange { requested: u32, total_pages: u32 },

    #[error("already on page {0}")]
    AlreadyOnPage(u32),

    #[error("session has shut down")]
    SessionClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_wins_over_generic() {
        let err = ClientError::Api {
            status: 500,
            url: "http://x/hp/search".to_owned(),
            message: Some("upstream down".to_owned()),
        };
        assert_eq!(
            ErrorKind::from_search(&err),
            ErrorKind::Network {
                message: "upstream down".to_owned()
            }
        );
    }

    #[test]
    fn missing_message_falls_back_to_generic() {
        let err = ClientError::Api {
            status: 502,
            url: "http://x/hp/search".to_owned(),
            message: None,
        };
        assert_eq!(
            ErrorKind::from_search(&err),
            ErrorKind::Network {
                message: GENERIC_SEARCH_FAILURE.to_owned()
            }
        );
        assert_eq!(
            ErrorKind::from_detail(&err),
            ErrorKind::Network {
                message: GENERIC_DETAIL_FAILURE.to_owned()
            }
        );
    }

    #[test]
    fn missing_shops_keeps_descriptive_message() {
        let err = ClientError::MissingShops {
            url: "http://x/hp/search".to_owned(),
        };
        let ErrorKind::Network { message } = ErrorKind::from_search(&err) else {
            panic!("expected network error");
        };
        assert!(message.contains("shops"), "got: {message}");
    }

    #[test]
    fn not_found_maps_to_its_own_kind() {
        let err = ClientError::NotFound {
            shop_id: "J404".to_owned(),
        };
        assert_eq!(
            ErrorKind::from_detail(&err),
            ErrorKind::NotFound {
                shop_id: "J404".to_owned()
            }
        );
    }
}
