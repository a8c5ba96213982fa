use serde::{Deserialize, Serialize};

/// Body of `PUT` and `DELETE` requests, and of a successful `GET` response.
///
/// For `DELETE` the value is the one the caller expects to be stored.
#[derive(Serialize, Deserialize, Debug, Clone, Default, Ord, PartialOrd, Eq, PartialEq)]
pub(super) struct RecordValue {
    pub value: String,
}
