//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod label;
pub mod locale;
pub mod pagination;
pub mod stub;
pub mod validation;

pub use label::{Label, LabelName, LabelWithStubs, NewLabel};
pub use locale::{Locale, SupportedLocales};
pub use pagination::{Paginated, Pagination, PaginationParams, STUBS_PER_PAGE};
pub use stub::{Stub, StubChanges, StubData, StubName};
pub use validation::{validate_search_term, ValidationError, MAX_SEARCH_LEN};
