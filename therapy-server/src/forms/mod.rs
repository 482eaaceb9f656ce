//! Form binding
//!
//! Urlencoded submissions are deserialized into `*Input` structs, then bound
//! into validated models. Binding never stops at the first bad field: a
//! failure returns the form state with every field's message so the view
//! can be rendered again.

pub mod label;
pub mod stub;

use std::collections::BTreeMap;

use crate::models::ValidationError;

pub use label::{LabelForm, LabelFormInput};
pub use stub::{StubForm, StubFormInput, StubFormValues, SubmitAction};

/// Field name -> message
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Record a failed validation and keep going.
pub(crate) fn collect<T>(errors: &mut FieldErrors, result: Result<T, ValidationError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            errors.insert(err.field(), err.to_string());
            None
        }
    }
}
