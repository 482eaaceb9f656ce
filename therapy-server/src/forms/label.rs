use serde::{Deserialize, Serialize};

use super::{collect, FieldErrors};
use crate::models::{LabelName, NewLabel, ValidationError};

/// Raw label submission. `stubs` is a comma separated list of stub ids.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelFormInput {
    #[serde(rename = "shortName")]
    pub short_name: Option<String>,
    #[serde(rename = "reportName")]
    pub report_name: Option<String>,
    pub stubs: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LabelForm {
    #[serde(rename = "shortName")]
    pub short_name: String,
    #[serde(rename = "reportName")]
    pub report_name: String,
    pub stubs: String,
    pub errors: FieldErrors,
}

impl LabelFormInput {
    pub fn bind(&self) -> Result<NewLabel, LabelForm> {
        let mut errors = FieldErrors::new();
        let short = collect(&mut errors, LabelName::short(self.short_name.as_deref().unwrap_or_default()));
        let report = collect(&mut errors, LabelName::report(self.report_name.as_deref().unwrap_or_default()));
        let stub_ids = collect(&mut errors, parse_stub_ids(self.stubs.as_deref().unwrap_or_default()));

        match (short, report, stub_ids) {
            (Some(short_name), Some(report_name), Some(stub_ids)) => {
                Ok(NewLabel::from_names(short_name, report_name, stub_ids))
            }
            _ => Err(LabelForm {
                short_name: self.short_name.clone().unwrap_or_default(),
                report_name: self.report_name.clone().unwrap_or_default(),
                stubs: self.stubs.clone().unwrap_or_default(),
                errors,
            }),
        }
    }
}

/// "3, 1,7" -> [3, 1, 7]. Blank entries are skipped.
pub fn parse_stub_ids(raw: &str) -> Result<Vec<i64>, ValidationError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match part.parse::<i64>() {
            Ok(id) if id > 0 => Ok(id),
            _ => Err(ValidationError::InvalidFormat {
                field: "stubs",
                reason: "expected comma separated stub ids",
            }),
        })
        .collect()
}
