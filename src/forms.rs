//! Parsing of `application/x-www-form-urlencoded` submissions.
//!
//! axum's `Form` extractor cannot collect repeated keys into a list, so the
//! raw body is decoded here with `url::form_urlencoded` instead.

use crate::errors::AppError;
use crate::models::NewLead;
use crate::sizing::{parse_monthly_bill, SizingInput, SizingResult};

/// Project type recorded on leads created from the sizing calculator.
pub const SOLAR_REPORT_PROJECT_TYPE: &str = "Solar Report Request";

/// Decoded form body, keeping every key/value pair in submission order.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    pairs: Vec<(String, String)>,
}

impl FormFields {
    pub fn parse(body: &[u8]) -> Self {
        Self {
            pairs: url::form_urlencoded::parse(body).into_owned().collect(),
        }
    }

    /// First value for `key`, or an empty string.
    pub fn get(&self, key: &str) -> &str {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    /// First non-blank value for `key`.
    pub fn get_optional(&self, key: &str) -> Option<String> {
        let value = self.get(key).trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    /// Every value submitted under `key` or `key[]`, in order.
    ///
    /// Empty values are skipped; everything else is kept verbatim, duplicates included.
    pub fn get_all(&self, key: &str) -> Vec<String> {
        let bracketed = format!("{}[]", key);
        self.pairs
            .iter()
            .filter(|(k, v)| (k == key || *k == bracketed) && !v.is_empty())
            .map(|(_, v)| v.clone())
            .collect()
    }
}

/// Builds a quote-request lead from the quote form.
pub fn quote_lead(fields: &FormFields) -> Result<NewLead, AppError> {
    NewLead {
        full_name: fields.get("full_name").to_string(),
        phone: fields.get("phone").to_string(),
        email: fields.get("email").to_string(),
        project_type: fields.get("project_type").to_string(),
        location: fields.get_optional("location"),
        message: fields.get_optional("message"),
    }
    .validated()
}

/// Extracts calculator input. Never fails: a bad bill becomes zero.
pub fn sizing_input(fields: &FormFields) -> SizingInput {
    SizingInput {
        monthly_bill: parse_monthly_bill(fields.get("monthly_bill")),
        appliances: fields.get_all("appliances"),
    }
}

/// Builds a report-request lead whose message is the sizing summary.
pub fn solar_report_lead(fields: &FormFields, sizing: &SizingResult) -> Result<NewLead, AppError> {
    NewLead {
        full_name: fields.get("full_name").to_string(),
        phone: fields.get("phone").to_string(),
        email: fields.get("email").to_string(),
        project_type: SOLAR_REPORT_PROJECT_TYPE.to_string(),
        location: fields.get_optional("location"),
        message: Some(sizing.summary()),
    }
    .validated()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::calculate;

    #[test]
    fn repeated_and_bracketed_keys_keep_order() {
        let fields = FormFields::parse(
            b"appliances=Fan&appliances%5B%5D=Water+Pump&appliances=Fan&appliances=",
        );

        assert_eq!(fields.get_all("appliances"), vec!["Fan", "Water Pump", "Fan"]);
    }

    #[test]
    fn missing_values_read_as_empty() {
        let fields = FormFields::parse(b"full_name=Ravi");

        assert_eq!(fields.get("phone"), "");
        assert_eq!(fields.get_optional("location"), None);
        assert!(fields.get_all("appliances").is_empty());
    }

    #[test]
    fn unparseable_bill_defaults_to_zero() {
        let input = sizing_input(&FormFields::parse(b"monthly_bill=lots"));
        assert_eq!(input.monthly_bill, 0.0);
    }

    #[test]
    fn quote_lead_requires_project_type() {
        let fields = FormFields::parse(b"full_name=Ravi&phone=98765&email=r%40x.in");
        let err = quote_lead(&fields).unwrap_err();
        assert!(err.to_string().contains("project_type"));
    }

    #[test]
    fn solar_report_lead_uses_sentinel_and_summary() {
        let fields = FormFields::parse(
            b"full_name=Ravi&phone=98765&email=r%40x.in&monthly_bill=5000&appliances=AC&appliances=TV",
        );
        let sizing = calculate(&sizing_input(&fields));
        let lead = solar_report_lead(&fields, &sizing).unwrap();

        assert_eq!(lead.project_type, SOLAR_REPORT_PROJECT_TYPE);
        let message = lead.message.unwrap();
        assert!(message.contains("1.5 kW"));
        assert!(message.ends_with("Appliances: AC, TV"));
    }
}
