use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One row of the salary dataset. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRecord {
    pub work_year: i32,
    pub job_title: String,
    pub experience_level: String,
    pub employment_type: String,
    pub company_location: String,
    pub salary_in_usd: f64,
}

#[derive(Debug, Error)]
pub enum MalformedRecord {
    #[error("record does not match the salary schema: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("salary_in_usd must be a finite non-negative number, got {0}")]
    InvalidSalary(f64),

    #[error("job_title is empty")]
    EmptyJobTitle,
}

impl SalaryRecord {
    /// Decodes and validates a single raw JSON object from the dataset file.
    pub fn from_value(value: serde_json::Value) -> Result<Self, MalformedRecord> {
        let record: SalaryRecord = serde_json::from_value(value)?;

        if !record.salary_in_usd.is_finite() || record.salary_in_usd < 0.0 {
            return Err(MalformedRecord::InvalidSalary(record.salary_in_usd));
        }
        if record.job_title.trim().is_empty() {
            return Err(MalformedRecord::EmptyJobTitle);
        }

        Ok(record)
    }

    /// The text embedded when this record is a similarity candidate.
    /// Field order is fixed: title, experience, employment type, location.
    pub fn descriptive_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.job_title, self.experience_level, self.employment_type, self.company_location
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_record() -> serde_json::Value {
        json!({
            "work_year": 2023,
            "experience_level": "SE",
            "employment_type": "FT",
            "job_title": "Data Scientist",
            "salary": 150000,
            "salary_currency": "USD",
            "salary_in_usd": 150000,
            "employee_residence": "US",
            "remote_ratio": 100,
            "company_location": "US",
            "company_size": "M"
        })
    }

    #[test]
    fn test_decodes_full_source_row() {
        let record = SalaryRecord::from_value(raw_record()).unwrap();
        assert_eq!(record.work_year, 2023);
        assert_eq!(record.job_title, "Data Scientist");
        assert_eq!(record.salary_in_usd, 150000.0);
    }

    #[test]
    fn test_missing_salary_is_malformed() {
        let mut raw = raw_record();
        raw.as_object_mut().unwrap().remove("salary_in_usd");
        assert!(matches!(
            SalaryRecord::from_value(raw),
            Err(MalformedRecord::Schema(_))
        ));
    }

    #[test]
    fn test_string_year_is_malformed() {
        let mut raw = raw_record();
        raw["work_year"] = json!("2023");
        assert!(SalaryRecord::from_value(raw).is_err());
    }

    #[test]
    fn test_negative_salary_is_malformed() {
        let mut raw = raw_record();
        raw["salary_in_usd"] = json!(-1);
        assert!(matches!(
            SalaryRecord::from_value(raw),
            Err(MalformedRecord::InvalidSalary(_))
        ));
    }

    #[test]
    fn test_blank_title_is_malformed() {
        let mut raw = raw_record();
        raw["job_title"] = json!("   ");
        assert!(matches!(
            SalaryRecord::from_value(raw),
            Err(MalformedRecord::EmptyJobTitle)
        ));
    }

    #[test]
    fn test_descriptive_text_field_order() {
        let record = SalaryRecord::from_value(raw_record()).unwrap();
        assert_eq!(record.descriptive_text(), "Data Scientist SE FT US");
    }
}
