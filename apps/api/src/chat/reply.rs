use crate::models::salary::SalaryRecord;

pub const NO_RELEVANT_DATA_REPLY: &str = "I couldn't find relevant data based on your query.";

/// Renders the chat reply for the best-matching record.
pub fn format_reply(record: Option<&SalaryRecord>) -> String {
    let Some(record) = record else {
        return NO_RELEVANT_DATA_REPLY.to_string();
    };

    format!(
        "Based on your query, here's some relevant data:\n\
         Job Title: {}\n\
         Experience Level: {}\n\
         Employment Type: {}\n\
         Company Location: {}\n\
         Salary in USD: {}",
        record.job_title,
        record.experience_level,
        record.employment_type,
        record.company_location,
        record.salary_in_usd
    )
}
