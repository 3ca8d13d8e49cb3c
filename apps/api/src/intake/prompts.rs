use serde_json::{Map, Value};

/// Rubric prompt for the model-backed lead scorer.
/// `{lead_data}` is replaced with one `- Label: value` line per field.
pub const LEAD_SCORING_PROMPT: &str = "\
You are an AI lead-scoring assistant for an urban relocation platform.
Evaluate leads based on the given weighted criteria and assign a lead score (0-100).

### Lead Data:
{lead_data}

### Scoring Rubric:
1. High Impact (50%)
   - Monthly budget, CTC, company size, and website visits: higher is better.
   - Preferred job titles and industry: higher score.

2. Medium Impact (30%)
   - Shorter relocation distance and earlier relocation date: higher score.

3. Low Impact (20%)
   - Food preference, transport type and accommodation type contribute slightly.

Task:
- Calculate a lead score (0-100) based on the rubric.
- Respond in valid JSON format:
  {\"lead_score\": SCORE}";

/// (form key, prompt label, placeholder when absent)
const LEAD_FIELDS: &[(&str, &str, &str)] = &[
    ("full_name", "Full Name", "N/A"),
    ("email", "Email", "N/A"),
    ("phone", "Phone", "N/A"),
    ("job_title", "Job Title", "N/A"),
    ("company_name", "Company Name", "N/A"),
    ("company_size", "Company Size", "N/A"),
    ("industry", "Industry", "N/A"),
    ("website_pages_visited", "Website Pages Visited", "0"),
    ("ctc", "CTC in Lacs", "0"),
    ("current_location", "Current Location", "N/A"),
    ("monthly_budget", "Monthly Budget for Accommodation", "0"),
    ("food_preference", "Food Preference", "N/A"),
    ("relocation", "Relocation City", "N/A"),
    ("distance", "Distance (KM) from Current to Relocation", "0"),
    ("date_of_relocation", "Date of Relocation", "N/A"),
    ("duration_of_stay", "Duration of Stay (Days)", "0"),
    ("transport_type", "Transport Type", "N/A"),
    ("accommodation_type", "Accommodation Type", "N/A"),
];

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn render_lead_prompt(lead: &Map<String, Value>) -> String {
    let lead_data = LEAD_FIELDS
        .iter()
        .map(|(key, label, placeholder)| {
            let value = lead
                .get(*key)
                .filter(|v| !v.is_null())
                .map(display)
                .unwrap_or_else(|| placeholder.to_string());
            format!("- {label}: {value}")
        })
        .collect::<Vec<_>>()
        .join("\n");
    LEAD_SCORING_PROMPT.replace("{lead_data}", &lead_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_fills_values_and_placeholders() {
        let lead = json!({
            "full_name": "Asha Rao",
            "company_size": 800,
            "monthly_budget": null
        });
        let prompt = render_lead_prompt(lead.as_object().unwrap());
        assert!(prompt.contains("- Full Name: Asha Rao"));
        assert!(prompt.contains("- Company Size: 800"));
        assert!(prompt.contains("- Monthly Budget for Accommodation: 0"));
        assert!(prompt.contains("- Industry: N/A"));
        assert!(!prompt.contains("{lead_data}"));
        assert!(prompt.contains("{\"lead_score\": SCORE}"));
    }
}
