use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    /// Regex for trailing commas before } or ]
    static ref TRAILING_COMMA_RE: Regex = Regex::new(r",(\s*[}\]])").unwrap();
}

/// Extract a JSON object string from model output text
///
/// Tries in order:
/// 1. JSON in markdown code block: ```json ... ```
/// 2. Generic markdown code block: ``` ... ```
/// 3. Plain JSON starting with {
/// 4. JSON embedded anywhere in text (first { to last })
pub fn extract_json_string(text: &str) -> Result<String, String> {
    if let Some(after) = text.split("```json").nth(1) {
        return after
            .split("```")
            .next()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| "Failed to extract JSON from markdown code block".to_string());
    }

    if let Some(start) = text.find("```") {
        let block_start = start + 3;
        // Skip optional language identifier on the same line
        if let Some(newline_offset) = text[block_start..].find('\n') {
            let json_start = block_start + newline_offset + 1;
            if let Some(end_offset) = text[json_start..].find("```") {
                return Ok(text[json_start..json_start + end_offset].trim().to_string());
            }
        }
    }

    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        return Ok(trimmed.to_string());
    }

    let start = text
        .find('{')
        .ok_or_else(|| "No JSON object found in text".to_string())?;
    let end = text
        .rfind('}')
        .ok_or_else(|| "Incomplete JSON object in text".to_string())?;

    if start < end {
        Ok(text[start..=end].to_string())
    } else {
        Err("Invalid JSON boundaries in text".to_string())
    }
}

/// Fix trailing commas in JSON (common model mistake)
///
/// Example: `{"crack_type": "pothole",}` -> `{"crack_type": "pothole"}`
pub fn fix_trailing_commas(json_str: &str) -> String {
    TRAILING_COMMA_RE.replace_all(json_str, "$1").to_string()
}

fn repair_json(json_str: &str) -> Option<String> {
    let options = llm_json::RepairOptions::default();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        llm_json::repair_json(json_str, &options)
    }));

    match result {
        Ok(Ok(repaired)) => Some(repaired),
        Ok(Err(e)) => {
            tracing::debug!("JSON repair failed: {:?}", e);
            None
        }
        Err(_) => {
            tracing::warn!("JSON repair panicked");
            None
        }
    }
}

/// Parse a JSON object out of free-form model text
///
/// Parsing pipeline:
/// 1. Extract JSON string (markdown/plain/embedded)
/// 2. Direct parse
/// 3. Parse after removing trailing commas
/// 4. Parse after llm_json repair
pub fn parse_json_lenient(text: &str) -> Result<Value, String> {
    let json_str = extract_json_string(text)?;

    if let Ok(value) = serde_json::from_str::<Value>(&json_str) {
        return Ok(value);
    }

    let fixed = fix_trailing_commas(&json_str);
    if let Ok(value) = serde_json::from_str::<Value>(&fixed) {
        tracing::debug!("JSON parsed after removing trailing commas");
        return Ok(value);
    }

    if let Some(repaired) = repair_json(&json_str) {
        if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
            tracing::debug!("JSON parsed after llm_json repair");
            return Ok(value);
        }
    }

    Err(format!(
        "Failed to parse JSON. Original: {}",
        json_str.chars().take(200).collect::<String>()
    ))
}
