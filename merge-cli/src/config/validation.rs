//! Setting value validation.

use image_merge::{MAX_CANVAS_SIDE, MergeLayout};

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "MERGE_LAYOUT" => {
            value.parse::<MergeLayout>().map_err(|e| e.to_string())?;
        }
        "MERGE_WIDTH" | "MERGE_HEIGHT" => validate_int_range(value, 1, MAX_CANVAS_SIDE)?,
        "MERGE_FETCH_TIMEOUT_SECS" => validate_int_range(value, 1, 600)?,
        "MERGE_OUTPUT_DIR" => {
            if value.trim().is_empty() {
                return Err("must not be empty".into());
            }
        }
        "MERGE_RENDER_FALLBACK" => {
            if value != "true" && value != "false" {
                return Err("must be 'true' or 'false'".into());
            }
        }
        _ => return Err(format!("unknown setting: {key}")),
    }
    Ok(())
}

fn validate_int_range(value: &str, min: u32, max: u32) -> Result<(), String> {
    let v: u32 = value.parse().map_err(|_| "must be a positive integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}
