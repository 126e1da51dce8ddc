//! Human-readable error descriptions and structured JSON error formatting.

use feeder_core::FinishReason;

use crate::feed::FeedIncomplete;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use feeder_core::error::{BuildError, FeederError};

    // Typed matches first
    if let Some(fi) = err.downcast_ref::<FeedIncomplete>() {
        let e = &fi.entry;
        return match e.reason {
            FinishReason::Stuck => format!(
                "What happened: Feed stuck at {:.1} g of {:.1} g; the bowl gained nothing for {} ms.\nLikely causes: Jam in the chute or an empty hopper.\nHow to fix: Clear the gate and refill the hopper; raise feeding.stuck_ms if the food flows slowly.",
                e.final_g, e.target_g, fi.limit_ms
            ),
            FinishReason::Timeout => format!(
                "What happened: Feed timed out at {:.1} g of {:.1} g after {} ms.\nLikely causes: Food trickling too slowly or a large request.\nHow to fix: Check the gate opens fully; raise feeding.max_run_ms or request less.",
                e.final_g, e.target_g, fi.limit_ms
            ),
            FinishReason::TargetReached => format!("Feed finished: {fi}"),
        };
    }

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingSensor => {
                "What happened: No weight sensor was provided to the feeder.\nLikely causes: The HX711 scale failed to initialize or was not wired into the builder.\nHow to fix: Ensure the scale is created successfully and passed via with_sensor(...).".to_string()
            }
            BuildError::MissingGate => {
                "What happened: No gate was provided to the feeder.\nLikely causes: The servo failed to initialize or was not wired into the builder.\nHow to fix: Ensure the gate is created successfully and passed via with_gate(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/feeder_config.toml for a sample."
            ),
        };
    }

    if let Some(fe) = err.downcast_ref::<FeederError>() {
        return match fe {
            FeederError::Timeout => "What happened: Scale read timed out.\nLikely causes: HX711 not wired correctly, no power/ground, or timeout too low.\nHow to fix: Verify DT/SCK pins and power, and consider increasing scale.read_timeout_ms in the config.".to_string(),
            FeederError::Hardware(m) | FeederError::HardwareFault(m) => format!(
                "What happened: Hardware error ({m}).\nLikely causes: Loose wiring or a pin already in use.\nHow to fix: Check the [pins] section and the wiring, then rerun."
            ),
            _ => format!(
                "What happened: {fe}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if (lower.contains("hx711") && lower.contains("timeout")) || lower.contains("datareadytimeout")
    {
        return "What happened: HX711 did not produce data within the configured timeout.\nLikely causes: Wrong DT/SCK pins, wiring/power issues, or timeout configured too low.\nHow to fix: Check [pins] in the config, verify 5V/GND, and raise scale.read_timeout_ms.".to_string();
    }

    if lower.contains("open hx711") || lower.contains("open servo pin") || lower.contains("open button pins") {
        return "What happened: Failed to initialize hardware pins.\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values in the config; ensure the process has permission to access GPIO.".to_string();
    }

    if lower.contains("invalid configuration") || lower.contains("read config") {
        let cause = err
            .chain()
            .nth(1)
            .map(|c| format!(" ({c})"))
            .unwrap_or_default();
        return format!(
            "What happened: Configuration is invalid or incomplete{cause}.\nLikely causes: Missing [pins] (hx711_dt, hx711_sck, servo, btn_*), or out-of-range values.\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: stuck feeds 3, timed-out feeds 4, anything else 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<FeedIncomplete>().map(|fi| fi.entry.reason) {
        Some(FinishReason::Stuck) => 3,
        Some(FinishReason::Timeout) => 4,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    if let Some(fi) = err.downcast_ref::<FeedIncomplete>() {
        let limit_key = match fi.entry.reason {
            FinishReason::Timeout => "max_run_ms",
            _ => "stuck_ms",
        };
        return json!({
            "reason": fi.entry.reason.as_str(),
            "message": humanize(err),
            "details": {
                "target_g": fi.entry.target_g,
                "final_g": fi.entry.final_g,
                "start_g": fi.entry.start_g,
                limit_key: fi.limit_ms,
            },
        })
        .to_string();
    }

    // Generic error JSON
    json!({ "reason": "Error", "message": humanize(err) }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use feeder_core::FeedLogEntry;

    fn incomplete(reason: FinishReason) -> eyre::Report {
        FeedIncomplete {
            entry: FeedLogEntry {
                manual: true,
                slot_index: -1,
                hour: 8,
                minute: 0,
                target_g: 100.0,
                final_g: 40.0,
                start_g: 0.0,
                reason,
            },
            limit_ms: 20_000,
        }
        .into()
    }

    #[test]
    fn exit_codes_follow_finish_reason() {
        assert_eq!(exit_code_for_error(&incomplete(FinishReason::Stuck)), 3);
        assert_eq!(exit_code_for_error(&incomplete(FinishReason::Timeout)), 4);
        assert_eq!(exit_code_for_error(&eyre::eyre!("boom")), 1);
    }

    #[test]
    fn stuck_json_carries_window() {
        let v: serde_json::Value =
            serde_json::from_str(&format_error_json(&incomplete(FinishReason::Stuck))).unwrap();
        assert_eq!(v["reason"], "Stuck");
        assert_eq!(v["details"]["stuck_ms"], 20_000);
        assert!(v["message"].as_str().unwrap().contains("hopper"));
    }

    #[test]
    fn wrapped_config_error_mentions_cause() {
        let err = eyre::eyre!("manual.max_g must be > 0").wrap_err("invalid configuration");
        let text = humanize(&err);
        assert!(text.contains("manual.max_g"));
    }
}
