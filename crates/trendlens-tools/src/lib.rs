// ABOUTME: The toolkit's string boundary: every operation takes a JSON payload
// ABOUTME: string and returns either the serialized report or {"error": "..."}.

pub mod definitions;

use serde::Serialize;
use serde_json::{Value, json};
use tracing::warn;
use trendlens_analytics::{
    DEFAULT_PERIODS, analyze_ab_test, analyze_metrics, build_dashboard, generate_forecast,
};

pub use definitions::all_tool_definitions;

/// Analyze a record set: summary statistics, insights, and correlations.
pub fn analyze_performance_metrics(metrics_data: &str) -> String {
    to_wire(parse(metrics_data).and_then(|v| analyze_metrics(&v)))
}

/// Forecast a date + value series `periods` days forward.
pub fn forecast(historical_data: &str, periods: usize) -> String {
    to_wire(parse(historical_data).and_then(|v| generate_forecast(&v, periods)))
}

/// Compare A/B test groups per metric.
pub fn analyze_ab_test_results(test_data: &str) -> String {
    to_wire(parse(test_data).and_then(|v| analyze_ab_test(&v)))
}

/// Build chart payloads and summaries from a source-name → records mapping.
pub fn create_dashboard_data(data_sources: &str) -> String {
    to_wire(parse(data_sources).and_then(|v| build_dashboard(&v)))
}

/// Dispatch a tool invocation by name. Parameters mirror the tool
/// definitions: each carries its payload string, the forecast tool an
/// optional period count. None for an unknown tool name.
pub fn invoke(name: &str, params: &Value) -> Option<String> {
    match name {
        "analyze_performance_metrics" => Some(analyze_performance_metrics(
            params.get("metrics_data").and_then(Value::as_str)?,
        )),
        "generate_forecast" => {
            let data = params.get("historical_data").and_then(Value::as_str)?;
            let periods = params
                .get("periods")
                .and_then(Value::as_u64)
                .map(|p| p as usize)
                .unwrap_or(DEFAULT_PERIODS);
            Some(forecast(data, periods))
        }
        "analyze_ab_test_results" => Some(analyze_ab_test_results(
            params.get("test_data").and_then(Value::as_str)?,
        )),
        "create_dashboard_data" => Some(create_dashboard_data(
            params.get("data_sources").and_then(Value::as_str)?,
        )),
        _ => None,
    }
}

fn parse(payload: &str) -> Result<Value, trendlens_core::AnalyticsError> {
    Ok(serde_json::from_str(payload)?)
}

/// Flatten a typed result into the wire shape: the serialized report on
/// success, {"error": "<message>"} on failure.
fn to_wire<T: Serialize>(result: Result<T, trendlens_core::AnalyticsError>) -> String {
    match result {
        Ok(report) => serde_json::to_string(&report)
            .unwrap_or_else(|e| error_payload(&format!("serialization failed: {}", e))),
        Err(err) => {
            warn!(error = %err, "operation failed");
            error_payload(&err.to_string())
        }
    }
}

fn error_payload(message: &str) -> String {
    json!({ "error": message }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_json(s: &str) -> Value {
        serde_json::from_str(s).expect("tool output must be valid JSON")
    }

    #[test]
    fn analyze_returns_structured_report() {
        let out = analyze_performance_metrics(r#"[{"clicks": 10}, {"clicks": 20}]"#);
        let json = as_json(&out);

        assert_eq!(json["summary"]["total_records"], 2);
        assert_eq!(json["metrics"]["clicks"]["mean"], 15.0);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn unparseable_payload_becomes_error_object() {
        let out = analyze_performance_metrics("not json at all");
        let json = as_json(&out);
        assert!(json["error"].as_str().unwrap().contains("malformed input"));
    }

    #[test]
    fn insufficient_forecast_data_uses_the_exact_message() {
        let out = forecast(r#"[{"date": "2024-01-01", "value": 1.0}]"#, 7);
        let json = as_json(&out);
        assert_eq!(json["error"], "Insufficient data for forecasting");
        assert!(json.get("forecast_results").is_none());
    }

    #[test]
    fn ab_test_wire_shape_matches_contract() {
        let out = analyze_ab_test_results(
            r#"[
                {"group": "A", "metric": "ctr", "value": 1.0},
                {"group": "B", "metric": "ctr", "value": 1.1},
                {"group": "A", "metric": "ctr", "value": 1.2},
                {"group": "B", "metric": "ctr", "value": 0.9}
            ]"#,
        );
        let json = as_json(&out);

        assert!(json["ab_test_results"]["ctr"]["group_a"]["mean"].is_number());
        assert_eq!(json["summary"], "Analyzed 1 metrics");
    }

    #[test]
    fn dashboard_wire_shape_matches_contract() {
        let out = create_dashboard_data(
            r#"{"sales": [{"date": "2024-01-01", "value": 10.0}]}"#,
        );
        let json = as_json(&out);

        assert_eq!(json["charts"]["sales_timeseries"]["type"], "line");
        assert_eq!(json["summary"]["sales"]["record_count"], 1);
    }

    #[test]
    fn invoke_dispatches_by_tool_name() {
        let out = invoke(
            "analyze_performance_metrics",
            &json!({"metrics_data": "[{\"v\": 1}]"}),
        )
        .unwrap();
        assert_eq!(as_json(&out)["summary"]["total_records"], 1);

        assert!(invoke("no_such_tool", &json!({})).is_none());
        // Missing the required parameter is also a dispatch failure.
        assert!(invoke("analyze_performance_metrics", &json!({})).is_none());
    }

    #[test]
    fn invoke_forecast_defaults_the_horizon() {
        // Too little data, but the default-period path must still engage
        // and produce the wire error rather than panic.
        let out = invoke(
            "generate_forecast",
            &json!({"historical_data": "[{\"date\": \"2024-01-01\", \"value\": 1.0}]"}),
        )
        .unwrap();
        assert_eq!(as_json(&out)["error"], "Insufficient data for forecasting");
    }
}
