// ABOUTME: Tool definitions for LLM function calling, expressed as serde_json::Value structs.
// ABOUTME: Each tool maps to one analytics operation and can be sent to any LLM API with tools.

use serde_json::{Value, json};

/// Return the complete set of tool definitions the toolkit exposes.
/// These are provider-agnostic JSON schemas; a provider adapter reformats
/// them to match its API's tool specification.
pub fn all_tool_definitions() -> Vec<Value> {
    vec![
        analyze_performance_metrics(),
        generate_forecast(),
        create_dashboard_data(),
        analyze_ab_test_results(),
    ]
}

/// Tool: analyze a record set for summary statistics and insights.
fn analyze_performance_metrics() -> Value {
    json!({
        "name": "analyze_performance_metrics",
        "description": "Analyze performance metrics: per-column statistics (mean, median, std, min, max, trend), variability and trend insights, and strong correlations between metrics.",
        "parameters": {
            "type": "object",
            "properties": {
                "metrics_data": {
                    "type": "string",
                    "description": "JSON string containing an array of flat metric records."
                }
            },
            "required": ["metrics_data"]
        }
    })
}

/// Tool: forecast a time series a number of periods forward.
fn generate_forecast() -> Value {
    json!({
        "name": "generate_forecast",
        "description": "Generate a forecast from historical time series data using linear regression and a random forest, reporting each model's fit quality and the best model's projection.",
        "parameters": {
            "type": "object",
            "properties": {
                "historical_data": {
                    "type": "string",
                    "description": "JSON string with records containing 'date' and 'value' fields."
                },
                "periods": {
                    "type": "integer",
                    "description": "Number of periods to forecast. Defaults to 30."
                }
            },
            "required": ["historical_data"]
        }
    })
}

/// Tool: build chart-ready dashboard payloads from named data sources.
fn create_dashboard_data() -> Value {
    json!({
        "name": "create_dashboard_data",
        "description": "Create dashboard-ready data per source: a time-series line chart, histograms for numeric columns, summary statistics, and the latest row's values.",
        "parameters": {
            "type": "object",
            "properties": {
                "data_sources": {
                    "type": "string",
                    "description": "JSON string mapping source names to arrays of flat records."
                }
            },
            "required": ["data_sources"]
        }
    })
}

/// Tool: check A/B test results for statistical significance.
fn analyze_ab_test_results() -> Value {
    json!({
        "name": "analyze_ab_test_results",
        "description": "Analyze A/B test results per metric: group statistics, percent improvement, effect size, an approximate t-statistic, a significance flag, and a recommendation.",
        "parameters": {
            "type": "object",
            "properties": {
                "test_data": {
                    "type": "string",
                    "description": "JSON string with records containing 'group' (A or B), 'metric', and 'value' fields."
                }
            },
            "required": ["test_data"]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_definitions_are_valid_json() {
        let tools = all_tool_definitions();
        assert_eq!(tools.len(), 4, "should have 4 tool definitions");

        let expected_names = [
            "analyze_performance_metrics",
            "generate_forecast",
            "create_dashboard_data",
            "analyze_ab_test_results",
        ];

        for (i, tool) in tools.iter().enumerate() {
            assert!(tool.is_object(), "tool {} should be an object", i);

            let name = tool
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or_else(|| panic!("tool {} missing name", i));
            assert_eq!(name, expected_names[i]);

            assert!(
                tool.get("description").and_then(|v| v.as_str()).is_some(),
                "tool {} missing description",
                i
            );

            let params = tool
                .get("parameters")
                .unwrap_or_else(|| panic!("tool {} missing parameters", i));
            assert_eq!(
                params.get("type").and_then(|v| v.as_str()),
                Some("object"),
                "tool {} parameters should have type 'object'",
                i
            );
            assert!(
                params.get("required").is_some(),
                "tool {} missing required array",
                i
            );
        }
    }

    #[test]
    fn every_definition_dispatches_through_invoke() {
        // Each defined tool name must be routable; a payload that is valid
        // JSON but fails analysis still proves the route exists.
        for tool in all_tool_definitions() {
            let name = tool["name"].as_str().unwrap();
            let params = serde_json::json!({
                "metrics_data": "[]",
                "historical_data": "[]",
                "test_data": "[]",
                "data_sources": "{}",
            });
            assert!(
                crate::invoke(name, &params).is_some(),
                "tool {} did not dispatch",
                name
            );
        }
    }
}
