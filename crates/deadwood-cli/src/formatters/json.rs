//! JSON formatter for analysis results.

use deadwood_core::AnalysisResult;

pub fn print(result: &AnalysisResult) {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error serializing results: {e}"),
    }
}
