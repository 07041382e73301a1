//! Human-readable formatter for analysis results.

use deadwood_core::AnalysisResult;
use std::path::Path;

pub fn print(result: &AnalysisResult) {
    println!("\nDeadwood Analysis Results");
    println!("=========================\n");

    println!("Project: {}", result.project_path.display());
    println!("  Files analyzed: {}", result.files_analyzed);
    println!("  Lines of code: {}", result.lines_of_code);
    println!("  Entry points: {}", result.entry_points.len());
    println!(
        "  Duration: {}ms\n",
        result.performance_metrics.analysis_time_ms
    );

    let graph = &result.dependency_graph;
    println!("Dependency graph:");
    println!("  Nodes: {}", graph.total_nodes);
    println!("  Edges: {}", graph.total_edges);
    println!(
        "  Reachable: {} / unreachable: {}",
        graph.reachable_files, graph.unreachable_files
    );

    if !graph.circular_dependencies.is_empty() {
        println!(
            "\nCircular dependencies ({}):",
            graph.circular_dependencies.len()
        );
        for cycle in &graph.circular_dependencies {
            let names: Vec<String> = cycle
                .iter()
                .map(|p| relative_display(p, &result.project_path))
                .collect();
            println!("  {}", names.join(" -> "));
        }
    }

    if result.dead_files.is_empty() {
        println!("\nNo dead files found.");
    } else {
        println!("\nDead files ({}):", result.dead_files.len());
        for dead in &result.dead_files {
            println!(
                "  [{:>3}%] {}",
                dead.confidence,
                relative_display(&dead.path, &result.project_path)
            );
            for reason in &dead.reasons {
                println!("         - {reason}");
            }
            if let Some(suggestions) = &dead.suggestions {
                for suggestion in suggestions {
                    println!("         > {suggestion}");
                }
            }
        }
    }

    if !result.dynamic_usage.is_empty() {
        let registered = result.dynamic_usage.service_container.len()
            + result.dynamic_usage.command_bus.len()
            + result.dynamic_usage.custom_patterns.len();
        println!(
            "\nDynamic usage: {} registered symbols, {} dynamic import specifiers",
            registered,
            result.dynamic_usage.dynamic_imports.len()
        );
    }

    if result.errors > 0 || result.warnings > 0 {
        println!(
            "\n{} error(s), {} warning(s)",
            result.errors, result.warnings
        );
    }
}

fn relative_display(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
