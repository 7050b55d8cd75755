//! Terminal rendering of answers, citations and reports

use colored::*;
use std::fmt::Write;
use std::time::Duration;

use crate::errors::RagError;
use crate::rag::index::IndexMode;
use crate::rag::pipeline::PipelineStats;
use crate::rag::types::{Language, QueryResult};

/// What to include around each answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub report: bool,
    pub chunks: bool,
}

/// Welcome banner for the question loop
pub fn banner(stats: &PipelineStats, language: Language, backend: &str) -> String {
    let width = 64;
    let rule = "=".repeat(width);
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule.cyan());
    let _ = writeln!(out, "{}", "  RagBuddy - Document Q&A".bold().cyan());
    let _ = writeln!(
        out,
        "{}",
        format!(
            "  Documents: {} | Chunks: {} | Language: {} | Backend: {}",
            stats.documents,
            stats.chunks,
            language.as_str(),
            backend
        )
        .dimmed()
    );
    let _ = writeln!(out, "{}\n", rule.cyan());
    let _ = write!(
        out,
        "Ask a question ({} switches language, {} quits)",
        "lang en|ar".green(),
        "exit".green()
    );
    out
}

/// Index statistics
pub fn stats(stats: &PipelineStats) -> String {
    let mode = match stats.index_mode {
        IndexMode::Indexed => "indexed".green(),
        IndexMode::Degraded => "degraded (random fallback)".yellow(),
    };
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Index Statistics:".bold().cyan());
    let _ = writeln!(out, "  Documents:  {}", stats.documents.to_string().green());
    let _ = writeln!(out, "  Chunks:     {}", stats.chunks.to_string().green());
    let _ = writeln!(out, "  Dimension:  {}", stats.dimension);
    let _ = write!(out, "  Mode:       {}", mode);
    out
}

fn citations_section(out: &mut String, citations: &[&str]) {
    let _ = writeln!(out, "\n{}", "--- Citations ---".bold());
    if citations.is_empty() {
        let _ = writeln!(out, "No relevant citations found.");
    } else {
        for citation in citations {
            let _ = writeln!(out, "- {}", citation);
        }
    }
}

fn chunks_section(out: &mut String, chunks: &[String], distances: &[f32]) {
    let _ = writeln!(out, "\n{}", "--- Retrieved Chunks ---".bold());
    for (i, chunk) in chunks.iter().enumerate() {
        let distance = distances.get(i).copied().unwrap_or_default();
        let _ = writeln!(out, "[{}] ({:.4}) {}", i + 1, distance, chunk.dimmed());
    }
}

/// Answer, citations and optional report for one query
pub fn answer(result: &QueryResult, total: Duration, backend: &str, options: RenderOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", "--- Answer ---".bold());
    let _ = writeln!(out, "{}", result.answer);

    let citations: Vec<&str> = result.citations.iter().map(String::as_str).collect();
    citations_section(&mut out, &citations);

    if options.chunks && !result.retrieved_chunks.is_empty() {
        chunks_section(&mut out, &result.retrieved_chunks, &result.distances);
    }

    if options.report {
        let _ = writeln!(out, "\n{}", "--- Report ---".bold());
        let _ = writeln!(out, "Total Query Time: {:.2} seconds", total.as_secs_f64());
        let _ = writeln!(out, "LLM Latency ({}): {:.2} ms", backend, result.latency_ms);
        let _ = writeln!(out, "LLM Cost ({}): ${:.4}", backend, result.cost_usd);
        let _ = writeln!(out, "Retrieved Chunks Count: {}", result.retrieved_chunks.len());
        if result.index_mode == IndexMode::Degraded {
            let _ = writeln!(
                out,
                "{}",
                "Index Mode: degraded (random fallback)".yellow()
            );
        }
    }

    out
}

/// Error line; generation failures also list what was retrieved
pub fn error(err: &RagError, options: RenderOptions) -> String {
    let mut out = format!("{} {}\n", "Error:".red().bold(), err.to_string().red());

    if let RagError::Generation {
        citations,
        retrieved_chunks,
        ..
    } = err
    {
        let citations: Vec<&str> = citations.iter().map(String::as_str).collect();
        citations_section(&mut out, &citations);
        if options.chunks {
            chunks_section(&mut out, retrieved_chunks, &[]);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::types::AnswerOutcome;
    use std::collections::BTreeSet;

    const FULL: RenderOptions = RenderOptions {
        report: true,
        chunks: true,
    };

    fn result(citations: &[&str], chunks: &[&str]) -> QueryResult {
        QueryResult {
            answer: "English Answer: hello".to_string(),
            citations: citations.iter().map(|c| c.to_string()).collect::<BTreeSet<_>>(),
            retrieved_chunks: chunks.iter().map(|c| c.to_string()).collect(),
            distances: vec![0.5; chunks.len()],
            latency_ms: 12.5,
            cost_usd: 0.000014,
            outcome: AnswerOutcome::Answered,
            index_mode: IndexMode::Indexed,
        }
    }

    #[test]
    fn test_answer_with_citations_and_report() {
        let text = answer(
            &result(&["doc_en.txt"], &["Fox is an animal."]),
            Duration::from_millis(20),
            "mock",
            FULL,
        );
        assert!(text.contains("English Answer: hello"));
        assert!(text.contains("- doc_en.txt"));
        assert!(text.contains("Total Query Time: 0.02 seconds"));
        assert!(text.contains("LLM Latency (mock): 12.50 ms"));
        assert!(text.contains("LLM Cost (mock): $0.0000"));
        assert!(text.contains("Retrieved Chunks Count: 1"));
        assert!(text.contains("Fox is an animal."));
    }

    #[test]
    fn test_answer_without_citations() {
        let options = RenderOptions {
            report: false,
            chunks: false,
        };
        let text = answer(&result(&[], &[]), Duration::ZERO, "mock", options);
        assert!(text.contains("No relevant citations found."));
        assert!(!text.contains("Report"));
    }

    #[test]
    fn test_generation_error_lists_citations() {
        let err = RagError::generation("ollama", "connection refused")
            .with_retrieval(vec!["a.txt".to_string()], vec!["chunk".to_string()]);
        let text = error(&err, FULL);
        assert!(text.contains("connection refused"));
        assert!(text.contains("- a.txt"));
        assert!(text.contains("chunk"));
    }

    #[test]
    fn test_stats_rendering() {
        let text = stats(&PipelineStats {
            documents: 2,
            chunks: 5,
            dimension: 128,
            index_mode: IndexMode::Degraded,
        });
        assert!(text.contains("Dimension:  128"));
        assert!(text.contains("degraded"));
    }
}
