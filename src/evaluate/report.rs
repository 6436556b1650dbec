use std::fmt;

#[cfg(feature = "colorized_output")]
use console::style;

/// Outcome of a timestamp evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    /// Archive the timestamps were read from, if any
    pub file_path: Option<String>,
    /// Number of timestamps
    pub num_shots: usize,
    /// `(t[n-1] - t[0]) / (n - 1)`
    pub avg_time_gap: f64,
    /// Shots whose neighbouring gaps are within tolerance
    pub num_space_correct: usize,
    /// `num_space_correct` as a percentage of `num_shots`
    pub percent_space_correct: f64,
    /// Allowed gap deviation, in percent of the average gap
    pub deviation_threshold_percent: f64,
    /// Percentage of space-correct shots required for acceptance
    pub acceptance_threshold_percent: f64,
    /// Whether the archive passed
    pub accepted: bool,
}

impl EvaluationReport {
    fn verdict(&self) -> &'static str {
        if self.accepted {
            "ACCEPTED"
        } else {
            "REJECTED"
        }
    }

    /// Format the report with colors (requires console feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            use console::Emoji;

            static OK: Emoji<'_, '_> = Emoji("✓", "[OK]");
            static FAIL: Emoji<'_, '_> = Emoji("✗", "[FAIL]");

            let mut output = String::new();
            output.push_str(&format!("{}\n", style("Timestamp Evaluation").bold().cyan()));
            output.push_str(&format!("{}\n", style("====================").cyan()));
            if let Some(path) = &self.file_path {
                output.push_str(&format!("{}: {}\n", style("File").bold(), path));
            }
            output.push('\n');

            output.push_str(&format!("{:<22} {}\n", "Shots:", self.num_shots));
            output.push_str(&format!("{:<22} {:e} s\n", "Average gap:", self.avg_time_gap));
            output.push_str(&format!(
                "{:<22} ±{:.1}%\n",
                "Deviation threshold:", self.deviation_threshold_percent
            ));
            output.push_str(&format!(
                "{:<22} {} ({:.2}%, need {:.2}%)\n",
                "Space-correct shots:",
                self.num_space_correct,
                self.percent_space_correct,
                self.acceptance_threshold_percent
            ));
            output.push('\n');

            if self.accepted {
                output.push_str(&format!("[{}] {}\n", OK, style(self.verdict()).green().bold()));
            } else {
                output.push_str(&format!("[{}] {}\n", FAIL, style(self.verdict()).red().bold()));
            }
            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            format!("{}", self)
        }
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Timestamp Evaluation")?;
        writeln!(f, "====================")?;
        if let Some(path) = &self.file_path {
            writeln!(f, "File: {}", path)?;
        }
        writeln!(f)?;
        writeln!(f, "{:<22} {}", "Shots:", self.num_shots)?;
        writeln!(f, "{:<22} {:e} s", "Average gap:", self.avg_time_gap)?;
        writeln!(f, "{:<22} ±{:.1}%", "Deviation threshold:", self.deviation_threshold_percent)?;
        writeln!(
            f,
            "{:<22} {} ({:.2}%, need {:.2}%)",
            "Space-correct shots:",
            self.num_space_correct,
            self.percent_space_correct,
            self.acceptance_threshold_percent
        )?;
        writeln!(f)?;
        let symbol = if self.accepted { "✓" } else { "✗" };
        writeln!(f, "[{}] {}", symbol, self.verdict())
    }
}
