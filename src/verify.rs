// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use std::collections::{BTreeMap, HashSet};

use crate::config::{Configuration, SampleRecord};
use crate::distribution::{covers_midi_range, Interval, MIDI_MAX};
use crate::naming::format_sample_name;

/// Issues that aren't about a single sample are filed under this subject.
const PLAN_SUBJECT: &str = "plan";

/// Severity level for a verification issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A single verification issue found during checking.
#[derive(Debug, Clone)]
pub struct Issue {
    pub severity: Severity,
    pub category: &'static str,
    pub subject: String,
    pub message: String,
}

impl Issue {
    fn error(category: &'static str, subject: &str, message: String) -> Issue {
        Issue {
            severity: Severity::Error,
            category,
            subject: subject.to_string(),
            message,
        }
    }

    fn warning(category: &'static str, subject: &str, message: String) -> Issue {
        Issue {
            severity: Severity::Warning,
            category,
            subject: subject.to_string(),
            message,
        }
    }
}

/// Result of verifying a configuration.
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    pub issues: Vec<Issue>,
}

impl VerificationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    /// Merge another report into this one.
    pub fn merge(&mut self, other: VerificationReport) {
        self.issues.extend(other.issues);
    }
}

/// Checks that both distributions are strictly increasing and within their ranges.
pub fn check_distributions(configuration: &Configuration) -> Vec<Issue> {
    let parameters = &configuration.parameters;
    let mut issues = Vec::new();
    for (name, distribution, min, max) in [
        (
            "notes",
            &configuration.notes_distribution,
            parameters.note_min,
            parameters.note_max,
        ),
        (
            "velocity",
            &configuration.velocity_distribution,
            0,
            MIDI_MAX,
        ),
    ] {
        if distribution.is_empty() {
            issues.push(Issue::error(
                "distribution",
                PLAN_SUBJECT,
                format!("{} distribution is empty", name),
            ));
        }
        if let Some(point) = distribution.iter().find(|p| !(min..=max).contains(*p)) {
            issues.push(Issue::error(
                "distribution",
                PLAN_SUBJECT,
                format!("{} distribution point {} is outside {}-{}", name, point, min, max),
            ));
        }
        if distribution.windows(2).any(|pair| pair[0] >= pair[1]) {
            issues.push(Issue::error(
                "distribution",
                PLAN_SUBJECT,
                format!("{} distribution is not strictly increasing", name),
            ));
        }
    }
    issues
}

/// Collects the interval of each distinct value on one axis, in first-seen order.
fn axis_intervals<F>(samples: &[SampleRecord], axis: F) -> Vec<Interval>
where
    F: Fn(&SampleRecord) -> (u8, Interval),
{
    let mut seen = HashSet::new();
    let mut intervals: Vec<(u8, Interval)> = Vec::new();
    for (value, interval) in samples.iter().map(axis) {
        if seen.insert(value) {
            intervals.push((value, interval));
        }
    }
    intervals.sort_by_key(|(value, _)| *value);
    intervals.into_iter().map(|(_, interval)| interval).collect()
}

/// Checks that the key and velocity ranges of the samples cover the MIDI range without gaps
/// or overlaps, and that every sample answers to its own key and velocity.
pub fn check_intervals(configuration: &Configuration) -> Vec<Issue> {
    let samples = &configuration.samples;
    if samples.is_empty() {
        return Vec::new();
    }

    let mut issues = Vec::new();
    let notes = axis_intervals(samples, |s| (s.note_number, s.note_interval));
    if !covers_midi_range(&notes) {
        issues.push(Issue::error(
            "intervals",
            PLAN_SUBJECT,
            "key ranges don't partition 0-127".to_string(),
        ));
    }
    let velocities = axis_intervals(samples, |s| (s.velocity, s.velocity_interval));
    if !covers_midi_range(&velocities) {
        issues.push(Issue::error(
            "intervals",
            PLAN_SUBJECT,
            "velocity ranges don't partition 0-127".to_string(),
        ));
    }

    for sample in samples.iter() {
        if !sample.note_interval.contains(sample.note_number) {
            issues.push(Issue::warning(
                "intervals",
                &sample.sample_name,
                format!(
                    "key {} is outside its key range {}",
                    sample.note_number, sample.note_interval
                ),
            ));
        }
        if !sample.velocity_interval.contains(sample.velocity) {
            issues.push(Issue::warning(
                "intervals",
                &sample.sample_name,
                format!(
                    "velocity {} is outside its velocity range {}",
                    sample.velocity, sample.velocity_interval
                ),
            ));
        }
    }
    issues
}

/// Checks that sample windows are ordered and don't overlap.
pub fn check_timeline(configuration: &Configuration) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut previous_end = 0.0;
    for sample in configuration.samples.iter() {
        if sample.time_start >= sample.time_end {
            issues.push(Issue::error(
                "timeline",
                &sample.sample_name,
                format!(
                    "window {}s-{}s is empty",
                    sample.time_start, sample.time_end
                ),
            ));
        }
        if sample.time_start < previous_end {
            issues.push(Issue::error(
                "timeline",
                &sample.sample_name,
                format!(
                    "window starts at {}s, before the previous one ends at {}s",
                    sample.time_start, previous_end
                ),
            ));
        }
        previous_end = sample.time_end;
    }
    issues
}

/// Checks that there is one uniquely named sample per pitch and velocity.
pub fn check_samples(configuration: &Configuration) -> Vec<Issue> {
    let mut issues = Vec::new();
    let expected =
        configuration.notes_distribution.len() * configuration.velocity_distribution.len();
    if configuration.samples.len() != expected {
        issues.push(Issue::error(
            "samples",
            PLAN_SUBJECT,
            format!(
                "expected {} samples, found {}",
                expected,
                configuration.samples.len()
            ),
        ));
    }

    let mut names = HashSet::new();
    for sample in configuration.samples.iter() {
        if !names.insert(sample.sample_name.as_str()) {
            issues.push(Issue::error(
                "samples",
                &sample.sample_name,
                "sample name is used more than once".to_string(),
            ));
        }
        let expected_name = format_sample_name(sample.note_number, sample.velocity);
        if sample.sample_name != expected_name {
            issues.push(Issue::warning(
                "samples",
                &sample.sample_name,
                format!("expected the sample to be named {}", expected_name),
            ));
        }
    }
    issues
}

/// Runs every check against the configuration.
pub fn check_configuration(configuration: &Configuration) -> VerificationReport {
    let mut report = VerificationReport::default();
    report.issues.extend(check_distributions(configuration));
    report.issues.extend(check_intervals(configuration));
    report.issues.extend(check_timeline(configuration));
    report.issues.extend(check_samples(configuration));
    report
}

/// Prints a verification report grouped by subject.
pub fn print_report(report: &VerificationReport, configuration: &Configuration) {
    if report.is_clean() {
        println!(
            "\u{2705} All {} sample(s) passed verification.",
            configuration.samples.len()
        );
        return;
    }

    // Group issues by subject.
    let mut by_subject: BTreeMap<&str, Vec<&Issue>> = BTreeMap::new();
    for issue in &report.issues {
        by_subject.entry(&issue.subject).or_default().push(issue);
    }

    for (subject, issues) in &by_subject {
        let has_errors = issues.iter().any(|i| i.severity == Severity::Error);
        let icon = if has_errors {
            "\u{274c}"
        } else {
            "\u{26a0}\u{fe0f} "
        };
        println!("{} {}", icon, subject);
        for issue in issues {
            let severity_icon = match issue.severity {
                Severity::Warning => "\u{26a0}\u{fe0f} ",
                Severity::Error => "\u{274c}",
            };
            println!(
                "   {} [{}] {}",
                severity_icon, issue.category, issue.message
            );
        }
    }

    println!(
        "\nSummary: {} issue(s) found across {} subject(s).",
        report.issues.len(),
        by_subject.len()
    );
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;
    use crate::config::PlanParameters;
    use crate::planner;

    fn planned() -> Result<Configuration, Box<dyn Error>> {
        Ok(planner::plan(PlanParameters {
            note_min: 48,
            note_max: 84,
            note_layers: 4,
            velocity_layers: 3,
            velocity_shift: 50,
            time_sustain: 4,
            time_release: 2,
        })?
        .configuration)
    }

    #[test]
    fn test_planned_configuration_is_clean() -> Result<(), Box<dyn Error>> {
        let report = check_configuration(&planned()?);
        assert!(report.is_clean(), "{:?}", report.issues);
        Ok(())
    }

    #[test]
    fn test_default_plan_is_clean() -> Result<(), Box<dyn Error>> {
        let configuration = planner::plan(PlanParameters::default())?.configuration;
        assert!(check_configuration(&configuration).is_clean());
        Ok(())
    }

    #[test]
    fn test_overlapping_windows() -> Result<(), Box<dyn Error>> {
        let mut configuration = planned()?;
        configuration.samples[2].time_start -= 1.0;
        let issues = check_timeline(&configuration);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, "timeline");
        assert_eq!(issues[0].subject, configuration.samples[2].sample_name);
        assert_eq!(issues[0].severity, Severity::Error);
        Ok(())
    }

    #[test]
    fn test_broken_key_ranges() -> Result<(), Box<dyn Error>> {
        let mut configuration = planned()?;
        for sample in configuration.samples.iter_mut() {
            if sample.note_interval.last == MIDI_MAX {
                sample.note_interval.last = 120;
            }
        }
        let issues = check_intervals(&configuration);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("key ranges"));
        Ok(())
    }

    #[test]
    fn test_sample_outside_its_range() -> Result<(), Box<dyn Error>> {
        let mut configuration = planned()?;
        configuration.samples[0].velocity = 127;
        configuration.samples[0].sample_name = format_sample_name(
            configuration.samples[0].note_number,
            configuration.samples[0].velocity,
        );
        let issues = check_intervals(&configuration);
        assert!(issues
            .iter()
            .any(|issue| issue.severity == Severity::Warning
                && issue.message.contains("velocity 127")));
        Ok(())
    }

    #[test]
    fn test_distribution_checks() -> Result<(), Box<dyn Error>> {
        let mut configuration = planned()?;
        configuration.notes_distribution.reverse();
        configuration.velocity_distribution.clear();
        let issues = check_distributions(&configuration);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|issue| issue.subject == PLAN_SUBJECT));
        Ok(())
    }

    #[test]
    fn test_sample_count_and_names() -> Result<(), Box<dyn Error>> {
        let mut configuration = planned()?;
        let duplicate = configuration.samples[0].clone();
        configuration.samples.push(duplicate);
        configuration.samples[1].sample_name = "mystery".to_string();

        let issues = check_samples(&configuration);
        assert!(issues
            .iter()
            .any(|issue| issue.message.starts_with("expected 12 samples")));
        assert!(issues
            .iter()
            .any(|issue| issue.message.contains("more than once")));
        assert!(issues
            .iter()
            .any(|issue| issue.subject == "mystery" && issue.severity == Severity::Warning));
        Ok(())
    }

    #[test]
    fn test_verification_report_has_errors() {
        let mut report = VerificationReport::default();
        assert!(report.is_clean());
        report
            .issues
            .push(Issue::warning("test", "sample", "warning".to_string()));
        assert!(!report.has_errors());

        report
            .issues
            .push(Issue::error("test", "sample", "error".to_string()));
        assert!(report.has_errors());
    }

    #[test]
    fn test_verification_report_merge() {
        let mut report_a = VerificationReport::default();
        report_a
            .issues
            .push(Issue::warning("a", "sample", "issue a".to_string()));
        let mut report_b = VerificationReport::default();
        report_b
            .issues
            .push(Issue::error("b", "sample", "issue b".to_string()));
        report_a.merge(report_b);
        assert_eq!(report_a.issues.len(), 2);
        assert!(report_a.has_errors());
    }
}
