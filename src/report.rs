use crate::compare::{CompareOutcome, FlatBookmarkRecord, MatchKey};

/// Human-readable rendering of one comparison run, consumed by the CLI.
pub struct CompareReport<'a> {
    outcome: &'a CompareOutcome,
    key: MatchKey,
    file_name: &'a str,
}

impl<'a> CompareReport<'a> {
    pub fn new(outcome: &'a CompareOutcome, key: MatchKey, file_name: &'a str) -> Self {
        Self {
            outcome,
            key,
            file_name,
        }
    }

    pub fn format(&self, detailed: bool) -> String {
        let mut output = String::new();

        output.push_str("\n🔍 Bookmark Comparison Report\n");
        output.push_str(&format!(
            "   remote file: {} · matched by {}\n",
            self.file_name,
            self.key.name()
        ));
        output.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

        self.push_section(
            &mut output,
            "📌 Local only",
            &self.outcome.local_only,
            detailed,
        );
        self.push_section(
            &mut output,
            "☁️  Remote only",
            &self.outcome.remote_only,
            detailed,
        );
        self.push_section(&mut output, "🔗 Common", &self.outcome.common, detailed);

        output.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
        output.push_str(&format!(
            "\n📊 Summary: {} local-only, {} remote-only, {} common\n\n",
            self.outcome.local_only.len(),
            self.outcome.remote_only.len(),
            self.outcome.common.len()
        ));

        output
    }

    fn push_section(
        &self,
        output: &mut String,
        heading: &str,
        records: &[FlatBookmarkRecord],
        detailed: bool,
    ) {
        output.push_str(&format!("{}: {}\n", heading, records.len()));
        for record in records {
            output.push_str(&format!("  • {} — {}\n", record.title, record.url));
            if detailed && !record.path.is_empty() {
                output.push_str(&format!("    Path: {}\n", record.path));
            }
        }
        output.push('\n');
    }
}
