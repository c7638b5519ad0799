// Robot Framework output.xml rendering

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::{BTreeMap, BTreeSet};

use super::escape::{escape_attr, escape_text};
use crate::state::{ResultEntity, RunSummary, TestStatus};
use crate::time::format_timestamp;

/// Output schema version understood by rebot 7
pub const SCHEMA_VERSION: u32 = 5;

const SUITE_ID: &str = "s1";

#[derive(Debug, Clone, Copy, Default)]
struct Counts {
    pass: usize,
    fail: usize,
    skip: usize,
}

impl Counts {
    fn add(&mut self, status: TestStatus) {
        match status {
            TestStatus::Pass => self.pass += 1,
            TestStatus::Fail => self.fail += 1,
            TestStatus::Skip => self.skip += 1,
        }
    }

    fn attrs(&self) -> String {
        format!(
            "pass=\"{}\" fail=\"{}\" skip=\"{}\"",
            self.pass, self.fail, self.skip
        )
    }
}

/// Seconds with microsecond precision, never negative
pub fn format_elapsed(elapsed: TimeDelta) -> String {
    let micros = elapsed.num_microseconds().unwrap_or(i64::MAX).max(0);
    format!("{}.{:06}", micros / 1_000_000, micros % 1_000_000)
}

fn status_attrs(status: TestStatus, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!(
        "status=\"{}\" start=\"{}\" end=\"{}\" elapsed=\"{}\"",
        status.as_token(),
        format_timestamp(&start),
        format_timestamp(&end),
        format_elapsed(end - start)
    )
}

/// Render a complete output.xml document.
///
/// The result depends only on `suite_name` and `results`; tests appear in
/// the order given.
pub fn render(suite_name: &str, results: &[ResultEntity]) -> String {
    let summary = RunSummary::from_results(results);
    let suite_attr = escape_attr(suite_name);

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<robot generator=\"hands {}\" rpa=\"false\" schemaversion=\"{}\">\n",
        env!("CARGO_PKG_VERSION"),
        SCHEMA_VERSION
    ));
    xml.push_str(&format!(
        "<suite id=\"{}\" name=\"{}\">\n",
        SUITE_ID, suite_attr
    ));

    let mut tag_counts: BTreeMap<&str, Counts> = BTreeMap::new();

    for (index, result) in results.iter().enumerate() {
        xml.push_str(&format!(
            "<test id=\"{}-t{}\" name=\"{}\">\n",
            SUITE_ID,
            index + 1,
            escape_attr(result.name())
        ));

        if let Some(tags) = result.tags() {
            xml.push_str("<tags>\n");
            for tag in tags {
                xml.push_str(&format!("<tag>{}</tag>\n", escape_text(tag)));
            }
            xml.push_str("</tags>\n");

            let unique: BTreeSet<&str> = tags.iter().map(String::as_str).collect();
            for tag in unique {
                tag_counts.entry(tag).or_default().add(result.status());
            }
        }

        let attrs = status_attrs(result.status(), result.start(), result.end());
        match result.message() {
            Some(message) => xml.push_str(&format!(
                "<status {}>{}</status>\n",
                attrs,
                escape_text(message)
            )),
            None => xml.push_str(&format!("<status {}/>\n", attrs)),
        }

        xml.push_str("</test>\n");
    }

    if let (Some(start), Some(end)) = (summary.start, summary.end) {
        xml.push_str(&format!(
            "<status {}/>\n",
            status_attrs(summary.status(), start, end)
        ));
    }
    xml.push_str("</suite>\n");

    let mut total = Counts::default();
    for result in results {
        total.add(result.status());
    }

    xml.push_str("<statistics>\n");
    xml.push_str("<total>\n");
    xml.push_str(&format!("<stat {}>All Tests</stat>\n", total.attrs()));
    xml.push_str("</total>\n");
    xml.push_str("<tag>\n");
    for (tag, counts) in &tag_counts {
        xml.push_str(&format!("<stat {}>{}</stat>\n", counts.attrs(), escape_text(tag)));
    }
    xml.push_str("</tag>\n");
    xml.push_str("<suite>\n");
    xml.push_str(&format!(
        "<stat name=\"{}\" id=\"{}\" {}>{}</stat>\n",
        suite_attr,
        SUITE_ID,
        total.attrs(),
        escape_text(suite_name)
    ));
    xml.push_str("</suite>\n");
    xml.push_str("</statistics>\n");
    xml.push_str("<errors>\n");
    xml.push_str("</errors>\n");
    xml.push_str("</robot>\n");

    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000 + millis).unwrap()
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(TimeDelta::milliseconds(1500)), "1.500000");
        assert_eq!(format_elapsed(TimeDelta::microseconds(7)), "0.000007");
        assert_eq!(format_elapsed(TimeDelta::seconds(-4)), "0.000000");
    }

    #[test]
    fn test_render_pass_is_self_closed() {
        let xml = render("S", &[ResultEntity::pass("t1", at(0), at(250))]);
        assert!(xml.contains("<test id=\"s1-t1\" name=\"t1\">"));
        assert!(xml.contains(
            "<status status=\"PASS\" start=\"2023-11-14T22:13:20.000000+00:00\" \
             end=\"2023-11-14T22:13:20.250000+00:00\" elapsed=\"0.250000\"/>"
        ));
    }

    #[test]
    fn test_render_failure_message_as_status_text() {
        let xml = render("S", &[ResultEntity::fail("t2", "a < b", at(0), at(1))]);
        assert!(xml.contains("elapsed=\"0.001000\">a &lt; b</status>"));
    }

    #[test]
    fn test_render_tags_and_tag_statistics() {
        let results = vec![
            ResultEntity::pass("a", at(0), at(1)).with_tags(vec!["smoke".into(), "api".into()]),
            ResultEntity::fail("b", "x", at(1), at(2)).with_tags(vec!["smoke".into()]),
        ];
        let xml = render("S", &results);
        assert!(xml.contains("<tags>\n<tag>smoke</tag>\n<tag>api</tag>\n</tags>\n"));
        assert!(xml.contains("<stat pass=\"1\" fail=\"0\" skip=\"0\">api</stat>"));
        assert!(xml.contains("<stat pass=\"1\" fail=\"1\" skip=\"0\">smoke</stat>"));
        let api = xml.find(">api</stat>").unwrap();
        let smoke = xml.find(">smoke</stat>").unwrap();
        assert!(api < smoke);
    }

    #[test]
    fn test_render_suite_status_and_totals() {
        let results = vec![
            ResultEntity::pass("a", at(0), at(10)),
            ResultEntity::skip("b", at(5), at(20)),
        ];
        let xml = render("My Suite", &results);
        assert!(xml.contains("<suite id=\"s1\" name=\"My Suite\">"));
        assert!(xml.contains(
            "<status status=\"PASS\" start=\"2023-11-14T22:13:20.000000+00:00\" \
             end=\"2023-11-14T22:13:20.020000+00:00\" elapsed=\"0.020000\"/>\n</suite>"
        ));
        assert!(xml.contains("<stat pass=\"1\" fail=\"0\" skip=\"1\">All Tests</stat>"));
        assert!(xml.contains(
            "<stat name=\"My Suite\" id=\"s1\" pass=\"1\" fail=\"0\" skip=\"1\">My Suite</stat>"
        ));
    }
}
