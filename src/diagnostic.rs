/// Diagnostic reporting for skipped range lines, using ariadne
use crate::parser::{MalformedRange, RangeFault};
use ariadne::{Color, Label, Report, ReportKind, Source};

/// Report a malformed range line with source context
pub fn report_malformed_range(
    source_name: &str,
    source: &str,
    malformed: &MalformedRange,
) -> String {
    let mut output = Vec::new();
    let range = malformed.span.range();

    let builder = Report::build(ReportKind::Warning, source_name, range.start);
    let report = match malformed.fault {
        RangeFault::InvalidStart | RangeFault::InvalidEnd => {
            let side = if malformed.fault == RangeFault::InvalidStart {
                "start"
            } else {
                "end"
            };
            builder
                .with_message(format!("Line {} was skipped", malformed.line))
                .with_label(
                    Label::new((source_name, range))
                        .with_message(format!("the range {} is not a whole number", side))
                        .with_color(Color::Yellow),
                )
                .with_help("Lines containing '-' are read as ranges such as 1-10")
                .finish()
        }
        RangeFault::TooLarge { len, max } => builder
            .with_message(format!("Line {} was skipped", malformed.line))
            .with_label(
                Label::new((source_name, range))
                    .with_message(format!("this range has {} numbers", len))
                    .with_color(Color::Yellow),
            )
            .with_note(format!("A single range may produce at most {} items", max))
            .finish(),
    };

    if report
        .write((source_name, Source::from(source)), &mut output)
        .is_err()
    {
        return format!("{}\n", malformed);
    }

    String::from_utf8_lossy(&output).into_owned()
}

/// Report every malformed line of one input
pub fn report_all(source_name: &str, source: &str, malformed: &[MalformedRange]) -> String {
    malformed
        .iter()
        .map(|m| report_malformed_range(source_name, source, m))
        .collect()
}
