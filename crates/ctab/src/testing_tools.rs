use std::fmt::Write;

use miette::Diagnostic;

use crate::errors::CtabError;

/// Lays out everything a `CtabError` reports (its code, message, labelled columns and help) as plain text
pub(crate) fn describe(error: &CtabError) -> String {
    let code = error.code().map(|code| code.to_string()).unwrap_or_default();
    let mut out = format!("[{code}] {error}");
    for label in error.labels().into_iter().flatten() {
        let columns = label.offset()..label.offset() + label.len();
        let text = error.text().get(columns).unwrap_or_default();
        write!(out, "\n  {}: {text:?}", label.label().unwrap_or_default()).unwrap();
    }
    if let Some(help) = error.help() {
        write!(out, "\n  help: {help}").unwrap();
    }
    out
}

macro_rules! assert_miette_snapshot {
    ($diag:expr, @$snapshot:literal) => {{
        let error = $diag.unwrap_err();
        insta::assert_snapshot!($crate::testing_tools::describe(&error), @$snapshot);
    }};
}

// NOTE: For reports built by other crates (like `knuffel`), where only part of the rendering is ours to pin down
macro_rules! assert_miette_report {
    ($diag:expr, $($needle:expr),+ $(,)?) => {{
        use miette::{GraphicalReportHandler, GraphicalTheme};

        let mut out = String::new();
        GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
            .with_width(80)
            .render_report(&mut out, &*$diag.unwrap_err())
            .unwrap();
        $(
            assert!(
                out.contains($needle),
                "the rendered report for `{}` did not contain {:?}:\n{out}",
                stringify!($diag),
                $needle
            );
        )+
    }};
}

pub(crate) use {assert_miette_report, assert_miette_snapshot};
