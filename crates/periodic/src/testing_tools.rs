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

pub(crate) use assert_miette_report;
