use std::fmt::Write;

use serde_json::Value;

use crate::charts;
use crate::config::AnalysisConfig;
use crate::models::TransactionTable;
use crate::pipeline::Analyses;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const TITLE: &str = "E-Commerce Analysis Dashboard";

pub struct Section {
    pub id: &'static str,
    pub title: &'static str,
    pub color: &'static str,
    pub action: &'static str,
    pub figure: Value,
}

pub fn sections(analyses: &Analyses, config: &AnalysisConfig) -> Vec<Section> {
    vec![
        Section {
            id: "bcg",
            title: "Indicator 1: BCG Product Matrix",
            color: "#2980b9",
            action: "Action: Focus on Stars/Premium (top products), monitor Standard products.",
            figure: charts::segmentation_figure(&analyses.segmentation),
        },
        Section {
            id: "abc",
            title: "Indicator 2: ABC Analysis (Pareto)",
            color: "#27ae60",
            action: "Action: Prioritize management of Class A products (up to 80% of revenue).",
            figure: charts::concentration_figure(&analyses.concentration),
        },
        Section {
            id: "geo",
            title: "Indicator 3: Geographic Performance",
            color: "#8e44ad",
            action: "Action: Invest in cities with high potential scores.",
            figure: charts::geography_figure(&analyses.geography),
        },
        Section {
            id: "professions",
            title: "Indicator 4: Top Professions by Revenue",
            color: "#d35400",
            action: "Action: B2B targeting by profession and corporate partnerships.",
            figure: charts::professions_figure(&analyses.professions),
        },
        Section {
            id: "distribution",
            title: "Indicator 5: Amount Distribution",
            color: "#c0392b",
            action: "Action: Segment customers by basket size (small / medium / large).",
            figure: charts::distribution_figure(&analyses.distribution, config.histogram_bins),
        },
    ]
}

/// JSON safe to inline in a `<script>` element: no `<` survives, so neither
/// `</script>` nor `<!--` can reach the HTML parser.
fn script_json(value: &Value) -> String {
    value.to_string().replace('<', "\\u003c")
}

pub fn render_page(table: &TransactionTable, analyses: &Analyses, config: &AnalysisConfig) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "<!DOCTYPE html>");
    let _ = writeln!(output, "<html lang=\"en\">");
    let _ = writeln!(output, "<head>");
    let _ = writeln!(output, "<meta charset=\"utf-8\">");
    let _ = writeln!(output, "<title>{}</title>", TITLE);
    let _ = writeln!(output, "<script src=\"{}\"></script>", PLOTLY_CDN);
    let _ = writeln!(output, "<style>");
    let _ = writeln!(output, "body {{ background-color: #f5f6fa; padding: 10px; margin: 0; font-family: sans-serif; }}");
    let _ = writeln!(output, ".header {{ padding: 20px; background-color: #ecf0f1; margin-bottom: 20px; text-align: center; }}");
    let _ = writeln!(output, ".box {{ padding: 20px; background-color: white; margin: 10px; border-radius: 10px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}");
    let _ = writeln!(output, "</style>");
    let _ = writeln!(output, "</head>");
    let _ = writeln!(output, "<body>");

    let _ = writeln!(output, "<div class=\"header\">");
    let _ = writeln!(output, "<h1 style=\"color: #2c3e50\">{}</h1>", TITLE);
    let _ = writeln!(
        output,
        "<h3 style=\"color: #7f8c8d\">Dataset: {} ({} transactions)</h3>",
        html_escape::encode_text(&table.source),
        table.len()
    );
    if let Some((first, last)) = table.date_range() {
        let _ = writeln!(
            output,
            "<p style=\"color: #95a5a6\">Invoices from {} to {}</p>",
            first, last
        );
    }
    let _ = writeln!(output, "<p style=\"color: #95a5a6\">{}</p>", html_escape::encode_text(&config.byline));
    let _ = writeln!(output, "</div>");

    for section in sections(analyses, config) {
        let _ = writeln!(output, "<div class=\"box\">");
        let _ = writeln!(output, "<h3 style=\"color: {}\">{}</h3>", section.color, section.title);
        let _ = writeln!(output, "<p>{}</p>", section.action);
        let _ = writeln!(output, "<div id=\"{}\"></div>", section.id);
        let _ = writeln!(output, "<script>");
        let _ = writeln!(output, "(function () {{");
        let _ = writeln!(output, "  var fig = {};", script_json(&section.figure));
        let _ = writeln!(
            output,
            "  Plotly.newPlot(\"{}\", fig.data, fig.layout, {{responsive: true}});",
            section.id
        );
        let _ = writeln!(output, "}})();");
        let _ = writeln!(output, "</script>");
        let _ = writeln!(output, "</div>");
    }

    let _ = writeln!(output, "</body>");
    let _ = writeln!(output, "</html>");

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::read_transactions;
    use crate::pipeline::run_analyses;

    const INVOICES: &str = "\
product_id,email,city,job,invoice_date,qty,amount
P1,a@example.com,Paris,Engineer,01/02/2023,3,10
P2,b@example.com,</script><b>Lyon,Teacher,28/02/2023,1,250
";

    fn page() -> String {
        let table = read_transactions(INVOICES.as_bytes(), "invoices & co.csv").unwrap();
        let config = AnalysisConfig::default();
        let analyses = run_analyses(&table, &config);
        render_page(&table, &analyses, &config)
    }

    #[test]
    fn header_text_is_escaped() {
        let table = read_transactions(INVOICES.as_bytes(), "<b>invoices</b>.csv").unwrap();
        let config = AnalysisConfig {
            byline: "Team: <script>alert(1)</script> & co".to_string(),
            ..AnalysisConfig::default()
        };
        let analyses = run_analyses(&table, &config);
        let html = render_page(&table, &analyses, &config);

        assert!(html.contains("Dataset: &lt;b&gt;invoices&lt;/b&gt;.csv (2 transactions)"));
        assert!(html.contains("Team: &lt;script&gt;alert(1)&lt;/script&gt; &amp; co"));
        assert!(!html.contains("<b>invoices"));
    }

    #[test]
    fn page_has_header_and_five_sections() {
        let html = page();
        assert!(html.contains("<h1 style=\"color: #2c3e50\">E-Commerce Analysis Dashboard</h1>"));
        assert!(html.contains("Dataset: invoices &amp; co.csv (2 transactions)"));
        assert!(html.contains("Invoices from 2023-02-01 to 2023-02-28"));
        assert!(html.contains("Team: Analytics"));
        assert_eq!(html.matches("Plotly.newPlot(").count(), 5);
        for id in ["bcg", "abc", "geo", "professions", "distribution"] {
            assert!(html.contains(&format!("<div id=\"{id}\"></div>")));
        }
        assert!(html.contains("Action: Invest in cities with high potential scores."));
    }

    #[test]
    fn data_cannot_close_the_script_element() {
        let html = page();
        assert_eq!(html.matches("</script>").count(), 6);
        assert!(html.contains("\\u003c/script>\\u003cb>Lyon"));
    }

    #[test]
    fn inline_json_contains_no_angle_brackets() {
        let value = serde_json::json!({"text": "<!--<script>", "hover": "a<br>b"});
        let inlined = script_json(&value);
        assert!(!inlined.contains('<'));
        assert_eq!(serde_json::from_str::<Value>(&inlined).unwrap(), value);
    }
}
