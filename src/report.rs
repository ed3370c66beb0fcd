use std::fmt::Write;

use crate::models::{Category, TransactionTable};
use crate::pipeline::Analyses;

const TOP_PRODUCTS_PER_CATEGORY: usize = 5;

pub fn build_report(table: &TransactionTable, analyses: &Analyses) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Invoice Analysis Report");
    let _ = writeln!(
        output,
        "Generated from {} ({} transactions, {} without a valid date)",
        table.source,
        table.len(),
        table.null_dates()
    );
    if let Some((first, last)) = table.date_range() {
        let _ = writeln!(output, "Invoices from {} to {}", first, last);
    }

    let segmentation = &analyses.segmentation;
    let _ = writeln!(output);
    let _ = writeln!(output, "## Product Matrix");

    if segmentation.products.is_empty() {
        let _ = writeln!(output, "No products recorded.");
    } else {
        if let (Some(revenue), Some(qty)) =
            (segmentation.revenue_threshold, segmentation.quantity_threshold)
        {
            let _ = writeln!(
                output,
                "Top {:.0}% thresholds: revenue above {:.2}, volume above {:.2}",
                segmentation.top_pct * 100.0,
                revenue,
                qty
            );
        }
        for category in Category::ALL {
            let mut members: Vec<_> = segmentation
                .products
                .iter()
                .filter(|p| p.category == category)
                .collect();
            members.sort_by(|a, b| b.total_revenue.total_cmp(&a.total_revenue));

            let _ = writeln!(output, "- {}: {} products", category, segmentation.count(category));
            for product in members.iter().take(TOP_PRODUCTS_PER_CATEGORY) {
                let _ = writeln!(
                    output,
                    "  - {} revenue {:.2}, {} units, {:.2}% share",
                    product.product_id, product.total_revenue, product.qty, product.market_share
                );
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## ABC Classes");

    if analyses.concentration.products.is_empty() {
        let _ = writeln!(output, "No products recorded.");
    } else {
        for summary in analyses.concentration.class_summary() {
            let _ = writeln!(
                output,
                "- Class {}: {} products, {:.1}% of revenue",
                summary.class, summary.products, summary.revenue_pct
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Cities");

    if analyses.geography.is_empty() {
        let _ = writeln!(output, "No cities recorded.");
    } else {
        for city in analyses.geography.iter() {
            let _ = writeln!(
                output,
                "- {}: revenue {:.2} across {} transactions, {} customers, basket {:.2}, score {:.2}",
                city.city,
                city.total_revenue,
                city.nb_transactions,
                city.nb_customers,
                city.avg_basket,
                city.score
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Professions");

    if analyses.professions.is_empty() {
        let _ = writeln!(output, "No professions recorded.");
    } else {
        for profession in analyses.professions.iter() {
            let _ = writeln!(
                output,
                "- {}: revenue {:.2}, average spend {:.2}, {} customers",
                profession.job, profession.total_revenue, profession.avg_spend, profession.nb_customers
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Order Amounts");

    match analyses.distribution.stats {
        Some(stats) => {
            let _ = writeln!(
                output,
                "- mean {:.2}, median {:.2}, std {:.2}",
                stats.mean, stats.median, stats.std
            );
            let _ = writeln!(
                output,
                "- min {:.2}, q25 {:.2}, q75 {:.2}, max {:.2}",
                stats.min, stats.q25, stats.q75, stats.max
            );
        }
        None => {
            let _ = writeln!(output, "No transactions recorded.");
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::loader::read_transactions;
    use crate::pipeline::run_analyses;

    fn report_for(input: &str) -> String {
        let table = read_transactions(input.as_bytes(), "invoices.csv").unwrap();
        let analyses = run_analyses(&table, &AnalysisConfig::default());
        build_report(&table, &analyses)
    }

    #[test]
    fn lists_every_section() {
        let report = report_for(
            "product_id,email,city,job,invoice_date,qty,amount\n\
             P1,a@example.com,Paris,Engineer,01/02/2023,4,10\n\
             P2,b@example.com,Lyon,Teacher,13/2023,2,5\n",
        );

        assert!(report.starts_with("# Invoice Analysis Report"));
        assert!(report.contains("Generated from invoices.csv (2 transactions, 1 without a valid date)"));
        for heading in [
            "## Product Matrix",
            "## ABC Classes",
            "## Top Cities",
            "## Top Professions",
            "## Order Amounts",
        ] {
            assert!(report.contains(heading), "missing {heading}");
        }
        assert!(report.contains("- Paris: revenue 40.00 across 1 transactions"));
        assert!(report.contains("- min 10.00, q25 17.50, q75 32.50, max 40.00"));
    }

    #[test]
    fn empty_table_reports_placeholders() {
        let report = report_for("product_id,email,city,job,invoice_date,qty,amount\n");
        assert!(report.contains("No products recorded."));
        assert!(report.contains("No cities recorded."));
        assert!(report.contains("No professions recorded."));
        assert!(report.contains("No transactions recorded."));
    }
}
