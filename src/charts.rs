//! Plotly figure specifications for the dashboard sections.
//!
//! Each builder maps one analysis result to a `{"data": [...], "layout": {...}}`
//! value that plotly.js renders as-is.

use serde_json::{json, Value};

use crate::concentration::{Concentration, CLASS_A_LIMIT, CLASS_B_LIMIT};
use crate::distribution::Distribution;
use crate::models::{Category, CitySummary, ProfessionSummary};
use crate::segmentation::Segmentation;

const PLOT_BG: &str = "white";
const HEIGHT: u32 = 500;
const MAX_MARKER_PX: f64 = 40.0;

pub fn category_color(category: Category) -> &'static str {
    match category {
        Category::Star => "#2ecc71",
        Category::Premium => "#3498db",
        Category::Volume => "#f39c12",
        Category::Standard => "#95a5a6",
    }
}

/// Plotly `sizeref` so the largest bubble is about `MAX_MARKER_PX` wide.
fn size_ref(max_size: f64) -> f64 {
    if max_size > 0.0 {
        2.0 * max_size / MAX_MARKER_PX.powi(2)
    } else {
        1.0
    }
}

fn dashed_hline(y: f64, color: &str) -> Value {
    json!({
        "type": "line", "xref": "paper", "x0": 0, "x1": 1, "y0": y, "y1": y,
        "line": {"dash": "dash", "color": color}
    })
}

fn dashed_vline(x: f64, color: &str) -> Value {
    json!({
        "type": "line", "yref": "paper", "y0": 0, "y1": 1, "x0": x, "x1": x,
        "line": {"dash": "dash", "color": color}
    })
}

fn note(x: Value, y: Value, xref: &str, yref: &str, text: &str) -> Value {
    json!({
        "x": x, "y": y, "xref": xref, "yref": yref,
        "text": text, "showarrow": false
    })
}

pub fn segmentation_figure(result: &Segmentation) -> Value {
    let max_customers = result
        .products
        .iter()
        .map(|p| p.nb_customers)
        .max()
        .unwrap_or(0) as f64;

    let traces: Vec<Value> = Category::ALL
        .into_iter()
        .filter_map(|category| {
            let members: Vec<_> = result
                .products
                .iter()
                .filter(|p| p.category == category)
                .collect();
            if members.is_empty() {
                return None;
            }
            Some(json!({
                "type": "scatter",
                "mode": "markers",
                "name": category.label(),
                "x": members.iter().map(|p| p.qty).collect::<Vec<_>>(),
                "y": members.iter().map(|p| p.total_revenue).collect::<Vec<_>>(),
                "customdata": members
                    .iter()
                    .map(|p| json!([p.product_id, p.market_share]))
                    .collect::<Vec<_>>(),
                "hovertemplate": "Product %{customdata[0]}<br>Volume %{x}<br>Revenue $%{y:,.2f}<br>Market share %{customdata[1]:.2f}%<extra></extra>",
                "marker": {
                    "color": category_color(category),
                    "size": members.iter().map(|p| p.nb_customers).collect::<Vec<_>>(),
                    "sizemode": "area",
                    "sizeref": size_ref(max_customers),
                    "sizemin": 4
                }
            }))
        })
        .collect();

    let mut shapes = Vec::new();
    let mut annotations = Vec::new();
    let top_label = format!("{:.0}%", result.top_pct * 100.0);
    if let Some(x) = result.quantity_threshold {
        shapes.push(dashed_vline(x, "gray"));
        annotations.push(note(json!(x), json!(1), "x", "paper", &format!("Top {top_label} volume")));
    }
    if let Some(y) = result.revenue_threshold {
        shapes.push(dashed_hline(y, "gray"));
        annotations.push(note(json!(1), json!(y), "paper", "y", &format!("Top {top_label} revenue")));
    }

    json!({
        "data": traces,
        "layout": {
            "title": {"text": "Strategic Product Matrix (BCG)"},
            "xaxis": {"title": {"text": "Sales volume (units)"}},
            "yaxis": {"title": {"text": "Total revenue ($)"}},
            "legend": {"title": {"text": "category"}},
            "shapes": shapes,
            "annotations": annotations,
            "plot_bgcolor": PLOT_BG,
            "height": HEIGHT
        }
    })
}

pub fn concentration_figure(result: &Concentration) -> Value {
    json!({
        "data": [{
            "type": "scatter",
            "mode": "lines+markers",
            "name": "Cumulative revenue (%)",
            "x": result.products.iter().map(|p| p.rank).collect::<Vec<_>>(),
            "y": result.products.iter().map(|p| p.contrib_cumul).collect::<Vec<_>>(),
            "text": result.products.iter().map(|p| format!("{} (class {})", p.product_id, p.class)).collect::<Vec<_>>(),
            "hovertemplate": "#%{x} %{text}<br>%{y:.2f}%<extra></extra>"
        }],
        "layout": {
            "title": {"text": "ABC Analysis - Cumulative Revenue"},
            "xaxis": {"title": {"text": "Products (sorted by decreasing revenue)"}},
            "yaxis": {"title": {"text": "Cumulative revenue (%)"}, "range": [0, 105]},
            "shapes": [
                dashed_hline(CLASS_A_LIMIT, "green"),
                dashed_hline(CLASS_B_LIMIT, "orange")
            ],
            "annotations": [
                {
                    "xref": "paper", "yref": "y", "x": 0, "y": CLASS_A_LIMIT,
                    "text": "80% (end of class A)", "showarrow": false,
                    "xanchor": "left", "yanchor": "bottom"
                },
                {
                    "xref": "paper", "yref": "y", "x": 0, "y": CLASS_B_LIMIT,
                    "text": "95% (end of class B)", "showarrow": false,
                    "xanchor": "left", "yanchor": "top"
                }
            ],
            "plot_bgcolor": PLOT_BG,
            "height": HEIGHT
        }
    })
}

pub fn geography_figure(cities: &[CitySummary]) -> Value {
    let max_customers = cities.iter().map(|c| c.nb_customers).max().unwrap_or(0) as f64;

    json!({
        "data": [{
            "type": "scatter",
            "mode": "markers+text",
            "x": cities.iter().map(|c| c.avg_basket).collect::<Vec<_>>(),
            "y": cities.iter().map(|c| c.total_revenue).collect::<Vec<_>>(),
            "text": cities.iter().map(|c| c.city.as_str()).collect::<Vec<_>>(),
            "textposition": "top center",
            "hovertemplate": "%{text}<br>Average basket $%{x:,.2f}<br>Revenue $%{y:,.2f}<br>Score %{marker.color:.2f}<extra></extra>",
            "marker": {
                "size": cities.iter().map(|c| c.nb_customers).collect::<Vec<_>>(),
                "sizemode": "area",
                "sizeref": size_ref(max_customers),
                "sizemin": 4,
                "color": cities.iter().map(|c| c.score).collect::<Vec<_>>(),
                "colorscale": "Viridis",
                "showscale": true,
                "colorbar": {"title": {"text": "Potential score"}}
            }
        }],
        "layout": {
            "title": {"text": format!("Geographic Performance (Top {} Cities)", cities.len())},
            "xaxis": {"title": {"text": "Average basket ($)"}},
            "yaxis": {"title": {"text": "Total revenue ($)"}},
            "plot_bgcolor": PLOT_BG,
            "height": HEIGHT
        }
    })
}

pub fn professions_figure(professions: &[ProfessionSummary]) -> Value {
    json!({
        "data": [{
            "type": "bar",
            "orientation": "h",
            "y": professions.iter().map(|p| p.job.as_str()).collect::<Vec<_>>(),
            "x": professions.iter().map(|p| p.total_revenue).collect::<Vec<_>>(),
            "texttemplate": "$%{x:,.0f}",
            "textposition": "outside",
            "customdata": professions.iter().map(|p| p.nb_customers).collect::<Vec<_>>(),
            "hovertemplate": "%{y}<br>Revenue $%{x:,.2f}<br>Average spend $%{marker.color:,.2f}<br>Customers %{customdata}<extra></extra>",
            "marker": {
                "color": professions.iter().map(|p| p.avg_spend).collect::<Vec<_>>(),
                "colorscale": "Blues",
                "showscale": true,
                "colorbar": {"title": {"text": "Average spend ($)"}}
            }
        }],
        "layout": {
            "title": {"text": format!("Top {} Professions by Revenue", professions.len())},
            "xaxis": {"title": {"text": "Total revenue ($)"}},
            "yaxis": {"title": {"text": "Profession"}, "autorange": "reversed"},
            "plot_bgcolor": PLOT_BG,
            "height": HEIGHT
        }
    })
}

pub fn distribution_figure(result: &Distribution, bins: usize) -> Value {
    let revenues: Vec<f64> = result.revenues().collect();

    json!({
        "data": [
            {
                "type": "histogram",
                "name": "Frequency",
                "x": revenues,
                "nbinsx": bins,
                "xaxis": "x",
                "yaxis": "y"
            },
            {
                "type": "box",
                "name": "Distribution",
                "y": revenues,
                "xaxis": "x2",
                "yaxis": "y2"
            }
        ],
        "layout": {
            "title": {"text": "Order amount distribution analysis"},
            "xaxis": {"domain": [0.0, 0.68], "title": {"text": "Amount ($)"}},
            "yaxis": {"title": {"text": "Frequency"}},
            "xaxis2": {"domain": [0.73, 1.0], "anchor": "y2"},
            "yaxis2": {"anchor": "x2", "title": {"text": "Amount ($)"}},
            "annotations": [
                note(json!(0.34), json!(1.0), "paper", "paper", "Amount distribution"),
                note(json!(0.865), json!(1.0), "paper", "paper", "Box plot")
            ],
            "showlegend": false,
            "plot_bgcolor": PLOT_BG,
            "height": HEIGHT
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concentration::analyze_abc;
    use crate::distribution::analyze_distribution;
    use crate::models::TransactionRecord;
    use crate::segmentation::analyze_segments;

    fn records() -> Vec<TransactionRecord> {
        [("P1", 50.0, 16.0), ("P2", 5.0, 30.0), ("P3", 100.0, 0.5)]
            .into_iter()
            .map(|(id, qty, amount)| TransactionRecord {
                product_id: id.to_string(),
                email: format!("{id}@example.com"),
                city: "Paris".to_string(),
                job: "Engineer".to_string(),
                invoice_date: None,
                qty,
                amount,
                revenue: qty * amount,
            })
            .collect()
    }

    #[test]
    fn segmentation_has_one_trace_per_present_category() {
        let figure = segmentation_figure(&analyze_segments(&records(), 0.34));
        let names: Vec<&str> = figure["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|trace| trace["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Premium", "Volume", "Standard"]);
        assert_eq!(figure["layout"]["shapes"].as_array().unwrap().len(), 2);
        assert_eq!(figure["layout"]["annotations"][0]["text"], "Top 34% volume");
    }

    #[test]
    fn empty_segmentation_draws_no_thresholds() {
        let figure = segmentation_figure(&analyze_segments(&[], 0.2));
        assert!(figure["data"].as_array().unwrap().is_empty());
        assert!(figure["layout"]["shapes"].as_array().unwrap().is_empty());
    }

    #[test]
    fn concentration_plots_cumulative_by_rank() {
        let figure = concentration_figure(&analyze_abc(&records()));
        let trace = &figure["data"][0];
        assert_eq!(trace["x"], json!([1, 2, 3]));
        assert_eq!(trace["y"][2], json!(100.0));
        assert_eq!(figure["layout"]["shapes"][0]["y0"], json!(80.0));
        assert_eq!(figure["layout"]["shapes"][1]["y0"], json!(95.0));
    }

    #[test]
    fn geography_and_professions_titles_follow_row_count() {
        let city = CitySummary {
            city: "Paris".to_string(),
            total_revenue: 10.0,
            nb_customers: 2,
            nb_transactions: 3,
            avg_basket: 3.3,
            revenue_per_customer: 5.0,
            score: 10.0,
        };
        let figure = geography_figure(&[city]);
        assert_eq!(
            figure["layout"]["title"]["text"],
            "Geographic Performance (Top 1 Cities)"
        );
        assert_eq!(figure["data"][0]["text"], json!(["Paris"]));

        let profession = ProfessionSummary {
            job: "Engineer".to_string(),
            total_revenue: 10.0,
            avg_spend: 5.0,
            nb_customers: 1,
        };
        let figure = professions_figure(&[profession]);
        assert_eq!(figure["data"][0]["orientation"], "h");
        assert_eq!(figure["data"][0]["y"], json!(["Engineer"]));
    }

    #[test]
    fn distribution_pairs_histogram_with_box() {
        let figure = distribution_figure(&analyze_distribution(&records()), 50);
        assert_eq!(figure["data"][0]["type"], "histogram");
        assert_eq!(figure["data"][0]["nbinsx"], 50);
        assert_eq!(figure["data"][1]["type"], "box");
        assert_eq!(figure["data"][1]["y"].as_array().unwrap().len(), 3);
    }
}
