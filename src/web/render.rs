//! HTML rendering for the single-page form

use crate::config::AssetsConfig;
use crate::models::{MAX_ALPHA, MIN_ALPHA};
use crate::schema::{ColumnKind, ColumnSpec, ReferenceSchema};
use crate::types::prediction::{confidence_label, confidence_percent, PredictionTable};
use crate::types::record::{FeatureValue, RawRecord};
use crate::upload::SamplePreview;

/// What to show in the result area
#[derive(Debug)]
pub enum Outcome {
    /// Form path: one row shown as a metric card
    Single(PredictionTable),
    /// Upload path: full result table
    Batch(PredictionTable),
    /// User-visible failure for this request
    Error(String),
}

/// Everything the page needs
pub struct PageView<'a> {
    pub schema: &'a ReferenceSchema,
    pub sample: &'a SamplePreview,
    pub assets: &'a AssetsConfig,
    pub alpha: f64,
    pub form_values: &'a RawRecord,
    pub outcome: &'a Outcome,
}

pub fn escape(text: &str) -> String {
    v_htmlescape::escape(text).to_string()
}

/// Prompt shown next to a form field
fn field_label(column: &str) -> String {
    match column {
        "holiday" => "Choose whether today is designated as a holiday or not",
        "temp" => "Average temperature in Kelvin",
        "rain_1h" => "Amount in mm of rain that occurred in the hour",
        "snow_1h" => "Amount in mm of snow that occurred in the hour",
        "clouds_all" => "Percentage of cloud cover",
        "weather_main" => "Choose the current weather",
        "month" => "Choose month",
        "weekday" => "Choose the day of the week",
        "hour" => "Choose hour",
        other => return escape(other),
    }
    .to_string()
}

pub fn render_page(view: &PageView<'_>) -> String {
    let mut html = String::with_capacity(16 * 1024);
    let assets = view.assets;

    html.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Traffic Volume Predictor</title>\n</head>\n<body>\n",
    );

    html.push_str(&format!(
        "<aside>\n<img src=\"/assets/{}\" alt=\"Traffic Volume Predictor\">\n\
         <h2>Feature Input</h2>\n\
         <p>You can either upload your data file or manually enter traffic features.</p>\n",
        escape(&assets.sidebar)
    ));
    render_upload_option(&mut html, view);
    render_form_option(&mut html, view);
    html.push_str("</aside>\n<main>\n");

    html.push_str(&format!(
        "<h1>Traffic Volume Predictor</h1>\n\
         <p>Utilize our advanced machine learning algorithm to predict traffic volume</p>\n\
         <img src=\"/assets/{}\" alt=\"Traffic\" style=\"width:100%\">\n",
        escape(&assets.banner)
    ));
    render_alpha_slider(&mut html, view.alpha);
    render_outcome(&mut html, view.outcome);
    render_plots(&mut html, assets);

    html.push_str("</main>\n");
    html.push_str(ALPHA_SYNC_SCRIPT);
    html.push_str("</body>\n</html>\n");
    html
}

// Releasing the slider reloads the page with the current form values and the
// new alpha, so the prediction is recomputed.
const ALPHA_SYNC_SCRIPT: &str = "<script>\n\
const slider = document.getElementById('alpha');\n\
const sync = () => {\n\
  document.getElementById('alpha-value').textContent = slider.value;\n\
  document.querySelectorAll('input.alpha').forEach(i => i.value = slider.value);\n\
};\n\
slider.addEventListener('input', sync);\n\
slider.addEventListener('change', () => {\n\
  sync();\n\
  const form = document.getElementById('feature-form');\n\
  window.location.href = '/?' + new URLSearchParams(new FormData(form)).toString();\n\
});\n\
</script>\n";

fn render_alpha_slider(html: &mut String, alpha: f64) {
    html.push_str(&format!(
        "<label for=\"alpha\">Select alpha value for prediction interval</label>\n\
         <input type=\"range\" id=\"alpha\" min=\"{MIN_ALPHA}\" max=\"{MAX_ALPHA}\" step=\"0.01\" value=\"{alpha}\">\n\
         <output id=\"alpha-value\">{alpha}</output>\n"
    ));
}

fn hidden_alpha(html: &mut String, alpha: f64) {
    html.push_str(&format!(
        "<input type=\"hidden\" class=\"alpha\" name=\"alpha\" value=\"{alpha}\">\n"
    ));
}

fn render_upload_option(html: &mut String, view: &PageView<'_>) {
    html.push_str("<details>\n<summary>Option 1: Upload CSV File</summary>\n");
    html.push_str("<form method=\"post\" action=\"/upload\" enctype=\"multipart/form-data\">\n");
    hidden_alpha(html, view.alpha);
    html.push_str(
        "<label>Upload File <input type=\"file\" name=\"file\" accept=\".csv,text/csv\"></label>\n\
         <button type=\"submit\">Predict</button>\n</form>\n",
    );

    if !view.sample.is_empty() {
        html.push_str("<table class=\"sample\">\n<tr>");
        for header in &view.sample.headers {
            html.push_str(&format!("<th>{}</th>", escape(header)));
        }
        html.push_str("</tr>\n");
        for row in &view.sample.rows {
            html.push_str("<tr>");
            for cell in row {
                html.push_str(&format!("<td>{}</td>", escape(cell)));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</table>\n");
    }
    html.push_str("</details>\n");
}

fn render_form_option(html: &mut String, view: &PageView<'_>) {
    html.push_str(
        "<details open>\n<summary>Option 2: Fill out Form</summary>\n\
         <form id=\"feature-form\" method=\"post\" action=\"/predict\">\n\
         <p>Enter the traffic details manually using the form below</p>\n",
    );
    hidden_alpha(html, view.alpha);
    for column in view.schema.columns() {
        render_field(html, column, view.form_values.get(&column.name));
    }
    html.push_str("<button type=\"submit\">Submit Form Data</button>\n</form>\n</details>\n");
}

fn render_field(html: &mut String, column: &ColumnSpec, current: Option<&FeatureValue>) {
    let name = escape(&column.name);
    html.push_str(&format!(
        "<label for=\"{name}\">{}</label>\n",
        field_label(&column.name)
    ));

    match &column.kind {
        ColumnKind::Numeric { min, max, integral } => {
            let step = if *integral { "1" } else { "0.01" };
            let value = current
                .and_then(FeatureValue::as_number)
                .unwrap_or(*min);
            html.push_str(&format!(
                "<input type=\"number\" id=\"{name}\" name=\"{name}\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{value}\">\n"
            ));
        }
        ColumnKind::Categorical { levels } => {
            let selected = current.and_then(FeatureValue::as_level);
            html.push_str(&format!("<select id=\"{name}\" name=\"{name}\">\n"));
            for level in levels {
                let marker = if selected.as_deref() == Some(level.as_str()) {
                    " selected"
                } else {
                    ""
                };
                let level = escape(level);
                html.push_str(&format!("<option value=\"{level}\"{marker}>{level}</option>\n"));
            }
            html.push_str("</select>\n");
        }
    }
}

fn render_outcome(html: &mut String, outcome: &Outcome) {
    match outcome {
        Outcome::Single(table) => {
            let Some(row) = table.rows.first() else {
                return;
            };
            html.push_str(&format!(
                "<section class=\"result\">\n<h2>Predicting Traffic Volume...</h2>\n\
                 <div class=\"metric\"><span class=\"label\">Predicted Volume</span>\
                 <span class=\"value\">{:.2}</span></div>\n\
                 <p>With a {}% confidence interval: [{:.2}, {:.2}]</p>\n</section>\n",
                row.prediction,
                confidence_percent(table.alpha),
                row.lower,
                row.upper
            ));
        }
        Outcome::Batch(table) => {
            html.push_str(&format!(
                "<section class=\"result\">\n<h2>Predicted Results with {}</h2>\n<table>\n<tr>",
                confidence_label(table.alpha)
            ));
            for header in table.headers() {
                html.push_str(&format!("<th>{}</th>", escape(header)));
            }
            html.push_str("</tr>\n");
            for row in &table.rows {
                html.push_str("<tr>");
                for value in &row.values {
                    html.push_str(&format!("<td>{}</td>", escape(&value.to_string())));
                }
                html.push_str(&format!(
                    "<td>{:.2}</td><td>{:.2}</td><td>{:.2}</td></tr>\n",
                    row.prediction, row.lower, row.upper
                ));
            }
            html.push_str("</table>\n</section>\n");
        }
        Outcome::Error(message) => {
            html.push_str(&format!(
                "<section class=\"error\" role=\"alert\">{}</section>\n",
                escape(message)
            ));
        }
    }
}

fn render_plots(html: &mut String, assets: &AssetsConfig) {
    let plots = [
        (
            "Feature Importance",
            &assets.feature_importance,
            Some("Features used in this prediction are ranked by relative importance."),
        ),
        ("Histogram of Residuals", &assets.residuals, None),
        (
            "Scatter Plot of Predicted vs Actual Values",
            &assets.predicted_vs_actual,
            None,
        ),
        ("Upper Prediction Limit", &assets.coverage, None),
    ];

    html.push_str("<section class=\"tabs\">\n");
    for (title, file, caption) in plots {
        html.push_str(&format!(
            "<details>\n<summary>{title}</summary>\n<figure>\n<img src=\"/assets/{}\" alt=\"{title}\">\n",
            escape(file)
        ));
        if let Some(caption) = caption {
            html.push_str(&format!("<figcaption>{caption}</figcaption>\n"));
        }
        html.push_str("</figure>\n</details>\n");
    }
    html.push_str("</section>\n");
}
