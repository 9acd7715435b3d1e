//! HTML rendering for the two dashboard screens.

use gizi_core::features::{AGE_MONTHS_RANGE, HEIGHT_CM_RANGE, HEIGHT_CM_STEP};
use gizi_core::metrics::{ClassMetrics, ClassificationReport, ConfusionMatrix};
use gizi_core::report::{CategoryShare, DataReport, GroupedCount, SummaryStats};
use gizi_core::{DatasetRecord, Prediction, Sex};

use crate::charts;

pub const APP_TITLE: &str = "Prediksi Status Gizi Balita";
const INTRO: &str = "Masukkan data balita untuk mendapatkan prediksi status gizinya.";

/// Message shown above or below the form after a submission.
#[derive(Debug, Clone, Copy)]
pub enum Banner<'a> {
    Prediction(&'a Prediction),
    Error(&'a str),
}

pub fn prediction_page(banner: Option<Banner<'_>>) -> String {
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n{}{}",
        APP_TITLE,
        INTRO,
        prediction_form("/predict"),
        banner.map(banner_html).unwrap_or_default()
    );
    layout(APP_TITLE, "predict", &body)
}

pub fn report_page(report: &DataReport, banner: Option<Banner<'_>>) -> String {
    let d = &report.descriptive;
    let e = &report.evaluation;

    let status_bars: Vec<(String, f64)> = d
        .status_distribution
        .iter()
        .map(|s| (s.label.clone(), s.count as f64))
        .collect();

    let mut body = String::new();
    body.push_str("<h1>Analisis Data dan Model</h1>\n");

    body.push_str(&format!(
        "<h2>Pratinjau Dataset</h2>\n<p>{} baris data.</p>\n{}",
        d.row_count,
        preview_table(&d.preview)
    ));

    body.push_str("<h2>Statistik Deskriptif</h2>\n");
    body.push_str(&summary_table(&d.summaries));

    body.push_str("<h2>Distribusi Status Gizi</h2>\n");
    body.push_str(&distribution_table(&d.status_distribution));
    body.push_str(&charts::bar_chart("Jumlah per Status Gizi", &status_bars));

    body.push_str("<h2>Status Gizi per Jenis Kelamin</h2>\n");
    body.push_str(&grouped_table(&d.sex_status_counts));
    body.push_str(&charts::grouped_bar_chart(
        "Status Gizi per Jenis Kelamin",
        &d.sex_status_counts,
    ));

    body.push_str("<h2>Sebaran Umur dan Tinggi Badan</h2>\n");
    for hist in &d.histograms {
        body.push_str(&charts::histogram_chart(hist));
    }

    body.push_str("<h2>Evaluasi Model</h2>\n");
    body.push_str(&format!(
        "<p class=\"metric\">Akurasi: <strong>{:.2}%</strong> ({} baris)</p>\n",
        e.accuracy * 100.0,
        e.row_count
    ));
    body.push_str("<h3>Classification Report</h3>\n");
    body.push_str(&classification_table(&e.classification));
    body.push_str("<h3>Confusion Matrix</h3>\n");
    body.push_str(&confusion_table(&e.confusion));
    body.push_str("<h3>ROC Curve (one-vs-rest)</h3>\n");
    body.push_str(&charts::roc_chart(&e.roc_curves));
    if let Some(auc) = e.macro_auc {
        body.push_str(&format!("<p class=\"metric\">Macro AUC: <strong>{auc:.3}</strong></p>\n"));
    }

    body.push_str("<h2>Prediksi</h2>\n");
    body.push_str(&prediction_form("/report/predict"));
    if let Some(banner) = banner {
        body.push_str(&banner_html(banner));
    }

    layout("Analisis Data dan Model", "report", &body)
}

pub fn error_page(title: &str, message: &str) -> String {
    let body = format!(
        "<h1>{}</h1>\n<div class=\"banner error\">{}</div>\n",
        escape(title),
        escape(message)
    );
    layout(title, "", &body)
}

fn layout(title: &str, active: &str, body: &str) -> String {
    let link = |href: &str, key: &str, text: &str| {
        let class = if key == active { " class=\"active\"" } else { "" };
        format!("<a href=\"{href}\"{class}>{text}</a>")
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="id">
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>
        body {{ font-family: Arial, sans-serif; max-width: 960px; margin: 30px auto; padding: 0 20px; color: #333; }}
        nav a {{ margin-right: 16px; color: #4CAF50; text-decoration: none; }}
        nav a.active {{ font-weight: bold; border-bottom: 2px solid #4CAF50; }}
        h1 {{ border-bottom: 3px solid #4CAF50; padding-bottom: 10px; }}
        form {{ background: #f9f9f9; padding: 16px; border-radius: 8px; }}
        label {{ display: block; margin-top: 10px; font-weight: bold; }}
        table {{ border-collapse: collapse; margin: 10px 0; }}
        th, td {{ border: 1px solid #ddd; padding: 4px 10px; text-align: right; }}
        th:first-child, td:first-child {{ text-align: left; }}
        .banner {{ padding: 12px; border-radius: 6px; margin: 12px 0; }}
        .success {{ background: #e8f5e9; border-left: 4px solid #4CAF50; }}
        .info {{ background: #e3f2fd; border-left: 4px solid #2196F3; }}
        .error {{ background: #ffebee; border-left: 4px solid #f44336; }}
        svg {{ display: block; margin: 10px 0; }}
    </style>
</head>
<body>
    <nav>{predict}{report}</nav>
{body}
</body>
</html>
"#,
        title = escape(title),
        predict = link("/", "predict", "Prediksi"),
        report = link("/report", "report", "Analisis Data &amp; Model"),
        body = body,
    )
}

fn prediction_form(action: &str) -> String {
    let radios: String = Sex::ALL
        .iter()
        .enumerate()
        .map(|(i, sex)| {
            format!(
                "<label style=\"display:inline;font-weight:normal\"><input type=\"radio\" name=\"jenis_kelamin\" value=\"{}\"{}> {}</label> ",
                sex.display_label(),
                if i == 0 { " checked" } else { "" },
                sex.display_label()
            )
        })
        .collect();

    format!(
        r#"<form method="post" action="{action}">
    <label for="umur">Umur (bulan)</label>
    <input type="number" id="umur" name="umur" min="{age_min}" max="{age_max}" step="1" value="{age_min}" required>
    <label>Jenis Kelamin</label>
    {radios}
    <label for="tinggi_badan">Tinggi Badan (cm)</label>
    <input type="number" id="tinggi_badan" name="tinggi_badan" min="{h_min:.1}" max="{h_max:.1}" step="{h_step}" value="{h_min:.1}" required>
    <p><button type="submit">Prediksi</button></p>
</form>
"#,
        action = action,
        age_min = AGE_MONTHS_RANGE.start(),
        age_max = AGE_MONTHS_RANGE.end(),
        radios = radios,
        h_min = HEIGHT_CM_RANGE.start(),
        h_max = HEIGHT_CM_RANGE.end(),
        h_step = HEIGHT_CM_STEP,
    )
}

fn banner_html(banner: Banner<'_>) -> String {
    match banner {
        Banner::Prediction(p) => format!(
            "<div class=\"banner success\">Prediksi Status Gizi: {}</div>\n<div class=\"banner info\">{}</div>\n",
            escape(&p.label),
            escape(p.explanation)
        ),
        Banner::Error(message) => {
            format!("<div class=\"banner error\">{}</div>\n", escape(message))
        }
    }
}

fn preview_table(rows: &[DatasetRecord]) -> String {
    let mut html = String::from(
        "<table>\n<tr><th>Umur (bulan)</th><th>Jenis Kelamin</th><th>Tinggi Badan (cm)</th><th>Status Gizi</th></tr>\n",
    );
    for r in rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.1}</td><td>{}</td></tr>\n",
            r.age_months,
            escape(&r.sex),
            r.height_cm,
            escape(&r.status)
        ));
    }
    html.push_str("</table>\n");
    html
}

fn summary_table(stats: &[SummaryStats]) -> String {
    let mut html = String::from(
        "<table>\n<tr><th>Kolom</th><th>count</th><th>mean</th><th>std</th><th>min</th><th>25%</th><th>50%</th><th>75%</th><th>max</th></tr>\n",
    );
    for s in stats {
        let std = s.std.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.2}</td><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td></tr>\n",
            escape(&s.column),
            s.count,
            s.mean,
            std,
            s.min,
            s.q25,
            s.median,
            s.q75,
            s.max
        ));
    }
    html.push_str("</table>\n");
    html
}

fn distribution_table(shares: &[CategoryShare]) -> String {
    let mut html = String::from("<table>\n<tr><th>Status Gizi</th><th>Jumlah</th><th>Persentase</th></tr>\n");
    for s in shares {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.2}%</td></tr>\n",
            escape(&s.label),
            s.count,
            s.percentage
        ));
    }
    html.push_str("</table>\n");
    html
}

fn grouped_table(counts: &[GroupedCount]) -> String {
    let mut html = String::from("<table>\n<tr><th>Jenis Kelamin</th><th>Status Gizi</th><th>Jumlah</th></tr>\n");
    for c in counts {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(&c.sex),
            escape(&c.status),
            c.count
        ));
    }
    html.push_str("</table>\n");
    html
}

fn classification_table(report: &ClassificationReport) -> String {
    let row = |m: &ClassMetrics| {
        format!(
            "<tr><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{}</td></tr>\n",
            escape(&m.label),
            m.precision,
            m.recall,
            m.f1,
            m.support
        )
    };
    let mut html = String::from(
        "<table>\n<tr><th></th><th>precision</th><th>recall</th><th>f1-score</th><th>support</th></tr>\n",
    );
    for m in &report.classes {
        html.push_str(&row(m));
    }
    html.push_str(&format!(
        "<tr><td>accuracy</td><td></td><td></td><td>{:.2}</td><td>{}</td></tr>\n",
        report.accuracy,
        report.total_support()
    ));
    html.push_str(&row(&report.macro_avg));
    html.push_str(&row(&report.weighted_avg));
    html.push_str("</table>\n");
    html
}

fn confusion_table(matrix: &ConfusionMatrix) -> String {
    let mut html = String::from("<table>\n<tr><th>aktual \\ prediksi</th>");
    for label in &matrix.labels {
        html.push_str(&format!("<th>{}</th>", escape(label)));
    }
    html.push_str("</tr>\n");
    for (label, row) in matrix.labels.iter().zip(&matrix.counts) {
        html.push_str(&format!("<tr><td>{}</td>", escape(label)));
        for count in row {
            html.push_str(&format!("<td>{count}</td>"));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");
    html
}

/// Escape text for HTML element and attribute content.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
