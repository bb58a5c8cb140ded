//! JSON and HTML report generation.

use crate::compare::{Comparison, Variant};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize)]
struct Report<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    comparison: &'a Comparison,
}

pub fn write_json_report(comparison: &Comparison, path: &Path) -> Result<(), String> {
    let report = Report {
        generated_at: Utc::now(),
        comparison,
    };
    let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
    fs::write(path, json).map_err(|e| e.to_string())?;
    Ok(())
}

pub fn write_html_report(comparison: &Comparison, out_dir: &Path) -> Result<(), String> {
    fs::create_dir_all(out_dir).map_err(|e| e.to_string())?;
    let index = render_index(comparison, Utc::now());
    fs::write(out_dir.join("index.html"), index).map_err(|e| e.to_string())?;
    Ok(())
}

fn render_variant_row(v: &Variant) -> String {
    format!(
        "<tr><td>{}</td><td>{:.2}%</td><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{}</td><td>{:.2}</td></tr>",
        html_escape(&v.label),
        v.uptime.uptime,
        v.uptime.effective_shots,
        v.uptime.shooting_time,
        v.uptime.reload_time,
        v.uptime.total_time,
        v.trajectory.total_shots,
        v.trajectory.reload_time
    )
}

fn render_index(c: &Comparison, generated_at: DateTime<Utc>) -> String {
    let rows: String = c.variants.iter().map(render_variant_row).collect();
    let mut advisories = Vec::new();
    for v in &c.variants {
        for a in &v.advisories {
            advisories.push(format!(
                r#"<div class="{}"><strong>{} – {}:</strong> {} <br><em>{}</em></div>"#,
                a.severity.label().to_lowercase(),
                html_escape(&v.label),
                html_escape(&a.code),
                html_escape(&a.summary),
                html_escape(&a.technical)
            ));
        }
    }
    let advisories = if advisories.is_empty() {
        "<p>No advisories.</p>".to_string()
    } else {
        advisories.join("\n")
    };
    let cfg = c.variants.first().map(|v| &v.config);
    let weapon = cfg
        .map(|w| {
            format!(
                "Base ammo: {}, fire rate: {}/s, reload: {}s{}{}",
                w.base_ammo,
                w.fire_rate,
                w.reload_time,
                if w.wind_up { ", wind-up weapon" } else { "" },
                if w.ammo_bonus_pct > 0.0 {
                    format!(", +{}% ammo", w.ammo_bonus_pct)
                } else {
                    String::new()
                }
            )
        })
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>{} – Ammo Uptime</title>
<style>body{{font-family:system-ui,sans-serif;margin:1rem;}} table{{border-collapse:collapse;}} th,td{{border:1px solid #ccc;padding:6px;}} .info{{color:#666;}} .warn{{color:#c60;}} .info,.warn{{margin:8px 0;padding:6px;border-left:4px solid;}}</style>
</head>
<body>
<h1>{}</h1>
<p>{}</p>
<p>Simulation horizon: {}s. Generated {}.</p>
<h2>Equipment comparison</h2>
<table><thead><tr><th>Equipment</th><th>Uptime</th><th>Shots / magazine</th><th>Shooting (s)</th><th>Reload (s)</th><th>Cycle (s)</th><th>Shots over horizon</th><th>Reloading over horizon (s)</th></tr></thead>
<tbody>{}</tbody>
</table>
<h2>Advisories</h2>
{}
</body>
</html>"#,
        html_escape(&c.name),
        html_escape(&c.name),
        html_escape(&weapon),
        c.horizon,
        generated_at.to_rfc3339(),
        rows,
        advisories
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{compare_equipment, CompareSet};
    use crate::model::WeaponConfig;

    fn comparison() -> Comparison {
        compare_equipment(
            "<Test> Rifle",
            &WeaponConfig::new(60, 12.0, 1.5),
            10.0,
            CompareSet::Both,
        )
        .unwrap()
    }

    #[test]
    fn html_report_sanity() {
        let dir = tempfile::tempdir().unwrap();
        write_html_report(&comparison(), dir.path()).unwrap();
        let html = fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(html.contains("&lt;Test&gt; Rifle"));
        assert!(html.contains("Bastion Cube"));
        assert!(html.contains("Resilience"));
    }

    #[test]
    fn json_report_sanity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_json_report(&comparison(), &path).unwrap();
        let v: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(v["generated_at"].is_string());
        assert_eq!(v["variants"].as_array().unwrap().len(), 3);
        assert_eq!(v["variants"][1]["equipment"], "bastion-cube");
    }
}
