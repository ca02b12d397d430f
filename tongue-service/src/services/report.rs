//! Markdown rendering of a diagnosis.

use std::fmt::Write as _;

use crate::models::DiagnosisResult;

const NONE_LISTED: &str = "暂无";
const NO_MERIDIAN_IMBALANCE: &str = "暂无显著异常经络。";
const PRESCRIPTION_NOTICE: &str = "* 处方药请遵医嘱服用，孕妇及特殊体质慎用。";

/// Render the report view for a diagnosis.
pub fn render_report(result: &DiagnosisResult) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = write_report(&mut out, result);
    out
}

fn write_report(out: &mut String, result: &DiagnosisResult) -> std::fmt::Result {
    writeln!(out, "# 舌诊报告")?;
    writeln!(out)?;
    writeln!(out, "## 辨证综述")?;
    writeln!(out)?;
    writeln!(out, "{}", result.overview)?;
    writeln!(out)?;

    writeln!(out, "## 核心证型：{}", result.syndrome.name)?;
    writeln!(out)?;
    writeln!(out, "{}", result.syndrome.description)?;
    writeln!(out)?;
    writeln!(out, "相关脏腑：{}", joined(&result.syndrome.organs_involved))?;
    writeln!(out)?;

    writeln!(out, "## 常见症状")?;
    writeln!(out)?;
    bullets(out, &result.symptoms)?;

    writeln!(out, "## 经络平衡辨识")?;
    writeln!(out)?;
    if result.has_meridian_imbalance() {
        for meridian in &result.meridian_analysis {
            writeln!(
                out,
                "- **{}**（{}）：{}",
                meridian.name, meridian.status, meridian.description
            )?;
        }
        writeln!(out)?;
    } else {
        writeln!(out, "{}", NO_MERIDIAN_IMBALANCE)?;
        writeln!(out)?;
    }

    let body = &result.tongue_body;
    writeln!(out, "## 舌质分析")?;
    writeln!(out)?;
    writeln!(out, "| 颜色 | 形态 | 津液 |")?;
    writeln!(out, "| --- | --- | --- |")?;
    writeln!(out, "| {} | {} | {} |", body.color, body.shape, body.moisture)?;
    writeln!(out)?;
    writeln!(out, "{}", body.analysis)?;
    writeln!(out)?;

    let coating = &result.tongue_coating;
    writeln!(out, "## 舌苔分析")?;
    writeln!(out)?;
    writeln!(out, "| 苔色 | 厚薄 | 苔质 |")?;
    writeln!(out, "| --- | --- | --- |")?;
    writeln!(
        out,
        "| {} | {} | {} |",
        coating.color, coating.thickness, coating.nature
    )?;
    writeln!(out)?;
    writeln!(out, "{}", coating.analysis)?;
    writeln!(out)?;

    let recs = &result.recommendations;
    writeln!(out, "## 调理建议")?;
    writeln!(out)?;
    writeln!(out, "### 饮食禁宜")?;
    writeln!(out)?;
    bullets(out, &recs.diet)?;
    writeln!(out, "### 起居养生")?;
    writeln!(out)?;
    bullets(out, &recs.lifestyle)?;
    writeln!(out, "### 食疗推荐")?;
    writeln!(out)?;
    bullets(out, &recs.herbs_or_foods)?;
    writeln!(out, "### 中成药参考")?;
    writeln!(out)?;
    if recs.tcm_formulas.is_empty() {
        writeln!(out, "{}", NONE_LISTED)?;
    } else {
        for formula in &recs.tcm_formulas {
            writeln!(out, "- **{}**：{}", formula.name, formula.description)?;
        }
    }
    writeln!(out)?;
    writeln!(out, "{}", PRESCRIPTION_NOTICE)?;

    Ok(())
}

fn bullets(out: &mut String, items: &[String]) -> std::fmt::Result {
    if items.is_empty() {
        writeln!(out, "{}", NONE_LISTED)?;
    } else {
        for item in items {
            writeln!(out, "- {}", item)?;
        }
    }
    writeln!(out)
}

fn joined(items: &[String]) -> String {
    if items.is_empty() {
        NONE_LISTED.to_string()
    } else {
        items.join("、")
    }
}
