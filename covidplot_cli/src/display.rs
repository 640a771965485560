use comfy_table::{presets::NOTHING, *};
use covidplot::{chart::GrowthChart, series::CountrySeries};

/// One `<code> <final cumulative value>` line per country, in chart order.
pub fn final_values(series: &[CountrySeries]) -> Vec<String> {
    series
        .iter()
        .map(|s| format!("{} {}", s.geo_id, s.last()))
        .collect()
}

pub fn display_final_values(series: &[CountrySeries]) {
    for line in final_values(series) {
        println!("{line}");
    }
}

fn summary_table(chart: &GrowthChart) -> Table {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Code").add_attribute(Attribute::Bold),
            Cell::new("Country").add_attribute(Attribute::Bold),
            Cell::new("First date").add_attribute(Attribute::Bold),
            Cell::new("Last date").add_attribute(Attribute::Bold),
            Cell::new("Days").add_attribute(Attribute::Bold),
            Cell::new(format!("Total {}", chart.metric.label())).add_attribute(Attribute::Bold),
        ])
        .set_style(comfy_table::TableComponent::BottomBorder, '─')
        .set_style(comfy_table::TableComponent::MiddleHeaderIntersections, '─')
        .set_style(comfy_table::TableComponent::HeaderLines, '─')
        .set_style(comfy_table::TableComponent::BottomBorderIntersections, '─')
        .set_style(comfy_table::TableComponent::TopBorder, '─')
        .set_style(comfy_table::TableComponent::TopBorderIntersections, '─');
    for series in &chart.series {
        table.add_row(vec![
            series.geo_id.clone(),
            series.name.clone().unwrap_or_default(),
            series
                .first_date
                .map(|date| date.to_string())
                .unwrap_or_default(),
            series
                .last_date
                .map(|date| date.to_string())
                .unwrap_or_default(),
            series.len().to_string(),
            series.last().to_string(),
        ]);
    }
    for idx in [4, 5] {
        if let Some(column) = table.column_mut(idx) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    table
}

pub fn display_summary(chart: &GrowthChart) -> anyhow::Result<()> {
    println!("\n{}", summary_table(chart));
    Ok(())
}
