use crate::{moon_phase_name, ObservingConditions};

pub const PLACEHOLDER: &str = "--";
pub const LOADING: &str = "Loading...";

/// One labelled row of the conditions panel
#[derive(Debug, Clone, PartialEq)]
pub struct ReadoutLine {
    pub label: &'static str,
    pub value: String,
}

/// Panel rows for the current conditions
///
/// Values read `Loading...` while a refresh is in flight and `--` when
/// nothing has been derived yet, so the panel never blocks.
pub fn readout(conditions: Option<&ObservingConditions>, loading: bool) -> Vec<ReadoutLine> {
    let field = |render: &dyn Fn(&ObservingConditions) -> String| match (loading, conditions) {
        (true, _) => LOADING.to_string(),
        (false, Some(c)) => render(c),
        (false, None) => PLACEHOLDER.to_string(),
    };

    vec![
        line("Temperature", field(&|c| format!("{}°C", c.temperature_c))),
        line("Cloud Cover", field(&|c| format!("{}%", c.cloud_cover_pct))),
        line(
            "Visibility",
            field(&|c| format!("{:.1} km", c.visibility_m / 1000.0)),
        ),
        line("Humidity", field(&|c| format!("{}%", c.humidity_pct))),
        line("Dew Point", field(&|c| format!("{}°C", c.dew_point_c))),
        line("Seeing", field(&|c| c.astronomy.seeing.to_string())),
        line(
            "Transparency",
            field(&|c| c.astronomy.transparency.to_string()),
        ),
        line(
            "Moon",
            field(&|c| {
                let phase = c.astronomy.moon_phase;
                format!("{} ({:.0}%)", moon_phase_name(phase), phase * 100.0)
            }),
        ),
        line(
            "Sky",
            field(&|c| (if c.is_daytime { "Day" } else { "Night" }).to_string()),
        ),
    ]
}

fn line(label: &'static str, value: String) -> ReadoutLine {
    ReadoutLine { label, value }
}

/// Plain-text rendering for terminals
pub fn render_readout(lines: &[ReadoutLine]) -> String {
    let width = lines.iter().map(|l| l.label.len()).max().unwrap_or(0);
    lines
        .iter()
        .map(|l| format!("{:<width$}  {}", l.label, l.value, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}
