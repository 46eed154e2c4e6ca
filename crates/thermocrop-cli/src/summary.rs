use console::Style;
use thermocrop_core::consts::MATCH_SCORE_UNCHECKED;
use thermocrop_core::pipeline::{AnalysisConfig, Strategy};
use thermocrop_core::reconstruct::SampleResult;
use thermocrop_core::segmentation::SegmentationOutcome;
use thermocrop_core::session::BatchFailure;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    warning: Style,
    error: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
        }
    }
}

pub fn print_config_summary(config: &AnalysisConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Thermocrop Analysis"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(19)));
    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Strategy"),
        s.method.apply_to(config.strategy)
    );
    match config.strategy {
        Strategy::Palette => {
            println!(
                "  {:<14}{}",
                s.label.apply_to("Model"),
                s.method.apply_to(format!("{:?}", config.palette.model))
            );
            println!(
                "  {:<14}{}",
                s.label.apply_to("Table"),
                s.method.apply_to(config.palette.table)
            );
        }
        Strategy::Radiometric => {
            let floor = match config.registration.min_match_score {
                v if v <= MATCH_SCORE_UNCHECKED => "none".to_string(),
                v => format!("{v:.2}"),
            };
            println!(
                "  {:<14}{}",
                s.label.apply_to("Match floor"),
                s.value.apply_to(floor)
            );
            println!(
                "  {:<14}{}",
                s.label.apply_to("Segment"),
                s.value.apply_to(config.radiometric.segment_patch)
            );
        }
    }
    println!();
}

/// Detailed view of one sample.
pub fn print_sample_result(result: &SampleResult) {
    let s = Styles::new();
    let m = result.identity.metadata();

    println!("  {}", s.header.apply_to(m.source_filename()));
    let identity = format!(
        "{} / {} / {} / {} / {}",
        m.plant_id(),
        m.ambient_preset(),
        m.treatment(),
        m.period(),
        m.replicate()
    );
    if result.identity.is_fallback() {
        println!(
            "    {:<12}{} {}",
            s.label.apply_to("Identity"),
            identity,
            s.warning.apply_to("(unparsed filename)")
        );
    } else {
        println!("    {:<12}{}", s.label.apply_to("Identity"), identity);
    }

    if let Some(model) = result.pixel_model {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Model"),
            s.method.apply_to(model)
        );
    }
    if let Some(scale) = &result.scale {
        let range = format!(
            "{:.1} .. {:.1} °C",
            scale.scale.min_temp(),
            scale.scale.max_temp()
        );
        if scale.matched {
            println!("    {:<12}{}", s.label.apply_to("Scale"), range);
        } else {
            println!(
                "    {:<12}{} {}",
                s.label.apply_to("Scale"),
                range,
                s.warning.apply_to("(default)")
            );
        }
    }
    if let Some(patch) = &result.patch {
        println!(
            "    {:<12}({}, {}) score {:.3}",
            s.label.apply_to("Location"),
            patch.location.x,
            patch.location.y,
            patch.location.score
        );
    }
    match result.segmentation {
        Some(SegmentationOutcome::Thresholded { threshold }) => {
            println!("    {:<12}threshold {}", s.label.apply_to("Mask"), threshold);
        }
        Some(SegmentationOutcome::FullRegionFallback) => {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Mask"),
                s.warning.apply_to("full region (no foreground found)")
            );
        }
        None => {}
    }

    let st = &result.stats;
    println!();
    for (label, value) in [
        ("Mean", st.mean),
        ("Max", st.max),
        ("Min", st.min),
        ("Std dev", st.std_dev),
    ] {
        println!(
            "    {:<12}{}",
            s.label.apply_to(label),
            s.value.apply_to(format!("{value:.2} °C"))
        );
    }
    println!("    {:<12}{}", s.label.apply_to("Pixels"), st.pixel_count);
    println!();
}

/// One row per sample, then the failures.
pub fn print_results_table(results: &[SampleResult], failures: &[BatchFailure]) {
    let s = Styles::new();

    println!();
    println!(
        "{:<10}  {:>7}  {:<12}  {:<8}  {:<6}  {:>8}  {:>8}  {:>8}  {:>7}  {:>8}",
        "Plant", "Ambient", "Treatment", "Period", "Rep", "Mean", "Max", "Min", "Std", "Pixels"
    );
    println!("{}", "-".repeat(98));

    for result in results {
        let m = result.identity.metadata();
        let st = &result.stats;
        let row = format!(
            "{:<10}  {:>7}  {:<12}  {:<8}  {:<6}  {:>8.2}  {:>8.2}  {:>8.2}  {:>7.2}  {:>8}",
            m.plant_id(),
            m.ambient_preset(),
            m.treatment(),
            m.period(),
            m.replicate(),
            st.mean,
            st.max,
            st.min,
            st.std_dev,
            st.pixel_count
        );
        let flagged = result.identity.is_fallback()
            || result.segmentation == Some(SegmentationOutcome::FullRegionFallback);
        if flagged {
            println!("{}", s.warning.apply_to(row));
        } else {
            println!("{row}");
        }
    }

    if !failures.is_empty() {
        println!();
        println!(
            "{}",
            s.error.apply_to(format!("{} sample(s) failed", failures.len()))
        );
        for failure in failures {
            println!("  {:<40} {}", failure.identifier, failure.error);
        }
    }
    println!();
}
