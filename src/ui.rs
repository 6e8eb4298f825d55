//! Terminal output: a spinner while a task runs and coloured result tables.

use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use vibracore::input::vibration::{Buildings, Category, building_name};
use vibracore::results::{Hue, MultiCalculationData, NuisanceTable, SoundLevel, VibrationResults};

/// Spinner shown while a remote task is submitted and polled.
pub struct TaskProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
}

impl TaskProgress {
    pub fn start(description: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(description.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
        }
    }

    /// Stops the spinner and reports the outcome; passes `result` through.
    pub fn finish<T>(self, result: vibracore::Result<T>) -> vibracore::Result<T> {
        let elapsed = self.pb.elapsed();
        let message = self.pb.message();
        self.pb.finish_and_clear();
        match &result {
            Ok(_) => println!(
                "  {} {message} ({:.1}s)",
                self.green.apply_to("✓"),
                elapsed.as_secs_f64()
            ),
            Err(err) => println!("  {} {message}: {err}", self.red.apply_to("✗")),
        }
        result
    }
}

fn header(title: &str) {
    println!();
    println!("{}", Style::new().bold().apply_to(format!("─── {title} ───")));
}

pub fn print_buildings(buildings: &Buildings) {
    header("Buildings");
    println!("{:>6}  {:>10}  {}", "name", "area [m²]", "gebruiksdoel");
    for building in &buildings.features {
        let name = building_name(building).unwrap_or_default();
        let doel = building
            .properties
            .get("gebruiksdoel")
            .and_then(|v| v.as_str())
            .unwrap_or("-");
        println!("{name:>6}  {:>10.1}  {doel}", building.geometry.area());
    }
    println!("{} buildings", buildings.features.len());
}

pub fn print_normative(category: Category, name: Option<&str>) {
    let label = match category {
        Category::One => "category one",
        Category::Two => "category two",
    };
    match name {
        Some(name) => println!("  normative building ({label}): {name}"),
        None => println!("  normative building ({label}): none"),
    }
}

pub fn print_vibration_results(results: &VibrationResults) {
    let green = Style::new().green();
    let orange = Style::new().yellow();
    let red = Style::new().red();

    header("Vibration check");
    for (index, feature) in results.features.iter().enumerate() {
        let check = &feature.properties;
        let name = check
            .extra
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| index.to_string());
        let required = check
            .x_required
            .map(|x| format!("{x:.1} m"))
            .unwrap_or_else(|| "-".to_string());
        let verdict = match (check.check, check.cat) {
            (true, _) => green.apply_to("sufficient"),
            (false, Category::One) => orange.apply_to("insufficient, cat. 1"),
            (false, Category::Two) => red.apply_to("insufficient, cat. 2"),
        };
        println!("{name:>6}  required distance {required:>9}  {verdict}");
    }
    println!(
        "{} sufficient, {} insufficient cat. 1, {} insufficient cat. 2",
        results.sufficient(),
        results.insufficient(Category::One),
        results.insufficient(Category::Two)
    );
}

pub fn print_nuisance(table: &NuisanceTable) {
    header(&format!("Nuisance distances, building {}", table.building));
    for row in &table.rows {
        if row.distance.is_nan() {
            println!("{:>22}  {:>9}", row.duration, "n/a");
        } else {
            println!("{:>22}  {:>7.1} m", row.duration, row.distance);
        }
    }
}

pub fn print_sound(building: &str, levels: &[SoundLevel], distances: &[f64]) {
    header(&format!("Sound contours, building {building}"));
    for (level, distance) in levels.iter().zip(distances) {
        println!("{:>20}  {:>7.1} m", level.label, distance);
    }
}

pub fn print_impact_force(data: &MultiCalculationData, hue: Hue) {
    header(&format!("Impact force [kN], {}", hue.label()));
    for (id, value) in data.values(hue) {
        println!("{id:>12}  {value:>9.1}");
    }
    if let Some(governing) = data.governing(hue) {
        println!(
            "governing CPT: {} at ({:.1}, {:.1})",
            Style::new().bold().apply_to(&governing.id),
            governing.x,
            governing.y
        );
    }
}
